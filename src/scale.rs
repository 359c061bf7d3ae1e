//! Integer upscaling for tile images.

use macroquad::prelude::Image;

/// How tiles are resampled when a [`TileCamera`](crate::TileCamera) is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleAlgorithm {
    /// Pixel replication.
    #[default]
    Nearest,
    /// Bilinear filtering.
    Smooth,
    /// The Scale2x/EPX edge-preserving pixel-art scaler. Power-of-two factors only.
    Scale2x,
}

impl ScaleAlgorithm {
    /// Whether this algorithm can produce a `factor`x image.
    pub fn supports(self, factor: u32) -> bool {
        match self {
            ScaleAlgorithm::Nearest | ScaleAlgorithm::Smooth => factor >= 1,
            ScaleAlgorithm::Scale2x => factor.is_power_of_two(),
        }
    }
}

type Px = [u8; 4];

#[inline]
fn px(img: &Image, x: i32, y: i32) -> Px {
    let x = x.clamp(0, img.width as i32 - 1) as usize;
    let y = y.clamp(0, img.height as i32 - 1) as usize;
    let p = (y * img.width as usize + x) * 4;
    [img.bytes[p], img.bytes[p + 1], img.bytes[p + 2], img.bytes[p + 3]]
}

fn blank(w: usize, h: usize) -> Image {
    Image {
        bytes: vec![0; w * h * 4],
        width: w as u16,
        height: h as u16,
    }
}

#[inline]
fn put(img: &mut Image, x: usize, y: usize, p: Px) {
    let i = (y * img.width as usize + x) * 4;
    img.bytes[i..i + 4].copy_from_slice(&p);
}

/// Scale `src` by `factor`. `factor` must be supported by `algorithm`.
pub fn scale_image(src: &Image, factor: u32, algorithm: ScaleAlgorithm) -> Image {
    if factor <= 1 {
        return src.clone();
    }
    match algorithm {
        ScaleAlgorithm::Nearest => nearest(src, factor),
        ScaleAlgorithm::Smooth => smooth(src, factor),
        ScaleAlgorithm::Scale2x => {
            let mut out = scale2x(src);
            let mut f = 2;
            while f < factor {
                out = scale2x(&out);
                f *= 2;
            }
            out
        }
    }
}

fn nearest(src: &Image, factor: u32) -> Image {
    let f = factor as usize;
    let (w, h) = (src.width as usize, src.height as usize);
    let mut out = blank(w * f, h * f);
    for y in 0..h * f {
        for x in 0..w * f {
            put(&mut out, x, y, px(src, (x / f) as i32, (y / f) as i32));
        }
    }
    out
}

fn smooth(src: &Image, factor: u32) -> Image {
    let f = factor as f32;
    let (w, h) = (src.width as usize, src.height as usize);
    let mut out = blank(w * factor as usize, h * factor as usize);
    for y in 0..h * factor as usize {
        let sy = ((y as f32 + 0.5) / f - 0.5).max(0.0);
        let y0 = sy.floor() as i32;
        let ty = sy - y0 as f32;
        for x in 0..w * factor as usize {
            let sx = ((x as f32 + 0.5) / f - 0.5).max(0.0);
            let x0 = sx.floor() as i32;
            let tx = sx - x0 as f32;

            let a = px(src, x0, y0);
            let b = px(src, x0 + 1, y0);
            let c = px(src, x0, y0 + 1);
            let d = px(src, x0 + 1, y0 + 1);
            let mut p = [0u8; 4];
            for ch in 0..4 {
                let top = a[ch] as f32 * (1.0 - tx) + b[ch] as f32 * tx;
                let bottom = c[ch] as f32 * (1.0 - tx) + d[ch] as f32 * tx;
                p[ch] = (top * (1.0 - ty) + bottom * ty).round() as u8;
            }
            put(&mut out, x, y, p);
        }
    }
    out
}

fn scale2x(src: &Image) -> Image {
    let (w, h) = (src.width as usize, src.height as usize);
    let mut out = blank(w * 2, h * 2);
    for y in 0..h {
        for x in 0..w {
            let (xi, yi) = (x as i32, y as i32);
            let p = px(src, xi, yi);
            let a = px(src, xi, yi - 1);
            let b = px(src, xi + 1, yi);
            let c = px(src, xi - 1, yi);
            let d = px(src, xi, yi + 1);

            let e0 = if c == a && c != d && a != b { a } else { p };
            let e1 = if a == b && a != c && b != d { b } else { p };
            let e2 = if d == c && d != b && c != a { c } else { p };
            let e3 = if b == d && b != a && d != c { d } else { p };

            put(&mut out, x * 2, y * 2, e0);
            put(&mut out, x * 2 + 1, y * 2, e1);
            put(&mut out, x * 2, y * 2 + 1, e2);
            put(&mut out, x * 2 + 1, y * 2 + 1, e3);
        }
    }
    out
}
