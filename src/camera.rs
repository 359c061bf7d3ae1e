use macroquad::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::atlas::TileImage;
use crate::error::CameraError;
use crate::map::TileMap;
use crate::render::Surface;
use crate::scale::{scale_image, ScaleAlgorithm};
use crate::spatial::TilePos;

/// Extra ring of tiles drawn around the viewport so scrolling never shows seams.
const OVERDRAW: i32 = 1;

/// A window onto a [`TileMap`], centred on a tile, with smooth sub-tile scrolling.
pub struct TileCamera {
    map_w: i32,
    map_h: i32,
    tile_w: i32,
    tile_h: i32,

    // Co-ordinates are in *tiles*.
    x: i32,
    y: i32,
    tiles_wide: i32,
    tiles_high: i32,

    // Co-ordinates are in *pixels*.
    viewport: Rect,
    offset_x: i32,
    offset_y: i32,

    edge_tile: u32,

    scale: u32,
    algorithm: ScaleAlgorithm,
    scaled: HashMap<u32, TileImage>,
}

#[inline]
fn normalize(pos: &mut i32, offset: &mut i32, tile: i32) {
    *pos += *offset / tile;
    *offset %= tile;
}

fn scaled_tile<'a>(
    cache: &'a mut HashMap<u32, TileImage>,
    map: &TileMap,
    index: u32,
    factor: u32,
    algorithm: ScaleAlgorithm,
) -> Option<&'a TileImage> {
    match cache.entry(index) {
        Entry::Occupied(e) => Some(e.into_mut()),
        Entry::Vacant(v) => {
            let src = map.get_tile_image(index)?;
            let scaled = TileImage::new(scale_image(src.image(), factor, algorithm));
            Some(v.insert(scaled))
        }
    }
}

impl TileCamera {
    /// A camera for `map` at tile `(0, 0)` with an empty viewport and no scaling.
    pub fn new(map: &TileMap) -> Self {
        let (tile_w, tile_h) = map.tile_size();
        Self {
            map_w: map.width() as i32,
            map_h: map.height() as i32,
            tile_w: tile_w as i32,
            tile_h: tile_h as i32,
            x: 0,
            y: 0,
            tiles_wide: 0,
            tiles_high: 0,
            viewport: Rect::new(0.0, 0.0, 0.0, 0.0),
            offset_x: 0,
            offset_y: 0,
            edge_tile: 0,
            scale: 1,
            algorithm: ScaleAlgorithm::Nearest,
            scaled: HashMap::new(),
        }
    }

    /// Set the on-screen viewport (pixels). The number of whole tiles that fit is
    /// recomputed every call.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.recompute_tiles();
    }

    fn recompute_tiles(&mut self) {
        let (sw, sh) = self.scaled_tile_size();
        self.tiles_wide = (self.viewport.w.max(0.0) as i32) / sw;
        self.tiles_high = (self.viewport.h.max(0.0) as i32) / sh;
    }

    /// Centre the camera on tile `(x, y)`.
    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Centre tile.
    #[inline]
    pub fn position(&self) -> TilePos {
        TilePos::new(self.x, self.y)
    }

    /// Set the sub-tile scroll offset in pixels. Whole tiles roll into the
    /// position; the remainder keeps its sign.
    pub fn set_offset(&mut self, x: i32, y: i32) {
        self.offset_x = x;
        self.offset_y = y;
        normalize(&mut self.x, &mut self.offset_x, self.tile_w);
        normalize(&mut self.y, &mut self.offset_y, self.tile_h);
    }

    /// Accumulate onto the current offset, e.g. one pixel per scroll tick.
    pub fn add_offset(&mut self, dx: i32, dy: i32) {
        self.set_offset(self.offset_x + dx, self.offset_y + dy);
    }

    /// Normalized sub-tile offset in pixels.
    #[inline]
    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Tile drawn for every position outside the map; 0 draws nothing.
    pub fn set_edge(&mut self, edge_tile: u32) {
        self.edge_tile = edge_tile;
    }

    /// Draw tiles `factor` times larger. Clears the scaled tile cache.
    pub fn set_scale(&mut self, factor: u32, algorithm: ScaleAlgorithm) -> Result<(), CameraError> {
        if factor == 0 {
            return Err(CameraError::ZeroScale);
        }
        if !algorithm.supports(factor) {
            return Err(CameraError::UnsupportedScale { factor, algorithm });
        }
        self.scale = factor;
        self.algorithm = algorithm;
        self.scaled.clear();
        self.recompute_tiles();
        Ok(())
    }

    /// Current scale factor and algorithm.
    #[inline]
    pub fn scale(&self) -> (u32, ScaleAlgorithm) {
        (self.scale, self.algorithm)
    }

    /// Scaled tile images built since the last [`set_scale`](Self::set_scale).
    #[inline]
    pub fn cached_tiles(&self) -> usize {
        self.scaled.len()
    }

    /// Tile size on screen, scale included.
    #[inline]
    pub fn scaled_tile_size(&self) -> (i32, i32) {
        (self.tile_w * self.scale as i32, self.tile_h * self.scale as i32)
    }

    /// Whole tiles that fit the viewport.
    #[inline]
    pub fn tiles_in_view(&self) -> (i32, i32) {
        (self.tiles_wide, self.tiles_high)
    }

    /// Top-left tile of the visible range (before overdraw).
    #[inline]
    pub fn view_origin(&self) -> TilePos {
        TilePos::new(self.x - self.tiles_wide / 2, self.y - self.tiles_high / 2)
    }

    /// Half-open tile range `[start, end)` covered by the viewport, before overdraw.
    pub fn visible_tiles(&self) -> (TilePos, TilePos) {
        let start = self.view_origin();
        (start, TilePos::new(start.x + self.tiles_wide, start.y + self.tiles_high))
    }

    /// Screen position of the top-left corner of tile `pos`.
    pub fn tile_to_screen(&self, pos: TilePos) -> Vec2 {
        let origin = self.view_origin();
        let (sw, sh) = self.scaled_tile_size();
        let s = self.scale as i32;
        vec2(
            self.viewport.x + ((pos.x - origin.x) * sw - self.offset_x * s) as f32,
            self.viewport.y + ((pos.y - origin.y) * sh - self.offset_y * s) as f32,
        )
    }

    /// Screen rectangle of the camera's centre tile, ignoring the scroll offset.
    pub fn focus_rect(&self) -> Rect {
        let (sw, sh) = self.scaled_tile_size();
        Rect::new(
            self.viewport.x + ((self.tiles_wide / 2) * sw) as f32,
            self.viewport.y + ((self.tiles_high / 2) * sh) as f32,
            sw as f32,
            sh as f32,
        )
    }

    /// Draw one layer of `map` onto `surface`.
    pub fn draw<S: Surface + ?Sized>(&mut self, map: &TileMap, layer: &str, surface: &mut S) {
        let origin = self.view_origin();
        let (sw, sh) = self.scaled_tile_size();
        let s = self.scale as i32;
        let base_x = self.viewport.x - (self.offset_x * s) as f32;
        let base_y = self.viewport.y - (self.offset_y * s) as f32;

        for row in -OVERDRAW..self.tiles_high + OVERDRAW {
            for col in -OVERDRAW..self.tiles_wide + OVERDRAW {
                let pos = TilePos::new(origin.x + col, origin.y + row);
                let index = if pos.in_bounds(self.map_w, self.map_h) {
                    map.get_tile_index(layer, pos.x, pos.y).unwrap_or(0)
                } else {
                    self.edge_tile
                };
                if index == 0 {
                    continue;
                }

                let image = if self.scale == 1 {
                    map.get_tile_image(index)
                } else {
                    scaled_tile(&mut self.scaled, map, index, self.scale, self.algorithm)
                };
                if let Some(image) = image {
                    let dest = vec2(base_x + (col * sw) as f32, base_y + (row * sh) as f32);
                    surface.blit(image, dest);
                }
            }
        }
    }

    /// Draw every layer in file order.
    pub fn draw_all<S: Surface + ?Sized>(&mut self, map: &TileMap, surface: &mut S) {
        for name in map.layer_names() {
            self.draw(map, name, surface);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atlas::ImageKey;
    use crate::map::tests::{fake_images, ir};

    #[derive(Default)]
    struct Recorder {
        blits: Vec<(ImageKey, u32, Vec2)>,
    }

    impl Surface for Recorder {
        fn blit(&mut self, image: &TileImage, dest: Vec2) {
            self.blits.push((image.key(), image.width(), dest));
        }
    }

    fn map_3x3() -> TileMap {
        TileMap::from_ir_with(ir(3, 3, vec![("L", vec![1; 9])]), fake_images).expect("map")
    }

    fn camera(map: &TileMap) -> TileCamera {
        let mut cam = TileCamera::new(map);
        cam.set_viewport(Rect::new(0.0, 0.0, 24.0, 24.0));
        cam.set_position(1, 1);
        cam
    }

    fn key(map: &TileMap, index: u32) -> ImageKey {
        map.get_tile_image(index).map(TileImage::key).expect("tile")
    }

    #[test]
    fn viewport_uses_floor_division() {
        let map = map_3x3();
        let mut cam = TileCamera::new(&map);
        cam.set_viewport(Rect::new(0.0, 0.0, 31.0, 17.0));
        assert_eq!(cam.tiles_in_view(), (3, 2));
        cam.set_viewport(Rect::new(0.0, 0.0, 32.0, 24.0));
        assert_eq!(cam.tiles_in_view(), (4, 3));
        cam.set_position(10, 10);
        assert_eq!(cam.view_origin(), TilePos::new(8, 9));
        assert_eq!(cam.visible_tiles(), (TilePos::new(8, 9), TilePos::new(12, 12)));
    }

    #[test]
    fn substitutes_edge_tile_outside_the_map() {
        let map = map_3x3();
        let mut cam = camera(&map);
        cam.set_edge(2);

        let mut out = Recorder::default();
        cam.draw(&map, "L", &mut out);

        // 3x3 visible plus a one tile ring on every side
        assert_eq!(out.blits.len(), 25);
        let inside = out.blits.iter().filter(|b| b.0 == key(&map, 1)).count();
        let edge = out.blits.iter().filter(|b| b.0 == key(&map, 2)).count();
        assert_eq!((inside, edge), (9, 16));

        assert!(out
            .blits
            .iter()
            .any(|b| b.0 == key(&map, 1) && b.2 == vec2(0.0, 0.0)));
        assert!(out
            .blits
            .iter()
            .any(|b| b.0 == key(&map, 2) && b.2 == vec2(-8.0, -8.0)));
    }

    #[test]
    fn index_zero_draws_nothing() {
        let map = TileMap::from_ir_with(ir(2, 1, vec![("L", vec![0, 3])]), fake_images)
            .expect("map");
        let mut cam = TileCamera::new(&map);
        cam.set_viewport(Rect::new(0.0, 0.0, 16.0, 8.0));
        cam.set_position(1, 0);

        let mut out = Recorder::default();
        cam.draw(&map, "L", &mut out);
        assert_eq!(out.blits.len(), 1);
        assert_eq!(out.blits[0].0, key(&map, 3));
    }

    #[test]
    fn draw_all_draws_layers_in_file_order() {
        let map = TileMap::from_ir_with(
            ir(3, 3, vec![("ground", vec![1; 9]), ("walls", vec![2; 9])]),
            fake_images,
        )
        .expect("map");
        let mut cam = camera(&map);

        let mut out = Recorder::default();
        cam.draw_all(&map, &mut out);
        assert_eq!(out.blits.len(), 18);
        assert!(out.blits[..9].iter().all(|b| b.0 == key(&map, 1)));
        assert!(out.blits[9..].iter().all(|b| b.0 == key(&map, 2)));

        // a second frame repeats the same sequence
        let mut again = Recorder::default();
        cam.draw_all(&map, &mut again);
        assert_eq!(again.blits, out.blits);
    }

    #[test]
    fn offsets_summing_to_a_tile_advance_one_tile() {
        let map = map_3x3();
        let mut cam = camera(&map);

        cam.add_offset(3, 0);
        cam.add_offset(3, 0);
        assert_eq!((cam.position(), cam.offset()), (TilePos::new(1, 1), (6, 0)));
        cam.add_offset(2, 0);
        assert_eq!((cam.position(), cam.offset()), (TilePos::new(2, 1), (0, 0)));

        for _ in 0..8 {
            cam.add_offset(0, -1);
        }
        assert_eq!((cam.position(), cam.offset()), (TilePos::new(2, 0), (0, 0)));
    }

    #[test]
    fn set_offset_keeps_sign_of_the_remainder() {
        let map = map_3x3();
        let mut cam = camera(&map);
        cam.set_offset(20, -11);
        assert_eq!(cam.position(), TilePos::new(3, 0));
        assert_eq!(cam.offset(), (4, -3));
    }

    #[test]
    fn offset_shifts_every_blit() {
        let map = map_3x3();
        let mut cam = camera(&map);
        cam.set_offset(3, 0);

        let mut out = Recorder::default();
        cam.draw(&map, "L", &mut out);
        assert!(out.blits.iter().any(|b| b.2 == vec2(-3.0, 0.0)));
        assert_eq!(cam.tile_to_screen(TilePos::new(0, 0)), vec2(-3.0, 0.0));
    }

    #[test]
    fn drawing_never_changes_layer_data() {
        let map = TileMap::from_ir_with(
            ir(3, 2, vec![("L", vec![1, 2, 3, 4, 5, 6])]),
            fake_images,
        )
        .expect("map");
        let before: Vec<_> = (0..2)
            .flat_map(|y| (0..3).map(move |x| (x, y)))
            .map(|(x, y)| map.get_tile_index("L", x, y))
            .collect();

        let mut cam = camera(&map);
        cam.set_edge(7);
        let mut out = Recorder::default();
        for i in 0..5 {
            cam.add_offset(i, -i);
            cam.draw(&map, "L", &mut out);
        }

        let after: Vec<_> = (0..2)
            .flat_map(|y| (0..3).map(move |x| (x, y)))
            .map(|(x, y)| map.get_tile_index("L", x, y))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn scaled_tiles_are_cached_until_scale_changes() {
        let map = map_3x3();
        let mut cam = TileCamera::new(&map);
        cam.set_viewport(Rect::new(0.0, 0.0, 48.0, 48.0));
        cam.set_position(1, 1);
        cam.set_edge(2);
        cam.set_scale(2, ScaleAlgorithm::Nearest).expect("2x");
        assert_eq!(cam.tiles_in_view(), (3, 3));

        let mut out = Recorder::default();
        cam.draw(&map, "L", &mut out);
        cam.draw(&map, "L", &mut out);
        assert_eq!(cam.cached_tiles(), 2);
        assert!(out.blits.iter().all(|b| b.1 == 16));
        assert!(out.blits.iter().any(|b| b.2 == vec2(16.0, 16.0)));

        // Same cached image reused across frames.
        let first = out.blits[0].0;
        assert_eq!(out.blits.iter().filter(|b| b.0 == first).count() % 2, 0);

        cam.set_scale(2, ScaleAlgorithm::Smooth).expect("smooth");
        assert_eq!(cam.cached_tiles(), 0);
    }

    #[test]
    fn rejects_unsupported_scales() {
        let map = map_3x3();
        let mut cam = TileCamera::new(&map);
        assert_eq!(cam.set_scale(0, ScaleAlgorithm::Nearest), Err(CameraError::ZeroScale));
        assert_eq!(
            cam.set_scale(3, ScaleAlgorithm::Scale2x),
            Err(CameraError::UnsupportedScale {
                factor: 3,
                algorithm: ScaleAlgorithm::Scale2x
            })
        );
        assert_eq!(cam.scale(), (1, ScaleAlgorithm::Nearest));
    }

    #[test]
    fn focus_rect_is_the_centre_tile() {
        let map = map_3x3();
        let cam = camera(&map);
        assert_eq!(cam.focus_rect(), Rect::new(8.0, 8.0, 8.0, 8.0));
    }
}
