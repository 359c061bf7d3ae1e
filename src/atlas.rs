use macroquad::prelude::*;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::MapError;

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`TileImage`]; render back-ends cache textures by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageKey(u64);

/// An RGBA image cut out of a sheet (or derived from one by scaling).
#[derive(Clone)]
pub struct TileImage {
    key: ImageKey,
    image: Image,
}

impl TileImage {
    /// Wrap `image` under a fresh key.
    pub fn new(image: Image) -> Self {
        Self {
            key: ImageKey(NEXT_KEY.fetch_add(1, Ordering::Relaxed)),
            image,
        }
    }

    /// Identity used by texture caches.
    #[inline]
    pub fn key(&self) -> ImageKey {
        self.key
    }

    /// The pixels.
    #[inline]
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width as u32
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height as u32
    }
}

impl fmt::Debug for TileImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileImage")
            .field("key", &self.key)
            .field("width", &self.image.width)
            .field("height", &self.image.height)
            .finish()
    }
}

/// Copy a `w`x`h` rectangle starting at `(x, y)` out of `src`.
///
/// The rectangle must lie inside `src`.
pub fn crop(src: &Image, x: u32, y: u32, w: u32, h: u32) -> Image {
    let src_w = src.width as usize;
    let mut bytes = Vec::with_capacity(w as usize * h as usize * 4);
    for row in y as usize..(y + h) as usize {
        let start = (row * src_w + x as usize) * 4;
        bytes.extend_from_slice(&src.bytes[start..start + w as usize * 4]);
    }
    Image {
        bytes,
        width: w as u16,
        height: h as u16,
    }
}

/// Decode a PNG (or any format Macroquad understands) from disk.
pub fn load_image(path: &Path) -> Result<Image, MapError> {
    let bytes = std::fs::read(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Image::from_file_with_format(&bytes, None).map_err(|e| MapError::Image {
        path: path.to_path_buf(),
        message: format!("{e:?}"),
    })
}

/// An image sliced into a regular grid of equally sized cells.
pub struct TileAtlas {
    tiles: Vec<TileImage>,
    columns: u32,
    rows: u32,
    tile_w: u32,
    tile_h: u32,
}

impl TileAtlas {
    /// Slice `sheet` into `tile_w` x `tile_h` cells with no margin or spacing.
    pub fn new(sheet: &Image, tile_w: u32, tile_h: u32) -> Self {
        Self::with_spacing(sheet, tile_w, tile_h, 0, 0)
    }

    /// Slice `sheet` into cells in row-major order, skipping `margin` pixels
    /// around the edge and `spacing` pixels between cells. Partial cells are dropped.
    pub fn with_spacing(sheet: &Image, tile_w: u32, tile_h: u32, margin: u32, spacing: u32) -> Self {
        let fit = |size: u32, cell: u32| {
            let usable = size.saturating_sub(2 * margin) + spacing;
            if cell == 0 {
                0
            } else {
                usable / (cell + spacing)
            }
        };
        let columns = fit(sheet.width as u32, tile_w);
        let rows = fit(sheet.height as u32, tile_h);

        let mut tiles = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            for col in 0..columns {
                let sx = margin + col * (tile_w + spacing);
                let sy = margin + row * (tile_h + spacing);
                tiles.push(TileImage::new(crop(sheet, sx, sy, tile_w, tile_h)));
            }
        }

        Self {
            tiles,
            columns,
            rows,
            tile_w,
            tile_h,
        }
    }

    /// Cells per row.
    #[inline]
    pub fn columns(&self) -> u32 {
        self.columns
    }

    /// Rows of cells.
    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Cell size in pixels.
    #[inline]
    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_w, self.tile_h)
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// `true` when the sheet was smaller than one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Cell at `(column, row)`, if inside the grid.
    pub fn get(&self, column: u32, row: u32) -> Option<&TileImage> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.tiles.get((row * self.columns + column) as usize)
    }

    /// Cell by row-major index.
    #[inline]
    pub fn get_index(&self, index: usize) -> Option<&TileImage> {
        self.tiles.get(index)
    }

    /// Cells in row-major order.
    pub fn into_tiles(self) -> Vec<TileImage> {
        self.tiles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x2 cells of 2x2 px; each cell filled with its linear index in the red channel.
    fn numbered_sheet() -> Image {
        let (w, h) = (8u32, 4u32);
        let mut bytes = vec![0u8; (w * h * 4) as usize];
        for y in 0..h {
            for x in 0..w {
                let idx = (y / 2) * 4 + x / 2;
                let p = ((y * w + x) * 4) as usize;
                bytes[p] = idx as u8;
                bytes[p + 3] = 255;
            }
        }
        Image {
            bytes,
            width: w as u16,
            height: h as u16,
        }
    }

    #[test]
    fn slices_cells_in_row_major_order() {
        let atlas = TileAtlas::new(&numbered_sheet(), 2, 2);
        assert_eq!((atlas.columns(), atlas.rows()), (4, 2));
        assert_eq!(atlas.len(), 8);
        for i in 0..8 {
            let tile = atlas.get_index(i).expect("tile");
            assert_eq!(tile.width(), 2);
            assert!(tile.image().bytes.chunks(4).all(|px| px[0] == i as u8));
        }
        assert_eq!(atlas.get(1, 1).map(|t| t.image().bytes[0]), Some(5));
        assert!(atlas.get(4, 0).is_none());
    }

    #[test]
    fn drops_partial_cells() {
        let atlas = TileAtlas::new(&numbered_sheet(), 3, 3);
        assert_eq!((atlas.columns(), atlas.rows()), (2, 1));
    }

    #[test]
    fn honours_margin_and_spacing() {
        // 1px margin, 1px spacing, 2px cells: 1 + 2 + 1 + 2 + 1 = 7
        let sheet = Image {
            bytes: vec![0; 7 * 7 * 4],
            width: 7,
            height: 7,
        };
        let atlas = TileAtlas::with_spacing(&sheet, 2, 2, 1, 1);
        assert_eq!((atlas.columns(), atlas.rows()), (2, 2));
    }

    #[test]
    fn every_tile_gets_its_own_key() {
        let atlas = TileAtlas::new(&numbered_sheet(), 2, 2);
        let a = atlas.get_index(0).map(TileImage::key);
        let b = atlas.get_index(1).map(TileImage::key);
        assert_ne!(a, b);
    }
}
