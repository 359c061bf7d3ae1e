use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::atlas::{load_image, TileAtlas, TileImage};
use crate::config::LoadOptions;
use crate::error::MapError;
use crate::ir_map::IrMap;
use crate::loader::decode_map_file_to_ir;
use crate::spatial::{grid_index, TilePos, GID_MASK};

/// One named grid of tile indices, row-major, 0 meaning "no tile".
#[derive(Debug, Clone)]
pub struct TileLayer {
    /// Layer name as written in the map file.
    pub name: String,
    data: Vec<u32>,
}

impl TileLayer {
    /// Tile indices, row-major.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }
}

/// A loaded, validated and immutable tile map.
pub struct TileMap {
    width: u32,
    height: u32,
    tile_w: u32,
    tile_h: u32,
    layers: Vec<TileLayer>,
    layer_lut: HashMap<String, usize>,
    /// Slot 0 is always empty.
    tiles: Vec<Option<TileImage>>,
}

impl TileMap {
    /// Load a `.tmx` or `.json` map, its tilesets and their images.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MapError> {
        Self::load_with(path, &LoadOptions::default())
    }

    /// [`load`](Self::load) with explicit loader options.
    pub fn load_with(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Self, MapError> {
        let ir = decode_map_file_to_ir(path.as_ref(), options)?;
        Self::from_ir(ir)
    }

    /// Build from an intermediate map, reading tileset images from disk.
    pub fn from_ir(ir: IrMap) -> Result<Self, MapError> {
        Self::from_ir_with(ir, load_image)
    }

    /// Build from an intermediate map, resolving tileset images through `load`.
    pub fn from_ir_with<F>(ir: IrMap, mut load: F) -> Result<Self, MapError>
    where
        F: FnMut(&Path) -> Result<Image, MapError>,
    {
        if ir.tile_w == 0 || ir.tile_h == 0 {
            return Err(MapError::InvalidMap(format!(
                "tile size must be non-zero, got {}x{}",
                ir.tile_w, ir.tile_h
            )));
        }

        let mut tiles: Vec<Option<TileImage>> = vec![None];

        for ts in &ir.tilesets {
            let next_gid = tiles.len() as u32;
            if ts.first_gid != next_gid {
                warn!(
                    tileset = %ts.name,
                    declared = ts.first_gid,
                    computed = next_gid,
                    "tileset firstgid disagrees with load order; using load order"
                );
            }

            let sheet = load(&ts.image)?;
            let atlas = TileAtlas::with_spacing(&sheet, ir.tile_w, ir.tile_h, ts.margin, ts.spacing);
            debug!(
                tileset = %ts.name,
                image = %ts.image.display(),
                columns = atlas.columns(),
                rows = atlas.rows(),
                first = next_gid,
                "sliced tileset"
            );
            tiles.extend(atlas.into_tiles().into_iter().map(Some));
        }

        let tile_count = tiles.len() as u32 - 1;
        let expected = ir.width as usize * ir.height as usize;
        let mut layers = Vec::with_capacity(ir.layers.len());
        let mut layer_lut = HashMap::with_capacity(ir.layers.len());

        for layer in ir.layers {
            if layer.width != ir.width || layer.height != ir.height || layer.data.len() != expected {
                return Err(MapError::InvalidLayerSize {
                    layer: layer.name,
                    expected,
                    actual: layer.data.len(),
                });
            }

            let mut data = layer.data;
            for gid in data.iter_mut() {
                *gid &= GID_MASK;
                if *gid > tile_count {
                    return Err(MapError::InvalidTileGid {
                        layer: layer.name,
                        gid: *gid,
                        tile_count,
                    });
                }
            }

            layer_lut.insert(layer.name.clone(), layers.len());
            layers.push(TileLayer {
                name: layer.name,
                data,
            });
        }

        debug!(
            width = ir.width,
            height = ir.height,
            tiles = tile_count,
            layers = layers.len(),
            "map ready"
        );

        Ok(Self {
            width: ir.width,
            height: ir.height,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            layers,
            layer_lut,
            tiles,
        })
    }

    /// Map size in tiles.
    #[inline]
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Width in tiles.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Tile size in pixels.
    #[inline]
    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_w, self.tile_h)
    }

    /// Whole map size in pixels.
    pub fn pixel_size(&self) -> Vec2 {
        vec2(
            (self.width * self.tile_w) as f32,
            (self.height * self.tile_h) as f32,
        )
    }

    /// Number of tile images, not counting the empty slot 0.
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.tiles.len() - 1
    }

    /// Layer names in draw order.
    pub fn layer_names(&self) -> impl Iterator<Item = &str> {
        self.layers.iter().map(|l| l.name.as_str())
    }

    /// Layer by name.
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layer_lut.get(name).map(|&i| &self.layers[i])
    }

    /// Whether `pos` lies on the map.
    #[inline]
    pub fn in_bounds(&self, pos: TilePos) -> bool {
        pos.in_bounds(self.width as i32, self.height as i32)
    }

    /// Tile index at `(x, y)` on `layer`; `None` for an unknown layer or a
    /// position off the map.
    pub fn get_tile_index(&self, layer: &str, x: i32, y: i32) -> Option<u32> {
        let layer = self.layer(layer)?;
        let idx = grid_index(TilePos::new(x, y), self.width, self.height)?;
        layer.data.get(idx).copied()
    }

    /// Image for a global tile index. Index 0 means "draw nothing".
    #[inline]
    pub fn get_tile_image(&self, index: u32) -> Option<&TileImage> {
        self.tiles.get(index as usize).and_then(Option::as_ref)
    }

    /// `true` when `layer` holds a non-zero tile at `pos`.
    pub fn is_blocked(&self, layer: &str, pos: TilePos) -> bool {
        self.get_tile_index(layer, pos.x, pos.y)
            .is_some_and(|idx| idx != 0)
    }
}
