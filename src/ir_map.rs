use std::path::PathBuf;

/// Canonical, format-agnostic map.
#[derive(Debug, Clone)]
pub struct IrMap {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Tile width in pixels.
    pub tile_w: u32,
    /// Tile height in pixels.
    pub tile_h: u32,
    /// Tilesets; load order defines global tile indices.
    pub tilesets: Vec<IrTileset>,
    /// Tile layers in draw order.
    pub layers: Vec<IrLayer>,
}

/// One image atlas with a regular grid.
#[derive(Debug, Clone)]
pub struct IrTileset {
    /// Tileset name, for diagnostics.
    pub name: String,
    /// `firstgid` as written in the file.
    pub first_gid: u32,
    /// Already resolved against the tileset (or map) file location.
    pub image: PathBuf,
    /// Pixels between cells.
    pub spacing: u32,
    /// Pixels around the sheet edge.
    pub margin: u32,
}

/// How a layer's raw payload is encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerEncoding {
    /// Comma/whitespace separated unsigned integers.
    Csv,
    /// Base64 of zlib-compressed little-endian u32s.
    Base64Zlib,
}

/// One decoded tile layer.
#[derive(Debug, Clone)]
pub struct IrLayer {
    /// Layer name, used for lookups.
    pub name: String,
    /// Layer width in tiles.
    pub width: u32,
    /// Layer height in tiles.
    pub height: u32,
    /// Decoded GIDs, flip flags included.
    pub data: Vec<u32>,
}
