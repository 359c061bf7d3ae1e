//! Error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a map, its tilesets or their images.
#[derive(Debug, Error)]
pub enum MapError {
    /// File I/O error
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// TMX/TSX parse error
    #[error("failed to parse XML in {path}: {source}")]
    Xml {
        /// Map or tileset file.
        path: PathBuf,
        /// Parser error, with position.
        #[source]
        source: roxmltree::Error,
    },
    /// Tiled JSON parse error
    #[error("failed to parse JSON in {path}: {source}")]
    Json {
        /// Map or tileset file.
        path: PathBuf,
        /// Parser error, with position.
        #[source]
        source: serde_json::Error,
    },
    /// An image could not be decoded
    #[error("failed to decode image {path}: {message}")]
    Image {
        /// Image file.
        path: PathBuf,
        /// Decoder message.
        message: String,
    },
    /// Structurally valid file that does not describe a usable map
    #[error("invalid map: {0}")]
    InvalidMap(String),
    /// Map file with an extension other than `.tmx` or `.json`
    #[error("unsupported map file format: {0}")]
    UnsupportedFormat(String),
    /// Layer data encoding/compression pair that cannot be decoded
    #[error("layer '{layer}' uses unsupported encoding '{encoding}' with compression '{compression}'")]
    UnsupportedEncoding {
        /// Layer name.
        layer: String,
        /// `encoding` attribute, or `none`.
        encoding: String,
        /// `compression` attribute, or `none`.
        compression: String,
    },
    /// Layer payload that could not be decoded into tile indices
    #[error("layer '{layer}' has malformed data: {message}")]
    InvalidLayerData {
        /// Layer name.
        layer: String,
        /// What went wrong.
        message: String,
    },
    /// A layer's data length does not match width * height
    #[error("layer '{layer}' has {actual} tiles, expected {expected}")]
    InvalidLayerSize {
        /// Layer name.
        layer: String,
        /// `width * height`.
        expected: usize,
        /// Tiles actually decoded.
        actual: usize,
    },
    /// A layer references a tile past the end of the combined tile list
    #[error("layer '{layer}' references tile {gid}, but only {tile_count} tiles are loaded")]
    InvalidTileGid {
        /// Layer name.
        layer: String,
        /// Offending tile index, flip flags removed.
        gid: u32,
        /// Tiles loaded across all tilesets.
        tile_count: u32,
    },
    /// The loader was asked for a single layer map and found more
    #[error("map has {count} layers, only one is supported")]
    MultipleLayers {
        /// Tile layers found.
        count: usize,
    },
}

/// Errors raised when configuring a [`TileCamera`](crate::TileCamera).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CameraError {
    /// A scale factor of 0
    #[error("scale factor must be at least 1")]
    ZeroScale,
    /// The algorithm cannot produce this factor
    #[error("{algorithm:?} scaling cannot produce a {factor}x image")]
    UnsupportedScale {
        /// Requested factor.
        factor: u32,
        /// Requested algorithm.
        algorithm: crate::ScaleAlgorithm,
    },
}

/// Errors raised while building or driving an [`AnimatedSprite`](crate::AnimatedSprite).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpriteError {
    /// The sheet cannot hold the LPC layout
    #[error("sprite sheet is {width}x{height}, layout needs at least {needed_width}x{needed_height}")]
    SheetTooSmall {
        /// Sheet width in pixels.
        width: u32,
        /// Sheet height in pixels.
        height: u32,
        /// Smallest usable width.
        needed_width: u32,
        /// Smallest usable height.
        needed_height: u32,
    },
    /// An animation or facing name that does not exist
    #[error("unknown {kind} name '{name}'")]
    UnknownName {
        /// `animation` or `facing`.
        kind: &'static str,
        /// The name given.
        name: String,
    },
}

/// Errors raised while reading a [`Config`](crate::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Config file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Config is not valid JSON for [`Config`](crate::Config)
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    /// A value is out of range
    #[error("invalid config: {0}")]
    Invalid(String),
}
