//! Tiled map loading, a scrolling tile camera, tile triggers and tile-walking
//! LPC sprites for Macroquad.
//!
//! Maps come from Tiled `.tmx` (with external `.tsx` or embedded tilesets) or
//! `.json` files whose layers are stored as CSV or base64 + zlib. Everything
//! below the [`render::ScreenSurface`] works on CPU images, so maps, cameras and
//! entities can be exercised without opening a window.

#![warn(missing_docs)]

mod atlas;
mod camera;
mod config;
mod entity;
mod error;
mod input;
mod ir_map;
/// Map file decoders.
pub mod loader;
mod map;
/// Drawing targets.
pub mod render;
mod scale;
mod spatial;
mod sprite;
mod text;
mod ticker;
mod triggers;

pub use atlas::{crop, load_image, ImageKey, TileAtlas, TileImage};
pub use camera::TileCamera;
pub use config::{Config, LoadOptions, WalkConfig};
pub use entity::{BlockingLayer, Entity, StepEvent, Terrain, WalkState};
pub use error::{CameraError, ConfigError, MapError, SpriteError};
pub use input::DirectionInput;
pub use ir_map::{IrLayer, IrMap, IrTileset, LayerEncoding};
pub use map::{TileLayer, TileMap};
pub use render::{ScreenSurface, Surface, TextureCache, DEFAULT_MAX_IDLE_FRAMES};
pub use scale::{scale_image, ScaleAlgorithm};
pub use spatial::{
    grid_index, pixel_to_tile, tile_to_pixel, Direction, TilePos, FLIP_D, FLIP_H, FLIP_V, GID_MASK,
};
pub use sprite::{AnimatedSprite, Animation, Facing, CELL_H, CELL_W};
pub use text::{wrap_words, TextBox};
pub use ticker::Ticker;
pub use triggers::{TileCallback, Trigger, TriggerHandler, TriggerTable};
