//! Map file decoders producing an [`IrMap`].

/// Layer payload decoding.
pub mod encoding;
/// Tiled JSON maps.
pub mod json_loader;
/// Tiled TMX maps.
pub mod tmx_loader;

use std::path::Path;

use crate::config::LoadOptions;
use crate::error::MapError;
use crate::ir_map::IrMap;

/// Decode a `.tmx` or `.json` map into the intermediate representation.
pub fn decode_map_file_to_ir(path: &Path, options: &LoadOptions) -> Result<IrMap, MapError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tmx") => tmx_loader::decode_tmx_file(path, options),
        Some(ext) if ext.eq_ignore_ascii_case("json") => json_loader::decode_json_file(path, options),
        _ => Err(MapError::UnsupportedFormat(path.display().to_string())),
    }
}
