//! Tiled JSON maps and `.tsj`/`.json` tilesets.
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::encoding::{decode_layer_data, resolve_encoding};
use crate::config::LoadOptions;
use crate::error::MapError;
use crate::ir_map::*;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLayerData {
    Plain(Vec<u32>),
    Encoded(String),
}

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Option<JsonLayerData>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    compression: Option<String>,
}

#[derive(Deserialize)]
struct JsonTilesetRef {
    #[serde(default = "one")]
    firstgid: u32,
    #[serde(default)]
    source: Option<String>,
    #[serde(flatten)]
    inline: InlineTileset,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize, Default)]
struct InlineTileset {
    #[serde(default)]
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
}

#[derive(Deserialize)]
struct JsonMap {
    width: u32,
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTilesetRef>,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, MapError> {
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&txt).map_err(|source| MapError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn tileset_to_ir(ts: JsonTilesetRef, map_dir: &Path) -> Result<IrTileset, MapError> {
    let (inline, base_dir, origin) = match &ts.source {
        Some(source) => {
            if !source.ends_with(".json") {
                return Err(MapError::InvalidMap(format!(
                    "External tileset must be JSON: {source}"
                )));
            }
            let ts_path = map_dir.join(source);
            let ext: InlineTileset = read_json(&ts_path)?;
            let ts_dir = ts_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| map_dir.to_path_buf());
            (ext, ts_dir, source.clone())
        }
        None => (ts.inline, map_dir.to_path_buf(), "<embedded>".to_owned()),
    };

    let image = inline
        .image
        .ok_or_else(|| MapError::InvalidMap(format!("tileset {origin} has no image")))?;

    Ok(IrTileset {
        name: inline.name,
        first_gid: ts.firstgid,
        image: base_dir.join(image),
        spacing: inline.spacing,
        margin: inline.margin,
    })
}

fn layer_to_ir(l: JsonLayer, map_w: u32, map_h: u32) -> Result<Option<IrLayer>, MapError> {
    if l.kind.as_deref().unwrap_or("tilelayer") != "tilelayer" {
        debug!(layer = %l.name, kind = ?l.kind, "skipping non-tile layer");
        return Ok(None);
    }

    let data = match l.data {
        None => Vec::new(),
        Some(JsonLayerData::Plain(data)) => {
            // A plain array is only valid for csv (or absent) encoding.
            resolve_encoding(
                &l.name,
                Some(l.encoding.as_deref().unwrap_or("csv")),
                l.compression.as_deref(),
            )?;
            data
        }
        Some(JsonLayerData::Encoded(payload)) => {
            let encoding =
                resolve_encoding(&l.name, l.encoding.as_deref(), l.compression.as_deref())?;
            decode_layer_data(&l.name, &encoding, &payload)?
        }
    };

    Ok(Some(IrLayer {
        width: l.width.unwrap_or(map_w),
        height: l.height.unwrap_or(map_h),
        name: l.name,
        data,
    }))
}

/// Decode Tiled JSON text. `map_path` locates external tilesets and images.
pub fn decode_json_str(txt: &str, map_path: &Path, options: &LoadOptions) -> Result<IrMap, MapError> {
    let j: JsonMap = serde_json::from_str(txt).map_err(|source| MapError::Json {
        path: map_path.to_path_buf(),
        source,
    })?;
    if j.tilewidth == 0 || j.tileheight == 0 {
        return Err(MapError::InvalidMap("tile size must be non-zero".into()));
    }

    let map_dir = map_path
        .parent()
        .map(|d| d.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./"));

    let tilesets = j
        .tilesets
        .into_iter()
        .map(|ts| tileset_to_ir(ts, &map_dir))
        .collect::<Result<Vec<_>, _>>()?;

    let mut layers = Vec::with_capacity(j.layers.len());
    for l in j.layers {
        if let Some(layer) = layer_to_ir(l, j.width, j.height)? {
            layers.push(layer);
        }
    }
    if options.single_layer && layers.len() > 1 {
        return Err(MapError::MultipleLayers {
            count: layers.len(),
        });
    }

    debug!(
        path = %map_path.display(),
        width = j.width,
        height = j.height,
        tilesets = tilesets.len(),
        layers = layers.len(),
        "decoded json map"
    );

    Ok(IrMap {
        width: j.width,
        height: j.height,
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        tilesets,
        layers,
    })
}

/// Read and decode a Tiled JSON map.
pub fn decode_json_file(path: &Path, options: &LoadOptions) -> Result<IrMap, MapError> {
    let txt = std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_json_str(&txt, path, options)
}
