//! Tile layer payload decoding: CSV and base64 + zlib.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use flate2::read::ZlibDecoder;
use std::io::Read;

use crate::error::MapError;
use crate::ir_map::LayerEncoding;

/// Map the `encoding`/`compression` attribute pair onto a supported encoding.
pub fn resolve_encoding(
    layer: &str,
    encoding: Option<&str>,
    compression: Option<&str>,
) -> Result<LayerEncoding, MapError> {
    match (encoding.unwrap_or(""), compression.unwrap_or("")) {
        ("csv", "") => Ok(LayerEncoding::Csv),
        ("base64", "zlib") => Ok(LayerEncoding::Base64Zlib),
        (e, c) => Err(MapError::UnsupportedEncoding {
            layer: layer.to_owned(),
            encoding: if e.is_empty() { "none".into() } else { e.into() },
            compression: if c.is_empty() { "none".into() } else { c.into() },
        }),
    }
}

/// Decode a layer payload to raw GIDs.
pub fn decode_layer_data(layer: &str, encoding: &LayerEncoding, payload: &str) -> Result<Vec<u32>, MapError> {
    match encoding {
        LayerEncoding::Csv => decode_csv(layer, payload),
        LayerEncoding::Base64Zlib => decode_base64_zlib(layer, payload),
    }
}

/// Parse comma and whitespace separated tile indices.
pub fn decode_csv(layer: &str, payload: &str) -> Result<Vec<u32>, MapError> {
    payload
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|tok| !tok.is_empty())
        .map(|tok| {
            tok.parse::<u32>().map_err(|e| MapError::InvalidLayerData {
                layer: layer.to_owned(),
                message: format!("bad tile index '{tok}': {e}"),
            })
        })
        .collect()
}

/// Base64-decode and inflate a payload of little-endian `u32`s.
pub fn decode_base64_zlib(layer: &str, payload: &str) -> Result<Vec<u32>, MapError> {
    let invalid = |message: String| MapError::InvalidLayerData {
        layer: layer.to_owned(),
        message,
    };

    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    let compressed = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| invalid(format!("base64: {e}")))?;

    let mut raw = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut raw)
        .map_err(|e| invalid(format!("zlib: {e}")))?;

    if raw.len() % 4 != 0 {
        return Err(invalid(format!(
            "{} decompressed bytes is not a whole number of u32s",
            raw.len()
        )));
    }

    Ok(raw
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
pub(crate) fn encode_base64_zlib(data: &[u32]) -> String {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
    for v in data {
        enc.write_all(&v.to_le_bytes()).expect("write to Vec");
    }
    STANDARD.encode(enc.finish().expect("finish zlib"))
}
