//! TMX/TSX (Tiled XML) front end.
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::encoding::{decode_layer_data, resolve_encoding};
use crate::config::LoadOptions;
use crate::error::MapError;
use crate::ir_map::*;

fn read_file(path: &Path) -> Result<String, MapError> {
    std::fs::read_to_string(path).map_err(|source| MapError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_u32_attr(node: Node, name: &str) -> Result<u32, MapError> {
    let raw = node.attribute(name).ok_or_else(|| {
        MapError::InvalidMap(format!(
            "<{}> is missing attribute '{name}'",
            node.tag_name().name()
        ))
    })?;
    raw.trim().parse().map_err(|_| {
        MapError::InvalidMap(format!(
            "<{}> attribute '{name}' is not an unsigned integer: '{raw}'",
            node.tag_name().name()
        ))
    })
}

fn optional_u32_attr(node: Node, name: &str) -> Result<Option<u32>, MapError> {
    match node.attribute(name) {
        Some(_) => parse_u32_attr(node, name).map(Some),
        None => Ok(None),
    }
}

fn child<'a, 'i>(node: Node<'a, 'i>, tag: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name(tag))
}

/// Tileset attributes live either on an embedded `<tileset>` or on the root of a TSX file.
fn tileset_from_node(
    ts: Node,
    first_gid: u32,
    base_dir: &Path,
    origin: &Path,
) -> Result<IrTileset, MapError> {
    let image = child(ts, "image").ok_or_else(|| {
        MapError::InvalidMap(format!("tileset in {} has no <image>", origin.display()))
    })?;
    let source = image.attribute("source").ok_or_else(|| {
        MapError::InvalidMap(format!("tileset image in {} has no source", origin.display()))
    })?;

    Ok(IrTileset {
        name: ts.attribute("name").unwrap_or_default().to_owned(),
        first_gid,
        image: base_dir.join(source),
        spacing: optional_u32_attr(ts, "spacing")?.unwrap_or(0),
        margin: optional_u32_attr(ts, "margin")?.unwrap_or(0),
    })
}

fn load_tileset(tileset_ref: Node, map_dir: &Path, map_path: &Path) -> Result<IrTileset, MapError> {
    let first_gid = optional_u32_attr(tileset_ref, "firstgid")?.unwrap_or(1);

    let Some(source) = tileset_ref.attribute("source") else {
        return tileset_from_node(tileset_ref, first_gid, map_dir, map_path);
    };

    let ts_path = map_dir.join(source);
    let txt = read_file(&ts_path)?;
    let doc = Document::parse(&txt).map_err(|source| MapError::Xml {
        path: ts_path.clone(),
        source,
    })?;
    let root = doc.root_element();
    if !root.has_tag_name("tileset") {
        return Err(MapError::InvalidMap(format!(
            "{} is not a TSX tileset",
            ts_path.display()
        )));
    }

    // Image paths inside a TSX are relative to the TSX itself.
    let ts_dir = ts_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| map_dir.to_path_buf());
    tileset_from_node(root, first_gid, &ts_dir, &ts_path)
}

fn decode_layer(layer: Node, map_w: u32, map_h: u32) -> Result<IrLayer, MapError> {
    let name = layer.attribute("name").unwrap_or_default().to_owned();
    let data = child(layer, "data").ok_or_else(|| {
        MapError::InvalidMap(format!("layer '{name}' has no <data>"))
    })?;

    let encoding = resolve_encoding(&name, data.attribute("encoding"), data.attribute("compression"))?;
    let payload = data.text().unwrap_or_default();
    let tiles = decode_layer_data(&name, &encoding, payload)?;

    Ok(IrLayer {
        width: optional_u32_attr(layer, "width")?.unwrap_or(map_w),
        height: optional_u32_attr(layer, "height")?.unwrap_or(map_h),
        name,
        data: tiles,
    })
}

/// Parse TMX text. `map_path` locates external tilesets and is used in errors.
pub fn decode_tmx_str(txt: &str, map_path: &Path, options: &LoadOptions) -> Result<IrMap, MapError> {
    let doc = Document::parse(txt).map_err(|source| MapError::Xml {
        path: map_path.to_path_buf(),
        source,
    })?;
    let root = doc.root_element();
    if !root.has_tag_name("map") {
        return Err(MapError::InvalidMap(format!(
            "root element of {} is <{}>, expected <map>",
            map_path.display(),
            root.tag_name().name()
        )));
    }

    let width = parse_u32_attr(root, "width")?;
    let height = parse_u32_attr(root, "height")?;
    let tile_w = parse_u32_attr(root, "tilewidth")?;
    let tile_h = parse_u32_attr(root, "tileheight")?;
    if tile_w == 0 || tile_h == 0 {
        return Err(MapError::InvalidMap("tile size must be non-zero".into()));
    }

    let map_dir = map_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("./"));

    let tilesets = root
        .children()
        .filter(|n| n.has_tag_name("tileset"))
        .map(|ts| load_tileset(ts, &map_dir, map_path))
        .collect::<Result<Vec<_>, _>>()?;

    let layer_nodes: Vec<_> = root.children().filter(|n| n.has_tag_name("layer")).collect();
    if options.single_layer && layer_nodes.len() > 1 {
        return Err(MapError::MultipleLayers {
            count: layer_nodes.len(),
        });
    }
    let layers = layer_nodes
        .into_iter()
        .map(|l| decode_layer(l, width, height))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        path = %map_path.display(),
        width,
        height,
        tilesets = tilesets.len(),
        layers = layers.len(),
        "decoded tmx"
    );

    Ok(IrMap {
        width,
        height,
        tile_w,
        tile_h,
        tilesets,
        layers,
    })
}

/// Read and decode a TMX map and any external TSX tilesets.
pub fn decode_tmx_file(path: &Path, options: &LoadOptions) -> Result<IrMap, MapError> {
    let txt = read_file(path)?;
    decode_tmx_str(&txt, path, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::encoding::encode_base64_zlib;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock went backwards")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("mq_tilewalk_tmx_{nanos}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    const TSX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tileset version="1.10" name="terrain" tilewidth="16" tileheight="16" tilecount="4" columns="2" spacing="1" margin="2">
 <image source="art/terrain.png" width="36" height="36"/>
</tileset>"#;

    #[test]
    fn decodes_csv_and_zlib_layers_with_external_tileset() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("sets")).expect("mkdir");
        fs::write(dir.join("sets/terrain.tsx"), TSX).expect("write tsx");

        let packed = encode_base64_zlib(&[0, 0, 3, 0, 0, 4]);
        let tmx = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="3" height="2" tilewidth="16" tileheight="16">
 <tileset firstgid="1" source="sets/terrain.tsx"/>
 <layer id="1" name="Ground" width="3" height="2">
  <data encoding="csv">
1,2,1,
2,1,2
</data>
 </layer>
 <layer id="2" name="Unwalkable" width="3" height="2">
  <data encoding="base64" compression="zlib">
   {packed}
  </data>
 </layer>
</map>"#
        );
        let map_path = dir.join("map.tmx");
        fs::write(&map_path, tmx).expect("write tmx");

        let ir = decode_tmx_file(&map_path, &LoadOptions::default()).expect("decode");
        assert_eq!((ir.width, ir.height, ir.tile_w, ir.tile_h), (3, 2, 16, 16));
        assert_eq!(ir.layers.len(), 2);
        assert_eq!(ir.layers[0].name, "Ground");
        assert_eq!(ir.layers[0].data, vec![1, 2, 1, 2, 1, 2]);
        assert_eq!(ir.layers[1].data, vec![0, 0, 3, 0, 0, 4]);

        let ts = &ir.tilesets[0];
        assert_eq!(ts.name, "terrain");
        assert_eq!(ts.image, dir.join("sets").join("art/terrain.png"));
        assert_eq!((ts.spacing, ts.margin), (1, 2));
    }

    #[test]
    fn embedded_tileset_image_is_relative_to_map() {
        let dir = temp_dir();
        let tmx = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
 <tileset firstgid="1" name="inline" tilewidth="8" tileheight="8">
  <image source="inline.png"/>
 </tileset>
 <layer name="L"><data encoding="csv">1</data></layer>
</map>"#;
        let map_path = dir.join("m.tmx");
        let ir = decode_tmx_str(tmx, &map_path, &LoadOptions::default()).expect("decode");
        assert_eq!(ir.tilesets[0].image, dir.join("inline.png"));
        assert_eq!((ir.layers[0].width, ir.layers[0].height), (1, 1));
    }

    #[test]
    fn rejects_unsupported_encoding() {
        let tmx = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
 <layer name="L"><data encoding="base64" compression="gzip">AAAA</data></layer>
</map>"#;
        let err = decode_tmx_str(tmx, Path::new("m.tmx"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            MapError::UnsupportedEncoding { ref layer, ref compression, .. } if layer == "L" && compression == "gzip"
        ));
    }

    #[test]
    fn single_layer_option_rejects_extra_layers() {
        let tmx = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
 <layer name="A"><data encoding="csv">0</data></layer>
 <layer name="B"><data encoding="csv">0</data></layer>
</map>"#;
        let opts = LoadOptions { single_layer: true };
        let err = decode_tmx_str(tmx, Path::new("m.tmx"), &opts).unwrap_err();
        assert!(matches!(err, MapError::MultipleLayers { count: 2 }));

        let ir = decode_tmx_str(tmx, Path::new("m.tmx"), &LoadOptions::default()).expect("multi");
        assert_eq!(ir.layers.len(), 2);
    }

    #[test]
    fn reports_missing_attributes_and_bad_xml() {
        let err = decode_tmx_str(r#"<map width="1"/>"#, Path::new("m.tmx"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, MapError::InvalidMap(_)));

        let err = decode_tmx_str("<map", Path::new("m.tmx"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::Xml { .. }));
    }

    #[test]
    fn missing_tsx_is_an_io_error() {
        let dir = temp_dir();
        let tmx = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
 <tileset firstgid="1" source="nope.tsx"/>
</map>"#;
        let err = decode_tmx_str(tmx, &dir.join("m.tmx"), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, MapError::Io { .. }));
    }
}
