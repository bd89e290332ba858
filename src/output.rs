use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};

use crate::model::{LabelCollection, OrientedFootprint};

/// what to do with a tile that produced no labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyLabelPolicy {
    /// no artifact at all
    #[default]
    Skip,
    /// an empty FeatureCollection
    WriteEmpty,
}

pub fn label_file_name(tile_id: &str) -> String {
    format!("{tile_id}.geojson")
}

pub fn to_feature(footprint: &OrientedFootprint) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("Length".to_string(), JsonValue::from(footprint.length_m));
    properties.insert(
        "Timestamp".to_string(),
        JsonValue::from(footprint.timestamp_label()),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::from(&footprint.polygon))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn to_feature_collection(labels: &LabelCollection) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: labels.footprints.iter().map(to_feature).collect(),
        foreign_members: None,
    }
}

/// compact GeoJSON text with the keys of every object in sorted order
pub fn to_geojson_string(labels: &LabelCollection) -> Result<String> {
    // serde_json objects are ordered maps, going through Value sorts the geojson keys
    let value = serde_json::to_value(to_feature_collection(labels))?;
    Ok(serde_json::to_string(&value)?)
}

/// write `{tile_id}.geojson` into `dir`, returning the path if a file was written
pub fn write_labels(
    dir: &Path,
    tile_id: &str,
    labels: &LabelCollection,
    policy: EmptyLabelPolicy,
) -> Result<Option<PathBuf>> {
    if labels.is_empty() && policy == EmptyLabelPolicy::Skip {
        return Ok(None);
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;

    let path = dir.join(label_file_name(tile_id));
    fs::write(&path, to_geojson_string(labels)?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(Some(path))
}
