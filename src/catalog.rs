use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use geo::{Coord, LineString, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, PolygonType, Value};
use log::{debug, info};

use crate::error::TileError;
use crate::model::{TileDescriptor, TileFootprint, TimeWindow};

const TILE_ID_PROPERTY: &str = "title";
const START_PROPERTY: &str = "startDate";
const END_PROPERTY: &str = "completionDate";

const CATALOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn parse_catalog_timestamp(tile_id: &str, s: &str) -> Result<DateTime<Utc>, TileError> {
    if let Ok(t) = NaiveDateTime::parse_from_str(s, CATALOG_TIMESTAMP_FORMAT) {
        return Ok(t.and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| TileError::BadTimestamp {
            tile_id: tile_id.to_string(),
            value: s.to_string(),
        })
}

fn string_property<'a>(
    feature: &'a Feature,
    tile_id: &str,
    property: &'static str,
) -> Result<&'a str, TileError> {
    feature
        .property(property)
        .and_then(|v| v.as_str())
        .ok_or_else(|| TileError::MissingProperty {
            tile_id: tile_id.to_string(),
            property,
        })
}

/// the tile id names the label file, so it has to be a plain file name
fn check_tile_id(tile_id: &str) -> Result<(), TileError> {
    let forbidden = |c: char| matches!(c, '/' | '\\') || c.is_control();
    let unusable = tile_id.is_empty()
        || tile_id == "."
        || tile_id == ".."
        || tile_id.chars().any(forbidden);

    if unusable {
        return Err(TileError::InvalidTileId(tile_id.to_string()));
    }
    Ok(())
}

fn to_polygon(rings: &PolygonType) -> Polygon<f64> {
    let mut rings = rings.iter().map(|ring| {
        ring.iter()
            .filter(|pos| pos.len() >= 2)
            .map(|pos| Coord {
                x: pos[0],
                y: pos[1],
            })
            .collect::<LineString<f64>>()
    });
    let exterior = rings.next().unwrap_or_else(|| LineString::new(vec![]));
    Polygon::new(exterior, rings.collect())
}

fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// footprint polygon of a catalog feature. Multi polygons contribute their first member.
fn footprint_polygon(feature: &Feature, tile_id: &str) -> Result<Polygon<f64>, TileError> {
    let invalid = |reason: &str| TileError::InvalidFootprint {
        tile_id: tile_id.to_string(),
        reason: reason.to_string(),
    };
    let value = match &feature.geometry {
        Some(geometry) => &geometry.value,
        None => return Err(invalid("no geometry")),
    };

    match value {
        Value::Polygon(rings) => Ok(to_polygon(rings)),
        Value::MultiPolygon(polys) => {
            if polys.len() > 1 {
                debug!(
                    "tile {tile_id}: using first of {} footprint polygons",
                    polys.len()
                );
            }
            polys
                .first()
                .map(to_polygon)
                .ok_or_else(|| invalid("empty multipolygon"))
        }
        other => Err(TileError::UnsupportedGeometry {
            tile_id: tile_id.to_string(),
            kind: geometry_kind(other).to_string(),
        }),
    }
}

pub fn tile_from_feature(feature: &Feature, index: usize) -> Result<TileDescriptor, TileError> {
    let fallback_id = format!("#{index}");
    let tile_id = string_property(feature, &fallback_id, TILE_ID_PROPERTY)?;
    check_tile_id(tile_id)?;

    let start = string_property(feature, tile_id, START_PROPERTY)?;
    let end = string_property(feature, tile_id, END_PROPERTY)?;
    let window = TimeWindow::new(
        tile_id,
        parse_catalog_timestamp(tile_id, start)?,
        parse_catalog_timestamp(tile_id, end)?,
    )?;

    let footprint = TileFootprint::new(tile_id, footprint_polygon(feature, tile_id)?)?;

    Ok(TileDescriptor { window, footprint })
}

/// tile descriptors of a catalog search result, one result per feature so a bad tile
/// does not take the others down with it. A tile id seen before is an error for every
/// later occurrence, the first one wins.
pub fn parse_tile_catalog(json: &str) -> Result<Vec<Result<TileDescriptor, TileError>>> {
    let geojson: GeoJson = json.parse().context("catalog is not valid GeoJSON")?;
    let collection = FeatureCollection::try_from(geojson)
        .context("catalog is not a FeatureCollection")?;

    let mut seen = HashSet::new();
    let tiles = collection
        .features
        .iter()
        .enumerate()
        .map(|(i, f)| tile_from_feature(f, i))
        .map(|tile| match tile {
            Ok(tile) if !seen.insert(tile.tile_id().to_string()) => {
                Err(TileError::DuplicateTileId(tile.tile_id().to_string()))
            }
            other => other,
        })
        .collect();

    Ok(tiles)
}

pub fn read_tile_catalog(path: &Path) -> Result<Vec<Result<TileDescriptor, TileError>>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read tile catalog {}", path.display()))?;
    let tiles = parse_tile_catalog(&json)
        .with_context(|| format!("in tile catalog {}", path.display()))?;

    info!("{} lists {} tiles", path.display(), tiles.len());
    Ok(tiles)
}
