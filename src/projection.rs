//! forward/inverse transforms between WGS84 degrees and the pseudo-Mercator metric plane.
//!
//! Coordinates are always handled x-first (longitude/easting, then latitude/northing),
//! regardless of the native axis order of the CRS definition.

use std::f64::consts::PI;
use std::str::FromStr;

use geo::{Coord, CoordsIter, MapCoords};

use crate::error::ProjectionError;

/// semi-major axis of the WGS84 ellipsoid, used as sphere radius by pseudo-Mercator
const EARTH_RADIUS_M: f64 = 6_378_137.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:4326, degrees
    Wgs84,
    /// EPSG:3857, meters
    PseudoMercator,
}

pub const GEOGRAPHIC_CRS: Crs = Crs::Wgs84;
pub const METRIC_CRS: Crs = Crs::PseudoMercator;

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Wgs84 => 4326,
            Crs::PseudoMercator => 3857,
        }
    }

    fn unproject(&self, c: Coord<f64>) -> Coord<f64> {
        match self {
            Crs::Wgs84 => c,
            Crs::PseudoMercator => Coord {
                x: (c.x / EARTH_RADIUS_M).to_degrees(),
                y: (2.0 * (c.y / EARTH_RADIUS_M).exp().atan() - PI / 2.0).to_degrees(),
            },
        }
    }

    fn project(&self, c: Coord<f64>) -> Coord<f64> {
        match self {
            Crs::Wgs84 => c,
            Crs::PseudoMercator => Coord {
                x: EARTH_RADIUS_M * c.x.to_radians(),
                y: if c.y.abs() >= 90.0 {
                    f64::INFINITY.copysign(c.y)
                } else {
                    EARTH_RADIUS_M * (PI / 4.0 + c.y.to_radians() / 2.0).tan().ln()
                },
            },
        }
    }
}

impl FromStr for Crs {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "epsg:4326" | "wgs84" => Ok(Crs::Wgs84),
            "epsg:3857" | "epsg:900913" | "epsg:102100" => Ok(Crs::PseudoMercator),
            _ => Err(ProjectionError::UnknownCrs(s.to_string())),
        }
    }
}

/// transform a single coordinate, failing instead of passing through unprojected values
pub fn transform_coord(
    c: Coord<f64>,
    target: Crs,
    source: Crs,
) -> Result<Coord<f64>, ProjectionError> {
    let out = if source == target {
        c
    } else {
        target.project(source.unproject(c))
    };

    if out.x.is_finite() && out.y.is_finite() {
        Ok(out)
    } else {
        Err(ProjectionError::NonFinite { x: out.x, y: out.y })
    }
}

/// reproject a point or polygon, preserving vertex order and ring closure
pub fn reproject<G>(geometry: &G, target: Crs, source: Crs) -> Result<G, ProjectionError>
where
    G: MapCoords<f64, f64, Output = G> + CoordsIter<Scalar = f64>,
{
    if geometry.coords_count() == 0 {
        return Err(ProjectionError::EmptyGeometry);
    }
    geometry.try_map_coords(|c| transform_coord(c, target, source))
}

/// string based variant for CRS identifiers coming from configuration or catalogs
pub fn reproject_named<G>(
    geometry: &G,
    target_crs: &str,
    source_crs: &str,
) -> Result<G, ProjectionError>
where
    G: MapCoords<f64, f64, Output = G> + CoordsIter<Scalar = f64>,
{
    let target: Crs = target_crs.parse()?;
    let source: Crs = source_crs.parse()?;
    reproject(geometry, target, source)
}
