use std::str::FromStr;

use geo::{polygon, Point, Polygon, Rotate};
use log::debug;

use crate::error::ProjectionError;
use crate::model::{OrientedFootprint, VesselRecord};
use crate::projection::{reproject, Crs, GEOGRAPHIC_CRS, METRIC_CRS};

/// how an AIS heading turns the length-along-x rectangle in the projected plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationConvention {
    /// rotate counter-clockwise by the heading value (the convention of the existing label data)
    #[default]
    CounterClockwise,
    /// heading is clockwise from north, hull length ends up along the heading
    Compass,
}

impl RotationConvention {
    /// counter-clockwise rotation angle in degrees for a given heading
    pub fn ccw_degrees(&self, heading_deg: f64) -> f64 {
        match self {
            RotationConvention::CounterClockwise => heading_deg,
            RotationConvention::Compass => 90.0 - heading_deg,
        }
    }
}

impl FromStr for RotationConvention {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ccw" => Ok(RotationConvention::CounterClockwise),
            "compass" => Ok(RotationConvention::Compass),
            _ => Err(format!("unknown rotation convention '{s}' (expected ccw or compass)")),
        }
    }
}

/// turns a vessel report into its hull rectangle, sized in meters of the metric CRS
#[derive(Debug, Clone, Copy)]
pub struct FootprintBuilder {
    pub convention: RotationConvention,
    pub metric_crs: Crs,
}

impl Default for FootprintBuilder {
    fn default() -> Self {
        FootprintBuilder {
            convention: RotationConvention::default(),
            metric_crs: METRIC_CRS,
        }
    }
}

impl FootprintBuilder {
    pub fn new(convention: RotationConvention) -> Self {
        FootprintBuilder {
            convention,
            ..Default::default()
        }
    }

    /// Build the oriented footprint of an eligible record (width present, classed mobile).
    ///
    /// Returns `Ok(None)` if the record has no length to size the hull with. A record without
    /// heading keeps its rectangle axis aligned in the metric plane.
    pub fn build(
        &self,
        record: &VesselRecord,
    ) -> Result<Option<OrientedFootprint>, ProjectionError> {
        let (Some(length_m), Some(width_m)) = (record.length_m, record.width_m) else {
            debug!("vessel {} has no hull size, no footprint", record.vessel_id);
            return Ok(None);
        };

        let center = reproject(&record.position(), self.metric_crs, GEOGRAPHIC_CRS)?;
        let mut hull = metric_rectangle(center, length_m, width_m);

        if let Some(heading) = record.heading_deg {
            hull = hull.rotate_around_point(self.convention.ccw_degrees(heading), center);
        }

        let polygon = reproject(&hull, GEOGRAPHIC_CRS, self.metric_crs)?;

        Ok(Some(OrientedFootprint {
            polygon,
            length_m,
            timestamp: record.timestamp,
        }))
    }
}

/// axis aligned rectangle around `center`, length along x. Ring order is BL, BR, TR, TL.
pub fn metric_rectangle(center: Point<f64>, length_m: f64, width_m: f64) -> Polygon<f64> {
    let (hl, hw) = (length_m / 2.0, width_m / 2.0);
    let (x, y) = (center.x(), center.y());

    polygon![
        (x: x - hl, y: y - hw),
        (x: x + hl, y: y - hw),
        (x: x + hl, y: y + hw),
        (x: x - hl, y: y + hw)
    ]
}
