use chrono::{DateTime, Duration, Utc};
use geo::{Area, Coord, Polygon};

use crate::error::TileError;

/// lower window padding, compensates for AIS reporting jitter before acquisition start
pub const WINDOW_PAD_BEFORE_SECS: i64 = 5;
/// upper window padding after acquisition end
pub const WINDOW_PAD_AFTER_SECS: i64 = 4;

/// mobile class prefix of real (classed) vessels, as opposed to base stations or AtoN
pub const CLASSED_MOBILE_PREFIX: &str = "Class";

#[derive(Debug, serde::Deserialize, serde::Serialize)]
//	# Timestamp		Timestamp from the AIS basestation, format: 31/12/2015 23:59:59
//	Type of mobile		Describes what type of target this message is received from
//				(class A AIS Vessel, Class B AIS vessel, etc)
//	MMSI			MMSI number of vessel
//	Latitude		Latitude of message report (e.g. 57,8794)
//	Longitude		Longitude of message report (e.g. 17,9125)
//	Heading			Heading from AIS message if available
//	Width			Width of the vessel
//	Length			Length of the vessel
// all other columns of the daily file are ignored.
// example: 23/06/2017 00:44:23,Class A,305484000,56.134323,11.474578,Under way using engine,0.0,6.8,268.1,264,9428217,V2EN3,ICE MOON,Cargo,,24,129,GPS,6.8,AARHUS,23/06/2017 08:00:00,AIS,109,20,12,12
pub struct AisRow {
    #[serde(rename = "# Timestamp")]
    pub timestamp: Option<String>,
    #[serde(rename = "Type of mobile")]
    pub type_mobile: Option<String>,
    #[serde(rename = "MMSI")]
    pub mmsi: Option<u64>,
    #[serde(rename = "Latitude")]
    pub lat: Option<f64>,
    #[serde(rename = "Longitude")]
    pub lon: Option<f64>,
    #[serde(rename = "Heading")]
    pub heading: Option<f64>,
    #[serde(rename = "Width")]
    pub width: Option<f64>,
    #[serde(rename = "Length")]
    pub length: Option<f64>,
}

/// one AIS position report, validated at ingestion and never mutated afterwards
#[derive(Debug, Clone, PartialEq)]
pub struct VesselRecord {
    pub timestamp: DateTime<Utc>,
    pub vessel_id: u64,
    /// WGS84 degrees
    pub latitude: f64,
    /// WGS84 degrees
    pub longitude: f64,
    pub length_m: Option<f64>,
    pub width_m: Option<f64>,
    /// true heading in [0,360), None if unknown
    pub heading_deg: Option<f64>,
    pub mobile_class: String,
}

impl VesselRecord {
    pub fn position(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }

    pub fn is_classed(&self) -> bool {
        self.mobile_class.starts_with(CLASSED_MOBILE_PREFIX)
    }

    /// records we can build a hull footprint for
    pub fn is_eligible(&self) -> bool {
        self.width_m.is_some() && self.is_classed()
    }
}

/// acquisition interval of a tile (unpadded)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(tile_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, TileError> {
        if end < start {
            return Err(TileError::InvalidWindow {
                tile_id: tile_id.to_string(),
            });
        }
        Ok(TimeWindow { start, end })
    }

    /// inclusive bounds after applying the asymmetric reporting jitter padding
    pub fn padded_bounds(&self) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.start - Duration::seconds(WINDOW_PAD_BEFORE_SECS),
            self.end + Duration::seconds(WINDOW_PAD_AFTER_SECS),
        )
    }

    pub fn contains_padded(&self, t: &DateTime<Utc>) -> bool {
        let (lower, upper) = self.padded_bounds();
        lower <= *t && *t <= upper
    }
}

/// ground coverage of a satellite tile in WGS84 degrees
#[derive(Debug, Clone, PartialEq)]
pub struct TileFootprint {
    pub tile_id: String,
    pub polygon: Polygon<f64>,
}

impl TileFootprint {
    pub fn new(tile_id: impl Into<String>, polygon: Polygon<f64>) -> Result<Self, TileError> {
        let tile_id = tile_id.into();
        let ring = polygon.exterior();
        let finite = |c: &Coord<f64>| c.x.is_finite() && c.y.is_finite();

        // a closed triangle is the smallest usable ring (3 vertices + closing vertex)
        let reason = if ring.0.len() < 4 {
            Some(format!("{} ring coordinates", ring.0.len()))
        } else if !ring.0.iter().all(finite) {
            Some("non-finite vertex".to_string())
        } else if polygon.unsigned_area() == 0.0 {
            Some("zero area".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => Err(TileError::InvalidFootprint { tile_id, reason }),
            None => Ok(TileFootprint { tile_id, polygon }),
        }
    }
}

/// everything we know about one satellite acquisition
#[derive(Debug, Clone, PartialEq)]
pub struct TileDescriptor {
    pub window: TimeWindow,
    pub footprint: TileFootprint,
}

impl TileDescriptor {
    pub fn tile_id(&self) -> &str {
        &self.footprint.tile_id
    }
}

/// oriented hull rectangle of one vessel in WGS84 degrees
#[derive(Debug, Clone, PartialEq)]
pub struct OrientedFootprint {
    /// closed ring BL, BR, TR, TL (before rotation), BL
    pub polygon: Polygon<f64>,
    pub length_m: f64,
    pub timestamp: DateTime<Utc>,
}

pub const LABEL_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl OrientedFootprint {
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(LABEL_TIMESTAMP_FORMAT).to_string()
    }
}

/// ordered labels of one tile
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LabelCollection {
    pub footprints: Vec<OrientedFootprint>,
}

impl LabelCollection {
    pub fn len(&self) -> usize {
        self.footprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.footprints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use geo::polygon;

    fn record(width: Option<f64>, class: &str) -> VesselRecord {
        VesselRecord {
            timestamp: Utc.with_ymd_and_hms(2021, 1, 1, 10, 0, 0).unwrap(),
            vessel_id: 219000001,
            latitude: 54.5,
            longitude: 12.2,
            length_m: Some(24.0),
            width_m: width,
            heading_deg: None,
            mobile_class: class.to_string(),
        }
    }

    #[test]
    fn eligibility_requires_width_and_class() {
        assert!(record(Some(6.0), "Class A").is_eligible());
        assert!(record(Some(6.0), "ClassA").is_eligible());
        assert!(!record(None, "Class A").is_eligible());
        assert!(!record(Some(6.0), "Base Station").is_eligible());
        assert!(!record(Some(6.0), "AtoN").is_eligible());
    }

    #[test]
    fn window_rejects_reversed_bounds() {
        let t0 = Utc.with_ymd_and_hms(2021, 1, 1, 10, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2021, 1, 1, 10, 0, 1).unwrap();
        assert!(TimeWindow::new("T", t0, t1).is_ok());
        assert!(TimeWindow::new("T", t0, t0).is_ok());
        assert!(matches!(
            TimeWindow::new("T", t1, t0),
            Err(TileError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn footprint_rejects_degenerate_rings() {
        let ok = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)];
        assert!(TileFootprint::new("T", ok).is_ok());

        let line = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)];
        assert!(matches!(
            TileFootprint::new("T", line),
            Err(TileError::InvalidFootprint { .. })
        ));

        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)];
        assert!(matches!(
            TileFootprint::new("T", flat),
            Err(TileError::InvalidFootprint { .. })
        ));
    }
}
