use log::{debug, warn};

use crate::clip::clip;
use crate::error::ProjectionError;
use crate::footprint::FootprintBuilder;
use crate::matcher::select;
use crate::model::{LabelCollection, TileFootprint, TimeWindow, VesselRecord};

/// a vessel that passed filtering but whose footprint could not be projected
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedVessel {
    pub vessel_id: u64,
    pub error: ProjectionError,
}

/// labels of one tile plus the vessels we had to leave out
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Assembly {
    pub labels: LabelCollection,
    pub skipped: Vec<SkippedVessel>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TileLabelAssembler {
    pub builder: FootprintBuilder,
}

impl TileLabelAssembler {
    pub fn new(builder: FootprintBuilder) -> Self {
        TileLabelAssembler { builder }
    }

    /// window match, footprint clip, eligibility filter and hull construction for one tile.
    /// Output order follows input order of the surviving records.
    pub fn assemble(
        &self,
        records: &[VesselRecord],
        window: &TimeWindow,
        footprint: &TileFootprint,
    ) -> Assembly {
        let in_window = select(records, window);
        let in_tile = clip(in_window, footprint);

        let mut assembly = Assembly::default();
        for record in in_tile.into_iter().filter(|r| r.is_eligible()) {
            match self.builder.build(record) {
                Ok(Some(fp)) => assembly.labels.footprints.push(fp),
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        "tile {}: skipping vessel {}: {}",
                        footprint.tile_id, record.vessel_id, error
                    );
                    assembly.skipped.push(SkippedVessel {
                        vessel_id: record.vessel_id,
                        error,
                    });
                }
            }
        }

        if assembly.labels.is_empty() {
            debug!("tile {}: no eligible vessels", footprint.tile_id);
        }
        assembly
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use geo::polygon;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 1, 10, 30, 0).unwrap()
    }

    fn window() -> TimeWindow {
        TimeWindow::new("T", t0(), t0() + Duration::seconds(10)).unwrap()
    }

    fn footprint() -> TileFootprint {
        let poly = polygon![
            (x: 10.0, y: 54.0),
            (x: 13.0, y: 54.0),
            (x: 13.0, y: 56.0),
            (x: 10.0, y: 56.0)
        ];
        TileFootprint::new("T33UUB", poly).unwrap()
    }

    fn rec(id: u64, lon: f64, width: Option<f64>, class: &str) -> VesselRecord {
        VesselRecord {
            timestamp: t0() + Duration::seconds(2),
            vessel_id: id,
            latitude: 55.0,
            longitude: lon,
            length_m: Some(30.0),
            width_m: width,
            heading_deg: Some(120.0),
            mobile_class: class.into(),
        }
    }

    #[test]
    fn filters_and_keeps_order() {
        let records = vec![
            rec(1, 12.5, Some(8.0), "Class B"),
            // no width
            rec(2, 11.0, None, "Class A"),
            // not a vessel
            rec(3, 11.5, Some(8.0), "Base Station"),
            // outside the tile
            rec(4, 14.0, Some(8.0), "Class A"),
            rec(5, 10.5, Some(8.0), "Class A"),
            // duplicate
            rec(1, 10.2, Some(8.0), "Class B"),
        ];

        let assembler = TileLabelAssembler::default();
        let assembly = assembler.assemble(&records, &window(), &footprint());
        assert!(assembly.skipped.is_empty());

        let lons: Vec<f64> = assembly
            .labels
            .footprints
            .iter()
            .map(|fp| {
                let xs: Vec<f64> = fp.polygon.exterior().coords().map(|c| c.x).collect();
                xs.iter().sum::<f64>() / xs.len() as f64
            })
            .collect();
        assert_eq!(lons.len(), 2);
        assert!((lons[0] - 12.5).abs() < 1e-3);
        assert!((lons[1] - 10.5).abs() < 1e-3);
    }

    #[test]
    fn empty_tile_is_not_an_error() {
        let records = vec![rec(1, 20.0, Some(8.0), "Class A")];
        let assembler = TileLabelAssembler::default();
        let assembly = assembler.assemble(&records, &window(), &footprint());
        assert!(assembly.labels.is_empty());
        assert!(assembly.skipped.is_empty());
    }

    #[test]
    fn projection_failure_skips_only_that_vessel() {
        let pole = polygon![
            (x: 0.0, y: 80.0),
            (x: 20.0, y: 80.0),
            (x: 20.0, y: 90.0),
            (x: 0.0, y: 90.0)
        ];
        let footprint = TileFootprint::new("POLAR", pole).unwrap();

        let mut polar = rec(1, 10.0, Some(8.0), "Class A");
        polar.latitude = 90.0;
        let mut fine = rec(2, 10.0, Some(8.0), "Class A");
        fine.latitude = 85.0;

        let records = [polar, fine];
        let assembler = TileLabelAssembler::default();
        let assembly = assembler.assemble(&records, &window(), &footprint);
        assert_eq!(assembly.labels.len(), 1);
        assert_eq!(assembly.skipped.len(), 1);
        assert_eq!(assembly.skipped[0].vessel_id, 1);
    }

    #[test]
    fn assemble_is_repeatable() {
        let records = vec![
            rec(1, 12.5, Some(8.0), "Class A"),
            rec(2, 11.5, Some(9.0), "Class B"),
        ];
        let assembler = TileLabelAssembler::default();
        assert_eq!(
            assembler.assemble(&records, &window(), &footprint()),
            assembler.assemble(&records, &window(), &footprint())
        );
    }
}
