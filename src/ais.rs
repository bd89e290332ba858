use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use log::{info, warn};

use crate::error::RecordError;
use crate::model::{AisRow, VesselRecord};

/// timestamp layouts seen in AIS day files, all UTC
const AIS_TIMESTAMP_FORMATS: [&str; 3] = [
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// records of one AIS file in input order
#[derive(Debug, Default)]
pub struct AisBatch {
    pub records: Vec<VesselRecord>,
    pub skipped: usize,
}

pub fn parse_ais_timestamp(s: &str) -> Result<DateTime<Utc>, RecordError> {
    let s = s.trim();
    for fmt in AIS_TIMESTAMP_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| RecordError::BadTimestamp(s.to_string()))
}

impl TryFrom<AisRow> for VesselRecord {
    type Error = RecordError;

    fn try_from(row: AisRow) -> Result<Self, Self::Error> {
        let timestamp = row.timestamp.ok_or(RecordError::MissingField("# Timestamp"))?;
        let timestamp = parse_ais_timestamp(&timestamp)?;

        Ok(VesselRecord {
            timestamp,
            vessel_id: row.mmsi.ok_or(RecordError::MissingField("MMSI"))?,
            latitude: row.lat.ok_or(RecordError::MissingField("Latitude"))?,
            longitude: row.lon.ok_or(RecordError::MissingField("Longitude"))?,
            length_m: row.length,
            width_m: row.width,
            // AIS uses 511 for "not available"
            heading_deg: row.heading.filter(|h| (0.0..360.0).contains(h)),
            mobile_class: row.type_mobile.unwrap_or_default(),
        })
    }
}

/// read AIS records from any CSV source with a header line. Broken rows are skipped.
pub fn read_ais_records<R: Read>(reader: R) -> AisBatch {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut batch = AisBatch::default();

    for (i, result) in rdr.deserialize::<AisRow>().enumerate() {
        let record = result
            .map_err(anyhow::Error::from)
            .and_then(|row| VesselRecord::try_from(row).map_err(anyhow::Error::from));

        match record {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                warn!("skipping AIS row {}: {}", i + 1, e);
                batch.skipped += 1;
            }
        }
    }

    batch
}

pub fn read_ais_csv(path: &Path) -> Result<AisBatch> {
    let file = File::open(path)
        .with_context(|| format!("failed to open AIS file {}", path.display()))?;
    let batch = read_ais_records(file);

    info!(
        "{} has {} records ({} skipped)",
        path.display(),
        batch.records.len(),
        batch.skipped
    );
    Ok(batch)
}
