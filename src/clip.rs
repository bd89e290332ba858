use geo::Intersects;

use crate::model::{TileFootprint, VesselRecord};

/// keep the records positioned inside the tile footprint. Boundary points are kept.
/// Positions are tested in WGS84 degrees, the footprint's own CRS.
pub fn clip<'a, I>(records: I, footprint: &TileFootprint) -> Vec<&'a VesselRecord>
where
    I: IntoIterator<Item = &'a VesselRecord>,
{
    records
        .into_iter()
        .filter(|r| footprint.polygon.intersects(&r.position()))
        .collect()
}
