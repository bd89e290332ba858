use std::collections::HashSet;

use crate::model::{TimeWindow, VesselRecord};

/// select the records inside the padded acquisition window, one per vessel.
/// The first record of each vessel in input order wins; the input is left untouched.
pub fn select<'a, I>(records: I, window: &TimeWindow) -> Vec<&'a VesselRecord>
where
    I: IntoIterator<Item = &'a VesselRecord>,
{
    let mut seen: HashSet<u64> = HashSet::new();

    records
        .into_iter()
        .filter(|r| window.contains_padded(&r.timestamp))
        .filter(|r| seen.insert(r.vessel_id))
        .collect()
}
