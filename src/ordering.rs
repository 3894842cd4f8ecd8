use crate::record::{CameraRecord, CameraStore};
use std::cmp::Ordering;

/// Motion first, then most recently refreshed. Ties compare equal so a
/// stable sort keeps configuration order.
pub fn compare(a: &CameraRecord, b: &CameraRecord) -> Ordering {
    b.has_motion()
        .cmp(&a.has_motion())
        .then_with(|| b.last_update_at().cmp(&a.last_update_at()))
}

pub fn ordered(store: &CameraStore) -> Vec<&CameraRecord> {
    sort_records(store.iter().collect())
}

pub fn thumbnails(store: &CameraStore) -> Vec<&CameraRecord> {
    sort_records(store.iter().filter(|record| record.is_eligible()).collect())
}

pub(crate) fn sort_records(mut records: Vec<&CameraRecord>) -> Vec<&CameraRecord> {
    records.sort_by(|a, b| compare(a, b));
    records
}
