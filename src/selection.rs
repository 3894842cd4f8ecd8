use crate::ordering;
use crate::record::CameraStore;

/// Picks the focused camera index after a reconciliation pass.
///
/// `activated` lists the store indexes whose motion rose during the pass, in
/// configuration order. The store is never empty, so the result is always a
/// valid index.
pub fn select_after_reconcile(
    store: &CameraStore,
    current: usize,
    activated: &[usize],
    focus_on_motion: bool,
) -> usize {
    let candidate = if focus_on_motion && !activated.is_empty() {
        if activated.contains(&current) {
            current
        } else {
            activated[0]
        }
    } else {
        current
    };

    match store.get(candidate) {
        Some(record) if record.is_eligible() => candidate,
        _ => fallback(store),
    }
}

/// Highest-ordered camera that has both a token and motion, else the first
/// configured camera.
pub fn fallback(store: &CameraStore) -> usize {
    let candidates = store
        .iter()
        .filter(|record| record.is_eligible() && record.has_motion())
        .collect();
    ordering::sort_records(candidates)
        .first()
        .and_then(|record| store.position(record.entity_id()))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{fallback, select_after_reconcile};
    use crate::record::{CameraRecord, CameraStore};

    fn camera(id: &str, token: Option<&str>, has_motion: bool, last_update_at: u64) -> CameraRecord {
        let mut record = CameraRecord::new(id, Vec::new());
        record.access_token = token.map(str::to_owned);
        record.has_motion = has_motion;
        record.last_update_at = last_update_at;
        record
    }

    fn store() -> CameraStore {
        CameraStore::from_records(vec![
            camera("camera.a", Some("ta"), false, 10),
            camera("camera.b", Some("tb"), true, 20),
            camera("camera.c", Some("tc"), true, 30),
        ])
    }

    #[test]
    fn unchanged_without_activations() {
        assert_eq!(select_after_reconcile(&store(), 0, &[], true), 0);
        assert_eq!(select_after_reconcile(&store(), 2, &[], true), 2);
    }

    #[test]
    fn focus_jumps_to_first_activated_camera() {
        assert_eq!(select_after_reconcile(&store(), 0, &[1, 2], true), 1);
    }

    #[test]
    fn focus_stays_on_current_when_it_also_activated() {
        assert_eq!(select_after_reconcile(&store(), 2, &[1, 2], true), 2);
    }

    #[test]
    fn focus_disabled_ignores_activations() {
        assert_eq!(select_after_reconcile(&store(), 0, &[1, 2], false), 0);
    }

    #[test]
    fn lost_token_falls_back_to_best_motion_camera() {
        let store = CameraStore::from_records(vec![
            camera("camera.a", None, false, 10),
            camera("camera.b", Some("tb"), true, 20),
            camera("camera.c", Some("tc"), true, 30),
            camera("camera.d", Some("td"), false, 40),
        ]);
        assert_eq!(select_after_reconcile(&store, 0, &[], true), 2);
    }

    #[test]
    fn fallback_without_eligible_motion_uses_first_camera() {
        let store = CameraStore::from_records(vec![
            camera("camera.a", None, false, 10),
            camera("camera.b", Some("tb"), false, 20),
        ]);
        assert_eq!(select_after_reconcile(&store, 1, &[0], true), 0);
        assert_eq!(fallback(&store), 0);
    }

    #[test]
    fn selection_exists_even_when_no_camera_has_token() {
        let store = CameraStore::from_records(vec![
            camera("camera.a", None, true, 10),
            camera("camera.b", None, true, 20),
        ]);
        assert_eq!(select_after_reconcile(&store, 1, &[0, 1], true), 0);
    }

    #[test]
    fn ineligible_activation_falls_back() {
        let store = CameraStore::from_records(vec![
            camera("camera.a", Some("ta"), false, 10),
            camera("camera.b", None, true, 50),
            camera("camera.c", Some("tc"), true, 30),
        ]);
        assert_eq!(select_after_reconcile(&store, 0, &[1, 2], true), 2);
    }
}
