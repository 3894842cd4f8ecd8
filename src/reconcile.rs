use crate::config::CardConfig;
use crate::record::{CameraRecord, CameraStore, Millis};
use crate::snapshot::Snapshot;
use url::form_urlencoded;

pub const CAMERA_PROXY_PATH: &str = "/api/camera_proxy/";
pub const CAMERA_STREAM_PATH: &str = "/api/camera_proxy_stream/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshIntervals {
    pub poll_interval_ms: u64,
    pub update_interval_secs: u64,
}

impl RefreshIntervals {
    pub fn from_config(config: &CardConfig) -> Self {
        Self {
            poll_interval_ms: config.poll_interval_ms(),
            update_interval_secs: config.update_interval,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciled {
    pub motion_just_activated: bool,
    pub refreshed: bool,
}

pub fn reconcile(
    record: &mut CameraRecord,
    snapshot: &Snapshot,
    now: Millis,
    intervals: RefreshIntervals,
) -> Reconciled {
    let has_motion = record
        .motion_entity_ids
        .iter()
        .any(|id| snapshot.is_active(id));
    let motion_just_activated = !record.has_motion && has_motion;

    record.has_motion = has_motion;
    if has_motion {
        record.last_motion_at = Some(now);
    }

    let refreshed = motion_just_activated
        || now.saturating_sub(record.last_update_at) > intervals.poll_interval_ms;
    if refreshed {
        record.last_update_at = now;
    }

    let attributes = snapshot
        .get(&record.entity_id)
        .map(|entity| &entity.attributes);
    record.access_token = attributes
        .and_then(|attrs| attrs.access_token.clone())
        .filter(|token| !token.is_empty());
    record.display_name = attributes.and_then(|attrs| attrs.friendly_name.clone());

    record.thumbnail_url = record
        .access_token
        .as_deref()
        .map(|token| thumbnail_url(&record.entity_id, token, record.last_update_at));
    record.stream_url = record
        .access_token
        .as_deref()
        .map(|token| stream_url(&record.entity_id, token, intervals.update_interval_secs));

    Reconciled {
        motion_just_activated,
        refreshed,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOutcome {
    pub activated: Vec<usize>,
    pub refreshed: Vec<usize>,
}

pub fn reconcile_all(
    store: &mut CameraStore,
    snapshot: &Snapshot,
    now: Millis,
    intervals: RefreshIntervals,
) -> PassOutcome {
    let mut outcome = PassOutcome::default();
    for (index, record) in store.records_mut().enumerate() {
        let result = reconcile(record, snapshot, now, intervals);
        if result.motion_just_activated {
            outcome.activated.push(index);
        }
        if result.refreshed {
            outcome.refreshed.push(index);
        }
    }
    outcome
}

pub fn thumbnail_url(entity_id: &str, token: &str, last_update_at: Millis) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token)
        .append_pair("time", &last_update_at.to_string())
        .finish();
    format!("{CAMERA_PROXY_PATH}{entity_id}?{query}")
}

pub fn stream_url(entity_id: &str, token: &str, update_interval_secs: u64) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("token", token)
        .append_pair("interval", &update_interval_secs.to_string())
        .finish();
    format!("{CAMERA_STREAM_PATH}{entity_id}?{query}")
}

#[cfg(test)]
mod tests {
    use super::{RefreshIntervals, reconcile, reconcile_all, stream_url, thumbnail_url};
    use crate::record::{CameraRecord, CameraStore};
    use crate::snapshot::Snapshot;

    const INTERVALS: RefreshIntervals = RefreshIntervals {
        poll_interval_ms: 10_000,
        update_interval_secs: 1,
    };

    fn porch() -> CameraRecord {
        CameraRecord::new("camera.porch", vec!["binary_sensor.porch_motion".to_owned()])
    }

    fn snapshot(motion: &str) -> Snapshot {
        Snapshot::new()
            .with_camera("camera.porch", "tok", "Porch")
            .with_entity("binary_sensor.porch_motion", motion)
    }

    #[test]
    fn rising_edge_fires_once() {
        let mut record = porch();
        let on = snapshot("on");

        let first = reconcile(&mut record, &on, 1_000, INTERVALS);
        assert!(first.motion_just_activated);
        assert!(record.has_motion());
        assert_eq!(record.last_motion_at(), Some(1_000));

        let second = reconcile(&mut record, &on, 1_500, INTERVALS);
        assert!(!second.motion_just_activated);
        assert_eq!(record.last_motion_at(), Some(1_500));
    }

    #[test]
    fn any_motion_entity_counts() {
        let mut record = CameraRecord::new(
            "camera.yard",
            vec!["binary_sensor.a".to_owned(), "binary_sensor.b".to_owned()],
        );
        let snapshot = Snapshot::new()
            .with_entity("binary_sensor.a", "off")
            .with_entity("binary_sensor.b", "on");
        assert!(reconcile(&mut record, &snapshot, 5, INTERVALS).motion_just_activated);
    }

    #[test]
    fn refresh_is_throttled_to_poll_interval() {
        let mut record = porch();
        let idle = snapshot("off");

        reconcile(&mut record, &idle, 20_000, INTERVALS);
        assert_eq!(record.last_update_at(), 20_000);

        let quiet = reconcile(&mut record, &idle, 22_000, INTERVALS);
        assert!(!quiet.refreshed);
        reconcile(&mut record, &idle, 24_000, INTERVALS);
        assert_eq!(record.last_update_at(), 20_000);

        reconcile(&mut record, &idle, 30_001, INTERVALS);
        assert_eq!(record.last_update_at(), 30_001);
    }

    #[test]
    fn motion_edge_forces_refresh_inside_interval() {
        let mut record = porch();
        reconcile(&mut record, &snapshot("off"), 20_000, INTERVALS);
        let result = reconcile(&mut record, &snapshot("on"), 21_000, INTERVALS);
        assert!(result.refreshed);
        assert_eq!(record.last_update_at(), 21_000);
    }

    #[test]
    fn urls_follow_token_and_update_time() {
        let mut record = porch();
        reconcile(&mut record, &snapshot("off"), 20_000, INTERVALS);

        assert_eq!(record.display_name(), Some("Porch"));
        assert_eq!(
            record.thumbnail_url(),
            Some(thumbnail_url("camera.porch", "tok", 20_000).as_str())
        );
        assert_eq!(
            record.thumbnail_url(),
            Some("/api/camera_proxy/camera.porch?token=tok&time=20000")
        );
        assert_eq!(
            record.stream_url(),
            Some("/api/camera_proxy_stream/camera.porch?token=tok&interval=1")
        );

        let rotated = Snapshot::new()
            .with_camera("camera.porch", "new", "Porch")
            .with_entity("binary_sensor.porch_motion", "off");
        reconcile(&mut record, &rotated, 21_000, INTERVALS);
        assert_eq!(
            record.thumbnail_url(),
            Some("/api/camera_proxy/camera.porch?token=new&time=20000")
        );
        assert_eq!(record.stream_url(), Some(stream_url("camera.porch", "new", 1).as_str()));
    }

    #[test]
    fn missing_camera_entity_degrades_to_ineligible() {
        let mut record = porch();
        reconcile(&mut record, &snapshot("off"), 20_000, INTERVALS);
        assert!(record.is_eligible());

        let gone = Snapshot::new().with_entity("binary_sensor.porch_motion", "on");
        let result = reconcile(&mut record, &gone, 21_000, INTERVALS);
        assert!(result.motion_just_activated);
        assert!(!record.is_eligible());
        assert_eq!(record.display_name(), None);
        assert_eq!(record.thumbnail_url(), None);
        assert_eq!(record.stream_url(), None);
    }

    #[test]
    fn pass_reports_activations_in_configuration_order() {
        let mut store = CameraStore::from_records(vec![
            CameraRecord::new("camera.a", vec!["binary_sensor.a".to_owned()]),
            CameraRecord::new("camera.b", vec!["binary_sensor.b".to_owned()]),
            CameraRecord::new("camera.c", vec!["binary_sensor.c".to_owned()]),
        ]);
        let snapshot = Snapshot::new()
            .with_entity("binary_sensor.c", "on")
            .with_entity("binary_sensor.a", "on");

        let outcome = reconcile_all(&mut store, &snapshot, 50_000, INTERVALS);
        assert_eq!(outcome.activated, vec![0, 2]);
        assert_eq!(outcome.refreshed, vec![0, 1, 2]);
    }
}
