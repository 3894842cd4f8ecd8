use crate::config::CardConfig;

pub type Millis = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraRecord {
    pub(crate) entity_id: String,
    pub(crate) motion_entity_ids: Vec<String>,
    pub(crate) access_token: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) has_motion: bool,
    pub(crate) last_motion_at: Option<Millis>,
    pub(crate) last_update_at: Millis,
    pub(crate) thumbnail_url: Option<String>,
    pub(crate) stream_url: Option<String>,
}

impl CameraRecord {
    pub fn new(entity_id: impl Into<String>, motion_entity_ids: Vec<String>) -> Self {
        Self {
            entity_id: entity_id.into(),
            motion_entity_ids,
            access_token: None,
            display_name: None,
            has_motion: false,
            last_motion_at: None,
            last_update_at: 0,
            thumbnail_url: None,
            stream_url: None,
        }
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn motion_entity_ids(&self) -> &[String] {
        &self.motion_entity_ids
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.entity_id.as_str())
    }

    pub fn has_motion(&self) -> bool {
        self.has_motion
    }

    pub fn last_motion_at(&self) -> Option<Millis> {
        self.last_motion_at
    }

    pub fn last_update_at(&self) -> Millis {
        self.last_update_at
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn stream_url(&self) -> Option<&str> {
        self.stream_url.as_deref()
    }

    pub fn is_eligible(&self) -> bool {
        self.access_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraStore {
    records: Vec<CameraRecord>,
}

impl CameraStore {
    pub fn from_config(config: &CardConfig) -> Self {
        let records = config
            .cameras
            .iter()
            .map(|camera| CameraRecord::new(camera.entity.clone(), camera.motion_entity_ids()))
            .collect();
        Self { records }
    }

    #[cfg(test)]
    pub(crate) fn from_records(records: Vec<CameraRecord>) -> Self {
        Self { records }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CameraRecord> {
        self.records.iter()
    }

    pub fn get(&self, index: usize) -> Option<&CameraRecord> {
        self.records.get(index)
    }

    pub fn position(&self, entity_id: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.entity_id == entity_id)
    }

    pub fn find(&self, entity_id: &str) -> Option<&CameraRecord> {
        self.position(entity_id).and_then(|index| self.get(index))
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut CameraRecord> {
        self.records.iter_mut()
    }

    pub fn as_slice(&self) -> &[CameraRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::{CameraRecord, CameraStore};
    use crate::config::CardConfig;

    #[test]
    fn store_keeps_configuration_order() {
        let config = CardConfig::from_json_str(
            r#"{"cameras":[{"entity":"camera.b","motion_entity":"binary_sensor.b"},{"entity":"camera.a"}]}"#,
        )
        .expect("config should parse");
        let store = CameraStore::from_config(&config);

        let ids: Vec<_> = store.iter().map(CameraRecord::entity_id).collect();
        assert_eq!(ids, vec!["camera.b", "camera.a"]);
        assert_eq!(store.position("camera.a"), Some(1));
        assert_eq!(store.position("camera.c"), None);
        assert_eq!(
            store.find("camera.b").map(CameraRecord::motion_entity_ids),
            Some(&["binary_sensor.b".to_owned()][..])
        );
    }

    #[test]
    fn new_record_is_ineligible_without_urls() {
        let record = CameraRecord::new("camera.a", Vec::new());
        assert!(!record.is_eligible());
        assert_eq!(record.thumbnail_url(), None);
        assert_eq!(record.stream_url(), None);
        assert_eq!(record.label(), "camera.a");
    }

    #[test]
    fn empty_token_is_not_eligible() {
        let mut record = CameraRecord::new("camera.a", Vec::new());
        record.access_token = Some(String::new());
        assert!(!record.is_eligible());
        record.access_token = Some("t".to_owned());
        assert!(record.is_eligible());
    }
}
