use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_THUMB_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 1;
pub const DEFAULT_RECORDING_DURATION_SECS: u64 = 10;

/// Fatal configuration problems. Anything else the card meets at runtime
/// degrades a camera instead of failing.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no cameras configured; add at least one entry under `cameras`")]
    NoCameras,

    #[error("camera #{index} has an empty `entity`")]
    EmptyEntityId { index: usize },

    #[error("camera '{0}' is configured more than once")]
    DuplicateCamera(String),

    #[error("failed reading card config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed parsing card config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbPosition {
    #[default]
    Left,
    Right,
    Top,
    Bottom,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub entity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_entity: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub motion_entities: Vec<String>,
}

impl CameraConfig {
    pub fn motion_entity_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.motion_entity
            .iter()
            .chain(self.motion_entities.iter())
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .filter(|id| seen.insert(id.to_owned()))
            .map(str::to_owned)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub cameras: Vec<CameraConfig>,
    pub focus_motion: bool,
    pub thumb_interval: u64,
    pub update_interval: u64,
    pub recording_duration: u64,
    pub show_capture_buttons: bool,
    pub thumb_position: ThumbPosition,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            cameras: Vec::new(),
            focus_motion: true,
            thumb_interval: DEFAULT_THUMB_INTERVAL_SECS,
            update_interval: DEFAULT_UPDATE_INTERVAL_SECS,
            recording_duration: DEFAULT_RECORDING_DURATION_SECS,
            show_capture_buttons: true,
            thumb_position: ThumbPosition::Left,
        }
    }
}

impl CardConfig {
    #[cfg(test)]
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(raw)
            .map_err(|source| ConfigError::Parse {
                path: PathBuf::from("<inline>"),
                source,
            })?
            .validated()
    }

    pub fn validated(mut self) -> Result<Self, ConfigError> {
        if self.cameras.is_empty() {
            return Err(ConfigError::NoCameras);
        }

        let mut seen = HashSet::new();
        for (index, camera) in self.cameras.iter_mut().enumerate() {
            let trimmed = camera.entity.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::EmptyEntityId { index });
            }
            if trimmed.len() != camera.entity.len() {
                camera.entity = trimmed.to_owned();
            }
            if !seen.insert(camera.entity.clone()) {
                return Err(ConfigError::DuplicateCamera(camera.entity.clone()));
            }
        }

        if self.thumb_interval == 0 {
            self.thumb_interval = DEFAULT_THUMB_INTERVAL_SECS;
        }
        if self.update_interval == 0 {
            self.update_interval = DEFAULT_UPDATE_INTERVAL_SECS;
        }
        if self.recording_duration == 0 {
            self.recording_duration = DEFAULT_RECORDING_DURATION_SECS;
        }
        Ok(self)
    }

    pub fn poll_interval_ms(&self) -> u64 {
        self.thumb_interval.saturating_mul(1000)
    }
}

pub fn load_from_path(path: &Path) -> Result<CardConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = serde_json::from_str::<CardConfig>(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    parsed.validated()
}

#[cfg(test)]
mod tests {
    use super::{CardConfig, ConfigError, ThumbPosition, load_from_path};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_path(label: &str) -> PathBuf {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("surveillance-config-{label}-{pid}-{timestamp}.json"))
    }

    #[test]
    fn defaults_apply_to_minimal_config() {
        let config = CardConfig::from_json_str(r#"{"cameras":[{"entity":"camera.front"}]}"#)
            .expect("minimal config should parse");
        assert!(config.focus_motion);
        assert_eq!(config.thumb_interval, 10);
        assert_eq!(config.update_interval, 1);
        assert_eq!(config.recording_duration, 10);
        assert!(config.show_capture_buttons);
        assert_eq!(config.thumb_position, ThumbPosition::Left);
        assert_eq!(config.poll_interval_ms(), 10_000);
    }

    #[test]
    fn missing_or_empty_camera_list_is_rejected() {
        assert!(matches!(
            CardConfig::from_json_str("{}"),
            Err(ConfigError::NoCameras)
        ));
        assert!(matches!(
            CardConfig::from_json_str(r#"{"cameras":[]}"#),
            Err(ConfigError::NoCameras)
        ));
    }

    #[test]
    fn duplicate_and_blank_entities_are_rejected() {
        let duplicate = CardConfig::from_json_str(
            r#"{"cameras":[{"entity":"camera.a"},{"entity":" camera.a "}]}"#,
        );
        assert!(matches!(duplicate, Err(ConfigError::DuplicateCamera(id)) if id == "camera.a"));

        let blank = CardConfig::from_json_str(r#"{"cameras":[{"entity":"camera.a"},{"entity":"  "}]}"#);
        assert!(matches!(blank, Err(ConfigError::EmptyEntityId { index: 1 })));
    }

    #[test]
    fn zero_intervals_fall_back_to_defaults() {
        let config = CardConfig::from_json_str(
            r#"{"cameras":[{"entity":"camera.a"}],"thumb_interval":0,"update_interval":0,"recording_duration":0}"#,
        )
        .expect("config should parse");
        assert_eq!(config.thumb_interval, 10);
        assert_eq!(config.update_interval, 1);
        assert_eq!(config.recording_duration, 10);
    }

    #[test]
    fn motion_entities_merge_in_order_without_repeats() {
        let config = CardConfig::from_json_str(
            r#"{"cameras":[{"entity":"camera.a","motion_entity":"binary_sensor.a","motion_entities":["binary_sensor.b","binary_sensor.a",""]}]}"#,
        )
        .expect("config should parse");
        assert_eq!(
            config.cameras[0].motion_entity_ids(),
            vec!["binary_sensor.a".to_owned(), "binary_sensor.b".to_owned()]
        );
    }

    #[test]
    fn thumb_position_accepts_lowercase_names() {
        let config = CardConfig::from_json_str(
            r#"{"cameras":[{"entity":"camera.a"}],"thumb_position":"none","focus_motion":false}"#,
        )
        .expect("config should parse");
        assert_eq!(config.thumb_position, ThumbPosition::None);
        assert!(!config.focus_motion);
    }

    #[test]
    fn malformed_inline_json_is_a_parse_error() {
        let result = CardConfig::from_json_str(r#"{"cameras":[{"entity":}]}"#);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_from_path_reports_read_and_parse_failures() {
        let missing = unique_temp_path("missing");
        assert!(matches!(load_from_path(&missing), Err(ConfigError::Read { .. })));

        let broken = unique_temp_path("broken");
        fs::write(&broken, "{ not json").expect("fixture should write");
        assert!(matches!(load_from_path(&broken), Err(ConfigError::Parse { .. })));
        let _ = fs::remove_file(broken);

        let valid = unique_temp_path("valid");
        fs::write(&valid, r#"{"cameras":[{"entity":"camera.porch","motion_entity":"binary_sensor.porch"}]}"#)
            .expect("fixture should write");
        let config = load_from_path(&valid).expect("config should load");
        assert_eq!(config.cameras[0].entity, "camera.porch");
        let _ = fs::remove_file(valid);
    }
}
