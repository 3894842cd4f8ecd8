use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const MOTION_ACTIVE_STATE: &str = "on";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_picture: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub attributes: EntityAttributes,
}

impl EntityState {
    pub fn is_active(&self) -> bool {
        self.state == MOTION_ACTIVE_STATE
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StateObject {
    pub entity_id: String,
    #[serde(flatten)]
    pub entity: EntityState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entities: HashMap<String, EntityState>,
}

impl Snapshot {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_states(states: Vec<StateObject>) -> Self {
        let entities = states
            .into_iter()
            .map(|object| (object.entity_id, object.entity))
            .collect();
        Self { entities }
    }

    #[cfg(test)]
    pub fn insert(&mut self, entity_id: impl Into<String>, state: EntityState) {
        self.entities.insert(entity_id.into(), state);
    }

    pub fn get(&self, entity_id: &str) -> Option<&EntityState> {
        self.entities.get(entity_id)
    }

    pub fn is_active(&self, entity_id: &str) -> bool {
        self.get(entity_id).is_some_and(EntityState::is_active)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[cfg(test)]
    pub fn with_entity(mut self, entity_id: &str, state: &str) -> Self {
        self.insert(
            entity_id,
            EntityState {
                state: state.to_owned(),
                attributes: EntityAttributes::default(),
            },
        );
        self
    }

    #[cfg(test)]
    pub fn with_camera(mut self, entity_id: &str, access_token: &str, friendly_name: &str) -> Self {
        self.insert(
            entity_id,
            EntityState {
                state: "idle".to_owned(),
                attributes: EntityAttributes {
                    access_token: Some(access_token.to_owned()),
                    friendly_name: Some(friendly_name.to_owned()),
                    entity_picture: None,
                },
            },
        );
        self
    }
}
