use crate::hass::{CameraImage, HassClient};
use crate::record::Millis;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub data_uri: String,
    pub size_bytes: usize,
    pub fetched_at: Millis,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedThumbnail {
    pub entity_id: String,
    pub image: Option<CameraImage>,
}

/// Latest still per camera. `None` marks a failed fetch; the renderer shows a
/// placeholder for it.
#[derive(Debug, Clone, Default)]
pub struct ThumbnailCache {
    entries: HashMap<String, Option<Thumbnail>>,
}

impl ThumbnailCache {
    pub fn apply(&mut self, fetched: Vec<FetchedThumbnail>, now: Millis) {
        for item in fetched {
            let thumbnail = item.image.map(|image| Thumbnail {
                data_uri: image.data_uri(),
                size_bytes: image.bytes.len(),
                fetched_at: now,
            });
            self.entries.insert(item.entity_id, thumbnail);
        }
    }

    pub fn get(&self, entity_id: &str) -> Option<&Thumbnail> {
        self.entries.get(entity_id).and_then(Option::as_ref)
    }

    pub fn is_known(&self, entity_id: &str) -> bool {
        self.entries.contains_key(entity_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Fetches every listed camera concurrently. Failures become `None` and never
/// hold back the other cameras.
pub async fn fetch_thumbnails(client: HassClient, entity_ids: Vec<String>) -> Vec<FetchedThumbnail> {
    let mut join_set = tokio::task::JoinSet::new();
    for (order, entity_id) in entity_ids.into_iter().enumerate() {
        let client = client.clone();
        join_set.spawn(async move {
            let image = match client.fetch_camera_image(&entity_id).await {
                Ok(image) => {
                    debug!(camera = %entity_id, bytes = image.bytes.len(), "thumbnail fetched");
                    Some(image)
                }
                Err(err) => {
                    warn!(camera = %entity_id, "thumbnail fetch failed: {err:#}");
                    None
                }
            };
            (order, FetchedThumbnail { entity_id, image })
        });
    }

    let mut fetched = Vec::with_capacity(join_set.len());
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok(item) => fetched.push(item),
            Err(err) => warn!("thumbnail worker task failed: {err}"),
        }
    }
    fetched.sort_by_key(|(order, _)| *order);
    fetched.into_iter().map(|(_, item)| item).collect()
}
