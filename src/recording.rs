use crate::hass::HassClient;
use crate::record::Millis;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub const FRAME_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Recording,
    Snapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingPlan {
    pub kind: CaptureKind,
    pub entity_id: String,
    pub label: String,
    pub frames: u32,
    pub interval: Duration,
    pub started_at: Millis,
}

impl RecordingPlan {
    pub fn recording(entity_id: &str, label: &str, duration_secs: u64, started_at: Millis) -> Self {
        Self {
            kind: CaptureKind::Recording,
            entity_id: entity_id.to_owned(),
            label: label.to_owned(),
            frames: u32::try_from(duration_secs.max(1)).unwrap_or(u32::MAX),
            interval: FRAME_INTERVAL,
            started_at,
        }
    }

    pub fn snapshot(entity_id: &str, label: &str, started_at: Millis) -> Self {
        Self {
            kind: CaptureKind::Snapshot,
            entity_id: entity_id.to_owned(),
            label: label.to_owned(),
            frames: 1,
            interval: FRAME_INTERVAL,
            started_at,
        }
    }

    pub fn frame_file_name(&self, frame: u32, extension: &str) -> String {
        let stem = self.entity_id.replace('.', "_");
        format!("{stem}_{}_{frame:03}.{extension}", self.started_at)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingStatus {
    pub frames_written: u32,
    pub frames_failed: u32,
    pub finished: bool,
    pub last_error: Option<String>,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct RecordingProgress {
    inner: RwLock<RecordingStatus>,
}

impl RecordingProgress {
    fn frame_written(&self, path: PathBuf) {
        let mut status = self.inner.write();
        status.frames_written = status.frames_written.saturating_add(1);
        status.files.push(path);
    }

    fn frame_failed(&self, err: String) {
        let mut status = self.inner.write();
        status.frames_failed = status.frames_failed.saturating_add(1);
        status.last_error = Some(err);
    }

    fn finish(&self) {
        self.inner.write().finished = true;
    }

    pub fn snapshot(&self) -> RecordingStatus {
        self.inner.read().clone()
    }
}

pub async fn run_recording(
    client: HassClient,
    plan: RecordingPlan,
    out_dir: PathBuf,
    progress: Arc<RecordingProgress>,
) -> Result<()> {
    tokio::fs::create_dir_all(&out_dir)
        .await
        .with_context(|| format!("failed creating recording directory {}", out_dir.display()))?;

    info!(
        camera = %plan.entity_id,
        frames = plan.frames,
        kind = ?plan.kind,
        "capture started"
    );
    let mut ticker = tokio::time::interval(plan.interval);
    for frame in 0..plan.frames {
        ticker.tick().await;
        match capture_frame(&client, &plan, frame, &out_dir).await {
            Ok(path) => progress.frame_written(path),
            Err(err) => {
                warn!(camera = %plan.entity_id, frame, "frame capture failed: {err:#}");
                progress.frame_failed(format!("{err:#}"));
            }
        }
    }
    progress.finish();
    let status = progress.snapshot();
    info!(
        camera = %plan.entity_id,
        written = status.frames_written,
        failed = status.frames_failed,
        "capture finished"
    );
    Ok(())
}

async fn capture_frame(
    client: &HassClient,
    plan: &RecordingPlan,
    frame: u32,
    out_dir: &Path,
) -> Result<PathBuf> {
    let image = client.fetch_camera_image(&plan.entity_id).await?;
    let path = out_dir.join(plan.frame_file_name(frame, image.file_extension()));
    tokio::fs::write(&path, &image.bytes)
        .await
        .with_context(|| format!("failed writing frame {}", path.display()))?;
    Ok(path)
}
