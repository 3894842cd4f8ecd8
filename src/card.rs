use crate::config::{CardConfig, ConfigError};
use crate::ordering;
use crate::reconcile::{RefreshIntervals, reconcile_all};
use crate::record::{CameraRecord, CameraStore, Millis};
use crate::recording::RecordingPlan;
use crate::scheduler::PollScheduler;
use crate::selection::select_after_reconcile;
use crate::snapshot::Snapshot;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub at: Millis,
    pub activated: Vec<String>,
    pub refreshed: Vec<String>,
    pub selected: String,
    pub selection_changed: bool,
}

#[derive(Debug)]
pub struct SurveillanceCard {
    config: CardConfig,
    intervals: RefreshIntervals,
    store: CameraStore,
    selected: usize,
    scheduler: PollScheduler<Arc<Snapshot>>,
}

impl SurveillanceCard {
    pub fn new(config: CardConfig) -> Result<Self, ConfigError> {
        let config = config.validated()?;
        let store = CameraStore::from_config(&config);
        let intervals = RefreshIntervals::from_config(&config);
        let scheduler = PollScheduler::new(intervals.poll_interval_ms);
        Ok(Self {
            config,
            intervals,
            store,
            selected: 0,
            scheduler,
        })
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    /// Host pushed a new snapshot. Runs a pass unless one ran within the
    /// poll interval, in which case the snapshot is held for the next one.
    pub fn on_snapshot(&mut self, snapshot: Snapshot, now: Millis) -> Option<PassReport> {
        let args = self.scheduler.push(Arc::new(snapshot), now)?;
        Some(self.run_pass(&args, now))
    }

    pub fn tick(&mut self, now: Millis) -> Option<PassReport> {
        let args = self.scheduler.poll(now)?;
        Some(self.run_pass(&args, now))
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.scheduler.next_deadline()
    }

    fn run_pass(&mut self, snapshot: &Snapshot, now: Millis) -> PassReport {
        let outcome = reconcile_all(&mut self.store, snapshot, now, self.intervals);
        let previous = self.selected;
        self.selected = select_after_reconcile(
            &self.store,
            previous,
            &outcome.activated,
            self.config.focus_motion,
        );

        let report = PassReport {
            at: now,
            activated: self.entity_ids(&outcome.activated),
            refreshed: self.entity_ids(&outcome.refreshed),
            selected: self.selected().entity_id().to_owned(),
            selection_changed: previous != self.selected,
        };
        debug!(
            at = now,
            activated = ?report.activated,
            refreshed = report.refreshed.len(),
            "reconciliation pass"
        );
        if report.selection_changed {
            info!(
                from = self.store.get(previous).map_or("", CameraRecord::entity_id),
                to = %report.selected,
                "focused camera changed"
            );
        }
        report
    }

    fn entity_ids(&self, indexes: &[usize]) -> Vec<String> {
        indexes
            .iter()
            .filter_map(|index| self.store.get(*index))
            .map(|record| record.entity_id().to_owned())
            .collect()
    }

    pub fn cameras(&self) -> &[CameraRecord] {
        self.store.as_slice()
    }

    pub fn ordered(&self) -> Vec<&CameraRecord> {
        ordering::ordered(&self.store)
    }

    pub fn thumbnails(&self) -> Vec<&CameraRecord> {
        ordering::thumbnails(&self.store)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected(&self) -> &CameraRecord {
        // The store is built from a validated, non-empty camera list and the
        // selection policy only returns indexes inside it.
        &self.store.as_slice()[self.selected]
    }

    /// Click on a thumbnail. Unknown or currently ineligible cameras are
    /// ignored.
    pub fn select_camera(&mut self, entity_id: &str) -> bool {
        let Some(index) = self.store.position(entity_id) else {
            return false;
        };
        if !self.store.get(index).is_some_and(CameraRecord::is_eligible) {
            return false;
        }
        if index != self.selected {
            info!(camera = entity_id, "camera selected");
        }
        self.selected = index;
        true
    }

    pub fn record_sequence(&self, entity_id: &str, now: Millis) -> Option<RecordingPlan> {
        let record = self.capturable(entity_id)?;
        Some(RecordingPlan::recording(
            record.entity_id(),
            record.label(),
            self.config.recording_duration,
            now,
        ))
    }

    pub fn capture_snapshot(&self, entity_id: &str, now: Millis) -> Option<RecordingPlan> {
        let record = self.capturable(entity_id)?;
        Some(RecordingPlan::snapshot(record.entity_id(), record.label(), now))
    }

    fn capturable(&self, entity_id: &str) -> Option<&CameraRecord> {
        self.store.find(entity_id).filter(|record| record.is_eligible())
    }

    /// Stops the scheduler. No pass runs after this; calling it again is a
    /// no-op.
    pub fn teardown(&mut self) {
        self.scheduler.cancel();
    }
}
