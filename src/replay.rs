use crate::card::{PassReport, SurveillanceCard};
use crate::cli::ReplayArgs;
use crate::config;
use crate::record::Millis;
use crate::snapshot::{Snapshot, StateObject};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ReplayFrame {
    pub at_ms: Millis,
    #[serde(default)]
    pub states: Vec<StateObject>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayLine {
    pub report: PassReport,
    pub order: Vec<String>,
}

pub fn load_frames(path: &Path) -> Result<Vec<ReplayFrame>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading snapshot file at {}", path.display()))?;
    let mut frames = serde_json::from_str::<Vec<ReplayFrame>>(&raw)
        .with_context(|| format!("failed parsing snapshot file at {}", path.display()))?;
    frames.sort_by_key(|frame| frame.at_ms);
    Ok(frames)
}

/// Pushes each frame at its timestamp, firing due timers in between, then
/// lets timers run for `tail_ms` past the last frame.
pub fn replay(card: &mut SurveillanceCard, frames: Vec<ReplayFrame>, tail_ms: u64) -> Vec<ReplayLine> {
    let mut lines = Vec::new();
    let mut last_at = 0;
    for frame in frames {
        drain_timers(card, frame.at_ms, &mut lines);
        let snapshot = Snapshot::from_states(frame.states);
        if let Some(report) = card.on_snapshot(snapshot, frame.at_ms) {
            lines.push(line_for(card, report));
        }
        last_at = frame.at_ms;
    }
    drain_timers(card, last_at.saturating_add(tail_ms), &mut lines);
    card.teardown();
    lines
}

fn drain_timers(card: &mut SurveillanceCard, until: Millis, lines: &mut Vec<ReplayLine>) {
    while let Some(deadline) = card.next_deadline()
        && deadline <= until
    {
        if let Some(report) = card.tick(deadline) {
            lines.push(line_for(card, report));
        }
    }
}

fn line_for(card: &SurveillanceCard, report: PassReport) -> ReplayLine {
    let order = card
        .thumbnails()
        .iter()
        .map(|record| {
            if record.has_motion() {
                format!("{}*", record.entity_id())
            } else {
                record.entity_id().to_owned()
            }
        })
        .collect();
    ReplayLine { report, order }
}

pub fn run_replay(args: &ReplayArgs) -> Result<()> {
    let config = config::load_from_path(&args.config)?;
    let tail_ms = args.tail_ms.unwrap_or_else(|| config.poll_interval_ms());
    let mut card = SurveillanceCard::new(config)?;
    let frames = load_frames(&args.snapshots)?;

    let lines = replay(&mut card, frames, tail_ms);
    if lines.is_empty() {
        println!("No reconciliation passes ran.");
        return Ok(());
    }

    println!(
        "{:>10}  {:<28}  {:<28}  THUMBNAILS",
        "AT_MS", "SELECTED", "ACTIVATED"
    );
    for line in &lines {
        let selected = if line.report.selection_changed {
            format!("{} (new)", line.report.selected)
        } else {
            line.report.selected.clone()
        };
        println!(
            "{:>10}  {:<28}  {:<28}  {}",
            line.report.at,
            selected,
            line.report.activated.join(","),
            line.order.join(" ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ReplayFrame, replay};
    use crate::card::SurveillanceCard;
    use crate::config::CardConfig;

    fn frames(raw: &str) -> Vec<ReplayFrame> {
        serde_json::from_str(raw).expect("frames should parse")
    }

    fn card() -> SurveillanceCard {
        let config = CardConfig::from_json_str(
            r#"{"thumb_interval":5,"cameras":[
                {"entity":"camera.a","motion_entity":"binary_sensor.a"},
                {"entity":"camera.b","motion_entity":"binary_sensor.b"}
            ]}"#,
        )
        .expect("config should parse");
        SurveillanceCard::new(config).expect("card should build")
    }

    #[test]
    fn replay_coalesces_bursts_and_tracks_focus() {
        let camera_states = r#"
            {"entity_id":"camera.a","state":"idle","attributes":{"access_token":"ta"}},
            {"entity_id":"camera.b","state":"idle","attributes":{"access_token":"tb"}}"#;
        let raw = format!(
            r#"[
                {{"at_ms":0,"states":[{camera_states}]}},
                {{"at_ms":1000,"states":[{camera_states},{{"entity_id":"binary_sensor.a","state":"on"}}]}},
                {{"at_ms":2000,"states":[{camera_states},{{"entity_id":"binary_sensor.b","state":"on"}}]}}
            ]"#
        );

        let lines = replay(&mut card(), frames(&raw), 0);
        let at: Vec<_> = lines.iter().map(|line| line.report.at).collect();
        assert_eq!(at, vec![0]);

        let lines = replay(&mut card(), frames(&raw), 5_000);
        let at: Vec<_> = lines.iter().map(|line| line.report.at).collect();
        assert_eq!(at, vec![0, 5_000]);

        let trailing = &lines[1];
        assert_eq!(trailing.report.activated, vec!["camera.b".to_owned()]);
        assert_eq!(trailing.report.selected, "camera.b");
        assert_eq!(trailing.order, vec!["camera.b*".to_owned(), "camera.a".to_owned()]);
    }
}
