use crate::card::{PassReport, SurveillanceCard};
use crate::cli::WatchArgs;
use crate::config::{self, ThumbPosition};
use crate::hass::HassClient;
use crate::logging;
use crate::record::{CameraRecord, Millis};
use crate::recording::{self, CaptureKind, RecordingPlan, RecordingProgress};
use crate::snapshot::Snapshot;
use crate::storage::{self, now_millis};
use crate::theme::{self, ThemePalette};
use crate::thumbnails::{self, FetchedThumbnail, ThumbnailCache};
use anyhow::{Context, Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{info, warn};

const UI_IDLE_SLEEP: Duration = Duration::from_millis(16);
const STATE_RETRY_INTERVAL: Duration = Duration::from_secs(5);
const THUMB_TILE_HEIGHT: u16 = 5;
const THUMB_TILE_WIDTH: u16 = 28;
const VISIBLE_CAPTURES: usize = 3;

const GLYPH_ACTIVE: &str = "▸";
const GLYPH_MOTION: &str = "●";
const GLYPH_IDLE: &str = "○";
const GLYPH_REC: &str = "◉";

static THEME: OnceLock<ThemePalette> = OnceLock::new();

pub async fn run_watch(args: &WatchArgs) -> Result<()> {
    let config = config::load_from_path(&args.config)?;
    let card = SurveillanceCard::new(config)?;
    let client = HassClient::new(
        &args.url,
        args.token.clone(),
        Duration::from_millis(args.timeout_ms.max(100)),
    )?;
    let recordings_dir = match &args.recordings_dir {
        Some(dir) => dir.clone(),
        None => storage::recordings_dir()?,
    };
    let state_poll_interval = if args.state_poll_ms == 0 {
        Duration::from_secs(card.config().update_interval)
    } else {
        Duration::from_millis(args.state_poll_ms)
    };

    let log_path = match logging::init_file() {
        Ok(path) => Some(path),
        Err(err) => {
            eprintln!("Warning: file logging disabled ({err:#}).");
            None
        }
    };
    let loaded_theme = match theme::load_or_create_theme() {
        Ok(palette) => palette,
        Err(err) => {
            warn!("failed to load theme config ({err:#}), using defaults");
            ThemePalette::default()
        }
    };
    let _ = THEME.set(loaded_theme);

    info!(
        host = client.base_url(),
        cameras = card.cameras().len(),
        "dashboard starting"
    );
    let mut terminal = init_terminal()?;
    let mut app = App::new(card, client, state_poll_interval, recordings_dir, log_path);

    let run_result = run_loop(&mut terminal, &mut app).await;
    let restore_result = restore_terminal(&mut terminal);

    run_result?;
    restore_result?;
    Ok(())
}

async fn run_loop(terminal: &mut AppTerminal, app: &mut App) -> Result<()> {
    let mut running = true;
    let mut force_ui_draw = true;
    let mut last_ui_signature = None;

    while running {
        app.sync_state_fetch();
        app.poll_state_result().await;
        app.tick_card();
        app.sync_thumbnail_fetch();
        app.poll_thumbnail_result().await;
        app.poll_captures().await;

        let current_ui_signature = app.ui_state_signature();
        let should_draw_ui =
            force_ui_draw || last_ui_signature.is_none_or(|prev| prev != current_ui_signature);
        if should_draw_ui {
            terminal
                .draw(|frame| app.draw(frame))
                .context("failed drawing TUI frame")?;
            last_ui_signature = Some(current_ui_signature);
            force_ui_draw = false;
        }

        while event::poll(Duration::ZERO).context("failed to poll input")? {
            match event::read().context("failed reading input")? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match app.handle_key(key) {
                        AppCommand::None => {}
                        AppCommand::Quit => {
                            running = false;
                            break;
                        }
                    }
                    force_ui_draw = true;
                }
                Event::Resize(_, _) => {
                    force_ui_draw = true;
                    last_ui_signature = None;
                }
                _ => {}
            }
        }

        if !running {
            break;
        }
        tokio::time::sleep(UI_IDLE_SLEEP).await;
    }

    app.shutdown();
    Ok(())
}

type AppTerminal = Terminal<CrosstermBackend<io::Stdout>>;

fn active_theme() -> &'static ThemePalette {
    THEME.get_or_init(ThemePalette::default)
}

fn init_terminal() -> Result<AppTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed entering alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("failed creating terminal")
}

fn restore_terminal(terminal: &mut AppTerminal) -> Result<()> {
    disable_raw_mode().context("failed disabling raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed leaving alternate screen")?;
    terminal.show_cursor().context("failed showing cursor")?;
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AppCommand {
    None,
    Quit,
}

struct ActiveCapture {
    plan: RecordingPlan,
    progress: Arc<RecordingProgress>,
    handle: Option<JoinHandle<Result<()>>>,
    error: Option<String>,
}

struct App {
    card: SurveillanceCard,
    client: HassClient,
    cursor: usize,
    status: String,
    log_path: Option<PathBuf>,
    state_poll_interval: Duration,
    next_state_fetch_at: Option<Instant>,
    pending_states: Option<JoinHandle<Result<Snapshot>>>,
    host_reachable: Option<bool>,
    last_pass_at: Option<Millis>,
    thumbnails: ThumbnailCache,
    thumbnail_queue: Vec<String>,
    pending_thumbnails: Option<JoinHandle<Vec<FetchedThumbnail>>>,
    recordings_dir: PathBuf,
    captures: Vec<ActiveCapture>,
}

impl App {
    fn new(
        card: SurveillanceCard,
        client: HassClient,
        state_poll_interval: Duration,
        recordings_dir: PathBuf,
        log_path: Option<PathBuf>,
    ) -> Self {
        Self {
            card,
            client,
            cursor: 0,
            status: "Connecting to host...".to_owned(),
            log_path,
            state_poll_interval,
            next_state_fetch_at: Some(Instant::now()),
            pending_states: None,
            host_reachable: None,
            last_pass_at: None,
            thumbnails: ThumbnailCache::default(),
            thumbnail_queue: Vec::new(),
            pending_thumbnails: None,
            recordings_dir,
            captures: Vec::new(),
        }
    }

    fn sync_state_fetch(&mut self) {
        if self.pending_states.is_some() {
            return;
        }
        let should_start = self
            .next_state_fetch_at
            .is_none_or(|next| Instant::now() >= next);
        if !should_start {
            return;
        }
        self.next_state_fetch_at = None;
        let client = self.client.clone();
        self.pending_states = Some(tokio::spawn(async move { client.fetch_states().await }));
    }

    async fn poll_state_result(&mut self) {
        let Some(handle) = self.pending_states.take() else {
            return;
        };
        if !handle.is_finished() {
            self.pending_states = Some(handle);
            return;
        }

        let result = match handle.await {
            Ok(result) => result,
            Err(err) => Err(anyhow!("state fetch task failed: {err}")),
        };
        match result {
            Ok(snapshot) => {
                if self.host_reachable != Some(true) {
                    self.status = format!("Connected to {}", self.client.base_url());
                    info!(entities = snapshot.len(), "host state received");
                }
                self.host_reachable = Some(true);
                if let Some(report) = self.card.on_snapshot(snapshot, now_millis()) {
                    self.apply_pass(report);
                }
                self.next_state_fetch_at = Some(Instant::now() + self.state_poll_interval);
            }
            Err(err) => {
                if self.host_reachable != Some(false) {
                    warn!("host state fetch failed: {err:#}");
                }
                self.host_reachable = Some(false);
                self.status = format!("Host unreachable: {err:#}");
                self.next_state_fetch_at = Some(Instant::now() + STATE_RETRY_INTERVAL);
            }
        }
    }

    fn tick_card(&mut self) {
        let now = now_millis();
        let due = self.card.next_deadline().is_some_and(|deadline| deadline <= now);
        if !due {
            return;
        }
        if let Some(report) = self.card.tick(now) {
            self.apply_pass(report);
        }
    }

    fn apply_pass(&mut self, report: PassReport) {
        self.last_pass_at = Some(report.at);
        for entity_id in report.refreshed {
            let eligible = self
                .card
                .cameras()
                .iter()
                .any(|record| record.entity_id() == entity_id && record.is_eligible());
            if eligible && !self.thumbnail_queue.contains(&entity_id) {
                self.thumbnail_queue.push(entity_id);
            }
        }
        if report.selection_changed && !report.activated.is_empty() {
            let label = self.card.selected().label().to_owned();
            self.status = format!("Motion: focused {label}");
        }
        self.clamp_cursor();
    }

    fn sync_thumbnail_fetch(&mut self) {
        if self.pending_thumbnails.is_some() || self.thumbnail_queue.is_empty() {
            return;
        }
        let entity_ids = std::mem::take(&mut self.thumbnail_queue);
        let client = self.client.clone();
        self.pending_thumbnails = Some(tokio::spawn(thumbnails::fetch_thumbnails(
            client, entity_ids,
        )));
    }

    async fn poll_thumbnail_result(&mut self) {
        let Some(handle) = self.pending_thumbnails.take() else {
            return;
        };
        if !handle.is_finished() {
            self.pending_thumbnails = Some(handle);
            return;
        }
        match handle.await {
            Ok(fetched) => self.thumbnails.apply(fetched, now_millis()),
            Err(err) => warn!("thumbnail fetch task failed: {err}"),
        }
    }

    async fn poll_captures(&mut self) {
        for capture in &mut self.captures {
            let Some(handle) = capture.handle.take() else {
                continue;
            };
            if !handle.is_finished() {
                capture.handle = Some(handle);
                continue;
            }
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(anyhow!("capture task failed: {err}")),
            };
            match result {
                Ok(()) => {
                    let written = capture.progress.snapshot().frames_written;
                    self.status = format!(
                        "Saved {written} frame(s) of {} to {}",
                        capture.plan.label,
                        self.recordings_dir.display()
                    );
                }
                Err(err) => {
                    self.status = format!("Capture failed for {}: {err:#}", capture.plan.label);
                    capture.error = Some(format!("{err:#}"));
                }
            }
        }

        let finished = self
            .captures
            .iter()
            .filter(|capture| capture.handle.is_none())
            .count();
        if finished > VISIBLE_CAPTURES {
            let mut to_drop = finished - VISIBLE_CAPTURES;
            self.captures.retain(|capture| {
                if to_drop > 0 && capture.handle.is_none() {
                    to_drop -= 1;
                    false
                } else {
                    true
                }
            });
        }
    }

    fn start_capture(&mut self, plan: RecordingPlan) {
        let progress = Arc::new(RecordingProgress::default());
        let handle = tokio::spawn(recording::run_recording(
            self.client.clone(),
            plan.clone(),
            self.recordings_dir.clone(),
            Arc::clone(&progress),
        ));
        self.status = match plan.kind {
            CaptureKind::Recording => {
                format!("Recording {} for {}s...", plan.label, plan.frames)
            }
            CaptureKind::Snapshot => format!("Capturing snapshot of {}...", plan.label),
        };
        self.captures.push(ActiveCapture {
            plan,
            progress,
            handle: Some(handle),
            error: None,
        });
    }

    fn shutdown(&mut self) {
        self.card.teardown();
        if let Some(handle) = self.pending_states.take() {
            handle.abort();
        }
        if let Some(handle) = self.pending_thumbnails.take() {
            handle.abort();
        }
        for capture in &mut self.captures {
            if let Some(handle) = capture.handle.take() {
                warn!(camera = %capture.plan.entity_id, "capture aborted on exit");
                handle.abort();
            }
        }
        self.thumbnails.clear();
        info!("dashboard stopped");
    }

    fn thumbnail_ids(&self) -> Vec<String> {
        self.card
            .thumbnails()
            .iter()
            .map(|record| record.entity_id().to_owned())
            .collect()
    }

    fn clamp_cursor(&mut self) {
        let count = self.card.thumbnails().len();
        self.cursor = self.cursor.min(count.saturating_sub(1));
    }

    fn handle_key(&mut self, key: KeyEvent) -> AppCommand {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('q' | 'c'))
        {
            return AppCommand::Quit;
        }

        let ids = self.thumbnail_ids();
        match key.code {
            KeyCode::Up | KeyCode::Left | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Right | KeyCode::Char('j') => {
                if self.cursor + 1 < ids.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(entity_id) = ids.get(self.cursor) {
                    self.focus_camera(entity_id);
                }
            }
            KeyCode::Char(digit @ '1'..='9') => {
                let index = (digit as usize) - ('1' as usize);
                if let Some(entity_id) = ids.get(index) {
                    self.cursor = index;
                    self.focus_camera(entity_id);
                }
            }
            KeyCode::Char('r') if self.card.config().show_capture_buttons => {
                let entity_id = self.card.selected().entity_id().to_owned();
                match self.card.record_sequence(&entity_id, now_millis()) {
                    Some(plan) => self.start_capture(plan),
                    None => self.status = "Focused camera is unavailable for recording.".to_owned(),
                }
            }
            KeyCode::Char('s') if self.card.config().show_capture_buttons => {
                let entity_id = self.card.selected().entity_id().to_owned();
                match self.card.capture_snapshot(&entity_id, now_millis()) {
                    Some(plan) => self.start_capture(plan),
                    None => self.status = "Focused camera is unavailable for snapshots.".to_owned(),
                }
            }
            _ => {}
        }
        AppCommand::None
    }

    fn focus_camera(&mut self, entity_id: &str) {
        if self.card.select_camera(entity_id) {
            self.status = format!("Focused {}", self.card.selected().label());
        } else {
            self.status = format!("{entity_id} is not available");
        }
    }

    fn ui_state_signature(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        // Ages are shown in whole seconds.
        (now_millis() / 1_000).hash(&mut hasher);
        self.status.hash(&mut hasher);
        self.cursor.hash(&mut hasher);
        self.host_reachable.hash(&mut hasher);
        self.last_pass_at.hash(&mut hasher);
        self.card.selected_index().hash(&mut hasher);
        for record in self.card.cameras() {
            record.entity_id().hash(&mut hasher);
            record.has_motion().hash(&mut hasher);
            record.is_eligible().hash(&mut hasher);
            record.last_update_at().hash(&mut hasher);
            record.display_name().hash(&mut hasher);
            self.thumbnails
                .get(record.entity_id())
                .map(|thumb| thumb.fetched_at)
                .hash(&mut hasher);
        }
        for capture in &self.captures {
            let status = capture.progress.snapshot();
            status.frames_written.hash(&mut hasher);
            status.frames_failed.hash(&mut hasher);
            status.finished.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(8), Constraint::Length(4)])
            .split(frame.area());
        let body = layout[0];

        let position = self.card.config().thumb_position;
        match split_body(body, position) {
            (Some(thumbs), main) => {
                self.draw_thumbnails(frame, thumbs, position);
                self.draw_main_view(frame, main);
            }
            (None, main) => self.draw_main_view(frame, main),
        }
        self.draw_footer(frame, layout[1]);
    }

    fn draw_thumbnails(&self, frame: &mut ratatui::Frame<'_>, area: Rect, position: ThumbPosition) {
        let outer = panel_block("▦", "Cameras", false);
        let inner = outer.inner(area);
        frame.render_widget(outer, area);

        let records = self.card.thumbnails();
        if records.is_empty() {
            let waiting = if self.last_pass_at.is_some() {
                "No camera is available right now."
            } else {
                "Loading cameras..."
            };
            let mut lines = vec![Line::from(Span::styled(
                waiting,
                Style::default().fg(color_muted()),
            ))];
            if self.last_pass_at.is_some() {
                for record in self.card.ordered() {
                    lines.push(Line::from(Span::styled(
                        format!("{GLYPH_IDLE} {} (no access token)", record.label()),
                        Style::default().fg(color_muted()),
                    )));
                }
            }
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
            return;
        }

        let horizontal = matches!(position, ThumbPosition::Top | ThumbPosition::Bottom);
        let (span, tile) = if horizontal {
            (inner.width, THUMB_TILE_WIDTH)
        } else {
            (inner.height, THUMB_TILE_HEIGHT)
        };
        let capacity = usize::from((span / tile).max(1));
        let start = visible_window_start(self.cursor, capacity, records.len());
        let visible = &records[start..records.len().min(start + capacity)];

        let mut constraints = vec![Constraint::Length(tile); visible.len()];
        constraints.push(Constraint::Min(0));
        let tiles = Layout::default()
            .direction(if horizontal {
                Direction::Horizontal
            } else {
                Direction::Vertical
            })
            .constraints(constraints)
            .split(inner);

        let now = now_millis();
        let selected_id = self.card.selected().entity_id();
        for (offset, record) in visible.iter().enumerate() {
            let index = start + offset;
            let focused = record.entity_id() == selected_id;
            let under_cursor = index == self.cursor;
            frame.render_widget(
                self.thumbnail_tile(record, index, focused, under_cursor, now),
                tiles[offset],
            );
        }
    }

    fn thumbnail_tile(
        &self,
        record: &CameraRecord,
        index: usize,
        focused: bool,
        under_cursor: bool,
        now: Millis,
    ) -> Paragraph<'_> {
        let border_color = if record.has_motion() {
            color_motion()
        } else if focused {
            color_border_focused()
        } else {
            color_border()
        };
        let title = Line::from(vec![
            Span::styled(
                format!(" {}{} ", if under_cursor { GLYPH_ACTIVE } else { " " }, index + 1),
                Style::default()
                    .fg(color_accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                record.label().to_owned(),
                Style::default()
                    .fg(color_text())
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        let motion = if record.has_motion() {
            Span::styled(format!("{GLYPH_MOTION} motion"), Style::default().fg(color_motion()))
        } else {
            Span::styled(format!("{GLYPH_IDLE} idle"), Style::default().fg(color_muted()))
        };
        let lines = vec![
            Line::from(vec![
                motion,
                Span::styled(
                    format!("  updated {}", format_age(now, Some(record.last_update_at()))),
                    Style::default().fg(color_muted()),
                ),
            ]),
            Line::from(Span::styled(
                self.thumbnail_summary(record.entity_id()),
                Style::default().fg(color_muted()),
            )),
        ];

        Paragraph::new(lines).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
    }

    fn thumbnail_summary(&self, entity_id: &str) -> String {
        match self.thumbnails.get(entity_id) {
            Some(thumb) => format!("image {}", format_bytes(thumb.size_bytes)),
            None if self.thumbnails.is_known(entity_id) => "image unavailable".to_owned(),
            None => "image loading...".to_owned(),
        }
    }

    fn draw_main_view(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let record = self.card.selected();
        let now = now_millis();
        let mut body = Vec::new();

        if !record.is_eligible() {
            body.push(Line::from(vec![
                Span::styled(
                    format!("{GLYPH_ACTIVE} "),
                    Style::default()
                        .fg(color_warning())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    "Camera unavailable (no access token from host).",
                    Style::default()
                        .fg(color_text())
                        .add_modifier(Modifier::BOLD),
                ),
            ]));
        } else {
            let stream = record
                .stream_url()
                .and_then(|path| self.client.resolve(path).ok())
                .map(|url| url.to_string())
                .unwrap_or_default();
            body.push(labelled("stream", stream, color_accent()));
            let still = record
                .thumbnail_url()
                .and_then(|path| self.client.resolve(path).ok())
                .map(|url| url.to_string())
                .unwrap_or_default();
            body.push(labelled("still", still, color_muted()));
        }

        body.push(labelled("entity", record.entity_id().to_owned(), color_text()));
        let (motion_text, motion_color) = if record.has_motion() {
            (format!("{GLYPH_MOTION} motion detected"), color_motion())
        } else {
            (format!("{GLYPH_IDLE} no motion"), color_muted())
        };
        body.push(labelled("motion", motion_text, motion_color));
        body.push(labelled(
            "last motion",
            format_age(now, record.last_motion_at()),
            color_text(),
        ));
        body.push(labelled(
            "refreshed",
            format_age(now, Some(record.last_update_at()).filter(|at| *at > 0)),
            color_text(),
        ));
        body.push(labelled(
            "thumbnail",
            self.thumbnail_summary(record.entity_id()),
            color_text(),
        ));
        if !record.motion_entity_ids().is_empty() {
            body.push(labelled(
                "sensors",
                record.motion_entity_ids().join(", "),
                color_muted(),
            ));
        }

        let captures: Vec<_> = self
            .captures
            .iter()
            .rev()
            .take(VISIBLE_CAPTURES)
            .collect();
        if !captures.is_empty() {
            body.push(Line::default());
            for capture in captures {
                body.push(capture_line(capture));
            }
        }

        let mut block = panel_block("◉", record.label(), true);
        if record.has_motion() {
            block = block.border_style(Style::default().fg(color_motion()));
        }
        frame.render_widget(
            Paragraph::new(body)
                .style(Style::default().fg(color_text()))
                .block(block)
                .wrap(Wrap { trim: false }),
            area,
        );
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut hints = vec![("↑/↓", "Move"), ("Enter", "Focus"), ("1-9", "Jump")];
        if self.card.config().show_capture_buttons {
            hints.push(("r", "Record"));
            hints.push(("s", "Snapshot"));
        }
        hints.push(("Ctrl+Q", "Quit"));

        let mut lines = vec![Line::from(action_hint_spans(&hints))];
        let mut status_spans = vec![
            Span::styled("status ", Style::default().fg(color_muted())),
            Span::styled(
                self.status.clone(),
                status_message_style(&self.status).add_modifier(Modifier::BOLD),
            ),
        ];
        if let Some(path) = &self.log_path {
            status_spans.push(Span::styled(
                format!("  log {}", path.display()),
                Style::default().fg(color_muted()),
            ));
        }
        lines.push(Line::from(status_spans));

        let footer = Paragraph::new(lines)
            .style(Style::default().fg(color_text()))
            .block(panel_block("⌘", "Actions", false));
        frame.render_widget(footer, area);
    }
}

fn split_body(area: Rect, position: ThumbPosition) -> (Option<Rect>, Rect) {
    let (direction, thumbs_first, constraints) = match position {
        ThumbPosition::None => return (None, area),
        ThumbPosition::Left => (
            Direction::Horizontal,
            true,
            [Constraint::Percentage(25), Constraint::Percentage(75)],
        ),
        ThumbPosition::Right => (
            Direction::Horizontal,
            false,
            [Constraint::Percentage(75), Constraint::Percentage(25)],
        ),
        ThumbPosition::Top => (
            Direction::Vertical,
            true,
            [Constraint::Length(THUMB_TILE_HEIGHT + 2), Constraint::Min(6)],
        ),
        ThumbPosition::Bottom => (
            Direction::Vertical,
            false,
            [Constraint::Min(6), Constraint::Length(THUMB_TILE_HEIGHT + 2)],
        ),
    };
    let chunks = Layout::default()
        .direction(direction)
        .constraints(constraints)
        .split(area);
    if thumbs_first {
        (Some(chunks[0]), chunks[1])
    } else {
        (Some(chunks[1]), chunks[0])
    }
}

fn visible_window_start(cursor: usize, capacity: usize, len: usize) -> usize {
    if capacity == 0 || len <= capacity {
        return 0;
    }
    let max_start = len - capacity;
    cursor.saturating_sub(capacity - 1).min(max_start)
}

fn format_age(now: Millis, at: Option<Millis>) -> String {
    let Some(at) = at else {
        return "never".to_owned();
    };
    let secs = now.saturating_sub(at) / 1_000;
    match secs {
        0 => "just now".to_owned(),
        1..=59 => format!("{secs}s ago"),
        60..=3_599 => format!("{}m ago", secs / 60),
        _ => format!("{}h ago", secs / 3_600),
    }
}

fn format_bytes(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}

fn capture_line(capture: &ActiveCapture) -> Line<'static> {
    let status = capture.progress.snapshot();
    let kind = match capture.plan.kind {
        CaptureKind::Recording => "recording",
        CaptureKind::Snapshot => "snapshot",
    };
    let (state, color) = if let Some(err) = &capture.error {
        (format!("failed: {err}"), color_error())
    } else if status.finished {
        (
            format!("{}/{} frames saved", status.frames_written, capture.plan.frames),
            color_ok(),
        )
    } else {
        (
            format!(
                "{}/{} frames",
                status.frames_written + status.frames_failed,
                capture.plan.frames
            ),
            color_accent(),
        )
    };
    Line::from(vec![
        Span::styled(format!("{GLYPH_REC} "), Style::default().fg(color_motion())),
        Span::styled(
            format!("{kind} {} ", capture.plan.label),
            Style::default().fg(color_text()),
        ),
        Span::styled(state, Style::default().fg(color)),
    ])
}

fn labelled(label: &'static str, value: String, value_color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(color_muted())),
        Span::styled(value, Style::default().fg(value_color)),
    ])
}

fn color_text() -> Color {
    active_theme().text
}

fn color_muted() -> Color {
    active_theme().muted
}

fn color_border() -> Color {
    active_theme().border
}

fn color_border_focused() -> Color {
    active_theme().border_focused
}

fn color_accent() -> Color {
    active_theme().accent
}

fn color_motion() -> Color {
    active_theme().motion
}

fn color_ok() -> Color {
    active_theme().ok
}

fn color_warning() -> Color {
    active_theme().warning
}

fn color_error() -> Color {
    active_theme().error
}

fn panel_block<'a>(glyph: &'a str, title: &'a str, focused: bool) -> Block<'a> {
    let border_color = if focused {
        color_border_focused()
    } else {
        color_border()
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(vec![
            Span::styled(
                format!(" {glyph} "),
                Style::default()
                    .fg(color_accent())
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                title,
                Style::default()
                    .fg(color_text())
                    .add_modifier(Modifier::BOLD),
            ),
        ]))
}

fn action_hint_spans(hints: &[(&'static str, &'static str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    for (idx, (key, label)) in hints.iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  |  ", Style::default().fg(color_border())));
        }
        spans.push(Span::styled(
            format!("[{key}]"),
            Style::default()
                .fg(color_accent())
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(
            format!(" {label}"),
            Style::default().fg(color_muted()),
        ));
    }
    spans
}

fn status_message_style(status: &str) -> Style {
    let lower = status.to_ascii_lowercase();
    if lower.contains("fail") || lower.contains("unreachable") || lower.contains("not available") {
        Style::default().fg(color_error())
    } else if lower.starts_with("motion") || lower.starts_with("recording") {
        Style::default().fg(color_motion())
    } else if lower.contains("connected") || lower.contains("saved") || lower.contains("focused") {
        Style::default().fg(color_ok())
    } else {
        Style::default().fg(color_muted())
    }
}

#[cfg(test)]
mod tests {
    use super::{format_age, format_bytes, split_body, visible_window_start};
    use crate::config::ThumbPosition;
    use ratatui::layout::Rect;

    #[test]
    fn ages_render_in_coarse_units() {
        assert_eq!(format_age(10_000, None), "never");
        assert_eq!(format_age(10_000, Some(9_500)), "just now");
        assert_eq!(format_age(10_000, Some(1_000)), "9s ago");
        assert_eq!(format_age(200_000, Some(0)), "3m ago");
        assert_eq!(format_age(7_300_000, Some(0)), "2h ago");
        assert_eq!(format_age(0, Some(5_000)), "just now");
    }

    #[test]
    fn byte_sizes_are_human_readable() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2_048), "2.0 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn window_follows_cursor() {
        assert_eq!(visible_window_start(0, 3, 2), 0);
        assert_eq!(visible_window_start(2, 3, 10), 0);
        assert_eq!(visible_window_start(3, 3, 10), 1);
        assert_eq!(visible_window_start(9, 3, 10), 7);
        assert_eq!(visible_window_start(5, 0, 10), 0);
    }

    #[test]
    fn thumbnail_panel_follows_position() {
        let area = Rect::new(0, 0, 100, 40);

        let (thumbs, main) = split_body(area, ThumbPosition::Left);
        let thumbs = thumbs.expect("panel shown");
        assert_eq!(thumbs.x, 0);
        assert!(main.x >= thumbs.width);

        let (thumbs, main) = split_body(area, ThumbPosition::Bottom);
        let thumbs = thumbs.expect("panel shown");
        assert!(thumbs.y > main.y);

        let (thumbs, main) = split_body(area, ThumbPosition::None);
        assert!(thumbs.is_none());
        assert_eq!(main, area);
    }
}
