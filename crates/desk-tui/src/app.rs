//! Main application state and event loop for the queue dashboard.
//!
//! [`App`] owns everything the dashboard shows: the current ticket batch,
//! the last-refreshed time, the sound flag and the alert scheduler. Batches
//! arrive from the refresh task, every batch and every sound toggle is fed
//! to the scheduler, and the flash channel drives the header badge.

use std::io;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use crossterm::event::{Event, KeyEvent};
use desk_core::{
    AlertScheduler, AlertState, Batch, DeskConfig, DeskError, RefreshLoop, ServiceClient, Ticket, TicketGenerator,
    chime_for, unassigned_count,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::event::{AppEvent, InputHandler, InputReader};
use crate::theme::Theme;
use crate::widget::TicketTable;

/// Result type for app operations.
pub type AppResult<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Redraw cadence so the clock and ticket ages stay current.
const RENDER_INTERVAL: Duration = Duration::from_millis(500);

/// Rows moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Main application state.
pub struct App {
    /// Current batch, replaced wholesale on every refresh
    tickets: Vec<Ticket>,
    last_refreshed: Option<DateTime<Utc>>,
    sound_enabled: bool,
    alerts: AlertScheduler,
    flash_rx: watch::Receiver<bool>,
    /// Generator waiting to be handed to the refresh task
    generator: Option<TicketGenerator>,
    refresh_interval: Duration,
    refresh: Option<RefreshLoop>,
    batches: Option<mpsc::Receiver<Batch>>,
    client: ServiceClient,
    input_handler: InputHandler,
    theme: Theme,
    should_quit: bool,
    show_help: bool,
    status_message: Option<String>,
    scroll_offset: usize,
    /// Whether the UI needs a redraw
    dirty: bool,
}

impl App {
    /// Build the dashboard from configuration. Nothing is scheduled until
    /// [`App::start`] runs.
    pub fn new(config: &DeskConfig) -> desk_core::Result<Self> {
        let client = ServiceClient::new(&config.service)?;
        let alerts = AlertScheduler::with_config(chime_for(config.sound.backend), &config.alert);
        let flash_rx = alerts.flash_receiver();

        Ok(Self {
            tickets: Vec::new(),
            last_refreshed: None,
            sound_enabled: config.sound.enabled,
            alerts,
            flash_rx,
            generator: Some(TicketGenerator::from_config(&config.generator)),
            refresh_interval: config.refresh_interval(),
            refresh: None,
            batches: None,
            client,
            input_handler: InputHandler::new(),
            theme: Theme::from_config(&config.theme),
            should_quit: false,
            show_help: false,
            status_message: None,
            scroll_offset: 0,
            dirty: true,
        })
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn unassigned(&self) -> usize {
        unassigned_count(&self.tickets)
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.last_refreshed
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    pub fn alert_state(&self) -> AlertState {
        self.alerts.state()
    }

    pub fn is_flashing(&self) -> bool {
        *self.flash_rx.borrow()
    }

    /// Handle for calls to the external ticketing service.
    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Check if UI needs redraw and clear the dirty flag.
    fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Start the refresh task. The first batch is produced immediately.
    /// Must run inside a tokio runtime; calling it again does nothing.
    pub fn start(&mut self) {
        let Some(generator) = self.generator.take() else {
            return;
        };
        let (refresh, batches) = RefreshLoop::start(generator, self.refresh_interval);
        self.refresh = Some(refresh);
        self.batches = Some(batches);
        info!(interval_secs = self.refresh_interval.as_secs(), "queue refresh started");
    }

    /// Stop the refresh task and every alert timer.
    pub fn shutdown(&mut self) {
        if let Some(refresh) = self.refresh.take() {
            refresh.shutdown();
        }
        self.alerts.shutdown();
        debug!("dashboard timers cancelled");
    }

    /// Wait for the next batch from the refresh task and apply it.
    ///
    /// Returns false if the refresh task is not running.
    pub async fn next_refresh(&mut self) -> bool {
        let Some(batches) = self.batches.as_mut() else {
            return false;
        };
        match batches.recv().await {
            Some(batch) => {
                self.apply_batch(batch);
                true
            }
            None => false,
        }
    }

    /// Replace the queue with a new batch and re-evaluate alerts.
    pub fn apply_batch(&mut self, batch: Batch) {
        self.tickets = batch.tickets;
        self.last_refreshed = Some(batch.refreshed_at);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());
        self.sync_alerts();
        self.mark_dirty();
    }

    /// Flip the sound flag and re-evaluate alerts.
    pub fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
        self.status_message = Some(if self.sound_enabled {
            "Sound alerts on".to_string()
        } else {
            "Sound alerts muted".to_string()
        });
        info!(sound_enabled = self.sound_enabled, "sound toggled");
        self.sync_alerts();
        self.mark_dirty();
    }

    fn sync_alerts(&mut self) {
        let unassigned = self.unassigned();
        self.alerts.observe(unassigned, self.sound_enabled);
    }

    fn max_scroll(&self) -> usize {
        self.tickets.len().saturating_sub(1)
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        let event = self.input_handler.handle_key(key);
        self.handle_app_event(event);
    }

    /// Handle an application event.
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ToggleSound => self.toggle_sound(),
            AppEvent::Refresh => {
                match &self.refresh {
                    Some(refresh) => {
                        refresh.refresh_now();
                        self.status_message = Some("Refreshing...".to_string());
                    }
                    None => self.status_message = Some("Refresh not running".to_string()),
                }
                self.mark_dirty();
            }
            AppEvent::CycleTheme => {
                let name = self.theme.cycle();
                self.status_message = Some(format!("Theme: {}", name.display_name()));
                self.mark_dirty();
            }
            AppEvent::ShowHelp => {
                self.show_help = true;
                self.input_handler.set_help_visible(true);
                self.mark_dirty();
            }
            AppEvent::HideHelp | AppEvent::Cancel => {
                self.show_help = false;
                self.input_handler.set_help_visible(false);
                self.mark_dirty();
            }
            AppEvent::Quit | AppEvent::ForceQuit => self.should_quit = true,
            AppEvent::NavigateUp => self.scroll_to(self.scroll_offset.saturating_sub(1)),
            AppEvent::NavigateDown => self.scroll_to(self.scroll_offset + 1),
            AppEvent::PageUp => self.scroll_to(self.scroll_offset.saturating_sub(PAGE_SIZE)),
            AppEvent::PageDown => self.scroll_to(self.scroll_offset + PAGE_SIZE),
            AppEvent::GoToTop => self.scroll_to(0),
            AppEvent::GoToBottom => self.scroll_to(self.max_scroll()),
            AppEvent::None => {}
        }
    }

    fn scroll_to(&mut self, offset: usize) {
        let offset = offset.min(self.max_scroll());
        if offset != self.scroll_offset {
            self.scroll_offset = offset;
            self.mark_dirty();
        }
    }

    fn handle_terminal_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key_event(key),
            Event::Resize(..) => self.mark_dirty(),
            _ => {}
        }
    }

    /// Run the dashboard until the user quits.
    ///
    /// Must be awaited on a tokio runtime; the refresh and alert timers are
    /// spawned onto it.
    pub async fn run(&mut self) -> AppResult<()> {
        let mut terminal = setup_terminal()?;

        let result = self.run_loop(&mut terminal).await;
        self.shutdown();

        crossterm::terminal::disable_raw_mode()?;
        crossterm::execute!(terminal.backend_mut(), crossterm::terminal::LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    async fn run_loop(&mut self, terminal: &mut CrosstermTerminal) -> AppResult<()> {
        self.start();

        let (_reader, mut input) = InputReader::spawn();
        let mut batches = self.batches.take();
        let mut flash_rx = self.flash_rx.clone();
        let mut render_tick = tokio::time::interval(RENDER_INTERVAL);

        while !self.should_quit {
            if self.take_dirty() {
                terminal.draw(|frame| self.draw(frame))?;
            }

            tokio::select! {
                Some(event) = input.recv() => self.handle_terminal_event(event),
                Some(batch) = recv_batch(&mut batches) => self.apply_batch(batch),
                Ok(()) = flash_rx.changed() => self.mark_dirty(),
                _ = render_tick.tick() => self.mark_dirty(),
            }
        }

        self.batches = batches;
        Ok(())
    }

    /// Draw the UI.
    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(5),    // Ticket table
                Constraint::Length(2), // Footer
            ])
            .split(area);

        self.draw_header(frame, chunks[0]);
        self.draw_tickets(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.show_help {
            self.draw_help_overlay(frame, area);
        }
    }

    /// Header: title, unassigned badge, sound indicator, last refresh.
    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let colors = &self.theme.colors;
        let title = " Service Desk Queue ";
        let unassigned = self.unassigned();

        let badge = format!(" {unassigned} unassigned ");
        let badge_style = if self.is_flashing() {
            Style::default()
                .fg(colors.flash_fg)
                .bg(colors.flash_bg)
                .add_modifier(Modifier::BOLD)
        } else if unassigned > 0 {
            Style::default().fg(colors.status_error).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(colors.status_healthy)
        };

        let (sound_text, sound_color) = if self.sound_enabled {
            ("♪ Sound on", colors.status_healthy)
        } else {
            ("Muted", colors.text_dim)
        };

        let refreshed = match self.last_refreshed {
            Some(at) => format!(
                "Updated {}",
                at.with_timezone(&Local).format("%H:%M:%S")
            ),
            None => "Loading...".to_string(),
        };

        let right_len = badge.chars().count() + 2 + sound_text.chars().count() + 2 + refreshed.len();
        let spacing = (area.width as usize).saturating_sub(title.len() + right_len + 2);

        let header = Paragraph::new(Line::from(vec![
            Span::styled(title, Style::default().fg(colors.header).add_modifier(Modifier::BOLD)),
            Span::raw(" ".repeat(spacing)),
            Span::styled(badge, badge_style),
            Span::raw("  "),
            Span::styled(sound_text, Style::default().fg(sound_color)),
            Span::raw("  "),
            Span::styled(refreshed, Style::default().fg(colors.text_dim)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.border)),
        );

        frame.render_widget(header, area);
    }

    fn draw_tickets(&self, frame: &mut Frame, area: Rect) {
        let table = TicketTable::new(&self.tickets, &self.theme)
            .scroll(self.scroll_offset)
            .loading(self.last_refreshed.is_none());
        frame.render_widget(table, area);
    }

    /// Footer with hotkey hints and the latest status message.
    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let colors = &self.theme.colors;
        let hotkey_style = Style::default().fg(colors.hotkey);
        let mut hints = vec![
            Span::styled("[s]", hotkey_style),
            Span::raw("Sound "),
            Span::styled("[r]", hotkey_style),
            Span::raw("Refresh "),
            Span::styled("[t]", hotkey_style),
            Span::raw("Theme "),
            Span::styled("[?]", hotkey_style),
            Span::raw("Help "),
            Span::styled("[q]", hotkey_style),
            Span::raw("Quit"),
        ];
        if let Some(message) = &self.status_message {
            hints.push(Span::raw("  "));
            hints.push(Span::styled(message.clone(), Style::default().fg(colors.text)));
        }

        let interval = format!("every {}s", self.refresh_interval.as_secs());
        let footer = Paragraph::new(Line::from(hints))
            .style(Style::default().fg(colors.text_dim))
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(colors.border))
                    .title(Span::styled(interval, Style::default().fg(colors.border)))
                    .title_alignment(Alignment::Right),
            );

        frame.render_widget(footer, area);
    }

    fn draw_help_overlay(&self, frame: &mut Frame, area: Rect) {
        let colors = &self.theme.colors;
        let width = 52.min(area.width);
        let height = 14.min(area.height);
        let overlay = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        let key = |k: &'static str| Span::styled(format!("{k:<10}"), Style::default().fg(colors.hotkey));
        let lines = vec![
            Line::from(Span::styled(
                "Keyboard Shortcuts",
                Style::default().fg(colors.header).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![key("s / m"), Span::raw("Toggle sound alerts")]),
            Line::from(vec![key("r"), Span::raw("Refresh queue now")]),
            Line::from(vec![key("t"), Span::raw("Cycle color theme")]),
            Line::from(vec![key("j / k"), Span::raw("Scroll down / up")]),
            Line::from(vec![key("g / G"), Span::raw("Top / bottom")]),
            Line::from(vec![key("? / h"), Span::raw("Show this help")]),
            Line::from(vec![key("q"), Span::raw("Quit")]),
            Line::from(""),
            Line::from(Span::styled(
                "Unassigned tickets flash the header and chime.",
                Style::default().fg(colors.text_dim),
            )),
        ];

        let help = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(colors.header)),
        );

        frame.render_widget(Clear, overlay);
        frame.render_widget(help, overlay);
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.shutdown();
    }
}

type CrosstermTerminal = Terminal<CrosstermBackend<io::Stdout>>;

/// Enter raw mode and the alternate screen.
fn setup_terminal() -> desk_core::Result<CrosstermTerminal> {
    crossterm::terminal::enable_raw_mode().map_err(|e| terminal_error("enabling raw mode", e))?;
    enter_screen(
        || {
            let mut stdout = io::stdout();
            crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
            Terminal::new(CrosstermBackend::new(stdout))
        },
        crossterm::terminal::disable_raw_mode,
    )
}

/// Run the steps that follow raw mode; raw mode is left again if they fail.
fn enter_screen<T>(
    enter: impl FnOnce() -> io::Result<T>,
    leave_raw_mode: impl FnOnce() -> io::Result<()>,
) -> desk_core::Result<T> {
    enter().map_err(|e| {
        if let Err(restore) = leave_raw_mode() {
            warn!(error = %restore, "failed to leave raw mode");
        }
        terminal_error("entering alternate screen", e)
    })
}

fn terminal_error(stage: &str, e: io::Error) -> DeskError {
    DeskError::terminal_init(format!("{stage}: {e}"))
}

async fn recv_batch(batches: &mut Option<mpsc::Receiver<Batch>>) -> Option<Batch> {
    match batches {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
