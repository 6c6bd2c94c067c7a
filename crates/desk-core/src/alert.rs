//! Unassigned-ticket alert scheduling.
//!
//! The [`AlertScheduler`] watches two values: how many tickets lack a
//! handler, and whether sound is enabled. Every time either value changes it
//! drops its pending timers and re-arms:
//!
//! - **Off**: no unassigned tickets. No timers.
//! - **VisualOnly**: unassigned tickets, sound off. A one-shot flash.
//! - **VisualAndAudio**: unassigned tickets, sound on. A flash plus a chime
//!   now and every chime interval after that.
//!
//! Timers are tokio tasks held by `JoinHandle` and aborted on every re-arm,
//! on [`AlertScheduler::shutdown`], and on drop, so nothing outlives the
//! scheduler. Arming spawns tasks, so [`AlertScheduler::observe`] must be
//! called from inside a tokio runtime.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::chime::{Chime, Tone};
use crate::config::AlertConfig;
use crate::log_alert_event;

/// Current alerting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Off,
    VisualOnly,
    VisualAndAudio,
}

impl AlertState {
    /// Derive the mode from the watched values.
    pub fn from_inputs(unassigned: usize, sound_enabled: bool) -> Self {
        match (unassigned, sound_enabled) {
            (0, _) => Self::Off,
            (_, false) => Self::VisualOnly,
            (_, true) => Self::VisualAndAudio,
        }
    }

    pub fn is_alerting(&self) -> bool {
        !matches!(self, Self::Off)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::VisualOnly => "visual",
            Self::VisualAndAudio => "visual+audio",
        }
    }
}

/// Drives the flash indicator and the repeating chime.
pub struct AlertScheduler {
    chime: Arc<dyn Chime>,
    tone: Tone,
    flash_duration: Duration,
    chime_interval: Duration,
    flash_tx: Arc<watch::Sender<bool>>,
    flash_task: Option<JoinHandle<()>>,
    chime_task: Option<JoinHandle<()>>,
    /// Last observed (unassigned, sound_enabled)
    last_inputs: Option<(usize, bool)>,
    state: AlertState,
}

impl AlertScheduler {
    /// Create a scheduler with the default timings (1s flash, 3s chime).
    pub fn new(chime: Arc<dyn Chime>) -> Self {
        Self::with_config(chime, &AlertConfig::default())
    }

    /// Create a scheduler with configured timings.
    pub fn with_config(chime: Arc<dyn Chime>, config: &AlertConfig) -> Self {
        let (flash_tx, _) = watch::channel(false);
        Self {
            chime,
            tone: Tone::ALERT,
            flash_duration: config.flash_duration(),
            chime_interval: config.chime_interval(),
            flash_tx: Arc::new(flash_tx),
            flash_task: None,
            chime_task: None,
            last_inputs: None,
            state: AlertState::Off,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Whether the flash indicator is currently lit.
    pub fn is_flashing(&self) -> bool {
        *self.flash_tx.borrow()
    }

    /// Subscribe to flash on/off changes.
    pub fn flash_receiver(&self) -> watch::Receiver<bool> {
        self.flash_tx.subscribe()
    }

    /// Feed the latest watched values. A repeat of the previous pair does
    /// nothing; any change cancels pending timers and re-arms.
    pub fn observe(&mut self, unassigned: usize, sound_enabled: bool) {
        if self.last_inputs == Some((unassigned, sound_enabled)) {
            return;
        }
        self.last_inputs = Some((unassigned, sound_enabled));
        self.cancel_timers();

        let state = AlertState::from_inputs(unassigned, sound_enabled);
        if state != self.state {
            log_alert_event!(
                "transition",
                from = self.state.label(),
                to = state.label(),
                unassigned
            );
        }
        self.state = state;

        if !state.is_alerting() {
            self.flash_tx.send_replace(false);
            return;
        }

        self.start_flash();
        if state == AlertState::VisualAndAudio {
            self.start_chime();
        }
    }

    /// Cancel every timer and go quiet. Safe to call repeatedly.
    pub fn shutdown(&mut self) {
        self.cancel_timers();
        self.flash_tx.send_replace(false);
        self.last_inputs = None;
        if self.state.is_alerting() {
            log_alert_event!("shutdown");
        }
        self.state = AlertState::Off;
    }

    /// True while a repeat chime timer is pending.
    pub fn has_pending_chime(&self) -> bool {
        self.chime_task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// True while a flash timeout is pending.
    pub fn has_pending_flash(&self) -> bool {
        self.flash_task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn start_flash(&mut self) {
        self.flash_tx.send_replace(true);

        let flash_tx = Arc::clone(&self.flash_tx);
        let duration = self.flash_duration;
        self.flash_task = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            flash_tx.send_replace(false);
        }));
    }

    fn start_chime(&mut self) {
        self.chime.play(&self.tone);
        log_alert_event!("chime");

        let chime = Arc::clone(&self.chime);
        let tone = self.tone;
        let period = self.chime_interval;
        self.chime_task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                chime.play(&tone);
                debug!(target: "desk_core::alert", "repeat chime");
            }
        }));
    }

    fn cancel_timers(&mut self) {
        if let Some(task) = self.flash_task.take() {
            task.abort();
        }
        if let Some(task) = self.chime_task.take() {
            task.abort();
        }
    }
}

impl Drop for AlertScheduler {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}

impl std::fmt::Debug for AlertScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertScheduler")
            .field("state", &self.state)
            .field("flashing", &self.is_flashing())
            .field("flash_duration", &self.flash_duration)
            .field("chime_interval", &self.chime_interval)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chime::testing::CountingChime;

    fn scheduler() -> (AlertScheduler, Arc<CountingChime>) {
        crate::logging::init_test_logging();
        let chime = Arc::new(CountingChime::default());
        (AlertScheduler::new(chime.clone()), chime)
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    #[test]
    fn test_state_from_inputs() {
        assert_eq!(AlertState::from_inputs(0, true), AlertState::Off);
        assert_eq!(AlertState::from_inputs(0, false), AlertState::Off);
        assert_eq!(AlertState::from_inputs(3, false), AlertState::VisualOnly);
        assert_eq!(AlertState::from_inputs(3, true), AlertState::VisualAndAudio);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flash_turns_off_after_one_second() {
        let (mut alerts, chime) = scheduler();
        let rx = alerts.flash_receiver();

        alerts.observe(0, false);
        assert!(!alerts.is_flashing());

        alerts.observe(2, false);
        assert!(alerts.is_flashing());
        assert!(*rx.borrow());
        assert_eq!(alerts.state(), AlertState::VisualOnly);

        advance(900).await;
        assert!(alerts.is_flashing());

        advance(200).await;
        assert!(!alerts.is_flashing());
        assert!(!*rx.borrow());
        assert_eq!(chime.plays(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chime_repeats_every_three_seconds() {
        let (mut alerts, chime) = scheduler();

        alerts.observe(4, true);
        assert_eq!(alerts.state(), AlertState::VisualAndAudio);
        assert_eq!(chime.plays(), 1);

        advance(2_900).await;
        assert_eq!(chime.plays(), 1);

        advance(200).await;
        assert_eq!(chime.plays(), 2);

        advance(3_000).await;
        assert_eq!(chime.plays(), 3);
        assert!(alerts.has_pending_chime());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabling_sound_stops_chimes() {
        let (mut alerts, chime) = scheduler();

        alerts.observe(4, true);
        advance(3_100).await;
        assert_eq!(chime.plays(), 2);

        alerts.observe(4, false);
        assert_eq!(alerts.state(), AlertState::VisualOnly);
        assert!(!alerts.has_pending_chime());

        advance(10_000).await;
        assert_eq!(chime.plays(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_unassigned_stops_everything() {
        let (mut alerts, chime) = scheduler();

        alerts.observe(1, true);
        assert!(alerts.is_flashing());

        alerts.observe(0, true);
        assert_eq!(alerts.state(), AlertState::Off);
        assert!(!alerts.is_flashing());
        assert!(!alerts.has_pending_chime());
        assert!(!alerts.has_pending_flash());

        advance(10_000).await;
        assert_eq!(chime.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_inputs_do_not_rearm() {
        let (mut alerts, chime) = scheduler();

        alerts.observe(3, true);
        advance(1_500).await;
        assert!(!alerts.is_flashing());

        alerts.observe(3, true);
        assert!(!alerts.is_flashing());
        assert_eq!(chime.plays(), 1);

        advance(1_600).await;
        assert_eq!(chime.plays(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_change_rearms() {
        let (mut alerts, chime) = scheduler();

        alerts.observe(3, true);
        advance(2_000).await;

        alerts.observe(5, true);
        assert!(alerts.is_flashing());
        assert_eq!(chime.plays(), 2);

        // Interval restarted from the re-arm, not the original start.
        advance(1_500).await;
        assert_eq!(chime.plays(), 2);
        advance(1_600).await;
        assert_eq!(chime.plays(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reenabling_sound_chimes_immediately() {
        let (mut alerts, chime) = scheduler();

        alerts.observe(2, false);
        assert_eq!(chime.plays(), 0);

        alerts.observe(2, true);
        assert_eq!(chime.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_timers() {
        let (mut alerts, chime) = scheduler();

        alerts.observe(2, true);
        alerts.shutdown();
        assert_eq!(alerts.state(), AlertState::Off);
        assert!(!alerts.is_flashing());
        assert!(!alerts.has_pending_chime());

        advance(10_000).await;
        assert_eq!(chime.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_timers() {
        let (mut alerts, chime) = scheduler();

        alerts.observe(2, true);
        drop(alerts);

        advance(10_000).await;
        assert_eq!(chime.plays(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timings() {
        let chime = Arc::new(CountingChime::default());
        let config = AlertConfig {
            flash_ms: 250,
            chime_interval_secs: 1,
        };
        let mut alerts = AlertScheduler::with_config(chime.clone(), &config);

        alerts.observe(1, true);
        advance(300).await;
        assert!(!alerts.is_flashing());

        advance(800).await;
        assert_eq!(chime.plays(), 2);
    }
}
