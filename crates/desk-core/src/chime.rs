//! Audible alert output.
//!
//! Playing a chime never fails from the caller's point of view: a host
//! without a usable audio path simply stays quiet. Failures are logged and
//! dropped, never returned.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::SoundBackend;

/// A descending alert tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub start_hz: f32,
    pub end_hz: f32,
    pub duration: Duration,
}

impl Tone {
    /// The unassigned-ticket alert: one octave down over 300ms.
    pub const ALERT: Tone = Tone {
        start_hz: 880.0,
        end_hz: 440.0,
        duration: Duration::from_millis(300),
    };

    pub fn is_descending(&self) -> bool {
        self.end_hz < self.start_hz
    }
}

impl Default for Tone {
    fn default() -> Self {
        Self::ALERT
    }
}

/// Something that can make an alert sound.
pub trait Chime: Send + Sync {
    /// Play `tone`. Implementations swallow their own errors.
    fn play(&self, tone: &Tone);
}

/// Rings the terminal bell.
///
/// Terminals cannot sweep a frequency, so the tone shape is ignored and a
/// single BEL is written.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBell;

impl Chime for TerminalBell {
    fn play(&self, tone: &Tone) {
        let mut stdout = std::io::stdout();
        let result = stdout.write_all(b"\x07").and_then(|()| stdout.flush());
        if let Err(e) = result {
            debug!(error = %e, start_hz = tone.start_hz, "terminal bell unavailable");
        }
    }
}

/// Plays nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentChime;

impl Chime for SilentChime {
    fn play(&self, _tone: &Tone) {}
}

/// Build the chime for a configured backend.
pub fn chime_for(backend: SoundBackend) -> Arc<dyn Chime> {
    match backend {
        SoundBackend::Bell => Arc::new(TerminalBell),
        SoundBackend::None => Arc::new(SilentChime),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts plays instead of making noise.
    #[derive(Debug, Default)]
    pub struct CountingChime {
        plays: AtomicUsize,
    }

    impl CountingChime {
        pub fn plays(&self) -> usize {
            self.plays.load(Ordering::SeqCst)
        }
    }

    impl Chime for CountingChime {
        fn play(&self, tone: &Tone) {
            assert!(tone.is_descending());
            self.plays.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_tone_descends() {
        assert!(Tone::ALERT.is_descending());
        assert_eq!(Tone::default(), Tone::ALERT);
    }

    #[test]
    fn test_silent_chime_is_noop() {
        SilentChime.play(&Tone::ALERT);
        chime_for(SoundBackend::None).play(&Tone::ALERT);
    }

    #[test]
    fn test_counting_chime() {
        let chime = testing::CountingChime::default();
        chime.play(&Tone::ALERT);
        chime.play(&Tone::ALERT);
        assert_eq!(chime.plays(), 2);
    }
}
