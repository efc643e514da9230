use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::clock::{Clock, SystemClock};
use crate::input::Keystroke;
use crate::metrics::{compute_accuracy, compute_wpm, MetricsSnapshot};
use crate::reference::ReferenceText;
use crate::track::CharacterTrack;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Final score of a completed session. Produced once and never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub content_id: String,
    pub wpm: f64,
    pub accuracy: f64,
    pub duration_seconds: u64,
    pub error_count: usize,
    pub correct_chars: usize,
    pub total_chars: usize,
}

/// What a keystroke did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum KeyOutcome {
    /// Outside the accepted set, or the session is already over.
    Ignored,
    /// First keystroke: the clock is now running.
    Started,
    Applied,
    /// The keystroke completed the passage.
    Finished(SessionResult),
}

/// Drives one typing session from the first keystroke to a frozen result.
#[derive(Debug)]
pub struct SessionController<C: Clock = SystemClock> {
    reference: ReferenceText,
    track: CharacterTrack,
    clock: C,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    result: Option<SessionResult>,
}

impl SessionController<SystemClock> {
    pub fn new(reference: ReferenceText) -> Self {
        Self::with_clock(reference, SystemClock)
    }
}

impl<C: Clock> SessionController<C> {
    pub fn with_clock(reference: ReferenceText, clock: C) -> Self {
        Self {
            track: CharacterTrack::new(&reference),
            reference,
            clock,
            started_at: None,
            finished_at: None,
            result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match (self.started_at, self.finished_at) {
            (_, Some(_)) => Phase::Finished,
            (Some(_), None) => Phase::Running,
            (None, None) => Phase::Idle,
        }
    }

    pub fn on_keystroke(&mut self, key: Keystroke) -> KeyOutcome {
        if !key.is_accepted() {
            log::debug!("ignoring keystroke outside the accepted set: {key:?}");
            return KeyOutcome::Ignored;
        }

        match (self.phase(), key) {
            (Phase::Finished, _) => {
                log::debug!("session finished, ignoring {key:?}");
                KeyOutcome::Ignored
            }
            // nothing to erase and nothing to time yet
            (Phase::Idle, Keystroke::Backspace) => KeyOutcome::Ignored,
            (Phase::Idle, Keystroke::Char(c)) => {
                self.started_at = Some(self.clock.now());
                log::info!(
                    "session started on content {} ({} chars)",
                    self.reference.content_id(),
                    self.track.len()
                );
                self.track.apply_char(c);
                self.finish_if_complete().unwrap_or(KeyOutcome::Started)
            }
            (Phase::Running, Keystroke::Backspace) => {
                self.track.apply_backspace();
                KeyOutcome::Applied
            }
            (Phase::Running, Keystroke::Char(c)) => {
                self.track.apply_char(c);
                self.finish_if_complete().unwrap_or(KeyOutcome::Applied)
            }
        }
    }

    fn finish_if_complete(&mut self) -> Option<KeyOutcome> {
        if !self.track.is_complete() {
            return None;
        }

        let started_at = self.started_at?;
        let finished_at = self.clock.now();
        self.finished_at = Some(finished_at);

        let elapsed = finished_at.saturating_duration_since(started_at).as_secs_f64();
        let correct_chars = self.track.correct_count();
        let result = SessionResult {
            content_id: self.reference.content_id().to_string(),
            wpm: compute_wpm(correct_chars, elapsed),
            accuracy: compute_accuracy(correct_chars, self.track.attempted_count()),
            duration_seconds: elapsed.round() as u64,
            error_count: self.track.incorrect_count(),
            correct_chars,
            total_chars: self.track.len(),
        };

        log::info!(
            "session finished: {} wpm, {}% accuracy, {}s",
            result.wpm,
            result.accuracy,
            result.duration_seconds
        );
        self.result = Some(result.clone());
        Some(KeyOutcome::Finished(result))
    }

    /// Resets to Idle on the same passage.
    pub fn restart(&mut self) {
        self.track = CharacterTrack::new(&self.reference);
        self.started_at = None;
        self.finished_at = None;
        self.result = None;
    }

    /// Resets to Idle on a new passage.
    pub fn restart_with(&mut self, reference: ReferenceText) {
        self.reference = reference;
        self.restart();
    }

    /// Seconds since the first keystroke; fixed once the session finishes.
    pub fn elapsed_secs(&self) -> f64 {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).as_secs_f64(),
            (Some(start), None) => self
                .clock
                .now()
                .saturating_duration_since(start)
                .as_secs_f64(),
            _ => 0.0,
        }
    }

    pub fn live_metrics(&self) -> MetricsSnapshot {
        match &self.result {
            Some(result) => MetricsSnapshot {
                wpm: result.wpm,
                accuracy: result.accuracy,
                elapsed_secs: self.elapsed_secs(),
                progress: 100.0,
            },
            None => MetricsSnapshot::capture(&self.track, self.elapsed_secs()),
        }
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }

    pub fn track(&self) -> &CharacterTrack {
        &self.track
    }

    pub fn reference(&self) -> &ReferenceText {
        &self.reference
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }
}
