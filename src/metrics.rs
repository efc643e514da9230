//! Speed and accuracy calculations.
//!
//! Everything here is a pure function of a track snapshot and an elapsed
//! time, so the same inputs always give the same numbers. How often the
//! numbers are recomputed is up to the caller.

use serde::Serialize;

use crate::track::CharacterTrack;

/// Characters per word in the usual typing-test convention.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Words per minute from correctly typed characters.
///
/// Returns 0 before the clock has meaningfully started and for any input
/// that would otherwise produce a negative or non-finite value.
pub fn compute_wpm(correct_chars: usize, elapsed_secs: f64) -> f64 {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return 0.0;
    }

    let minutes = elapsed_secs / 60.0;
    let wpm = ((correct_chars as f64 / CHARS_PER_WORD) / minutes).round();

    if wpm.is_finite() && wpm >= 0.0 {
        wpm
    } else {
        0.0
    }
}

/// Percentage of attempted characters that were correct, 100 when nothing
/// has been attempted yet.
pub fn compute_accuracy(correct_chars: usize, attempted_chars: usize) -> f64 {
    if attempted_chars == 0 {
        return 100.0;
    }

    (100.0 * correct_chars as f64 / attempted_chars as f64)
        .round()
        .clamp(0.0, 100.0)
}

/// Live metrics at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub wpm: f64,
    pub accuracy: f64,
    pub elapsed_secs: f64,
    /// Share of the passage behind the cursor, 0 to 100.
    pub progress: f64,
}

impl MetricsSnapshot {
    pub fn capture(track: &CharacterTrack, elapsed_secs: f64) -> Self {
        let progress = if track.is_empty() {
            0.0
        } else {
            track.cursor() as f64 / track.len() as f64 * 100.0
        };

        Self {
            wpm: compute_wpm(track.correct_count(), elapsed_secs),
            accuracy: compute_accuracy(track.correct_count(), track.attempted_count()),
            elapsed_secs: elapsed_secs.max(0.0),
            progress,
        }
    }
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            wpm: 0.0,
            accuracy: 100.0,
            elapsed_secs: 0.0,
            progress: 0.0,
        }
    }
}
