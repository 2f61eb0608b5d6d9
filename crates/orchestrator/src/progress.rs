use serde::Serialize;

use crate::signal::LogSignal;

/// Speed token reported before any rate update arrives.
const IDLE_SPEED: &str = "0x";

/// Point-in-time view of run progress, derived from engine diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSample {
    /// Completion fraction, always within `[0, 1]`.
    pub ratio: f64,
    /// Most recent frames-per-second figure, never negative.
    pub fps: f64,
    /// Most recent speed multiplier token, e.g. `"2.1x"`.
    pub speed: String,
}

impl Default for ProgressSample {
    fn default() -> Self {
        Self {
            ratio: 0.0,
            fps: 0.0,
            speed: IDLE_SPEED.to_string(),
        }
    }
}

/// Accumulates extracted log signals (and the loader's coarse byte ratio)
/// into a clamped completion fraction plus throughput stats.
///
/// The two signal families are never mixed: the orchestrator feeds coarse
/// ratios only while the engine is loading and log-derived signals only
/// while a run is active, with a `reset` in between.
#[derive(Debug)]
pub struct ProgressEstimator {
    duration: Option<f64>,
    last_ratio: f64,
    last_fps: f64,
    last_speed: String,
}

impl ProgressEstimator {
    pub fn new() -> Self {
        Self {
            duration: None,
            last_ratio: 0.0,
            last_fps: 0.0,
            last_speed: IDLE_SPEED.to_string(),
        }
    }

    /// Clear all state back to initial values. Called once per run, before
    /// the first signal of that run is applied.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Apply the loader's coarse byte-download ratio. Independent of the
    /// media duration; input is clamped to `[0, 1]`.
    pub fn apply_coarse(&mut self, ratio: f64) {
        self.last_ratio = ratio.clamp(0.0, 1.0);
    }

    /// Apply one extracted log signal.
    ///
    /// Position updates are ignored until a duration is known - progress
    /// simply does not advance. A duplicate duration announcement
    /// overwrites the previous value (last write wins).
    pub fn apply_signal(&mut self, signal: &LogSignal) {
        match signal {
            LogSignal::DurationFound(seconds) => {
                self.duration = Some(*seconds);
            }
            LogSignal::PositionUpdate(seconds) => {
                if let Some(duration) = self.duration {
                    if duration > 0.0 {
                        self.last_ratio = (seconds / duration).clamp(0.0, 1.0);
                    }
                }
            }
            LogSignal::RateUpdate { fps, speed } => {
                if let Some(fps) = fps {
                    self.last_fps = fps.max(0.0);
                }
                if let Some(speed) = speed {
                    self.last_speed = speed.clone();
                }
            }
        }
    }

    /// Media duration in seconds, once discovered from the log stream.
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Current read-only progress view.
    pub fn snapshot(&self) -> ProgressSample {
        ProgressSample {
            ratio: self.last_ratio,
            fps: self.last_fps,
            speed: self.last_speed.clone(),
        }
    }
}

impl Default for ProgressEstimator {
    fn default() -> Self {
        Self::new()
    }
}
