//! Orchestration-layer error taxonomy.
//!
//! Parsing-layer failures (malformed time codes, unparseable markers) are
//! contained inside the log signal extractor and never reach this level;
//! everything here surfaces as a terminal state with a human-readable
//! message.

use thiserror::Error;

use crate::engine::LoadError;
use crate::orchestrator::JobState;

#[derive(Debug, Clone, Error)]
pub enum OrchestratorError {
    /// The readiness gate exhausted its probe budget without the engine
    /// appearing. Fatal to the session; recoverable only by a full reload
    /// of the host environment.
    #[error("engine did not become available after {attempts} probe attempts")]
    EngineLoadTimeout { attempts: u32 },

    /// The engine appeared but its one-time initialization failed.
    #[error(transparent)]
    EngineLoad(#[from] LoadError),

    /// A lifecycle operation was issued in a state that does not accept it,
    /// e.g. `start` while a run is already active.
    #[error("operation '{operation}' rejected in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: JobState,
    },

    /// The invocation failed. Carries the full captured log sequence of the
    /// run for diagnosis; recoverable via `reset()` and retry.
    #[error("transcode failed: {message}")]
    TranscodeFailure { message: String, log: Vec<String> },
}
