//! Transcode job orchestrator.
//!
//! Drives a long-running external transcode engine and presents its
//! progress in real time, reconciling two independent signal sources: a
//! coarse byte-download ratio while the engine bootstraps, and structured
//! signals extracted from the engine's unstructured diagnostic log stream
//! while a run is active.

pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod options;
pub mod orchestrator;
pub mod progress;
pub mod signal;
pub mod timecode;

pub use config::OrchestratorConfig;
pub use engine::{Engine, EngineError, EngineHandle, LoadError};
pub use error::OrchestratorError;
pub use options::TranscodeOptions;
pub use orchestrator::{JobState, Orchestrator, RunSummary};
pub use progress::{ProgressEstimator, ProgressSample};
pub use signal::{extract_signals, LogSignal};
pub use timecode::{parse_timecode, MalformedTimeCode};
