use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

/// Capability proving the external engine finished loading.
///
/// Granted once by [`Engine::load`]; the orchestrator holds at most one.
/// There is no retry-in-place - if loading fails, the host environment
/// must be reloaded to obtain a new handle.
#[derive(Debug, Clone)]
pub struct EngineHandle {
    loaded_at: DateTime<Utc>,
}

impl EngineHandle {
    pub fn new() -> Self {
        Self {
            loaded_at: Utc::now(),
        }
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// One-time engine initialization failed.
#[derive(Debug, Clone, Error)]
#[error("engine load failed: {0}")]
pub struct LoadError(pub String);

/// Error from an engine run-lifecycle primitive.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A working-storage operation (write/read/remove) failed.
    #[error("engine storage operation on '{name}' failed: {message}")]
    Storage { name: String, message: String },

    /// The invocation itself failed, e.g. unsupported input.
    #[error("engine invocation failed (exit code {code}): {message}")]
    Invocation { code: i32, message: String },
}

impl EngineError {
    pub fn storage(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invocation(code: i32, message: impl Into<String>) -> Self {
        Self::Invocation {
            code,
            message: message.into(),
        }
    }
}

/// Boundary to the external black-box transcode engine.
///
/// The engine accepts an input byte buffer plus an argument list and
/// produces an output byte buffer, emitting a line-oriented diagnostic
/// stream while it works. Push callbacks are modeled as channel senders
/// handed to `load` (coarse download ratio) and `invoke` (log lines); the
/// orchestrator owns the receivers and consumes both streams in arrival
/// order. Working storage is a small private namespace addressed by name,
/// exclusively used by one run at a time.
#[allow(async_fn_in_trait)]
pub trait Engine {
    /// Non-blocking existence check, polled by the readiness gate.
    /// Idempotent and side-effect free.
    fn probe_available(&self) -> bool;

    /// One-time asynchronous initialization. May report a coarse
    /// fractional download ratio through `progress` while loading.
    async fn load(&mut self, progress: UnboundedSender<f64>) -> Result<EngineHandle, LoadError>;

    /// Stage an input buffer into working storage under `name`.
    fn write_input(&mut self, name: &str, bytes: &[u8]) -> Result<(), EngineError>;

    /// Run the engine with an ordered argument list, pushing every
    /// diagnostic line through `log` as it is produced.
    async fn invoke(&mut self, args: &[String], log: UnboundedSender<String>)
        -> Result<(), EngineError>;

    /// Read a produced buffer out of working storage.
    fn read_output(&mut self, name: &str) -> Result<Vec<u8>, EngineError>;

    /// Release one named entry of working storage.
    fn remove(&mut self, name: &str) -> Result<(), EngineError>;
}
