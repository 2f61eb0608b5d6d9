use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use crate::config::OrchestratorConfig;
use crate::engine::{Engine, EngineError, EngineHandle};
use crate::error::OrchestratorError;
use crate::gate;
use crate::options::TranscodeOptions;
use crate::progress::{ProgressEstimator, ProgressSample};
use crate::signal::extract_signals;

/// Lifecycle state of the orchestrator. Exactly one value at any instant;
/// transitions only through the defined lifecycle operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    /// Waiting for the external engine to become available.
    AwaitingEngine,
    /// Engine loaded; a run can be started.
    Ready,
    /// A run is active. At most one per orchestrator instance.
    Running,
    /// The last run completed; output buffer captured.
    Succeeded,
    /// The gate timed out, loading failed, or the last run failed.
    Failed,
}

/// Record of one run attempt, stamped when `start` is accepted.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Top-level coordinator for one transcode session.
///
/// Owns the readiness gate at startup and the progress estimator during a
/// run; sequences engine invocation and exposes lifecycle state plus
/// derived progress to the presentation layer. All orchestration happens
/// on one logical task - the engine is the only component doing
/// concurrent work, pushing log lines and coarse ratios back through
/// channels that are consumed in arrival order.
pub struct Orchestrator<E: Engine> {
    engine: E,
    config: OrchestratorConfig,
    handle: Option<EngineHandle>,
    estimator: ProgressEstimator,
    log: Vec<String>,
    output: Option<Vec<u8>>,
    error: Option<OrchestratorError>,
    last_run: Option<RunSummary>,
    state_tx: watch::Sender<JobState>,
    progress_tx: watch::Sender<ProgressSample>,
}

impl<E: Engine> Orchestrator<E> {
    pub fn new(engine: E, config: OrchestratorConfig) -> Self {
        let (state_tx, _) = watch::channel(JobState::AwaitingEngine);
        let (progress_tx, _) = watch::channel(ProgressSample::default());
        Self {
            engine,
            config,
            handle: None,
            estimator: ProgressEstimator::new(),
            log: Vec::new(),
            output: None,
            error: None,
            last_run: None,
            state_tx,
            progress_tx,
        }
    }

    /// Wait for the engine to appear, then run its one-time load.
    ///
    /// Coarse download ratios reported by the loader are applied to the
    /// estimator as they arrive, so the presentation layer sees bootstrap
    /// progress before any run exists. Success transitions to `Ready`
    /// with the engine handle stored; a gate timeout or load failure
    /// transitions to `Failed` and is not recoverable in place.
    pub async fn initialize(&mut self) -> Result<(), OrchestratorError> {
        let state = self.state();
        if state != JobState::AwaitingEngine {
            return Err(OrchestratorError::InvalidState {
                operation: "initialize",
                state,
            });
        }

        let gate_result = gate::await_engine(
            || self.engine.probe_available(),
            Duration::from_millis(self.config.poll_interval_ms),
            self.config.max_probe_attempts,
        )
        .await;

        if let Err(err) = gate_result {
            error!("engine readiness gate failed: {}", err);
            self.error = Some(err.clone());
            self.set_state(JobState::Failed);
            return Err(err);
        }

        // Scoped so the load future's borrow of the engine ends here.
        let load_result = {
            let (coarse_tx, mut coarse_rx) = mpsc::unbounded_channel();
            let load_fut = self.engine.load(coarse_tx);
            tokio::pin!(load_fut);

            loop {
                tokio::select! {
                    result = &mut load_fut => {
                        // loader finished; apply ratios still queued in the channel
                        while let Ok(ratio) = coarse_rx.try_recv() {
                            self.estimator.apply_coarse(ratio);
                        }
                        self.progress_tx.send_replace(self.estimator.snapshot());
                        break result;
                    }
                    received = coarse_rx.recv() => match received {
                        Some(ratio) => {
                            self.estimator.apply_coarse(ratio);
                            self.progress_tx.send_replace(self.estimator.snapshot());
                        }
                        None => break (&mut load_fut).await,
                    },
                }
            }
        };

        match load_result {
            Ok(handle) => {
                // Download complete even if the loader never reported 1.0.
                self.estimator.apply_coarse(1.0);
                self.progress_tx.send_replace(self.estimator.snapshot());
                self.handle = Some(handle);
                self.set_state(JobState::Ready);
                info!("🎬 engine loaded, orchestrator ready");
                Ok(())
            }
            Err(e) => {
                let err = OrchestratorError::from(e);
                error!("engine load failed: {}", err);
                self.error = Some(err.clone());
                self.set_state(JobState::Failed);
                Err(err)
            }
        }
    }

    /// Run one transcode: stage the input, invoke the engine, and capture
    /// the output buffer.
    ///
    /// Rejected with `InvalidState` unless the orchestrator is `Ready`, so
    /// a second run can never overlap the first. Every diagnostic line the
    /// engine emits is retained verbatim in arrival order and routed
    /// through the signal extractor into the estimator. Working storage is
    /// released for both staging names on every exit path.
    pub async fn start(
        &mut self,
        input: Vec<u8>,
        options: TranscodeOptions,
    ) -> Result<(), OrchestratorError> {
        let state = self.state();
        if state != JobState::Ready {
            return Err(OrchestratorError::InvalidState {
                operation: "start",
                state,
            });
        }

        // Fresh run: discard everything derived from the previous one.
        self.estimator.reset();
        self.log.clear();
        self.output = None;
        self.error = None;
        self.progress_tx.send_replace(self.estimator.snapshot());

        let run_id = Uuid::new_v4();
        self.last_run = Some(RunSummary {
            id: run_id,
            started_at: Utc::now(),
            finished_at: None,
        });
        self.set_state(JobState::Running);

        let input_name = self.config.input_name.clone();
        let output_name = self.config.output_name.clone();
        let args = options.build_args(&input_name, &output_name);
        info!("run {} started ({} input bytes)", run_id, input.len());
        debug!("engine args: {:?}", args);

        let result = self.drive(&input_name, &output_name, &input, &args).await;

        // Release working storage for both names whether the run succeeded
        // or failed mid-write; a cleanup failure is logged, never re-raised.
        for name in [input_name.as_str(), output_name.as_str()] {
            if let Err(e) = self.engine.remove(name) {
                warn!("cleanup of '{}' failed: {}", name, e);
            }
        }

        if let Some(run) = self.last_run.as_mut() {
            run.finished_at = Some(Utc::now());
        }

        match result {
            Ok(bytes) => {
                info!("✅ run {} completed ({} output bytes)", run_id, bytes.len());
                self.output = Some(bytes);
                self.set_state(JobState::Succeeded);
                Ok(())
            }
            Err(e) => {
                error!("❌ run {} failed: {}", run_id, e);
                let err = OrchestratorError::TranscodeFailure {
                    message: e.to_string(),
                    log: self.log.clone(),
                };
                self.error = Some(err.clone());
                self.set_state(JobState::Failed);
                Err(err)
            }
        }
    }

    /// Return to `Ready` from a terminal state, discarding the output
    /// buffer, the retained log sequence, and all estimator state.
    ///
    /// Rejected when no engine handle exists (a gate timeout or load
    /// failure is recoverable only by a full reload of the host) and in
    /// any non-terminal state.
    pub fn reset(&mut self) -> Result<(), OrchestratorError> {
        let state = self.state();
        let resettable =
            matches!(state, JobState::Succeeded | JobState::Failed) && self.handle.is_some();
        if !resettable {
            return Err(OrchestratorError::InvalidState {
                operation: "reset",
                state,
            });
        }

        self.estimator.reset();
        self.log.clear();
        self.output = None;
        self.error = None;
        self.progress_tx.send_replace(self.estimator.snapshot());
        self.set_state(JobState::Ready);
        debug!("orchestrator reset to Ready");
        Ok(())
    }

    /// Current lifecycle state.
    pub fn state(&self) -> JobState {
        *self.state_tx.borrow()
    }

    /// Watch channel following every lifecycle transition.
    pub fn subscribe_state(&self) -> watch::Receiver<JobState> {
        self.state_tx.subscribe()
    }

    /// Current progress view.
    pub fn snapshot(&self) -> ProgressSample {
        self.estimator.snapshot()
    }

    /// Watch channel following progress snapshots as signals arrive.
    pub fn subscribe_progress(&self) -> watch::Receiver<ProgressSample> {
        self.progress_tx.subscribe()
    }

    /// Diagnostic lines of the current (or last) run, in arrival order.
    pub fn log_lines(&self) -> &[String] {
        &self.log
    }

    /// Output buffer captured by the last successful run.
    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    /// Error recorded by the last failed transition, if any.
    pub fn last_error(&self) -> Option<&OrchestratorError> {
        self.error.as_ref()
    }

    /// Record of the most recent run attempt.
    pub fn last_run(&self) -> Option<&RunSummary> {
        self.last_run.as_ref()
    }

    /// Run-lifecycle primitives in order: write input, invoke while
    /// consuming the diagnostic stream, read output.
    async fn drive(
        &mut self,
        input_name: &str,
        output_name: &str,
        input: &[u8],
        args: &[String],
    ) -> Result<Vec<u8>, EngineError> {
        self.engine.write_input(input_name, input)?;

        // Scoped so the invoke future's borrow of the engine ends here.
        let invoke_result = {
            let (log_tx, mut log_rx) = mpsc::unbounded_channel();
            let invoke_fut = self.engine.invoke(args, log_tx);
            tokio::pin!(invoke_fut);

            loop {
                tokio::select! {
                    result = &mut invoke_fut => {
                        // engine finished; ingest lines still queued in the channel
                        while let Ok(line) = log_rx.try_recv() {
                            Self::ingest_line(
                                &mut self.estimator,
                                &mut self.log,
                                &self.progress_tx,
                                line,
                            );
                        }
                        break result;
                    }
                    received = log_rx.recv() => match received {
                        Some(line) => {
                            Self::ingest_line(
                                &mut self.estimator,
                                &mut self.log,
                                &self.progress_tx,
                                line,
                            );
                        }
                        None => break (&mut invoke_fut).await,
                    },
                }
            }
        };
        invoke_result?;

        self.engine.read_output(output_name)
    }

    /// Retain one diagnostic line verbatim and fold any signals it carries
    /// into the estimator. Free of `&mut self` so it can run while the
    /// invoke future borrows the engine.
    fn ingest_line(
        estimator: &mut ProgressEstimator,
        log: &mut Vec<String>,
        progress_tx: &watch::Sender<ProgressSample>,
        line: String,
    ) {
        let signals = extract_signals(&line);
        log.push(line);
        if !signals.is_empty() {
            for signal in &signals {
                estimator.apply_signal(signal);
            }
            progress_tx.send_replace(estimator.snapshot());
        }
    }

    fn set_state(&mut self, state: JobState) {
        debug!("state -> {:?}", state);
        self.state_tx.send_replace(state);
    }
}
