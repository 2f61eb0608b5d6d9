use std::time::Duration;

use log::debug;

use crate::error::OrchestratorError;

/// Wait for an external engine capability to appear.
///
/// `probe` is called at `poll_interval` spacing, at most `max_attempts`
/// times; the gate resolves on the first `true` and fails with
/// [`OrchestratorError::EngineLoadTimeout`] once the budget is exhausted.
/// Probes are expected to be idempotent existence checks. Dropping the
/// returned future (orchestrator teardown mid-wait) stops scheduling
/// further probes - the sleep between attempts is the only suspension
/// point.
pub async fn await_engine<P>(
    mut probe: P,
    poll_interval: Duration,
    max_attempts: u32,
) -> Result<(), OrchestratorError>
where
    P: FnMut() -> bool,
{
    for attempt in 1..=max_attempts {
        if probe() {
            debug!("engine available after {} probe(s)", attempt);
            return Ok(());
        }
        if attempt < max_attempts {
            tokio::time::sleep(poll_interval).await;
        }
    }

    Err(OrchestratorError::EngineLoadTimeout {
        attempts: max_attempts,
    })
}
