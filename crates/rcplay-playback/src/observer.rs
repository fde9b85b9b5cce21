//! Progress and result callbacks exposed to the presentation layer.

use crate::playback_result::PlaybackResult;
use crate::script::StepOutcome;

/// Receives playback progress. Every method defaults to a no-op.
pub trait PlaybackObserver: Send + Sync {
    fn session_started(&self, _session_id: &str) {}

    fn step_started(&self, _step_id: &str) {}

    /// Pause progress in percent.
    fn step_progress(&self, _step_id: &str, _percent: f64) {}

    fn step_finished(&self, _step_id: &str, _outcome: StepOutcome, _message: Option<&str>) {}

    fn script_started(&self, _index: usize, _name: &str) {}

    fn script_finished(&self, _index: usize, _result: &PlaybackResult) {}

    /// The suite run ended; editing can be re-enabled.
    fn suite_finished(&self) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PlaybackObserver for NoopObserver {}

#[derive(Debug, Clone, Copy, Default)]
/// Emits playback progress as structured log events.
pub struct TracingObserver;

impl PlaybackObserver for TracingObserver {
    fn session_started(&self, session_id: &str) {
        tracing::info!(session_id, "remote session started");
    }

    fn step_started(&self, step_id: &str) {
        tracing::debug!(step_id, "step started");
    }

    fn step_progress(&self, step_id: &str, percent: f64) {
        tracing::trace!(step_id, percent, "pause progress");
    }

    fn step_finished(&self, step_id: &str, outcome: StepOutcome, message: Option<&str>) {
        match outcome {
            StepOutcome::Error => {
                tracing::warn!(step_id, ?outcome, message = message.unwrap_or(""), "step finished")
            }
            _ => tracing::debug!(step_id, ?outcome, "step finished"),
        }
    }

    fn script_started(&self, index: usize, name: &str) {
        tracing::info!(index, script = name, "script started");
    }

    fn script_finished(&self, index: usize, result: &PlaybackResult) {
        tracing::info!(
            index,
            success = result.success,
            error = result.error_message.as_deref().unwrap_or(""),
            "script finished"
        );
    }

    fn suite_finished(&self) {
        tracing::info!("suite finished");
    }
}
