use rcplay_playback::{PlaybackObserver, PlaybackResult, StepOutcome};

/// Prints playback progress to stdout and mirrors it into the log.
#[derive(Debug, Default)]
pub(crate) struct ConsoleObserver {
    script_count: usize,
}

impl ConsoleObserver {
    pub(crate) fn new(script_count: usize) -> Self {
        Self { script_count }
    }
}

pub(crate) fn outcome_label(outcome: StepOutcome) -> &'static str {
    match outcome {
        StepOutcome::Pending => "pending",
        StepOutcome::Success => "success",
        StepOutcome::Failure => "failure",
        StepOutcome::Error => "error",
    }
}

impl PlaybackObserver for ConsoleObserver {
    fn session_started(&self, session_id: &str) {
        println!("session {session_id}");
        tracing::debug!(session_id, "session started");
    }

    fn step_finished(&self, step_id: &str, outcome: StepOutcome, message: Option<&str>) {
        match message {
            Some(message) => println!("  [{}] {step_id}: {message}", outcome_label(outcome)),
            None => println!("  [{}] {step_id}", outcome_label(outcome)),
        }
    }

    fn script_started(&self, index: usize, name: &str) {
        println!("==> [{}/{}] {name}", index + 1, self.script_count);
    }

    fn script_finished(&self, index: usize, result: &PlaybackResult) {
        let status = if result.success { "passed" } else { "failed" };
        match result.error_message.as_deref() {
            Some(message) => println!("<== [{}] {status}: {message}", index + 1),
            None => println!("<== [{}] {status}", index + 1),
        }
    }
}
