//! Sequencing of whole suites through `ScriptPlayback`.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::playback_result::{FailureKind, PlaybackResult};
use crate::script::{Script, SeleniumVersion};
use crate::script_io::ScriptLoadError;
use crate::script_playback::ScriptPlayback;
use crate::stop_signal::StopSignal;

/// Provides the scripts of a suite, one active script at a time.
pub trait ScriptSource: Send {
    fn script_names(&self) -> Vec<String>;

    /// Makes the script at `index` the current one.
    fn switch_to_script(&mut self, index: usize) -> Result<(), ScriptLoadError>;

    fn current_script(&mut self) -> Option<&mut Script>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptRunResult {
    pub name: String,
    pub result: PlaybackResult,
}

#[derive(Debug, Clone)]
/// Progress of one suite run.
pub struct SuiteRun {
    pub script_names: Vec<String>,
    /// Index of the script being played; `None` before the first one.
    pub cursor: Option<usize>,
    pub stop: StopSignal,
    pub results: Vec<ScriptRunResult>,
}

impl SuiteRun {
    pub fn new(script_names: Vec<String>, stop: StopSignal) -> Self {
        Self {
            script_names,
            cursor: None,
            stop,
            results: Vec::new(),
        }
    }

    /// Moves to the next script; `None` once the suite is exhausted or stopped.
    pub fn advance(&mut self) -> Option<usize> {
        if self.stop.is_stop_requested() {
            return None;
        }
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        self.cursor = Some(next);
        (next < self.script_names.len()).then_some(next)
    }

    /// A stop cut the run short: scripts were skipped or the last one was stopped.
    /// A stop that lands after the final script finished does not count.
    pub fn interrupted(&self) -> bool {
        if !self.stop.is_stop_requested() {
            return false;
        }
        let next = self.cursor.map_or(0, |cursor| cursor + 1);
        next < self.script_names.len()
            || self
                .results
                .last()
                .is_some_and(|entry| entry.result.is_stopped())
    }

    pub fn record(&mut self, name: impl Into<String>, result: PlaybackResult) {
        self.results.push(ScriptRunResult {
            name: name.into(),
            result,
        });
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    pub results: Vec<ScriptRunResult>,
    pub stopped: bool,
}

impl SuiteReport {
    /// Every script ran and succeeded.
    pub fn success(&self) -> bool {
        !self.stopped && self.results.iter().all(|entry| entry.result.success)
    }

    pub fn failed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|entry| !entry.result.success)
            .count()
    }
}

/// Plays every script of a `ScriptSource` in order.
pub struct SuitePlayback {
    playback: ScriptPlayback,
    active_stop: Mutex<Option<StopSignal>>,
}

impl SuitePlayback {
    pub fn new(playback: ScriptPlayback) -> Self {
        Self {
            playback,
            active_stop: Mutex::new(None),
        }
    }

    pub fn playback(&self) -> &ScriptPlayback {
        &self.playback
    }

    /// Stops the suite and the script it is playing. No-op when idle.
    pub fn request_stop(&self) {
        let active = self
            .active_stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(stop) = active.as_ref() {
            stop.request_stop();
        }
    }

    pub async fn run(&self, source: &mut dyn ScriptSource) -> SuiteReport {
        self.run_with_stop(source, StopSignal::new()).await
    }

    /// Plays the suite; `stop` is shared with every script run.
    #[tracing::instrument(level = "info", skip_all)]
    pub async fn run_with_stop(
        &self,
        source: &mut dyn ScriptSource,
        stop: StopSignal,
    ) -> SuiteReport {
        let mut run = SuiteRun::new(source.script_names(), stop);
        self.set_active_stop(Some(run.stop.clone()));
        let observer = self.playback.observer().clone();
        tracing::info!(scripts = run.script_names.len(), "suite playback started");

        while let Some(index) = run.advance() {
            let name = run.script_names[index].clone();
            observer.script_started(index, &name);
            let result = self.play_script(source, index, &run.stop).await;
            observer.script_finished(index, &result);
            run.record(name, result);
        }

        self.set_active_stop(None);
        observer.suite_finished();
        let report = SuiteReport {
            stopped: run.interrupted(),
            results: run.results,
        };
        tracing::info!(
            scripts = report.results.len(),
            failed = report.failed_count(),
            stopped = report.stopped,
            "suite playback finished"
        );
        report
    }

    async fn play_script(
        &self,
        source: &mut dyn ScriptSource,
        index: usize,
        stop: &StopSignal,
    ) -> PlaybackResult {
        if let Err(error) = source.switch_to_script(index) {
            return PlaybackResult::failed(FailureKind::InvalidScript, error.to_string());
        }
        let Some(script) = source.current_script() else {
            return PlaybackResult::failed(
                FailureKind::InvalidScript,
                format!("script {index} is not available"),
            );
        };
        if script.selenium_version != SeleniumVersion::Selenium1 {
            tracing::warn!(
                script = script.name.as_str(),
                version = script.selenium_version.label(),
                "no remote-control backend for script dialect"
            );
            return PlaybackResult::failed(
                FailureKind::InvalidScript,
                format!(
                    "Selenium {} scripts cannot be played on a remote-control server",
                    script.selenium_version.label()
                ),
            );
        }
        self.playback.run_with_stop(script, stop.clone()).await
    }

    fn set_active_stop(&self, stop: Option<StopSignal>) {
        *self
            .active_stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = stop;
    }
}
