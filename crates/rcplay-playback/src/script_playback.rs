//! Sequential playback of one script against a remote-control server.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::Result;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::encoder::{encode_step, new_session_command, test_complete_command, with_session};
use crate::observer::{NoopObserver, PlaybackObserver};
use crate::playback_result::{FailureKind, PlaybackResult, STOPPED_MESSAGE};
use crate::remote_driver::{RemoteDriver, TransportError};
use crate::script::{Script, StepOutcome};
use crate::stop_signal::StopSignal;

const OK_PREFIX: &str = "OK";
const FALSE_PREFIX: &str = "false";
/// Length of `OK,` in front of the session token.
const SESSION_TOKEN_OFFSET: usize = 3;
const CONNECTION_ERROR_PREFIX: &str = "Server connection error";
const EMPTY_SCRIPT_MESSAGE: &str = "script has no steps";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Browser selection and local timing for a playback run.
pub struct PlaybackSettings {
    /// Browser string passed to the server, e.g. `*firefox`.
    pub browser: String,
    pub browser_version: Option<String>,
    pub platform: Option<String>,
    /// Interval of the local pause timer.
    pub pause_tick: Duration,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            browser: "*firefox".to_string(),
            browser_version: None,
            platform: None,
            pause_tick: Duration::from_millis(100),
        }
    }
}

impl PlaybackSettings {
    pub fn validate(&self) -> Result<()> {
        if self.browser.trim().is_empty() {
            anyhow::bail!("browser string cannot be empty");
        }
        if self.pause_tick.is_zero() {
            anyhow::bail!("pause_tick must be greater than 0");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Connecting,
    Running(usize),
    PauseTicking(usize),
    Completed,
    Stopped,
    ConnectionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a server response to a step command is interpreted.
pub enum ResponseClass {
    /// `OK...`
    Success,
    /// Starts with `false`; a failed check that does not halt the run.
    AssertionFailed,
    /// Anything else; the run halts.
    ServerError,
}

pub fn classify_response(response: &str) -> ResponseClass {
    if response.starts_with(OK_PREFIX) {
        ResponseClass::Success
    } else if response.starts_with(FALSE_PREFIX) {
        ResponseClass::AssertionFailed
    } else {
        ResponseClass::ServerError
    }
}

/// Bookkeeping of one connected run.
struct PlaybackSession {
    session_id: String,
    cursor: Option<usize>,
    result: PlaybackResult,
}

enum RunEnd {
    Completed,
    Stopped,
    ConnectionFailed,
}

enum PauseEnd {
    Elapsed,
    Stopped,
}

/// Plays scripts step by step through a `RemoteDriver`.
///
/// One run is in flight at a time per instance; `request_stop` reaches the run
/// currently in flight and is a no-op otherwise.
pub struct ScriptPlayback {
    driver: Arc<dyn RemoteDriver>,
    settings: PlaybackSettings,
    observer: Arc<dyn PlaybackObserver>,
    state: Mutex<PlaybackState>,
    active_stop: Mutex<Option<StopSignal>>,
}

impl ScriptPlayback {
    pub fn new(driver: Arc<dyn RemoteDriver>, settings: PlaybackSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            driver,
            settings,
            observer: Arc::new(NoopObserver),
            state: Mutex::new(PlaybackState::Idle),
            active_stop: Mutex::new(None),
        })
    }

    pub fn with_observer(mut self, observer: Arc<dyn PlaybackObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn observer(&self) -> &Arc<dyn PlaybackObserver> {
        &self.observer
    }

    pub fn settings(&self) -> &PlaybackSettings {
        &self.settings
    }

    pub fn state(&self) -> PlaybackState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request_stop(&self) {
        let active = self
            .active_stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(stop) = active.as_ref() {
            stop.request_stop();
        }
    }

    pub async fn run(&self, script: &mut Script) -> PlaybackResult {
        self.run_with_stop(script, StopSignal::new()).await
    }

    /// Plays `script`, observing `stop` before every step and on every pause tick.
    #[tracing::instrument(
        level = "info",
        skip_all,
        fields(script = %script.name, steps = script.steps.len(), browser = %self.settings.browser)
    )]
    pub async fn run_with_stop(&self, script: &mut Script, stop: StopSignal) -> PlaybackResult {
        self.set_active_stop(Some(stop.clone()));
        let result = self.play(script, &stop).await;
        self.set_active_stop(None);
        tracing::info!(
            success = result.success,
            failure_kind = ?result.failure_kind,
            "script playback finished"
        );
        result
    }

    async fn play(&self, script: &mut Script, stop: &StopSignal) -> PlaybackResult {
        script.clear_results();
        if script.steps.is_empty() {
            self.set_state(PlaybackState::Completed);
            return PlaybackResult::failed(FailureKind::InvalidScript, EMPTY_SCRIPT_MESSAGE);
        }

        self.set_state(PlaybackState::Connecting);
        let base_url = script.base_url().unwrap_or_default().to_string();
        tracing::debug!(
            base_url = base_url.as_str(),
            browser_version = self.settings.browser_version.as_deref().unwrap_or(""),
            platform = self.settings.platform.as_deref().unwrap_or(""),
            "requesting remote session"
        );
        let command = new_session_command(&self.settings.browser, &base_url);
        let response = match self.driver.post(&command).await {
            Ok(response) => response,
            Err(error) => {
                let mut result = PlaybackResult::default();
                self.connection_failed(script, None, &mut result, error);
                return result;
            }
        };
        if classify_response(&response) != ResponseClass::Success {
            self.finish_step(script, 0, StepOutcome::Error, Some(response.clone()));
            self.set_state(PlaybackState::Completed);
            return PlaybackResult::failed(FailureKind::ServerError, response);
        }

        let session_id = response
            .get(SESSION_TOKEN_OFFSET..)
            .unwrap_or_default()
            .to_string();
        let mut session = PlaybackSession {
            result: PlaybackResult {
                url: self.driver.result_url(&session_id),
                ..PlaybackResult::succeeded()
            },
            session_id,
            cursor: None,
        };
        self.observer.session_started(&session.session_id);

        match self.play_steps(script, &mut session, stop).await {
            RunEnd::ConnectionFailed => {}
            RunEnd::Completed => {
                self.teardown(&session.session_id).await;
                self.set_state(PlaybackState::Completed);
            }
            RunEnd::Stopped => {
                self.teardown(&session.session_id).await;
                self.set_state(PlaybackState::Stopped);
            }
        }
        session.result
    }

    async fn play_steps(
        &self,
        script: &mut Script,
        session: &mut PlaybackSession,
        stop: &StopSignal,
    ) -> RunEnd {
        for index in 0..script.steps.len() {
            session.cursor = Some(index);
            self.set_state(PlaybackState::Running(index));

            // Echo steps never reach the server.
            if script.steps[index].step_type.is_echo() {
                self.finish_step(script, index, StepOutcome::Success, None);
                continue;
            }
            if stop.is_stop_requested() {
                session.result.fail(FailureKind::UserStop, STOPPED_MESSAGE);
                return RunEnd::Stopped;
            }

            let step = &script.steps[index];
            let step_id = step.id.clone();
            self.observer.step_started(&step_id);

            if step.step_type.is_pause() {
                let Some(wait) = step.wait_time() else {
                    let message = format!("step '{step_id}' has no usable waitTime");
                    self.finish_step(script, index, StepOutcome::Error, Some(message.clone()));
                    session.result.fail(FailureKind::InvalidScript, message);
                    return RunEnd::Completed;
                };
                self.set_state(PlaybackState::PauseTicking(index));
                match self.pause(&step_id, wait, stop).await {
                    PauseEnd::Elapsed => {
                        self.finish_step(script, index, StepOutcome::Success, None);
                        continue;
                    }
                    PauseEnd::Stopped => {
                        self.finish_step(
                            script,
                            index,
                            StepOutcome::Pending,
                            Some(STOPPED_MESSAGE.to_string()),
                        );
                        session.result.fail(FailureKind::UserStop, STOPPED_MESSAGE);
                        return RunEnd::Stopped;
                    }
                }
            }

            let command = with_session(&encode_step(step), &session.session_id);
            tracing::debug!(step_id = step_id.as_str(), command = command.as_str(), "playing step");
            let response = match self.driver.post(&command).await {
                Ok(response) => response,
                Err(error) => {
                    self.connection_failed(script, session.cursor, &mut session.result, error);
                    return RunEnd::ConnectionFailed;
                }
            };
            match classify_response(&response) {
                ResponseClass::Success => {
                    self.finish_step(script, index, StepOutcome::Success, None);
                }
                ResponseClass::AssertionFailed => {
                    self.finish_step(script, index, StepOutcome::Failure, None);
                    session.result.record_assertion_failure();
                }
                ResponseClass::ServerError => {
                    self.finish_step(script, index, StepOutcome::Error, Some(response.clone()));
                    session.result.fail(FailureKind::ServerError, response);
                    return RunEnd::Completed;
                }
            }
        }
        RunEnd::Completed
    }

    async fn pause(&self, step_id: &str, wait: Duration, stop: &StopSignal) -> PauseEnd {
        let tick = self.settings.pause_tick.max(Duration::from_millis(1));
        let tick_ms = tick.as_millis();
        let wait_ms = wait.as_millis();
        let ticks = wait_ms.div_ceil(tick_ms).max(1);
        let scale = wait_ms as f64 / tick_ms as f64;

        let mut interval = interval_at(Instant::now() + tick, tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut stop_changes = stop.subscribe();
        let mut counter: u128 = 0;
        loop {
            // The flag only ever flips to true, so a change wakes the pause early.
            tokio::select! {
                _ = interval.tick() => {}
                Ok(()) = stop_changes.changed() => {}
            }
            if stop.is_stop_requested() {
                return PauseEnd::Stopped;
            }
            counter += 1;
            let percent = if scale > 0.0 {
                (100.0 * counter as f64 / scale).min(100.0)
            } else {
                100.0
            };
            self.observer.step_progress(step_id, percent);
            if counter >= ticks {
                return PauseEnd::Elapsed;
            }
        }
    }

    fn connection_failed(
        &self,
        script: &mut Script,
        cursor: Option<usize>,
        result: &mut PlaybackResult,
        error: TransportError,
    ) {
        let message = format!("{CONNECTION_ERROR_PREFIX}: {error}");
        tracing::warn!(error = %error, cursor = ?cursor, "remote server connection failed");
        self.finish_step(
            script,
            cursor.unwrap_or(0),
            StepOutcome::Error,
            Some(message.clone()),
        );
        result.fail(FailureKind::TransportFailure, message);
        self.set_state(PlaybackState::ConnectionFailed);
    }

    async fn teardown(&self, session_id: &str) {
        if let Err(error) = self.driver.post(&test_complete_command(session_id)).await {
            tracing::warn!(session_id, error = %error, "testComplete teardown failed");
        }
    }

    fn finish_step(
        &self,
        script: &mut Script,
        index: usize,
        outcome: StepOutcome,
        message: Option<String>,
    ) {
        let Some(step) = script.steps.get_mut(index) else {
            return;
        };
        step.record(outcome, message);
        self.observer
            .step_finished(&step.id, outcome, step.failure_message.as_deref());
    }

    fn set_state(&self, state: PlaybackState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    fn set_active_stop(&self, stop: Option<StopSignal>) {
        *self
            .active_stop
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = stop;
    }
}
