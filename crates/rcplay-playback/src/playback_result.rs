use serde::{Deserialize, Serialize};

/// Error message of runs ended by a stop request.
pub const STOPPED_MESSAGE: &str = "stopped";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Why a run did not succeed.
pub enum FailureKind {
    /// The remote server could not be reached.
    TransportFailure,
    /// The server answered a step with an unrecognized or error response.
    ServerError,
    /// A check step answered `false`; the run continued.
    AssertionFailure,
    /// Playback stopped on request.
    UserStop,
    /// The script could not be played at all (no steps, unusable pause time,
    /// no remote backend for its dialect).
    InvalidScript,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Result of one script run.
pub struct PlaybackResult {
    pub success: bool,
    #[serde(
        rename = "errormessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_kind: Option<FailureKind>,
}

impl PlaybackResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            url: None,
            failure_kind: Some(kind),
        }
    }

    pub fn stopped() -> Self {
        Self::failed(FailureKind::UserStop, STOPPED_MESSAGE)
    }

    /// Marks the run failed while keeping any result URL already attached.
    pub fn fail(&mut self, kind: FailureKind, message: impl Into<String>) {
        self.success = false;
        self.error_message = Some(message.into());
        self.failure_kind = Some(kind);
    }

    /// Records a non-fatal check failure; a fatal kind already recorded wins.
    pub fn record_assertion_failure(&mut self) {
        self.success = false;
        if self.failure_kind.is_none() {
            self.failure_kind = Some(FailureKind::AssertionFailure);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.failure_kind == Some(FailureKind::UserStop)
    }
}
