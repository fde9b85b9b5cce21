//! Remote-control playback for step scripts and suites.
//!
//! Encodes steps into the remote server's wire format, plays scripts one step
//! at a time with cooperative stop and local pause timing, and sequences whole
//! suites while reporting per-step and per-script results to an observer.

pub mod encoder;
pub mod observer;
pub mod playback_result;
pub mod remote_driver;
pub mod script;
pub mod script_io;
pub mod script_playback;
pub mod stop_signal;
pub mod suite_playback;

pub use encoder::{
    encode_component, encode_step, new_session_command, test_complete_command, with_session,
};
pub use observer::{NoopObserver, PlaybackObserver, TracingObserver};
pub use playback_result::{FailureKind, PlaybackResult, STOPPED_MESSAGE};
pub use remote_driver::{
    HttpRemoteDriver, HttpRemoteDriverConfig, RemoteDriver, TransportError, DRIVER_PATH,
};
pub use script::{Locator, ParamValue, Script, SeleniumVersion, Step, StepOutcome};
pub use script_io::{
    load_script, load_scripts, load_suite, parse_script, InMemorySuite, ScriptLoadError,
};
pub use script_playback::{
    classify_response, PlaybackSettings, PlaybackState, ResponseClass, ScriptPlayback,
};
pub use stop_signal::StopSignal;
pub use suite_playback::{ScriptRunResult, ScriptSource, SuitePlayback, SuiteReport, SuiteRun};
