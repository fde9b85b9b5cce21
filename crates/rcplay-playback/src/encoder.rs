//! Wire encoding of steps for the remote-control server.
//!
//! Commands are form-style bodies: `cmd=<name>&1=<v1>&2=<v2>...`. Values are
//! escaped like `encodeURIComponent`, then `%20` becomes `+` and `! ' ( ) *`
//! are escaped as well, which is what the server's form decoder expects.

use std::fmt::Write as _;

use crate::script::Step;

pub const SESSION_ID_FIELD: &str = "sessionId";

fn is_unescaped(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

/// Escapes one value for a command body.
pub fn encode_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if is_unescaped(byte) {
            encoded.push(char::from(byte));
        } else if byte == b' ' {
            encoded.push('+');
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

/// `cmd=<name>` followed by one `&<n>=<value>` group per declared parameter.
pub fn encode_step(step: &Step) -> String {
    let mut command = format!("cmd={}", step.command_name());
    for (index, param) in step.step_type.params().iter().enumerate() {
        let value = step
            .param(param)
            .map(|value| encode_component(&value.wire_text()))
            .unwrap_or_default();
        let _ = write!(command, "&{}={value}", index + 1);
    }
    command
}

pub fn new_session_command(browser: &str, base_url: &str) -> String {
    format!(
        "cmd=getNewBrowserSession&1={}&2={}&3=null",
        encode_component(browser),
        encode_component(base_url)
    )
}

pub fn with_session(command: &str, session_id: &str) -> String {
    format!("{command}&{SESSION_ID_FIELD}={session_id}")
}

pub fn test_complete_command(session_id: &str) -> String {
    format!("cmd=testComplete&{SESSION_ID_FIELD}={session_id}")
}
