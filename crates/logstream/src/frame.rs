//! Wire frames for the log-stream bridge (§4.G): `connected` once the
//! producer starts, one `log` per line, `error` on producer failure,
//! `disconnected` on exit. Transport-agnostic — the `api` crate serializes
//! these onto an `axum` WebSocket.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogFrame {
    Connected,
    Log { line: String },
    Error { message: String },
    Disconnected,
}

impl LogFrame {
    /// Infallible: the variants above always serialize.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("LogFrame is always serializable")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_frame_serializes_with_type_tag() {
        let frame = LogFrame::Log { line: "starting up".to_string() };
        assert_eq!(frame.to_json(), r#"{"type":"log","line":"starting up"}"#);
    }

    #[test]
    fn connected_and_disconnected_are_unit_variants() {
        assert_eq!(LogFrame::Connected.to_json(), r#"{"type":"connected"}"#);
        assert_eq!(LogFrame::Disconnected.to_json(), r#"{"type":"disconnected"}"#);
    }
}
