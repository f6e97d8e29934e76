//! OCPP-J message framing
//!
//! The gateway speaks the two frame kinds it needs:
//!
//! - **Call**       `[2, "<messageId>", "<action>", {<payload>}]`
//! - **CallResult** `[3, "<messageId>", {<payload>}]`
//!
//! CallError frames (`4`) are not handled and decode to
//! [`FrameError::UnsupportedMessageType`].

use serde_json::Value;

use super::errors::FrameError;

// ── Message-type constants ─────────────────────────────────────

const MSG_TYPE_CALL: u64 = 2;
const MSG_TYPE_CALL_RESULT: u64 = 3;

// ── OcppFrame ──────────────────────────────────────────────────

/// A parsed OCPP-J envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum OcppFrame {
    /// `[2, messageId, action, payload]`
    Call {
        message_id: String,
        action: String,
        payload: Value,
    },
    /// `[3, messageId, payload]`
    CallResult { message_id: String, payload: Value },
}

impl OcppFrame {
    // ── Decoding ───────────────────────────────────────────

    /// Decode raw text into an `OcppFrame`.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let root: Value =
            serde_json::from_str(text).map_err(|e| FrameError::InvalidJson(e.to_string()))?;

        let arr = root.as_array().ok_or(FrameError::NotAnArray)?;

        let first = arr.first().ok_or(FrameError::EmptyArray)?;
        let msg_type = first.as_u64().ok_or(FrameError::InvalidMessageType)?;

        match msg_type {
            MSG_TYPE_CALL => Self::parse_call(arr),
            MSG_TYPE_CALL_RESULT => Self::parse_call_result(arr),
            other => Err(FrameError::UnsupportedMessageType(other)),
        }
    }

    fn parse_call(arr: &[Value]) -> Result<Self, FrameError> {
        if arr.len() < 4 {
            return Err(FrameError::MissingFields {
                expected: 4,
                got: arr.len(),
            });
        }

        let message_id = arr[1]
            .as_str()
            .ok_or(FrameError::FieldTypeMismatch("messageId must be a string"))?
            .to_string();
        let action = arr[2]
            .as_str()
            .ok_or(FrameError::FieldTypeMismatch("action must be a string"))?
            .to_string();

        Ok(Self::Call {
            message_id,
            action,
            payload: arr[3].clone(),
        })
    }

    fn parse_call_result(arr: &[Value]) -> Result<Self, FrameError> {
        if arr.len() < 3 {
            return Err(FrameError::MissingFields {
                expected: 3,
                got: arr.len(),
            });
        }

        let message_id = arr[1]
            .as_str()
            .ok_or(FrameError::FieldTypeMismatch("messageId must be a string"))?
            .to_string();

        Ok(Self::CallResult {
            message_id,
            payload: arr[2].clone(),
        })
    }

    // ── Encoding ───────────────────────────────────────────

    /// Serialize this frame to its wire text.
    pub fn serialize(&self) -> String {
        let arr = match self {
            Self::Call {
                message_id,
                action,
                payload,
            } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL.into()),
                Value::String(message_id.clone()),
                Value::String(action.clone()),
                payload.clone(),
            ]),
            Self::CallResult {
                message_id,
                payload,
            } => Value::Array(vec![
                Value::Number(MSG_TYPE_CALL_RESULT.into()),
                Value::String(message_id.clone()),
                payload.clone(),
            ]),
        };

        // Display on a Value cannot fail
        arr.to_string()
    }

    /// Build the `[3, messageId, payload]` reply to a call.
    pub fn reply(message_id: impl Into<String>, payload: Value) -> Self {
        Self::CallResult {
            message_id: message_id.into(),
            payload,
        }
    }
}
