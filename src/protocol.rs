// Message protocol between the renderer and its host bridge
//
// Both directions are closed tagged enums serialized with a `type` field,
// e.g. `{"type":"stdout","text":"..."}`. Decoding rejects unknown tags and
// payloads with missing fields instead of guessing.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::StreamKind;

/// Messages delivered to the renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    Stdout {
        text: String,
    },
    Stderr {
        text: String,
    },
    Exit {
        #[serde(default)]
        code: Option<i32>,
    },
    Cwd {
        path: String,
    },
    CompletionItems {
        items: Vec<String>,
        /// Prefix of the request being answered, when the host echoes it
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prefix: Option<String>,
    },
}

impl HostMessage {
    pub fn output(stream: StreamKind, text: impl Into<String>) -> Self {
        let text = text.into();
        match stream {
            StreamKind::Stdout => HostMessage::Stdout { text },
            StreamKind::Stderr => HostMessage::Stderr { text },
        }
    }

    /// Tag name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            HostMessage::Stdout { .. } => "stdout",
            HostMessage::Stderr { .. } => "stderr",
            HostMessage::Exit { .. } => "exit",
            HostMessage::Cwd { .. } => "cwd",
            HostMessage::CompletionItems { .. } => "completionItems",
        }
    }
}

/// Messages sent from the renderer to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    Input { text: String },
    Interrupt,
    Complete { prefix: String },
}

impl ClientMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            ClientMessage::Input { .. } => "input",
            ClientMessage::Interrupt => "interrupt",
            ClientMessage::Complete { .. } => "complete",
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message has no string `type` field")]
    MissingType,

    #[error("unknown message type `{0}`")]
    UnknownType(String),
}

const HOST_TYPES: [&str; 5] = ["stdout", "stderr", "exit", "cwd", "completionItems"];
const CLIENT_TYPES: [&str; 3] = ["input", "interrupt", "complete"];

fn check_type(value: &serde_json::Value, known: &[&str]) -> Result<(), ProtocolError> {
    let tag = value
        .get("type")
        .and_then(serde_json::Value::as_str)
        .ok_or(ProtocolError::MissingType)?;
    if known.contains(&tag) {
        Ok(())
    } else {
        Err(ProtocolError::UnknownType(tag.to_string()))
    }
}

/// Decode one JSON message from the host
pub fn decode_host_message(json: &str) -> Result<HostMessage, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    check_type(&value, &HOST_TYPES)?;
    Ok(serde_json::from_value(value)?)
}

/// Decode one JSON message from the renderer
pub fn decode_client_message(json: &str) -> Result<ClientMessage, ProtocolError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    check_type(&value, &CLIENT_TYPES)?;
    Ok(serde_json::from_value(value)?)
}
