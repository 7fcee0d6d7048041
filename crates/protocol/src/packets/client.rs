//! Client -> Server packet parsing.

use super::CONTROL_TYPE;
use crate::{Direction, ProtocolError};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Raw envelope as it arrives on the wire.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    direction: Option<String>,
}

/// Parsed client packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    /// `{"type": "control", "direction": "left" | "right"}`.
    Control { direction: Direction },
    /// Any other well-formed envelope. Carries the `type` value for logging.
    Ignored { kind: String },
}

impl ClientPacket {
    /// Parse a client packet from a text frame.
    ///
    /// Only a JSON object is a packet; arrays and scalars are rejected even
    /// when their elements would line up with the envelope fields.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let object: Map<String, Value> = serde_json::from_str(text)?;
        let envelope: Envelope = serde_json::from_value(Value::Object(object))?;

        if envelope.kind != CONTROL_TYPE {
            return Ok(ClientPacket::Ignored {
                kind: envelope.kind,
            });
        }

        let direction = envelope
            .direction
            .ok_or(ProtocolError::MissingDirection)?
            .parse()?;
        Ok(ClientPacket::Control { direction })
    }

    /// Build the text frame for a control packet (used by viewers).
    pub fn control(direction: Direction) -> String {
        format!(
            r#"{{"type":"{}","direction":"{}"}}"#,
            CONTROL_TYPE,
            direction.as_str()
        )
    }
}
