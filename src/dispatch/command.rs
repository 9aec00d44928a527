//! Command envelope decoding for the datagram protocol
//!
//! One JSON document per datagram, discriminated by a required `type`
//! field. Decoding is done by explicit field extraction from a
//! `serde_json::Value` so that each malformed shape maps onto its exact
//! wire error string.

use serde_json::Value;

/// Default status applied when a position update carries none.
pub const DEFAULT_STATUS: &str = "unlocked";

/// A decoded command envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Position {
        id: i64,
        lat: f64,
        lon: f64,
        status: String,
    },
    Maintenance {
        id: i64,
        /// Carried verbatim; the handler validates lock/unlock so an
        /// unknown action gets its own error response.
        action: String,
    },
}

/// Protocol-level decode failures. Always recovered locally by sending
/// the corresponding wire response; never surfaced as a gateway error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Not a JSON object, missing/non-string `type`, or missing required
    /// numeric fields on a position update
    InvalidFormat,
    /// `type` is a string but not a known discriminator
    UnknownType,
    /// Maintenance request without an `id`
    MissingId,
}

impl CommandError {
    /// Exact response text sent back to the originating address.
    pub fn wire_response(&self) -> &'static str {
        match self {
            CommandError::InvalidFormat => "ERROR: Invalid message format",
            CommandError::UnknownType => "ERROR: Unknown message type",
            CommandError::MissingId => "ERROR: Missing eBike ID",
        }
    }
}

/// Decode one datagram payload into a command envelope.
pub fn decode(payload: &[u8]) -> Result<Command, CommandError> {
    let value: Value = serde_json::from_slice(payload).map_err(|_| CommandError::InvalidFormat)?;
    let object = value.as_object().ok_or(CommandError::InvalidFormat)?;

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .ok_or(CommandError::InvalidFormat)?;

    match kind {
        "position" => {
            let id = object
                .get("id")
                .and_then(Value::as_i64)
                .ok_or(CommandError::InvalidFormat)?;
            let lat = object
                .get("lat")
                .and_then(Value::as_f64)
                .ok_or(CommandError::InvalidFormat)?;
            let lon = object
                .get("lon")
                .and_then(Value::as_f64)
                .ok_or(CommandError::InvalidFormat)?;
            let status = object
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or(DEFAULT_STATUS)
                .to_string();

            Ok(Command::Position {
                id,
                lat,
                lon,
                status,
            })
        }
        "maintenance" => {
            let id = object
                .get("id")
                .and_then(Value::as_i64)
                .ok_or(CommandError::MissingId)?;
            let action = object
                .get("action")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();

            Ok(Command::Maintenance { id, action })
        }
        _ => Err(CommandError::UnknownType),
    }
}
