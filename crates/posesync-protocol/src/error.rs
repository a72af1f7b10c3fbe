use thiserror::Error;

/// Reasons an inbound message is refused at the protocol boundary
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid field `{field}`: {reason}")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    #[error("Participant id must not be empty")]
    EmptyId,
}
