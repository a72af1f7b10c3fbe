use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::table::KeyedTable;
use crate::types::{ParticipantId, RawSample, Sample};

/// Full shared state: every participant's latest sample
pub type Landmarks = KeyedTable<Sample>;

/// Messages sent from the relay to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// Identity assignment, always the first message on a connection
    SetId { id: ParticipantId },

    /// Full snapshot of the landmark store after a mutation
    Landmarks { landmarks: Landmarks },
}

impl ServerMessage {
    /// Validate and decode a notice from the relay
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum BorrowedNotice<'a> {
    Landmarks { landmarks: &'a Landmarks },
}

/// Encode a `landmarks` notice without cloning the snapshot
pub fn encode_landmarks(landmarks: &Landmarks) -> Result<String, ProtocolError> {
    Ok(serde_json::to_string(&BorrowedNotice::Landmarks { landmarks })?)
}

/// Messages sent from clients to the relay.
///
/// On the wire this is a bare sample with no envelope, so the only thing
/// to check is its shape.
pub struct ClientMessage;

impl ClientMessage {
    pub fn parse(text: &str) -> Result<Sample, ProtocolError> {
        let raw: RawSample = serde_json::from_str(text)?;
        Sample::try_from(raw)
    }

    pub fn encode(sample: &Sample) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(sample)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_set_id_wire_shape() {
        let id = ParticipantId::try_from("x1").unwrap();
        let text = ServerMessage::SetId { id }.encode().unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            json!({ "type": "setId", "id": "x1" })
        );
    }

    #[test]
    fn test_borrowed_landmarks_matches_owned() {
        let sample = Sample::new(json!({ "score": 1.0 }), Value::Null).unwrap();
        let landmarks: Landmarks = [(ParticipantId::try_from("x1").unwrap(), sample)]
            .into_iter()
            .collect();

        let borrowed = encode_landmarks(&landmarks).unwrap();
        let owned = ServerMessage::Landmarks { landmarks }.encode().unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&borrowed).unwrap(),
            serde_json::from_str::<Value>(&owned).unwrap()
        );
        assert_eq!(
            serde_json::from_str::<Value>(&borrowed).unwrap(),
            json!({ "type": "landmarks", "landmarks": { "x1": { "pose": { "score": 1.0 }, "face": null } } })
        );
    }

    #[test]
    fn test_client_message_boundary() {
        assert!(ClientMessage::parse(r#"{"pose":{},"face":{}}"#).is_ok());
        assert!(ClientMessage::parse(r#"{"pose":{}}"#).is_err());
        assert!(ClientMessage::parse(r#"{"pose":3,"face":{}}"#).is_err());
        assert!(ClientMessage::parse("not json").is_err());
        assert!(ClientMessage::parse("[]").is_err());
    }

    #[test]
    fn test_server_message_rejects_unknown_and_malformed() {
        assert!(ServerMessage::parse(r#"{"type":"bogus"}"#).is_err());
        assert!(ServerMessage::parse(r#"{"type":"setId","id":""}"#).is_err());
        assert!(
            ServerMessage::parse(r#"{"type":"landmarks","landmarks":{"a":{"pose":1,"face":null}}}"#)
                .is_err()
        );
        assert!(matches!(
            ServerMessage::parse(r#"{"type":"landmarks","landmarks":{}}"#).unwrap(),
            ServerMessage::Landmarks { landmarks } if landmarks.is_empty()
        ));
    }
}
