use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// Serialization format for published payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// JSON format (human-readable, what subscribers expect by default).
    #[default]
    Json,

    /// CBOR format (compact binary).
    Cbor,
}

impl Format {
    /// Get the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Format::Json => "application/json",
            Format::Cbor => "application/cbor",
        }
    }
}

/// Encode a value to bytes using the specified format.
pub fn encode<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>> {
    match format {
        Format::Json => serde_json::to_vec(value).map_err(Error::from),
        Format::Cbor => {
            let mut buf = Vec::new();
            ciborium::into_writer(value, &mut buf)?;
            Ok(buf)
        }
    }
}

/// Decode bytes to a value using the specified format.
pub fn decode<T: DeserializeOwned>(data: &[u8], format: Format) -> Result<T> {
    match format {
        Format::Json => serde_json::from_slice(data).map_err(Error::from),
        Format::Cbor => ciborium::from_reader(data).map_err(|e| Error::Cbor(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ManagerMessage;

    fn sample_event() -> ManagerMessage {
        ManagerMessage::new()
            .with("Event", "Newchannel")
            .with("Channel", "SIP/100-00000001")
            .with("CallerIDNum", "100")
    }

    #[test]
    fn test_json_roundtrip() {
        let event = sample_event();

        let encoded = encode(&event, Format::Json).unwrap();
        let decoded: ManagerMessage = decode(&encoded, Format::Json).unwrap();

        assert_eq!(event, decoded);
    }

    #[test]
    fn test_cbor_roundtrip() {
        let event = sample_event();

        let encoded = encode(&event, Format::Cbor).unwrap();
        let decoded: ManagerMessage = decode(&encoded, Format::Cbor).unwrap();

        assert_eq!(event, decoded);
    }

    #[test]
    fn test_cbor_is_smaller() {
        let event = sample_event();

        let json = encode(&event, Format::Json).unwrap();
        let cbor = encode(&event, Format::Cbor).unwrap();

        assert!(cbor.len() < json.len(), "CBOR should be smaller than JSON");
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(Format::Json.mime_type(), "application/json");
        assert_eq!(Format::Cbor.mime_type(), "application/cbor");
    }
}
