use log::trace;
use serde::{Serialize, de::DeserializeOwned};

use super::errors::{Result, SerializationError};

/// Decode one text frame into a message.
pub fn decode<T: DeserializeOwned>(frame: &str) -> Result<T> {
    trace!("decoding {} byte frame", frame.len());
    serde_json::from_str(frame).map_err(SerializationError::Decode)
}

/// Decode a binary frame. Some servers send JSON as binary frames, which is
/// fine as long as the bytes are UTF-8.
pub fn decode_bytes<T: DeserializeOwned>(frame: &[u8]) -> Result<T> {
    let text = std::str::from_utf8(frame)
        .map_err(|error| SerializationError::InvalidFormat(error.to_string()))?;
    decode(text)
}

/// Encode a message as one text frame.
pub fn encode<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(SerializationError::Encode)
}
