//! Message codec — framing and serialization for the wire protocol.

use crate::ProtocolError;

/// Maximum message size in bytes.
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16 MiB

/// Encode a message for transmission (length-prefixed JSON): a 4-byte
/// big-endian length prefix followed by the JSON-serialized payload.
pub fn encode(message: &impl serde::Serialize) -> Result<Vec<u8>, ProtocolError> {
    let body = serde_json::to_vec(message).map_err(|e| ProtocolError::Malformed(e.to_string()))?;
    if body.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: body.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let mut framed = Vec::with_capacity(4 + body.len());
    framed.extend_from_slice(&(body.len() as u32).to_be_bytes());
    framed.extend_from_slice(&body);
    Ok(framed)
}

/// Decode a message from raw bytes (no framing — the whole slice is one
/// JSON-encoded value).
pub fn decode<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T, ProtocolError> {
    serde_json::from_slice(data).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// Decode a single length-prefixed message from the front of a byte stream.
///
/// Returns the decoded value and the number of bytes consumed (the 4-byte
/// prefix plus the body), so callers can advance past one frame and retry on
/// the remainder of a buffered stream.
pub fn decode_framed<T: serde::de::DeserializeOwned>(
    data: &[u8],
) -> Result<(T, usize), ProtocolError> {
    if data.len() < 4 {
        return Err(ProtocolError::Malformed(
            "buffer shorter than length prefix".to_string(),
        ));
    }
    let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }
    let end = 4usize
        .checked_add(len)
        .ok_or_else(|| ProtocolError::Malformed("length prefix overflow".to_string()))?;
    if data.len() < end {
        return Err(ProtocolError::Malformed(
            "buffer shorter than declared frame length".to_string(),
        ));
    }
    let value = decode(&data[4..end])?;
    Ok((value, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_framed_roundtrip() {
        let framed = encode(&42u64).unwrap();
        let (value, consumed): (u64, usize) = decode_framed(&framed).unwrap();
        assert_eq!(value, 42);
        assert_eq!(consumed, framed.len());
    }

    #[test]
    fn decode_framed_rejects_short_buffer() {
        let result: Result<(u64, usize), _> = decode_framed(&[0, 0]);
        assert!(result.is_err());
    }

    #[test]
    fn decode_framed_rejects_truncated_body() {
        let mut framed = encode(&"hello".to_string()).unwrap();
        framed.truncate(framed.len() - 1);
        let result: Result<(String, usize), _> = decode_framed(&framed);
        assert!(result.is_err());
    }
}
