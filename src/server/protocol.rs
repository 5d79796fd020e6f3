//! Wire framing
//!
//! Every message is a fixed 9-byte header followed by a JSON payload:
//!
//! ```text
//! ┌──────────────┬───────────────┬───────┬──────────────────┐
//! │ len: u32 LE  │ class: u32 LE │ flags │ payload (len B)  │
//! └──────────────┴───────────────┴───────┴──────────────────┘
//! ```
//!
//! `flags` bit 0 marks a compressed payload. Compression is disabled on this
//! channel: outbound frames never set it and inbound frames that do are
//! rejected.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Wire format for messages (length-prefixed)
pub const MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024; // 16MB max message

/// Length + class + flags
pub const HEADER_LEN: usize = 9;

const FLAG_COMPRESSED: u8 = 0b0000_0001;

/// Message class carried in every frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    Request,
    Response,
}

impl MessageClass {
    pub fn id(self) -> u32 {
        match self {
            Self::Request => 1,
            Self::Response => 2,
        }
    }

    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::Request),
            2 => Some(Self::Response),
            _ => None,
        }
    }
}

/// Transport-level failure
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("peer closed the connection")]
    ConnectionClosed,

    #[error("message too large: {0} bytes")]
    MessageTooLarge(usize),

    #[error("unknown message class {0}")]
    UnknownMessageClass(u32),

    #[error("compressed messages are not supported on this channel")]
    CompressionUnsupported,

    #[error("unknown frame flags: {0:#04x}")]
    UnknownFlags(u8),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Encode a message to bytes with its header
pub fn encode_message<T: Serialize>(
    msg: &T,
    class: MessageClass,
) -> Result<Vec<u8>, ProtocolError> {
    let payload = serde_json::to_vec(msg)?;
    if payload.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge(payload.len()));
    }
    let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&class.id().to_le_bytes());
    buf.push(0);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decode a frame header into payload length and message class
pub fn decode_header(header: &[u8; HEADER_LEN]) -> Result<(usize, MessageClass), ProtocolError> {
    let len = u32::from_le_bytes([header[0], header[1], header[2], header[3]]) as usize;
    let class_id = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    let flags = header[8];

    if flags & FLAG_COMPRESSED != 0 {
        return Err(ProtocolError::CompressionUnsupported);
    }
    if flags != 0 {
        return Err(ProtocolError::UnknownFlags(flags));
    }
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge(len));
    }
    let class =
        MessageClass::from_id(class_id).ok_or(ProtocolError::UnknownMessageClass(class_id))?;
    Ok((len, class))
}

/// Message-oriented channel over a byte stream: one JSON object per frame
pub struct MessageChannel<S> {
    stream: S,
}

impl<S: AsyncRead + AsyncWrite + Unpin> MessageChannel<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Receive one JSON message and its class
    pub async fn receive_json(&mut self) -> Result<(Value, MessageClass), ProtocolError> {
        let mut header = [0u8; HEADER_LEN];
        match self.stream.read_exact(&mut header).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(ProtocolError::ConnectionClosed)
            }
            Err(e) => return Err(e.into()),
        }
        let (len, class) = decode_header(&header)?;

        let mut payload = vec![0u8; len];
        match self.stream.read_exact(&mut payload).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(ProtocolError::ConnectionClosed)
            }
            Err(e) => return Err(e.into()),
        }

        let value = serde_json::from_slice(&payload)?;
        Ok((value, class))
    }

    /// Send one message tagged with `class`
    pub async fn send_json<T: Serialize>(
        &mut self,
        msg: &T,
        class: MessageClass,
    ) -> Result<(), ProtocolError> {
        let encoded = encode_message(msg, class)?;
        self.stream.write_all(&encoded).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Shut down the write half of the underlying stream
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.stream.shutdown().await
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_layout() {
        let encoded = encode_message(&json!({"a": 1}), MessageClass::Response).unwrap();
        let payload = br#"{"a":1}"#;
        assert_eq!(&encoded[0..4], &(payload.len() as u32).to_le_bytes());
        assert_eq!(&encoded[4..8], &2u32.to_le_bytes());
        assert_eq!(encoded[8], 0);
        assert_eq!(&encoded[HEADER_LEN..], payload);
    }

    #[test]
    fn compressed_frames_are_rejected() {
        let mut header = [0u8; HEADER_LEN];
        header[4] = 1;
        header[8] = FLAG_COMPRESSED;
        assert!(matches!(
            decode_header(&header),
            Err(ProtocolError::CompressionUnsupported)
        ));
    }

    #[test]
    fn unknown_class_is_rejected() {
        let mut header = [0u8; HEADER_LEN];
        header[4] = 7;
        assert!(matches!(
            decode_header(&header),
            Err(ProtocolError::UnknownMessageClass(7))
        ));
    }

    #[test]
    fn oversized_length_is_rejected() {
        let mut header = [0u8; HEADER_LEN];
        header[0..4].copy_from_slice(&((MAX_MESSAGE_SIZE + 1) as u32).to_le_bytes());
        header[4] = 1;
        assert!(matches!(
            decode_header(&header),
            Err(ProtocolError::MessageTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn channel_exchanges_messages() {
        let (a, b) = tokio::io::duplex(1024);
        let mut client = MessageChannel::new(a);
        let mut server = MessageChannel::new(b);

        client
            .send_json(&json!({"search_query": "rust"}), MessageClass::Request)
            .await
            .unwrap();
        let (value, class) = server.receive_json().await.unwrap();
        assert_eq!(class, MessageClass::Request);
        assert_eq!(value["search_query"], "rust");
    }

    #[tokio::test]
    async fn eof_before_header_is_connection_closed() {
        let (a, b) = tokio::io::duplex(64);
        drop(a);
        let mut server = MessageChannel::new(b);
        assert!(matches!(
            server.receive_json().await,
            Err(ProtocolError::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn invalid_json_payload_is_rejected() {
        let (mut a, b) = tokio::io::duplex(64);
        let payload = b"{nope";
        let mut frame = (payload.len() as u32).to_le_bytes().to_vec();
        frame.extend_from_slice(&1u32.to_le_bytes());
        frame.push(0);
        frame.extend_from_slice(payload);
        a.write_all(&frame).await.unwrap();

        let mut server = MessageChannel::new(b);
        assert!(matches!(
            server.receive_json().await,
            Err(ProtocolError::InvalidJson(_))
        ));
    }
}
