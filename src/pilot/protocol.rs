// Wire codec for the frame stream
//
// Frame := length (u32, little-endian) || payload (length bytes)
// A zero length is the end-of-session sentinel and carries no payload.
// Decision := one ASCII-digit byte.
//
// Framing is strict: a connection that closes mid-frame is a protocol
// error, never a recoverable short read. Sessions are single-shot.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::MAX_FRAME_LEN;

#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("connection closed mid-frame")]
    ShortRead,

    #[error("frame length {0} exceeds the {limit}-byte limit", limit = MAX_FRAME_LEN)]
    OversizedFrame(u32),

    #[error("class index {0} not representable as a decision digit")]
    InvalidClass(u8),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Steering decision carried in one decision byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Forward,
    RotateLeft,
    RotateRight,
}

impl Decision {
    /// Decode a decision byte. Bytes outside `'0'..='2'` carry no
    /// recognized command.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(Decision::Forward),
            b'1' => Some(Decision::RotateLeft),
            b'2' => Some(Decision::RotateRight),
            _ => None,
        }
    }
}

/// Write one frame: length prefix, then the payload.
pub async fn write_frame<W>(stream: &mut W, payload: &[u8]) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    stream.write_u32_le(payload.len() as u32).await?;
    stream.write_all(payload).await?;
    stream.flush().await?;
    Ok(())
}

/// Write the zero-length end-of-session sentinel.
pub async fn write_end_of_session<W>(stream: &mut W) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    stream.write_u32_le(0).await?;
    stream.flush().await?;
    Ok(())
}

/// Read one frame. `Ok(None)` is the end-of-session sentinel; no payload
/// bytes are consumed for it.
pub async fn read_frame<R>(stream: &mut R) -> Result<Option<Vec<u8>>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let len = stream.read_u32_le().await.map_err(map_eof)?;

    if len == 0 {
        return Ok(None);
    }
    if len > MAX_FRAME_LEN {
        return Err(ProtocolError::OversizedFrame(len));
    }

    let mut payload = vec![0u8; len as usize];
    stream.read_exact(&mut payload).await.map_err(map_eof)?;
    Ok(Some(payload))
}

/// Read the single decision byte for the frame in flight.
pub async fn read_decision<R>(stream: &mut R) -> Result<u8, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];
    stream.read_exact(&mut byte).await.map_err(map_eof)?;
    Ok(byte[0])
}

/// Encode a perception class index as its decision byte and write it.
pub async fn write_decision<W>(stream: &mut W, class: u8) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    if class > 9 {
        return Err(ProtocolError::InvalidClass(class));
    }
    stream.write_all(&[b'0' + class]).await?;
    stream.flush().await?;
    Ok(())
}

fn map_eof(err: std::io::Error) -> ProtocolError {
    if err.kind() == std::io::ErrorKind::UnexpectedEof {
        ProtocolError::ShortRead
    } else {
        ProtocolError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn frame_round_trip() {
        let payload: Vec<u8> = (0..12_345u32).map(|i| (i % 251) as u8).collect();

        let mut wire = Vec::new();
        write_frame(&mut wire, &payload).await.unwrap();

        assert_eq!(wire.len(), 4 + 12_345);
        assert_eq!(u32::from_le_bytes([wire[0], wire[1], wire[2], wire[3]]), 12_345);

        let mut reader = wire.as_slice();
        let decoded = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(decoded, payload);
        assert!(reader.is_empty());
    }

    #[tokio::test]
    async fn zero_length_is_the_session_sentinel() {
        let mut wire = Vec::new();
        write_end_of_session(&mut wire).await.unwrap();
        assert_eq!(wire, [0, 0, 0, 0]);

        let mut reader = wire.as_slice();
        assert!(read_frame(&mut reader).await.unwrap().is_none());
        // The sentinel consumes nothing beyond its prefix.
        assert!(reader.is_empty());
    }

    #[tokio::test]
    async fn truncated_payload_is_a_short_read() {
        let mut wire = Vec::new();
        write_frame(&mut wire, &[1, 2, 3, 4, 5]).await.unwrap();
        wire.truncate(7); // cut the connection mid-payload

        let mut reader = wire.as_slice();
        let err = read_frame(&mut reader).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ShortRead));
    }

    #[tokio::test]
    async fn truncated_prefix_is_a_short_read() {
        let wire = [42u8, 0];
        let mut reader = wire.as_slice();
        let err = read_frame(&mut reader).await.unwrap_err();
        assert!(matches!(err, ProtocolError::ShortRead));
    }

    #[tokio::test]
    async fn oversized_length_is_rejected_before_allocation() {
        let wire = u32::MAX.to_le_bytes();
        let mut reader = wire.as_slice();
        let err = read_frame(&mut reader).await.unwrap_err();
        assert!(matches!(err, ProtocolError::OversizedFrame(u32::MAX)));
    }

    #[tokio::test]
    async fn decision_bytes_are_ascii_digits() {
        let mut wire = Vec::new();
        write_decision(&mut wire, 2).await.unwrap();
        assert_eq!(wire, [b'2']);

        let mut reader = wire.as_slice();
        assert_eq!(read_decision(&mut reader).await.unwrap(), b'2');

        let mut wire = Vec::new();
        let err = write_decision(&mut wire, 10).await.unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidClass(10)));
    }

    #[test]
    fn decision_decode_table() {
        assert_eq!(Decision::from_byte(b'0'), Some(Decision::Forward));
        assert_eq!(Decision::from_byte(b'1'), Some(Decision::RotateLeft));
        assert_eq!(Decision::from_byte(b'2'), Some(Decision::RotateRight));
        assert_eq!(Decision::from_byte(b'3'), None);
        assert_eq!(Decision::from_byte(b'x'), None);
        assert_eq!(Decision::from_byte(0), None);
    }
}
