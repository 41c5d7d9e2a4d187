use bytes::{BufMut, Bytes, BytesMut};
use gpiocomm_signal::{SignalCells, SIGNAL_LEN};
use tracing::warn;

use crate::error::{FrameError, Result};
use crate::tag::MessageTag;

/// Cell holding the body length of the pending message.
pub const SIZE_INDEX: usize = 0;

/// First body cell.
pub const BODY_INDEX: usize = SIZE_INDEX + 1;

/// Largest body that fits after the size cell.
pub const MAX_BODY_LEN: usize = SIGNAL_LEN - BODY_INDEX;

/// A complete message rebuilt from single-cell writes.
///
/// Body byte 0 is the message tag, the rest is the tag's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    body: Bytes,
}

impl Frame {
    /// Create a frame from its body bytes.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    /// The whole body, tag included.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Raw tag byte, if the frame is not empty.
    pub fn raw_tag(&self) -> Option<u8> {
        self.body.first().copied()
    }

    /// The frame's message tag.
    pub fn tag(&self) -> Result<MessageTag> {
        let raw = self.raw_tag().ok_or(FrameError::EmptyFrame)?;
        MessageTag::try_from(raw)
    }

    /// Bytes after the tag. Empty for an empty frame.
    pub fn payload(&self) -> &[u8] {
        self.body.get(1..).unwrap_or_default()
    }

    /// Body length in bytes.
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// True for a zero-length frame.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Consume the frame and return its body.
    pub fn into_body(self) -> Bytes {
        self.body
    }
}

/// What the framer does with a declared size larger than [`MAX_BODY_LEN`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Treat the size as [`MAX_BODY_LEN`] and keep reading.
    #[default]
    Clamp,
    /// Drop the frame, answer with an empty response and reset.
    Reject,
}

/// Configuration for the framer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FramerConfig {
    /// Handling of oversized declared lengths.
    pub overflow: OverflowPolicy,
}

/// Write a response into the cells using the request layout.
///
/// All writes are silent. Bodies longer than [`MAX_BODY_LEN`] are truncated.
/// Returns the number of body bytes written.
pub fn encode_response(cells: &mut SignalCells, body: &[u8]) -> usize {
    let body = if body.len() > MAX_BODY_LEN {
        warn!(
            size = body.len(),
            max = MAX_BODY_LEN,
            "response too large, truncating"
        );
        &body[..MAX_BODY_LEN]
    } else {
        body
    };

    // Every index below is bounded by SIGNAL_LEN, so these writes cannot fail.
    let _ = cells.write_silent(SIZE_INDEX, body.len() as u8);
    for (offset, byte) in body.iter().enumerate() {
        let _ = cells.write_silent(BODY_INDEX + offset, *byte);
    }
    body.len()
}

/// Read the frame currently laid out in the cells, as the game would.
///
/// A size cell larger than [`MAX_BODY_LEN`] is clamped.
pub fn decode_response(cells: &SignalCells) -> Bytes {
    let size = usize::from(cells.read(SIZE_INDEX).unwrap_or(0)).min(MAX_BODY_LEN);
    let mut buf = BytesMut::with_capacity(size);
    buf.put_slice(&cells.as_slice()[BODY_INDEX..BODY_INDEX + size]);
    buf.freeze()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_accessors() {
        let frame = Frame::new(vec![8, 3]);
        assert_eq!(frame.raw_tag(), Some(8));
        assert_eq!(frame.tag().unwrap(), MessageTag::CheckScores);
        assert_eq!(frame.payload(), &[3]);
        assert_eq!(frame.len(), 2);
        assert!(!frame.is_empty());
    }

    #[test]
    fn empty_frame_has_no_tag() {
        let frame = Frame::new(Bytes::new());
        assert!(frame.is_empty());
        assert!(frame.payload().is_empty());
        assert_eq!(frame.tag(), Err(FrameError::EmptyFrame));
    }

    #[test]
    fn unknown_tag_is_reported() {
        let frame = Frame::new(vec![0x42]);
        assert_eq!(frame.tag(), Err(FrameError::UnknownTag(0x42)));
    }

    #[test]
    fn encode_writes_size_then_body() {
        let mut cells = SignalCells::new();
        let written = encode_response(&mut cells, &[1, 1, 0]);

        assert_eq!(written, 3);
        assert_eq!(&cells.as_slice()[..4], &[3, 1, 1, 0]);
        assert_eq!(decode_response(&cells).as_ref(), &[1, 1, 0]);
    }

    #[test]
    fn encode_empty_response_only_sets_size() {
        let mut cells = SignalCells::new();
        cells.write_silent(1, 0x55).unwrap();

        assert_eq!(encode_response(&mut cells, &[]), 0);
        assert_eq!(cells.read(SIZE_INDEX).unwrap(), 0);
        assert_eq!(cells.read(1).unwrap(), 0x55);
        assert!(decode_response(&cells).is_empty());
    }

    #[test]
    fn encode_truncates_oversized_body() {
        let mut cells = SignalCells::new();
        let body = vec![0xAB; MAX_BODY_LEN + 10];

        assert_eq!(encode_response(&mut cells, &body), MAX_BODY_LEN);
        assert_eq!(cells.read(SIZE_INDEX).unwrap() as usize, MAX_BODY_LEN);
        assert_eq!(decode_response(&cells).len(), MAX_BODY_LEN);
    }

    #[test]
    fn decode_clamps_oversized_size_cell() {
        let mut cells = SignalCells::new();
        cells.write_silent(SIZE_INDEX, 0xFF).unwrap();
        assert_eq!(decode_response(&cells).len(), MAX_BODY_LEN);
    }

    #[test]
    fn layout_constants() {
        assert_eq!(SIZE_INDEX, 0);
        assert_eq!(BODY_INDEX, 1);
        assert_eq!(MAX_BODY_LEN, 127);
        assert_eq!(FramerConfig::default().overflow, OverflowPolicy::Clamp);
    }
}
