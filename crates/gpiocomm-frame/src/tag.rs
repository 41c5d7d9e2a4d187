//! Message tags.
//!
//! The first body byte of every frame selects the handler. Responses echo
//! the request's tag.

use std::fmt;
use std::str::FromStr;

use crate::error::FrameError;

/// Known message tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageTag {
    /// Handshake: reports whether the host is live and a replay exists.
    Initialize = 1,
    /// Begin recording a run; answers with seed material.
    StartRecord = 2,
    /// Begin replaying the stored run; answers with its header.
    StartReplay = 3,
    /// Append one input byte to the recording.
    RecordFrame = 4,
    /// Finish recording and submit the score.
    EndRecord = 5,
    /// Next input byte of the replay.
    ReplayFrame = 6,
    /// Start fetching the score table for a mode.
    LoadScores = 7,
    /// Poll the cached score table for a mode.
    CheckScores = 8,
}

impl MessageTag {
    /// All tags in wire order.
    pub const ALL: [MessageTag; 8] = [
        MessageTag::Initialize,
        MessageTag::StartRecord,
        MessageTag::StartReplay,
        MessageTag::RecordFrame,
        MessageTag::EndRecord,
        MessageTag::ReplayFrame,
        MessageTag::LoadScores,
        MessageTag::CheckScores,
    ];

    /// Wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Protocol name of the tag.
    pub fn name(self) -> &'static str {
        match self {
            MessageTag::Initialize => "initialize",
            MessageTag::StartRecord => "startRecord",
            MessageTag::StartReplay => "startReplay",
            MessageTag::RecordFrame => "recordFrame",
            MessageTag::EndRecord => "endRecord",
            MessageTag::ReplayFrame => "replayFrame",
            MessageTag::LoadScores => "loadScores",
            MessageTag::CheckScores => "checkScores",
        }
    }
}

impl TryFrom<u8> for MessageTag {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        MessageTag::ALL
            .into_iter()
            .find(|tag| tag.as_u8() == value)
            .ok_or(FrameError::UnknownTag(value))
    }
}

impl From<MessageTag> for u8 {
    fn from(tag: MessageTag) -> Self {
        tag.as_u8()
    }
}

impl fmt::Display for MessageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse error for [`MessageTag`] from text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized message tag: {0}")]
pub struct ParseTagError(String);

impl FromStr for MessageTag {
    type Err = ParseTagError;

    /// Accepts the protocol name (case-insensitive) or the numeric tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(value) = trimmed.parse::<u8>() {
            return MessageTag::try_from(value).map_err(|_| ParseTagError(s.to_string()));
        }
        MessageTag::ALL
            .into_iter()
            .find(|tag| tag.name().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseTagError(s.to_string()))
    }
}

/// Human-readable name for any raw tag byte.
pub fn tag_name(raw: u8) -> &'static str {
    match MessageTag::try_from(raw) {
        Ok(tag) => tag.name(),
        Err(_) => "unknown",
    }
}
