use gpiocomm_frame::{Frame, FrameError, MessageTag};

use crate::error::{HostError, Result};
use crate::scores::decode_initials;

/// A frame decoded into one of the known requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Initialize,
    /// Level defaults to 0 when the game sends only a mode.
    StartRecord { mode: u8, level: u8 },
    StartReplay,
    RecordFrame { input: u8 },
    /// `None` when the game ended the run without a score to submit.
    EndRecord { submission: Option<(u32, String)> },
    ReplayFrame,
    LoadScores { mode: u8 },
    CheckScores { mode: u8 },
    /// A tag this host does not know. Answered with an empty response.
    Unknown(u8),
}

impl Request {
    /// Decode a non-empty frame.
    pub fn parse(frame: &Frame) -> Result<Self> {
        let raw = frame.raw_tag().ok_or(FrameError::EmptyFrame)?;
        let tag = match MessageTag::try_from(raw) {
            Ok(tag) => tag,
            Err(_) => return Ok(Request::Unknown(raw)),
        };
        let payload = frame.payload();

        let request = match tag {
            MessageTag::Initialize => Request::Initialize,
            MessageTag::StartRecord => {
                require(tag, payload, 1)?;
                Request::StartRecord {
                    mode: payload[0],
                    level: payload.get(1).copied().unwrap_or(0),
                }
            }
            MessageTag::StartReplay => Request::StartReplay,
            MessageTag::RecordFrame => {
                require(tag, payload, 1)?;
                Request::RecordFrame { input: payload[0] }
            }
            MessageTag::EndRecord => Request::EndRecord {
                submission: parse_submission(payload)?,
            },
            MessageTag::ReplayFrame => Request::ReplayFrame,
            MessageTag::LoadScores => {
                require(tag, payload, 1)?;
                Request::LoadScores { mode: payload[0] }
            }
            MessageTag::CheckScores => {
                require(tag, payload, 1)?;
                Request::CheckScores { mode: payload[0] }
            }
        };
        Ok(request)
    }

    /// The raw tag this request was decoded from.
    pub fn raw_tag(&self) -> u8 {
        match self {
            Request::Initialize => MessageTag::Initialize.as_u8(),
            Request::StartRecord { .. } => MessageTag::StartRecord.as_u8(),
            Request::StartReplay => MessageTag::StartReplay.as_u8(),
            Request::RecordFrame { .. } => MessageTag::RecordFrame.as_u8(),
            Request::EndRecord { .. } => MessageTag::EndRecord.as_u8(),
            Request::ReplayFrame => MessageTag::ReplayFrame.as_u8(),
            Request::LoadScores { .. } => MessageTag::LoadScores.as_u8(),
            Request::CheckScores { .. } => MessageTag::CheckScores.as_u8(),
            Request::Unknown(raw) => *raw,
        }
    }
}

const END_RECORD_LEN: usize = 4 + 3;

// [score u32 LE, initials x3]; any other length ends the run without a score.
fn parse_submission(payload: &[u8]) -> Result<Option<(u32, String)>> {
    if payload.len() != END_RECORD_LEN {
        return Ok(None);
    }
    let score = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    let initials = decode_initials(&payload[4..])?;
    Ok(Some((score, initials)))
}

fn require(tag: MessageTag, payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() < expected {
        return Err(HostError::ShortPayload {
            tag: tag.name(),
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}
