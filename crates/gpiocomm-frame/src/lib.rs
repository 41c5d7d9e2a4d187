//! Length-prefixed message framing over a signal array.
//!
//! The game writes one cell at a time. Every message is laid out as:
//! - cell 0: body length `N`
//! - cells 1..=N: body, whose first byte is the message tag
//!
//! The [`Framer`] rebuilds whole frames from those single-cell
//! notifications, hands them to [`FrameHandler`]s and writes each response
//! back with the same layout, silently.

pub mod codec;
pub mod error;
pub mod framer;
pub mod handler;
pub mod tag;

pub use codec::{
    decode_response, encode_response, Frame, FramerConfig, OverflowPolicy, BODY_INDEX,
    MAX_BODY_LEN, SIZE_INDEX,
};
pub use error::{FrameError, Result};
pub use framer::{Framer, ReadState};
pub use handler::FrameHandler;
pub use tag::{tag_name, MessageTag, ParseTagError};
