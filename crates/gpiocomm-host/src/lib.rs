//! Host side of the gpiocomm bridge.
//!
//! This is the "just works" layer. A [`Session`] owns the signal array and
//! its framer; a [`HostDispatcher`] answers the game's messages, records and
//! replays runs, and talks to the score service without ever blocking the
//! game's write.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod host_id;
pub mod message;
pub mod recorder;
pub mod replay_codec;
pub mod scores;
pub mod service;
pub mod session;
pub mod store;

pub use config::HostConfig;
pub use dispatch::HostDispatcher;
pub use error::{HostError, Result};
pub use host_id::host_id;
pub use message::Request;
pub use recorder::{Recorder, Replayer, REPLAY_HEADER_LEN, SEED_LEN};
pub use replay_codec::{GzipBase64Codec, ReplayCodec};
pub use scores::{
    decode_initials, encode_initials, serialize_scores, CachedScores, ScoreCache,
    MAX_SCORE_ENTRIES, SCORE_ENTRY_LEN, SCORE_FETCH_FAILED,
};
pub use service::{ScoreEntry, ScoreService, ScoreSubmission};
#[cfg(feature = "http")]
pub use service::HttpScoreService;
pub use session::Session;
pub use store::{FileStore, KeyValueStore, MemoryStore};
