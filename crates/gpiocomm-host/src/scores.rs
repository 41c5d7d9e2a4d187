//! Per-mode score table cache and its wire encoding.
//!
//! Each table entry is 7 bytes: three initials (`a`..`z` as 1..26, 0 for
//! anything else) followed by the score as a little-endian u32.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::{BufMut, Bytes, BytesMut};
use gpiocomm_frame::MAX_BODY_LEN;
use parking_lot::Mutex;

use crate::error::{HostError, Result};
use crate::service::ScoreEntry;

/// Bytes per serialized score entry.
pub const SCORE_ENTRY_LEN: usize = 3 + 4;

/// Entries that fit in one response next to the echoed tag.
pub const MAX_SCORE_ENTRIES: usize = (MAX_BODY_LEN - 1) / SCORE_ENTRY_LEN;

/// `checkScores` payload reporting a failed fetch.
pub const SCORE_FETCH_FAILED: u8 = 0xFF;

const LETTERS: &[u8; 26] = b"abcdefghijklmnopqrstuvwxyz";

/// Decode three initials bytes (1..=26) into lowercase letters.
pub fn decode_initials(raw: &[u8]) -> Result<String> {
    raw.iter()
        .map(|&byte| match byte {
            1..=26 => Ok(char::from(LETTERS[usize::from(byte - 1)])),
            other => Err(HostError::InvalidInitial(other)),
        })
        .collect()
}

/// Encode initials into bytes, 0 for characters outside `a..z`.
pub fn encode_initials(initials: &str, dst: &mut BytesMut) {
    for ch in initials.chars().take(3) {
        let lower = ch.to_ascii_lowercase();
        let index = LETTERS
            .iter()
            .position(|letter| char::from(*letter) == lower)
            .map_or(0, |pos| pos as u8 + 1);
        dst.put_u8(index);
    }
    for _ in initials.chars().count()..3 {
        dst.put_u8(0);
    }
}

/// Serialize a score table, keeping only what fits in one frame.
pub fn serialize_scores(entries: &[ScoreEntry]) -> Bytes {
    let kept = entries.len().min(MAX_SCORE_ENTRIES);
    let mut buf = BytesMut::with_capacity(kept * SCORE_ENTRY_LEN);
    for entry in &entries[..kept] {
        encode_initials(&entry.initials, &mut buf);
        buf.put_u32_le(entry.score);
    }
    buf.freeze()
}

/// State of one mode's score table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedScores {
    /// A fetch is in flight.
    Pending,
    /// Serialized table and when it was fetched.
    Ready { table: Bytes, fetched_at: Instant },
    /// The last fetch failed.
    Failed,
}

/// Score tables keyed by mode, filled by background fetches.
///
/// Clones share the same map.
#[derive(Debug, Clone)]
pub struct ScoreCache {
    entries: Arc<Mutex<HashMap<u8, CachedScores>>>,
    ttl: Option<Duration>,
}

impl ScoreCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Mark `mode` as pending if a fetch should start now.
    ///
    /// Returns false while a fetch is already in flight or a fresh table is
    /// cached. Failed and expired entries are claimed again.
    pub fn try_begin_fetch(&self, mode: u8) -> bool {
        let mut entries = self.entries.lock();
        let start = match entries.get(&mode) {
            None | Some(CachedScores::Failed) => true,
            Some(CachedScores::Pending) => false,
            Some(CachedScores::Ready { fetched_at, .. }) => self
                .ttl
                .is_some_and(|ttl| fetched_at.elapsed() >= ttl),
        };
        if start {
            entries.insert(mode, CachedScores::Pending);
        }
        start
    }

    /// Store a fetched table.
    pub fn complete(&self, mode: u8, table: Bytes) {
        self.entries.lock().insert(
            mode,
            CachedScores::Ready {
                table,
                fetched_at: Instant::now(),
            },
        );
    }

    /// Record a failed fetch.
    pub fn fail(&self, mode: u8) {
        self.entries.lock().insert(mode, CachedScores::Failed);
    }

    /// Current state for `mode`.
    pub fn get(&self, mode: u8) -> Option<CachedScores> {
        self.entries.lock().get(&mode).cloned()
    }

    /// `checkScores` payload: the table, `[0xFF]` on failure, or nothing yet.
    pub fn payload(&self, mode: u8) -> Vec<u8> {
        match self.entries.lock().get(&mode) {
            Some(CachedScores::Ready { table, .. }) => table.to_vec(),
            Some(CachedScores::Failed) => vec![SCORE_FETCH_FAILED],
            Some(CachedScores::Pending) | None => Vec::new(),
        }
    }
}

impl Default for ScoreCache {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(initials: &str, score: u32) -> ScoreEntry {
        ScoreEntry {
            initials: initials.to_string(),
            score,
        }
    }

    #[test]
    fn initials_decode() {
        assert_eq!(decode_initials(&[1, 2, 26]).unwrap(), "abz");
        assert!(matches!(
            decode_initials(&[1, 0, 3]),
            Err(HostError::InvalidInitial(0))
        ));
        assert!(matches!(
            decode_initials(&[27, 1, 1]),
            Err(HostError::InvalidInitial(27))
        ));
    }

    #[test]
    fn initials_encode_pads_and_maps_unknown() {
        let mut buf = BytesMut::new();
        encode_initials("Jo", &mut buf);
        encode_initials("a?z", &mut buf);
        assert_eq!(buf.as_ref(), &[10, 15, 0, 1, 0, 26]);
    }

    #[test]
    fn table_serialization() {
        let table = serialize_scores(&[entry("abc", 1), entry("zzz", 0x0102_0304)]);
        assert_eq!(
            table.as_ref(),
            &[1, 2, 3, 1, 0, 0, 0, 26, 26, 26, 4, 3, 2, 1]
        );
    }

    #[test]
    fn table_is_capped_to_one_frame() {
        let entries: Vec<ScoreEntry> = (0..40).map(|i| entry("aaa", i)).collect();
        let table = serialize_scores(&entries);
        assert_eq!(MAX_SCORE_ENTRIES, 18);
        assert_eq!(table.len(), MAX_SCORE_ENTRIES * SCORE_ENTRY_LEN);
        assert!(table.len() < MAX_BODY_LEN);
    }

    #[test]
    fn pending_fetches_are_deduplicated() {
        let cache = ScoreCache::default();
        assert!(cache.try_begin_fetch(1));
        assert!(!cache.try_begin_fetch(1));
        assert!(cache.try_begin_fetch(2));
        assert_eq!(cache.get(1), Some(CachedScores::Pending));
        assert!(cache.payload(1).is_empty());
    }

    #[test]
    fn ready_table_is_served_and_kept() {
        let cache = ScoreCache::default();
        cache.try_begin_fetch(3);
        cache.complete(3, Bytes::from_static(&[1, 1, 1, 9, 0, 0, 0]));

        assert_eq!(cache.payload(3), vec![1, 1, 1, 9, 0, 0, 0]);
        assert!(!cache.try_begin_fetch(3));
    }

    #[test]
    fn failure_reports_sentinel_and_allows_retry() {
        let cache = ScoreCache::default();
        cache.try_begin_fetch(0);
        cache.fail(0);

        assert_eq!(cache.payload(0), vec![SCORE_FETCH_FAILED]);
        assert!(cache.try_begin_fetch(0));
        assert!(cache.payload(0).is_empty());
    }

    #[test]
    fn expired_table_is_refetched() {
        let cache = ScoreCache::new(Some(Duration::ZERO));
        cache.try_begin_fetch(4);
        cache.complete(4, Bytes::new());
        assert!(cache.try_begin_fetch(4));
    }

    #[test]
    fn clones_share_state() {
        let cache = ScoreCache::default();
        let task_view = cache.clone();
        cache.try_begin_fetch(5);
        task_view.fail(5);
        assert_eq!(cache.get(5), Some(CachedScores::Failed));
    }
}
