//! Recording and replaying runs.
//!
//! A recording is laid out as:
//! ```text
//! ┌──────────────┬──────┬───────┬──────────────────────────┐
//! │ Seed (16B)   │ Mode │ Level │ Inputs (1B per frame)    │
//! └──────────────┴──────┴───────┴──────────────────────────┘
//! ```
//! The first [`REPLAY_HEADER_LEN`] bytes are what `startReplay` answers with.

use std::fmt::Write as _;

use tracing::debug;

use crate::error::{HostError, Result};

/// Random seed bytes handed to the game on `startRecord`.
pub const SEED_LEN: usize = 16;

/// Seed plus mode plus level.
pub const REPLAY_HEADER_LEN: usize = SEED_LEN + 2;

/// Accumulates one run while the game plays it.
#[derive(Debug, Default)]
pub struct Recorder {
    active: bool,
    mode: u8,
    seed: [u8; SEED_LEN],
    log: Vec<u8>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new recording with fresh random seed material.
    ///
    /// Returns the seed to send back to the game.
    pub fn start(&mut self, mode: u8, level: u8) -> [u8; SEED_LEN] {
        self.start_with_seed(rand::random(), mode, level)
    }

    /// Start a new recording with the given seed.
    pub fn start_with_seed(&mut self, seed: [u8; SEED_LEN], mode: u8, level: u8) -> [u8; SEED_LEN] {
        self.active = true;
        self.mode = mode;
        self.seed = seed;
        self.log.clear();
        self.log.extend_from_slice(&seed);
        self.log.push(mode);
        self.log.push(level);
        debug!(mode, level, "recording started");
        seed
    }

    /// Append one input byte.
    pub fn record(&mut self, input: u8) -> Result<()> {
        if !self.active {
            return Err(HostError::NotRecording);
        }
        self.log.push(input);
        Ok(())
    }

    /// Stop recording and hand back the full recording.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        if !self.active {
            return Err(HostError::NotRecording);
        }
        self.active = false;
        debug!(len = self.log.len(), "recording finished");
        Ok(std::mem::take(&mut self.log))
    }

    pub fn is_recording(&self) -> bool {
        self.active
    }

    /// Mode of the current (or last) recording.
    pub fn mode(&self) -> u8 {
        self.mode
    }

    /// Seed of the current (or last) recording as lowercase hex.
    pub fn seed_hex(&self) -> String {
        self.seed
            .iter()
            .fold(String::with_capacity(SEED_LEN * 2), |mut out, byte| {
                let _ = write!(out, "{byte:02x}");
                out
            })
    }

    /// Bytes recorded so far, header included.
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }
}

/// Plays a stored recording back one byte at a time.
#[derive(Debug, Default)]
pub struct Replayer {
    replay: Vec<u8>,
    position: usize,
}

impl Replayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a recording and return its header.
    ///
    /// A recording shorter than the header is answered with what exists.
    pub fn start(&mut self, replay: Vec<u8>) -> Vec<u8> {
        self.position = replay.len().min(REPLAY_HEADER_LEN);
        let header = replay[..self.position].to_vec();
        self.replay = replay;
        debug!(len = self.replay.len(), "replay started");
        header
    }

    /// Next input byte, or `None` once exhausted.
    pub fn next_input(&mut self) -> Option<u8> {
        let byte = self.replay.get(self.position).copied()?;
        self.position += 1;
        Some(byte)
    }

    /// Input bytes not yet replayed.
    pub fn remaining(&self) -> usize {
        self.replay.len().saturating_sub(self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_layout() {
        let mut recorder = Recorder::new();
        let seed = recorder.start_with_seed([0xA5; SEED_LEN], 2, 9);
        recorder.record(1).unwrap();
        recorder.record(0).unwrap();

        let replay = recorder.finish().unwrap();

        assert_eq!(seed, [0xA5; SEED_LEN]);
        assert_eq!(&replay[..SEED_LEN], &[0xA5; SEED_LEN]);
        assert_eq!(&replay[SEED_LEN..], &[2, 9, 1, 0]);
        assert!(!recorder.is_recording());
        assert_eq!(recorder.mode(), 2);
    }

    #[test]
    fn random_seeds_differ() {
        let mut recorder = Recorder::new();
        let a = recorder.start(0, 0);
        let b = recorder.start(0, 0);
        assert_ne!(a, b);
    }

    #[test]
    fn seed_hex_is_lowercase_two_digit() {
        let mut recorder = Recorder::new();
        let mut seed = [0u8; SEED_LEN];
        seed[0] = 0x0F;
        seed[1] = 0xAB;
        recorder.start_with_seed(seed, 0, 0);

        let hex = recorder.seed_hex();

        assert_eq!(hex.len(), SEED_LEN * 2);
        assert!(hex.starts_with("0fab00"));
    }

    #[test]
    fn record_outside_run_is_rejected() {
        let mut recorder = Recorder::new();
        assert!(matches!(recorder.record(1), Err(HostError::NotRecording)));
        assert!(matches!(recorder.finish(), Err(HostError::NotRecording)));
    }

    #[test]
    fn restart_discards_previous_inputs() {
        let mut recorder = Recorder::new();
        recorder.start_with_seed([1; SEED_LEN], 0, 0);
        recorder.record(5).unwrap();
        recorder.start_with_seed([2; SEED_LEN], 1, 1);

        assert_eq!(recorder.len(), REPLAY_HEADER_LEN);
    }

    #[test]
    fn replayer_yields_header_then_inputs() {
        let mut recording = vec![7u8; REPLAY_HEADER_LEN];
        recording.extend_from_slice(&[3, 4]);
        let mut replayer = Replayer::new();

        let header = replayer.start(recording);

        assert_eq!(header, vec![7u8; REPLAY_HEADER_LEN]);
        assert_eq!(replayer.remaining(), 2);
        assert_eq!(replayer.next_input(), Some(3));
        assert_eq!(replayer.next_input(), Some(4));
        assert_eq!(replayer.next_input(), None);
        assert_eq!(replayer.next_input(), None);
    }

    #[test]
    fn replayer_handles_truncated_recording() {
        let mut replayer = Replayer::new();
        assert_eq!(replayer.start(vec![1, 2, 3]), vec![1, 2, 3]);
        assert_eq!(replayer.next_input(), None);
        assert_eq!(Replayer::new().next_input(), None);
    }
}
