//! Reversible text form of replay recordings.

use std::io::{Read, Write};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::{HostError, Result};

/// Turns replay bytes into a storable string and back.
pub trait ReplayCodec {
    fn compress(&self, replay: &[u8]) -> Result<String>;

    fn decompress(&self, stored: &str) -> Result<Vec<u8>>;
}

/// Gzip, then base64 with the standard alphabet.
#[derive(Debug, Clone, Copy)]
pub struct GzipBase64Codec {
    level: Compression,
}

impl GzipBase64Codec {
    pub fn new() -> Self {
        Self {
            level: Compression::best(),
        }
    }

    /// Use an explicit gzip level (0-9).
    pub fn with_level(level: u32) -> Self {
        Self {
            level: Compression::new(level.min(9)),
        }
    }
}

impl Default for GzipBase64Codec {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayCodec for GzipBase64Codec {
    fn compress(&self, replay: &[u8]) -> Result<String> {
        let mut encoder = GzEncoder::new(Vec::with_capacity(replay.len() / 2), self.level);
        encoder
            .write_all(replay)
            .map_err(|e| HostError::Codec(format!("gzip write failed: {e}")))?;
        let compressed = encoder
            .finish()
            .map_err(|e| HostError::Codec(format!("gzip finish failed: {e}")))?;
        Ok(BASE64.encode(compressed))
    }

    fn decompress(&self, stored: &str) -> Result<Vec<u8>> {
        let compressed = BASE64
            .decode(stored.trim())
            .map_err(|e| HostError::Codec(format!("base64 decode failed: {e}")))?;
        let mut replay = Vec::with_capacity(compressed.len() * 2);
        GzDecoder::new(compressed.as_slice())
            .read_to_end(&mut replay)
            .map_err(|e| HostError::Codec(format!("gzip decode failed: {e}")))?;
        Ok(replay)
    }
}
