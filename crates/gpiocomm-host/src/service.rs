//! Remote score service.
//!
//! Calls here are only ever made from spawned tasks, never from inside a
//! frame dispatch.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One row of a score table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub initials: String,
    pub score: u32,
}

/// Everything uploaded when a recorded run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSubmission {
    pub mode: u8,
    /// Seed of the run as lowercase hex.
    pub seed: String,
    /// Persistent identifier of this host.
    pub host: String,
    pub initials: String,
    pub score: u32,
    /// Replay blob in its stored (compressed) form.
    pub replay: String,
}

/// Remote high score backend.
pub trait ScoreService: Send + Sync + 'static {
    /// Upload a finished run.
    fn submit_score(&self, submission: ScoreSubmission) -> impl Future<Output = Result<()>> + Send;

    /// Top scores for a mode, best first.
    fn fetch_top_scores(&self, mode: u8) -> impl Future<Output = Result<Vec<ScoreEntry>>> + Send;
}

#[cfg(feature = "http")]
pub use http::HttpScoreService;

#[cfg(feature = "http")]
mod http {
    use reqwest::Client;
    use tracing::debug;

    use super::{ScoreEntry, ScoreService, ScoreSubmission};
    use crate::config::HostConfig;
    use crate::error::{HostError, Result};

    /// Score service reached over HTTP.
    ///
    /// - `PUT {root}/scores/{mode}/{seed}` with a form body uploads a run.
    /// - `GET {root}/scores/{mode}` returns a JSON array of entries.
    #[derive(Debug, Clone)]
    pub struct HttpScoreService {
        client: Client,
        root: String,
    }

    impl HttpScoreService {
        /// Build a client using the config's root and timeout.
        pub fn new(config: &HostConfig) -> Result<Self> {
            let client = Client::builder().timeout(config.request_timeout).build()?;
            Ok(Self::with_client(client, &config.service_root))
        }

        /// Use a pre-configured HTTP client.
        pub fn with_client(client: Client, root: &str) -> Self {
            Self {
                client,
                root: root.trim_end_matches('/').to_string(),
            }
        }

        /// Service root without trailing slash.
        pub fn root(&self) -> &str {
            &self.root
        }

        fn mode_url(&self, mode: u8) -> String {
            format!("{}/scores/{}", self.root, mode)
        }
    }

    impl ScoreService for HttpScoreService {
        async fn submit_score(&self, submission: ScoreSubmission) -> Result<()> {
            let url = format!("{}/{}", self.mode_url(submission.mode), submission.seed);
            let score = submission.score.to_string();
            let form = [
                ("hostName", submission.host.as_str()),
                ("initials", submission.initials.as_str()),
                ("score", score.as_str()),
                ("replay", submission.replay.as_str()),
            ];

            let response = self.client.put(&url).form(&form).send().await?;
            if !response.status().is_success() {
                return Err(HostError::Service(format!(
                    "score upload rejected: {}",
                    response.status()
                )));
            }
            debug!(%url, "score uploaded");
            Ok(())
        }

        async fn fetch_top_scores(&self, mode: u8) -> Result<Vec<ScoreEntry>> {
            let url = self.mode_url(mode);
            let response = self.client.get(&url).send().await?;
            if !response.status().is_success() {
                return Err(HostError::Service(format!(
                    "score fetch failed: {}",
                    response.status()
                )));
            }
            let entries: Vec<ScoreEntry> = response.json().await?;
            debug!(%url, count = entries.len(), "scores fetched");
            Ok(entries)
        }
    }

}
