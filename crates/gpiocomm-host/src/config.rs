use std::time::Duration;

/// Local test server the score service listens on by default.
pub const DEFAULT_SERVICE_ROOT: &str = "http://localhost:17476";

/// Controls host dispatch behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    /// Base URL of the score service.
    pub service_root: String,
    /// Timeout applied to each score service request.
    pub request_timeout: Duration,
    /// Store key holding the compressed replay blob.
    pub replay_key: String,
    /// Store key holding the host identifier.
    pub host_key: String,
    /// Length of generated host identifiers.
    pub host_id_len: usize,
    /// How long a fetched score table stays fresh. `None` keeps it forever.
    pub score_cache_ttl: Option<Duration>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            service_root: DEFAULT_SERVICE_ROOT.to_string(),
            request_timeout: Duration::from_secs(10),
            replay_key: "gpiocomm_replay".to_string(),
            host_key: "gpiocomm_host".to_string(),
            host_id_len: 15,
            score_cache_ttl: None,
        }
    }
}
