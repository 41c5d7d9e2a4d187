use std::sync::Arc;

use gpiocomm_frame::{Frame, FrameHandler};
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::config::HostConfig;
use crate::error::{HostError, Result};
use crate::host_id::host_id;
use crate::message::Request;
use crate::recorder::{Recorder, Replayer};
use crate::replay_codec::{GzipBase64Codec, ReplayCodec};
use crate::scores::{serialize_scores, ScoreCache};
use crate::service::{ScoreService, ScoreSubmission};
use crate::store::KeyValueStore;

/// Answers the game's messages.
///
/// Runs inside the game's cell write, so nothing here waits: uploads and
/// score fetches are spawned on the runtime and their results are only
/// visible through later `checkScores` polls.
pub struct HostDispatcher<S> {
    config: HostConfig,
    store: Box<dyn KeyValueStore>,
    codec: Box<dyn ReplayCodec>,
    service: Arc<S>,
    runtime: Handle,
    tasks: TaskTracker,
    recorder: Recorder,
    replayer: Replayer,
    scores: ScoreCache,
}

impl<S: ScoreService> HostDispatcher<S> {
    /// Create a dispatcher using the gzip+base64 replay codec.
    pub fn new(
        config: HostConfig,
        store: impl KeyValueStore + 'static,
        service: S,
        runtime: Handle,
    ) -> Self {
        let scores = ScoreCache::new(config.score_cache_ttl);
        Self {
            config,
            store: Box::new(store),
            codec: Box::new(GzipBase64Codec::new()),
            service: Arc::new(service),
            runtime,
            tasks: TaskTracker::new(),
            recorder: Recorder::new(),
            replayer: Replayer::new(),
            scores,
        }
    }

    /// Override the replay codec.
    pub fn with_codec(mut self, codec: impl ReplayCodec + 'static) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Shared handle to the score cache.
    pub fn score_cache(&self) -> ScoreCache {
        self.scores.clone()
    }

    /// Tracker for spawned uploads and fetches.
    ///
    /// Close it and wait on it to let background work finish before the
    /// runtime is dropped.
    pub fn tasks(&self) -> TaskTracker {
        self.tasks.clone()
    }

    /// Host configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Handle one decoded request and return its response payload.
    pub fn dispatch(&mut self, request: &Request) -> Result<Vec<u8>> {
        match request {
            Request::Initialize => self.initialize(),
            Request::StartRecord { mode, level } => Ok(self.recorder.start(*mode, *level).to_vec()),
            Request::StartReplay => self.start_replay(),
            Request::RecordFrame { input } => {
                self.recorder.record(*input)?;
                Ok(Vec::new())
            }
            Request::EndRecord { submission } => {
                self.end_record(submission.as_ref())?;
                Ok(Vec::new())
            }
            Request::ReplayFrame => Ok(self.replayer.next_input().into_iter().collect()),
            Request::LoadScores { mode } => {
                self.load_scores(*mode);
                Ok(Vec::new())
            }
            Request::CheckScores { mode } => Ok(self.scores.payload(*mode)),
            Request::Unknown(_) => Ok(Vec::new()),
        }
    }

    fn initialize(&self) -> Result<Vec<u8>> {
        let replay_available = self.store.get(&self.config.replay_key)?.is_some();
        Ok(vec![1, u8::from(replay_available)])
    }

    fn start_replay(&mut self) -> Result<Vec<u8>> {
        let stored = self
            .store
            .get(&self.config.replay_key)?
            .ok_or(HostError::NoReplay)?;
        let replay = self.codec.decompress(&stored)?;
        Ok(self.replayer.start(replay))
    }

    fn end_record(&mut self, submission: Option<&(u32, String)>) -> Result<()> {
        let replay = self.recorder.finish()?;
        let Some((score, initials)) = submission else {
            debug!("run ended without a score, discarding recording");
            return Ok(());
        };

        let stored = self.codec.compress(&replay)?;
        self.store.set(&self.config.replay_key, &stored)?;

        let submission = ScoreSubmission {
            mode: self.recorder.mode(),
            seed: self.recorder.seed_hex(),
            host: host_id(self.store.as_mut(), &self.config)?,
            initials: initials.clone(),
            score: *score,
            replay: stored,
        };
        debug!(
            mode = submission.mode,
            score = submission.score,
            "submitting score"
        );

        let service = Arc::clone(&self.service);
        self.tasks.spawn_on(
            async move {
                let mode = submission.mode;
                if let Err(err) = service.submit_score(submission).await {
                    warn!(mode, error = %err, "score upload failed");
                }
            },
            &self.runtime,
        );
        Ok(())
    }

    fn load_scores(&mut self, mode: u8) {
        if !self.scores.try_begin_fetch(mode) {
            debug!(mode, "score table cached or in flight");
            return;
        }

        let service = Arc::clone(&self.service);
        let scores = self.scores.clone();
        self.tasks.spawn_on(
            async move {
                match service.fetch_top_scores(mode).await {
                    Ok(entries) => scores.complete(mode, serialize_scores(&entries)),
                    Err(err) => {
                        warn!(mode, error = %err, "score fetch failed");
                        scores.fail(mode);
                    }
                }
            },
            &self.runtime,
        );
    }
}

impl<S: ScoreService> FrameHandler for HostDispatcher<S> {
    fn handle(&mut self, frame: &Frame) -> Option<Vec<u8>> {
        if frame.is_empty() {
            return None;
        }

        let request = match Request::parse(frame) {
            Ok(request) => request,
            Err(err) => {
                warn!(tag = frame.raw_tag(), error = %err, "malformed request");
                return None;
            }
        };
        if let Request::Unknown(tag) = request {
            debug!(tag, "no handler for tag");
            return None;
        }

        match self.dispatch(&request) {
            Ok(payload) => {
                let mut body = Vec::with_capacity(payload.len() + 1);
                body.push(request.raw_tag());
                body.extend_from_slice(&payload);
                Some(body)
            }
            Err(err) => {
                warn!(tag = request.raw_tag(), error = %err, "request failed");
                None
            }
        }
    }
}
