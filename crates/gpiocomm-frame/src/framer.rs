use bytes::BytesMut;
use gpiocomm_signal::{SignalCells, SignalSubscriber};
use tracing::{debug, trace, warn};

use crate::codec::{encode_response, Frame, FramerConfig, OverflowPolicy, MAX_BODY_LEN, SIZE_INDEX};
use crate::handler::FrameHandler;
use crate::tag::tag_name;

/// Where the framer is within the current message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadState {
    /// Waiting for the size cell.
    AwaitingSize,
    /// Waiting for the next body cell.
    AwaitingBody,
}

/// Rebuilds frames from single-cell notifications.
///
/// Register it on a [`gpiocomm_signal::SignalArray`]. Notifications for any
/// index other than the read cursor are ignored. Once the declared number of
/// body bytes has arrived, every handler sees the frame in registration
/// order, each response is written back silently, and the framer returns to
/// [`ReadState::AwaitingSize`].
pub struct Framer {
    config: FramerConfig,
    state: ReadState,
    cursor: usize,
    remaining: usize,
    buf: BytesMut,
    handlers: Vec<Box<dyn FrameHandler>>,
}

impl Framer {
    /// Create a framer with default configuration.
    pub fn new() -> Self {
        Self::with_config(FramerConfig::default())
    }

    /// Create a framer with explicit configuration.
    pub fn with_config(config: FramerConfig) -> Self {
        Self {
            config,
            state: ReadState::AwaitingSize,
            cursor: SIZE_INDEX,
            remaining: 0,
            buf: BytesMut::with_capacity(MAX_BODY_LEN),
            handlers: Vec::new(),
        }
    }

    /// Add a handler for completed frames.
    pub fn subscribe(&mut self, handler: impl FrameHandler + 'static) {
        self.subscribe_boxed(Box::new(handler));
    }

    /// Add an already boxed handler.
    pub fn subscribe_boxed(&mut self, handler: Box<dyn FrameHandler>) {
        self.handlers.push(handler);
    }

    /// Add a handler, builder style.
    pub fn with_handler(mut self, handler: impl FrameHandler + 'static) -> Self {
        self.subscribe(handler);
        self
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Current read state.
    pub fn state(&self) -> ReadState {
        self.state
    }

    /// Index the framer expects to be written next.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Body bytes still outstanding for the current frame.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Framer configuration.
    pub fn config(&self) -> &FramerConfig {
        &self.config
    }

    fn reset(&mut self) {
        self.state = ReadState::AwaitingSize;
        self.cursor = SIZE_INDEX;
        self.remaining = 0;
        self.buf.clear();
    }

    fn read_size(&mut self, declared: usize, cells: &mut SignalCells) {
        self.cursor += 1;
        self.state = ReadState::AwaitingBody;

        if declared <= MAX_BODY_LEN {
            self.remaining = declared;
            return;
        }

        match self.config.overflow {
            OverflowPolicy::Clamp => {
                warn!(declared, max = MAX_BODY_LEN, "declared size too large, clamping");
                self.remaining = MAX_BODY_LEN;
            }
            OverflowPolicy::Reject => {
                warn!(declared, max = MAX_BODY_LEN, "declared size too large, dropping frame");
                encode_response(cells, &[]);
                self.reset();
            }
        }
    }

    fn complete(&mut self, cells: &mut SignalCells) {
        let frame = Frame::new(self.buf.split().freeze());
        debug!(
            len = frame.len(),
            tag = frame.raw_tag(),
            name = frame.raw_tag().map(tag_name),
            "frame complete"
        );

        for handler in self.handlers.iter_mut() {
            let response = handler.handle(&frame);
            let written = encode_response(cells, response.as_deref().unwrap_or_default());
            trace!(written, "response written");
        }

        self.reset();
    }
}

impl Default for Framer {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSubscriber for Framer {
    fn on_write(&mut self, cells: &mut SignalCells, index: usize) {
        if index != self.cursor {
            trace!(index, cursor = self.cursor, "ignoring write off cursor");
            return;
        }

        let value = match cells.read(self.cursor) {
            Ok(value) => value,
            Err(err) => {
                warn!(error = %err, "cursor outside signal array, resetting");
                self.reset();
                return;
            }
        };

        match self.state {
            ReadState::AwaitingSize => {
                self.read_size(usize::from(value), cells);
                if self.state == ReadState::AwaitingSize {
                    return;
                }
            }
            ReadState::AwaitingBody => {
                self.buf.extend_from_slice(&[value]);
                self.cursor += 1;
                self.remaining -= 1;
            }
        }

        if self.remaining == 0 {
            self.complete(cells);
        }
    }
}

impl std::fmt::Debug for Framer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framer")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("remaining", &self.remaining)
            .field("buffered", &self.buf.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
