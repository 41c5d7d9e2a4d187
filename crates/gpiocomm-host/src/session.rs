use bytes::Bytes;
use gpiocomm_frame::{
    decode_response, FrameHandler, Framer, FramerConfig, BODY_INDEX, MAX_BODY_LEN, SIZE_INDEX,
};
use gpiocomm_signal::{SignalArray, SignalSubscriber, SIGNAL_LEN};

use crate::error::Result;

/// One bridge between a game process and its host.
///
/// Owns the signal array with a [`Framer`] registered as its first
/// subscriber. Build one per process; there are no global singletons.
pub struct Session {
    array: SignalArray,
}

impl Session {
    /// Session with one frame handler and default framing.
    pub fn new(handler: impl FrameHandler + 'static) -> Self {
        let mut framer = Framer::new();
        framer.subscribe(handler);
        Self::from_framer(framer)
    }

    /// Session with several frame handlers, run in the given order.
    pub fn with_handlers(config: FramerConfig, handlers: Vec<Box<dyn FrameHandler>>) -> Self {
        let mut framer = Framer::with_config(config);
        for handler in handlers {
            framer.subscribe_boxed(handler);
        }
        Self::from_framer(framer)
    }

    /// Session around a prepared framer.
    pub fn from_framer(framer: Framer) -> Self {
        let mut array = SignalArray::new();
        array.subscribe(framer);
        Self { array }
    }

    /// Register an extra subscriber for the game's writes.
    ///
    /// It runs after the framer, so it sees any response already written.
    pub fn subscribe(&mut self, subscriber: impl SignalSubscriber + 'static) {
        self.array.subscribe(subscriber);
    }

    /// A cell write from the game. Notifies every subscriber.
    pub fn write(&mut self, index: usize, value: u8) -> Result<()> {
        Ok(self.array.write(index, value)?)
    }

    /// Current value of a cell.
    pub fn read(&self, index: usize) -> Result<u8> {
        Ok(self.array.read(index)?)
    }

    /// Write a whole message the way the game does: size first, then each
    /// body byte in order.
    ///
    /// Bodies longer than one frame are truncated.
    pub fn send(&mut self, body: &[u8]) -> Result<()> {
        let body = &body[..body.len().min(MAX_BODY_LEN)];
        self.write(SIZE_INDEX, body.len() as u8)?;
        for (offset, byte) in body.iter().enumerate() {
            self.write(BODY_INDEX + offset, *byte)?;
        }
        Ok(())
    }

    /// The response currently laid out in the cells.
    pub fn response(&self) -> Bytes {
        decode_response(self.array.cells())
    }

    /// [`Session::send`] followed by [`Session::response`].
    pub fn exchange(&mut self, body: &[u8]) -> Result<Bytes> {
        self.send(body)?;
        Ok(self.response())
    }

    /// Copy of all cells.
    pub fn snapshot(&self) -> [u8; SIGNAL_LEN] {
        self.array.snapshot()
    }

    /// Borrow the underlying array.
    pub fn signals(&self) -> &SignalArray {
        &self.array
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("array", &self.array).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gpiocomm_frame::{Frame, OverflowPolicy};
    use gpiocomm_signal::SignalCells;

    use super::*;
    use crate::error::HostError;

    fn echo(frame: &Frame) -> Option<Vec<u8>> {
        Some(frame.body().to_vec())
    }

    #[test]
    fn initialize_exchange_layout() {
        let mut session = Session::new(|frame: &Frame| {
            assert_eq!(frame.body(), &[1, 0]);
            Some(vec![1, 1])
        });

        session.write(SIZE_INDEX, 2).unwrap();
        session.write(1, 1).unwrap();
        session.write(2, 0).unwrap();

        assert_eq!(session.read(SIZE_INDEX).unwrap(), 2);
        assert_eq!(session.read(1).unwrap(), 1);
        assert_eq!(session.read(2).unwrap(), 1);
    }

    #[test]
    fn exchange_for_every_length() {
        let calls = Rc::new(RefCell::new(0usize));
        let counted = {
            let calls = Rc::clone(&calls);
            move |frame: &Frame| {
                *calls.borrow_mut() += 1;
                echo(frame)
            }
        };
        let mut session = Session::new(counted);

        for len in 0..=MAX_BODY_LEN {
            let body: Vec<u8> = (0..len).map(|i| (i * 7 % 256) as u8).collect();
            let response = session.exchange(&body).unwrap();
            assert_eq!(response.as_ref(), body.as_slice());
        }
        assert_eq!(*calls.borrow(), MAX_BODY_LEN + 1);
    }

    #[test]
    fn handlers_all_run_once_in_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let handlers: Vec<Box<dyn FrameHandler>> = (0..4u8)
            .map(|id| {
                let order = Rc::clone(&order);
                Box::new(move |_: &Frame| {
                    order.borrow_mut().push(id);
                    Some(vec![id])
                }) as Box<dyn FrameHandler>
            })
            .collect();
        let mut session = Session::with_handlers(FramerConfig::default(), handlers);

        let response = session.exchange(&[7, 1]).unwrap();

        assert_eq!(*order.borrow(), vec![0, 1, 2, 3]);
        assert_eq!(response.as_ref(), &[3]);
    }

    #[test]
    fn extra_subscribers_see_game_writes_only() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut session = Session::new(echo);
        {
            let seen = Rc::clone(&seen);
            session.subscribe(move |_: &mut SignalCells, index: usize| {
                seen.borrow_mut().push(index)
            });
        }

        session.send(&[6, 6, 6]).unwrap();

        assert_eq!(*seen.borrow(), vec![0, 1, 2, 3]);
        assert_eq!(session.signals().subscriber_count(), 2);
    }

    #[test]
    fn out_of_range_write_is_an_error() {
        let mut session = Session::new(echo);
        assert!(matches!(
            session.write(SIGNAL_LEN, 0),
            Err(HostError::Signal(_))
        ));
    }

    #[test]
    fn reject_policy_answers_empty() {
        let config = FramerConfig {
            overflow: OverflowPolicy::Reject,
        };
        let mut session = Session::from_framer(Framer::with_config(config).with_handler(echo));

        session.write(SIZE_INDEX, 255).unwrap();

        assert!(session.response().is_empty());
        assert_eq!(session.exchange(&[1]).unwrap().as_ref(), &[1]);
        assert_eq!(session.snapshot()[0], 1);
    }
}
