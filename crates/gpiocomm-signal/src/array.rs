use std::fmt;

use tracing::trace;

use crate::error::{Result, SignalError};

/// Number of cells in the signal block.
pub const SIGNAL_LEN: usize = 128;

/// The raw cell block.
///
/// Subscribers receive this type rather than the whole [`SignalArray`], so
/// they can read and write silently but never raise a notification of
/// their own.
#[derive(Clone, PartialEq, Eq)]
pub struct SignalCells {
    data: [u8; SIGNAL_LEN],
}

impl SignalCells {
    /// Create a zeroed cell block.
    pub fn new() -> Self {
        Self {
            data: [0; SIGNAL_LEN],
        }
    }

    /// Current value of a cell.
    pub fn read(&self, index: usize) -> Result<u8> {
        self.data
            .get(index)
            .copied()
            .ok_or(SignalError::IndexOutOfRange {
                index,
                len: SIGNAL_LEN,
            })
    }

    /// Set a cell without notifying anyone.
    pub fn write_silent(&mut self, index: usize, value: u8) -> Result<()> {
        let cell = self
            .data
            .get_mut(index)
            .ok_or(SignalError::IndexOutOfRange {
                index,
                len: SIGNAL_LEN,
            })?;
        *cell = value;
        Ok(())
    }

    /// All cells in index order.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl Default for SignalCells {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SignalCells {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last_set = self
            .data
            .iter()
            .rposition(|value| *value != 0)
            .map_or(0, |pos| pos + 1);
        f.debug_struct("SignalCells")
            .field("len", &SIGNAL_LEN)
            .field("head", &&self.data[..last_set])
            .finish()
    }
}

/// Receives a callback for every notifying write.
pub trait SignalSubscriber {
    /// Called after `index` was written, with the cell block already updated.
    fn on_write(&mut self, cells: &mut SignalCells, index: usize);
}

impl<F> SignalSubscriber for F
where
    F: FnMut(&mut SignalCells, usize),
{
    fn on_write(&mut self, cells: &mut SignalCells, index: usize) {
        self(cells, index)
    }
}

/// Fixed-length byte array with per-index change notification.
///
/// The length never changes. Subscribers are invoked synchronously, in
/// registration order, before [`SignalArray::write`] returns. There is no
/// unsubscribe; a subscriber lives as long as the array.
pub struct SignalArray {
    cells: SignalCells,
    subscribers: Vec<Box<dyn SignalSubscriber>>,
}

impl SignalArray {
    /// Create a zeroed array with no subscribers.
    pub fn new() -> Self {
        Self {
            cells: SignalCells::new(),
            subscribers: Vec::new(),
        }
    }

    /// Register a subscriber for all subsequent notifying writes.
    pub fn subscribe(&mut self, subscriber: impl SignalSubscriber + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Current value of a cell. No side effects.
    pub fn read(&self, index: usize) -> Result<u8> {
        self.cells.read(index)
    }

    /// Set a cell without notifying subscribers.
    pub fn write_silent(&mut self, index: usize, value: u8) -> Result<()> {
        self.cells.write_silent(index, value)
    }

    /// Set a cell, then notify every subscriber with its index.
    ///
    /// This is the path the game process writes through. An out-of-range
    /// index is rejected before anything is notified.
    pub fn write(&mut self, index: usize, value: u8) -> Result<()> {
        self.cells.write_silent(index, value)?;
        trace!(index, value, "signal write");

        let Self { cells, subscribers } = self;
        for subscriber in subscribers.iter_mut() {
            subscriber.on_write(cells, index);
        }
        Ok(())
    }

    /// Borrow the cell block.
    pub fn cells(&self) -> &SignalCells {
        &self.cells
    }

    /// Copy of all cell values.
    pub fn snapshot(&self) -> [u8; SIGNAL_LEN] {
        self.cells.data
    }
}

impl Default for SignalArray {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SignalArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalArray")
            .field("cells", &self.cells)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
