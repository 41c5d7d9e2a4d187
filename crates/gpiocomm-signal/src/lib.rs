//! Shared signal array between a game process and its host.
//!
//! Models a memory-mapped register block of [`SIGNAL_LEN`] byte cells.
//! Writes coming from the game raise a synchronous notification per cell;
//! writes coming from the host side are silent.
//!
//! This is the lowest layer of gpiocomm. Framing and dispatch build on
//! the [`SignalArray`] type provided here.

pub mod array;
pub mod error;

pub use array::{SignalArray, SignalCells, SignalSubscriber, SIGNAL_LEN};
pub use error::{Result, SignalError};
