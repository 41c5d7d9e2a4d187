//! Bridge between a PICO-8 cart's GPIO cells and a host process.
//!
//! The cart and the host share 128 single-byte cells. gpiocomm turns the
//! cart's cell writes into framed messages, answers them, and writes the
//! answer back into the same cells.
//!
//! # Crate Structure
//!
//! - [`signal`]: the shared cell array and its write notifications
//! - [`frame`]: frame reassembly, message tags and the response layout
//! - [`host`]: sessions, record/replay and the score service (behind `host` feature)

/// Re-export signal array types.
pub mod signal {
    pub use gpiocomm_signal::*;
}

/// Re-export frame types.
pub mod frame {
    pub use gpiocomm_frame::*;
}

/// Re-export host types (requires `host` feature).
#[cfg(feature = "host")]
pub mod host {
    pub use gpiocomm_host::*;
}
