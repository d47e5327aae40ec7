//! Lichess Board API surface.
//!
//! ## Core Types
//!
//! - [`GlobalEvent`]: one line of the account-wide incoming events stream
//! - [`BoardEvent`]: one line of a per-game board stream
//! - [`Streamer`]: the seam every long-lived connection goes through
//! - [`HttpStreamer`]: the reqwest-backed [`Streamer`]
//! - [`StreamError`]: connection and framing failures
mod board;
mod error;
mod event;
mod game;
mod streamer;

pub use board::*;
pub use error::*;
pub use event::*;
pub use game::*;
pub use streamer::*;
