//! Per-game position replay.
//!
//! The rules engine is opaque: it accepts or rejects one move at a time and
//! renders the current position as FEN. [`Tracker`] owns one and feeds it
//! only the moves it has not seen yet.
mod rules;
mod tracker;

pub use rules::*;
pub use tracker::*;
