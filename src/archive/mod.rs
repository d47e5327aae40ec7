//! Past games and profile lookups, with aggregate statistics.
//!
//! ## Core Types
//!
//! - [`Archive`]: read-only Lichess export endpoints
//! - [`GameRecord`]: one finished game, flattened
//! - [`Statistics`]: totals over a set of records
//! - [`Dataset`]: records plus statistics, exportable for model training
//! - [`CurrentGame`]: a game in progress and its position
mod client;
mod current;
mod dataset;
mod record;
mod statistics;

pub use client::*;
pub use current::*;
pub use dataset::*;
pub use record::*;
pub use statistics::*;
