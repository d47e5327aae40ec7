//! One board stream per tracked game.
//!
//! ## Core Types
//!
//! - [`Boards`]: opens, reads and closes per-game streams
//! - [`GameSnapshot`]: read-only view of one tracked position
mod boards;
mod snapshot;

pub use boards::*;
pub use snapshot::*;
