//! Per-game rate limiting of engine calls.
//!
//! ## Core Types
//!
//! - [`Throttle`]: at most one dispatch per interval per game, never losing the latest position
//! - [`Analyst`]: what a dispatch does
//! - [`Analyzer`]: the [`Analyst`] that asks the engine and publishes the answer
mod analyst;
mod request;
mod throttle;

pub use analyst::*;
pub use request::*;
pub use throttle::*;
