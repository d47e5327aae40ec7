//! External position scoring.
//!
//! The scorer is a black box reached over HTTP. Its answers come in several
//! shapes; [`Evaluation`] is the one shape the rest of the crate sees.
mod client;
mod error;
mod evaluation;

pub use client::*;
pub use error::*;
pub use evaluation::*;
