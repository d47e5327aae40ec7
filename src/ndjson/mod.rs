//! Newline-delimited JSON framing for long-lived response bodies.
mod framer;
mod lines;

pub use framer::*;
pub use lines::*;
