//! Control surface: JSON commands in, JSON replies out.
//!
//! ## Core Types
//!
//! - [`Command`]: inbound request, tagged by `action`
//! - [`Reply`]: outcome of one command, tagged by `status`
//! - [`Monitor`]: ties credential, event stream and boards together
mod command;
mod monitor;

pub use command::*;
pub use monitor::*;
