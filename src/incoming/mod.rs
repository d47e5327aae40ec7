//! The account-wide event stream and its reconnect policy.
//!
//! ## Core Types
//!
//! - [`Events`]: owns the single global connection and routes game announcements
//! - [`Backoff`]: delay earned by consecutive connection failures
//! - [`Phase`]: observable connection state
mod backoff;
mod events;

pub use backoff::*;
pub use events::*;
