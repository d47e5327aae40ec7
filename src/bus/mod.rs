//! Best-effort fan-out to whatever presentation layer is listening.
mod bus;
mod notification;

pub use bus::*;
pub use notification::*;
