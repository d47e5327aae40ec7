//! The one bearer credential every connection authenticates with.
mod storage;
mod store;
mod token;

pub use storage::*;
pub use store::*;
pub use token::*;
