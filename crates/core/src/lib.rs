//! T6Inject Core - Shared types, constants and errors

mod error;
mod layout;
mod types;

pub use error::*;
pub use layout::*;
pub use types::*;
