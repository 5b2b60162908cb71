//! Xlib-facing protocol definitions
//!
//! This module holds the types client programs see: resource IDs, the fixed
//! X11 enumerations, status codes and the event union.

pub mod types;
pub mod errors;
pub mod events;

pub use types::*;
pub use errors::*;
pub use events::*;

/// Protocol version reported by `protocol_version`/`protocol_revision`
pub const PROTOCOL_MAJOR_VERSION: u16 = 11;
pub const PROTOCOL_MINOR_VERSION: u16 = 0;
