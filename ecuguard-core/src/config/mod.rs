//! Health monitor configuration
//!
//! Board-agnostic configuration structures, optionally stored as postcard
//! binary data.

#[cfg(feature = "serde")]
pub mod persist;
pub mod types;

#[cfg(feature = "serde")]
pub use persist::*;
pub use types::*;
