//! # Ports Layer
//!
//! Interfaces the bridge depends on. Adapters in [`crate::adapters`] and the
//! concrete [`crate::MountOperation`] implement them; tests substitute fakes.

pub mod outbound;

pub use outbound::*;
