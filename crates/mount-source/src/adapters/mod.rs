//! # Adapters
//!
//! Implementations of [`crate::ports::PromptTransport`].

pub mod bus_transport;

pub use bus_transport::BusTransport;
