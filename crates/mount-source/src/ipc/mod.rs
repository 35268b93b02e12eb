//! # IPC Layer
//!
//! Wire payloads of the `askPassword` method and the responder that serves
//! it on a bus endpoint.

pub mod handler;
pub mod payloads;

pub use handler::*;
pub use payloads::*;
