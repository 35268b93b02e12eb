//! # Domain Layer
//!
//! Pure types of the credential-request bridge: the identity of a mount
//! source, the prompt request and its result, flag sets and outcome codes.
//!
//! Nothing here performs I/O. Dispatch to a prompt handler goes through the
//! ports in [`crate::ports`].

pub mod entities;
pub mod errors;
pub mod identity;
pub mod value_objects;

pub use entities::*;
pub use errors::*;
pub use identity::*;
pub use value_objects::*;
