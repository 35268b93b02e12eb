//! Cross-crate flows over the in-memory bus.

pub mod end_to_end;
pub mod flows;
