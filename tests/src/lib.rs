//! # Mount-Source Test Suite
//!
//! End-to-end tests that run the whole bridge: a [`mount_source::MountSource`]
//! sending prompts over an [`shared_bus::InMemoryBus`] to an
//! [`mount_source::AskPasswordHandler`] backed by a scripted prompter.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs        # Scripted prompter, responder and source helpers
//! │   └── integration/
//! │       ├── end_to_end.rs  # One prompt per outcome
//! │       └── flows.rs       # Blocking parity, mount operations, concurrency
//! └── benches/
//!     └── bridge_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ms-tests
//! cargo test -p ms-tests integration::flows::
//! cargo bench -p ms-tests
//! ```

pub mod fixtures;
pub mod integration;
