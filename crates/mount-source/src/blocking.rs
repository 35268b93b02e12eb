//! # Blocking Prompt
//!
//! Lets a caller that is not running on the runtime wait for a prompt. Each
//! call parks its thread on its own mutex and condition variable until the
//! prompt completes, for at most the prompt deadline.

use crate::domain::{AskFlags, MountSourceError, PromptResult};
use crate::service::{AskPasswordResult, MountSource};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Hand-off between the completing task and the parked caller.
#[derive(Default)]
struct ResultSlot {
    result: Mutex<Option<AskPasswordResult>>,
    ready: Condvar,
}

impl ResultSlot {
    fn fill(&self, result: AskPasswordResult) {
        let mut slot = self.result.lock();
        *slot = Some(result);
        self.ready.notify_one();
    }

    fn wait(&self) -> AskPasswordResult {
        let mut slot = self.result.lock();
        loop {
            if let Some(result) = slot.take() {
                return result;
            }
            self.ready.wait(&mut slot);
        }
    }
}

impl MountSource {
    /// Ask for credentials, blocking the calling thread until the answer.
    ///
    /// Must not be called from a runtime worker thread: the prompt runs on
    /// the runtime and a blocked worker may be the one it needs. From async
    /// code use [`MountSource::ask_password`], or wrap this call in
    /// `tokio::task::spawn_blocking`.
    pub fn ask_password_sync(
        &self,
        message: Option<&str>,
        default_user: Option<&str>,
        default_domain: Option<&str>,
        flags: AskFlags,
    ) -> Result<PromptResult, MountSourceError> {
        let slot = Arc::new(ResultSlot::default());
        let producer = Arc::clone(&slot);

        self.ask_password_async(message, default_user, default_domain, flags, move |result| {
            producer.fill(result);
        });

        let result = slot.wait();
        self.ask_password_finish(result)
    }
}
