//! # Mount Operation
//!
//! A mount operation raises an ask-password event, collects credentials
//! through its setters and finishes with one reply code.
//! [`MountSource::get_operation`] returns an operation whose prompts are
//! answered through the mount source; [`complete_operation`] translates a
//! prompt outcome into setter calls and the reply.

use crate::domain::{AskFlags, MountOperationResult, MountSourceError, PasswordSave, PromptResult};
use crate::ports::OperationReplySink;
use crate::service::MountSource;
use mount_telemetry::OPERATION_REPLIES;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Arguments of an ask-password event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskPasswordEvent {
    pub message: Option<String>,
    pub default_user: Option<String>,
    pub default_domain: Option<String>,
    pub flags: AskFlags,
}

type AskPasswordSubscriber =
    Arc<dyn Fn(&Arc<MountOperation>, &AskPasswordEvent) -> bool + Send + Sync>;
type ReplySubscriber = Arc<dyn Fn(MountOperationResult) + Send + Sync>;

#[derive(Default)]
struct Credentials {
    password: Option<String>,
    username: Option<String>,
    domain: Option<String>,
    anonymous: bool,
    password_save: PasswordSave,
}

/// Credentials exchange for one mount attempt.
pub struct MountOperation {
    credentials: Mutex<Credentials>,
    ask_password_subscribers: RwLock<Vec<AskPasswordSubscriber>>,
    reply_subscribers: RwLock<Vec<ReplySubscriber>>,
    reply_tx: watch::Sender<Option<MountOperationResult>>,
    source: RwLock<Option<MountSource>>,
}

impl MountOperation {
    pub fn new() -> Arc<Self> {
        let (reply_tx, _) = watch::channel(None);
        Arc::new(Self {
            credentials: Mutex::new(Credentials::default()),
            ask_password_subscribers: RwLock::new(Vec::new()),
            reply_subscribers: RwLock::new(Vec::new()),
            reply_tx,
            source: RwLock::new(None),
        })
    }

    /// Subscribe to ask-password events.
    ///
    /// A subscriber returns true to take responsibility for the prompt; it
    /// must then eventually call [`MountOperation::reply`].
    pub fn connect_ask_password<F>(&self, subscriber: F)
    where
        F: Fn(&Arc<MountOperation>, &AskPasswordEvent) -> bool + Send + Sync + 'static,
    {
        self.ask_password_subscribers.write().push(Arc::new(subscriber));
    }

    /// Subscribe to replies.
    pub fn connect_reply<F>(&self, subscriber: F)
    where
        F: Fn(MountOperationResult) + Send + Sync + 'static,
    {
        self.reply_subscribers.write().push(Arc::new(subscriber));
    }

    /// Raise an ask-password event.
    ///
    /// Clears the previous reply, so [`MountOperation::wait_for_reply`] waits
    /// for this prompt's answer. Subscribers run in connection order until one
    /// takes the prompt. Returns false if none did; the caller then owns the
    /// outcome.
    pub fn emit_ask_password(self: &Arc<Self>, event: AskPasswordEvent) -> bool {
        self.reply_tx.send_replace(None);
        let subscribers = self.ask_password_subscribers.read().clone();
        subscribers.iter().any(|subscriber| subscriber(self, &event))
    }

    /// Finish the exchange.
    pub fn reply(&self, result: MountOperationResult) {
        let subscribers = self.reply_subscribers.read().clone();
        for subscriber in &subscribers {
            subscriber(result);
        }
        self.reply_tx.send_replace(Some(result));
    }

    /// Wait for the reply to the current prompt, or return it if already given.
    pub async fn wait_for_reply(&self) -> MountOperationResult {
        let mut rx = self.reply_tx.subscribe();
        loop {
            if let Some(result) = *rx.borrow_and_update() {
                return result;
            }
            if rx.changed().await.is_err() {
                return MountOperationResult::Unhandled;
            }
        }
    }

    /// Latest reply, if any.
    pub fn last_reply(&self) -> Option<MountOperationResult> {
        *self.reply_tx.borrow()
    }

    pub fn password(&self) -> Option<String> {
        self.credentials.lock().password.clone()
    }

    pub fn username(&self) -> Option<String> {
        self.credentials.lock().username.clone()
    }

    pub fn domain(&self) -> Option<String> {
        self.credentials.lock().domain.clone()
    }

    pub fn anonymous(&self) -> bool {
        self.credentials.lock().anonymous
    }

    pub fn password_save(&self) -> PasswordSave {
        self.credentials.lock().password_save
    }

    /// Mount source this operation prompts through.
    pub fn source(&self) -> Option<MountSource> {
        self.source.read().clone()
    }

    pub fn set_source(&self, source: MountSource) {
        *self.source.write() = Some(source);
    }
}

impl OperationReplySink for MountOperation {
    fn set_password(&self, password: String) {
        self.credentials.lock().password = Some(password);
    }

    fn set_username(&self, username: String) {
        self.credentials.lock().username = Some(username);
    }

    fn set_domain(&self, domain: String) {
        self.credentials.lock().domain = Some(domain);
    }

    fn set_anonymous(&self, anonymous: bool) {
        self.credentials.lock().anonymous = anonymous;
    }

    fn set_password_save(&self, save: PasswordSave) {
        self.credentials.lock().password_save = save;
    }

    fn reply(&self, result: MountOperationResult) {
        MountOperation::reply(self, result);
    }
}

impl fmt::Debug for MountOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let credentials = self.credentials.lock();
        f.debug_struct("MountOperation")
            .field("username", &credentials.username)
            .field("domain", &credentials.domain)
            .field("anonymous", &credentials.anonymous)
            .field("password_save", &credentials.password_save)
            .field("last_reply", &self.last_reply())
            .finish_non_exhaustive()
    }
}

/// Push a prompt outcome into `sink` and reply.
///
/// Setters run only for a handled, non-aborted answer. `reply` is called
/// exactly once.
pub fn complete_operation(
    sink: &dyn OperationReplySink,
    outcome: Result<PromptResult, MountSourceError>,
) -> MountOperationResult {
    let code = match outcome {
        Err(_) => MountOperationResult::Unhandled,
        Ok(result) if result.aborted => MountOperationResult::Aborted,
        Ok(result) => {
            if let Some(password) = result.password {
                sink.set_password(password);
            }
            if let Some(username) = result.username {
                sink.set_username(username);
            }
            if let Some(domain) = result.domain {
                sink.set_domain(domain);
            }
            sink.set_anonymous(result.anonymous);
            sink.set_password_save(result.password_save);
            MountOperationResult::Handled
        }
    };

    OPERATION_REPLIES.with_label_values(&[code.as_str()]).inc();
    sink.reply(code);
    code
}

impl MountSource {
    /// Create a mount operation whose prompts are answered through this source.
    pub fn get_operation(&self) -> Arc<MountOperation> {
        let operation = MountOperation::new();
        operation.set_source(self.clone());

        let source = self.clone();
        operation.connect_ask_password(move |operation, event| {
            source.answer_operation_prompt(operation, event)
        });

        operation
    }

    fn answer_operation_prompt(&self, operation: &Arc<MountOperation>, event: &AskPasswordEvent) -> bool {
        // Keeps the operation alive until it has replied
        let operation = Arc::clone(operation);
        let source = self.clone();

        self.ask_password_async(
            event.message.as_deref(),
            event.default_user.as_deref(),
            event.default_domain.as_deref(),
            event.flags,
            move |result| {
                let outcome = source.ask_password_finish(result);
                let code = complete_operation(operation.as_ref(), outcome);
                debug!(endpoint = %source.identity(), code = %code, "Mount operation replied");
            },
        );

        true
    }
}
