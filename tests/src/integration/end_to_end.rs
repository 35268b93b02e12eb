//! # End-to-End Prompts
//!
//! One prompt per outcome, from `ask_password_async` through the bus to a
//! responder and back:
//!
//! | Scenario | Expected |
//! |----------|----------|
//! | Dummy identity | `NoResponder`, nothing sent on the bus |
//! | Credentials supplied | Result carries them verbatim |
//! | Handler declines | `Unhandled` |
//! | Nobody answers within the deadline | Aborted; the late answer is discarded |
//! | Nobody registered at the address | Aborted |
//! | Timeout configured beyond any clock | Credentials still arrive |

#[cfg(test)]
mod tests {
    use crate::fixtures::{bus_source, bus_source_with_config, spawn_responder, ScriptedPrompter};
    use mount_source::{
        AskFlags, AskPasswordReply, AskPasswordResult, BusTransport, MountSource,
        MountSourceConfig, MountSourceError, PasswordSave, PromptResult, SourceIdentity,
    };
    use shared_bus::InMemoryBus;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::runtime::Handle;
    use tokio::sync::oneshot;

    // =============================================================================
    // HELPERS
    // =============================================================================

    fn svc1() -> SourceIdentity {
        SourceIdentity::new("svc:1", "/op/1")
    }

    async fn prompt(source: &MountSource) -> Result<PromptResult, MountSourceError> {
        let (tx, rx) = oneshot::channel::<AskPasswordResult>();
        source.ask_password_async(
            Some("Enter password for fileserver"),
            Some("bob"),
            None,
            AskFlags::NEED_PASSWORD | AskFlags::NEED_USERNAME | AskFlags::SAVING_SUPPORTED,
            move |result| {
                let _ = tx.send(result);
            },
        );
        let result = rx.await.expect("continuation delivered");
        source.ask_password_finish(result)
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_dummy_identity_sends_nothing() {
        let bus = Arc::new(InMemoryBus::new());
        let source = MountSource::new_dummy(
            Arc::new(BusTransport::new(bus.clone())),
            Handle::current(),
        );

        let result = prompt(&source).await;

        assert_eq!(result, Err(MountSourceError::NoResponder));
        assert_eq!(bus.calls_dispatched(), 0);
        assert_eq!(bus.pending_calls(), 0);
    }

    #[tokio::test]
    async fn test_credentials_supplied() {
        let bus = Arc::new(InMemoryBus::new());
        let prompter = Arc::new(ScriptedPrompter::new([AskPasswordReply::answered(
            "secret",
            "bob",
            "WORKGROUP",
            PasswordSave::ForSession,
        )]));
        let responder = spawn_responder(&bus, "svc:1", "/op/1", prompter.clone());
        let source = bus_source(&bus, svc1());

        let result = prompt(&source).await.unwrap();

        assert!(result.handled);
        assert!(!result.aborted);
        assert_eq!(result.password.as_deref(), Some("secret"));
        assert_eq!(result.username.as_deref(), Some("bob"));
        assert_eq!(result.domain.as_deref(), Some("WORKGROUP"));
        assert_eq!(result.password_save, PasswordSave::ForSession);

        // The responder saw the prompt with absent fields as empty strings
        let seen = prompter.seen();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].message, "Enter password for fileserver");
        assert_eq!(seen[0].default_user, "bob");
        assert_eq!(seen[0].default_domain, "");
        assert_eq!(seen[0].flags.bits(), 11);

        responder.abort();
    }

    #[tokio::test]
    async fn test_handler_declines() {
        let bus = Arc::new(InMemoryBus::new());
        let mut declined = AskPasswordReply::answered("ignored", "ignored", "", PasswordSave::Permanently);
        declined.handled = false;
        let prompter = Arc::new(ScriptedPrompter::new([declined]));
        let responder = spawn_responder(&bus, "svc:1", "/op/1", prompter);
        let source = bus_source(&bus, svc1());

        assert_eq!(prompt(&source).await, Err(MountSourceError::Unhandled));

        responder.abort();
    }

    #[tokio::test]
    async fn test_user_cancels() {
        let bus = Arc::new(InMemoryBus::new());
        let prompter = Arc::new(ScriptedPrompter::new([AskPasswordReply::aborted()]));
        let responder = spawn_responder(&bus, "svc:1", "/op/1", prompter);
        let source = bus_source(&bus, svc1());

        let result = prompt(&source).await.unwrap();
        assert!(result.handled);
        assert!(result.aborted);

        responder.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_passes() {
        let bus = Arc::new(InMemoryBus::new());
        // Registered, but nobody reads the inbox
        let mut endpoint = bus.register_endpoint("svc:1", "/op/1").unwrap();
        let source = bus_source(&bus, svc1());

        let result = prompt(&source).await.unwrap();

        assert_eq!(result, PromptResult::aborted());
        assert_eq!(bus.pending_calls(), 0);

        // The answer arrives after the deadline and goes nowhere
        let late = endpoint.try_recv().expect("call was queued");
        assert!(!late.reply(AskPasswordReply::aborted().to_wire()));
    }

    #[tokio::test]
    async fn test_unbounded_timeout_still_answers() {
        let bus = Arc::new(InMemoryBus::new());
        let prompter = Arc::new(ScriptedPrompter::new([AskPasswordReply::answered(
            "secret",
            "bob",
            "",
            PasswordSave::Never,
        )]));
        let responder = spawn_responder(&bus, "svc:1", "/op/1", prompter);
        let source = bus_source_with_config(
            &bus,
            svc1(),
            MountSourceConfig::default().with_timeout(Duration::from_secs(u64::MAX)),
        );

        let result = prompt(&source).await.unwrap();

        assert!(result.handled);
        assert!(!result.aborted);
        assert_eq!(result.password.as_deref(), Some("secret"));

        responder.abort();
    }

    #[tokio::test]
    async fn test_nobody_at_address() {
        let bus = Arc::new(InMemoryBus::new());
        let source = bus_source(&bus, svc1());

        let result = prompt(&source).await.unwrap();

        assert!(result.aborted);
        assert!(result.password.is_none());
    }

    #[tokio::test]
    async fn test_responder_drops_call() {
        let bus = Arc::new(InMemoryBus::new());
        let mut endpoint = bus.register_endpoint("svc:1", "/op/1").unwrap();
        let source = bus_source(&bus, svc1());

        let dropper = tokio::spawn(async move {
            let incoming = endpoint.recv().await.expect("call");
            drop(incoming);
        });

        let result = prompt(&source).await.unwrap();
        assert!(result.aborted);
        dropper.await.unwrap();
    }
}
