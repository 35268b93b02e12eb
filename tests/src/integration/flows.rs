//! # Integration Flows
//!
//! Bridge behaviour beyond a single prompt:
//!
//! 1. **Blocking parity**: `ask_password_sync` returns what the async pair returns
//! 2. **Mount operations**: prompt events are answered over the bus and replied exactly once
//! 3. **Independence**: concurrent prompts to different handlers do not interfere
//! 4. **Contract mismatch**: a handler refusing the method ends the prompt as aborted
//! 5. **Telemetry**: prompts and bus calls show up in the metrics exposition

#[cfg(test)]
mod tests {
    use crate::fixtures::{bus_source, bus_source_with_config, spawn_responder, ScriptedPrompter};
    use mount_source::{
        AskFlags, AskPasswordEvent, AskPasswordReply, MountOperationResult, MountSourceConfig,
        MountSourceError, PasswordSave, PromptResult, SourceIdentity,
    };
    use shared_bus::InMemoryBus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::oneshot;

    // =============================================================================
    // FIXTURES
    // =============================================================================

    fn script() -> Vec<AskPasswordReply> {
        vec![
            AskPasswordReply::answered("secret", "bob", "WORKGROUP", PasswordSave::ForSession),
            AskPasswordReply::aborted(),
            AskPasswordReply::unhandled(),
            AskPasswordReply::anonymous(),
        ]
    }

    fn share_prompt() -> AskPasswordEvent {
        AskPasswordEvent {
            message: Some("Password required for share \"public\"".to_string()),
            default_user: Some("guest".to_string()),
            default_domain: None,
            flags: AskFlags::NEED_PASSWORD | AskFlags::ANONYMOUS_SUPPORTED,
        }
    }

    // =============================================================================
    // BLOCKING PARITY
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_sync_and_async_agree_over_bus() {
        let bus = Arc::new(InMemoryBus::new());
        let sync_responder = spawn_responder(
            &bus,
            "svc:sync",
            "/op/1",
            Arc::new(ScriptedPrompter::new(script())),
        );
        let async_responder = spawn_responder(
            &bus,
            "svc:async",
            "/op/1",
            Arc::new(ScriptedPrompter::new(script())),
        );

        let sync_source = bus_source(&bus, SourceIdentity::new("svc:sync", "/op/1"));
        let async_source = bus_source(&bus, SourceIdentity::new("svc:async", "/op/1"));
        let rounds = script().len();

        let sync_results = tokio::task::spawn_blocking(move || {
            (0..rounds)
                .map(|_| {
                    sync_source.ask_password_sync(
                        Some("Password"),
                        None,
                        None,
                        AskFlags::NEED_PASSWORD,
                    )
                })
                .collect::<Vec<_>>()
        })
        .await
        .unwrap();

        let mut async_results = Vec::new();
        for _ in 0..rounds {
            let (tx, rx) = oneshot::channel();
            async_source.ask_password_async(
                Some("Password"),
                None,
                None,
                AskFlags::NEED_PASSWORD,
                move |result| {
                    let _ = tx.send(result);
                },
            );
            async_results.push(async_source.ask_password_finish(rx.await.unwrap()));
        }

        assert_eq!(sync_results, async_results);
        assert_eq!(sync_results[2], Err(MountSourceError::Unhandled));
        assert!(sync_results[3].as_ref().unwrap().anonymous);

        sync_responder.abort();
        async_responder.abort();
    }

    // =============================================================================
    // MOUNT OPERATIONS
    // =============================================================================

    #[tokio::test]
    async fn test_operation_receives_credentials() {
        let bus = Arc::new(InMemoryBus::new());
        let prompter = Arc::new(ScriptedPrompter::new([AskPasswordReply::answered(
            "hunter2",
            "alice",
            "CORP",
            PasswordSave::Permanently,
        )]));
        let responder = spawn_responder(&bus, "svc:1", "/op/1", prompter.clone());
        let source = bus_source(&bus, SourceIdentity::new("svc:1", "/op/1"));

        let operation = source.get_operation();
        assert!(operation.emit_ask_password(share_prompt()));

        assert_eq!(operation.wait_for_reply().await, MountOperationResult::Handled);
        assert_eq!(operation.password().as_deref(), Some("hunter2"));
        assert_eq!(operation.username().as_deref(), Some("alice"));
        assert_eq!(operation.domain().as_deref(), Some("CORP"));
        assert_eq!(operation.password_save(), PasswordSave::Permanently);
        assert!(!operation.anonymous());

        let seen = prompter.seen();
        assert_eq!(seen[0].default_user, "guest");
        assert_eq!(seen[0].default_domain, "");

        responder.abort();
    }

    #[tokio::test]
    async fn test_operation_anonymous_login() {
        let bus = Arc::new(InMemoryBus::new());
        let prompter = Arc::new(ScriptedPrompter::new([AskPasswordReply::anonymous()]));
        let responder = spawn_responder(&bus, "svc:1", "/op/1", prompter);
        let source = bus_source(&bus, SourceIdentity::new("svc:1", "/op/1"));

        let operation = source.get_operation();
        operation.emit_ask_password(share_prompt());

        assert_eq!(operation.wait_for_reply().await, MountOperationResult::Handled);
        assert!(operation.anonymous());

        responder.abort();
    }

    #[tokio::test]
    async fn test_operation_outcomes_reply_once_each() {
        let bus = Arc::new(InMemoryBus::new());
        let responder = spawn_responder(
            &bus,
            "svc:1",
            "/op/1",
            Arc::new(ScriptedPrompter::new([
                AskPasswordReply::aborted(),
                AskPasswordReply::unhandled(),
            ])),
        );
        let source = bus_source(&bus, SourceIdentity::new("svc:1", "/op/1"));

        for expected in [MountOperationResult::Aborted, MountOperationResult::Unhandled] {
            let operation = source.get_operation();
            let replies = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&replies);
            operation.connect_reply(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });

            operation.emit_ask_password(share_prompt());

            assert_eq!(operation.wait_for_reply().await, expected);
            assert_eq!(replies.load(Ordering::SeqCst), 1);
            assert!(operation.password().is_none());
        }

        responder.abort();
    }

    // =============================================================================
    // INDEPENDENCE
    // =============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_prompts_to_different_handlers() {
        let bus = Arc::new(InMemoryBus::new());
        let slow = Arc::new(
            ScriptedPrompter::new([AskPasswordReply::answered("slow", "a", "", PasswordSave::Never)])
                .with_delay(Duration::from_secs(120)),
        );
        let fast = Arc::new(ScriptedPrompter::new([AskPasswordReply::answered(
            "fast",
            "b",
            "",
            PasswordSave::Never,
        )]));
        let slow_responder = spawn_responder(&bus, "svc:slow", "/op/1", slow);
        let fast_responder = spawn_responder(&bus, "svc:fast", "/op/1", fast);

        let slow_source = bus_source(&bus, SourceIdentity::new("svc:slow", "/op/1"));
        let fast_source = bus_source(&bus, SourceIdentity::new("svc:fast", "/op/1"));

        let (slow_result, fast_result) = tokio::join!(
            slow_source.ask_password(None, None, None, AskFlags::NEED_PASSWORD),
            fast_source.ask_password(None, None, None, AskFlags::NEED_PASSWORD),
        );

        assert_eq!(slow_result.unwrap().password.as_deref(), Some("slow"));
        assert_eq!(fast_result.unwrap().password.as_deref(), Some("fast"));

        slow_responder.abort();
        fast_responder.abort();
    }

    // =============================================================================
    // CONTRACT MISMATCH
    // =============================================================================

    #[tokio::test]
    async fn test_handler_rejecting_method_aborts_prompt() {
        let bus = Arc::new(InMemoryBus::new());
        let prompter = Arc::new(ScriptedPrompter::new(script()));
        let responder = spawn_responder(&bus, "svc:1", "/op/1", prompter.clone());
        let config = MountSourceConfig {
            ask_password_method: "askQuestion".to_string(),
            ..MountSourceConfig::default()
        };
        let source = bus_source_with_config(&bus, SourceIdentity::new("svc:1", "/op/1"), config);

        let result = source
            .ask_password(None, None, None, AskFlags::NEED_PASSWORD)
            .await
            .unwrap();

        assert_eq!(result, PromptResult::aborted());
        assert!(prompter.seen().is_empty());

        responder.abort();
    }

    // =============================================================================
    // TELEMETRY
    // =============================================================================

    #[tokio::test]
    async fn test_prompt_recorded_in_metrics() {
        // Another test may have registered the metrics already
        let _ = mount_telemetry::register_metrics();

        let bus = Arc::new(InMemoryBus::new());
        let responder = spawn_responder(
            &bus,
            "svc:metrics",
            "/op/1",
            Arc::new(ScriptedPrompter::new([AskPasswordReply::answered(
                "secret",
                "bob",
                "",
                PasswordSave::Never,
            )])),
        );
        let source = bus_source(&bus, SourceIdentity::new("svc:metrics", "/op/1"));
        let dispatched_before = mount_telemetry::PROMPTS_DISPATCHED.get();

        source
            .ask_password(None, None, None, AskFlags::NEED_PASSWORD)
            .await
            .unwrap();

        assert!(mount_telemetry::PROMPTS_DISPATCHED.get() > dispatched_before);
        let text = mount_telemetry::encode_metrics().unwrap();
        assert!(text.contains("ms_prompts_dispatched_total"));
        assert!(text.contains("ms_prompts_completed_total"));
        assert!(text.contains("ms_bus_calls_total"));

        responder.abort();
    }
}
