//! # Mount-Source Benchmarks
//!
//! | Area | Measured |
//! |------|----------|
//! | Reply decoding | `decode_reply` on a full `bbsssbu` reply |
//! | Bus round trip | One `askPassword` call answered by an in-process responder |
//! | Dummy source | A prompt that never leaves the process |

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mount_source::test_utils::{ScriptedResponse, ScriptedTransport};
use mount_source::{decode_reply, AskFlags, AskPasswordReply, MountSource, PasswordSave, SourceIdentity};
use ms_tests::fixtures::{bus_source, spawn_responder, ScriptedPrompter};
use shared_bus::InMemoryBus;
use std::sync::Arc;

fn bench_decode_reply(c: &mut Criterion) {
    let args = AskPasswordReply::answered("secret", "bob", "WORKGROUP", PasswordSave::ForSession)
        .to_wire();

    c.bench_function("decode_reply", |b| {
        b.iter(|| black_box(decode_reply(black_box(&args))))
    });
}

fn bench_bus_round_trip(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("runtime");

    let source = runtime.block_on(async {
        let bus = Arc::new(InMemoryBus::new());
        // Empty script: every prompt is declined
        spawn_responder(&bus, "svc:1", "/op/1", Arc::new(ScriptedPrompter::default()));
        bus_source(&bus, SourceIdentity::new("svc:1", "/op/1"))
    });

    c.bench_function("bus_round_trip", |b| {
        b.iter(|| {
            runtime.block_on(source.ask_password(
                Some("Password"),
                None,
                None,
                AskFlags::NEED_PASSWORD,
            ))
        })
    });
}

fn bench_dummy_source(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime");
    let source = MountSource::new_dummy(
        Arc::new(ScriptedTransport::new([ScriptedResponse::Silent])),
        runtime.handle().clone(),
    );

    c.bench_function("dummy_source", |b| {
        b.iter(|| runtime.block_on(source.ask_password(None, None, None, AskFlags::empty())))
    });
}

criterion_group!(
    benches,
    bench_decode_reply,
    bench_bus_round_trip,
    bench_dummy_source
);
criterion_main!(benches);
