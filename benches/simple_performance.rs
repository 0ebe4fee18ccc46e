use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sms_core::*;
use sms_web_generic::WebhookProcessor;
use tokio::runtime::Runtime;

fn benchmark_webhook_processing(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let processor = WebhookProcessor::builder()
        .webhook_secret("bench-secret")
        .build()
        .unwrap();
    processor.events().on("delivered", |_: &Payload| Ok(()));

    let payload_sizes = vec![100, 1000, 10000];
    let mut group = c.benchmark_group("webhook_processing");

    for size in payload_sizes {
        let body = format!(
            "secret=bench-secret&event=delivered&id=abc&content={}",
            "x".repeat(size)
        );
        let headers: Headers = vec![(
            "content-type".to_string(),
            "application/x-www-form-urlencoded".to_string(),
        )];

        group.bench_with_input(
            BenchmarkId::new("process_webhook", size),
            &size,
            |b, &_size| {
                b.to_async(&rt).iter(|| async {
                    black_box(
                        processor
                            .process_webhook(headers.clone(), body.as_bytes())
                            .await,
                    )
                })
            },
        );
    }
    group.finish();
}

fn benchmark_event_dispatch(c: &mut Criterion) {
    let payload = Payload::from([("event", "sent"), ("id", "abc"), ("message_type", "sms")]);
    let mut group = c.benchmark_group("event_dispatch");

    for listeners in [1, 10, 100] {
        let events = EventEmitter::new();
        for _ in 0..listeners {
            events.on("sent", |p: &Payload| {
                black_box(p.len());
                Ok(())
            });
        }

        group.bench_with_input(
            BenchmarkId::new("emit", listeners),
            &listeners,
            |b, _| b.iter(|| black_box(events.emit("sent", &payload))),
        );
    }
    group.finish();
}

fn benchmark_rejection(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let processor = WebhookProcessor::builder()
        .webhook_secret("bench-secret")
        .build()
        .unwrap();

    let headers: Headers = vec![(
        "content-type".to_string(),
        "application/x-www-form-urlencoded".to_string(),
    )];

    c.bench_function("reject_wrong_secret", |b| {
        b.to_async(&rt).iter(|| async {
            black_box(
                processor
                    .process_webhook(headers.clone(), b"secret=wrong&event=delivered")
                    .await,
            )
        })
    });
}

criterion_group!(
    benches,
    benchmark_webhook_processing,
    benchmark_event_dispatch,
    benchmark_rejection
);
criterion_main!(benches);
