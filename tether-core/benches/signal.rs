use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use tether_core::reactive::{ReactiveContext, ReactiveStore, Signal, Subscriber};

fn signal_fan_out(c: &mut Criterion) {
    let signal = Signal::new(0u64);
    for _ in 0..32 {
        signal.subscribe(Subscriber::new(|| {
            black_box(());
        }));
    }
    c.bench_function("signal_set_32_subscribers", |b| {
        let mut n = 0;
        b.iter(|| {
            n += 1;
            signal.set(black_box(n));
        })
    });
}

fn status_merge(c: &mut Criterion) {
    let store = ReactiveStore::new();
    let status = json!({
        "duration": 300.0, "fullscreen": false, "media-title": "track",
        "pause": false, "playlist": [], "time-pos": 12.5, "core-idle": false, "volume": 70
    });
    let entries = status.as_object().cloned().unwrap_or_default();
    store.merge(&entries);

    let subscriber = Subscriber::new(|| {});
    let ctx = ReactiveContext::capturing(subscriber);
    for key in entries.keys() {
        let _ = store.observe(key, &ctx);
    }

    c.bench_function("store_status_merge", |b| b.iter(|| store.merge(black_box(&entries))));
}

criterion_group!(benches, signal_fan_out, status_merge);
criterion_main!(benches);
