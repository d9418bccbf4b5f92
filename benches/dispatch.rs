use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use eggify::{to_code, KeyEvent, ManualSource, MatchOptions, Pattern, Registry};

const KONAMI: [&str; 10] = [
    "ArrowUp",
    "ArrowUp",
    "ArrowDown",
    "ArrowDown",
    "ArrowLeft",
    "ArrowRight",
    "ArrowLeft",
    "ArrowRight",
    "KeyB",
    "KeyA",
];

fn konami_events() -> Vec<KeyEvent> {
    KONAMI.iter().map(|code| KeyEvent::code(*code)).collect()
}

fn bench_normalize(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize");
    group.bench_function("words", |b| {
        b.iter(|| Pattern::normalize(black_box("up up down down left right left right b a")));
    });
    group.bench_function("tokens", |b| {
        b.iter(|| Pattern::normalize(black_box(KONAMI)));
    });
    group.bench_function("to_code", |b| {
        b.iter(|| to_code(black_box("left")));
    });
    group.finish();
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let events = konami_events();

    // Every registration watches the same code, so each key advances all of them.
    for registrations in [1usize, 16, 256] {
        let source = ManualSource::new();
        let registry = Registry::new(source.clone());
        let subs: Vec<_> = (0..registrations)
            .map(|_| {
                registry.register(
                    KONAMI,
                    |_| Ok(()),
                    MatchOptions::default().with_max_key_delay_ms(2_000),
                )
            })
            .collect();

        group.throughput(Throughput::Elements(events.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("konami", registrations),
            &events,
            |b, events| {
                b.iter(|| source.deliver_all(events));
            },
        );
        drop(subs);
        registry.shutdown();
    }
    group.finish();
}

criterion_group!(benches, bench_normalize, bench_dispatch);
criterion_main!(benches);
