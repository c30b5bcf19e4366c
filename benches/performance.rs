//! Performance benchmarks for room projection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use room_projection::{
    fold_all, initial_state, reduce, EventKind, RoomEvent, RoomPreset, RoomRegistry, Timestamp,
};

/// A realistic session: stories added, voted on by a few users, revealed, settled.
fn session(stories: usize, users: usize) -> Vec<RoomEvent> {
    let mut events = Vec::with_capacity(stories * (users + 4));
    for i in 0..stories {
        let story = format!("story-{}", i);
        events.push(RoomEvent::new(
            "room",
            "u0",
            EventKind::story_added(story.as_str(), format!("Story {}", i), "", Timestamp(i as i64)),
        ));
        events.push(RoomEvent::new("room", "u0", EventKind::story_selected(story.as_str())));
        for u in 0..users {
            events.push(RoomEvent::new(
                "room",
                format!("u{}", u),
                EventKind::estimate_given(story.as_str(), 5.0),
            ));
        }
        events.push(RoomEvent::new("room", "u0", EventKind::revealed(story.as_str())));
        events.push(RoomEvent::new(
            "room",
            "u0",
            EventKind::consensus_achieved(story.as_str(), 5.0),
        ));
    }
    events
}

/// Benchmark folding sessions of growing length
fn bench_fold(c: &mut Criterion) {
    let mut group = c.benchmark_group("fold_all");

    for stories in [10, 100, 500] {
        let events = session(stories, 8);
        group.bench_with_input(BenchmarkId::new("stories", stories), &events, |b, events| {
            b.iter(|| black_box(fold_all(initial_state(RoomPreset::new("room")), events)));
        });
    }

    group.finish();
}

/// Benchmark a single cloning reduce step against a large room
fn bench_single_reduce(c: &mut Criterion) {
    let state = fold_all(initial_state(RoomPreset::new("room")), &session(500, 8));
    let event = RoomEvent::new("room", "u1", EventKind::estimate_given("story-250", 8.0));

    c.bench_function("reduce_large_room", |b| {
        b.iter(|| black_box(reduce(&state, &event)));
    });
}

/// Benchmark registry dispatch, including lock and broadcast overhead
fn bench_registry_dispatch(c: &mut Criterion) {
    let events = session(100, 8);

    c.bench_function("registry_dispatch_100_stories", |b| {
        b.iter(|| {
            let registry = RoomRegistry::default();
            registry.open_room(RoomPreset::new("room")).unwrap();
            for event in &events {
                registry.dispatch(event).unwrap();
            }
            black_box(registry.snapshot(&"room".into()))
        });
    });
}

criterion_group!(benches, bench_fold, bench_single_reduce, bench_registry_dispatch);
criterion_main!(benches);
