//! Benchmarks for store queries and the outbox.
//!
//! Run with: cargo bench --bench search_benchmarks

use chrono::{DateTime, Utc};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use duru_cache::domain::{LinkTarget, Note, NoteId, OpKind, Tag};
use duru_cache::store::{NoteRepository, NoteSearch, Outbox, SqliteStore};
use std::collections::BTreeSet;

// =============================================================================
// Test Data Generation
// =============================================================================

/// Tags assigned round-robin to notes
const TAGS: &[&str] = &[
    "home",
    "shopping",
    "work",
    "reading",
    "ideas",
    "travel",
    "health",
    "finance",
];

/// Sample words for generating realistic note content
const WORDS: &[&str] = &[
    "grocery",
    "meeting",
    "project",
    "recipe",
    "budget",
    "journal",
    "checklist",
    "reminder",
    "garden",
    "workout",
    "invoice",
    "itinerary",
    "summary",
    "draft",
    "outline",
    "schedule",
];

fn note_id_from_index(i: usize) -> NoteId {
    format!("note-{:06}", i).parse().expect("valid id")
}

fn timestamp(i: usize) -> DateTime<Utc> {
    // 2024-01-01T00:00:00Z plus one second per note
    DateTime::from_timestamp_millis(1_704_067_200_000 + i as i64 * 1000).expect("in range")
}

fn generate_note(i: usize) -> Note {
    let title = format!(
        "{} {} {}",
        WORDS[i % WORDS.len()],
        WORDS[(i / 3) % WORDS.len()],
        i
    );
    let body: Vec<&str> = (0..40).map(|k| WORDS[(i * 7 + k * 3) % WORDS.len()]).collect();
    Note::builder(note_id_from_index(i), timestamp(i))
        .title(title)
        .body(body.join(" "))
        .build()
}

/// Creates an in-memory store with `count` notes, two tags each, and a link to the previous note.
fn setup_store_with_notes(count: usize) -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().expect("open store");
    let mut previous_title: Option<String> = None;

    for i in 0..count {
        let note = generate_note(i);
        store.upsert_note(&note).expect("upsert");

        let tags: BTreeSet<Tag> = [TAGS[i % TAGS.len()], TAGS[(i + 3) % TAGS.len()]]
            .iter()
            .map(|t| Tag::new(t).expect("valid tag"))
            .collect();
        store.replace_tags_for_note(note.id(), &tags).expect("tags");

        if let Some(title) = previous_title.take() {
            store
                .replace_links_for_note(note.id(), &[LinkTarget::new(title)])
                .expect("links");
        }
        previous_title = Some(note.title().to_string());
    }

    store
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_search(c: &mut Criterion) {
    let store = setup_store_with_notes(1000);

    let mut group = c.benchmark_group("search_notes");

    group.bench_function("single_term", |b| {
        b.iter(|| store.search_notes("grocery").unwrap())
    });

    group.bench_function("prefix_terms", |b| {
        b.iter(|| store.search_notes("gro meet").unwrap())
    });

    group.bench_function("tag_filter", |b| {
        b.iter(|| store.search_notes("#shop").unwrap())
    });

    group.bench_function("no_hits", |b| {
        b.iter(|| store.search_notes("zzzzzz").unwrap())
    });

    group.finish();
}

fn bench_substring_fallback(c: &mut Criterion) {
    let store = setup_store_with_notes(1000);
    store
        .conn()
        .execute_batch("DROP TABLE notes_fts")
        .expect("drop index");

    c.bench_function("search_notes/substring_fallback", |b| {
        b.iter(|| store.search_notes("grocery").unwrap())
    });
}

fn bench_all_notes(c: &mut Criterion) {
    let mut group = c.benchmark_group("all_notes");

    for size in [100, 500, 1000] {
        let store = setup_store_with_notes(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("notes", size), &size, |b, _| {
            b.iter(|| store.all_notes().unwrap());
        });
    }

    group.finish();
}

fn bench_suggest(c: &mut Criterion) {
    let store = setup_store_with_notes(1000);

    c.bench_function("suggest_notes_by_title_prefix", |b| {
        b.iter(|| store.suggest_notes_by_title_prefix("gro", 10).unwrap())
    });
}

fn bench_relations(c: &mut Criterion) {
    let store = setup_store_with_notes(1000);
    let tag = Tag::new("shopping").unwrap();
    let target = generate_note(500).title().to_string();

    let mut group = c.benchmark_group("relations");

    group.bench_function("distinct_tags", |b| {
        b.iter(|| store.distinct_tags().unwrap())
    });

    group.bench_function("notes_with_tag", |b| {
        b.iter(|| store.notes_with_tag(&tag).unwrap())
    });

    group.bench_function("backlinks_with_sources", |b| {
        b.iter(|| store.backlinks_with_sources(&target).unwrap())
    });

    group.finish();
}

fn bench_outbox(c: &mut Criterion) {
    let mut group = c.benchmark_group("outbox");
    let entity = note_id_from_index(1);

    group.bench_function("enqueue", |b| {
        let mut store = SqliteStore::open_in_memory().unwrap();
        b.iter(|| store.enqueue(&entity, OpKind::UpsertNote, Some("{}")).unwrap())
    });

    group.bench_function("dequeue_all_100", |b| {
        b.iter_batched(
            || {
                let mut store = SqliteStore::open_in_memory().unwrap();
                for _ in 0..100 {
                    store.enqueue(&entity, OpKind::UpsertNote, None).unwrap();
                }
                store
            },
            |mut store| store.dequeue_all().unwrap(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

// =============================================================================
// Criterion Groups
// =============================================================================

criterion_group!(
    query_benches,
    bench_search,
    bench_substring_fallback,
    bench_all_notes,
    bench_suggest,
    bench_relations,
);

criterion_group!(outbox_benches, bench_outbox);

criterion_main!(query_benches, outbox_benches);
