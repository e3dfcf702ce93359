// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Reeltag-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Reeltag and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};

use reeltag::engine::{SteppingClock, Workspace};
use reeltag::model::{SessionId, SessionReplay, Tag, TagColor, TagId};
use reeltag::ops::{apply_command, Command};
use reeltag::query::search_tags;
use reeltag::store::Seed;

// Case ids (`small`, `medium`, `large`) stay stable so results remain comparable across runs.
struct Case {
    name: &'static str,
    tags: usize,
    sessions: usize,
    tags_per_session: usize,
}

const CASES: [Case; 3] = [
    Case { name: "small", tags: 10, sessions: 50, tags_per_session: 2 },
    Case { name: "medium", tags: 100, sessions: 2_000, tags_per_session: 4 },
    Case { name: "large", tags: 500, sessions: 20_000, tags_per_session: 6 },
];

fn build_workspace(case: &Case) -> Workspace {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).single().expect("start");
    let tag_ids: Vec<TagId> =
        (1..=case.tags).map(|idx| TagId::new(idx.to_string()).expect("tag id")).collect();
    let tags = tag_ids
        .iter()
        .enumerate()
        .map(|(idx, tag_id)| {
            let color = TagColor::ALL[idx % TagColor::ALL.len()];
            Tag::new(tag_id.clone(), format!("bench tag {idx:04}"), color, "bench", start)
        })
        .collect();

    // Skewed attachment: low tag ids are used far more often, like real triage data.
    let sessions = (0..case.sessions)
        .map(|idx| {
            let session_id = SessionId::new(format!("s{idx:06}")).expect("session id");
            let attached = (0..case.tags_per_session).map(|slot| {
                let pick = (idx * 31 + slot * slot * 7) % (case.tags * (slot + 1));
                tag_ids[pick % case.tags].clone()
            });
            SessionReplay::new(session_id, format!("u{idx}"), format!("u{idx}@bench.test"), start)
                .with_tag_ids(attached)
        })
        .collect();

    let clock = Arc::new(SteppingClock::new(start, Duration::milliseconds(1)));
    Seed { tags, sessions }.into_workspace("bench", clock).expect("bench workspace")
}

fn bench_visible_sessions(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine.visible_sessions");
    for case in &CASES {
        let mut workspace = build_workspace(case);
        let filter = vec![TagId::new("1").expect("tag id"), TagId::new("2").expect("tag id")];
        apply_command(&mut workspace, Command::SetFilterTags { tag_ids: filter }).expect("filter");

        group.throughput(Throughput::Elements(case.sessions as u64));
        group.bench_function(case.name, |b| {
            b.iter(|| black_box(workspace.visible_sessions().len()));
        });
    }
    group.finish();
}

fn bench_top_tags(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine.top_tags");
    for case in &CASES {
        let workspace = build_workspace(case);
        group.throughput(Throughput::Elements(case.sessions as u64));
        group.bench_function(case.name, |b| {
            b.iter(|| black_box(workspace.top_tags(black_box(5)).len()));
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("query.search_tags");
    for case in &CASES {
        let workspace = build_workspace(case);
        let exclude = vec![TagId::new("3").expect("tag id")];
        group.throughput(Throughput::Elements(case.tags as u64));
        group.bench_function(case.name, |b| {
            b.iter(|| {
                black_box(search_tags(workspace.tags(), black_box("tag 00"), &exclude).len())
            });
        });
    }
    group.finish();
}

fn bench_delete_cascade(c: &mut Criterion) {
    let mut group = c.benchmark_group("ops.delete_tag");
    for case in &CASES {
        group.bench_function(case.name, |b| {
            b.iter_batched(
                || build_workspace(case),
                |mut workspace| {
                    let tag_id = TagId::new("1").expect("tag id");
                    let applied = apply_command(&mut workspace, Command::DeleteTag { tag_id })
                        .expect("delete");
                    black_box(applied.delta.sessions_updated.len())
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_visible_sessions,
    bench_top_tags,
    bench_search,
    bench_delete_cascade
);
criterion_main!(benches);
