// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Gobook-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Gobook and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use gobook::generate::process_spec;
use gobook::model::{DiagramOptions, DiagramType, PositionType, SgfSource, Spec, SpecOptions};
use gobook::render::{DiagramOrchestrator, RendererRegistry};
use gobook::store::{from_json_str, to_json_string};
use gobook::tree::{ConditionJudge, GameTree, MoveTree, TreeCache};

/// A 19x19 game of `moves` moves, a comment every `comment_every` moves and a short side
/// variation every 20 moves.
fn synthetic_game(moves: usize, comment_every: usize) -> String {
    let mut sgf = String::from("(;GM[1]FF[4]SZ[19]GN[Bench]C[Start]");
    let mut closing = 0;
    for i in 0..moves {
        let color = if i % 2 == 0 { 'B' } else { 'W' };
        let x = char::from(b'a' + ((i * 7) % 19) as u8);
        let y = char::from(b'a' + ((i * 11 + i / 19) % 19) as u8);
        if i > 0 && i % 20 == 0 {
            let other = if color == 'B' { 'W' } else { 'B' };
            sgf.push_str(&format!("(;{color}[ss];{other}[sr]C[Side line])("));
            closing += 1;
        }
        sgf.push_str(&format!(";{color}[{x}{y}]"));
        if (i + 1) % comment_every == 0 {
            sgf.push_str(&format!("C[Move {}]", i + 1));
        }
    }
    for _ in 0..closing {
        sgf.push(')');
    }
    sgf.push(')');
    sgf
}

fn spec_for(games: &[String], position_type: PositionType) -> Spec {
    let sources: Vec<_> = games
        .iter()
        .enumerate()
        .map(|(idx, sgf)| SgfSource::new(sgf.clone()).with_alias(format!("game-{idx}")))
        .collect();
    let spec_options = SpecOptions { position_type, ..SpecOptions::default() };
    Spec::create::<MoveTree>(&sources, spec_options, DiagramOptions::default(), Default::default())
        .expect("create spec")
}

// Group names (`tree.parse`, `generate.process_spec`, `render.render_all`, `store.json`) and case
// ids are kept stable so results stay comparable across refactors.
fn benches_pipeline(c: &mut Criterion) {
    let small = synthetic_game(60, 5);
    let long = synthetic_game(300, 10);

    {
        let mut group = c.benchmark_group("tree.parse");
        for (case_id, sgf) in [("small", &small), ("long", &long)] {
            group.throughput(Throughput::Bytes(sgf.len() as u64));
            group.bench_function(case_id, |b| {
                b.iter(|| {
                    let tree = MoveTree::parse(black_box(sgf)).expect("parse");
                    black_box(tree.num_children(tree.root()))
                })
            });
        }
        group.finish();
    }

    let games = vec![small.clone(), long.clone(), small.clone()];

    {
        let mut group = c.benchmark_group("generate.process_spec");
        let spec = spec_for(&games, PositionType::GameCommentary);
        group.bench_function("commentary_three_games", |b| {
            b.iter_batched(
                || (spec.clone(), TreeCache::<MoveTree>::new()),
                |(mut spec, mut cache)| {
                    process_spec(&mut spec, &mut cache, &ConditionJudge).expect("process spec");
                    black_box(spec.root_grouping().rendered_positions().count())
                },
                BatchSize::SmallInput,
            )
        });
        group.finish();
    }

    let mut processed = spec_for(&games, PositionType::GameCommentary);
    let mut cache = TreeCache::<MoveTree>::new();
    process_spec(&mut processed, &mut cache, &ConditionJudge).expect("process spec");
    let registry = RendererRegistry::with_default_renderers();

    {
        let mut group = c.benchmark_group("render.render_all");
        for (case_id, tag) in [("ascii", DiagramType::ASCII), ("unicode", DiagramType::UNICODE)] {
            let options = DiagramOptions { diagram_type: DiagramType::new(tag), ..DiagramOptions::default() };
            group.bench_function(case_id, |b| {
                b.iter(|| {
                    let mut orchestrator =
                        DiagramOrchestrator::new(&processed, options.clone(), &cache, &registry)
                            .expect("orchestrator");
                    let rendered = orchestrator.render_all().expect("render");
                    black_box(rendered.diagrams.iter().map(|d| d.rendered.len()).sum::<usize>())
                })
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("store.json");
        let json = to_json_string(&processed).expect("encode");
        group.bench_function("encode", |b| {
            b.iter(|| black_box(to_json_string(black_box(&processed)).expect("encode").len()))
        });
        group.bench_function("decode", |b| {
            b.iter(|| black_box(from_json_str(black_box(&json)).expect("decode").version()))
        });
        group.finish();
    }
}

criterion_group!(benches, benches_pipeline);
criterion_main!(benches);
