//! Criterion benchmarks for [`KeyboardLayout`] hit testing and relayout.
//!
//! Every MOVE sample of every finger resolves a key, so `key_for_pos` sits on
//! the hot path of touch processing.
//!
//! Run with:
//! ```bash
//! cargo bench --package osk-core --bench hit_test_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use osk_core::{DesiredKey, KeyData, KeySpec, KeyboardLayout, KeyboardMode};

// ── Layout fixture builders ───────────────────────────────────────────────────

/// Builds a QWERTY-like layout with `rows` rows of ten letter keys each.
fn build_layout(rows: usize) -> KeyboardLayout {
    let letters: Vec<char> = ('a'..='z').collect();
    let specs = (0..rows)
        .map(|r| {
            (0..10)
                .map(|c| KeySpec::char(letters[(r * 10 + c) % letters.len()]))
                .collect()
        })
        .chain(std::iter::once(vec![
            KeySpec::new(KeyData::shift()).with_width(1.5),
            KeySpec::new(KeyData::space()).with_width(5.0).growing(),
            KeySpec::new(KeyData::delete()).with_width(1.5),
        ]))
        .collect();
    let mut layout = KeyboardLayout::new(KeyboardMode::Characters, specs);
    let height = 60.0 * (rows + 1) as f64;
    layout
        .layout(1080.0, height, DesiredKey::for_keyboard(1080.0, 60.0, 2.0, 5.0))
        .expect("fixture dimensions are valid");
    layout
}

// ── Benchmarks ────────────────────────────────────────────────────────────────

fn bench_key_for_pos(c: &mut Criterion) {
    let mut group = c.benchmark_group("key_for_pos");
    for rows in [3usize, 5, 8] {
        let layout = build_layout(rows);
        let bottom = 60.0 * rows as f64 + 30.0;
        group.bench_with_input(BenchmarkId::new("top_row", rows), &layout, |b, layout| {
            b.iter(|| layout.key_for_pos(black_box(540.0), black_box(30.0)))
        });
        group.bench_with_input(BenchmarkId::new("bottom_row", rows), &layout, |b, layout| {
            b.iter(|| layout.key_for_pos(black_box(540.0), black_box(bottom)))
        });
        group.bench_with_input(BenchmarkId::new("miss", rows), &layout, |b, layout| {
            b.iter(|| layout.key_for_pos(black_box(540.0), black_box(-10.0)))
        });
    }
    group.finish();
}

fn bench_relayout(c: &mut Criterion) {
    let mut layout = build_layout(4);
    c.bench_function("relayout_4_rows", |b| {
        b.iter(|| {
            layout
                .layout(
                    black_box(1080.0),
                    black_box(300.0),
                    DesiredKey::for_keyboard(1080.0, 60.0, 2.0, 5.0),
                )
                .expect("valid dimensions")
        })
    });
}

criterion_group!(benches, bench_key_for_pos, bench_relayout);
criterion_main!(benches);
