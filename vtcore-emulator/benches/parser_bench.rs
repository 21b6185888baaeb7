// Copyright (C) 2024-2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use vtcore_emulator::parser::Parser;

/// A mix of printable runs and SGR/cursor-motion escape sequences, the kind
/// of thing a chatty full-screen program actually emits.
fn sample_stream(lines: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for row in 0..lines {
        data.extend_from_slice(format!("\x1b[{};1H", row + 1).as_bytes());
        data.extend_from_slice(b"\x1b[1;38;5;82mhello, world\x1b[0m");
    }
    data
}

fn bench_feed_whole(bench: &mut Criterion) {
    let data = sample_stream(1000);
    let mut group = bench.benchmark_group("parser_feed_whole");
    group.bench_with_input(BenchmarkId::from_parameter(data.len()), &data, |b, data| {
        b.iter(|| {
            let mut parser = Parser::new();
            parser.feed(data)
        });
    });
    group.finish();
}

fn bench_feed_byte_at_a_time(bench: &mut Criterion) {
    let data = sample_stream(200);
    let mut group = bench.benchmark_group("parser_feed_byte_at_a_time");
    group.bench_with_input(BenchmarkId::from_parameter(data.len()), &data, |b, data| {
        b.iter(|| {
            let mut parser = Parser::new();
            for &byte in data {
                parser.feed(&[byte]);
            }
        });
    });
    group.finish();
}

criterion_group!(benches, bench_feed_whole, bench_feed_byte_at_a_time);
criterion_main!(benches);
