//! Comparison benchmarks across the four counter structures.
//!
//! Each structure tallies the same deterministic word workload so the
//! criterion groups line up structure-by-structure:
//! - tally: counter increments over a Zipf-ish skewed stream
//! - lookup: repeated gets against a populated map
//! - export: ranked extraction from a populated map

use std::hint::black_box;
use std::time::Instant;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};

use tallykit::map::{
    AvlCounterMap, ChainedCounterMap, OpenAddressingCounterMap, RedBlackCounterMap,
};
use tallykit::traits::CounterMap;

const VOCABULARY: usize = 8_192;
const OPS: u64 = 100_000;

/// Small deterministic PRNG so runs are comparable across machines.
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Skews draws toward low word ids, roughly matching natural-text word
/// frequencies: squaring a unit sample concentrates mass near zero.
fn word_stream(seed: u64, len: usize) -> Vec<String> {
    let mut rng = XorShift64::new(seed);
    (0..len)
        .map(|_| {
            let unit = (rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
            let id = (unit * unit * VOCABULARY as f64) as usize;
            format!("word{id}")
        })
        .collect()
}

fn bench_tally(c: &mut Criterion) {
    let mut group = c.benchmark_group("tally");
    group.throughput(Throughput::Elements(OPS));
    let words = word_stream(0x5eed, OPS as usize);

    group.bench_function("avl", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let mut map = AvlCounterMap::new();
                for word in &words {
                    *map.counter(word.clone()) += 1;
                }
                black_box(map.len());
            }
            start.elapsed()
        })
    });

    group.bench_function("rbt", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let mut map = RedBlackCounterMap::new();
                for word in &words {
                    *map.counter(word.clone()) += 1;
                }
                black_box(map.len());
            }
            start.elapsed()
        })
    });

    group.bench_function("cht", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let mut map = ChainedCounterMap::new();
                for word in &words {
                    *map.counter(word.clone()) += 1;
                }
                black_box(map.len());
            }
            start.elapsed()
        })
    });

    group.bench_function("oht", |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let mut map = OpenAddressingCounterMap::new();
                for word in &words {
                    *map.counter(word.clone()) += 1;
                }
                black_box(map.len());
            }
            start.elapsed()
        })
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    group.throughput(Throughput::Elements(OPS));
    let words = word_stream(0x5eed, OPS as usize);
    let probes = word_stream(0xbeef, OPS as usize);

    macro_rules! lookup_case {
        ($name:literal, $ty:ty) => {
            group.bench_function($name, |b| {
                b.iter_custom(|iters| {
                    let mut map: $ty = Default::default();
                    for word in &words {
                        *map.counter(word.clone()) += 1;
                    }
                    let start = Instant::now();
                    for _ in 0..iters {
                        for probe in &probes {
                            black_box(map.get(probe));
                        }
                    }
                    start.elapsed()
                })
            });
        };
    }

    lookup_case!("avl", AvlCounterMap<String>);
    lookup_case!("rbt", RedBlackCounterMap<String>);
    lookup_case!("cht", ChainedCounterMap<String>);
    lookup_case!("oht", OpenAddressingCounterMap<String>);

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    let words = word_stream(0x5eed, OPS as usize);

    macro_rules! export_case {
        ($name:literal, $ty:ty) => {
            group.bench_function($name, |b| {
                b.iter_custom(|iters| {
                    let mut map: $ty = Default::default();
                    for word in &words {
                        *map.counter(word.clone()) += 1;
                    }
                    let start = Instant::now();
                    for _ in 0..iters {
                        black_box(map.by_frequency());
                    }
                    start.elapsed()
                })
            });
        };
    }

    export_case!("avl", AvlCounterMap<String>);
    export_case!("rbt", RedBlackCounterMap<String>);
    export_case!("cht", ChainedCounterMap<String>);
    export_case!("oht", OpenAddressingCounterMap<String>);

    group.finish();
}

criterion_group!(benches, bench_tally, bench_lookup, bench_export);
criterion_main!(benches);
