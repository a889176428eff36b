/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Benchmark the ordered and unordered near iterators.
//!
//! Every phrase word is mixed with noise occurrences, so both iterators have to reject
//! candidates inside matching documents.

use std::{hint::black_box, time::Duration};

use criterion::{BatchSize, BenchmarkGroup, Criterion, measurement::WallTime};
use span_iterators::{
    DocId, MemoryPostings, NearOrdered, NearUnordered, Position, SpanIterator, TermSpans,
};

use crate::corpus;

#[derive(Default)]
pub struct Bencher;

const PHRASE_SEED: u64 = 7;

/// Phrase occurrences merged with random occurrences of the same words.
fn phrase_with_noise(words: usize) -> Vec<Vec<(DocId, Position)>> {
    corpus::phrase(PHRASE_SEED, 0.2, words)
        .into_iter()
        .enumerate()
        .map(|(idx, mut occurrences)| {
            occurrences.extend(corpus::occurrences(PHRASE_SEED + 1 + idx as u64, 0.5, 4));
            occurrences
        })
        .collect()
}

fn terms(words: &[Vec<(DocId, Position)>]) -> Vec<TermSpans<MemoryPostings>> {
    words.iter().map(|o| corpus::term(o)).collect()
}

impl Bencher {
    const MEASUREMENT_TIME: Duration = Duration::from_millis(3000);
    const WARMUP_TIME: Duration = Duration::from_millis(200);

    fn benchmark_group<'a>(
        &self,
        c: &'a mut Criterion,
        label: &str,
    ) -> BenchmarkGroup<'a, WallTime> {
        let mut group = c.benchmark_group(label);
        group.measurement_time(Self::MEASUREMENT_TIME);
        group.warm_up_time(Self::WARMUP_TIME);
        group
    }

    pub fn bench(&self, c: &mut Criterion) {
        for words in [2, 4] {
            let occurrences = phrase_with_noise(words);
            let mut group = self.benchmark_group(c, &format!("Near {words} Terms"));

            for slop in [0, 5] {
                group.bench_function(format!("Ordered Slop {slop}"), |b| {
                    b.iter_batched_ref(
                        || NearOrdered::new(terms(&occurrences), slop),
                        |it| {
                            while let Ok(Some(span)) = it.read() {
                                black_box(span);
                            }
                        },
                        BatchSize::SmallInput,
                    );
                });

                group.bench_function(format!("Unordered Slop {slop}"), |b| {
                    b.iter_batched_ref(
                        || NearUnordered::new(terms(&occurrences), slop),
                        |it| {
                            while let Ok(Some(span)) = it.read() {
                                black_box(span);
                            }
                        },
                        BatchSize::SmallInput,
                    );
                });
            }
            group.finish();
        }
    }
}
