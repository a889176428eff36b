/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Benchmark the Or iterator over term leaves.

use std::{hint::black_box, time::Duration};

use criterion::{
    BatchSize, BenchmarkGroup, Criterion,
    measurement::{Measurement, WallTime},
};
use span_iterators::{DocId, Or, Position, SpanIterator};

use crate::corpus;

#[derive(Default)]
pub struct Bencher;

/// Step size for skip_to benchmarks.
const STEP: DocId = 100;

fn children_occurrences(num_children: usize) -> Vec<Vec<(DocId, Position)>> {
    (0..num_children as u64)
        .map(|seed| corpus::occurrences(seed, 0.3, 3))
        .collect()
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
        for num_children in [2, 5, 50] {
            let occurrences = children_occurrences(num_children);
            let mut group = self.benchmark_group(c, &format!("Or {num_children} Children"));
            self.bench_read(&mut group, &occurrences);
            self.bench_skip_to(&mut group, &occurrences);
            group.finish();
        }
    }

    fn bench_read<M: Measurement>(
        &self,
        group: &mut BenchmarkGroup<'_, M>,
        occurrences: &[Vec<(DocId, Position)>],
    ) {
        group.bench_function("Read", |b| {
            b.iter_batched_ref(
                || Or::new(occurrences.iter().map(|o| corpus::term(o)).collect()),
                |it| {
                    while let Ok(Some(span)) = it.read() {
                        black_box(span);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    fn bench_skip_to<M: Measurement>(
        &self,
        group: &mut BenchmarkGroup<'_, M>,
        occurrences: &[Vec<(DocId, Position)>],
    ) {
        group.bench_function("SkipTo", |b| {
            b.iter_batched_ref(
                || Or::new(occurrences.iter().map(|o| corpus::term(o)).collect()),
                |it| {
                    let mut target = STEP;
                    while let Ok(Some(outcome)) = it.skip_to(target) {
                        target = outcome.span().doc_id + STEP;
                        black_box(outcome);
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
}
