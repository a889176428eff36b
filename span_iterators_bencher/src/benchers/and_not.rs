/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Benchmark the AndNot iterator in both exclusion modes.

use std::{hint::black_box, time::Duration};

use criterion::{BatchSize, BenchmarkGroup, Criterion, measurement::WallTime};
use span_iterators::{AndNot, Exclusion, SpanIterator};

use crate::corpus;

#[derive(Default)]
pub struct Bencher;

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
        let include = corpus::occurrences(11, 0.6, 4);
        let exclude = corpus::occurrences(12, 0.3, 8);

        let mut group = self.benchmark_group(c, "AndNot");
        for (label, exclusion) in [
            ("Document", Exclusion::Document),
            ("Overlap", Exclusion::overlap()),
            ("Within 3", Exclusion::within(3, 3)),
        ] {
            group.bench_function(label, |b| {
                b.iter_batched_ref(
                    || AndNot::new(corpus::term(&include), corpus::term(&exclude), exclusion),
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
