/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Profile iterator for collecting performance metrics.
//!
//! Wraps any span iterator and records how it was driven (read/skip counts, EOF and
//! wall-clock time) without modifying its behavior.

use std::time::{Duration, Instant};

use bytes::Bytes;

use crate::{DocId, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanState};

/// Profile counters collected while the wrapped iterator is driven.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileCounters {
    /// Number of `read()` calls made.
    pub read: usize,
    /// Number of `skip_to()` calls made.
    pub skip_to: usize,
    /// Whether the iterator reported EOF.
    pub eof: bool,
}

/// A wrapper iterator that collects profiling metrics from a child iterator.
///
/// Failed calls are counted too. Wall time only covers `read` and `skip_to`.
pub struct Profile<I> {
    child: I,
    counters: ProfileCounters,
    wall_time: Duration,
}

impl<I: SpanIterator> Profile<I> {
    pub fn new(child: I) -> Self {
        Self {
            child,
            counters: ProfileCounters::default(),
            wall_time: Duration::ZERO,
        }
    }

    #[inline]
    pub const fn counters(&self) -> &ProfileCounters {
        &self.counters
    }

    /// Returns the accumulated wall time in nanoseconds.
    #[inline]
    pub const fn wall_time_ns(&self) -> u64 {
        self.wall_time.as_nanos() as u64
    }

    #[inline]
    pub const fn child(&self) -> &I {
        &self.child
    }

    pub fn into_inner(self) -> I {
        self.child
    }
}

impl<I: SpanIterator> SpanIterator for Profile<I> {
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        let start = Instant::now();
        let result = self.child.read();
        self.wall_time += start.elapsed();

        self.counters.read += 1;
        if matches!(&result, Ok(None)) {
            self.counters.eof = true;
        }
        result
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        let start = Instant::now();
        let result = self.child.skip_to(doc_id);
        self.wall_time += start.elapsed();

        self.counters.skip_to += 1;
        if matches!(&result, Ok(None)) {
            self.counters.eof = true;
        }
        result
    }

    #[inline(always)]
    fn state(&self) -> SpanState {
        self.child.state()
    }

    #[inline(always)]
    fn payload(&self) -> Result<Option<&[Bytes]>, SpanIteratorError> {
        self.child.payload()
    }

    fn num_estimated(&self) -> usize {
        self.child.num_estimated()
    }

    fn close(&mut self) {
        self.child.close();
    }
}
