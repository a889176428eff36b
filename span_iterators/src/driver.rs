/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Walking an iterator tree to completion.
//!
//! The [`Driver`] owns the root of a tree and pulls it forward, handing every span to the
//! caller. It is the only place where a time budget is enforced and it releases the whole
//! tree once, whatever way the walk ends.

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::{DocId, Span, SpanIterator, SpanIteratorError, util::TimeoutContext};

/// Number of spans pulled between two clock reads when a time budget is set.
pub const DEFAULT_TIMEOUT_CHECK_INTERVAL: u32 = 100;

/// How a [`Driver`] walks its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Begin with `skip_to(start_doc)` instead of `read`.
    pub start_doc: Option<DocId>,
    /// Stop after this many spans.
    pub limit: Option<usize>,
    /// Fail with [`SpanIteratorError::TimedOut`] once the walk takes longer than this.
    pub time_budget: Option<Duration>,
    /// Spans pulled between two clock reads, see [`TimeoutContext`].
    pub timeout_check_interval: u32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            start_doc: None,
            limit: None,
            time_budget: None,
            timeout_check_interval: DEFAULT_TIMEOUT_CHECK_INTERVAL,
        }
    }
}

impl DriverConfig {
    pub const fn start_doc(mut self, doc_id: DocId) -> Self {
        self.start_doc = Some(doc_id);
        self
    }

    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub const fn time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub const fn timeout_check_interval(mut self, interval: u32) -> Self {
        self.timeout_check_interval = interval;
        self
    }
}

/// Outcome of a successful walk.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DriveSummary {
    /// Spans handed to the callback.
    pub matches: usize,
    /// The walk stopped at the limit while spans remained.
    pub truncated: bool,
}

/// Drives the root of an iterator tree.
pub struct Driver<I> {
    root: I,
    config: DriverConfig,
}

impl<I> Driver<I>
where
    I: SpanIterator,
{
    pub const fn new(root: I, config: DriverConfig) -> Self {
        Self { root, config }
    }

    #[inline]
    pub const fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// The root iterator. Closed once [`Driver::run`] returned.
    #[inline]
    pub const fn root(&self) -> &I {
        &self.root
    }

    /// Walk the root, calling `on_match` with every span and its payloads.
    ///
    /// The root is closed before returning, on success and on error alike. Running a driver
    /// a second time fails with [`SpanIteratorError::Closed`].
    pub fn run<F>(&mut self, mut on_match: F) -> Result<DriveSummary, SpanIteratorError>
    where
        F: FnMut(Span, Option<&[Bytes]>),
    {
        debug!(
            start_doc = ?self.config.start_doc,
            limit = ?self.config.limit,
            budget = ?self.config.time_budget,
            estimated = self.root.num_estimated(),
            "walking span iterator"
        );

        let result = self.walk(&mut on_match);
        self.root.close();

        match &result {
            Ok(summary) => debug!(
                matches = summary.matches,
                truncated = summary.truncated,
                "span walk finished"
            ),
            Err(SpanIteratorError::TimedOut) => warn!("span walk ran out of time"),
            Err(err) => warn!(error = %err, "span walk failed"),
        }
        result
    }

    /// Walk the root and return every span.
    pub fn collect(&mut self) -> Result<Vec<Span>, SpanIteratorError> {
        let mut spans = Vec::new();
        self.run(|span, _| spans.push(span))?;
        Ok(spans)
    }

    fn walk<F>(&mut self, on_match: &mut F) -> Result<DriveSummary, SpanIteratorError>
    where
        F: FnMut(Span, Option<&[Bytes]>),
    {
        let mut timeout = self
            .config
            .time_budget
            .map(|budget| TimeoutContext::new(budget, self.config.timeout_check_interval));
        let mut summary = DriveSummary::default();

        let mut next = match self.config.start_doc {
            Some(doc_id) => self.root.skip_to(doc_id)?.map(|outcome| outcome.span()),
            None => self.root.read()?,
        };
        while let Some(span) = next {
            if self.config.limit.is_some_and(|limit| summary.matches >= limit) {
                summary.truncated = true;
                break;
            }

            on_match(span, self.root.payload()?);
            summary.matches += 1;

            if let Some(timeout) = timeout.as_mut() {
                timeout.check_timeout()?;
            }
            next = self.root.read()?;
        }
        Ok(summary)
    }
}

/// Walk `root` to exhaustion and return every span it yields.
pub fn drain<I: SpanIterator>(root: I) -> Result<Vec<Span>, SpanIteratorError> {
    Driver::new(root, DriverConfig::default()).collect()
}
