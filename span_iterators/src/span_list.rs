/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Span-list iterator implementation
use bytes::Bytes;

use crate::{DocId, SkipPlan, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanState};

/// An iterator that yields the spans given on construction.
///
/// Useful for precomputed matches handed over by an external component, and as a
/// deterministic leaf in tests.
pub struct SpanList {
    /// The spans to iterate over. Must be sorted and unique.
    spans: Vec<Span>,
    /// Per-span payload, parallel to `spans`. Empty when no span has one.
    payloads: Vec<Option<Bytes>>,
    /// The index of the next span to return by `read`.
    offset: usize,
    state: SpanState,
}

impl SpanList {
    /// Creates a new span list iterator. The spans must be sorted and unique.
    pub fn new(spans: Vec<Span>) -> Self {
        debug_assert!(
            spans.is_sorted_by(|a, b| a < b),
            "spans must be sorted and unique"
        );
        Self {
            spans,
            payloads: Vec::new(),
            offset: 0,
            state: SpanState::Unstarted,
        }
    }

    /// Same as [`SpanList::new`] with a payload attached to some of the spans.
    pub fn with_payloads(entries: Vec<(Span, Option<Bytes>)>) -> Self {
        let (spans, payloads): (Vec<Span>, Vec<Option<Bytes>>) = entries.into_iter().unzip();
        let mut list = Self::new(spans);
        if payloads.iter().any(Option::is_some) {
            list.payloads = payloads;
        }
        list
    }

    /// The index of the next span to be returned by `read`.
    #[inline(always)]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    fn emit(&mut self, idx: usize) -> Option<Span> {
        let Some(&span) = self.spans.get(idx) else {
            self.offset = self.spans.len();
            self.state = SpanState::Exhausted;
            return None;
        };
        self.offset = idx + 1;
        self.state = SpanState::Positioned(span);
        Some(span)
    }
}

impl SpanIterator for SpanList {
    #[inline(always)]
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        if !self.state.plan_read()? {
            return Ok(None);
        }
        Ok(self.emit(self.offset))
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        let idx = match self.state.plan_skip(doc_id)? {
            SkipPlan::Exhausted => return Ok(None),
            SkipPlan::Advance => self.offset,
            SkipPlan::Seek => {
                // Spans are sorted by document first, so the landing spot is the first
                // remaining span of a document >= doc_id.
                self.offset + self.spans[self.offset..].partition_point(|s| s.doc_id < doc_id)
            }
        };
        Ok(self.emit(idx).map(|span| SkipToOutcome::new(doc_id, span)))
    }

    #[inline(always)]
    fn state(&self) -> SpanState {
        self.state
    }

    fn payload(&self) -> Result<Option<&[Bytes]>, SpanIteratorError> {
        self.state.ensure_positioned()?;
        let current = self.offset - 1;
        Ok(self
            .payloads
            .get(current)
            .and_then(Option::as_ref)
            .map(std::slice::from_ref))
    }

    fn num_estimated(&self) -> usize {
        self.spans.len()
    }

    fn close(&mut self) {
        self.state = SpanState::Closed;
        self.payloads = Vec::new();
    }
}
