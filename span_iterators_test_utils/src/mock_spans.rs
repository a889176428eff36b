/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use std::{cell::RefCell, io, rc::Rc};

use bytes::Bytes;
use span_iterators::{
    DocId, SkipPlan, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanState,
};

/// Test iterator used where a combinator expects a child which produces a fixed sequence
/// of spans.
///
/// * It owns a fixed list of spans that must be sorted and unique.
/// * [`SpanIterator::read`] walks that list from left to right.
/// * [`SpanIterator::skip_to`] moves to the first remaining span of a document
///   `>= doc_id`.
///
/// The iterator shares a [`MockData`] handle with the test, obtained through
/// [`MockSpans::data`], in order to:
///
/// * Inspect how many times `read`, `skip_to` and `close` were called.
/// * Configure an error returned once the iterator reaches the end of its spans,
///   through [`MockData::set_error_at_done`].
pub struct MockSpans {
    spans: Vec<Span>,
    payloads: Vec<Option<Bytes>>,
    next_index: usize,
    state: SpanState,
    data: MockData,
}

/// Error that can be injected into a [`MockSpans`] from tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockSpansError {
    /// Simulate a failing postings read.
    ReadFailure,
    /// Simulate a timeout in the child iterator.
    Timeout,
}

impl MockSpansError {
    fn as_span_iterator_error(self) -> SpanIteratorError {
        match self {
            Self::ReadFailure => {
                SpanIteratorError::UnderlyingReadFailure(io::Error::other("injected read failure"))
            }
            Self::Timeout => SpanIteratorError::TimedOut,
        }
    }
}

/// Shared mutable test state that belongs to a [`MockSpans`].
///
/// Cloning is cheap; every clone observes the same state.
#[derive(Clone)]
pub struct MockData(Rc<RefCell<MockDataInternal>>);

#[derive(Default)]
struct MockDataInternal {
    read_count: usize,
    skip_count: usize,
    close_count: usize,
    error_at_done: Option<MockSpansError>,
}

impl MockData {
    fn new() -> Self {
        Self(Rc::new(RefCell::new(MockDataInternal::default())))
    }

    /// If `maybe_err` is `Some`, the next `read` or `skip_to` that runs past the last span
    /// returns that error instead of reporting exhaustion.
    pub fn set_error_at_done(&mut self, maybe_err: Option<MockSpansError>) -> &mut Self {
        self.0.borrow_mut().error_at_done = maybe_err;
        self
    }

    pub fn read_count(&self) -> usize {
        self.0.borrow().read_count
    }

    pub fn skip_count(&self) -> usize {
        self.0.borrow().skip_count
    }

    /// Number of `close` calls, repeated calls included.
    pub fn close_count(&self) -> usize {
        self.0.borrow().close_count
    }
}

impl MockSpans {
    /// Create a mock over `spans`, which must be sorted and unique.
    pub fn new(spans: Vec<Span>) -> Self {
        assert!(
            spans.is_sorted_by(|a, b| a < b),
            "mock spans must be sorted and unique"
        );
        Self {
            spans,
            payloads: Vec::new(),
            next_index: 0,
            state: SpanState::Unstarted,
            data: MockData::new(),
        }
    }

    /// Same as [`MockSpans::new`], with a payload attached to some of the spans.
    pub fn with_payloads(entries: Vec<(Span, Option<Bytes>)>) -> Self {
        let (spans, payloads) = entries.into_iter().unzip();
        let mut mock = Self::new(spans);
        mock.payloads = payloads;
        mock
    }

    /// Return a handle to the shared [`MockData`] of this iterator.
    pub fn data(&self) -> MockData {
        self.data.clone()
    }

    /// Move to the span at `next_index`, or report the end.
    fn emit(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        let Some(&span) = self.spans.get(self.next_index) else {
            if let Some(err) = self.data.0.borrow().error_at_done {
                return Err(err.as_span_iterator_error());
            }
            self.state = SpanState::Exhausted;
            return Ok(None);
        };
        self.next_index += 1;
        self.state = SpanState::Positioned(span);
        Ok(Some(span))
    }
}

impl SpanIterator for MockSpans {
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        self.data.0.borrow_mut().read_count += 1;
        if !self.state.plan_read()? {
            return Ok(None);
        }
        self.emit()
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        self.data.0.borrow_mut().skip_count += 1;
        match self.state.plan_skip(doc_id)? {
            SkipPlan::Exhausted => return Ok(None),
            SkipPlan::Advance => {}
            SkipPlan::Seek => {
                while self
                    .spans
                    .get(self.next_index)
                    .is_some_and(|span| span.doc_id < doc_id)
                {
                    self.next_index += 1;
                }
            }
        }
        Ok(self.emit()?.map(|span| SkipToOutcome::new(doc_id, span)))
    }

    fn state(&self) -> SpanState {
        self.state
    }

    fn payload(&self) -> Result<Option<&[Bytes]>, SpanIteratorError> {
        self.state.ensure_positioned()?;
        Ok(self
            .payloads
            .get(self.next_index - 1)
            .and_then(Option::as_ref)
            .map(std::slice::from_ref))
    }

    fn num_estimated(&self) -> usize {
        self.spans.len()
    }

    fn close(&mut self) {
        self.data.0.borrow_mut().close_count += 1;
        self.state = SpanState::Closed;
    }
}
