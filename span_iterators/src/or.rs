/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Disjunction of span iterators.

use bytes::Bytes;

use crate::{
    DocId, SkipPlan, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanState, cost,
    util::SpanMinHeap,
};

/// Yields the spans of ANY child, merged in span order.
///
/// When several children sit on the same span it is yielded once; the payload reported for
/// it is the one of the first such child in query order.
///
/// # Algorithm
///
/// Every non-exhausted child has one entry in a min-heap keyed by its current span. The
/// heap top is the current span of the union. Moving past it advances every child whose
/// entry equals it; children reaching EOF leave the heap. Skipping only touches children
/// behind the target document.
pub struct Or<I> {
    /// Child iterators, in query order.
    children: Vec<I>,
    /// Current span and index of every child that is not exhausted.
    heap: SpanMinHeap,
    /// Children `..next_start` are in the heap or exhausted. A child failing while the
    /// union starts is tried again on the next call.
    next_start: usize,
    started: bool,
    state: SpanState,
    /// Upper-bound estimate: the sum of the children's estimates.
    num_estimated: usize,
}

impl<I> Or<I>
where
    I: SpanIterator,
{
    /// Creates a new union iterator. With no children the iterator is empty.
    #[must_use]
    pub fn new(children: Vec<I>) -> Self {
        Self {
            num_estimated: cost::sum_cost(&children),
            heap: SpanMinHeap::with_capacity(children.len()),
            children,
            next_start: 0,
            started: false,
            state: SpanState::Unstarted,
        }
    }

    /// Position every child for the first time, with `read` or `skip_to(target)`.
    ///
    /// Resumes after the last child that answered when a previous start failed.
    fn start(&mut self, target: Option<DocId>) -> Result<(), SpanIteratorError> {
        while let Some(child) = self.children.get_mut(self.next_start) {
            let span = match target {
                Some(target) => child.skip_to(target)?.map(|outcome| outcome.span()),
                None => child.read()?,
            };
            if let Some(span) = span {
                self.heap.push(span, self.next_start);
            }
            self.next_start += 1;
        }
        self.started = true;
        // Children started by an earlier, failed attempt may still lag behind `target`.
        match target {
            Some(target) => self.skip_lagging(target),
            None => Ok(()),
        }
    }

    /// Advance every child sitting on `span`.
    fn advance_past(&mut self, span: Span) -> Result<(), SpanIteratorError> {
        while let Some((top, idx)) = self.heap.peek()
            && top == span
        {
            match self.children[idx].read()? {
                Some(next) => self.heap.replace_root(next, idx),
                None => {
                    self.heap.pop();
                }
            }
        }
        Ok(())
    }

    /// Move every child sitting in a document before `target` to `target` or later.
    fn skip_lagging(&mut self, target: DocId) -> Result<(), SpanIteratorError> {
        while let Some((top, idx)) = self.heap.peek()
            && top.doc_id < target
        {
            match self.children[idx].skip_to(target)? {
                Some(outcome) => self.heap.replace_root(outcome.span(), idx),
                None => {
                    self.heap.pop();
                }
            }
        }
        Ok(())
    }

    /// Take the heap top as the current span.
    fn emit(&mut self) -> Option<Span> {
        match self.heap.peek() {
            Some((span, _)) => {
                self.state = SpanState::Positioned(span);
                Some(span)
            }
            None => {
                self.state = SpanState::Exhausted;
                None
            }
        }
    }
}

impl<I> SpanIterator for Or<I>
where
    I: SpanIterator,
{
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        if !self.state.plan_read()? {
            return Ok(None);
        }

        if !self.started {
            self.start(None)?;
        } else if let SpanState::Positioned(current) = self.state {
            self.advance_past(current)?;
        }
        Ok(self.emit())
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        let span = match self.state.plan_skip(doc_id)? {
            SkipPlan::Exhausted => return Ok(None),
            SkipPlan::Advance => self.read()?,
            SkipPlan::Seek => {
                if self.started {
                    self.skip_lagging(doc_id)?;
                } else {
                    self.start(Some(doc_id))?;
                }
                self.emit()
            }
        };
        Ok(span.map(|span| SkipToOutcome::new(doc_id, span)))
    }

    #[inline(always)]
    fn state(&self) -> SpanState {
        self.state
    }

    fn payload(&self) -> Result<Option<&[Bytes]>, SpanIteratorError> {
        self.state.ensure_positioned()?;
        match self.heap.peek() {
            Some((_, idx)) => self.children[idx].payload(),
            None => Ok(None),
        }
    }

    #[inline(always)]
    fn num_estimated(&self) -> usize {
        self.num_estimated
    }

    fn close(&mut self) {
        if self.state == SpanState::Closed {
            return;
        }
        self.state = SpanState::Closed;
        self.heap.clear();
        self.children.iter_mut().for_each(SpanIterator::close);
    }
}
