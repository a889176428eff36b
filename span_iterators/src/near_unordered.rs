/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Unordered proximity iterator.

use bytes::Bytes;

use crate::{
    DocId, SkipPlan, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanState,
    conjunction::Conjunction, cost,
};

/// Yields spans where every child occurs, in any order, within one document and within a
/// window of at most `slop` positions of slack.
///
/// The window of an arrangement runs from the smallest start to the largest end of the
/// child spans; its slack is the window length minus the summed lengths of the child
/// spans. Child spans may overlap, in which case the slack is negative and always fits.
///
/// For example with `a` at `10..11` and `b` at `8..9` the window is `8..11` and the slack
/// is `3 - 2 = 1`: a match for any slop of 1 or more.
///
/// # Algorithm
///
/// The current spans of the children form the candidate arrangement. While it does not fit
/// the slop, the child holding the smallest span is advanced, which slides the window
/// forward. After a match the same child is advanced on the next `read`. When that child
/// runs out of spans in the document, no further arrangement can exist there and the
/// children are aligned on the next document.
pub struct NearUnordered<I> {
    conjunction: Conjunction<I>,
    slop: u32,
    collect_payloads: bool,
    payloads: Vec<Bytes>,
    /// The child holding the smallest span of the current match.
    min_child: usize,
    state: SpanState,
    /// Upper-bound estimate: the sum of the children's estimates.
    num_estimated: usize,
}

/// The window formed by the current span of every child.
struct Window {
    /// Child holding the smallest span (ties resolved towards the first child).
    min_child: usize,
    span: Span,
    /// Window length minus the summed child span lengths.
    slack: i64,
}

impl<I> NearUnordered<I>
where
    I: SpanIterator,
{
    /// Creates an unordered near iterator over `children`.
    ///
    /// Payload collection is enabled by default, see [`NearUnordered::collect_payloads`].
    pub fn new(children: Vec<I>, slop: u32) -> Self {
        let num_estimated = cost::sum_cost(&children);
        Self {
            conjunction: Conjunction::new(children),
            slop,
            collect_payloads: true,
            payloads: Vec::new(),
            min_child: 0,
            state: SpanState::Unstarted,
            num_estimated,
        }
    }

    /// Whether to gather the payloads of the child spans forming each match.
    pub fn collect_payloads(mut self, collect: bool) -> Self {
        self.collect_payloads = collect;
        self
    }

    #[inline(always)]
    pub const fn slop(&self) -> u32 {
        self.slop
    }

    fn window(&self, doc_id: DocId) -> Window {
        let spans = self.conjunction.spans();
        let mut min_child = 0;
        let mut max_end = spans[0].end;
        let mut total_len = 0i64;
        for (idx, span) in spans.iter().enumerate() {
            if *span < spans[min_child] {
                min_child = idx;
            }
            max_end = max_end.max(span.end);
            total_len += i64::from(span.len());
        }
        let min_start = spans[min_child].start;
        Window {
            min_child,
            span: Span::new(doc_id, min_start, max_end),
            slack: i64::from(max_end - min_start) - total_len,
        }
    }

    fn match_in_doc(
        &mut self,
        doc_id: DocId,
        last: Option<Span>,
    ) -> Result<Option<Span>, SpanIteratorError> {
        loop {
            let window = self.window(doc_id);
            let fits = window.slack <= i64::from(self.slop);
            if fits && last.is_none_or(|last| last < window.span) {
                self.min_child = window.min_child;
                return Ok(Some(window.span));
            }

            match self.conjunction.advance(window.min_child)? {
                Some(span) if span.doc_id == doc_id => {}
                _ => return Ok(None),
            }
        }
    }

    fn find_next(&mut self, mut doc_id: Option<DocId>) -> Result<Option<Span>, SpanIteratorError> {
        let last = self.state.span().ok();
        while let Some(current) = doc_id {
            if let Some(span) = self.match_in_doc(current, last)? {
                self.payloads.clear();
                if self.collect_payloads {
                    self.conjunction.collect_payloads(&mut self.payloads)?;
                }
                self.state = SpanState::Positioned(span);
                return Ok(Some(span));
            }
            doc_id = self.conjunction.align()?;
        }
        self.state = SpanState::Exhausted;
        Ok(None)
    }
}

impl<I> SpanIterator for NearUnordered<I>
where
    I: SpanIterator,
{
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        if !self.state.plan_read()? {
            return Ok(None);
        }

        let doc_id = if !self.conjunction.is_started() {
            self.conjunction.start(None)?
        } else {
            let current = self.state.doc_id()?;
            match self.conjunction.advance(self.min_child)? {
                Some(span) if span.doc_id == current => Some(current),
                Some(_) => self.conjunction.align()?,
                None => None,
            }
        };
        self.find_next(doc_id)
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        let span = match self.state.plan_skip(doc_id)? {
            SkipPlan::Exhausted => return Ok(None),
            SkipPlan::Advance => self.read()?,
            SkipPlan::Seek => {
                let aligned = if self.conjunction.is_started() {
                    self.conjunction.skip_lagging(doc_id)?;
                    self.conjunction.align()?
                } else {
                    self.conjunction.start(Some(doc_id))?
                };
                self.find_next(aligned)?
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
        Ok((!self.payloads.is_empty()).then_some(self.payloads.as_slice()))
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
        self.payloads = Vec::new();
        self.conjunction.close();
    }
}
