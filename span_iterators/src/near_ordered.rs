/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Ordered proximity (phrase) iterator.

use bytes::Bytes;

use crate::{
    DocId, SkipPlan, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanState,
    conjunction::Conjunction, cost,
};

/// Yields spans where the children occur in query order, within one document, with at most
/// `slop` positions of slack.
///
/// Consecutive child spans must not overlap (`prev.end <= next.start`). The slack of an
/// arrangement is the sum of the gaps between consecutive child spans, so with a slop of 0
/// the children must be contiguous, e.g. an exact phrase. The emitted span runs from the
/// start of the first child's span to the end of the last child's span.
///
/// # Algorithm
///
/// 1. Align all children on one document (cheapest child first).
/// 2. For the first child's current span, *stretch* every following child: advance it as
///    little as necessary to start at or after the end of its predecessor.
/// 3. If the total gap fits the slop, emit. Otherwise, or on the next `read`, advance the
///    first child and stretch again.
/// 4. When any child runs out of spans in the document, align on the next document.
///
/// Cursors only move forward, so for each first-child span the arrangement found is the
/// leftmost one, which is also the narrowest one when children are single terms. A
/// candidate that does not sort strictly after the previously emitted span is dropped,
/// keeping the output ordered and free of duplicates when children have variable widths.
pub struct NearOrdered<I> {
    conjunction: Conjunction<I>,
    slop: u32,
    collect_payloads: bool,
    /// Payloads of the child spans forming the current match.
    payloads: Vec<Bytes>,
    state: SpanState,
    /// Upper-bound estimate: the estimate of the cheapest child.
    num_estimated: usize,
}

impl<I> NearOrdered<I>
where
    I: SpanIterator,
{
    /// Creates an ordered near iterator over `children` in query order.
    ///
    /// Payload collection is enabled by default, see [`NearOrdered::collect_payloads`].
    /// With no children the iterator is empty, with a single child it yields that child's spans.
    pub fn new(children: Vec<I>, slop: u32) -> Self {
        let num_estimated = cost::min_cost(&children);
        Self {
            conjunction: Conjunction::new(children),
            slop,
            collect_payloads: true,
            payloads: Vec::new(),
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

    /// Advance children after the first so that each starts at or after the end of its
    /// predecessor, all within `doc_id`.
    ///
    /// Returns `false` when a child has no suitable span left in the document.
    fn stretch_to_order(&mut self, doc_id: DocId) -> Result<bool, SpanIteratorError> {
        for idx in 1..self.conjunction.len() {
            let prev_end = self.conjunction.span(idx - 1).end;
            let mut span = self.conjunction.span(idx);
            while span.doc_id == doc_id && span.start < prev_end {
                match self.conjunction.advance(idx)? {
                    Some(next) => span = next,
                    None => return Ok(false),
                }
            }
            if span.doc_id != doc_id {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Sum of the gaps between consecutive child spans. Children must be stretched.
    fn match_slop(&self) -> u64 {
        self.conjunction
            .spans()
            .windows(2)
            .map(|pair| u64::from(pair[1].start - pair[0].end))
            .sum()
    }

    /// Search `doc_id` for the next match, starting from the first child's current span.
    fn match_in_doc(
        &mut self,
        doc_id: DocId,
        last: Option<Span>,
    ) -> Result<Option<Span>, SpanIteratorError> {
        loop {
            if !self.stretch_to_order(doc_id)? {
                return Ok(None);
            }

            let spans = self.conjunction.spans();
            let (first, last_child) = (spans[0], spans[spans.len() - 1]);
            let candidate = Span::new(doc_id, first.start, last_child.end);
            let fits = self.match_slop() <= u64::from(self.slop);
            if fits && last.is_none_or(|last| last < candidate) {
                return Ok(Some(candidate));
            }

            match self.conjunction.advance(0)? {
                Some(span) if span.doc_id == doc_id => {}
                _ => return Ok(None),
            }
        }
    }

    /// Find the next match, starting from the aligned document `doc_id`.
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

impl<I> SpanIterator for NearOrdered<I>
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
            // The first child still sits on the start of the previous match.
            let current = self.state.doc_id()?;
            match self.conjunction.advance(0)? {
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
