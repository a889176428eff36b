/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Positional range filter.

use bytes::Bytes;

use crate::{
    DocId, Position, SkipPlan, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanState,
};

/// Which end of a span is tested against the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RangeAnchor {
    /// The span must start inside the range.
    #[default]
    Start,
    /// The span must end inside the range.
    End,
}

/// Yields the spans of its child whose start (or end, see [`RangeAnchor`]) lies in
/// `[lo, hi]`, both bounds inclusive.
///
/// Spans of a document come in start order, so once one starts past `hi` no later span of
/// that document can qualify and the child is moved straight to the next document.
pub struct PositionRange<I> {
    child: I,
    lo: Position,
    hi: Position,
    anchor: RangeAnchor,
    state: SpanState,
}

impl<I> PositionRange<I>
where
    I: SpanIterator,
{
    /// Keep the spans of `child` starting in `[lo, hi]`. With `lo > hi` nothing matches.
    pub const fn new(child: I, lo: Position, hi: Position) -> Self {
        Self::with_anchor(child, lo, hi, RangeAnchor::Start)
    }

    /// Keep the spans of `child` ending at or before `end`, i.e. found within the first
    /// `end` positions of a document.
    pub const fn first(child: I, end: Position) -> Self {
        Self::with_anchor(child, 0, end, RangeAnchor::End)
    }

    pub const fn with_anchor(child: I, lo: Position, hi: Position, anchor: RangeAnchor) -> Self {
        Self {
            child,
            lo,
            hi,
            anchor,
            state: SpanState::Unstarted,
        }
    }

    #[inline(always)]
    pub const fn bounds(&self) -> (Position, Position) {
        (self.lo, self.hi)
    }

    #[inline(always)]
    pub const fn anchor(&self) -> RangeAnchor {
        self.anchor
    }

    fn filter(&mut self, mut span: Option<Span>) -> Result<Option<Span>, SpanIteratorError> {
        if self.lo > self.hi {
            span = None;
        }
        while let Some(current) = span {
            let anchor = match self.anchor {
                RangeAnchor::Start => current.start,
                RangeAnchor::End => current.end,
            };
            if (self.lo..=self.hi).contains(&anchor) {
                self.state = SpanState::Positioned(current);
                return Ok(Some(current));
            }

            span = if current.start > self.hi {
                match current.doc_id.checked_add(1) {
                    Some(next_doc) => self.child.skip_to(next_doc)?.map(|outcome| outcome.span()),
                    None => None,
                }
            } else {
                self.child.read()?
            };
        }
        self.state = SpanState::Exhausted;
        Ok(None)
    }
}

impl<I> SpanIterator for PositionRange<I>
where
    I: SpanIterator,
{
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        if !self.state.plan_read()? {
            return Ok(None);
        }
        let span = self.child.read()?;
        self.filter(span)
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        let span = match self.state.plan_skip(doc_id)? {
            SkipPlan::Exhausted => return Ok(None),
            SkipPlan::Advance => self.read()?,
            SkipPlan::Seek => {
                let landed = self.child.skip_to(doc_id)?.map(|outcome| outcome.span());
                self.filter(landed)?
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
        self.child.payload()
    }

    #[inline(always)]
    fn num_estimated(&self) -> usize {
        self.child.num_estimated()
    }

    fn close(&mut self) {
        if self.state == SpanState::Closed {
            return;
        }
        self.state = SpanState::Closed;
        self.child.close();
    }
}
