/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Exclusion iterator: spans of one child that are not matched by another.

use bytes::Bytes;

use crate::{
    DocId, Position, SkipPlan, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanState,
};

/// What counts as a clash between an include span and an exclude span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Drop every include span of a document in which the exclude child has any span.
    Document,
    /// Drop include spans overlapping an exclude span of the same document.
    ///
    /// The include span is first widened by `pre` positions before its start and `post`
    /// positions after its end. Spans are half-open, so touching spans do not overlap.
    Positional { pre: Position, post: Position },
}

impl Exclusion {
    /// Positional exclusion without widening: plain overlap.
    pub const fn overlap() -> Self {
        Self::Positional { pre: 0, post: 0 }
    }

    /// Positional exclusion with the include span widened by `pre` and `post` positions.
    pub const fn within(pre: Position, post: Position) -> Self {
        Self::Positional { pre, post }
    }
}

impl Default for Exclusion {
    fn default() -> Self {
        Self::overlap()
    }
}

/// Yields the spans of `include` that do not clash with any span of `exclude`.
///
/// Spans are never modified, only dropped, so the estimate is the one of `include`.
///
/// Both children are walked forward once: the exclude child is only moved to the document
/// of the include span under test, and within a document exclude spans ending before the
/// widened include span are passed over, since later include spans start no earlier.
pub struct AndNot<I, E> {
    include: I,
    exclude: E,
    exclusion: Exclusion,
    /// Last span read from `exclude`, `None` before the first move.
    exclude_span: Option<Span>,
    exclude_exhausted: bool,
    state: SpanState,
}

impl<I, E> AndNot<I, E>
where
    I: SpanIterator,
    E: SpanIterator,
{
    pub const fn new(include: I, exclude: E, exclusion: Exclusion) -> Self {
        Self {
            include,
            exclude,
            exclusion,
            exclude_span: None,
            exclude_exhausted: false,
            state: SpanState::Unstarted,
        }
    }

    #[inline(always)]
    pub const fn exclusion(&self) -> Exclusion {
        self.exclusion
    }

    /// The current exclude span if it lies in `doc_id`, after moving the exclude child to
    /// that document when it is behind.
    fn exclude_in(&mut self, doc_id: DocId) -> Result<Option<Span>, SpanIteratorError> {
        if self.exclude_exhausted {
            return Ok(None);
        }
        let current = match self.exclude_span {
            Some(span) if span.doc_id >= doc_id => Some(span),
            _ => {
                let landed = self.exclude.skip_to(doc_id)?.map(|outcome| outcome.span());
                self.exclude_moved(landed)
            }
        };
        Ok(current.filter(|span| span.doc_id == doc_id))
    }

    fn exclude_moved(&mut self, span: Option<Span>) -> Option<Span> {
        self.exclude_span = span;
        self.exclude_exhausted = span.is_none();
        span
    }

    fn is_excluded(&mut self, span: Span) -> Result<bool, SpanIteratorError> {
        let Exclusion::Positional { pre, post } = self.exclusion else {
            return Ok(self.exclude_in(span.doc_id)?.is_some());
        };

        let window_start = span.start.saturating_sub(pre);
        let window_end = span.end.saturating_add(post);
        let mut candidate = self.exclude_in(span.doc_id)?;
        while let Some(exclude) = candidate
            && exclude.end <= window_start
        {
            let next = self.exclude.read()?;
            candidate = self
                .exclude_moved(next)
                .filter(|next| next.doc_id == span.doc_id);
        }
        Ok(candidate.is_some_and(|exclude| exclude.start < window_end))
    }

    /// Drop include spans until one survives the exclusion.
    fn filter(&mut self, mut span: Option<Span>) -> Result<Option<Span>, SpanIteratorError> {
        while let Some(current) = span {
            if !self.is_excluded(current)? {
                self.state = SpanState::Positioned(current);
                return Ok(Some(current));
            }
            span = match self.exclusion {
                Exclusion::Document => match current.doc_id.checked_add(1) {
                    Some(next_doc) => self
                        .include
                        .skip_to(next_doc)?
                        .map(|outcome| outcome.span()),
                    None => None,
                },
                Exclusion::Positional { .. } => self.include.read()?,
            };
        }
        self.state = SpanState::Exhausted;
        Ok(None)
    }
}

impl<I, E> SpanIterator for AndNot<I, E>
where
    I: SpanIterator,
    E: SpanIterator,
{
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        if !self.state.plan_read()? {
            return Ok(None);
        }
        let span = self.include.read()?;
        self.filter(span)
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        let span = match self.state.plan_skip(doc_id)? {
            SkipPlan::Exhausted => return Ok(None),
            SkipPlan::Advance => self.read()?,
            SkipPlan::Seek => {
                let landed = self.include.skip_to(doc_id)?.map(|outcome| outcome.span());
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
        self.include.payload()
    }

    #[inline(always)]
    fn num_estimated(&self) -> usize {
        self.include.num_estimated()
    }

    fn close(&mut self) {
        if self.state == SpanState::Closed {
            return;
        }
        self.state = SpanState::Closed;
        self.include.close();
        self.exclude.close();
    }
}
