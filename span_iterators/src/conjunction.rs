/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Document alignment shared by the near iterators.
//!
//! All children are moved to a common document with a zipper algorithm:
//!
//! 1. The target is the largest document any child sits in.
//! 2. Every child behind the target is moved with `skip_to(target)`, cheapest child first.
//! 3. If a child lands ahead of the target, that document becomes the new target and the
//!    round restarts.
//! 4. Once all children agree, the caller searches positions inside that document.
//! 5. As soon as any child is exhausted, so is the conjunction.

use bytes::Bytes;

use crate::{DocId, Span, SpanIterator, SpanIteratorError, cost};

/// Result of one alignment round.
enum AgreeResult {
    /// All children sit in the target document.
    Agreed,
    /// A child landed ahead of the target; contains the new target to try.
    Ahead(DocId),
    /// A child is exhausted.
    Eof,
}

pub(crate) struct Conjunction<I> {
    /// Children in query order.
    children: Vec<I>,
    /// `spans[i]` is the current span of `children[i]`. Meaningful once `started`.
    spans: Vec<Span>,
    /// First spans of the children positioned so far while starting. A child that failed
    /// keeps its `None` and is tried again by the next call to [`Conjunction::start`].
    first: Vec<Option<Span>>,
    /// Child indices, cheapest first. The order used to align documents.
    skip_order: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl<I> Conjunction<I>
where
    I: SpanIterator,
{
    pub(crate) fn new(children: Vec<I>) -> Self {
        let skip_order = cost::driving_order(&children);
        let exhausted = children.is_empty();
        Self {
            spans: Vec::with_capacity(children.len()),
            first: vec![None; children.len()],
            children,
            skip_order,
            started: false,
            exhausted,
        }
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.children.len()
    }

    #[inline(always)]
    pub(crate) fn span(&self, idx: usize) -> Span {
        self.spans[idx]
    }

    #[inline(always)]
    pub(crate) fn spans(&self) -> &[Span] {
        &self.spans
    }

    #[inline(always)]
    pub(crate) const fn is_started(&self) -> bool {
        self.started
    }

    /// Position every child for the first time, at its first span or at its first span in a
    /// document `>= target`, then align them.
    ///
    /// The conjunction only counts as started once every child answered. After an error the
    /// children already positioned keep their span and the next call resumes with the others.
    pub(crate) fn start(&mut self, target: Option<DocId>) -> Result<Option<DocId>, SpanIteratorError> {
        debug_assert!(!self.started);
        if self.exhausted {
            self.started = true;
            return Ok(None);
        }

        for &idx in &self.skip_order {
            if self.first[idx].is_some() {
                continue;
            }
            let child = &mut self.children[idx];
            let span = match target {
                Some(target) => child.skip_to(target)?.map(|outcome| outcome.span()),
                None => child.read()?,
            };
            match span {
                Some(span) => self.first[idx] = Some(span),
                None => {
                    self.started = true;
                    self.exhausted = true;
                    return Ok(None);
                }
            }
        }
        self.started = true;
        self.spans = std::mem::take(&mut self.first).into_iter().flatten().collect();
        self.align()
    }

    /// Move child `idx` to its next span.
    ///
    /// Returns `None`, and marks the conjunction exhausted, when the child has no more spans.
    pub(crate) fn advance(&mut self, idx: usize) -> Result<Option<Span>, SpanIteratorError> {
        match self.children[idx].read()? {
            Some(span) => {
                self.spans[idx] = span;
                Ok(Some(span))
            }
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }

    /// Move every child sitting in a document before `target` to `target` or later.
    /// Children already at `target` or beyond are left alone.
    pub(crate) fn skip_lagging(&mut self, target: DocId) -> Result<(), SpanIteratorError> {
        for &idx in &self.skip_order {
            if self.spans[idx].doc_id >= target {
                continue;
            }
            match self.children[idx].skip_to(target)? {
                Some(outcome) => self.spans[idx] = outcome.span(),
                None => {
                    self.exhausted = true;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Loop until all children sit in the same document, or one of them is exhausted.
    pub(crate) fn align(&mut self) -> Result<Option<DocId>, SpanIteratorError> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(mut target) = self.spans.iter().map(|span| span.doc_id).max() else {
            self.exhausted = true;
            return Ok(None);
        };
        loop {
            match self.agree_on_doc_id(target)? {
                AgreeResult::Agreed => return Ok(Some(target)),
                AgreeResult::Ahead(new_target) => target = new_target,
                AgreeResult::Eof => return Ok(None),
            }
        }
    }

    fn agree_on_doc_id(&mut self, target: DocId) -> Result<AgreeResult, SpanIteratorError> {
        for &idx in &self.skip_order {
            let current = self.spans[idx].doc_id;
            if current == target {
                continue;
            }
            if current > target {
                return Ok(AgreeResult::Ahead(current));
            }

            match self.children[idx].skip_to(target)? {
                None => {
                    self.exhausted = true;
                    return Ok(AgreeResult::Eof);
                }
                Some(outcome) => {
                    let span = outcome.span();
                    self.spans[idx] = span;
                    if span.doc_id > target {
                        return Ok(AgreeResult::Ahead(span.doc_id));
                    }
                }
            }
        }
        Ok(AgreeResult::Agreed)
    }

    /// Append the payloads of every child's current span to `out`.
    pub(crate) fn collect_payloads(&self, out: &mut Vec<Bytes>) -> Result<(), SpanIteratorError> {
        for child in &self.children {
            if let Some(payloads) = child.payload()? {
                out.extend(payloads.iter().cloned());
            }
        }
        Ok(())
    }

    pub(crate) fn close(&mut self) {
        self.exhausted = true;
        self.spans = Vec::new();
        self.first = Vec::new();
        self.children.iter_mut().for_each(SpanIterator::close);
    }
}
