/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Leaf iterator over the postings of a single term.

use bytes::Bytes;

use crate::{
    DocId, PostingsReader, SkipPlan, SkipToOutcome, Span, SpanIterator, SpanIteratorError,
    SpanState,
};

/// Yields one span `pos..pos + 1` per occurrence of a term.
///
/// Document moves go through [`PostingsReader::advance`], so skipping never scans the
/// postings of the skipped documents. Between a document move and the first position pull
/// the iterator reports [`SpanState::AtDocument`]; this is observable when reading that
/// position fails.
pub struct TermSpans<P> {
    postings: P,
    /// Positions of the current document, as reported by the postings.
    freq: u32,
    /// Positions of the current document already pulled.
    count: u32,
    /// Payload of the current position, zero or one entry.
    payload: Vec<Bytes>,
    state: SpanState,
}

impl<P> TermSpans<P>
where
    P: PostingsReader,
{
    pub fn new(postings: P) -> Self {
        Self {
            postings,
            freq: 0,
            count: 0,
            payload: Vec::with_capacity(1),
            state: SpanState::Unstarted,
        }
    }

    /// Shared access to the underlying postings.
    pub const fn postings(&self) -> &P {
        &self.postings
    }

    /// Enter `doc_id` (or exhaustion) after a document-level move, then pull its first position.
    fn enter_document(&mut self, doc_id: Option<DocId>) -> Result<Option<Span>, SpanIteratorError> {
        let Some(doc_id) = doc_id else {
            self.state = SpanState::Exhausted;
            return Ok(None);
        };
        self.state = SpanState::AtDocument(doc_id);
        self.freq = self.postings.freq();
        self.count = 0;
        self.next_position(doc_id)
    }

    /// Pull the next position of `doc_id`, moving on to later documents when it has none left.
    fn next_position(&mut self, mut doc_id: DocId) -> Result<Option<Span>, SpanIteratorError> {
        while self.count >= self.freq {
            let Some(next) = self.postings.next_doc()? else {
                self.state = SpanState::Exhausted;
                return Ok(None);
            };
            doc_id = next;
            self.state = SpanState::AtDocument(doc_id);
            self.freq = self.postings.freq();
            self.count = 0;
        }

        let pos = self.postings.next_position()?;
        self.count += 1;
        self.payload.clear();
        self.payload.extend(self.postings.payload());

        let span = Span::new(doc_id, pos, pos.saturating_add(1));
        self.state = SpanState::Positioned(span);
        Ok(Some(span))
    }
}

impl<P> SpanIterator for TermSpans<P>
where
    P: PostingsReader,
{
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        if !self.state.plan_read()? {
            return Ok(None);
        }
        match self.state {
            SpanState::Unstarted => {
                let doc_id = self.postings.next_doc()?;
                self.enter_document(doc_id)
            }
            SpanState::Positioned(Span { doc_id, .. }) | SpanState::AtDocument(doc_id) => {
                self.next_position(doc_id)
            }
            SpanState::Exhausted | SpanState::Closed => Ok(None),
        }
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        let span = match self.state.plan_skip(doc_id)? {
            SkipPlan::Exhausted => return Ok(None),
            SkipPlan::Advance => self.read()?,
            SkipPlan::Seek => match self.state {
                // Already on the requested document, only its positions are missing.
                SpanState::AtDocument(current) if current == doc_id => {
                    self.next_position(current)?
                }
                _ => {
                    let landed = self.postings.advance(doc_id)?;
                    self.enter_document(landed)?
                }
            },
        };
        Ok(span.map(|span| SkipToOutcome::new(doc_id, span)))
    }

    #[inline(always)]
    fn state(&self) -> SpanState {
        self.state
    }

    fn payload(&self) -> Result<Option<&[Bytes]>, SpanIteratorError> {
        self.state.ensure_positioned()?;
        Ok((!self.payload.is_empty()).then_some(self.payload.as_slice()))
    }

    #[inline(always)]
    fn num_estimated(&self) -> usize {
        self.postings.cost()
    }

    fn close(&mut self) {
        if self.state == SpanState::Closed {
            return;
        }
        self.state = SpanState::Closed;
        self.payload = Vec::new();
        self.postings.close();
    }
}
