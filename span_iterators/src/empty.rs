/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Empty iterator implementation

use bytes::Bytes;

use crate::{DocId, SkipPlan, SkipToOutcome, SpanIterator, SpanIteratorError, SpanState};

/// An iterator that yields no spans.
///
/// Stands in for a term that is absent from the index.
#[derive(Debug, Default)]
pub struct Empty {
    state: SpanState,
}

impl SpanIterator for Empty {
    fn read(&mut self) -> Result<Option<crate::Span>, SpanIteratorError> {
        if self.state.plan_read()? {
            self.state = SpanState::Exhausted;
        }
        Ok(None)
    }

    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        if self.state.plan_skip(doc_id)? != SkipPlan::Exhausted {
            self.state = SpanState::Exhausted;
        }
        Ok(None)
    }

    fn state(&self) -> SpanState {
        self.state
    }

    fn payload(&self) -> Result<Option<&[Bytes]>, SpanIteratorError> {
        self.state.ensure_positioned()?;
        Ok(None)
    }

    fn num_estimated(&self) -> usize {
        0
    }

    fn close(&mut self) {
        self.state = SpanState::Closed;
    }
}
