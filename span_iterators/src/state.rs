/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use crate::{DocId, Span, SpanIteratorError};

/// Where a [`crate::SpanIterator`] currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpanState {
    /// Nothing was read yet.
    #[default]
    Unstarted,
    /// On a span.
    Positioned(Span),
    /// Moved to a document, its first position was not pulled yet.
    AtDocument(DocId),
    /// No more spans.
    Exhausted,
    /// [`crate::SpanIterator::close`] was called. Terminal.
    Closed,
}

/// What a `skip_to` call has to do, as decided by [`SpanState::plan_skip`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipPlan {
    /// The iterator is exhausted, answer `Ok(None)`.
    Exhausted,
    /// The target is the current document: move to the next span, like `read`.
    Advance,
    /// The target is ahead: seek to it.
    Seek,
}

impl SpanState {
    /// The current span, if positioned.
    #[inline]
    pub fn span(self) -> Result<Span, SpanIteratorError> {
        match self {
            Self::Positioned(span) => Ok(span),
            Self::Closed => Err(SpanIteratorError::Closed),
            _ => Err(SpanIteratorError::NotPositioned),
        }
    }

    /// The current document, if positioned or right after a document-level move.
    #[inline]
    pub fn doc_id(self) -> Result<DocId, SpanIteratorError> {
        match self {
            Self::Positioned(span) => Ok(span.doc_id),
            Self::AtDocument(doc_id) => Ok(doc_id),
            Self::Closed => Err(SpanIteratorError::Closed),
            _ => Err(SpanIteratorError::NotPositioned),
        }
    }

    #[inline]
    pub const fn is_positioned(self) -> bool {
        matches!(self, Self::Positioned(_))
    }

    /// Fails with [`SpanIteratorError::Closed`] after close, [`SpanIteratorError::NotPositioned`]
    /// when not on a span. Used by `payload` implementations.
    #[inline]
    pub fn ensure_positioned(self) -> Result<(), SpanIteratorError> {
        self.span().map(|_| ())
    }

    /// Returns whether a `read` call should go ahead.
    ///
    /// `Ok(false)` means the iterator is exhausted and `read` must answer `Ok(None)`.
    #[inline]
    pub fn plan_read(self) -> Result<bool, SpanIteratorError> {
        match self {
            Self::Closed => Err(SpanIteratorError::Closed),
            Self::Exhausted => Ok(false),
            _ => Ok(true),
        }
    }

    /// Decide what a `skip_to(target)` call has to do.
    pub fn plan_skip(self, target: DocId) -> Result<SkipPlan, SpanIteratorError> {
        match self {
            Self::Closed => Err(SpanIteratorError::Closed),
            Self::Exhausted => Ok(SkipPlan::Exhausted),
            Self::Unstarted => Ok(SkipPlan::Seek),
            Self::AtDocument(current) => {
                if target < current {
                    Err(SpanIteratorError::InvalidSkipTarget { current, target })
                } else {
                    Ok(SkipPlan::Seek)
                }
            }
            Self::Positioned(span) => {
                let current = span.doc_id;
                if target < current {
                    Err(SpanIteratorError::InvalidSkipTarget { current, target })
                } else if target == current {
                    Ok(SkipPlan::Advance)
                } else {
                    Ok(SkipPlan::Seek)
                }
            }
        }
    }
}
