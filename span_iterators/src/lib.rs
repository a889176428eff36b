/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Positional span iterators.
//!
//! Every iterator in this crate implements [`SpanIterator`]: a forward-only cursor over
//! [`Span`]s (document, start position, end position) ordered by document, then start,
//! then end. Leaves read from postings ([`term::TermSpans`]) or from precomputed lists
//! ([`span_list::SpanList`]); combinators ([`near_ordered::NearOrdered`],
//! [`near_unordered::NearUnordered`], [`or::Or`], [`and_not::AndNot`],
//! [`position_range::PositionRange`]) own their children and implement the same
//! contract, so trees can be nested arbitrarily.

use bytes::Bytes;
use thiserror::Error;

pub mod and_not;
mod conjunction;
pub mod cost;
pub mod driver;
pub mod empty;
pub mod near_ordered;
pub mod near_unordered;
pub mod or;
pub mod position_range;
pub mod postings;
pub mod profile;
pub mod span_list;
mod state;
pub mod term;
pub mod util;

pub use and_not::{AndNot, Exclusion};
pub use driver::{DriveSummary, Driver, DriverConfig, drain};
pub use empty::Empty;
pub use near_ordered::NearOrdered;
pub use near_unordered::NearUnordered;
pub use or::Or;
pub use position_range::{PositionRange, RangeAnchor};
pub use postings::{MemoryPostings, PostingsReader};
pub use profile::{Profile, ProfileCounters};
pub use span_list::SpanList;
pub use state::{SkipPlan, SpanState};
pub use term::TermSpans;

/// Identifier of a document in the index.
pub type DocId = u64;

/// A token position inside a document.
pub type Position = u32;

/// One occurrence of a matched query construct inside one document.
///
/// `end` is exclusive, so a single term at position `p` is the span `p..p + 1`.
/// The derived ordering is the iteration order every [`SpanIterator`] must respect:
/// by document, then start, then end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub doc_id: DocId,
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[inline(always)]
    pub const fn new(doc_id: DocId, start: Position, end: Position) -> Self {
        debug_assert!(start <= end);
        Self { doc_id, start, end }
    }

    /// Number of positions covered by the span.
    #[inline(always)]
    pub const fn len(&self) -> Position {
        self.end - self.start
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The outcome of [`SpanIterator::skip_to`].
pub enum SkipToOutcome {
    /// The iterator landed on a span in the requested document.
    Found(Span),

    /// The requested document has no span, the iterator landed on a span in a later document.
    NotFound(Span),
}

impl SkipToOutcome {
    /// Classify `span` against the `target` document of a skip.
    #[inline(always)]
    pub fn new(target: DocId, span: Span) -> Self {
        if span.doc_id == target {
            Self::Found(span)
        } else {
            Self::NotFound(span)
        }
    }

    /// The span the iterator landed on.
    #[inline(always)]
    pub const fn span(&self) -> Span {
        match self {
            Self::Found(span) | Self::NotFound(span) => *span,
        }
    }
}

#[derive(Debug, Error)]
/// Failures reported by a [`SpanIterator`].
pub enum SpanIteratorError {
    /// A positional accessor was called while the iterator is not on a span.
    #[error("iterator is not positioned on a span")]
    NotPositioned,
    /// `skip_to` was asked to move behind the current document.
    #[error("cannot skip from document {current} back to document {target}")]
    InvalidSkipTarget { current: DocId, target: DocId },
    /// The iterator was used after [`SpanIterator::close`].
    #[error("iterator is closed")]
    Closed,
    /// The postings layer failed to read.
    #[error("failed to read from postings")]
    UnderlyingReadFailure(#[from] std::io::Error),
    /// The driver ran out of its time budget.
    #[error("reached time limit")]
    TimedOut,
}

/// A forward-only cursor over positional matches.
///
/// # Policies
///
/// - Reading an exhausted iterator is a no-op returning `Ok(None)`.
/// - [`SpanIterator::skip_to`] moves to the first span *beyond the current one* whose
///   document is at least the target. Asking for a document behind the current one fails
///   with [`SpanIteratorError::InvalidSkipTarget`]; asking for the current document is
///   equivalent to [`SpanIterator::read`].
/// - After [`SpanIterator::close`] every operation fails with [`SpanIteratorError::Closed`],
///   except [`SpanIterator::num_estimated`] which stays callable in any state.
///
/// [`SpanState::plan_read`] and [`SpanState::plan_skip`] implement these policies and should
/// be used by implementors, including externally supplied iterators.
pub trait SpanIterator {
    /// Advance to the next span.
    ///
    /// Returns `Ok(None)` once no more spans exist; the iterator is then [`SpanState::Exhausted`].
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError>;

    /// Advance to the first span beyond the current one whose document is `>= doc_id`.
    ///
    /// Returns `Ok(None)` if there is no such span; the iterator is then [`SpanState::Exhausted`].
    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError>;

    /// The current state of the iterator.
    fn state(&self) -> SpanState;

    /// The payloads attached to the current span, `None` if there are none.
    ///
    /// Only valid while [`SpanState::Positioned`].
    fn payload(&self) -> Result<Option<&[Bytes]>, SpanIteratorError>;

    /// Returns an upper-bound estimation for the number of spans the iterator is going to yield.
    ///
    /// Side-effect free and callable in any state.
    fn num_estimated(&self) -> usize;

    /// Release every resource held by the iterator, including owned children.
    ///
    /// Idempotent, and safe to call from any state.
    fn close(&mut self);

    /**************** provided ****************/

    /// The span the iterator is positioned on.
    #[inline]
    fn current(&self) -> Result<Span, SpanIteratorError> {
        self.state().span()
    }

    /// The current document. Also available right after a document-level move,
    /// before the first position of that document was pulled.
    #[inline]
    fn doc_id(&self) -> Result<DocId, SpanIteratorError> {
        self.state().doc_id()
    }

    #[inline]
    fn start(&self) -> Result<Position, SpanIteratorError> {
        Ok(self.current()?.start)
    }

    #[inline]
    fn end(&self) -> Result<Position, SpanIteratorError> {
        Ok(self.current()?.end)
    }

    /// Whether the current span carries at least one payload.
    #[inline]
    fn is_payload_available(&self) -> Result<bool, SpanIteratorError> {
        Ok(self.payload()?.is_some_and(|payloads| !payloads.is_empty()))
    }

    /// Returns `true` once the iterator can't yield more spans.
    #[inline]
    fn at_eof(&self) -> bool {
        matches!(self.state(), SpanState::Exhausted)
    }
}

impl<I: SpanIterator + ?Sized> SpanIterator for Box<I> {
    #[inline(always)]
    fn read(&mut self) -> Result<Option<Span>, SpanIteratorError> {
        (**self).read()
    }

    #[inline(always)]
    fn skip_to(&mut self, doc_id: DocId) -> Result<Option<SkipToOutcome>, SpanIteratorError> {
        (**self).skip_to(doc_id)
    }

    #[inline(always)]
    fn state(&self) -> SpanState {
        (**self).state()
    }

    #[inline(always)]
    fn payload(&self) -> Result<Option<&[Bytes]>, SpanIteratorError> {
        (**self).payload()
    }

    #[inline(always)]
    fn num_estimated(&self) -> usize {
        (**self).num_estimated()
    }

    #[inline(always)]
    fn close(&mut self) {
        (**self).close()
    }
}

/// A type-erased iterator, used to build trees that mix iterator variants,
/// including implementations supplied from outside this crate.
pub type BoxedSpans<'a> = Box<dyn SpanIterator + 'a>;
