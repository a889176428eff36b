/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Cost estimation over [`SpanIterator::num_estimated`].
//!
//! These functions are pure: they never move an iterator. Combinators call them once, at
//! construction, to fix their own estimate and the order in which children are aligned on
//! a document. A planner can call [`SpanIterator::num_estimated`] on an assembled tree to
//! order sibling clauses.
//!
//! | iterator | estimate |
//! |---|---|
//! | [`crate::NearOrdered`] | [`min_cost`] of the children |
//! | [`crate::NearUnordered`], [`crate::Or`] | [`sum_cost`] of the children |
//! | [`crate::AndNot`] | the include child |
//! | [`crate::PositionRange`] | the child |

use crate::SpanIterator;

/// The estimate of the cheapest child, 0 when there are none.
///
/// A conjunction can't yield more spans than its rarest child.
pub fn min_cost<I: SpanIterator>(children: &[I]) -> usize {
    children
        .iter()
        .map(SpanIterator::num_estimated)
        .min()
        .unwrap_or(0)
}

/// The saturating sum of the children's estimates.
pub fn sum_cost<I: SpanIterator>(children: &[I]) -> usize {
    children
        .iter()
        .map(SpanIterator::num_estimated)
        .fold(0usize, usize::saturating_add)
}

/// Indices of `children` sorted cheapest first, ties kept in child order.
///
/// The cheapest child drives a document alignment: the others are moved with
/// [`SpanIterator::skip_to`] to the documents it lands on, which keeps the number of
/// scanned postings low.
pub fn driving_order<I: SpanIterator>(children: &[I]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..children.len()).collect();
    order.sort_by_key(|&idx| children[idx].num_estimated());
    tracing::trace!(?order, "chose child driving order");
    order
}
