/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! A specialized min-heap for the [`crate::Or`] iterator.
//!
//! [`SpanMinHeap`] stores `(span, child_index)` pairs ordered by span, then child index,
//! and provides the in-place [`SpanMinHeap::replace_root`] that Rust's
//! [`std::collections::BinaryHeap`] lacks: advancing the child at the root costs a single
//! sift-down instead of a pop followed by a push.

use crate::Span;

/// A min-heap of `(span, child_index)` pairs.
///
/// Ties between equal spans are broken by the child index, which keeps the merge order
/// of the union deterministic.
#[derive(Debug, Clone, Default)]
pub struct SpanMinHeap {
    data: Vec<(Span, usize)>,
}

impl SpanMinHeap {
    #[must_use]
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Returns the minimum entry without removing it.
    #[inline]
    pub fn peek(&self) -> Option<(Span, usize)> {
        self.data.first().copied()
    }

    /// Pushes an entry onto the heap. O(log n).
    pub fn push(&mut self, span: Span, child_idx: usize) {
        self.data.push((span, child_idx));
        self.sift_up(self.data.len() - 1);
    }

    /// Removes and returns the minimum entry. O(log n).
    pub fn pop(&mut self) -> Option<(Span, usize)> {
        if self.data.is_empty() {
            return None;
        }

        let result = self.data.swap_remove(0);
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        Some(result)
    }

    /// Replaces the root entry in-place and restores the heap property with a single
    /// sift-down.
    ///
    /// # Panics
    ///
    /// Panics if the heap is empty.
    pub fn replace_root(&mut self, span: Span, child_idx: usize) {
        debug_assert!(!self.data.is_empty(), "cannot replace root of empty heap");
        self.data[0] = (span, child_idx);
        self.sift_down(0);
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.data[idx] >= self.data[parent] {
                break;
            }
            self.data.swap(idx, parent);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        loop {
            let left = 2 * idx + 1;
            let right = 2 * idx + 2;
            let mut smallest = idx;

            if left < self.data.len() && self.data[left] < self.data[smallest] {
                smallest = left;
            }
            if right < self.data.len() && self.data[right] < self.data[smallest] {
                smallest = right;
            }

            if smallest == idx {
                break;
            }

            self.data.swap(idx, smallest);
            idx = smallest;
        }
    }
}
