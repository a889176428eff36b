/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use std::time::{Duration, Instant};

use crate::SpanIteratorError;

/// Amortized deadline checks for the [`crate::Driver`] loop.
///
/// Reading the system clock on every pulled span is expensive, so the clock is only
/// consulted once every `limit` calls to [`TimeoutContext::check_timeout`].
/// Iterators never hold one of these: a time budget is the driver's business.
#[derive(Debug)]
pub struct TimeoutContext {
    deadline: Instant,
    /// Calls since the last clock check.
    counter: u32,
    limit: u32,
}

impl TimeoutContext {
    /// Creates a context that expires `duration` from now and reads the clock every
    /// `limit` checks. A `limit` of 0 is treated as 1.
    #[inline(always)]
    pub fn new(duration: Duration, limit: u32) -> Self {
        Self {
            deadline: Instant::now() + duration,
            counter: 0,
            limit: limit.max(1),
        }
    }

    /// Returns [`SpanIteratorError::TimedOut`] if the deadline has been reached.
    #[inline(always)]
    pub fn check_timeout(&mut self) -> Result<(), SpanIteratorError> {
        self.counter += 1;
        if self.counter >= self.limit {
            self.counter = 0;
            if Instant::now() >= self.deadline {
                return Err(SpanIteratorError::TimedOut);
            }
        }

        Ok(())
    }

    #[inline(always)]
    pub const fn reset_counter(&mut self) {
        self.counter = 0;
    }
}
