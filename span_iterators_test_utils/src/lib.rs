/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Test utilities for span_iterators.
//!
//! Provides a scriptable mock leaf, fixture builders for real leaves, and a tracing
//! subscriber for test runs.

pub mod fixtures;
pub mod mock_spans;

pub use fixtures::{init_tracing, span_list, spans, term_spans};
pub use mock_spans::{MockData, MockSpans, MockSpansError};
