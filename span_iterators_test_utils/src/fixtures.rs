/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use span_iterators::{DocId, MemoryPostings, Position, Span, SpanList, TermSpans};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Build spans from `(doc_id, start, end)` triples.
pub fn spans(triples: &[(DocId, Position, Position)]) -> Vec<Span> {
    triples
        .iter()
        .map(|&(doc_id, start, end)| Span::new(doc_id, start, end))
        .collect()
}

/// A [`SpanList`] over `(doc_id, start, end)` triples, which must be sorted and unique.
pub fn span_list(triples: &[(DocId, Position, Position)]) -> SpanList {
    SpanList::new(spans(triples))
}

/// A term leaf reading in-memory postings built from `(doc_id, position)` occurrences.
pub fn term_spans(occurrences: &[(DocId, Position)]) -> TermSpans<MemoryPostings> {
    TermSpans::new(MemoryPostings::new(occurrences.iter().copied()))
}

/// Install a global subscriber printing traces to the test output.
///
/// Honours `RUST_LOG`, defaulting to `warn`. Calling it more than once is harmless.
pub fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
