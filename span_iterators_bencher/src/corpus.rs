/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Synthetic postings shared by the benchers.

use rand::{Rng as _, SeedableRng as _, rngs::StdRng};
use span_iterators::{DocId, MemoryPostings, Position, TermSpans};

/// Number of documents in the synthetic corpus.
pub const NUM_DOCS: DocId = 20_000;
/// Number of token positions per document.
pub const DOC_LEN: Position = 200;

/// Occurrences of a term present in roughly `doc_ratio` of the documents, `per_doc` times
/// in each. Seeded, so every call with the same arguments returns the same postings.
pub fn occurrences(seed: u64, doc_ratio: f64, per_doc: u32) -> Vec<(DocId, Position)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut occurrences = Vec::new();
    for doc_id in 1..=NUM_DOCS {
        if rng.random::<f64>() >= doc_ratio {
            continue;
        }
        for _ in 0..per_doc {
            occurrences.push((doc_id, rng.random_range(0..DOC_LEN)));
        }
    }
    occurrences
}

/// A phrase `words` long planted at a random position of roughly `doc_ratio` of the
/// documents, one [`Vec`] of occurrences per word.
pub fn phrase(seed: u64, doc_ratio: f64, words: usize) -> Vec<Vec<(DocId, Position)>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut terms = vec![Vec::new(); words];
    for doc_id in 1..=NUM_DOCS {
        if rng.random::<f64>() >= doc_ratio {
            continue;
        }
        let start = rng.random_range(0..DOC_LEN - words as Position);
        for (offset, term) in terms.iter_mut().enumerate() {
            term.push((doc_id, start + offset as Position));
        }
    }
    terms
}

pub fn term(occurrences: &[(DocId, Position)]) -> TermSpans<MemoryPostings> {
    TermSpans::new(MemoryPostings::new(occurrences.iter().copied()))
}
