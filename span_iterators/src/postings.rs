/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! The postings interface consumed by [`crate::TermSpans`], and an in-memory implementation.

use std::{collections::BTreeMap, io};

use bytes::Bytes;

use crate::{DocId, Position};

/// Read access to the postings of one term in one field.
///
/// This is the only point where span iteration touches storage. Decoding, caching and
/// retry policies live behind it.
pub trait PostingsReader {
    /// Move to the next document containing the term, `None` past the last one.
    fn next_doc(&mut self) -> io::Result<Option<DocId>>;

    /// Move to the first document `>= target`, `None` if there is none.
    ///
    /// Callers only ask for targets after the current document, which lets implementations
    /// use their skip structures.
    fn advance(&mut self, target: DocId) -> io::Result<Option<DocId>>;

    /// Number of positions of the term in the current document.
    fn freq(&self) -> u32;

    /// The next position of the term in the current document.
    ///
    /// Called at most [`PostingsReader::freq`] times per document, positions come back in
    /// increasing order.
    fn next_position(&mut self) -> io::Result<Position>;

    /// The payload stored at the position last returned by [`PostingsReader::next_position`].
    fn payload(&self) -> Option<Bytes>;

    /// Upper bound of the number of positions left to read.
    fn cost(&self) -> usize;

    /// Release the underlying resources.
    fn close(&mut self) {}
}

#[derive(Debug, Clone)]
struct PostingsDoc {
    doc_id: DocId,
    positions: Vec<(Position, Option<Bytes>)>,
}

/// Postings held in memory.
///
/// [`PostingsReader::advance`] binary-searches the remaining documents, standing in for the
/// skip lists of an on-disk postings format.
#[derive(Debug, Clone, Default)]
pub struct MemoryPostings {
    docs: Vec<PostingsDoc>,
    /// Index of the current document in `docs`, `None` before the first move.
    /// Equal to `docs.len()` once past the last document.
    doc_idx: Option<usize>,
    /// Number of positions already read in the current document.
    pos_idx: usize,
    num_positions: usize,
}

impl MemoryPostings {
    /// Builds postings from `(document, position)` pairs, in any order. Duplicates collapse.
    pub fn new(entries: impl IntoIterator<Item = (DocId, Position)>) -> Self {
        Self::with_payloads(entries.into_iter().map(|(doc_id, pos)| (doc_id, pos, None)))
    }

    /// Builds postings from `(document, position, payload)` triples, in any order.
    /// For duplicate positions the last payload wins.
    pub fn with_payloads(
        entries: impl IntoIterator<Item = (DocId, Position, Option<Bytes>)>,
    ) -> Self {
        let sorted: BTreeMap<(DocId, Position), Option<Bytes>> = entries
            .into_iter()
            .map(|(doc_id, pos, payload)| ((doc_id, pos), payload))
            .collect();
        let num_positions = sorted.len();

        let mut docs: Vec<PostingsDoc> = Vec::new();
        for ((doc_id, pos), payload) in sorted {
            match docs.last_mut() {
                Some(doc) if doc.doc_id == doc_id => doc.positions.push((pos, payload)),
                _ => docs.push(PostingsDoc {
                    doc_id,
                    positions: vec![(pos, payload)],
                }),
            }
        }

        Self {
            docs,
            doc_idx: None,
            pos_idx: 0,
            num_positions,
        }
    }

    /// Number of documents containing the term.
    pub fn num_docs(&self) -> usize {
        self.docs.len()
    }

    fn current_doc(&self) -> Option<&PostingsDoc> {
        self.doc_idx.and_then(|idx| self.docs.get(idx))
    }

    fn move_to(&mut self, idx: usize) -> Option<DocId> {
        self.doc_idx = Some(idx.min(self.docs.len()));
        self.pos_idx = 0;
        self.current_doc().map(|doc| doc.doc_id)
    }

    fn next_doc_idx(&self) -> usize {
        self.doc_idx.map_or(0, |idx| idx + 1)
    }
}

impl PostingsReader for MemoryPostings {
    fn next_doc(&mut self) -> io::Result<Option<DocId>> {
        let idx = self.next_doc_idx();
        Ok(self.move_to(idx))
    }

    fn advance(&mut self, target: DocId) -> io::Result<Option<DocId>> {
        let from = self.next_doc_idx().min(self.docs.len());
        let idx = from + self.docs[from..].partition_point(|doc| doc.doc_id < target);
        Ok(self.move_to(idx))
    }

    fn freq(&self) -> u32 {
        self.current_doc()
            .map_or(0, |doc| saturating_freq(doc.positions.len()))
    }

    fn next_position(&mut self) -> io::Result<Position> {
        let pos_idx = self.pos_idx;
        let pos = self
            .current_doc()
            .and_then(|doc| doc.positions.get(pos_idx))
            .map(|(pos, _)| *pos)
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "read past the last position of the document",
                )
            })?;
        self.pos_idx += 1;
        Ok(pos)
    }

    fn payload(&self) -> Option<Bytes> {
        let idx = self.pos_idx.checked_sub(1)?;
        self.current_doc()?.positions.get(idx)?.1.clone()
    }

    fn cost(&self) -> usize {
        self.num_positions
    }

    fn close(&mut self) {
        self.docs = Vec::new();
        self.doc_idx = Some(0);
        self.pos_idx = 0;
    }
}

/// Position count of a document, clamped to what [`PostingsReader::freq`] can report.
fn saturating_freq(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
