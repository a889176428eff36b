/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use span_iterators::{
    PositionRange, RangeAnchor, SkipToOutcome, Span, SpanIterator, SpanIteratorError, drain,
};
use span_iterators_test_utils::{MockSpans, span_list, spans, term_spans};

#[test]
fn keeps_spans_starting_in_range() {
    let range = PositionRange::new(
        span_list(&[(1, 0, 1), (1, 3, 4), (1, 5, 9), (1, 9, 10), (2, 4, 5)]),
        3,
        5,
    );
    assert_eq!(range.bounds(), (3, 5));
    assert_eq!(range.anchor(), RangeAnchor::Start);
    assert_eq!(
        drain(range).unwrap(),
        spans(&[(1, 3, 4), (1, 5, 9), (2, 4, 5)])
    );
}

#[test]
fn moves_to_next_document_past_the_range() {
    let child = MockSpans::new(spans(&[
        (1, 1, 2),
        (1, 7, 8),
        (1, 8, 9),
        (1, 9, 10),
        (2, 2, 3),
    ]));
    let data = child.data();
    let mut range = PositionRange::new(child, 0, 4);

    assert_eq!(range.read().unwrap(), Some(Span::new(1, 1, 2)));
    assert_eq!(range.read().unwrap(), Some(Span::new(2, 2, 3)));
    assert_eq!(data.read_count(), 2);
    assert_eq!(data.skip_count(), 1);
}

#[test]
fn first_keeps_spans_ending_early() {
    let range = PositionRange::first(
        span_list(&[(1, 0, 2), (1, 3, 5), (2, 2, 4), (2, 4, 6)]),
        4,
    );
    assert_eq!(range.anchor(), RangeAnchor::End);
    assert_eq!(drain(range).unwrap(), spans(&[(1, 0, 2), (2, 2, 4)]));
}

#[test]
fn inverted_bounds_match_nothing() {
    let mut range = PositionRange::new(term_spans(&[(1, 3), (2, 4)]), 5, 2);
    assert_eq!(range.read().unwrap(), None);
    assert!(range.at_eof());
}

#[test]
fn skip_to() {
    let mut range = PositionRange::new(term_spans(&[(1, 2), (3, 9), (3, 2), (5, 0), (6, 1)]), 1, 3);

    assert_eq!(
        range.skip_to(2).unwrap(),
        Some(SkipToOutcome::NotFound(Span::new(3, 2, 3)))
    );
    assert_eq!(
        range.skip_to(4).unwrap(),
        Some(SkipToOutcome::NotFound(Span::new(6, 1, 2)))
    );
    assert_eq!(range.read().unwrap(), None);
}

#[test]
fn estimate_and_close_delegate() {
    let child = MockSpans::new(spans(&[(1, 0, 1), (2, 0, 1)]));
    let data = child.data();
    let mut range = PositionRange::with_anchor(child, 0, 0, RangeAnchor::Start);
    assert_eq!(range.num_estimated(), 2);

    range.close();
    range.close();
    assert_eq!(data.close_count(), 1);
    assert!(matches!(range.read(), Err(SpanIteratorError::Closed)));
    assert_eq!(range.num_estimated(), 2);
}

#[test]
fn skipping_backwards_fails_and_keeps_the_position() {
    let mut range = PositionRange::new(span_list(&[(3, 1, 2), (4, 2, 3)]), 1, 2);
    assert_eq!(range.read().unwrap(), Some(Span::new(3, 1, 2)));
    assert!(matches!(
        range.skip_to(2),
        Err(SpanIteratorError::InvalidSkipTarget {
            current: 3,
            target: 2
        })
    ));
    assert_eq!(range.read().unwrap(), Some(Span::new(4, 2, 3)));
}
