/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

use bytes::Bytes;
use span_iterators::{
    NearUnordered, SkipToOutcome, Span, SpanIterator, SpanIteratorError, SpanList, drain,
};
use span_iterators_test_utils::{MockSpans, MockSpansError, span_list, spans, term_spans};

#[test]
fn any_order_within_slop() {
    let a = term_spans(&[(2, 10)]);
    let b = term_spans(&[(2, 8)]);

    let near = NearUnordered::new(vec![a, b], 2);
    assert_eq!(near.slop(), 2);
    assert_eq!(drain(near).unwrap(), spans(&[(2, 8, 11)]));
}

#[test]
fn too_far_apart() {
    let a = term_spans(&[(2, 10)]);
    let b = term_spans(&[(2, 8)]);

    let near = NearUnordered::new(vec![a, b], 0);
    assert_eq!(drain(near).unwrap(), Vec::new());
}

#[test]
fn adjacent_in_reverse_order() {
    let a = term_spans(&[(1, 3)]);
    let b = term_spans(&[(1, 2)]);

    let near = NearUnordered::new(vec![a, b], 0);
    assert_eq!(drain(near).unwrap(), spans(&[(1, 2, 4)]));
}

#[test]
fn overlapping_children_match() {
    let a = span_list(&[(1, 0, 5)]);
    let b = span_list(&[(1, 2, 3)]);

    let near = NearUnordered::new(vec![a, b], 0);
    assert_eq!(drain(near).unwrap(), spans(&[(1, 0, 5)]));
}

#[test]
fn several_matches_per_document() {
    let a = term_spans(&[(1, 0), (1, 10)]);
    let b = term_spans(&[(1, 1), (1, 11)]);

    let near = NearUnordered::new(vec![a, b], 0);
    assert_eq!(drain(near).unwrap(), spans(&[(1, 0, 2), (1, 10, 12)]));
}

#[test]
fn aligns_documents() {
    let a = term_spans(&[(1, 0), (3, 4), (5, 1)]);
    let b = term_spans(&[(2, 0), (3, 3), (4, 0), (5, 9)]);

    let near = NearUnordered::new(vec![a, b], 1);
    assert_eq!(drain(near).unwrap(), spans(&[(3, 3, 5)]));
}

#[test]
fn skip_to() {
    let a = term_spans(&[(1, 0), (3, 4), (7, 1)]);
    let b = term_spans(&[(1, 1), (3, 3), (7, 0)]);
    let mut near = NearUnordered::new(vec![a, b], 0);

    assert_eq!(near.read().unwrap(), Some(Span::new(1, 0, 2)));
    assert_eq!(
        near.skip_to(2).unwrap(),
        Some(SkipToOutcome::NotFound(Span::new(3, 3, 5)))
    );
    assert_eq!(
        near.skip_to(7).unwrap(),
        Some(SkipToOutcome::Found(Span::new(7, 0, 2)))
    );
    assert_eq!(near.skip_to(8).unwrap(), None);
}

#[test]
fn estimate_is_sum_of_children() {
    let near = NearUnordered::new(
        vec![term_spans(&[(1, 0), (2, 0)]), term_spans(&[(1, 1)])],
        0,
    );
    assert_eq!(near.num_estimated(), 3);

    let empty = NearUnordered::<SpanList>::new(Vec::new(), 4);
    assert_eq!(empty.num_estimated(), 0);
    assert_eq!(drain(empty).unwrap(), Vec::new());
}

#[test]
fn collects_child_payloads_in_query_order() {
    let a = MockSpans::with_payloads(vec![(Span::new(1, 4, 5), Some(Bytes::from_static(b"a")))]);
    let b = MockSpans::with_payloads(vec![(Span::new(1, 3, 4), Some(Bytes::from_static(b"b")))]);
    let mut near = NearUnordered::new(vec![a, b], 0);

    assert_eq!(near.read().unwrap(), Some(Span::new(1, 3, 5)));
    assert_eq!(
        near.payload().unwrap(),
        Some(&[Bytes::from_static(b"a"), Bytes::from_static(b"b")][..])
    );
}

#[test]
fn close_reaches_every_child_once() {
    let a = MockSpans::new(spans(&[(1, 0, 1)]));
    let b = MockSpans::new(spans(&[(1, 1, 2)]));
    let (data_a, data_b) = (a.data(), b.data());
    let mut near = NearUnordered::new(vec![a, b], 0);

    near.close();
    near.close();

    assert_eq!(data_a.close_count(), 1);
    assert_eq!(data_b.close_count(), 1);
    assert!(matches!(near.skip_to(1), Err(SpanIteratorError::Closed)));
}

#[test]
fn child_errors_propagate() {
    let a = MockSpans::new(spans(&[(1, 0, 1)]));
    let b = MockSpans::new(spans(&[(2, 1, 2)]));
    a.data().set_error_at_done(Some(MockSpansError::Timeout));
    let mut near = NearUnordered::new(vec![a, b], 0);

    assert!(matches!(near.read(), Err(SpanIteratorError::TimedOut)));
}

#[test]
fn failed_start_can_be_retried() {
    let a = MockSpans::new(spans(&[(1, 0, 1)]));
    let b = MockSpans::new(Vec::new());
    let mut data_b = b.data();
    data_b.set_error_at_done(Some(MockSpansError::Timeout));
    let mut near = NearUnordered::new(vec![a, b], 0);

    assert!(matches!(near.read(), Err(SpanIteratorError::TimedOut)));
    assert!(matches!(near.read(), Err(SpanIteratorError::TimedOut)));
    assert!(matches!(near.skip_to(1), Err(SpanIteratorError::TimedOut)));
    assert_eq!(data_b.read_count(), 2);
    assert_eq!(data_b.skip_count(), 1);

    data_b.set_error_at_done(None);
    assert_eq!(near.read().unwrap(), None);
}

#[test]
fn skipping_backwards_fails_and_keeps_the_position() {
    let mut near = NearUnordered::new(
        vec![
            span_list(&[(3, 1, 2), (5, 1, 2)]),
            span_list(&[(3, 0, 1), (5, 0, 1)]),
        ],
        0,
    );
    assert_eq!(near.read().unwrap(), Some(Span::new(3, 0, 2)));
    assert!(matches!(
        near.skip_to(2),
        Err(SpanIteratorError::InvalidSkipTarget {
            current: 3,
            target: 2
        })
    ));
    assert_eq!(near.read().unwrap(), Some(Span::new(5, 0, 2)));
}
