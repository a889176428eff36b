/*
 * Copyright (c) 2006-Present, Redis Ltd.
 * All rights reserved.
 *
 * Licensed under your choice of the Redis Source Available License 2.0
 * (RSALv2); or (b) the Server Side Public License v1 (SSPLv1); or (c) the
 * GNU Affero General Public License v3 (AGPLv3).
*/

//! Integration tests for the Or iterator.

use bytes::Bytes;
use span_iterators::{
    BoxedSpans, Empty, NearOrdered, Or, SkipToOutcome, Span, SpanIterator, SpanIteratorError,
    SpanList, drain,
};
use span_iterators_test_utils::{MockSpans, MockSpansError, span_list, spans, term_spans};

#[test]
fn merges_children_in_span_order() {
    let or = Or::new(vec![
        term_spans(&[(1, 4), (3, 0)]),
        term_spans(&[(1, 2), (2, 7)]),
        term_spans(&[(1, 3)]),
    ]);
    assert_eq!(
        drain(or).unwrap(),
        spans(&[(1, 2, 3), (1, 3, 4), (1, 4, 5), (2, 7, 8), (3, 0, 1)])
    );
}

#[test]
fn duplicates_are_yielded_once() {
    let or = Or::new(vec![
        span_list(&[(1, 0, 2), (5, 1, 2)]),
        span_list(&[(1, 0, 2), (1, 0, 3)]),
        span_list(&[(5, 1, 2)]),
    ]);
    assert_eq!(
        drain(or).unwrap(),
        spans(&[(1, 0, 2), (1, 0, 3), (5, 1, 2)])
    );
}

#[test]
fn skip_to() {
    let mut or = Or::new(vec![
        term_spans(&[(1, 0), (6, 2)]),
        term_spans(&[(2, 0), (4, 1), (4, 3)]),
    ]);

    assert_eq!(
        or.skip_to(4).unwrap(),
        Some(SkipToOutcome::Found(Span::new(4, 1, 2)))
    );
    assert_eq!(
        or.skip_to(4).unwrap(),
        Some(SkipToOutcome::Found(Span::new(4, 3, 4)))
    );
    assert_eq!(
        or.skip_to(5).unwrap(),
        Some(SkipToOutcome::NotFound(Span::new(6, 2, 3)))
    );
    assert_eq!(or.read().unwrap(), None);
    assert!(or.at_eof());
}

#[test]
fn mixed_children() {
    let children: Vec<BoxedSpans> = vec![
        Box::new(Empty::default()),
        Box::new(NearOrdered::new(
            vec![term_spans(&[(1, 0)]), term_spans(&[(1, 1)])],
            0,
        )),
        Box::new(term_spans(&[(1, 1)])),
    ];
    let or = Or::new(children);
    assert_eq!(drain(or).unwrap(), spans(&[(1, 0, 2), (1, 1, 2)]));
}

#[test]
fn payload_comes_from_the_child_on_the_span() {
    let mut or = Or::new(vec![
        MockSpans::with_payloads(vec![(Span::new(1, 5, 6), Some(Bytes::from_static(b"late")))]),
        MockSpans::with_payloads(vec![(Span::new(1, 2, 3), Some(Bytes::from_static(b"early")))]),
    ]);

    or.read().unwrap();
    assert_eq!(
        or.payload().unwrap(),
        Some(&[Bytes::from_static(b"early")][..])
    );
    or.read().unwrap();
    assert_eq!(
        or.payload().unwrap(),
        Some(&[Bytes::from_static(b"late")][..])
    );
}

#[test]
fn estimate_is_sum_of_children() {
    let or = Or::new(vec![
        term_spans(&[(1, 0), (2, 0), (3, 0)]),
        term_spans(&[(1, 1), (9, 9)]),
    ]);
    assert_eq!(or.num_estimated(), 5);
}

#[test]
fn no_children() {
    let mut or = Or::<SpanList>::new(Vec::new());
    assert_eq!(or.num_estimated(), 0);
    assert_eq!(or.read().unwrap(), None);
    assert!(or.at_eof());
}

#[test]
fn close_reaches_every_child_once() {
    let a = MockSpans::new(spans(&[(1, 0, 1)]));
    let b = MockSpans::new(spans(&[(2, 0, 1)]));
    let (data_a, data_b) = (a.data(), b.data());
    let mut or = Or::new(vec![a, b]);

    or.read().unwrap();
    or.close();
    or.close();

    assert_eq!(data_a.close_count(), 1);
    assert_eq!(data_b.close_count(), 1);
    assert!(matches!(or.read(), Err(SpanIteratorError::Closed)));
    assert_eq!(or.num_estimated(), 2);
}

#[test]
fn only_children_on_the_current_span_advance() {
    let a = MockSpans::new(spans(&[(1, 0, 1), (1, 1, 2)]));
    let b = MockSpans::new(spans(&[(1, 5, 6)]));
    let (data_a, data_b) = (a.data(), b.data());
    let mut or = Or::new(vec![a, b]);

    or.read().unwrap();
    or.read().unwrap();
    assert_eq!(data_a.read_count(), 2);
    assert_eq!(data_b.read_count(), 1);
}

#[test]
fn child_errors_propagate() {
    let a = MockSpans::new(spans(&[(1, 0, 1)]));
    a.data().set_error_at_done(Some(MockSpansError::ReadFailure));
    let mut or = Or::new(vec![a, MockSpans::new(spans(&[(2, 0, 1)]))]);

    assert_eq!(or.read().unwrap(), Some(Span::new(1, 0, 1)));
    assert!(matches!(
        or.read(),
        Err(SpanIteratorError::UnderlyingReadFailure(_))
    ));
}

#[test]
fn failed_start_tries_the_failing_child_again() {
    let b = MockSpans::new(spans(&[(1, 0, 1)]));
    let a = MockSpans::new(Vec::new());
    let (data_b, mut data_a) = (b.data(), a.data());
    data_a.set_error_at_done(Some(MockSpansError::ReadFailure));
    let mut or = Or::new(vec![b, a]);

    assert!(matches!(
        or.read(),
        Err(SpanIteratorError::UnderlyingReadFailure(_))
    ));
    assert!(matches!(
        or.read(),
        Err(SpanIteratorError::UnderlyingReadFailure(_))
    ));
    assert_eq!(data_a.read_count(), 2);
    assert_eq!(data_b.read_count(), 1);

    data_a.set_error_at_done(None);
    assert_eq!(or.read().unwrap(), Some(Span::new(1, 0, 1)));
    assert_eq!(or.read().unwrap(), None);
    assert_eq!(data_b.read_count(), 2);
}

#[test]
fn failed_start_then_skip_positions_every_child() {
    let b = MockSpans::new(spans(&[(1, 0, 1), (4, 0, 1)]));
    let a = MockSpans::new(spans(&[(2, 0, 1)]));
    let mut data_a = a.data();
    // `a` fails once it runs past its only span, i.e. when skipped beyond document 2.
    data_a.set_error_at_done(Some(MockSpansError::Timeout));
    let mut or = Or::new(vec![b, a]);

    assert!(matches!(or.skip_to(3), Err(SpanIteratorError::TimedOut)));

    data_a.set_error_at_done(None);
    assert_eq!(
        or.skip_to(3).unwrap(),
        Some(SkipToOutcome::NotFound(Span::new(4, 0, 1)))
    );
    assert_eq!(or.read().unwrap(), None);
}

#[test]
fn skipping_backwards_fails_and_keeps_the_position() {
    let mut or = Or::new(vec![
        span_list(&[(3, 0, 1)]),
        span_list(&[(4, 0, 1)]),
    ]);
    assert_eq!(or.read().unwrap(), Some(Span::new(3, 0, 1)));
    assert!(matches!(
        or.skip_to(1),
        Err(SpanIteratorError::InvalidSkipTarget {
            current: 3,
            target: 1
        })
    ));
    assert_eq!(or.read().unwrap(), Some(Span::new(4, 0, 1)));
}
