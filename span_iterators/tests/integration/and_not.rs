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
    AndNot, Empty, Exclusion, SkipToOutcome, Span, SpanIterator, SpanIteratorError, drain,
};
use span_iterators_test_utils::{MockSpans, span_list, spans, term_spans};

#[test]
fn overlapping_exclude_drops_the_span() {
    let and_not = AndNot::new(
        span_list(&[(3, 0, 5)]),
        span_list(&[(3, 2, 3)]),
        Exclusion::overlap(),
    );
    assert_eq!(drain(and_not).unwrap(), Vec::new());
}

#[test]
fn disjoint_exclude_keeps_the_span() {
    let and_not = AndNot::new(
        span_list(&[(3, 0, 5)]),
        span_list(&[(3, 6, 7)]),
        Exclusion::overlap(),
    );
    assert_eq!(drain(and_not).unwrap(), spans(&[(3, 0, 5)]));
}

#[test]
fn touching_spans_do_not_overlap() {
    let and_not = AndNot::new(
        span_list(&[(1, 0, 2), (1, 4, 6)]),
        span_list(&[(1, 2, 4)]),
        Exclusion::default(),
    );
    assert_eq!(drain(and_not).unwrap(), spans(&[(1, 0, 2), (1, 4, 6)]));
}

#[test]
fn positional_mode_only_looks_at_the_same_document() {
    let and_not = AndNot::new(
        term_spans(&[(1, 3), (2, 3), (2, 8), (4, 3)]),
        term_spans(&[(2, 3), (3, 3)]),
        Exclusion::overlap(),
    );
    assert_eq!(
        drain(and_not).unwrap(),
        spans(&[(1, 3, 4), (2, 8, 9), (4, 3, 4)])
    );
}

#[test]
fn document_mode_drops_whole_documents() {
    let and_not = AndNot::new(
        term_spans(&[(1, 0), (2, 0), (2, 9), (3, 1)]),
        term_spans(&[(2, 50)]),
        Exclusion::Document,
    );
    assert_eq!(drain(and_not).unwrap(), spans(&[(1, 0, 1), (3, 1, 2)]));
}

#[test]
fn document_mode_skips_the_include_child() {
    let include = MockSpans::new(spans(&[(2, 0, 1), (2, 1, 2), (2, 2, 3), (3, 0, 1)]));
    let data = include.data();
    let mut and_not = AndNot::new(include, span_list(&[(2, 7, 8)]), Exclusion::Document);

    assert_eq!(and_not.read().unwrap(), Some(Span::new(3, 0, 1)));
    assert_eq!(data.read_count(), 1);
    assert_eq!(data.skip_count(), 1);
}

#[test]
fn widened_exclusion() {
    let and_not = AndNot::new(
        term_spans(&[(1, 5), (1, 20)]),
        term_spans(&[(1, 8)]),
        Exclusion::within(0, 3),
    );
    assert_eq!(drain(and_not).unwrap(), spans(&[(1, 20, 21)]));
}

#[test]
fn empty_exclude_keeps_everything() {
    let and_not = AndNot::new(
        term_spans(&[(1, 5), (2, 0)]),
        Empty::default(),
        Exclusion::overlap(),
    );
    assert_eq!(drain(and_not).unwrap(), spans(&[(1, 5, 6), (2, 0, 1)]));
}

#[test]
fn skip_to() {
    let mut and_not = AndNot::new(
        term_spans(&[(1, 0), (4, 0), (4, 2), (6, 1)]),
        term_spans(&[(4, 0)]),
        Exclusion::overlap(),
    );

    assert_eq!(
        and_not.skip_to(4).unwrap(),
        Some(SkipToOutcome::Found(Span::new(4, 2, 3)))
    );
    assert_eq!(
        and_not.skip_to(5).unwrap(),
        Some(SkipToOutcome::NotFound(Span::new(6, 1, 2)))
    );
    assert_eq!(and_not.read().unwrap(), None);
}

#[test]
fn estimate_is_the_include_child() {
    let include = term_spans(&[(1, 0), (2, 0)]);
    let exclude = term_spans(&[(1, 0), (2, 0), (3, 0)]);
    let and_not = AndNot::new(include, exclude, Exclusion::overlap());
    assert_eq!(and_not.num_estimated(), 2);
    assert_eq!(and_not.exclusion(), Exclusion::overlap());
}

#[test]
fn payload_comes_from_the_include_child() {
    let include =
        MockSpans::with_payloads(vec![(Span::new(1, 0, 1), Some(Bytes::from_static(b"in")))]);
    let exclude =
        MockSpans::with_payloads(vec![(Span::new(1, 3, 4), Some(Bytes::from_static(b"out")))]);
    let mut and_not = AndNot::new(include, exclude, Exclusion::overlap());

    and_not.read().unwrap();
    assert_eq!(
        and_not.payload().unwrap(),
        Some(&[Bytes::from_static(b"in")][..])
    );
}

#[test]
fn close_reaches_both_children_once() {
    let include = MockSpans::new(spans(&[(1, 0, 1)]));
    let exclude = MockSpans::new(spans(&[(1, 0, 1)]));
    let (data_in, data_out) = (include.data(), exclude.data());
    let mut and_not = AndNot::new(include, exclude, Exclusion::overlap());

    and_not.close();
    and_not.close();

    assert_eq!(data_in.close_count(), 1);
    assert_eq!(data_out.close_count(), 1);
    assert!(matches!(and_not.read(), Err(SpanIteratorError::Closed)));
}

#[test]
fn skipping_backwards_fails_and_keeps_the_position() {
    let mut and_not = AndNot::new(
        span_list(&[(3, 0, 1), (4, 0, 1)]),
        span_list(&[(1, 0, 1)]),
        Exclusion::overlap(),
    );
    assert_eq!(and_not.read().unwrap(), Some(Span::new(3, 0, 1)));
    assert!(matches!(
        and_not.skip_to(2),
        Err(SpanIteratorError::InvalidSkipTarget {
            current: 3,
            target: 2
        })
    ));
    assert_eq!(and_not.read().unwrap(), Some(Span::new(4, 0, 1)));
}
