//! Tests for preview-size selection strategies.

use proptest::prelude::*;
use scancam::{CenterCropStrategy, FitCenterStrategy, PreviewScalingStrategy, Size};

fn s(width: u32, height: u32) -> Size {
    Size::new(width, height)
}

#[test]
fn center_crop_ordering() {
    let strategy = CenterCropStrategy;
    let sizes = vec![
        s(30, 40),
        s(40, 30),
        s(1000, 1000),
        s(120, 80),
        s(120, 90),
        s(120, 100),
        s(110, 80),
        s(120, 20),
        s(0, 0),
    ];
    let ordered = strategy.best_preview_order(&sizes, s(120, 90));
    let expected = vec![
        s(120, 90),
        s(120, 100),
        s(110, 80),
        s(120, 80),
        s(40, 30),
        s(30, 40),
        s(1000, 1000),
        s(120, 20),
        s(0, 0),
    ];
    assert_eq!(expected, ordered);
}

#[test]
fn exact_match_ranks_first() {
    let strategy = CenterCropStrategy;
    let sizes = vec![s(800, 600), s(1280, 720), s(640, 480)];
    let ordered = strategy.best_preview_order(&sizes, s(1280, 720));
    assert_eq!(ordered[0], s(1280, 720));

    let strategy = FitCenterStrategy;
    let ordered = strategy.best_preview_order(&sizes, s(640, 480));
    assert_eq!(ordered[0], s(640, 480));
}

#[test]
fn empty_candidates_give_empty_order() {
    let strategy = CenterCropStrategy;
    assert!(strategy.best_preview_order(&[], s(120, 90)).is_empty());
    assert_eq!(strategy.best_preview_size(&[], s(120, 90)), None);
}

#[test]
fn single_candidate_is_returned_unchanged() {
    let strategy = CenterCropStrategy;
    let ordered = strategy.best_preview_order(&[s(640, 480)], s(120, 90));
    assert_eq!(ordered, vec![s(640, 480)]);
    assert_eq!(
        strategy.best_preview_size(&[s(640, 480)], s(120, 90)),
        Some(s(640, 480))
    );
}

#[test]
fn degenerate_candidates_keep_input_order() {
    let strategy = CenterCropStrategy;
    let sizes = vec![s(0, 0), s(0, 5), s(7, 0)];
    let ordered = strategy.best_preview_order(&sizes, s(120, 90));
    assert_eq!(ordered, sizes);
}

#[test]
fn input_is_not_mutated() {
    let strategy = CenterCropStrategy;
    let sizes = vec![s(1000, 1000), s(120, 90), s(0, 0)];
    let before = sizes.clone();
    let _ = strategy.best_preview_order(&sizes, s(120, 90));
    assert_eq!(sizes, before);
}

#[test]
fn degenerate_desired_size_keeps_input_order() {
    // Every candidate scores zero against a zero-area viewport, so the
    // stable sort must leave the input untouched.
    let strategy = CenterCropStrategy;
    let sizes = vec![s(640, 480), s(0, 0), s(120, 90)];
    assert_eq!(strategy.best_preview_order(&sizes, s(0, 0)), sizes);
    assert_eq!(strategy.best_preview_order(&sizes, s(120, 0)), sizes);

    let strategy = FitCenterStrategy;
    assert_eq!(strategy.best_preview_order(&sizes, s(0, 90)), sizes);
}

fn arb_size() -> impl Strategy<Value = Size> {
    (0u32..2000, 0u32..2000).prop_map(|(w, h)| Size::new(w, h))
}

proptest! {
    #[test]
    fn ordering_is_a_permutation(
        sizes in proptest::collection::vec(arb_size(), 0..12),
        desired in (1u32..2000, 1u32..2000).prop_map(|(w, h)| Size::new(w, h)),
    ) {
        let strategy = CenterCropStrategy;
        let ordered = strategy.best_preview_order(&sizes, desired);
        prop_assert_eq!(ordered.len(), sizes.len());

        let mut expected = sizes.clone();
        let mut actual = ordered;
        expected.sort();
        actual.sort();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn exact_match_always_first_when_present(
        mut sizes in proptest::collection::vec(arb_size(), 0..8),
        desired in (1u32..2000, 1u32..2000).prop_map(|(w, h)| Size::new(w, h)),
    ) {
        sizes.push(desired);
        let strategy = CenterCropStrategy;
        let ordered = strategy.best_preview_order(&sizes, desired);
        prop_assert_eq!(ordered[0], desired);
    }
}
