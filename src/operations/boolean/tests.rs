#![allow(clippy::unwrap_used)]

use approx::assert_abs_diff_eq;

use crate::error::{ClipError, UsageError};
use crate::geometry::PolyTree;
use crate::math::polygon_2d::{area_of_paths, bounds, reverse_path, signed_area};
use crate::math::{Path, Paths, Point2};

use super::{ClipType, Clipper, FillRule, PathType};

const EPS: f64 = 1e-9;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Path {
    vec![
        Point2::new(x0, y0),
        Point2::new(x1, y0),
        Point2::new(x1, y1),
        Point2::new(x0, y1),
    ]
}

fn run(subject: &[Path], clip: &[Path], clip_type: ClipType, fill_rule: FillRule) -> Paths {
    let mut clipper = Clipper::new();
    clipper.add_subject(subject);
    clipper.add_clip(clip);
    clipper.execute(clip_type, fill_rule).unwrap().unwrap()
}

fn area(subject: &[Path], clip: &[Path], clip_type: ClipType, fill_rule: FillRule) -> f64 {
    area_of_paths(&run(subject, clip, clip_type, fill_rule))
}

fn overlapping_squares() -> (Paths, Paths) {
    (
        vec![rect(0.0, 0.0, 1.0, 1.0)],
        vec![rect(0.5, 0.5, 1.5, 1.5)],
    )
}

fn bowtie() -> Path {
    vec![
        Point2::new(0.0, 0.0),
        Point2::new(2.0, 2.0),
        Point2::new(2.0, 0.0),
        Point2::new(0.0, 2.0),
    ]
}

#[test]
fn intersection_of_overlapping_squares() {
    init_tracing();
    let (a, b) = overlapping_squares();
    let result = run(&a, &b, ClipType::Intersection, FillRule::NonZero);
    assert_eq!(result.len(), 1);
    assert_abs_diff_eq!(signed_area(&result[0]), 0.25, epsilon = EPS);
    let (min, max) = bounds(&result[0]).unwrap();
    assert_abs_diff_eq!(min.x, 0.5, epsilon = EPS);
    assert_abs_diff_eq!(min.y, 0.5, epsilon = EPS);
    assert_abs_diff_eq!(max.x, 1.0, epsilon = EPS);
    assert_abs_diff_eq!(max.y, 1.0, epsilon = EPS);
}

#[test]
fn union_of_overlapping_squares() {
    let (a, b) = overlapping_squares();
    let result = run(&a, &b, ClipType::Union, FillRule::NonZero);
    assert_eq!(result.len(), 1);
    assert_abs_diff_eq!(signed_area(&result[0]), 1.75, epsilon = EPS);
}

#[test]
fn difference_and_xor_of_overlapping_squares() {
    let (a, b) = overlapping_squares();
    assert_abs_diff_eq!(area(&a, &b, ClipType::Difference, FillRule::NonZero), 0.75, epsilon = EPS);
    assert_abs_diff_eq!(area(&b, &a, ClipType::Difference, FillRule::NonZero), 0.75, epsilon = EPS);
    assert_abs_diff_eq!(area(&a, &b, ClipType::Xor, FillRule::NonZero), 1.5, epsilon = EPS);
}

#[test]
fn boolean_laws_hold_for_several_inputs() {
    let cases: Vec<(Paths, Paths)> = vec![
        overlapping_squares(),
        (vec![rect(0.0, 0.0, 10.0, 10.0)], vec![rect(3.0, 3.0, 6.0, 6.0)]),
        (vec![rect(0.0, 0.0, 1.0, 1.0)], vec![rect(5.0, 5.0, 6.0, 7.0)]),
        (
            vec![vec![Point2::new(0.0, 0.0), Point2::new(4.0, 0.5), Point2::new(1.0, 3.0)]],
            vec![vec![Point2::new(3.0, -1.0), Point2::new(3.5, 2.5), Point2::new(-0.5, 1.0)]],
        ),
    ];
    for (a, b) in &cases {
        for rule in [FillRule::EvenOdd, FillRule::NonZero] {
            let area_a = area(a, &[], ClipType::Union, rule);
            let inter = area(a, b, ClipType::Intersection, rule);
            let union = area(a, b, ClipType::Union, rule);
            let diff = area(a, b, ClipType::Difference, rule);
            let xor = area(a, b, ClipType::Xor, rule);

            assert_abs_diff_eq!(inter, area(b, a, ClipType::Intersection, rule), epsilon = 1e-7);
            assert_abs_diff_eq!(union, area(b, a, ClipType::Union, rule), epsilon = 1e-7);
            assert_abs_diff_eq!(xor, area(b, a, ClipType::Xor, rule), epsilon = 1e-7);
            assert_abs_diff_eq!(area_a, diff + inter, epsilon = 1e-7);
            assert_abs_diff_eq!(xor, union - inter, epsilon = 1e-7);
            assert!(inter <= area_a + 1e-7);
            assert!(union >= area_a - 1e-7);
        }
    }
}

#[test]
fn nested_square_is_absorbed_or_kept() {
    let outer = vec![rect(0.0, 0.0, 10.0, 10.0)];
    let inner = vec![rect(3.0, 3.0, 6.0, 6.0)];
    assert_abs_diff_eq!(area(&outer, &inner, ClipType::Union, FillRule::NonZero), 100.0, epsilon = EPS);
    assert_abs_diff_eq!(area(&outer, &inner, ClipType::Intersection, FillRule::NonZero), 9.0, epsilon = EPS);

    let diff = run(&outer, &inner, ClipType::Difference, FillRule::NonZero);
    assert_eq!(diff.len(), 2);
    assert_abs_diff_eq!(area_of_paths(&diff), 91.0, epsilon = EPS);
}

#[test]
fn disjoint_inputs() {
    let a = vec![rect(0.0, 0.0, 1.0, 1.0)];
    let b = vec![rect(5.0, 5.0, 6.0, 7.0)];
    assert!(run(&a, &b, ClipType::Intersection, FillRule::NonZero).is_empty());
    let union = run(&a, &b, ClipType::Union, FillRule::NonZero);
    assert_eq!(union.len(), 2);
    assert_abs_diff_eq!(area_of_paths(&union), 3.0, epsilon = EPS);
}

#[test]
fn even_odd_and_non_zero_agree_on_simple_polygon() {
    let poly = vec![vec![
        Point2::new(0.0, 0.0),
        Point2::new(4.0, 0.0),
        Point2::new(4.0, 4.0),
        Point2::new(2.0, 1.0),
        Point2::new(0.0, 4.0),
    ]];
    let even_odd = area(&poly, &[], ClipType::Union, FillRule::EvenOdd);
    let non_zero = area(&poly, &[], ClipType::Union, FillRule::NonZero);
    assert_abs_diff_eq!(even_odd, non_zero, epsilon = EPS);
    assert_abs_diff_eq!(even_odd, signed_area(&poly[0]), epsilon = EPS);
}

#[test]
fn square_with_hole_survives_self_union() {
    let shape = vec![rect(0.0, 0.0, 10.0, 10.0), reverse_path(&rect(2.0, 2.0, 8.0, 8.0))];
    let result = run(&shape, &shape, ClipType::Union, FillRule::NonZero);
    assert_eq!(result.len(), 2);
    let mut areas: Vec<f64> = result.iter().map(|p| signed_area(p)).collect();
    areas.sort_by(f64::total_cmp);
    assert_abs_diff_eq!(areas[0], -36.0, epsilon = EPS);
    assert_abs_diff_eq!(areas[1], 100.0, epsilon = EPS);
}

#[test]
fn outer_and_hole_have_opposite_orientation() {
    let shape = vec![rect(0.0, 0.0, 10.0, 10.0), rect(2.0, 2.0, 8.0, 8.0)];
    let result = run(&shape, &[], ClipType::Union, FillRule::EvenOdd);
    assert_eq!(result.len(), 2);
    let positive = result.iter().filter(|p| signed_area(p) > 0.0).count();
    assert_eq!(positive, 1);
    assert_abs_diff_eq!(area_of_paths(&result), 64.0, epsilon = EPS);

    let mut reversed = Clipper::new().with_reverse_solution(true);
    reversed.add_subject(&shape);
    let flipped = reversed.execute(ClipType::Union, FillRule::EvenOdd).unwrap().unwrap();
    assert_abs_diff_eq!(area_of_paths(&flipped), -64.0, epsilon = EPS);
}

#[test]
fn bowtie_splits_into_two_triangles() {
    let result = run(&[bowtie()], &[], ClipType::Union, FillRule::EvenOdd);
    assert_eq!(result.len(), 2);
    for path in &result {
        assert_abs_diff_eq!(signed_area(path).abs(), 1.0, epsilon = EPS);
    }
    assert_abs_diff_eq!(area_of_paths(&result).abs(), 2.0, epsilon = EPS);
}

#[test]
fn positive_and_negative_fill_rules_follow_orientation() {
    let ccw = vec![rect(0.0, 0.0, 1.0, 1.0), rect(0.5, 0.5, 1.5, 1.5)];
    assert_abs_diff_eq!(area(&ccw, &[], ClipType::Union, FillRule::Positive), 1.75, epsilon = EPS);
    assert!(run(&ccw, &[], ClipType::Union, FillRule::Negative).is_empty());
    assert_abs_diff_eq!(area(&ccw, &[], ClipType::Union, FillRule::NonZero), 1.75, epsilon = EPS);
    // the overlap has winding 2 and is outside under even-odd
    assert_abs_diff_eq!(area(&ccw, &[], ClipType::Union, FillRule::EvenOdd), 1.5, epsilon = EPS);
}

#[test]
fn collinear_vertices_follow_the_preserve_flag() {
    let with_midpoint = vec![vec![
        Point2::new(0.0, 0.0),
        Point2::new(4.0, 0.0),
        Point2::new(2.0, 2.0),
        Point2::new(1.0, 1.0),
    ]];
    let mut keep = Clipper::new();
    keep.add_subject(&with_midpoint);
    let kept = keep.execute(ClipType::Union, FillRule::NonZero).unwrap().unwrap();
    assert_eq!(kept[0].len(), 4);

    let mut drop = Clipper::new().with_preserve_collinear(false);
    drop.add_subject(&with_midpoint);
    let dropped = drop.execute(ClipType::Union, FillRule::NonZero).unwrap().unwrap();
    assert_eq!(dropped[0].len(), 3);
    assert_abs_diff_eq!(signed_area(&dropped[0]), 4.0, epsilon = EPS);
}

#[test]
fn open_subject_is_clipped_to_the_square() {
    let mut clipper = Clipper::new();
    clipper.add_open_subject(&[vec![Point2::new(-1.0, 0.25), Point2::new(2.0, 0.75)]]);
    clipper.add_clip(&[rect(0.0, 0.0, 1.0, 1.0)]);
    let solution = clipper
        .execute_with_open(ClipType::Intersection, FillRule::NonZero)
        .unwrap()
        .unwrap();
    assert!(solution.closed.is_empty());
    assert_eq!(solution.open.len(), 1);
    let line = &solution.open[0];
    assert_eq!(line.len(), 2);
    let (min, max) = bounds(line).unwrap();
    assert_abs_diff_eq!(min.x, 0.0, epsilon = EPS);
    assert_abs_diff_eq!(max.x, 1.0, epsilon = EPS);
}

#[test]
fn open_subject_outside_difference_keeps_ends() {
    let mut clipper = Clipper::new();
    clipper.add_open_subject(&[vec![Point2::new(-1.0, 0.25), Point2::new(2.0, 0.75)]]);
    clipper.add_clip(&[rect(0.0, 0.0, 1.0, 1.0)]);
    let solution = clipper
        .execute_with_open(ClipType::Difference, FillRule::NonZero)
        .unwrap()
        .unwrap();
    assert_eq!(solution.open.len(), 2);
}

#[test]
fn open_clip_path_is_rejected() {
    let mut clipper = Clipper::new();
    let err = clipper
        .add_path(&rect(0.0, 0.0, 1.0, 1.0), PathType::Clip, true)
        .unwrap_err();
    assert!(matches!(err, ClipError::Usage(UsageError::OpenClipPath)));
}

#[test]
fn nothing_to_clip_returns_none() {
    let mut clipper = Clipper::new();
    assert!(clipper.execute(ClipType::Union, FillRule::NonZero).unwrap().is_none());
    let mut tree = PolyTree::new();
    let mut open = Vec::new();
    assert!(!clipper
        .execute_tree(ClipType::Union, FillRule::NonZero, &mut tree, &mut open)
        .unwrap());
}

#[test]
fn degenerate_paths_are_ignored() {
    let mut clipper = Clipper::new();
    clipper.add_subject(&[
        vec![Point2::new(1.0, 1.0)],
        vec![Point2::new(0.0, 0.0), Point2::new(3.0, 0.0), Point2::new(5.0, 0.0)],
    ]);
    assert!(clipper.execute(ClipType::Union, FillRule::NonZero).unwrap().is_none());
}

#[test]
fn instance_is_reusable_after_execute() {
    let (a, b) = overlapping_squares();
    let mut clipper = Clipper::new();
    clipper.add_subject(&a);
    clipper.add_clip(&b);
    let first = clipper.execute(ClipType::Intersection, FillRule::NonZero).unwrap().unwrap();
    let union = clipper.execute(ClipType::Union, FillRule::NonZero).unwrap().unwrap();
    let again = clipper.execute(ClipType::Intersection, FillRule::NonZero).unwrap().unwrap();
    assert_abs_diff_eq!(area_of_paths(&first), area_of_paths(&again), epsilon = EPS);
    assert_abs_diff_eq!(area_of_paths(&union), 1.75, epsilon = EPS);

    clipper.clear();
    assert!(clipper.execute(ClipType::Union, FillRule::NonZero).unwrap().is_none());
}

#[test]
fn union_result_is_idempotent() {
    let (a, b) = overlapping_squares();
    let once = run(&a, &b, ClipType::Union, FillRule::NonZero);
    let twice = run(&once, &[], ClipType::Union, FillRule::NonZero);
    assert_eq!(once.len(), twice.len());
    assert_abs_diff_eq!(area_of_paths(&once), area_of_paths(&twice), epsilon = EPS);
}

#[test]
fn tree_nests_hole_and_island() {
    let subject = vec![
        rect(0.0, 0.0, 10.0, 10.0),
        rect(2.0, 2.0, 8.0, 8.0),
        rect(4.0, 4.0, 6.0, 6.0),
    ];
    let mut clipper = Clipper::new();
    clipper.add_subject(&subject);
    let mut tree = PolyTree::new();
    let mut open = Vec::new();
    assert!(clipper
        .execute_tree(ClipType::Union, FillRule::EvenOdd, &mut tree, &mut open)
        .unwrap());
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.roots().len(), 1);
    let root = tree.roots()[0];
    let hole = tree.children(root)[0];
    assert!(tree.is_hole(hole));
    let island = tree.children(hole)[0];
    assert_eq!(tree.depth(island), 2);
    assert_abs_diff_eq!(tree.area(), 100.0 - 36.0 + 4.0, epsilon = EPS);
    assert!(open.is_empty());
}

#[test]
fn tree_keeps_disjoint_outers_as_roots() {
    let mut clipper = Clipper::new();
    clipper.add_subject(&[rect(0.0, 0.0, 1.0, 1.0), rect(3.0, 0.0, 4.0, 1.0)]);
    let mut tree = PolyTree::new();
    let mut open = Vec::new();
    clipper
        .execute_tree(ClipType::Union, FillRule::NonZero, &mut tree, &mut open)
        .unwrap();
    assert_eq!(tree.roots().len(), 2);
    assert_eq!(tree.to_paths().len(), 2);
}
