//! Planar predicates on bare `[x, y]` points.

use core::cmp::Ordering;
use num_traits::float::Float;

/// Twice the signed area of the triangle `p q r`.
///
/// Negative when `p -> q -> r` turns counter-clockwise with the y axis pointing up, which is
/// the convex direction for the rings the clipper works on.
pub(crate) fn cross<T: Float>(p: [T; 2], q: [T; 2], r: [T; 2]) -> T {
    (q[1] - p[1]) * (r[0] - q[0]) - (q[0] - p[0]) * (r[1] - q[1])
}

/// Whether `p` lies inside or on the boundary of the triangle `a b c` (clipping orientation).
pub(crate) fn in_triangle<T: Float>(a: [T; 2], b: [T; 2], c: [T; 2], p: [T; 2]) -> bool {
    let [ax, ay] = [a[0] - p[0], a[1] - p[1]];
    let [bx, by] = [b[0] - p[0], b[1] - p[1]];
    let [cx, cy] = [c[0] - p[0], c[1] - p[1]];
    cx * ay >= ax * cy && ax * by >= bx * ay && bx * cy >= cx * by
}

/// Whether the closed segments `p1 q1` and `p2 q2` share a point.
pub(crate) fn segments_intersect<T: Float>(
    p1: [T; 2],
    q1: [T; 2],
    p2: [T; 2],
    q2: [T; 2],
) -> bool {
    let o1 = orientation(p1, q1, p2);
    let o2 = orientation(p1, q1, q2);
    let o3 = orientation(p2, q2, p1);
    let o4 = orientation(p2, q2, q1);
    if o1 != o2 && o3 != o4 {
        return true;
    }
    // collinear cases: an endpoint lying on the other segment
    (o1.is_eq() && in_span(p1, p2, q1))
        || (o2.is_eq() && in_span(p1, q2, q1))
        || (o3.is_eq() && in_span(p2, p1, q2))
        || (o4.is_eq() && in_span(p2, q1, q2))
}

/// Sign of [`cross`]; NaN counts as collinear.
fn orientation<T: Float>(p: [T; 2], q: [T; 2], r: [T; 2]) -> Ordering {
    cross(p, q, r)
        .partial_cmp(&T::zero())
        .unwrap_or(Ordering::Equal)
}

/// Whether `q` is inside the axis-aligned box spanned by `p` and `r`.
fn in_span<T: Float>(p: [T; 2], q: [T; 2], r: [T; 2]) -> bool {
    (0..2).all(|k| q[k] <= p[k].max(r[k]) && q[k] >= p[k].min(r[k]))
}

/// Twice the signed area of a closed ring (shoelace); positive for clockwise rings in
/// y-down coordinates.
pub(crate) fn ring_area<T: Float>(ring: &[[T; 2]]) -> T {
    let Some(&last) = ring.last() else {
        return T::zero();
    };
    let (sum, _) = ring
        .iter()
        .fold((T::zero(), last), |(sum, [bx, by]), &[ax, ay]| {
            (sum + (bx - ax) * (ay + by), [ax, ay])
        });
    sum
}

/// Lexicographic order on `(x, y)`; NaN compares equal to everything.
pub(crate) fn cmp_xy<T: Float>(a: [T; 2], b: [T; 2]) -> Ordering {
    let by = |k: usize| a[k].partial_cmp(&b[k]).unwrap_or(Ordering::Equal);
    by(0).then_with(|| by(1))
}

#[cfg(test)]
mod test {
    use super::*;
    use core::cmp::Ordering::*;

    #[test]
    fn test_ring_area_winding() {
        assert_eq!(ring_area(&[[0., 0.], [1., 0.], [0., 1.]]), 1.0);
        assert_eq!(ring_area(&[[0., 0.], [0., 1.], [1., 0.]]), -1.0);
        assert_eq!(ring_area::<f64>(&[]), 0.0);
        assert_eq!(ring_area(&[[3., 4.]]), 0.0);
    }

    #[test]
    fn test_cross_sign() {
        assert!(cross([0., 1.], [0., 0.], [1., 0.]) < 0.0);
        assert!(cross([1., 0.], [0., 0.], [0., 1.]) > 0.0);
        assert_eq!(cross([0., 0.], [1., 1.], [2., 2.]), 0.0);
    }

    #[test]
    fn test_in_triangle_includes_edges() {
        let (a, b, c) = ([0., 0.], [4., 0.], [0., 4.]);
        assert!(in_triangle(a, b, c, [1., 1.]));
        assert!(in_triangle(a, b, c, [2., 2.]));
        assert!(in_triangle(a, b, c, [0., 0.]));
        assert!(!in_triangle(a, b, c, [3., 3.]));
    }

    #[test]
    fn test_segments_intersect() {
        assert!(segments_intersect([0., 0.], [2., 2.], [0., 2.], [2., 0.]));
        assert!(!segments_intersect([0., 0.], [1., 0.], [0., 1.], [1., 1.]));
        // touching at an endpoint
        assert!(segments_intersect([0., 0.], [2., 0.], [1., 0.], [1., 5.]));
        // collinear but disjoint
        assert!(!segments_intersect([0., 0.], [1., 0.], [2., 0.], [3., 0.]));
        // collinear and overlapping in the lower half of a vertical segment
        assert!(segments_intersect([0., 0.], [0., 4.], [0., 1.], [0., -3.]));
    }

    #[test]
    fn test_cmp_xy() {
        assert_eq!(cmp_xy([0., 5.], [1., 0.]), Less);
        assert_eq!(cmp_xy([1., 2.], [1., 0.]), Greater);
        assert_eq!(cmp_xy([1., 2.], [1., 2.]), Equal);
        assert_eq!(cmp_xy([f64::NAN, 2.], [1., 2.]), Equal);
    }
}
