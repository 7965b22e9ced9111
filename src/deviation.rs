use alloc::vec::Vec;
use num_traits::float::Float;

use crate::geom::ring_area;
use crate::{ring_ranges, Index};

/// Returns a percentage difference between the polygon area and its triangulation area;
/// used to verify correctness of triangulation.
///
/// The result is `0` when both areas are zero, and infinite when the polygon has no area
/// but the triangles do, or when a triangle refers to a vertex that does not exist.
pub fn deviation<T: Float, N: Index>(
    data: &[T],
    hole_indices: &[N],
    dim: usize,
    triangles: &[N],
) -> T {
    let vertices: Vec<[T; 2]> = if dim < 2 {
        Vec::new()
    } else {
        data.chunks_exact(dim).map(|v| [v[0], v[1]]).collect()
    };

    let mut rings =
        ring_ranges(hole_indices, vertices.len()).map(|r| ring_area(&vertices[r]).abs());
    let outer = rings.next().unwrap_or_else(T::zero);
    let polygon_area = rings.fold(outer, |area, hole| area - hole);

    let triangles_area = triangles.chunks_exact(3).try_fold(T::zero(), |sum, tri| {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| vertices.get(i.into_usize()));
        let (&[ax, ay], &[bx, by], &[cx, cy]) = (a?, b?, c?);
        Some(sum + ((ax - cx) * (by - ay) - (ax - bx) * (cy - ay)).abs())
    });
    let Some(triangles_area) = triangles_area else {
        // a triangle names a missing vertex
        return T::infinity();
    };

    if polygon_area == T::zero() && triangles_area == T::zero() {
        T::zero()
    } else if polygon_area == T::zero() {
        T::infinity()
    } else {
        ((triangles_area - polygon_area) / polygon_area).abs()
    }
}
