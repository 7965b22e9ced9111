//! Polygon triangulation by ear clipping, accelerated with a z-order curve index.
//!
//! The input is a flat array of vertex coordinates (`dim` values per vertex, of which only
//! the first two are used) plus the vertex indices at which each hole ring starts. The
//! output is a list of vertex index triples referring back to the input vertices.
//!
//! ```
//! let data = [0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0];
//! let triangles = earclip::triangulate::<f64, u32>(&data, &[], 2).unwrap();
//! assert_eq!(triangles, vec![2, 3, 0, 0, 1, 2]);
//! ```

#![no_std]

extern crate alloc;

mod arena;
mod deviation;
mod ear;
mod error;
mod geom;
mod holes;
mod zorder;

use alloc::vec::Vec;
use core::iter;
use core::ops::Range;
use num_traits::float::Float;

pub use deviation::deviation;
pub use error::Error;

use arena::{Arena, Handle};
use ear::{Clipper, Pass};
use zorder::ZOrderBounds;

/// Vertex count above which ear tests go through the z-order index.
pub const DEFAULT_HASH_THRESHOLD: usize = 80;

/// Integer type of the vertex indices in hole lists and triangle output.
///
/// A polygon can have at most `MAX + 1` vertices; [`Earcut::earcut`] rejects larger input
/// with [`Error::IndexOverflow`] instead of wrapping indices.
pub trait Index: Copy {
    /// Largest vertex index the type can hold.
    const MAX: usize;

    fn into_usize(self) -> usize;

    /// Converts a vertex index, which must not exceed [`Index::MAX`].
    fn from_usize(v: usize) -> Self;
}

macro_rules! impl_index {
    ($($t:ty),*) => {$(
        impl Index for $t {
            const MAX: usize = <$t>::MAX as usize;

            fn into_usize(self) -> usize {
                self as usize
            }

            fn from_usize(v: usize) -> Self {
                debug_assert!(
                    v <= <Self as Index>::MAX,
                    "vertex index {v} does not fit in {}",
                    stringify!($t)
                );
                v as Self
            }
        }
    )*};
}

impl_index!(u16, u32, usize);

/// Vertex ranges of the outer ring followed by every hole, clamped to `len` vertices.
pub(crate) fn ring_ranges<N: Index>(
    hole_indices: &[N],
    len: usize,
) -> impl Iterator<Item = Range<usize>> + '_ {
    let bound = move |h: &N| h.into_usize().min(len);
    let starts = iter::once(0).chain(hole_indices.iter().map(bound));
    let ends = hole_indices.iter().map(bound).chain(iter::once(len));
    starts.zip(ends).map(|(start, end)| start..end.max(start))
}

/// Triangulates a polygon given as a flat coordinate array.
///
/// `hole_indices` holds the vertex index (not the coordinate offset) where each hole ring
/// starts, in ascending order. Only the first two of every `dim` values are used.
///
/// Returns [`Error::InvalidDimension`] if `dim < 2` and [`Error::IndexOverflow`] if `N`
/// cannot index every vertex. Degenerate input is not an error and yields fewer (possibly
/// zero) triangles.
pub fn triangulate<T: Float, N: Index>(
    data: &[T],
    hole_indices: &[N],
    dim: usize,
) -> Result<Vec<N>, Error> {
    let mut triangles = Vec::new();
    Earcut::new().earcut(data, hole_indices, dim, &mut triangles)?;
    Ok(triangles)
}

/// Instance of the earcut algorithm.
pub struct Earcut<T: Float> {
    points: Vec<[T; 2]>,
    arena: Arena<T>,
    queue: Vec<Handle>,
    work: Vec<(Handle, Pass)>,
    hash_threshold: usize,
    abandoned: usize,
}

impl<T: Float> Default for Earcut<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> Earcut<T> {
    /// Creates a new instance of the earcut algorithm.
    ///
    /// You can reuse a single instance for multiple triangulations to reduce memory allocations.
    pub fn new() -> Self {
        Self::with_hash_threshold(DEFAULT_HASH_THRESHOLD)
    }

    /// Creates an instance that enables the z-order index only for polygons with more than
    /// `threshold` vertices.
    ///
    /// `0` forces the indexed path for every polygon, `usize::MAX` disables it.
    pub fn with_hash_threshold(threshold: usize) -> Self {
        Self {
            points: Vec::new(),
            arena: Arena::new(),
            queue: Vec::new(),
            work: Vec::new(),
            hash_threshold: threshold,
            abandoned: 0,
        }
    }

    /// Vertex count above which ear tests use the z-order index.
    pub fn hash_threshold(&self) -> usize {
        self.hash_threshold
    }

    /// Changes the vertex count above which ear tests use the z-order index. Both paths
    /// produce the same triangles; the index only makes large polygons faster.
    pub fn set_hash_threshold(&mut self, threshold: usize) {
        self.hash_threshold = threshold;
    }

    /// Number of ring segments the last call gave up on because no ear and no splitting
    /// diagonal could be found.
    ///
    /// A non-zero value means the output covers only part of the polygon. This only happens
    /// on self-intersecting or numerically degenerate input.
    pub fn abandoned_rings(&self) -> usize {
        self.abandoned
    }

    /// Performs the earcut triangulation on a polygon.
    ///
    /// Triangles are written to `triangles_out` as vertex index triples, reusing its allocation.
    /// `triangles_out` is cleared first, including when an error is returned.
    pub fn earcut<N: Index>(
        &mut self,
        data: &[T],
        hole_indices: &[N],
        dim: usize,
        triangles_out: &mut Vec<N>,
    ) -> Result<(), Error> {
        triangles_out.clear();
        self.abandoned = 0;
        if dim < 2 {
            return Err(Error::InvalidDimension(dim));
        }
        let vertices = data.len() / dim;
        // vertices keep their input index as a u32
        let max_index = N::MAX.min(u32::MAX as usize);
        if vertices.saturating_sub(1) > max_index {
            return Err(Error::IndexOverflow {
                vertices,
                max_index,
            });
        }

        self.points.clear();
        self.points
            .extend(data.chunks_exact(dim).map(|v| [v[0], v[1]]));
        if self.points.len() < 3 {
            return Ok(());
        }
        self.earcut_impl(hole_indices, triangles_out);
        Ok(())
    }

    fn earcut_impl<N: Index>(&mut self, hole_indices: &[N], triangles_out: &mut Vec<N>) {
        let len = self.points.len();
        triangles_out.reserve(len * 3);
        self.arena.reset(len * 3 / 2 + 1);

        let mut rings = ring_ranges(hole_indices, len);
        let Some(outer_range) = rings.next() else {
            return;
        };
        let Some(outer) = self.arena.ring(&self.points, outer_range.clone(), true) else {
            return;
        };
        if self.arena[outer].next == self.arena[outer].prev {
            return;
        }
        let outer = self.merge_holes(rings, outer);

        // the index pays off only for larger polygons; its grid spans the outer ring's bbox
        let bounds = if len > self.hash_threshold {
            ZOrderBounds::from_points(&self.points[outer_range])
        } else {
            ZOrderBounds::disabled()
        };

        log::trace!(
            "triangulating {} vertices, {} holes, z-order index {}",
            len,
            hole_indices.len(),
            if bounds.is_enabled() { "on" } else { "off" }
        );

        self.abandoned = Clipper {
            arena: &mut self.arena,
            bounds,
            out: triangles_out,
        }
        .run(outer, &mut self.work);
    }
}
