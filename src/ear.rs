//! The ear slicing loop and its fallback passes.

use alloc::vec::Vec;
use core::iter;
use num_traits::float::Float;

use crate::arena::{Arena, Handle, Vertex};
use crate::geom::in_triangle;
use crate::zorder::ZOrderBounds;
use crate::Index;

/// Fallback tier a ring is sliced in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Pass {
    /// plain ear slicing
    Plain,
    /// after pruning collinear and duplicate points
    Filtered,
    /// after curing local self-intersections
    Cured,
}

/// Clips one merged ring into triangles, writing input index triples to `out`.
pub(crate) struct Clipper<'a, T: Float, N> {
    pub(crate) arena: &'a mut Arena<T>,
    /// disabled bounds select the plain ear test
    pub(crate) bounds: ZOrderBounds<T>,
    pub(crate) out: &'a mut Vec<N>,
}

impl<T: Float, N: Index> Clipper<'_, T, N> {
    /// Triangulates the ring at `start`.
    ///
    /// Rings that get stuck are pushed back onto `work` with the next pass, and the two
    /// halves of a split are pushed as fresh rings, so everything is sliced depth first.
    /// Returns the number of rings that had to be given up.
    pub(crate) fn run(&mut self, start: Handle, work: &mut Vec<(Handle, Pass)>) -> usize {
        let mut abandoned = 0;
        work.clear();
        work.push((start, Pass::Plain));

        while let Some((ring, pass)) = work.pop() {
            if pass == Pass::Plain && self.bounds.is_enabled() {
                self.arena.index_curve(ring, &self.bounds);
            }
            let Some(stuck) = self.slice(ring) else {
                continue;
            };

            match pass {
                Pass::Plain => {
                    log::debug!("no ears left, filtering points");
                    let ring = self.arena.prune(stuck, None);
                    work.push((ring, Pass::Filtered));
                }
                Pass::Filtered => {
                    log::debug!("no ears left, curing local self-intersections");
                    let ring = self.arena.prune(stuck, None);
                    let ring = self.cure_local_intersections(ring);
                    work.push((ring, Pass::Cured));
                }
                Pass::Cured => {
                    if !self.split(stuck, work) {
                        log::warn!(
                            "no valid diagonal found, dropping remaining ring at vertex {}",
                            self.arena[stuck].src
                        );
                        abandoned += 1;
                    }
                }
            }
        }

        abandoned
    }

    /// Cuts ears off the ring until it is used up, or returns the vertex where a full lap
    /// found none.
    fn slice(&mut self, mut ear: Handle) -> Option<Handle> {
        let mut stop = ear;
        loop {
            let Vertex { prev, next, .. } = self.arena[ear];
            if prev == next {
                return None;
            }

            if self.is_ear(ear) {
                self.emit(prev, ear, next);
                self.arena.unlink(ear);
                // skipping the next vertex leads to less sliver triangles
                ear = self.arena[next].next;
                stop = ear;
                continue;
            }

            ear = next;
            if ear == stop {
                return Some(ear);
            }
        }
    }

    fn emit(&mut self, a: Handle, b: Handle, c: Handle) {
        let arena = &*self.arena;
        self.out
            .extend([a, b, c].map(|h| N::from_usize(arena[h].src as usize)));
    }

    /// Whether `ear` and its two neighbours form a convex triangle with no reflex ring
    /// vertex inside or on it.
    fn is_ear(&self, ear: Handle) -> bool {
        let arena = &*self.arena;
        let Vertex { prev: a, next: c, .. } = arena[ear];
        if arena.turn(a, ear, c) >= T::zero() {
            // reflex, can't be an ear
            return false;
        }

        let corners = [arena[a].pos, arena[ear].pos, arena[c].pos];
        let lo = corners[1..]
            .iter()
            .fold(corners[0], |m, p| [m[0].min(p[0]), m[1].min(p[1])]);
        let hi = corners[1..]
            .iter()
            .fold(corners[0], |m, p| [m[0].max(p[0]), m[1].max(p[1])]);

        let blocks = |p: Handle| {
            let v = arena[p];
            let [x, y] = v.pos;
            x >= lo[0]
                && x <= hi[0]
                && y >= lo[1]
                && y <= hi[1]
                && in_triangle(corners[0], corners[1], corners[2], v.pos)
                && arena.turn(v.prev, p, v.next) >= T::zero()
        };

        if !self.bounds.is_enabled() {
            return !arena
                .walk(arena[c].next)
                .take_while(|&p| p != a)
                .any(&blocks);
        }

        // only vertices with a code inside the bbox's code range can lie in the bbox
        let (min_z, max_z) = (self.bounds.z_order(lo), self.bounds.z_order(hi));
        let mut down = iter::successors(arena[ear].prev_z, |&p| arena[p].prev_z)
            .take_while(|&p| arena[p].z.is_some_and(|z| z >= min_z));
        let mut up = iter::successors(arena[ear].next_z, |&p| arena[p].next_z)
            .take_while(|&p| arena[p].z.is_some_and(|z| z <= max_z));

        // walk both directions in step
        loop {
            match (down.next(), up.next()) {
                (None, None) => return true,
                (p, n) => {
                    if p.into_iter().chain(n).any(|h| h != a && h != c && blocks(h)) {
                        return false;
                    }
                }
            }
        }
    }

    /// Clips the triangle across every pair of crossing edges `a p` and `p.next b` that
    /// only touch the interior locally. Returns the pruned remainder.
    fn cure_local_intersections(&mut self, start: Handle) -> Handle {
        let mut start = start;
        let mut p = start;
        loop {
            let Vertex { prev: a, next, .. } = self.arena[p];
            let b = self.arena[next].next;

            let arena = &*self.arena;
            if !arena.coincident(a, b)
                && arena.edges_cross(a, p, next, b)
                && arena.locally_inside(a, b)
                && arena.locally_inside(b, a)
            {
                self.emit(a, p, b);
                self.arena.unlink(p);
                self.arena.unlink(next);
                (p, start) = (b, b);
            }

            p = self.arena[p].next;
            if p == start {
                return self.arena.prune(p, None);
            }
        }
    }

    /// Cuts the ring along the first valid diagonal and queues both halves.
    fn split(&mut self, start: Handle, work: &mut Vec<(Handle, Pass)>) -> bool {
        let arena = &*self.arena;
        let diagonal = arena.walk(start).find_map(|a| {
            let Vertex { prev, next, src, .. } = arena[a];
            arena
                .walk(arena[next].next)
                .take_while(|&b| b != prev)
                .find(|&b| src != arena[b].src && arena.is_valid_diagonal(a, b))
                .map(|b| (a, b))
        });
        let Some((a, b)) = diagonal else {
            return false;
        };
        log::debug!(
            "splitting ring along diagonal {}-{}",
            self.arena[a].src,
            self.arena[b].src
        );

        let c = self.arena.bridge(a, b);
        let after_a = self.arena[a].next;
        let a = self.arena.prune(a, Some(after_a));
        let after_c = self.arena[c].next;
        let c = self.arena.prune(c, Some(after_c));

        // the half holding `a` is sliced first
        work.extend([(c, Pass::Plain), (a, Pass::Plain)]);
        true
    }
}

impl<T: Float> Arena<T> {
    /// Whether the diagonal `a b` runs through the interior without crossing the ring.
    fn is_valid_diagonal(&self, a: Handle, b: Handle) -> bool {
        let (va, vb) = (self[a], self[b]);
        let apart = self[va.next].src != vb.src
            && self[va.prev].src != vb.src
            && !self.crosses_ring(a, b);

        let visible = self.locally_inside(a, b)
            && self.locally_inside(b, a)
            && self.middle_inside(a, b)
            // no opposite-facing sectors
            && (self.turn(va.prev, a, vb.prev) != T::zero()
                || self.turn(a, vb.prev, b) != T::zero());

        // zero-length diagonal between two convex corners
        let touching = self.coincident(a, b)
            && self.turn(va.prev, a, va.next) > T::zero()
            && self.turn(vb.prev, b, vb.next) > T::zero();

        apart && (visible || touching)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arena::test::{ring_of, sources};
    use alloc::vec;

    const NOTCHED: [[f64; 2]; 6] = [[0., 0.], [10., 0.], [10., 10.], [5., 10.], [6., 1.], [0., 10.]];

    const L_SHAPE: [[f64; 2]; 6] = [[0., 0.], [4., 0.], [4., 1.], [1., 1.], [1., 4.], [0., 4.]];

    fn clipper<'a>(arena: &'a mut Arena<f64>, out: &'a mut Vec<u32>) -> Clipper<'a, f64, u32> {
        Clipper {
            arena,
            bounds: ZOrderBounds::disabled(),
            out,
        }
    }

    fn clip(points: &[[f64; 2]], bounds: ZOrderBounds<f64>) -> (Vec<u32>, usize) {
        let (mut arena, last) = ring_of(points);
        let mut out = vec![];
        let abandoned = Clipper {
            arena: &mut arena,
            bounds,
            out: &mut out,
        }
        .run(last, &mut vec![]);
        (out, abandoned)
    }

    #[test]
    fn test_is_ear() {
        let mut out = vec![];
        // square in clipping order: every corner is an ear
        let (mut arena, last) = ring_of(&[[0., 0.], [1., 0.], [1., 1.], [0., 1.]]);
        assert!(clipper(&mut arena, &mut out).is_ear(last));

        // the notch vertex of an arrow is reflex
        let (mut arena, last) = ring_of(&[[0., 0.], [4., 2.], [0., 4.], [1., 2.]]);
        assert!(!clipper(&mut arena, &mut out).is_ear(last));
    }

    #[test]
    fn test_is_ear_rejects_contained_reflex_vertex() {
        // vertex 4 is a reflex corner lying inside triangle (0, 1, 2)
        let (mut arena, last) = ring_of(&NOTCHED);
        let v1 = arena.walk(arena[last].next).nth(1).unwrap();
        let mut out = vec![];
        assert!(!clipper(&mut arena, &mut out).is_ear(v1));
    }

    #[test]
    fn test_hashed_matches_plain() {
        let (plain, _) = clip(&NOTCHED, ZOrderBounds::disabled());
        let (hashed, _) = clip(&NOTCHED, ZOrderBounds::from_points(&NOTCHED));
        assert_eq!(plain, vec![4, 5, 0, 1, 2, 3, 4, 0, 1, 1, 3, 4]);
        assert_eq!(plain, hashed);
    }

    #[test]
    fn test_convex_ring() {
        let (triangles, abandoned) = clip(
            &[[0., 0.], [1., 0.], [1.309, 0.951], [0.5, 1.539], [-0.309, 0.951]],
            ZOrderBounds::disabled(),
        );
        assert_eq!(triangles, vec![3, 4, 0, 0, 1, 2, 2, 3, 0]);
        assert_eq!(abandoned, 0);
    }

    #[test]
    fn test_cure_local_intersections() {
        // a ring whose edges 0-1 and 2-3 cross right after each other
        let (mut arena, last) = ring_of(&[[0., 0.], [2., 2.], [2., 0.], [0., 2.], [-2., 1.]]);
        let start = arena.walk(arena[last].next).nth(1).unwrap();
        let mut out = vec![];
        let end = clipper(&mut arena, &mut out).cure_local_intersections(start);
        assert_eq!(out, vec![0, 1, 3]);
        assert_eq!(sources(&arena, end), vec![3, 4, 0]);
    }

    #[test]
    fn test_split_queues_both_halves() {
        let (mut arena, last) = ring_of(&L_SHAPE);
        let mut out = vec![];
        let mut work = vec![];
        assert!(clipper(&mut arena, &mut out).split(last, &mut work));
        assert_eq!(work.len(), 2);
        assert!(work.iter().all(|&(_, pass)| pass == Pass::Plain));
        let total: usize = work.iter().map(|&(h, _)| sources(&arena, h).len()).sum();
        assert_eq!(total, 8);
    }

    #[test]
    fn test_split_gives_up_on_triangle() {
        let (mut arena, last) = ring_of(&[[0., 0.], [1., 0.], [0., 1.]]);
        let mut out = vec![];
        let mut work = vec![];
        assert!(!clipper(&mut arena, &mut out).split(last, &mut work));
        assert!(work.is_empty());
    }

    #[test]
    fn test_valid_diagonal_on_l_shape() {
        let (arena, last) = ring_of(&L_SHAPE);
        let v = |k| arena.walk(arena[last].next).nth(k).unwrap();
        assert!(arena.is_valid_diagonal(v(0), v(3)));
        // outside the notch
        assert!(!arena.is_valid_diagonal(v(2), v(4)));
        // adjacent vertices
        assert!(!arena.is_valid_diagonal(v(0), v(1)));
    }
}
