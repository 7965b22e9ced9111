//! Hole elimination: every hole ring is bridged into the outer ring.

use core::ops::Range;
use num_traits::float::Float;

use crate::arena::{Arena, Handle};
use crate::geom::{cmp_xy, in_triangle};
use crate::Earcut;

impl<T: Float> Earcut<T> {
    /// Splices every hole in `holes` into the ring at `outer`, leaving a single ring.
    ///
    /// Holes are wound opposite to the outer ring and processed from left to right. Holes
    /// sharing a leftmost point keep their declaration order.
    pub(crate) fn merge_holes(
        &mut self,
        holes: impl Iterator<Item = Range<usize>>,
        outer: Handle,
    ) -> Handle {
        self.queue.clear();
        for range in holes {
            let Some(ring) = self.arena.ring(&self.points, range, false) else {
                continue;
            };
            if self.arena[ring].next == ring {
                self.arena[ring].steiner = true;
            }
            self.queue.push(self.arena.leftmost(ring));
        }

        let arena = &self.arena;
        self.queue
            .sort_by(|&a, &b| cmp_xy(arena[a].pos, arena[b].pos));

        self.queue
            .iter()
            .fold(outer, |outer, &hole| self.arena.splice_hole(hole, outer))
    }
}

impl<T: Float> Arena<T> {
    /// The vertex with the smallest x in the ring at `start`, lowest y on ties.
    fn leftmost(&self, start: Handle) -> Handle {
        self.walk(start).fold(start, |best, p| {
            let ([px, py], [bx, by]) = (self[p].pos, self[best].pos);
            if px < bx || (px == bx && py < by) {
                p
            } else {
                best
            }
        })
    }

    /// Bridges the hole vertex `hole` into the ring at `outer` and tidies both cut points.
    /// A hole with no visible outer vertex is left out.
    fn splice_hole(&mut self, hole: Handle, outer: Handle) -> Handle {
        let Some(anchor) = self.find_bridge(hole, outer) else {
            return outer;
        };
        let copy = self.bridge(anchor, hole);

        let after_copy = self[copy].next;
        self.prune(copy, Some(after_copy));
        let after_anchor = self[anchor].next;
        self.prune(anchor, Some(after_anchor))
    }

    /// Eberly's search for an outer vertex that `hole` can see.
    ///
    /// A ray cast left from the hole vertex hits the nearest outer edge; its endpoint with
    /// the smaller x is the candidate. Reflex outer vertices inside the triangle spanned by
    /// the hole vertex, the hit point and the candidate may block it, in which case the one
    /// with the smallest angle to the ray wins.
    fn find_bridge(&self, hole: Handle, outer: Handle) -> Option<Handle> {
        let [hx, hy] = self[hole].pos;
        let mut qx = T::neg_infinity();
        let mut candidate = None;

        for p in self.walk(outer) {
            let next = self[p].next;
            let ([px, py], [nx, ny]) = (self[p].pos, self[next].pos);
            if hy <= py && hy >= ny && ny != py {
                let x = px + (hy - py) * (nx - px) / (ny - py);
                if x <= hx && x > qx {
                    qx = x;
                    let end = if px < nx { p } else { next };
                    if x == hx {
                        // the hole touches this edge
                        return Some(end);
                    }
                    candidate = Some(end);
                }
            }
        }

        let stop = candidate?;
        let m = self[stop].pos;
        let (a, c) = if hy < m[1] {
            ([hx, hy], [qx, hy])
        } else {
            ([qx, hy], [hx, hy])
        };

        let mut best = stop;
        let mut tan_min = T::infinity();
        for p in self.walk(stop) {
            let [px, py] = self[p].pos;
            if !(hx >= px && px >= m[0] && hx != px && in_triangle(a, m, c, [px, py])) {
                continue;
            }
            let tan = (hy - py).abs() / (hx - px);
            let bx = self[best].pos[0];
            let closer = tan < tan_min
                || (tan == tan_min && (px > bx || (px == bx && self.sector_contains(best, p))));
            if closer && self.locally_inside(p, hole) {
                best = p;
                tan_min = tan;
            }
        }
        Some(best)
    }

    /// Whether the interior sector at `m` contains the one at `p`; both sit on one point.
    fn sector_contains(&self, m: Handle, p: Handle) -> bool {
        let (vm, vp) = (self[m], self[p]);
        self.turn(vm.prev, m, vp.prev) < T::zero() && self.turn(vp.next, m, vm.next) < T::zero()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::arena::test::{ring_of, sources};
    use alloc::vec;

    const SQUARE: [[f64; 2]; 4] = [[0., 0.], [10., 0.], [10., 10.], [0., 10.]];

    #[test]
    fn test_leftmost_prefers_lower_y() {
        let (arena, last) = ring_of(&[[3., 0.], [0., 5.], [4., 4.], [0., 2.]]);
        assert_eq!(arena[arena.leftmost(last)].src, 3);
    }

    #[test]
    fn test_find_bridge_picks_visible_vertex() {
        let (mut arena, outer) = ring_of(&SQUARE);
        let hole = arena.push(9, [5., 5.], None);
        let bridge = arena.find_bridge(hole, outer).unwrap();
        assert_eq!((arena[bridge].src, arena[bridge].pos), (0, [0., 0.]));
    }

    #[test]
    fn test_find_bridge_touching_outer() {
        let (mut arena, outer) = ring_of(&SQUARE);
        let hole = arena.push(9, [0., 5.], None);
        let bridge = arena.find_bridge(hole, outer).unwrap();
        assert_eq!(arena[bridge].pos[0], 0.);
    }

    #[test]
    fn test_find_bridge_outside_outer() {
        let (mut arena, outer) = ring_of(&SQUARE);
        let hole = arena.push(9, [-5., 5.], None);
        assert!(arena.find_bridge(hole, outer).is_none());
        assert_eq!(arena.splice_hole(hole, outer), outer);
    }

    #[test]
    fn test_merge_holes_builds_single_ring() {
        let mut earcut = Earcut::<f64>::new();
        earcut.points = SQUARE.to_vec();
        earcut
            .points
            .extend([[4., 4.], [6., 4.], [6., 6.], [4., 6.]]);
        earcut.arena.reset(16);
        let outer = earcut.arena.ring(&earcut.points, 0..4, true).unwrap();
        let merged = earcut.merge_holes([4..8].into_iter(), outer);
        // hole reversed and spliced in after a duplicated bridge vertex
        assert_eq!(
            sources(&earcut.arena, merged),
            vec![4, 7, 6, 5, 4, 0, 1, 2, 3, 0]
        );
    }

    #[test]
    fn test_single_vertex_hole_is_steiner() {
        let mut earcut = Earcut::<f64>::new();
        earcut.points = SQUARE.to_vec();
        earcut.points.push([5., 5.]);
        earcut.arena.reset(8);
        let outer = earcut.arena.ring(&earcut.points, 0..4, true).unwrap();
        let merged = earcut.merge_holes([4..5].into_iter(), outer);
        // the copy of the steiner point is not flagged and gets pruned as a duplicate
        assert_eq!(sources(&earcut.arena, merged), vec![4, 0, 1, 2, 3, 0]);
    }
}
