//! Storage for the vertex rings of one triangulation call.
//!
//! Every ring is a circular doubly linked list threaded through one [`Arena`]. Vertices are
//! addressed by [`Handle`]s and are never freed during a call: unlinking only detaches them,
//! and splitting or bridging appends fresh copies.

use alloc::vec::Vec;
use core::num::NonZeroU32;
use core::ops::{self, Range};
use num_traits::float::Float;

use crate::geom::{cross, ring_area, segments_intersect};

/// Slot of a vertex in an [`Arena`]. Slot 0 is a sentinel, so a handle is never zero.
pub(crate) type Handle = NonZeroU32;

/// A polygon vertex, linked into exactly one ring and, once indexed, into a z-order chain.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Vertex<T> {
    /// position of the vertex in the caller's data, in vertex units
    pub(crate) src: u32,
    pub(crate) pos: [T; 2],
    pub(crate) prev: Handle,
    pub(crate) next: Handle,
    /// Morton code, filled in by the first indexing pass that reaches this vertex
    pub(crate) z: Option<u32>,
    pub(crate) prev_z: Option<Handle>,
    pub(crate) next_z: Option<Handle>,
    /// single-vertex hole; pruning keeps it
    pub(crate) steiner: bool,
}

impl<T> Vertex<T> {
    fn detached(src: u32, pos: [T; 2]) -> Self {
        Self {
            src,
            pos,
            prev: Handle::MIN,
            next: Handle::MIN,
            z: None,
            prev_z: None,
            next_z: None,
            steiner: false,
        }
    }
}

pub(crate) struct Arena<T> {
    slots: Vec<Vertex<T>>,
}

impl<T> ops::Index<Handle> for Arena<T> {
    type Output = Vertex<T>;

    fn index(&self, h: Handle) -> &Vertex<T> {
        &self.slots[h.get() as usize]
    }
}

impl<T> ops::IndexMut<Handle> for Arena<T> {
    fn index_mut(&mut self, h: Handle) -> &mut Vertex<T> {
        &mut self.slots[h.get() as usize]
    }
}

impl<T: Float> Arena<T> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Forgets every ring and makes room for `capacity` vertices.
    pub(crate) fn reset(&mut self, capacity: usize) {
        self.slots.clear();
        self.slots.reserve(capacity + 1);
        self.slots
            .push(Vertex::detached(u32::MAX, [T::infinity(); 2]));
    }

    fn next_handle(&self) -> Handle {
        u32::try_from(self.slots.len())
            .ok()
            .and_then(Handle::new)
            .expect("arena holds its sentinel and fewer than u32::MAX vertices")
    }

    /// Appends a vertex linked in right after `after`, or as a ring of its own.
    pub(crate) fn push(&mut self, src: u32, pos: [T; 2], after: Option<Handle>) -> Handle {
        let h = self.next_handle();
        let mut v = Vertex::detached(src, pos);
        match after {
            Some(prev) => {
                let next = self[prev].next;
                (v.prev, v.next) = (prev, next);
                self[prev].next = h;
                self[next].prev = h;
            }
            None => (v.prev, v.next) = (h, h),
        }
        self.slots.push(v);
        h
    }

    /// Builds a ring over `points[range]` whose shoelace sign matches `clockwise`, reversing
    /// the input order when needed. A closing vertex equal to the first one is dropped.
    pub(crate) fn ring(
        &mut self,
        points: &[[T; 2]],
        range: Range<usize>,
        clockwise: bool,
    ) -> Option<Handle> {
        let forward = clockwise == (ring_area(&points[range.clone()]) > T::zero());
        let mut last = None;
        let mut append = |k: usize| last = Some(self.push(k as u32, points[k], last));
        if forward {
            range.for_each(&mut append);
        } else {
            range.rev().for_each(&mut append);
        }

        let last = last?;
        if self.coincident(last, self[last].next) {
            let (_, next) = self.unlink(last);
            return Some(next);
        }
        Some(last)
    }

    /// Detaches `h` from its ring and its z-order chain; returns its former ring neighbours.
    pub(crate) fn unlink(&mut self, h: Handle) -> (Handle, Handle) {
        let v = self[h];
        self[v.next].prev = v.prev;
        self[v.prev].next = v.next;
        if let Some(prev_z) = v.prev_z {
            self[prev_z].next_z = v.next_z;
        }
        if let Some(next_z) = v.next_z {
            self[next_z].prev_z = v.prev_z;
        }
        (v.prev, v.next)
    }

    /// Removes vertices that repeat their successor or lie on a straight line between their
    /// neighbours, from `start` up to `stop` (a full lap when `None`). Returns a vertex that
    /// is still linked.
    pub(crate) fn prune(&mut self, start: Handle, stop: Option<Handle>) -> Handle {
        let mut stop = stop.unwrap_or(start);
        let mut p = start;
        loop {
            let v = self[p];
            let redundant = !v.steiner
                && (self.coincident(p, v.next) || self.turn(v.prev, p, v.next) == T::zero());
            if redundant {
                let (prev, next) = self.unlink(p);
                if prev == next {
                    return prev;
                }
                (p, stop) = (prev, prev);
            } else {
                p = v.next;
                if p == stop {
                    return stop;
                }
            }
        }
    }

    /// Joins `a` and `b` with a pair of opposite edges, duplicating both vertices.
    ///
    /// Afterwards `a -> b` is an edge, and the copies close off the rest. If `a` and `b`
    /// shared a ring it is cut in two, with the returned copy of `b` in the part that does
    /// not contain `a`; if they were on different rings, the rings are merged.
    pub(crate) fn bridge(&mut self, a: Handle, b: Handle) -> Handle {
        let a2 = self.next_handle();
        let b2 = a2.saturating_add(1);

        let a_next = self[a].next;
        self[a].next = b;
        self[a_next].prev = a2;
        let b_prev = self[b].prev;
        self[b].prev = a;
        self[b_prev].next = b2;

        let mut a_copy = Vertex::detached(self[a].src, self[a].pos);
        (a_copy.prev, a_copy.next) = (b2, a_next);
        let mut b_copy = Vertex::detached(self[b].src, self[b].pos);
        (b_copy.prev, b_copy.next) = (b_prev, a2);
        self.slots.extend([a_copy, b_copy]);
        b2
    }

    /// Handles of the ring through `start`, beginning there.
    pub(crate) fn walk(&self, start: Handle) -> Walk<'_, T> {
        Walk {
            arena: self,
            start,
            cur: Some(start),
        }
    }

    /// [`cross`] of three vertices.
    pub(crate) fn turn(&self, p: Handle, q: Handle, r: Handle) -> T {
        cross(self[p].pos, self[q].pos, self[r].pos)
    }

    pub(crate) fn coincident(&self, a: Handle, b: Handle) -> bool {
        self[a].pos == self[b].pos
    }

    /// Whether segments `p1 q1` and `p2 q2` between vertices touch.
    pub(crate) fn edges_cross(&self, p1: Handle, q1: Handle, p2: Handle, q2: Handle) -> bool {
        segments_intersect(self[p1].pos, self[q1].pos, self[p2].pos, self[q2].pos)
    }

    /// Whether the segment `a b` crosses an edge of the ring through `a`, ignoring edges
    /// that end at the input point of `a` or `b`.
    pub(crate) fn crosses_ring(&self, a: Handle, b: Handle) -> bool {
        let ends = [self[a].src, self[b].src];
        self.walk(a).any(|p| {
            let q = self[p].next;
            !ends.contains(&self[p].src)
                && !ends.contains(&self[q].src)
                && self.edges_cross(p, q, a, b)
        })
    }

    /// Whether the segment from `a` towards `b` leaves `a` on the interior side of its ring.
    pub(crate) fn locally_inside(&self, a: Handle, b: Handle) -> bool {
        let Vertex { prev, next, .. } = self[a];
        if self.turn(prev, a, next) < T::zero() {
            self.turn(a, b, next) >= T::zero() && self.turn(a, prev, b) >= T::zero()
        } else {
            self.turn(a, b, prev) < T::zero() || self.turn(a, next, b) < T::zero()
        }
    }

    /// Even-odd test of the midpoint of `a b` against the ring through `a`.
    pub(crate) fn middle_inside(&self, a: Handle, b: Handle) -> bool {
        let two = T::one() + T::one();
        let ([ax, ay], [bx, by]) = (self[a].pos, self[b].pos);
        let (mx, my) = ((ax + bx) / two, (ay + by) / two);
        self.walk(a).fold(false, |inside, p| {
            let [px, py] = self[p].pos;
            let [qx, qy] = self[self[p].next].pos;
            let crossing = (py > my) != (qy > my)
                && qy != py
                && mx < (qx - px) * (my - py) / (qy - py) + px;
            inside ^ crossing
        })
    }
}

/// Iterator returned by [`Arena::walk`].
pub(crate) struct Walk<'a, T> {
    arena: &'a Arena<T>,
    start: Handle,
    cur: Option<Handle>,
}

impl<T> Iterator for Walk<'_, T> {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        let h = self.cur?;
        let next = self.arena[h].next;
        self.cur = (next != self.start).then_some(next);
        Some(h)
    }
}
