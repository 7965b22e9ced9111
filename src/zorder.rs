//! Z-order (Morton) curve index threaded through the arena.

use num_traits::float::Float;

use crate::arena::{Arena, Handle};

/// Largest quantized coordinate; coords are mapped into a 15-bit integer range.
const Z_RANGE: f64 = 32767.0;

/// Transform from polygon coordinates to the quantized z-order grid.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ZOrderBounds<T: Float> {
    min: [T; 2],
    /// inverse of the longer side of the bbox; zero disables the index
    inv_size: T,
}

impl<T: Float> ZOrderBounds<T> {
    pub(crate) fn disabled() -> Self {
        Self {
            min: [T::zero(); 2],
            inv_size: T::zero(),
        }
    }

    /// bbox of the given points; disabled if they span no area in either direction
    pub(crate) fn from_points(points: &[[T; 2]]) -> Self {
        let Some((&first, rest)) = points.split_first() else {
            return Self::disabled();
        };
        let (min, max) = rest.iter().fold((first, first), |(lo, hi), &p| {
            ([lo[0].min(p[0]), lo[1].min(p[1])], [hi[0].max(p[0]), hi[1].max(p[1])])
        });
        let size = (max[0] - min[0]).max(max[1] - min[1]);
        let inv_size = if size != T::zero() {
            T::one() / size
        } else {
            T::zero()
        };
        Self { min, inv_size }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.inv_size != T::zero()
    }

    /// Morton code of a point: x on the even bits, y on the odd bits.
    pub(crate) fn z_order(&self, pos: [T; 2]) -> u32 {
        let range = T::from(Z_RANGE).unwrap_or_else(T::max_value);
        let [x, y] =
            [0, 1].map(|k| quantize((range * (pos[k] - self.min[k]) * self.inv_size).floor()));
        spread_bits(x) | (spread_bits(y) << 1)
    }
}

fn quantize<T: Float>(v: T) -> u32 {
    let range = T::from(Z_RANGE).unwrap_or_else(T::max_value);
    // NaN and out-of-bbox coords are clamped to the grid edge
    v.max(T::zero()).min(range).to_u32().unwrap_or(0)
}

/// Spreads the low 16 bits of `v` over the even bit positions.
fn spread_bits(v: u32) -> u32 {
    [(8, 0x00FF_00FF), (4, 0x0F0F_0F0F), (2, 0x3333_3333), (1, 0x5555_5555)]
        .into_iter()
        .fold(v, |v, (shift, mask)| (v | (v << shift)) & mask)
}

impl<T: Float> Arena<T> {
    /// Threads the z chain through the ring at `start` and sorts it by Morton code.
    ///
    /// Vertices that already carry a code keep it.
    pub(crate) fn index_curve(&mut self, start: Handle, bounds: &ZOrderBounds<T>) {
        let mut p = start;
        loop {
            let v = &mut self[p];
            if v.z.is_none() {
                v.z = Some(bounds.z_order(v.pos));
            }
            (v.prev_z, v.next_z) = (Some(v.prev), Some(v.next));
            p = v.next;
            if p == start {
                break;
            }
        }

        let tail = self[start].prev;
        self[start].prev_z = None;
        self[tail].next_z = None;
        self.sort_z(start);
    }

    /// Bottom-up merge sort of the open z chain starting at `head`, doubling the run width
    /// on every sweep. Equal codes keep their chain order. Returns the new head.
    pub(crate) fn sort_z(&mut self, head: Handle) -> Handle {
        let mut head = head;
        let mut width = 1;
        loop {
            let mut sorted: (Option<Handle>, Option<Handle>) = (None, None);
            let mut runs = 0;
            let mut left = Some(head);

            while let Some(run) = left {
                runs += 1;
                let mut l = Some(run);
                let mut r = self.z_skip(run, width);
                let (mut l_len, mut r_len) = (width, width);

                loop {
                    let from_left = match (l.filter(|_| l_len > 0), r.filter(|_| r_len > 0)) {
                        (Some(a), Some(b)) => self[a].z <= self[b].z,
                        (Some(_), None) => true,
                        (None, Some(_)) => false,
                        (None, None) => break,
                    };
                    let cursor = if from_left {
                        l_len -= 1;
                        &mut l
                    } else {
                        r_len -= 1;
                        &mut r
                    };
                    let Some(e) = *cursor else { break };
                    *cursor = self[e].next_z;
                    self.z_append(&mut sorted, e);
                }

                left = r;
            }

            let (Some(first), Some(last)) = sorted else {
                return head;
            };
            self[last].next_z = None;
            head = first;
            if runs <= 1 {
                return head;
            }
            width *= 2;
        }
    }

    /// The vertex `n` steps down the z chain from `h`.
    fn z_skip(&self, h: Handle, n: usize) -> Option<Handle> {
        (0..n).try_fold(h, |p, _| self[p].next_z)
    }

    fn z_append(&mut self, (head, tail): &mut (Option<Handle>, Option<Handle>), e: Handle) {
        self[e].prev_z = *tail;
        match *tail {
            Some(t) => self[t].next_z = Some(e),
            None => *head = Some(e),
        }
        *tail = Some(e);
    }
}
