//! Wiener normal equations (`M`, `H`) for one restoration unit.
//!
//! With `D` the mean-subtracted degraded block and `S` the mean-subtracted
//! source, tap `k = a * win + b` addresses the neighbor `D(y + a, x + b)` of
//! source pixel `(y, x)`:
//!
//! ```text
//! M[k]    = sum S(y, x) * D(y + a, x + b)
//! H[k][l] = sum D(y + a1, x + b1) * D(y + a2, x + b2)
//! ```
//!
//! [`compute_stats_ref`] evaluates these sums directly. [`compute_stats_core`]
//! produces identical totals while doing O(win) work per `H` entry for most
//! entries: shifting both taps of an entry down (or right) by one only swaps
//! the first row (column) of the window for the one past its end.

#![forbid(unsafe_code)]

use crate::include::common::intops::apply_sign;
use crate::include::common::intops::round_up;
use crate::src::levels::WienerWin;
use crate::src::wiener_avg::AvgBuffers;
use std::cmp;

pub const WIENER_STATS_DOWNSAMPLE_FACTOR: usize = 4;

/// Rows of `width` products that fit a signed 32-bit partial sum at
/// `bitdepth`, with 4 bits of headroom for the mean-subtracted range.
pub const fn h_allowed(bitdepth: u8, width: usize) -> usize {
    let available_bits = 32 - 1 - 2 * bitdepth as u32 + 4;
    let h = (1usize << available_bits) / round_up(width, 16);
    if h == 0 {
        1
    } else {
        h
    }
}

/// Products of two `bitdepth` samples that fit a signed 32-bit partial sum.
pub const fn fold_span(bitdepth: u8) -> u32 {
    let max = (1u64 << bitdepth) - 1;
    (i32::MAX as u64 / (max * max)) as u32
}

/// Fold budget for a unit `width` samples wide.
fn stats_fold_span(bitdepth: u8, width: usize) -> u32 {
    let rows = h_allowed(bitdepth, width) * round_up(width, 16);
    cmp::min(fold_span(bitdepth) as usize, rows) as u32
}

/// 32-bit running sum spilled into 64 bits every `span` products.
pub(crate) struct FoldAcc {
    total: i64,
    part: i32,
    room: u32,
    span: u32,
}

impl FoldAcc {
    #[inline(always)]
    pub fn new(span: u32) -> Self {
        let span = cmp::max(span, 1);
        Self {
            total: 0,
            part: 0,
            room: span,
            span,
        }
    }

    #[inline(always)]
    pub fn add(&mut self, product: i32) {
        if self.room == 0 {
            self.flush();
        }
        self.part += product;
        self.room -= 1;
    }

    #[inline(always)]
    pub fn flush(&mut self) {
        self.total += self.part as i64;
        self.part = 0;
        self.room = self.span;
    }

    #[inline(always)]
    pub fn finish(mut self) -> i64 {
        self.flush();
        self.total
    }
}

/// The one inner primitive of the statistics engine.
pub(crate) trait WindowDot {
    /// `sum a[y * a_stride + x] * b[y * b_stride + x]` over `x < w`, `y < h`.
    ///
    /// No 32-bit partial sum may hold more than `span` products.
    fn window_dot(
        &self,
        a: &[i16],
        a_stride: usize,
        b: &[i16],
        b_stride: usize,
        w: usize,
        h: usize,
        span: u32,
    ) -> i64;
}

pub(crate) struct ScalarDot;

impl WindowDot for ScalarDot {
    fn window_dot(
        &self,
        a: &[i16],
        a_stride: usize,
        b: &[i16],
        b_stride: usize,
        w: usize,
        h: usize,
        span: u32,
    ) -> i64 {
        let mut acc = FoldAcc::new(span);
        for y in 0..h {
            let a = &a[y * a_stride..][..w];
            let b = &b[y * b_stride..][..w];
            for (&a, &b) in a.iter().zip(b) {
                acc.add(a as i32 * b as i32);
            }
        }
        acc.finish()
    }
}

/// Direct double sum over the unit. Writes `M` and the upper triangle of `H`.
///
/// With `downsample`, only every [`WIENER_STATS_DOWNSAMPLE_FACTOR`]th row is
/// visited and weighted by the number of rows it stands for.
pub fn compute_stats_ref(
    bufs: &AvgBuffers,
    win: WienerWin,
    downsample: bool,
    m: &mut [i64],
    h: &mut [i64],
) {
    let (wn, n) = (win.taps(), win.taps2());
    let m = &mut m[..n];
    let h = &mut h[..n * n];
    m.fill(0);
    h.fill(0);

    let step = if downsample {
        WIENER_STATS_DOWNSAMPLE_FACTOR
    } else {
        1
    };
    let mut taps = [0i32; 49];
    for y in (0..bufs.h).step_by(step) {
        let weight = cmp::min(step, bufs.h - y) as i64;
        for x in 0..bufs.w {
            let sv = bufs.s_at(y, x) as i64;
            for a in 0..wn {
                for b in 0..wn {
                    taps[a * wn + b] = bufs.d_at(y + a, x + b) as i32;
                }
            }
            for k in 0..n {
                m[k] += weight * sv * taps[k] as i64;
                let row = &mut h[k * n..][..n];
                for l in k..n {
                    row[l] += weight * (taps[k] * taps[l]) as i64;
                }
            }
        }
    }
}

/// Incremental evaluation of `M` and the upper triangle of `H`.
///
/// `H` is walked as a `WIN x WIN` grid of blocks `(a1, a2)`, each holding the
/// entries `(a1, b1) x (a2, b2)`. Full window dot products are only taken for
/// `M`, the first row of `H`, and the left column of the top blocks. Every
/// other entry is its up-left neighbor (same block, or block `(a1-1, a2-1)`)
/// plus one incoming and minus one outgoing row or column.
pub(crate) fn compute_stats_core<const WIN: usize, K: WindowDot>(
    kernel: &K,
    bufs: &AvgBuffers,
    bitdepth: u8,
    m: &mut [i64],
    hm: &mut [i64],
) {
    let n = WIN * WIN;
    let (w, h) = (bufs.w, bufs.h);
    let (d, ds) = (bufs.d, bufs.d_stride);
    let span = stats_fold_span(bitdepth, w);

    let at = |y: usize, x: usize| y * ds + x;
    let hi = |a1: usize, b1: usize, a2: usize, b2: usize| (a1 * WIN + b1) * n + a2 * WIN + b2;
    let dot = |o1: usize, o2: usize, w: usize, h: usize| {
        kernel.window_dot(&d[o1..], ds, &d[o2..], ds, w, h, span)
    };
    // Window row `y` (column `x`) of the product D(.+a1, .+b1) * D(.+a2, .+b2).
    let row = |y: usize, a1: usize, b1: usize, a2: usize, b2: usize| {
        dot(at(y + a1, b1), at(y + a2, b2), w, 1)
    };
    let col = |x: usize, a1: usize, b1: usize, a2: usize, b2: usize| {
        dot(at(a1, x + b1), at(a2, x + b2), 1, h)
    };

    // M and the first row of H.
    for a in 0..WIN {
        for b in 0..WIN {
            m[a * WIN + b] = kernel.window_dot(bufs.s, bufs.s_stride, &d[at(a, b)..], ds, w, h, span);
            hm[hi(0, 0, a, b)] = dot(at(0, 0), at(a, b), w, h);
        }
    }

    // Left column of the off-diagonal top blocks.
    for b1 in 1..WIN {
        for a2 in 1..WIN {
            hm[hi(0, b1, a2, 0)] = dot(at(0, b1), at(a2, 0), w, h);
        }
    }

    for a1 in 0..WIN {
        for a2 in a1..WIN {
            if a1 > 0 {
                // Top edge, then left edge, one row below block (a1-1, a2-1).
                for b2 in 0..WIN {
                    hm[hi(a1, 0, a2, b2)] = hm[hi(a1 - 1, 0, a2 - 1, b2)]
                        + row(h, a1 - 1, 0, a2 - 1, b2)
                        - row(0, a1 - 1, 0, a2 - 1, b2);
                }
                if a2 > a1 {
                    for b1 in 1..WIN {
                        hm[hi(a1, b1, a2, 0)] = hm[hi(a1 - 1, b1, a2 - 1, 0)]
                            + row(h, a1 - 1, b1, a2 - 1, 0)
                            - row(0, a1 - 1, b1, a2 - 1, 0);
                    }
                }
            }

            // Interior, one column right of its neighbor. Diagonal blocks
            // only keep b2 >= b1.
            for b1 in 1..WIN {
                let b2_start = if a1 == a2 { b1 } else { 1 };
                for b2 in b2_start..WIN {
                    hm[hi(a1, b1, a2, b2)] = hm[hi(a1, b1 - 1, a2, b2 - 1)]
                        + col(w, a1, b1 - 1, a2, b2 - 1)
                        - col(0, a1, b1 - 1, a2, b2 - 1);
                }
            }
        }
    }
}

/// [`compute_stats_core`] for a runtime window size.
pub(crate) fn compute_stats_incremental<K: WindowDot>(
    kernel: &K,
    bufs: &AvgBuffers,
    win: WienerWin,
    bitdepth: u8,
    m: &mut [i64],
    h: &mut [i64],
) {
    match win {
        WienerWin::Win3 => compute_stats_core::<3, K>(kernel, bufs, bitdepth, m, h),
        WienerWin::Win5 => compute_stats_core::<5, K>(kernel, bufs, bitdepth, m, h),
        WienerWin::Win7 => compute_stats_core::<7, K>(kernel, bufs, bitdepth, m, h),
    }
}

/// Mirror the upper triangle of the `n x n` matrix `h` into the lower one.
pub fn complete_symmetric(h: &mut [i64], n: usize) {
    for i in 0..n {
        for j in i + 1..n {
            h[j * n + i] = h[i * n + j];
        }
    }
}

/// Scale statistics gathered at `bitdepth` back to the 8-bit range.
///
/// Division truncates toward zero: `-7` at 10 bits becomes `-1`, not `-2`.
pub fn normalize_stats(m: &mut [i64], h: &mut [i64], bitdepth: u8) {
    let shift = bitdepth.saturating_sub(8);
    if shift == 0 {
        return;
    }
    for v in m.iter_mut().chain(h.iter_mut()) {
        *v = apply_sign(v.unsigned_abs() >> shift, *v);
    }
}
