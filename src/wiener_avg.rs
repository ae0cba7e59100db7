//! Mean subtraction ahead of the Wiener statistics.
//!
//! Both the source and the degraded planes are shifted by the truncated mean
//! of the source rectangle, so every sample fits an `i16` and the `M`/`H`
//! products stay small enough for 32-bit partial sums.

#![forbid(unsafe_code)]

use crate::include::common::intops::round_up;
use crate::src::levels::RestorationRect;
use crate::src::levels::WienerWin;

/// Largest restoration unit the scratch buffers are sized for, per dimension.
pub const MAX_RESTORATION_UNIT: usize = 256 * 3 / 2;

/// Half-window of the widest (7-tap) filter.
pub const WIENER_HALO_MAX: usize = 3;

const S_STRIDE_MAX: usize = round_up(MAX_RESTORATION_UNIT, 16);
const D_STRIDE_MAX: usize = round_up(MAX_RESTORATION_UNIT + 2 * WIENER_HALO_MAX, 16);

pub const LR_S_LEN: usize = S_STRIDE_MAX * MAX_RESTORATION_UNIT;
pub const LR_D_LEN: usize = D_STRIDE_MAX * (MAX_RESTORATION_UNIT + 2 * WIENER_HALO_MAX);

/// Samples of scratch needed by one statistics call of any supported size.
pub const LR_SCRATCH_LEN: usize = LR_S_LEN + LR_D_LEN;

/// Truncated mean of `src` over `rect`.
pub fn find_average<P: Copy + Into<u32>>(src: &[P], stride: usize, rect: &RestorationRect) -> i32 {
    let (w, h) = (rect.width(), rect.height());
    let mut sum = 0u64;
    for y in rect.v_start..rect.v_end {
        let row = &src[y * stride + rect.h_start..][..w];
        sum += row.iter().map(|&p| p.into() as u64).sum::<u64>();
    }
    (sum / (w * h) as u64) as i32
}

/// Mean-subtracted views of one restoration unit.
///
/// `s` is `w x h` and `d` is `(w + 2r) x (h + 2r)`, where `d(y, x)` sits
/// `r` rows above and `r` columns left of the matching source pixel.
pub struct AvgBuffers<'a> {
    pub s: &'a [i16],
    pub s_stride: usize,
    pub d: &'a [i16],
    pub d_stride: usize,
    pub w: usize,
    pub h: usize,
    pub avg: i32,
}

impl<'a> AvgBuffers<'a> {
    /// Samples of scratch needed for a `w x h` unit.
    pub const fn scratch_len(w: usize, h: usize, win: WienerWin) -> usize {
        let pad = 2 * win.half();
        round_up(w, 16) * h + round_up(w + pad, 16) * (h + pad)
    }

    /// Fill `scratch` from the planes.
    ///
    /// `dgd` must hold `win.half()` pixels of context on every side of
    /// `rect`.
    pub fn new<P: Copy + Into<u32>>(
        scratch: &'a mut [i16],
        win: WienerWin,
        dgd: &[P],
        dgd_stride: usize,
        src: &[P],
        src_stride: usize,
        rect: &RestorationRect,
    ) -> Self {
        let r = win.half();
        let (w, h) = (rect.width(), rect.height());
        assert!(w > 0 && h > 0);
        assert!(rect.h_start >= r && rect.v_start >= r);
        assert!(scratch.len() >= Self::scratch_len(w, h, win));

        let avg = find_average(src, src_stride, rect);
        let s_stride = round_up(w, 16);
        let d_stride = round_up(w + 2 * r, 16);
        let (s_buf, d_buf) = scratch.split_at_mut(s_stride * h);

        for (y, out) in s_buf.chunks_exact_mut(s_stride).enumerate() {
            let row = &src[(rect.v_start + y) * src_stride + rect.h_start..][..w];
            for (o, &p) in out[..w].iter_mut().zip(row) {
                *o = (p.into() as i32 - avg) as i16;
            }
        }

        let d_buf = &mut d_buf[..d_stride * (h + 2 * r)];
        let (x0, y0) = (rect.h_start - r, rect.v_start - r);
        for (y, out) in d_buf.chunks_exact_mut(d_stride).enumerate() {
            let row = &dgd[(y0 + y) * dgd_stride + x0..][..w + 2 * r];
            for (o, &p) in out[..w + 2 * r].iter_mut().zip(row) {
                *o = (p.into() as i32 - avg) as i16;
            }
        }

        Self {
            s: s_buf,
            s_stride,
            d: d_buf,
            d_stride,
            w,
            h,
            avg,
        }
    }

    #[inline]
    pub fn s_at(&self, y: usize, x: usize) -> i16 {
        self.s[y * self.s_stride + x]
    }

    #[inline]
    pub fn d_at(&self, y: usize, x: usize) -> i16 {
        self.d[y * self.d_stride + x]
    }
}
