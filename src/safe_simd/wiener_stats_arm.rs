//! NEON window dot product for the Wiener statistics engine.

#![forbid(unsafe_code)]

#[cfg(target_arch = "aarch64")]
use archmage::{arcane, Arm64};
#[cfg(target_arch = "aarch64")]
use core::arch::aarch64::*;

use crate::src::safe_simd::pixel_access::plane_fits;
use crate::src::safe_simd::pixel_access::row_slice;
use crate::src::wiener_stats::FoldAcc;
use crate::src::wiener_stats::WindowDot;

#[cfg(target_arch = "aarch64")]
#[arcane]
fn window_dot_neon(
    _token: Arm64,
    a: &[i16],
    a_stride: usize,
    b: &[i16],
    b_stride: usize,
    w: usize,
    h: usize,
    span: u32,
) -> i64 {
    use safe_unaligned_simd::aarch64 as safe_simd;

    // vmlal + vmlal_high put two products in each lane per 8 samples.
    let lane_budget = (span / 2).max(1);
    let w8 = w & !7;

    let mut acc = vdupq_n_s64(0);
    let mut part = vdupq_n_s32(0);
    let mut used = 0u32;
    let mut tail = FoldAcc::new(span);

    for y in 0..h {
        let a = row_slice(a, y * a_stride, w);
        let b = row_slice(b, y * b_stride, w);
        let mut x = 0;
        while x < w8 {
            if used == lane_budget {
                acc = vpadalq_s32(acc, part);
                part = vdupq_n_s32(0);
                used = 0;
            }
            let va = safe_simd::vld1q_s16(a[x..x + 8].try_into().unwrap());
            let vb = safe_simd::vld1q_s16(b[x..x + 8].try_into().unwrap());
            part = vmlal_s16(part, vget_low_s16(va), vget_low_s16(vb));
            part = vmlal_high_s16(part, va, vb);
            used += 1;
            x += 8;
        }
        for x in w8..w {
            tail.add(a[x] as i32 * b[x] as i32);
        }
    }

    acc = vpadalq_s32(acc, part);
    vaddvq_s64(acc) + tail.finish()
}

/// [`WindowDot`] backed by NEON.
#[cfg(target_arch = "aarch64")]
#[derive(Clone, Copy)]
pub(crate) struct NeonDot(pub Arm64);

#[cfg(target_arch = "aarch64")]
impl WindowDot for NeonDot {
    #[inline]
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
        assert!(plane_fits(a, a_stride, w, h) && plane_fits(b, b_stride, w, h));
        window_dot_neon(self.0, a, a_stride, b, b_stride, w, h, span)
    }
}
