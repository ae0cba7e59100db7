//! AVX2 window dot product for the Wiener statistics engine.
//!
//! `_mm256_madd_epi16` adds two products into each 32-bit lane per 16
//! samples; lanes are widened into a 64-bit accumulator before they can
//! hold more than the caller's fold budget.

#![forbid(unsafe_code)]

#[cfg(target_arch = "x86_64")]
use archmage::{arcane, rite, Desktop64};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::src::safe_simd::pixel_access::plane_fits;
use crate::src::safe_simd::pixel_access::row_slice;
use crate::src::wiener_stats::FoldAcc;
use crate::src::wiener_stats::WindowDot;

// ============================================================================
// LANE FOLDING
// ============================================================================

/// Sign-extend the eight i32 lanes of `part` and add them into `acc`.
#[cfg(target_arch = "x86_64")]
#[rite]
#[inline]
fn fold_epi32(_t: Desktop64, acc: __m256i, part: __m256i) -> __m256i {
    let lo = _mm256_cvtepi32_epi64(_mm256_castsi256_si128(part));
    let hi = _mm256_cvtepi32_epi64(_mm256_extracti128_si256::<1>(part));
    _mm256_add_epi64(acc, _mm256_add_epi64(lo, hi))
}

#[cfg(target_arch = "x86_64")]
#[rite]
#[inline]
fn hsum_epi64(_t: Desktop64, v: __m256i) -> i64 {
    _mm256_extract_epi64::<0>(v)
        + _mm256_extract_epi64::<1>(v)
        + _mm256_extract_epi64::<2>(v)
        + _mm256_extract_epi64::<3>(v)
}

// ============================================================================
// WINDOW DOT
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[arcane]
fn window_dot_avx2(
    _token: Desktop64,
    a: &[i16],
    a_stride: usize,
    b: &[i16],
    b_stride: usize,
    w: usize,
    h: usize,
    span: u32,
) -> i64 {
    use safe_unaligned_simd::x86_64 as safe_simd;

    // Each madd puts two products in a lane.
    let lane_budget = (span / 2).max(1);
    let w16 = w & !15;

    let mut acc = _mm256_setzero_si256();
    let mut part = _mm256_setzero_si256();
    let mut used = 0u32;
    let mut tail = FoldAcc::new(span);

    for y in 0..h {
        let a = row_slice(a, y * a_stride, w);
        let b = row_slice(b, y * b_stride, w);
        let mut x = 0;
        while x < w16 {
            if used == lane_budget {
                acc = fold_epi32(_token, acc, part);
                part = _mm256_setzero_si256();
                used = 0;
            }
            let va = safe_simd::_mm256_loadu_si256::<[i16; 16]>(a[x..x + 16].try_into().unwrap());
            let vb = safe_simd::_mm256_loadu_si256::<[i16; 16]>(b[x..x + 16].try_into().unwrap());
            part = _mm256_add_epi32(part, _mm256_madd_epi16(va, vb));
            used += 1;
            x += 16;
        }
        for x in w16..w {
            tail.add(a[x] as i32 * b[x] as i32);
        }
    }

    acc = fold_epi32(_token, acc, part);
    hsum_epi64(_token, acc) + tail.finish()
}

/// [`WindowDot`] backed by AVX2.
#[cfg(target_arch = "x86_64")]
#[derive(Clone, Copy)]
pub(crate) struct Avx2Dot(pub Desktop64);

#[cfg(target_arch = "x86_64")]
impl WindowDot for Avx2Dot {
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
        window_dot_avx2(self.0, a, a_stride, b, b_stride, w, h, span)
    }
}
