//! AVX2 projection error for self-guided restoration parameter search.

#![forbid(unsafe_code)]

#[cfg(target_arch = "x86_64")]
use archmage::{arcane, rite, Desktop64};
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use crate::include::common::intops::round2;
use crate::src::safe_simd::partial_simd;
use crate::src::safe_simd::pixel_access::plane_fits;
use crate::src::safe_simd::pixel_access::row_slice;
use crate::src::sgrproj::SgrParams;
use crate::src::sgrproj::SGRPROJ_PRJ_BITS;
use crate::src::sgrproj::SGRPROJ_RST_BITS;

const PROJ_SHIFT: u8 = SGRPROJ_RST_BITS + SGRPROJ_PRJ_BITS;

/// Active filter planes, with a single active plane always first.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Blend {
    Zero,
    One,
    Two,
}

struct BlendPlanes<'a> {
    blend: Blend,
    flt: [&'a [i32]; 2],
    stride: [usize; 2],
    xq: [i32; 2],
}

impl<'a> BlendPlanes<'a> {
    /// Panics unless every active plane covers `width x height`.
    fn new(
        flt0: &'a [i32],
        flt0_stride: usize,
        flt1: &'a [i32],
        flt1_stride: usize,
        xq: [i32; 2],
        params: &SgrParams,
        width: usize,
        height: usize,
    ) -> Self {
        let (blend, flt, stride, xq) = match (params.r[0] > 0, params.r[1] > 0) {
            (true, true) => (Blend::Two, [flt0, flt1], [flt0_stride, flt1_stride], xq),
            (true, false) => (Blend::One, [flt0, &[][..]], [flt0_stride, 0], [xq[0], 0]),
            (false, true) => (Blend::One, [flt1, &[][..]], [flt1_stride, 0], [xq[1], 0]),
            (false, false) => (Blend::Zero, [&[][..]; 2], [0; 2], [0; 2]),
        };
        let active = match blend {
            Blend::Zero => 0,
            Blend::One => 1,
            Blend::Two => 2,
        };
        for k in 0..active {
            assert!(plane_fits(flt[k], stride[k], width, height));
        }
        Self {
            blend,
            flt,
            stride,
            xq,
        }
    }

    fn rows(&self, i: usize, width: usize) -> [&'a [i32]; 2] {
        let row = |k: usize| match (self.blend, k) {
            (Blend::Two, _) | (Blend::One, 0) => row_slice(self.flt[k], i * self.stride[k], width),
            _ => &[][..],
        };
        [row(0), row(1)]
    }

    #[inline]
    fn scalar_err(&self, d: i32, s: i32, fa: &[i32], fb: &[i32], j: usize) -> i32 {
        let u = d << SGRPROJ_RST_BITS;
        let v = match self.blend {
            Blend::Zero => return d - s,
            Blend::One => self.xq[0] * (fa[j] - u),
            Blend::Two => self.xq[0] * (fa[j] - u) + self.xq[1] * (fb[j] - u),
        };
        round2(v, PROJ_SHIFT) + d - s
    }
}

// ============================================================================
// 8-LANE HELPERS
// ============================================================================

/// Per-pixel error of eight samples.
#[cfg(target_arch = "x86_64")]
#[rite]
#[inline]
fn blend_err(
    _t: Desktop64,
    blend: Blend,
    d: __m256i,
    s: __m256i,
    fa: &[i32],
    fb: &[i32],
    xq: [__m256i; 2],
) -> __m256i {
    use safe_unaligned_simd::x86_64 as safe_simd;

    let diff = _mm256_sub_epi32(d, s);
    if blend == Blend::Zero {
        return diff;
    }
    let u = _mm256_slli_epi32::<{ SGRPROJ_RST_BITS as i32 }>(d);
    let fa = safe_simd::_mm256_loadu_si256::<[i32; 8]>(fa.try_into().unwrap());
    let mut v = _mm256_mullo_epi32(xq[0], _mm256_sub_epi32(fa, u));
    if blend == Blend::Two {
        let fb = safe_simd::_mm256_loadu_si256::<[i32; 8]>(fb.try_into().unwrap());
        v = _mm256_add_epi32(v, _mm256_mullo_epi32(xq[1], _mm256_sub_epi32(fb, u)));
    }
    let rnd = _mm256_set1_epi32(1 << (PROJ_SHIFT - 1));
    let v = _mm256_srai_epi32::<{ PROJ_SHIFT as i32 }>(_mm256_add_epi32(v, rnd));
    _mm256_add_epi32(v, diff)
}

/// Add the squares of the eight i32 lanes of `e` into four i64 lanes.
#[cfg(target_arch = "x86_64")]
#[rite]
#[inline]
fn square_acc(_t: Desktop64, acc: __m256i, e: __m256i) -> __m256i {
    let odd = _mm256_srli_epi64::<32>(e);
    let acc = _mm256_add_epi64(acc, _mm256_mul_epi32(e, e));
    _mm256_add_epi64(acc, _mm256_mul_epi32(odd, odd))
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
// PIXEL PROJECTION ERROR
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[arcane]
pub(crate) fn pixel_proj_error_8bpc_avx2(
    _token: Desktop64,
    src: &[u8],
    width: usize,
    height: usize,
    src_stride: usize,
    dat: &[u8],
    dat_stride: usize,
    flt0: &[i32],
    flt0_stride: usize,
    flt1: &[i32],
    flt1_stride: usize,
    xq: [i32; 2],
    params: &SgrParams,
) -> i64 {
    assert!(plane_fits(src, src_stride, width, height));
    assert!(plane_fits(dat, dat_stride, width, height));
    let planes = BlendPlanes::new(
        flt0, flt0_stride, flt1, flt1_stride, xq, params, width, height,
    );
    let xqv = [
        _mm256_set1_epi32(planes.xq[0]),
        _mm256_set1_epi32(planes.xq[1]),
    ];
    let mut acc = _mm256_setzero_si256();
    let mut err = 0i64;

    for i in 0..height {
        let src = row_slice(src, i * src_stride, width);
        let dat = row_slice(dat, i * dat_stride, width);
        let [fa, fb] = planes.rows(i, width);

        let mut j = 0;
        while j + 8 <= width {
            let d = _mm256_cvtepu8_epi32(partial_simd::mm_loadl_epi64::<[u8; 8]>(
                dat[j..j + 8].try_into().unwrap(),
            ));
            let s = _mm256_cvtepu8_epi32(partial_simd::mm_loadl_epi64::<[u8; 8]>(
                src[j..j + 8].try_into().unwrap(),
            ));
            let fa8 = fa.get(j..j + 8).unwrap_or(&[]);
            let fb8 = fb.get(j..j + 8).unwrap_or(&[]);
            let e = blend_err(_token, planes.blend, d, s, fa8, fb8, xqv);
            acc = square_acc(_token, acc, e);
            j += 8;
        }
        for j in j..width {
            let e = planes.scalar_err(dat[j] as i32, src[j] as i32, fa, fb, j);
            err += e as i64 * e as i64;
        }
    }

    err + hsum_epi64(_token, acc)
}

#[cfg(target_arch = "x86_64")]
#[arcane]
pub(crate) fn pixel_proj_error_16bpc_avx2(
    _token: Desktop64,
    src: &[u16],
    width: usize,
    height: usize,
    src_stride: usize,
    dat: &[u16],
    dat_stride: usize,
    flt0: &[i32],
    flt0_stride: usize,
    flt1: &[i32],
    flt1_stride: usize,
    xq: [i32; 2],
    params: &SgrParams,
) -> i64 {
    use safe_unaligned_simd::x86_64 as safe_simd;

    assert!(plane_fits(src, src_stride, width, height));
    assert!(plane_fits(dat, dat_stride, width, height));
    let planes = BlendPlanes::new(
        flt0, flt0_stride, flt1, flt1_stride, xq, params, width, height,
    );
    let xqv = [
        _mm256_set1_epi32(planes.xq[0]),
        _mm256_set1_epi32(planes.xq[1]),
    ];
    let mut acc = _mm256_setzero_si256();
    let mut err = 0i64;

    for i in 0..height {
        let src = row_slice(src, i * src_stride, width);
        let dat = row_slice(dat, i * dat_stride, width);
        let [fa, fb] = planes.rows(i, width);

        let mut j = 0;
        while j + 8 <= width {
            let d = _mm256_cvtepu16_epi32(safe_simd::_mm_loadu_si128::<[u16; 8]>(
                dat[j..j + 8].try_into().unwrap(),
            ));
            let s = _mm256_cvtepu16_epi32(safe_simd::_mm_loadu_si128::<[u16; 8]>(
                src[j..j + 8].try_into().unwrap(),
            ));
            let fa8 = fa.get(j..j + 8).unwrap_or(&[]);
            let fb8 = fb.get(j..j + 8).unwrap_or(&[]);
            let e = blend_err(_token, planes.blend, d, s, fa8, fb8, xqv);
            acc = square_acc(_token, acc, e);
            j += 8;
        }
        for j in j..width {
            let e = planes.scalar_err(dat[j] as i32, src[j] as i32, fa, fb, j);
            err += e as i64 * e as i64;
        }
    }

    err + hsum_epi64(_token, acc)
}
