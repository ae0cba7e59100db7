//! Self-guided restoration: projection of the two guided-filter outputs
//! onto the source and the error of a given projection.

#![forbid(unsafe_code)]

use crate::include::common::intops::round2;
use crate::src::looprestoration::pixel_proj_error_fn;
use crate::src::tables::rav1lr_sgr_params;

pub const SGRPROJ_RST_BITS: u8 = 4;
pub const SGRPROJ_PRJ_BITS: u8 = 7;
pub const SGRPROJ_PARAMS_BITS: u8 = 4;

pub const SGRPROJ_XQD_MIN: [i8; 2] = [-96, -32];
pub const SGRPROJ_XQD_MAX: [i8; 2] = [31, 95];

/// Largest blend weight magnitude the 32-bit error arithmetic holds.
pub const SGRPROJ_XQ_LIMIT: i32 = 1 << 11;

/// Largest filter output magnitude the 32-bit error arithmetic holds at
/// `bitdepth`, twice the range of an in-range pixel.
pub const fn sgrproj_flt_limit(bitdepth: u8) -> i32 {
    1 << (bitdepth + SGRPROJ_RST_BITS + 1)
}

/// Radii and strengths of the two guided-filter passes. A zero radius
/// means the pass is not used.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SgrParams {
    pub r: [u8; 2],
    pub s: [u32; 2],
}

impl SgrParams {
    /// Parameters of coded set `set` (`0..16`).
    pub fn from_set(set: usize) -> Self {
        let s = rav1lr_sgr_params[set];
        Self {
            r: [if s[0] != 0 { 2 } else { 0 }, if s[1] != 0 { 1 } else { 0 }],
            s,
        }
    }
}

/// Blend weights from the coded projection coefficients.
pub fn decode_xq(xqd: [i32; 2], params: &SgrParams) -> [i32; 2] {
    let one = 1 << SGRPROJ_PRJ_BITS;
    if params.r[0] == 0 {
        [0, one - xqd[1]]
    } else if params.r[1] == 0 {
        [xqd[0], 0]
    } else {
        [xqd[0], one - xqd[0] - xqd[1]]
    }
}

/// Sum of squared error between `src` and the restoration of `dat` by
/// `flt0`/`flt1` blended with weights `xq`.
///
/// Filter planes are in the `dat << SGRPROJ_RST_BITS` domain. A plane whose
/// radius is zero is not read and may be empty.
pub fn pixel_proj_error<P: Copy + Into<i32>>(
    src: &[P],
    width: usize,
    height: usize,
    src_stride: usize,
    dat: &[P],
    dat_stride: usize,
    flt0: &[i32],
    flt0_stride: usize,
    flt1: &[i32],
    flt1_stride: usize,
    xq: [i32; 2],
    params: &SgrParams,
) -> i64 {
    let shift = SGRPROJ_RST_BITS + SGRPROJ_PRJ_BITS;
    let mut err = 0i64;
    for i in 0..height {
        let src = &src[i * src_stride..][..width];
        let dat = &dat[i * dat_stride..][..width];
        match (params.r[0] > 0, params.r[1] > 0) {
            (true, true) => {
                let f0 = &flt0[i * flt0_stride..][..width];
                let f1 = &flt1[i * flt1_stride..][..width];
                for j in 0..width {
                    let d: i32 = dat[j].into();
                    let u = d << SGRPROJ_RST_BITS;
                    let v = xq[0] * (f0[j] - u) + xq[1] * (f1[j] - u);
                    let s: i32 = src[j].into();
                    let e = round2(v, shift) + d - s;
                    err += e as i64 * e as i64;
                }
            }
            (true, false) | (false, true) => {
                let (xq, f) = if params.r[0] > 0 {
                    (xq[0], &flt0[i * flt0_stride..][..width])
                } else {
                    (xq[1], &flt1[i * flt1_stride..][..width])
                };
                for j in 0..width {
                    let d: i32 = dat[j].into();
                    let u = d << SGRPROJ_RST_BITS;
                    let s: i32 = src[j].into();
                    let e = round2(xq * (f[j] - u), shift) + d - s;
                    err += e as i64 * e as i64;
                }
            }
            (false, false) => {
                for j in 0..width {
                    let (d, s): (i32, i32) = (dat[j].into(), src[j].into());
                    let e = d - s;
                    err += e as i64 * e as i64;
                }
            }
        }
    }
    err
}

/// Projection error for coded coefficients `xqd`, through whichever
/// `pixel_proj_error` kernel the caller selected.
pub fn get_pixel_proj_error<P>(
    proj_error: pixel_proj_error_fn<P>,
    src: &[P],
    width: usize,
    height: usize,
    src_stride: usize,
    dat: &[P],
    dat_stride: usize,
    flt0: &[i32],
    flt0_stride: usize,
    flt1: &[i32],
    flt1_stride: usize,
    xqd: [i32; 2],
    params: &SgrParams,
) -> i64 {
    let xq = decode_xq(xqd, params);
    proj_error(
        src,
        width,
        height,
        src_stride,
        dat,
        dat_stride,
        flt0,
        flt0_stride,
        flt1,
        flt1_stride,
        xq,
        params,
    )
}

/// Least-squares system `H * xq = C` for the projection weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProjParams {
    pub h: [[i64; 2]; 2],
    pub c: [i64; 2],
}

/// Accumulate the projection normal equations, averaged over the block.
///
/// Only the terms of active radii are filled in.
pub fn calc_proj_params<P: Copy + Into<i32>>(
    src: &[P],
    width: usize,
    height: usize,
    src_stride: usize,
    dat: &[P],
    dat_stride: usize,
    flt0: &[i32],
    flt0_stride: usize,
    flt1: &[i32],
    flt1_stride: usize,
    params: &SgrParams,
) -> ProjParams {
    let size = (width * height) as i64;
    let (use0, use1) = (params.r[0] > 0, params.r[1] > 0);
    let mut p = ProjParams::default();
    for i in 0..height {
        let src = &src[i * src_stride..][..width];
        let dat = &dat[i * dat_stride..][..width];
        for j in 0..width {
            let (d, s): (i32, i32) = (dat[j].into(), src[j].into());
            let u = d << SGRPROJ_RST_BITS;
            let s = (s << SGRPROJ_RST_BITS) - u;
            let f0 = if use0 {
                flt0[i * flt0_stride + j] as i64 - u as i64
            } else {
                0
            };
            let f1 = if use1 {
                flt1[i * flt1_stride + j] as i64 - u as i64
            } else {
                0
            };
            p.h[0][0] += f0 * f0;
            p.h[1][1] += f1 * f1;
            p.h[0][1] += f0 * f1;
            p.c[0] += f0 * s as i64;
            p.c[1] += f1 * s as i64;
        }
    }
    p.h[0][0] /= size;
    p.h[0][1] /= size;
    p.h[1][1] /= size;
    p.h[1][0] = p.h[0][1];
    p.c[0] /= size;
    p.c[1] /= size;
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_from_set() {
        assert_eq!(
            SgrParams::from_set(0),
            SgrParams {
                r: [2, 1],
                s: [140, 3236]
            }
        );
        assert_eq!(SgrParams::from_set(10).r, [0, 1]);
        assert_eq!(SgrParams::from_set(15).r, [2, 0]);
    }

    #[test]
    fn xq_decoding() {
        let both = SgrParams::from_set(3);
        assert_eq!(decode_xq([-32, 31], &both), [-32, 128 + 32 - 31]);
        assert_eq!(decode_xq([-32, 31], &SgrParams::from_set(11)), [0, 97]);
        assert_eq!(decode_xq([-32, 31], &SgrParams::from_set(14)), [-32, 0]);
    }

    #[test]
    fn no_radius_is_plain_sse() {
        let src = [10u8, 20, 30, 40];
        let dat = [12u8, 20, 27, 41];
        let params = SgrParams::default();
        let e = pixel_proj_error(&src, 2, 2, 2, &dat, 2, &[], 0, &[], 0, [5, 7], &params);
        assert_eq!(e, 4 + 0 + 9 + 1);
    }

    #[test]
    fn identity_filter_leaves_degraded_error() {
        // flt == dat << RST_BITS makes every blend term vanish.
        let src = [100u16, 200, 300];
        let dat = [101u16, 198, 300];
        let flt: Vec<i32> = dat.iter().map(|&d| (d as i32) << SGRPROJ_RST_BITS).collect();
        let params = SgrParams::from_set(0);
        let e = pixel_proj_error(&src, 3, 1, 3, &dat, 3, &flt, 3, &flt, 3, [40, 50], &params);
        assert_eq!(e, 1 + 4);
    }

    #[test]
    fn single_radius_blend() {
        let src = [50u8];
        let dat = [40u8];
        // u = 640, flt - u = 160, v = 64 * 160 = 10240, round2(v, 11) = 5.
        let flt = [800i32];
        let params = SgrParams::from_set(14);
        let e = pixel_proj_error(&src, 1, 1, 1, &dat, 1, &flt, 1, &[], 0, [64, 0], &params);
        assert_eq!(e, (5 + 40 - 50) * (5 + 40 - 50));
    }

    #[test]
    fn proj_params_average_and_mirror() {
        let src = [3u8, 5];
        let dat = [1u8, 1];
        let flt0 = [32i32, 48];
        let flt1 = [0i32, 16];
        let p = calc_proj_params(&src, 2, 1, 2, &dat, 2, &flt0, 2, &flt1, 2, &SgrParams::from_set(0));
        // u = 16; f0 = [16, 32], f1 = [-16, 0], s = [32, 64].
        assert_eq!(p.h[0][0], (256 + 1024) / 2);
        assert_eq!(p.h[1][1], 256 / 2);
        assert_eq!(p.h[0][1], -256 / 2);
        assert_eq!(p.h[1][0], p.h[0][1]);
        assert_eq!(p.c, [(512 + 2048) / 2, -512 / 2]);

        let p = calc_proj_params(&src, 2, 1, 2, &dat, 2, &flt0, 2, &[], 0, &SgrParams::from_set(15));
        assert_eq!(p.h[1][1], 0);
        assert_eq!(p.c[1], 0);
        assert_eq!(p.h[0][0], 640);
    }

    #[test]
    fn coded_coefficients_go_through_kernel() {
        let src = [50u8];
        let dat = [40u8];
        let flt = [800i32];
        let params = SgrParams::from_set(14);
        let e = get_pixel_proj_error(
            pixel_proj_error::<u8>,
            &src,
            1,
            1,
            1,
            &dat,
            1,
            &flt,
            1,
            &[],
            0,
            [64, -7],
            &params,
        );
        assert_eq!(e, 25);
    }
}
