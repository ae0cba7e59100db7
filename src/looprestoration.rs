//! Kernel table for the restoration parameter search.
//!
//! Every entry has one signature across its reference, scalar, AVX2 and NEON
//! variants, so any of them can be substituted. Statistics entries write `M`
//! and the full symmetric `H`, normalized to the 8-bit range.

#![forbid(unsafe_code)]

use crate::src::cpu::CpuFlags;
use crate::src::levels::RestorationRect;
use crate::src::levels::WienerWin;
use crate::src::sgrproj;
use crate::src::sgrproj::ProjParams;
use crate::src::sgrproj::SgrParams;
use crate::src::wiener_avg::AvgBuffers;
use crate::src::wiener_stats::complete_symmetric;
use crate::src::wiener_stats::compute_stats_incremental;
use crate::src::wiener_stats::compute_stats_ref;
use crate::src::wiener_stats::normalize_stats;
use crate::src::wiener_stats::ScalarDot;
use crate::src::wiener_stats::WindowDot;

pub type compute_stats_fn = fn(
    win: WienerWin,
    dgd: &[u8],
    dgd_stride: usize,
    src: &[u8],
    src_stride: usize,
    rect: &RestorationRect,
    downsample: bool,
    scratch: &mut [i16],
    m: &mut [i64],
    h: &mut [i64],
);

pub type compute_stats_highbd_fn = fn(
    win: WienerWin,
    dgd: &[u16],
    dgd_stride: usize,
    src: &[u16],
    src_stride: usize,
    rect: &RestorationRect,
    downsample: bool,
    bitdepth: u8,
    scratch: &mut [i16],
    m: &mut [i64],
    h: &mut [i64],
);

pub type pixel_proj_error_fn<P> = fn(
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
) -> i64;

pub type calc_proj_params_fn<P> = fn(
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
) -> ProjParams;

/// How `M` and the upper triangle of `H` are gathered.
enum Engine<'k, K: WindowDot> {
    Direct,
    Incremental(&'k K),
}

fn compute_stats_with<P: Copy + Into<u32>, K: WindowDot>(
    engine: Engine<K>,
    win: WienerWin,
    dgd: &[P],
    dgd_stride: usize,
    src: &[P],
    src_stride: usize,
    rect: &RestorationRect,
    downsample: bool,
    bitdepth: u8,
    scratch: &mut [i16],
    m: &mut [i64],
    h: &mut [i64],
) {
    let n = win.taps2();
    assert!(m.len() >= n && h.len() >= n * n);
    let (m, h) = (&mut m[..n], &mut h[..n * n]);

    let bufs = AvgBuffers::new(scratch, win, dgd, dgd_stride, src, src_stride, rect);
    match engine {
        // Sparse rows break the row-shift identities.
        Engine::Incremental(kernel) if !downsample => {
            h.fill(0);
            compute_stats_incremental(kernel, &bufs, win, bitdepth, m, h);
        }
        _ => compute_stats_ref(&bufs, win, downsample, m, h),
    }
    complete_symmetric(h, n);
    normalize_stats(m, h, bitdepth);
}

// ============================================================================
// REFERENCE
// ============================================================================

fn compute_stats_c(
    win: WienerWin,
    dgd: &[u8],
    dgd_stride: usize,
    src: &[u8],
    src_stride: usize,
    rect: &RestorationRect,
    downsample: bool,
    scratch: &mut [i16],
    m: &mut [i64],
    h: &mut [i64],
) {
    compute_stats_with::<_, ScalarDot>(
        Engine::Direct,
        win,
        dgd,
        dgd_stride,
        src,
        src_stride,
        rect,
        downsample,
        8,
        scratch,
        m,
        h,
    )
}

fn compute_stats_highbd_c(
    win: WienerWin,
    dgd: &[u16],
    dgd_stride: usize,
    src: &[u16],
    src_stride: usize,
    rect: &RestorationRect,
    downsample: bool,
    bitdepth: u8,
    scratch: &mut [i16],
    m: &mut [i64],
    h: &mut [i64],
) {
    compute_stats_with::<_, ScalarDot>(
        Engine::Direct,
        win,
        dgd,
        dgd_stride,
        src,
        src_stride,
        rect,
        downsample,
        bitdepth,
        scratch,
        m,
        h,
    )
}

// ============================================================================
// INCREMENTAL
// ============================================================================

fn compute_stats_scalar(
    win: WienerWin,
    dgd: &[u8],
    dgd_stride: usize,
    src: &[u8],
    src_stride: usize,
    rect: &RestorationRect,
    downsample: bool,
    scratch: &mut [i16],
    m: &mut [i64],
    h: &mut [i64],
) {
    compute_stats_with(
        Engine::Incremental(&ScalarDot),
        win,
        dgd,
        dgd_stride,
        src,
        src_stride,
        rect,
        downsample,
        8,
        scratch,
        m,
        h,
    )
}

fn compute_stats_highbd_scalar(
    win: WienerWin,
    dgd: &[u16],
    dgd_stride: usize,
    src: &[u16],
    src_stride: usize,
    rect: &RestorationRect,
    downsample: bool,
    bitdepth: u8,
    scratch: &mut [i16],
    m: &mut [i64],
    h: &mut [i64],
) {
    compute_stats_with(
        Engine::Incremental(&ScalarDot),
        win,
        dgd,
        dgd_stride,
        src,
        src_stride,
        rect,
        downsample,
        bitdepth,
        scratch,
        m,
        h,
    )
}

#[cfg(target_arch = "x86_64")]
mod x86 {
    use super::*;
    use crate::src::safe_simd::sgrproj::pixel_proj_error_16bpc_avx2;
    use crate::src::safe_simd::sgrproj::pixel_proj_error_8bpc_avx2;
    use crate::src::safe_simd::wiener_stats::Avx2Dot;
    use archmage::{Desktop64, SimdToken};

    pub fn compute_stats_avx2(
        win: WienerWin,
        dgd: &[u8],
        dgd_stride: usize,
        src: &[u8],
        src_stride: usize,
        rect: &RestorationRect,
        downsample: bool,
        scratch: &mut [i16],
        m: &mut [i64],
        h: &mut [i64],
    ) {
        let Some(token) = Desktop64::summon() else {
            return compute_stats_scalar(
                win, dgd, dgd_stride, src, src_stride, rect, downsample, scratch, m, h,
            );
        };
        compute_stats_with(
            Engine::Incremental(&Avx2Dot(token)),
            win,
            dgd,
            dgd_stride,
            src,
            src_stride,
            rect,
            downsample,
            8,
            scratch,
            m,
            h,
        )
    }

    pub fn compute_stats_highbd_avx2(
        win: WienerWin,
        dgd: &[u16],
        dgd_stride: usize,
        src: &[u16],
        src_stride: usize,
        rect: &RestorationRect,
        downsample: bool,
        bitdepth: u8,
        scratch: &mut [i16],
        m: &mut [i64],
        h: &mut [i64],
    ) {
        let Some(token) = Desktop64::summon() else {
            return compute_stats_highbd_scalar(
                win, dgd, dgd_stride, src, src_stride, rect, downsample, bitdepth, scratch, m, h,
            );
        };
        compute_stats_with(
            Engine::Incremental(&Avx2Dot(token)),
            win,
            dgd,
            dgd_stride,
            src,
            src_stride,
            rect,
            downsample,
            bitdepth,
            scratch,
            m,
            h,
        )
    }

    pub fn pixel_proj_error_avx2(
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
        let Some(token) = Desktop64::summon() else {
            return sgrproj::pixel_proj_error(
                src, width, height, src_stride, dat, dat_stride, flt0, flt0_stride, flt1,
                flt1_stride, xq, params,
            );
        };
        pixel_proj_error_8bpc_avx2(
            token, src, width, height, src_stride, dat, dat_stride, flt0, flt0_stride, flt1,
            flt1_stride, xq, params,
        )
    }

    pub fn pixel_proj_error_highbd_avx2(
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
        let Some(token) = Desktop64::summon() else {
            return sgrproj::pixel_proj_error(
                src, width, height, src_stride, dat, dat_stride, flt0, flt0_stride, flt1,
                flt1_stride, xq, params,
            );
        };
        pixel_proj_error_16bpc_avx2(
            token, src, width, height, src_stride, dat, dat_stride, flt0, flt0_stride, flt1,
            flt1_stride, xq, params,
        )
    }
}

#[cfg(target_arch = "aarch64")]
mod arm {
    use super::*;
    use crate::src::safe_simd::wiener_stats_arm::NeonDot;
    use archmage::{Arm64, SimdToken};

    pub fn compute_stats_neon(
        win: WienerWin,
        dgd: &[u8],
        dgd_stride: usize,
        src: &[u8],
        src_stride: usize,
        rect: &RestorationRect,
        downsample: bool,
        scratch: &mut [i16],
        m: &mut [i64],
        h: &mut [i64],
    ) {
        let Some(token) = Arm64::summon() else {
            return compute_stats_scalar(
                win, dgd, dgd_stride, src, src_stride, rect, downsample, scratch, m, h,
            );
        };
        compute_stats_with(
            Engine::Incremental(&NeonDot(token)),
            win,
            dgd,
            dgd_stride,
            src,
            src_stride,
            rect,
            downsample,
            8,
            scratch,
            m,
            h,
        )
    }

    pub fn compute_stats_highbd_neon(
        win: WienerWin,
        dgd: &[u16],
        dgd_stride: usize,
        src: &[u16],
        src_stride: usize,
        rect: &RestorationRect,
        downsample: bool,
        bitdepth: u8,
        scratch: &mut [i16],
        m: &mut [i64],
        h: &mut [i64],
    ) {
        let Some(token) = Arm64::summon() else {
            return compute_stats_highbd_scalar(
                win, dgd, dgd_stride, src, src_stride, rect, downsample, bitdepth, scratch, m, h,
            );
        };
        compute_stats_with(
            Engine::Incremental(&NeonDot(token)),
            win,
            dgd,
            dgd_stride,
            src,
            src_stride,
            rect,
            downsample,
            bitdepth,
            scratch,
            m,
            h,
        )
    }
}

// ============================================================================
// DISPATCH TABLE
// ============================================================================

pub struct Rav1lrLooprestorationDSPContext {
    pub compute_stats: compute_stats_fn,
    pub compute_stats_highbd: compute_stats_highbd_fn,
    pub pixel_proj_error: pixel_proj_error_fn<u8>,
    pub pixel_proj_error_highbd: pixel_proj_error_fn<u16>,
    pub calc_proj_params: calc_proj_params_fn<u8>,
    pub calc_proj_params_highbd: calc_proj_params_fn<u16>,
}

impl Rav1lrLooprestorationDSPContext {
    /// Reference implementations only.
    pub const fn default() -> Self {
        Self {
            compute_stats: compute_stats_c,
            compute_stats_highbd: compute_stats_highbd_c,
            pixel_proj_error: sgrproj::pixel_proj_error::<u8>,
            pixel_proj_error_highbd: sgrproj::pixel_proj_error::<u16>,
            calc_proj_params: sgrproj::calc_proj_params::<u8>,
            calc_proj_params_highbd: sgrproj::calc_proj_params::<u16>,
        }
    }

    #[cfg(target_arch = "x86_64")]
    #[inline(always)]
    const fn init_x86(mut self, flags: CpuFlags) -> Self {
        if !flags.contains(CpuFlags::AVX2) {
            return self;
        }

        self.compute_stats = x86::compute_stats_avx2;
        self.compute_stats_highbd = x86::compute_stats_highbd_avx2;
        self.pixel_proj_error = x86::pixel_proj_error_avx2;
        self.pixel_proj_error_highbd = x86::pixel_proj_error_highbd_avx2;

        self
    }

    #[cfg(target_arch = "aarch64")]
    #[inline(always)]
    const fn init_arm(mut self, flags: CpuFlags) -> Self {
        if !flags.contains(CpuFlags::NEON) {
            return self;
        }

        self.compute_stats = arm::compute_stats_neon;
        self.compute_stats_highbd = arm::compute_stats_highbd_neon;

        self
    }

    #[inline(always)]
    const fn init(mut self, flags: CpuFlags) -> Self {
        self.compute_stats = compute_stats_scalar;
        self.compute_stats_highbd = compute_stats_highbd_scalar;

        #[cfg(target_arch = "x86_64")]
        {
            return self.init_x86(flags);
        }
        #[cfg(target_arch = "aarch64")]
        {
            return self.init_arm(flags);
        }

        #[allow(unreachable_code)] // Reachable on some #[cfg]s.
        {
            let _ = flags;
            self
        }
    }

    /// `flags` must be a subset of the running CPU's features.
    pub const fn new(flags: CpuFlags) -> Self {
        Self::default().init(flags)
    }
}

impl Default for Rav1lrLooprestorationDSPContext {
    fn default() -> Self {
        Self::default()
    }
}
