//! 100% Safe Rust API for the restoration analysis kernels
//!
//! This module validates every argument up front, so nothing here panics on
//! bad input. Out-of-range rectangles, strides and bit depths come back as
//! [`Error::InvalidArgument`], as do samples above the bit depth and blend
//! weights or filter outputs too large for the 32-bit kernels.
//!
//! # Example
//!
//! ```
//! use rav1lr_safe::{Analyzer, PlaneView8, RestorationRect, WienerWin};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let analyzer = Analyzer::new()?;
//! let pixels = vec![128u8; 64 * 64];
//! let dgd = PlaneView8::new(&pixels, 64, 64, 64)?;
//! let src = PlaneView8::new(&pixels, 64, 64, 64)?;
//!
//! let stats = analyzer.wiener_stats(WienerWin::Win7, &dgd, &src, RestorationRect::at(8, 8, 32, 32))?;
//! assert_eq!(stats.h(0, 0), 0);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

#[cfg(feature = "bitdepth_16")]
use crate::include::common::bitdepth::BitDepth16;
#[cfg(feature = "bitdepth_8")]
use crate::include::common::bitdepth::BitDepth8;
#[cfg(feature = "bitdepth_8")]
use crate::include::common::bitdepth::BitDepth as _;
use crate::src::cpu::rav1lr_get_cpu_flags;
use crate::src::cpu::CpuFlags;
use crate::src::error::Rav1lrError;
use crate::src::levels::RestorationRect;
use crate::src::levels::WienerWin;
use crate::src::log::write_log;
use crate::src::log::Rav1lrLogger;
use crate::src::looprestoration::Rav1lrLooprestorationDSPContext;
use crate::src::mc;
use crate::src::mc::InterpFilter;
use crate::src::mc::FO_HORIZ;
use crate::src::mem::MemPool;
use crate::src::safe_simd::pixel_access::plane_fits;
use crate::src::safe_simd::pixel_access::reinterpret_slice;
use crate::src::sgrproj::get_pixel_proj_error;
use crate::src::sgrproj::sgrproj_flt_limit;
use crate::src::sgrproj::ProjParams;
use crate::src::sgrproj::SgrParams;
use crate::src::sgrproj::SGRPROJ_XQD_MAX;
use crate::src::sgrproj::SGRPROJ_XQD_MIN;
use crate::src::sgrproj::SGRPROJ_XQ_LIMIT;
use crate::src::tables::SUBPEL_TAPS;
use crate::src::wiener_avg::LR_SCRATCH_LEN;
use crate::src::wiener_avg::MAX_RESTORATION_UNIT;
use cfg_if::cfg_if;
use std::collections::TryReserveError;
use std::fmt;

/// Analyzer errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidArgument(&'static str),
    OutOfMemory,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            Self::OutOfMemory => write!(f, "out of memory"),
        }
    }
}

impl std::error::Error for Error {}

impl From<Rav1lrError> for Error {
    fn from(err: Rav1lrError) -> Self {
        match err {
            Rav1lrError::InvalidArgument(msg) => Self::InvalidArgument(msg),
            Rav1lrError::OutOfMemory => Self::OutOfMemory,
        }
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which kernel tier an [`Analyzer`] may use.
///
/// Levels above what the CPU supports fall back to the best tier it has.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CpuLevel {
    /// Scalar incremental engine only.
    Scalar,
    /// AVX2 (x86-64-v3) kernels.
    X86V3,
    /// NEON kernels.
    Neon,
    /// Everything the running CPU supports.
    #[default]
    Native,
}

impl CpuLevel {
    /// Levels that select distinct kernels on this platform.
    pub fn platform_levels() -> &'static [Self] {
        cfg_if! {
            if #[cfg(target_arch = "x86_64")] {
                &[Self::Scalar, Self::X86V3, Self::Native]
            } else if #[cfg(target_arch = "aarch64")] {
                &[Self::Scalar, Self::Neon, Self::Native]
            } else {
                &[Self::Scalar, Self::Native]
            }
        }
    }

    fn flags(self) -> CpuFlags {
        let detected = rav1lr_get_cpu_flags();
        let allowed = match self {
            Self::Scalar => CpuFlags::empty(),
            Self::Native => CpuFlags::all(),
            #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
            Self::X86V3 => CpuFlags::SSE2 | CpuFlags::SSSE3 | CpuFlags::SSE41 | CpuFlags::AVX2,
            #[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
            Self::Neon => CpuFlags::NEON,
            _ => CpuFlags::empty(),
        };
        detected & allowed
    }
}

impl fmt::Display for CpuLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scalar => "scalar",
            Self::X86V3 => "x86-64-v3",
            Self::Neon => "neon",
            Self::Native => "native",
        })
    }
}

/// Analyzer configuration settings
#[derive(Clone, Debug)]
pub struct Settings {
    /// Highest kernel tier to use
    pub cpu_level: CpuLevel,

    /// Gather Wiener statistics from every 4th row only, weighting each
    /// visited row by the rows it stands for
    pub downsample_wiener_stats: bool,

    /// Where to report the selected kernels and rejected arguments
    pub logger: Option<Rav1lrLogger>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cpu_level: CpuLevel::Native,
            downsample_wiener_stats: false,
            logger: None,
        }
    }
}

/// Borrowed rectangular plane of pixels, addressed `data[y * stride + x]`.
#[derive(Clone, Copy, Debug)]
pub struct PlaneView<'a, P> {
    data: &'a [P],
    stride: usize,
    width: usize,
    height: usize,
}

pub type PlaneView8<'a> = PlaneView<'a, u8>;
pub type PlaneView16<'a> = PlaneView<'a, u16>;

impl<'a, P: Copy> PlaneView<'a, P> {
    pub fn new(data: &'a [P], stride: usize, width: usize, height: usize) -> Result<Self> {
        if stride < width {
            return Err(Error::InvalidArgument("stride is smaller than width"));
        }
        if !plane_fits(data, stride, width, height) {
            return Err(Error::InvalidArgument("plane buffer is too small"));
        }
        Ok(Self {
            data,
            stride,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row(&self, y: usize) -> &'a [P] {
        &self.data[y * self.stride..][..self.width]
    }

    pub fn pixel(&self, x: usize, y: usize) -> P {
        self.row(y)[x]
    }

    pub fn as_slice(&self) -> &'a [P] {
        self.data
    }
}

impl<P: Copy + Into<u32>> PlaneView<'_, P> {
    /// Whether every sample of the `w x h` block at `(x, y)` fits `bitdepth`
    /// bits. The block must lie inside the view.
    fn fits_depth(&self, x: usize, y: usize, w: usize, h: usize, bitdepth: u8) -> bool {
        let max = (1u32 << bitdepth) - 1;
        (y..y + h).all(|y| {
            self.data[y * self.stride + x..][..w]
                .iter()
                .all(|&p| p.into() <= max)
        })
    }
}

impl<'a> PlaneView16<'a> {
    /// View native-endian 16-bit samples stored in a byte buffer.
    /// `stride` is in samples.
    pub fn from_bytes(bytes: &'a [u8], stride: usize, width: usize, height: usize) -> Result<Self> {
        let data = reinterpret_slice::<u16>(bytes)
            .ok_or(Error::InvalidArgument("byte buffer is misaligned or odd-sized"))?;
        Self::new(data, stride, width, height)
    }
}

/// Self-guided filter output in the `pixel << SGRPROJ_RST_BITS` domain.
#[derive(Clone, Copy, Debug)]
pub struct FilterPlane<'a> {
    pub data: &'a [i32],
    pub stride: usize,
}

impl<'a> FilterPlane<'a> {
    pub fn new(data: &'a [i32], stride: usize) -> Self {
        Self { data, stride }
    }

    fn covers(&self, width: usize, height: usize) -> bool {
        self.stride >= width && plane_fits(self.data, self.stride, width, height)
    }

    /// Whether every value of the covered `width x height` block lies in
    /// `-limit..=limit`.
    fn within(&self, width: usize, height: usize, limit: i32) -> bool {
        (0..height).all(|y| {
            self.data[y * self.stride..][..width]
                .iter()
                .all(|v| (-limit..=limit).contains(v))
        })
    }
}

/// Wiener normal equations of one restoration unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WienerStats {
    pub win: WienerWin,
    /// Cross-correlation, `win²` entries.
    pub m: Vec<i64>,
    /// Symmetric autocorrelation, `win² x win²` row-major.
    pub h: Vec<i64>,
}

impl WienerStats {
    fn try_new(win: WienerWin) -> Result<Self> {
        let n = win.taps2();
        let mut m = Vec::new();
        m.try_reserve_exact(n)?;
        m.resize(n, 0);
        let mut h = Vec::new();
        h.try_reserve_exact(n * n)?;
        h.resize(n * n, 0);
        Ok(Self { win, m, h })
    }

    pub fn m(&self, k: usize) -> i64 {
        self.m[k]
    }

    pub fn h(&self, k: usize, l: usize) -> i64 {
        self.h[k * self.win.taps2() + l]
    }
}

/// Restoration analysis entry point.
///
/// An analyzer is `Sync`; concurrent calls share only its scratch pool.
pub struct Analyzer {
    settings: Settings,
    dsp: Rav1lrLooprestorationDSPContext,
    scratch: MemPool<i16>,
}

impl Analyzer {
    /// Create an analyzer with default settings
    pub fn new() -> Result<Self> {
        Self::with_settings(Settings::default())
    }

    /// Create an analyzer with custom settings
    pub fn with_settings(settings: Settings) -> Result<Self> {
        let flags = settings.cpu_level.flags();
        let tier = kernel_tier(flags);
        write_log!(
            settings.logger,
            "rav1lr: cpu level {}, {} kernels\n",
            settings.cpu_level,
            tier
        );
        Ok(Self {
            dsp: Rav1lrLooprestorationDSPContext::new(flags),
            settings,
            scratch: MemPool::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    fn reject(&self, what: &'static str) -> Error {
        write_log!(self.settings.logger, "rav1lr: invalid argument: {}\n", what);
        Error::InvalidArgument(what)
    }

    fn check_bitdepth(&self, bitdepth: u8) -> Result<()> {
        if !matches!(bitdepth, 8 | 10 | 12) {
            return Err(self.reject("bit depth must be 8, 10 or 12"));
        }
        Ok(())
    }

    fn check_wiener<P: Copy + Into<u32>>(
        &self,
        win: WienerWin,
        dgd: &PlaneView<P>,
        src: &PlaneView<P>,
        rect: &RestorationRect,
        bitdepth: u8,
    ) -> Result<()> {
        let r = win.half();
        if rect.is_empty() {
            return Err(self.reject("restoration rectangle is empty"));
        }
        if rect.width() > MAX_RESTORATION_UNIT || rect.height() > MAX_RESTORATION_UNIT {
            return Err(self.reject("restoration rectangle exceeds 384x384"));
        }
        if rect.h_end > src.width || rect.v_end > src.height {
            return Err(self.reject("restoration rectangle exceeds the source plane"));
        }
        if rect.h_start < r
            || rect.v_start < r
            || rect.h_end + r > dgd.width
            || rect.v_end + r > dgd.height
        {
            return Err(self.reject("degraded plane lacks the filter halo around the rectangle"));
        }
        let (w, h) = (rect.width(), rect.height());
        if !src.fits_depth(rect.h_start, rect.v_start, w, h, bitdepth)
            || !dgd.fits_depth(rect.h_start - r, rect.v_start - r, w + 2 * r, h + 2 * r, bitdepth)
        {
            return Err(self.reject("samples exceed the bit depth"));
        }
        Ok(())
    }

    fn check_proj<P: Copy + Into<u32>>(
        &self,
        src: &PlaneView<P>,
        dat: &PlaneView<P>,
        flt: [Option<&FilterPlane>; 2],
        params: &SgrParams,
        bitdepth: u8,
    ) -> Result<()> {
        let (w, h) = (src.width, src.height);
        if w == 0 || h == 0 {
            return Err(self.reject("projection block is empty"));
        }
        if w > MAX_RESTORATION_UNIT || h > MAX_RESTORATION_UNIT {
            return Err(self.reject("projection block exceeds 384x384"));
        }
        if dat.width < w || dat.height < h {
            return Err(self.reject("degraded plane is smaller than the source"));
        }
        if !src.fits_depth(0, 0, w, h, bitdepth) || !dat.fits_depth(0, 0, w, h, bitdepth) {
            return Err(self.reject("samples exceed the bit depth"));
        }
        let limit = sgrproj_flt_limit(bitdepth);
        for (r, f) in params.r.iter().zip(flt) {
            match f {
                Some(f) if !f.covers(w, h) => {
                    return Err(self.reject("filter plane is smaller than the block"))
                }
                // Inactive planes are never read.
                Some(f) if *r > 0 && !f.within(w, h, limit) => {
                    return Err(self.reject("filter output is out of range"))
                }
                None if *r > 0 => return Err(self.reject("active radius without a filter plane")),
                _ => {}
            }
        }
        Ok(())
    }

    fn check_xq(&self, xq: [i32; 2]) -> Result<()> {
        let range = -SGRPROJ_XQ_LIMIT..=SGRPROJ_XQ_LIMIT;
        if !xq.iter().all(|xq| range.contains(xq)) {
            return Err(self.reject("blend weight is out of range"));
        }
        Ok(())
    }

    fn check_xqd(&self, xqd: [i32; 2]) -> Result<()> {
        for k in 0..2 {
            if !(SGRPROJ_XQD_MIN[k] as i32..=SGRPROJ_XQD_MAX[k] as i32).contains(&xqd[k]) {
                return Err(self.reject("coded projection value is out of range"));
            }
        }
        Ok(())
    }

    /// Wiener statistics of `rect` for 8-bit planes.
    ///
    /// `dgd` must extend `win.half()` pixels beyond `rect` on every side.
    #[cfg(feature = "bitdepth_8")]
    pub fn wiener_stats(
        &self,
        win: WienerWin,
        dgd: &PlaneView8,
        src: &PlaneView8,
        rect: RestorationRect,
    ) -> Result<WienerStats> {
        self.check_wiener(win, dgd, src, &rect, 8)?;
        let mut stats = WienerStats::try_new(win)?;
        let mut scratch = self.scratch.acquire(LR_SCRATCH_LEN, 0)?;
        (self.dsp.compute_stats)(
            win,
            dgd.data,
            dgd.stride,
            src.data,
            src.stride,
            &rect,
            self.settings.downsample_wiener_stats,
            &mut scratch,
            &mut stats.m,
            &mut stats.h,
        );
        Ok(stats)
    }

    /// Wiener statistics of `rect` for 16-bit planes holding `bitdepth`-bit
    /// samples, scaled back to the 8-bit range.
    #[cfg(feature = "bitdepth_16")]
    pub fn wiener_stats_highbd(
        &self,
        win: WienerWin,
        dgd: &PlaneView16,
        src: &PlaneView16,
        rect: RestorationRect,
        bitdepth: u8,
    ) -> Result<WienerStats> {
        self.check_bitdepth(bitdepth)?;
        self.check_wiener(win, dgd, src, &rect, bitdepth)?;
        let mut stats = WienerStats::try_new(win)?;
        let mut scratch = self.scratch.acquire(LR_SCRATCH_LEN, 0)?;
        (self.dsp.compute_stats_highbd)(
            win,
            dgd.data,
            dgd.stride,
            src.data,
            src.stride,
            &rect,
            self.settings.downsample_wiener_stats,
            bitdepth,
            &mut scratch,
            &mut stats.m,
            &mut stats.h,
        );
        Ok(stats)
    }

    /// Squared error of restoring `dat` towards `src` with blend weights `xq`.
    /// The block is the size of `src`.
    #[cfg(feature = "bitdepth_8")]
    pub fn pixel_proj_error(
        &self,
        src: &PlaneView8,
        dat: &PlaneView8,
        flt0: Option<&FilterPlane>,
        flt1: Option<&FilterPlane>,
        xq: [i32; 2],
        params: &SgrParams,
    ) -> Result<i64> {
        self.check_proj(src, dat, [flt0, flt1], params, 8)?;
        self.check_xq(xq)?;
        let [(f0, s0), (f1, s1)] = [flt0, flt1].map(filter_parts);
        Ok((self.dsp.pixel_proj_error)(
            src.data, src.width, src.height, src.stride, dat.data, dat.stride, f0, s0, f1, s1, xq,
            params,
        ))
    }

    #[cfg(feature = "bitdepth_16")]
    pub fn pixel_proj_error_highbd(
        &self,
        src: &PlaneView16,
        dat: &PlaneView16,
        flt0: Option<&FilterPlane>,
        flt1: Option<&FilterPlane>,
        xq: [i32; 2],
        params: &SgrParams,
        bitdepth: u8,
    ) -> Result<i64> {
        self.check_bitdepth(bitdepth)?;
        self.check_proj(src, dat, [flt0, flt1], params, bitdepth)?;
        self.check_xq(xq)?;
        let [(f0, s0), (f1, s1)] = [flt0, flt1].map(filter_parts);
        Ok((self.dsp.pixel_proj_error_highbd)(
            src.data, src.width, src.height, src.stride, dat.data, dat.stride, f0, s0, f1, s1, xq,
            params,
        ))
    }

    /// [`Self::pixel_proj_error`] for coded projection values `xqd`.
    #[cfg(feature = "bitdepth_8")]
    pub fn coded_proj_error(
        &self,
        src: &PlaneView8,
        dat: &PlaneView8,
        flt0: Option<&FilterPlane>,
        flt1: Option<&FilterPlane>,
        xqd: [i32; 2],
        params: &SgrParams,
    ) -> Result<i64> {
        self.check_proj(src, dat, [flt0, flt1], params, 8)?;
        self.check_xqd(xqd)?;
        let [(f0, s0), (f1, s1)] = [flt0, flt1].map(filter_parts);
        Ok(get_pixel_proj_error(
            self.dsp.pixel_proj_error,
            src.data,
            src.width,
            src.height,
            src.stride,
            dat.data,
            dat.stride,
            f0,
            s0,
            f1,
            s1,
            xqd,
            params,
        ))
    }

    #[cfg(feature = "bitdepth_16")]
    pub fn coded_proj_error_highbd(
        &self,
        src: &PlaneView16,
        dat: &PlaneView16,
        flt0: Option<&FilterPlane>,
        flt1: Option<&FilterPlane>,
        xqd: [i32; 2],
        params: &SgrParams,
        bitdepth: u8,
    ) -> Result<i64> {
        self.check_bitdepth(bitdepth)?;
        self.check_proj(src, dat, [flt0, flt1], params, bitdepth)?;
        self.check_xqd(xqd)?;
        let [(f0, s0), (f1, s1)] = [flt0, flt1].map(filter_parts);
        Ok(get_pixel_proj_error(
            self.dsp.pixel_proj_error_highbd,
            src.data,
            src.width,
            src.height,
            src.stride,
            dat.data,
            dat.stride,
            f0,
            s0,
            f1,
            s1,
            xqd,
            params,
        ))
    }

    /// Projection normal equations for fitting the blend weights.
    #[cfg(feature = "bitdepth_8")]
    pub fn proj_params(
        &self,
        src: &PlaneView8,
        dat: &PlaneView8,
        flt0: Option<&FilterPlane>,
        flt1: Option<&FilterPlane>,
        params: &SgrParams,
    ) -> Result<ProjParams> {
        self.check_proj(src, dat, [flt0, flt1], params, 8)?;
        let [(f0, s0), (f1, s1)] = [flt0, flt1].map(filter_parts);
        Ok((self.dsp.calc_proj_params)(
            src.data, src.width, src.height, src.stride, dat.data, dat.stride, f0, s0, f1, s1,
            params,
        ))
    }

    #[cfg(feature = "bitdepth_16")]
    pub fn proj_params_highbd(
        &self,
        src: &PlaneView16,
        dat: &PlaneView16,
        flt0: Option<&FilterPlane>,
        flt1: Option<&FilterPlane>,
        params: &SgrParams,
        bitdepth: u8,
    ) -> Result<ProjParams> {
        self.check_bitdepth(bitdepth)?;
        self.check_proj(src, dat, [flt0, flt1], params, bitdepth)?;
        let [(f0, s0), (f1, s1)] = [flt0, flt1].map(filter_parts);
        Ok((self.dsp.calc_proj_params_highbd)(
            src.data, src.width, src.height, src.stride, dat.data, dat.stride, f0, s0, f1, s1,
            params,
        ))
    }

    fn check_convolve<P: Copy>(
        &self,
        dst_len: usize,
        dst_stride: usize,
        src: &PlaneView<P>,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        mx: usize,
    ) -> Result<()> {
        if w == 0 || h == 0 {
            return Err(self.reject("block is empty"));
        }
        if mx >= 16 {
            return Err(self.reject("sub-pixel phase must be below 16"));
        }
        let taps_end = x
            .checked_add(w)
            .and_then(|end| end.checked_add(SUBPEL_TAPS - 1 - FO_HORIZ));
        if x < FO_HORIZ
            || !taps_end.is_some_and(|end| end <= src.width)
            || !y.checked_add(h).is_some_and(|end| end <= src.height)
        {
            return Err(self.reject("filter taps leave the source plane"));
        }
        let dst_end = (h - 1)
            .checked_mul(dst_stride)
            .and_then(|last| last.checked_add(w));
        if dst_stride < w || !dst_end.is_some_and(|end| end <= dst_len) {
            return Err(self.reject("destination buffer is too small"));
        }
        Ok(())
    }

    /// Horizontally filter the `w x h` block at `(x, y)` of `src` by
    /// `mx / 16` of a pixel into `dst`.
    #[cfg(feature = "bitdepth_8")]
    pub fn convolve_x_sr(
        &self,
        dst: &mut [u8],
        dst_stride: usize,
        src: &PlaneView8,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        filter: InterpFilter,
        mx: usize,
    ) -> Result<()> {
        self.check_convolve(dst.len(), dst_stride, src, x, y, w, h, mx)?;
        mc::convolve_x_sr(
            dst,
            dst_stride,
            src.data,
            src.stride,
            y * src.stride + x,
            w,
            h,
            filter,
            mx,
            BitDepth8::new(u8::MAX as u16),
        );
        Ok(())
    }

    #[cfg(feature = "bitdepth_16")]
    pub fn convolve_x_sr_highbd(
        &self,
        dst: &mut [u16],
        dst_stride: usize,
        src: &PlaneView16,
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        filter: InterpFilter,
        mx: usize,
        bitdepth: u8,
    ) -> Result<()> {
        self.check_bitdepth(bitdepth)?;
        self.check_convolve(dst.len(), dst_stride, src, x, y, w, h, mx)?;
        mc::convolve_x_sr(
            dst,
            dst_stride,
            src.data,
            src.stride,
            y * src.stride + x,
            w,
            h,
            filter,
            mx,
            BitDepth16::from_bitdepth(bitdepth),
        );
        Ok(())
    }
}

fn filter_parts<'a>(f: Option<&FilterPlane<'a>>) -> (&'a [i32], usize) {
    f.map_or((&[][..], 0), |f| (f.data, f.stride))
}

fn kernel_tier(flags: CpuFlags) -> &'static str {
    cfg_if! {
        if #[cfg(target_arch = "x86_64")] {
            if flags.contains(CpuFlags::AVX2) {
                return "avx2";
            }
        } else if #[cfg(target_arch = "aarch64")] {
            if flags.contains(CpuFlags::NEON) {
                return "neon";
            }
        } else {
            let _ = flags;
        }
    }
    "scalar"
}

/// Returns a comma-delimited string of enabled compile-time feature flags.
///
/// ```
/// let features = rav1lr_safe::enabled_features();
/// assert!(features.contains("bitdepth_8"));
/// ```
pub fn enabled_features() -> String {
    let mut features = Vec::new();

    if cfg!(feature = "unchecked") {
        features.push("unchecked");
    }
    if cfg!(feature = "bitdepth_8") {
        features.push("bitdepth_8");
    }
    if cfg!(feature = "bitdepth_16") {
        features.push("bitdepth_16");
    }

    if cfg!(feature = "unchecked") {
        features.push("safety:unchecked");
    } else {
        features.push("safety:forbid-unsafe");
    }

    features.join(", ")
}
