#![forbid(unsafe_code)]

use crate::include::common::bitdepth::BitDepth;
use crate::include::common::intops::round2;
use crate::src::tables::rav1lr_subpel_filters;
use crate::src::tables::FILTER_BITS;
use crate::src::tables::SUBPEL_TAPS;

/// Interpolation kernel family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum InterpFilter {
    #[default]
    Regular = 0,
    Smooth = 1,
    Sharp = 2,
    Bilinear = 3,
}

impl InterpFilter {
    /// Kernel for 1/16th-pel phase `mx` on a block `len` samples long.
    /// Blocks of 4 or fewer samples use the short regular/smooth kernels.
    pub fn kernel(self, mx: usize, len: usize) -> &'static [i16; SUBPEL_TAPS] {
        let set = match self {
            Self::Bilinear => 3,
            _ if len > 4 => self as usize,
            Self::Smooth => 5,
            Self::Regular | Self::Sharp => 4,
        };
        &rav1lr_subpel_filters[set][mx]
    }
}

/// Rounding of the single horizontal pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConvolveParams {
    pub round_0: u8,
    pub bits: u8,
}

impl ConvolveParams {
    pub const fn new(bitdepth: u8) -> Self {
        let round_0 = if bitdepth == 12 { 3 + 2 } else { 3 };
        Self {
            round_0,
            bits: FILTER_BITS - round_0,
        }
    }
}

/// Taps left of the output position.
pub const FO_HORIZ: usize = SUBPEL_TAPS / 2 - 1;

/// Horizontal sub-pixel filter of a `w x h` block.
///
/// `src_off` addresses the source sample aligned with `dst[0]`; the kernel
/// reads [`FO_HORIZ`] samples left and 4 right of every output position.
pub fn convolve_x_sr<BD: BitDepth>(
    dst: &mut [BD::Pixel],
    dst_stride: usize,
    src: &[BD::Pixel],
    src_stride: usize,
    src_off: usize,
    w: usize,
    h: usize,
    filter: InterpFilter,
    mx: usize,
    bd: BD,
) {
    assert!(src_off % src_stride >= FO_HORIZ);
    let kernel = filter.kernel(mx, w);
    let params = ConvolveParams::new(bd.bitdepth());
    for y in 0..h {
        let src = &src[src_off + y * src_stride - FO_HORIZ..][..w + SUBPEL_TAPS - 1];
        let dst = &mut dst[y * dst_stride..][..w];
        for (x, out) in dst.iter_mut().enumerate() {
            let sum: i32 = src[x..x + SUBPEL_TAPS]
                .iter()
                .zip(kernel)
                .map(|(&p, &k)| Into::<i32>::into(p) * k as i32)
                .sum();
            *out = bd.iclip_pixel(round2(round2(sum, params.round_0), params.bits));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::include::common::bitdepth::BitDepth16;
    use crate::include::common::bitdepth::BitDepth8;

    #[test]
    fn zero_phase_copies() {
        let src: Vec<u8> = (0..32).map(|i| (i * 7) as u8).collect();
        let mut dst = [0u8; 8];
        convolve_x_sr(&mut dst, 8, &src, 16, 3, 8, 1, InterpFilter::Sharp, 0, BitDepth8::new(255));
        assert_eq!(&dst[..], &src[3..11]);
    }

    #[test]
    fn half_pel_bilinear_averages() {
        let src = [0u16, 0, 0, 1000, 2000, 0, 0, 0, 0, 0];
        let mut dst = [0u16; 1];
        convolve_x_sr(&mut dst, 1, &src, 10, 3, 1, 1, InterpFilter::Bilinear, 8, BitDepth16::from_bitdepth(12));
        assert_eq!(dst[0], 1500);
    }

    #[test]
    fn output_is_clipped() {
        // Half-pel next to a step overshoots.
        let src = [0u8, 0, 0, 255, 255, 255, 255, 255, 255, 255, 255, 255];
        let mut dst = [0u8; 4];
        convolve_x_sr(&mut dst, 4, &src, 12, 3, 4, 1, InterpFilter::Sharp, 8, BitDepth8::new(255));
        assert!(dst.iter().all(|&v| v == 255));
    }

    #[test]
    fn short_blocks_use_four_taps() {
        assert_eq!(InterpFilter::Sharp.kernel(5, 4), &rav1lr_subpel_filters[4][5]);
        assert_eq!(InterpFilter::Smooth.kernel(5, 2), &rav1lr_subpel_filters[5][5]);
        assert_eq!(InterpFilter::Sharp.kernel(5, 8), &rav1lr_subpel_filters[2][5]);
        assert_eq!(ConvolveParams::new(12), ConvolveParams { round_0: 5, bits: 2 });
    }
}
