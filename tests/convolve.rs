//! Horizontal sub-pixel convolution through the managed API.

use rav1lr_safe::src::managed::{Analyzer, Error, PlaneView16, PlaneView8};
use rav1lr_safe::src::tables::rav1lr_subpel_filters;
use rav1lr_safe::InterpFilter;

struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1664525).wrapping_add(1013904223);
        self.0 >> 8
    }
}

fn filter_set(filter: InterpFilter, w: usize) -> usize {
    match filter {
        InterpFilter::Bilinear => 3,
        _ if w > 4 => filter as usize,
        InterpFilter::Smooth => 5,
        _ => 4,
    }
}

fn expected(src: &[u16], stride: usize, x0: usize, y0: usize, w: usize, h: usize, filter: InterpFilter, mx: usize, bd: u8) -> Vec<u16> {
    let kernel = &rav1lr_subpel_filters[filter_set(filter, w)][mx];
    let round_0 = if bd == 12 { 5 } else { 3 };
    let bits = 7 - round_0;
    let max = (1i32 << bd) - 1;
    let mut out = Vec::new();
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let mut sum = 0i32;
            for (k, &c) in kernel.iter().enumerate() {
                sum += src[y * stride + x + k - 3] as i32 * c as i32;
            }
            let r0 = (sum + (1 << (round_0 - 1))) >> round_0;
            let r1 = (r0 + (1 << (bits - 1))) >> bits;
            out.push(r1.clamp(0, max) as u16);
        }
    }
    out
}

#[test]
fn matches_two_stage_rounding() {
    let analyzer = Analyzer::new().unwrap();
    let (stride, height) = (40, 12);
    for bd in [8u8, 10, 12] {
        let mut rng = Lcg(bd as u32);
        let max = (1u32 << bd) - 1;
        let src: Vec<u16> = (0..stride * height).map(|_| (rng.next() & max) as u16).collect();
        for filter in [
            InterpFilter::Regular,
            InterpFilter::Smooth,
            InterpFilter::Sharp,
            InterpFilter::Bilinear,
        ] {
            for &(w, mx) in &[(4, 3), (8, 8), (16, 0), (2, 15), (30, 11)] {
                let (x, y, h) = (5, 2, 7);
                let want = expected(&src, stride, x, y, w, h, filter, mx, bd);
                let got: Vec<u16> = if bd == 8 {
                    let src8: Vec<u8> = src.iter().map(|&v| v as u8).collect();
                    let plane = PlaneView8::new(&src8, stride, stride, height).unwrap();
                    let mut dst = vec![0u8; w * h];
                    analyzer
                        .convolve_x_sr(&mut dst, w, &plane, x, y, w, h, filter, mx)
                        .unwrap();
                    dst.into_iter().map(u16::from).collect()
                } else {
                    let plane = PlaneView16::new(&src, stride, stride, height).unwrap();
                    let mut dst = vec![0u16; w * h];
                    analyzer
                        .convolve_x_sr_highbd(&mut dst, w, &plane, x, y, w, h, filter, mx, bd)
                        .unwrap();
                    dst
                };
                assert_eq!(got, want, "{:?} w={} mx={} {}-bit", filter, w, mx, bd);
            }
        }
    }
}

#[test]
fn rejects_taps_outside_plane() {
    let analyzer = Analyzer::new().unwrap();
    let px = [0u8; 16 * 4];
    let plane = PlaneView8::new(&px, 16, 16, 4).unwrap();
    let mut dst = [0u8; 32];
    let bad = |r: Result<(), Error>| assert!(matches!(r, Err(Error::InvalidArgument(_))));

    bad(analyzer.convolve_x_sr(&mut dst, 8, &plane, 2, 0, 8, 1, InterpFilter::Regular, 0));
    bad(analyzer.convolve_x_sr(&mut dst, 8, &plane, 5, 0, 8, 1, InterpFilter::Regular, 0));
    bad(analyzer.convolve_x_sr(&mut dst, 8, &plane, 3, 0, 8, 1, InterpFilter::Regular, 16));
    bad(analyzer.convolve_x_sr(&mut dst, 8, &plane, 3, 0, 8, 5, InterpFilter::Regular, 0));
    bad(analyzer.convolve_x_sr(&mut dst[..10], 8, &plane, 3, 0, 8, 2, InterpFilter::Regular, 0));
    // x = 3, w = 8 reads columns 0..=14.
    assert!(analyzer
        .convolve_x_sr(&mut dst, 8, &plane, 3, 0, 8, 4, InterpFilter::Regular, 0)
        .is_ok());
}
