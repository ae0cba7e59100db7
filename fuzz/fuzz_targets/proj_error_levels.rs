//! Fuzz target: self-guided projection error across kernel tiers.
#![no_main]

use libfuzzer_sys::fuzz_target;
use rav1lr_safe::src::managed::{Analyzer, CpuLevel, FilterPlane, PlaneView16, PlaneView8, Settings};
use rav1lr_safe::SgrParams;
use std::sync::OnceLock;

fn analyzers() -> &'static (Analyzer, Analyzer) {
    static A: OnceLock<(Analyzer, Analyzer)> = OnceLock::new();
    A.get_or_init(|| {
        let with = |cpu_level| {
            Analyzer::with_settings(Settings {
                cpu_level,
                ..Default::default()
            })
            .unwrap()
        };
        (with(CpuLevel::Scalar), with(CpuLevel::Native))
    })
}

fuzz_target!(|data: &[u8]| {
    if data.len() < 6 {
        return;
    }
    let params = SgrParams::from_set(data[0] as usize % 16);
    let bd = [8u8, 10, 12][data[1] as usize % 3];
    let w = 1 + data[2] as usize % 80;
    let h = 1 + data[3] as usize % 40;
    let xqd = [data[4] as i32 % 97 - 96, data[5] as i32 % 128 - 32];
    let body = &data[6..];
    if body.is_empty() {
        return;
    }

    let stride = w + 3;
    let max = (1i32 << bd) - 1;
    let at = |i: usize| body[i % body.len()] as i32;
    let src: Vec<u16> = (0..stride * h).map(|i| ((at(i) * 17) & max) as u16).collect();
    let dat: Vec<u16> = (0..stride * h)
        .map(|i| (src[i] as i32 + at(i + 1) % 9 - 4).clamp(0, max) as u16)
        .collect();
    let flt = |k: usize| -> Vec<i32> {
        (0..stride * h)
            .map(|i| ((dat[i] as i32) << 4) + at(i * 3 + k) - 128)
            .collect()
    };
    let (flt0, flt1) = (flt(1), flt(2));
    let f0 = FilterPlane::new(&flt0, stride);
    let f1 = FilterPlane::new(&flt1, stride);

    let (scalar, native) = analyzers();
    if bd == 8 {
        let src: Vec<u8> = src.iter().map(|&v| v as u8).collect();
        let dat: Vec<u8> = dat.iter().map(|&v| v as u8).collect();
        let src = PlaneView8::new(&src, stride, w, h).unwrap();
        let dat = PlaneView8::new(&dat, stride, w, h).unwrap();
        let a = scalar.coded_proj_error(&src, &dat, Some(&f0), Some(&f1), xqd, &params);
        let b = native.coded_proj_error(&src, &dat, Some(&f0), Some(&f1), xqd, &params);
        assert_eq!(a, b);
    } else {
        let src = PlaneView16::new(&src, stride, w, h).unwrap();
        let dat = PlaneView16::new(&dat, stride, w, h).unwrap();
        let a = scalar.coded_proj_error_highbd(&src, &dat, Some(&f0), Some(&f1), xqd, &params, bd);
        let b = native.coded_proj_error_highbd(&src, &dat, Some(&f0), Some(&f1), xqd, &params, bd);
        assert_eq!(a, b);
    }
});
