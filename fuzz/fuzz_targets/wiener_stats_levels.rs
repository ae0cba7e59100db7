//! Fuzz target: Wiener statistics must not depend on the kernel tier.
//!
//! The first bytes pick the window, bit depth and unit size; the rest fill
//! both planes. The scalar and native analyzers must agree exactly.
#![no_main]

use libfuzzer_sys::fuzz_target;
use rav1lr_safe::src::managed::{Analyzer, CpuLevel, PlaneView16, Settings};
use rav1lr_safe::{RestorationRect, WienerWin};
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
    if data.len() < 4 {
        return;
    }
    let win = WienerWin::ALL[data[0] as usize % 3];
    let bd = [8u8, 10, 12][data[1] as usize % 3];
    let w = 1 + data[2] as usize % 96;
    let h = 1 + data[3] as usize % 96;
    let body = &data[4..];
    if body.is_empty() {
        return;
    }

    let (stride, rows) = (w + 8, h + 6);
    let max = (1u32 << bd) - 1;
    let sample = |i: usize| {
        let b = body[i % body.len()] as u32;
        ((b << 4 | b >> 4) & max) as u16
    };
    let dgd: Vec<u16> = (0..stride * rows).map(sample).collect();
    let src: Vec<u16> = (0..stride * rows).map(|i| sample(i * 7 + 3)).collect();
    let dgd = PlaneView16::new(&dgd, stride, stride, rows).unwrap();
    let src = PlaneView16::new(&src, stride, stride, rows).unwrap();
    let rect = RestorationRect::at(4, 3, w, h);

    let (scalar, native) = analyzers();
    let a = scalar.wiener_stats_highbd(win, &dgd, &src, rect, bd).unwrap();
    let b = native.wiener_stats_highbd(win, &dgd, &src, rect, bd).unwrap();
    assert_eq!(a, b);
});
