//! Wiener statistics across every CPU level against a direct double-sum oracle.
//!
//! The oracle forms `M[k] = Σ s·d_k` and `H[k][l] = Σ d_k·d_l` pixel by pixel
//! in i64, then truncates toward zero for the bit depth. Every level must
//! reproduce it exactly.

use rav1lr_safe::src::managed::{
    Analyzer, CpuLevel, Error, PlaneView16, PlaneView8, Settings, WienerStats,
};
use rav1lr_safe::{RestorationRect, WienerWin};

struct Lcg(u32);

impl Lcg {
    fn next(&mut self) -> u32 {
        self.0 = self.0.wrapping_mul(1664525).wrapping_add(1013904223);
        self.0 >> 8
    }
}

#[derive(Clone, Copy, Debug)]
enum Content {
    Random,
    /// Only 0 and the maximum sample, the worst case for accumulator growth.
    Extremes,
    /// Source and degraded differ by small noise.
    Noisy,
}

struct Planes {
    dgd: Vec<u16>,
    src: Vec<u16>,
    stride: usize,
    height: usize,
}

fn make_planes(w: usize, h: usize, bd: u8, content: Content, seed: u32) -> Planes {
    // 3 pixels of halo plus one to keep the rectangle off 16-alignment.
    let stride = w + 8;
    let height = h + 6;
    let max = (1u32 << bd) - 1;
    let mut rng = Lcg(seed);
    let mut dgd = Vec::with_capacity(stride * height);
    let mut src = Vec::with_capacity(stride * height);
    for _ in 0..stride * height {
        let (d, s) = match content {
            Content::Random => (rng.next() & max, rng.next() & max),
            Content::Extremes => (
                if rng.next() & 1 == 0 { 0 } else { max },
                if rng.next() & 1 == 0 { 0 } else { max },
            ),
            Content::Noisy => {
                let s = rng.next() & max;
                let noise = (rng.next() & 7) as i32 - 4;
                ((s as i32 + noise).clamp(0, max as i32) as u32, s)
            }
        };
        dgd.push(d as u16);
        src.push(s as u16);
    }
    Planes {
        dgd,
        src,
        stride,
        height,
    }
}

fn oracle(
    win: WienerWin,
    p: &Planes,
    rect: &RestorationRect,
    bd: u8,
    downsample: bool,
) -> (Vec<i64>, Vec<i64>) {
    let (wn, n, r) = (win.taps(), win.taps2(), win.half());
    let (w, h) = (rect.width(), rect.height());
    let mut sum = 0i64;
    for y in rect.v_start..rect.v_end {
        for x in rect.h_start..rect.h_end {
            sum += p.src[y * p.stride + x] as i64;
        }
    }
    let avg = sum / (w * h) as i64;

    let step = if downsample { 4 } else { 1 };
    let mut m = vec![0i64; n];
    let mut hm = vec![0i64; n * n];
    let mut taps = vec![0i64; n];
    for y in (rect.v_start..rect.v_end).step_by(step) {
        let weight = step.min(rect.v_end - y) as i64;
        for x in rect.h_start..rect.h_end {
            let s = p.src[y * p.stride + x] as i64 - avg;
            for a in 0..wn {
                for b in 0..wn {
                    taps[a * wn + b] = p.dgd[(y + a - r) * p.stride + x + b - r] as i64 - avg;
                }
            }
            for k in 0..n {
                m[k] += weight * s * taps[k];
                for l in 0..n {
                    hm[k * n + l] += weight * taps[k] * taps[l];
                }
            }
        }
    }
    let shift = bd - 8;
    for v in m.iter_mut().chain(hm.iter_mut()) {
        let mag = (v.unsigned_abs() >> shift) as i64;
        *v = if *v < 0 { -mag } else { mag };
    }
    (m, hm)
}

fn analyzers(downsample: bool) -> Vec<(CpuLevel, Analyzer)> {
    CpuLevel::platform_levels()
        .iter()
        .map(|&level| {
            let settings = Settings {
                cpu_level: level,
                downsample_wiener_stats: downsample,
                ..Default::default()
            };
            (level, Analyzer::with_settings(settings).unwrap())
        })
        .collect()
}

fn stats_for(
    analyzer: &Analyzer,
    win: WienerWin,
    p: &Planes,
    rect: RestorationRect,
    bd: u8,
) -> WienerStats {
    let width = p.stride;
    if bd == 8 {
        let dgd: Vec<u8> = p.dgd.iter().map(|&v| v as u8).collect();
        let src: Vec<u8> = p.src.iter().map(|&v| v as u8).collect();
        let dgd = PlaneView8::new(&dgd, p.stride, width, p.height).unwrap();
        let src = PlaneView8::new(&src, p.stride, width, p.height).unwrap();
        analyzer.wiener_stats(win, &dgd, &src, rect).unwrap()
    } else {
        let dgd = PlaneView16::new(&p.dgd, p.stride, width, p.height).unwrap();
        let src = PlaneView16::new(&p.src, p.stride, width, p.height).unwrap();
        analyzer.wiener_stats_highbd(win, &dgd, &src, rect, bd).unwrap()
    }
}

fn assert_structure(stats: &WienerStats) {
    let n = stats.win.taps2();
    for k in 0..n {
        assert!(stats.h(k, k) >= 0, "negative diagonal at {k}");
        for l in 0..n {
            assert_eq!(stats.h(k, l), stats.h(l, k), "asymmetric at ({k}, {l})");
        }
    }
}

fn check(levels: &[(CpuLevel, Analyzer)], w: usize, h: usize, bd: u8, content: Content, downsample: bool) {
    let p = make_planes(w, h, bd, content, (w * 131 + h * 7 + bd as usize) as u32);
    let rect = RestorationRect::at(4, 3, w, h);
    for win in WienerWin::ALL {
        let (m, hm) = oracle(win, &p, &rect, bd, downsample);
        for (level, analyzer) in levels {
            let stats = stats_for(analyzer, win, &p, rect, bd);
            assert_eq!(
                stats.m, m,
                "[{}] M mismatch: {} {}x{} {}-bit {:?}",
                level, win, w, h, bd, content
            );
            assert_eq!(
                stats.h, hm,
                "[{}] H mismatch: {} {}x{} {}-bit {:?}",
                level, win, w, h, bd, content
            );
            assert_structure(&stats);
        }
    }
}

#[test]
fn matches_oracle_across_sizes_and_depths() {
    let levels = analyzers(false);
    let sizes = [
        (4, 4),
        (8, 8),
        (16, 16),
        (32, 32),
        (7, 13),
        (17, 5),
        (37, 29),
        (64, 9),
        (3, 40),
    ];
    for &(w, h) in &sizes {
        for bd in [8, 10, 12] {
            check(&levels, w, h, bd, Content::Random, false);
        }
    }
}

#[test]
fn extreme_content_large_units() {
    let levels = analyzers(false);
    for &(w, h) in &[(64, 64), (128, 128), (100, 71)] {
        for bd in [8, 12] {
            check(&levels, w, h, bd, Content::Extremes, false);
        }
    }
}

#[test]
fn noisy_content_matches() {
    let levels = analyzers(false);
    for bd in [8, 10] {
        check(&levels, 48, 24, bd, Content::Noisy, false);
    }
}

#[test]
fn downsampled_rows_are_weighted() {
    let levels = analyzers(true);
    // 4 + 1 trailing row exercises the short final weight.
    for &(w, h) in &[(16, 16), (21, 13), (8, 5)] {
        for bd in [8, 10] {
            check(&levels, w, h, bd, Content::Random, true);
        }
    }
}

#[test]
fn flat_unit_has_zero_statistics() {
    let px = vec![100u8; 10 * 10];
    let plane = PlaneView8::new(&px, 10, 10, 10).unwrap();
    for (level, analyzer) in analyzers(false) {
        let stats = analyzer
            .wiener_stats(WienerWin::Win3, &plane, &plane, RestorationRect::at(3, 3, 4, 4))
            .unwrap();
        assert!(stats.m.iter().all(|&v| v == 0), "[{}]", level);
        assert!(stats.h.iter().all(|&v| v == 0), "[{}]", level);
    }
}

#[test]
fn ramp_zero_offset_autocorrelation() {
    // pixel(y, x) = x over a 12x12 plane, unit of 8x8 at (2, 2).
    let px: Vec<u8> = (0..12 * 12).map(|i| (i % 12) as u8).collect();
    let plane = PlaneView8::new(&px, 12, 12, 12).unwrap();
    let rect = RestorationRect::at(2, 2, 8, 8);

    let avg = (2..10).sum::<i64>() / 8;
    let mut golden = 0i64;
    for y in 2..10 {
        for x in 2..10 {
            // Tap 0 sits one pixel up and left.
            let d = px[(y - 1) * 12 + x - 1] as i64 - avg;
            golden += d * d;
        }
    }
    assert_eq!(golden, 8 * (16 + 9 + 4 + 1 + 0 + 1 + 4 + 9));

    for (level, analyzer) in analyzers(false) {
        let stats = analyzer
            .wiener_stats(WienerWin::Win3, &plane, &plane, rect)
            .unwrap();
        assert_eq!(stats.h(0, 0), golden, "[{}]", level);
        assert_structure(&stats);
    }
}

#[test]
fn highbd_at_8_bits_matches_8bit_path() {
    let p = make_planes(23, 19, 8, Content::Random, 99);
    let rect = RestorationRect::at(4, 3, 23, 19);
    for (level, analyzer) in analyzers(false) {
        for win in WienerWin::ALL {
            let narrow = stats_for(&analyzer, win, &p, rect, 8);
            let dgd = PlaneView16::new(&p.dgd, p.stride, p.stride, p.height).unwrap();
            let src = PlaneView16::new(&p.src, p.stride, p.stride, p.height).unwrap();
            let wide = analyzer
                .wiener_stats_highbd(win, &dgd, &src, rect, 8)
                .unwrap();
            assert_eq!(narrow, wide, "[{}] {}", level, win);
        }
    }
}

#[test]
fn normalization_truncates_toward_zero() {
    // Scaled-up 8-bit content: raw 10-bit stats are exactly 16x the 8-bit
    // ones when the mean is exact, so dividing by 4 must give 4x.
    // Every row of the unit holds each of the four levels once.
    let mut px = vec![0u16; 12 * 12];
    for (i, v) in px.iter_mut().enumerate() {
        let (y, x) = (i / 12, i % 12);
        *v = [10, 30, 50, 70][(3 * x + 2 * y) % 4];
    }
    let rect = RestorationRect::at(3, 3, 4, 4);
    let sum: u32 = (3..7)
        .flat_map(|y| (3..7).map(move |x| (y, x)))
        .map(|(y, x)| px[y * 12 + x] as u32)
        .sum();
    assert_eq!(sum, 640);

    let scaled: Vec<u16> = px.iter().map(|&v| v << 2).collect();
    let analyzer = Analyzer::new().unwrap();
    let dgd8 = PlaneView16::new(&px, 12, 12, 12).unwrap();
    let dgd10 = PlaneView16::new(&scaled, 12, 12, 12).unwrap();
    let base = analyzer
        .wiener_stats_highbd(WienerWin::Win3, &dgd8, &dgd8, rect, 8)
        .unwrap();
    let ten = analyzer
        .wiener_stats_highbd(WienerWin::Win3, &dgd10, &dgd10, rect, 10)
        .unwrap();
    assert!(base.h.iter().any(|&v| v != 0));
    let times4: Vec<i64> = base.h.iter().map(|v| v * 4).collect();
    assert_eq!(ten.h, times4);
    let times4: Vec<i64> = base.m.iter().map(|v| v * 4).collect();
    assert_eq!(ten.m, times4);

    // Independent of the mean, the oracle pins the rounding.
    let p = Planes {
        dgd: scaled.clone(),
        src: scaled,
        stride: 12,
        height: 12,
    };
    let (m, h) = oracle(WienerWin::Win3, &p, &rect, 10, false);
    assert_eq!(ten.m, m);
    assert_eq!(ten.h, h);
}

#[test]
fn rejects_bad_arguments() {
    let analyzer = Analyzer::new().unwrap();
    let px = vec![0u16; 16 * 16];
    let plane = PlaneView16::new(&px, 16, 16, 16).unwrap();
    let ok = RestorationRect::at(3, 3, 8, 8);

    assert!(analyzer
        .wiener_stats_highbd(WienerWin::Win7, &plane, &plane, ok, 9)
        .is_err());
    assert!(analyzer
        .wiener_stats_highbd(WienerWin::Win7, &plane, &plane, RestorationRect::at(3, 3, 0, 8), 10)
        .is_err());
    // Halo of 3 runs off the right edge.
    assert!(analyzer
        .wiener_stats_highbd(WienerWin::Win7, &plane, &plane, RestorationRect::at(3, 3, 11, 8), 10)
        .is_err());
    // The same rectangle fits a 3-tap halo.
    assert!(analyzer
        .wiener_stats_highbd(WienerWin::Win3, &plane, &plane, RestorationRect::at(3, 3, 12, 8), 10)
        .is_ok());
    assert!(WienerWin::try_from(4).is_err());
}

#[test]
fn rejects_samples_above_bit_depth() {
    let analyzer = Analyzer::new().unwrap();
    let rect = RestorationRect::at(3, 3, 8, 8);

    // 0 and 40000 alternate, far beyond 12 bits.
    let wild: Vec<u16> = (0..16 * 16).map(|i| if i % 2 == 0 { 0 } else { 40000 }).collect();
    let plane = PlaneView16::new(&wild, 16, 16, 16).unwrap();
    assert_eq!(
        analyzer.wiener_stats_highbd(WienerWin::Win7, &plane, &plane, rect, 12),
        Err(Error::InvalidArgument("samples exceed the bit depth"))
    );

    // One sample of 1024 in the degraded halo fails at 10 bits only.
    let mut px = vec![1023u16; 16 * 16];
    let ok = px.clone();
    px[0] = 1024;
    let dgd = PlaneView16::new(&px, 16, 16, 16).unwrap();
    let src = PlaneView16::new(&ok, 16, 16, 16).unwrap();
    assert!(analyzer
        .wiener_stats_highbd(WienerWin::Win7, &dgd, &src, rect, 10)
        .is_err());
    assert!(analyzer
        .wiener_stats_highbd(WienerWin::Win7, &dgd, &src, rect, 12)
        .is_ok());
    // Outside the 3-tap halo the sample is never read.
    assert!(analyzer
        .wiener_stats_highbd(WienerWin::Win3, &dgd, &src, rect, 10)
        .is_ok());
    assert!(analyzer
        .wiener_stats_highbd(WienerWin::Win7, &src, &dgd, rect, 10)
        .is_ok());
}
