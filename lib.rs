#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
// Crate-wide forbid(unsafe_code) unless `unchecked` is enabled.
// The only unsafe is the unchecked row access in safe_simd::pixel_access.
// forbid cannot be overridden by #[allow], so any other unsafe is a hard error.
#![cfg_attr(not(feature = "unchecked"), forbid(unsafe_code))]
#![allow(clippy::all)]

#[cfg(not(any(feature = "bitdepth_8", feature = "bitdepth_16")))]
compile_error!("No bitdepths enabled. Enable one or more of the following features: `bitdepth_8`, `bitdepth_16`");

pub mod include {
    pub mod common {
        pub mod bitdepth;
        pub mod intops;
    } // mod common
} // mod include
pub mod src {
    // Core primitives
    pub mod cpu;
    pub mod error;
    pub mod levels;
    pub mod log;
    pub(crate) mod mem;
    pub mod tables;

    // Restoration analysis
    pub mod sgrproj;
    pub mod wiener_avg;
    pub mod wiener_stats;

    // DSP dispatch (fn ptr tables over the scalar and SIMD kernels)
    pub mod looprestoration;
    pub mod mc;

    // Safe SIMD implementations (internal, not part of the public API)
    pub(crate) mod safe_simd;

    // === Managed Safe API ===
    /// 100% safe Rust API for restoration analysis
    ///
    /// Validates planes and rectangles before handing them to the kernels.
    pub mod managed;
} // mod src

// Re-export the managed API at the crate root for convenience.
// Users can write `rav1lr_safe::Analyzer` instead of `rav1lr_safe::src::managed::Analyzer`.
pub use src::levels::{RestorationRect, WienerWin};
pub use src::log::Rav1lrLogger;
pub use src::managed::{
    enabled_features, Analyzer, CpuLevel, Error, FilterPlane, PlaneView, PlaneView16, PlaneView8,
    Result, Settings, WienerStats,
};
pub use src::mc::InterpFilter;
pub use src::sgrproj::{ProjParams, SgrParams};
