//! Safe SIMD kernels using Rust intrinsics.
//!
//! Every kernel is entered through an archmage token, so no module here
//! needs `unsafe`. Unchecked row access is confined to `pixel_access`.

#![cfg_attr(not(feature = "unchecked"), forbid(unsafe_code))]

pub mod partial_simd;
pub mod pixel_access;

#[cfg(target_arch = "x86_64")]
pub mod sgrproj;
#[cfg(target_arch = "x86_64")]
pub mod wiener_stats;

#[cfg(target_arch = "aarch64")]
pub mod wiener_stats_arm;
