#![forbid(unsafe_code)]
use bitflags::bitflags;
use std::ffi::c_uint;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "arm",
    target_arch = "aarch64",
)))]
bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CpuFlags: c_uint {}
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CpuFlags: c_uint {
        const SSE2 = 1 << 0;
        const SSSE3 = 1 << 1;
        const SSE41 = 1 << 2;
        const AVX2 = 1 << 3;
    }
}

#[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CpuFlags: c_uint {
        const NEON = 1 << 0;
    }
}

impl CpuFlags {
    pub fn compile_time_detect() -> Self {
        #[allow(unused_mut)]
        let mut flags = Self::empty();

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if cfg!(target_feature = "sse2") {
                flags |= Self::SSE2;
            }
            if cfg!(target_feature = "ssse3") {
                flags |= Self::SSSE3;
            }
            if cfg!(target_feature = "sse4.1") {
                flags |= Self::SSE41;
            }
            if cfg!(target_feature = "avx2") {
                flags |= Self::AVX2;
            }
        }

        #[cfg(any(target_arch = "arm", target_arch = "aarch64"))]
        {
            if cfg!(target_feature = "neon") {
                flags |= Self::NEON;
            }
        }

        flags
    }

    pub fn run_time_detect() -> Self {
        #[allow(unused_mut)]
        let mut flags = Self::empty();

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if is_x86_feature_detected!("sse2") {
                flags |= Self::SSE2;
            }
            if is_x86_feature_detected!("ssse3") {
                flags |= Self::SSSE3;
            }
            if is_x86_feature_detected!("sse4.1") {
                flags |= Self::SSE41;
            }
            if is_x86_feature_detected!("avx2") {
                flags |= Self::AVX2;
            }
        }

        #[cfg(target_arch = "aarch64")]
        {
            if std::arch::is_aarch64_feature_detected!("neon") {
                flags |= Self::NEON;
            }
        }

        flags
    }
}

/// Detected once, read by every context constructor.
static rav1lr_cpu_flags: AtomicU32 = AtomicU32::new(0);
static rav1lr_cpu_flags_init: std::sync::Once = std::sync::Once::new();

/// Features of the running CPU, independent of any caller mask.
#[inline(always)]
pub fn rav1lr_get_cpu_flags() -> CpuFlags {
    rav1lr_cpu_flags_init.call_once(|| {
        rav1lr_cpu_flags.store(CpuFlags::run_time_detect().bits(), Ordering::SeqCst);
    });
    let flags = rav1lr_cpu_flags.load(Ordering::SeqCst) | CpuFlags::compile_time_detect().bits();
    CpuFlags::from_bits_truncate(flags)
}
