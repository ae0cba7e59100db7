//! Integer helpers shared by the restoration kernels.

#![forbid(unsafe_code)]

use std::cmp;

#[inline]
pub fn iclip(v: i32, min: i32, max: i32) -> i32 {
    cmp::max(min, cmp::min(v, max))
}

/// AV1 `ROUND_POWER_OF_TWO`: `(x + (1 << shift >> 1)) >> shift`.
///
/// The shift is arithmetic, so negative ties round toward +inf.
#[inline]
pub fn round2(x: i32, shift: u8) -> i32 {
    (x + (1i32 << shift >> 1)) >> shift
}

/// Gives `magnitude` the sign of `sign_source`.
#[inline]
pub fn apply_sign(magnitude: u64, sign_source: i64) -> i64 {
    if sign_source < 0 {
        -(magnitude as i64)
    } else {
        magnitude as i64
    }
}

#[inline]
pub const fn round_up(v: usize, multiple: usize) -> usize {
    (v + multiple - 1) / multiple * multiple
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round2_ties() {
        assert_eq!(round2(3, 1), 2);
        assert_eq!(round2(2, 1), 1);
        assert_eq!(round2(-3, 1), -1);
        assert_eq!(round2(-1, 1), 0);
    }

    #[test]
    fn apply_sign_truncates_toward_zero() {
        let x = -7i64;
        assert_eq!(apply_sign(x.unsigned_abs() >> 2, x), -1);
        // an arithmetic shift rounds toward -inf instead
        assert_eq!(x >> 2, -2);
        assert_eq!(apply_sign(7u64 >> 2, 7), 1);
    }

    #[test]
    fn round_up_multiple() {
        assert_eq!(round_up(0, 16), 0);
        assert_eq!(round_up(1, 16), 16);
        assert_eq!(round_up(390, 16), 400);
    }
}
