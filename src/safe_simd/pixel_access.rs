//! Row access helpers for the SIMD kernels.
//!
//! When the `unchecked` feature is enabled, these use unchecked indexing.
//! Otherwise, they use normal bounds-checked indexing.

#![cfg_attr(not(feature = "unchecked"), forbid(unsafe_code))]

use zerocopy::{FromBytes, Ref};

/// `len` elements of `buf` starting at `offset`.
#[inline(always)]
pub fn row_slice<T>(buf: &[T], offset: usize, len: usize) -> &[T] {
    #[cfg(feature = "unchecked")]
    {
        debug_assert!(offset + len <= buf.len());
        // SAFETY: callers stay inside the rectangle they validated up front.
        #[allow(unsafe_code)]
        unsafe {
            buf.get_unchecked(offset..offset + len)
        }
    }
    #[cfg(not(feature = "unchecked"))]
    &buf[offset..offset + len]
}

/// Whether rows `0..height` of `width` elements, `stride` apart, lie inside
/// `buf`. Overflowing extents do not fit.
#[inline]
pub fn plane_fits<T>(buf: &[T], stride: usize, width: usize, height: usize) -> bool {
    if width == 0 || height == 0 {
        return true;
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|last| last.checked_add(width))
        .is_some_and(|end| end <= buf.len())
}

/// Reinterpret raw bytes as a slice of `Dst`.
///
/// Returns `None` when `bytes` is misaligned for `Dst` or its length is not
/// a multiple of `Dst`'s size.
#[inline(always)]
pub fn reinterpret_slice<Dst: FromBytes>(bytes: &[u8]) -> Option<&[Dst]> {
    let r: Ref<&[u8], [Dst]> = Ref::new_slice(bytes)?;
    Some(r.into_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_slice_bounds() {
        let buf = [1, 2, 3, 4, 5];
        assert_eq!(row_slice(&buf, 1, 3), &[2, 3, 4]);
        assert_eq!(row_slice(&buf, 5, 0), &[] as &[i32]);
    }

    #[test]
    fn plane_extent() {
        let buf = [0u8; 10];
        assert!(plane_fits(&buf, 4, 2, 3));
        assert!(!plane_fits(&buf, 4, 4, 3));
        assert!(plane_fits(&buf, usize::MAX, 4, 0));
        assert!(!plane_fits(&buf, usize::MAX, 1, 3));
    }

    #[test]
    fn reinterpret_u16() {
        let words = [0x0102u16, 0x0304];
        let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_ne_bytes()).collect();
        // A Vec<u8> from the global allocator is at least 2-aligned in practice,
        // but only assert on the success path.
        if let Some(back) = reinterpret_slice::<u16>(&bytes) {
            assert_eq!(back, &words);
        }
        assert!(reinterpret_slice::<u16>(&bytes[..3]).is_none());
    }
}
