#![forbid(unsafe_code)]

use crate::include::common::intops::iclip;
use std::fmt;
use zerocopy::{AsBytes, FromBytes};

pub trait BitDepth: Clone + Copy + fmt::Debug {
    type Pixel: Copy + Default + Into<i32> + Into<u32> + AsBytes + FromBytes + fmt::Debug;

    fn new(bitdepth_max: u16) -> Self;

    /// Significant bits per sample (8, 10 or 12).
    fn bitdepth(&self) -> u8;

    fn bitdepth_max(&self) -> i32 {
        (1 << self.bitdepth()) - 1
    }

    fn iclip_pixel(&self, v: i32) -> Self::Pixel;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BitDepth8 {}

impl BitDepth for BitDepth8 {
    type Pixel = u8;

    fn new(_bitdepth_max: u16) -> Self {
        Self {}
    }

    fn bitdepth(&self) -> u8 {
        8
    }

    #[inline]
    fn iclip_pixel(&self, v: i32) -> u8 {
        iclip(v, 0, u8::MAX as i32) as u8
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BitDepth16 {
    bitdepth_max: u16,
}

impl BitDepth16 {
    /// `bitdepth` must be 8, 10 or 12.
    pub fn from_bitdepth(bitdepth: u8) -> Self {
        assert!(matches!(bitdepth, 8 | 10 | 12), "unsupported bit depth {bitdepth}");
        Self::new((1u16 << bitdepth) - 1)
    }
}

impl BitDepth for BitDepth16 {
    type Pixel = u16;

    fn new(bitdepth_max: u16) -> Self {
        Self { bitdepth_max }
    }

    fn bitdepth(&self) -> u8 {
        (u16::BITS - self.bitdepth_max.leading_zeros()) as u8
    }

    fn bitdepth_max(&self) -> i32 {
        self.bitdepth_max as i32
    }

    #[inline]
    fn iclip_pixel(&self, v: i32) -> u16 {
        iclip(v, 0, self.bitdepth_max as i32) as u16
    }
}
