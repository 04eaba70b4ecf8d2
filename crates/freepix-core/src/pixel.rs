/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Pixel layout conventions
//!
//! 24 and 32 bit pixels are stored in one build-wide byte order. By default
//! that is `B,G,R(,A)` (the order BMP and most little endian containers use on disk),
//! enabling the `rgb_order` feature switches it to `R,G,B(,A)`.
//!
//! Codecs never index channels by hand, they go through the helpers here,
//! so switching the order touches only this file.
//!
//! 16 bit pixels are stored as little endian `u16` words, described by the
//! [`ChannelMasks`] of the bitmap they live in.

/// Byte offset of the red channel inside a 24/32 bit pixel
#[cfg(not(feature = "rgb_order"))]
pub const RED: usize = 2;
/// Byte offset of the green channel inside a 24/32 bit pixel
#[cfg(not(feature = "rgb_order"))]
pub const GREEN: usize = 1;
/// Byte offset of the blue channel inside a 24/32 bit pixel
#[cfg(not(feature = "rgb_order"))]
pub const BLUE: usize = 0;

#[cfg(feature = "rgb_order")]
pub const RED: usize = 0;
#[cfg(feature = "rgb_order")]
pub const GREEN: usize = 1;
#[cfg(feature = "rgb_order")]
pub const BLUE: usize = 2;

/// Byte offset of the alpha channel inside a 32 bit pixel
pub const ALPHA: usize = 3;

#[cfg(not(feature = "rgb_order"))]
pub const RED_MASK: u32 = 0x00FF_0000;
#[cfg(not(feature = "rgb_order"))]
pub const BLUE_MASK: u32 = 0x0000_00FF;
#[cfg(feature = "rgb_order")]
pub const RED_MASK: u32 = 0x0000_00FF;
#[cfg(feature = "rgb_order")]
pub const BLUE_MASK: u32 = 0x00FF_0000;

pub const GREEN_MASK: u32 = 0x0000_FF00;
pub const ALPHA_MASK: u32 = 0xFF00_0000;

/// A palette entry or a full color
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
pub struct Rgba {
    pub red:   u8,
    pub green: u8,
    pub blue:  u8,
    pub alpha: u8
}

impl Rgba {
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Rgba {
        Rgba {
            red,
            green,
            blue,
            alpha
        }
    }
    /// A gray entry, alpha is left at zero as palettes keep
    /// transparency in a separate table
    pub const fn gray(value: u8) -> Rgba {
        Rgba::new(value, value, value, 0)
    }
    /// Compare color channels only
    pub const fn same_color(&self, other: &Rgba) -> bool {
        self.red == other.red && self.green == other.green && self.blue == other.blue
    }
}

/// Red, green and blue bit masks of a 16, 24 or 32 bit pixel
#[derive(Copy, Clone, Default, Debug, Eq, PartialEq, Hash)]
pub struct ChannelMasks {
    pub red:   u32,
    pub green: u32,
    pub blue:  u32
}

impl ChannelMasks {
    /// 5 bits per channel, top bit unused
    pub const RGB555: ChannelMasks = ChannelMasks::new(0x7C00, 0x03E0, 0x001F);
    /// 5 bits red and blue, 6 bits green
    pub const RGB565: ChannelMasks = ChannelMasks::new(0xF800, 0x07E0, 0x001F);
    /// Masks of the native 24/32 bit layout
    pub const NATIVE: ChannelMasks = ChannelMasks::new(RED_MASK, GREEN_MASK, BLUE_MASK);
    /// Masks for depths without channels (palettized)
    pub const NONE: ChannelMasks = ChannelMasks::new(0, 0, 0);

    pub const fn new(red: u32, green: u32, blue: u32) -> ChannelMasks {
        ChannelMasks { red, green, blue }
    }
    /// Default masks for a bit depth
    pub const fn for_depth(bits_per_pixel: u16) -> ChannelMasks {
        match bits_per_pixel {
            16 => ChannelMasks::RGB555,
            24 | 32 => ChannelMasks::NATIVE,
            _ => ChannelMasks::NONE
        }
    }
}

/// Extract the channel selected by `mask` from `value` and scale it to 8 bits
pub fn extract_channel(value: u32, mask: u32) -> u8 {
    if mask == 0 {
        return 0;
    }
    let shift = mask.trailing_zeros();
    let bits = (mask >> shift).count_ones();
    let raw = (value & mask) >> shift;

    if bits >= 8 {
        (raw >> (bits - 8)) as u8
    } else {
        // replicate the high bits into the low bits, so that a full
        // channel maps to 255
        let max = (1_u32 << bits) - 1;
        ((raw * 255 + max / 2) / max) as u8
    }
}

/// Write a color into a 24 or 32 bit pixel
#[inline(always)]
pub fn put_rgb(pixel: &mut [u8], red: u8, green: u8, blue: u8) {
    pixel[RED] = red;
    pixel[GREEN] = green;
    pixel[BLUE] = blue;
}

/// Write a color with alpha into a 32 bit pixel
#[inline(always)]
pub fn put_rgba(pixel: &mut [u8], color: Rgba) {
    put_rgb(pixel, color.red, color.green, color.blue);
    pixel[ALPHA] = color.alpha;
}

/// Read the color of a 24 or 32 bit pixel, alpha is zero for 24 bit pixels
#[inline(always)]
pub fn get_rgba(pixel: &[u8]) -> Rgba {
    Rgba {
        red:   pixel[RED],
        green: pixel[GREEN],
        blue:  pixel[BLUE],
        alpha: pixel.get(ALPHA).copied().unwrap_or(0)
    }
}

/// Convert pixels stored as `B,G,R(,A)`, as found on disk, into the native order in place
///
/// `channels` is 3 or 4
#[inline]
pub fn bgr_to_native(row: &mut [u8], channels: usize) {
    #[cfg(feature = "rgb_order")]
    {
        row.chunks_exact_mut(channels).for_each(|px| px.swap(0, 2));
    }
    #[cfg(not(feature = "rgb_order"))]
    {
        let _ = (row, channels);
    }
}

/// Copy native order pixels into `out` as `B,G,R(,A)`
///
/// `channels` is 3 or 4
#[inline]
pub fn native_to_bgr(row: &[u8], out: &mut [u8], channels: usize) {
    out[..row.len()].copy_from_slice(row);
    #[cfg(feature = "rgb_order")]
    {
        out[..row.len()]
            .chunks_exact_mut(channels)
            .for_each(|px| px.swap(0, 2));
    }
    #[cfg(not(feature = "rgb_order"))]
    {
        let _ = channels;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_scaling() {
        assert_eq!(extract_channel(0x7C00, ChannelMasks::RGB555.red), 255);
        assert_eq!(extract_channel(0x0000, ChannelMasks::RGB555.red), 0);
        assert_eq!(extract_channel(0x07E0, ChannelMasks::RGB565.green), 255);
        assert_eq!(extract_channel(0x00AB_0000, 0x00FF_0000), 0xAB);
        assert_eq!(extract_channel(0xFFFF, 0), 0);
    }

    #[test]
    fn native_helpers_agree() {
        let mut px = [0_u8; 4];
        put_rgba(&mut px, Rgba::new(1, 2, 3, 4));
        assert_eq!(get_rgba(&px), Rgba::new(1, 2, 3, 4));

        let disk = [3_u8, 2, 1];
        let mut native = disk;
        bgr_to_native(&mut native, 3);
        assert_eq!(get_rgba(&native), Rgba::new(1, 2, 3, 0));

        let mut back = [0_u8; 3];
        native_to_bgr(&native, &mut back, 3);
        assert_eq!(back, disk);
    }
}
