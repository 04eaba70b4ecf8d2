/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The in-memory raster every codec decodes into and encodes from
//!
//! # Layout
//! Rows are padded to a 4 byte boundary, the distance between two rows
//! is the [pitch](Bitmap::pitch).
//!
//! Rows are addressed logically, row `0` is the **bottom** row of the image.
//! The physical storage order is recorded in [`ScanOrder`], and all row access goes
//! through [`Bitmap::row`] and [`Bitmap::row_mut`] which translate a logical index into
//! a storage offset. Codecs reading top down files therefore ask for `row(height - 1 - y)`.
//!
//! # Depths
//! - 1, 4 and 8 bits per pixel are palettized, with a palette of exactly `2^bpp` entries
//! - 16 bits per pixel are little endian words described by [`ChannelMasks`]
//! - 24 and 32 bits per pixel use the byte order from [`crate::pixel`]
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::{Debug, Formatter};

pub use crate::bitmap::metadata::{Metadata, MetadataModel, TagValue};
use crate::errors::ErrorKind;
use crate::pixel::{ChannelMasks, Rgba};

mod metadata;

/// Physical order rows are stored in
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum ScanOrder {
    /// First stored row is the bottom row of the image
    #[default]
    BottomUp,
    /// First stored row is the top row of the image
    TopDown
}

/// Errors raised when creating or mutating a bitmap
pub enum BitmapError {
    /// Bit depth not in {1, 4, 8, 16, 24, 32}
    UnsupportedDepth(u16),
    /// Width or height is zero
    ZeroDimensions(usize, usize),
    /// Dimensions overflow the address space
    TooLarge(usize, usize, u16),
    /// Memory for pixels could not be reserved
    AllocationFailed(usize),
    /// Transparency table longer than the palette
    TransparencyTooLong(usize, usize),
    /// Palette size does not match `2^bpp`
    PaletteSize(usize, usize),
    /// Pixel access on a header only bitmap
    NoPixels
}

impl BitmapError {
    pub const fn kind(&self) -> ErrorKind {
        match self {
            BitmapError::UnsupportedDepth(_) => ErrorKind::UnsupportedVariant,
            BitmapError::TooLarge(..) | BitmapError::AllocationFailed(_) => {
                ErrorKind::AllocationFailure
            }
            _ => ErrorKind::CorruptStream
        }
    }
}

impl Debug for BitmapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            BitmapError::UnsupportedDepth(bpp) => {
                writeln!(f, "Unsupported bit depth {bpp}")
            }
            BitmapError::ZeroDimensions(w, h) => {
                writeln!(f, "Zero sized bitmap, width {w}, height {h}")
            }
            BitmapError::TooLarge(w, h, bpp) => {
                writeln!(f, "Bitmap of {w}x{h} at {bpp} bpp overflows usize")
            }
            BitmapError::AllocationFailed(size) => {
                writeln!(f, "Could not allocate {size} bytes for pixels")
            }
            BitmapError::TransparencyTooLong(table, palette) => {
                writeln!(
                    f,
                    "Transparency table has {table} entries but palette only has {palette}"
                )
            }
            BitmapError::PaletteSize(found, expected) => {
                writeln!(f, "Palette has {found} entries, expected {expected}")
            }
            BitmapError::NoPixels => writeln!(f, "Bitmap was allocated without pixels")
        }
    }
}

impl core::fmt::Display for BitmapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for BitmapError {}

/// Number of bytes between two rows of a bitmap
///
/// This is `((width * bpp + 31) / 32) * 4`, i.e rows are padded
/// to 32 bits. Returns `None` on overflow.
pub const fn compute_pitch(width: usize, bits_per_pixel: u16) -> Option<usize> {
    let bits = match width.checked_mul(bits_per_pixel as usize) {
        Some(bits) => bits,
        None => return None
    };
    match bits.checked_add(31) {
        Some(padded) => Some((padded / 32) * 4),
        None => None
    }
}

/// Number of bytes covering the pixels of one row, without padding
pub const fn compute_line_bytes(width: usize, bits_per_pixel: u16) -> usize {
    (width * bits_per_pixel as usize + 7) / 8
}

const fn is_valid_depth(bpp: u16) -> bool {
    matches!(bpp, 1 | 4 | 8 | 16 | 24 | 32)
}

/// A decoded raster plus its palette and metadata
#[derive(Clone, Debug)]
pub struct Bitmap {
    width:            usize,
    height:           usize,
    bits_per_pixel:   u16,
    pitch:            usize,
    order:            ScanOrder,
    masks:            ChannelMasks,
    palette:          Vec<Rgba>,
    transparency:     Vec<u8>,
    alpha_channel:    bool,
    background:       Option<Rgba>,
    dots_per_meter_x: u32,
    dots_per_meter_y: u32,
    metadata:         Metadata,
    pixels:           Option<Vec<u8>>
}

impl Bitmap {
    /// Allocate a zeroed bitmap with default channel masks
    pub fn allocate(width: usize, height: usize, bits_per_pixel: u16) -> Result<Bitmap, BitmapError> {
        Bitmap::allocate_header(false, width, height, bits_per_pixel, None)
    }

    /// Allocate a zeroed bitmap with explicit channel masks
    pub fn allocate_with_masks(
        width: usize, height: usize, bits_per_pixel: u16, masks: ChannelMasks
    ) -> Result<Bitmap, BitmapError> {
        Bitmap::allocate_header(false, width, height, bits_per_pixel, Some(masks))
    }

    /// Allocate a bitmap, optionally without pixel storage
    ///
    /// When `header_only` is true the bitmap carries dimensions, palette
    /// and metadata but no pixels, [`row`](Self::row) then returns `None`.
    ///
    /// Palettized depths get a zeroed palette of `2^bpp` entries.
    /// Masks default to [`ChannelMasks::for_depth`]
    pub fn allocate_header(
        header_only: bool, width: usize, height: usize, bits_per_pixel: u16,
        masks: Option<ChannelMasks>
    ) -> Result<Bitmap, BitmapError> {
        if !is_valid_depth(bits_per_pixel) {
            return Err(BitmapError::UnsupportedDepth(bits_per_pixel));
        }
        if width == 0 || height == 0 {
            return Err(BitmapError::ZeroDimensions(width, height));
        }
        let pitch = compute_pitch(width, bits_per_pixel)
            .ok_or(BitmapError::TooLarge(width, height, bits_per_pixel))?;
        let size = pitch
            .checked_mul(height)
            .ok_or(BitmapError::TooLarge(width, height, bits_per_pixel))?;

        let pixels = if header_only {
            None
        } else {
            let mut storage = Vec::new();
            storage
                .try_reserve_exact(size)
                .map_err(|_| BitmapError::AllocationFailed(size))?;
            storage.resize(size, 0);
            Some(storage)
        };
        let palette = if bits_per_pixel <= 8 {
            vec![Rgba::default(); 1 << bits_per_pixel]
        } else {
            Vec::new()
        };
        let masks = if bits_per_pixel > 8 {
            masks.unwrap_or(ChannelMasks::for_depth(bits_per_pixel))
        } else {
            ChannelMasks::NONE
        };

        Ok(Bitmap {
            width,
            height,
            bits_per_pixel,
            pitch,
            order: ScanOrder::BottomUp,
            masks,
            palette,
            transparency: Vec::new(),
            alpha_channel: false,
            background: None,
            dots_per_meter_x: 0,
            dots_per_meter_y: 0,
            metadata: Metadata::new(),
            pixels
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }
    pub const fn height(&self) -> usize {
        self.height
    }
    /// Return width and height as a tuple
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
    pub const fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }
    /// Bytes between consecutive rows
    pub const fn pitch(&self) -> usize {
        self.pitch
    }
    /// Bytes covering the pixels of one row, i.e. pitch without padding
    pub const fn line_bytes(&self) -> usize {
        compute_line_bytes(self.width, self.bits_per_pixel)
    }
    pub const fn scan_order(&self) -> ScanOrder {
        self.order
    }
    /// Change how rows are physically stored
    ///
    /// This only changes the indirection, call it before filling pixels.
    pub fn set_scan_order(&mut self, order: ScanOrder) {
        self.order = order;
    }
    pub const fn masks(&self) -> ChannelMasks {
        self.masks
    }
    /// Whether this bitmap was allocated without pixel storage
    pub const fn is_header_only(&self) -> bool {
        self.pixels.is_none()
    }

    /// Storage offset of logical row `y`
    const fn row_offset(&self, y: usize) -> usize {
        match self.order {
            ScanOrder::BottomUp => y * self.pitch,
            ScanOrder::TopDown => (self.height - 1 - y) * self.pitch
        }
    }

    /// Logical row `y`, `0` being the bottom row
    ///
    /// Returns `None` if `y` is out of range or the bitmap has no pixels.
    /// The returned slice is `pitch` bytes long.
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let start = self.row_offset(y);
        self.pixels
            .as_deref()
            .map(|pixels| &pixels[start..start + self.pitch])
    }

    /// Mutable logical row `y`, `0` being the bottom row
    pub fn row_mut(&mut self, y: usize) -> Option<&mut [u8]> {
        if y >= self.height {
            return None;
        }
        let start = self.row_offset(y);
        let pitch = self.pitch;
        self.pixels
            .as_deref_mut()
            .map(|pixels| &mut pixels[start..start + pitch])
    }

    /// Logical row `y` viewed as fixed size pixels, `N` must match the byte depth
    ///
    /// Padding at the end of the row is not included
    pub fn pixels_of_row_mut<const N: usize>(&mut self, y: usize) -> Option<&mut [[u8; N]]>
    where
        [u8; N]: bytemuck::Pod
    {
        let width = self.width;
        if usize::from(self.bits_per_pixel) != N * 8 {
            return None;
        }
        self.row_mut(y)
            .map(|row| bytemuck::cast_slice_mut(&mut row[..width * N]))
    }

    /// Raw storage in physical order
    pub fn pixels(&self) -> Option<&[u8]> {
        self.pixels.as_deref()
    }
    pub fn pixels_mut(&mut self) -> Option<&mut [u8]> {
        self.pixels.as_deref_mut()
    }

    /// Palette entries, empty for depths above 8
    pub fn palette(&self) -> &[Rgba] {
        &self.palette
    }
    pub fn palette_mut(&mut self) -> &mut [Rgba] {
        &mut self.palette
    }
    /// Replace the palette, the size must stay `2^bpp`
    pub fn set_palette(&mut self, palette: &[Rgba]) -> Result<(), BitmapError> {
        if palette.len() != self.palette.len() {
            return Err(BitmapError::PaletteSize(palette.len(), self.palette.len()));
        }
        self.palette.copy_from_slice(palette);
        Ok(())
    }
    /// Fill the palette with a black to white ramp
    pub fn set_grayscale_palette(&mut self) {
        let entries = self.palette.len();
        if entries < 2 {
            return;
        }
        for (i, entry) in self.palette.iter_mut().enumerate() {
            *entry = Rgba::gray(((i * 255) / (entries - 1)) as u8);
        }
    }

    /// Per palette entry alpha, `0` meaning fully transparent
    pub fn transparency_table(&self) -> &[u8] {
        &self.transparency
    }
    /// Set the per palette entry alpha table
    ///
    /// The table may be shorter than the palette, missing entries are opaque.
    pub fn set_transparency_table(&mut self, table: &[u8]) -> Result<(), BitmapError> {
        if table.len() > self.palette.len() {
            return Err(BitmapError::TransparencyTooLong(table.len(), self.palette.len()));
        }
        self.transparency.clear();
        self.transparency.extend_from_slice(table);
        Ok(())
    }
    /// First palette index that is fully transparent
    pub fn transparent_index(&self) -> Option<usize> {
        self.transparency.iter().position(|alpha| *alpha == 0)
    }
    /// Mark a 32 bit bitmap as carrying a meaningful alpha channel
    pub fn set_alpha_channel(&mut self, yes: bool) {
        self.alpha_channel = yes && self.bits_per_pixel == 32;
    }
    pub fn is_transparent(&self) -> bool {
        self.alpha_channel || !self.transparency.is_empty()
    }

    pub const fn background(&self) -> Option<Rgba> {
        self.background
    }
    pub fn set_background(&mut self, color: Option<Rgba>) {
        self.background = color;
    }

    /// Horizontal and vertical resolution in dots per meter
    pub const fn dots_per_meter(&self) -> (u32, u32) {
        (self.dots_per_meter_x, self.dots_per_meter_y)
    }
    pub fn set_dots_per_meter(&mut self, x: u32, y: u32) {
        self.dots_per_meter_x = x;
        self.dots_per_meter_y = y;
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }
    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Compare the visible pixels of two bitmaps row by row, ignoring storage order and padding
    pub fn same_pixels(&self, other: &Bitmap) -> bool {
        if self.dimensions() != other.dimensions() || self.bits_per_pixel != other.bits_per_pixel
        {
            return false;
        }
        let line = self.line_bytes();
        (0..self.height).all(|y| match (self.row(y), other.row(y)) {
            (Some(a), Some(b)) => a[..line] == b[..line],
            _ => false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_is_padded_to_four_bytes() {
        assert_eq!(compute_pitch(3, 1), Some(4));
        assert_eq!(compute_pitch(10, 8), Some(12));
        assert_eq!(compute_pitch(1, 24), Some(4));
        assert_eq!(compute_pitch(5, 4), Some(4));
        assert_eq!(compute_pitch(9, 4), Some(8));
        assert_eq!(compute_pitch(usize::MAX, 8), None);
    }

    #[test]
    fn top_down_rows_are_flipped() {
        let mut bitmap = Bitmap::allocate(2, 3, 8).unwrap();
        bitmap.set_scan_order(ScanOrder::TopDown);
        bitmap.row_mut(0).unwrap()[0] = 7;

        // bottom row lives at the end of storage
        let pixels = bitmap.pixels().unwrap();
        assert_eq!(pixels[2 * bitmap.pitch()], 7);
        assert_eq!(bitmap.row(0).unwrap()[0], 7);
        assert!(bitmap.row(3).is_none());
    }

    #[test]
    fn header_only_has_no_rows() {
        let bitmap = Bitmap::allocate_header(true, 100, 100, 4, None).unwrap();
        assert!(bitmap.is_header_only());
        assert!(bitmap.row(0).is_none());
        assert_eq!(bitmap.palette().len(), 16);
    }

    #[test]
    fn rejects_bad_depths_and_sizes() {
        assert!(matches!(
            Bitmap::allocate(1, 1, 2),
            Err(BitmapError::UnsupportedDepth(2))
        ));
        assert!(matches!(
            Bitmap::allocate(0, 1, 8),
            Err(BitmapError::ZeroDimensions(0, 1))
        ));
        let err = Bitmap::allocate(usize::MAX / 2, 4, 32).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailure);
    }

    #[test]
    fn transparency_table_bounds() {
        let mut bitmap = Bitmap::allocate(4, 4, 1).unwrap();
        assert!(bitmap.set_transparency_table(&[255, 0, 255]).is_err());
        bitmap.set_transparency_table(&[255, 0]).unwrap();
        assert_eq!(bitmap.transparent_index(), Some(1));
        assert!(bitmap.is_transparent());
    }

    #[test]
    fn fixed_size_pixel_view() {
        let mut bitmap = Bitmap::allocate(3, 1, 24).unwrap();
        assert_eq!(bitmap.pitch(), 12);
        let row = bitmap.pixels_of_row_mut::<3>(0).unwrap();
        assert_eq!(row.len(), 3);
        row[2] = [1, 2, 3];
        assert_eq!(&bitmap.row(0).unwrap()[6..9], &[1, 2, 3]);
        assert!(bitmap.pixels_of_row_mut::<4>(0).is_none());
    }
}
