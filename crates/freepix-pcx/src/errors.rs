/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use core::fmt::{Debug, Formatter};

use freepix_core::bitmap::BitmapError;
use freepix_core::bytestream::ByteIoError;
use freepix_core::errors::ErrorKind;

/// PCX errors that can occur during decoding
#[non_exhaustive]
pub enum PcxDecoderErrors {
    /// Manufacturer, version, encoding or bits per pixel byte is wrong
    InvalidMagicBytes,
    /// Window coordinates `left, top, right, bottom` describe no pixels
    InvalidWindow([u16; 4]),
    /// Bits per pixel and plane count that are not implemented
    UnsupportedLayout(u8, u8),
    /// Bytes per line cannot hold a row of the image
    ShortScanline(usize, usize),
    TooLargeDimensions(&'static str, usize, usize),
    /// Run length data ended before line `usize` was complete
    TruncatedRle(usize),
    BitmapErrors(BitmapError),
    IoErrors(ByteIoError)
}

impl PcxDecoderErrors {
    /// Class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagicBytes => ErrorKind::SignatureMismatch,
            Self::UnsupportedLayout(..) => ErrorKind::UnsupportedVariant,
            Self::InvalidWindow(_) | Self::ShortScanline(..) | Self::TruncatedRle(_) => {
                ErrorKind::CorruptStream
            }
            Self::TooLargeDimensions(..) => ErrorKind::AllocationFailure,
            Self::BitmapErrors(err) => err.kind(),
            Self::IoErrors(err) => err.kind()
        }
    }
}

impl Debug for PcxDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidMagicBytes => writeln!(f, "Not a pcx file, header signature mismatch"),
            Self::InvalidWindow([left, top, right, bottom]) => {
                writeln!(
                    f,
                    "Invalid image window, left:{left} top:{top} right:{right} bottom:{bottom}"
                )
            }
            Self::UnsupportedLayout(bpp, planes) => {
                writeln!(f, "Unsupported layout of {planes} planes with {bpp} bits per pixel")
            }
            Self::ShortScanline(found, needed) => {
                writeln!(f, "Bytes per line {found} is less than the {needed} a row needs")
            }
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension} , {found} exceeds {expected}"
                )
            }
            Self::TruncatedRle(line) => writeln!(f, "RLE data ended in the middle of line {line}"),
            Self::BitmapErrors(err) => writeln!(f, "{:?}", err),
            Self::IoErrors(err) => writeln!(f, "{:?}", err)
        }
    }
}

impl From<ByteIoError> for PcxDecoderErrors {
    fn from(value: ByteIoError) -> Self {
        PcxDecoderErrors::IoErrors(value)
    }
}

impl From<BitmapError> for PcxDecoderErrors {
    fn from(value: BitmapError) -> Self {
        PcxDecoderErrors::BitmapErrors(value)
    }
}

/// Errors possible during encoding
pub enum PcxEncoderErrors {
    /// The bitmap was allocated header only
    NoPixels,
    /// Only 1, 4, 8 and 24 bit bitmaps can be written
    UnsupportedDepth(u16),
    /// Dimensions do not fit the 16 bit window fields
    TooLargeDimensions(usize),
    IoErrors(ByteIoError)
}

impl PcxEncoderErrors {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoPixels | Self::UnsupportedDepth(_) | Self::TooLargeDimensions(_) => {
                ErrorKind::UnsupportedVariant
            }
            Self::IoErrors(err) => err.kind()
        }
    }
}

impl Debug for PcxEncoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoPixels => writeln!(f, "Cannot encode a bitmap without pixels"),
            Self::UnsupportedDepth(depth) => writeln!(f, "Cannot write {depth} bit pcx images"),
            Self::TooLargeDimensions(dims) => writeln!(f, "Too large dimensions {dims}"),
            Self::IoErrors(err) => writeln!(f, "I/O error {:?}", err)
        }
    }
}

impl From<ByteIoError> for PcxEncoderErrors {
    fn from(value: ByteIoError) -> Self {
        PcxEncoderErrors::IoErrors(value)
    }
}
