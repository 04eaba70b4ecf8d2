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

/// SGI errors that can occur during decoding
#[non_exhaustive]
pub enum SgiDecoderErrors {
    /// The file does not start with magic number 474
    InvalidMagicBytes,
    /// Only one byte per component is supported
    UnsupportedBytesPerComponent(u8),
    /// Dithered, indexed and colormap only files are obsolete
    UnsupportedColormap(i32),
    /// Channel count outside 1 to 4
    InvalidChannelCount(u16),
    ZeroDimensions,
    TooLargeDimensions(&'static str, usize, usize),
    /// Run length data of channel and row ended early
    TruncatedRle(usize, usize),
    BitmapErrors(BitmapError),
    IoErrors(ByteIoError)
}

impl SgiDecoderErrors {
    /// Class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagicBytes => ErrorKind::SignatureMismatch,
            Self::UnsupportedBytesPerComponent(_)
            | Self::UnsupportedColormap(_)
            | Self::InvalidChannelCount(_) => ErrorKind::UnsupportedVariant,
            Self::ZeroDimensions | Self::TruncatedRle(..) => ErrorKind::CorruptStream,
            Self::TooLargeDimensions(..) => ErrorKind::AllocationFailure,
            Self::BitmapErrors(err) => err.kind(),
            Self::IoErrors(err) => err.kind()
        }
    }
}

impl Debug for SgiDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidMagicBytes => writeln!(f, "Invalid magic number, expected 474"),
            Self::UnsupportedBytesPerComponent(bpc) => {
                writeln!(f, "Unsupported {bpc} bytes per component, only 1 is supported")
            }
            Self::UnsupportedColormap(mode) => {
                writeln!(f, "Unsupported colormap mode {mode}")
            }
            Self::InvalidChannelCount(count) => writeln!(f, "Invalid channel count {count}"),
            Self::ZeroDimensions => writeln!(f, "Zero sized image"),
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension} , {found} exceeds {expected}"
                )
            }
            Self::TruncatedRle(channel, row) => {
                writeln!(f, "RLE data of channel {channel} ended in row {row}")
            }
            Self::BitmapErrors(err) => writeln!(f, "{:?}", err),
            Self::IoErrors(err) => writeln!(f, "{:?}", err)
        }
    }
}

impl From<ByteIoError> for SgiDecoderErrors {
    fn from(value: ByteIoError) -> Self {
        SgiDecoderErrors::IoErrors(value)
    }
}

impl From<BitmapError> for SgiDecoderErrors {
    fn from(value: BitmapError) -> Self {
        SgiDecoderErrors::BitmapErrors(value)
    }
}

/// Errors possible during encoding
pub enum SgiEncoderErrors {
    NoPixels,
    /// Only 8, 24 and 32 bit bitmaps can be written
    UnsupportedDepth(u16),
    /// Dimensions do not fit the 16 bit size fields
    TooLargeDimensions(usize),
    IoErrors(ByteIoError)
}

impl SgiEncoderErrors {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoPixels | Self::UnsupportedDepth(_) | Self::TooLargeDimensions(_) => {
                ErrorKind::UnsupportedVariant
            }
            Self::IoErrors(err) => err.kind()
        }
    }
}

impl Debug for SgiEncoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoPixels => writeln!(f, "Cannot encode a bitmap without pixels"),
            Self::UnsupportedDepth(depth) => writeln!(f, "Cannot write {depth} bit sgi images"),
            Self::TooLargeDimensions(dims) => writeln!(f, "Too large dimensions {dims}"),
            Self::IoErrors(err) => writeln!(f, "I/O error {:?}", err)
        }
    }
}

impl From<ByteIoError> for SgiEncoderErrors {
    fn from(value: ByteIoError) -> Self {
        SgiEncoderErrors::IoErrors(value)
    }
}
