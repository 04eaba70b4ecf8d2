/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::string::String;
use core::fmt::{Debug, Formatter};

use freepix_core::bitmap::BitmapError;
use freepix_core::bytestream::ByteIoError;
use freepix_core::errors::ErrorKind;

/// BMP errors that can occur during decoding
#[non_exhaustive]
pub enum BmpDecoderErrors {
    /// The file/bytes do not start with `BM` or `BA`
    InvalidMagicBytes,
    /// Info header size matches no known variant
    UnknownHeaderSize(u32),
    /// Bit depth not in {1, 4, 8, 16, 24, 32}
    UnsupportedDepth(u16),
    /// Compression code that is not implemented, or that does not fit the depth
    UnsupportedCompression(u32, u16),
    /// Generic message
    GenericStatic(&'static str),
    /// Generic allocated message
    Generic(String),
    /// Too large dimensions for a given width or
    /// height
    TooLargeDimensions(&'static str, usize, usize),
    /// The run-length stream ended before row `usize` was complete
    TruncatedRle(usize),
    /// The output bitmap could not be created
    BitmapErrors(BitmapError),
    IoErrors(ByteIoError)
}

impl BmpDecoderErrors {
    /// Class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidMagicBytes => ErrorKind::SignatureMismatch,
            Self::UnknownHeaderSize(_)
            | Self::UnsupportedDepth(_)
            | Self::UnsupportedCompression(..) => ErrorKind::UnsupportedVariant,
            Self::TooLargeDimensions(..) => ErrorKind::AllocationFailure,
            Self::TruncatedRle(_) | Self::GenericStatic(_) | Self::Generic(_) => {
                ErrorKind::CorruptStream
            }
            Self::BitmapErrors(err) => err.kind(),
            Self::IoErrors(err) => err.kind()
        }
    }
}

impl Debug for BmpDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidMagicBytes => {
                writeln!(f, "Invalid magic bytes, file does not start with BM or BA")
            }
            Self::UnknownHeaderSize(size) => {
                writeln!(f, "Unknown bmp subtype with info header size {size}")
            }
            Self::UnsupportedDepth(depth) => {
                writeln!(f, "Unsupported bit depth {depth}")
            }
            Self::UnsupportedCompression(code, depth) => {
                writeln!(f, "Unsupported compression {code} for depth {depth}")
            }
            Self::GenericStatic(header) => {
                writeln!(f, "{}", header)
            }
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension} , {found} exceeds {expected}"
                )
            }
            Self::Generic(message) => {
                writeln!(f, "{}", message)
            }
            Self::TruncatedRle(row) => {
                writeln!(f, "RLE data ended in the middle of row {row}")
            }
            Self::BitmapErrors(err) => {
                writeln!(f, "{:?}", err)
            }
            Self::IoErrors(err) => {
                writeln!(f, "{:?}", err)
            }
        }
    }
}

impl From<ByteIoError> for BmpDecoderErrors {
    fn from(value: ByteIoError) -> Self {
        BmpDecoderErrors::IoErrors(value)
    }
}

impl From<BitmapError> for BmpDecoderErrors {
    fn from(value: BitmapError) -> Self {
        BmpDecoderErrors::BitmapErrors(value)
    }
}

/// Errors possible during encoding
pub enum BmpEncoderErrors {
    /// The bitmap was allocated header only
    NoPixels,
    /// Dimensions do not fit the 32 bit header fields
    TooLargeDimensions(usize),
    IoErrors(ByteIoError)
}

impl BmpEncoderErrors {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoPixels => ErrorKind::UnsupportedVariant,
            Self::TooLargeDimensions(_) => ErrorKind::UnsupportedVariant,
            Self::IoErrors(err) => err.kind()
        }
    }
}

impl Debug for BmpEncoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoPixels => writeln!(f, "Cannot encode a bitmap without pixels"),
            Self::TooLargeDimensions(dims) => writeln!(f, "Too large dimensions {dims}"),
            Self::IoErrors(err) => writeln!(f, "I/O error {:?}", err)
        }
    }
}

impl From<ByteIoError> for BmpEncoderErrors {
    fn from(value: ByteIoError) -> Self {
        BmpEncoderErrors::IoErrors(value)
    }
}
