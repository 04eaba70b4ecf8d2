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

pub enum GifDecoderErrors {
    /// File is not a gif
    NotAGif,
    /// A generic error
    Static(&'static str),
    /// To large dimensions for width or height
    TooLargeDimensions(&'static str, usize, usize),
    /// A block introducer that is not an image, extension or trailer
    InvalidBlock(u8),
    /// Requested page, page count
    PageOutOfRange(usize, usize),
    /// LZW minimum code size outside 1 to 11
    InvalidCodeSize(u8),
    /// LZW code that cannot be in the string table
    CorruptLzw(u16),
    /// Image data ended early, pixels present and expected
    TruncatedImage(usize, usize),
    BitmapErrors(BitmapError),
    /// Underlying input output errors
    IoErrors(ByteIoError)
}

impl GifDecoderErrors {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotAGif => ErrorKind::SignatureMismatch,
            Self::Static(_)
            | Self::InvalidBlock(_)
            | Self::PageOutOfRange(..)
            | Self::InvalidCodeSize(_)
            | Self::CorruptLzw(_) => ErrorKind::CorruptStream,
            Self::TruncatedImage(..) => ErrorKind::TruncatedStream,
            Self::TooLargeDimensions(..) => ErrorKind::AllocationFailure,
            Self::BitmapErrors(err) => err.kind(),
            Self::IoErrors(err) => err.kind()
        }
    }
}

impl Debug for GifDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            GifDecoderErrors::NotAGif => {
                writeln!(f, "Not a gif, magic bytes didn't match")
            }
            GifDecoderErrors::Static(v) => {
                writeln!(f, "{}", v)
            }
            GifDecoderErrors::TooLargeDimensions(a, b, c) => {
                writeln!(
                    f,
                    "Too large dimensions for {a} expected less than {b} but found  {c}"
                )
            }
            Self::InvalidBlock(byte) => writeln!(f, "Invalid GIF block {byte:#04x}"),
            Self::PageOutOfRange(page, count) => {
                writeln!(f, "Page {page} requested but the file has {count} pages")
            }
            Self::InvalidCodeSize(size) => writeln!(f, "Invalid LZW code size {size}"),
            Self::CorruptLzw(code) => writeln!(f, "Invalid LZW code {code}"),
            Self::TruncatedImage(found, expected) => {
                writeln!(f, "Image data ended after {found} of {expected} pixels")
            }
            Self::BitmapErrors(err) => writeln!(f, "{:?}", err),
            Self::IoErrors(err) => {
                writeln!(f, "{:?}", err)
            }
        }
    }
}

impl From<&'static str> for GifDecoderErrors {
    fn from(value: &'static str) -> Self {
        Self::Static(value)
    }
}

impl From<ByteIoError> for GifDecoderErrors {
    fn from(value: ByteIoError) -> Self {
        GifDecoderErrors::IoErrors(value)
    }
}

impl From<BitmapError> for GifDecoderErrors {
    fn from(value: BitmapError) -> Self {
        GifDecoderErrors::BitmapErrors(value)
    }
}

/// Errors possible during encoding
pub enum GifEncoderErrors {
    NoPixels,
    /// The file was closed before any frame was added
    NoFrames,
    /// Only 1, 4 and 8 bit bitmaps can be written
    UnsupportedDepth(u16),
    /// Dimensions do not fit the 16 bit size fields
    TooLargeDimensions(usize),
    IoErrors(ByteIoError)
}

impl GifEncoderErrors {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoPixels
            | Self::NoFrames
            | Self::UnsupportedDepth(_)
            | Self::TooLargeDimensions(_) => ErrorKind::UnsupportedVariant,
            Self::IoErrors(err) => err.kind()
        }
    }
}

impl Debug for GifEncoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoPixels => writeln!(f, "Cannot encode a bitmap without pixels"),
            Self::NoFrames => writeln!(f, "A gif needs at least one frame"),
            Self::UnsupportedDepth(depth) => {
                writeln!(f, "Cannot write {depth} bit gif images, palettized input is needed")
            }
            Self::TooLargeDimensions(dims) => writeln!(f, "Too large dimensions {dims}"),
            Self::IoErrors(err) => writeln!(f, "I/O error {:?}", err)
        }
    }
}

impl From<ByteIoError> for GifEncoderErrors {
    fn from(value: ByteIoError) -> Self {
        GifEncoderErrors::IoErrors(value)
    }
}
