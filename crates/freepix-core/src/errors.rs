/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Error taxonomy shared by every codec
//!
//! Each codec keeps its own error enum with detailed messages, and
//! each of those enums can report which [`ErrorKind`] it belongs to so
//! callers can react to the class of failure without matching on
//! codec specific variants.
use core::fmt::{Debug, Display, Formatter};

/// Class of a codec failure
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    /// The stream does not carry the expected signature
    SignatureMismatch,
    /// The stream ended in the middle of a structure
    TruncatedStream,
    /// The signature is valid but the bit depth, compression or
    /// plane layout is not implemented
    UnsupportedVariant,
    /// Pixel or palette memory could not be obtained
    AllocationFailure,
    /// Decoded data broke a rule of the format, e.g. an LZW code past the
    /// table or a run longer than the destination
    CorruptStream
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ErrorKind::SignatureMismatch => "signature mismatch",
            ErrorKind::TruncatedStream => "truncated stream",
            ErrorKind::UnsupportedVariant => "unsupported variant",
            ErrorKind::AllocationFailure => "allocation failure",
            ErrorKind::CorruptStream => "corrupt stream"
        };
        f.write_str(name)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self)
    }
}
