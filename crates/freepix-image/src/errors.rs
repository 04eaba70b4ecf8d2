/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors surfaced by the registry
//!
//! Codec errors are flattened into [`ImageErrors::DecodeErrors`] and
//! [`ImageErrors::EncodeErrors`] carrying the class of the failure and the
//! codec's own message.
use std::fmt::{Debug, Display, Formatter};

use freepix_core::bytestream::ByteIoError;
use freepix_core::errors::ErrorKind;

use crate::plugin::FormatId;

pub enum ImageErrors {
    /// No registered format matches the stream or the file name
    UnknownFormat,
    /// The id does not belong to this registry
    InvalidFormatId(FormatId),
    /// The plugin is registered but disabled
    PluginDisabled(&'static str),
    /// The format can be detected but not read
    NoDecoder(&'static str),
    /// The format cannot be written
    NoEncoder(&'static str),
    /// The format cannot store bitmaps of this depth
    UnsupportedExportDepth(&'static str, u16),
    /// A header-only bitmap was handed to a format that needs pixels
    NoPixels(&'static str),
    /// Requested page, page count
    PageOutOfRange(usize, usize),
    /// The session belongs to a different plugin
    InvalidSession(&'static str),
    DecodeErrors(ErrorKind, String),
    EncodeErrors(ErrorKind, String),
    IoErrors(ByteIoError),
    FileErrors(std::io::Error)
}

impl ImageErrors {
    /// Class of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownFormat => ErrorKind::SignatureMismatch,
            Self::InvalidFormatId(_)
            | Self::PluginDisabled(_)
            | Self::NoDecoder(_)
            | Self::NoEncoder(_)
            | Self::UnsupportedExportDepth(..)
            | Self::NoPixels(_) => ErrorKind::UnsupportedVariant,
            Self::PageOutOfRange(..) | Self::InvalidSession(_) => ErrorKind::CorruptStream,
            Self::DecodeErrors(kind, _) | Self::EncodeErrors(kind, _) => *kind,
            Self::IoErrors(err) => err.kind(),
            Self::FileErrors(_) => ErrorKind::TruncatedStream
        }
    }
}

impl Debug for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFormat => writeln!(f, "Unknown image format"),
            Self::InvalidFormatId(id) => writeln!(f, "No format registered as {:?}", id),
            Self::PluginDisabled(name) => writeln!(f, "The {name} plugin is disabled"),
            Self::NoDecoder(name) => writeln!(f, "No decoder for {name} images"),
            Self::NoEncoder(name) => writeln!(f, "No encoder for {name} images"),
            Self::UnsupportedExportDepth(name, depth) => {
                writeln!(f, "{name} cannot store {depth} bit images")
            }
            Self::NoPixels(name) => writeln!(f, "{name} needs a bitmap with pixels"),
            Self::PageOutOfRange(page, count) => {
                writeln!(f, "Page {page} requested but there are {count} pages")
            }
            Self::InvalidSession(name) => writeln!(f, "Session was not opened by {name}"),
            Self::DecodeErrors(kind, message) => writeln!(f, "Decoding failed ({kind}): {message}"),
            Self::EncodeErrors(kind, message) => writeln!(f, "Encoding failed ({kind}): {message}"),
            Self::IoErrors(err) => writeln!(f, "{:?}", err),
            Self::FileErrors(err) => writeln!(f, "{}", err)
        }
    }
}

impl Display for ImageErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for ImageErrors {}

impl From<ByteIoError> for ImageErrors {
    fn from(value: ByteIoError) -> Self {
        Self::IoErrors(value)
    }
}

impl From<std::io::Error> for ImageErrors {
    fn from(value: std::io::Error) -> Self {
        Self::FileErrors(value)
    }
}
