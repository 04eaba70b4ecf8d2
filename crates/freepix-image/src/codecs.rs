/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Built in formats
//!
//! Each codec crate is wrapped in a [`FormatPlugin`](crate::plugin::FormatPlugin),
//! formats whose codecs live elsewhere are present as detection only plugins
//! so streams in those formats are still recognised.
use freepix_core::bytestream::ByteReaderTrait;

pub mod bmp;
pub mod external;
pub mod gif;
pub mod pcx;
pub mod sgi;

/// Read the first `N` bytes of a stream, `None` if the stream is shorter
pub(crate) fn read_signature<const N: usize>(stream: &mut dyn ByteReaderTrait) -> Option<[u8; N]> {
    let mut signature = [0; N];
    stream.read_exact_bytes(&mut signature).ok()?;
    Some(signature)
}

/// Read as many bytes as fit in `buf`, returning how many were read
pub(crate) fn read_prefix(stream: &mut dyn ByteReaderTrait, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read_bytes(&mut buf[filled..]) {
            Ok(0) | Err(_) => break,
            Ok(read) => filled += read
        }
    }
    filled
}
