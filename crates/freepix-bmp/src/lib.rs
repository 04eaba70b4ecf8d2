/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A Windows and OS/2 bitmap decoder and encoder
//!
//! # Features
//! - `no_std` by default with `alloc` feature
//! - Decodes OS/2 1.x, OS/2 2.x and Windows 3.x to 5 headers
//! - Top down and bottom up images
//! - Paletted images (1, 4 and 8 bits)
//! - Masked images (16 and 32 bits)
//! - RLE (4 bit and 8 bit) decoding, RLE8 encoding
//!
//! # Unsupported formats
//! - Embedded PNG and JPEGs
//! - Huffman coded OS/2 images
#![cfg_attr(not(test), no_std)]
#![macro_use]
extern crate alloc;

pub use crate::common::{BmpCompression, BmpVariant};
pub use crate::decoder::{probe_bmp, BmpDecoder};
pub use crate::encoder::BmpEncoder;
pub use crate::errors::{BmpDecoderErrors, BmpEncoderErrors};
pub use crate::rle::{encode_rle8_end, encode_rle8_line};

mod common;
mod decoder;
mod encoder;
mod errors;
mod rle;
