/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A ZSoft Paintbrush (PCX) decoder and encoder
//!
//! # Supported layouts
//! - 1 bit monochrome
//! - 4 bit, stored as four 1 bit planes with the palette in the header
//! - 8 bit, with the VGA palette at the end of the file or a grayscale ramp
//! - 24 bit, stored as three 8 bit planes
//!
//! Both raw and run length encoded pixel data can be read,
//! the encoder always writes run length encoded data.
#![cfg_attr(not(test), no_std)]
#![macro_use]
extern crate alloc;

pub use crate::decoder::PcxDecoder;
pub use crate::encoder::PcxEncoder;
pub use crate::errors::{PcxDecoderErrors, PcxEncoderErrors};
pub use crate::header::{probe_pcx, PcxHeader};

mod decoder;
mod encoder;
mod errors;
mod header;
mod rle;
