/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Silicon Graphics image decoder and encoder
//!
//! Reads verbatim and run length encoded files with one byte per
//! component and one to four channels.
//!
//! | channels | bitmap                         |
//! |----------|--------------------------------|
//! | 1        | 8 bit with a grayscale palette |
//! | 2        | 32 bit, gray spread over RGB   |
//! | 3        | 24 bit                         |
//! | 4        | 32 bit                         |
#![cfg_attr(not(test), no_std)]
#![macro_use]
extern crate alloc;

pub use crate::decoder::{SgiDecoder, IMAGE_NAME_KEY};
pub use crate::encoder::SgiEncoder;
pub use crate::errors::{SgiDecoderErrors, SgiEncoderErrors};
pub use crate::header::{probe_sgi, SgiHeader};

mod decoder;
mod encoder;
mod errors;
mod header;
mod rle;
