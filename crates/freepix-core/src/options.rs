/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoder and encoder options
//!
//! All supported options are put into one [`DecoderOptions`] and one [`EncoderOptions`]
//! to allow for global configuration, i.e. the same options can be
//! handed to every codec, each codec reads only what it understands.
pub use decoder::*;
pub use encoder::*;

mod decoder;
mod encoder;
