/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! GIF decoder, encoder and animation compositor
//!
//! Each frame of a file is a page. Pages decode into palettized bitmaps
//! of the frame's own size with placement, timing and disposal stored as
//! metadata (see [`tags`]), or with playback enabled into 32 bit images
//! of the whole logical screen.
#![cfg_attr(not(test), no_std)]
#![macro_use]
extern crate alloc;

pub use crate::animation::{compose, FrameInfo, FrameSource};
pub use crate::decoder::{probe_gif, GifDecoder, GifIndex};
pub use crate::encoder::GifEncoder;
pub use crate::enums::DisposalMethod;
pub use crate::errors::{GifDecoderErrors, GifEncoderErrors};
pub use crate::lzw::{LzwDecoder, LzwEncoder, LzwStatus};

mod animation;
mod decoder;
mod encoder;
mod enums;
mod errors;
mod lzw;
mod raster;
pub mod tags;
