/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use bitflags::bitflags;

bitflags! {
    /// Encoder options that are flags
    #[derive(Copy, Debug, Clone, Default)]
    struct EncoderFlags: u32 {
        /// Whether 8 bit BMP images should be run-length encoded
        const BMP_RLE       = 0b0000_0001;
        /// Whether SGI images should be run-length encoded
        const SGI_RLE       = 0b0000_0010;
        /// Whether GIF frames should be written interlaced
        const GIF_INTERLACE = 0b0000_0100;
    }
}

/// Options shared by the encoders in
/// the `freepix` family of image crates
#[derive(Debug, Copy, Clone, Default)]
pub struct EncoderOptions {
    flags: EncoderFlags
}

/// BMP options
impl EncoderOptions {
    pub const fn bmp_get_rle(&self) -> bool {
        self.flags.contains(EncoderFlags::BMP_RLE)
    }
    /// Write 8 bit images with RLE8 compression
    #[must_use]
    pub fn bmp_set_rle(mut self, yes: bool) -> Self {
        self.flags.set(EncoderFlags::BMP_RLE, yes);
        self
    }
}

/// SGI options
impl EncoderOptions {
    pub const fn sgi_get_rle(&self) -> bool {
        self.flags.contains(EncoderFlags::SGI_RLE)
    }
    /// Write run-length encoded scanlines instead of verbatim ones
    #[must_use]
    pub fn sgi_set_rle(mut self, yes: bool) -> Self {
        self.flags.set(EncoderFlags::SGI_RLE, yes);
        self
    }
}

/// GIF options
impl EncoderOptions {
    pub const fn gif_get_interlace(&self) -> bool {
        self.flags.contains(EncoderFlags::GIF_INTERLACE)
    }
    /// Write frames in the four pass interlaced row order
    #[must_use]
    pub fn gif_set_interlace(mut self, yes: bool) -> Self {
        self.flags.set(EncoderFlags::GIF_INTERLACE, yes);
        self
    }
}
