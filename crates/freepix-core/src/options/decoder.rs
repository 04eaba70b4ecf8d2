/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Global decoder options

/// Decoder options that are flags
///
/// All flags default to `false`
#[derive(Copy, Debug, Clone, Default)]
struct DecoderFlags {
    /// Reject recoverable stream errors instead of logging them
    strict_mode:     bool,
    /// Parse headers, palette and metadata but allocate no pixels
    header_only:     bool,
    /// Always decode GIF frames into 8 bit palettized bitmaps
    gif_force_8bit:  bool,
    /// Composite GIF frames into full canvases instead of returning raw frames
    gif_playback:    bool
}

/// Decoder options
///
/// Not all options are respected by all decoders,
/// each option lists the decoders that respect it
#[derive(Debug, Copy, Clone)]
pub struct DecoderOptions {
    /// Maximum width for which decoders will
    /// not try to decode images larger than
    /// the specified width.
    ///
    /// - Default value: 16384
    /// - Respected by: `all decoders`
    max_width:  usize,
    /// Maximum height for which decoders will not
    /// try to decode images larger than the
    /// specified height
    ///
    /// - Default value: 16384
    /// - Respected by: `all decoders`
    max_height: usize,
    /// Boolean flags that influence decoding
    flags:      DecoderFlags
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_width:  1 << 14,
            max_height: 1 << 14,
            flags:      DecoderFlags::default()
        }
    }
}

/// Global options respected by all decoders
impl DecoderOptions {
    /// Get maximum width configured for which the decoder
    /// should not try to decode images greater than this width
    pub const fn get_max_width(&self) -> usize {
        self.max_width
    }

    /// Get maximum height configured for which the decoder should
    /// not try to decode images greater than this height
    pub const fn get_max_height(&self) -> usize {
        self.max_height
    }

    /// Set maximum width for which the decoder should not try
    /// decoding images greater than that width
    #[must_use]
    pub const fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Set maximum height for which the decoder should not try
    /// decoding images greater than that height
    #[must_use]
    pub const fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Return true whether the decoder should be in strict mode
    /// and reject recoverable errors
    pub const fn get_strict_mode(&self) -> bool {
        self.flags.strict_mode
    }

    /// Set whether the decoder should be in strict mode
    ///
    /// In non strict mode, a stream that ends early or carries an
    /// invalid code yields the partially decoded image and a warning.
    /// In strict mode the same stream is an error.
    #[must_use]
    pub const fn set_strict_mode(mut self, yes: bool) -> Self {
        self.flags.strict_mode = yes;
        self
    }

    /// Whether decoders should skip pixel data
    pub const fn get_header_only(&self) -> bool {
        self.flags.header_only
    }

    /// Parse headers, palette and metadata only
    ///
    /// The returned bitmap reports dimensions and depth
    /// but carries no pixel storage.
    ///
    /// - Respected by: `bmp`, `pcx`, `sgi`, `gif`
    #[must_use]
    pub const fn set_header_only(mut self, yes: bool) -> Self {
        self.flags.header_only = yes;
        self
    }
}

/// GIF specific options
impl DecoderOptions {
    /// Whether GIF frames are always returned as 8 bit bitmaps
    pub const fn gif_get_force_8bit(&self) -> bool {
        self.flags.gif_force_8bit
    }
    /// Always return 8 bit bitmaps, even when the palette would fit a smaller depth
    #[must_use]
    pub const fn gif_set_force_8bit(mut self, yes: bool) -> Self {
        self.flags.gif_force_8bit = yes;
        self
    }
    /// Whether GIF frames are composited into full 32 bit canvases
    pub const fn gif_get_playback(&self) -> bool {
        self.flags.gif_playback
    }
    /// Composite frames with their predecessors, honoring disposal methods
    #[must_use]
    pub const fn gif_set_playback(mut self, yes: bool) -> Self {
        self.flags.gif_playback = yes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_flags() {
        let options = DecoderOptions::default()
            .set_strict_mode(true)
            .gif_set_playback(true)
            .set_max_width(10);

        assert!(options.get_strict_mode());
        assert!(options.gif_get_playback());
        assert!(!options.gif_get_force_8bit());
        assert!(!options.get_header_only());
        assert_eq!(options.get_max_width(), 10);
        assert_eq!(options.get_max_height(), 1 << 14);
    }
}
