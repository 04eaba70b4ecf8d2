/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encoding support for GIF
//!
//! Every added bitmap becomes a frame, the first one also writes the
//! logical screen, the global palette, the loop count and comments.
use freepix_core::bitmap::{Bitmap, MetadataModel};
use freepix_core::bytestream::{ByteWriter, ByteWriterTrait};
use freepix_core::log::trace;
use freepix_core::options::EncoderOptions;
use freepix_core::pixel::Rgba;

use crate::enums::DisposalMethod;
use crate::errors::GifEncoderErrors;
use crate::lzw::LzwEncoder;
use crate::raster::{get_index, row_order};
use crate::tags::*;

/// Frame defaults when a bitmap carries no animation tags
const DEFAULT_DELAY_MS: u32 = 100;
const DEFAULT_DISPOSAL: DisposalMethod = DisposalMethod::Background;

/// A GIF encoder
///
/// Frames are written as they are added, [`finish`](Self::finish)
/// closes the file.
///
/// # Example
/// ```
/// use freepix_core::bitmap::Bitmap;
/// use freepix_gif::GifEncoder;
///
/// let mut frame = Bitmap::allocate(4, 4, 4).unwrap();
/// frame.set_grayscale_palette();
///
/// let mut out = vec![];
/// let mut encoder = GifEncoder::new(&mut out);
/// encoder.add_frame(&frame).unwrap();
/// encoder.add_frame(&frame).unwrap();
/// encoder.finish().unwrap();
/// assert_eq!(&out[..6], b"GIF89a");
/// ```
pub struct GifEncoder<T: ByteWriterTrait> {
    stream:  ByteWriter<T>,
    options: EncoderOptions,
    frames:  usize
}

impl<T: ByteWriterTrait> GifEncoder<T> {
    pub fn new(sink: T) -> GifEncoder<T> {
        GifEncoder::new_with_options(sink, EncoderOptions::default())
    }
    pub fn new_with_options(sink: T, options: EncoderOptions) -> GifEncoder<T> {
        GifEncoder {
            stream: ByteWriter::new(sink),
            options,
            frames: 0
        }
    }

    /// Continue a file that already holds `frames_written` frames
    ///
    /// The first frame writes the file header, so passing `0` is the same as
    /// [`new_with_options`](Self::new_with_options).
    pub fn resume(sink: T, options: EncoderOptions, frames_written: usize) -> GifEncoder<T> {
        GifEncoder {
            stream: ByteWriter::new(sink),
            options,
            frames: frames_written
        }
    }

    /// Number of frames written so far
    pub const fn frames_written(&self) -> usize {
        self.frames
    }

    /// Write `bitmap` as the next frame
    ///
    /// Only 1, 4 and 8 bit bitmaps can be written.
    pub fn add_frame(&mut self, bitmap: &Bitmap) -> Result<(), GifEncoderErrors> {
        let depth = bitmap.bits_per_pixel();
        if !matches!(depth, 1 | 4 | 8) {
            return Err(GifEncoderErrors::UnsupportedDepth(depth));
        }
        if bitmap.is_header_only() {
            return Err(GifEncoderErrors::NoPixels);
        }
        let (width, height) = bitmap.dimensions();
        if width > usize::from(u16::MAX) {
            return Err(GifEncoderErrors::TooLargeDimensions(width));
        }
        if height > usize::from(u16::MAX) {
            return Err(GifEncoderErrors::TooLargeDimensions(height));
        }

        let tag = |key| bitmap.metadata().get_u32(MetadataModel::Animation, key);
        let left = tag(FRAME_LEFT).unwrap_or(0) as u16;
        let top = tag(FRAME_TOP).unwrap_or(0) as u16;
        let local_palette = tag(NO_LOCAL_PALETTE).unwrap_or(0) == 0;
        let interlaced = self.options.gif_get_interlace() || tag(INTERLACED).unwrap_or(0) != 0;
        let delay_ms = tag(FRAME_TIME).unwrap_or(DEFAULT_DELAY_MS);
        let disposal = tag(DISPOSAL_METHOD).map_or(DEFAULT_DISPOSAL, |v| {
            DisposalMethod::from_flags(v as u8)
        });

        trace!(
            "Writing frame {}: {}x{} at {},{} {} bit",
            self.frames,
            width,
            height,
            left,
            top,
            depth
        );

        if self.frames == 0 {
            self.write_screen(bitmap)?;
        }

        // graphic control extension
        let transparent = bitmap
            .transparent_index()
            .filter(|index| *index < (1 << depth));
        let mut flags = (disposal.to_flags() << 2) & 0x1C;
        if transparent.is_some() {
            flags |= 0x01;
        }
        self.stream.write_all(&[0x21, 0xF9, 0x04, flags])?;
        self.stream
            .write_u16_le_err((delay_ms / 10).min(u32::from(u16::MAX)) as u16)?;
        self.stream.write_u8_err(transparent.unwrap_or(0) as u8)?;
        self.stream.write_u8_err(0)?;

        // image descriptor
        self.stream.write_u8_err(0x2C)?;
        self.stream.write_u16_le_err(left)?;
        self.stream.write_u16_le_err(top)?;
        self.stream.write_u16_le_err(width as u16)?;
        self.stream.write_u16_le_err(height as u16)?;

        let mut flags = 0;
        if local_palette {
            flags |= 0x80 | ((depth - 1) as u8 & 0x07);
        }
        if interlaced {
            flags |= 0x40;
        }
        self.stream.write_u8_err(flags)?;

        if local_palette {
            self.write_colortable(bitmap.palette(), 1 << depth)?;
        }

        let min_code_size = if depth == 1 { 2 } else { depth as u8 };
        let mut lzw =
            LzwEncoder::new(min_code_size).map_err(|_| GifEncoderErrors::UnsupportedDepth(depth))?;

        for y in row_order(height, interlaced) {
            if let Some(row) = bitmap.row(height - 1 - y) {
                for x in 0..width {
                    lzw.push(get_index(row, x, depth));
                }
            }
        }
        self.stream.write_u8_err(min_code_size)?;
        self.write_sub_blocks(&lzw.finish())?;

        self.frames += 1;
        Ok(())
    }

    /// Signature, logical screen and the extensions that describe the whole file
    fn write_screen(&mut self, bitmap: &Bitmap) -> Result<(), GifEncoderErrors> {
        let metadata = bitmap.metadata();
        let tag = |key| metadata.get_u32(MetadataModel::Animation, key);

        let width = tag(LOGICAL_WIDTH).unwrap_or(bitmap.width() as u32) as u16;
        let height = tag(LOGICAL_HEIGHT).unwrap_or(bitmap.height() as u32) as u16;

        let global = metadata
            .get(MetadataModel::Animation, GLOBAL_PALETTE)
            .and_then(|value| value.as_palette())
            .filter(|palette| palette.len() >= 2);

        let mut flags = 0x70;
        let mut background = 0;
        let mut global_size = 0;

        match global {
            Some(palette) => {
                // largest power of two the palette fills
                let entries = palette.len().min(256);
                let size_code = (usize::BITS - 1 - entries.leading_zeros()) as u8 - 1;
                global_size = 2 << size_code;
                flags |= 0x80 | size_code;

                if let Some(color) = bitmap.background() {
                    background = palette[..global_size]
                        .iter()
                        .position(|entry| entry.same_color(&color))
                        .unwrap_or(0);
                }
            }
            None => flags |= (bitmap.bits_per_pixel() - 1) as u8 & 0x07
        }

        self.stream.write_all(b"GIF89a")?;
        self.stream.write_u16_le_err(width)?;
        self.stream.write_u16_le_err(height)?;
        self.stream.write_u8_err(flags)?;
        self.stream.write_u8_err(background as u8)?;
        // aspect ratio
        self.stream.write_u8_err(0)?;

        if let Some(palette) = global {
            self.write_colortable(palette, global_size)?;
        }

        // a missing loop tag loops forever
        let loops = tag(LOOP).unwrap_or(0);
        if loops != 1 {
            // the extension counts repeats, not plays
            let repeats = if loops > 1 { loops - 1 } else { loops };
            self.stream.write_all(&[0x21, 0xFF, 0x0B])?;
            self.stream.write_all(b"NETSCAPE2.0")?;
            self.stream.write_all(&[0x03, 0x01])?;
            self.stream
                .write_u16_le_err(repeats.min(u32::from(u16::MAX)) as u16)?;
            self.stream.write_u8_err(0)?;
        }

        for (_, value) in metadata.iter_model(MetadataModel::Comments) {
            if let Some(text) = value.as_str() {
                self.stream.write_all(&[0x21, 0xFE])?;
                self.write_sub_blocks(text.as_bytes())?;
            }
        }
        Ok(())
    }

    /// Write exactly `entries` colors, padding with black
    fn write_colortable(&mut self, palette: &[Rgba], entries: usize) -> Result<(), GifEncoderErrors> {
        for i in 0..entries {
            let color = palette.get(i).copied().unwrap_or_default();
            self.stream
                .write_all(&[color.red, color.green, color.blue])?;
        }
        Ok(())
    }

    /// Split `data` into blocks of up to 255 bytes followed by a terminator
    fn write_sub_blocks(&mut self, data: &[u8]) -> Result<(), GifEncoderErrors> {
        for block in data.chunks(255) {
            self.stream.write_u8_err(block.len() as u8)?;
            self.stream.write_all(block)?;
        }
        self.stream.write_u8_err(0)?;
        Ok(())
    }

    /// Write the trailer, returning the number of bytes written
    pub fn finish(mut self) -> Result<usize, GifEncoderErrors> {
        if self.frames == 0 {
            return Err(GifEncoderErrors::NoFrames);
        }
        self.stream.write_u8_err(0x3B)?;
        self.stream.flush()?;
        Ok(self.stream.bytes_written())
    }
}
