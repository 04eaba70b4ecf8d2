/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use freepix_core::bitmap::{Bitmap, MetadataModel, TagValue};
use freepix_core::bytestream::{ByteIoError, ByteReader, ByteReaderTrait};
use freepix_core::log::{trace, warn};
use freepix_core::options::DecoderOptions;
use freepix_core::pixel::Rgba;

use crate::animation::{compose, FrameInfo, FrameSource};
use crate::enums::DisposalMethod;
use crate::errors::GifDecoderErrors;
use crate::lzw::{LzwDecoder, LzwStatus};
use crate::raster::{row_order, set_index};
use crate::tags::*;

const IMAGE_DESCRIPTOR: u8 = 0x2C;
const EXTENSION: u8 = 0x21;
const TRAILER: u8 = 0x3B;

const GRAPHIC_CONTROL: u8 = 0xF9;
const COMMENT: u8 = 0xFE;
const APPLICATION: u8 = 0xFF;

/// Returns true if `bytes` start with `GIF87a` or `GIF89a`
pub fn probe_gif(bytes: &[u8]) -> bool {
    matches!(bytes.get(..6), Some(b"GIF87a" | b"GIF89a"))
}

/// Where the blocks belonging to one frame start
#[derive(Copy, Clone, Debug)]
struct FrameOffsets {
    /// Just after the image separator
    descriptor: u64,
    /// Just after the graphic control label, if the frame has one
    control:    Option<u64>
}

/// Layout of a file found by a single pass over its blocks
///
/// Holds the logical screen, the global palette and the stream position of
/// every frame and extension. An index can be handed to
/// [`GifDecoder::new_with_index`] to decode pages of the same stream later
/// without scanning again.
#[derive(Clone, Debug, Default)]
pub struct GifIndex {
    width:            usize,
    height:           usize,
    background_index: u8,
    global_palette:   Vec<Rgba>,
    frames:           Vec<FrameOffsets>,
    comments:         Vec<u64>,
    applications:     Vec<u64>
}

impl GifIndex {
    /// Number of frames in the file
    pub fn page_count(&self) -> usize {
        self.frames.len()
    }
    /// Logical screen size
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }
}

/// Contents of a graphic control extension
#[derive(Copy, Clone, Debug)]
struct GraphicControl {
    disposal:    DisposalMethod,
    delay_ms:    u32,
    transparent: Option<u8>
}

impl Default for GraphicControl {
    fn default() -> Self {
        GraphicControl {
            disposal:    DisposalMethod::InPlace,
            delay_ms:    0,
            transparent: None
        }
    }
}

/// A GIF decoder
///
/// Every frame of the file is a page. Opening the file records
/// where each frame lives, pages can then be decoded in any order.
///
/// With [`gif_set_playback`](DecoderOptions::gif_set_playback) pages are
/// rendered as they appear during playback instead of as raw frames.
pub struct GifDecoder<T: ByteReaderTrait> {
    stream:       ByteReader<T>,
    options:      DecoderOptions,
    info:         Option<GifIndex>,
    read_headers: bool
}

impl<T: ByteReaderTrait> GifDecoder<T> {
    pub fn new(data: T) -> GifDecoder<T> {
        GifDecoder::new_with_options(data, DecoderOptions::default())
    }
    pub fn new_with_options(data: T, options: DecoderOptions) -> GifDecoder<T> {
        GifDecoder {
            stream: ByteReader::new(data),
            options,
            info: None,
            read_headers: false
        }
    }
    /// Create a decoder for a stream whose blocks were already located
    ///
    /// `index` must come from a decoder reading the same stream.
    pub fn new_with_index(data: T, options: DecoderOptions, index: GifIndex) -> GifDecoder<T> {
        GifDecoder {
            stream: ByteReader::new(data),
            options,
            info: Some(index),
            read_headers: true
        }
    }

    /// Frame locations, available after [`decode_headers`](Self::decode_headers)
    pub fn index(&self) -> Option<&GifIndex> {
        self.info.as_ref()
    }

    /// Read the logical screen and locate every frame
    pub fn decode_headers(&mut self) -> Result<(), GifDecoderErrors> {
        if self.read_headers {
            return Ok(());
        }
        let signature = self.stream.read_fixed_bytes_or_error::<6>()?;
        if !probe_gif(&signature) {
            return Err(GifDecoderErrors::NotAGif);
        }
        let mut info = GifIndex {
            width: usize::from(self.stream.get_u16_le_err()?),
            height: usize::from(self.stream.get_u16_le_err()?),
            ..GifIndex::default()
        };
        let flags = self.stream.get_u8_err()?;
        info.background_index = self.stream.get_u8_err()?;
        let _ratio = self.stream.get_u8_err()?;

        if info.width > self.options.get_max_width() {
            return Err(GifDecoderErrors::TooLargeDimensions(
                "width",
                self.options.get_max_width(),
                info.width
            ));
        }
        if info.height > self.options.get_max_height() {
            return Err(GifDecoderErrors::TooLargeDimensions(
                "height",
                self.options.get_max_height(),
                info.height
            ));
        }
        // check if we have a global palette
        if (flags & 0x80) > 0 {
            info.global_palette = self.parse_colortable(2 << (flags & 7))?;
        }

        if let Err(err) = self.scan_blocks(&mut info) {
            let truncated = matches!(err, GifDecoderErrors::IoErrors(_));
            if !truncated || info.frames.is_empty() || self.options.get_strict_mode() {
                return Err(err);
            }
            warn!("GIF ended before its trailer, keeping {} frames", info.frames.len());
        }

        trace!("Image width  :{}", info.width);
        trace!("Image height :{}", info.height);
        trace!("Frames       :{}", info.frames.len());
        trace!("Global colors:{}", info.global_palette.len());

        self.info = Some(info);
        self.read_headers = true;
        Ok(())
    }

    fn parse_colortable(&mut self, num_entries: usize) -> Result<Vec<Rgba>, GifDecoderErrors> {
        let mut palette = Vec::with_capacity(num_entries);
        for _ in 0..num_entries {
            let [r, g, b] = self.stream.read_fixed_bytes_or_error::<3>()?;
            palette.push(Rgba::new(r, g, b, 0));
        }
        Ok(palette)
    }

    fn skip_sub_blocks(&mut self) -> Result<(), ByteIoError> {
        loop {
            let length = self.stream.get_u8_err()?;
            if length == 0 {
                return Ok(());
            }
            self.stream.skip(usize::from(length))?;
        }
    }

    /// Append the payload of a chain of sub-blocks to `out`
    fn read_sub_blocks(&mut self, out: &mut Vec<u8>) -> Result<(), ByteIoError> {
        let mut block = [0; 255];
        loop {
            let length = usize::from(self.stream.get_u8_err()?);
            if length == 0 {
                return Ok(());
            }
            self.stream.read_exact_bytes(&mut block[..length])?;
            out.extend_from_slice(&block[..length]);
        }
    }

    fn scan_blocks(&mut self, info: &mut GifIndex) -> Result<(), GifDecoderErrors> {
        let mut control = None;

        loop {
            match self.stream.get_u8_err()? {
                TRAILER => return Ok(()),
                IMAGE_DESCRIPTOR => {
                    info.frames.push(FrameOffsets {
                        descriptor: self.stream.position()?,
                        control:    control.take()
                    });
                    // position and size
                    self.stream.skip(8)?;
                    let flags = self.stream.get_u8_err()?;
                    if (flags & 0x80) > 0 {
                        self.stream.skip(3 * (2 << (flags & 7)))?;
                    }
                    // lzw code size
                    self.stream.skip(1)?;
                    self.skip_sub_blocks()?;
                }
                EXTENSION => {
                    let label = self.stream.get_u8_err()?;
                    let position = self.stream.position()?;
                    match label {
                        GRAPHIC_CONTROL => control = Some(position),
                        COMMENT => info.comments.push(position),
                        APPLICATION => info.applications.push(position),
                        _ => ()
                    }
                    self.skip_sub_blocks()?;
                }
                block => return Err(GifDecoderErrors::InvalidBlock(block))
            }
        }
    }

    fn info(&self) -> Result<&GifIndex, GifDecoderErrors> {
        self.info.as_ref().ok_or(GifDecoderErrors::Static("Headers not decoded"))
    }

    fn frame_offsets(&self, page: usize) -> Result<FrameOffsets, GifDecoderErrors> {
        let info = self.info()?;
        info.frames
            .get(page)
            .copied()
            .ok_or(GifDecoderErrors::PageOutOfRange(page, info.frames.len()))
    }

    fn read_control(&mut self, offset: Option<u64>) -> Result<GraphicControl, GifDecoderErrors> {
        let Some(offset) = offset else {
            return Ok(GraphicControl::default());
        };
        self.stream.set_position(offset)?;
        let _size = self.stream.get_u8_err()?;
        let flags = self.stream.get_u8_err()?;
        let delay = self.stream.get_u16_le_err()?;
        let transparent = self.stream.get_u8_err()?;

        Ok(GraphicControl {
            disposal:    DisposalMethod::from_flags((flags & 0x1C) >> 2),
            delay_ms:    u32::from(delay) * 10,
            transparent: ((flags & 0x01) != 0).then_some(transparent)
        })
    }

    /// Logical screen size, available after [`decode_headers`](Self::decode_headers)
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.info.as_ref().map(|info| (info.width, info.height))
    }

    /// Number of frames in the file
    pub fn page_count(&self) -> Option<usize> {
        self.info.as_ref().map(|info| info.frames.len())
    }

    /// Decode the first page
    pub fn decode(&mut self) -> Result<Bitmap, GifDecoderErrors> {
        self.decode_page(0)
    }

    /// Decode page `page`
    ///
    /// Without playback the result is the raw frame, a 1, 4 or 8 bit
    /// bitmap with the frame's own size and placement stored as metadata.
    pub fn decode_page(&mut self, page: usize) -> Result<Bitmap, GifDecoderErrors> {
        self.decode_headers()?;

        if self.options.gif_get_playback() {
            if self.options.get_header_only() {
                let offsets = self.frame_offsets(page)?;
                let control = self.read_control(offsets.control)?;
                let (width, height) = self.canvas_size();
                let mut canvas = Bitmap::allocate_header(true, width, height, 32, None)?;
                canvas.metadata_mut().set(
                    MetadataModel::Animation,
                    FRAME_TIME,
                    TagValue::Long(control.delay_ms)
                );
                return Ok(canvas);
            }
            return compose(self, page);
        }
        let force_8bit = self.options.gif_get_force_8bit();
        let header_only = self.options.get_header_only();
        self.read_frame(page, force_8bit, header_only)
    }

    fn read_frame(
        &mut self, page: usize, force_8bit: bool, header_only: bool
    ) -> Result<Bitmap, GifDecoderErrors> {
        let offsets = self.frame_offsets(page)?;
        let control = self.read_control(offsets.control)?;

        self.stream.set_position(offsets.descriptor)?;
        let left = self.stream.get_u16_le_err()?;
        let top = self.stream.get_u16_le_err()?;
        let width = usize::from(self.stream.get_u16_le_err()?);
        let height = usize::from(self.stream.get_u16_le_err()?);
        let flags = self.stream.get_u8_err()?;

        if width == 0 || height == 0 {
            return Err(GifDecoderErrors::Static("Zero sized frame"));
        }
        if width > self.options.get_max_width() {
            return Err(GifDecoderErrors::TooLargeDimensions(
                "width",
                self.options.get_max_width(),
                width
            ));
        }
        if height > self.options.get_max_height() {
            return Err(GifDecoderErrors::TooLargeDimensions(
                "height",
                self.options.get_max_height(),
                height
            ));
        }
        let interlaced = (flags & 0x40) != 0;
        let local_palette = if (flags & 0x80) != 0 {
            Some(self.parse_colortable(2 << (flags & 7))?)
        } else {
            None
        };
        let table_size = local_palette
            .as_ref()
            .map_or(self.info()?.global_palette.len(), Vec::len);

        let depth = match table_size {
            _ if force_8bit => 8,
            0 => 8,
            1..=2 => 1,
            3..=16 => 4,
            _ => 8
        };
        trace!("Frame {}      : {}x{} at {},{}", page, width, height, left, top);
        trace!("Depth        : {}", depth);
        trace!("Interlaced   : {}", interlaced);

        let mut bitmap = Bitmap::allocate_header(header_only, width, height, depth, None)?;

        match local_palette.as_deref() {
            Some(palette) => copy_palette(&mut bitmap, palette),
            None if table_size > 0 => {
                let global = self.info()?.global_palette.clone();
                copy_palette(&mut bitmap, &global);
            }
            None => bitmap.set_grayscale_palette()
        }

        let metadata = bitmap.metadata_mut();
        metadata.set(MetadataModel::Animation, FRAME_LEFT, TagValue::Short(left));
        metadata.set(MetadataModel::Animation, FRAME_TOP, TagValue::Short(top));
        metadata.set(
            MetadataModel::Animation,
            NO_LOCAL_PALETTE,
            TagValue::Byte(u8::from(local_palette.is_none()))
        );
        metadata.set(MetadataModel::Animation, INTERLACED, TagValue::Byte(u8::from(interlaced)));
        metadata.set(MetadataModel::Animation, FRAME_TIME, TagValue::Long(control.delay_ms));
        metadata.set(
            MetadataModel::Animation,
            DISPOSAL_METHOD,
            TagValue::Byte(control.disposal.to_flags())
        );

        if let Some(index) = control.transparent {
            let entries = 1_usize << depth;
            if usize::from(index) < entries {
                let mut table = vec![0xFF; entries];
                table[usize::from(index)] = 0;
                bitmap.set_transparency_table(&table)?;
            }
        }

        if !header_only {
            self.read_pixels(&mut bitmap, interlaced)?;
        }
        if page == 0 {
            self.read_screen_metadata(&mut bitmap)?;
        }
        Ok(bitmap)
    }

    /// LZW data follows the palette, rows are stored top first
    fn read_pixels(&mut self, bitmap: &mut Bitmap, interlaced: bool) -> Result<(), GifDecoderErrors> {
        let (width, height) = bitmap.dimensions();
        let depth = bitmap.bits_per_pixel();
        let expected = width * height;

        let min_code_size = self.stream.get_u8_err()?;
        let mut data = Vec::new();
        if let Err(err) = self.read_sub_blocks(&mut data) {
            warn!("Image data sub-blocks ended early: {:?}", err);
        }

        let mut indices = Vec::with_capacity(expected);
        let mut lzw = LzwDecoder::new(min_code_size)?;

        if let LzwStatus::InvalidCode(code) = lzw.decode(&data, &mut indices, expected) {
            if self.options.get_strict_mode() {
                return Err(GifDecoderErrors::CorruptLzw(code));
            }
            warn!("Invalid LZW code {}, image data is incomplete", code);
        }
        if indices.len() < expected {
            if self.options.get_strict_mode() {
                return Err(GifDecoderErrors::TruncatedImage(indices.len(), expected));
            }
            warn!("Decoded {} of {} pixels", indices.len(), expected);
        }

        for (line, y) in indices.chunks(width).zip(row_order(height, interlaced)) {
            if let Some(row) = bitmap.row_mut(height - 1 - y) {
                for (x, index) in line.iter().enumerate() {
                    set_index(row, x, depth, *index);
                }
            }
        }
        Ok(())
    }

    /// Logical screen, loop count and comments, attached to the first page
    fn read_screen_metadata(&mut self, bitmap: &mut Bitmap) -> Result<(), GifDecoderErrors> {
        let info = self.info()?.clone();

        let metadata = bitmap.metadata_mut();
        metadata.set(
            MetadataModel::Animation,
            LOGICAL_WIDTH,
            TagValue::Short(info.width as u16)
        );
        metadata.set(
            MetadataModel::Animation,
            LOGICAL_HEIGHT,
            TagValue::Short(info.height as u16)
        );
        if !info.global_palette.is_empty() {
            metadata.set(
                MetadataModel::Animation,
                GLOBAL_PALETTE,
                TagValue::Palette(info.global_palette.clone())
            );
        }
        if let Some(color) = info.global_palette.get(usize::from(info.background_index)) {
            bitmap.set_background(Some(*color));
        }

        // without a looping extension the animation plays once
        let mut loops = 1;
        for offset in &info.applications {
            if let Some(count) = self.read_loop_count(*offset)? {
                loops = count;
            }
        }
        bitmap
            .metadata_mut()
            .set(MetadataModel::Animation, LOOP, TagValue::Long(loops));

        for (i, offset) in info.comments.iter().enumerate() {
            self.stream.set_position(*offset)?;
            let mut text = Vec::new();
            if let Err(err) = self.read_sub_blocks(&mut text) {
                warn!("Comment {} is truncated: {:?}", i, err);
            }
            bitmap.metadata_mut().set(
                MetadataModel::Comments,
                &format!("{COMMENT_PREFIX}{i}"),
                TagValue::Ascii(String::from_utf8_lossy(&text).into_owned())
            );
        }
        Ok(())
    }

    /// Play count of a looping application extension
    ///
    /// The stored value counts repeats, the returned value counts plays
    /// with `0` meaning forever.
    fn read_loop_count(&mut self, offset: u64) -> Result<Option<u32>, GifDecoderErrors> {
        self.stream.set_position(offset)?;
        if self.stream.get_u8_err()? != 11 {
            return Ok(None);
        }
        let identifier = self.stream.read_fixed_bytes_or_error::<11>()?;
        if &identifier != b"NETSCAPE2.0" && &identifier != b"ANIMEXTS1.0" {
            return Ok(None);
        }
        if self.stream.get_u8_err()? != 3 {
            return Ok(None);
        }
        let _sub_block_id = self.stream.get_u8_err()?;
        let repeats = u32::from(self.stream.get_u16_le_err()?);
        Ok(Some(if repeats > 0 { repeats + 1 } else { 0 }))
    }
}

fn copy_palette(bitmap: &mut Bitmap, palette: &[Rgba]) {
    for (entry, color) in bitmap.palette_mut().iter_mut().zip(palette) {
        *entry = *color;
    }
}

impl<T: ByteReaderTrait> FrameSource for GifDecoder<T> {
    type Error = GifDecoderErrors;

    fn canvas_size(&self) -> (usize, usize) {
        self.dimensions().unwrap_or((0, 0))
    }

    fn background(&self) -> Rgba {
        self.info
            .as_ref()
            .and_then(|info| info.global_palette.get(usize::from(info.background_index)))
            .copied()
            .unwrap_or_default()
    }

    fn frame_info(&mut self, index: usize) -> Result<FrameInfo, GifDecoderErrors> {
        let offsets = self.frame_offsets(index)?;
        let control = self.read_control(offsets.control)?;

        self.stream.set_position(offsets.descriptor)?;
        Ok(FrameInfo {
            left:        usize::from(self.stream.get_u16_le_err()?),
            top:         usize::from(self.stream.get_u16_le_err()?),
            width:       usize::from(self.stream.get_u16_le_err()?),
            height:      usize::from(self.stream.get_u16_le_err()?),
            disposal:    control.disposal,
            transparent: control.transparent.is_some(),
            delay_ms:    control.delay_ms
        })
    }

    fn decode_frame(&mut self, index: usize) -> Result<Bitmap, GifDecoderErrors> {
        self.read_frame(index, true, false)
    }
}
