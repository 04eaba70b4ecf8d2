/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encoding support for SGI images
//!
//! 8 bit bitmaps are written as one gray channel holding the palette
//! index, 24 bit as RGB and 32 bit as RGBA. With
//! [`EncoderOptions::sgi_set_rle`] rows are run length encoded.
use alloc::vec;
use alloc::vec::Vec;

use freepix_core::bitmap::{Bitmap, MetadataModel};
use freepix_core::bytestream::{ByteWriter, ByteWriterTrait};
use freepix_core::options::EncoderOptions;
use freepix_core::pixel;

use crate::decoder::IMAGE_NAME_KEY;
use crate::errors::SgiEncoderErrors;
use crate::header::{SgiHeader, HEADER_SIZE};
use crate::rle::encode_row;

pub struct SgiEncoder<'a> {
    bitmap:  &'a Bitmap,
    options: EncoderOptions
}

impl<'a> SgiEncoder<'a> {
    pub fn new(bitmap: &'a Bitmap, options: EncoderOptions) -> SgiEncoder<'a> {
        SgiEncoder { bitmap, options }
    }

    fn header(&self, channels: u16) -> Result<SgiHeader, SgiEncoderErrors> {
        let (width, height) = self.bitmap.dimensions();
        if width > usize::from(u16::MAX) {
            return Err(SgiEncoderErrors::TooLargeDimensions(width));
        }
        if height > usize::from(u16::MAX) {
            return Err(SgiEncoderErrors::TooLargeDimensions(height));
        }
        let mut name = [0; 80];
        if let Some(value) = self
            .bitmap
            .metadata()
            .get(MetadataModel::Comments, IMAGE_NAME_KEY)
            .and_then(|v| v.as_str())
        {
            // keep the terminating NUL
            let len = value.len().min(79);
            name[..len].copy_from_slice(&value.as_bytes()[..len]);
        }

        Ok(SgiHeader {
            storage: u8::from(self.options.sgi_get_rle()),
            bpc: 1,
            dimension: if channels == 1 { 2 } else { 3 },
            xsize: width as u16,
            ysize: height as u16,
            zsize: channels,
            pixmin: 0,
            pixmax: 255,
            name,
            colormap: 0
        })
    }

    /// Encode the bitmap into `sink`, returning the number of bytes written
    pub fn encode<T: ByteWriterTrait>(&self, sink: T) -> Result<usize, SgiEncoderErrors> {
        let bitmap = self.bitmap;
        if bitmap.is_header_only() {
            return Err(SgiEncoderErrors::NoPixels);
        }
        let (channels, offsets): (u16, &[usize]) = match bitmap.bits_per_pixel() {
            8 => (1, &[0]),
            24 => (3, &[pixel::RED, pixel::GREEN, pixel::BLUE]),
            32 => (4, &[pixel::RED, pixel::GREEN, pixel::BLUE, pixel::ALPHA]),
            depth => return Err(SgiEncoderErrors::UnsupportedDepth(depth))
        };
        let header = self.header(channels)?;
        let (width, height) = bitmap.dimensions();
        let pixel_bytes = usize::from(bitmap.bits_per_pixel() / 8);

        let mut stream = ByteWriter::new(sink);
        stream.write_all(&header.to_bytes())?;

        let mut line = vec![0; width];
        let fill_line = |channel: usize, y: usize, line: &mut [u8]| {
            if let Some(row) = bitmap.row(y) {
                for (value, px) in line.iter_mut().zip(row.chunks_exact(pixel_bytes)) {
                    *value = px[offsets[channel]];
                }
            }
        };

        if header.is_rle() {
            let entries = height * offsets.len();
            let mut data = Vec::new();
            let mut starts = Vec::with_capacity(entries);
            let mut lengths = Vec::with_capacity(entries);
            let data_start = HEADER_SIZE + entries * 8;

            for channel in 0..offsets.len() {
                for y in 0..height {
                    fill_line(channel, y, &mut line);
                    let before = data.len();
                    encode_row(&line, &mut data);

                    starts.push((data_start + before) as u32);
                    lengths.push((data.len() - before) as u32);
                }
            }
            for start in starts {
                stream.write_u32_be_err(start)?;
            }
            for length in lengths {
                stream.write_u32_be_err(length)?;
            }
            stream.write_all(&data)?;
        } else {
            for channel in 0..offsets.len() {
                for y in 0..height {
                    fill_line(channel, y, &mut line);
                    stream.write_all(&line)?;
                }
            }
        }
        stream.flush()?;

        Ok(stream.bytes_written())
    }
}
