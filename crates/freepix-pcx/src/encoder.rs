/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encoding support for PCX images
//!
//! Output is always version 5 and run length encoded. 4 bit images are
//! split into four 1 bit planes, 24 bit images into three 8 bit planes.
use alloc::vec;
use alloc::vec::Vec;

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteWriter, ByteWriterTrait};
use freepix_core::options::EncoderOptions;
use freepix_core::pixel;

use crate::errors::PcxEncoderErrors;
use crate::header::{dpm_to_dpi, PcxHeader, VGA_PALETTE_MARKER};
use crate::rle::encode_line;

/// A PCX encoder
pub struct PcxEncoder<'a> {
    bitmap:   &'a Bitmap,
    _options: EncoderOptions
}

impl<'a> PcxEncoder<'a> {
    pub fn new(bitmap: &'a Bitmap, options: EncoderOptions) -> PcxEncoder<'a> {
        PcxEncoder {
            bitmap,
            _options: options
        }
    }

    fn header(&self) -> Result<PcxHeader, PcxEncoderErrors> {
        let bitmap = self.bitmap;
        let (width, height) = bitmap.dimensions();

        if width > usize::from(u16::MAX) {
            return Err(PcxEncoderErrors::TooLargeDimensions(width));
        }
        if height > usize::from(u16::MAX) {
            return Err(PcxEncoderErrors::TooLargeDimensions(height));
        }
        let (bpp, planes) = match bitmap.bits_per_pixel() {
            1 => (1, 1),
            4 => (1, 4),
            8 => (8, 1),
            24 => (8, 3),
            depth => return Err(PcxEncoderErrors::UnsupportedDepth(depth))
        };
        // lines have an even number of bytes
        let bytes_per_line = ((width * usize::from(bpp) + 15) / 16) * 2;

        let mut colormap = [0; 48];
        if bitmap.bits_per_pixel() == 4 {
            for (rgb, entry) in colormap.chunks_exact_mut(3).zip(bitmap.palette()) {
                rgb.copy_from_slice(&[entry.red, entry.green, entry.blue]);
            }
        }
        let (dpm_x, dpm_y) = bitmap.dots_per_meter();

        Ok(PcxHeader {
            version: 5,
            encoding: 1,
            bpp,
            window: [0, 0, (width - 1) as u16, (height - 1) as u16],
            hdpi: dpm_to_dpi(dpm_x),
            vdpi: dpm_to_dpi(dpm_y),
            colormap,
            planes,
            bytes_per_line: bytes_per_line as u16,
            palette_info: 1
        })
    }

    /// Split a bitmap row into the plane layout of the file
    fn fill_line(&self, header: &PcxHeader, row: &[u8], line: &mut [u8]) {
        let bytes_per_line = usize::from(header.bytes_per_line);
        let width = self.bitmap.width();
        line.fill(0);

        match self.bitmap.bits_per_pixel() {
            4 => {
                for x in 0..width {
                    let byte = row[x / 2];
                    let index = if x & 1 == 0 { byte >> 4 } else { byte & 0x0F };
                    let mask = 0x80 >> (x & 7);

                    for plane in 0..4 {
                        if index & (1 << plane) != 0 {
                            line[plane * bytes_per_line + x / 8] |= mask;
                        }
                    }
                }
            }
            24 => {
                for (x, px) in row.chunks_exact(3).take(width).enumerate() {
                    let color = pixel::get_rgba(px);
                    line[x] = color.red;
                    line[bytes_per_line + x] = color.green;
                    line[2 * bytes_per_line + x] = color.blue;
                }
            }
            _ => {
                let used = self.bitmap.line_bytes();
                line[..used].copy_from_slice(&row[..used]);
            }
        }
    }

    /// Encode the bitmap into `sink`, returning the number of bytes written
    pub fn encode<T: ByteWriterTrait>(&self, sink: T) -> Result<usize, PcxEncoderErrors> {
        let bitmap = self.bitmap;
        if bitmap.is_header_only() {
            return Err(PcxEncoderErrors::NoPixels);
        }
        let header = self.header()?;

        let mut line = vec![0; header.line_length()];
        let mut data = Vec::with_capacity(line.len() * bitmap.height());

        // top row first
        for y in (0..bitmap.height()).rev() {
            if let Some(row) = bitmap.row(y) {
                self.fill_line(&header, row, &mut line);
                encode_line(&line, &mut data);
            }
        }

        let mut stream = ByteWriter::new(sink);
        stream.write_all(&header.to_bytes())?;
        stream.write_all(&data)?;

        if bitmap.bits_per_pixel() == 8 {
            stream.write_u8_err(VGA_PALETTE_MARKER)?;
            for entry in bitmap.palette() {
                stream.write_all(&[entry.red, entry.green, entry.blue])?;
            }
        }
        stream.flush()?;

        Ok(stream.bytes_written())
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use freepix_core::bitmap::Bitmap;
    use freepix_core::bytestream::ByteCursor;
    use freepix_core::options::EncoderOptions;
    use freepix_core::pixel::Rgba;
    use nanorand::Rng;

    use crate::{PcxDecoder, PcxEncoder};

    fn random_bitmap(width: usize, height: usize, depth: u16) -> Bitmap {
        let mut bitmap = Bitmap::allocate(width, height, depth).unwrap();
        let mut rand = nanorand::WyRand::new_seed(u64::from(depth) * 31);
        let used = bitmap.line_bytes();

        for y in 0..height {
            let row = bitmap.row_mut(y).unwrap();
            rand.fill(&mut row[..used]);
            // keep some runs around
            if y % 3 == 0 {
                row[..used / 2].fill(0xC3);
            }
        }
        bitmap
    }

    #[test]
    fn depths_round_trip() {
        for depth in [1, 4, 8, 24] {
            // even widths keep padding bits out of the comparison
            let mut bitmap = random_bitmap(16, 5, depth);
            for (i, entry) in bitmap.palette_mut().iter_mut().enumerate() {
                *entry = Rgba::new(i as u8, 0, 255 - i as u8, 0);
            }
            if depth == 1 {
                bitmap.palette_mut()[0] = Rgba::gray(0);
                bitmap.palette_mut()[1] = Rgba::gray(255);
            }
            bitmap.set_dots_per_meter(3780, 3780);

            let mut out = Vec::new();
            let written = PcxEncoder::new(&bitmap, EncoderOptions::default())
                .encode(&mut out)
                .unwrap();
            assert_eq!(written, out.len());

            let decoded = PcxDecoder::new(ByteCursor::new(out)).decode().unwrap();
            assert!(decoded.same_pixels(&bitmap), "depth {depth}");
            assert_eq!(decoded.palette(), bitmap.palette(), "depth {depth}");
            assert_eq!(decoded.dots_per_meter(), (3780, 3780));
        }
    }

    #[test]
    fn sixteen_bit_is_rejected() {
        let bitmap = Bitmap::allocate(2, 2, 16).unwrap();
        let mut out = Vec::new();
        assert!(PcxEncoder::new(&bitmap, EncoderOptions::default())
            .encode(&mut out)
            .is_err());
    }
}
