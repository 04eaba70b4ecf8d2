/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encoding support for Windows bitmaps
//!
//! Files are always written with a 40 byte info header and bottom up rows.
use alloc::vec;
use alloc::vec::Vec;

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteWriter, ByteWriterTrait};
use freepix_core::log::trace;
use freepix_core::options::EncoderOptions;
use freepix_core::pixel;

use crate::common::{BmpCompression, FILE_HEADER_SIZE, INFO_HEADER_SIZE};
use crate::errors::BmpEncoderErrors;
use crate::rle::{encode_rle8_end, encode_rle8_line};

/// A BMP encoder
///
/// # Example
/// - Encode a 2 by 2 8 bit image with RLE
/// ```
/// use freepix_bmp::BmpEncoder;
/// use freepix_core::bitmap::Bitmap;
/// use freepix_core::options::EncoderOptions;
///
/// let mut bitmap = Bitmap::allocate(2, 2, 8).unwrap();
/// bitmap.set_grayscale_palette();
///
/// let options = EncoderOptions::default().bmp_set_rle(true);
/// let mut out = vec![];
/// BmpEncoder::new(&bitmap, options).encode(&mut out).unwrap();
/// assert_eq!(&out[..2], b"BM");
/// ```
pub struct BmpEncoder<'a> {
    bitmap:  &'a Bitmap,
    options: EncoderOptions
}

impl<'a> BmpEncoder<'a> {
    /// Create a new encoder which will encode `bitmap`
    pub fn new(bitmap: &'a Bitmap, options: EncoderOptions) -> BmpEncoder<'a> {
        BmpEncoder { bitmap, options }
    }

    fn compression(&self) -> BmpCompression {
        match self.bitmap.bits_per_pixel() {
            8 if self.options.bmp_get_rle() => BmpCompression::RLE8,
            16 => BmpCompression::BITFIELDS,
            _ => BmpCompression::RGB
        }
    }

    /// Encode the bitmap into `sink`, returning the number of bytes written
    pub fn encode<T: ByteWriterTrait>(&self, sink: T) -> Result<usize, BmpEncoderErrors> {
        let bitmap = self.bitmap;

        if bitmap.is_header_only() {
            return Err(BmpEncoderErrors::NoPixels);
        }
        let (width, height) = bitmap.dimensions();

        if width > i32::MAX as usize {
            return Err(BmpEncoderErrors::TooLargeDimensions(width));
        }
        if height > i32::MAX as usize {
            return Err(BmpEncoderErrors::TooLargeDimensions(height));
        }

        let compression = self.compression();
        let depth = bitmap.bits_per_pixel();
        let palette = bitmap.palette();

        let pixel_data = match compression {
            BmpCompression::RLE8 => self.rle8_rows(),
            _ => self.plain_rows()
        };

        let mask_bytes = if compression == BmpCompression::BITFIELDS {
            12
        } else {
            0
        };
        let data_offset =
            FILE_HEADER_SIZE as usize + INFO_HEADER_SIZE as usize + palette.len() * 4 + mask_bytes;
        let file_size = data_offset + pixel_data.len();

        if file_size > u32::MAX as usize {
            return Err(BmpEncoderErrors::TooLargeDimensions(file_size));
        }
        trace!("Writing {}x{} {} bit bmp, {:?}", width, height, depth, compression);

        let mut stream = ByteWriter::new(sink);
        stream.reserve(file_size)?;

        // file header
        stream.write_all(b"BM")?;
        stream.write_u32_le_err(file_size as u32)?;
        stream.write_u32_le_err(0)?;
        stream.write_u32_le_err(data_offset as u32)?;

        // info header
        let (dpm_x, dpm_y) = bitmap.dots_per_meter();

        stream.write_u32_le_err(INFO_HEADER_SIZE)?;
        stream.write_i32_le_err(width as i32)?;
        stream.write_i32_le_err(height as i32)?;
        stream.write_u16_le_err(1)?;
        stream.write_u16_le_err(depth)?;
        stream.write_u32_le_err(compression.to_u32())?;
        stream.write_u32_le_err(pixel_data.len() as u32)?;
        stream.write_u32_le_err(dpm_x)?;
        stream.write_u32_le_err(dpm_y)?;
        stream.write_u32_le_err(palette.len() as u32)?;
        stream.write_u32_le_err(0)?;

        if compression == BmpCompression::BITFIELDS {
            let masks = bitmap.masks();
            stream.write_u32_le_err(masks.red)?;
            stream.write_u32_le_err(masks.green)?;
            stream.write_u32_le_err(masks.blue)?;
        }

        for entry in palette {
            stream.write_all(&[entry.blue, entry.green, entry.red, entry.alpha])?;
        }
        stream.write_all(&pixel_data)?;
        stream.flush()?;

        Ok(stream.bytes_written())
    }

    /// Uncompressed rows, bottom row first, 24 and 32 bit pixels as `B,G,R(,A)`
    fn plain_rows(&self) -> Vec<u8> {
        let bitmap = self.bitmap;
        let pitch = bitmap.pitch();
        let channels = match bitmap.bits_per_pixel() {
            24 => 3,
            32 => 4,
            _ => 0
        };
        let used = bitmap.width() * channels;

        let mut out = vec![0; pitch * bitmap.height()];

        for (y, chunk) in out.chunks_exact_mut(pitch).enumerate() {
            if let Some(row) = bitmap.row(y) {
                if channels == 0 {
                    chunk.copy_from_slice(row);
                } else {
                    pixel::native_to_bgr(&row[..used], chunk, channels);
                }
            }
        }
        out
    }

    fn rle8_rows(&self) -> Vec<u8> {
        let bitmap = self.bitmap;
        let width = bitmap.width();
        let mut out = Vec::with_capacity(bitmap.pitch() * bitmap.height());

        for y in 0..bitmap.height() {
            if let Some(row) = bitmap.row(y) {
                encode_rle8_line(&row[..width], &mut out);
            }
        }
        encode_rle8_end(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use freepix_core::bitmap::{Bitmap, ScanOrder};
    use freepix_core::bytestream::ByteCursor;
    use freepix_core::options::{DecoderOptions, EncoderOptions};
    use freepix_core::pixel::{ChannelMasks, Rgba};
    use nanorand::Rng;

    use crate::{BmpDecoder, BmpEncoder};

    fn random_bitmap(width: usize, height: usize, depth: u16, seed: u64) -> Bitmap {
        let mut bitmap = Bitmap::allocate(width, height, depth).unwrap();
        let mut rand = nanorand::WyRand::new_seed(seed);

        for y in 0..height {
            let row = bitmap.row_mut(y).unwrap();
            let used = freepix_core::bitmap::compute_line_bytes(width, depth);
            rand.fill(&mut row[..used]);
        }
        for (i, entry) in bitmap.palette_mut().iter_mut().enumerate() {
            *entry = Rgba::new(i as u8, (i * 3) as u8, 255 - i as u8, 0);
        }
        bitmap
    }

    fn round_trip(bitmap: &Bitmap, options: EncoderOptions) -> Bitmap {
        let mut out = Vec::new();
        let written = BmpEncoder::new(bitmap, options).encode(&mut out).unwrap();
        assert_eq!(written, out.len());

        BmpDecoder::new(ByteCursor::new(out)).decode().unwrap()
    }

    #[test]
    fn plain_depths_round_trip() {
        for depth in [1, 4, 8, 24] {
            let bitmap = random_bitmap(13, 7, depth, u64::from(depth));
            let decoded = round_trip(&bitmap, EncoderOptions::default());

            assert!(decoded.same_pixels(&bitmap), "depth {depth}");
            assert_eq!(decoded.palette(), bitmap.palette());
            assert_eq!(decoded.scan_order(), ScanOrder::BottomUp);
        }
    }

    #[test]
    fn sixteen_bit_keeps_masks() {
        let mut bitmap =
            Bitmap::allocate_with_masks(5, 3, 16, ChannelMasks::RGB565).unwrap();
        bitmap.row_mut(1).unwrap()[..2].copy_from_slice(&[0x1F, 0xF8]);

        let decoded = round_trip(&bitmap, EncoderOptions::default());
        assert_eq!(decoded.masks(), ChannelMasks::RGB565);
        assert!(decoded.same_pixels(&bitmap));
    }

    #[test]
    fn rle8_round_trip() {
        let mut bitmap = random_bitmap(40, 9, 8, 42);
        // give the encoder some runs to find
        bitmap.row_mut(3).unwrap()[..40].fill(7);
        bitmap.row_mut(5).unwrap()[10..30].fill(200);

        let options = EncoderOptions::default().bmp_set_rle(true);
        let decoded = round_trip(&bitmap, options);
        assert!(decoded.same_pixels(&bitmap));
    }

    #[test]
    fn rle8_is_smaller_on_flat_images() {
        let mut bitmap = Bitmap::allocate(300, 20, 8).unwrap();
        bitmap.pixels_mut().unwrap().fill(46);

        let mut plain = Vec::new();
        BmpEncoder::new(&bitmap, EncoderOptions::default())
            .encode(&mut plain)
            .unwrap();
        let mut rle = Vec::new();
        BmpEncoder::new(&bitmap, EncoderOptions::default().bmp_set_rle(true))
            .encode(&mut rle)
            .unwrap();
        assert!(rle.len() * 10 < plain.len());
    }

    #[test]
    fn thirty_two_bit_alpha_is_detected() {
        let mut bitmap = random_bitmap(4, 4, 32, 9);
        bitmap.pixels_of_row_mut::<4>(0).unwrap()[0][3] = 128;

        let decoded = round_trip(&bitmap, EncoderOptions::default());
        assert!(decoded.same_pixels(&bitmap));
        assert!(decoded.is_transparent());

        let mut opaque = Bitmap::allocate(4, 4, 32).unwrap();
        opaque.pixels_mut().unwrap().fill(0);
        let decoded = round_trip(&opaque, EncoderOptions::default());
        assert!(!decoded.is_transparent());
    }

    #[test]
    fn header_only_cannot_be_encoded() {
        let bitmap =
            Bitmap::allocate_header(true, 4, 4, 8, None).unwrap();
        let mut out = Vec::new();
        assert!(BmpEncoder::new(&bitmap, EncoderOptions::default())
            .encode(&mut out)
            .is_err());
        // decoder header only mode does not care about pixel data
        let full = random_bitmap(4, 4, 8, 1);
        BmpEncoder::new(&full, EncoderOptions::default())
            .encode(&mut out)
            .unwrap();
        let options = DecoderOptions::default().set_header_only(true);
        let decoded = BmpDecoder::new_with_options(ByteCursor::new(&out[..60]), options)
            .decode();
        // the palette is cut, which only warns outside strict mode
        assert!(decoded.is_ok());
    }
}
