/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec;
use alloc::vec::Vec;

use freepix_core::bitmap::{Bitmap, MetadataModel, TagValue};
use freepix_core::bytestream::{ByteReader, ByteReaderTrait};
use freepix_core::log::{trace, warn};
use freepix_core::options::DecoderOptions;
use freepix_core::pixel::{self, ChannelMasks};

use crate::errors::SgiDecoderErrors;
use crate::header::{probe_sgi, SgiHeader, HEADER_SIZE};
use crate::rle::decode_row;

/// Metadata key the image name is stored under
pub const IMAGE_NAME_KEY: &str = "ImageName";

/// Bits per pixel of the bitmap a channel count decodes into
///
/// Gray with alpha is widened to 32 bits.
const fn depth_for_channels(channels: usize) -> Option<u16> {
    match channels {
        1 => Some(8),
        2 | 4 => Some(32),
        3 => Some(24),
        _ => None
    }
}

/// Byte offsets inside a pixel each file channel is written to
fn channel_offsets(channels: usize) -> [usize; 4] {
    match channels {
        1 => [0, 0, 0, 0],
        2 => [pixel::RED, pixel::ALPHA, 0, 0],
        _ => [pixel::RED, pixel::GREEN, pixel::BLUE, pixel::ALPHA]
    }
}

/// A decoder for SGI images
///
/// Only one byte per component is supported
pub struct SgiDecoder<T: ByteReaderTrait> {
    stream:          ByteReader<T>,
    options:         DecoderOptions,
    start:           u64,
    header:          Option<SgiHeader>,
    decoded_headers: bool
}

impl<T: ByteReaderTrait> SgiDecoder<T> {
    pub fn new(data: T) -> SgiDecoder<T> {
        SgiDecoder::new_with_options(data, DecoderOptions::default())
    }
    pub fn new_with_options(data: T, options: DecoderOptions) -> SgiDecoder<T> {
        SgiDecoder {
            stream: ByteReader::new(data),
            options,
            start: 0,
            header: None,
            decoded_headers: false
        }
    }

    pub fn decode_headers(&mut self) -> Result<(), SgiDecoderErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        self.start = self.stream.position()?;

        let bytes = self.stream.read_fixed_bytes_or_error::<HEADER_SIZE>()?;
        if !probe_sgi(&bytes) {
            return Err(SgiDecoderErrors::InvalidMagicBytes);
        }
        let header = SgiHeader::parse(&bytes);

        if header.bpc != 1 {
            return Err(SgiDecoderErrors::UnsupportedBytesPerComponent(header.bpc));
        }
        if header.colormap != 0 {
            return Err(SgiDecoderErrors::UnsupportedColormap(header.colormap));
        }
        if depth_for_channels(header.channels()).is_none() {
            return Err(SgiDecoderErrors::InvalidChannelCount(header.zsize));
        }
        let width = usize::from(header.xsize);
        let height = header.height();

        if width == 0 || height == 0 {
            return Err(SgiDecoderErrors::ZeroDimensions);
        }
        if width > self.options.get_max_width() {
            return Err(SgiDecoderErrors::TooLargeDimensions(
                "width",
                self.options.get_max_width(),
                width
            ));
        }
        if height > self.options.get_max_height() {
            return Err(SgiDecoderErrors::TooLargeDimensions(
                "height",
                self.options.get_max_height(),
                height
            ));
        }
        trace!("Width        : {}", width);
        trace!("Height       : {}", height);
        trace!("Channels     : {}", header.channels());
        trace!("RLE          : {}", header.is_rle());

        self.header = Some(header);
        self.decoded_headers = true;
        Ok(())
    }

    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header
            .as_ref()
            .map(|h| (usize::from(h.xsize), h.height()))
    }

    pub fn depth(&self) -> Option<u16> {
        self.header
            .as_ref()
            .and_then(|h| depth_for_channels(h.channels()))
    }

    /// Decode the image into a bitmap
    ///
    /// Rows are stored bottom up, as the bitmap does by default.
    pub fn decode(&mut self) -> Result<Bitmap, SgiDecoderErrors> {
        self.decode_headers()?;

        let header = self
            .header
            .clone()
            .ok_or(SgiDecoderErrors::InvalidMagicBytes)?;
        let channels = header.channels();
        let depth =
            depth_for_channels(channels).ok_or(SgiDecoderErrors::InvalidChannelCount(header.zsize))?;
        let (width, height) = (usize::from(header.xsize), header.height());

        let header_only = self.options.get_header_only();
        let masks = (depth > 8).then_some(ChannelMasks::NATIVE);
        let mut bitmap = Bitmap::allocate_header(header_only, width, height, depth, masks)?;

        if depth == 8 {
            bitmap.set_grayscale_palette();
        }
        let name = header.name();
        if !name.is_empty() {
            bitmap
                .metadata_mut()
                .set(MetadataModel::Comments, IMAGE_NAME_KEY, TagValue::Ascii(name));
        }

        if header_only {
            return Ok(bitmap);
        }

        let pixel_bytes = usize::from(depth / 8);
        let offsets = channel_offsets(channels);
        let mut line = vec![0; width];

        let row_starts = if header.is_rle() {
            self.read_row_starts(height * channels)?
        } else {
            Vec::new()
        };

        'channels: for channel in 0..channels {
            for y in 0..height {
                if header.is_rle() {
                    let start = row_starts[channel * height + y];
                    self.stream.set_position(self.start + u64::from(start))?;
                    decode_row(&mut self.stream, &mut line)
                        .map_err(|_| SgiDecoderErrors::TruncatedRle(channel, y))?;
                } else if let Err(err) = self.stream.read_exact_bytes(&mut line) {
                    if self.options.get_strict_mode() {
                        return Err(err.into());
                    }
                    warn!("SGI pixel data ended in channel {} row {}", channel, y);
                    break 'channels;
                }

                if let Some(row) = bitmap.row_mut(y) {
                    let offset = offsets[channel];
                    for (px, value) in row.chunks_exact_mut(pixel_bytes).zip(&line) {
                        px[offset] = *value;
                    }
                }
            }
        }

        if channels == 2 {
            // gray with alpha, spread gray over the color channels
            for y in 0..height {
                if let Some(pixels) = bitmap.pixels_of_row_mut::<4>(y) {
                    for px in pixels {
                        let gray = px[pixel::RED];
                        pixel::put_rgb(px, gray, gray, gray);
                    }
                }
            }
        }
        if channels >= 2 {
            bitmap.set_alpha_channel(true);
        }

        Ok(bitmap)
    }

    /// Row start table, followed by a row length table that is not needed
    fn read_row_starts(&mut self, entries: usize) -> Result<Vec<u32>, SgiDecoderErrors> {
        let mut starts = Vec::with_capacity(entries);
        for _ in 0..entries {
            starts.push(self.stream.get_u32_be_err()?);
        }
        // the length table must be present too
        for _ in 0..entries {
            self.stream.get_u32_be_err()?;
        }
        Ok(starts)
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use freepix_core::bytestream::ByteCursor;
    use freepix_core::errors::ErrorKind;
    use freepix_core::pixel::Rgba;

    use super::*;

    fn header(xsize: u16, ysize: u16, zsize: u16, storage: u8) -> SgiHeader {
        SgiHeader {
            storage,
            bpc: 1,
            dimension: 3,
            xsize,
            ysize,
            zsize,
            pixmin: 0,
            pixmax: 255,
            name: [0; 80],
            colormap: 0
        }
    }

    #[test]
    fn verbatim_planes_are_interleaved() {
        let mut file = header(2, 1, 3, 0).to_bytes().to_vec();
        file.extend_from_slice(&[10, 11, 20, 21, 30, 31]);

        let bitmap = SgiDecoder::new(ByteCursor::new(file)).decode().unwrap();
        assert_eq!(bitmap.bits_per_pixel(), 24);
        let row = bitmap.row(0).unwrap();
        assert_eq!(pixel::get_rgba(&row[3..6]), Rgba::new(11, 21, 31, 0));
    }

    #[test]
    fn gray_alpha_widens_to_32_bits() {
        let mut file = header(1, 2, 2, 0).to_bytes().to_vec();
        // gray rows bottom first, then alpha rows
        file.extend_from_slice(&[50, 60, 255, 128]);

        let bitmap = SgiDecoder::new(ByteCursor::new(file)).decode().unwrap();
        assert_eq!(bitmap.bits_per_pixel(), 32);
        assert!(bitmap.is_transparent());
        assert_eq!(pixel::get_rgba(bitmap.row(0).unwrap()), Rgba::new(50, 50, 50, 255));
        assert_eq!(pixel::get_rgba(bitmap.row(1).unwrap()), Rgba::new(60, 60, 60, 128));
    }

    #[test]
    fn rle_rows_follow_the_offset_table() {
        let mut file = header(4, 2, 1, 1).to_bytes().to_vec();
        let data_start = (HEADER_SIZE + 16) as u32;
        // second row is stored first
        for start in [data_start + 3, data_start] {
            file.extend_from_slice(&start.to_be_bytes());
        }
        file.extend_from_slice(&[0, 0, 0, 3, 0, 0, 0, 3]);
        file.extend_from_slice(&[0x04, 9, 0, 0x04, 1, 0]);

        let bitmap = SgiDecoder::new(ByteCursor::new(file)).decode().unwrap();
        assert_eq!(&bitmap.row(0).unwrap()[..4], &[1; 4]);
        assert_eq!(&bitmap.row(1).unwrap()[..4], &[9; 4]);
        assert_eq!(bitmap.palette()[9], Rgba::gray(9));
    }

    #[test]
    fn unsupported_headers() {
        let mut sixteen = header(1, 1, 1, 0);
        sixteen.bpc = 2;
        let err = SgiDecoder::new(ByteCursor::new(sixteen.to_bytes()))
            .decode()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);

        let mut mapped = header(1, 1, 1, 0);
        mapped.colormap = 3;
        let err = SgiDecoder::new(ByteCursor::new(mapped.to_bytes()))
            .decode()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);

        let err = SgiDecoder::new(ByteCursor::new(header(1, 1, 5, 0).to_bytes()))
            .decode()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);

        let mut bad: Vec<u8> = header(1, 1, 1, 0).to_bytes().to_vec();
        bad[1] = 0;
        let err = SgiDecoder::new(ByteCursor::new(bad)).decode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureMismatch);
    }
}
