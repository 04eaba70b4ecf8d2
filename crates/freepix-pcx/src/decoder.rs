/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use alloc::vec;

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteReader, ByteReaderTrait, SeekFrom};
use freepix_core::log::{trace, warn};
use freepix_core::options::DecoderOptions;
use freepix_core::pixel::{self, ChannelMasks, Rgba};
use freepix_core::rle::put_nibble;

use crate::errors::PcxDecoderErrors;
use crate::header::{
    dpi_to_dpm, probe_pcx, PcxHeader, HEADER_SIZE, VGA_PALETTE_MARKER
};
use crate::rle::decode_line;

/// Plane arrangements the decoder understands
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum PlaneLayout {
    /// One plane of 1, 4 or 8 bit pixels, copied as is
    Packed,
    /// Four 1 bit planes, bit `n` of the palette index in plane `n`
    FourPlanes,
    /// Three 8 bit planes holding red, green and blue
    PlanarRgb
}

impl PlaneLayout {
    fn from_header(header: &PcxHeader) -> Option<PlaneLayout> {
        match (header.planes, header.bpp) {
            (1, 1 | 4 | 8) => Some(PlaneLayout::Packed),
            (4, 1) => Some(PlaneLayout::FourPlanes),
            (3, 8) => Some(PlaneLayout::PlanarRgb),
            _ => None
        }
    }
}

/// A PCX decoder
///
/// ```no_run
/// use freepix_core::bytestream::ByteCursor;
/// use freepix_pcx::PcxDecoder;
///
/// let data = std::fs::read("image.pcx").unwrap();
/// let bitmap = PcxDecoder::new(ByteCursor::new(data)).decode().unwrap();
/// println!("{:?}", bitmap.dimensions());
/// ```
pub struct PcxDecoder<T: ByteReaderTrait> {
    stream:          ByteReader<T>,
    options:         DecoderOptions,
    start:           u64,
    header:          Option<PcxHeader>,
    layout:          PlaneLayout,
    width:           usize,
    height:          usize,
    decoded_headers: bool
}

impl<T: ByteReaderTrait> PcxDecoder<T> {
    pub fn new(data: T) -> PcxDecoder<T> {
        PcxDecoder::new_with_options(data, DecoderOptions::default())
    }

    pub fn new_with_options(data: T, options: DecoderOptions) -> PcxDecoder<T> {
        PcxDecoder {
            stream: ByteReader::new(data),
            options,
            start: 0,
            header: None,
            layout: PlaneLayout::Packed,
            width: 0,
            height: 0,
            decoded_headers: false
        }
    }

    pub fn decode_headers(&mut self) -> Result<(), PcxDecoderErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        self.start = self.stream.position()?;

        let bytes = self.stream.read_fixed_bytes_or_error::<HEADER_SIZE>()?;
        if !probe_pcx(&bytes) {
            return Err(PcxDecoderErrors::InvalidMagicBytes);
        }
        let header = PcxHeader::parse(&bytes);

        let (width, height) = header
            .dimensions()
            .ok_or(PcxDecoderErrors::InvalidWindow(header.window))?;

        if width > self.options.get_max_width() {
            return Err(PcxDecoderErrors::TooLargeDimensions(
                "width",
                self.options.get_max_width(),
                width
            ));
        }
        if height > self.options.get_max_height() {
            return Err(PcxDecoderErrors::TooLargeDimensions(
                "height",
                self.options.get_max_height(),
                height
            ));
        }
        let layout = PlaneLayout::from_header(&header)
            .ok_or(PcxDecoderErrors::UnsupportedLayout(header.bpp, header.planes))?;

        let needed = (width * usize::from(header.bpp) + 7) / 8;
        if usize::from(header.bytes_per_line) < needed {
            return Err(PcxDecoderErrors::ShortScanline(
                usize::from(header.bytes_per_line),
                needed
            ));
        }

        trace!("Version      : {}", header.version);
        trace!("Width        : {}", width);
        trace!("Height       : {}", height);
        trace!("Planes       : {}", header.planes);
        trace!("Bits         : {}", header.bpp);
        trace!("RLE          : {}", header.is_rle());

        self.width = width;
        self.height = height;
        self.layout = layout;
        self.header = Some(header);
        self.decoded_headers = true;

        Ok(())
    }

    /// Image width and height, `None` if headers weren't decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.header.as_ref().map(|_| (self.width, self.height))
    }

    /// Bits per pixel of the decoded bitmap
    pub fn depth(&self) -> Option<u16> {
        self.header.as_ref().map(|h| h.bit_count())
    }

    /// Decode the image into a bitmap
    pub fn decode(&mut self) -> Result<Bitmap, PcxDecoderErrors> {
        self.decode_headers()?;

        let header = self
            .header
            .clone()
            .ok_or(PcxDecoderErrors::InvalidMagicBytes)?;

        let depth = header.bit_count();
        let header_only = self.options.get_header_only();
        let masks = (depth == 24).then_some(ChannelMasks::NATIVE);

        let mut bitmap =
            Bitmap::allocate_header(header_only, self.width, self.height, depth, masks)?;

        bitmap.set_dots_per_meter(dpi_to_dpm(header.hdpi), dpi_to_dpm(header.vdpi));

        match depth {
            1 => {
                let palette = bitmap.palette_mut();
                palette[0] = Rgba::gray(0);
                palette[1] = Rgba::gray(255);
            }
            4 => {
                for (entry, rgb) in bitmap
                    .palette_mut()
                    .iter_mut()
                    .zip(header.colormap.chunks_exact(3))
                {
                    *entry = Rgba::new(rgb[0], rgb[1], rgb[2], 0);
                }
            }
            8 => self.read_vga_palette(&header, &mut bitmap)?,
            _ => ()
        }

        if header_only {
            return Ok(bitmap);
        }
        self.stream
            .set_position(self.start + HEADER_SIZE as u64)?;

        self.read_lines(&header, &mut bitmap)?;

        Ok(bitmap)
    }

    /// 8 bit images keep their palette in the last 769 bytes of the file
    fn read_vga_palette(
        &mut self, header: &PcxHeader, bitmap: &mut Bitmap
    ) -> Result<(), PcxDecoderErrors> {
        let has_palette = self.stream.seek(SeekFrom::End(-769)).is_ok()
            && self.stream.get_u8_err().ok() == Some(VGA_PALETTE_MARKER);

        if has_palette {
            let colors = self.stream.read_fixed_bytes_or_error::<768>()?;

            for (entry, rgb) in bitmap
                .palette_mut()
                .iter_mut()
                .zip(colors.chunks_exact(3))
            {
                *entry = Rgba::new(rgb[0], rgb[1], rgb[2], 0);
            }
        } else if header.palette_info == 2 {
            bitmap.set_grayscale_palette();
        } else {
            warn!("8 bit pcx image without a palette");
        }
        Ok(())
    }

    fn read_lines(&mut self, header: &PcxHeader, bitmap: &mut Bitmap) -> Result<(), PcxDecoderErrors> {
        let bytes_per_line = usize::from(header.bytes_per_line);
        let mut line = vec![0; header.line_length()];
        let width = self.width;
        let height = self.height;

        for y in 0..height {
            if header.is_rle() {
                decode_line(&mut self.stream, &mut line)
                    .map_err(|_| PcxDecoderErrors::TruncatedRle(y))?;
            } else if let Err(err) = self.stream.read_exact_bytes(&mut line) {
                if self.options.get_strict_mode() {
                    return Err(err.into());
                }
                warn!("PCX pixel data ended at line {} of {}", y, height);
                break;
            }

            // first line in the file is the top row
            let Some(row) = bitmap.row_mut(height - 1 - y) else {
                break;
            };

            match self.layout {
                PlaneLayout::Packed => {
                    let count = row.len().min(line.len());
                    row[..count].copy_from_slice(&line[..count]);
                }
                PlaneLayout::FourPlanes => {
                    for x in 0..width {
                        let mask = 0x80 >> (x & 7);
                        let index = (0..4).fold(0_u8, |acc, plane| {
                            let byte = line[plane * bytes_per_line + x / 8];
                            acc | (u8::from(byte & mask != 0) << plane)
                        });
                        put_nibble(row, x, index);
                    }
                }
                PlaneLayout::PlanarRgb => {
                    let (red, rest) = line.split_at(bytes_per_line);
                    let (green, blue) = rest.split_at(bytes_per_line);

                    for (x, px) in row.chunks_exact_mut(3).take(width).enumerate() {
                        pixel::put_rgb(px, red[x], green[x], blue[x]);
                    }
                }
            }
        }
        Ok(())
    }
}
