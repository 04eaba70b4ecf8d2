/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

// BMP is a format that has been extended multiple times.
//
// - http://www.fileformat.info/format/bmp/egff.htm
// - http://www.fileformat.info/format/os2bmp/egff.htm
// - http://fileformats.archiveteam.org/wiki/BMP
// - http://fileformats.archiveteam.org/wiki/OS/2_BMP
//
// OS2-BMPv1 / WinBMPv2
// - 14 byte file header with the magic number, file size and the offset to the pixel data.
// - 12 byte info header with 16 bit width and height, planes and bits per pixel.
// - A color table of 2^bpp entries, 3 bytes per value (BGR).
//
// WinBMPv3 and later
// - 40 byte info header with 32 bit signed width and height, compression,
//   resolution and the number of colors used.
// - A color table of 4 bytes per value (BGR0), of `colors used` entries
//   or 2^bpp if zero.
// - 16 and 32 bit images may carry red, green and blue masks right after the
//   first 40 bytes (BITFIELDS), v4 and v5 headers keep them inside the header.
// - A negative height means rows are stored top down.
//
// OS2-BMPv2
// - 16 to 64 byte info header, the first 40 bytes mirror WinBMPv3 and omitted
//   fields are zero. The palette may use either 3 or 4 bytes per entry, which is
//   found from the gap between the header and the pixel data.

use alloc::vec;
use alloc::vec::Vec;

use freepix_core::bitmap::{Bitmap, ScanOrder};
use freepix_core::bytestream::{ByteReader, ByteReaderTrait};
use freepix_core::log::{trace, warn};
use freepix_core::options::DecoderOptions;
use freepix_core::pixel::{self, ChannelMasks, Rgba};

use crate::common::{
    palette_entries, BmpCompression, BmpVariant, FILE_HEADER_SIZE, OS2_DOTS_PER_METER
};
use crate::rle::{decode_rle4, decode_rle8};
use crate::BmpDecoderErrors;

/// Probe some bytes to see
/// if they consist of a BMP image
pub fn probe_bmp(bytes: &[u8]) -> bool {
    matches!(bytes.get(0..2), Some(b"BM") | Some(b"BA"))
}

/// Byte layout of a 32 bit pixel on disk, `B,G,R,A` read as a little endian word
const DISK_MASKS: ChannelMasks = ChannelMasks::new(0x00FF_0000, 0x0000_FF00, 0x0000_00FF);

/// Everything the headers say about the image
#[derive(Clone, Debug)]
struct BmpInfo {
    variant:     BmpVariant,
    header_size: u32,
    width:       usize,
    height:      usize,
    order:       ScanOrder,
    depth:       u16,
    compression: BmpCompression,
    used_colors: u32,
    dpm_x:       u32,
    dpm_y:       u32,
    masks:       Option<ChannelMasks>,
    alpha_mask:  u32,
    data_offset: u64
}

/// A BMP decoder.
///
/// # Usage
/// The decoder reads image information and or the pixels of a bmp
/// image into a [`Bitmap`].
///
/// ```no_run
/// use freepix_bmp::BmpDecoder;
/// use freepix_core::bytestream::ByteCursor;
///
/// fn main() -> Result<(), freepix_bmp::BmpDecoderErrors> {
///     let source = ByteCursor::new(b"BM");
///     let mut decoder = BmpDecoder::new(source);
///     decoder.decode_headers()?;
///     let (w, h) = decoder.dimensions().unwrap();
///     println!("Image width: {}\t Image height: {}", w, h);
///
///     let bitmap = decoder.decode()?;
///     println!("Pitch: {}", bitmap.pitch());
///     Ok(())
/// }
/// ```
pub struct BmpDecoder<T>
where
    T: ByteReaderTrait
{
    stream:          ByteReader<T>,
    options:         DecoderOptions,
    /// Where the file header starts, offsets in the file are relative to it
    start:           u64,
    info:            Option<BmpInfo>,
    palette:         Vec<Rgba>,
    decoded_headers: bool
}

impl<T> BmpDecoder<T>
where
    T: ByteReaderTrait
{
    /// Create a new bmp decoder that reads data from `data`
    ///
    /// The stream is expected to be positioned at the start of the file
    pub fn new(data: T) -> BmpDecoder<T> {
        BmpDecoder::new_with_options(data, DecoderOptions::default())
    }
    /// Create a new decoder instance with specified options
    pub fn new_with_options(data: T, options: DecoderOptions) -> BmpDecoder<T> {
        BmpDecoder {
            stream: ByteReader::new(data),
            options,
            start: 0,
            info: None,
            palette: vec![],
            decoded_headers: false
        }
    }

    /// Decode headers and palette stored in the bmp file
    ///
    /// After calling this, dimensions and depth can be queried.
    pub fn decode_headers(&mut self) -> Result<(), BmpDecoderErrors> {
        if self.decoded_headers {
            return Ok(());
        }
        self.start = self.stream.position()?;

        let magic = self.stream.read_fixed_bytes_or_error::<2>()?;
        if !probe_bmp(&magic) {
            return Err(BmpDecoderErrors::InvalidMagicBytes);
        }
        // 4 bytes file size
        // 4 reserved bytes
        self.stream.skip(8)?;
        let data_offset = self.start + u64::from(self.stream.get_u32_le_err()?);

        let header_size = self.stream.get_u32_le_err()?;
        let variant = BmpVariant::from_header_size(header_size)
            .ok_or(BmpDecoderErrors::UnknownHeaderSize(header_size))?;

        let info = match variant {
            BmpVariant::Os2v1 => self.read_core_header(data_offset)?,
            _ => self.read_info_header(variant, header_size, data_offset)?
        };

        if info.width > self.options.get_max_width() {
            return Err(BmpDecoderErrors::TooLargeDimensions(
                "width",
                self.options.get_max_width(),
                info.width
            ));
        }
        if info.height > self.options.get_max_height() {
            return Err(BmpDecoderErrors::TooLargeDimensions(
                "height",
                self.options.get_max_height(),
                info.height
            ));
        }
        if info.width == 0 || info.height == 0 {
            return Err(BmpDecoderErrors::GenericStatic("Zero sized bmp image"));
        }

        trace!("Variant      : {:?}", info.variant);
        trace!("Width        : {}", info.width);
        trace!("Height       : {}", info.height);
        trace!("Bit depth    : {}", info.depth);
        trace!("Compression  : {:?}", info.compression);
        trace!("Scan order   : {:?}", info.order);

        if palette_entries(info.depth) != 0 {
            self.read_palette(&info)?;
        }
        self.info = Some(info);
        self.decoded_headers = true;

        Ok(())
    }

    /// OS/2 1.x `BITMAPCOREHEADER`
    fn read_core_header(&mut self, data_offset: u64) -> Result<BmpInfo, BmpDecoderErrors> {
        let width = usize::from(self.stream.get_u16_le_err()?);
        let height = usize::from(self.stream.get_u16_le_err()?);
        let _planes = self.stream.get_u16_le_err()?;
        let depth = self.stream.get_u16_le_err()?;

        if !matches!(depth, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(BmpDecoderErrors::UnsupportedDepth(depth));
        }

        Ok(BmpInfo {
            variant: BmpVariant::Os2v1,
            header_size: 12,
            width,
            height,
            order: ScanOrder::BottomUp,
            depth,
            compression: BmpCompression::RGB,
            used_colors: palette_entries(depth),
            dpm_x: OS2_DOTS_PER_METER,
            dpm_y: OS2_DOTS_PER_METER,
            masks: None,
            alpha_mask: 0,
            data_offset
        })
    }

    /// Windows `BITMAPINFOHEADER` and its extensions, and OS/2 2.x headers
    fn read_info_header(
        &mut self, variant: BmpVariant, header_size: u32, data_offset: u64
    ) -> Result<BmpInfo, BmpDecoderErrors> {
        // OS/2 2.x headers may stop before 40 bytes, the rest reads as zero
        let mut fields = [0_u8; 36];
        let available = (header_size as usize - 4).min(fields.len());
        self.stream.read_exact_bytes(&mut fields[..available])?;

        let u32_at = |pos: usize| {
            u32::from_le_bytes([fields[pos], fields[pos + 1], fields[pos + 2], fields[pos + 3]])
        };
        let u16_at = |pos: usize| u16::from_le_bytes([fields[pos], fields[pos + 1]]);

        let width = u32_at(0) as i32;
        let height = u32_at(4) as i32;
        let depth = u16_at(10);
        let compression_code = u32_at(12);
        let dpm_x = u32_at(20);
        let dpm_y = u32_at(24);
        let mut used_colors = u32_at(28);

        if width < 0 {
            return Err(BmpDecoderErrors::GenericStatic("BMP width is negative"));
        }
        if !matches!(depth, 1 | 4 | 8 | 16 | 24 | 32) {
            return Err(BmpDecoderErrors::UnsupportedDepth(depth));
        }
        let compression = BmpCompression::from_u32(compression_code)
            .ok_or(BmpDecoderErrors::UnsupportedCompression(compression_code, depth))?;

        let compression_fits = match compression {
            BmpCompression::RGB => true,
            BmpCompression::RLE8 => depth == 8,
            BmpCompression::RLE4 => depth == 4,
            BmpCompression::BITFIELDS | BmpCompression::ALPHABITFIELDS => depth >= 16
        };
        if !compression_fits {
            return Err(BmpDecoderErrors::UnsupportedCompression(compression_code, depth));
        }

        let entries = palette_entries(depth);
        if used_colors == 0 || used_colors > entries {
            used_colors = entries;
        }

        let mut masks = None;
        let mut alpha_mask = 0;

        if depth >= 16 {
            let explicit = matches!(
                compression,
                BmpCompression::BITFIELDS | BmpCompression::ALPHABITFIELDS
            );
            // v2 and later headers keep masks inside the header
            let in_header = variant == BmpVariant::Windows && header_size >= 52;

            if explicit || in_header {
                // masks follow the first 40 bytes of the info header
                self.stream
                    .set_position(self.start + u64::from(FILE_HEADER_SIZE) + 40)?;

                let red = self.stream.get_u32_le_err()?;
                let green = self.stream.get_u32_le_err()?;
                let blue = self.stream.get_u32_le_err()?;

                if compression == BmpCompression::ALPHABITFIELDS || header_size >= 56 {
                    alpha_mask = self.stream.get_u32_le_err()?;
                }
                if red | green | blue != 0 {
                    masks = Some(ChannelMasks::new(red, green, blue));
                }
            }
        }

        let order = if height < 0 {
            ScanOrder::TopDown
        } else {
            ScanOrder::BottomUp
        };

        Ok(BmpInfo {
            variant,
            header_size,
            width: width as usize,
            height: height.unsigned_abs() as usize,
            order,
            depth,
            compression,
            used_colors,
            dpm_x,
            dpm_y,
            masks,
            alpha_mask,
            data_offset
        })
    }

    fn read_palette(&mut self, info: &BmpInfo) -> Result<(), BmpDecoderErrors> {
        let palette_start = self.start + u64::from(FILE_HEADER_SIZE) + u64::from(info.header_size);
        let colors = info.used_colors as usize;

        let entry_size = match info.variant {
            BmpVariant::Os2v1 => 3,
            BmpVariant::Windows => 4,
            BmpVariant::Os2v2 => {
                // 3 or 4 bytes per entry, told apart by the room the palette has
                let room = info.data_offset.saturating_sub(palette_start);
                if colors != 0 && room / colors as u64 == 3 {
                    3
                } else {
                    4
                }
            }
        };
        self.stream.set_position(palette_start)?;
        self.palette.clear();

        let mut entry = [0_u8; 4];
        for _ in 0..colors {
            if let Err(err) = self.stream.read_exact_bytes(&mut entry[..entry_size]) {
                if self.options.get_strict_mode() {
                    return Err(err.into());
                }
                warn!("Palette is truncated, {} of {} entries present", self.palette.len(), colors);
                break;
            }
            let [blue, green, red, _] = entry;
            self.palette.push(Rgba::new(red, green, blue, 0));
        }
        Ok(())
    }

    /// Return the image dimensions as a tuple of width and height
    ///
    /// Returns `None` if the headers weren't decoded
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.info.as_ref().map(|info| (info.width, info.height))
    }
    /// Bits per pixel of the image, `None` if headers weren't decoded
    pub fn depth(&self) -> Option<u16> {
        self.info.as_ref().map(|info| info.depth)
    }
    /// Compression scheme of the image, `None` if headers weren't decoded
    pub fn compression(&self) -> Option<BmpCompression> {
        self.info.as_ref().map(|info| info.compression)
    }
    /// Order rows are stored in, `None` if headers weren't decoded
    pub fn scan_order(&self) -> Option<ScanOrder> {
        self.info.as_ref().map(|info| info.order)
    }

    /// Decode the image into a bitmap
    ///
    /// With [`DecoderOptions::set_header_only`] the bitmap carries dimensions
    /// and palette but no pixels.
    pub fn decode(&mut self) -> Result<Bitmap, BmpDecoderErrors> {
        self.decode_headers()?;

        let info = self
            .info
            .clone()
            .ok_or(BmpDecoderErrors::GenericStatic("Headers not decoded"))?;

        let header_only = self.options.get_header_only();

        let masks = match info.depth {
            16 => Some(info.masks.unwrap_or(ChannelMasks::RGB555)),
            24 | 32 => Some(ChannelMasks::NATIVE),
            _ => None
        };
        let mut bitmap =
            Bitmap::allocate_header(header_only, info.width, info.height, info.depth, masks)?;

        bitmap.set_scan_order(info.order);
        bitmap.set_dots_per_meter(info.dpm_x, info.dpm_y);

        let colors = self.palette.len().min(bitmap.palette().len());
        bitmap.palette_mut()[..colors].copy_from_slice(&self.palette[..colors]);

        if header_only {
            return Ok(bitmap);
        }

        self.stream.set_position(info.data_offset)?;

        match info.compression {
            BmpCompression::RLE8 => decode_rle8(&mut self.stream, &mut bitmap)?,
            BmpCompression::RLE4 => decode_rle4(&mut self.stream, &mut bitmap)?,
            _ => self.read_rows(&info, &mut bitmap)?
        }

        match info.depth {
            24 => convert_rows(&mut bitmap, 3),
            32 => {
                match info.masks {
                    Some(masks) if masks != DISK_MASKS => {
                        remap_masked_rows(&mut bitmap, masks, info.alpha_mask);
                    }
                    _ => convert_rows(&mut bitmap, 4)
                }
                let has_alpha = (0..bitmap.height()).any(|y| {
                    bitmap.row(y).map_or(false, |row| {
                        row[..bitmap.width() * 4]
                            .chunks_exact(4)
                            .any(|px| px[pixel::ALPHA] != 0)
                    })
                });
                bitmap.set_alpha_channel(has_alpha);
            }
            _ => ()
        }

        Ok(bitmap)
    }

    /// Uncompressed rows, each padded to 4 bytes like the bitmap
    fn read_rows(&mut self, info: &BmpInfo, bitmap: &mut Bitmap) -> Result<(), BmpDecoderErrors> {
        let height = bitmap.height();

        for y in 0..height {
            let target = match info.order {
                ScanOrder::BottomUp => y,
                ScanOrder::TopDown => height - 1 - y
            };
            let Some(row) = bitmap.row_mut(target) else {
                break;
            };
            if let Err(err) = self.stream.read_exact_bytes(row) {
                if self.options.get_strict_mode() {
                    return Err(err.into());
                }
                warn!("BMP pixel data is truncated, {} of {} rows present", y, height);
                break;
            }
        }
        Ok(())
    }
}

/// Bring rows read in disk order into the native channel order
fn convert_rows(bitmap: &mut Bitmap, channels: usize) {
    let used = bitmap.width() * channels;
    for y in 0..bitmap.height() {
        if let Some(row) = bitmap.row_mut(y) {
            pixel::bgr_to_native(&mut row[..used], channels);
        }
    }
}

/// Rewrite 32 bit pixels described by arbitrary masks into the native layout
fn remap_masked_rows(bitmap: &mut Bitmap, masks: ChannelMasks, alpha_mask: u32) {
    for y in 0..bitmap.height() {
        if let Some(pixels) = bitmap.pixels_of_row_mut::<4>(y) {
            for px in pixels.iter_mut() {
                let value = u32::from_le_bytes(*px);
                let color = Rgba::new(
                    pixel::extract_channel(value, masks.red),
                    pixel::extract_channel(value, masks.green),
                    pixel::extract_channel(value, masks.blue),
                    pixel::extract_channel(value, alpha_mask)
                );
                pixel::put_rgba(px, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use freepix_core::bytestream::ByteCursor;
    use freepix_core::errors::ErrorKind;

    use super::*;

    /// A 40 byte header file with the given parts
    fn build(width: i32, height: i32, depth: u16, compression: u32, palette: &[[u8; 4]], data: &[u8]) -> Vec<u8> {
        let offset = 14 + 40 + palette.len() * 4;
        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&((offset + data.len()) as u32).to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        out.extend_from_slice(&40_u32.to_le_bytes());
        out.extend_from_slice(&width.to_le_bytes());
        out.extend_from_slice(&height.to_le_bytes());
        out.extend_from_slice(&1_u16.to_le_bytes());
        out.extend_from_slice(&depth.to_le_bytes());
        out.extend_from_slice(&compression.to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&2835_u32.to_le_bytes());
        out.extend_from_slice(&2835_u32.to_le_bytes());
        out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
        out.extend_from_slice(&0_u32.to_le_bytes());
        for entry in palette {
            out.extend_from_slice(entry);
        }
        out.extend_from_slice(data);
        out
    }

    #[test]
    fn top_down_rows_land_in_logical_order() {
        // 1x2 8 bit, first stored row is the top one
        let data = [1, 0, 0, 0, 2, 0, 0, 0];
        let file = build(1, -2, 8, 0, &[[0, 0, 0, 0], [255, 255, 255, 0]], &data);
        let bitmap = BmpDecoder::new(ByteCursor::new(file)).decode().unwrap();

        assert_eq!(bitmap.scan_order(), ScanOrder::TopDown);
        // logical row 0 is the bottom row, i.e the last stored one
        assert_eq!(bitmap.row(0).unwrap()[0], 2);
        assert_eq!(bitmap.row(1).unwrap()[0], 1);
        assert_eq!(bitmap.palette()[1], Rgba::new(255, 255, 255, 0));
        assert_eq!(bitmap.palette().len(), 256);
    }

    #[test]
    fn used_colors_beyond_depth_is_clamped() {
        let mut file = build(1, 1, 1, 0, &[[0, 0, 255, 0], [0, 255, 0, 0]], &[0x80, 0, 0, 0]);
        // claim 1000 colors
        file[46..50].copy_from_slice(&1000_u32.to_le_bytes());
        let bitmap = BmpDecoder::new(ByteCursor::new(file)).decode().unwrap();
        assert_eq!(bitmap.palette()[0], Rgba::new(255, 0, 0, 0));
        assert_eq!(bitmap.palette()[1], Rgba::new(0, 255, 0, 0));
    }

    #[test]
    fn pixels_are_stored_in_native_order() {
        let data = [10, 20, 30, 0];
        let file = build(1, 1, 24, 0, &[], &data);
        let bitmap = BmpDecoder::new(ByteCursor::new(file)).decode().unwrap();
        let px = pixel::get_rgba(&bitmap.row(0).unwrap()[..3]);
        assert_eq!((px.red, px.green, px.blue), (30, 20, 10));
    }

    #[test]
    fn header_only_skips_pixels() {
        let file = build(3, 3, 8, 0, &[[1, 2, 3, 0]], &[]);
        let options = DecoderOptions::default().set_header_only(true);
        let bitmap = BmpDecoder::new_with_options(ByteCursor::new(file), options)
            .decode()
            .unwrap();
        assert!(bitmap.is_header_only());
        assert_eq!(bitmap.dimensions(), (3, 3));
        assert_eq!(bitmap.palette()[0], Rgba::new(3, 2, 1, 0));
    }

    #[test]
    fn bad_magic_and_compression() {
        let mut file = build(1, 1, 8, 0, &[], &[0; 4]);
        file[0] = b'X';
        let err = BmpDecoder::new(ByteCursor::new(file)).decode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SignatureMismatch);

        // RLE4 on an 8 bit image
        let file = build(1, 1, 8, 2, &[], &[0; 4]);
        let err = BmpDecoder::new(ByteCursor::new(file)).decode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);
    }

    #[test]
    fn os2_core_header() {
        let mut file = Vec::new();
        file.extend_from_slice(b"BM");
        file.extend_from_slice(&[0; 8]);
        file.extend_from_slice(&(14_u32 + 12 + 6).to_le_bytes());
        file.extend_from_slice(&12_u32.to_le_bytes());
        file.extend_from_slice(&2_u16.to_le_bytes());
        file.extend_from_slice(&1_u16.to_le_bytes());
        file.extend_from_slice(&1_u16.to_le_bytes());
        file.extend_from_slice(&1_u16.to_le_bytes());
        file.extend_from_slice(&[0, 0, 0, 255, 255, 255]);
        file.extend_from_slice(&[0x40, 0, 0, 0]);

        let bitmap = BmpDecoder::new(ByteCursor::new(file)).decode().unwrap();
        assert_eq!(bitmap.dimensions(), (2, 1));
        assert_eq!(bitmap.dots_per_meter(), (2835, 2835));
        assert_eq!(bitmap.palette()[1], Rgba::new(255, 255, 255, 0));
        assert_eq!(bitmap.row(0).unwrap()[0], 0x40);
    }
}
