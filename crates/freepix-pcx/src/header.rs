/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The fixed 128 byte PCX header
//!
//! All multi byte fields are little endian.
//!
//! | offset | size | field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 1    | manufacturer, always `0x0A`            |
//! | 1      | 1    | version, 0 to 5                        |
//! | 2      | 1    | encoding, 1 for RLE                    |
//! | 3      | 1    | bits per pixel per plane               |
//! | 4      | 8    | window, left top right bottom          |
//! | 12     | 4    | horizontal and vertical dpi            |
//! | 16     | 48   | 16 entry RGB colormap                  |
//! | 65     | 1    | number of planes                       |
//! | 66     | 2    | bytes per line of a single plane       |
//! | 68     | 2    | palette info, 2 means grayscale        |

pub(crate) const HEADER_SIZE: usize = 128;
pub(crate) const PCX_SIGNATURE: u8 = 0x0A;
/// Marks the 768 byte palette at the end of 8 bit files
pub(crate) const VGA_PALETTE_MARKER: u8 = 0x0C;

/// Probe some bytes to see if they consist of a PCX image
///
/// A single signature byte is too weak, so version, encoding and
/// bits per pixel are checked as well.
pub fn probe_pcx(bytes: &[u8]) -> bool {
    match bytes.get(0..4) {
        Some(&[signature, version, encoding, bpp]) => {
            signature == PCX_SIGNATURE
                && version <= 5
                && (encoding == 0 || encoding == 1)
                && matches!(bpp, 1 | 4 | 8)
        }
        _ => false
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PcxHeader {
    pub version:        u8,
    pub encoding:       u8,
    pub bpp:            u8,
    /// left, top, right, bottom, inclusive
    pub window:         [u16; 4],
    pub hdpi:           u16,
    pub vdpi:           u16,
    pub colormap:       [u8; 48],
    pub planes:         u8,
    pub bytes_per_line: u16,
    pub palette_info:   u16
}

impl PcxHeader {
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> PcxHeader {
        let u16_at = |pos: usize| u16::from_le_bytes([bytes[pos], bytes[pos + 1]]);

        let mut colormap = [0; 48];
        colormap.copy_from_slice(&bytes[16..64]);

        PcxHeader {
            version: bytes[1],
            encoding: bytes[2],
            bpp: bytes[3],
            window: [u16_at(4), u16_at(6), u16_at(8), u16_at(10)],
            hdpi: u16_at(12),
            vdpi: u16_at(14),
            colormap,
            planes: bytes[65],
            bytes_per_line: u16_at(66),
            palette_info: u16_at(68)
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0; HEADER_SIZE];

        out[0] = PCX_SIGNATURE;
        out[1] = self.version;
        out[2] = self.encoding;
        out[3] = self.bpp;
        for (i, coord) in self.window.iter().enumerate() {
            out[4 + i * 2..6 + i * 2].copy_from_slice(&coord.to_le_bytes());
        }
        out[12..14].copy_from_slice(&self.hdpi.to_le_bytes());
        out[14..16].copy_from_slice(&self.vdpi.to_le_bytes());
        out[16..64].copy_from_slice(&self.colormap);
        out[65] = self.planes;
        out[66..68].copy_from_slice(&self.bytes_per_line.to_le_bytes());
        out[68..70].copy_from_slice(&self.palette_info.to_le_bytes());
        out
    }

    pub const fn is_rle(&self) -> bool {
        self.encoding == 1
    }

    /// Width and height, `None` if the window is inverted
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        let [left, top, right, bottom] = self.window;
        if right < left || bottom < top {
            return None;
        }
        Some((
            usize::from(right - left) + 1,
            usize::from(bottom - top) + 1
        ))
    }

    pub const fn bit_count(&self) -> u16 {
        self.bpp as u16 * self.planes as u16
    }

    /// Bytes of one full line, all planes included
    pub const fn line_length(&self) -> usize {
        self.bytes_per_line as usize * self.planes as usize
    }
}

/// Convert dots per inch to dots per meter
pub(crate) fn dpi_to_dpm(dpi: u16) -> u32 {
    (f32::from(dpi) / 0.0254 + 0.5) as u32
}

/// Convert dots per meter to dots per inch
pub(crate) fn dpm_to_dpi(dpm: u32) -> u16 {
    (dpm as f32 * 0.0254 + 0.5).min(f32::from(u16::MAX)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_checks_more_than_the_first_byte() {
        assert!(probe_pcx(&[0x0A, 5, 1, 8]));
        assert!(probe_pcx(&[0x0A, 0, 0, 1]));
        assert!(!probe_pcx(&[0x0A, 6, 1, 8]));
        assert!(!probe_pcx(&[0x0A, 5, 2, 8]));
        assert!(probe_pcx(&[0x0A, 5, 1, 4]));
        assert!(!probe_pcx(&[0x0A, 5, 1, 2]));
        assert!(!probe_pcx(&[0x0A, 5, 1]));
    }

    #[test]
    fn resolution_conversion() {
        assert_eq!(dpi_to_dpm(72), 2835);
        assert_eq!(dpm_to_dpi(2835), 72);
        assert_eq!(dpi_to_dpm(0), 0);
    }

    #[test]
    fn inverted_window_has_no_dimensions() {
        let mut bytes = [0; HEADER_SIZE];
        bytes[8] = 9;
        bytes[10] = 4;
        let header = PcxHeader::parse(&bytes);
        assert_eq!(header.dimensions(), Some((10, 5)));

        let header = PcxHeader {
            window: [3, 0, 2, 0],
            ..header
        };
        assert_eq!(header.dimensions(), None);
    }
}
