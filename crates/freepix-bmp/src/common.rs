/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

/// Size of the `BITMAPFILEHEADER`
pub(crate) const FILE_HEADER_SIZE: u32 = 14;
/// Size of the `BITMAPINFOHEADER` written by the encoder
pub(crate) const INFO_HEADER_SIZE: u32 = 40;
/// Resolution assumed for OS/2 1.x files, 72 dpi
pub(crate) const OS2_DOTS_PER_METER: u32 = 2835;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BmpCompression {
    RGB,
    RLE8,
    RLE4,
    BITFIELDS,
    ALPHABITFIELDS
}

impl BmpCompression {
    pub fn from_u32(num: u32) -> Option<BmpCompression> {
        match num {
            0 => Some(BmpCompression::RGB),
            1 => Some(BmpCompression::RLE8),
            2 => Some(BmpCompression::RLE4),
            3 => Some(BmpCompression::BITFIELDS),
            6 => Some(BmpCompression::ALPHABITFIELDS),
            _ => None
        }
    }
    pub const fn to_u32(self) -> u32 {
        match self {
            BmpCompression::RGB => 0,
            BmpCompression::RLE8 => 1,
            BmpCompression::RLE4 => 2,
            BmpCompression::BITFIELDS => 3,
            BmpCompression::ALPHABITFIELDS => 6
        }
    }
}

/// Which family of info header a file carries
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BmpVariant {
    /// 12 byte `BITMAPCOREHEADER`, 16 bit dimensions, 3 byte palette entries
    Os2v1,
    /// 16 to 64 byte OS/2 2.x header, omitted fields are zero
    Os2v2,
    /// 40, 52, 56, 108 or 124 byte Windows header
    Windows
}

impl BmpVariant {
    /// Classify an info header size
    pub const fn from_header_size(size: u32) -> Option<BmpVariant> {
        match size {
            12 => Some(BmpVariant::Os2v1),
            40 | 52 | 56 | 108 | 124 => Some(BmpVariant::Windows),
            16..=64 => Some(BmpVariant::Os2v2),
            _ => None
        }
    }
}

/// Number of palette entries implied by a bit depth
pub(crate) const fn palette_entries(depth: u16) -> u32 {
    match depth {
        1 | 4 | 8 => 1 << depth,
        _ => 0
    }
}
