/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The 512 byte big endian SGI header
use alloc::string::String;

pub(crate) const HEADER_SIZE: usize = 512;
pub(crate) const SGI_MAGIC: u16 = 474;

/// Probe some bytes to see if they start an SGI image
pub fn probe_sgi(bytes: &[u8]) -> bool {
    bytes.get(0..2) == Some(&SGI_MAGIC.to_be_bytes())
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SgiHeader {
    /// 0 for verbatim, 1 for RLE
    pub storage:   u8,
    /// Bytes per component
    pub bpc:       u8,
    /// 1 for a single row, 2 for one channel, 3 for multiple channels
    pub dimension: u16,
    pub xsize:     u16,
    pub ysize:     u16,
    pub zsize:     u16,
    pub pixmin:    i32,
    pub pixmax:    i32,
    pub name:      [u8; 80],
    pub colormap:  i32
}

impl SgiHeader {
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> SgiHeader {
        let u16_at = |pos: usize| u16::from_be_bytes([bytes[pos], bytes[pos + 1]]);
        let i32_at = |pos: usize| {
            i32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]])
        };
        let mut name = [0; 80];
        name.copy_from_slice(&bytes[24..104]);

        SgiHeader {
            storage: bytes[2],
            bpc: bytes[3],
            dimension: u16_at(4),
            xsize: u16_at(6),
            ysize: u16_at(8),
            zsize: u16_at(10),
            pixmin: i32_at(12),
            pixmax: i32_at(16),
            name,
            colormap: i32_at(104)
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0; HEADER_SIZE];
        out[0..2].copy_from_slice(&SGI_MAGIC.to_be_bytes());
        out[2] = self.storage;
        out[3] = self.bpc;
        out[4..6].copy_from_slice(&self.dimension.to_be_bytes());
        out[6..8].copy_from_slice(&self.xsize.to_be_bytes());
        out[8..10].copy_from_slice(&self.ysize.to_be_bytes());
        out[10..12].copy_from_slice(&self.zsize.to_be_bytes());
        out[12..16].copy_from_slice(&self.pixmin.to_be_bytes());
        out[16..20].copy_from_slice(&self.pixmax.to_be_bytes());
        out[24..104].copy_from_slice(&self.name);
        out[104..108].copy_from_slice(&self.colormap.to_be_bytes());
        out
    }

    pub const fn is_rle(&self) -> bool {
        self.storage == 1
    }

    /// Rows, images with fewer than two dimensions have one
    pub const fn height(&self) -> usize {
        if self.dimension < 2 {
            1
        } else {
            self.ysize as usize
        }
    }

    /// Channels, images with fewer than three dimensions have one
    pub const fn channels(&self) -> usize {
        if self.dimension < 3 {
            1
        } else {
            self.zsize as usize
        }
    }

    /// The NUL terminated image name, lossily converted
    pub fn name(&self) -> String {
        let end = self.name.iter().position(|c| *c == 0).unwrap_or(self.name.len());
        String::from_utf8_lossy(&self.name[..end]).into_owned()
    }
}
