/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::path::{Path, PathBuf};

use freepix_core::bitmap::Bitmap;
use freepix_core::pixel::Rgba;
use serde::Deserialize;
use xxhash_rust::xxh3::xxh3_128;

#[cfg(test)]
mod animation;
#[cfg(test)]
mod bitmap;
#[cfg(test)]
mod decode;
#[cfg(test)]
mod detection;
#[cfg(test)]
mod rle;
#[cfg(test)]
mod round_trip;
#[cfg(test)]
mod serde_json_output;

/// A small hand made file and what it must decode to
#[derive(Clone, Deserialize, Debug)]
pub struct Fixture {
    pub name:    String,
    /// Short name of the format the file must be detected as
    pub format:  String,
    /// File contents as hex
    pub data:    String,
    pub width:   usize,
    pub height:  usize,
    pub depth:   u16,
    /// Visible bytes of each row as hex, top row first
    pub rows:    Vec<String>,
    /// Leading palette entries as `rrggbb`
    pub palette: Vec<String>,
    pub comment: Option<String>
}

impl Fixture {
    pub fn bytes(&self) -> Vec<u8> {
        from_hex(&self.data)
    }
}

pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures")
}

pub fn load_fixtures(name: &str) -> Vec<Fixture> {
    let json_file = std::fs::read(fixture_path().join(name)).unwrap();
    serde_json::from_slice(&json_file).unwrap()
}

pub fn from_hex(hex: &str) -> Vec<u8> {
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap())
        .collect()
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn color_hex(color: &Rgba) -> String {
    format!("{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Hash of the visible pixels, top row first
///
/// Padding and storage order do not change the hash.
pub fn hash(bitmap: &Bitmap) -> u128 {
    let line = bitmap.line_bytes();
    let mut pixels = Vec::with_capacity(line * bitmap.height());

    for y in (0..bitmap.height()).rev() {
        pixels.extend_from_slice(&bitmap.row(y).unwrap()[..line]);
    }
    xxh3_128(&pixels)
}

/// A bitmap filled with a pattern that exercises runs and literals
///
/// Bits past the last pixel of a row are left zero.
pub fn patterned(width: usize, height: usize, depth: u16) -> Bitmap {
    let mut bitmap = Bitmap::allocate(width, height, depth).unwrap();
    let line = bitmap.line_bytes();
    let used_bits = width * usize::from(depth);

    for y in 0..height {
        let row = bitmap.row_mut(y).unwrap();
        for (x, byte) in row[..line].iter_mut().enumerate() {
            // the left half of each row is a run, the rest is noise
            *byte = if x < line / 2 {
                (y * 17) as u8
            } else {
                ((x * 31) ^ (y * 7)) as u8
            };
        }
        let spare = line * 8 - used_bits;
        if spare > 0 {
            row[line - 1] &= 0xFF << spare;
        }
    }
    match depth {
        1 | 4 | 8 => bitmap.set_grayscale_palette(),
        16 => {
            // keep the unused top bit of 5-5-5 pixels clear
            for y in 0..height {
                for px in bitmap.pixels_of_row_mut::<2>(y).unwrap() {
                    px[1] &= 0x7F;
                }
            }
        }
        _ => ()
    }
    bitmap
}
