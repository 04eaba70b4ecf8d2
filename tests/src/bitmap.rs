/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use freepix_core::bitmap::{compute_pitch, Bitmap, ScanOrder};

#[test]
fn rows_are_padded_to_32_bits() {
    assert_eq!(Bitmap::allocate(3, 1, 1).unwrap().pitch(), 4);
    assert_eq!(Bitmap::allocate(10, 2, 8).unwrap().pitch(), 12);
    assert_eq!(Bitmap::allocate(10, 2, 8).unwrap().line_bytes(), 10);
    assert_eq!(compute_pitch(5, 24), Some(16));
    assert_eq!(compute_pitch(usize::MAX, 32), None);
}

#[test]
fn row_zero_is_the_bottom() {
    let mut bitmap = Bitmap::allocate(4, 3, 8).unwrap();
    for y in 0..3 {
        bitmap.row_mut(y).unwrap()[0] = y as u8;
    }
    let bottom_up = bitmap.pixels().unwrap().to_vec();
    assert_eq!([bottom_up[0], bottom_up[4], bottom_up[8]], [0, 1, 2]);

    // same logical rows, stored the other way round
    let mut flipped = Bitmap::allocate(4, 3, 8).unwrap();
    flipped.set_scan_order(ScanOrder::TopDown);
    for y in 0..3 {
        flipped.row_mut(y).unwrap()[0] = y as u8;
    }
    let top_down = flipped.pixels().unwrap();
    assert_eq!([top_down[0], top_down[4], top_down[8]], [2, 1, 0]);
    assert!(flipped.same_pixels(&bitmap));
    assert!(bitmap.row(3).is_none());
}

#[test]
fn header_only_bitmaps_have_no_rows() {
    let bitmap = Bitmap::allocate_header(true, 640, 480, 24, None).unwrap();
    assert!(bitmap.is_header_only());
    assert_eq!(bitmap.pitch(), 1920);
    assert!(bitmap.row(0).is_none());
}

#[test]
fn only_known_depths_allocate() {
    for depth in [2, 7, 12, 48] {
        assert!(Bitmap::allocate(4, 4, depth).is_err(), "depth {depth}");
    }
    let palette_sizes: Vec<usize> = [1, 4, 8, 16]
        .iter()
        .map(|d| Bitmap::allocate(1, 1, *d).unwrap().palette().len())
        .collect();
    assert_eq!(palette_sizes, [2, 16, 256, 0]);
}
