/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::sync::Arc;

use freepix_bmp::{encode_rle8_end, encode_rle8_line};
use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::ByteCursor;
use freepix_core::errors::ErrorKind;
use freepix_core::options::{DecoderOptions, EncoderOptions};
use freepix_image::messages::CollectingSink;
use freepix_image::plugin::Page;
use freepix_image::registry::Registry;

#[test]
fn long_row_splits_into_two_runs() {
    let row = [0x42_u8; 300];
    let mut out = vec![];
    encode_rle8_line(&row, &mut out);
    assert_eq!(out, [254, 0x42, 46, 0x42, 0, 0]);

    encode_rle8_end(&mut out);
    assert_eq!(&out[6..], &[0, 1]);
}

#[test]
fn long_row_through_a_file() {
    let registry = Registry::new();
    let bmp = registry.find_by_name("BMP").unwrap();

    let mut bitmap = Bitmap::allocate(300, 1, 8).unwrap();
    bitmap.set_grayscale_palette();
    bitmap.row_mut(0).unwrap()[..300].fill(9);

    let mut out = vec![];
    let options = EncoderOptions::default().bmp_set_rle(true);
    registry.save(bmp, &bitmap, &mut out, options).unwrap();
    // run of 254, run of 46, end of line, end of bitmap
    assert_eq!(&out[out.len() - 8..], &[254, 9, 46, 9, 0, 0, 0, 1]);

    let decoded = registry
        .load(bmp, &mut ByteCursor::new(out), Page::Default, DecoderOptions::default())
        .unwrap();
    assert!(decoded.row(0).unwrap()[..300].iter().all(|x| *x == 9));
}

fn truncated(format: &str, bitmap: &Bitmap, options: EncoderOptions, cut: usize) {
    let sink = Arc::new(CollectingSink::new());
    let mut registry = Registry::new();
    registry.set_message_sink(sink.clone());
    let id = registry.find_by_name(format).unwrap();

    let mut out = vec![];
    registry.save(id, bitmap, &mut out, options).unwrap();
    out.truncate(out.len() - cut);

    let err = registry
        .load(id, &mut ByteCursor::new(out), Page::Default, DecoderOptions::default())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptStream, "{format}: {err:?}");

    let messages = sink.messages();
    assert_eq!(messages.len(), 1, "{format}");
    assert_eq!(messages[0].0, id);
}

#[test]
fn streams_ending_mid_run_are_corrupt() {
    let mut gray = Bitmap::allocate(40, 6, 8).unwrap();
    gray.set_grayscale_palette();
    for y in 0..6 {
        let row = gray.row_mut(y).unwrap();
        for (x, px) in row[..40].iter_mut().enumerate() {
            *px = if x < 20 { y as u8 } else { (x * 3) as u8 };
        }
    }
    // cut inside the pixel data, past the end of bitmap marker
    truncated("BMP", &gray, EncoderOptions::default().bmp_set_rle(true), 12);

    let mut rgb = Bitmap::allocate(40, 6, 24).unwrap();
    for y in 0..6 {
        rgb.row_mut(y).unwrap()[..120].fill(y as u8 * 10);
    }
    truncated("PCX", &rgb, EncoderOptions::default(), 3);
    truncated("SGI", &gray, EncoderOptions::default().sgi_set_rle(true), 2);
}
