/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::ByteCursor;
use freepix_core::options::{DecoderOptions, EncoderOptions};
use freepix_image::plugin::Page;
use freepix_image::registry::Registry;

use crate::{hash, patterned};

fn round_trip(registry: &Registry, format: &str, bitmap: &Bitmap, options: EncoderOptions) -> Bitmap {
    let id = registry.find_by_name(format).unwrap();
    let mut out = vec![];
    registry.save(id, bitmap, &mut out, options).unwrap();

    let mut stream = ByteCursor::new(out);
    assert_eq!(registry.detect(&mut stream), Some(id), "{format}");
    registry
        .load(id, &mut stream, Page::Default, DecoderOptions::default())
        .unwrap()
}

#[test]
fn every_codec_at_every_depth() {
    let registry = Registry::new();
    let cases: [(&str, &[u16], EncoderOptions); 5] = [
        ("BMP", &[1, 4, 8, 16, 24, 32], EncoderOptions::default()),
        ("BMP", &[8], EncoderOptions::default().bmp_set_rle(true)),
        ("PCX", &[1, 4, 8, 24], EncoderOptions::default()),
        ("SGI", &[8, 24, 32], EncoderOptions::default().sgi_set_rle(true)),
        ("GIF", &[1, 4, 8], EncoderOptions::default())
    ];

    for (format, depths, options) in cases {
        let id = registry.find_by_name(format).unwrap();
        for &depth in depths {
            assert!(registry.supports_export_depth(id, depth));

            // odd widths exercise row padding
            for (width, height) in [(1, 1), (13, 7), (64, 3)] {
                let bitmap = patterned(width, height, depth);
                let decoded = round_trip(&registry, format, &bitmap, options);

                assert_eq!(decoded.dimensions(), (width, height));
                assert_eq!(decoded.bits_per_pixel(), depth);
                assert!(
                    decoded.same_pixels(&bitmap),
                    "{format} {depth} bit {width}x{height}"
                );
                if depth <= 8 && format != "PCX" {
                    assert_eq!(decoded.palette(), bitmap.palette(), "{format} {depth}");
                }
            }
        }
    }
}

#[test]
fn grayscale_survives_every_format() {
    let registry = Registry::new();
    let bitmap = patterned(33, 9, 8);
    let expected = hash(&bitmap);

    for format in ["BMP", "PCX", "SGI", "GIF"] {
        let decoded = round_trip(&registry, format, &bitmap, EncoderOptions::default());
        assert_eq!(hash(&decoded), expected, "{format}");
    }
}

#[test]
fn unsupported_depths_are_refused() {
    let registry = Registry::new();
    let cases = [("PCX", 16), ("PCX", 32), ("SGI", 1), ("SGI", 4), ("GIF", 24)];

    for (format, depth) in cases {
        let id = registry.find_by_name(format).unwrap();
        assert!(!registry.supports_export_depth(id, depth));

        let mut out = vec![];
        let bitmap = patterned(4, 4, depth);
        assert!(registry
            .save(id, &bitmap, &mut out, EncoderOptions::default())
            .is_err());
    }
}

#[test]
fn files_on_disk() {
    let registry = Registry::new();
    let dir = std::env::temp_dir().join(format!("freepix-tests-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let bitmap = patterned(20, 10, 8);
    for extension in ["bmp", "pcx", "rgb", "gif"] {
        let path = dir.join(format!("pattern.{extension}"));
        registry
            .save_path(&path, &bitmap, EncoderOptions::default())
            .unwrap();
        let decoded = registry
            .load_path(&path, DecoderOptions::default())
            .unwrap();
        assert!(decoded.same_pixels(&bitmap), "{extension}");
    }
    assert!(registry
        .save_path(dir.join("pattern.unknown"), &bitmap, EncoderOptions::default())
        .is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}
