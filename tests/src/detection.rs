/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use freepix_core::bytestream::{ByteCursor, ByteReaderTrait};
use freepix_image::codecs::external::SignatureFormat;
use freepix_image::plugin::FormatDescriptor;
use freepix_image::registry::Registry;

fn detect_name(registry: &Registry, bytes: &[u8]) -> Option<&'static str> {
    let mut stream = ByteCursor::new(bytes);
    registry
        .detect(&mut stream)
        .map(|id| registry.descriptor(id).unwrap().name)
}

#[test]
fn built_in_order() {
    let registry = Registry::new();
    let names: Vec<&str> = registry
        .ids()
        .map(|id| registry.descriptor(id).unwrap().name)
        .collect();
    assert_eq!(
        names,
        ["BMP", "JPEG", "PCX", "PNG", "TIFF", "GIF", "SGI", "J2K", "JP2", "RAW"]
    );
}

#[test]
fn signatures() {
    let registry = Registry::new();
    let cases: [(&[u8], &str); 12] = [
        (b"BM\0\0\0\0", "BMP"),
        (b"BA\0\0\0\0", "BMP"),
        (&[0xFF, 0xD8, 0xFF, 0xE0], "JPEG"),
        (&[0x0A, 5, 1, 8], "PCX"),
        (b"\x89PNG\r\n\x1a\n", "PNG"),
        (b"MM\0*\0\0\0\x08", "TIFF"),
        (b"GIF87a", "GIF"),
        (&[0x01, 0xDA, 0x01, 0x01], "SGI"),
        (&[0xFF, 0x4F, 0xFF, 0x51], "J2K"),
        (b"\0\0\0\x0cjP  \r\n\x87\n", "JP2"),
        (b"FUJIFILMCCD-RAW 0201", "RAW"),
        (b"IIRO\x08\0\0\0", "RAW")
    ];
    for (bytes, expected) in cases {
        assert_eq!(detect_name(&registry, bytes), Some(expected), "{bytes:02x?}");
    }
    assert_eq!(detect_name(&registry, b""), None);
    assert_eq!(detect_name(&registry, b"GIF8"), None);
    assert_eq!(detect_name(&registry, &[0x0A, 9, 1, 8]), None);
}

#[test]
fn raw_files_in_tiff_containers() {
    let registry = Registry::new();
    assert_eq!(detect_name(&registry, b"II*\0\x10\0\0\0CR\x02\0\0"), Some("RAW"));
    assert_eq!(detect_name(&registry, b"II*\0\x08\0\0\0\x10\0"), Some("TIFF"));
}

#[test]
fn earlier_registration_wins() {
    const SIGNATURE: &[&[u8]] = &[b"GI"];
    let mut registry = Registry::empty();
    let shadow = registry.register(SignatureFormat::new(
        FormatDescriptor {
            name:        "SHADOW",
            description: "Claims every file starting with GI",
            extensions:  "shadow",
            mime:        "application/x-shadow",
            signature:   Some(b"GI")
        },
        SIGNATURE
    ));
    registry.register(freepix_image::codecs::gif::GifPlugin);

    assert_eq!(detect_name(&registry, b"GIF89a"), Some("SHADOW"));

    registry.set_enabled(shadow, false);
    assert_eq!(detect_name(&registry, b"GIF89a"), Some("GIF"));
    assert_eq!(registry.find_by_name("shadow"), None);
}

#[test]
fn detection_starts_at_the_current_position() {
    let registry = Registry::new();
    let mut data = vec![0xAA; 7];
    data.extend_from_slice(b"GIF89a\x01\0\x01\0\0\0\0;");
    let mut stream = ByteCursor::new(data);
    stream.read_exact_bytes(&mut [0; 7]).unwrap();

    let id = registry.detect(&mut stream).unwrap();
    assert_eq!(registry.descriptor(id).unwrap().name, "GIF");
    assert_eq!(stream.io_position().unwrap(), 7);
}
