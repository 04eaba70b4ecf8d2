/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use freepix_core::bytestream::ByteCursor;
use freepix_core::options::DecoderOptions;
use freepix_image::plugin::Page;
use freepix_image::registry::Registry;

use crate::{color_hex, load_fixtures, to_hex, Fixture};

/// Differences between what a fixture decoded to and what it should be
fn check(registry: &Registry, fixture: &Fixture) -> Vec<String> {
    let mut problems = Vec::new();
    let mut stream = ByteCursor::new(fixture.bytes());

    let Some(id) = registry.detect(&mut stream) else {
        return vec!["not detected".to_string()];
    };
    let name = registry.descriptor(id).unwrap().name;
    if name != fixture.format {
        problems.push(format!("detected as {name}"));
    }

    let bitmap = match registry.load(id, &mut stream, Page::Default, DecoderOptions::default()) {
        Ok(bitmap) => bitmap,
        Err(err) => return vec![format!("{err:?}")]
    };
    if bitmap.dimensions() != (fixture.width, fixture.height) {
        problems.push(format!("dimensions {:?}", bitmap.dimensions()));
    }
    if bitmap.bits_per_pixel() != fixture.depth {
        problems.push(format!("depth {}", bitmap.bits_per_pixel()));
    }
    let line = bitmap.line_bytes();
    for (y, expected) in fixture.rows.iter().enumerate() {
        let found = bitmap
            .row(bitmap.height() - 1 - y)
            .map(|row| to_hex(&row[..line]))
            .unwrap_or_default();
        if &found != expected {
            problems.push(format!("row {y}: expected {expected} found {found}"));
        }
    }
    for (i, expected) in fixture.palette.iter().enumerate() {
        let found = bitmap.palette().get(i).map(color_hex).unwrap_or_default();
        if &found != expected {
            problems.push(format!("palette {i}: expected {expected} found {found}"));
        }
    }
    problems
}

#[test]
#[allow(clippy::uninlined_format_args)]
fn test_fixtures() {
    let registry = Registry::new();
    let fixtures = load_fixtures("decode.json");
    assert!(!fixtures.is_empty());

    let mut error = false;
    for fixture in &fixtures {
        let problems = check(&registry, fixture);
        if !problems.is_empty() {
            error = true;
            eprintln!("{}: {:#?}\nConfig:{:#?}\n", fixture.name, problems, fixture.comment);
        }
    }
    if error {
        panic!("Errors found during fixture decoding");
    }
}

#[test]
fn header_only_fixtures_have_no_pixels() {
    let registry = Registry::new();
    let options = DecoderOptions::default().set_header_only(true);

    for fixture in load_fixtures("decode.json") {
        let mut stream = ByteCursor::new(fixture.bytes());
        let id = registry.detect(&mut stream).unwrap();
        assert!(registry.supports_no_pixels(id));

        let bitmap = registry
            .load(id, &mut stream, Page::Default, options)
            .unwrap();
        assert!(bitmap.is_header_only(), "{}", fixture.name);
        assert!(bitmap.row(0).is_none());
        assert_eq!(bitmap.dimensions(), (fixture.width, fixture.height));
        assert_eq!(bitmap.bits_per_pixel(), fixture.depth);
    }
}
