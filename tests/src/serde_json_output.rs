/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use freepix_core::errors::ErrorKind;
use freepix_core::pixel::Rgba;
use freepix_image::registry::Registry;
use serde_json::json;

#[test]
fn descriptors_as_json() {
    let registry = Registry::new();
    let sgi = registry.find_by_name("SGI").unwrap();
    let descriptor = registry.descriptor(sgi).unwrap();

    let value = serde_json::to_value(descriptor).unwrap();
    assert_eq!(value["name"], "SGI");
    assert_eq!(value["mime"], "image/x-sgi");
    assert_eq!(value["extensions"], json!(["sgi", "rgb", "rgba", "bw"]));

    assert_eq!(serde_json::to_value(sgi).unwrap(), json!(sgi.index()));
}

#[test]
fn every_format_serializes() {
    let registry = Registry::new();
    let all: Vec<_> = registry
        .ids()
        .filter_map(|id| registry.descriptor(id))
        .collect();
    let text = serde_json::to_string(&all).unwrap();
    let back: Vec<serde_json::Value> = serde_json::from_str(&text).unwrap();
    assert_eq!(back.len(), registry.len());
}

#[test]
fn core_types_as_json() {
    assert_eq!(
        serde_json::to_value(ErrorKind::TruncatedStream).unwrap(),
        "TruncatedStream"
    );
    assert_eq!(
        serde_json::to_value(Rgba::new(1, 2, 3, 4)).unwrap(),
        json!([1, 2, 3, 4])
    );
}
