/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use freepix_core::bitmap::{Bitmap, MetadataModel, TagValue};
use freepix_core::bytestream::ByteCursor;
use freepix_core::options::DecoderOptions;
use freepix_core::pixel::{get_rgba, Rgba};
use freepix_gif::tags::{
    DISPOSAL_METHOD, FRAME_LEFT, FRAME_TIME, FRAME_TOP, LOGICAL_HEIGHT, LOGICAL_WIDTH
};
use freepix_gif::{
    compose, DisposalMethod, FrameInfo, FrameSource, GifDecoder, GifDecoderErrors, GifEncoder
};
use freepix_image::plugin::Page;
use freepix_image::registry::Registry;

const RED: Rgba = Rgba::new(255, 0, 0, 0);
const BLUE: Rgba = Rgba::new(0, 0, 255, 0);
const GREEN: Rgba = Rgba::new(0, 255, 0, 0);

/// Decoder that remembers which frames were decoded
struct Counting {
    inner:   GifDecoder<ByteCursor<Vec<u8>>>,
    decoded: Vec<usize>
}

impl FrameSource for Counting {
    type Error = GifDecoderErrors;

    fn canvas_size(&self) -> (usize, usize) {
        self.inner.canvas_size()
    }
    fn background(&self) -> Rgba {
        self.inner.background()
    }
    fn frame_info(&mut self, index: usize) -> Result<FrameInfo, GifDecoderErrors> {
        self.inner.frame_info(index)
    }
    fn decode_frame(&mut self, index: usize) -> Result<Bitmap, GifDecoderErrors> {
        self.decoded.push(index);
        FrameSource::decode_frame(&mut self.inner, index)
    }
}

fn frame(
    width: usize, height: usize, at: (u16, u16), index: u8, disposal: DisposalMethod, delay: u32
) -> Bitmap {
    let mut bitmap = Bitmap::allocate(width, height, 4).unwrap();
    let palette = bitmap.palette_mut();
    palette[1] = RED;
    palette[2] = BLUE;
    palette[3] = GREEN;

    for y in 0..height {
        let row = bitmap.row_mut(y).unwrap();
        row[..width.div_ceil(2)].fill((index << 4) | index);
    }
    let meta = bitmap.metadata_mut();
    meta.set(MetadataModel::Animation, FRAME_LEFT, TagValue::Short(at.0));
    meta.set(MetadataModel::Animation, FRAME_TOP, TagValue::Short(at.1));
    meta.set(MetadataModel::Animation, FRAME_TIME, TagValue::Long(delay));
    meta.set(
        MetadataModel::Animation,
        DISPOSAL_METHOD,
        TagValue::Byte(disposal.to_flags())
    );
    bitmap
}

/// 8x6 canvas: a green corner, a red full frame over it, a blue square on top
fn animation() -> Vec<u8> {
    let mut first = frame(4, 4, (0, 0), 3, DisposalMethod::InPlace, 50);
    first
        .metadata_mut()
        .set(MetadataModel::Animation, LOGICAL_WIDTH, TagValue::Short(8));
    first
        .metadata_mut()
        .set(MetadataModel::Animation, LOGICAL_HEIGHT, TagValue::Short(6));

    let mut out = vec![];
    let mut encoder = GifEncoder::new(&mut out);
    encoder.add_frame(&first).unwrap();
    encoder
        .add_frame(&frame(8, 6, (0, 0), 1, DisposalMethod::InPlace, 60))
        .unwrap();
    encoder
        .add_frame(&frame(2, 2, (3, 2), 2, DisposalMethod::None, 70))
        .unwrap();
    assert_eq!(encoder.finish().unwrap(), 3);
    out
}

fn check_canvas(canvas: &Bitmap) {
    assert_eq!(canvas.dimensions(), (8, 6));
    assert_eq!(canvas.bits_per_pixel(), 32);

    for top in 0..6 {
        let row = canvas.row(5 - top).unwrap();
        for x in 0..8 {
            let expected = if (3..5).contains(&x) && (2..4).contains(&top) {
                BLUE
            } else {
                RED
            };
            let got = get_rgba(&row[x * 4..x * 4 + 4]);
            assert_eq!(got, Rgba { alpha: 255, ..expected }, "pixel {x},{top}");
        }
    }
}

#[test]
fn hidden_frames_are_not_decoded() {
    let mut inner = GifDecoder::new(ByteCursor::new(animation()));
    inner.decode_headers().unwrap();
    let mut source = Counting { inner, decoded: vec![] };

    assert_eq!(source.frame_info(0).unwrap().disposal, DisposalMethod::InPlace);
    assert_eq!(source.frame_info(2).unwrap().delay_ms, 70);

    let canvas = compose(&mut source, 2).unwrap();
    check_canvas(&canvas);
    // the opaque full frame hides the first one
    assert_eq!(source.decoded, [1, 2]);
}

#[test]
fn playback_through_the_registry() {
    let registry = Registry::new();
    let gif = registry.find_by_name("GIF").unwrap();
    let data = animation();

    assert_eq!(
        registry
            .page_count(gif, &mut ByteCursor::new(&data), DecoderOptions::default())
            .unwrap(),
        3
    );

    let options = DecoderOptions::default().gif_set_playback(true);
    let canvas = registry
        .load(gif, &mut ByteCursor::new(&data), Page::Index(2), options)
        .unwrap();
    check_canvas(&canvas);
    assert_eq!(
        canvas.metadata().get_u32(MetadataModel::Animation, FRAME_TIME),
        Some(70)
    );

    // raw frames keep their own size and placement
    let raw = registry
        .load(gif, &mut ByteCursor::new(&data), Page::Index(2), DecoderOptions::default())
        .unwrap();
    assert_eq!(raw.dimensions(), (2, 2));
    assert_eq!(raw.metadata().get_u32(MetadataModel::Animation, FRAME_LEFT), Some(3));
    assert_eq!(raw.metadata().get_u32(MetadataModel::Animation, FRAME_TOP), Some(2));
}
