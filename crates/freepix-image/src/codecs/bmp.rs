/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! BMP support
//!
//! Decoding and encoding is done by the delegate library [freepix-bmp](freepix_bmp)
#![cfg(feature = "bmp")]

use freepix_bmp::{probe_bmp, BmpDecoder, BmpDecoderErrors, BmpEncoder, BmpEncoderErrors};
use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteReaderTrait, ByteWriterTrait};
use freepix_core::log::trace;
use freepix_core::options::{DecoderOptions, EncoderOptions};

use crate::codecs::read_signature;
use crate::errors::ImageErrors;
use crate::plugin::{FormatDescriptor, FormatPlugin, Page, PluginContext, Session};

pub const DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    name:        "BMP",
    description: "Windows or OS/2 Bitmap",
    extensions:  "bmp",
    mime:        "image/bmp",
    signature:   Some(b"BM")
};

#[derive(Copy, Clone, Debug, Default)]
pub struct BmpPlugin;

impl FormatPlugin for BmpPlugin {
    fn descriptor(&self) -> &FormatDescriptor {
        &DESCRIPTOR
    }

    fn validate(&self, stream: &mut dyn ByteReaderTrait) -> bool {
        read_signature::<2>(stream).is_some_and(|signature| probe_bmp(&signature))
    }

    fn load(
        &self, ctx: &PluginContext, stream: &mut dyn ByteReaderTrait, _page: Page,
        options: DecoderOptions, _session: Option<&mut Session>
    ) -> Result<Bitmap, ImageErrors> {
        trace!("{}: decoding", ctx.name());
        let mut decoder = BmpDecoder::new_with_options(stream, options);
        Ok(decoder.decode()?)
    }

    fn save(
        &self, _ctx: &PluginContext, bitmap: &Bitmap, sink: &mut dyn ByteWriterTrait, _page: Page,
        options: EncoderOptions, _session: Option<&mut Session>
    ) -> Result<(), ImageErrors> {
        BmpEncoder::new(bitmap, options).encode(sink)?;
        Ok(())
    }

    fn can_load(&self) -> bool {
        true
    }
    fn can_save(&self) -> bool {
        true
    }
    fn supports_export_depth(&self, depth: u16) -> bool {
        matches!(depth, 1 | 4 | 8 | 16 | 24 | 32)
    }
    fn supports_no_pixels(&self) -> bool {
        true
    }
}

impl From<BmpDecoderErrors> for ImageErrors {
    fn from(value: BmpDecoderErrors) -> Self {
        Self::DecodeErrors(value.kind(), format!("bmp: {:?}", value).trim_end().to_string())
    }
}

impl From<BmpEncoderErrors> for ImageErrors {
    fn from(value: BmpEncoderErrors) -> Self {
        Self::EncodeErrors(value.kind(), format!("bmp: {:?}", value).trim_end().to_string())
    }
}
