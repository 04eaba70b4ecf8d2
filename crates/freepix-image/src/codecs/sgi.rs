/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! SGI support
//!
//! Decoding and encoding is done by the delegate library [freepix-sgi](freepix_sgi)
#![cfg(feature = "sgi")]

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteReaderTrait, ByteWriterTrait};
use freepix_core::options::{DecoderOptions, EncoderOptions};
use freepix_sgi::{probe_sgi, SgiDecoder, SgiDecoderErrors, SgiEncoder, SgiEncoderErrors};

use crate::codecs::read_signature;
use crate::errors::ImageErrors;
use crate::plugin::{FormatDescriptor, FormatPlugin, Page, PluginContext, Session};

pub const DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    name:        "SGI",
    description: "SGI Image Format",
    extensions:  "sgi,rgb,rgba,bw",
    mime:        "image/x-sgi",
    signature:   Some(&[0x01, 0xDA])
};

#[derive(Copy, Clone, Debug, Default)]
pub struct SgiPlugin;

impl FormatPlugin for SgiPlugin {
    fn descriptor(&self) -> &FormatDescriptor {
        &DESCRIPTOR
    }

    fn validate(&self, stream: &mut dyn ByteReaderTrait) -> bool {
        read_signature::<2>(stream).is_some_and(|signature| probe_sgi(&signature))
    }

    fn load(
        &self, _ctx: &PluginContext, stream: &mut dyn ByteReaderTrait, _page: Page,
        options: DecoderOptions, _session: Option<&mut Session>
    ) -> Result<Bitmap, ImageErrors> {
        let mut decoder = SgiDecoder::new_with_options(stream, options);
        Ok(decoder.decode()?)
    }

    fn save(
        &self, _ctx: &PluginContext, bitmap: &Bitmap, sink: &mut dyn ByteWriterTrait, _page: Page,
        options: EncoderOptions, _session: Option<&mut Session>
    ) -> Result<(), ImageErrors> {
        SgiEncoder::new(bitmap, options).encode(sink)?;
        Ok(())
    }

    fn can_load(&self) -> bool {
        true
    }
    fn can_save(&self) -> bool {
        true
    }
    fn supports_export_depth(&self, depth: u16) -> bool {
        matches!(depth, 8 | 24 | 32)
    }
    fn supports_no_pixels(&self) -> bool {
        true
    }
}

impl From<SgiDecoderErrors> for ImageErrors {
    fn from(value: SgiDecoderErrors) -> Self {
        Self::DecodeErrors(value.kind(), format!("sgi: {:?}", value).trim_end().to_string())
    }
}

impl From<SgiEncoderErrors> for ImageErrors {
    fn from(value: SgiEncoderErrors) -> Self {
        Self::EncodeErrors(value.kind(), format!("sgi: {:?}", value).trim_end().to_string())
    }
}
