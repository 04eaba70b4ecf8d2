/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! PCX support
//!
//! Decoding and encoding is done by the delegate library [freepix-pcx](freepix_pcx)
#![cfg(feature = "pcx")]

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteReaderTrait, ByteWriterTrait};
use freepix_core::options::{DecoderOptions, EncoderOptions};
use freepix_pcx::{probe_pcx, PcxDecoder, PcxDecoderErrors, PcxEncoder, PcxEncoderErrors};

use crate::codecs::read_signature;
use crate::errors::ImageErrors;
use crate::plugin::{FormatDescriptor, FormatPlugin, Page, PluginContext, Session};

pub const DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    name:        "PCX",
    description: "Zsoft Paintbrush",
    extensions:  "pcx",
    mime:        "image/x-pcx",
    signature:   Some(&[0x0A])
};

#[derive(Copy, Clone, Debug, Default)]
pub struct PcxPlugin;

impl FormatPlugin for PcxPlugin {
    fn descriptor(&self) -> &FormatDescriptor {
        &DESCRIPTOR
    }

    fn validate(&self, stream: &mut dyn ByteReaderTrait) -> bool {
        read_signature::<4>(stream).is_some_and(|signature| probe_pcx(&signature))
    }

    fn load(
        &self, _ctx: &PluginContext, stream: &mut dyn ByteReaderTrait, _page: Page,
        options: DecoderOptions, _session: Option<&mut Session>
    ) -> Result<Bitmap, ImageErrors> {
        let mut decoder = PcxDecoder::new_with_options(stream, options);
        Ok(decoder.decode()?)
    }

    fn save(
        &self, _ctx: &PluginContext, bitmap: &Bitmap, sink: &mut dyn ByteWriterTrait, _page: Page,
        options: EncoderOptions, _session: Option<&mut Session>
    ) -> Result<(), ImageErrors> {
        PcxEncoder::new(bitmap, options).encode(sink)?;
        Ok(())
    }

    fn can_load(&self) -> bool {
        true
    }
    fn can_save(&self) -> bool {
        true
    }
    fn supports_export_depth(&self, depth: u16) -> bool {
        matches!(depth, 1 | 4 | 8 | 24)
    }
    fn supports_no_pixels(&self) -> bool {
        true
    }
}

impl From<PcxDecoderErrors> for ImageErrors {
    fn from(value: PcxDecoderErrors) -> Self {
        Self::DecodeErrors(value.kind(), format!("pcx: {:?}", value).trim_end().to_string())
    }
}

impl From<PcxEncoderErrors> for ImageErrors {
    fn from(value: PcxEncoderErrors) -> Self {
        Self::EncodeErrors(value.kind(), format!("pcx: {:?}", value).trim_end().to_string())
    }
}
