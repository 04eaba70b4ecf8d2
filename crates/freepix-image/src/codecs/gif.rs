/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! GIF support
//!
//! Decoding and encoding is done by the delegate library [freepix-gif](freepix_gif).
//!
//! Opening a stream scans it once and keeps the location of every frame
//! in the session, so pages can be loaded in any order without rescanning.
//! Writer sessions remember how many frames went out so the file header is
//! written once and the trailer is written on close.
#![cfg(feature = "gif")]

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteReaderTrait, ByteWriterTrait};
use freepix_core::log::trace;
use freepix_core::options::{DecoderOptions, EncoderOptions};
use freepix_gif::{probe_gif, GifDecoder, GifDecoderErrors, GifEncoder, GifEncoderErrors, GifIndex};

use crate::codecs::read_signature;
use crate::errors::ImageErrors;
use crate::plugin::{FormatDescriptor, FormatPlugin, Page, PluginContext, Session};

pub const DESCRIPTOR: FormatDescriptor = FormatDescriptor {
    name:        "GIF",
    description: "Graphics Interchange Format",
    extensions:  "gif",
    mime:        "image/gif",
    signature:   Some(b"GIF8")
};

/// State of a file being written
struct GifWriter {
    frames: usize
}

#[derive(Copy, Clone, Debug, Default)]
pub struct GifPlugin;

impl FormatPlugin for GifPlugin {
    fn descriptor(&self) -> &FormatDescriptor {
        &DESCRIPTOR
    }

    fn validate(&self, stream: &mut dyn ByteReaderTrait) -> bool {
        read_signature::<6>(stream).is_some_and(|signature| probe_gif(&signature))
    }

    fn open(
        &self, ctx: &PluginContext, stream: &mut dyn ByteReaderTrait, options: &DecoderOptions
    ) -> Result<Option<Session>, ImageErrors> {
        let mut decoder = GifDecoder::new_with_options(stream, *options);
        decoder.decode_headers()?;

        match decoder.index() {
            Some(index) => {
                trace!("{}: {} frames", ctx.name(), index.page_count());
                Ok(Some(Session::new(index.clone())))
            }
            None => Err(ImageErrors::InvalidSession(DESCRIPTOR.name))
        }
    }

    fn page_count(
        &self, _ctx: &PluginContext, session: Option<&Session>
    ) -> Result<usize, ImageErrors> {
        session
            .and_then(|session| session.downcast_ref::<GifIndex>())
            .map(GifIndex::page_count)
            .ok_or(ImageErrors::InvalidSession(DESCRIPTOR.name))
    }

    fn load(
        &self, ctx: &PluginContext, stream: &mut dyn ByteReaderTrait, page: Page,
        options: DecoderOptions, session: Option<&mut Session>
    ) -> Result<Bitmap, ImageErrors> {
        trace!("{}: decoding page {}", ctx.name(), page.index());

        let mut decoder = match session {
            Some(session) => {
                let index = session
                    .downcast_ref::<GifIndex>()
                    .ok_or(ImageErrors::InvalidSession(DESCRIPTOR.name))?;
                GifDecoder::new_with_index(stream, options, index.clone())
            }
            None => GifDecoder::new_with_options(stream, options)
        };
        Ok(decoder.decode_page(page.index())?)
    }

    fn open_writer(&self, _ctx: &PluginContext) -> Result<Option<Session>, ImageErrors> {
        Ok(Some(Session::new(GifWriter { frames: 0 })))
    }

    fn save(
        &self, _ctx: &PluginContext, bitmap: &Bitmap, sink: &mut dyn ByteWriterTrait, _page: Page,
        options: EncoderOptions, session: Option<&mut Session>
    ) -> Result<(), ImageErrors> {
        match session {
            Some(session) => {
                let state = session
                    .downcast_mut::<GifWriter>()
                    .ok_or(ImageErrors::InvalidSession(DESCRIPTOR.name))?;
                let mut encoder = GifEncoder::resume(sink, options, state.frames);
                encoder.add_frame(bitmap)?;
                state.frames = encoder.frames_written();
            }
            None => {
                // a complete single frame file
                let mut encoder = GifEncoder::new_with_options(sink, options);
                encoder.add_frame(bitmap)?;
                encoder.finish()?;
            }
        }
        Ok(())
    }

    fn close(
        &self, _ctx: &PluginContext, sink: Option<&mut dyn ByteWriterTrait>, session: Session
    ) -> Result<(), ImageErrors> {
        if let (Some(sink), Some(state)) = (sink, session.downcast_ref::<GifWriter>()) {
            GifEncoder::resume(sink, EncoderOptions::default(), state.frames).finish()?;
        }
        Ok(())
    }

    fn can_load(&self) -> bool {
        true
    }
    fn can_save(&self) -> bool {
        true
    }
    fn supports_export_depth(&self, depth: u16) -> bool {
        matches!(depth, 1 | 4 | 8)
    }
    fn supports_no_pixels(&self) -> bool {
        true
    }
}

impl From<GifDecoderErrors> for ImageErrors {
    fn from(value: GifDecoderErrors) -> Self {
        Self::DecodeErrors(value.kind(), format!("gif: {:?}", value).trim_end().to_string())
    }
}

impl From<GifEncoderErrors> for ImageErrors {
    fn from(value: GifEncoderErrors) -> Self {
        Self::EncodeErrors(value.kind(), format!("gif: {:?}", value).trim_end().to_string())
    }
}
