/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The contract every format implements
//!
//! A plugin is only ever called by the [`Registry`](crate::registry::Registry).
//! Plugins hold no mutable state, anything a plugin needs to remember
//! between calls on one stream lives in a [`Session`] it hands back
//! from [`open`](FormatPlugin::open) or [`open_writer`](FormatPlugin::open_writer).
use std::any::Any;
use std::fmt::{Debug, Formatter};

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteReaderTrait, ByteWriterTrait};
use freepix_core::options::{DecoderOptions, EncoderOptions};

use crate::errors::ImageErrors;

/// Identifier of a registered format
///
/// Ids are handed out in registration order starting at zero and stay
/// valid for the lifetime of the registry that issued them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FormatId(pub(crate) usize);

impl FormatId {
    /// Position of the format in registration order
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Static description of a format
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FormatDescriptor {
    /// Short name, e.g. `BMP`
    pub name:        &'static str,
    pub description: &'static str,
    /// Comma separated extensions without the leading dot, the first one
    /// is the preferred extension
    pub extensions:  &'static str,
    pub mime:        &'static str,
    /// Leading bytes of a typical file, a hint and not a full check
    pub signature:   Option<&'static [u8]>
}

impl FormatDescriptor {
    /// Iterate over the extensions of this format
    pub fn extensions(&self) -> impl Iterator<Item = &'static str> {
        self.extensions
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
    }

    /// Whether `extension` (without a dot) belongs to this format, ignoring case
    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// Plugin private state for one open stream
///
/// The registry never looks inside, it only keeps the session alive
/// between calls and passes it back to the plugin that created it.
pub struct Session(Box<dyn Any + Send>);

impl Session {
    pub fn new<T: Any + Send>(state: T) -> Session {
        Session(Box::new(state))
    }
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.0.downcast_mut()
    }
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Session")
    }
}

/// Which image of a container to read or write
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Page {
    /// The single image of a single image format, or the first page
    #[default]
    Default,
    Index(usize)
}

impl Page {
    /// Page number, [`Page::Default`] is page zero
    pub const fn index(self) -> usize {
        match self {
            Page::Default => 0,
            Page::Index(page) => page
        }
    }
}

/// Per call context handed to plugins
///
/// Carries the id the registry assigned to the plugin so plugins
/// do not need to remember it themselves.
#[derive(Copy, Clone, Debug)]
pub struct PluginContext {
    pub(crate) id:   FormatId,
    pub(crate) name: &'static str
}

impl PluginContext {
    pub const fn id(&self) -> FormatId {
        self.id
    }
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// A format the registry can detect, read or write
///
/// Only [`descriptor`](Self::descriptor) and [`validate`](Self::validate)
/// are required, a format that only implements these can be
/// detected but neither read nor written.
pub trait FormatPlugin: Send + Sync {
    fn descriptor(&self) -> &FormatDescriptor;

    /// Return true if the stream looks like this format
    ///
    /// The stream is positioned at the start of the resource, the registry
    /// restores the position afterwards so plugins may read freely.
    fn validate(&self, stream: &mut dyn ByteReaderTrait) -> bool;

    /// Scan the stream ahead of [`load`](Self::load) and
    /// [`page_count`](Self::page_count)
    fn open(
        &self, _ctx: &PluginContext, _stream: &mut dyn ByteReaderTrait, _options: &DecoderOptions
    ) -> Result<Option<Session>, ImageErrors> {
        Ok(None)
    }

    /// Number of pages, `session` is what [`open`](Self::open) returned
    fn page_count(
        &self, _ctx: &PluginContext, _session: Option<&Session>
    ) -> Result<usize, ImageErrors> {
        Ok(1)
    }

    fn load(
        &self, _ctx: &PluginContext, _stream: &mut dyn ByteReaderTrait, _page: Page,
        _options: DecoderOptions, _session: Option<&mut Session>
    ) -> Result<Bitmap, ImageErrors> {
        Err(ImageErrors::NoDecoder(self.descriptor().name))
    }

    /// Start writing a new file
    fn open_writer(&self, _ctx: &PluginContext) -> Result<Option<Session>, ImageErrors> {
        Ok(None)
    }

    /// Write `bitmap` as `page`
    fn save(
        &self, _ctx: &PluginContext, _bitmap: &Bitmap, _sink: &mut dyn ByteWriterTrait,
        _page: Page, _options: EncoderOptions, _session: Option<&mut Session>
    ) -> Result<(), ImageErrors> {
        Err(ImageErrors::NoEncoder(self.descriptor().name))
    }

    /// Release a session
    ///
    /// Writer sessions receive the sink so they can finish the file,
    /// reader sessions receive `None`. Called exactly once per session.
    fn close(
        &self, _ctx: &PluginContext, _sink: Option<&mut dyn ByteWriterTrait>, _session: Session
    ) -> Result<(), ImageErrors> {
        Ok(())
    }

    fn can_load(&self) -> bool {
        false
    }
    fn can_save(&self) -> bool {
        false
    }
    /// Whether bitmaps of `depth` bits per pixel can be written
    fn supports_export_depth(&self, _depth: u16) -> bool {
        false
    }
    /// Whether [`load`](Self::load) honours header only decoding
    fn supports_no_pixels(&self) -> bool {
        false
    }
}
