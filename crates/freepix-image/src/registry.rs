/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The format registry
//!
//! An ordered list of plugins. Detection asks every enabled plugin in
//! registration order and the first one that recognises the stream wins,
//! so the registration order is part of the behaviour of the registry.
//!
//! Loads and saves never panic on bad input, a failure is returned to the
//! caller and one message describing it goes to the registry's
//! [`MessageSink`].
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use freepix_core::bitmap::Bitmap;
use freepix_core::bytestream::{ByteReaderTrait, ByteWriterTrait, SeekFrom};
use freepix_core::log::{trace, warn};
use freepix_core::options::{DecoderOptions, EncoderOptions};

use crate::codecs;
use crate::errors::ImageErrors;
use crate::messages::{LogSink, MessageSink};
use crate::plugin::{FormatDescriptor, FormatId, FormatPlugin, Page, PluginContext, Session};

struct PluginEntry {
    plugin:  Box<dyn FormatPlugin>,
    enabled: bool
}

/// An ordered set of format plugins
///
/// Registration needs `&mut self`, everything else works through a shared
/// reference so a fully set up registry can be used from many threads.
///
/// # Example
/// ```
/// use freepix_core::bytestream::ByteCursor;
/// use freepix_image::registry::Registry;
///
/// let registry = Registry::new();
/// let mut stream = ByteCursor::new(b"GIF89a");
/// let id = registry.detect(&mut stream).unwrap();
/// assert_eq!(registry.descriptor(id).unwrap().name, "GIF");
/// ```
pub struct Registry {
    plugins:  Vec<PluginEntry>,
    messages: Arc<dyn MessageSink>
}

impl Registry {
    /// A registry without any formats
    pub fn empty() -> Registry {
        Registry {
            plugins:  Vec::new(),
            messages: Arc::new(LogSink)
        }
    }

    /// A registry holding the built in formats
    ///
    /// Formats are registered in this order: BMP, JPEG, PCX, PNG, TIFF,
    /// GIF, SGI, J2K, JP2, RAW. Codecs whose cargo feature is disabled
    /// are left out.
    pub fn new() -> Registry {
        let mut registry = Registry::empty();

        #[cfg(feature = "bmp")]
        registry.register(codecs::bmp::BmpPlugin);
        registry.register(codecs::external::JPEG);
        #[cfg(feature = "pcx")]
        registry.register(codecs::pcx::PcxPlugin);
        registry.register(codecs::external::PNG);
        registry.register(codecs::external::TIFF);
        #[cfg(feature = "gif")]
        registry.register(codecs::gif::GifPlugin);
        #[cfg(feature = "sgi")]
        registry.register(codecs::sgi::SgiPlugin);
        registry.register(codecs::external::J2K);
        registry.register(codecs::external::JP2);
        registry.register(codecs::external::RAW);

        registry
    }

    /// Send diagnostics to `sink` instead of the log
    pub fn set_message_sink(&mut self, sink: Arc<dyn MessageSink>) {
        self.messages = sink;
    }

    /// Add a plugin after all existing ones
    pub fn register<P: FormatPlugin + 'static>(&mut self, plugin: P) -> FormatId {
        let id = FormatId(self.plugins.len());
        trace!("Registered {} as {}", plugin.descriptor().name, id.index());
        self.plugins.push(PluginEntry {
            plugin:  Box::new(plugin),
            enabled: true
        });
        id
    }

    /// Enable or disable a format, returning the previous state
    ///
    /// Disabled formats are skipped by detection and lookups and refuse
    /// to load or save.
    pub fn set_enabled(&mut self, id: FormatId, enabled: bool) -> Option<bool> {
        let entry = self.plugins.get_mut(id.0)?;
        let previous = entry.enabled;
        entry.enabled = enabled;
        Some(previous)
    }

    pub fn is_enabled(&self, id: FormatId) -> bool {
        self.plugins.get(id.0).is_some_and(|entry| entry.enabled)
    }

    /// Number of registered formats, enabled or not
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn descriptor(&self, id: FormatId) -> Option<&FormatDescriptor> {
        self.plugins.get(id.0).map(|entry| entry.plugin.descriptor())
    }

    pub fn can_load(&self, id: FormatId) -> bool {
        self.plugins.get(id.0).is_some_and(|entry| entry.plugin.can_load())
    }

    pub fn can_save(&self, id: FormatId) -> bool {
        self.plugins.get(id.0).is_some_and(|entry| entry.plugin.can_save())
    }

    pub fn supports_export_depth(&self, id: FormatId, depth: u16) -> bool {
        self.plugins
            .get(id.0)
            .is_some_and(|entry| entry.plugin.supports_export_depth(depth))
    }

    pub fn supports_no_pixels(&self, id: FormatId) -> bool {
        self.plugins
            .get(id.0)
            .is_some_and(|entry| entry.plugin.supports_no_pixels())
    }

    /// Ids of every registered format in registration order
    pub fn ids(&self) -> impl Iterator<Item = FormatId> {
        (0..self.plugins.len()).map(FormatId)
    }

    fn enabled(&self) -> impl Iterator<Item = (FormatId, &dyn FormatPlugin)> {
        self.plugins
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.enabled)
            .map(|(index, entry)| (FormatId(index), entry.plugin.as_ref()))
    }

    fn find(&self, predicate: impl Fn(&FormatDescriptor) -> bool) -> Option<FormatId> {
        self.enabled()
            .find(|(_, plugin)| predicate(plugin.descriptor()))
            .map(|(id, _)| id)
    }

    /// Find an enabled format by its short name, ignoring case
    pub fn find_by_name(&self, name: &str) -> Option<FormatId> {
        self.find(|descriptor| descriptor.name.eq_ignore_ascii_case(name))
    }

    /// Find an enabled format by extension, with or without the leading dot
    pub fn find_by_extension(&self, extension: &str) -> Option<FormatId> {
        let extension = extension.trim_start_matches('.');
        self.find(|descriptor| descriptor.has_extension(extension))
    }

    /// Find an enabled format from the extension of a file name
    ///
    /// A name without an extension is looked up as a format name, so
    /// `"gif"` and `"image.gif"` both find GIF.
    pub fn find_by_filename(&self, filename: &str) -> Option<FormatId> {
        match filename.rsplit_once('.') {
            Some((_, extension)) => self.find_by_extension(extension),
            None => self.find_by_name(filename)
        }
    }

    pub fn find_by_mime(&self, mime: &str) -> Option<FormatId> {
        self.find(|descriptor| descriptor.mime.eq_ignore_ascii_case(mime))
    }

    /// Identify the format of a stream
    ///
    /// Every enabled plugin is asked in registration order, with the stream
    /// rewound to where it was when `detect` was called. The first match wins,
    /// except that a TIFF match is checked again against RAW since many
    /// camera raw files carry a TIFF header.
    ///
    /// The stream position is restored before returning. Plugin errors are
    /// not reported, a stream nothing recognises is simply `None`.
    pub fn detect(&self, stream: &mut dyn ByteReaderTrait) -> Option<FormatId> {
        let start = stream.io_position().ok()?;

        let winner = self
            .enabled()
            .find(|(_, plugin)| validate_at(*plugin, stream, start))
            .map(|(id, _)| id);

        let result = match winner {
            Some(id) if self.is_named(id, codecs::external::TIFF.descriptor().name) => {
                let raw = self
                    .find_by_name(codecs::external::RAW.descriptor().name)
                    .filter(|raw| validate_at(self.plugins[raw.0].plugin.as_ref(), stream, start));
                Some(raw.unwrap_or(id))
            }
            other => other
        };

        if stream.io_seek(SeekFrom::Start(start)).is_err() {
            warn!("Could not restore stream position after detection");
        }
        result
    }

    fn is_named(&self, id: FormatId, name: &str) -> bool {
        self.descriptor(id)
            .is_some_and(|descriptor| descriptor.name == name)
    }

    fn plugin(&self, id: FormatId) -> Result<(&dyn FormatPlugin, PluginContext), ImageErrors> {
        let entry = self
            .plugins
            .get(id.0)
            .ok_or(ImageErrors::InvalidFormatId(id))?;
        let name = entry.plugin.descriptor().name;
        if !entry.enabled {
            return Err(ImageErrors::PluginDisabled(name));
        }
        Ok((entry.plugin.as_ref(), PluginContext { id, name }))
    }

    /// Send one diagnostic for a failed operation
    fn report<T>(&self, id: FormatId, result: Result<T, ImageErrors>) -> Result<T, ImageErrors> {
        if let Err(err) = &result {
            let text = format!("{:?}", err);
            self.messages.message(id, text.trim_end());
        }
        result
    }

    /// Decode one image from `stream` as format `id`
    ///
    /// The stream must be positioned at the start of the image.
    /// For multi page formats `page` picks the image, single image
    /// formats only have [`Page::Default`] (page zero).
    pub fn load(
        &self, id: FormatId, stream: &mut dyn ByteReaderTrait, page: Page, options: DecoderOptions
    ) -> Result<Bitmap, ImageErrors> {
        let result = self.load_inner(id, stream, page, options);
        self.report(id, result)
    }

    fn load_inner(
        &self, id: FormatId, stream: &mut dyn ByteReaderTrait, page: Page, options: DecoderOptions
    ) -> Result<Bitmap, ImageErrors> {
        let (plugin, ctx) = self.plugin(id)?;
        if !plugin.can_load() {
            return Err(ImageErrors::NoDecoder(ctx.name));
        }
        let start = stream.io_position()?;
        let mut session = plugin.open(&ctx, stream, &options)?;

        let result = load_page(plugin, &ctx, stream, start, page, options, session.as_mut());

        let closed = match session {
            Some(session) => plugin.close(&ctx, None, session),
            None => Ok(())
        };
        let bitmap = result?;
        closed?;
        Ok(bitmap)
    }

    /// Number of pages in `stream`
    pub fn page_count(
        &self, id: FormatId, stream: &mut dyn ByteReaderTrait, options: DecoderOptions
    ) -> Result<usize, ImageErrors> {
        // both steps report their own failures
        let pages = self.open_multipage(id, stream, options)?;
        let count = pages.page_count();
        pages.close()?;
        Ok(count)
    }

    /// Encode `bitmap` into `sink` as format `id`
    ///
    /// On failure the sink may hold a partial file.
    pub fn save(
        &self, id: FormatId, bitmap: &Bitmap, sink: &mut dyn ByteWriterTrait, options: EncoderOptions
    ) -> Result<(), ImageErrors> {
        let result = self.save_inner(id, bitmap, sink, options);
        self.report(id, result)
    }

    fn save_inner(
        &self, id: FormatId, bitmap: &Bitmap, sink: &mut dyn ByteWriterTrait, options: EncoderOptions
    ) -> Result<(), ImageErrors> {
        let (plugin, ctx) = self.plugin(id)?;
        check_exportable(plugin, &ctx, bitmap)?;

        let mut session = plugin.open_writer(&ctx)?;
        let result = plugin.save(&ctx, bitmap, &mut *sink, Page::Default, options, session.as_mut());

        let closed = match session {
            Some(session) => plugin.close(&ctx, Some(sink), session),
            None => Ok(())
        };
        result?;
        closed
    }

    /// Open a stream for page by page reading
    pub fn open_multipage<'a>(
        &'a self, id: FormatId, stream: &'a mut dyn ByteReaderTrait, options: DecoderOptions
    ) -> Result<MultiPage<'a>, ImageErrors> {
        let result = self.open_multipage_inner(id, stream, options);
        self.report(id, result)
    }

    fn open_multipage_inner<'a>(
        &'a self, id: FormatId, stream: &'a mut dyn ByteReaderTrait, options: DecoderOptions
    ) -> Result<MultiPage<'a>, ImageErrors> {
        let (plugin, ctx) = self.plugin(id)?;
        if !plugin.can_load() {
            return Err(ImageErrors::NoDecoder(ctx.name));
        }
        let start = stream.io_position()?;
        let session = plugin.open(&ctx, stream, &options)?;

        let pages = match plugin.page_count(&ctx, session.as_ref()) {
            Ok(pages) => pages,
            Err(err) => {
                if let Some(session) = session {
                    let _ = plugin.close(&ctx, None, session);
                }
                return Err(err);
            }
        };

        Ok(MultiPage {
            registry: self,
            plugin,
            ctx,
            stream,
            start,
            options,
            session,
            pages
        })
    }

    /// Start writing a file page by page
    pub fn open_multipage_writer<'a>(
        &'a self, id: FormatId, sink: &'a mut dyn ByteWriterTrait, options: EncoderOptions
    ) -> Result<MultiPageWriter<'a>, ImageErrors> {
        let result = self.plugin(id).and_then(|(plugin, ctx)| {
            if !plugin.can_save() {
                return Err(ImageErrors::NoEncoder(ctx.name));
            }
            let session = plugin.open_writer(&ctx)?;
            Ok(MultiPageWriter {
                registry: self,
                plugin,
                ctx,
                sink,
                options,
                session,
                pages: 0
            })
        });
        self.report(id, result)
    }

    /// Read an image from a file
    ///
    /// The format is detected from the file contents, falling back to the
    /// file extension when no plugin recognises them.
    pub fn load_path<P: AsRef<Path>>(
        &self, path: P, options: DecoderOptions
    ) -> Result<Bitmap, ImageErrors> {
        let path = path.as_ref();
        let mut stream = BufReader::new(File::open(path)?);

        let id = self
            .detect(&mut stream)
            .or_else(|| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| self.find_by_filename(name))
            })
            .ok_or(ImageErrors::UnknownFormat)?;

        self.load(id, &mut stream, Page::Default, options)
    }

    /// Write an image to a file, the format comes from the file extension
    pub fn save_path<P: AsRef<Path>>(
        &self, path: P, bitmap: &Bitmap, options: EncoderOptions
    ) -> Result<(), ImageErrors> {
        let path = path.as_ref();
        let id = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| self.find_by_filename(name))
            .ok_or(ImageErrors::UnknownFormat)?;

        let mut sink = BufWriter::new(File::create(path)?);
        self.save(id, bitmap, &mut sink, options)?;
        sink.flush()?;
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

fn validate_at(plugin: &dyn FormatPlugin, stream: &mut dyn ByteReaderTrait, start: u64) -> bool {
    if stream.io_seek(SeekFrom::Start(start)).is_err() {
        return false;
    }
    plugin.validate(stream)
}

fn check_exportable(
    plugin: &dyn FormatPlugin, ctx: &PluginContext, bitmap: &Bitmap
) -> Result<(), ImageErrors> {
    if !plugin.can_save() {
        return Err(ImageErrors::NoEncoder(ctx.name));
    }
    if bitmap.is_header_only() {
        return Err(ImageErrors::NoPixels(ctx.name));
    }
    let depth = bitmap.bits_per_pixel();
    if !plugin.supports_export_depth(depth) {
        return Err(ImageErrors::UnsupportedExportDepth(ctx.name, depth));
    }
    Ok(())
}

/// Rewind to the start of the resource and decode one page
fn load_page(
    plugin: &dyn FormatPlugin, ctx: &PluginContext, stream: &mut dyn ByteReaderTrait, start: u64,
    page: Page, options: DecoderOptions, session: Option<&mut Session>
) -> Result<Bitmap, ImageErrors> {
    let pages = plugin.page_count(ctx, session.as_deref())?;
    if page.index() >= pages {
        return Err(ImageErrors::PageOutOfRange(page.index(), pages));
    }
    stream.io_seek(SeekFrom::Start(start))?;
    plugin.load(ctx, stream, page, options, session)
}

/// A stream opened for reading individual pages
///
/// The plugin session is closed by [`close`](Self::close) or when the
/// value is dropped.
pub struct MultiPage<'a> {
    registry: &'a Registry,
    plugin:   &'a dyn FormatPlugin,
    ctx:      PluginContext,
    stream:   &'a mut dyn ByteReaderTrait,
    start:    u64,
    options:  DecoderOptions,
    session:  Option<Session>,
    pages:    usize
}

impl<'a> MultiPage<'a> {
    pub const fn format(&self) -> FormatId {
        self.ctx.id
    }

    pub const fn page_count(&self) -> usize {
        self.pages
    }

    /// Decode page `page`
    pub fn load(&mut self, page: usize) -> Result<Bitmap, ImageErrors> {
        let result = load_page(
            self.plugin,
            &self.ctx,
            &mut *self.stream,
            self.start,
            Page::Index(page),
            self.options,
            self.session.as_mut()
        );
        self.registry.report(self.ctx.id, result)
    }

    /// Release the plugin session
    pub fn close(mut self) -> Result<(), ImageErrors> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ImageErrors> {
        match self.session.take() {
            Some(session) => {
                let result = self.plugin.close(&self.ctx, None, session);
                self.registry.report(self.ctx.id, result)
            }
            None => Ok(())
        }
    }
}

impl Drop for MultiPage<'_> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

/// A file being written page by page
///
/// Formats that hold a single image accept one page. The file is finished
/// by [`close`](Self::close) or when the value is dropped.
pub struct MultiPageWriter<'a> {
    registry: &'a Registry,
    plugin:   &'a dyn FormatPlugin,
    ctx:      PluginContext,
    sink:     &'a mut dyn ByteWriterTrait,
    options:  EncoderOptions,
    session:  Option<Session>,
    pages:    usize
}

impl<'a> MultiPageWriter<'a> {
    pub const fn format(&self) -> FormatId {
        self.ctx.id
    }

    /// Pages written so far
    pub const fn pages_written(&self) -> usize {
        self.pages
    }

    /// Write `bitmap` as the next page
    pub fn add_page(&mut self, bitmap: &Bitmap) -> Result<(), ImageErrors> {
        let result = self.add_page_inner(bitmap);
        self.registry.report(self.ctx.id, result)
    }

    fn add_page_inner(&mut self, bitmap: &Bitmap) -> Result<(), ImageErrors> {
        check_exportable(self.plugin, &self.ctx, bitmap)?;
        if self.session.is_none() && self.pages > 0 {
            return Err(ImageErrors::PageOutOfRange(self.pages, 1));
        }
        self.plugin.save(
            &self.ctx,
            bitmap,
            &mut *self.sink,
            Page::Index(self.pages),
            self.options,
            self.session.as_mut()
        )?;
        self.pages += 1;
        Ok(())
    }

    /// Finish the file
    pub fn close(mut self) -> Result<(), ImageErrors> {
        self.release()
    }

    fn release(&mut self) -> Result<(), ImageErrors> {
        match self.session.take() {
            Some(session) => {
                let result = self.plugin.close(&self.ctx, Some(&mut *self.sink), session);
                let result = result.and_then(|_| Ok(self.sink.flush_bytes()?));
                self.registry.report(self.ctx.id, result)
            }
            None => Ok(self.sink.flush_bytes()?)
        }
    }
}

impl Drop for MultiPageWriter<'_> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}

#[cfg(all(test, feature = "image_formats"))]
mod tests {
    use std::sync::Arc;

    use freepix_core::bitmap::Bitmap;
    use freepix_core::bytestream::{ByteCursor, ByteReaderTrait};
    use freepix_core::errors::ErrorKind;
    use freepix_core::options::{DecoderOptions, EncoderOptions};

    use super::Registry;
    use crate::codecs::external::SignatureFormat;
    use crate::messages::CollectingSink;
    use crate::plugin::{FormatDescriptor, Page};

    const AB: &[&[u8]] = &[b"AB"];

    const fn descriptor(name: &'static str) -> FormatDescriptor {
        FormatDescriptor {
            name,
            description: name,
            extensions: "x",
            mime: "application/octet-stream",
            signature: None
        }
    }

    fn registry_with_sink() -> (Registry, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let mut registry = Registry::new();
        registry.set_message_sink(sink.clone());
        (registry, sink)
    }

    #[test]
    fn colliding_signatures_go_to_the_first_registered() {
        let mut registry = Registry::empty();
        let first = registry.register(SignatureFormat::new(descriptor("first"), AB));
        let second = registry.register(SignatureFormat::new(descriptor("second"), AB));

        let mut stream = ByteCursor::new(b"AB and more");
        assert_eq!(registry.detect(&mut stream), Some(first));

        registry.set_enabled(first, false);
        assert_eq!(registry.detect(&mut stream), Some(second));
    }

    #[test]
    fn camera_raw_wins_over_its_container() {
        let registry = Registry::new();
        let mut cr2 = ByteCursor::new(b"II*\0\x10\0\0\0CR\x02\0".as_slice());
        let mut tiff = ByteCursor::new(b"II*\0\x08\0\0\0\0\0\0\0".as_slice());

        assert_eq!(registry.detect(&mut cr2), registry.find_by_name("raw"));
        assert_eq!(registry.detect(&mut tiff), registry.find_by_name("tiff"));
    }

    #[test]
    fn disabled_raw_leaves_tiff() {
        let mut registry = Registry::new();
        let raw = registry.find_by_name("RAW").unwrap();
        registry.set_enabled(raw, false);

        let mut cr2 = ByteCursor::new(b"II*\0\x10\0\0\0CR\x02\0".as_slice());
        assert_eq!(registry.detect(&mut cr2), registry.find_by_name("TIFF"));
    }

    #[test]
    fn detection_restores_the_position() {
        let registry = Registry::new();
        let mut data = b"junk".to_vec();
        data.extend_from_slice(b"GIF89a");
        let mut stream = ByteCursor::new(data);
        stream.read_exact_bytes(&mut [0; 4]).unwrap();

        let id = registry.detect(&mut stream);
        assert_eq!(id, registry.find_by_name("GIF"));
        assert_eq!(stream.io_position().unwrap(), 4);

        let mut unknown = ByteCursor::new(b"nothing known here");
        assert_eq!(registry.detect(&mut unknown), None);
        assert_eq!(unknown.io_position().unwrap(), 0);
    }

    #[test]
    fn lookups() {
        let registry = Registry::new();
        let gif = registry.find_by_name("GIF");
        assert!(gif.is_some());
        assert_eq!(registry.find_by_extension(".GIF"), gif);
        assert_eq!(registry.find_by_filename("dir/anim.gif"), gif);
        assert_eq!(registry.find_by_filename("gif"), gif);
        assert_eq!(registry.find_by_mime("image/gif"), gif);
        assert_eq!(registry.find_by_extension("rgb"), registry.find_by_name("sgi"));
        assert_eq!(registry.find_by_extension("nope"), None);
    }

    #[test]
    fn failed_load_reports_once() {
        let (registry, sink) = registry_with_sink();
        let bmp = registry.find_by_name("BMP").unwrap();

        let mut stream = ByteCursor::new(b"BM\x10\0".as_slice());
        let err = registry
            .load(bmp, &mut stream, Page::Default, DecoderOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedStream);

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, bmp);
    }

    #[test]
    fn detection_only_formats_cannot_load() {
        let (registry, sink) = registry_with_sink();
        let png = registry.find_by_name("PNG").unwrap();
        let mut stream = ByteCursor::new(b"\x89PNG\r\n\x1a\n".as_slice());

        assert_eq!(registry.detect(&mut stream), Some(png));
        let err = registry
            .load(png, &mut stream, Page::Default, DecoderOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn unsupported_depth_is_refused_before_writing() {
        let (registry, sink) = registry_with_sink();
        let sgi = registry.find_by_name("SGI").unwrap();
        let bitmap = Bitmap::allocate(4, 4, 1).unwrap();

        let mut out = vec![];
        let err = registry
            .save(sgi, &bitmap, &mut out, EncoderOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedVariant);
        assert!(out.is_empty());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn single_image_formats_have_one_page() {
        let (registry, sink) = registry_with_sink();
        let bmp = registry.find_by_name("BMP").unwrap();
        let mut bitmap = Bitmap::allocate(3, 2, 8).unwrap();
        bitmap.set_grayscale_palette();

        let mut out = vec![];
        registry
            .save(bmp, &bitmap, &mut out, EncoderOptions::default())
            .unwrap();

        let mut stream = ByteCursor::new(out);
        let count = registry
            .page_count(bmp, &mut stream, DecoderOptions::default())
            .unwrap();
        assert_eq!(count, 1);

        assert!(registry
            .load(bmp, &mut stream, Page::Index(1), DecoderOptions::default())
            .is_err());
        assert_eq!(sink.len(), 1);

        let decoded = registry
            .load(bmp, &mut stream, Page::Default, DecoderOptions::default())
            .unwrap();
        assert!(decoded.same_pixels(&bitmap));
    }

    #[test]
    fn multipage_gif_round_trip() {
        let registry = Registry::new();
        let gif = registry.find_by_name("GIF").unwrap();

        let frames: Vec<Bitmap> = (0..3_u8)
            .map(|i| {
                let mut frame = Bitmap::allocate(5, 4, 8).unwrap();
                frame.set_grayscale_palette();
                for y in 0..4 {
                    frame.row_mut(y).unwrap()[..5].fill(i * 40 + y as u8);
                }
                frame
            })
            .collect();

        let mut out = vec![];
        {
            let mut writer = registry
                .open_multipage_writer(gif, &mut out, EncoderOptions::default())
                .unwrap();
            for frame in &frames {
                writer.add_page(frame).unwrap();
            }
            assert_eq!(writer.pages_written(), 3);
            writer.close().unwrap();
        }
        assert_eq!(out.last(), Some(&0x3B));

        let mut stream = ByteCursor::new(out);
        assert_eq!(registry.detect(&mut stream), Some(gif));

        let mut pages = registry
            .open_multipage(gif, &mut stream, DecoderOptions::default())
            .unwrap();
        assert_eq!(pages.page_count(), 3);
        // out of order on purpose
        for page in [2, 0, 1] {
            let decoded = pages.load(page).unwrap();
            assert!(decoded.same_pixels(&frames[page]), "page {page}");
        }
        assert!(pages.load(3).is_err());
        pages.close().unwrap();
    }

    #[test]
    fn dropped_writer_finishes_the_file() {
        let registry = Registry::new();
        let gif = registry.find_by_name("GIF").unwrap();
        let mut frame = Bitmap::allocate(2, 2, 1).unwrap();
        frame.set_grayscale_palette();

        let mut out = vec![];
        {
            let mut writer = registry
                .open_multipage_writer(gif, &mut out, EncoderOptions::default())
                .unwrap();
            writer.add_page(&frame).unwrap();
        }
        assert_eq!(&out[..6], b"GIF89a");
        assert_eq!(out.last(), Some(&0x3B));
    }
}
