/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Format registry for the freepix codecs
//!
//! A [`Registry`](registry::Registry) holds an ordered list of
//! [format plugins](plugin::FormatPlugin), finds the format of a stream
//! by asking each plugin in turn and dispatches loads and saves to the
//! plugin that owns the format.
//!
//! ```no_run
//! use freepix_core::options::{DecoderOptions, EncoderOptions};
//! use freepix_image::registry::Registry;
//!
//! let registry = Registry::new();
//! let bitmap = registry.load_path("input.pcx", DecoderOptions::default()).unwrap();
//! registry.save_path("output.bmp", &bitmap, EncoderOptions::default()).unwrap();
//! ```
//!
//! # Features
//! - `bmp`, `pcx`, `sgi`, `gif`: include the codec for that format.
//!    Disabled formats are not registered at all.
//! - `log`: route diagnostics and traces to the `log` crate
//! - `serde-support`: serialize format descriptors
//! - `rgb_order`: store 24/32 bit pixels as `R,G,B(,A)`

pub mod codecs;
pub mod errors;
pub mod messages;
pub mod plugin;
pub mod registry;
mod serde;
