/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Core routines shared by all freepix codecs
//!
//! This crate provides the pieces every decoder and encoder
//! in the `freepix` family agrees on.
//!
//! It currently contains
//!
//! - A bytestream reader and writer with endian aware reads and writes,
//!   backed uniformly by in-memory buffers or files
//! - The [`Bitmap`](crate::bitmap::Bitmap) container all codecs decode into and encode from
//! - The single channel order convention used for 24 and 32 bit pixels
//! - Shared run-length cursor used by run-length coded formats
//! - Decoder and encoder options
//! - The error taxonomy codecs map their errors into
//!
//! This library is `#[no_std]` with `alloc` feature needed for defining `Vec`
//! which we need for storing decoded  bytes.
//!
//!
//! # Features
//!  - `std`: Enables readers and writers over `std::io` types.
//!
//!  - `log`: Routes the crate's log macros to the `log` crate.
//!
//!  - `serde`: Enables serializing of some of the data structures
//!     present in the crate
//!
//!  - `rgb_order`: Store 24/32 bit pixels as `R,G,B(,A)` instead of the default `B,G,R(,A)`
#![cfg_attr(not(feature = "std"), no_std)]
#![macro_use]
extern crate alloc;

pub mod bitmap;
pub mod bytestream;
pub mod errors;
pub mod log;
pub mod options;
pub mod pixel;
pub mod rle;
pub mod serde;
