/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Stream abstraction used by all codecs
//!
//! Codecs read through [`ByteReader`] and write through [`ByteWriter`], both generic over
//! the object safe [`ByteReaderTrait`] and [`ByteWriterTrait`]. An in-memory buffer
//! ([`ByteCursor`], `Vec<u8>`) and a file (with the `std` feature) present the same
//! read/write/seek/tell surface, so a codec never knows which one it was handed.
pub use cursor::ByteCursor;
pub use reader::{ByteEndian, ByteIoError, ByteReader, SeekFrom};
pub use traits::{ByteReaderTrait, ByteWriterTrait};
pub use writer::ByteWriter;

mod cursor;
mod reader;
mod std_io;
mod traits;
mod writer;
