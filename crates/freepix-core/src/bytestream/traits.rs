/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Traits for reading and writing images in freepix
//!
//!
//! This exposes the traits and implementations for readers
//! and writers in the freepix family of decoders and encoders.
//!
//! Both traits are object safe, the registry hands plugins a
//! `&mut dyn ByteReaderTrait` and codecs stay generic through the
//! blanket `&mut T` implementations below.
use alloc::vec::Vec;

use crate::bytestream::reader::{ByteIoError, SeekFrom};

/// The de-facto Input trait implemented for readers.
///
/// This provides the basic functions needed to quick and sometimes
/// heap free I/O for the freepix decoders with easy support for extending it
/// to multiple implementations.
///
/// # Considerations
///
/// If you have an in memory buffer, prefer [`ByteCursor`](crate::bytestream::ByteCursor) over [`Cursor`](std::io::Cursor).
pub trait ByteReaderTrait {
    /// Read exact bytes required to fill `buf` or return an error if that isn't possible
    ///
    /// ## Arguments
    ///  - `buf`: Buffer to fill with bytes from the underlying reader
    ///  ## Errors
    /// In case of an error, the implementation should not increment the internal position
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError>;

    /// Read bytes into `buf` returning how many bytes you have read or an error if one occurred
    ///
    /// This doesn't guarantee that buf will be filled with bytes for such a guarantee see
    /// [`read_exact_bytes`](Self::read_exact_bytes)
    ///
    /// ## Returns
    ///  - `Ok(usize)` - Actual bytes read into the buffer
    ///  - `Err()` - The error encountered when reading bytes for which we couldn't recover
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, ByteIoError>;
    /// Reads data into provided buffer but does not advance read position.
    fn peek_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError>;
    /// Seek into a new position from the buffer
    ///
    /// This is similar to the [seek](std::io::Seek::seek) function in the [Seek](std::io::Seek) trait
    /// but implemented to work for no-std environments
    fn io_seek(&mut self, from: SeekFrom) -> Result<u64, ByteIoError>;

    /// Return the current position of the inner cursor.
    ///
    /// This can be used to check the advancement of the cursor
    fn io_position(&mut self) -> Result<u64, ByteIoError>;
}

/// The writer trait implemented for freepix encoders
///
/// Anything that implements this trait can be used as a sink
/// for writing encoded images
pub trait ByteWriterTrait {
    /// Write some bytes into the sink returning number of bytes written or
    /// an error if something bad happened
    ///
    /// An implementation is free to write less bytes that are in buf, so the bytes written
    /// cannot be guaranteed to be fully written
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError>;
    /// Write all bytes to the buffer or return an error if something occurred
    ///
    /// This will always write all bytes, if it can't fully write all bytes, it will
    /// error out
    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError>;
    /// Ensure bytes are written to the sink.
    ///
    /// Implementations should treat this like linux `fsync`
    fn flush_bytes(&mut self) -> Result<(), ByteIoError>;
    /// A hint to tell the implementation how big of a size we expect the image to be
    /// An implementation like in memory `Vec` can use this to reserve additional memory to
    /// prevent reallocation when encoding
    ///
    /// This is just a hint, akin to calling `Vec::reserve` and should be treated as such.
    /// If your implementation doesn't support such, e.g file or mutable slices, it's okay to return
    /// `Ok(())`
    fn reserve_capacity(&mut self, size: usize) -> Result<(), ByteIoError>;
}

impl<T: ByteReaderTrait + ?Sized> ByteReaderTrait for &mut T {
    #[inline(always)]
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        (**self).read_exact_bytes(buf)
    }
    #[inline(always)]
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, ByteIoError> {
        (**self).read_bytes(buf)
    }
    #[inline(always)]
    fn peek_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        (**self).peek_exact_bytes(buf)
    }
    #[inline(always)]
    fn io_seek(&mut self, from: SeekFrom) -> Result<u64, ByteIoError> {
        (**self).io_seek(from)
    }
    #[inline(always)]
    fn io_position(&mut self) -> Result<u64, ByteIoError> {
        (**self).io_position()
    }
}

impl<T: ByteWriterTrait + ?Sized> ByteWriterTrait for &mut T {
    #[inline(always)]
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        (**self).write_bytes(buf)
    }
    #[inline(always)]
    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        (**self).write_all_bytes(buf)
    }
    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        (**self).flush_bytes()
    }
    fn reserve_capacity(&mut self, size: usize) -> Result<(), ByteIoError> {
        (**self).reserve_capacity(size)
    }
}

impl ByteWriterTrait for Vec<u8> {
    #[inline(always)]
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }
    #[inline(always)]
    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        self.extend_from_slice(buf);
        Ok(())
    }
    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        // no need to do anything
        Ok(())
    }
    fn reserve_capacity(&mut self, size: usize) -> Result<(), ByteIoError> {
        self.try_reserve(size)
            .map_err(|_| ByteIoError::Generic("Cannot reserve capacity for output"))
    }
}
