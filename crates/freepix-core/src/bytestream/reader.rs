/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Formatter;

use crate::bytestream::ByteReaderTrait;
use crate::errors::ErrorKind;

/// Enumeration of possible methods to seek within an I/O object.
///
/// It is analogous to the [SeekFrom](std::io::SeekFrom) in the std library but
/// it's here to allow this to work in no-std crates
#[derive(Copy, PartialEq, Eq, Clone, Debug)]
pub enum SeekFrom {
    /// Sets the offset to the provided number of bytes.
    Start(u64),

    /// Sets the offset to the size of this object plus the specified number of
    /// bytes.
    ///
    /// It is possible to seek beyond the end of an object, but it's an error to
    /// seek before byte 0.
    End(i64),

    /// Sets the offset to the current position plus the specified number of
    /// bytes.
    ///
    /// It is possible to seek beyond the end of an object, but it's an error to
    /// seek before byte 0.
    Current(i64)
}

impl SeekFrom {
    /// Convert to [SeekFrom](std::io::SeekFrom) from the `std::io` library
    ///
    /// This is only present when std feature is present
    #[cfg(feature = "std")]
    pub(crate) fn to_std_seek(self) -> std::io::SeekFrom {
        match self {
            SeekFrom::Start(pos) => std::io::SeekFrom::Start(pos),
            SeekFrom::End(pos) => std::io::SeekFrom::End(pos),
            SeekFrom::Current(pos) => std::io::SeekFrom::Current(pos)
        }
    }
}

/// Byte order of multi-byte fields in a container
///
/// Every header parser and serializer in the codecs goes through
/// [`ByteReader::get_u16_err`]/[`ByteWriter::write_u16_err`](crate::bytestream::ByteWriter::write_u16_err)
/// and their 32 bit siblings with one of these, so there is no host-endian
/// conditional code anywhere else.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ByteEndian {
    /// Little endian, BMP, PCX and GIF
    LE,
    /// Big endian, SGI
    BE
}

pub enum ByteIoError {
    #[cfg(feature = "std")]
    StdIoError(std::io::Error),
    TryFromIntError(core::num::TryFromIntError),
    // requested, read
    NotEnoughBytes(usize, usize),
    Generic(&'static str),
    SeekError(&'static str),
    SeekErrorOwned(String)
}

impl ByteIoError {
    /// Map this error into the shared error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            #[cfg(feature = "std")]
            ByteIoError::StdIoError(err) => {
                if err.kind() == std::io::ErrorKind::UnexpectedEof {
                    ErrorKind::TruncatedStream
                } else {
                    ErrorKind::CorruptStream
                }
            }
            ByteIoError::NotEnoughBytes(_, _) => ErrorKind::TruncatedStream,
            ByteIoError::SeekError(_) | ByteIoError::SeekErrorOwned(_) => {
                ErrorKind::TruncatedStream
            }
            ByteIoError::TryFromIntError(_) | ByteIoError::Generic(_) => ErrorKind::CorruptStream
        }
    }
}

impl core::fmt::Debug for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            #[cfg(feature = "std")]
            ByteIoError::StdIoError(err) => {
                writeln!(f, "Underlying I/O error {}", err)
            }
            ByteIoError::TryFromIntError(err) => {
                writeln!(f, "Cannot convert to int {}", err)
            }
            ByteIoError::NotEnoughBytes(expected, found) => {
                writeln!(f, "Not enough bytes, expected {expected} but found {found}")
            }
            ByteIoError::Generic(err) => {
                writeln!(f, "Generic I/O error: {err}")
            }
            ByteIoError::SeekError(err) => {
                writeln!(f, "Seek error: {err}")
            }
            ByteIoError::SeekErrorOwned(err) => {
                writeln!(f, "Seek error {err}")
            }
        }
    }
}

impl core::fmt::Display for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "{:?}", self)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ByteIoError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for ByteIoError {
    fn from(value: std::io::Error) -> Self {
        ByteIoError::StdIoError(value)
    }
}

impl From<core::num::TryFromIntError> for ByteIoError {
    fn from(value: core::num::TryFromIntError) -> Self {
        ByteIoError::TryFromIntError(value)
    }
}

impl From<&'static str> for ByteIoError {
    fn from(value: &'static str) -> Self {
        ByteIoError::Generic(value)
    }
}

/// An endian aware reader over any [`ByteReaderTrait`] source
pub struct ByteReader<T: ByteReaderTrait> {
    inner:       T,
    temp_buffer: Vec<u8>
}

impl<T: ByteReaderTrait> ByteReader<T> {
    pub fn new(source: T) -> ByteReader<T> {
        ByteReader {
            inner:       source,
            temp_buffer: vec![]
        }
    }
    #[inline(always)]
    pub fn skip(&mut self, num: usize) -> Result<u64, ByteIoError> {
        self.inner.io_seek(SeekFrom::Current(num as i64))
    }
    #[inline(always)]
    pub fn rewind(&mut self, num: usize) -> Result<u64, ByteIoError> {
        self.inner.io_seek(SeekFrom::Current(-(num as i64)))
    }
    #[inline(always)]
    pub fn seek(&mut self, from: SeekFrom) -> Result<u64, ByteIoError> {
        self.inner.io_seek(from)
    }
    #[inline(always)]
    pub fn get_u8_err(&mut self) -> Result<u8, ByteIoError> {
        let mut buf = [0];
        self.inner.read_exact_bytes(&mut buf)?;
        Ok(buf[0])
    }

    /// Look ahead position bytes and return a reference
    /// to num_bytes from that position, or an error if the
    /// peek would be out of bounds.
    ///
    /// This doesn't increment the position, bytes would have to be discarded
    /// at a later point.
    #[inline]
    pub fn peek_at(&mut self, position: usize, num_bytes: usize) -> Result<&[u8], ByteIoError> {
        // short circuit for zero
        // important since implementations like File will
        // cause a syscall on skip
        if position != 0 {
            // skip position bytes from start
            self.skip(position)?;
        }
        // resize buffer
        self.temp_buffer.resize(num_bytes, 0);
        // read bytes
        let result = self.inner.peek_exact_bytes(&mut self.temp_buffer[..]);
        // rewind back to where we were
        if position != 0 {
            self.rewind(position)?;
        }
        result?;
        Ok(&self.temp_buffer)
    }
    #[inline(always)]
    pub fn read_fixed_bytes_or_error<const N: usize>(&mut self) -> Result<[u8; N], ByteIoError> {
        let mut byte_store: [u8; N] = [0; N];
        self.inner.read_exact_bytes(&mut byte_store)?;
        Ok(byte_store)
    }

    #[inline]
    pub fn set_position(&mut self, position: u64) -> Result<(), ByteIoError> {
        self.seek(SeekFrom::Start(position))?;

        Ok(())
    }

    #[inline(always)]
    pub fn position(&mut self) -> Result<u64, ByteIoError> {
        self.inner.io_position()
    }

    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        self.inner.read_exact_bytes(buf)
    }
}

macro_rules! get_single_type {
    ($name:tt,$name2:tt,$name3:tt,$int_type:tt) => {
        impl<T:ByteReaderTrait> ByteReader<T>
        {
            #[doc=concat!("Read ",stringify!($int_type)," in the given byte order")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline(always)]
            pub fn $name(&mut self, endian: ByteEndian) -> Result<$int_type, ByteIoError>
            {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let mut space = [0; SIZE_OF_VAL];

                self.inner.read_exact_bytes(&mut space)?;

                match endian {
                    ByteEndian::BE => Ok($int_type::from_be_bytes(space)),
                    ByteEndian::LE => Ok($int_type::from_le_bytes(space))
                }
            }
            #[doc=concat!("Read ",stringify!($int_type)," as a big endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name2(&mut self) -> Result<$int_type, ByteIoError>
            {
                self.$name(ByteEndian::BE)
            }

            #[doc=concat!("Read ",stringify!($int_type)," as a little endian integer")]
            #[doc=concat!("Returning an error if the underlying buffer cannot support a ",stringify!($int_type)," read.")]
            #[inline]
            pub fn $name3(&mut self) -> Result<$int_type, ByteIoError>
            {
                self.$name(ByteEndian::LE)
            }
        }
    };
}

get_single_type!(get_u16_err, get_u16_be_err, get_u16_le_err, u16);
get_single_type!(get_u32_err, get_u32_be_err, get_u32_le_err, u32);
get_single_type!(get_i32_err, get_i32_be_err, get_i32_le_err, i32);

#[cfg(feature = "std")]
impl<T> std::io::Read for ByteReader<T>
where
    T: ByteReaderTrait
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        use std::io::ErrorKind;
        self.inner
            .read_bytes(buf)
            .map_err(|e| std::io::Error::new(ErrorKind::Other, format!("{:?}", e)))
    }
}
