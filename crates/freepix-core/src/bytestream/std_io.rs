/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
#![cfg(feature = "std")]
//! File and `std::io` backed streams
//!
//! These give files the same surface as [`ByteCursor`](crate::bytestream::ByteCursor)
//! and `Vec<u8>`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};

use crate::bytestream::{ByteIoError, ByteReaderTrait, ByteWriterTrait, SeekFrom};

impl<T> ByteReaderTrait for Cursor<T>
where
    T: AsRef<[u8]>
{
    #[inline(always)]
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        let start = self.position();
        self.read_exact(buf).map_err(|e| {
            // keep the position unchanged on failure
            self.set_position(start);
            ByteIoError::from(e)
        })
    }

    #[inline(always)]
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, ByteIoError> {
        self.read(buf).map_err(ByteIoError::from)
    }

    #[inline(always)]
    fn peek_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        let start = self.position();
        self.read_exact_bytes(buf)?;
        self.set_position(start);
        Ok(())
    }

    #[inline(always)]
    fn io_seek(&mut self, from: SeekFrom) -> Result<u64, ByteIoError> {
        self.seek(from.to_std_seek()).map_err(ByteIoError::from)
    }

    fn io_position(&mut self) -> Result<u64, ByteIoError> {
        Ok(self.position())
    }
}

impl<T: Read + Seek> ByteReaderTrait for BufReader<T> {
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        let start = self.stream_position()?;
        if let Err(e) = self.read_exact(buf) {
            self.seek(std::io::SeekFrom::Start(start))?;
            return Err(ByteIoError::from(e));
        }
        Ok(())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, ByteIoError> {
        self.read(buf).map_err(ByteIoError::from)
    }

    #[inline]
    fn peek_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        // first read bytes to the buffer
        self.read_exact_bytes(buf)?;
        let converted = -i64::try_from(buf.len()).map_err(ByteIoError::from)?;
        self.seek_relative(converted).map_err(ByteIoError::from)?;

        Ok(())
    }

    fn io_seek(&mut self, from: SeekFrom) -> Result<u64, ByteIoError> {
        self.seek(from.to_std_seek()).map_err(ByteIoError::from)
    }

    fn io_position(&mut self) -> Result<u64, ByteIoError> {
        self.stream_position().map_err(ByteIoError::from)
    }
}

impl<W: Write> ByteWriterTrait for BufWriter<W> {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        self.write(buf).map_err(ByteIoError::StdIoError)
    }

    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        self.write_all(buf).map_err(ByteIoError::StdIoError)
    }

    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        self.flush().map_err(ByteIoError::StdIoError)
    }
    fn reserve_capacity(&mut self, _: usize) -> Result<(), ByteIoError> {
        Ok(())
    }
}

impl ByteWriterTrait for File {
    fn write_bytes(&mut self, buf: &[u8]) -> Result<usize, ByteIoError> {
        self.write(buf).map_err(ByteIoError::StdIoError)
    }

    fn write_all_bytes(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        self.write_all(buf).map_err(ByteIoError::StdIoError)
    }

    fn flush_bytes(&mut self) -> Result<(), ByteIoError> {
        self.sync_data().map_err(ByteIoError::StdIoError)
    }
    fn reserve_capacity(&mut self, _: usize) -> Result<(), ByteIoError> {
        Ok(())
    }
}
