/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use crate::bytestream::{ByteIoError, ByteReaderTrait, SeekFrom};

/// An in-memory reader
///
/// Works in `no_std` and is the fastest source the decoders
/// can be handed.
pub struct ByteCursor<T: AsRef<[u8]>> {
    stream:   T,
    position: usize
}

impl<T: AsRef<[u8]>> ByteCursor<T> {
    pub fn new(buffer: T) -> ByteCursor<T> {
        ByteCursor {
            stream:   buffer,
            position: 0
        }
    }
    /// Return the wrapped buffer
    pub fn into_inner(self) -> T {
        self.stream
    }
}

impl<T: AsRef<[u8]>> ByteCursor<T> {
    #[inline]
    fn skip(&mut self, num: usize) {
        // Can this overflow ??
        self.position = self.position.wrapping_add(num);
    }
    #[inline]
    fn rewind(&mut self, num: usize) {
        self.position = self.position.saturating_sub(num);
    }
}

impl<T: AsRef<[u8]>> ByteReaderTrait for ByteCursor<T> {
    #[inline(always)]
    fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        let stream = self.stream.as_ref();
        let start = core::cmp::min(self.position, stream.len());
        let end = core::cmp::min(start.saturating_add(buf.len()), stream.len());

        if end - start != buf.len() {
            // not all bytes can be read, do not move
            return Err(ByteIoError::NotEnoughBytes(buf.len(), end - start));
        }
        buf.copy_from_slice(&stream[start..end]);
        self.skip(buf.len());
        Ok(())
    }
    #[inline(always)]
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<usize, ByteIoError> {
        let stream = self.stream.as_ref();
        let start = core::cmp::min(self.position, stream.len());
        let end = core::cmp::min(start.saturating_add(buf.len()), stream.len());

        let slice = &stream[start..end];
        buf[..slice.len()].copy_from_slice(slice);

        self.skip(end - start);

        Ok(end - start)
    }

    #[inline(always)]
    fn peek_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        self.read_exact_bytes(buf)?;
        self.rewind(buf.len());
        Ok(())
    }

    #[inline(always)]
    fn io_seek(&mut self, from: SeekFrom) -> Result<u64, ByteIoError> {
        let new_position = match from {
            SeekFrom::Start(position) => i64::try_from(position)?,
            SeekFrom::End(position) => {
                let end = i64::try_from(self.stream.as_ref().len())?;
                end + position
            }
            SeekFrom::Current(position) => i64::try_from(self.position)? + position
        };
        if new_position < 0 {
            return Err(ByteIoError::SeekError("Seek before start of buffer"));
        }
        self.position = usize::try_from(new_position)?;
        Ok(self.position as u64)
    }

    #[inline(always)]
    fn io_position(&mut self) -> Result<u64, ByteIoError> {
        Ok(self.position as u64)
    }
}

#[cfg(test)]
mod tests {
    use crate::bytestream::{ByteCursor, ByteReader, SeekFrom};

    #[test]
    fn short_read_keeps_position() {
        let mut reader = ByteReader::new(ByteCursor::new([1_u8, 2, 3]));
        assert!(reader.get_u32_le_err().is_err());
        assert_eq!(reader.position().unwrap(), 0);
        assert_eq!(reader.get_u16_le_err().unwrap(), 0x0201);
    }

    #[test]
    fn seek_before_start_is_error() {
        let mut reader = ByteReader::new(ByteCursor::new([0_u8; 4]));
        assert!(reader.seek(SeekFrom::Current(-1)).is_err());
        assert_eq!(reader.seek(SeekFrom::End(-1)).unwrap(), 3);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut reader = ByteReader::new(ByteCursor::new(*b"GIF89a"));
        assert_eq!(reader.peek_at(3, 3).unwrap(), b"89a");
        assert_eq!(reader.position().unwrap(), 0);
    }
}
