/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use crate::bytestream::{ByteEndian, ByteIoError, ByteWriterTrait};

/// Encapsulates a simple Byte writer with
/// support for Endian aware writes
pub struct ByteWriter<T: ByteWriterTrait> {
    buffer:        T,
    bytes_written: usize
}

impl<T: ByteWriterTrait> ByteWriter<T> {
    /// Create a new writer for the stream
    pub fn new(data: T) -> ByteWriter<T> {
        ByteWriter {
            buffer:        data,
            bytes_written: 0
        }
    }
    /// Return the number of bytes the writer has written
    pub const fn bytes_written(&self) -> usize {
        self.bytes_written
    }
    /// Destroy this writer returning the sink it wrapped
    pub fn consume(self) -> T {
        self.buffer
    }
    /// Write all bytes or error out
    pub fn write_all(&mut self, buf: &[u8]) -> Result<(), ByteIoError> {
        self.buffer.write_all_bytes(buf)?;
        self.bytes_written += buf.len();
        Ok(())
    }
    /// Write a single byte into the bytestream or error out
    /// if the sink refused it
    pub fn write_u8_err(&mut self, byte: u8) -> Result<(), ByteIoError> {
        self.write_all(&[byte])
    }
    pub fn reserve(&mut self, additional: usize) -> Result<(), ByteIoError> {
        self.buffer.reserve_capacity(additional)
    }
    pub fn flush(&mut self) -> Result<(), ByteIoError> {
        self.buffer.flush_bytes()
    }
}

macro_rules! write_single_type {
    ($name:tt,$name2:tt,$name3:tt,$int_type:tt) => {
        impl<T:ByteWriterTrait> ByteWriter<T>
        {
            #[doc=concat!("Write ",stringify!($int_type)," in the given byte order")]
            #[inline(always)]
            pub fn $name(&mut self, value: $int_type, endian: ByteEndian) -> Result<(), ByteIoError>
            {
                let bytes = match endian {
                    ByteEndian::BE => value.to_be_bytes(),
                    ByteEndian::LE => value.to_le_bytes()
                };
                self.write_all(&bytes)
            }
            #[doc=concat!("Write ",stringify!($int_type)," as a big endian integer")]
            #[inline]
            pub fn $name2(&mut self, value: $int_type) -> Result<(), ByteIoError>
            {
                self.$name(value, ByteEndian::BE)
            }
            #[doc=concat!("Write ",stringify!($int_type)," as a little endian integer")]
            #[inline]
            pub fn $name3(&mut self, value: $int_type) -> Result<(), ByteIoError>
            {
                self.$name(value, ByteEndian::LE)
            }
        }
    };
}

write_single_type!(write_u16_err, write_u16_be_err, write_u16_le_err, u16);
write_single_type!(write_u32_err, write_u32_be_err, write_u32_le_err, u32);
write_single_type!(write_i32_err, write_i32_be_err, write_i32_le_err, i32);

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use crate::bytestream::{ByteCursor, ByteEndian, ByteReader, ByteWriter};

    #[test]
    fn endian_writes_match_reads() {
        let mut writer = ByteWriter::new(Vec::new());
        writer.write_u16_err(474, ByteEndian::BE).unwrap();
        writer.write_u32_le_err(0xDEAD_BEEF).unwrap();
        writer.write_i32_le_err(-2).unwrap();
        assert_eq!(writer.bytes_written(), 10);

        let bytes = writer.consume();
        assert_eq!(&bytes[..2], &[0x01, 0xDA]);

        let mut reader = ByteReader::new(ByteCursor::new(bytes));
        assert_eq!(reader.get_u16_be_err().unwrap(), 474);
        assert_eq!(reader.get_u32_err(ByteEndian::LE).unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.get_i32_le_err().unwrap(), -2);
    }
}
