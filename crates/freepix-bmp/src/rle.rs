/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! BMP run-length coding
//!
//! Both RLE8 and RLE4 read pairs of bytes:
//!
//! * If the first byte is **non-zero** it's the number of times that the second
//!   byte appears in the output. For RLE4 the second byte holds two pixels that
//!   alternate, high nibble first.
//! * If the first byte is **zero**, the second byte is an escape:
//!   * 0: end of line
//!   * 1: end of bitmap
//!   * 2: "Delta", the *next* two bytes are unsigned offsets to the
//!     right and up of where the output should move to
//!   * 3+: "Absolute", the second byte is a count of pixels stored verbatim.
//!     Absolute spans are padded to an even number of bytes.
//!
//! Rows are produced bottom up. Runs and spans are clipped to the row they start in,
//! excess bytes of an absolute span are consumed and dropped.
use alloc::vec::Vec;

use freepix_core::bitmap::{Bitmap, ScanOrder};
use freepix_core::bytestream::{ByteReader, ByteReaderTrait};
use freepix_core::log::trace;
use freepix_core::rle::{copy_literal, fill_run, put_nibble, RunCursor};

use crate::errors::BmpDecoderErrors;

const RLE_COMMAND: u8 = 0;
const RLE_END_OF_LINE: u8 = 0;
const RLE_END_OF_BITMAP: u8 = 1;
const RLE_DELTA: u8 = 2;

/// Longest run or absolute span a single count byte can carry in the encoder
const MAX_RUN: usize = 254;

/// Logical row for the `stream_row`th row of a bottom up stream
fn target_row(bitmap: &Bitmap, stream_row: usize) -> usize {
    match bitmap.scan_order() {
        ScanOrder::BottomUp => stream_row,
        ScanOrder::TopDown => bitmap.height() - 1 - stream_row
    }
}

#[inline]
fn rle_u8<T: ByteReaderTrait>(
    stream: &mut ByteReader<T>, cursor: &RunCursor
) -> Result<u8, BmpDecoderErrors> {
    stream
        .get_u8_err()
        .map_err(|_| BmpDecoderErrors::TruncatedRle(cursor.row()))
}

/// Read the next command pair, `None` when the stream ended after the last row
fn next_pair<T: ByteReaderTrait>(
    stream: &mut ByteReader<T>, cursor: &RunCursor
) -> Result<Option<(u8, u8)>, BmpDecoderErrors> {
    let first = match stream.get_u8_err() {
        Ok(byte) => byte,
        Err(_) if cursor.is_finished() => return Ok(None),
        Err(_) => return Err(BmpDecoderErrors::TruncatedRle(cursor.row()))
    };
    let second = rle_u8(stream, cursor)?;
    Ok(Some((first, second)))
}

/// Handle the escapes shared by RLE8 and RLE4
///
/// Returns `Some(true)` to keep going, `Some(false)` to stop and
/// `None` if the escape is an absolute span
fn handle_escape<T: ByteReaderTrait>(
    stream: &mut ByteReader<T>, cursor: &mut RunCursor, escape: u8
) -> Result<Option<bool>, BmpDecoderErrors> {
    match escape {
        RLE_END_OF_LINE => {
            cursor.next_row();
            Ok(Some(true))
        }
        RLE_END_OF_BITMAP => Ok(Some(false)),
        RLE_DELTA => {
            let dx = rle_u8(stream, cursor)?;
            let dy = rle_u8(stream, cursor)?;

            if !cursor.skip(usize::from(dx), usize::from(dy)) {
                trace!("RLE delta ({dx},{dy}) left the bitmap, stopping");
                return Ok(Some(false));
            }
            Ok(Some(true))
        }
        _ => Ok(None)
    }
}

/// Decode RLE8 data into an 8 bit bitmap
pub(crate) fn decode_rle8<T: ByteReaderTrait>(
    stream: &mut ByteReader<T>, bitmap: &mut Bitmap
) -> Result<(), BmpDecoderErrors> {
    let mut cursor = RunCursor::new(bitmap.width(), bitmap.height());
    let mut literal = [0_u8; 256];

    while let Some((count, value)) = next_pair(stream, &cursor)? {
        if count == RLE_COMMAND {
            match handle_escape(stream, &mut cursor, value)? {
                Some(true) => continue,
                Some(false) => break,
                None => ()
            }
            // absolute span, padded to a word
            let span = usize::from(value);
            let padded = span + (span & 1);

            stream
                .read_exact_bytes(&mut literal[..padded])
                .map_err(|_| BmpDecoderErrors::TruncatedRle(cursor.row()))?;

            if cursor.is_finished() {
                break;
            }
            let y = target_row(bitmap, cursor.row());
            let (start, clipped) = (cursor.column(), cursor.clip(span));

            if let Some(row) = bitmap.row_mut(y) {
                copy_literal(row, start, &literal[..clipped]);
            }
            cursor.advance(span);
        } else {
            if cursor.is_finished() {
                break;
            }
            let y = target_row(bitmap, cursor.row());
            let (start, clipped) = (cursor.column(), cursor.clip(usize::from(count)));

            if let Some(row) = bitmap.row_mut(y) {
                fill_run(row, start, clipped, value);
            }
            cursor.advance(usize::from(count));
        }
    }
    Ok(())
}

/// Decode RLE4 data into a 4 bit bitmap
pub(crate) fn decode_rle4<T: ByteReaderTrait>(
    stream: &mut ByteReader<T>, bitmap: &mut Bitmap
) -> Result<(), BmpDecoderErrors> {
    let mut cursor = RunCursor::new(bitmap.width(), bitmap.height());
    let mut literal = [0_u8; 128];

    while let Some((count, value)) = next_pair(stream, &cursor)? {
        if count == RLE_COMMAND {
            match handle_escape(stream, &mut cursor, value)? {
                Some(true) => continue,
                Some(false) => break,
                None => ()
            }
            let span = usize::from(value);
            let bytes = (span + 1) / 2;
            let padded = bytes + (bytes & 1);

            stream
                .read_exact_bytes(&mut literal[..padded])
                .map_err(|_| BmpDecoderErrors::TruncatedRle(cursor.row()))?;

            if cursor.is_finished() {
                break;
            }
            let y = target_row(bitmap, cursor.row());
            let (start, clipped) = (cursor.column(), cursor.clip(span));

            if let Some(row) = bitmap.row_mut(y) {
                for i in 0..clipped {
                    let byte = literal[i / 2];
                    let nibble = if i & 1 == 1 { byte & 0x0F } else { byte >> 4 };
                    put_nibble(row, start + i, nibble);
                }
            }
            cursor.advance(span);
        } else {
            if cursor.is_finished() {
                break;
            }
            let y = target_row(bitmap, cursor.row());
            let (start, clipped) = (cursor.column(), cursor.clip(usize::from(count)));

            if let Some(row) = bitmap.row_mut(y) {
                for i in 0..clipped {
                    let nibble = if i & 1 == 1 { value & 0x0F } else { value >> 4 };
                    put_nibble(row, start + i, nibble);
                }
            }
            cursor.advance(usize::from(count));
        }
    }
    Ok(())
}

/// Flush pending literal bytes
///
/// One and two byte literals collide with the end of bitmap and delta
/// escapes, so they are written as runs of one
fn flush_literal(literal: &mut Vec<u8>, out: &mut Vec<u8>) {
    match literal.len() {
        0 => (),
        1 => out.extend_from_slice(&[1, literal[0]]),
        2 => out.extend_from_slice(&[1, literal[0], 1, literal[1]]),
        size => {
            out.extend_from_slice(&[RLE_COMMAND, size as u8]);
            out.extend_from_slice(literal);

            if size & 1 == 1 {
                out.push(0);
            }
        }
    }
    literal.clear();
}

/// Encode one row of 8 bit pixels, terminated by an end of line marker
///
/// Runs of four or more equal bytes become `(count, value)` pairs,
/// everything else is collected into absolute spans of at most 254 bytes
pub fn encode_rle8_line(source: &[u8], out: &mut Vec<u8>) {
    let size = source.len();
    let mut literal = Vec::with_capacity(MAX_RUN);
    let mut i = 0;

    while i < size {
        if i + 1 < size && source[i] == source[i + 1] {
            // find a solid block of same bytes
            let mut j = i + 1;
            let j_max = i + MAX_RUN - 1;

            while j + 1 < size && j < j_max && source[j] == source[j + 1] {
                j += 1;
            }
            let run = j - i + 1;

            if run > 3 {
                flush_literal(&mut literal, out);
                out.extend_from_slice(&[run as u8, source[i]]);
            } else {
                for &byte in &source[i..=j] {
                    literal.push(byte);

                    if literal.len() == MAX_RUN {
                        flush_literal(&mut literal, out);
                    }
                }
            }
            i = j;
        } else {
            literal.push(source[i]);
        }

        if literal.len() == MAX_RUN {
            flush_literal(&mut literal, out);
        }
        i += 1;
    }
    flush_literal(&mut literal, out);
    out.extend_from_slice(&[RLE_COMMAND, RLE_END_OF_LINE]);
}

/// Append the end of bitmap marker
pub fn encode_rle8_end(out: &mut Vec<u8>) {
    out.extend_from_slice(&[RLE_COMMAND, RLE_END_OF_BITMAP]);
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use freepix_core::bitmap::Bitmap;
    use freepix_core::bytestream::{ByteCursor, ByteReader};
    use freepix_core::errors::ErrorKind;

    use super::*;

    fn decode8(width: usize, height: usize, data: &[u8]) -> Result<Bitmap, BmpDecoderErrors> {
        let mut bitmap = Bitmap::allocate(width, height, 8).unwrap();
        let mut stream = ByteReader::new(ByteCursor::new(data));
        decode_rle8(&mut stream, &mut bitmap)?;
        Ok(bitmap)
    }

    #[test]
    fn long_run_is_split_at_254() {
        let row = [7_u8; 300];
        let mut out = vec![];
        encode_rle8_line(&row, &mut out);
        assert_eq!(out, [254, 7, 46, 7, 0, 0]);

        encode_rle8_end(&mut out);
        let bitmap = decode8(300, 1, &out).unwrap();
        assert!(bitmap.row(0).unwrap()[..300].iter().all(|x| *x == 7));
    }

    #[test]
    fn short_literals_are_runs_of_one() {
        let mut out = vec![];
        encode_rle8_line(&[1, 2], &mut out);
        assert_eq!(out, [1, 1, 1, 2, 0, 0]);

        out.clear();
        encode_rle8_line(&[1, 2, 3], &mut out);
        // odd spans are padded
        assert_eq!(out, [0, 3, 1, 2, 3, 0, 0, 0]);
    }

    #[test]
    fn runs_longer_than_the_row_are_clipped() {
        // run of 200 into a 4 pixel row, then a literal of 5 into the next
        let data = [200, 9, 0, 0, 0, 5, 1, 2, 3, 4, 5, 0, 0, 1];
        let bitmap = decode8(4, 2, &data).unwrap();

        assert_eq!(&bitmap.row(0).unwrap()[..4], &[9, 9, 9, 9]);
        assert_eq!(&bitmap.row(1).unwrap()[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn delta_leaves_gaps() {
        let data = [0, 2, 2, 1, 2, 5, 0, 1];
        let bitmap = decode8(4, 2, &data).unwrap();
        assert_eq!(&bitmap.row(0).unwrap()[..4], &[0, 0, 0, 0]);
        assert_eq!(&bitmap.row(1).unwrap()[..4], &[0, 0, 5, 5]);
    }

    #[test]
    fn end_of_bitmap_leaves_rows_zeroed() {
        let data = [4, 3, 0, 1, 4, 4];
        let bitmap = decode8(4, 3, &data).unwrap();
        assert_eq!(&bitmap.row(0).unwrap()[..4], &[3, 3, 3, 3]);
        assert_eq!(&bitmap.row(1).unwrap()[..4], &[0, 0, 0, 0]);
    }

    #[test]
    fn truncated_run_is_corrupt() {
        // stream ends inside the second pair of a three row image
        let data = [4, 3, 0, 0, 2];
        let err = decode8(4, 3, &data).unwrap_err();
        assert!(matches!(err, BmpDecoderErrors::TruncatedRle(1)));
        assert_eq!(err.kind(), ErrorKind::CorruptStream);

        // a literal that claims more bytes than remain
        let data = [0, 6, 1, 2];
        assert!(decode8(8, 1, &data).is_err());
    }

    #[test]
    fn rle4_runs_alternate_nibbles() {
        let mut bitmap = Bitmap::allocate(5, 1, 4).unwrap();
        let data: Vec<u8> = vec![5, 0x12, 0, 1];
        let mut stream = ByteReader::new(ByteCursor::new(data));
        decode_rle4(&mut stream, &mut bitmap).unwrap();
        assert_eq!(&bitmap.row(0).unwrap()[..3], &[0x12, 0x12, 0x10]);
    }

    #[test]
    fn rle4_absolute_span() {
        let mut bitmap = Bitmap::allocate(6, 1, 4).unwrap();
        // three pixels, two bytes, padded to an even count
        let data: Vec<u8> = vec![0, 3, 0xAB, 0xC0, 3, 0x77, 0, 1];
        let mut stream = ByteReader::new(ByteCursor::new(data));
        decode_rle4(&mut stream, &mut bitmap).unwrap();
        assert_eq!(&bitmap.row(0).unwrap()[..3], &[0xAB, 0xC7, 0x77]);
    }
}
