/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! PCX run length coding
//!
//! A byte with both top bits set carries a repeat count in its low six
//! bits and is followed by the value to repeat, any other byte is a
//! literal. Runs never cross the end of a line, a run longer than what
//! is left of the line is clipped.
use alloc::vec::Vec;

use freepix_core::bytestream::{ByteIoError, ByteReader, ByteReaderTrait};
use freepix_core::rle::{fill_run, RunCursor};

const RUN_FLAG: u8 = 0xC0;
const MAX_RUN: usize = 0x3F;

/// Decode one full line into `line`
///
/// Returns an error if the stream ends before the line is complete,
/// `line` then holds what was decoded so far.
pub(crate) fn decode_line<T: ByteReaderTrait>(
    stream: &mut ByteReader<T>, line: &mut [u8]
) -> Result<(), ByteIoError> {
    if line.is_empty() {
        return Ok(());
    }
    let mut cursor = RunCursor::new(line.len(), 1);

    while !cursor.is_finished() {
        let byte = stream.get_u8_err()?;

        let (count, value) = if byte & RUN_FLAG == RUN_FLAG {
            (usize::from(byte & 0x3F), stream.get_u8_err()?)
        } else {
            (1, byte)
        };
        // a zero count run writes nothing
        let written = fill_run(line, cursor.column(), cursor.clip(count), value);
        cursor.advance(written);

        if cursor.column() == line.len() {
            cursor.next_row();
        }
    }
    Ok(())
}

/// Encode one full line
///
/// Repeats become runs of at most 63 bytes, values that collide with the
/// run marker are always written as runs.
pub fn encode_line(line: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;

    while i < line.len() {
        let value = line[i];
        let run = line[i..]
            .iter()
            .take(MAX_RUN)
            .take_while(|byte| **byte == value)
            .count();

        if run > 1 || value & RUN_FLAG == RUN_FLAG {
            out.extend_from_slice(&[RUN_FLAG | run as u8, value]);
        } else {
            out.push(value);
        }
        i += run;
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use freepix_core::bytestream::{ByteCursor, ByteReader};

    use super::*;

    fn decode(data: &[u8], length: usize) -> (Vec<u8>, bool) {
        let mut line = vec![0; length];
        let mut stream = ByteReader::new(ByteCursor::new(data));
        let ok = decode_line(&mut stream, &mut line).is_ok();
        (line, ok)
    }

    #[test]
    fn runs_and_literals() {
        let (line, ok) = decode(&[0xC3, 9, 1, 2, 0xC1, 0xC5], 6);
        assert!(ok);
        assert_eq!(line, [9, 9, 9, 1, 2, 0xC5]);
    }

    #[test]
    fn run_past_line_end_is_clipped() {
        let data = [0xC5, 7, 0xC2, 3];
        let mut stream = ByteReader::new(ByteCursor::new(&data[..]));

        let mut first = [0; 3];
        decode_line(&mut stream, &mut first).unwrap();
        assert_eq!(first, [7, 7, 7]);

        // the excess of the first run does not leak into the next line
        let mut second = [0; 2];
        decode_line(&mut stream, &mut second).unwrap();
        assert_eq!(second, [3, 3]);
    }

    #[test]
    fn zero_count_run_is_skipped() {
        let (line, ok) = decode(&[0xC0, 5, 0xC2, 6], 2);
        assert!(ok);
        assert_eq!(line, [6, 6]);
    }

    #[test]
    fn truncated_line() {
        let (line, ok) = decode(&[0xC2, 4], 4);
        assert!(!ok);
        assert_eq!(&line[..2], &[4, 4]);
    }

    #[test]
    fn encoded_lines_decode_back() {
        let mut source = vec![0xC0; 70];
        source.extend_from_slice(&[1, 2, 3, 0xFF, 4, 4]);

        let mut out = Vec::new();
        encode_line(&source, &mut out);
        // 63 + 7 marker valued bytes, then literals
        assert_eq!(&out[..4], &[0xFF, 0xC0, 0xC7, 0xC0]);

        let (line, ok) = decode(&out, source.len());
        assert!(ok);
        assert_eq!(line, source);
    }
}
