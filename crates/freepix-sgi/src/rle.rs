/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! SGI run length coding
//!
//! Each row of each channel is coded on its own. A packet byte holds a
//! count in its low seven bits, with the top bit set `count` literal
//! bytes follow, otherwise the next byte is repeated `count` times.
//! A zero count ends a row.
use alloc::vec::Vec;

use freepix_core::bytestream::{ByteIoError, ByteReader, ByteReaderTrait};
use freepix_core::rle::{copy_literal, fill_run, RunCursor};

const LITERAL_FLAG: u8 = 0x80;
const MAX_COUNT: usize = 0x7F;

/// Decode one row of one channel into `row`
///
/// Zero packets before the row is full are skipped, runs longer than
/// the row are clipped.
pub(crate) fn decode_row<T: ByteReaderTrait>(
    stream: &mut ByteReader<T>, row: &mut [u8]
) -> Result<(), ByteIoError> {
    let mut cursor = RunCursor::new(row.len(), 1);
    let mut literal = [0_u8; MAX_COUNT];

    while cursor.column() < row.len() {
        let packet = stream.get_u8_err()?;
        let count = usize::from(packet & 0x7F);

        if count == 0 {
            continue;
        }
        if packet & LITERAL_FLAG != 0 {
            stream.read_exact_bytes(&mut literal[..count])?;
            let written = copy_literal(row, cursor.column(), &literal[..cursor.clip(count)]);
            cursor.advance(written);
        } else {
            let value = stream.get_u8_err()?;
            let written = fill_run(row, cursor.column(), cursor.clip(count), value);
            cursor.advance(written);
        }
    }
    Ok(())
}

/// Encode one row of one channel, terminated by a zero packet
///
/// Repeats of three or more bytes become runs, everything else literals.
pub fn encode_row(row: &[u8], out: &mut Vec<u8>) {
    let mut i = 0;
    let mut literal_start = 0;

    let flush_literal = |out: &mut Vec<u8>, literal: &[u8]| {
        for chunk in literal.chunks(MAX_COUNT) {
            out.push(LITERAL_FLAG | chunk.len() as u8);
            out.extend_from_slice(chunk);
        }
    };

    while i < row.len() {
        let value = row[i];
        let run = row[i..]
            .iter()
            .take(MAX_COUNT)
            .take_while(|byte| **byte == value)
            .count();

        if run >= 3 {
            flush_literal(out, &row[literal_start..i]);
            out.extend_from_slice(&[run as u8, value]);
            i += run;
            literal_start = i;
        } else {
            i += 1;
        }
    }
    flush_literal(out, &row[literal_start..]);
    out.push(0);
}
