/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Destination bookkeeping for run-length decoders
//!
//! Run-length streams describe runs `(count, value)` and literal spans
//! of `count` bytes. Their counts come from untrusted input, so every
//! write is clipped to what is left of the current row before it happens.
//!
//! The cursor counts in *units*, which is whatever the decoder writes
//! at a time (bytes for 8 bit data, nibbles for 4 bit data).

/// Column and row position of a run-length decoder
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RunCursor {
    column:     usize,
    row:        usize,
    row_length: usize,
    rows:       usize
}

impl RunCursor {
    /// Create a cursor over `rows` rows of `row_length` units
    pub const fn new(row_length: usize, rows: usize) -> RunCursor {
        RunCursor {
            column: 0,
            row: 0,
            row_length,
            rows
        }
    }
    pub const fn column(&self) -> usize {
        self.column
    }
    /// Current row, counted in the order the stream produces rows
    pub const fn row(&self) -> usize {
        self.row
    }
    pub const fn row_length(&self) -> usize {
        self.row_length
    }
    /// All rows have been reached
    pub const fn is_finished(&self) -> bool {
        self.row >= self.rows
    }
    /// Units left in the current row, zero once finished
    pub const fn remaining(&self) -> usize {
        if self.is_finished() {
            0
        } else {
            self.row_length - self.column
        }
    }
    /// Clip a declared run length to the space left in the row
    pub const fn clip(&self, declared: usize) -> usize {
        let remaining = self.remaining();
        if declared < remaining {
            declared
        } else {
            remaining
        }
    }
    /// Move right by `count` units, never past the end of the row
    pub fn advance(&mut self, count: usize) {
        self.column = (self.column + self.clip(count)).min(self.row_length);
    }
    /// End of line, go to the start of the next row
    pub fn next_row(&mut self) {
        self.column = 0;
        self.row = self.row.saturating_add(1);
    }
    /// Move by `(dx, dy)` without writing
    ///
    /// Moving down keeps the column. Returns false if the target lies
    /// outside the destination, in which case the cursor is finished.
    pub fn skip(&mut self, dx: usize, dy: usize) -> bool {
        self.row = self.row.saturating_add(dy);
        self.column = self.column.saturating_add(dx);

        if self.column > self.row_length || self.row >= self.rows {
            self.row = self.rows;
            self.column = 0;
            return false;
        }
        true
    }
    /// Jump to the end, remaining rows keep their contents
    pub fn finish(&mut self) {
        self.row = self.rows;
        self.column = 0;
    }
}

/// Write `value` into the next `count` units of `row` starting at `start`
///
/// The count is clipped to the row, returns how many units were written
pub fn fill_run(row: &mut [u8], start: usize, count: usize, value: u8) -> usize {
    let end = start.saturating_add(count).min(row.len());
    if start >= end {
        return 0;
    }
    row[start..end].fill(value);
    end - start
}

/// Copy as much of `literal` as fits into `row` starting at `start`
///
/// Returns how many bytes were copied
pub fn copy_literal(row: &mut [u8], start: usize, literal: &[u8]) -> usize {
    let end = start.saturating_add(literal.len()).min(row.len());
    if start >= end {
        return 0;
    }
    row[start..end].copy_from_slice(&literal[..end - start]);
    end - start
}

/// Store a 4 bit value at nibble position `x`, high nibble first
#[inline]
pub fn put_nibble(row: &mut [u8], x: usize, value: u8) {
    if let Some(byte) = row.get_mut(x / 2) {
        if x & 1 == 0 {
            *byte = (*byte & 0x0F) | (value << 4);
        } else {
            *byte = (*byte & 0xF0) | (value & 0x0F);
        }
    }
}
