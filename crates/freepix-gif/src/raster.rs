/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Row ordering and packed palette indices

use alloc::vec::Vec;

const PASS_OFFSETS: [usize; 4] = [0, 4, 2, 1];
const PASS_STEPS: [usize; 4] = [8, 8, 4, 2];

/// Rows from the top in the order they are stored
///
/// Interlaced images store every 8th row starting at 0, every 8th starting
/// at 4, every 4th starting at 2 and finally every 2nd starting at 1.
pub(crate) fn row_order(height: usize, interlaced: bool) -> Vec<usize> {
    if !interlaced {
        return (0..height).collect();
    }
    PASS_OFFSETS
        .iter()
        .zip(PASS_STEPS.iter())
        .flat_map(|(&offset, &step)| (offset..height).step_by(step))
        .collect()
}

/// Palette index of pixel `x` in a 1, 4 or 8 bit row
#[inline]
pub(crate) fn get_index(row: &[u8], x: usize, depth: u16) -> u8 {
    match depth {
        8 => row[x],
        _ => {
            let depth = usize::from(depth);
            let bit = x * depth;
            let shift = 8 - depth - (bit & 7);
            (row[bit >> 3] >> shift) & ((1 << depth) - 1) as u8
        }
    }
}

/// Store a palette index, extra high bits of `value` are dropped
#[inline]
pub(crate) fn set_index(row: &mut [u8], x: usize, depth: u16, value: u8) {
    match depth {
        8 => row[x] = value,
        _ => {
            let depth = usize::from(depth);
            let bit = x * depth;
            let shift = 8 - depth - (bit & 7);
            let mask = (((1 << depth) - 1) as u8) << shift;
            let byte = &mut row[bit >> 3];
            *byte = (*byte & !mask) | ((value << shift) & mask);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interlaced_rows() {
        assert_eq!(row_order(10, true), [0, 8, 4, 2, 6, 1, 3, 5, 7, 9]);
        assert_eq!(row_order(3, false), [0, 1, 2]);
        assert_eq!(row_order(1, true), [0]);
    }

    #[test]
    fn packed_indices() {
        let mut row = [0_u8; 2];
        set_index(&mut row, 1, 4, 0xA);
        set_index(&mut row, 2, 4, 0x1F);
        assert_eq!(row, [0x0A, 0xF0]);
        assert_eq!(get_index(&row, 2, 4), 0xF);

        let mut bits = [0_u8; 1];
        set_index(&mut bits, 7, 1, 1);
        set_index(&mut bits, 0, 1, 3);
        assert_eq!(bits, [0b1000_0001]);
        assert_eq!(get_index(&bits, 6, 1), 0);
    }
}
