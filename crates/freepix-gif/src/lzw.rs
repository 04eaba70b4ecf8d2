/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Variable width LZW as used by GIF
//!
//! Codes are packed least significant bit first. With a minimum code
//! size of `n` the alphabet holds `2^n` symbols, code `2^n` clears the
//! table and `2^n + 1` ends the stream. Codes start `n + 1` bits wide
//! and grow by one bit each time the table size reaches the next power
//! of two, up to 12 bits (4096 entries).
//!
//! The encoder and decoder below grow their width at exactly the same
//! code, a stream produced by one is read back bit for bit by the other.
use alloc::vec;
use alloc::vec::Vec;

use crate::errors::GifDecoderErrors;

/// Size of the code space
pub const MAX_CODES: usize = 4096;
const MAX_CODE_SIZE: u8 = 12;
const NO_CODE: u16 = u16::MAX;

/// Why [`LzwDecoder::decode`] stopped
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LzwStatus {
    /// The end of information code was read
    EndOfInformation,
    /// All input bits were consumed without an end code
    InputExhausted,
    /// The requested number of symbols was produced
    OutputFull,
    /// A code that cannot be in the table, the stream is corrupt
    InvalidCode(u16)
}

fn check_code_size(min_code_size: u8) -> Result<(), GifDecoderErrors> {
    if min_code_size == 0 || min_code_size >= MAX_CODE_SIZE {
        return Err(GifDecoderErrors::InvalidCodeSize(min_code_size));
    }
    Ok(())
}

/// LZW decompressor
///
/// The string table is kept as prefix links, every entry stores
/// the code it extends, its last byte, its first byte and its length.
pub struct LzwDecoder {
    min_code_size: u8,
    clear_code:    u16,
    end_code:      u16,
    next_code:     u16,
    code_size:     u8,
    old_code:      u16,
    prefix:        Vec<u16>,
    suffix:        Vec<u8>,
    first:         Vec<u8>,
    length:        Vec<u16>,
    #[cfg(test)]
    pub(crate) widths: Vec<u8>
}

impl LzwDecoder {
    pub fn new(min_code_size: u8) -> Result<LzwDecoder, GifDecoderErrors> {
        check_code_size(min_code_size)?;
        let clear_code = 1_u16 << min_code_size;

        let mut decoder = LzwDecoder {
            min_code_size,
            clear_code,
            end_code: clear_code + 1,
            next_code: clear_code + 2,
            code_size: min_code_size + 1,
            old_code: NO_CODE,
            prefix: vec![NO_CODE; MAX_CODES],
            suffix: vec![0; MAX_CODES],
            first: vec![0; MAX_CODES],
            length: vec![0; MAX_CODES],
            #[cfg(test)]
            widths: Vec::new()
        };
        decoder.reset();
        Ok(decoder)
    }

    fn reset(&mut self) {
        for code in 0..usize::from(self.clear_code) {
            self.prefix[code] = NO_CODE;
            self.suffix[code] = code as u8;
            self.first[code] = code as u8;
            self.length[code] = 1;
        }
        self.next_code = self.end_code + 1;
        self.code_size = self.min_code_size + 1;
        self.old_code = NO_CODE;
    }

    /// Append the string of `code` to `out`
    fn emit(&self, code: u16, out: &mut Vec<u8>) {
        let start = out.len();
        out.resize(start + usize::from(self.length[usize::from(code)]), 0);

        let mut current = code;
        for slot in out[start..].iter_mut().rev() {
            *slot = self.suffix[usize::from(current)];
            current = self.prefix[usize::from(current)];
        }
    }

    /// Decode `data`, appending at most `limit` symbols to `out`
    pub fn decode(&mut self, data: &[u8], out: &mut Vec<u8>, limit: usize) -> LzwStatus {
        let mut bits: u32 = 0;
        let mut bit_count: u32 = 0;
        let mut position = 0;

        loop {
            let width = u32::from(self.code_size);

            while bit_count < width {
                let Some(&byte) = data.get(position) else {
                    return LzwStatus::InputExhausted;
                };
                bits |= u32::from(byte) << bit_count;
                bit_count += 8;
                position += 1;
            }
            let code = (bits & ((1 << width) - 1)) as u16;
            bits >>= width;
            bit_count -= width;

            #[cfg(test)]
            self.widths.push(self.code_size);

            if code == self.end_code {
                return LzwStatus::EndOfInformation;
            }
            if code > self.next_code {
                return LzwStatus::InvalidCode(code);
            }
            if code == self.clear_code {
                self.reset();
                continue;
            }

            let has_old = self.old_code != NO_CODE;
            // right after a reset only single symbols are defined, anything
            // else stops decoding and the caller keeps what was produced so far
            if !has_old && code >= self.clear_code {
                return LzwStatus::InvalidCode(code);
            }
            let table_open = usize::from(self.next_code) < MAX_CODES;

            if has_old && table_open {
                let old = usize::from(self.old_code);
                // a code equal to the next slot refers to the entry being built
                let tail = if code == self.next_code {
                    self.first[old]
                } else {
                    self.first[usize::from(code)]
                };
                let slot = usize::from(self.next_code);
                self.prefix[slot] = self.old_code;
                self.suffix[slot] = tail;
                self.first[slot] = self.first[old];
                self.length[slot] = self.length[old] + 1;
            }

            self.emit(code, out);

            if out.len() >= limit {
                out.truncate(limit);
                return LzwStatus::OutputFull;
            }

            if has_old && table_open {
                self.next_code += 1;
                if usize::from(self.next_code) < MAX_CODES && self.next_code == 1 << self.code_size
                {
                    self.code_size += 1;
                }
            }
            self.old_code = code;
        }
    }
}

/// LZW compressor
///
/// Pending sequences are looked up in a flat table indexed by
/// `prefix << 8 | symbol`, only slots that were filled are reset on a clear.
pub struct LzwEncoder {
    min_code_size: u8,
    clear_code:    u16,
    end_code:      u16,
    next_code:     u16,
    code_size:     u8,
    prefix:        Option<u16>,
    table:         Vec<u16>,
    inserted:      Vec<usize>,
    bits:          u32,
    bit_count:     u32,
    out:           Vec<u8>,
    #[cfg(test)]
    pub(crate) widths: Vec<u8>
}

impl LzwEncoder {
    /// Start a new stream, the stream begins with a clear code
    pub fn new(min_code_size: u8) -> Result<LzwEncoder, GifDecoderErrors> {
        check_code_size(min_code_size)?;
        let clear_code = 1_u16 << min_code_size;

        let mut encoder = LzwEncoder {
            min_code_size,
            clear_code,
            end_code: clear_code + 1,
            next_code: clear_code + 2,
            code_size: min_code_size + 1,
            prefix: None,
            table: vec![NO_CODE; MAX_CODES << 8],
            inserted: Vec::with_capacity(MAX_CODES),
            bits: 0,
            bit_count: 0,
            out: Vec::new(),
            #[cfg(test)]
            widths: Vec::new()
        };
        encoder.write_code(clear_code);
        Ok(encoder)
    }

    fn write_code(&mut self, code: u16) {
        #[cfg(test)]
        self.widths.push(self.code_size);

        self.bits |= u32::from(code) << self.bit_count;
        self.bit_count += u32::from(self.code_size);

        while self.bit_count >= 8 {
            self.out.push(self.bits as u8);
            self.bits >>= 8;
            self.bit_count -= 8;
        }
    }

    fn clear_table(&mut self) {
        for key in self.inserted.drain(..) {
            self.table[key] = NO_CODE;
        }
        self.next_code = self.end_code + 1;
        self.code_size = self.min_code_size + 1;
    }

    /// Add one symbol, symbols are masked to the alphabet
    pub fn push(&mut self, symbol: u8) {
        let symbol = u16::from(symbol) & (self.clear_code - 1);

        let Some(prefix) = self.prefix else {
            self.prefix = Some(symbol);
            return;
        };
        let key = (usize::from(prefix) << 8) | usize::from(symbol);

        match self.table[key] {
            NO_CODE => {
                self.write_code(prefix);

                self.table[key] = self.next_code;
                self.inserted.push(key);

                if self.next_code == 1 << self.code_size {
                    self.code_size += 1;
                }
                self.next_code += 1;

                if usize::from(self.next_code) == MAX_CODES {
                    self.write_code(self.clear_code);
                    self.clear_table();
                }
                self.prefix = Some(symbol);
            }
            code => self.prefix = Some(code)
        }
    }

    /// Flush the pending sequence and the end code, returning the packed bytes
    pub fn finish(mut self) -> Vec<u8> {
        if let Some(prefix) = self.prefix.take() {
            self.write_code(prefix);
        }
        self.write_code(self.end_code);

        if self.bit_count > 0 {
            self.out.push(self.bits as u8);
        }
        self.out
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use nanorand::Rng;

    use super::*;

    fn compress(min_code_size: u8, data: &[u8]) -> (Vec<u8>, Vec<u8>) {
        let mut encoder = LzwEncoder::new(min_code_size).unwrap();
        data.iter().for_each(|s| encoder.push(*s));
        let widths = encoder.widths.clone();
        (encoder.finish(), widths)
    }

    #[test]
    fn round_trip_small_alphabets() {
        let mut rand = nanorand::WyRand::new_seed(7);
        for min_code_size in [2, 4, 8] {
            let alphabet = 1_u16 << min_code_size;
            let data: Vec<u8> = (0..5000)
                .map(|i| {
                    if i % 7 < 3 {
                        1
                    } else {
                        (rand.generate::<u16>() % alphabet) as u8
                    }
                })
                .collect();
            let (packed, _) = compress(min_code_size, &data);

            let mut out = Vec::new();
            let mut decoder = LzwDecoder::new(min_code_size).unwrap();
            let status = decoder.decode(&packed, &mut out, usize::MAX);
            assert_eq!(status, LzwStatus::EndOfInformation);
            assert_eq!(out, data);
        }
    }

    #[test]
    fn width_changes_match_between_encoder_and_decoder() {
        // random bytes insert a new entry for nearly every symbol,
        // enough to fill the table and force clears
        let mut data = vec![0_u8; 20_000];
        nanorand::WyRand::new_seed(99).fill(&mut data);

        let (packed, written) = compress(8, &data);

        let mut out = Vec::new();
        let mut decoder = LzwDecoder::new(8).unwrap();
        decoder.decode(&packed, &mut out, usize::MAX);
        assert_eq!(out, data);

        // the end code may be read one bit wider, its padding is zero
        let n = written.len() - 1;
        assert_eq!(&decoder.widths[..n], &written[..n]);
        assert!(written.contains(&12));
        assert_eq!(written[0], 9);
    }

    #[test]
    fn width_grows_when_table_reaches_power_of_two() {
        // with two symbols, codes 6 and 7 fit in 3 bits, inserting code 8
        // widens every later code to 4 bits
        let data = [0, 1, 0, 1, 0, 1, 0, 1, 1, 1, 0, 0, 0];
        let (_, widths) = compress(2, &data);
        // clear, then one code per insertion
        assert_eq!(&widths[..4], &[3, 3, 3, 3]);
        assert_eq!(widths[4], 4);
    }

    #[test]
    fn self_referential_code() {
        // "aaaa" encodes as a, then the code being defined
        let (packed, _) = compress(2, &[3, 3, 3, 3]);
        let mut out = Vec::new();
        LzwDecoder::new(2).unwrap().decode(&packed, &mut out, 100);
        assert_eq!(out, [3, 3, 3, 3]);
    }

    #[test]
    fn code_past_next_entry_is_corrupt() {
        // clear (4), then code 7 while the next free slot is 6
        // 3 bit codes packed lsb first: 100 then 111
        let data = [0b0011_1100];
        let mut out = Vec::new();
        let status = LzwDecoder::new(2).unwrap().decode(&data, &mut out, 100);
        assert_eq!(status, LzwStatus::InvalidCode(7));
    }

    #[test]
    fn first_code_after_clear_must_be_a_symbol() {
        // clear (4), then the next free slot 6 before any string exists
        // 3 bit codes packed lsb first: 100 then 110
        let data = [0b0011_0100];
        let mut out = Vec::new();
        let status = LzwDecoder::new(2).unwrap().decode(&data, &mut out, 100);
        assert_eq!(status, LzwStatus::InvalidCode(6));
        assert!(out.is_empty());

        // symbols decoded before a later clear are kept
        // 1, clear, 6 packed as 001 100 110
        let data = [0b1010_0001, 0b0000_0001];
        let mut out = Vec::new();
        let status = LzwDecoder::new(2).unwrap().decode(&data, &mut out, 100);
        assert_eq!(status, LzwStatus::InvalidCode(6));
        assert_eq!(out, [1]);
    }

    #[test]
    fn output_limit_is_respected() {
        let (packed, _) = compress(8, &[5; 1000]);
        let mut out = Vec::new();
        let status = LzwDecoder::new(8).unwrap().decode(&packed, &mut out, 10);
        assert_eq!(status, LzwStatus::OutputFull);
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn invalid_code_sizes() {
        assert!(LzwDecoder::new(0).is_err());
        assert!(LzwEncoder::new(12).is_err());
    }
}
