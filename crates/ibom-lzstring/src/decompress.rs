use thiserror::Error;

use crate::{BASE64_ALPHABET, END_OF_STREAM};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecompressError {
    #[error("stream ended before the end marker")]
    Truncated,

    #[error("invalid dictionary code {code} at phrase {phrase}")]
    InvalidCode { code: u32, phrase: usize },

    #[error("decompressed text is not valid UTF-16")]
    InvalidUtf16,
}

struct BitReader<'a> {
    units: &'a [u16],
    reset: u32,
    value: u32,
    position: u32,
    index: usize,
}

impl<'a> BitReader<'a> {
    fn new(units: &'a [u16], bits_per_unit: u32) -> Self {
        let reset = 1 << (bits_per_unit - 1);
        Self {
            units,
            reset,
            value: units.first().copied().unwrap_or(0) as u32,
            position: reset,
            index: 1,
        }
    }

    /// Reads past the end yield zero bits.
    fn read(&mut self, width: u32) -> u32 {
        let mut bits = 0;
        for shift in 0..width {
            let bit = self.value & self.position;
            self.position >>= 1;
            if self.position == 0 {
                self.position = self.reset;
                self.value = self.units.get(self.index).copied().unwrap_or(0) as u32;
                self.index += 1;
            }
            if bit != 0 {
                bits |= 1 << shift;
            }
        }
        bits
    }

    fn exhausted(&self) -> bool {
        self.index > self.units.len()
    }
}

fn decode(units: &[u16], bits_per_unit: u32) -> Result<String, DecompressError> {
    if units.is_empty() {
        return Ok(String::new());
    }
    let mut reader = BitReader::new(units, bits_per_unit);
    // Codes 0..=2 are reserved for the literal markers and end of stream.
    let mut dictionary: Vec<Vec<u16>> = vec![Vec::new(); 3];
    let mut enlarge_in: u32 = 4;
    let mut num_bits: u32 = 3;

    let first = match reader.read(2) {
        0 => reader.read(8) as u16,
        1 => reader.read(16) as u16,
        _ => return Ok(String::new()),
    };
    let mut previous = vec![first];
    dictionary.push(previous.clone());
    let mut result = previous.clone();

    loop {
        let mut code = reader.read(num_bits);
        // A complete stream always ends with padding after the end marker.
        if reader.exhausted() {
            return Err(DecompressError::Truncated);
        }
        match code {
            0 | 1 => {
                let width = if code == 0 { 8 } else { 16 };
                let unit = reader.read(width) as u16;
                dictionary.push(vec![unit]);
                code = (dictionary.len() - 1) as u32;
                enlarge_in -= 1;
            }
            END_OF_STREAM => {
                return String::from_utf16(&result).map_err(|_| DecompressError::InvalidUtf16);
            }
            _ => {}
        }
        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }

        let entry = match dictionary.get(code as usize) {
            Some(entry) => entry.clone(),
            None if code as usize == dictionary.len() => {
                let mut entry = previous.clone();
                entry.push(previous[0]);
                entry
            }
            None => {
                return Err(DecompressError::InvalidCode {
                    code,
                    phrase: dictionary.len(),
                });
            }
        };
        result.extend_from_slice(&entry);

        let mut phrase = previous;
        phrase.push(entry[0]);
        dictionary.push(phrase);
        enlarge_in -= 1;
        previous = entry;

        if enlarge_in == 0 {
            enlarge_in = 1 << num_bits;
            num_bits += 1;
        }
    }
}

/// Inverse of [`compress`](crate::compress).
pub fn decompress(units: &[u16]) -> Result<String, DecompressError> {
    decode(units, 16)
}

/// Inverse of [`compress_to_base64`](crate::compress_to_base64).
///
/// Characters outside the alphabet read as zero, as in the JavaScript
/// library.
pub fn decompress_from_base64(text: &str) -> Result<String, DecompressError> {
    let units: Vec<u16> = text
        .bytes()
        .map(|b| {
            BASE64_ALPHABET
                .iter()
                .position(|&a| a == b)
                .unwrap_or(0) as u16
        })
        .collect();
    decode(&units, 6)
}
