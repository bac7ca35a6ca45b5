use std::collections::{HashMap, HashSet};

use crate::{BASE64_ALPHABET, END_OF_STREAM};

/// Packs variable-width codes into fixed-width output units. Codes are
/// written least significant bit first; each unit is filled from its most
/// significant bit down.
struct BitWriter {
    bits_per_unit: u32,
    value: u32,
    position: u32,
    out: Vec<u16>,
}

impl BitWriter {
    fn new(bits_per_unit: u32) -> Self {
        Self {
            bits_per_unit,
            value: 0,
            position: 0,
            out: Vec::new(),
        }
    }

    fn push_bit(&mut self, bit: u32) {
        self.value = (self.value << 1) | bit;
        if self.position == self.bits_per_unit - 1 {
            self.position = 0;
            self.out.push(self.value as u16);
            self.value = 0;
        } else {
            self.position += 1;
        }
    }

    fn write(&mut self, mut code: u32, width: u32) {
        for _ in 0..width {
            self.push_bit(code & 1);
            code >>= 1;
        }
    }

    fn finish(mut self) -> Vec<u16> {
        loop {
            self.value <<= 1;
            if self.position == self.bits_per_unit - 1 {
                self.out.push(self.value as u16);
                break;
            }
            self.position += 1;
        }
        self.out
    }
}

/// Dictionary of phrases stored as a trie over UTF-16 units.
struct Encoder {
    writer: BitWriter,
    roots: HashMap<u16, usize>,
    children: HashMap<(usize, u16), usize>,
    codes: Vec<u32>,
    units: Vec<u16>,
    /// Single-unit phrases whose literal has not been written yet.
    pending: HashSet<usize>,
    dict_size: u32,
    num_bits: u32,
    enlarge_in: u32,
}

impl Encoder {
    fn new(bits_per_unit: u32) -> Self {
        Self {
            writer: BitWriter::new(bits_per_unit),
            roots: HashMap::new(),
            children: HashMap::new(),
            codes: Vec::new(),
            units: Vec::new(),
            pending: HashSet::new(),
            dict_size: 3,
            num_bits: 2,
            enlarge_in: 2,
        }
    }

    fn add_node(&mut self, unit: u16) -> usize {
        self.codes.push(self.dict_size);
        self.units.push(unit);
        self.dict_size += 1;
        self.codes.len() - 1
    }

    fn shrink_window(&mut self) {
        self.enlarge_in -= 1;
        if self.enlarge_in == 0 {
            self.enlarge_in = 1 << self.num_bits;
            self.num_bits += 1;
        }
    }

    fn emit(&mut self, node: usize) {
        if self.pending.remove(&node) {
            let unit = self.units[node];
            if unit < 256 {
                self.writer.write(0, self.num_bits);
                self.writer.write(unit as u32, 8);
            } else {
                self.writer.write(1, self.num_bits);
                self.writer.write(unit as u32, 16);
            }
            self.shrink_window();
        } else {
            self.writer.write(self.codes[node], self.num_bits);
        }
        self.shrink_window();
    }

    fn encode(mut self, input: &str) -> Vec<u16> {
        let mut current: Option<usize> = None;
        for unit in input.encode_utf16() {
            let root = match self.roots.get(&unit) {
                Some(&node) => node,
                None => {
                    let node = self.add_node(unit);
                    self.roots.insert(unit, node);
                    self.pending.insert(node);
                    node
                }
            };
            current = Some(match current {
                None => root,
                Some(prefix) => match self.children.get(&(prefix, unit)) {
                    Some(&node) => node,
                    None => {
                        self.emit(prefix);
                        let node = self.add_node(unit);
                        self.children.insert((prefix, unit), node);
                        root
                    }
                },
            });
        }
        if let Some(prefix) = current {
            self.emit(prefix);
        }
        self.writer.write(END_OF_STREAM, self.num_bits);
        self.writer.finish()
    }
}

/// Compress to 16-bit units, matching `LZString.compress`.
///
/// An empty input gives an empty output.
pub fn compress(input: &str) -> Vec<u16> {
    if input.is_empty() {
        return Vec::new();
    }
    Encoder::new(16).encode(input)
}

/// Compress to base64 text, matching `LZString.compressToBase64`.
///
/// The result uses only [`BASE64_ALPHABET`] and its length is a multiple
/// of four.
pub fn compress_to_base64(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut text: String = Encoder::new(6)
        .encode(input)
        .into_iter()
        .map(|unit| BASE64_ALPHABET[unit as usize] as char)
        .collect();
    while text.len() % 4 != 0 {
        text.push('=');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_literal() {
        assert_eq!(compress_to_base64("a"), "IZA=");
    }

    #[test]
    fn test_empty_input() {
        assert!(compress("").is_empty());
        assert_eq!(compress_to_base64(""), "");
    }

    #[test]
    fn test_repetition_shrinks() {
        let input = "0123456789".repeat(200);
        let packed = compress_to_base64(&input);
        assert!(packed.len() < input.len() / 4, "{} bytes", packed.len());
    }

    #[test]
    fn test_bit_writer_flush() {
        let mut writer = BitWriter::new(6);
        writer.write(0b101, 3);
        // 1, 0, 1 then three padding zeros
        assert_eq!(writer.finish(), [0b101000]);
    }
}
