//! Stroke font decoding.
//!
//! A glyph table holds one encoded string per character starting at `' '`.
//! Each character of the encoding is a coordinate on a grid centred on
//! `'R'`; the first pair gives the glyph's left edge and advance, and the
//! pair `" R"` lifts the pen between strokes.

use std::collections::BTreeMap;

use ibom_geom::Point;
use serde::{Deserialize, Serialize};

use crate::model::FontData;

pub const STROKE_FONT_SCALE: f64 = 1.0 / 21.0;
/// Baseline correction in grid units.
pub const FONT_OFFSET: i32 = -10;

const FALLBACK: char = '?';

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Glyph {
    #[serde(rename = "w")]
    pub width: f64,
    #[serde(rename = "l")]
    pub strokes: Vec<Vec<Point>>,
}

fn grid(c: u8) -> i32 {
    c as i32 - b'R' as i32
}

fn decode_glyph(encoded: &str) -> Glyph {
    let mut pairs = encoded.as_bytes().chunks_exact(2);
    let Some(header) = pairs.next() else {
        return Glyph::default();
    };
    let glyph_x = grid(header[0]) as f64 * STROKE_FONT_SCALE;
    let width = (header[1] as i32 - header[0] as i32) as f64 * STROKE_FONT_SCALE;

    let mut strokes = Vec::new();
    let mut stroke = Vec::new();
    for pair in pairs {
        if pair == b" R" {
            strokes.push(std::mem::take(&mut stroke));
        } else {
            stroke.push([
                grid(pair[0]) as f64 * STROKE_FONT_SCALE - glyph_x,
                (grid(pair[1]) + FONT_OFFSET) as f64 * STROKE_FONT_SCALE,
            ]);
        }
    }
    if !stroke.is_empty() {
        strokes.push(stroke);
    }
    Glyph { width, strokes }
}

/// An encoded glyph table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeFont {
    glyphs: Vec<String>,
}

impl StrokeFont {
    pub fn new(glyphs: Vec<String>) -> Self {
        Self { glyphs }
    }

    /// Parse a JSON array of encoded glyph strings.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    fn encoded(&self, c: char) -> Option<&str> {
        let index = (c as u32).checked_sub(' ' as u32)?;
        self.glyphs.get(index as usize).map(String::as_str)
    }

    /// Decode `c`, substituting `'?'` for characters outside the table.
    pub fn decode(&self, c: char) -> Glyph {
        match self.encoded(c).or_else(|| self.encoded(FALLBACK)) {
            Some(encoded) => decode_glyph(encoded),
            None => Glyph::default(),
        }
    }
}

/// Glyphs decoded so far for one document. Entries are never replaced.
#[derive(Debug)]
pub struct FontCache<'a> {
    font: &'a StrokeFont,
    glyphs: BTreeMap<char, Glyph>,
}

impl<'a> FontCache<'a> {
    pub fn new(font: &'a StrokeFont) -> Self {
        Self {
            font,
            glyphs: BTreeMap::new(),
        }
    }

    pub fn glyph(&mut self, c: char) -> &Glyph {
        let font = self.font;
        self.glyphs.entry(c).or_insert_with(|| font.decode(c))
    }

    /// Decode every printable character of `text`. A tab needs the space
    /// glyph for its advance.
    pub fn add_string(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\t' {
                self.glyph(' ');
            }
            if c >= ' ' {
                self.glyph(c);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn into_font_data(self) -> FontData {
        self.glyphs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn font() -> StrokeFont {
        // ' ', '!', '"' then a gap up to '?'
        let mut glyphs = vec![
            "JZ".to_string(),
            "MWRYQZR[SZRY RRFRT".to_string(),
            "JZNFNJ RVFVJ".to_string(),
        ];
        glyphs.resize(31, String::new());
        glyphs.push("LXNKQKSL".to_string());
        StrokeFont::new(glyphs)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_decode_strokes() {
        let glyph = font().decode('"');
        assert!(close(glyph.width, 16.0 / 21.0));
        assert_eq!(glyph.strokes.len(), 2);
        // 'N' is 4 left of 'R', glyph left edge is 8 left of 'R'
        let [x, y] = glyph.strokes[0][0];
        assert!(close(x, 4.0 / 21.0));
        assert!(close(y, -22.0 / 21.0));
    }

    #[test]
    fn test_pen_up_splits_strokes() {
        let glyph = font().decode('!');
        assert_eq!(glyph.strokes.len(), 2);
        assert_eq!(glyph.strokes[0].len(), 5);
        assert_eq!(glyph.strokes[1].len(), 2);
    }

    #[test]
    fn test_unknown_characters_use_question_mark() {
        let font = font();
        let fallback = font.decode('?');
        assert_eq!(fallback.strokes.len(), 1);
        assert_eq!(font.decode('Ж'), fallback);
        assert_eq!(font.decode('\u{1}'), fallback);
        assert_eq!(StrokeFont::default().decode('A'), Glyph::default());
    }

    #[test]
    fn test_cache_is_memoized() {
        let font = font();
        let mut cache = FontCache::new(&font);
        let first = cache.glyph('!').clone();
        assert_eq!(cache.glyph('!'), &first);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_add_string() {
        let font = font();
        let mut cache = FontCache::new(&font);
        cache.add_string("!\t\n!");
        let data = cache.into_font_data();
        assert_eq!(data.keys().copied().collect::<Vec<_>>(), [' ', '!']);
        assert!(close(data[&' '].width, 16.0 / 21.0));
        assert!(data[&' '].strokes.is_empty());
    }
}
