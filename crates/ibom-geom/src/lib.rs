//! Geometry engine for canonical board documents.
//!
//! - [`drawing`] - the closed set of drawing primitives and pads adapters emit
//! - [`svgpath`] - a minimal SVG path interpreter with exact elliptical-arc bounds
//! - [`bbox`] - the [`BoundingBox`] accumulator

pub mod bbox;
pub mod drawing;
pub mod svgpath;

pub use bbox::{BoundingBox, EdgesBbox, FootprintBbox, rotate};
pub use drawing::{
    DrawingItem, DrillShape, Drawing, Pad, PadKind, PadShape, Side, Text, normalize_arc_angles,
};
pub use svgpath::{Arc, Line, PathError, PathSegment, SegmentBounds, create_path, parse_path};

/// A 2-D point in board units (millimeters).
pub type Point = [f64; 2];

/// Serialize a flag as the viewer's `0`/`1` integer convention.
pub mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bool(bool),
            Int(i64),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Bool(b) => b,
            Repr::Int(i) => i != 0,
        })
    }

    pub fn is_unset(value: &bool) -> bool {
        !*value
    }
}
