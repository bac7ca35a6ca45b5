//! Drawing primitives as they appear in the canonical board document.
//!
//! Shapes carry a `"type"` tag; text items do not, so drawing lists hold
//! [`DrawingItem`], which dispatches on the presence of that tag. Anything
//! that is neither a known shape nor a text item is kept as
//! [`DrawingItem::Unsupported`] for the caller to report and drop.

use std::fmt;

use ibom_diagnostics::Diagnostics;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{Point, flag};

const SOURCE: &str = "geometry";

/// Board side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    F,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::F => write!(f, "F"),
            Side::B => write!(f, "B"),
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "F" | "f" | "front" => Ok(Side::F),
            "B" | "b" | "back" => Ok(Side::B),
            other => Err(format!("unknown board side '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Drawing {
    Segment {
        start: Point,
        end: Point,
        width: f64,
    },
    Rect {
        start: Point,
        end: Point,
        width: f64,
    },
    Circle {
        #[serde(rename = "start")]
        center: Point,
        radius: f64,
        #[serde(default)]
        width: f64,
        #[serde(default, with = "flag", skip_serializing_if = "flag::is_unset")]
        filled: bool,
    },
    /// Circular arc from `startangle` to `endangle` (degrees), or an SVG
    /// path when the source tool only exposes the arc as endpoints.
    Arc {
        #[serde(rename = "start", default)]
        center: Point,
        #[serde(default)]
        radius: f64,
        #[serde(default)]
        startangle: f64,
        #[serde(default)]
        endangle: f64,
        #[serde(default)]
        width: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        svgpath: Option<String>,
    },
    /// Cubic bezier.
    Curve {
        start: Point,
        end: Point,
        cpa: Point,
        cpb: Point,
        width: f64,
    },
    /// Closed rings, rotated by `-angle` then offset by `pos`.
    Polygon {
        #[serde(default)]
        pos: Point,
        #[serde(default)]
        angle: f64,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        polygons: Vec<Vec<Point>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        svgpath: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        filled: Option<u8>,
        #[serde(default)]
        width: f64,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub pos: Point,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub justify: [i8; 2],
    #[serde(default)]
    pub thickness: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attr: Vec<String>,
    #[serde(default)]
    pub angle: f64,
    /// Pre-rendered outline; takes precedence over `text` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svgpath: Option<String>,
    #[serde(rename = "ref", default, with = "flag", skip_serializing_if = "flag::is_unset")]
    pub is_ref: bool,
    #[serde(rename = "val", default, with = "flag", skip_serializing_if = "flag::is_unset")]
    pub is_value: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DrawingItem {
    Shape(Drawing),
    Text(Text),
    /// An unknown `type`, or a known one with missing or malformed fields.
    Unsupported(Value),
}

impl<'de> Deserialize<'de> for DrawingItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = if value.get("type").is_some() {
            Drawing::deserialize(&value).map(DrawingItem::Shape)
        } else if value.get("text").is_some() || value.get("svgpath").is_some() {
            Text::deserialize(&value).map(DrawingItem::Text)
        } else {
            return Ok(DrawingItem::Unsupported(value));
        };
        Ok(parsed.unwrap_or_else(|_| DrawingItem::Unsupported(value)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadShape {
    Rect,
    Oval,
    Circle,
    Roundrect,
    Chamfrect,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PadKind {
    Th,
    Smd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrillShape {
    Circle,
    Oblong,
    Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub layers: Vec<Side>,
    pub pos: Point,
    pub size: Point,
    #[serde(default)]
    pub angle: f64,
    pub shape: PadShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub svgpath: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygons: Option<Vec<Vec<Point>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamfpos: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chamfratio: Option<f64>,
    #[serde(rename = "type")]
    pub kind: PadKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drillshape: Option<DrillShape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drillsize: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Point>,
    #[serde(default, with = "flag", skip_serializing_if = "flag::is_unset")]
    pub pin1: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net: Option<String>,
}

/// Order arc angles so `start <= end`, move `start` into `[0, 360)` and cap
/// the span at a full turn.
pub fn normalize_arc_angles(start: f64, end: f64) -> (f64, f64) {
    let (mut start, mut end) = if start > end { (end, start) } else { (start, end) };
    let shift = start.div_euclid(360.0) * 360.0;
    start -= shift;
    end -= shift;
    if end - start > 360.0 {
        end = start + 360.0;
    }
    (start, end)
}

fn clamp_non_negative(value: &mut f64, what: &str, diagnostics: &mut Diagnostics) {
    if *value < 0.0 {
        diagnostics.warn(SOURCE, format!("negative {what} {value} clamped to {}", -*value));
        *value = -*value;
    }
}

impl Drawing {
    /// Stroke width, zero for shapes without one.
    pub fn width(&self) -> f64 {
        match self {
            Drawing::Segment { width, .. }
            | Drawing::Rect { width, .. }
            | Drawing::Circle { width, .. }
            | Drawing::Arc { width, .. }
            | Drawing::Curve { width, .. }
            | Drawing::Polygon { width, .. } => *width,
        }
    }

    pub fn normalize(&mut self, diagnostics: &mut Diagnostics) {
        match self {
            Drawing::Segment { width, .. }
            | Drawing::Rect { width, .. }
            | Drawing::Curve { width, .. }
            | Drawing::Polygon { width, .. } => clamp_non_negative(width, "width", diagnostics),
            Drawing::Circle { radius, width, .. } => {
                clamp_non_negative(radius, "radius", diagnostics);
                clamp_non_negative(width, "width", diagnostics);
            }
            Drawing::Arc {
                radius,
                startangle,
                endangle,
                width,
                svgpath,
                ..
            } => {
                clamp_non_negative(width, "width", diagnostics);
                if svgpath.is_none() {
                    clamp_non_negative(radius, "radius", diagnostics);
                    (*startangle, *endangle) = normalize_arc_angles(*startangle, *endangle);
                }
            }
        }
    }
}

impl Text {
    pub fn normalize(&mut self, diagnostics: &mut Diagnostics) {
        clamp_non_negative(&mut self.thickness, "text thickness", diagnostics);
        clamp_non_negative(&mut self.height, "text height", diagnostics);
        clamp_non_negative(&mut self.width, "text width", diagnostics);
    }
}

impl DrawingItem {
    pub fn normalize(&mut self, diagnostics: &mut Diagnostics) {
        match self {
            DrawingItem::Shape(shape) => shape.normalize(diagnostics),
            DrawingItem::Text(text) => text.normalize(diagnostics),
            DrawingItem::Unsupported(_) => {}
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            DrawingItem::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Short description of an unsupported item, `None` for anything else.
    pub fn unsupported_kind(&self) -> Option<String> {
        match self {
            DrawingItem::Unsupported(value) => Some(match value.get("type") {
                Some(Value::String(kind)) => format!("'{kind}'"),
                Some(other) => other.to_string(),
                None => "without a type".to_string(),
            }),
            _ => None,
        }
    }
}

impl Pad {
    pub fn normalize(&mut self, diagnostics: &mut Diagnostics) {
        if self.size[0] < 0.0 || self.size[1] < 0.0 {
            diagnostics.warn(SOURCE, format!("negative pad size {:?} clamped", self.size));
            self.size = [self.size[0].abs(), self.size[1].abs()];
        }
        if let Some(radius) = self.radius.as_mut() {
            clamp_non_negative(radius, "pad corner radius", diagnostics);
        }
    }
}
