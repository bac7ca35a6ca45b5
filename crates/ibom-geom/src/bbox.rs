use ibom_diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};

use crate::drawing::{Drawing, DrawingItem, Pad, PadShape, Text};
use crate::svgpath::{self, Arc, SegmentBounds};
use crate::Point;

const SOURCE: &str = "bbox";

/// Rotate `point` about `pivot` by `angle` degrees, counter-clockwise
/// in board coordinates.
pub fn rotate(point: Point, pivot: Point, angle: f64) -> Point {
    let (sin, cos) = angle.to_radians().sin_cos();
    let dx = point[0] - pivot[0];
    let dy = point[1] - pivot[1];
    [
        pivot[0] + dx * cos - dy * sin,
        pivot[1] + dx * sin + dy * cos,
    ]
}

/// Board outline extent as stored in the document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgesBbox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

/// Footprint box in the viewer's relative form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintBbox {
    pub pos: Point,
    pub relpos: Point,
    pub size: Point,
    pub angle: f64,
}

/// Growing axis-aligned box. Extents are `None` until the first point.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundingBox {
    x0: Option<f64>,
    y0: Option<f64>,
    x1: Option<f64>,
    y1: Option<f64>,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn initialized(&self) -> bool {
        self.x0.is_some()
    }

    /// `(x0, y0, x1, y1)`, or `None` while nothing has been absorbed.
    pub fn extents(&self) -> Option<(f64, f64, f64, f64)> {
        Some((self.x0?, self.y0?, self.x1?, self.y1?))
    }

    pub fn add_point(&mut self, x: f64, y: f64) -> &mut Self {
        self.x0 = Some(self.x0.map_or(x, |v| v.min(x)));
        self.y0 = Some(self.y0.map_or(y, |v| v.min(y)));
        self.x1 = Some(self.x1.map_or(x, |v| v.max(x)));
        self.y1 = Some(self.y1.map_or(y, |v| v.max(y)));
        self
    }

    /// Absorb `(x, y)` after rotating it about `pivot`.
    pub fn add_point_rotated(&mut self, x: f64, y: f64, pivot: Point, angle: f64) -> &mut Self {
        let [rx, ry] = rotate([x, y], pivot, angle);
        self.add_point(rx, ry)
    }

    /// Segment with round caps of radius `r`.
    pub fn add_segment(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, r: f64) -> &mut Self {
        self.add_circle(x0, y0, r);
        self.add_circle(x1, y1, r)
    }

    pub fn add_circle(&mut self, x: f64, y: f64, r: f64) -> &mut Self {
        self.add_point(x - r, y);
        self.add_point(x, y - r);
        self.add_point(x + r, y);
        self.add_point(x, y + r)
    }

    /// `w` by `h` rectangle centered on `(x, y)`, rotated by `angle` about
    /// its center.
    pub fn add_rectangle(&mut self, x: f64, y: f64, w: f64, h: f64, angle: f64) -> &mut Self {
        let (hw, hh) = (w / 2.0, h / 2.0);
        for (dx, dy) in [(-hw, -hh), (hw, -hh), (-hw, hh), (hw, hh)] {
            self.add_point_rotated(x + dx, y + dy, [x, y], angle);
        }
        self
    }

    /// Circular arc of radius `r` around `(cx, cy)` from `start_angle` to
    /// `end_angle` (degrees, counter-clockwise), stroked with `width`.
    pub fn add_arc(
        &mut self,
        cx: f64,
        cy: f64,
        r: f64,
        start_angle: f64,
        end_angle: f64,
        width: f64,
    ) -> &mut Self {
        let half = width / 2.0;
        let span = end_angle - start_angle;
        if span.abs() >= 360.0 || r == 0.0 {
            return self.add_circle(cx, cy, r + half);
        }

        let point_at = |angle: f64| {
            let (sin, cos) = angle.to_radians().sin_cos();
            [cx + r * cos, cy + r * sin]
        };
        let start = point_at(start_angle);
        let end = point_at(end_angle);
        let (start, end) = if span < 0.0 { (end, start) } else { (start, end) };
        let bounds = match Arc::new(start, [r, r], 0.0, span.abs() > 180.0, true, end, true) {
            Ok(arc) if start != end => arc.bounds(),
            _ => SegmentBounds {
                min_x: start[0].min(end[0]),
                max_x: start[0].max(end[0]),
                min_y: start[1].min(end[1]),
                max_y: start[1].max(end[1]),
            },
        };
        self.add_bounds(&bounds, half)
    }

    fn add_bounds(&mut self, bounds: &SegmentBounds, pad: f64) -> &mut Self {
        self.add_point(bounds.min_x - pad, bounds.min_y - pad);
        self.add_point(bounds.max_x + pad, bounds.max_y + pad)
    }

    /// Absorb every segment of an SVG path, grown by half the stroke
    /// `width`. Unparseable paths are skipped with a warning.
    pub fn add_svgpath(&mut self, path: &str, width: f64, diagnostics: &mut Diagnostics) -> &mut Self {
        match svgpath::parse_path(path, diagnostics) {
            Ok(segments) => {
                for segment in segments {
                    self.add_bounds(&segment.bounds(), width / 2.0);
                }
            }
            Err(e) => diagnostics.warn(SOURCE, format!("skipping unparseable path: {e}")),
        }
        self
    }

    fn add_polygons(&mut self, polygons: &[Vec<Point>], pos: Point, angle: f64, pad: f64) -> &mut Self {
        for point in polygons.iter().flatten() {
            let [x, y] = rotate(*point, [0.0, 0.0], angle);
            let (x, y) = (x + pos[0], y + pos[1]);
            if pad > 0.0 {
                self.add_circle(x, y, pad);
            } else {
                self.add_point(x, y);
            }
        }
        self
    }

    pub fn add_drawing(&mut self, drawing: &Drawing, diagnostics: &mut Diagnostics) -> &mut Self {
        match drawing {
            Drawing::Segment { start, end, width } => {
                self.add_segment(start[0], start[1], end[0], end[1], width / 2.0)
            }
            Drawing::Rect { start, end, width } => {
                let half = width / 2.0;
                self.add_point(start[0].min(end[0]) - half, start[1].min(end[1]) - half);
                self.add_point(start[0].max(end[0]) + half, start[1].max(end[1]) + half)
            }
            Drawing::Circle {
                center,
                radius,
                width,
                ..
            } => self.add_circle(center[0], center[1], radius + width / 2.0),
            Drawing::Arc {
                svgpath: Some(path),
                width,
                ..
            } => self.add_svgpath(path, *width, diagnostics),
            Drawing::Arc {
                center,
                radius,
                startangle,
                endangle,
                width,
                svgpath: None,
            } => self.add_arc(center[0], center[1], *radius, *startangle, *endangle, *width),
            Drawing::Curve {
                start,
                end,
                cpa,
                cpb,
                width,
            } => {
                // Control hull contains the whole curve.
                let half = width / 2.0;
                for p in [start, cpa, cpb, end] {
                    self.add_circle(p[0], p[1], half);
                }
                self
            }
            Drawing::Polygon {
                svgpath: Some(path),
                width,
                ..
            } => self.add_svgpath(path, *width, diagnostics),
            Drawing::Polygon {
                pos,
                angle,
                polygons,
                width,
                svgpath: None,
                ..
            } => self.add_polygons(polygons, *pos, -angle, width / 2.0),
        }
    }

    pub fn add_text(&mut self, text: &Text, diagnostics: &mut Diagnostics) -> &mut Self {
        match &text.svgpath {
            Some(path) => self.add_svgpath(path, text.thickness, diagnostics),
            None => self.add_point(text.pos[0], text.pos[1]),
        }
    }

    pub fn add_item(&mut self, item: &DrawingItem, diagnostics: &mut Diagnostics) -> &mut Self {
        match item {
            DrawingItem::Shape(shape) => self.add_drawing(shape, diagnostics),
            DrawingItem::Text(text) => self.add_text(text, diagnostics),
            DrawingItem::Unsupported(_) => {
                if let Some(kind) = item.unsupported_kind() {
                    diagnostics.warn(SOURCE, format!("Unsupported drawing {kind}, skipping"));
                }
                self
            }
        }
    }

    pub fn add_pad(&mut self, pad: &Pad, diagnostics: &mut Diagnostics) -> &mut Self {
        let [x, y] = pad.pos;
        match pad.shape {
            PadShape::Rect | PadShape::Oval | PadShape::Roundrect | PadShape::Chamfrect => {
                self.add_rectangle(x, y, pad.size[0], pad.size[1], pad.angle)
            }
            PadShape::Circle => self.add_circle(x, y, pad.size[0] / 2.0),
            PadShape::Custom => match (&pad.svgpath, &pad.polygons) {
                (Some(path), _) => self.add_svgpath(path, 0.0, diagnostics),
                (None, Some(polygons)) => self.add_polygons(polygons, pad.pos, pad.angle, 0.0),
                (None, None) => {
                    diagnostics.warn(
                        SOURCE,
                        "custom pad without geometry, using its size instead",
                    );
                    self.add_rectangle(x, y, pad.size[0], pad.size[1], pad.angle)
                }
            },
        }
    }

    /// Union with another box. An empty `other` changes nothing.
    pub fn add(&mut self, other: &BoundingBox) -> &mut Self {
        if let Some((x0, y0, x1, y1)) = other.extents() {
            self.add_point(x0, y0);
            self.add_point(x1, y1);
        }
        self
    }

    /// Grow every side by `amount`; no-op on an empty box.
    pub fn pad(&mut self, amount: f64) -> &mut Self {
        if let Some((x0, y0, x1, y1)) = self.extents() {
            self.x0 = Some(x0 - amount);
            self.y0 = Some(y0 - amount);
            self.x1 = Some(x1 + amount);
            self.y1 = Some(y1 + amount);
        }
        self
    }

    pub fn to_dict(&self) -> Option<EdgesBbox> {
        let (minx, miny, maxx, maxy) = self.extents()?;
        Some(EdgesBbox {
            minx,
            miny,
            maxx,
            maxy,
        })
    }

    pub fn to_component_dict(&self) -> Option<FootprintBbox> {
        let (x0, y0, x1, y1) = self.extents()?;
        Some(FootprintBbox {
            pos: [x0, y0],
            relpos: [0.0, 0.0],
            size: [x1 - x0, y1 - y0],
            angle: 0.0,
        })
    }
}
