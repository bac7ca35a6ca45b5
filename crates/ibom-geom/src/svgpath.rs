//! Minimal SVG path interpreter.
//!
//! Understands `M L H V Z A` (absolute and relative). Cubic and quadratic
//! bezier commands are replaced by a straight line to their end point and
//! reported as a warning.

use std::f64::consts::PI;

use ibom_diagnostics::Diagnostics;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::Point;

const SOURCE: &str = "svgpath";

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([MmZzLlHhVvCcSsQqTtAa])|([-+]?[0-9]*\.?[0-9]+(?:[eE][-+]?[0-9]+)?)")
        .expect("path token regex is valid")
});

#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("path data starts with coordinates before any command at token {position}")]
    ImplicitCommand { position: usize },

    #[error("command '{command}' is missing arguments")]
    MissingArgument { command: char },

    #[error("invalid number '{0}' in path data")]
    InvalidNumber(String),

    #[error("no elliptical arc with radius ({rx}, {ry}) joins the given end points")]
    NoSuchArc { rx: f64, ry: f64 },
}

/// Axis-aligned extent of a single path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl SegmentBounds {
    fn from_extrema(xs: &[f64], ys: &[f64]) -> Self {
        let fold_min = |v: &[f64]| v.iter().copied().fold(f64::INFINITY, f64::min);
        let fold_max = |v: &[f64]| v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            min_x: fold_min(xs),
            max_x: fold_max(xs),
            min_y: fold_min(ys),
            max_y: fold_max(ys),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub start: Point,
    pub end: Point,
}

impl Line {
    pub fn bounds(&self) -> SegmentBounds {
        SegmentBounds::from_extrema(&[self.start[0], self.end[0]], &[self.start[1], self.end[1]])
    }
}

/// Elliptical arc in endpoint form, parameterized to center form on
/// construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub start: Point,
    pub end: Point,
    /// `(rx, ry)`, possibly scaled up so the ellipse reaches both end points.
    pub radius: Point,
    /// Rotation of the ellipse x-axis, degrees counter-clockwise.
    pub rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
    pub center: Point,
    /// Phase of the start point on the unit circle, degrees in `[-180, 180]`.
    pub theta: f64,
    /// Signed angular span, degrees; positive when `sweep` is set.
    pub delta: f64,
}

impl Arc {
    /// Solve for the ellipse center. Radii too small to connect the end
    /// points are scaled up uniformly when `autoscale` is set, otherwise
    /// [`PathError::NoSuchArc`] is returned.
    ///
    /// `start` and `end` must differ and both radii must be non-zero;
    /// [`parse_path`] handles those degenerate cases before calling this.
    pub fn new(
        start: Point,
        radius: Point,
        rotation: f64,
        large_arc: bool,
        sweep: bool,
        end: Point,
        autoscale: bool,
    ) -> Result<Self, PathError> {
        let mut rx = radius[0].abs();
        let mut ry = radius[1].abs();
        let phi = rotation.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();

        // Move the chord midpoint to the origin and align the ellipse axes.
        let dx = (start[0] - end[0]) / 2.0;
        let dy = (start[1] - end[1]) / 2.0;
        let x1p = cos_phi * dx + sin_phi * dy;
        let y1p = -sin_phi * dx + cos_phi * dy;

        let radius_check = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if radius_check > 1.0 {
            if !autoscale {
                return Err(PathError::NoSuchArc { rx, ry });
            }
            rx *= radius_check.sqrt();
            ry *= radius_check.sqrt();
        }

        let (rx_sqd, ry_sqd) = (rx * rx, ry * ry);
        let tmp = rx_sqd * y1p * y1p + ry_sqd * x1p * x1p;
        let radicand = (rx_sqd * ry_sqd - tmp) / tmp;
        let radical = if radicand > 0.0 { radicand.sqrt() } else { 0.0 };
        let sign = if large_arc == sweep { -1.0 } else { 1.0 };
        let cxp = sign * radical * (rx * y1p / ry);
        let cyp = sign * radical * (-ry * x1p / rx);

        let center = [
            cos_phi * cxp - sin_phi * cyp + (start[0] + end[0]) / 2.0,
            sin_phi * cxp + cos_phi * cyp + (start[1] + end[1]) / 2.0,
        ];

        // Map onto the unit circle.
        let u1 = [
            ((x1p - cxp) / rx).clamp(-1.0, 1.0),
            ((y1p - cyp) / ry).clamp(-1.0, 1.0),
        ];
        let u2 = [
            ((-x1p - cxp) / rx).clamp(-1.0, 1.0),
            ((-y1p - cyp) / ry).clamp(-1.0, 1.0),
        ];

        let theta = if u1[1] > 0.0 {
            u1[0].acos().to_degrees()
        } else if u1[1] < 0.0 {
            -u1[0].acos().to_degrees()
        } else if u1[0] > 0.0 {
            0.0
        } else {
            180.0
        };

        let det = u1[0] * u2[1] - u1[1] * u2[0];
        let dot = u1[0] * u2[0] + u1[1] * u2[1];
        let mut delta = if det > 0.0 {
            dot.clamp(-1.0, 1.0).acos().to_degrees()
        } else if det < 0.0 {
            -dot.clamp(-1.0, 1.0).acos().to_degrees()
        } else if dot > 0.0 {
            0.0
        } else {
            180.0
        };

        if !sweep && delta >= 0.0 {
            delta -= 360.0;
        } else if large_arc && delta <= 0.0 {
            delta += 360.0;
        }

        Ok(Self {
            start,
            end,
            radius: [rx, ry],
            rotation,
            large_arc,
            sweep,
            center,
            theta,
            delta,
        })
    }

    /// Point at parameter `t` in `[0, 1]` along the arc.
    pub fn point(&self, t: f64) -> Point {
        if t == 0.0 {
            return self.start;
        }
        if t == 1.0 {
            return self.end;
        }
        let angle = (self.theta + t * self.delta).to_radians();
        let (sin_phi, cos_phi) = self.rotation.to_radians().sin_cos();
        let (sin_a, cos_a) = angle.sin_cos();
        let [rx, ry] = self.radius;
        [
            rx * cos_phi * cos_a - ry * sin_phi * sin_a + self.center[0],
            rx * sin_phi * cos_a + ry * cos_phi * sin_a + self.center[1],
        ]
    }

    /// Exact extent: the end points plus every interior parameter where
    /// `dx/dt` or `dy/dt` vanishes.
    pub fn bounds(&self) -> SegmentBounds {
        let phi = self.rotation.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let [rx, ry] = self.radius;

        let (atan_x, atan_y) = if cos_phi == 0.0 {
            (PI / 2.0, 0.0)
        } else if sin_phi == 0.0 {
            (0.0, PI / 2.0)
        } else {
            (
                (-(ry / rx) * phi.tan()).atan(),
                ((ry / rx) / phi.tan()).atan(),
            )
        };

        let angle_inv = |ang: f64, k: i32| ((ang + PI * k as f64).to_degrees() - self.theta) / self.delta;

        let mut xs = vec![self.start[0], self.end[0]];
        let mut ys = vec![self.start[1], self.end[1]];
        for k in -4..=4 {
            let tx = angle_inv(atan_x, k);
            let ty = angle_inv(atan_y, k);
            if (0.0..=1.0).contains(&tx) {
                xs.push(self.point(tx)[0]);
            }
            if (0.0..=1.0).contains(&ty) {
                ys.push(self.point(ty)[1]);
            }
        }
        SegmentBounds::from_extrema(&xs, &ys)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    Line(Line),
    Arc(Arc),
}

impl PathSegment {
    pub fn bounds(&self) -> SegmentBounds {
        match self {
            PathSegment::Line(line) => line.bounds(),
            PathSegment::Arc(arc) => arc.bounds(),
        }
    }
}

enum Token<'a> {
    Command(char),
    Number(&'a str),
}

struct Tokens<'a> {
    tokens: Vec<Token<'a>>,
    next: usize,
}

impl<'a> Tokens<'a> {
    fn new(path: &'a str) -> Self {
        let tokens = TOKEN_RE
            .captures_iter(path)
            .filter_map(|caps| match (caps.get(1), caps.get(2)) {
                (Some(cmd), _) => cmd.as_str().chars().next().map(Token::Command),
                (None, Some(num)) => Some(Token::Number(num.as_str())),
                (None, None) => None,
            })
            .collect();
        Self { tokens, next: 0 }
    }

    fn peek_command(&self) -> Option<Option<char>> {
        self.tokens.get(self.next).map(|t| match t {
            Token::Command(c) => Some(*c),
            Token::Number(_) => None,
        })
    }

    fn number(&mut self, command: char) -> Result<f64, PathError> {
        match self.tokens.get(self.next) {
            Some(Token::Number(text)) => {
                self.next += 1;
                text.parse::<f64>()
                    .map_err(|_| PathError::InvalidNumber(text.to_string()))
            }
            _ => Err(PathError::MissingArgument { command }),
        }
    }

    fn point(&mut self, command: char) -> Result<Point, PathError> {
        Ok([self.number(command)?, self.number(command)?])
    }
}

fn add(a: Point, b: Point) -> Point {
    [a[0] + b[0], a[1] + b[1]]
}

/// Parse path data into lines and arcs.
///
/// An initial moveto is absolute even when written `m`. Degenerate arcs are
/// handled the way SVG renderers do: identical end points draw nothing and a
/// zero radius draws a straight line.
pub fn parse_path(path: &str, diagnostics: &mut Diagnostics) -> Result<Vec<PathSegment>, PathError> {
    let mut tokens = Tokens::new(path);
    let mut segments = Vec::new();
    let mut current: Point = [0.0, 0.0];
    let mut start: Option<Point> = None;
    let mut command: Option<char> = None;
    let mut absolute = false;

    while let Some(next) = tokens.peek_command() {
        if let Some(c) = next {
            tokens.next += 1;
            absolute = c.is_ascii_uppercase();
            command = Some(c.to_ascii_uppercase());
        }
        let Some(cmd) = command else {
            return Err(PathError::ImplicitCommand {
                position: tokens.next,
            });
        };

        match cmd {
            'M' => {
                let pos = tokens.point(cmd)?;
                current = if absolute { pos } else { add(current, pos) };
                start = Some(current);
                // Further implicit coordinates are linetos.
                command = Some('L');
            }
            'Z' => {
                let target = start.unwrap_or(current);
                if current != target {
                    segments.push(PathSegment::Line(Line {
                        start: current,
                        end: target,
                    }));
                }
                current = target;
                command = None;
            }
            'L' => {
                let mut pos = tokens.point(cmd)?;
                if !absolute {
                    pos = add(current, pos);
                }
                segments.push(PathSegment::Line(Line { start: current, end: pos }));
                current = pos;
            }
            'H' => {
                let x = tokens.number(cmd)?;
                let pos = [if absolute { x } else { current[0] + x }, current[1]];
                segments.push(PathSegment::Line(Line { start: current, end: pos }));
                current = pos;
            }
            'V' => {
                let y = tokens.number(cmd)?;
                let pos = [current[0], if absolute { y } else { current[1] + y }];
                segments.push(PathSegment::Line(Line { start: current, end: pos }));
                current = pos;
            }
            'C' | 'S' | 'Q' | 'T' => {
                let (controls, kind) = match cmd {
                    'C' => (2, "cubic bezier"),
                    'S' => (1, "smooth cubic bezier"),
                    'Q' => (1, "quadratic bezier"),
                    _ => (0, "smooth quadratic bezier"),
                };
                diagnostics.warn(
                    SOURCE,
                    format!("{kind} segment is not supported and was replaced by a line segment"),
                );
                for _ in 0..controls {
                    tokens.point(cmd)?;
                }
                let mut end = tokens.point(cmd)?;
                if !absolute {
                    end = add(current, end);
                }
                segments.push(PathSegment::Line(Line { start: current, end }));
                current = end;
            }
            'A' => {
                let radius = tokens.point(cmd)?;
                let rotation = tokens.number(cmd)?;
                let large_arc = tokens.number(cmd)? != 0.0;
                let sweep = tokens.number(cmd)? != 0.0;
                let mut end = tokens.point(cmd)?;
                if !absolute {
                    end = add(current, end);
                }
                if end == current {
                    continue;
                }
                if radius[0] == 0.0 || radius[1] == 0.0 {
                    segments.push(PathSegment::Line(Line { start: current, end }));
                } else {
                    let arc = Arc::new(current, radius, rotation, large_arc, sweep, end, true)?;
                    segments.push(PathSegment::Arc(arc));
                }
                current = end;
            }
            other => unreachable!("tokenizer only yields path commands, got {other}"),
        }
    }

    Ok(segments)
}

fn limit_digits(value: f64) -> String {
    let text = format!("{value:.6}");
    let text = text.trim_end_matches('0');
    text.trim_end_matches('.').to_string()
}

fn different_points(a: Point, b: Point) -> bool {
    (a[0] - b[0]).abs() > 1e-6 || (a[1] - b[1]).abs() > 1e-6
}

/// Build path data from polylines and `(center, radius)` circles.
///
/// A polyline continuing from the previous one's last point is joined
/// without a new moveto. Circles are written as two half arcs.
pub fn create_path(lines: &[Vec<Point>], circles: &[(Point, f64)]) -> String {
    let mut path = String::new();

    let mut previous_end: Option<Point> = None;
    for line in lines {
        let Some((first, rest)) = line.split_first() else {
            continue;
        };
        if previous_end.is_none_or(|end| different_points(end, *first)) {
            path.push_str(&format!("M{},{}", limit_digits(first[0]), limit_digits(first[1])));
        }
        for point in rest {
            path.push_str(&format!("L{},{}", limit_digits(point[0]), limit_digits(point[1])));
        }
        previous_end = line.last().copied();
    }

    for &(center, r) in circles {
        let r_text = limit_digits(r);
        let d_text = limit_digits(r + r);
        path.push_str(&format!(
            "M{},{}",
            limit_digits(center[0] - r),
            limit_digits(center[1])
        ));
        path.push_str(&format!("a {r_text},{r_text} 0 1,0 {d_text},0"));
        path.push_str(&format!("a {r_text},{r_text} 0 1,0 -{d_text},0"));
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_quarter_arc_center_and_span() {
        let arc = Arc::new([5.0, 0.0], [5.0, 5.0], 0.0, false, true, [0.0, 5.0], true).unwrap();
        assert!(approx(arc.center[0], 0.0) && approx(arc.center[1], 0.0));
        assert!(approx(arc.theta, 0.0));
        assert!(approx(arc.delta, 90.0));

        let b = arc.bounds();
        assert!(approx(b.min_x, 0.0) && approx(b.max_x, 5.0));
        assert!(approx(b.min_y, 0.0) && approx(b.max_y, 5.0));
    }

    #[test]
    fn test_half_circle_reaches_apex() {
        // From (1,0) to (-1,0) counter-clockwise passes through (0,1).
        let arc = Arc::new([1.0, 0.0], [1.0, 1.0], 0.0, false, true, [-1.0, 0.0], true).unwrap();
        let b = arc.bounds();
        assert!(approx(b.max_y, 1.0));
        assert!(approx(b.min_y, 0.0));
        assert!(approx(b.min_x, -1.0) && approx(b.max_x, 1.0));
    }

    #[test]
    fn test_radius_is_scaled_when_too_small() {
        let arc = Arc::new([0.0, 0.0], [1.0, 1.0], 0.0, false, true, [4.0, 0.0], true).unwrap();
        assert!(approx(arc.radius[0], 2.0));
        assert!(approx(arc.center[0], 2.0));

        let err = Arc::new([0.0, 0.0], [1.0, 1.0], 0.0, false, true, [4.0, 0.0], false);
        assert!(matches!(err, Err(PathError::NoSuchArc { .. })));
    }

    #[test]
    fn test_clockwise_sweep_has_negative_delta() {
        let arc = Arc::new([5.0, 0.0], [5.0, 5.0], 0.0, false, false, [0.0, 5.0], true).unwrap();
        assert!(arc.delta < 0.0);
        assert!(approx(arc.delta, -90.0));
        assert!(approx(arc.center[0], 5.0) && approx(arc.center[1], 5.0));
    }

    #[test]
    fn test_parse_relative_and_close() {
        let mut diagnostics = Diagnostics::new();
        let segments = parse_path("m1,1 h2 v2 H1 z", &mut diagnostics).unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(
            segments[3],
            PathSegment::Line(Line {
                start: [1.0, 3.0],
                end: [1.0, 1.0]
            })
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_beziers_degrade_to_lines_with_one_warning() {
        let mut diagnostics = Diagnostics::new();
        let segments = parse_path("M0 0 C1 1 2 2 3 0 C4 1 5 1 6 0", &mut diagnostics).unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(
            segments[1],
            PathSegment::Line(Line {
                start: [3.0, 0.0],
                end: [6.0, 0.0]
            })
        );
        assert_eq!(diagnostics.warnings().len(), 1);
    }

    #[test]
    fn test_degenerate_arcs() {
        let mut diagnostics = Diagnostics::new();
        let segments = parse_path("M0,0 A1,1 0 0,1 0,0 A0,1 0 0,1 2,0", &mut diagnostics).unwrap();
        assert_eq!(
            segments,
            vec![PathSegment::Line(Line {
                start: [0.0, 0.0],
                end: [2.0, 0.0]
            })]
        );
    }

    #[test]
    fn test_parse_errors() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(
            parse_path("1 2 L3 4", &mut diagnostics),
            Err(PathError::ImplicitCommand { position: 0 })
        );
        assert_eq!(
            parse_path("M1 2 L3", &mut diagnostics),
            Err(PathError::MissingArgument { command: 'L' })
        );
    }

    #[test]
    fn test_create_path_joins_and_trims_digits() {
        let lines = vec![
            vec![[0.0, 0.0], [1.5, 0.0]],
            vec![[1.5, 0.0], [1.5, 2.25]],
            vec![[10.0, 10.0], [11.0, 10.0]],
        ];
        assert_eq!(
            create_path(&lines, &[([1.0, 1.0], 0.5)]),
            "M0,0L1.5,0L1.5,2.25M10,10L11,10M0.5,1a 0.5,0.5 0 1,0 1,0a 0.5,0.5 0 1,0 -1,0"
        );
    }

    #[test]
    fn test_circle_path_reads_back_with_full_extent() {
        let mut diagnostics = Diagnostics::new();
        let path = create_path(&[], &[([2.0, 3.0], 1.0)]);
        let segments = parse_path(&path, &mut diagnostics).unwrap();
        assert_eq!(segments.len(), 2);

        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for segment in &segments {
            let b = segment.bounds();
            min_y = min_y.min(b.min_y);
            max_y = max_y.max(b.max_y);
        }
        assert!(approx(min_y, 2.0));
        assert!(approx(max_y, 4.0));
    }
}
