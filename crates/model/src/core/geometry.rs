//! Minimal geometry literal model.
//!
//! Geometries only travel through the compiler as bound parameters, so the
//! model carries coordinates, an optional SRID and a WKT encoding. There is no
//! topology here.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Coord { x, y }
    }
}

/// Axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min: Coord,
    pub max: Coord,
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Envelope {
            min: Coord::new(min_x.min(max_x), min_y.min(max_y)),
            max: Coord::new(min_x.max(max_x), min_y.max(max_y)),
        }
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }

    fn expand(&mut self, c: &Coord) {
        self.min.x = self.min.x.min(c.x);
        self.min.y = self.min.y.min(c.y);
        self.max.x = self.max.x.max(c.x);
        self.max.y = self.max.y.max(c.y);
    }

    /// Closed exterior ring, counter-clockwise from the lower left corner.
    fn ring(&self) -> Vec<Coord> {
        vec![
            self.min,
            Coord::new(self.max.x, self.min.y),
            self.max,
            Coord::new(self.min.x, self.max.y),
            self.min,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Point(Coord),
    LineString(Vec<Coord>),
    /// Exterior ring followed by interior rings.
    Polygon(Vec<Vec<Coord>>),
    Envelope(Envelope),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub shape: Shape,
    pub srid: Option<i32>,
}

impl Geometry {
    pub fn new(shape: Shape) -> Self {
        Geometry { shape, srid: None }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::new(Shape::Point(Coord::new(x, y)))
    }

    pub fn envelope(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(Shape::Envelope(Envelope::new(min_x, min_y, max_x, max_y)))
    }

    pub fn line_string(coords: Vec<Coord>) -> Self {
        Self::new(Shape::LineString(coords))
    }

    pub fn polygon(rings: Vec<Vec<Coord>>) -> Self {
        Self::new(Shape::Polygon(rings))
    }

    pub fn with_srid(mut self, srid: i32) -> Self {
        self.srid = Some(srid);
        self
    }

    /// Bounding box of the geometry, `None` for empty line strings / polygons.
    pub fn bounds(&self) -> Option<Envelope> {
        let coords: Vec<Coord> = match &self.shape {
            Shape::Point(c) => vec![*c],
            Shape::Envelope(env) => return Some(*env),
            Shape::LineString(coords) => coords.clone(),
            Shape::Polygon(rings) => rings.first().cloned().unwrap_or_default(),
        };

        let (first, rest) = coords.split_first()?;
        let mut env = Envelope {
            min: *first,
            max: *first,
        };
        for c in rest {
            env.expand(c);
        }
        Some(env)
    }

    /// Well-known text; envelopes are written as their polygon.
    pub fn to_wkt(&self) -> String {
        match &self.shape {
            Shape::Point(c) => format!("POINT({})", fmt_coord(c)),
            Shape::LineString(coords) => format!("LINESTRING({})", fmt_coords(coords)),
            Shape::Polygon(rings) => format!("POLYGON({})", fmt_rings(rings)),
            Shape::Envelope(env) => format!("POLYGON({})", fmt_rings(&[env.ring()])),
        }
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.srid {
            Some(srid) => write!(f, "SRID={srid};{}", self.to_wkt()),
            None => write!(f, "{}", self.to_wkt()),
        }
    }
}

fn fmt_coord(c: &Coord) -> String {
    format!("{} {}", c.x, c.y)
}

fn fmt_coords(coords: &[Coord]) -> String {
    coords.iter().map(fmt_coord).collect::<Vec<_>>().join(", ")
}

fn fmt_rings(rings: &[Vec<Coord>]) -> String {
    rings
        .iter()
        .map(|ring| format!("({})", fmt_coords(ring)))
        .collect::<Vec<_>>()
        .join(", ")
}
