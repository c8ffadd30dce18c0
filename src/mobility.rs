//! Geometric helpers used to accumulate the distance a message travels along its path.
use slog::{Key, Record, Serializer, Value};
use std::num::ParseFloatError;
use std::str::FromStr;

///Struct to encapsule the 2D position of a node
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default, Copy)]
pub struct Position {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        euclidean_distance(self.x, self.y, other.x, other.y)
    }
}

impl FromStr for Position {
    type Err = ParseFloatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let coords: Vec<&str> = s
            .trim_matches(|p| p == '(' || p == ')' || p == '"')
            .split(',')
            .collect();

        let x_fromstr = coords[0].trim().parse::<f64>()?;
        let y_fromstr = coords.get(1).unwrap_or(&"").trim().parse::<f64>()?;

        Ok(Position {
            x: x_fromstr,
            y: y_fromstr,
        })
    }
}

impl Value for Position {
    fn serialize(&self, _rec: &Record, key: Key, serializer: &mut dyn Serializer) -> slog::Result {
        let val = format!("({},{})", self.x, self.y);
        serializer.emit_str(key, &val)
    }
}

pub fn euclidean_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let xs = (x2 - x1).powf(2.0);
    let ys = (y2 - y1).powf(2.0);
    (xs + ys).sqrt()
}

/// Distance contributed by the hop that delivered a message to a node at `here`.
/// A message whose previous hop was recorded at the same location (or that carries
/// no location at all) contributes nothing.
pub fn hop_distance(previous_hop: Option<&Position>, here: &Position) -> f64 {
    match previous_hop {
        Some(prev) if prev != here => prev.distance(here),
        _ => 0f64,
    }
}
