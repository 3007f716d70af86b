//! Directed edges between adjacent stations.

use serde::{Deserialize, Serialize};

use crate::geo::Coord;

/// Error returned when constructing an invalid edge.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidEdge {
    /// Both endpoints are the same station.
    #[error("edge from {0:?} to itself")]
    SelfLoop(String),

    /// Distance is negative (or NaN).
    #[error("edge {from:?} -> {to:?} has invalid distance {distance}")]
    InvalidDistance {
        from: String,
        to: String,
        distance: f64,
    },
}

/// A directed arc to an adjacent station on a specific line.
///
/// Edges are stored in the network keyed by their origin station, so only the
/// target is recorded here. Two stations may be joined by several edges as
/// long as each is on a different line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Target station name.
    pub to: String,

    /// Weight in kilometres. Never negative.
    pub distance: f64,

    /// The line this edge belongs to.
    pub line: String,

    /// Optional polyline tracing the physical track between the two
    /// stations, for rendering. Absent for edges built without shape data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<Coord>>,
}

impl Edge {
    /// Construct an edge, rejecting self-loops and negative weights.
    ///
    /// `from` is only used for validation and error reporting; it is not
    /// stored on the edge itself.
    pub fn new(
        from: &str,
        to: impl Into<String>,
        line: impl Into<String>,
        distance: f64,
        shape: Option<Vec<Coord>>,
    ) -> Result<Self, InvalidEdge> {
        let to = to.into();
        if from == to {
            return Err(InvalidEdge::SelfLoop(to));
        }
        if !(distance >= 0.0) {
            return Err(InvalidEdge::InvalidDistance {
                from: from.to_string(),
                to,
                distance,
            });
        }
        Ok(Self {
            to,
            distance,
            line: line.into(),
            shape,
        })
    }

    /// The mirror of this edge, pointing back at `from` with the same weight
    /// and the shape reversed.
    pub fn reversed(&self, from: &str) -> Self {
        Self {
            to: from.to_string(),
            distance: self.distance,
            line: self.line.clone(),
            shape: self
                .shape
                .as_ref()
                .map(|s| s.iter().rev().copied().collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_self_loop() {
        let err = Edge::new("Dwarka", "Dwarka", "Blue", 1.0, None).unwrap_err();
        assert_eq!(err, InvalidEdge::SelfLoop("Dwarka".to_string()));
    }

    #[test]
    fn rejects_negative_distance() {
        assert!(matches!(
            Edge::new("Dwarka", "Janakpuri West", "Blue", -0.5, None),
            Err(InvalidEdge::InvalidDistance { .. })
        ));
    }

    #[test]
    fn rejects_nan_distance() {
        assert!(Edge::new("Dwarka", "Janakpuri West", "Blue", f64::NAN, None).is_err());
    }

    #[test]
    fn zero_distance_is_allowed() {
        assert!(Edge::new("A", "B", "Red", 0.0, None).is_ok());
    }

    #[test]
    fn reversed_flips_target_and_shape() {
        let shape = vec![Coord::new(0.0, 0.0), Coord::new(0.0, 0.5), Coord::new(0.0, 1.0)];
        let edge = Edge::new("A", "B", "Red", 2.0, Some(shape)).unwrap();
        let back = edge.reversed("A");

        assert_eq!(back.to, "A");
        assert_eq!(back.distance, 2.0);
        assert_eq!(back.line, "Red");
        assert_eq!(
            back.shape.unwrap(),
            vec![Coord::new(0.0, 1.0), Coord::new(0.0, 0.5), Coord::new(0.0, 0.0)]
        );
    }

    #[test]
    fn shape_field_omitted_when_absent() {
        let edge = Edge::new("A", "B", "Red", 1.0, None).unwrap();
        let json = serde_json::to_string(&edge).unwrap();
        assert!(!json.contains("shape"));
    }
}
