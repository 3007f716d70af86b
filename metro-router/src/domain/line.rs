//! Metro lines: display colour and physical shape paths.

use serde::{Deserialize, Serialize};

use crate::geo::{Coord, distance_km};

/// A line's presentation data: its colour and the polylines tracing its
/// physical route(s).
///
/// Circularity is a derived property, recomputed from the paths (or a
/// configured override) rather than stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    /// Display colour as a hex string, e.g. `#FFC300`.
    pub color: String,

    /// One or more shape polylines. A line may have several (branches,
    /// per-direction shapes).
    pub paths: Vec<Vec<Coord>>,
}

impl Line {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            paths: Vec::new(),
        }
    }

    /// Whether this line's shape forms a loop: it has at least one path, and
    /// every path's endpoints lie within `threshold_km` of each other.
    ///
    /// Paths with fewer than two points are ignored.
    pub fn is_circular(&self, threshold_km: f64) -> bool {
        let mut seen_path = false;
        for path in &self.paths {
            let (Some(first), Some(last)) = (path.first(), path.last()) else {
                continue;
            };
            if path.len() < 2 {
                continue;
            }
            seen_path = true;
            if distance_km(*first, *last) >= threshold_km {
                return false;
            }
        }
        seen_path
    }

    /// Close every open path by appending its first coordinate.
    ///
    /// Re-closing an already-closed path is a no-op, so this is idempotent.
    pub fn close_paths(&mut self) {
        for path in &mut self.paths {
            if path.len() < 2 {
                continue;
            }
            let (first, last) = (path[0], path[path.len() - 1]);
            if first != last {
                path.push(first);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Vec<Coord> {
        vec![
            Coord::new(0.0, 0.0),
            Coord::new(0.0, 0.1),
            Coord::new(0.1, 0.1),
            Coord::new(0.1, 0.0),
            Coord::new(0.0001, 0.0),
        ]
    }

    #[test]
    fn detects_near_closed_loop() {
        let mut line = Line::new("#FFC0CB");
        line.paths.push(ring());
        assert!(line.is_circular(0.05));
    }

    #[test]
    fn open_path_is_not_circular() {
        let mut line = Line::new("#FF0000");
        line.paths
            .push(vec![Coord::new(0.0, 0.0), Coord::new(0.0, 1.0)]);
        assert!(!line.is_circular(0.05));
    }

    #[test]
    fn no_paths_is_not_circular() {
        let line = Line::new("#FF0000");
        assert!(!line.is_circular(0.05));
    }

    #[test]
    fn all_paths_must_close() {
        let mut line = Line::new("#FFC0CB");
        line.paths.push(ring());
        line.paths
            .push(vec![Coord::new(5.0, 5.0), Coord::new(6.0, 6.0)]);
        assert!(!line.is_circular(0.05));
    }

    #[test]
    fn close_paths_is_idempotent() {
        let mut line = Line::new("#FFC0CB");
        line.paths.push(ring());

        line.close_paths();
        let closed_once = line.paths.clone();
        assert_eq!(closed_once[0].first(), closed_once[0].last());

        line.close_paths();
        assert_eq!(line.paths, closed_once);
    }
}
