//! Build configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Policy knobs for the network builder (and, since the validator checks the
/// same policies, for validation too).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Lines forced to be treated as circular, whatever their shapes say.
    pub circular_lines: BTreeSet<String>,

    /// How close (km) a shape path's endpoints must be for the path to count
    /// as closed.
    pub circular_threshold_km: f64,

    /// Insert a mirror edge for every edge.
    pub add_reverse_edges: bool,

    /// Two sightings of the same station name further apart than this (km)
    /// are treated as a name collision, not the same station.
    pub collision_threshold_km: f64,
}

impl BuildConfig {
    /// Mark a line as circular regardless of shape detection.
    pub fn with_circular_line(mut self, line: impl Into<String>) -> Self {
        self.circular_lines.insert(line.into());
        self
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            circular_lines: BTreeSet::new(),
            circular_threshold_km: 0.05, // ~50 m
            add_reverse_edges: true,
            collision_threshold_km: 5.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BuildConfig::default();
        assert!(config.circular_lines.is_empty());
        assert_eq!(config.circular_threshold_km, 0.05);
        assert!(config.add_reverse_edges);
        assert_eq!(config.collision_threshold_km, 5.0);
    }

    #[test]
    fn with_circular_line() {
        let config = BuildConfig::default().with_circular_line("Pink");
        assert!(config.circular_lines.contains("Pink"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: BuildConfig =
            serde_json::from_str(r#"{"circular_lines": ["Pink"]}"#).unwrap();
        assert!(config.circular_lines.contains("Pink"));
        assert_eq!(config.circular_threshold_km, 0.05);
        assert!(config.add_reverse_edges);
    }
}
