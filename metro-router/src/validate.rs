//! Structural validation of a built network.
//!
//! Checks a [`Network`] against the build policy it was (supposedly) built
//! under and reports every violation found. Purely diagnostic: the network is
//! never mutated, and a nonempty report does not make it unusable — though
//! callers relying on bidirectional or circular guarantees should treat one
//! as a build failure.

use tracing::warn;

use crate::builder::BuildConfig;
use crate::domain::Network;
use crate::geo::{Coord, distance_km};

/// Mirror edges may differ in weight by at most this much (km).
pub const WEIGHT_TOLERANCE_KM: f64 = 1e-6;

/// A structural problem found in a network.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Violation {
    /// An edge has no mirror with a matching weight, under a policy that
    /// requires one.
    #[error("missing reverse edge for {from} -> {to} on line {line}")]
    MissingReverseEdge {
        from: String,
        to: String,
        line: String,
    },

    /// A circular line's shape is open and no closing edge exists.
    #[error("circular line {line} is not closed by shape or edges")]
    UnclosedCircularLine { line: String },
}

/// Check `network` against `config`'s policies.
///
/// Returns every violation found, not just the first; an empty list means the
/// network is well-formed under this policy.
pub fn validate(network: &Network, config: &BuildConfig) -> Vec<Violation> {
    let mut violations = Vec::new();

    if config.add_reverse_edges {
        for (from, edges) in &network.edges {
            for edge in edges {
                let mirrored = network.edges_from(&edge.to).iter().any(|back| {
                    back.to == *from
                        && back.line == edge.line
                        && (back.distance - edge.distance).abs() <= WEIGHT_TOLERANCE_KM
                });
                if !mirrored {
                    violations.push(Violation::MissingReverseEdge {
                        from: from.clone(),
                        to: edge.to.clone(),
                        line: edge.line.clone(),
                    });
                }
            }
        }
    }

    for name in &config.circular_lines {
        if !network.lines.contains_key(name) {
            warn!(line = %name, "declared circular line is not in the network");
        }
    }

    for (name, line) in &network.lines {
        let circular = config.circular_lines.contains(name)
            || line.is_circular(config.circular_threshold_km);
        if !circular {
            continue;
        }

        if line.paths.iter().all(|p| p.len() < 2) {
            // Nothing to check closure against.
            warn!(line = %name, "circular line has no usable shape paths");
            continue;
        }

        let closed = line
            .paths
            .iter()
            .any(|path| path_is_closed(network, path, name, config));
        if !closed {
            violations.push(Violation::UnclosedCircularLine { line: name.clone() });
        }
    }

    violations
}

/// A path closes the loop if its endpoints coincide within tolerance, or if
/// the stations nearest its endpoints are joined by a closing edge on this
/// line.
fn path_is_closed(network: &Network, path: &[Coord], line: &str, config: &BuildConfig) -> bool {
    if path.len() < 2 {
        return false;
    }
    let (first, last) = (path[0], path[path.len() - 1]);
    if distance_km(first, last) < config.circular_threshold_km {
        return true;
    }

    let first_station = nearest_station(network, first, config.circular_threshold_km);
    let last_station = nearest_station(network, last, config.circular_threshold_km);
    match (first_station, last_station) {
        (Some(first_station), Some(last_station)) => {
            network.has_edge(last_station, first_station, line)
        }
        _ => false,
    }
}

fn nearest_station(network: &Network, point: Coord, threshold_km: f64) -> Option<&str> {
    network
        .stations
        .values()
        .map(|s| (s.name.as_str(), distance_km(s.coords, point)))
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .filter(|(_, d)| *d <= threshold_km)
        .map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::feed::{Feed, LineRecord, StopVisit, Trip};

    fn trip(id: &str, line: &str, stops: &[(&str, f64, f64)]) -> Trip {
        Trip {
            id: id.to_string(),
            stops: stops
                .iter()
                .map(|(name, lat, lon)| StopVisit {
                    station: (*name).to_string(),
                    coord: Coord::new(*lat, *lon),
                    line: line.to_string(),
                })
                .collect(),
            shape: None,
        }
    }

    fn built() -> (Network, BuildConfig) {
        let config = BuildConfig::default().with_circular_line("Pink");
        let feed = Feed {
            trips: vec![
                trip("T1", "Red", &[("A", 0.0, 0.0), ("B", 0.0, 0.01), ("C", 0.0, 0.02)]),
                trip(
                    "T2",
                    "Pink",
                    &[
                        ("P1", 0.01, 0.0),
                        ("P2", 0.01, 0.01),
                        ("P3", 0.02, 0.01),
                        ("P4", 0.02, 0.0),
                    ],
                ),
            ],
            lines: vec![LineRecord {
                name: "Pink".to_string(),
                color: "#FFC0CB".to_string(),
                paths: vec![vec![
                    Coord::new(0.01, 0.0),
                    Coord::new(0.01, 0.01),
                    Coord::new(0.02, 0.01),
                    Coord::new(0.02, 0.0),
                ]],
            }],
        };
        let (network, report) = build(&feed, &config);
        assert!(report.is_clean());
        (network, config)
    }

    #[test]
    fn freshly_built_network_is_clean() {
        let (network, config) = built();
        assert_eq!(validate(&network, &config), vec![]);
    }

    #[test]
    fn missing_mirror_is_reported() {
        let (mut network, config) = built();
        // Drop B -> A.
        let edges = network.edges.get_mut("B").unwrap();
        edges.retain(|e| e.to != "A");

        let violations = validate(&network, &config);
        assert_eq!(
            violations,
            vec![Violation::MissingReverseEdge {
                from: "A".to_string(),
                to: "B".to_string(),
                line: "Red".to_string(),
            }]
        );
    }

    #[test]
    fn mirror_with_wrong_weight_is_reported() {
        let (mut network, config) = built();
        let edges = network.edges.get_mut("B").unwrap();
        for edge in edges.iter_mut() {
            if edge.to == "A" {
                edge.distance += 0.5;
            }
        }

        let violations = validate(&network, &config);
        // Both directions now lack a weight-matched mirror.
        assert_eq!(violations.len(), 2);
        assert!(violations.iter().all(|v| matches!(
            v,
            Violation::MissingReverseEdge { line, .. } if line == "Red"
        )));
    }

    #[test]
    fn reverse_check_skipped_when_policy_off() {
        let (mut network, mut config) = built();
        network.edges.get_mut("B").unwrap().retain(|e| e.to != "A");
        config.add_reverse_edges = false;

        assert_eq!(validate(&network, &config), vec![]);
    }

    #[test]
    fn unclosed_circular_line_is_reported() {
        let (mut network, config) = built();
        // Re-open the Pink shape and drop the closing edges.
        let pink = network.lines.get_mut("Pink").unwrap();
        for path in &mut pink.paths {
            path.pop();
        }
        network.edges.get_mut("P4").unwrap().retain(|e| e.to != "P1");
        network.edges.get_mut("P1").unwrap().retain(|e| e.to != "P4");

        let violations = validate(&network, &config);
        assert!(violations.contains(&Violation::UnclosedCircularLine {
            line: "Pink".to_string()
        }));
    }

    #[test]
    fn open_shape_with_closing_edge_is_accepted() {
        let (mut network, config) = built();
        // Open the shape but keep the closing edge P4 -> P1.
        let pink = network.lines.get_mut("Pink").unwrap();
        for path in &mut pink.paths {
            path.pop();
        }
        assert!(network.has_edge("P4", "P1", "Pink"));

        assert_eq!(validate(&network, &config), vec![]);
    }

    #[test]
    fn all_violations_are_collected() {
        let (mut network, config) = built();
        network.edges.get_mut("B").unwrap().retain(|e| e.to != "A");
        network.edges.get_mut("C").unwrap().retain(|e| e.to != "B");

        let violations = validate(&network, &config);
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn non_circular_lines_are_not_closure_checked() {
        let (network, _) = built();
        // Same network, but nothing declared circular and the Pink shape
        // still closed from the build; Red stays open and that is fine.
        let config = BuildConfig::default();
        assert_eq!(validate(&network, &config), vec![]);
    }
}
