//! Shortest-route search over a built network.
//!
//! Uniform-cost search on states of `(station, line used to arrive)`, so a
//! line change can be charged exactly when consecutive edges disagree on
//! their line. The frontier is a binary heap keyed on `f = g + h`, giving
//! O(E log V); `h` is zero for Dijkstra and the great-circle distance to the
//! goal for A*. The heuristic never overestimates (remaining cost is at least
//! the straight-line distance), so A* results are cost-optimal and a settled
//! state is never reopened.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, trace};

use super::config::{Algorithm, RouteConfig};
use crate::domain::{Edge, Network};
use crate::geo::{Coord, distance_km};

/// Error from route search. "No route exists" is not an error; see
/// [`SearchResult`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    /// The start or goal name is not a station in the network.
    #[error("unknown station: {0}")]
    UnknownStation(String),
}

/// One traversed edge of an itinerary, with coordinates for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSegment {
    pub from: String,
    pub to: String,
    pub line: String,

    /// The edge's stored polyline when it has one, otherwise just the two
    /// station coordinates.
    pub coords: Vec<Coord>,
}

/// A found route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    /// Stations in travel order, including start and goal.
    pub route: Vec<String>,

    /// Lines used, in order, with consecutive duplicates collapsed.
    pub lines: Vec<String>,

    pub segments: Vec<RouteSegment>,

    /// Sum of traversed edge weights, in km. Transfer penalties are a
    /// search-cost device and are never included here.
    pub total_km: f64,

    /// Number of stations on the route.
    pub stops: usize,
}

/// Outcome of a search, successful or not, plus instrumentation.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// The best itinerary, or `None` when the goal is unreachable.
    pub itinerary: Option<Itinerary>,

    /// How many states the search settled before finishing. Useful for
    /// comparing the two algorithms on the same network.
    pub nodes_visited: usize,
}

/// Search state: a station together with the line used to arrive there.
/// The start has no arrival line.
type StateKey<'a> = (&'a str, Option<&'a str>);

#[derive(Debug, Clone, Copy)]
struct QueueEntry<'a> {
    f: f64,
    g: f64,
    station: &'a str,
    line: Option<&'a str>,
}

impl Eq for QueueEntry<'_> {}

impl PartialEq for QueueEntry<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for QueueEntry<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the smallest f pops first.
        // Ties break on station name so identical inputs search identically.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.station.cmp(self.station))
            .then_with(|| other.line.cmp(&self.line))
    }
}

impl PartialOrd for QueueEntry<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Find the cheapest route between two named stations.
///
/// Returns `Err(UnknownStation)` if either name is absent from the network,
/// `Ok` with an empty itinerary slot if the stations are in disconnected
/// components, and a zero-length single-station itinerary when
/// `start == goal`.
pub fn find_path(
    network: &Network,
    start: &str,
    goal: &str,
    config: &RouteConfig,
) -> Result<SearchResult, RouteError> {
    // Re-borrow the names from the station map so every key used below has
    // the network's lifetime.
    let Some((start, _)) = network.stations.get_key_value(start) else {
        return Err(RouteError::UnknownStation(start.to_string()));
    };
    let Some((goal, goal_station)) = network.stations.get_key_value(goal) else {
        return Err(RouteError::UnknownStation(goal.to_string()));
    };
    let (start, goal) = (start.as_str(), goal.as_str());

    if start == goal {
        return Ok(SearchResult {
            itinerary: Some(Itinerary {
                route: vec![start.to_string()],
                lines: Vec::new(),
                segments: Vec::new(),
                total_km: 0.0,
                stops: 1,
            }),
            nodes_visited: 0,
        });
    }

    let goal_coords = goal_station.coords;
    let h = |station: &str| match config.algorithm {
        Algorithm::Dijkstra => 0.0,
        Algorithm::AStar => network
            .station(station)
            .map(|s| distance_km(s.coords, goal_coords))
            .unwrap_or(0.0),
    };

    let mut open: BinaryHeap<QueueEntry<'_>> = BinaryHeap::new();
    let mut best_g: HashMap<StateKey<'_>, f64> = HashMap::new();
    let mut parents: HashMap<StateKey<'_>, (StateKey<'_>, &Edge)> = HashMap::new();
    let mut settled: HashSet<StateKey<'_>> = HashSet::new();
    let mut nodes_visited = 0usize;

    best_g.insert((start, None), 0.0);
    open.push(QueueEntry {
        f: h(start),
        g: 0.0,
        station: start,
        line: None,
    });

    while let Some(entry) = open.pop() {
        let key = (entry.station, entry.line);
        if !settled.insert(key) {
            continue; // A cheaper copy was settled earlier.
        }
        nodes_visited += 1;

        if entry.station == goal {
            trace!(start, goal, nodes_visited, cost = entry.g, "goal settled");
            let itinerary = reconstruct(network, &parents, key);
            return Ok(SearchResult {
                itinerary: Some(itinerary),
                nodes_visited,
            });
        }

        for edge in network.edges_from(entry.station) {
            if network.station(&edge.to).is_none() {
                trace!(from = entry.station, to = %edge.to, "edge to unknown station, ignoring");
                continue;
            }
            // No penalty on the first edge out of the start: there is no
            // previous line yet.
            let penalty = match entry.line {
                Some(line) if line != edge.line => config.transfer_penalty_km,
                _ => 0.0,
            };
            let g = entry.g + edge.distance + penalty;
            let next_key = (edge.to.as_str(), Some(edge.line.as_str()));

            if settled.contains(&next_key) {
                continue;
            }
            if best_g.get(&next_key).is_none_or(|&old| g < old) {
                best_g.insert(next_key, g);
                parents.insert(next_key, (key, edge));
                open.push(QueueEntry {
                    f: g + h(&edge.to),
                    g,
                    station: edge.to.as_str(),
                    line: Some(edge.line.as_str()),
                });
            }
        }
    }

    debug!(start, goal, nodes_visited, "frontier exhausted, no route");
    Ok(SearchResult {
        itinerary: None,
        nodes_visited,
    })
}

/// Walk the parent chain back from the goal state and assemble the result.
fn reconstruct(
    network: &Network,
    parents: &HashMap<StateKey<'_>, (StateKey<'_>, &Edge)>,
    goal_key: StateKey<'_>,
) -> Itinerary {
    let mut stations = vec![goal_key.0.to_string()];
    let mut edges: Vec<&Edge> = Vec::new();

    let mut key = goal_key;
    while let Some((prev, edge)) = parents.get(&key) {
        stations.push(prev.0.to_string());
        edges.push(edge);
        key = *prev;
    }
    stations.reverse();
    edges.reverse();

    let mut lines: Vec<String> = Vec::new();
    let mut segments = Vec::with_capacity(edges.len());
    let mut total_km = 0.0;

    for (i, edge) in edges.iter().enumerate() {
        let from = stations[i].clone();
        let to = stations[i + 1].clone();

        if lines.last().map(String::as_str) != Some(edge.line.as_str()) {
            lines.push(edge.line.clone());
        }
        total_km += edge.distance;

        let coords = match &edge.shape {
            Some(shape) => shape.clone(),
            None => match (network.station(&from), network.station(&to)) {
                (Some(a), Some(b)) => vec![a.coords, b.coords],
                _ => Vec::new(),
            },
        };
        segments.push(RouteSegment {
            from,
            to,
            line: edge.line.clone(),
            coords,
        });
    }

    let stops = stations.len();
    Itinerary {
        route: stations,
        lines,
        segments,
        total_km,
        stops,
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::builder::{BuildConfig, build};
    use crate::feed::{Feed, StopVisit, Trip};
    use crate::geo::Coord;
    use proptest::prelude::*;

    /// A backbone trip visiting every station keeps the network connected;
    /// extra trips add random shortcuts on a second line.
    fn random_network() -> impl Strategy<Value = Network> {
        let coords = proptest::collection::vec((-0.05f64..0.05, -0.05f64..0.05), 4..10);
        (coords, proptest::collection::vec((0usize..10, 0usize..10), 0..6)).prop_map(
            |(coords, shortcuts)| {
                let stations: Vec<(String, Coord)> = coords
                    .iter()
                    .enumerate()
                    .map(|(i, (lat, lon))| (format!("S{i}"), Coord::new(*lat, *lon)))
                    .collect();

                let backbone = Trip {
                    id: "backbone".to_string(),
                    stops: stations
                        .iter()
                        .map(|(name, coord)| StopVisit {
                            station: name.clone(),
                            coord: *coord,
                            line: "Red".to_string(),
                        })
                        .collect(),
                    shape: None,
                };

                let mut trips = vec![backbone];
                for (i, (a, b)) in shortcuts.into_iter().enumerate() {
                    let (a, b) = (a % stations.len(), b % stations.len());
                    if a == b {
                        continue;
                    }
                    trips.push(Trip {
                        id: format!("shortcut{i}"),
                        stops: [a, b]
                            .iter()
                            .map(|&idx| StopVisit {
                                station: stations[idx].0.clone(),
                                coord: stations[idx].1,
                                line: "Blue".to_string(),
                            })
                            .collect(),
                        shape: None,
                    });
                }

                let (network, _) = build(
                    &Feed {
                        trips,
                        lines: vec![],
                    },
                    &BuildConfig::default(),
                );
                network
            },
        )
    }

    proptest! {
        /// Both algorithms are cost-optimal, so they agree on route distance.
        #[test]
        fn algorithms_agree(network in random_network(), seed in 0usize..100) {
            let names: Vec<&str> = network.station_names().collect();
            let start = names[seed % names.len()];
            let goal = names[(seed / 10) % names.len()];

            let astar = find_path(&network, start, goal, &RouteConfig::default()).unwrap();
            let dijkstra = find_path(
                &network,
                start,
                goal,
                &RouteConfig::default().with_algorithm(Algorithm::Dijkstra),
            )
            .unwrap();

            let a = astar.itinerary.expect("backbone keeps the network connected");
            let d = dijkstra.itinerary.expect("backbone keeps the network connected");
            prop_assert!((a.total_km - d.total_km).abs() < 1e-9);
            prop_assert_eq!(a.route.first(), Some(&start.to_string()));
            prop_assert_eq!(a.route.last(), Some(&goal.to_string()));
        }

        /// The reported distance is exactly the sum of segment edge weights.
        #[test]
        fn route_is_walkable(network in random_network(), seed in 0usize..100) {
            let names: Vec<&str> = network.station_names().collect();
            let start = names[seed % names.len()];
            let goal = names[(seed / 10) % names.len()];

            let result = find_path(&network, start, goal, &RouteConfig::default()).unwrap();
            let Some(itinerary) = result.itinerary else {
                return Ok(());
            };

            // Every consecutive pair of route stations is joined by a real
            // edge on the segment's line, and the weights sum to total_km.
            let mut sum = 0.0;
            for (i, segment) in itinerary.segments.iter().enumerate() {
                prop_assert_eq!(&segment.from, &itinerary.route[i]);
                prop_assert_eq!(&segment.to, &itinerary.route[i + 1]);
                let edge = network
                    .edges_from(&segment.from)
                    .iter()
                    .find(|e| e.to == segment.to && e.line == segment.line)
                    .expect("segment must correspond to a network edge");
                sum += edge.distance;
            }
            prop_assert!((sum - itinerary.total_km).abs() < 1e-9);
        }
    }
}
