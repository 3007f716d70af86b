//! Network builder.
//!
//! Turns a raw [`Feed`] into a [`Network`]: registers stations as trips are
//! scanned, adds a directed edge for every consecutive same-line pair of
//! visits, mirrors edges when the reverse-edge policy is on, and closes
//! circular lines (declared or detected from their shapes) with a
//! terminal-to-initial edge.
//!
//! Malformed trips are skipped, never fatal: the build always produces a
//! network, and the accompanying [`BuildReport`] lists every trip that was
//! dropped and why.

mod config;

pub use config::BuildConfig;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace, warn};

use crate::domain::{Edge, Line, Network, Station};
use crate::feed::{Feed, Trip, line_color};
use crate::geo::{Coord, distance_km, path_length_km};

/// Why the builder dropped a trip.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    /// A trip must visit at least two stations to contribute edges.
    #[error("trip has {count} usable stops; at least two are required")]
    TooFewStops { count: usize },

    /// The same station name was sighted at wildly divergent coordinates.
    /// This signals two distinct stations sharing a name, not valid data.
    #[error("station {station:?} sighted {separation_km:.2} km from its first coordinates")]
    NameCollision {
        station: String,
        separation_km: f64,
    },
}

/// One dropped trip and the reason it was dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTrip {
    pub trip_id: String,
    pub reason: SkipReason,
}

/// Everything that went wrong during a build.
///
/// The builder collects problems instead of stopping at the first one; an
/// empty report means every trip contributed to the network.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildReport {
    pub skipped: Vec<SkippedTrip>,
}

impl BuildReport {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Build a [`Network`] from a feed under the given policy.
pub fn build(feed: &Feed, config: &BuildConfig) -> (Network, BuildReport) {
    let mut builder = Builder {
        config,
        network: Network::default(),
        report: BuildReport::default(),
        line_termini: BTreeMap::new(),
    };

    for record in &feed.lines {
        builder.network.lines.insert(
            record.name.clone(),
            Line {
                color: record.color.clone(),
                paths: record.paths.clone(),
            },
        );
    }

    for trip in &feed.trips {
        if let Err(reason) = builder.process_trip(trip) {
            warn!(trip = %trip.id, %reason, "skipping malformed trip");
            builder.report.skipped.push(SkippedTrip {
                trip_id: trip.id.clone(),
                reason,
            });
        }
    }

    builder.close_circular_lines();

    debug!(
        stations = builder.network.station_count(),
        edges = builder.network.edge_count(),
        skipped = builder.report.skipped.len(),
        "network built"
    );
    (builder.network, builder.report)
}

struct Builder<'a> {
    config: &'a BuildConfig,
    network: Network,
    report: BuildReport,

    /// Per line: (first station visited, last station visited), by trip
    /// order. Used to place the closing edge on circular lines.
    line_termini: BTreeMap<String, (String, String)>,
}

impl Builder<'_> {
    fn process_trip(&mut self, trip: &Trip) -> Result<(), SkipReason> {
        if trip.stops.len() < 2 {
            return Err(SkipReason::TooFewStops {
                count: trip.stops.len(),
            });
        }

        // Validate the whole trip before touching the network, so a rejected
        // trip leaves no partial state behind. The first sighting of a name
        // (in the network, or earlier in this trip) is authoritative.
        let mut first_seen: HashMap<&str, Coord> = HashMap::new();
        for visit in &trip.stops {
            let known = self
                .network
                .station(&visit.station)
                .map(|s| s.coords)
                .or_else(|| first_seen.get(visit.station.as_str()).copied());
            match known {
                Some(coords) => {
                    let separation_km = distance_km(coords, visit.coord);
                    if separation_km > self.config.collision_threshold_km {
                        return Err(SkipReason::NameCollision {
                            station: visit.station.clone(),
                            separation_km,
                        });
                    }
                }
                None => {
                    first_seen.insert(&visit.station, visit.coord);
                }
            }
        }

        // Register stations and line membership. Coordinates from later
        // sightings are ignored, not an error.
        for visit in &trip.stops {
            let station = self
                .network
                .stations
                .entry(visit.station.clone())
                .or_insert_with(|| Station::new(visit.station.clone(), visit.coord));
            station.add_line(&visit.line);

            self.network
                .lines
                .entry(visit.line.clone())
                .or_insert_with(|| Line::new(line_color(&visit.line)));
        }

        for pair in trip.stops.windows(2) {
            let (from, to) = (&pair[0], &pair[1]);
            if from.line != to.line {
                continue;
            }

            self.line_termini
                .entry(from.line.clone())
                .and_modify(|(_, terminal)| *terminal = to.station.clone())
                .or_insert_with(|| (from.station.clone(), to.station.clone()));

            // Authoritative coordinates come from the registered stations.
            let from_coords = self.network.stations[&from.station].coords;
            let to_coords = self.network.stations[&to.station].coords;

            let shape = trip
                .shape
                .as_deref()
                .and_then(|s| slice_shape(s, from_coords, to_coords));
            let distance = match &shape {
                Some(segment) => path_length_km(segment),
                None => distance_km(from_coords, to_coords),
            };

            let edge = match Edge::new(&from.station, &to.station, &from.line, distance, shape) {
                Ok(edge) => edge,
                Err(err) => {
                    trace!(trip = %trip.id, %err, "skipping invalid edge");
                    continue;
                }
            };
            self.insert_edge(&from.station, edge);
        }

        Ok(())
    }

    /// Insert an edge unless an equivalent (to, line) edge already exists,
    /// mirroring it when the reverse-edge policy is on.
    fn insert_edge(&mut self, from: &str, edge: Edge) {
        if self.config.add_reverse_edges && !self.network.has_edge(&edge.to, from, &edge.line) {
            let mirror = edge.reversed(from);
            let mirror_from = edge.to.clone();
            self.network
                .edges
                .entry(mirror_from)
                .or_default()
                .push(mirror);
        }
        if !self.network.has_edge(from, &edge.to, &edge.line) {
            self.network
                .edges
                .entry(from.to_string())
                .or_default()
                .push(edge);
        }
    }

    /// Close every circular line: close its shape paths and make sure a
    /// terminal-to-initial edge exists.
    fn close_circular_lines(&mut self) {
        let line_names: Vec<String> = self.network.lines.keys().cloned().collect();
        for name in line_names {
            let circular = self.config.circular_lines.contains(&name)
                || self.network.lines[&name].is_circular(self.config.circular_threshold_km);
            if !circular {
                continue;
            }

            if let Some(line) = self.network.lines.get_mut(&name) {
                line.close_paths();
            }

            let Some((initial, terminal)) = self.line_termini.get(&name).cloned() else {
                // No trips ran on this line; nothing to close.
                continue;
            };
            if initial == terminal || self.network.has_edge(&terminal, &initial, &name) {
                continue;
            }

            let (Some(from), Some(to)) = (
                self.network.station(&terminal),
                self.network.station(&initial),
            ) else {
                continue;
            };
            let distance = distance_km(from.coords, to.coords);
            match Edge::new(&terminal, &initial, &name, distance, None) {
                Ok(edge) => {
                    debug!(line = %name, %terminal, %initial, "closing circular line");
                    self.insert_edge(&terminal, edge);
                }
                Err(err) => trace!(line = %name, %err, "cannot close circular line"),
            }
        }
    }
}

/// Cut the stretch of a trip shape between the vertices nearest to the two
/// endpoint stations, reversing it when the trip runs against shape order.
///
/// Returns `None` when the slice would be degenerate.
fn slice_shape(shape: &[Coord], from: Coord, to: Coord) -> Option<Vec<Coord>> {
    let start = nearest_vertex(shape, from)?;
    let end = nearest_vertex(shape, to)?;

    let segment: Vec<Coord> = if start <= end {
        shape[start..=end].to_vec()
    } else {
        shape[end..=start].iter().rev().copied().collect()
    };
    (segment.len() >= 2).then_some(segment)
}

fn nearest_vertex(shape: &[Coord], target: Coord) -> Option<usize> {
    shape
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            distance_km(**a, target).total_cmp(&distance_km(**b, target))
        })
        .map(|(idx, _)| idx)
}
