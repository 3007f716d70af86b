//! GTFS directory reader.
//!
//! Reads the subset of GTFS tables the builder needs (`stops.txt`,
//! `routes.txt`, `trips.txt`, `stop_times.txt` and, when present,
//! `shapes.txt`) and assembles them into a [`Feed`]. Rows referencing unknown
//! stops or trips are dropped with a warning rather than failing the whole
//! read; a missing or unparseable required table is a [`FeedError`].

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{Feed, FeedError, LineRecord, StopVisit, Trip, line_color, line_name};
use crate::geo::Coord;

#[derive(Debug, Deserialize)]
struct StopRow {
    stop_id: String,
    stop_name: String,
    stop_lat: f64,
    stop_lon: f64,
}

#[derive(Debug, Deserialize)]
struct RouteRow {
    route_id: String,
    route_long_name: String,
}

#[derive(Debug, Deserialize)]
struct TripRow {
    trip_id: String,
    route_id: String,
    #[serde(default)]
    shape_id: String,
}

#[derive(Debug, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    stop_id: String,
    stop_sequence: u32,
}

#[derive(Debug, Deserialize)]
struct ShapeRow {
    shape_id: String,
    shape_pt_lat: f64,
    shape_pt_lon: f64,
    shape_pt_sequence: u32,
}

/// Read one CSV table, tolerating a UTF-8 byte-order mark before the header.
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, FeedError> {
    let raw = fs::read(path).map_err(|source| FeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = raw.strip_prefix(b"\xef\xbb\xbf").unwrap_or(&raw);

    let mut reader = csv::Reader::from_reader(raw);
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| FeedError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Read a GTFS directory into a [`Feed`].
pub fn read_feed(dir: &Path) -> Result<Feed, FeedError> {
    // Stops: id -> (name, coordinate).
    let mut stop_lookup: HashMap<String, (String, Coord)> = HashMap::new();
    for row in read_table::<StopRow>(&dir.join("stops.txt"))? {
        stop_lookup.insert(
            row.stop_id,
            (row.stop_name, Coord::new(row.stop_lat, row.stop_lon)),
        );
    }

    // Routes: id -> line name.
    let mut routes: HashMap<String, String> = HashMap::new();
    for row in read_table::<RouteRow>(&dir.join("routes.txt"))? {
        routes.insert(row.route_id, line_name(&row.route_long_name));
    }

    // Trips: id -> (route, shape), plus which shapes each line owns.
    let mut trip_routes: HashMap<String, (String, String)> = HashMap::new();
    let mut line_shapes: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for name in routes.values() {
        line_shapes.entry(name.clone()).or_default();
    }
    for row in read_table::<TripRow>(&dir.join("trips.txt"))? {
        if let Some(line) = routes.get(&row.route_id)
            && !row.shape_id.is_empty()
        {
            line_shapes
                .entry(line.clone())
                .or_default()
                .insert(row.shape_id.clone());
        }
        trip_routes.insert(row.trip_id, (row.route_id, row.shape_id));
    }

    // Shapes are optional; many feeds ship without them.
    let shapes_path = dir.join("shapes.txt");
    let mut shapes: HashMap<String, Vec<Coord>> = HashMap::new();
    if shapes_path.exists() {
        let mut points: HashMap<String, Vec<(u32, Coord)>> = HashMap::new();
        for row in read_table::<ShapeRow>(&shapes_path)? {
            points
                .entry(row.shape_id)
                .or_default()
                .push((row.shape_pt_sequence, Coord::new(row.shape_pt_lat, row.shape_pt_lon)));
        }
        for (shape_id, mut pts) in points {
            pts.sort_by_key(|(seq, _)| *seq);
            shapes.insert(shape_id, pts.into_iter().map(|(_, c)| c).collect());
        }
    }

    // Stop times, grouped per trip and ordered by stop_sequence. The BTreeMap
    // keeps trip order deterministic across reads.
    let mut trip_stops: BTreeMap<String, Vec<(u32, String)>> = BTreeMap::new();
    for row in read_table::<StopTimeRow>(&dir.join("stop_times.txt"))? {
        trip_stops
            .entry(row.trip_id)
            .or_default()
            .push((row.stop_sequence, row.stop_id));
    }

    let mut trips = Vec::with_capacity(trip_stops.len());
    for (trip_id, mut stops) in trip_stops {
        stops.sort_by_key(|(seq, _)| *seq);

        let Some((route_id, shape_id)) = trip_routes.get(&trip_id) else {
            warn!(trip = %trip_id, "stop_times references unknown trip, dropping");
            continue;
        };
        let line = routes
            .get(route_id)
            .cloned()
            .unwrap_or_else(|| "Unknown".to_string());

        let mut visits = Vec::with_capacity(stops.len());
        for (_, stop_id) in stops {
            let Some((name, coord)) = stop_lookup.get(&stop_id) else {
                warn!(trip = %trip_id, stop = %stop_id, "unknown stop in stop_times, dropping visit");
                continue;
            };
            visits.push(StopVisit {
                station: name.clone(),
                coord: *coord,
                line: line.clone(),
            });
        }

        trips.push(Trip {
            id: trip_id,
            stops: visits,
            shape: shapes.get(shape_id).cloned(),
        });
    }

    let lines = line_shapes
        .into_iter()
        .map(|(name, shape_ids)| {
            let paths = shape_ids
                .iter()
                .filter_map(|id| shapes.get(id).cloned())
                .collect();
            let color = line_color(&name).to_string();
            LineRecord { name, color, paths }
        })
        .collect();

    let feed = Feed { trips, lines };
    debug!(
        trips = feed.trips.len(),
        lines = feed.lines.len(),
        "feed loaded"
    );
    Ok(feed)
}
