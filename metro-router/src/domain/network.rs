//! The built network aggregate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Edge, Line, Station};

/// A complete metro network: stations, the directed edges out of each
/// station, and per-line presentation data.
///
/// A `Network` is built once per input snapshot and read-only afterwards, so
/// it can be shared freely across threads (`&Network` is `Sync`). When the
/// source feed changes, the caller rebuilds from scratch and swaps the whole
/// value; nothing here supports incremental mutation.
///
/// `BTreeMap` keys keep iteration order and the serialized snapshot stable
/// across rebuilds from the same feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Station name -> station.
    pub stations: BTreeMap<String, Station>,

    /// Station name -> outgoing edges, in insertion order.
    #[serde(default)]
    pub edges: BTreeMap<String, Vec<Edge>>,

    /// Line name -> line.
    #[serde(default)]
    pub lines: BTreeMap<String, Line>,
}

impl Network {
    pub fn station(&self, name: &str) -> Option<&Station> {
        self.stations.get(name)
    }

    pub fn contains_station(&self, name: &str) -> bool {
        self.stations.contains_key(name)
    }

    /// Outgoing edges from a station. Empty for unknown stations.
    pub fn edges_from(&self, name: &str) -> &[Edge] {
        self.edges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether an edge `from -> to` on `line` already exists.
    pub fn has_edge(&self, from: &str, to: &str, line: &str) -> bool {
        self.edges_from(from)
            .iter()
            .any(|e| e.to == to && e.line == line)
    }

    /// All station names, in sorted order.
    ///
    /// This is a derived view over the station map; nothing is cached.
    pub fn station_names(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
