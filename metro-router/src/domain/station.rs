//! Stations: named stops with a coordinate and line membership.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geo::Coord;

/// A station in the network, keyed by its unique name.
///
/// The coordinate recorded at first sighting is authoritative; later
/// sightings of the same name only merge line membership. Line codes are kept
/// sorted so snapshots are stable across rebuilds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,

    /// Names of the lines that serve this station, sorted.
    pub line_codes: BTreeSet<String>,

    /// Geographic position, serialized as a `{lat, lon}` object.
    #[serde(with = "coord_object")]
    pub coords: Coord,
}

impl Station {
    /// Create a station with no line membership yet.
    pub fn new(name: impl Into<String>, coords: Coord) -> Self {
        Self {
            name: name.into(),
            line_codes: BTreeSet::new(),
            coords,
        }
    }

    /// Record that `line` serves this station. Idempotent.
    pub fn add_line(&mut self, line: &str) {
        if !self.line_codes.contains(line) {
            self.line_codes.insert(line.to_string());
        }
    }
}

/// Serialize a [`Coord`] as `{"lat": .., "lon": ..}` rather than the
/// `[lat, lon]` pair used inside polylines.
mod coord_object {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::geo::Coord;

    #[derive(Serialize, Deserialize)]
    struct LatLon {
        lat: f64,
        lon: f64,
    }

    pub fn serialize<S: Serializer>(coord: &Coord, serializer: S) -> Result<S::Ok, S::Error> {
        LatLon {
            lat: coord.lat,
            lon: coord.lon,
        }
        .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Coord, D::Error> {
        let LatLon { lat, lon } = LatLon::deserialize(deserializer)?;
        Ok(Coord { lat, lon })
    }
}
