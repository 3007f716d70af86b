//! Raw feed input for the network builder.
//!
//! The builder consumes a [`Feed`]: ordered trips, each an ordered sequence
//! of stop visits, plus per-line shape polylines. This module defines that
//! boundary schema as explicit typed records, and provides a GTFS directory
//! reader that produces one.

mod error;
mod gtfs;
mod lines;

pub use error::FeedError;
pub use gtfs::read_feed;
pub use lines::{line_color, line_name};

use crate::geo::Coord;

/// One visit in a trip's stop sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct StopVisit {
    /// Station name. Names are exact keys; no normalisation is applied.
    pub station: String,
    pub coord: Coord,
    /// The line the trip is on at this visit.
    pub line: String,
}

/// One ordered traversal of stations by a single service run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: String,
    pub stops: Vec<StopVisit>,
    /// The trip's shape polyline, when the feed supplies one.
    pub shape: Option<Vec<Coord>>,
}

/// Per-line presentation data from the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub name: String,
    pub color: String,
    pub paths: Vec<Vec<Coord>>,
}

/// Everything the builder needs from one input snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    pub trips: Vec<Trip>,
    pub lines: Vec<LineRecord>,
}
