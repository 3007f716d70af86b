//! Route finding over a built network.
//!
//! Answers "what is the cheapest way from this station to that one?", where
//! cost is kilometres travelled plus a configurable penalty for every line
//! change. The search runs to completion against an immutable [`Network`](crate::domain::Network)
//! reference, so any number of searches may run concurrently over the same
//! network.

mod config;
mod search;

pub use config::{Algorithm, RouteConfig};
pub use search::{Itinerary, RouteError, RouteSegment, SearchResult, find_path};
