//! Metro network builder and shortest-route finder.
//!
//! Turns GTFS-style stop-visit records into a weighted station graph and
//! answers "what is the shortest way from here to there?", accounting for
//! line changes and circular lines.
//!
//! The pipeline runs one way: a [`feed::Feed`] goes into [`builder::build`],
//! which produces an immutable [`domain::Network`]; [`router::find_path`] and
//! [`validate::validate`] then operate on shared references to it.

pub mod builder;
pub mod domain;
pub mod feed;
pub mod geo;
pub mod router;
pub mod validate;
