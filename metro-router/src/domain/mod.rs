//! Domain types for the metro network.
//!
//! These are the validated building blocks of a [`Network`]: stations, the
//! directed edges between them, and the lines that serve them. Invariants are
//! enforced at construction time, so code holding these types can trust them.

mod edge;
mod line;
mod network;
mod station;

pub use edge::{Edge, InvalidEdge};
pub use line::Line;
pub use network::Network;
pub use station::Station;
