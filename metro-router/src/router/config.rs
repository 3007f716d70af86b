//! Search configuration for the route finder.

use serde::{Deserialize, Serialize};

/// Which shortest-path algorithm to run.
///
/// Both return cost-optimal routes; A* just visits fewer nodes by steering
/// towards the goal with the great-circle heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Dijkstra,
    #[default]
    AStar,
}

/// Configuration for a route search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    pub algorithm: Algorithm,

    /// Extra search cost (km) charged when consecutive edges use different
    /// lines. A proxy for the time a line change costs; tunable, and never
    /// part of the reported route distance.
    pub transfer_penalty_km: f64,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::AStar,
            transfer_penalty_km: 1.5,
        }
    }
}

impl RouteConfig {
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }
}
