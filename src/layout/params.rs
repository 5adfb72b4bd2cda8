//! Simulation and viewport parameters

use serde::{Deserialize, Serialize};

/// Tunables for the force simulation and the view transform.
///
/// Defaults match the usual d3-force settings the graph view is tuned for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Viewport width; the centering force pulls toward `width / 2`
    pub width: f64,
    pub height: f64,
    /// Rest length of each link
    pub link_distance: f64,
    /// Many-body strength; negative repels
    pub charge_strength: f64,
    /// Minimum separation radius per node
    pub collide_radius: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    /// Fraction of velocity lost per tick
    pub velocity_decay: f64,
    /// Cooling target while a node is being dragged
    pub drag_alpha_target: f64,
    /// Alpha applied when nodes or links are added or removed
    pub restructure_alpha: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Hit-test radius in graph units
    pub hit_radius: f64,
    /// Seed for initial jitter, so layouts are reproducible
    pub seed: u64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 500.0,
            link_distance: 120.0,
            charge_strength: -400.0,
            collide_radius: 30.0,
            alpha_min: 0.001,
            // Cools from 1 to alpha_min in ~300 ticks
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            restructure_alpha: 0.3,
            min_zoom: 0.5,
            max_zoom: 5.0,
            hit_radius: 12.0,
            seed: 0x5eed,
        }
    }
}

impl LayoutParams {
    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }
}
