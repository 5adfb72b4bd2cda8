//! Graph layout
//!
//! `Simulation` owns the physics; `ViewTransform` is the pan/zoom layer
//! over it. `LayoutEngine` ties the two to a graph so the view can hit-test
//! nodes in screen coordinates and drag them.

mod params;
mod simulation;
mod viewport;

pub use params::LayoutParams;
pub use simulation::{Body, PinState, Simulation};
pub use viewport::ViewTransform;

use crate::graph::{Graph, Group, Node, NodeId};
use serde::{Deserialize, Serialize};

/// A rendered node: graph attributes plus current simulated position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: NodeId,
    pub label: String,
    pub group: Group,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub pinned: bool,
}

pub struct LayoutEngine {
    simulation: Simulation,
    view: ViewTransform,
    nodes: Vec<Node>,
}

impl LayoutEngine {
    pub fn new(params: LayoutParams) -> Self {
        Self {
            simulation: Simulation::new(params),
            view: ViewTransform::default(),
            nodes: Vec::new(),
        }
    }

    pub fn with_graph(params: LayoutParams, graph: &Graph) -> Self {
        Self {
            simulation: Simulation::with_graph(params, graph),
            view: ViewTransform::default(),
            nodes: graph.nodes.clone(),
        }
    }

    /// Follow a structural change of the graph
    pub fn sync(&mut self, graph: &Graph) {
        self.simulation.sync(graph);
        self.nodes = graph.nodes.clone();
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.simulation
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// One animation frame; returns whether the simulation moved
    pub fn step(&mut self) -> bool {
        self.simulation.step()
    }

    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        self.simulation.run_until_settled(max_ticks)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.view.pan_by(dx, dy);
    }

    /// Zoom around a screen point within the configured bounds
    pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
        let params = self.simulation.params();
        let (min_k, max_k) = (params.min_zoom, params.max_zoom);
        self.view.zoom_at(sx, sy, factor, min_k, max_k);
    }

    /// Nearest node within the hit radius of a screen point
    pub fn node_at(&self, sx: f64, sy: f64) -> Option<&NodeId> {
        let (gx, gy) = self.view.screen_to_graph(sx, sy);
        let radius = self.simulation.params().hit_radius;

        self.simulation
            .bodies()
            .iter()
            .map(|body| {
                let (dx, dy) = (body.x - gx, body.y - gy);
                (body, (dx * dx + dy * dy).sqrt())
            })
            .filter(|(_, d)| *d < radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(body, _)| &body.id)
    }

    /// Start dragging whatever node is under the screen point
    pub fn begin_drag_at(&mut self, sx: f64, sy: f64) -> Option<NodeId> {
        let id = self.node_at(sx, sy)?.clone();
        self.simulation.begin_drag(&id);
        Some(id)
    }

    pub fn drag_to_screen(&mut self, sx: f64, sy: f64) {
        let (gx, gy) = self.view.screen_to_graph(sx, sy);
        self.simulation.drag_to(gx, gy);
    }

    pub fn end_drag(&mut self) {
        self.simulation.end_drag();
    }

    /// Current positions in graph coordinates, in node order
    pub fn positions(&self) -> Vec<NodePosition> {
        self.nodes
            .iter()
            .zip(self.simulation.bodies())
            .map(|(node, body)| NodePosition {
                id: node.id.clone(),
                label: node.label.clone(),
                group: node.group,
                x: body.x,
                y: body.y,
                pinned: body.is_pinned(),
            })
            .collect()
    }
}
