//! Stepped force simulation
//!
//! A velocity-Verlet style integrator with four forces applied each tick:
//! springs along links, exact pairwise repulsion, a collision constraint
//! and a centering shift. Cooling follows the usual alpha schedule: each
//! tick moves `alpha` toward `alpha_target` by `alpha_decay`, and the
//! simulation counts as settled once `alpha` drops below `alpha_min`.
//!
//! The simulation never blocks: callers drive it one `tick` at a time.

use super::params::LayoutParams;
use crate::graph::{Graph, NodeId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::f64::consts::PI;
use tracing::debug;

/// Whether a body moves under simulated forces
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum PinState {
    #[default]
    Free,
    /// Held at the given coordinates with zero velocity
    Pinned { x: f64, y: f64 },
}

/// Physical state of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub pin: PinState,
}

impl Body {
    pub fn is_pinned(&self) -> bool {
        matches!(self.pin, PinState::Pinned { .. })
    }
}

/// Link resolved to body indices
#[derive(Debug, Clone)]
struct Spring {
    source: usize,
    target: usize,
    strength: f64,
    bias: f64,
}

pub struct Simulation {
    params: LayoutParams,
    bodies: Vec<Body>,
    /// Node id to body index; with duplicate ids the last body wins
    index: HashMap<NodeId, usize>,
    springs: Vec<Spring>,
    link_keys: Vec<(NodeId, NodeId)>,
    alpha: f64,
    alpha_target: f64,
    dragging: Option<NodeId>,
    rng: StdRng,
}

impl Simulation {
    pub fn new(params: LayoutParams) -> Self {
        let rng = StdRng::seed_from_u64(params.seed);
        Self {
            params,
            bodies: Vec::new(),
            index: HashMap::new(),
            springs: Vec::new(),
            link_keys: Vec::new(),
            alpha: 1.0,
            alpha_target: 0.0,
            dragging: None,
            rng,
        }
    }

    /// A hot simulation over `graph`
    pub fn with_graph(params: LayoutParams, graph: &Graph) -> Self {
        let mut sim = Self::new(params);
        sim.sync(graph);
        sim.alpha = 1.0;
        sim
    }

    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: &NodeId) -> Option<&Body> {
        self.index.get(id).map(|&i| &self.bodies[i])
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    /// Whether ticking would still move anything: either still warm or
    /// heating toward a raised target
    pub fn is_active(&self) -> bool {
        self.alpha >= self.params.alpha_min || self.alpha_target > self.alpha
    }

    pub fn dragging(&self) -> Option<&NodeId> {
        self.dragging.as_ref()
    }

    /// Raise alpha to at least `alpha`
    pub fn reheat(&mut self, alpha: f64) {
        self.alpha = self.alpha.max(alpha);
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    /// Move the centering point; existing positions are kept
    pub fn resize(&mut self, width: f64, height: f64) {
        self.params.width = width;
        self.params.height = height;
        self.reheat(self.params.restructure_alpha);
    }

    /// Reconcile bodies and springs with `graph`.
    ///
    /// Existing bodies keep their position, velocity and pin. New bodies
    /// are seeded next to an already placed neighbor when one exists,
    /// otherwise on a phyllotaxis spiral around the center. Any change in
    /// nodes or links reheats the simulation instead of restarting it.
    pub fn sync(&mut self, graph: &Graph) {
        let mut previous: HashMap<NodeId, VecDeque<Body>> = HashMap::new();
        for body in self.bodies.drain(..) {
            previous.entry(body.id.clone()).or_default().push_back(body);
        }

        let mut bodies = Vec::with_capacity(graph.nodes.len());
        let mut fresh = Vec::new();
        for (i, node) in graph.nodes.iter().enumerate() {
            match previous.get_mut(&node.id).and_then(VecDeque::pop_front) {
                Some(body) => bodies.push(body),
                None => {
                    fresh.push(i);
                    bodies.push(Body {
                        id: node.id.clone(),
                        x: f64::NAN,
                        y: f64::NAN,
                        vx: 0.0,
                        vy: 0.0,
                        pin: PinState::Free,
                    });
                }
            }
        }
        let removed: usize = previous.values().map(VecDeque::len).sum();

        self.bodies = bodies;
        self.index = self
            .bodies
            .iter()
            .enumerate()
            .map(|(i, body)| (body.id.clone(), i))
            .collect();

        let link_keys: Vec<(NodeId, NodeId)> = graph
            .links
            .iter()
            .map(|link| (link.source.clone(), link.target.clone()))
            .collect();
        let links_changed = link_keys != self.link_keys;
        self.link_keys = link_keys;
        self.rebuild_springs();
        self.seed_positions(&fresh);

        if self
            .dragging
            .as_ref()
            .is_some_and(|id| !self.index.contains_key(id))
        {
            self.dragging = None;
            self.alpha_target = 0.0;
        }

        if !fresh.is_empty() || removed > 0 || links_changed {
            debug!(added = fresh.len(), removed, links = self.springs.len(), "layout restructured");
            self.reheat(self.params.restructure_alpha);
        }
    }

    fn rebuild_springs(&mut self) {
        let mut resolved = Vec::with_capacity(self.link_keys.len());
        let mut degree = vec![0usize; self.bodies.len()];
        for (source, target) in &self.link_keys {
            if let (Some(&s), Some(&t)) = (self.index.get(source), self.index.get(target)) {
                degree[s] += 1;
                degree[t] += 1;
                resolved.push((s, t));
            }
        }

        self.springs = resolved
            .into_iter()
            .map(|(s, t)| {
                let (ds, dt) = (degree[s] as f64, degree[t] as f64);
                Spring {
                    source: s,
                    target: t,
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();
    }

    fn seed_positions(&mut self, fresh: &[usize]) {
        let (cx, cy) = self.params.center();
        let spread = self.params.collide_radius;
        let golden_angle = PI * (3.0 - 5.0_f64.sqrt());

        for &i in fresh {
            let anchor = self
                .springs
                .iter()
                .filter_map(|s| match (s.source == i, s.target == i) {
                    (true, false) => Some(s.target),
                    (false, true) => Some(s.source),
                    _ => None,
                })
                .find(|&j| self.bodies[j].x.is_finite());

            let (x, y) = match anchor {
                Some(j) => {
                    let angle = self.rng.gen_range(0.0..2.0 * PI);
                    (
                        self.bodies[j].x + spread * angle.cos(),
                        self.bodies[j].y + spread * angle.sin(),
                    )
                }
                None => {
                    let radius = 10.0 * (0.5 + i as f64).sqrt();
                    let angle = i as f64 * golden_angle;
                    (cx + radius * angle.cos(), cy + radius * angle.sin())
                }
            };
            self.bodies[i].x = x;
            self.bodies[i].y = y;
        }
    }

    /// Advance one tick regardless of alpha
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        let alpha = self.alpha;

        self.apply_links(alpha);
        self.apply_charge(alpha);
        self.apply_collision();
        self.apply_center();

        let retain = 1.0 - self.params.velocity_decay;
        for body in &mut self.bodies {
            match body.pin {
                PinState::Pinned { x, y } => {
                    body.x = x;
                    body.y = y;
                    body.vx = 0.0;
                    body.vy = 0.0;
                }
                PinState::Free => {
                    body.vx *= retain;
                    body.vy *= retain;
                    body.x += body.vx;
                    body.y += body.vy;
                }
            }
        }
    }

    /// Tick once if still active; returns whether a tick ran
    pub fn step(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.tick();
        true
    }

    /// Step until settled or `max_ticks` ticks have run; returns ticks run
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.step() {
            ticks += 1;
        }
        ticks
    }

    fn jiggle(&mut self) -> f64 {
        (self.rng.gen::<f64>() - 0.5) * 1e-6
    }

    fn apply_links(&mut self, alpha: f64) {
        let distance = self.params.link_distance;
        for k in 0..self.springs.len() {
            let Spring {
                source,
                target,
                strength,
                bias,
            } = self.springs[k];
            let (s, t) = (&self.bodies[source], &self.bodies[target]);

            let mut x = t.x + t.vx - s.x - s.vx;
            let mut y = t.y + t.vy - s.y - s.vy;
            if x == 0.0 {
                x = self.jiggle();
            }
            if y == 0.0 {
                y = self.jiggle();
            }

            let l = (x * x + y * y).sqrt();
            let l = (l - distance) / l * alpha * strength;
            x *= l;
            y *= l;

            self.bodies[target].vx -= x * bias;
            self.bodies[target].vy -= y * bias;
            self.bodies[source].vx += x * (1.0 - bias);
            self.bodies[source].vy += y * (1.0 - bias);
        }
    }

    fn apply_charge(&mut self, alpha: f64) {
        let strength = self.params.charge_strength;
        let n = self.bodies.len();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let mut x = self.bodies[j].x - self.bodies[i].x;
                let mut y = self.bodies[j].y - self.bodies[i].y;
                let mut l = x * x + y * y;
                if x == 0.0 {
                    x = self.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.jiggle();
                    l += y * y;
                }
                // distanceMin² of 1
                if l < 1.0 {
                    l = l.sqrt();
                }
                self.bodies[i].vx += x * strength * alpha / l;
                self.bodies[i].vy += y * strength * alpha / l;
            }
        }
    }

    fn apply_collision(&mut self) {
        let radius = self.params.collide_radius;
        let r = radius * 2.0;
        let n = self.bodies.len();
        for i in 0..n {
            let xi = self.bodies[i].x + self.bodies[i].vx;
            let yi = self.bodies[i].y + self.bodies[i].vy;
            for j in (i + 1)..n {
                let mut x = xi - self.bodies[j].x - self.bodies[j].vx;
                let mut y = yi - self.bodies[j].y - self.bodies[j].vy;
                let mut l = x * x + y * y;
                if l >= r * r {
                    continue;
                }
                if x == 0.0 {
                    x = self.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.jiggle();
                    l += y * y;
                }
                let d = l.sqrt();
                let push = (r - d) / d;
                x *= push;
                y *= push;

                // Equal radii split the correction evenly
                self.bodies[i].vx += x * 0.5;
                self.bodies[i].vy += y * 0.5;
                self.bodies[j].vx -= x * 0.5;
                self.bodies[j].vy -= y * 0.5;
            }
        }
    }

    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let n = self.bodies.len() as f64;
        let (cx, cy) = self.params.center();
        let sx = self.bodies.iter().map(|b| b.x).sum::<f64>() / n - cx;
        let sy = self.bodies.iter().map(|b| b.y).sum::<f64>() / n - cy;
        for body in &mut self.bodies {
            body.x -= sx;
            body.y -= sy;
        }
    }

    /// Pin a node at `(x, y)`; returns false when the node is unknown
    pub fn pin(&mut self, id: &NodeId, x: f64, y: f64) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.bodies[i].pin = PinState::Pinned { x, y };
                true
            }
            None => false,
        }
    }

    /// Release a pinned node; returns false when the node is unknown
    pub fn unpin(&mut self, id: &NodeId) -> bool {
        match self.index.get(id) {
            Some(&i) => {
                self.bodies[i].pin = PinState::Free;
                true
            }
            None => false,
        }
    }

    /// Pin the node where it stands and keep the rest of the layout warm
    pub fn begin_drag(&mut self, id: &NodeId) -> bool {
        let Some(&i) = self.index.get(id) else {
            return false;
        };
        let (x, y) = (self.bodies[i].x, self.bodies[i].y);
        self.bodies[i].pin = PinState::Pinned { x, y };
        self.alpha_target = self.params.drag_alpha_target;
        self.dragging = Some(id.clone());
        true
    }

    /// Move the dragged node's pin; no-op without an active drag
    pub fn drag_to(&mut self, x: f64, y: f64) {
        if let Some(id) = self.dragging.clone() {
            self.pin(&id, x, y);
        }
    }

    /// Release the dragged node and let the layout cool
    pub fn end_drag(&mut self) {
        if let Some(id) = self.dragging.take() {
            self.unpin(&id);
        }
        self.alpha_target = 0.0;
    }
}
