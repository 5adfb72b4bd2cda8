//! Pan/zoom transform applied on top of simulated coordinates

use serde::{Deserialize, Serialize};

/// Affine view transform: `screen = graph * k + (x, y)`.
///
/// Purely presentational; nothing here feeds back into the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f64,
    pub y: f64,
    pub k: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.x) / self.k, (sy - self.y) / self.k)
    }

    pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
        (gx * self.k + self.x, gy * self.k + self.y)
    }

    /// Translate by a screen-space delta
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Scale by `factor` around the screen point `(sx, sy)`, keeping the
    /// graph point under it fixed. The scale is clamped to `[min_k, max_k]`.
    /// Factors that are not finite and positive are ignored.
    pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, min_k: f64, max_k: f64) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        let new_k = (self.k * factor).clamp(min_k, max_k);
        let ratio = new_k / self.k;
        self.x = sx - (sx - self.x) * ratio;
        self.y = sy - (sy - self.y) * ratio;
        self.k = new_k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_maps_points_to_themselves() {
        let t = ViewTransform::default();
        assert_eq!(t.screen_to_graph(12.0, -3.0), (12.0, -3.0));
    }

    #[test]
    fn screen_and_graph_are_inverse() {
        let t = ViewTransform { x: 40.0, y: -10.0, k: 2.5 };
        let (gx, gy) = t.screen_to_graph(100.0, 80.0);
        let (sx, sy) = t.graph_to_screen(gx, gy);
        assert!((sx - 100.0).abs() < 1e-9 && (sy - 80.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut t = ViewTransform::default();
        t.pan_by(15.0, 25.0);
        let before = t.screen_to_graph(200.0, 150.0);

        t.zoom_at(200.0, 150.0, 2.0, 0.5, 5.0);
        let after = t.screen_to_graph(200.0, 150.0);

        assert_eq!(t.k, 2.0);
        assert!((before.0 - after.0).abs() < 1e-9 && (before.1 - after.1).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut t = ViewTransform::default();
        for _ in 0..20 {
            t.zoom_at(0.0, 0.0, 1.5, 0.5, 5.0);
        }
        assert_eq!(t.k, 5.0);
        for _ in 0..40 {
            t.zoom_at(0.0, 0.0, 0.5, 0.5, 5.0);
        }
        assert_eq!(t.k, 0.5);
    }

    #[test]
    fn degenerate_zoom_factors_are_ignored() {
        let mut t = ViewTransform::default();
        t.zoom_at(100.0, 50.0, 2.0, 0.5, 5.0);
        let before = t;

        for factor in [f64::NAN, f64::INFINITY, 0.0, -2.0] {
            t.zoom_at(10.0, 10.0, factor, 0.5, 5.0);
            assert_eq!(t, before);
        }
        let (gx, gy) = t.screen_to_graph(40.0, 40.0);
        assert!(gx.is_finite() && gy.is_finite());
    }
}
