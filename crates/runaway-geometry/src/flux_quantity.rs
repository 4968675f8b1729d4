// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Flux-Surface Quantity
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One scalar quantity (B, J, R/R₀ or |∇r|²) sampled on the reference
//! poloidal grid for every flux surface, with interpolation to
//! arbitrary θ and optional pre-evaluation on a fixed node set.

use runaway_math::interp::ThetaInterpolator;
use runaway_types::error::{KineticError, KineticResult};
use runaway_types::settings::{FluxGrid, InterpolationMethod};

/// Per-surface θ-interpolators for one quantity, on both the cell-centre
/// and radial-face grids.
#[derive(Debug, Clone)]
pub struct FluxSurfaceQuantity {
    interp: Vec<ThetaInterpolator>,
    interp_f: Vec<ThetaInterpolator>,
    /// Values at the fixed quadrature nodes; populated only in fixed
    /// quadrature mode.
    node_data: Option<Vec<Vec<f64>>>,
    node_data_f: Option<Vec<Vec<f64>>>,
}

impl FluxSurfaceQuantity {
    /// Build from reference samples: `data[ir]` on the cell grid,
    /// `data_f[ir]` on the radial flux grid, all sharing `theta_ref`.
    pub fn new(
        theta_ref: &[f64],
        data: &[Vec<f64>],
        data_f: &[Vec<f64>],
        symmetric: bool,
        method: InterpolationMethod,
    ) -> KineticResult<Self> {
        if data_f.len() != data.len() + 1 {
            return Err(KineticError::Usage(format!(
                "flux quantity needs nr+1 face surfaces: got {} cells, {} faces",
                data.len(),
                data_f.len()
            )));
        }
        let interp = data
            .iter()
            .map(|v| ThetaInterpolator::new(theta_ref, v, symmetric, method))
            .collect::<KineticResult<Vec<_>>>()?;
        let interp_f = data_f
            .iter()
            .map(|v| ThetaInterpolator::new(theta_ref, v, symmetric, method))
            .collect::<KineticResult<Vec<_>>>()?;
        Ok(FluxSurfaceQuantity {
            interp,
            interp_f,
            node_data: None,
            node_data_f: None,
        })
    }

    /// Interpolate to arbitrary θ (wrapped to [0, 2π) internally). The
    /// momentum-face variants share the cell-surface data.
    pub fn evaluate_at_theta(&self, ir: usize, theta: f64, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.interp_f[ir].eval(theta),
            _ => self.interp[ir].eval(theta),
        }
    }

    /// Pre-evaluate on a fixed θ node set and retain the result.
    pub fn interpolate_to_theta(&mut self, theta_nodes: &[f64]) {
        let eval = |it: &ThetaInterpolator| theta_nodes.iter().map(|&t| it.eval(t)).collect();
        self.node_data = Some(self.interp.iter().map(eval).collect());
        self.node_data_f = Some(self.interp_f.iter().map(eval).collect());
    }

    /// Pre-evaluated node values; only valid in fixed-quadrature mode.
    pub fn node_data(&self, ir: usize, fg: FluxGrid) -> KineticResult<&[f64]> {
        let table = match fg {
            FluxGrid::Radial => self.node_data_f.as_ref(),
            _ => self.node_data.as_ref(),
        };
        table.map(|t| t[ir].as_slice()).ok_or_else(|| {
            KineticError::Usage(
                "node data requested from a flux-surface quantity in adaptive mode".into(),
            )
        })
    }

    pub fn nr(&self) -> usize {
        self.interp.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;

    fn quantity() -> FluxSurfaceQuantity {
        let ntheta = 32;
        let theta: Vec<f64> = (0..ntheta).map(|k| TAU * k as f64 / ntheta as f64).collect();
        let surface = |eps: f64| -> Vec<f64> {
            theta.iter().map(|t| 1.0 + eps * t.cos()).collect()
        };
        FluxSurfaceQuantity::new(
            &theta,
            &[surface(0.05), surface(0.10)],
            &[surface(0.025), surface(0.075), surface(0.125)],
            false,
            InterpolationMethod::Steffen,
        )
        .unwrap()
    }

    #[test]
    fn test_interpolates_each_surface() {
        let q = quantity();
        assert!((q.evaluate_at_theta(0, 0.0, FluxGrid::Distribution) - 1.05).abs() < 1e-10);
        assert!((q.evaluate_at_theta(1, 0.0, FluxGrid::Distribution) - 1.10).abs() < 1e-10);
        assert!((q.evaluate_at_theta(2, 0.0, FluxGrid::Radial) - 1.125).abs() < 1e-10);
    }

    #[test]
    fn test_theta_wrapping() {
        let q = quantity();
        let a = q.evaluate_at_theta(0, -0.3, FluxGrid::Distribution);
        let b = q.evaluate_at_theta(0, TAU - 0.3, FluxGrid::Distribution);
        assert!((a - b).abs() < 1e-14);
    }

    #[test]
    fn test_momentum_faces_share_cell_data() {
        let q = quantity();
        let d = q.evaluate_at_theta(1, 1.0, FluxGrid::Distribution);
        assert_eq!(q.evaluate_at_theta(1, 1.0, FluxGrid::P1), d);
        assert_eq!(q.evaluate_at_theta(1, 1.0, FluxGrid::P2), d);
    }

    #[test]
    fn test_node_data_requires_fixed_mode() {
        let mut q = quantity();
        assert!(q.node_data(0, FluxGrid::Distribution).is_err());
        let nodes = [0.0, 1.0, 2.0, 3.0];
        q.interpolate_to_theta(&nodes);
        let vals = q.node_data(0, FluxGrid::Distribution).unwrap();
        assert_eq!(vals.len(), 4);
        for (k, &t) in nodes.iter().enumerate() {
            assert!((vals[k] - q.evaluate_at_theta(0, t, FluxGrid::Distribution)).abs() < 1e-14);
        }
    }

    #[test]
    fn test_face_count_checked() {
        let theta = [0.0, 1.0, 2.0];
        let res = FluxSurfaceQuantity::new(
            &theta,
            &[vec![1.0; 3]],
            &[vec![1.0; 3]],
            false,
            InterpolationMethod::Linear,
        );
        assert!(res.is_err());
    }
}
