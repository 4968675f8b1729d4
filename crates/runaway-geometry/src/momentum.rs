// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Momentum Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The p–ξ momentum grid.
//!
//! One `PXiGrid` instance is shared by every flux surface: the core
//! assumes identical momentum grids at all radii, and sharing a single
//! object makes that assumption structural rather than conventional.
//! Momenta are normalised to mₑc.

use runaway_types::error::{KineticError, KineticResult};
use runaway_types::settings::FluxGrid;

/// Cell-centred p and ξ₀ grids with their face counterparts.
#[derive(Debug, Clone)]
pub struct PXiGrid {
    p: Vec<f64>,
    p_f: Vec<f64>,
    xi: Vec<f64>,
    xi_f: Vec<f64>,
    gamma: Vec<f64>,
    gamma_f: Vec<f64>,
}

impl PXiGrid {
    /// Build from face arrays; cells are midpoints.
    pub fn from_faces(p_f: Vec<f64>, xi_f: Vec<f64>) -> KineticResult<Self> {
        if p_f.len() < 2 || xi_f.len() < 2 {
            return Err(KineticError::Usage(
                "momentum grid needs at least one cell in p and xi".into(),
            ));
        }
        for w in p_f.windows(2) {
            if w[1] <= w[0] {
                return Err(KineticError::Usage("p faces must be strictly increasing".into()));
            }
        }
        for w in xi_f.windows(2) {
            if w[1] <= w[0] {
                return Err(KineticError::Usage("xi faces must be strictly increasing".into()));
            }
        }
        if p_f[0] < 0.0 {
            return Err(KineticError::Usage("momentum faces must be non-negative".into()));
        }
        if xi_f[0] < -1.0 - 1e-12 || *xi_f.last().expect("nonempty") > 1.0 + 1e-12 {
            return Err(KineticError::Usage("xi faces must lie in [-1, 1]".into()));
        }

        let p: Vec<f64> = p_f.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
        let xi: Vec<f64> = xi_f.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
        let gamma = p.iter().map(|&p| (1.0 + p * p).sqrt()).collect();
        let gamma_f = p_f.iter().map(|&p| (1.0 + p * p).sqrt()).collect();

        Ok(PXiGrid {
            p,
            p_f,
            xi,
            xi_f,
            gamma,
            gamma_f,
        })
    }

    /// Uniform grid: np cells on [0, p_max], nxi cells on [-1, 1].
    pub fn uniform(np: usize, p_max: f64, nxi: usize) -> KineticResult<Self> {
        let p_f: Vec<f64> = (0..=np).map(|i| p_max * i as f64 / np as f64).collect();
        let xi_f: Vec<f64> = (0..=nxi).map(|j| -1.0 + 2.0 * j as f64 / nxi as f64).collect();
        Self::from_faces(p_f, xi_f)
    }

    pub fn np1(&self) -> usize {
        self.p.len()
    }

    pub fn np2(&self) -> usize {
        self.xi.len()
    }

    pub fn p(&self, i: usize) -> f64 {
        self.p[i]
    }

    pub fn p_f(&self, i: usize) -> f64 {
        self.p_f[i]
    }

    pub fn xi0(&self, j: usize) -> f64 {
        self.xi[j]
    }

    pub fn xi0_f(&self, j: usize) -> f64 {
        self.xi_f[j]
    }

    pub fn p_cells(&self) -> &[f64] {
        &self.p
    }

    pub fn p_faces(&self) -> &[f64] {
        &self.p_f
    }

    pub fn gamma(&self, i: usize) -> f64 {
        self.gamma[i]
    }

    pub fn gamma_f(&self, i: usize) -> f64 {
        self.gamma_f[i]
    }

    /// (p, ξ₀) addressed by cell (i, j) on the given grid variant. On
    /// the P1 variant the momentum index runs over faces; on P2 the
    /// pitch index does.
    pub fn coords(&self, i: usize, j: usize, fg: FluxGrid) -> (f64, f64) {
        match fg {
            FluxGrid::P1 => (self.p_f[i], self.xi[j]),
            FluxGrid::P2 => (self.p[i], self.xi_f[j]),
            _ => (self.p[i], self.xi[j]),
        }
    }

    /// γ addressed like [`coords`](Self::coords).
    pub fn gamma_at(&self, i: usize, j: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::P1 => self.gamma_f[i],
            _ => self.gamma[i],
        }
    }

    /// Number of (i, j) cells of the variant.
    pub fn table_len(&self, fg: FluxGrid) -> usize {
        let (n1, n2) = self.table_dims(fg);
        n1 * n2
    }

    pub fn table_dims(&self, fg: FluxGrid) -> (usize, usize) {
        match fg {
            FluxGrid::P1 => (self.p.len() + 1, self.xi.len()),
            FluxGrid::P2 => (self.p.len(), self.xi.len() + 1),
            _ => (self.p.len(), self.xi.len()),
        }
    }
}

/// p–ξ phase-space metric over p²: √g/p² = (B/B_min)·ξ₀/ξ.
///
/// Divergent at bounce points; the caller regularises with the
/// inverse-square-root quadrature weight. Negative ξ² (beyond the
/// bounce point) is the caller's clamp.
pub fn p_xi_metric_over_p2(xi0: f64, b_over_bmin: f64) -> f64 {
    let xi0_sq = xi0 * xi0;
    let xi_sq = 1.0 - b_over_bmin * (1.0 - xi0_sq);
    b_over_bmin * (xi0_sq / xi_sq).sqrt()
}
