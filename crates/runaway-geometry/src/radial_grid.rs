// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Radial Grid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Consumer-facing store of flux-surface-indexed geometric scalars.
//!
//! The grid owns these arrays; the averager computes them and hands
//! them over in one publish step at the end of its rebuild. Consumers
//! (collision frequencies, runaway rates, equation terms) only read.

use runaway_types::settings::FluxGrid;

/// Per-surface geometric scalars on the cell grid (nr entries) and the
/// radial flux grid (nr+1 entries).
#[derive(Debug, Clone)]
pub struct RadialGrid {
    nr: usize,
    r: Vec<f64>,
    r_f: Vec<f64>,
    /// Major radius of the magnetic axis; infinite in cylindrical
    /// geometry.
    r0: f64,

    // Published by the averager on rebuild.
    vp_vol: Vec<f64>,
    vp_vol_f: Vec<f64>,
    bmin: Vec<f64>,
    bmin_f: Vec<f64>,
    bmax: Vec<f64>,
    bmax_f: Vec<f64>,
    btor_g: Vec<f64>,
    btor_g_f: Vec<f64>,
    fsa_inv_r2: Vec<f64>,
    fsa_nabla_r2_over_r2: Vec<f64>,
    fsa_b2: Vec<f64>,
    eff_pass_frac: Vec<f64>,
    xi_trapped: Vec<f64>,
    published: bool,
}

/// The full set of arrays the averager publishes in one step.
#[derive(Debug, Clone)]
pub struct GeometryPublication {
    pub vp_vol: Vec<f64>,
    pub vp_vol_f: Vec<f64>,
    pub bmin: Vec<f64>,
    pub bmin_f: Vec<f64>,
    pub bmax: Vec<f64>,
    pub bmax_f: Vec<f64>,
    pub btor_g: Vec<f64>,
    pub btor_g_f: Vec<f64>,
    /// ⟨1/(R/R₀)²⟩ on the cell grid.
    pub fsa_inv_r2: Vec<f64>,
    /// ⟨|∇r|²/(R/R₀)²⟩ on the cell grid.
    pub fsa_nabla_r2_over_r2: Vec<f64>,
    /// ⟨B²⟩ on the cell grid (T²).
    pub fsa_b2: Vec<f64>,
    pub eff_pass_frac: Vec<f64>,
    pub xi_trapped: Vec<f64>,
}

impl RadialGrid {
    pub fn new(r: Vec<f64>, r_f: Vec<f64>, r0: f64) -> Self {
        let nr = r.len();
        debug_assert_eq!(r_f.len(), nr + 1);
        RadialGrid {
            nr,
            r,
            r_f,
            r0,
            vp_vol: vec![0.0; nr],
            vp_vol_f: vec![0.0; nr + 1],
            bmin: vec![0.0; nr],
            bmin_f: vec![0.0; nr + 1],
            bmax: vec![0.0; nr],
            bmax_f: vec![0.0; nr + 1],
            btor_g: vec![0.0; nr],
            btor_g_f: vec![0.0; nr + 1],
            fsa_inv_r2: vec![0.0; nr],
            fsa_nabla_r2_over_r2: vec![0.0; nr],
            fsa_b2: vec![0.0; nr],
            eff_pass_frac: vec![1.0; nr],
            xi_trapped: vec![0.0; nr],
            published: false,
        }
    }

    /// Install the arrays computed by the averager.
    pub fn publish(&mut self, p: GeometryPublication) {
        self.vp_vol = p.vp_vol;
        self.vp_vol_f = p.vp_vol_f;
        self.bmin = p.bmin;
        self.bmin_f = p.bmin_f;
        self.bmax = p.bmax;
        self.bmax_f = p.bmax_f;
        self.btor_g = p.btor_g;
        self.btor_g_f = p.btor_g_f;
        self.fsa_inv_r2 = p.fsa_inv_r2;
        self.fsa_nabla_r2_over_r2 = p.fsa_nabla_r2_over_r2;
        self.fsa_b2 = p.fsa_b2;
        self.eff_pass_frac = p.eff_pass_frac;
        self.xi_trapped = p.xi_trapped;
        self.published = true;
    }

    /// Whether the geometry arrays have been populated since
    /// construction or the last grid rebuild.
    pub fn is_published(&self) -> bool {
        self.published
    }

    pub fn nr(&self) -> usize {
        self.nr
    }

    pub fn r(&self, ir: usize) -> f64 {
        self.r[ir]
    }

    pub fn r_f(&self, ir: usize) -> f64 {
        self.r_f[ir]
    }

    pub fn r0(&self) -> f64 {
        self.r0
    }

    pub fn vp_vol(&self, ir: usize) -> f64 {
        self.vp_vol[ir]
    }

    pub fn vp_vol_f(&self, ir: usize) -> f64 {
        self.vp_vol_f[ir]
    }

    /// V' on the grid variant addressed by `fg`; the momentum-face
    /// variants share the cell-surface geometry.
    pub fn vp_vol_on(&self, ir: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.vp_vol_f[ir],
            _ => self.vp_vol[ir],
        }
    }

    pub fn bmin(&self, ir: usize) -> f64 {
        self.bmin[ir]
    }

    pub fn bmax(&self, ir: usize) -> f64 {
        self.bmax[ir]
    }

    pub fn bmin_on(&self, ir: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.bmin_f[ir],
            _ => self.bmin[ir],
        }
    }

    pub fn bmax_on(&self, ir: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.bmax_f[ir],
            _ => self.bmax[ir],
        }
    }

    /// Toroidal field function G(r) = B_tor·R.
    pub fn btor_g(&self, ir: usize) -> f64 {
        self.btor_g[ir]
    }

    /// ⟨1/(R/R₀)²⟩.
    pub fn fsa_inv_r2(&self, ir: usize) -> f64 {
        self.fsa_inv_r2[ir]
    }

    /// ⟨|∇r|²/(R/R₀)²⟩.
    pub fn fsa_nabla_r2_over_r2(&self, ir: usize) -> f64 {
        self.fsa_nabla_r2_over_r2[ir]
    }

    /// ⟨B²⟩ (T²), used by the synchrotron drag.
    pub fn fsa_b2(&self, ir: usize) -> f64 {
        self.fsa_b2[ir]
    }

    /// Effective passing fraction of the surface.
    pub fn eff_pass_frac(&self, ir: usize) -> f64 {
        self.eff_pass_frac[ir]
    }

    /// Trapped-pitch boundary ξ_T = √(1 − B_min/B_max).
    pub fn xi_trapped(&self, ir: usize) -> f64 {
        self.xi_trapped[ir]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_construction() {
        let g = RadialGrid::new(vec![0.25, 0.75], vec![0.0, 0.5, 1.0], 3.0);
        assert_eq!(g.nr(), 2);
        assert_eq!(g.r(1), 0.75);
        assert_eq!(g.r_f(2), 1.0);
        assert!(!g.is_published());
        // Pre-publication defaults keep consumers well-defined.
        assert_eq!(g.eff_pass_frac(0), 1.0);
    }

    #[test]
    fn test_variant_dispatch() {
        let mut g = RadialGrid::new(vec![0.5], vec![0.0, 1.0], 3.0);
        g.publish(GeometryPublication {
            vp_vol: vec![2.0],
            vp_vol_f: vec![1.0, 3.0],
            bmin: vec![4.5],
            bmin_f: vec![4.0, 5.0],
            bmax: vec![5.5],
            bmax_f: vec![5.0, 6.0],
            btor_g: vec![15.0],
            btor_g_f: vec![15.0, 15.0],
            fsa_inv_r2: vec![1.0],
            fsa_nabla_r2_over_r2: vec![1.0],
            fsa_b2: vec![25.0],
            eff_pass_frac: vec![0.8],
            xi_trapped: vec![0.4],
        });
        assert!(g.is_published());
        assert_eq!(g.vp_vol_on(0, FluxGrid::Distribution), 2.0);
        assert_eq!(g.vp_vol_on(0, FluxGrid::P1), 2.0);
        assert_eq!(g.vp_vol_on(0, FluxGrid::P2), 2.0);
        assert_eq!(g.vp_vol_on(1, FluxGrid::Radial), 3.0);
        assert_eq!(g.bmin_on(0, FluxGrid::Radial), 4.0);
        assert_eq!(g.bmax_on(0, FluxGrid::Distribution), 5.5);
    }
}
