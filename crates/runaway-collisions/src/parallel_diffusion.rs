// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Parallel Diffusion Frequency
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Parallel (energy) diffusion frequency ν_‖, defined so that the D^pp
//! component of the collision operator equals (mₑc)² ν_‖.
//!
//! For a linearised operator with a known temperature, ν_‖ is uniquely
//! prescribed by ν_s through preservation of the Maxwell–Jüttner
//! steady state: ν_‖ = Θ γ ν_s. Identically zero in superthermal mode,
//! where the thermal diffusion is negligible against the drag. Rebuild
//! after the slowing-down frequency.

use crate::lnlambda::CoulombLogarithm;
use crate::quantity::{RebuildTracker, VariantTables};
use crate::slowing_down::SlowingDownFrequency;
use ndarray::Array2;
use runaway_geometry::momentum::PXiGrid;
use runaway_types::constants::{COLL_PREFACTOR, MC2_IN_EV};
use runaway_types::error::{KineticError, KineticResult};
use runaway_types::settings::{
    CollisionFrequencyMode, CollisionQuantitySettings, FluxGrid, NonlinearMode,
};
use runaway_types::unknowns::{names, UnknownQuantityHandler};
use std::f64::consts::PI;

#[derive(Debug, Clone)]
pub struct ParallelDiffusionFrequency {
    settings: CollisionQuantitySettings,
    tracker: RebuildTracker,
    tables: VariantTables,
    /// Θ = T_cold/mc² per radius.
    t_normalized: Vec<f64>,
    nonlinear: Option<Array2<f64>>,
}

impl ParallelDiffusionFrequency {
    pub fn new(settings: CollisionQuantitySettings) -> Self {
        ParallelDiffusionFrequency {
            settings,
            tracker: RebuildTracker::new(),
            tables: VariantTables::default(),
            t_normalized: Vec::new(),
            nonlinear: None,
        }
    }

    pub fn is_superthermal(&self) -> bool {
        matches!(
            self.settings.collfreq_mode,
            CollisionFrequencyMode::Superthermal
        )
    }

    pub fn grid_rebuilt(&mut self) {
        self.tracker.grid_rebuilt();
    }

    pub fn needs_rebuild(&self, unknowns: &UnknownQuantityHandler) -> KineticResult<bool> {
        self.tracker.needs_rebuild(unknowns)
    }

    /// Rebuild from the already-rebuilt slowing-down frequency.
    pub fn rebuild(
        &mut self,
        unknowns: &UnknownQuantityHandler,
        nu_s: &SlowingDownFrequency,
        nr: usize,
        pxi: &PXiGrid,
    ) -> KineticResult<()> {
        if !self.needs_rebuild(unknowns)? {
            return Ok(());
        }
        if self.tracker.takes_grid_rebuild() {
            self.rebuild_constant_terms(pxi)?;
            self.tables = VariantTables::zeros(nr, pxi);
        }
        self.rebuild_plasma_dependent_terms(unknowns)?;
        for fg in [FluxGrid::Distribution, FluxGrid::Radial, FluxGrid::P1, FluxGrid::P2] {
            self.assemble_quantity(fg, nu_s, pxi)?;
        }
        Ok(())
    }

    fn rebuild_constant_terms(&mut self, pxi: &PXiGrid) -> KineticResult<()> {
        self.nonlinear = match self.settings.nonlinear_mode {
            NonlinearMode::Neglect => None,
            NonlinearMode::Isotropic => {
                if pxi.np2() != 1 {
                    return Err(KineticError::Usage(
                        "nonlinear collisions require a p-xi grid with np2 = 1".into(),
                    ));
                }
                Some(nonlinear_matrix(pxi.p_cells(), pxi.p_faces()))
            }
        };
        Ok(())
    }

    fn rebuild_plasma_dependent_terms(
        &mut self,
        unknowns: &UnknownQuantityHandler,
    ) -> KineticResult<()> {
        if self.is_superthermal() {
            return Ok(());
        }
        let t_cold = unknowns.data(unknowns.require(names::T_COLD)?);
        self.t_normalized = t_cold.iter().map(|&t| t / MC2_IN_EV).collect();
        Ok(())
    }

    /// ν_‖ tables from the ν_s tables and the rescale factor Θγ.
    fn assemble_quantity(
        &mut self,
        fg: FluxGrid,
        nu_s: &SlowingDownFrequency,
        pxi: &PXiGrid,
    ) -> KineticResult<()> {
        if self.is_superthermal() {
            self.tables.table_mut(fg).fill(0.0);
            return Ok(());
        }
        let (n1, n2) = pxi.table_dims(fg);
        let n_radial = self.tables.table(fg).dim().0;
        let nr = self.t_normalized.len();
        for ir_row in 0..n_radial {
            let theta = self.t_normalized[ir_row.min(nr - 1)];
            for j in 0..n2 {
                for i in 0..n1 {
                    let gamma = pxi.gamma_at(i, j, fg);
                    let idx = j * n1 + i;
                    self.tables.table_mut(fg)[[ir_row, idx]] =
                        theta * gamma * nu_s.tables().table(fg)[[ir_row, idx]];
                }
            }
        }
        Ok(())
    }

    /// The factor turning ν_s into ν_‖.
    pub fn rescale_factor(&self, ir: usize, gamma: f64) -> f64 {
        self.t_normalized[ir] * gamma
    }

    /// ν_‖ at (ir, p).
    pub fn evaluate_at_p(
        &self,
        ir: usize,
        p: f64,
        nu_s: &SlowingDownFrequency,
        lnl: &CoulombLogarithm,
    ) -> KineticResult<f64> {
        if self.is_superthermal() {
            return Ok(0.0);
        }
        let gamma = (1.0 + p * p).sqrt();
        Ok(self.rescale_factor(ir, gamma) * nu_s.evaluate_at_p(ir, p, lnl)?)
    }

    pub fn value(&self, fg: FluxGrid, pxi: &PXiGrid, ir: usize, i: usize, j: usize) -> f64 {
        self.tables.value(fg, pxi, ir, i, j)
    }

    /// Add the nonlinear electron–electron contribution from f_hot
    /// onto the p1 table.
    pub fn add_nonlinear_contribution(
        &mut self,
        f_hot: &Array2<f64>,
        lnl: &CoulombLogarithm,
        pxi: &PXiGrid,
    ) -> KineticResult<()> {
        let mat = self.nonlinear.as_ref().ok_or_else(|| {
            KineticError::Usage("nonlinear contribution requested in neglect mode".into())
        })?;
        let np1 = pxi.np1();
        let table = self.tables.table_mut(FluxGrid::P1);
        for ir in 0..f_hot.dim().0 {
            let ln_c = lnl.ln_lambda_c(ir);
            for i in 0..np1 + 1 {
                let mut add = 0.0;
                for ip in 0..np1 {
                    add += mat[[i, ip]] * f_hot[[ir, ip]];
                }
                table[[ir, i]] += ln_c * add;
            }
        }
        Ok(())
    }
}

/// Rosenbluth-potential matrix for the energy diffusion: below the
/// face the field particles contribute ∝ p'⁴/(p_f p_f²), above it
/// ∝ p'. Trapezoidal weights with the face-straddling corrections.
fn nonlinear_matrix(p: &[f64], p_f: &[f64]) -> Array2<f64> {
    let np1 = p.len();
    let mut mat = Array2::zeros((np1 + 1, np1));
    let trapz: Vec<f64> = (0..np1)
        .map(|i| {
            if i == 0 || i == np1 - 1 {
                0.0
            } else {
                (p[i + 1] - p[i - 1]) / 2.0
            }
        })
        .collect();

    for i in 1..np1 + 1 {
        let pf = p_f[i];
        let p2f = pf * pf;

        let mut p2 = p[0] * p[0];
        mat[[i, 0]] =
            (4.0 * PI / 3.0) * COLL_PREFACTOR * ((p[1] - p[0]) / 2.0 + p[0] / 5.0) * p2 * p2
                / (pf * p2f);
        for ip in 1..i.saturating_sub(1) {
            p2 = p[ip] * p[ip];
            mat[[i, ip]] = (4.0 * PI / 3.0) * COLL_PREFACTOR * trapz[ip] * p2 * p2 / (pf * p2f);
        }
        if i >= 2 {
            p2 = p[i - 1] * p[i - 1];
            let p_i = if i < np1 {
                p[i]
            } else {
                2.0 * p[np1 - 1] - p[np1 - 2]
            };
            let w = (p[i - 1] - p[i - 2]) / 2.0
                + (pf - p[i - 1]) / (p_i - p[i - 1]) * ((2.0 * p_i - pf - p[i - 1]) / 2.0);
            mat[[i, i - 1]] = (4.0 * PI / 3.0) * COLL_PREFACTOR * w * p2 * p2 / (pf * p2f);
        }
        if i < np1 {
            p2 = p[i] * p[i];
            let w = (pf - p[i - 1]) * (pf - p[i - 1]) / (p[i] - p[i - 1]);
            mat[[i, i]] = (4.0 * PI / 3.0) * COLL_PREFACTOR * w * p2 * p2 / (pf * p2f);

            let w_im1 = 0.5 * (p[i] - pf) * (p[i] - pf) / (p[i] - p[i - 1]);
            mat[[i, i - 1]] += (4.0 * PI / 3.0) * COLL_PREFACTOR * w_im1 * p[i - 1];
            let w_i = if i + 1 < np1 {
                (p[i + 1] - p[i]) / 2.0
                    + 0.5 * (p[i] - pf) * (pf + p[i] - 2.0 * p[i - 1]) / (p[i] - p[i - 1])
            } else {
                0.5 * (p[i] - pf) * (pf + p[i] - 2.0 * p[i - 1]) / (p[i] - p[i - 1])
            };
            mat[[i, i]] += (4.0 * PI / 3.0) * COLL_PREFACTOR * w_i * p[i];

            for ip in (i + 1)..np1.saturating_sub(1) {
                mat[[i, ip]] = (4.0 * PI / 3.0) * COLL_PREFACTOR * trapz[ip] * p[ip];
            }
            let w_end = (p[np1 - 1] - p[np1 - 2]) / 2.0;
            if i != np1 - 1 {
                mat[[i, np1 - 1]] = (4.0 * PI / 3.0) * COLL_PREFACTOR * w_end * p[np1 - 1];
            } else {
                mat[[i, np1 - 1]] += (4.0 * PI / 3.0) * COLL_PREFACTOR * w_end * p[np1 - 1];
            }
        }
    }
    mat
}
