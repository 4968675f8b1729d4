// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Collision Frequency
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Shared skeleton of the slowing-down and pitch-scatter frequencies.
//!
//! Every frequency is assembled as
//!
//!   ν(ir, p) = PreFactor(p) · [ lnΛ_ee·n_cold·ElectronTerm(ir, p)
//!               + Σ_ion n_iz,Z₀·(lnΛ_ei·IonTerm + ScreenedTerm
//!                                + BremsTerm)(iz, Z₀, p) ]
//!
//! with the screening type selecting which of the ion/screened/brems
//! contributions enter, and the mode selecting the prefactor and
//! electron-term forms. The kind-specific physics lives behind
//! [`FrequencyModel`]; the assembly, caching, Jacobian partials and the
//! nonlinear Rosenbluth machinery are shared here.

use crate::lnlambda::CoulombLogarithm;
use crate::quantity::{RebuildTracker, VariantTables};
use ndarray::{Array2, Array3};
use runaway_geometry::momentum::PXiGrid;
use runaway_math::adaptive::integrate_adaptive;
use runaway_math::special::besselkn_scaled;
use runaway_types::error::{KineticError, KineticResult};
use runaway_types::ions::IonHandler;
use runaway_types::settings::{
    CollisionFrequencyMode, CollisionFrequencyType, CollisionQuantitySettings, FluxGrid,
    NonlinearMode,
};
use runaway_types::unknowns::{names, UnknownQuantityHandler};

/// Relative tolerance of the ψ₀/ψ₁ Chandrasekhar integrals.
const EPSREL_PSI: f64 = 1e-6;

/// Snapshot of the plasma state a frequency was last rebuilt with.
#[derive(Debug, Clone)]
pub struct PlasmaState {
    pub n_cold: Vec<f64>,
    pub t_cold: Vec<f64>,
    pub ions: IonHandler,
}

impl PlasmaState {
    pub fn capture(
        unknowns: &UnknownQuantityHandler,
        ions: &IonHandler,
    ) -> KineticResult<PlasmaState> {
        let mut ions = ions.clone();
        ions.set_densities(unknowns.data(unknowns.require(names::ION_SPECIES)?))?;
        Ok(PlasmaState {
            n_cold: unknowns.data(unknowns.require(names::N_COLD)?).to_vec(),
            t_cold: unknowns.data(unknowns.require(names::T_COLD)?).to_vec(),
            ions,
        })
    }

    pub fn nr(&self) -> usize {
        self.n_cold.len()
    }

    /// Normalised temperature Θ = T/mc².
    pub fn theta(&self, ir: usize) -> f64 {
        self.t_cold[ir] / runaway_types::constants::MC2_IN_EV
    }
}

/// ψ₀(p) = ∫₀^p e^{−(γ(s)−1)/Θ}/γ(s) ds.
pub fn psi0(theta: f64, p: f64) -> KineticResult<f64> {
    integrate_adaptive(
        |s| {
            let gamma = (1.0 + s * s).sqrt();
            (-(gamma - 1.0) / theta).exp() / gamma
        },
        0.0,
        p,
        EPSREL_PSI,
    )
}

/// ψ₁(p) = ∫₀^p e^{−(γ(s)−1)/Θ} ds.
pub fn psi1(theta: f64, p: f64) -> KineticResult<f64> {
    integrate_adaptive(
        |s| (-((1.0 + s * s).sqrt() - 1.0) / theta).exp(),
        0.0,
        p,
        EPSREL_PSI,
    )
}

/// e^{1/Θ} Kₙ(1/Θ), the Maxwell–Jüttner normalisation factor.
pub fn exp_1_over_theta_k(theta: f64, n: usize) -> f64 {
    besselkn_scaled(n, 1.0 / theta)
}

/// Kind-specific physics of one collision frequency.
pub trait FrequencyModel {
    /// Whether the point-charge ion term (with its Z₀² or Z² factor)
    /// enters; deflection has it, slowing-down does not.
    const HAS_ION_TERM: bool;

    /// Momentum prefactor.
    fn prefactor(&self, p: f64, mode: CollisionFrequencyMode) -> f64;

    /// Free-electron term; unity outside full mode.
    fn electron_term(
        &self,
        plasma: &PlasmaState,
        ir: usize,
        p: f64,
        mode: CollisionFrequencyMode,
    ) -> KineticResult<f64>;

    /// Point-charge ion term (charge factors applied by the assembly).
    fn ion_term(&self, p: f64) -> f64;

    /// Partial-screening bound-electron term.
    fn screened_term(&self, z: usize, z0: usize, p: f64) -> f64;

    /// Bremsstrahlung stopping-power term; zero where the kind has no
    /// radiative contribution.
    fn brems_term(&self, z: usize, p: f64) -> f64;

    /// Rosenbluth-potential matrix on the p1 flux grid: multiplied by
    /// the hot-electron distribution it yields this frequency's
    /// nonlinear contribution. Trapezoidal weights, documented per
    /// kind.
    fn nonlinear_matrix(&self, p: &[f64], p_f: &[f64]) -> Array2<f64>;
}

/// A collision frequency on the four grid variants, generic over the
/// kind-specific physics.
#[derive(Debug, Clone)]
pub struct CollisionFrequency<M: FrequencyModel> {
    model: M,
    settings: CollisionQuantitySettings,
    tracker: RebuildTracker,
    tables: VariantTables,
    plasma: Option<PlasmaState>,

    /// Rosenbluth matrix [np1+1, np1]; present in isotropic nonlinear
    /// mode after the constant-term rebuild.
    nonlinear: Option<Array2<f64>>,

    /// ∂ν/∂n_cold per variant-shaped table.
    partial_n_cold: VariantTables,
    /// ∂ν/∂n_i per charge state: [nzs, n_radial, cells] on the
    /// distribution variant (the variant Jacobians most solvers
    /// assemble); other variants are derived on demand.
    partial_n_i: Option<Array3<f64>>,
}

impl<M: FrequencyModel> CollisionFrequency<M> {
    pub fn new(model: M, settings: CollisionQuantitySettings) -> Self {
        CollisionFrequency {
            model,
            settings,
            tracker: RebuildTracker::new(),
            tables: VariantTables::default(),
            plasma: None,
            nonlinear: None,
            partial_n_cold: VariantTables::default(),
            partial_n_i: None,
        }
    }

    pub fn settings(&self) -> &CollisionQuantitySettings {
        &self.settings
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Mark the grid rebuilt; constant terms will be recomputed on the
    /// next rebuild.
    pub fn grid_rebuilt(&mut self) {
        self.tracker.grid_rebuilt();
    }

    pub fn needs_rebuild(&self, unknowns: &UnknownQuantityHandler) -> KineticResult<bool> {
        self.tracker.needs_rebuild(unknowns)
    }

    /// Rebuild the cached tables when an input has changed. The
    /// Coulomb logarithm must already be current for this step.
    pub fn rebuild(
        &mut self,
        unknowns: &UnknownQuantityHandler,
        ions: &IonHandler,
        lnl: &CoulombLogarithm,
        nr: usize,
        pxi: &PXiGrid,
    ) -> KineticResult<()> {
        if !self.needs_rebuild(unknowns)? {
            return Ok(());
        }
        if self.tracker.takes_grid_rebuild() {
            self.rebuild_constant_terms(pxi)?;
            self.tables = VariantTables::zeros(nr, pxi);
            self.partial_n_cold = VariantTables::zeros(nr, pxi);
        }
        self.rebuild_plasma_dependent_terms(unknowns, ions)?;
        for fg in [FluxGrid::Distribution, FluxGrid::Radial, FluxGrid::P1, FluxGrid::P2] {
            self.assemble_quantity(fg, lnl, pxi)?;
        }
        self.set_n_i_partial_contribution(lnl, pxi)?;
        Ok(())
    }

    /// Terms invariant under the plasma state; once per grid rebuild.
    fn rebuild_constant_terms(&mut self, pxi: &PXiGrid) -> KineticResult<()> {
        self.nonlinear = match self.settings.nonlinear_mode {
            NonlinearMode::Neglect => None,
            NonlinearMode::Isotropic => {
                if pxi.np2() != 1 {
                    return Err(KineticError::Usage(
                        "nonlinear collisions require a p-xi grid with np2 = 1".into(),
                    ));
                }
                Some(self.model.nonlinear_matrix(pxi.p_cells(), pxi.p_faces()))
            }
        };
        Ok(())
    }

    /// Per-ion tables and normalised temperature; on plasma change.
    fn rebuild_plasma_dependent_terms(
        &mut self,
        unknowns: &UnknownQuantityHandler,
        ions: &IonHandler,
    ) -> KineticResult<()> {
        self.plasma = Some(PlasmaState::capture(unknowns, ions)?);
        Ok(())
    }

    fn plasma(&self) -> KineticResult<&PlasmaState> {
        self.plasma
            .as_ref()
            .ok_or_else(|| KineticError::Usage("collision frequency used before rebuild".into()))
    }

    /// Fill one variant's table.
    fn assemble_quantity(
        &mut self,
        fg: FluxGrid,
        lnl: &CoulombLogarithm,
        pxi: &PXiGrid,
    ) -> KineticResult<()> {
        let plasma = self.plasma()?.clone();
        let settings = self.settings;
        let (n1, n2) = pxi.table_dims(fg);
        let n_radial = self.tables.table(fg).dim().0;
        let nr = plasma.nr();

        // ν and ∂ν/∂n_cold depend on p only; evaluate one row in i and
        // broadcast over j.
        for ir_row in 0..n_radial {
            let ir = ir_row.min(nr - 1); // radial faces share end-cell plasma
            for i in 0..n1 {
                let (p, _) = pxi.coords(i, 0, fg);
                let nu = self.evaluate_with(&plasma, ir, p, &settings, lnl)?;
                let dnu_dncold = self.n_cold_partial_at(&plasma, ir, p, &settings, lnl)?;
                for j in 0..n2 {
                    self.tables.table_mut(fg)[[ir_row, j * n1 + i]] = nu;
                    self.partial_n_cold.table_mut(fg)[[ir_row, j * n1 + i]] = dnu_dncold;
                }
            }
        }
        Ok(())
    }

    /// ν at (ir, p) under the stored settings.
    pub fn evaluate_at_p(
        &self,
        ir: usize,
        p: f64,
        lnl: &CoulombLogarithm,
    ) -> KineticResult<f64> {
        let settings = self.settings;
        self.evaluate_with(self.plasma()?, ir, p, &settings, lnl)
    }

    /// ν at (ir, p) under overridden settings (the runaway-rate
    /// derivations force superthermal variants).
    pub fn evaluate_at_p_with_settings(
        &self,
        ir: usize,
        p: f64,
        settings: &CollisionQuantitySettings,
        lnl: &CoulombLogarithm,
    ) -> KineticResult<f64> {
        self.evaluate_with(self.plasma()?, ir, p, settings, lnl)
    }

    /// The momentum prefactor alone; the runaway-rate derivations use
    /// ν/PreFactor as an ideal-plasma invariant.
    pub fn prefactor_at_p(&self, p: f64) -> f64 {
        self.model.prefactor(p, self.settings.collfreq_mode)
    }

    fn evaluate_with(
        &self,
        plasma: &PlasmaState,
        ir: usize,
        p: f64,
        settings: &CollisionQuantitySettings,
        lnl: &CoulombLogarithm,
    ) -> KineticResult<f64> {
        let prefactor = self.model.prefactor(p, settings.collfreq_mode);
        if prefactor == 0.0 {
            return Ok(0.0);
        }
        let ln_ee = lnl.ln_ee(ir, p, settings.lnlambda_type);
        let ln_ei = lnl.ln_ei(ir, p, settings.lnlambda_type);
        let electron = self
            .model
            .electron_term(plasma, ir, p, settings.collfreq_mode)?;

        let mut sum = ln_ee * plasma.n_cold[ir] * electron;
        let ions = &plasma.ions;
        for iz in 0..ions.n_species() {
            let z = ions.z(iz);
            for z0 in 0..=z {
                let n_i = ions.density(iz, z0, ir);
                if n_i == 0.0 {
                    continue;
                }
                sum += n_i
                    * self.ion_state_contribution(z, z0, p, electron, ln_ee, ln_ei, settings);
            }
        }

        let nu = prefactor * sum;
        if !nu.is_finite() {
            return Err(KineticError::non_finite("collision frequency", nu));
        }
        Ok(nu)
    }

    /// Contribution of one charge state per unit ion density (without
    /// the prefactor).
    fn ion_state_contribution(
        &self,
        z: usize,
        z0: usize,
        p: f64,
        electron_term: f64,
        ln_ee: f64,
        ln_ei: f64,
        settings: &CollisionQuantitySettings,
    ) -> f64 {
        let n_bound = (z - z0) as f64;
        let mut sum = 0.0;

        if M::HAS_ION_TERM {
            let zfac = match settings.collfreq_type {
                CollisionFrequencyType::NonScreened => (z * z) as f64,
                _ => (z0 * z0) as f64,
            };
            sum += ln_ei * zfac * self.model.ion_term(p);
        }

        match settings.collfreq_type {
            CollisionFrequencyType::CompletelyScreened => {}
            CollisionFrequencyType::NonScreened => {
                // Bound electrons counted as free targets.
                sum += ln_ee * n_bound * electron_term;
            }
            CollisionFrequencyType::PartiallyScreened => {
                if n_bound > 0.0 {
                    sum += self.model.screened_term(z, z0, p);
                }
            }
        }

        if matches!(
            settings.bremsstrahlung_mode,
            runaway_types::settings::BremsstrahlungMode::StoppingPower
        ) {
            sum += self.model.brems_term(z, p);
        }
        sum
    }

    fn n_cold_partial_at(
        &self,
        plasma: &PlasmaState,
        ir: usize,
        p: f64,
        settings: &CollisionQuantitySettings,
        lnl: &CoulombLogarithm,
    ) -> KineticResult<f64> {
        let prefactor = self.model.prefactor(p, settings.collfreq_mode);
        if prefactor == 0.0 {
            return Ok(0.0);
        }
        let electron = self
            .model
            .electron_term(plasma, ir, p, settings.collfreq_mode)?;
        Ok(prefactor * lnl.ln_ee(ir, p, settings.lnlambda_type) * electron)
    }

    /// ∂ν/∂(n_i at charge state) on the distribution variant.
    fn set_n_i_partial_contribution(
        &mut self,
        lnl: &CoulombLogarithm,
        pxi: &PXiGrid,
    ) -> KineticResult<()> {
        let plasma = self.plasma()?.clone();
        let settings = self.settings;
        let fg = FluxGrid::Distribution;
        let (n1, n2) = pxi.table_dims(fg);
        let nr = plasma.nr();
        let nzs = plasma.ions.n_charge_states();
        let mut out = Array3::zeros((nzs, nr, n1 * n2));

        for ir in 0..nr {
            for i in 0..n1 {
                let (p, _) = pxi.coords(i, 0, fg);
                let prefactor = self.model.prefactor(p, settings.collfreq_mode);
                if prefactor == 0.0 {
                    continue;
                }
                let ln_ee = lnl.ln_ee(ir, p, settings.lnlambda_type);
                let ln_ei = lnl.ln_ei(ir, p, settings.lnlambda_type);
                let electron = self
                    .model
                    .electron_term(&plasma, ir, p, settings.collfreq_mode)?;
                for iz in 0..plasma.ions.n_species() {
                    let z = plasma.ions.z(iz);
                    for z0 in 0..=z {
                        let state = plasma.ions.index_of(iz, z0);
                        let v = prefactor
                            * self.ion_state_contribution(
                                z, z0, p, electron, ln_ee, ln_ei, &settings,
                            );
                        for j in 0..n2 {
                            out[[state, ir, j * n1 + i]] = v;
                        }
                    }
                }
            }
        }
        self.partial_n_i = Some(out);
        Ok(())
    }

    /// Tabulated ν on the variant at cell (ir, i, j).
    pub fn value(&self, fg: FluxGrid, pxi: &PXiGrid, ir: usize, i: usize, j: usize) -> f64 {
        self.tables.value(fg, pxi, ir, i, j)
    }

    pub fn tables(&self) -> &VariantTables {
        &self.tables
    }

    /// Jacobian partial with respect to n_cold, per variant.
    pub fn n_cold_partial(&self, fg: FluxGrid) -> &Array2<f64> {
        self.partial_n_cold.table(fg)
    }

    /// Jacobian partial with respect to the ion densities, indexed
    /// (charge state, ir, cell), on the distribution variant.
    pub fn n_i_partial(&self) -> KineticResult<&Array3<f64>> {
        self.partial_n_i
            .as_ref()
            .ok_or_else(|| KineticError::Usage("ion partials requested before rebuild".into()))
    }

    /// Jacobian partial with respect to the hot-electron distribution:
    /// lnΛ_c(ir)·M[i, ip] on the p1 variant.
    pub fn f_hot_partial(
        &self,
        ir: usize,
        lnl: &CoulombLogarithm,
    ) -> KineticResult<Array2<f64>> {
        let mat = self.nonlinear.as_ref().ok_or_else(|| {
            KineticError::Usage("nonlinear contribution requested in neglect mode".into())
        })?;
        Ok(mat * lnl.ln_lambda_c(ir))
    }

    /// Add the nonlinear electron–electron contribution, built from
    /// the hot-electron distribution f_hot[ir, ip], onto the p1 table.
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
        let nr = f_hot.dim().0;
        for ir in 0..nr {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psi_integrals_ordering() {
        // ψ₀ < ψ₁ (the 1/γ weight is below unity away from p = 0).
        let theta = 0.01;
        let p0 = psi0(theta, 1.0).unwrap();
        let p1 = psi1(theta, 1.0).unwrap();
        assert!(p0 > 0.0 && p1 > p0, "psi0 = {p0}, psi1 = {p1}");
    }

    #[test]
    fn test_psi1_saturates_to_k1() {
        // ψ₁(∞) = e^{1/Θ}K₁(1/Θ); p = 3 is far beyond thermal for
        // Θ = 0.01.
        let theta = 0.01;
        let sat = psi1(theta, 3.0).unwrap();
        let k1 = exp_1_over_theta_k(theta, 1);
        assert!(
            (sat - k1).abs() / k1 < 1e-4,
            "psi1(inf) = {sat}, e^x K1 = {k1}"
        );
    }

    #[test]
    fn test_mj_normalisation_small_theta() {
        // e^{1/Θ}K₂(1/Θ) → √(πΘ/2) as Θ → 0.
        let theta = 1e-3;
        let k2 = exp_1_over_theta_k(theta, 2);
        let asym = (std::f64::consts::PI * theta / 2.0).sqrt();
        assert!((k2 - asym).abs() / asym < 5e-3, "K2 = {k2}, asym = {asym}");
    }
}
