// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Runaway Fluid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Derived runaway quantities: the effective critical field, the
//! critical momentum and the avalanche/tritium/Compton growth rates.
//!
//! Everything is cached per radius and recomputed only when an input
//! the derivation depends on has changed (E, n_cold, n_i, T_cold,
//! n_tot, or a grid rebuild).
//!
//! The effective critical field follows Hesslow et al., PPCF 60,
//! 074010 (2018), generalised to inhomogeneous magnetic fields; the
//! critical momentum uses the matched formula of Hesslow et al.,
//! NF 59, 084004 (2019).

use crate::rates::{compton_rate, tritium_rate};
use crate::ufunc::UFuncContext;
use runaway_collisions::lnlambda::CoulombLogarithm;
use runaway_collisions::{PitchScatterFrequency, SlowingDownFrequency};
use runaway_geometry::momentum::PXiGrid;
use runaway_geometry::radial_grid::RadialGrid;
use runaway_math::minimize::{brent_minimize, expand_minimum_bracket};
use runaway_math::roots::{brent_root, expand_root_interval};
use runaway_types::constants::{C, COLL_PREFACTOR, EC, MC2_IN_EV, M_E};
use runaway_types::error::{KineticError, KineticResult};
use runaway_types::ions::IonHandler;
use runaway_types::settings::{
    BremsstrahlungMode, CollisionFrequencyMode, CollisionQuantitySettings, LnLambdaType,
    PstarMode, RunawayFluidSettings,
};
use runaway_types::unknowns::{names, UnknownQuantityHandler};

/// Momenta above this are not physically relevant; if U has no interior
/// maximum below the cap, E_ceff is defined by U(P_MAX) = 0.
const P_UPPER_THRESHOLD: f64 = 1000.0;
/// Relative tolerance of the E_ceff root solve.
const EPSREL_ECEFF: f64 = 3e-3;
/// Relative tolerance of the inner U-maximisation.
const EPSREL_U_EXTREMUM: f64 = 5e-2;
/// Iteration cap of the E_ceff and p* solves.
const MAX_ITER_ECEFF: usize = 30;

#[derive(Debug, Clone)]
pub struct RunawayFluid {
    settings: RunawayFluidSettings,
    coll_settings: CollisionQuantitySettings,
    /// Overrides for the E_ceff evaluation: superthermal mode,
    /// energy-dependent ln Λ and stopping-power bremsstrahlung are
    /// always used there; only the screening type follows the user.
    settings_ec: CollisionQuantitySettings,
    /// Overrides for the p* evaluation: superthermal mode only, which
    /// avoids spurious thermal solutions of the p_c equation.
    settings_pc: CollisionQuantitySettings,

    grid_rebuilt: bool,
    nr: usize,

    ec_free: Vec<f64>,
    ec_tot: Vec<f64>,
    e_dreicer: Vec<f64>,
    tau_ee_rel: Vec<f64>,
    tau_ee_th: Vec<f64>,
    e_ceff: Vec<f64>,
    p_crit: Vec<f64>,
    p_crit_inv_sq: Vec<f64>,
    pc_complete_screening: Vec<f64>,
    pc_no_screening: Vec<f64>,
    avalanche_rate: Vec<f64>,
    tritium_rate: Vec<f64>,
    compton_rate: Vec<f64>,
}

impl RunawayFluid {
    pub fn new(
        coll_settings: CollisionQuantitySettings,
        settings: RunawayFluidSettings,
    ) -> Self {
        let settings_ec = CollisionQuantitySettings {
            collfreq_mode: CollisionFrequencyMode::Superthermal,
            lnlambda_type: LnLambdaType::EnergyDependent,
            bremsstrahlung_mode: BremsstrahlungMode::StoppingPower,
            ..coll_settings
        };
        let settings_pc = CollisionQuantitySettings {
            collfreq_mode: CollisionFrequencyMode::Superthermal,
            ..coll_settings
        };
        RunawayFluid {
            settings,
            coll_settings,
            settings_ec,
            settings_pc,
            grid_rebuilt: true,
            nr: 0,
            ec_free: Vec::new(),
            ec_tot: Vec::new(),
            e_dreicer: Vec::new(),
            tau_ee_rel: Vec::new(),
            tau_ee_th: Vec::new(),
            e_ceff: Vec::new(),
            p_crit: Vec::new(),
            p_crit_inv_sq: Vec::new(),
            pc_complete_screening: Vec::new(),
            pc_no_screening: Vec::new(),
            avalanche_rate: Vec::new(),
            tritium_rate: Vec::new(),
            compton_rate: Vec::new(),
        }
    }

    /// Signal a grid rebuild: storage is reallocated on the next
    /// rebuild and every cache recomputed.
    pub fn grid_rebuilt(&mut self) {
        self.grid_rebuilt = true;
    }

    /// True when any unknown quantity affecting the runaway rates has
    /// changed.
    pub fn parameters_have_changed(
        &self,
        unknowns: &UnknownQuantityHandler,
    ) -> KineticResult<bool> {
        Ok(self.grid_rebuilt
            || unknowns.has_changed(unknowns.require(names::N_COLD)?)
            || unknowns.has_changed(unknowns.require(names::T_COLD)?)
            || unknowns.has_changed(unknowns.require(names::ION_SPECIES)?)
            || unknowns.has_changed(unknowns.require(names::N_TOT)?)
            || unknowns.has_changed(unknowns.require(names::E_FIELD)?))
    }

    /// Rebuild all runaway quantities if plasma parameters have
    /// changed. The Coulomb logarithm and the frequencies are refreshed
    /// first; they feed every derivation below.
    #[allow(clippy::too_many_arguments)]
    pub fn rebuild(
        &mut self,
        unknowns: &UnknownQuantityHandler,
        ions: &IonHandler,
        grid: &RadialGrid,
        lnl: &mut CoulombLogarithm,
        nu_s: &mut SlowingDownFrequency,
        nu_d: &mut PitchScatterFrequency,
        pxi: &PXiGrid,
    ) -> KineticResult<()> {
        if !self.parameters_have_changed(unknowns)? {
            return Ok(());
        }
        if self.grid_rebuilt {
            self.nr = grid.nr();
            self.allocate();
            nu_s.grid_rebuilt();
            nu_d.grid_rebuilt();
            self.grid_rebuilt = false;
        }

        lnl.rebuild(unknowns)?;
        nu_s.rebuild(unknowns, ions, lnl, self.nr, pxi)?;
        nu_d.rebuild(unknowns, ions, lnl, self.nr, pxi)?;

        self.calculate_derived_quantities(unknowns, lnl)?;
        self.calculate_effective_critical_field(grid, lnl, nu_s, nu_d)?;
        self.calculate_critical_momentum(unknowns, grid, lnl, nu_s, nu_d)?;
        self.calculate_growth_rates(unknowns)?;
        Ok(())
    }

    fn allocate(&mut self) {
        let z = vec![0.0; self.nr];
        self.ec_free = z.clone();
        self.ec_tot = z.clone();
        self.e_dreicer = z.clone();
        self.tau_ee_rel = z.clone();
        self.tau_ee_th = z.clone();
        self.e_ceff = z.clone();
        self.p_crit = z.clone();
        self.p_crit_inv_sq = z.clone();
        self.pc_complete_screening = z.clone();
        self.pc_no_screening = z.clone();
        self.avalanche_rate = z.clone();
        self.tritium_rate = z.clone();
        self.compton_rate = z;
    }

    /// Connor–Hastie fields from the relativistic ln Λ and the Dreicer
    /// field from the thermal one.
    fn calculate_derived_quantities(
        &mut self,
        unknowns: &UnknownQuantityHandler,
        lnl: &CoulombLogarithm,
    ) -> KineticResult<()> {
        let n_cold = unknowns.data(unknowns.require(names::N_COLD)?);
        let n_tot = unknowns.data(unknowns.require(names::N_TOT)?);
        let t_cold = unknowns.data(unknowns.require(names::T_COLD)?);
        let e_unit = M_E * C / EC;
        for ir in 0..self.nr {
            let ln_c = lnl.ln_lambda_c(ir);
            let ln_t = lnl.ln_lambda_t(ir);
            self.ec_free[ir] = ln_c * n_cold[ir] * COLL_PREFACTOR * e_unit;
            self.ec_tot[ir] = ln_c * n_tot[ir] * COLL_PREFACTOR * e_unit;
            self.e_dreicer[ir] =
                ln_t * n_cold[ir] * COLL_PREFACTOR * e_unit * (MC2_IN_EV / t_cold[ir]);
            self.tau_ee_rel[ir] = 1.0 / (ln_c * n_cold[ir] * COLL_PREFACTOR);
            self.tau_ee_th[ir] = 1.0 / (ln_t * n_cold[ir] * COLL_PREFACTOR)
                * (2.0 * t_cold[ir] / MC2_IN_EV).powf(1.5);
        }
        Ok(())
    }

    /// E_ceff(ir): the E at which max_p U(p; E) = 0.
    fn calculate_effective_critical_field(
        &mut self,
        grid: &RadialGrid,
        lnl: &CoulombLogarithm,
        nu_s: &SlowingDownFrequency,
        nu_d: &PitchScatterFrequency,
    ) -> KineticResult<()> {
        for ir in 0..self.nr {
            let ctx = UFuncContext {
                ir,
                xi_trapped: grid.xi_trapped(ir),
                fsa_b2: grid.fsa_b2(ir),
                settings: &self.settings_ec,
                nu_s,
                nu_d,
                lnl,
            };

            // min over p of −U(p; E); positive below E_ceff.
            let neg_u_extremum = |e_term: f64| -> f64 {
                let g = |p: f64| -ctx.u_at_p(p, e_term);
                let (lo, guess, up) = expand_minimum_bracket(&g, 1.0, 10.0, 100.0, 5.0, P_UPPER_THRESHOLD);
                if up > P_UPPER_THRESHOLD {
                    // No interior maximum below the cap: the boundary
                    // value defines the criterion.
                    return g(P_UPPER_THRESHOLD);
                }
                match brent_minimize(g, lo, guess, up, EPSREL_U_EXTREMUM, MAX_ITER_ECEFF, "U extremum") {
                    Ok(m) => m.f,
                    Err(_) => f64::NAN,
                }
            };

            let mut e_lo = 0.9 * self.ec_tot[ir];
            let mut e_up = 1.5 * self.ec_tot[ir];
            expand_root_interval(&neg_u_extremum, &mut e_lo, &mut e_up);
            let root = brent_root(
                neg_u_extremum,
                e_lo,
                e_up,
                EPSREL_ECEFF,
                MAX_ITER_ECEFF,
                "effective critical field",
            )?;
            self.e_ceff[ir] = root.root;
        }
        Ok(())
    }

    /// ν̄_s = ν_s·p³/γ², constant in p for ideal plasmas (only the ln Λ
    /// energy dependence remains).
    pub fn nu_s_hat(
        &self,
        ir: usize,
        p: f64,
        settings: &CollisionQuantitySettings,
        lnl: &CoulombLogarithm,
        nu_s: &SlowingDownFrequency,
    ) -> KineticResult<f64> {
        Ok(COLL_PREFACTOR * nu_s.evaluate_at_p_with_settings(ir, p, settings, lnl)?
            / nu_s.prefactor_at_p(p))
    }

    /// ν̄_D = ν_D·p³/γ.
    pub fn nu_d_hat(
        &self,
        ir: usize,
        p: f64,
        settings: &CollisionQuantitySettings,
        lnl: &CoulombLogarithm,
        nu_d: &PitchScatterFrequency,
    ) -> KineticResult<f64> {
        Ok(COLL_PREFACTOR * nu_d.evaluate_at_p_with_settings(ir, p, settings, lnl)?
            / nu_d.prefactor_at_p(p))
    }

    /// Critical momentum p* and the sign-preserving 1/p_c².
    fn calculate_critical_momentum(
        &mut self,
        unknowns: &UnknownQuantityHandler,
        grid: &RadialGrid,
        lnl: &CoulombLogarithm,
        nu_s: &SlowingDownFrequency,
        nu_d: &PitchScatterFrequency,
    ) -> KineticResult<()> {
        let e_term = unknowns.data(unknowns.require(names::E_FIELD)?).to_vec();
        for ir in 0..self.nr {
            let e_field = e_term[ir].max(self.e_ceff[ir]);
            let e_norm = EC * e_field / (M_E * C);

            let eff_pass = match self.coll_settings.pstar_mode {
                PstarMode::Collisional => 1.0,
                PstarMode::Collisionless => grid.eff_pass_frac(ir),
            };
            let const_term = (e_norm * e_norm * eff_pass).sqrt().sqrt();

            // Brackets from the completely screened and non-screened
            // analytic limits; ν̄ is p-independent there up to ln Λ.
            let set_cs = CollisionQuantitySettings {
                collfreq_type: runaway_types::settings::CollisionFrequencyType::CompletelyScreened,
                ..self.settings_pc
            };
            let set_ns = CollisionQuantitySettings {
                collfreq_type: runaway_types::settings::CollisionFrequencyType::NonScreened,
                ..self.settings_pc
            };
            let bar_cs = (self.nu_s_hat(ir, 1.0, &set_cs, lnl, nu_s)?
                * self.nu_d_hat(ir, 1.0, &set_cs, lnl, nu_d)?)
            .sqrt();
            let bar_ns = (self.nu_s_hat(ir, 1.0, &set_ns, lnl, nu_s)?
                * self.nu_d_hat(ir, 1.0, &set_ns, lnl, nu_d)?)
            .sqrt();
            self.pc_complete_screening[ir] = (bar_cs / e_norm).sqrt();
            self.pc_no_screening[ir] = (bar_ns / e_norm).sqrt();

            let p_star_fn = |p: f64| -> f64 {
                let bar = self
                    .nu_s_hat(ir, p, &self.settings_pc, lnl, nu_s)
                    .and_then(|s| {
                        self.nu_d_hat(ir, p, &self.settings_pc, lnl, nu_d).map(|d| s * d)
                    });
                match bar {
                    Ok(b) => b.sqrt().sqrt() / const_term - p,
                    Err(_) => f64::NAN,
                }
            };
            let mut p_lo = self.pc_complete_screening[ir];
            let mut p_up = self.pc_no_screening[ir];
            expand_root_interval(&p_star_fn, &mut p_lo, &mut p_up);
            let p_star = brent_root(
                p_star_fn,
                p_lo,
                p_up,
                EPSREL_ECEFF,
                MAX_ITER_ECEFF,
                "critical momentum",
            )?
            .root;

            // 1/p_c² = (E−E_ceff)·√f_eff / √(ν̄_s(ν̄_D + 4ν̄_s)); may go
            // negative, representing runaway decay.
            let nu_s_hat = self.nu_s_hat(ir, p_star, &self.settings_pc, lnl, nu_s)?;
            let nu_d_hat = self.nu_d_hat(ir, p_star, &self.settings_pc, lnl, nu_d)?;
            let e_minus_eceff = EC * (e_term[ir] - self.e_ceff[ir]) / (M_E * C);
            let nu_term = nu_s_hat * (nu_d_hat + 4.0 * nu_s_hat);
            self.p_crit_inv_sq[ir] = e_minus_eceff * eff_pass.sqrt() / nu_term.sqrt();

            self.p_crit[ir] = if e_minus_eceff <= 0.0 {
                f64::INFINITY
            } else {
                1.0 / self.p_crit_inv_sq[ir].sqrt()
            };
        }
        Ok(())
    }

    /// Avalanche, tritium and Compton growth rates from p_c.
    fn calculate_growth_rates(&mut self, unknowns: &UnknownQuantityHandler) -> KineticResult<()> {
        let n_tot = unknowns.data(unknowns.require(names::N_TOT)?).to_vec();
        for ir in 0..self.nr {
            self.avalanche_rate[ir] = n_tot[ir] * COLL_PREFACTOR * self.p_crit_inv_sq[ir];
            self.tritium_rate[ir] = tritium_rate(self.p_crit[ir]);
            self.compton_rate[ir] = n_tot[ir]
                * compton_rate(self.p_crit[ir], self.settings.compton_photon_flux)?;
        }
        Ok(())
    }

    pub fn nr(&self) -> usize {
        self.nr
    }

    pub fn coll_settings(&self) -> &CollisionQuantitySettings {
        &self.coll_settings
    }

    /// Connor–Hastie critical field from the free-electron density.
    pub fn ec_free(&self, ir: usize) -> f64 {
        self.ec_free[ir]
    }

    /// Connor–Hastie critical field from the total electron density.
    pub fn ec_tot(&self, ir: usize) -> f64 {
        self.ec_tot[ir]
    }

    pub fn e_dreicer(&self, ir: usize) -> f64 {
        self.e_dreicer[ir]
    }

    /// Relativistic electron collision time.
    pub fn tau_ee_rel(&self, ir: usize) -> f64 {
        self.tau_ee_rel[ir]
    }

    /// Thermal electron collision time.
    pub fn tau_ee_th(&self, ir: usize) -> f64 {
        self.tau_ee_th[ir]
    }

    pub fn e_ceff(&self, ir: usize) -> f64 {
        self.e_ceff[ir]
    }

    /// Critical runaway momentum; +∞ when E ≤ E_ceff.
    pub fn p_crit(&self, ir: usize) -> f64 {
        self.p_crit[ir]
    }

    /// Sign-preserving 1/p_c²; negative values represent runaway decay.
    pub fn p_crit_inv_sq(&self, ir: usize) -> f64 {
        self.p_crit_inv_sq[ir]
    }

    pub fn avalanche_rate(&self, ir: usize) -> f64 {
        self.avalanche_rate[ir]
    }

    pub fn tritium_rate(&self, ir: usize) -> f64 {
        self.tritium_rate[ir]
    }

    pub fn compton_rate(&self, ir: usize) -> f64 {
        self.compton_rate[ir]
    }
}
