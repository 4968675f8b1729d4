// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Coulomb Logarithm
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Radius-dependent Coulomb logarithm.
//!
//! Thermal form ln Λ_T = 14.6 + ½ ln(T[eV]/(n_cold/10²⁰)), relativistic
//! form ln Λ_c = ln Λ_T + ½ ln(mc²/T), and the Hesslow energy-dependent
//! interpolation towards the thermal value at low momenta:
//!   ln Λ_ee(p) = ln Λ_c + (1/k) ln(1 + (√(2(γ−1))/p_Te)^k),
//!   ln Λ_ei(p) = ln Λ_c + (1/k) ln(1 + (2p/p_Te)^k),  k = 5.

use runaway_types::constants::MC2_IN_EV;
use runaway_types::error::{KineticError, KineticResult};
use runaway_types::settings::LnLambdaType;
use runaway_types::unknowns::{names, UnknownQuantityHandler};

/// Interpolation exponent of the energy-dependent form.
const K_INTERPOLATE: f64 = 5.0;

/// Per-radius Coulomb logarithms, rebuilt on n_cold/T_cold change.
#[derive(Debug, Clone, Default)]
pub struct CoulombLogarithm {
    ln_t: Vec<f64>,
    ln_c: Vec<f64>,
    /// p_Te = √(2Θ) per radius, for the momentum interpolation.
    p_te: Vec<f64>,
}

impl CoulombLogarithm {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when an input this cache depends on has changed.
    pub fn needs_rebuild(&self, unknowns: &UnknownQuantityHandler) -> KineticResult<bool> {
        Ok(self.ln_t.is_empty()
            || unknowns.has_changed(unknowns.require(names::N_COLD)?)
            || unknowns.has_changed(unknowns.require(names::T_COLD)?))
    }

    /// Refresh the per-radius values from the current plasma state.
    pub fn rebuild(&mut self, unknowns: &UnknownQuantityHandler) -> KineticResult<()> {
        let n_cold = unknowns.data(unknowns.require(names::N_COLD)?);
        let t_cold = unknowns.data(unknowns.require(names::T_COLD)?);
        if n_cold.len() != t_cold.len() {
            return Err(KineticError::Usage(
                "n_cold and T_cold must share the radial grid".into(),
            ));
        }
        let nr = n_cold.len();
        self.ln_t.resize(nr, 0.0);
        self.ln_c.resize(nr, 0.0);
        self.p_te.resize(nr, 0.0);
        for ir in 0..nr {
            if n_cold[ir] <= 0.0 || t_cold[ir] <= 0.0 {
                return Err(KineticError::Numeric(format!(
                    "non-positive plasma state at ir={ir}: n_cold={}, T_cold={}",
                    n_cold[ir], t_cold[ir]
                )));
            }
            let ln_t = 14.6 + 0.5 * (t_cold[ir] / (n_cold[ir] / 1e20)).ln();
            self.ln_t[ir] = ln_t;
            self.ln_c[ir] = ln_t + 0.5 * (MC2_IN_EV / t_cold[ir]).ln();
            self.p_te[ir] = (2.0 * t_cold[ir] / MC2_IN_EV).sqrt();
        }
        Ok(())
    }

    pub fn nr(&self) -> usize {
        self.ln_t.len()
    }

    /// Thermal ln Λ_T.
    pub fn ln_lambda_t(&self, ir: usize) -> f64 {
        self.ln_t[ir]
    }

    /// Relativistic ln Λ_c.
    pub fn ln_lambda_c(&self, ir: usize) -> f64 {
        self.ln_c[ir]
    }

    /// Electron–electron logarithm at momentum p.
    pub fn ln_ee(&self, ir: usize, p: f64, lntype: LnLambdaType) -> f64 {
        match lntype {
            LnLambdaType::Constant => self.ln_c[ir],
            LnLambdaType::EnergyDependent => {
                let gamma = (1.0 + p * p).sqrt();
                let arg = (2.0 * (gamma - 1.0)).max(0.0).sqrt() / self.p_te[ir];
                self.ln_c[ir] + (1.0 + arg.powf(K_INTERPOLATE)).ln() / K_INTERPOLATE
            }
        }
    }

    /// Electron–ion logarithm at momentum p.
    pub fn ln_ei(&self, ir: usize, p: f64, lntype: LnLambdaType) -> f64 {
        match lntype {
            LnLambdaType::Constant => self.ln_c[ir],
            LnLambdaType::EnergyDependent => {
                let arg = 2.0 * p / self.p_te[ir];
                self.ln_c[ir] + (1.0 + arg.powf(K_INTERPOLATE)).ln() / K_INTERPOLATE
            }
        }
    }
}
