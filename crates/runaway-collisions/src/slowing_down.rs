// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Slowing-Down Frequency
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Slowing-down frequency ν_s.
//!
//! The electron-ion part carries no point-charge term; bound electrons
//! contribute through the partial-screening stopping term
//! N_bound·[ln(1+h^k)/k − β²] with h = p√(γ−1)/Î (Bethe-like, with the
//! mean excitation energy Î), following L Hesslow et al., J Plasma
//! Phys 84 (2018). The full-mode electron term uses the Maxwell–Jüttner
//! ψ integrals of Pike & Rose, Phys Rev E 89 (2014). The bremsstrahlung
//! stopping term reproduces the Bethe–Heitler radiative drag
//! −dp/dt = 4 n Z² α r₀² c (ln 2γ − 1/3).

use crate::atomics::mean_excitation_energy;
use crate::frequency::{
    exp_1_over_theta_k, psi0, psi1, CollisionFrequency, FrequencyModel, PlasmaState,
};
use ndarray::Array2;
use runaway_types::constants::{ALPHA, COLL_PREFACTOR};
use runaway_types::error::KineticResult;
use runaway_types::settings::CollisionFrequencyMode;
use std::f64::consts::PI;

/// Interpolation exponent of the bound-electron stopping term.
const K_BOUND: f64 = 5.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct SlowingDownModel;

pub type SlowingDownFrequency = CollisionFrequency<SlowingDownModel>;

impl SlowingDownFrequency {
    pub fn slowing_down(settings: runaway_types::settings::CollisionQuantitySettings) -> Self {
        CollisionFrequency::new(SlowingDownModel, settings)
    }
}

impl FrequencyModel for SlowingDownModel {
    const HAS_ION_TERM: bool = false;

    fn prefactor(&self, p: f64, mode: CollisionFrequencyMode) -> f64 {
        if p == 0.0 {
            return 0.0;
        }
        match mode {
            CollisionFrequencyMode::UltraRelativistic => COLL_PREFACTOR / p,
            _ => {
                let gamma_sq = 1.0 + p * p;
                COLL_PREFACTOR * gamma_sq / (p * p * p)
            }
        }
    }

    fn electron_term(
        &self,
        plasma: &PlasmaState,
        ir: usize,
        p: f64,
        mode: CollisionFrequencyMode,
    ) -> KineticResult<f64> {
        if !matches!(mode, CollisionFrequencyMode::Full) {
            return Ok(1.0);
        }
        if p == 0.0 {
            return Ok(0.0);
        }
        let theta = plasma.theta(ir);
        let gamma = (1.0 + p * p).sqrt();
        let mut m = gamma * gamma * psi1(theta, p)? - theta * psi0(theta, p)?;
        m += (theta * gamma - 1.0) * p * (-(gamma - 1.0) / theta).exp();
        m /= exp_1_over_theta_k(theta, 2) * gamma * gamma;
        Ok(m)
    }

    fn ion_term(&self, _p: f64) -> f64 {
        0.0
    }

    /// Bound-electron stopping power relative to the free-electron
    /// ln Λ drag.
    fn screened_term(&self, z: usize, z0: usize, p: f64) -> f64 {
        let n_bound = (z - z0) as f64;
        let gamma = (1.0 + p * p).sqrt();
        let beta_sq = p * p / (gamma * gamma);
        let h = p * (gamma - 1.0).max(0.0).sqrt() / mean_excitation_energy(z, z0);
        n_bound * ((1.0 + h.powf(K_BOUND)).ln() / K_BOUND - beta_sq)
    }

    fn brems_term(&self, z: usize, p: f64) -> f64 {
        let gamma_sq = 1.0 + p * p;
        let gamma = gamma_sq.sqrt();
        ALPHA / PI * (z * z) as f64 * p * p / gamma_sq * ((2.0 * gamma).ln() - 1.0 / 3.0)
    }

    /// Drag-only Rosenbluth matrix: an isotropic distribution slows the
    /// test particle through the field particles below it in momentum,
    ///   ν_s^nl(p) ∝ (4π/p²)·∫₀^p p'² f(p') dp',
    /// discretised with trapezoidal weights and the same face-straddling
    /// boundary corrections as the deflection matrix.
    fn nonlinear_matrix(&self, p: &[f64], p_f: &[f64]) -> Array2<f64> {
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
            // First cell: wedge up from p' = 0.
            mat[[i, 0]] = 4.0 * PI * COLL_PREFACTOR / p2f
                * ((p[1] - p[0]) / 2.0 + p[0] / 3.0)
                * p[0]
                * p[0];
            for ip in 1..i.saturating_sub(1) {
                mat[[i, ip]] = 4.0 * PI * COLL_PREFACTOR / p2f * trapz[ip] * p[ip] * p[ip];
            }
            if i >= 2 {
                let ip = i - 1;
                // Last full cell below the face: weight up to p_f only.
                let w = (p[ip] - p[ip.saturating_sub(1)]) / 2.0
                    + (pf - p[ip]).max(0.0) / 2.0;
                mat[[i, ip]] = 4.0 * PI * COLL_PREFACTOR / p2f * w * p[ip] * p[ip];
            }
            if i < np1 {
                // Portion of the straddling cell below the face.
                let ip = i;
                let w = (pf - p[ip - 1]).max(0.0) / 2.0;
                let frac = ((pf - p[ip - 1]) / (p[ip] - p[ip - 1])).clamp(0.0, 1.0);
                mat[[i, ip]] =
                    4.0 * PI * COLL_PREFACTOR / p2f * w * frac * p[ip] * p[ip];
            }
        }
        mat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lnlambda::CoulombLogarithm;
    use runaway_geometry::momentum::PXiGrid;
    use runaway_types::ions::pure_hydrogen;
    use runaway_types::settings::{
        BremsstrahlungMode, CollisionFrequencyType, CollisionQuantitySettings, FluxGrid,
        LnLambdaType,
    };
    use runaway_types::unknowns::{names, UnknownQuantityHandler};

    fn plasma(nr: usize, n: f64, t: f64) -> (UnknownQuantityHandler, runaway_types::ions::IonHandler)
    {
        let mut u = UnknownQuantityHandler::new();
        let ions = pure_hydrogen(nr, n);
        let id_n = u.register(names::N_COLD, nr).unwrap();
        let id_t = u.register(names::T_COLD, nr).unwrap();
        let id_i = u
            .register(names::ION_SPECIES, 2 * nr)
            .unwrap();
        u.set_data(id_n, &vec![n; nr]).unwrap();
        u.set_data(id_t, &vec![t; nr]).unwrap();
        let mut ni = vec![0.0; 2 * nr];
        for ir in 0..nr {
            ni[nr + ir] = n;
        }
        u.set_data(id_i, &ni).unwrap();
        (u, ions)
    }

    fn rebuilt_frequency(
        settings: CollisionQuantitySettings,
        n: f64,
    ) -> (SlowingDownFrequency, CoulombLogarithm, PXiGrid) {
        let (u, ions) = plasma(2, n, 100.0);
        let mut lnl = CoulombLogarithm::new();
        lnl.rebuild(&u).unwrap();
        let pxi = PXiGrid::uniform(10, 3.0, 1).unwrap();
        let mut nu = SlowingDownFrequency::slowing_down(settings);
        nu.rebuild(&u, &ions, &lnl, 2, &pxi).unwrap();
        (nu, lnl, pxi)
    }

    #[test]
    fn test_superthermal_matches_textbook_form() {
        let (nu, lnl, _) = rebuilt_frequency(CollisionQuantitySettings::default(), 1e20);
        let p = 1.5;
        let gamma_sq = 1.0 + p * p;
        // Pure hydrogen: ν_s = 4πr₀²c·n·lnΛ_ee(p)·γ²/p³.
        let expect =
            COLL_PREFACTOR * 1e20 * lnl.ln_ee(0, p, LnLambdaType::EnergyDependent) * gamma_sq
                / (p * p * p);
        let got = nu.evaluate_at_p(0, p, &lnl).unwrap();
        assert!((got - expect).abs() / expect < 1e-12, "{got} vs {expect}");
    }

    #[test]
    fn test_linear_in_density() {
        let (nu1, lnl1, _) = rebuilt_frequency(CollisionQuantitySettings::default(), 1e20);
        let (nu2, lnl2, _) = rebuilt_frequency(CollisionQuantitySettings::default(), 2e20);
        let p = 0.8;
        let a = nu1.evaluate_at_p(0, p, &lnl1).unwrap();
        let b = nu2.evaluate_at_p(0, p, &lnl2).unwrap();
        // lnΛ shifts weakly with density; compare after dividing it out.
        let ra = a / lnl1.ln_ee(0, p, LnLambdaType::EnergyDependent);
        let rb = b / lnl2.ln_ee(0, p, LnLambdaType::EnergyDependent);
        assert!((rb / ra - 2.0).abs() < 1e-10, "ratio {}", rb / ra);
    }

    #[test]
    fn test_nonnegative_across_grid() {
        let (nu, _, pxi) = rebuilt_frequency(CollisionQuantitySettings::default(), 1e20);
        for fg in [FluxGrid::Distribution, FluxGrid::Radial, FluxGrid::P1, FluxGrid::P2] {
            let (n1, n2) = pxi.table_dims(fg);
            let rows = fg.n_radial(2);
            for ir in 0..rows {
                for j in 0..n2 {
                    for i in 0..n1 {
                        let v = nu.value(fg, &pxi, ir, i, j);
                        assert!(v >= 0.0, "nu_s < 0 at {fg:?} ({ir},{i},{j}): {v}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_full_mode_approaches_superthermal_at_high_p() {
        let mut full = CollisionQuantitySettings::default();
        full.collfreq_mode = CollisionFrequencyMode::Full;
        let (nu_f, lnl, _) = rebuilt_frequency(full, 1e20);
        let (nu_s, _, _) = rebuilt_frequency(CollisionQuantitySettings::default(), 1e20);
        let p = 2.0; // far superthermal at 100 eV
        let a = nu_f.evaluate_at_p(0, p, &lnl).unwrap();
        let b = nu_s.evaluate_at_p(0, p, &lnl).unwrap();
        assert!((a - b).abs() / b < 1e-2, "full {a} vs superthermal {b}");
    }

    #[test]
    fn test_full_mode_finite_at_small_p() {
        // The Maxwell–Jüttner electron term regularises the 1/p³
        // divergence of the superthermal form: ν_s plateaus below the
        // thermal momentum instead of blowing up.
        let mut full = CollisionQuantitySettings::default();
        full.collfreq_mode = CollisionFrequencyMode::Full;
        let (nu, lnl, _) = rebuilt_frequency(full, 1e20);
        let a = nu.evaluate_at_p(0, 1e-4, &lnl).unwrap();
        let b = nu.evaluate_at_p(0, 2e-4, &lnl).unwrap();
        assert!(a.is_finite() && b.is_finite());
        assert!(
            (a - b).abs() / b < 0.05,
            "no plateau below p_th: {a} vs {b}"
        );
    }

    #[test]
    fn test_bremsstrahlung_adds_drag() {
        let mut with = CollisionQuantitySettings::default();
        with.bremsstrahlung_mode = BremsstrahlungMode::StoppingPower;
        let (nu_b, lnl, _) = rebuilt_frequency(with, 1e20);
        let (nu_0, _, _) = rebuilt_frequency(CollisionQuantitySettings::default(), 1e20);
        let p = 10.0;
        assert!(
            nu_b.evaluate_at_p(0, p, &lnl).unwrap() > nu_0.evaluate_at_p(0, p, &lnl).unwrap()
        );
    }

    #[test]
    fn test_screening_types_ordered_in_hydrogen() {
        // Fully ionised hydrogen has no bound electrons: all screening
        // assumptions coincide.
        let mut ns = CollisionQuantitySettings::default();
        ns.collfreq_type = CollisionFrequencyType::NonScreened;
        let (nu_ns, lnl, _) = rebuilt_frequency(ns, 1e20);
        let (nu_ps, _, _) = rebuilt_frequency(CollisionQuantitySettings::default(), 1e20);
        let p = 1.0;
        let a = nu_ns.evaluate_at_p(0, p, &lnl).unwrap();
        let b = nu_ps.evaluate_at_p(0, p, &lnl).unwrap();
        assert!((a - b).abs() / b < 1e-12);
    }

    #[test]
    fn test_nonlinear_matrix_drag_only() {
        let m = SlowingDownModel;
        let pxi = PXiGrid::uniform(12, 2.0, 1).unwrap();
        let mat = m.nonlinear_matrix(pxi.p_cells(), pxi.p_faces());
        assert_eq!(mat.dim(), (13, 12));
        // No contribution from field particles above the face.
        for i in 1..13 {
            for ip in (i + 1)..12 {
                assert_eq!(mat[[i, ip]], 0.0, "upper-momentum leak at ({i},{ip})");
            }
        }
        // All drag weights non-negative.
        assert!(mat.iter().all(|&v| v >= 0.0));
    }
}
