// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Pitch-Scatter Frequency
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Pitch-angle scattering frequency ν_D, defined such that the
//! D^(ξ,ξ) component of the collision operator is (1−ξ²)ν_D/2.
//!
//! The electron-ion contribution follows Eq (2.22) of L Hesslow et al.,
//! J Plasma Phys 84 (2018): point-charge deflection Z₀² lnΛ_ei plus the
//! Kirillov-model Thomas–Fermi screened term with tabulated DFT size
//! parameters. The relativistic thermal ee contribution follows
//! Pike & Rose, Phys Rev E 89 (2014). The nonlinear contribution is the
//! isotropic component of the non-relativistic operator of Rosenbluth,
//! Macdonald & Judd, Phys Rev (1957).

use crate::atomics::ion_size_parameter;
use crate::frequency::{
    exp_1_over_theta_k, psi0, psi1, CollisionFrequency, FrequencyModel, PlasmaState,
};
use ndarray::Array2;
use runaway_types::constants::COLL_PREFACTOR;
use runaway_types::error::KineticResult;
use runaway_types::settings::CollisionFrequencyMode;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, Default)]
pub struct PitchScatterModel;

pub type PitchScatterFrequency = CollisionFrequency<PitchScatterModel>;

impl PitchScatterFrequency {
    pub fn pitch_scatter(settings: runaway_types::settings::CollisionQuantitySettings) -> Self {
        CollisionFrequency::new(PitchScatterModel, settings)
    }
}

impl FrequencyModel for PitchScatterModel {
    const HAS_ION_TERM: bool = true;

    fn prefactor(&self, p: f64, mode: CollisionFrequencyMode) -> f64 {
        if p == 0.0 {
            return 0.0;
        }
        match mode {
            CollisionFrequencyMode::UltraRelativistic => COLL_PREFACTOR / (p * p),
            _ => COLL_PREFACTOR * (1.0 + p * p).sqrt() / (p * p * p),
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
        let p2 = p * p;
        let gamma = (1.0 + p2).sqrt();
        let mut m = (p2 * gamma * gamma + theta * theta) * psi0(theta, p)?;
        m += theta * (2.0 * p2 * p2 - 1.0) * psi1(theta, p)?;
        m += gamma * theta * (1.0 + theta * (2.0 * p2 - 1.0) * p * (-(gamma - 1.0) / theta).exp());
        m /= gamma * gamma * p2 * exp_1_over_theta_k(theta, 2);
        Ok(m)
    }

    fn ion_term(&self, _p: f64) -> f64 {
        1.0
    }

    /// Kirillov-model Thomas–Fermi formula, Eq (2.25) of the Hesslow
    /// paper.
    fn screened_term(&self, z: usize, z0: usize, p: f64) -> f64 {
        let a = ion_size_parameter(z, z0);
        let x = p * a * (p * a).sqrt();
        let zf = (z * z - z0 * z0) as f64;
        let nb = (z - z0) as f64;
        2.0 / 3.0 * (zf * (1.0 + x).ln() - nb * nb * x / (1.0 + x))
    }

    fn brems_term(&self, _z: usize, _p: f64) -> f64 {
        // Radiation does not deflect.
        0.0
    }

    /// Rosenbluth-potential matrix: multiplied by f_hot it yields the
    /// pitch-angle scattering frequency. Trapezoidal rule with
    /// face-straddling boundary corrections.
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

            let mut p2 = p[0] * p[0];
            mat[[i, 0]] = (4.0 * PI / 3.0) * COLL_PREFACTOR / pf
                * ((p[1] - p[0]) / 2.0 * (3.0 - p2 / p2f) + p[0] * (1.0 - p2 / (5.0 * p2f)))
                * p2
                / p2f;
            for ip in 1..i.saturating_sub(1) {
                p2 = p[ip] * p[ip];
                mat[[i, ip]] =
                    (4.0 * PI / 3.0) * COLL_PREFACTOR / pf * trapz[ip] * p2 / p2f * (3.0 - p2 / p2f);
            }
            if i >= 2 {
                p2 = p[i - 1] * p[i - 1];
                // Above the last cell centre the spacing is continued
                // uniformly.
                let p_i = if i < np1 {
                    p[i]
                } else {
                    2.0 * p[np1 - 1] - p[np1 - 2]
                };
                let w = (p[i - 1] - p[i - 2]) / 2.0
                    + (pf - p[i - 1]) / (p_i - p[i - 1]) * ((2.0 * p_i - pf - p[i - 1]) / 2.0);
                mat[[i, i - 1]] =
                    (4.0 * PI / 3.0) * COLL_PREFACTOR / pf * w * p2 / p2f * (3.0 - p2 / p2f);
            }
            if i < np1 {
                p2 = p[i] * p[i];
                let w = (pf - p[i - 1]) * (pf - p[i - 1]) / (p[i] - p[i - 1]);
                mat[[i, i]] =
                    (4.0 * PI / 3.0) * COLL_PREFACTOR / pf * w * p2 / p2f * (3.0 - p2 / p2f);

                // Contributions from field particles above the face.
                let w_im1 = 0.5 * (p[i] - pf) * (p[i] - pf) / (p[i] - p[i - 1]);
                mat[[i, i - 1]] += (8.0 * PI / 3.0) * COLL_PREFACTOR / pf * w_im1 * p[i - 1] / p2f;
                let w_i = if i + 1 < np1 {
                    (p[i + 1] - p[i]) / 2.0
                        + 0.5 * (p[i] - pf) * (pf + p[i] - 2.0 * p[i - 1]) / (p[i] - p[i - 1])
                } else {
                    0.5 * (p[i] - pf) * (pf + p[i] - 2.0 * p[i - 1]) / (p[i] - p[i - 1])
                };
                mat[[i, i]] += (8.0 * PI / 3.0) * COLL_PREFACTOR * w_i * p[i] / p2f;

                for ip in (i + 1)..np1.saturating_sub(1) {
                    mat[[i, ip]] = (8.0 * PI / 3.0) * COLL_PREFACTOR * trapz[ip] * p[ip] / p2f;
                }
                let w_end = (p[np1 - 1] - p[np1 - 2]) / 2.0;
                if i != np1 - 1 {
                    mat[[i, np1 - 1]] =
                        (8.0 * PI / 3.0) * COLL_PREFACTOR * w_end * p[np1 - 1] / p2f;
                } else {
                    mat[[i, np1 - 1]] +=
                        (8.0 * PI / 3.0) * COLL_PREFACTOR * w_end * p[np1 - 1] / p2f;
                }
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
    use runaway_types::ions::{IonHandler, IonSpecies};
    use runaway_types::settings::{
        CollisionFrequencyType, CollisionQuantitySettings, LnLambdaType,
    };
    use runaway_types::unknowns::{names, UnknownQuantityHandler};

    fn neon_plasma(stripped: bool) -> (UnknownQuantityHandler, IonHandler) {
        let nr = 1;
        let mut u = UnknownQuantityHandler::new();
        let ions = IonHandler::new(
            vec![IonSpecies {
                name: "Ne".into(),
                z: 10,
            }],
            nr,
        );
        let id_n = u.register(names::N_COLD, nr).unwrap();
        let id_t = u.register(names::T_COLD, nr).unwrap();
        let id_i = u.register(names::ION_SPECIES, 11 * nr).unwrap();
        u.set_data(id_n, &[1e20]).unwrap();
        u.set_data(id_t, &[100.0]).unwrap();
        let mut ni = vec![0.0; 11];
        if stripped {
            ni[10] = 1e19; // Ne10+
        } else {
            ni[5] = 1e19; // Ne5+
        }
        u.set_data(id_i, &ni).unwrap();
        (u, ions)
    }

    fn rebuilt(
        settings: CollisionQuantitySettings,
        stripped: bool,
    ) -> (PitchScatterFrequency, CoulombLogarithm) {
        let (u, ions) = neon_plasma(stripped);
        let mut lnl = CoulombLogarithm::new();
        lnl.rebuild(&u).unwrap();
        let pxi = PXiGrid::uniform(8, 3.0, 1).unwrap();
        let mut nu = PitchScatterFrequency::pitch_scatter(settings);
        nu.rebuild(&u, &ions, &lnl, 1, &pxi).unwrap();
        (nu, lnl)
    }

    #[test]
    fn test_stripped_ion_matches_point_charge() {
        // Fully stripped neon: no bound electrons, so the partially
        // screened and completely screened evaluations coincide.
        let (nu_ps, lnl) = rebuilt(CollisionQuantitySettings::default(), true);
        let mut cs = CollisionQuantitySettings::default();
        cs.collfreq_type = CollisionFrequencyType::CompletelyScreened;
        let (nu_cs, _) = rebuilt(cs, true);
        let p = 1.0;
        let a = nu_ps.evaluate_at_p(0, p, &lnl).unwrap();
        let b = nu_cs.evaluate_at_p(0, p, &lnl).unwrap();
        assert!((a - b).abs() / b < 1e-12);
    }

    #[test]
    fn test_screening_ordering_with_bound_electrons() {
        // Ne5+: completely screened < partially screened < non-screened.
        let mut cs = CollisionQuantitySettings::default();
        cs.collfreq_type = CollisionFrequencyType::CompletelyScreened;
        let (nu_cs, lnl) = rebuilt(cs, false);
        let (nu_ps, _) = rebuilt(CollisionQuantitySettings::default(), false);
        let mut ns = CollisionQuantitySettings::default();
        ns.collfreq_type = CollisionFrequencyType::NonScreened;
        let (nu_ns, _) = rebuilt(ns, false);

        let p = 5.0;
        let a = nu_cs.evaluate_at_p(0, p, &lnl).unwrap();
        let b = nu_ps.evaluate_at_p(0, p, &lnl).unwrap();
        let c = nu_ns.evaluate_at_p(0, p, &lnl).unwrap();
        assert!(a < b && b < c, "screening ordering violated: {a}, {b}, {c}");
    }

    #[test]
    fn test_screened_term_increases_with_p() {
        // Faster electrons penetrate the bound cloud more deeply.
        let m = PitchScatterModel;
        let mut prev = 0.0;
        for k in 1..20 {
            let p = 0.2 * k as f64;
            let s = m.screened_term(10, 5, p);
            assert!(s >= prev, "screened term not monotone at p={p}");
            prev = s;
        }
    }

    #[test]
    fn test_superthermal_value_hydrogenic() {
        // Point-charge contribution dominates for stripped neon:
        // ν_D ≈ prefactor·(lnΛee·ncold + lnΛei·Z²·n_Ne).
        let (nu, lnl) = rebuilt(CollisionQuantitySettings::default(), true);
        let p = 2.0;
        let gamma = (1.0_f64 + p * p).sqrt();
        let expect = COLL_PREFACTOR * gamma / (p * p * p)
            * (lnl.ln_ee(0, p, LnLambdaType::EnergyDependent) * 1e20
                + lnl.ln_ei(0, p, LnLambdaType::EnergyDependent) * 100.0 * 1e19);
        let got = nu.evaluate_at_p(0, p, &lnl).unwrap();
        assert!((got - expect).abs() / expect < 1e-12, "{got} vs {expect}");
    }

    #[test]
    fn test_nonlinear_matrix_shape_and_sign() {
        let m = PitchScatterModel;
        let pxi = PXiGrid::uniform(10, 2.0, 1).unwrap();
        let mat = m.nonlinear_matrix(pxi.p_cells(), pxi.p_faces());
        assert_eq!(mat.dim(), (11, 10));
        // Deflection from an isotropic positive distribution is
        // positive at every face above the origin.
        for i in 1..11 {
            let row_sum: f64 = (0..10).map(|ip| mat[[i, ip]]).sum();
            assert!(row_sum > 0.0, "non-positive row {i}: {row_sum}");
        }
    }
}
