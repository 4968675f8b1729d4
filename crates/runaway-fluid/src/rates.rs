// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Tritium and Compton Sources
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Runaway production from tritium β-decay and Compton scattering of
//! γ photons; both vanish identically when p_c = ∞ (E ≤ E_ceff).
//!
//! Cross sections follow Martin-Solis et al., NF 57 (2017).

use runaway_math::adaptive::integrate_to_infinity;
use runaway_types::constants::{MC2_IN_EV, R0_CLASSICAL};
use runaway_types::error::KineticResult;
use std::f64::consts::PI;

/// Tritium half-life, 12.32 years in seconds.
const TRITIUM_HALF_LIFE: f64 = 3.888e8;
/// Maximum β-electron kinetic energy (eV).
const TRITIUM_DECAY_ENERGY_EV: f64 = 18.6e3;
/// Relative tolerance of the Compton production integral.
const EPSREL_COMPTON: f64 = 1e-4;

/// Runaway rate from tritium β decay; multiply by n_tritium for
/// dn_RE/dt.
///
/// The fraction of the β spectrum above p_c is the cubic polynomial fit
/// in w = (γ_c − 1)mc²/E_max; it is floored at zero (no production once
/// p_c exceeds the decay endpoint).
pub fn tritium_rate(pc: f64) -> f64 {
    if pc.is_infinite() {
        return 0.0;
    }
    let gamma_c = (1.0 + pc * pc).sqrt();
    let gamma_minus_one = pc * pc / (gamma_c + 1.0);
    let w = MC2_IN_EV * gamma_minus_one / TRITIUM_DECAY_ENERGY_EV;
    let frac_above_pc =
        1.0 + w.sqrt() * (-(35.0 / 8.0) * w + (21.0 / 4.0) * w * w - (15.0 / 8.0) * w * w * w);
    if frac_above_pc < 0.0 {
        return 0.0;
    }
    2.0_f64.ln() / TRITIUM_HALF_LIFE * frac_above_pc
}

/// Total Compton cross section for scattering into p > p_c by photons
/// of energy E_γ (units of mc²); Eq (29) of Martin-Solis NF 2017,
/// built on the Klein–Nishina formula.
pub fn compton_cross_section(eg: f64, pc: f64) -> f64 {
    let gamma_c = (1.0 + pc * pc).sqrt();
    let x = eg;
    let wc = pc * pc / (gamma_c + 1.0); // = γ_c − 1
    let cc = 1.0 - 1.0 / eg * wc / (eg - wc);
    PI * R0_CLASSICAL
        * R0_CLASSICAL
        * ((x * x - 2.0 * x - 2.0) / (x * x * x)
            * ((1.0 + 2.0 * x) / (1.0 + x * (1.0 - cc))).ln()
            + 1.0 / (2.0 * x)
                * (1.0 / ((1.0 + x * (1.0 - cc)) * (1.0 + x * (1.0 - cc)))
                    - 1.0 / ((1.0 + 2.0 * x) * (1.0 + 2.0 * x)))
            - 1.0 / (x * x * x)
                * (1.0 - x - (1.0 + 2.0 * x) / (1.0 + x * (1.0 - cc)) - x * cc))
}

/// Photon spectral flux density expected for a fusion environment,
/// Eq (24) of Martin-Solis NF 2017, scaled by the configurable total
/// flux density.
pub fn compton_photon_flux_spectrum(eg: f64, photon_flux: f64) -> f64 {
    let z = (1.2 + (eg * MC2_IN_EV / 1e6).ln()) / 0.8;
    photon_flux * (-z.exp() - z + 1.0).exp()
}

/// Runaway rate from Compton scattering; multiply by n_tot for
/// dn_RE/dt.
///
/// Improper integral of (photon spectrum) × (cross section above p_c)
/// from the minimum photon energy that can kick an electron past p_c.
pub fn compton_rate(pc: f64, photon_flux: f64) -> KineticResult<f64> {
    if pc.is_infinite() {
        return Ok(0.0);
    }
    let gamma_c = (1.0 + pc * pc).sqrt();
    let gamma_c_minus_one = pc * pc / (gamma_c + 1.0);
    let eg_min = (pc + gamma_c_minus_one) / 2.0;
    integrate_to_infinity(
        |eg| compton_photon_flux_spectrum(eg, photon_flux) * compton_cross_section(eg, pc),
        eg_min,
        EPSREL_COMPTON,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tritium_rate_zero_at_infinite_pc() {
        assert_eq!(tritium_rate(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_tritium_rate_full_spectrum_at_zero_pc() {
        // p_c → 0 captures the whole β spectrum: rate = ln2/T_half.
        let r = tritium_rate(1e-8);
        let expect = 2.0_f64.ln() / TRITIUM_HALF_LIFE;
        assert!((r - expect).abs() / expect < 1e-6, "rate {r}");
    }

    #[test]
    fn test_tritium_rate_floors_at_endpoint() {
        // p_c far above the 18.6 keV endpoint: no production.
        assert_eq!(tritium_rate(1.0), 0.0);
    }

    #[test]
    fn test_tritium_rate_monotone_decreasing() {
        let mut prev = f64::INFINITY;
        for k in 1..40 {
            let pc = 0.01 * k as f64;
            let r = tritium_rate(pc);
            assert!(r <= prev + 1e-30, "tritium rate rising at pc={pc}");
            assert!(r >= 0.0);
            prev = r;
        }
    }

    #[test]
    fn test_compton_rate_zero_at_infinite_pc() {
        assert_eq!(compton_rate(f64::INFINITY, 1e18).unwrap(), 0.0);
    }

    #[test]
    fn test_compton_rate_positive_and_linear_in_flux() {
        let a = compton_rate(0.5, 1e18).unwrap();
        let b = compton_rate(0.5, 2e18).unwrap();
        assert!(a > 0.0);
        assert!((b / a - 2.0).abs() < 1e-10, "flux scaling {}", b / a);
    }

    #[test]
    fn test_compton_rate_decreasing_in_pc() {
        let lo = compton_rate(0.3, 1e18).unwrap();
        let hi = compton_rate(1.5, 1e18).unwrap();
        assert!(lo > hi && hi > 0.0, "lo {lo}, hi {hi}");
    }

    #[test]
    fn test_cross_section_positive_above_threshold() {
        for &pc in &[0.2, 0.5, 1.0] {
            let gamma_c = (1.0_f64 + pc * pc).sqrt();
            let eg_min = (pc + gamma_c - 1.0) / 2.0;
            for k in 1..10 {
                let eg = eg_min * (1.0 + 0.5 * k as f64);
                let s = compton_cross_section(eg, pc);
                assert!(s > 0.0, "sigma({eg}, {pc}) = {s}");
            }
        }
    }

    #[test]
    fn test_photon_spectrum_decays_at_high_energy() {
        let f1 = compton_photon_flux_spectrum(1.0, 1e18);
        let f2 = compton_photon_flux_spectrum(10.0, 1e18);
        assert!(f1 > f2 && f2 > 0.0);
    }
}
