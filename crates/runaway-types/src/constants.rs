// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Constants
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use std::f64::consts::PI;

/// Electron mass (kg)
pub const M_E: f64 = 9.1093837015e-31;

/// Speed of light (m/s)
pub const C: f64 = 2.99792458e8;

/// Elementary charge (C)
pub const EC: f64 = 1.602176634e-19;

/// Vacuum permittivity (F/m)
pub const EPS0: f64 = 8.8541878128e-12;

/// Vacuum permeability (H/m)
pub const MU0: f64 = 1.25663706212e-6;

/// Fine-structure constant
pub const ALPHA: f64 = 7.2973525693e-3;

/// Classical electron radius (m)
pub const R0_CLASSICAL: f64 = 2.8179403262e-15;

/// Electron rest energy in eV
pub const MC2_IN_EV: f64 = 510998.95;

/// Relativistic collision prefactor 4π r₀² c (m³/s).
///
/// Multiplied by density and ln Λ this is the relativistic electron
/// collision frequency scale; every collision quantity and the avalanche
/// growth rate are normalised with it.
pub const COLL_PREFACTOR: f64 = 4.0 * PI * R0_CLASSICAL * R0_CLASSICAL * C;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefactor_magnitude() {
        // 4*pi*r0^2*c ~ 2.99e-20 m^3/s
        assert!((COLL_PREFACTOR - 2.9911e-20).abs() / COLL_PREFACTOR < 1e-3);
    }

    #[test]
    fn test_rest_energy_consistent() {
        let mc2 = M_E * C * C / EC;
        assert!((mc2 - MC2_IN_EV).abs() / MC2_IN_EV < 1e-6);
    }
}
