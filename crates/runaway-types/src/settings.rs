// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Settings
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Closed option sets for the collision and runaway-rate models.
//!
//! Every knob is a field-less enum recognised by name in JSON; integer
//! values are an implementation detail and never serialised.

use serde::{Deserialize, Serialize};

/// Which of the four grid variants a table is evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluxGrid {
    /// Cell-centred distribution grid (nr rows).
    Distribution,
    /// Radial flux grid (nr+1 rows).
    Radial,
    /// p1 flux grid (np1+1 columns).
    P1,
    /// p2 flux grid (np2+1 rows of cells).
    P2,
}

impl FluxGrid {
    /// Number of radial rows addressed by this variant.
    pub fn n_radial(self, nr: usize) -> usize {
        match self {
            FluxGrid::Radial => nr + 1,
            _ => nr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    Linear,
    Steffen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadratureMethod {
    FixedLegendre,
    FixedChebyshev,
    Adaptive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionFrequencyType {
    CompletelyScreened,
    NonScreened,
    PartiallyScreened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionFrequencyMode {
    Superthermal,
    Full,
    UltraRelativistic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LnLambdaType {
    /// Relativistic ln Λ_c, independent of momentum.
    Constant,
    /// Hesslow energy-dependent interpolation between thermal and
    /// relativistic asymptotes.
    EnergyDependent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BremsstrahlungMode {
    Neglect,
    StoppingPower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonlinearMode {
    Neglect,
    Isotropic,
}

/// Whether trapping corrections enter the critical-momentum estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PstarMode {
    Collisional,
    Collisionless,
}

/// Settings shared by all collision quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionQuantitySettings {
    pub collfreq_type: CollisionFrequencyType,
    pub collfreq_mode: CollisionFrequencyMode,
    pub lnlambda_type: LnLambdaType,
    pub bremsstrahlung_mode: BremsstrahlungMode,
    pub nonlinear_mode: NonlinearMode,
    pub pstar_mode: PstarMode,
}

impl Default for CollisionQuantitySettings {
    fn default() -> Self {
        CollisionQuantitySettings {
            collfreq_type: CollisionFrequencyType::PartiallyScreened,
            collfreq_mode: CollisionFrequencyMode::Superthermal,
            lnlambda_type: LnLambdaType::EnergyDependent,
            bremsstrahlung_mode: BremsstrahlungMode::Neglect,
            nonlinear_mode: NonlinearMode::Neglect,
            pstar_mode: PstarMode::Collisionless,
        }
    }
}

/// Settings of the flux-surface averager.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AveragerSettings {
    /// Number of poloidal quadrature nodes in fixed mode, and of bounce
    /// nodes per trapped cell.
    pub ntheta_interp: usize,
    pub interpolation: InterpolationMethod,
    pub quadrature: QuadratureMethod,
}

impl Default for AveragerSettings {
    fn default() -> Self {
        AveragerSettings {
            ntheta_interp: 20,
            interpolation: InterpolationMethod::Steffen,
            quadrature: QuadratureMethod::FixedLegendre,
        }
    }
}

/// Settings of the runaway-rate derivations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunawayFluidSettings {
    /// Photon spectral flux density scale for the Compton source (1/m²s).
    pub compton_photon_flux: f64,
}

impl Default for RunawayFluidSettings {
    fn default() -> Self {
        RunawayFluidSettings {
            compton_photon_flux: 1e18,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_model() {
        let s = CollisionQuantitySettings::default();
        assert_eq!(s.collfreq_type, CollisionFrequencyType::PartiallyScreened);
        assert_eq!(s.collfreq_mode, CollisionFrequencyMode::Superthermal);
        assert_eq!(s.lnlambda_type, LnLambdaType::EnergyDependent);
        assert_eq!(s.bremsstrahlung_mode, BremsstrahlungMode::Neglect);
        assert_eq!(s.nonlinear_mode, NonlinearMode::Neglect);
        assert_eq!(s.pstar_mode, PstarMode::Collisionless);
    }

    #[test]
    fn test_roundtrip_serialization() {
        let s = CollisionQuantitySettings::default();
        let json = serde_json::to_string(&s).unwrap();
        let s2: CollisionQuantitySettings = serde_json::from_str(&json).unwrap();
        assert_eq!(s, s2);
    }

    #[test]
    fn test_enum_names_are_snake_case() {
        let json = serde_json::to_string(&CollisionFrequencyType::PartiallyScreened).unwrap();
        assert_eq!(json, "\"partially_screened\"");
        let json = serde_json::to_string(&QuadratureMethod::FixedLegendre).unwrap();
        assert_eq!(json, "\"fixed_legendre\"");
    }

    #[test]
    fn test_flux_grid_row_counts() {
        assert_eq!(FluxGrid::Distribution.n_radial(10), 10);
        assert_eq!(FluxGrid::Radial.n_radial(10), 11);
        assert_eq!(FluxGrid::P1.n_radial(10), 10);
        assert_eq!(FluxGrid::P2.n_radial(10), 10);
    }

    #[test]
    fn test_compton_flux_default() {
        let s = RunawayFluidSettings::default();
        assert_eq!(s.compton_photon_flux, 1e18);
    }
}
