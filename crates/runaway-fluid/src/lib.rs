// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Runaway Fluid
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Runaway thresholds and growth rates derived from the collision
//! frequencies and the magnetic geometry.

pub mod conductivity;
pub mod diagonal_term;
pub mod dreicer;
pub mod fluid;
pub mod rates;
pub mod ufunc;

pub use fluid::RunawayFluid;
