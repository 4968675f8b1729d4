// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Runaway Math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Numerical primitives for SCPN Runaway Kinetics.

pub mod adaptive;
pub mod interp;
pub mod minimize;
pub mod quadrature;
pub mod roots;
pub mod special;
