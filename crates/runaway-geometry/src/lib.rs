// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Runaway Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Magnetic-geometry averaging: flux-surface averages and bounce
//! averages over a reference representation of an axisymmetric field.

pub mod analytic_field;
pub mod averager;
pub mod bounce;
pub mod flux_quantity;
pub mod momentum;
pub mod radial_grid;
