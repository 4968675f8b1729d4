// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Runaway Collisions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ionised-plasma collision frequencies with partial screening and the
//! nonlinear electron–electron contribution.

pub mod atomics;
pub mod frequency;
pub mod lnlambda;
pub mod parallel_diffusion;
pub mod pitch_scatter;
pub mod quantity;
pub mod slowing_down;

pub use frequency::CollisionFrequency;
pub use parallel_diffusion::ParallelDiffusionFrequency;
pub use pitch_scatter::{PitchScatterFrequency, PitchScatterModel};
pub use slowing_down::{SlowingDownFrequency, SlowingDownModel};
