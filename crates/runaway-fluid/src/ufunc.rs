// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Pitch-Averaged Friction Function
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! The net momentum-advection function U(p; E) whose maximum over p
//! defines the effective critical field.
//!
//! U is the pitch-average of electric acceleration minus collisional
//! and synchrotron drag over the analytic runaway pitch distribution
//! f(ξ₀) ∝ exp(−A(1−ξ₀)), A = 2Ē/(p ν_D), restricted to the passing
//! region ξ₀ ∈ [ξ_T, 1] (Hesslow et al., PPCF 60, 074010 (2018),
//! generalised to inhomogeneous fields through ⟨B²⟩ and ξ_T). The
//! context struct bundles everything the root and minimum searches
//! evaluate repeatedly, so both see one consistent snapshot.

use runaway_collisions::lnlambda::CoulombLogarithm;
use runaway_collisions::{PitchScatterFrequency, SlowingDownFrequency};
use runaway_types::constants::{C, EC, EPS0, M_E};
use runaway_types::settings::CollisionQuantitySettings;
use std::f64::consts::PI;

/// Everything U(p; E) needs at one radius: geometry factors, the
/// collision-settings override and the frequencies.
pub struct UFuncContext<'a> {
    pub ir: usize,
    /// Trapped-pitch boundary ξ_T of the surface.
    pub xi_trapped: f64,
    /// ⟨B²⟩ of the surface (T²).
    pub fsa_b2: f64,
    pub settings: &'a CollisionQuantitySettings,
    pub nu_s: &'a SlowingDownFrequency,
    pub nu_d: &'a PitchScatterFrequency,
    pub lnl: &'a CoulombLogarithm,
}

impl UFuncContext<'_> {
    /// Inverse synchrotron timescale 1/τ_rad = e⁴⟨B²⟩/(6πε₀ mₑ³c³).
    fn synchrotron_rate(&self) -> f64 {
        EC.powi(4) * self.fsa_b2 / (6.0 * PI * EPS0 * M_E.powi(3) * C.powi(3))
    }

    /// U(p; E) in units of normalised momentum per second. `e_term` is
    /// the electric field in V/m. Returns NaN when an inner evaluation
    /// fails; the outer searches surface that as a numeric error.
    pub fn u_at_p(&self, p: f64, e_term: f64) -> f64 {
        let e_norm = EC * e_term / (M_E * C);
        let nu_d = match self
            .nu_d
            .evaluate_at_p_with_settings(self.ir, p, self.settings, self.lnl)
        {
            Ok(v) => v,
            Err(_) => return f64::NAN,
        };
        let nu_s = match self
            .nu_s
            .evaluate_at_p_with_settings(self.ir, p, self.settings, self.lnl)
        {
            Ok(v) => v,
            Err(_) => return f64::NAN,
        };

        // Pitch-distribution width; wide distribution (small A) at weak
        // field or strong scattering.
        let a = 2.0 * e_norm / (p * nu_d).max(f64::MIN_POSITIVE);
        let (xi_avg, xi_sq_avg) = pitch_moments(a, self.xi_trapped);

        let gamma = (1.0 + p * p).sqrt();
        let acceleration = e_norm * xi_avg;
        let drag = nu_s * p * gamma;
        let synchrotron = self.synchrotron_rate() * p * gamma * (1.0 - xi_sq_avg);

        acceleration - drag - synchrotron
    }
}

/// ⟨ξ₀⟩ and ⟨ξ₀²⟩ over f(ξ₀) ∝ e^{−A(1−ξ₀)} on [ξ_T, 1].
///
/// With u = 1−ξ₀ ∈ [0, u_max] the moments are elementary; the A → 0
/// limit (uniform distribution) is taken in series to avoid
/// cancellation.
pub fn pitch_moments(a: f64, xi_trapped: f64) -> (f64, f64) {
    let u_max = (1.0 - xi_trapped).clamp(0.0, 1.0);
    if u_max == 0.0 {
        return (1.0, 1.0);
    }
    let au = a * u_max;
    let (u_mean, u_sq_mean) = if au < 1e-4 {
        // Uniform limit with the first-order tilt.
        (
            u_max / 2.0 * (1.0 - au / 6.0),
            u_max * u_max / 3.0 * (1.0 - au / 4.0),
        )
    } else {
        let em = (-au).exp();
        let norm = 1.0 - em;
        let u_mean = 1.0 / a - u_max * em / norm;
        let u_sq_mean = 2.0 / (a * a) - (u_max * u_max + 2.0 * u_max / a) * em / norm;
        (u_mean, u_sq_mean)
    };
    let xi_avg = 1.0 - u_mean;
    let xi_sq_avg = 1.0 - 2.0 * u_mean + u_sq_mean;
    (xi_avg, xi_sq_avg.clamp(0.0, 1.0))
}
