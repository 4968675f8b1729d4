// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Electric Conductivity
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Braams–Karney relativistic electric conductivity with the Sauter
//! neoclassical correction.
//!
//! σ̄(T/mc², 1/(1+Z)) is tabulated from Braams & Karney, Phys Fluids B
//! 1, 1355 (1989), and interpolated bilinearly; the collisionality
//! correction follows O Sauter, C Angioni and Y R Lin-Liu, Phys
//! Plasmas 6, 2834 (1999).

use runaway_collisions::lnlambda::CoulombLogarithm;
use runaway_geometry::radial_grid::RadialGrid;
use runaway_types::constants::{EC, EPS0, MC2_IN_EV, MU0, M_E};
use std::f64::consts::PI;

const LEN_T: usize = 14;
const LEN_Z: usize = 6;

/// T/mc² abscissae of the σ̄ table.
const COND_TMC2: [f64; LEN_T] = [
    0.0, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0,
];

/// 1/(1+Z) abscissae of the σ̄ table.
const COND_X: [f64; LEN_Z] = [
    0.0,
    0.090909090909091,
    0.166666666666667,
    0.333333333333333,
    0.5,
    1.0,
];

/// σ̄ values, row-major over (Z index, T index).
const COND_BRAAMS: [f64; LEN_Z * LEN_T] = [
    3.75994, 3.7549, 3.7492, 3.72852, 3.6842, 3.57129, 3.18206, 2.65006, 2.03127, 1.33009,
    0.94648, 0.67042, 0.42422, 0.29999, 7.42898, 7.27359, 7.12772, 6.73805, 6.20946, 5.43667,
    4.13733, 3.13472, 2.27862, 1.45375, 1.02875, 0.72743, 0.46003, 0.32528, 8.7546, 8.53281,
    8.32655, 7.78445, 7.06892, 6.06243, 4.47244, 3.32611, 2.39205, 1.51805, 1.07308, 0.75853,
    0.47965, 0.33915, 10.39122, 10.07781, 9.78962, 9.04621, 8.09361, 6.80431, 4.8805, 3.57303,
    2.54842, 1.61157, 1.13856, 0.80472, 0.50885, 0.35979, 11.33006, 10.95869, 10.61952, 9.75405,
    8.66306, 7.21564, 5.11377, 3.72206, 2.64827, 1.67382, 1.18263, 0.83593, 0.52861, 0.37377,
    12.76615, 12.29716, 11.87371, 10.81201, 9.50746, 7.82693, 5.47602, 3.96944, 2.82473, 1.7887,
    1.2649, 0.89443, 0.56569, 0.4,
];

fn bracket(table: &[f64], x: f64) -> (usize, f64) {
    let n = table.len();
    if x <= table[0] {
        return (0, 0.0);
    }
    if x >= table[n - 1] {
        return (n - 2, 1.0);
    }
    let k = table.partition_point(|&v| v <= x) - 1;
    let k = k.min(n - 2);
    (k, (x - table[k]) / (table[k + 1] - table[k]))
}

/// Normalised Braams–Karney conductivity σ̄ at (T/mc², 1/(1+Z)),
/// bilinear on the table, clamped at its edges.
pub fn braams_sigma_bar(t_over_mc2: f64, inv_one_plus_z: f64) -> f64 {
    let (it, ft) = bracket(&COND_TMC2, t_over_mc2);
    let (iz, fz) = bracket(&COND_X, inv_one_plus_z);
    let v = |zi: usize, ti: usize| COND_BRAAMS[zi * LEN_T + ti];
    (1.0 - fz) * ((1.0 - ft) * v(iz, it) + ft * v(iz, it + 1))
        + fz * ((1.0 - ft) * v(iz + 1, it) + ft * v(iz + 1, it + 1))
}

/// Braams–Karney conductivity (S/m) of a relativistic plasma.
pub fn braams_conductivity(t_cold_ev: f64, zeff: f64, lnl: &CoulombLogarithm, ir: usize) -> f64 {
    let t_si = t_cold_ev * EC;
    let sigma_bar = braams_sigma_bar(t_cold_ev / MC2_IN_EV, 1.0 / (1.0 + zeff));
    4.0 * PI * EPS0 * EPS0 * t_si * t_si.sqrt()
        / (M_E.sqrt() * EC * EC * lnl.ln_lambda_t(ir))
        * sigma_bar
}

/// Sauter neoclassical correction factor, valid in all collisionality
/// regimes; multiplies the Braams conductivity.
pub fn neoclassical_conductivity_correction(
    grid: &RadialGrid,
    ir: usize,
    zeff: f64,
    n_cold: f64,
    t_cold_ev: f64,
    plasma_current: f64,
    collisionless: bool,
) -> f64 {
    let ft = 1.0 - grid.eff_pass_frac(ir);
    let r0 = grid.r0();

    let mut x = ft;
    if r0.is_infinite() {
        x = 0.0;
    } else if !collisionless && plasma_current != 0.0 {
        // qR₀ from the flux-surface-averaged field and current.
        let q_r0 = (grid.vp_vol(ir) * grid.vp_vol(ir) * grid.btor_g(ir) * grid.fsa_inv_r2(ir)
            * grid.fsa_nabla_r2_over_r2(ir))
            / (4.0 * PI * PI * MU0 * plasma_current);
        let t_kev = t_cold_ev / 1000.0;
        let eps = grid.r(ir) / r0;
        let nu_e_star =
            0.012 * n_cold * zeff * q_r0.abs() / (eps * eps.sqrt() * t_kev * t_kev * 1e20);
        x /= 1.0 + (0.55 - 0.1 * ft) * nu_e_star.sqrt()
            + 0.45 * (1.0 - ft) * nu_e_star / (zeff * zeff.sqrt());
    }
    1.0 - (1.0 + 0.36 / zeff) * x + x * x / zeff * (0.59 - 0.23 * x)
}

/// Sauter-corrected conductivity.
#[allow(clippy::too_many_arguments)]
pub fn sauter_conductivity(
    grid: &RadialGrid,
    lnl: &CoulombLogarithm,
    ir: usize,
    zeff: f64,
    n_cold: f64,
    t_cold_ev: f64,
    plasma_current: f64,
    collisionless: bool,
) -> f64 {
    braams_conductivity(t_cold_ev, zeff, lnl, ir)
        * neoclassical_conductivity_correction(
            grid,
            ir,
            zeff,
            n_cold,
            t_cold_ev,
            plasma_current,
            collisionless,
        )
}
