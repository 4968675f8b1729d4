// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Atomic Data
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Immutable atomic data for the partial-screening models.
//!
//! Effective ion-size parameters ā_j from DFT calculations, Table 1 of
//! L Hesslow et al., J Plasma Phys 84, 905840605 (2018), with the
//! Kirillov Thomas–Fermi model as the fallback for charge states
//! without tabulated data. Mean excitation energies anchor on the
//! ICRU-37 neutral-atom values with a bound-charge scaling for ionised
//! states.
//!
//! The tables are compile-time constants behind read-only lookups;
//! nothing here can be mutated at run time.

use runaway_types::constants::{ALPHA, MC2_IN_EV};
use std::f64::consts::PI;

/// DFT effective size parameters ā_j (normalised units of the Hesslow
/// table).
const ION_SIZE_AJ: [f64; 55] = [
    0.631757734322417,
    0.449864664424796,
    0.580073385681175,
    0.417413282378673,
    0.244965367639212,
    0.213757911761448,
    0.523908484242040,
    0.432318176055981,
    0.347483799585738,
    0.256926098516580,
    0.153148466772533,
    0.140508604177553,
    0.492749302776189,
    0.419791849305259,
    0.353418389488286,
    0.288707775999513,
    0.215438905215275,
    0.129010899184783,
    0.119987816515379,
    0.403855887938967,
    0.366602498048607,
    0.329462647492495,
    0.293062618368335,
    0.259424839110224,
    0.226161504309134,
    0.190841656429844,
    0.144834685411878,
    0.087561370494245,
    0.083302176729104,
    0.351554934261205,
    0.328774241757188,
    0.305994557639981,
    0.283122417984972,
    0.260975850956140,
    0.238925715853581,
    0.216494264086975,
    0.194295316086760,
    0.171699132959493,
    0.161221485564969,
    0.150642403738712,
    0.139526182041846,
    0.128059339783537,
    0.115255069413773,
    0.099875435538094,
    0.077085983503479,
    0.047108093547224,
    0.045962185039177,
    0.235824746357894,
    0.230045911002090,
    0.224217341261303,
    0.215062179624586,
    0.118920957451653,
    0.091511805821898,
    0.067255603181663,
    0.045824624741631,
];

const ION_SIZE_ZS: [usize; 55] = [
    2, 2, 4, 4, 4, 4, 6, 6, 6, 6, 6, 6, 7, 7, 7, 7, 7, 7, 7, 10, 10, 10, 10, 10, 10, 10, 10, 10,
    10, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 18, 54, 54, 54, 74,
    74, 74, 74, 74,
];

const ION_SIZE_Z0S: [usize; 55] = [
    0, 1, 0, 1, 2, 3, 0, 1, 2, 3, 4, 5, 0, 1, 2, 3, 4, 5, 6, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 0, 1,
    2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 1, 2, 3, 0, 30, 40, 50, 60,
];

/// Effective ion-size parameter 2ā_j/α for the Thomas–Fermi screened
/// deflection term.
///
/// Tabulated DFT values where available; otherwise the Kirillov model
/// (2/α)·(9π)^{1/3}/4·(Z−Z₀)^{2/3}/Z.
pub fn ion_size_parameter(z: usize, z0: usize) -> f64 {
    for n in 0..ION_SIZE_AJ.len() {
        if ION_SIZE_ZS[n] == z && ION_SIZE_Z0S[n] == z0 {
            return 2.0 / ALPHA * ION_SIZE_AJ[n];
        }
    }
    2.0 / ALPHA * (9.0 * PI).powf(1.0 / 3.0) / 4.0 * ((z - z0) as f64).powf(2.0 / 3.0) / z as f64
}

/// ICRU-37 mean excitation energies of neutral atoms (eV), for the
/// species the runaway models encounter.
const MEAN_EXCITATION_NEUTRAL_EV: [(usize, f64); 10] = [
    (1, 14.99),
    (2, 41.8),
    (4, 63.7),
    (6, 78.0),
    (7, 82.0),
    (10, 137.0),
    (18, 188.0),
    (36, 352.0),
    (54, 482.0),
    (74, 727.0),
];

/// Mean excitation energy Î(Z, Z₀) normalised to mₑc².
///
/// Ionisation strips the loosely bound outer electrons first, raising
/// the mean excitation energy of the remainder; the anchor value is
/// scaled by Z/(Z−Z₀). Fully ionised states carry no bound electrons
/// and never reach this lookup.
pub fn mean_excitation_energy(z: usize, z0: usize) -> f64 {
    debug_assert!(z0 < z, "no bound electrons for Z0 = Z = {z}");
    let neutral = MEAN_EXCITATION_NEUTRAL_EV
        .iter()
        .find(|(zz, _)| *zz == z)
        .map(|(_, i)| *i)
        // Bloch scaling for species outside the table.
        .unwrap_or(10.0 * z as f64);
    neutral * z as f64 / (z - z0) as f64 / MC2_IN_EV
}
