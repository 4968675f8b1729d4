// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Special Functions
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Exponentially scaled modified Bessel functions of the second kind.
//!
//! The Maxwell–Jüttner normalisation of the full collision-frequency
//! mode needs e^{1/Θ} K₂(1/Θ), which underflows catastrophically if the
//! factors are computed separately (1/Θ ~ 5000 at 100 eV). The scaled
//! forms stay O(1).
//!
//! Polynomial fits from Abramowitz & Stegun 9.8.1–9.8.8; absolute error
//! below 2e-7 over the fitted ranges.

/// e^x K₀(x) for x > 0.
pub fn besselk0_scaled(x: f64) -> f64 {
    debug_assert!(x > 0.0, "besselk0_scaled requires x > 0, got {x}");
    if x <= 2.0 {
        let t = x * x / 4.0;
        let k0 = -(x / 2.0).ln() * bessel_i0(x) - 0.577_215_66
            + t * (0.422_784_20
                + t * (0.230_697_56
                    + t * (0.034_885_90
                        + t * (0.002_626_98 + t * (0.000_107_50 + t * 0.000_007_40)))));
        k0 * x.exp()
    } else {
        let t = 2.0 / x;
        (1.253_314_14
            + t * (-0.078_323_58
                + t * (0.021_895_68
                    + t * (-0.010_624_46
                        + t * (0.005_878_72 + t * (-0.002_515_40 + t * 0.000_532_08))))))
            / x.sqrt()
    }
}

/// e^x K₁(x) for x > 0.
pub fn besselk1_scaled(x: f64) -> f64 {
    debug_assert!(x > 0.0, "besselk1_scaled requires x > 0, got {x}");
    if x <= 2.0 {
        let t = x * x / 4.0;
        let k1 = (x / 2.0).ln() * bessel_i1(x)
            + (1.0
                + t * (0.154_431_44
                    + t * (-0.672_785_79
                        + t * (-0.181_568_97
                            + t * (-0.019_194_02 + t * (-0.001_104_04 + t * -0.000_046_86))))))
                / x;
        k1 * x.exp()
    } else {
        let t = 2.0 / x;
        (1.253_314_14
            + t * (0.234_986_19
                + t * (-0.036_556_20
                    + t * (0.015_042_68
                        + t * (-0.007_803_53 + t * (0.003_256_14 + t * -0.000_682_45))))))
            / x.sqrt()
    }
}

/// e^x Kₙ(x) by upward recurrence K_{n+1} = K_{n−1} + (2n/x) Kₙ.
///
/// The recurrence is identical for the scaled functions and is stable
/// in the upward direction for K.
pub fn besselkn_scaled(n: usize, x: f64) -> f64 {
    match n {
        0 => besselk0_scaled(x),
        1 => besselk1_scaled(x),
        _ => {
            let mut km = besselk0_scaled(x);
            let mut k = besselk1_scaled(x);
            for j in 1..n {
                let next = km + (2.0 * j as f64 / x) * k;
                km = k;
                k = next;
            }
            k
        }
    }
}

/// I₀(x), A&S 9.8.1 (|x| < 3.75 branch is all we need: the scaled K
/// small-x branch only calls it for x ≤ 2).
fn bessel_i0(x: f64) -> f64 {
    let t = x / 3.75;
    let t2 = t * t;
    1.0 + t2
        * (3.515_622_9
            + t2 * (3.089_942_4
                + t2 * (1.206_749_2 + t2 * (0.265_973_2 + t2 * (0.036_076_8 + t2 * 0.004_581_3)))))
}

/// I₁(x), A&S 9.8.3.
fn bessel_i1(x: f64) -> f64 {
    let t = x / 3.75;
    let t2 = t * t;
    x * (0.5
        + t2 * (0.878_905_94
            + t2 * (0.514_988_69
                + t2 * (0.150_849_34
                    + t2 * (0.026_587_33 + t2 * (0.003_015_32 + t2 * 0.000_324_11))))))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference values from scipy.special.kn / k0e / k1e.
    #[test]
    fn test_k0_scaled_reference() {
        let cases: &[(f64, f64)] = &[
            (0.1, 2.6823261022628943),
            (0.5, 1.5241093857739092),
            (1.0, 1.1444630296130324),
            (2.0, 0.8415682150720913),
            (5.0, 0.547809592353635),
            (10.0, 0.39163193443659866),
            (100.0, 0.1251756216591266),
        ];
        for &(x, expected) in cases {
            let got = besselk0_scaled(x);
            assert!(
                (got - expected).abs() < 3e-7,
                "e^x K0({x}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_k1_scaled_reference() {
        let cases: &[(f64, f64)] = &[
            (0.1, 10.890182683049697),
            (0.5, 2.7310097082117855),
            (1.0, 1.636153486263258),
            (2.0, 1.0334768470686885),
            (5.0, 0.6002738587883125),
            (10.0, 0.4107665704564329),
            (100.0, 0.1257999504903785),
        ];
        for &(x, expected) in cases {
            let got = besselk1_scaled(x);
            assert!(
                (got - expected).abs() < 3e-6,
                "e^x K1({x}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_k2_from_recurrence() {
        // K2(1) = K0(1) + 2*K1(1) = 1.6248388986...
        let got = besselkn_scaled(2, 1.0) * (-1.0_f64).exp();
        assert!((got - 1.6248388986351774).abs() < 1e-6, "K2(1) = {got}");
    }

    #[test]
    fn test_kn_positive_and_decreasing_in_x() {
        for n in 0..4 {
            let mut prev = f64::INFINITY;
            for i in 1..50 {
                let x = 0.2 * i as f64;
                // Unscaled K is decreasing; the scaled form times e^-x is.
                let v = besselkn_scaled(n, x) * (-x).exp();
                assert!(v > 0.0 && v < prev, "K{n} not decreasing at x={x}");
                prev = v;
            }
        }
    }

    #[test]
    fn test_large_argument_asymptote() {
        // e^x Kn(x) → sqrt(pi/(2x)) for x → ∞, any n.
        let x = 5000.0;
        let asym = (std::f64::consts::PI / (2.0 * x)).sqrt();
        for n in 0..3 {
            let got = besselkn_scaled(n, x);
            assert!(
                (got - asym).abs() / asym < 2e-3,
                "K{n}({x}) scaled = {got}, asymptote {asym}"
            );
        }
    }
}
