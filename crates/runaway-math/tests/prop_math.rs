// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Property-Based Tests (proptest) for runaway-math
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Property-based tests for runaway-math using proptest.
//!
//! Covers: fixed quadrature exactness and positivity, adaptive
//! quadrature against closed forms, Brent root/minimiser contracts,
//! Steffen monotonicity.

use proptest::prelude::*;
use runaway_math::adaptive::{integrate_adaptive, integrate_sqrt_singular};
use runaway_math::interp::ThetaInterpolator;
use runaway_math::minimize::brent_minimize;
use runaway_math::quadrature::FixedRule;
use runaway_math::roots::brent_root;
use runaway_types::settings::InterpolationMethod;
use std::f64::consts::{PI, TAU};

// ── Fixed quadrature ─────────────────────────────────────────────────

proptest! {
    /// Gauss-Legendre weights are positive and sum to the interval length.
    #[test]
    fn legendre_weights_partition_interval(n in 1usize..64, b in 0.5f64..10.0) {
        let rule = FixedRule::gauss_legendre(n, 0.0, b).unwrap();
        let mut sum = 0.0;
        for &w in &rule.weights {
            prop_assert!(w > 0.0, "negative weight");
            sum += w;
        }
        prop_assert!((sum - b).abs() < 1e-10 * b.max(1.0),
            "weights sum to {} on [0, {}]", sum, b);
    }

    /// An n-point Legendre rule integrates x^(2n-1) exactly.
    #[test]
    fn legendre_exact_for_polynomials(n in 1usize..12) {
        let rule = FixedRule::gauss_legendre(n, 0.0, 1.0).unwrap();
        let deg = (2 * n - 1) as i32;
        let got: f64 = rule.nodes.iter().zip(&rule.weights)
            .map(|(&x, &w)| w * x.powi(deg))
            .sum();
        let exact = 1.0 / (deg as f64 + 1.0);
        prop_assert!((got - exact).abs() < 1e-12,
            "degree {}: {} vs {}", deg, got, exact);
    }

    /// Chebyshev nodes are interior and ascending.
    #[test]
    fn chebyshev_nodes_interior(n in 1usize..64) {
        let rule = FixedRule::gauss_chebyshev(n, 0.0, TAU).unwrap();
        for w in rule.nodes.windows(2) {
            prop_assert!(w[1] > w[0]);
        }
        prop_assert!(rule.nodes[0] > 0.0);
        prop_assert!(*rule.nodes.last().unwrap() < TAU);
    }
}

// ── Adaptive quadrature ──────────────────────────────────────────────

proptest! {
    /// ∫0^b (c0 + c1 x + c2 x²) dx matches the closed form.
    #[test]
    fn adaptive_quadratic_closed_form(
        c0 in -5.0f64..5.0,
        c1 in -5.0f64..5.0,
        c2 in -5.0f64..5.0,
        b in 0.1f64..10.0,
    ) {
        let got = integrate_adaptive(|x| c0 + c1 * x + c2 * x * x, 0.0, b, 1e-10).unwrap();
        let exact = c0 * b + c1 * b * b / 2.0 + c2 * b * b * b / 3.0;
        prop_assert!((got - exact).abs() < 1e-8 * (1.0 + exact.abs()),
            "{} vs {}", got, exact);
    }

    /// The inverse-square-root rule reproduces
    /// ∫_a^b dθ/sqrt((θ-a)(b-θ)) = π independently of the interval.
    #[test]
    fn sqrt_singular_unit_mass(a in -3.0f64..3.0, w in 0.01f64..5.0) {
        let got = integrate_sqrt_singular(|_| 1.0, a, a + w, 1e-10).unwrap();
        prop_assert!((got - PI).abs() < 1e-8, "mass {} on width {}", got, w);
    }

    /// Linearity of the integral in the integrand.
    #[test]
    fn adaptive_linearity(s in 0.1f64..5.0) {
        let base = integrate_adaptive(|x| x.sin() + 1.0, 0.0, 2.0, 1e-10).unwrap();
        let scaled = integrate_adaptive(|x| s * (x.sin() + 1.0), 0.0, 2.0, 1e-10).unwrap();
        prop_assert!((scaled - s * base).abs() < 1e-8 * (1.0 + scaled.abs()));
    }
}

// ── Root finding and minimisation ────────────────────────────────────

proptest! {
    /// Brent finds the unique root of a shifted cubic wherever it lies
    /// in the bracket.
    #[test]
    fn brent_cubic_root(r in -2.0f64..2.0) {
        let f = |x: f64| (x - r) * ((x - r) * (x - r) + 1.0);
        let root = brent_root(f, -5.0, 5.0, 1e-12, 100, "prop-cubic").unwrap();
        prop_assert!((root.root - r).abs() < 1e-8,
            "root {} expected {}", root.root, r);
    }

    /// The residual at a converged root is small relative to the
    /// function scale at the bracket ends.
    #[test]
    fn brent_residual_small(r in 0.1f64..10.0) {
        let f = |x: f64| x * x - r;
        let root = brent_root(f, 0.0, r + 1.0, 1e-12, 100, "prop-sqrt").unwrap();
        prop_assert!(f(root.root).abs() < 1e-6 * r.max(1.0));
    }

    /// Brent minimiser locates the vertex of a parabola.
    #[test]
    fn brent_min_parabola(v in -3.0f64..3.0, c in 0.1f64..10.0) {
        let f = |x: f64| c * (x - v) * (x - v);
        let m = brent_minimize(f, v - 4.0, v + 0.7, v + 5.0, 1e-10, 200, "prop-parab").unwrap();
        prop_assert!((m.x - v).abs() < 1e-5, "min at {} expected {}", m.x, v);
    }
}

// ── Steffen interpolation ────────────────────────────────────────────

proptest! {
    /// Steffen interpolation of monotone data is monotone between any
    /// two probe points.
    #[test]
    fn steffen_preserves_monotonicity(seed in 0u64..1000) {
        // Build increasing data from the seed, pseudo-deterministically.
        let n = 12;
        let x: Vec<f64> = (0..n).map(|i| PI * i as f64 / (n - 1) as f64).collect();
        let mut y = Vec::with_capacity(n);
        let mut acc = 0.0;
        for i in 0..n {
            acc += 0.1 + ((seed as f64 + i as f64 * 7.3).sin()).abs();
            y.push(acc);
        }
        let it = ThetaInterpolator::new(&x, &y, true, InterpolationMethod::Steffen).unwrap();
        let mut prev = it.eval(0.0);
        for i in 1..=200 {
            let t = PI * i as f64 / 200.0;
            let v = it.eval(t);
            prop_assert!(v >= prev - 1e-10, "non-monotone at {}: {} < {}", t, v, prev);
            prev = v;
        }
    }

    /// Interpolation stays within the data envelope.
    #[test]
    fn steffen_bounded_by_data(amp in 0.1f64..2.0) {
        let n = 16;
        let x: Vec<f64> = (0..n).map(|i| PI * i as f64 / (n - 1) as f64).collect();
        let y: Vec<f64> = x.iter().map(|t| 1.0 + amp * (3.0 * t).sin()).collect();
        let lo = y.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = y.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let it = ThetaInterpolator::new(&x, &y, true, InterpolationMethod::Steffen).unwrap();
        for i in 0..=300 {
            let t = PI * i as f64 / 300.0;
            let v = it.eval(t);
            prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9,
                "escaped envelope at {}: {} not in [{}, {}]", t, v, lo, hi);
        }
    }
}
