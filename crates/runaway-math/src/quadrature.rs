// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Fixed Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Fixed-node quadrature rules on a finite interval.
//!
//! A rule approximates ∫ w(x) F(x) dx ≈ Σ wᵢ F(xᵢ) where w is the rule's
//! weight function. Gauss–Legendre has w ≡ 1 and suits smooth integrands;
//! Gauss–Chebyshev (type 1) has w = 1/√((b−x)(x−a)), the form the metric
//! takes along trapped orbits.

use runaway_types::error::{KineticError, KineticResult};
use std::f64::consts::PI;

/// Nodes and weights of a fixed rule on [a, b].
#[derive(Debug, Clone)]
pub struct FixedRule {
    pub nodes: Vec<f64>,
    pub weights: Vec<f64>,
}

impl FixedRule {
    /// n-point Gauss–Legendre rule on [a, b].
    ///
    /// Nodes are roots of Pₙ, found by Newton iteration from the
    /// Chebyshev initial guess; converges to machine precision in a
    /// handful of steps for any practical n.
    pub fn gauss_legendre(n: usize, a: f64, b: f64) -> KineticResult<FixedRule> {
        if n == 0 {
            return Err(KineticError::Usage(
                "Gauss-Legendre rule requires at least one node".into(),
            ));
        }
        let mut nodes = vec![0.0; n];
        let mut weights = vec![0.0; n];

        let m = n.div_ceil(2);
        for i in 0..m {
            // Initial guess (A&S 22.16.6)
            let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
            let mut dp = 0.0;
            for _ in 0..100 {
                // Recurrence for P_n(x) and P'_n(x)
                let mut p0 = 1.0;
                let mut p1 = x;
                for k in 2..=n {
                    let pk = ((2 * k - 1) as f64 * x * p1 - (k - 1) as f64 * p0) / k as f64;
                    p0 = p1;
                    p1 = pk;
                }
                dp = n as f64 * (x * p1 - p0) / (x * x - 1.0);
                let dx = p1 / dp;
                x -= dx;
                if dx.abs() < 1e-15 {
                    break;
                }
            }
            let w = 2.0 / ((1.0 - x * x) * dp * dp);
            // Map from [-1, 1] to [a, b]; roots come out in descending
            // order of x so mirror into place.
            let half = 0.5 * (b - a);
            let mid = 0.5 * (b + a);
            nodes[i] = mid - half * x;
            nodes[n - 1 - i] = mid + half * x;
            weights[i] = half * w;
            weights[n - 1 - i] = half * w;
        }

        Ok(FixedRule { nodes, weights })
    }

    /// n-point Gauss–Chebyshev (type 1) rule on [a, b].
    ///
    /// Exact for ∫ w(x) F(x) dx with w(x) = 1/√((b−x)(x−a)) and F a
    /// polynomial; all weights equal π/n.
    pub fn gauss_chebyshev(n: usize, a: f64, b: f64) -> KineticResult<FixedRule> {
        if n == 0 {
            return Err(KineticError::Usage(
                "Gauss-Chebyshev rule requires at least one node".into(),
            ));
        }
        let half = 0.5 * (b - a);
        let mid = 0.5 * (b + a);
        let mut nodes = Vec::with_capacity(n);
        let weights = vec![PI / n as f64; n];
        for i in 0..n {
            // Ascending order in x.
            let t = PI * (2.0 * (n - i) as f64 - 1.0) / (2.0 * n as f64);
            nodes.push(mid + half * t.cos());
        }
        Ok(FixedRule { nodes, weights })
    }
}

/// Weight function of the Gauss–Chebyshev rule on [a, b].
pub fn chebyshev_weight(x: f64, a: f64, b: f64) -> f64 {
    1.0 / ((b - x) * (x - a)).sqrt()
}
