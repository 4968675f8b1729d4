// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Poloidal Interpolation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One-dimensional interpolation of flux-surface quantities in the
//! poloidal angle.
//!
//! Two policies: piecewise linear, and Steffen's monotone cubic, which
//! never overshoots the data. Steffen needs at least three nodes and
//! falls back to linear otherwise. Reference grids cover either
//! [0, 2π) (general geometry, wrapped periodically) or [0, π]
//! (up–down-symmetric geometry, mirrored about π).

use runaway_types::error::{KineticError, KineticResult};
use runaway_types::settings::InterpolationMethod;
use std::f64::consts::{PI, TAU};

/// Interpolator over one flux surface's reference θ-samples.
#[derive(Debug, Clone)]
pub struct ThetaInterpolator {
    /// Node abscissae, strictly increasing; the wrap node is appended
    /// internally for periodic grids.
    x: Vec<f64>,
    y: Vec<f64>,
    /// Nodal derivatives for the cubic; empty in linear mode.
    dy: Vec<f64>,
    symmetric: bool,
}

impl ThetaInterpolator {
    /// Build an interpolator from reference samples.
    ///
    /// `symmetric` marks an up–down-symmetric configuration whose
    /// samples span [0, π]; evaluation mirrors θ about π. Otherwise the
    /// samples span [0, 2π) and evaluation wraps periodically.
    pub fn new(
        theta: &[f64],
        values: &[f64],
        symmetric: bool,
        method: InterpolationMethod,
    ) -> KineticResult<Self> {
        if theta.len() != values.len() || theta.is_empty() {
            return Err(KineticError::Usage(format!(
                "interpolation data size mismatch: {} nodes, {} values",
                theta.len(),
                values.len()
            )));
        }
        for w in theta.windows(2) {
            if w[1] <= w[0] {
                return Err(KineticError::Usage(
                    "reference theta grid must be strictly increasing".into(),
                ));
            }
        }

        let mut x = theta.to_vec();
        let mut y = values.to_vec();
        if !symmetric && x.len() > 1 {
            // Close the period so evaluation between the last sample and
            // 2π interpolates towards the first sample.
            x.push(x[0] + TAU);
            y.push(y[0]);
        }

        let use_steffen = matches!(method, InterpolationMethod::Steffen) && x.len() > 2;
        let dy = if use_steffen { steffen_derivatives(&x, &y) } else { Vec::new() };

        Ok(ThetaInterpolator {
            x,
            y,
            dy,
            symmetric,
        })
    }

    /// Evaluate at arbitrary θ; arguments outside [0, 2π) are wrapped
    /// first.
    pub fn eval(&self, theta: f64) -> f64 {
        if self.x.len() == 1 {
            return self.y[0];
        }
        let mut t = theta.rem_euclid(TAU);
        if self.symmetric && t > PI {
            t = TAU - t;
        }
        // Clamp against rounding at the domain edges.
        let t = t.clamp(self.x[0], *self.x.last().expect("nonempty"));

        let k = match self.x.binary_search_by(|v| v.total_cmp(&t)) {
            Ok(i) => i.min(self.x.len() - 2),
            Err(i) => i.saturating_sub(1).min(self.x.len() - 2),
        };
        let h = self.x[k + 1] - self.x[k];
        let s = (t - self.x[k]) / h;

        if self.dy.is_empty() {
            return self.y[k] + s * (self.y[k + 1] - self.y[k]);
        }

        // Cubic Hermite on the interval with Steffen derivatives.
        let h00 = (1.0 + 2.0 * s) * (1.0 - s) * (1.0 - s);
        let h10 = s * (1.0 - s) * (1.0 - s);
        let h01 = s * s * (3.0 - 2.0 * s);
        let h11 = s * s * (s - 1.0);
        h00 * self.y[k] + h10 * h * self.dy[k] + h01 * self.y[k + 1] + h11 * h * self.dy[k + 1]
    }
}

/// Steffen (1990) monotonicity-preserving nodal derivatives.
fn steffen_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut dy = vec![0.0; n];
    let h: Vec<f64> = (0..n - 1).map(|i| x[i + 1] - x[i]).collect();
    let s: Vec<f64> = (0..n - 1).map(|i| (y[i + 1] - y[i]) / h[i]).collect();

    for i in 1..n - 1 {
        let p = (s[i - 1] * h[i] + s[i] * h[i - 1]) / (h[i - 1] + h[i]);
        if s[i - 1] * s[i] <= 0.0 {
            dy[i] = 0.0;
        } else {
            let lim = 2.0 * s[i - 1].abs().min(s[i].abs());
            dy[i] = p.signum() * p.abs().min(lim);
        }
    }

    // One-sided parabolic estimates at the ends, limited to twice the
    // adjacent secant slope.
    let p0 = s[0] * (1.0 + h[0] / (h[0] + h[1])) - s[1] * h[0] / (h[0] + h[1]);
    dy[0] = if p0 * s[0] <= 0.0 {
        0.0
    } else {
        p0.signum() * p0.abs().min(2.0 * s[0].abs())
    };
    let pn = s[n - 2] * (1.0 + h[n - 2] / (h[n - 2] + h[n - 3]))
        - s[n - 3] * h[n - 2] / (h[n - 2] + h[n - 3]);
    dy[n - 1] = if pn * s[n - 2] <= 0.0 {
        0.0
    } else {
        pn.signum() * pn.abs().min(2.0 * s[n - 2].abs())
    };

    dy
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine_samples(n: usize, max: f64) -> (Vec<f64>, Vec<f64>) {
        let theta: Vec<f64> = (0..n).map(|i| max * i as f64 / n as f64).collect();
        let values: Vec<f64> = theta.iter().map(|t| 1.0 + 0.3 * t.cos()).collect();
        (theta, values)
    }

    #[test]
    fn test_linear_hits_nodes() {
        let (theta, values) = cosine_samples(16, TAU);
        let it =
            ThetaInterpolator::new(&theta, &values, false, InterpolationMethod::Linear).unwrap();
        for (t, v) in theta.iter().zip(&values) {
            assert!((it.eval(*t) - v).abs() < 1e-14);
        }
    }

    #[test]
    fn test_steffen_hits_nodes() {
        let (theta, values) = cosine_samples(16, TAU);
        let it =
            ThetaInterpolator::new(&theta, &values, false, InterpolationMethod::Steffen).unwrap();
        for (t, v) in theta.iter().zip(&values) {
            assert!((it.eval(*t) - v).abs() < 1e-12);
        }
    }

    #[test]
    fn test_periodic_wrap() {
        let (theta, values) = cosine_samples(32, TAU);
        let it =
            ThetaInterpolator::new(&theta, &values, false, InterpolationMethod::Steffen).unwrap();
        // θ = -0.1 wraps to 2π - 0.1; the cosine is smooth across the seam.
        let wrapped = it.eval(-0.1);
        let direct = 1.0 + 0.3 * (-0.1_f64).cos();
        assert!((wrapped - direct).abs() < 1e-3, "wrapped {wrapped}, direct {direct}");
    }

    #[test]
    fn test_symmetric_mirror() {
        let (theta, values) = cosine_samples(32, PI);
        let it =
            ThetaInterpolator::new(&theta, &values, true, InterpolationMethod::Steffen).unwrap();
        // cos is even, so mirroring about π reproduces the function.
        for t in [3.5, 4.0, 5.0, 6.0] {
            let expected = 1.0 + 0.3 * (t as f64).cos();
            assert!(
                (it.eval(t) - expected).abs() < 1e-3,
                "theta {t}: {} vs {expected}",
                it.eval(t)
            );
        }
    }

    #[test]
    fn test_steffen_no_overshoot() {
        // Step-like data: monotone interpolation must stay within data range.
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        let it = ThetaInterpolator::new(&x, &y, true, InterpolationMethod::Steffen).unwrap();
        // symmetric=true keeps the grid as-is over [0, π]; probe inside it.
        for i in 0..300 {
            let t = 3.0 * i as f64 / 300.0;
            let v = it.eval(t);
            assert!((-1e-12..=1.0 + 1e-12).contains(&v), "overshoot at {t}: {v}");
        }
    }

    #[test]
    fn test_two_nodes_falls_back_to_linear() {
        let x = [0.0, PI];
        let y = [1.0, 2.0];
        let it = ThetaInterpolator::new(&x, &y, true, InterpolationMethod::Steffen).unwrap();
        assert!((it.eval(PI / 2.0) - 1.5).abs() < 1e-14);
    }

    #[test]
    fn test_single_node_is_constant() {
        let it =
            ThetaInterpolator::new(&[0.0], &[7.0], false, InterpolationMethod::Linear).unwrap();
        assert_eq!(it.eval(2.0), 7.0);
        assert_eq!(it.eval(-5.0), 7.0);
    }

    #[test]
    fn test_unsorted_grid_rejected() {
        let res = ThetaInterpolator::new(&[0.0, 2.0, 1.0], &[0.0; 3], false, InterpolationMethod::Linear);
        assert!(res.is_err());
    }
}
