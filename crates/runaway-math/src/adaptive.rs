// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Adaptive Quadrature
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Global-adaptive quadrature.
//!
//! The workhorse is a Gauss–Kronrod 15(7) rule with bisection of the
//! segment carrying the largest error estimate. Two wrappers handle the
//! singular cases of the averaging pipeline: inverse-square-root
//! endpoint singularities (trapped-orbit metric) and semi-infinite
//! domains (Compton production integral).

use runaway_types::error::{KineticError, KineticResult};
use std::f64::consts::PI;

/// Kronrod abscissae for the 15-point rule (positive half).
const XGK: [f64; 8] = [
    0.991455371120813,
    0.949107912342759,
    0.864864423359769,
    0.741531185599394,
    0.586087235467691,
    0.405845151377397,
    0.207784955007898,
    0.0,
];

/// Kronrod weights.
const WGK: [f64; 8] = [
    0.022935322010529,
    0.063092092629979,
    0.104790010322250,
    0.140653259715525,
    0.169004726639267,
    0.190350578064785,
    0.204432940075298,
    0.209482141084728,
];

/// Embedded 7-point Gauss weights (even Kronrod indices).
const WG: [f64; 4] = [
    0.129484966168870,
    0.279705391489277,
    0.381830050505119,
    0.417959183673469,
];

/// Maximum number of stored segments per integration.
pub const SEGMENT_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    integral: f64,
    error: f64,
}

fn kronrod_15<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64) -> KineticResult<(f64, f64)> {
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);

    let mut kronrod = 0.0;
    let mut gauss = 0.0;
    for (j, (&x, &wk)) in XGK.iter().zip(WGK.iter()).enumerate() {
        let (flo, fhi) = if x == 0.0 {
            let fc = f(mid);
            (fc, 0.0)
        } else {
            (f(mid - half * x), f(mid + half * x))
        };
        let fsum = flo + fhi;
        if !fsum.is_finite() {
            return Err(KineticError::non_finite("adaptive quadrature integrand", fsum));
        }
        kronrod += wk * fsum;
        if j % 2 == 1 {
            gauss += WG[j / 2] * fsum;
        }
    }
    kronrod *= half;
    gauss *= half;

    // QUADPACK error inflation of the raw difference.
    let diff = (kronrod - gauss).abs();
    let err = if diff > 0.0 {
        (200.0 * diff).powf(1.5).min(diff)
    } else {
        0.0
    };
    Ok((kronrod, err.max(diff * 1e-2)))
}

/// ∫ₐᵇ f dx by global-adaptive Gauss–Kronrod bisection.
///
/// Stops when the summed error estimate satisfies the relative
/// tolerance. If the segment limit is reached first, the best estimate
/// is returned.
pub fn integrate_adaptive<F: Fn(f64) -> f64>(f: F, a: f64, b: f64, epsrel: f64) -> KineticResult<f64> {
    if a == b {
        return Ok(0.0);
    }
    let (integral, error) = kronrod_15(&f, a, b)?;
    let mut segments = vec![Segment {
        a,
        b,
        integral,
        error,
    }];

    loop {
        let total: f64 = segments.iter().map(|s| s.integral).sum();
        let total_err: f64 = segments.iter().map(|s| s.error).sum();
        if total_err <= epsrel * total.abs() || segments.len() >= SEGMENT_LIMIT {
            return Ok(total);
        }

        // Bisect the segment with the largest error estimate.
        let worst = segments
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.error.total_cmp(&y.error))
            .map(|(i, _)| i)
            .unwrap_or(0);
        let seg = segments.swap_remove(worst);
        let mid = 0.5 * (seg.a + seg.b);
        if mid == seg.a || mid == seg.b {
            // Interval at floating-point resolution; keep its estimate.
            segments.push(seg);
            return Ok(segments.iter().map(|s| s.integral).sum());
        }
        let (il, el) = kronrod_15(&f, seg.a, mid)?;
        let (ih, eh) = kronrod_15(&f, mid, seg.b)?;
        segments.push(Segment {
            a: seg.a,
            b: mid,
            integral: il,
            error: el,
        });
        segments.push(Segment {
            a: mid,
            b: seg.b,
            integral: ih,
            error: eh,
        });
    }
}

/// ∫ₐᵇ g(θ)/√((θ−a)(b−θ)) dθ for regular g.
///
/// The substitution θ = (a+b)/2 − (b−a)/2·cos φ absorbs the weight
/// exactly, leaving ∫₀^π g(θ(φ)) dφ which is handled by the regular
/// adaptive rule.
pub fn integrate_sqrt_singular<F: Fn(f64) -> f64>(
    g: F,
    a: f64,
    b: f64,
    epsrel: f64,
) -> KineticResult<f64> {
    if a >= b {
        return Ok(0.0);
    }
    let mid = 0.5 * (a + b);
    let half = 0.5 * (b - a);
    integrate_adaptive(|phi| g(mid - half * phi.cos()), 0.0, PI, epsrel)
}

/// ∫ₐ^∞ f dx via the rational map x = a + t/(1−t).
///
/// The Kronrod nodes are interior, so the t = 1 endpoint is never
/// evaluated.
pub fn integrate_to_infinity<F: Fn(f64) -> f64>(f: F, a: f64, epsrel: f64) -> KineticResult<f64> {
    integrate_adaptive(
        |t| {
            let u = 1.0 - t;
            f(a + t / u) / (u * u)
        },
        0.0,
        1.0,
        epsrel,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smooth_integrand() {
        // ∫0^2π (1 + 0.3cosθ) dθ = 2π
        let got = integrate_adaptive(|t| 1.0 + 0.3 * t.cos(), 0.0, 2.0 * PI, 1e-10).unwrap();
        assert!((got - 2.0 * PI).abs() < 1e-8, "got {got}");
    }

    #[test]
    fn test_oscillatory_integrand() {
        // ∫0^1 sin(40x) dx = (1 - cos 40)/40
        let exact = (1.0 - (40.0_f64).cos()) / 40.0;
        let got = integrate_adaptive(|x| (40.0 * x).sin(), 0.0, 1.0, 1e-10).unwrap();
        assert!((got - exact).abs() < 1e-8, "got {got}, exact {exact}");
    }

    #[test]
    fn test_sqrt_singular_endpoints() {
        // ∫_0^1 dθ/sqrt(θ(1-θ)) = π with g ≡ 1
        let got = integrate_sqrt_singular(|_| 1.0, 0.0, 1.0, 1e-10).unwrap();
        assert!((got - PI).abs() < 1e-10, "got {got}");

        // ∫_0^1 θ dθ/sqrt(θ(1-θ)) = π/2
        let got = integrate_sqrt_singular(|t| t, 0.0, 1.0, 1e-10).unwrap();
        assert!((got - PI / 2.0).abs() < 1e-10, "got {got}");
    }

    #[test]
    fn test_semi_infinite_exponential() {
        // ∫_2^∞ e^{-x} dx = e^{-2}
        let exact = (-2.0_f64).exp();
        let got = integrate_to_infinity(|x| (-x).exp(), 2.0, 1e-10).unwrap();
        assert!((got - exact).abs() / exact < 1e-8, "got {got}");
    }

    #[test]
    fn test_semi_infinite_powerlaw() {
        // ∫_1^∞ dx/x^3 = 1/2
        let got = integrate_to_infinity(|x| x.powi(-3), 1.0, 1e-10).unwrap();
        assert!((got - 0.5).abs() < 1e-8, "got {got}");
    }

    #[test]
    fn test_nan_integrand_is_numeric_error() {
        let res = integrate_adaptive(|x| (x - 0.5).ln(), 0.0, 1.0, 1e-6);
        assert!(res.is_err());
    }

    #[test]
    fn test_empty_interval() {
        let got = integrate_adaptive(|x| x, 1.0, 1.0, 1e-6).unwrap();
        assert_eq!(got, 0.0);
    }
}
