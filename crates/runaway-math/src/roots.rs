// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Root Finding
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bracketing Brent root solver.
//!
//! Combines bisection, secant and inverse quadratic interpolation; the
//! bracket never loses the sign change. The stopping rule tests the
//! bracket width against a relative tolerance, and the iteration cap is
//! a hard limit: exceeding it is a convergence error, fatal for the
//! containing solver step.

use runaway_types::error::{KineticError, KineticResult};

/// Result of a converged root solve: the root estimate and the final
/// bracket.
#[derive(Debug, Clone, Copy)]
pub struct Root {
    pub root: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Find a root of f in [a, b] with Brent's method.
///
/// `what` names the solve in the convergence error. The bracket must
/// change sign; same-sign endpoints are reported as an invalid bracket.
pub fn brent_root<F: Fn(f64) -> f64>(
    f: F,
    a: f64,
    b: f64,
    rel_tol: f64,
    max_iter: usize,
    what: &'static str,
) -> KineticResult<Root> {
    let mut a = a;
    let mut b = b;
    let mut fa = f(a);
    let mut fb = f(b);

    if !fa.is_finite() || !fb.is_finite() {
        return Err(KineticError::non_finite(what, if fa.is_finite() { fb } else { fa }));
    }
    if fa == 0.0 {
        return Ok(Root { root: a, lower: a, upper: a });
    }
    if fb == 0.0 {
        return Ok(Root { root: b, lower: b, upper: b });
    }
    if fa.signum() == fb.signum() {
        return Err(KineticError::Convergence {
            what,
            iterations: 0,
        });
    }

    // Keep |f(b)| <= |f(a)|; b is the current best estimate.
    if fa.abs() < fb.abs() {
        std::mem::swap(&mut a, &mut b);
        std::mem::swap(&mut fa, &mut fb);
    }
    let mut c = a;
    let mut fc = fa;
    let mut d = b - a;
    let mut e = d;

    for _ in 0..max_iter {
        if fb.signum() == fc.signum() {
            c = a;
            fc = fa;
            d = b - a;
            e = d;
        }
        if fc.abs() < fb.abs() {
            a = b;
            b = c;
            c = a;
            fa = fb;
            fb = fc;
            fc = fa;
        }

        let lower = b.min(c);
        let upper = b.max(c);
        if interval_converged(lower, upper, rel_tol) || fb == 0.0 {
            return Ok(Root {
                root: b,
                lower,
                upper,
            });
        }

        let tol = 2.0 * f64::EPSILON * b.abs();
        let m = 0.5 * (c - b);
        if e.abs() >= tol && fa.abs() > fb.abs() {
            // Interpolation step: secant, or inverse quadratic when
            // three distinct points are available.
            let s = fb / fa;
            let (mut p, mut q) = if a == c {
                (2.0 * m * s, 1.0 - s)
            } else {
                let q = fa / fc;
                let r = fb / fc;
                (
                    s * (2.0 * m * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };
            if p > 0.0 {
                q = -q;
            }
            p = p.abs();
            if 2.0 * p < (3.0 * m * q - (tol * q).abs()).min((e * q).abs()) {
                e = d;
                d = p / q;
            } else {
                d = m;
                e = m;
            }
        } else {
            d = m;
            e = m;
        }

        a = b;
        fa = fb;
        b += if d.abs() > tol {
            d
        } else if m > 0.0 {
            tol
        } else {
            -tol
        };
        fb = f(b);
        if !fb.is_finite() {
            return Err(KineticError::non_finite(what, fb));
        }
    }

    Err(KineticError::Convergence {
        what,
        iterations: max_iter,
    })
}

/// Relative interval test: |b − a| < rel·min(|a|, |b|) when the bracket
/// does not straddle zero, absolute width otherwise.
fn interval_converged(lower: f64, upper: f64, rel_tol: f64) -> bool {
    let width = upper - lower;
    let scale = if lower.signum() == upper.signum() {
        lower.abs().min(upper.abs())
    } else {
        0.0
    };
    width <= rel_tol * scale || width <= f64::EPSILON * 10.0
}

/// Expand [lo, up] multiplicatively until f(lo) > 0 > f(up).
///
/// Crude but robust: shift the window down by ×0.7 while the lower end
/// underestimates, up by ×1.4 while the upper end overestimates. Both
/// endpoints are assumed positive quantities (fields, momenta).
pub fn expand_root_interval<F: Fn(f64) -> f64>(f: &F, lo: &mut f64, up: &mut f64) {
    let mut lo_ok = f(*lo) > 0.0;
    let mut up_ok = f(*up) < 0.0;
    while !lo_ok {
        *up = *lo;
        *lo *= 0.7;
        lo_ok = f(*lo) > 0.0;
        up_ok = true;
    }
    while !up_ok {
        *up *= 1.4;
        up_ok = f(*up) < 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_root() {
        let r = brent_root(|x| x * x - 2.0, 0.0, 2.0, 1e-12, 50, "sqrt2").unwrap();
        assert!((r.root - 2.0_f64.sqrt()).abs() < 1e-10);
    }

    #[test]
    fn test_root_at_bracket_end() {
        let r = brent_root(|x| x, 0.0, 1.0, 1e-12, 50, "zero").unwrap();
        assert_eq!(r.root, 0.0);
    }

    #[test]
    fn test_transcendental_root() {
        // cos x = x near 0.739085
        let r = brent_root(|x| x.cos() - x, 0.0, 1.0, 1e-10, 50, "dottie").unwrap();
        assert!((r.root - 0.7390851332151607).abs() < 1e-8);
    }

    #[test]
    fn test_invalid_bracket_is_convergence_error() {
        let res = brent_root(|x| x * x + 1.0, -1.0, 1.0, 1e-8, 50, "no-root");
        assert!(matches!(res, Err(KineticError::Convergence { .. })));
    }

    #[test]
    fn test_iteration_cap_enforced() {
        // One iteration cannot resolve a root to 1e-15 relative width.
        let res = brent_root(|x| x.powi(3) - 2.0, 1.0, 2.0, 1e-15, 1, "capped");
        assert!(matches!(res, Err(KineticError::Convergence { iterations: 1, .. })));
    }

    #[test]
    fn test_expand_interval_downwards() {
        // Root at 0.1; start with both ends above it.
        let f = |x: f64| 0.1 - x;
        let mut lo = 1.0;
        let mut up = 2.0;
        expand_root_interval(&f, &mut lo, &mut up);
        assert!(f(lo) > 0.0 && f(up) < 0.0);
        assert!(lo < 0.1 && up > 0.1);
    }

    #[test]
    fn test_expand_interval_upwards() {
        // Root at 50; start with both ends below it.
        let f = |x: f64| 50.0 - x;
        let mut lo = 1.0;
        let mut up = 2.0;
        expand_root_interval(&f, &mut lo, &mut up);
        assert!(f(lo) > 0.0 && f(up) < 0.0);
        assert!(up > 50.0);
    }
}
