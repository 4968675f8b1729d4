// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Minimisation
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Brent minimiser (golden section with parabolic acceleration) and the
//! expanding bracket search used ahead of it.

use runaway_types::error::{KineticError, KineticResult};

const GOLDEN: f64 = 0.381_966_011_250_105; // 2 - φ

/// Converged minimum: location and value.
#[derive(Debug, Clone, Copy)]
pub struct Minimum {
    pub x: f64,
    pub f: f64,
}

/// Minimise f on [a, b] starting from an interior guess.
///
/// Requires f(guess) below both endpoint values (a valid minimum
/// bracket). The interval test matches the root solver's: relative
/// width of the shrinking bracket.
pub fn brent_minimize<F: Fn(f64) -> f64>(
    f: F,
    a: f64,
    guess: f64,
    b: f64,
    rel_tol: f64,
    max_iter: usize,
    what: &'static str,
) -> KineticResult<Minimum> {
    let mut lo = a;
    let mut hi = b;
    let mut x = guess;
    let mut w = guess;
    let mut v = guess;
    let mut fx = f(x);
    let mut fw = fx;
    let mut fv = fx;
    if !fx.is_finite() {
        return Err(KineticError::non_finite(what, fx));
    }
    let mut d: f64 = 0.0;
    let mut e: f64 = 0.0;

    for _ in 0..max_iter {
        if interval_converged(lo, hi, rel_tol) {
            return Ok(Minimum { x, f: fx });
        }

        let m = 0.5 * (lo + hi);
        let tol = 1e-10 * x.abs() + 1e-15;
        let mut use_golden = true;

        if e.abs() > tol {
            // Trial parabola through x, v, w.
            let r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            let e_prev = e;
            e = d;
            if p.abs() < (0.5 * q * e_prev).abs() && p > q * (lo - x) && p < q * (hi - x) {
                d = p / q;
                use_golden = false;
            }
        }
        if use_golden {
            e = if x < m { hi - x } else { lo - x };
            d = GOLDEN * e;
        }

        let u = if d.abs() >= tol {
            x + d
        } else if d > 0.0 {
            x + tol
        } else {
            x - tol
        };
        let fu = f(u);
        if !fu.is_finite() {
            return Err(KineticError::non_finite(what, fu));
        }

        if fu <= fx {
            if u < x {
                hi = x;
            } else {
                lo = x;
            }
            v = w;
            fv = fw;
            w = x;
            fw = fx;
            x = u;
            fx = fu;
        } else {
            if u < x {
                lo = u;
            } else {
                hi = u;
            }
            if fu <= fw || w == x {
                v = w;
                fv = fw;
                w = u;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        }
    }

    Err(KineticError::Convergence {
        what,
        iterations: max_iter,
    })
}

fn interval_converged(lo: f64, hi: f64, rel_tol: f64) -> bool {
    let width = hi - lo;
    let scale = if lo.signum() == hi.signum() {
        lo.abs().min(hi.abs())
    } else {
        0.0
    };
    width <= rel_tol * scale || width <= f64::EPSILON * 10.0
}

/// Search for an interval containing an interior minimum of f by
/// shifting a (lo, guess, up) triple by factors of `factor`, capped at
/// `upper_cap` on the upper end.
///
/// Returns the triple; if the upper end exceeds the cap no interior
/// minimum below the cap exists and the caller handles the boundary
/// case.
pub fn expand_minimum_bracket<F: Fn(f64) -> f64>(
    f: &F,
    mut lo: f64,
    mut guess: f64,
    mut up: f64,
    factor: f64,
    upper_cap: f64,
) -> (f64, f64, f64) {
    let mut f_lo = f(lo);
    let mut f_up = f(up);
    let mut f_g = f(guess);

    if f_g < f_up && f_g < f_lo {
        return (lo, guess, up);
    }
    if f_g > f_lo {
        // Minimum below the current guess.
        while f_g > f_lo {
            up = guess;
            guess = lo;
            lo /= factor;
            f_g = f_lo;
            f_lo = f(lo);
        }
    } else {
        // Minimum above the current guess.
        while f_g > f_up && up < upper_cap {
            lo = guess;
            guess = up;
            up *= factor;
            f_g = f_up;
            f_up = f(up);
        }
    }
    (lo, guess, up)
}
