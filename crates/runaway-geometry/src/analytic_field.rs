// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Analytic Reference Fields
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Reference magnetic-field samples from analytic models.
//!
//! A grid generator supplies, once per grid rebuild, the ordered
//! θ-samples of (B, J, R/R₀, |∇r|²) on every flux surface of both the
//! cell and radial-face grids. Two analytic models are provided: a
//! cylinder (homogeneous field along the surface, a single reference
//! node) and a circular large-aspect-ratio torus with
//! B ∝ 1/(1 + ε cos θ).

use std::f64::consts::{PI, TAU};

/// Reference field samples for every flux surface.
///
/// The θ-sequence is shared across surfaces and strictly increasing,
/// spanning [0, π] when `symmetric` and [0, 2π) otherwise. The averager
/// takes ownership of this data on construction.
#[derive(Debug, Clone)]
pub struct ReferenceField {
    pub theta: Vec<f64>,
    pub symmetric: bool,
    /// Major radius; infinite for a cylinder.
    pub r0: f64,

    pub b: Vec<Vec<f64>>,
    pub b_f: Vec<Vec<f64>>,
    pub jacobian: Vec<Vec<f64>>,
    pub jacobian_f: Vec<Vec<f64>>,
    pub r_over_r0: Vec<Vec<f64>>,
    pub r_over_r0_f: Vec<Vec<f64>>,
    pub nabla_r2: Vec<Vec<f64>>,
    pub nabla_r2_f: Vec<Vec<f64>>,

    pub theta_bmin: Vec<f64>,
    pub theta_bmin_f: Vec<f64>,
    pub theta_bmax: Vec<f64>,
    pub theta_bmax_f: Vec<f64>,

    /// Toroidal field function over the major radius, G/R₀ = B_tor·R/R₀.
    pub btor_g_over_r0: Vec<f64>,
    pub btor_g_over_r0_f: Vec<f64>,
}

impl ReferenceField {
    pub fn nr(&self) -> usize {
        self.b.len()
    }
}

/// Cylindrical surfaces: B constant along θ, a single reference node.
///
/// Averaging collapses to the identity on every surface; the innermost
/// face (r = 0) has J = 0 and exercises the degenerate-surface rule.
pub fn cylindrical(r: &[f64], r_f: &[f64], b0: f64) -> ReferenceField {
    let nr = r.len();
    let surf = |radius: f64| (vec![b0], vec![radius], vec![1.0], vec![1.0]);
    let mut field = ReferenceField {
        theta: vec![0.0],
        symmetric: true,
        r0: f64::INFINITY,
        b: Vec::with_capacity(nr),
        b_f: Vec::with_capacity(nr + 1),
        jacobian: Vec::with_capacity(nr),
        jacobian_f: Vec::with_capacity(nr + 1),
        r_over_r0: Vec::with_capacity(nr),
        r_over_r0_f: Vec::with_capacity(nr + 1),
        nabla_r2: Vec::with_capacity(nr),
        nabla_r2_f: Vec::with_capacity(nr + 1),
        theta_bmin: vec![0.0; nr],
        theta_bmin_f: vec![0.0; nr + 1],
        theta_bmax: vec![0.0; nr],
        theta_bmax_f: vec![0.0; nr + 1],
        btor_g_over_r0: vec![b0; nr],
        btor_g_over_r0_f: vec![b0; nr + 1],
    };
    for &radius in r {
        let (b, j, rr, n) = surf(radius);
        field.b.push(b);
        field.jacobian.push(j);
        field.r_over_r0.push(rr);
        field.nabla_r2.push(n);
    }
    for &radius in r_f {
        let (b, j, rr, n) = surf(radius);
        field.b_f.push(b);
        field.jacobian_f.push(j);
        field.r_over_r0_f.push(rr);
        field.nabla_r2_f.push(n);
    }
    field
}

/// Circular large-aspect-ratio torus.
///
/// B(θ) = B₀/(1 + ε cos θ), R/R₀ = 1 + ε cos θ, J = r(1 + ε cos θ),
/// |∇r|² = 1, with ε = r/R₀. The field minimum sits on the outboard
/// midplane (θ = 0), the maximum on the inboard side (θ = π).
///
/// `ntheta_ref` reference samples are laid on [0, π] when `symmetric`
/// and on [0, 2π) otherwise; the two samplings describe the same
/// configuration.
pub fn circular_tokamak(
    r: &[f64],
    r_f: &[f64],
    r0: f64,
    b0: f64,
    ntheta_ref: usize,
    symmetric: bool,
) -> ReferenceField {
    let nr = r.len();
    let theta: Vec<f64> = if symmetric {
        (0..ntheta_ref)
            .map(|k| PI * k as f64 / (ntheta_ref - 1) as f64)
            .collect()
    } else {
        (0..ntheta_ref)
            .map(|k| TAU * k as f64 / ntheta_ref as f64)
            .collect()
    };

    let surf = |radius: f64| -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let eps = radius / r0;
        let mut b = Vec::with_capacity(theta.len());
        let mut j = Vec::with_capacity(theta.len());
        let mut rr = Vec::with_capacity(theta.len());
        let mut n = Vec::with_capacity(theta.len());
        for &t in &theta {
            let major = 1.0 + eps * t.cos();
            b.push(b0 / major);
            j.push(radius * major);
            rr.push(major);
            n.push(1.0);
        }
        (b, j, rr, n)
    };

    let mut field = ReferenceField {
        theta: theta.clone(),
        symmetric,
        r0,
        b: Vec::with_capacity(nr),
        b_f: Vec::with_capacity(nr + 1),
        jacobian: Vec::with_capacity(nr),
        jacobian_f: Vec::with_capacity(nr + 1),
        r_over_r0: Vec::with_capacity(nr),
        r_over_r0_f: Vec::with_capacity(nr + 1),
        nabla_r2: Vec::with_capacity(nr),
        nabla_r2_f: Vec::with_capacity(nr + 1),
        theta_bmin: vec![0.0; nr],
        theta_bmin_f: vec![0.0; nr + 1],
        theta_bmax: vec![PI; nr],
        theta_bmax_f: vec![PI; nr + 1],
        btor_g_over_r0: vec![b0; nr],
        btor_g_over_r0_f: vec![b0; nr + 1],
    };
    for &radius in r {
        let (b, j, rr, n) = surf(radius);
        field.b.push(b);
        field.jacobian.push(j);
        field.r_over_r0.push(rr);
        field.nabla_r2.push(n);
    }
    for &radius in r_f {
        let (b, j, rr, n) = surf(radius);
        field.b_f.push(b);
        field.jacobian_f.push(j);
        field.r_over_r0_f.push(rr);
        field.nabla_r2_f.push(n);
    }
    field
}

/// Uniform cell/face radial arrays on (0, a]; the innermost face sits
/// on the axis.
pub fn uniform_radii(nr: usize, a: f64) -> (Vec<f64>, Vec<f64>) {
    let r_f: Vec<f64> = (0..=nr).map(|i| a * i as f64 / nr as f64).collect();
    let r: Vec<f64> = r_f.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect();
    (r, r_f)
}
