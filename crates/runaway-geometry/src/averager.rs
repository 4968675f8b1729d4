// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Flux-Surface Averager
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Central averaging engine.
//!
//! Evaluates flux-surface integrals/averages of arbitrary functions
//! F(B/B_min, R/R₀, |∇r|²) and bounce integrals/averages of
//! F(ξ/ξ₀, B/B_min, R/R₀, |∇r|²) at arbitrary (p, ξ₀), on interpolated
//! reference field data. Owns the θ-quadrature and the bounce-point
//! root finder, and publishes the derived per-surface scalars to the
//! radial grid in one step at the end of `rebuild`.
//!
//! Singular limits are part of the contract, not errors:
//! V' = 0 (degenerate surface), B_min = B_max (cylindrical surface),
//! B_min = 0 (B/B_min ≡ 1), and ξ² < 0 (integrand clamped to zero).

use crate::analytic_field::ReferenceField;
use crate::bounce::find_bounce_points;
use crate::flux_quantity::FluxSurfaceQuantity;
use crate::momentum::p_xi_metric_over_p2;
use crate::radial_grid::{GeometryPublication, RadialGrid};
use runaway_math::adaptive::{integrate_adaptive, integrate_sqrt_singular};
use runaway_math::quadrature::{chebyshev_weight, FixedRule};
use runaway_types::error::{KineticError, KineticResult};
use runaway_types::settings::{AveragerSettings, FluxGrid, QuadratureMethod};
use std::f64::consts::{PI, TAU};

/// Relative tolerance of adaptive flux-surface integrals.
const EPSREL_FSA: f64 = 1e-4;
/// Relative tolerance of adaptive bounce integrals.
const EPSREL_BOUNCE: f64 = 5e-4;

/// Fixed θ-quadrature nodes with weights normalised to a plain
/// integral (rule weight function divided out, symmetry doubling
/// applied).
#[derive(Debug, Clone)]
pub struct ThetaGrid {
    pub theta: Vec<f64>,
    pub weights: Vec<f64>,
}

#[derive(Debug)]
pub struct FluxSurfaceAverager {
    settings: AveragerSettings,
    symmetric: bool,
    nr: usize,
    theta_max: f64,
    r0: f64,

    b: FluxSurfaceQuantity,
    jacobian: FluxSurfaceQuantity,
    r_over_r0: FluxSurfaceQuantity,
    nabla_r2: FluxSurfaceQuantity,

    theta_bmin: Vec<f64>,
    theta_bmin_f: Vec<f64>,
    theta_bmax: Vec<f64>,
    theta_bmax_f: Vec<f64>,
    btor_g_over_r0: Vec<f64>,
    btor_g_over_r0_f: Vec<f64>,

    bmin: Vec<f64>,
    bmin_f: Vec<f64>,
    bmax: Vec<f64>,
    bmax_f: Vec<f64>,
    vp_vol: Vec<f64>,
    vp_vol_f: Vec<f64>,

    fixed: Option<ThetaGrid>,
}

impl FluxSurfaceAverager {
    /// Build from reference field data, taking ownership of it, and
    /// evaluate the per-surface caches.
    pub fn new(field: ReferenceField, settings: AveragerSettings) -> KineticResult<Self> {
        let nr = field.nr();
        let symmetric = field.symmetric;
        let theta_max = if symmetric { PI } else { TAU };
        let method = settings.interpolation;

        let b = FluxSurfaceQuantity::new(&field.theta, &field.b, &field.b_f, symmetric, method)?;
        let jacobian = FluxSurfaceQuantity::new(
            &field.theta,
            &field.jacobian,
            &field.jacobian_f,
            symmetric,
            method,
        )?;
        let r_over_r0 = FluxSurfaceQuantity::new(
            &field.theta,
            &field.r_over_r0,
            &field.r_over_r0_f,
            symmetric,
            method,
        )?;
        let nabla_r2 = FluxSurfaceQuantity::new(
            &field.theta,
            &field.nabla_r2,
            &field.nabla_r2_f,
            symmetric,
            method,
        )?;

        let mut avg = FluxSurfaceAverager {
            settings,
            symmetric,
            nr,
            theta_max,
            r0: field.r0,
            b,
            jacobian,
            r_over_r0,
            nabla_r2,
            theta_bmin: field.theta_bmin,
            theta_bmin_f: field.theta_bmin_f,
            theta_bmax: field.theta_bmax,
            theta_bmax_f: field.theta_bmax_f,
            btor_g_over_r0: field.btor_g_over_r0,
            btor_g_over_r0_f: field.btor_g_over_r0_f,
            bmin: Vec::new(),
            bmin_f: Vec::new(),
            bmax: Vec::new(),
            bmax_f: Vec::new(),
            vp_vol: Vec::new(),
            vp_vol_f: Vec::new(),
            fixed: None,
        };
        avg.build()?;
        Ok(avg)
    }

    /// (Re-)initialise everything required to perform averages:
    /// quadrature nodes, field extrema and V' on both radial grids.
    fn build(&mut self) -> KineticResult<()> {
        self.fixed = match self.settings.quadrature {
            QuadratureMethod::Adaptive => None,
            rule => {
                let n = self.settings.ntheta_interp;
                let grid = match rule {
                    QuadratureMethod::FixedLegendre => {
                        let r = FixedRule::gauss_legendre(n, 0.0, self.theta_max)?;
                        ThetaGrid {
                            theta: r.nodes,
                            weights: r.weights,
                        }
                    }
                    QuadratureMethod::FixedChebyshev => {
                        // Divide out the rule's weight function so the
                        // node sum approximates the plain integral.
                        let r = FixedRule::gauss_chebyshev(n, 0.0, self.theta_max)?;
                        let weights = r
                            .nodes
                            .iter()
                            .zip(&r.weights)
                            .map(|(&x, &w)| w / chebyshev_weight(x, 0.0, self.theta_max))
                            .collect();
                        ThetaGrid {
                            theta: r.nodes,
                            weights,
                        }
                    }
                    QuadratureMethod::Adaptive => unreachable!(),
                };
                Some(grid)
            }
        };
        if let Some(grid) = &self.fixed {
            let mut grid = grid.clone();
            if self.symmetric {
                for w in &mut grid.weights {
                    *w *= 2.0;
                }
            }
            self.b.interpolate_to_theta(&grid.theta);
            self.jacobian.interpolate_to_theta(&grid.theta);
            self.r_over_r0.interpolate_to_theta(&grid.theta);
            self.nabla_r2.interpolate_to_theta(&grid.theta);
            self.fixed = Some(grid);
        }

        // Field extrema from the reference angles supplied with the data.
        let eval_extrema = |q: &FluxSurfaceQuantity, angles: &[f64], fg: FluxGrid| {
            angles
                .iter()
                .enumerate()
                .map(|(ir, &t)| q.evaluate_at_theta(ir, t, fg))
                .collect::<Vec<f64>>()
        };
        self.bmin = eval_extrema(&self.b, &self.theta_bmin, FluxGrid::Distribution);
        self.bmax = eval_extrema(&self.b, &self.theta_bmax, FluxGrid::Distribution);
        self.bmin_f = eval_extrema(&self.b, &self.theta_bmin_f, FluxGrid::Radial);
        self.bmax_f = eval_extrema(&self.b, &self.theta_bmax_f, FluxGrid::Radial);
        for ir in 0..self.nr {
            if self.bmin[ir] > self.bmax[ir] {
                return Err(KineticError::Geometry {
                    message: format!(
                        "B_min = {} exceeds B_max = {}",
                        self.bmin[ir], self.bmax[ir]
                    ),
                    ir,
                    xi0: f64::NAN,
                });
            }
        }

        // V' on both radial grids from the unity integral.
        self.vp_vol = (0..self.nr)
            .map(|ir| self.evaluate_flux_surface_integral(ir, FluxGrid::Distribution, |_, _, _| 1.0))
            .collect::<KineticResult<Vec<f64>>>()?;
        self.vp_vol_f = (0..=self.nr)
            .map(|ir| self.evaluate_flux_surface_integral(ir, FluxGrid::Radial, |_, _, _| 1.0))
            .collect::<KineticResult<Vec<f64>>>()?;
        Ok(())
    }

    /// Recompute every dependent cache (after new reference data has
    /// been installed via `new`) and publish the per-surface scalars.
    pub fn rebuild(&mut self, grid: &mut RadialGrid) -> KineticResult<()> {
        self.build()?;
        self.publish_to(grid)
    }

    /// The explicit publish step: hand the geometric arrays to their
    /// owner.
    pub fn publish_to(&self, grid: &mut RadialGrid) -> KineticResult<()> {
        let mut fsa_inv_r2 = Vec::with_capacity(self.nr);
        let mut fsa_nabla_r2_over_r2 = Vec::with_capacity(self.nr);
        let mut fsa_b2 = Vec::with_capacity(self.nr);
        let mut eff_pass_frac = Vec::with_capacity(self.nr);
        let mut xi_trapped = Vec::with_capacity(self.nr);
        for ir in 0..self.nr {
            fsa_inv_r2.push(self.calculate_flux_surface_average(
                ir,
                FluxGrid::Distribution,
                |_, r, _| 1.0 / (r * r),
            )?);
            fsa_nabla_r2_over_r2.push(self.calculate_flux_surface_average(
                ir,
                FluxGrid::Distribution,
                |_, r, n| n / (r * r),
            )?);
            let bmin = self.bmin[ir];
            fsa_b2.push(
                bmin * bmin
                    * self.calculate_flux_surface_average(ir, FluxGrid::Distribution, |b, _, _| {
                        b * b
                    })?,
            );
            eff_pass_frac.push(self.effective_passing_fraction(ir)?);
            let ratio = if self.bmax[ir] == 0.0 {
                1.0
            } else {
                self.bmin[ir] / self.bmax[ir]
            };
            xi_trapped.push((1.0 - ratio).max(0.0).sqrt());
        }

        grid.publish(GeometryPublication {
            vp_vol: self.vp_vol.clone(),
            vp_vol_f: self.vp_vol_f.clone(),
            bmin: self.bmin.clone(),
            bmin_f: self.bmin_f.clone(),
            bmax: self.bmax.clone(),
            bmax_f: self.bmax_f.clone(),
            btor_g: self.btor_g_over_r0.clone(),
            btor_g_f: self.btor_g_over_r0_f.clone(),
            fsa_inv_r2,
            fsa_nabla_r2_over_r2,
            fsa_b2,
            eff_pass_frac,
            xi_trapped,
        });
        Ok(())
    }

    pub fn nr(&self) -> usize {
        self.nr
    }

    pub fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    pub fn r0(&self) -> f64 {
        self.r0
    }

    pub fn settings(&self) -> &AveragerSettings {
        &self.settings
    }

    /// The fixed θ-grid, when not in adaptive mode.
    pub fn theta_grid(&self) -> Option<&ThetaGrid> {
        self.fixed.as_ref()
    }

    pub fn b_quantity(&self) -> &FluxSurfaceQuantity {
        &self.b
    }

    pub fn jacobian_quantity(&self) -> &FluxSurfaceQuantity {
        &self.jacobian
    }

    pub fn r_over_r0_quantity(&self) -> &FluxSurfaceQuantity {
        &self.r_over_r0
    }

    pub fn nabla_r2_quantity(&self) -> &FluxSurfaceQuantity {
        &self.nabla_r2
    }

    pub fn bmin_on(&self, ir: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.bmin_f[ir],
            _ => self.bmin[ir],
        }
    }

    pub fn bmax_on(&self, ir: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.bmax_f[ir],
            _ => self.bmax[ir],
        }
    }

    pub fn theta_bmin_on(&self, ir: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.theta_bmin_f[ir],
            _ => self.theta_bmin[ir],
        }
    }

    pub fn theta_bmax_on(&self, ir: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.theta_bmax_f[ir],
            _ => self.theta_bmax[ir],
        }
    }

    pub fn vp_vol_on(&self, ir: usize, fg: FluxGrid) -> f64 {
        match fg {
            FluxGrid::Radial => self.vp_vol_f[ir],
            _ => self.vp_vol[ir],
        }
    }

    /// ∫ 2π J F(B/B_min, R/R₀, |∇r|²) dθ over the surface.
    pub fn evaluate_flux_surface_integral<F>(
        &self,
        ir: usize,
        fg: FluxGrid,
        f: F,
    ) -> KineticResult<f64>
    where
        F: Fn(f64, f64, f64) -> f64,
    {
        let bmin = self.bmin_on(ir, fg);
        let bmax = self.bmax_on(ir, fg);
        let bmin_eq_bmax = bmin == bmax;

        if let Some(grid) = &self.fixed {
            let b = self.b.node_data(ir, fg)?;
            let jac = self.jacobian.node_data(ir, fg)?;
            let r = self.r_over_r0.node_data(ir, fg)?;
            let n = self.nabla_r2.node_data(ir, fg)?;
            let mut integral = 0.0;
            for (it, &w) in grid.weights.iter().enumerate() {
                let b_over_bmin = if bmin_eq_bmax { 1.0 } else { b[it] / bmin };
                integral += TAU * w * jac[it] * f(b_over_bmin, r[it], n[it]);
            }
            Ok(integral)
        } else {
            let integrand = |theta: f64| {
                let b = self.b.evaluate_at_theta(ir, theta, fg);
                let jac = self.jacobian.evaluate_at_theta(ir, theta, fg);
                let r = self.r_over_r0.evaluate_at_theta(ir, theta, fg);
                let n = self.nabla_r2.evaluate_at_theta(ir, theta, fg);
                let b_over_bmin = if b == bmin || bmin_eq_bmax { 1.0 } else { b / bmin };
                TAU * jac * f(b_over_bmin, r, n)
            };
            let integral = integrate_adaptive(integrand, 0.0, self.theta_max, EPSREL_FSA)?;
            Ok(if self.symmetric { 2.0 * integral } else { integral })
        }
    }

    /// ⟨F⟩ = flux-surface integral / V'. On a degenerate surface
    /// (V' = 0) orbit parameters are constant and ⟨F⟩ = F(1,1,1).
    pub fn calculate_flux_surface_average<F>(
        &self,
        ir: usize,
        fg: FluxGrid,
        f: F,
    ) -> KineticResult<f64>
    where
        F: Fn(f64, f64, f64) -> f64,
    {
        let vp_vol = self.vp_vol_on(ir, fg);
        // Cylindrical surfaces collapse to the identity exactly, not
        // just to quadrature accuracy.
        if vp_vol == 0.0 || self.bmin_on(ir, fg) == self.bmax_on(ir, fg) {
            return Ok(f(1.0, 1.0, 1.0));
        }
        Ok(self.evaluate_flux_surface_integral(ir, fg, f)? / vp_vol)
    }

    /// Bounce integral ∫ 2π J (√g/p²) F(ξ/ξ₀, B/B_min, R/R₀, |∇r|²) dθ
    /// at arbitrary (p, ξ₀), by adaptive quadrature.
    ///
    /// Trapped particles fold in the −ξ₀ contribution (negative-pitch
    /// trapped particles are described by their positive-ξ₀
    /// counterpart, so ξ₀ < 0 returns 0), and integrands with a
    /// non-zero trapped boundary value use the inverse-square-root
    /// endpoint rule.
    pub fn evaluate_p_xi_bounce_integral_at_p<F>(
        &self,
        ir: usize,
        _p: f64,
        xi0: f64,
        fg: FluxGrid,
        f: F,
    ) -> KineticResult<f64>
    where
        F: Fn(f64, f64, f64, f64) -> f64,
    {
        let bmin = self.bmin_on(ir, fg);
        let bmax = self.bmax_on(ir, fg);
        let bmin_over_bmax = if bmin == bmax { 1.0 } else { bmin / bmax };

        let is_trapped = (1.0 - xi0 * xi0) > bmin_over_bmax;
        if is_trapped {
            if xi0 < 0.0 {
                return Ok(0.0);
            }
            let (theta_b1, theta_b2) = find_bounce_points(
                ir,
                xi0,
                bmin,
                self.theta_bmin_on(ir, fg),
                self.theta_bmax_on(ir, fg),
                &self.b,
                fg,
            )?;
            if theta_b1 == theta_b2 {
                return Ok(0.0);
            }
            let f_eff = |x: f64, y: f64, z: f64, w: f64| f(x, y, z, w) + f(-x, y, z, w);

            if f_eff(0.0, 1.0, 1.0, 1.0) != 0.0 {
                // Metric ∝ 1/ξ at the bounce points; the regularised
                // integrand carries √((θ−θ_b1)(θ_b2−θ)/ξ²), finite at
                // both ends.
                integrate_sqrt_singular(
                    |theta| {
                        self.bounce_integrand_regularised(
                            ir, xi0, fg, bmin, theta, theta_b1, theta_b2, &f_eff,
                        )
                    },
                    theta_b1,
                    theta_b2,
                    EPSREL_BOUNCE,
                )
            } else {
                integrate_adaptive(
                    |theta| self.bounce_integrand(ir, xi0, fg, bmin, theta, &f_eff),
                    theta_b1,
                    theta_b2,
                    EPSREL_BOUNCE,
                )
            }
        } else {
            integrate_adaptive(
                |theta| self.bounce_integrand(ir, xi0, fg, bmin, theta, &f),
                0.0,
                TAU,
                EPSREL_BOUNCE,
            )
        }
    }

    /// Bounce average {F} = bounce integral / V'_p. V'_p = 0 covers the
    /// degenerate surface and the infinitely-deeply-trapped ξ₀ = 0
    /// particle, both defined as F(1,1,1,1).
    pub fn calculate_p_xi_bounce_average_at_p<F>(
        &self,
        ir: usize,
        p: f64,
        xi0: f64,
        fg: FluxGrid,
        f: F,
    ) -> KineticResult<f64>
    where
        F: Fn(f64, f64, f64, f64) -> f64,
    {
        if self.bmin_on(ir, fg) == self.bmax_on(ir, fg) {
            return Ok(f(1.0, 1.0, 1.0, 1.0));
        }
        let vp = self.evaluate_p_xi_bounce_integral_at_p(ir, p, xi0, fg, |_, _, _, _| 1.0)?;
        if vp == 0.0 {
            return Ok(f(1.0, 1.0, 1.0, 1.0));
        }
        Ok(self.evaluate_p_xi_bounce_integral_at_p(ir, p, xi0, fg, f)? / vp)
    }

    /// Effective passing fraction
    /// (3/4)·⟨(B/B_max)²⟩·∫₀¹ λ dλ / ⟨√(1−λ B/B_max)⟩.
    pub fn effective_passing_fraction(&self, ir: usize) -> KineticResult<f64> {
        let bmin = self.bmin[ir];
        let bmax = self.bmax[ir];
        if bmin == bmax {
            return Ok(1.0);
        }
        let h = bmin / bmax; // B/B_max = (B/B_min)·h
        let b2 = self.calculate_flux_surface_average(ir, FluxGrid::Distribution, |b, _, _| {
            (b * h) * (b * h)
        })?;
        let lambda_integral = integrate_adaptive(
            |lam| {
                let denom = self
                    .calculate_flux_surface_average(ir, FluxGrid::Distribution, |b, _, _| {
                        (1.0 - lam * b * h).max(0.0).sqrt()
                    })
                    .unwrap_or(f64::NAN);
                lam / denom
            },
            0.0,
            1.0,
            EPSREL_FSA,
        )?;
        Ok(0.75 * b2 * lambda_integral)
    }

    fn quantities_at(&self, ir: usize, theta: f64, fg: FluxGrid) -> (f64, f64, f64, f64) {
        (
            self.b.evaluate_at_theta(ir, theta, fg),
            self.jacobian.evaluate_at_theta(ir, theta, fg),
            self.r_over_r0.evaluate_at_theta(ir, theta, fg),
            self.nabla_r2.evaluate_at_theta(ir, theta, fg),
        )
    }

    fn bounce_integrand<F>(
        &self,
        ir: usize,
        xi0: f64,
        fg: FluxGrid,
        bmin: f64,
        theta: f64,
        f: &F,
    ) -> f64
    where
        F: Fn(f64, f64, f64, f64) -> f64,
    {
        let (b, jac, r, n) = self.quantities_at(ir, theta, fg);
        let (b_over_bmin, xi_over_xi0) = if b == bmin {
            (1.0, 1.0)
        } else {
            let b_over_bmin = b / bmin;
            let xi_sq = 1.0 - b_over_bmin * (1.0 - xi0 * xi0);
            if xi_sq < 0.0 {
                return 0.0;
            }
            (b_over_bmin, (xi_sq / (xi0 * xi0)).sqrt())
        };
        let sqrt_g = p_xi_metric_over_p2(xi0, b_over_bmin);
        if !sqrt_g.is_finite() {
            return 0.0;
        }
        TAU * jac * sqrt_g * f(xi_over_xi0, b_over_bmin, r, n)
    }

    /// The trapped integrand with the 1/√((θ−θ_b1)(θ_b2−θ)) weight
    /// factored out analytically.
    #[allow(clippy::too_many_arguments)]
    fn bounce_integrand_regularised<F>(
        &self,
        ir: usize,
        xi0: f64,
        fg: FluxGrid,
        bmin: f64,
        theta: f64,
        theta_b1: f64,
        theta_b2: f64,
        f: &F,
    ) -> f64
    where
        F: Fn(f64, f64, f64, f64) -> f64,
    {
        let (b, jac, r, n) = self.quantities_at(ir, theta, fg);
        if b == bmin {
            // Homogeneous stretch of field: no singularity here.
            let weight = ((theta - theta_b1) * (theta_b2 - theta)).max(0.0).sqrt();
            return TAU * jac * weight * f(1.0, 1.0, r, n);
        }
        let b_over_bmin = b / bmin;
        let xi_sq = 1.0 - b_over_bmin * (1.0 - xi0 * xi0);
        if xi_sq <= 0.0 {
            return 0.0;
        }
        let xi_over_xi0 = (xi_sq / (xi0 * xi0)).sqrt();
        // √g·√((θ−θ_b1)(θ_b2−θ)) with the 1/ξ divergence cancelled
        // inside a single square root.
        let regular = b_over_bmin
            * xi0.abs()
            * ((theta - theta_b1) * (theta_b2 - theta) / xi_sq).max(0.0).sqrt();
        TAU * jac * regular * f(xi_over_xi0, b_over_bmin, r, n)
    }
}
