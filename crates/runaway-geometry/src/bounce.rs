// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Bounce Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Bounce points and per-cell bounce grids.
//!
//! A trapped particle with pitch ξ₀ mirrors where
//! ξ²(θ) = 1 − (1−ξ₀²)·B(θ)/B_min crosses zero. The two crossings
//! bracket the orbit: θ_b2 lies between the field extrema, θ_b1 on the
//! other side of the minimum. The tables pre-evaluate, for every
//! momentum-grid cell of every flux surface, the trapped flag, the
//! bounce angles, the bounce-node metric and the bounce integral of
//! unity V'_p.

use crate::averager::FluxSurfaceAverager;
use crate::flux_quantity::FluxSurfaceQuantity;
use crate::momentum::{p_xi_metric_over_p2, PXiGrid};
use runaway_math::quadrature::FixedRule;
use runaway_math::roots::brent_root;
use runaway_types::error::{KineticError, KineticResult};
use runaway_types::settings::FluxGrid;
use std::f64::consts::TAU;

/// Relative tolerance of the bounce-point root solve.
const BOUNCE_ROOT_TOL: f64 = 1e-6;
/// Hard iteration cap of the bounce-point root solve.
const BOUNCE_ROOT_MAX_ITER: usize = 50;

/// Locate the bounce angles θ_b1 < θ_b2 of a trapped particle.
///
/// θ_b2 is bracketed in [θ_Bmin, θ_Bmax] and θ_b1 in
/// [θ_Bmax − 2π, θ_Bmin]; the root direction is resolved by the sign of
/// ξ² at the final bracket endpoints, picking the endpoint on the
/// ξ² ≥ 0 side. A bracket with neither endpoint valid is a geometry
/// error.
pub fn find_bounce_points(
    ir: usize,
    xi0: f64,
    bmin: f64,
    theta_bmin: f64,
    theta_bmax: f64,
    b: &FluxSurfaceQuantity,
    fg: FluxGrid,
) -> KineticResult<(f64, f64)> {
    let xi_sq = |theta: f64| 1.0 - (1.0 - xi0 * xi0) * b.evaluate_at_theta(ir, theta, fg) / bmin;

    let pick = |root: runaway_math::roots::Root| -> KineticResult<f64> {
        if xi_sq(root.lower) >= 0.0 {
            Ok(root.lower)
        } else if xi_sq(root.upper) >= 0.0 {
            Ok(root.upper)
        } else {
            Err(KineticError::Geometry {
                message: "unable to find valid bounce-point root".into(),
                ir,
                xi0,
            })
        }
    };

    let root2 = brent_root(
        xi_sq,
        theta_bmin,
        theta_bmax,
        BOUNCE_ROOT_TOL,
        BOUNCE_ROOT_MAX_ITER,
        "bounce point theta_b2",
    )?;
    let theta_b2 = pick(root2)?;

    let root1 = brent_root(
        xi_sq,
        theta_bmax - TAU,
        theta_bmin,
        BOUNCE_ROOT_TOL,
        BOUNCE_ROOT_MAX_ITER,
        "bounce point theta_b1",
    )?;
    let theta_b1 = pick(root1)?;

    Ok((theta_b1, theta_b2))
}

/// One momentum-grid cell's orbit geometry on one flux surface.
#[derive(Debug, Clone)]
pub struct CellOrbit {
    pub trapped: bool,
    pub xi0: f64,
    pub theta_b1: f64,
    pub theta_b2: f64,
    /// θ nodes: the surface quadrature grid for passing cells, the
    /// bounce grid for trapped ones.
    pub theta: Vec<f64>,
    pub weights: Vec<f64>,
    /// J·√g/p² at the nodes.
    pub metric: Vec<f64>,
    pub b_over_bmin: Vec<f64>,
    pub r_over_r0: Vec<f64>,
    pub nabla_r2: Vec<f64>,
    /// Bounce integral of unity (per p²); zero measure for the ξ₀ = 0
    /// orbit.
    pub vp: f64,
}

/// Bounce-geometry tables for one grid variant.
#[derive(Debug, Clone)]
pub struct BounceTable {
    fg: FluxGrid,
    n1: usize,
    n2: usize,
    /// cells[ir][j*n1 + i]
    cells: Vec<Vec<CellOrbit>>,
}

impl BounceTable {
    /// Build the table for `fg` from the averager's fixed quadrature
    /// and the shared momentum grid. Requires fixed-quadrature mode.
    pub fn build(
        averager: &FluxSurfaceAverager,
        pxi: &PXiGrid,
        fg: FluxGrid,
    ) -> KineticResult<BounceTable> {
        let surface_grid = averager.theta_grid().ok_or_else(|| {
            KineticError::Usage("bounce tables require a fixed quadrature".into())
        })?;
        let (n1, n2) = pxi.table_dims(fg);
        let n_radial = fg.n_radial(averager.nr());
        let n_nodes = surface_grid.theta.len();

        // Reference Gauss-Legendre nodes on [0, 1] for the bounce grids.
        let gl = FixedRule::gauss_legendre(n_nodes, 0.0, 1.0)?;

        let mut cells = Vec::with_capacity(n_radial);
        for ir in 0..n_radial {
            let bmin = averager.bmin_on(ir, fg);
            let bmax = averager.bmax_on(ir, fg);
            let bmin_over_bmax = if bmin == bmax { 1.0 } else { bmin / bmax };
            let mut row = Vec::with_capacity(n1 * n2);
            for j in 0..n2 {
                for i in 0..n1 {
                    let (_, xi0) = pxi.coords(i, j, fg);
                    let trapped = (1.0 - xi0 * xi0) > bmin_over_bmax;
                    let orbit = if trapped {
                        Self::trapped_orbit(averager, &gl, ir, xi0, bmin, fg)?
                    } else {
                        Self::passing_orbit(averager, surface_grid, ir, xi0, bmin, fg)?
                    };
                    row.push(orbit);
                }
            }
            cells.push(row);
        }

        Ok(BounceTable { fg, n1, n2, cells })
    }

    fn passing_orbit(
        averager: &FluxSurfaceAverager,
        grid: &crate::averager::ThetaGrid,
        ir: usize,
        xi0: f64,
        bmin: f64,
        fg: FluxGrid,
    ) -> KineticResult<CellOrbit> {
        let b = averager.b_quantity().node_data(ir, fg)?;
        let jac = averager.jacobian_quantity().node_data(ir, fg)?;
        let r = averager.r_over_r0_quantity().node_data(ir, fg)?;
        let n = averager.nabla_r2_quantity().node_data(ir, fg)?;

        let mut orbit = CellOrbit {
            trapped: false,
            xi0,
            theta_b1: 0.0,
            theta_b2: TAU,
            theta: grid.theta.clone(),
            weights: grid.weights.clone(),
            metric: Vec::with_capacity(b.len()),
            b_over_bmin: Vec::with_capacity(b.len()),
            r_over_r0: r.to_vec(),
            nabla_r2: n.to_vec(),
            vp: 0.0,
        };
        for (it, &bv) in b.iter().enumerate() {
            let b_over_bmin = if bv == bmin { 1.0 } else { bv / bmin };
            let m = p_xi_metric_over_p2(xi0, b_over_bmin);
            let m = if m.is_finite() { m * jac[it] } else { 0.0 };
            orbit.b_over_bmin.push(b_over_bmin);
            orbit.metric.push(m);
        }
        orbit.vp = orbit
            .weights
            .iter()
            .zip(&orbit.metric)
            .map(|(&w, &m)| TAU * w * m)
            .sum();
        Ok(orbit)
    }

    fn trapped_orbit(
        averager: &FluxSurfaceAverager,
        gl: &FixedRule,
        ir: usize,
        xi0: f64,
        bmin: f64,
        fg: FluxGrid,
    ) -> KineticResult<CellOrbit> {
        if xi0 <= 0.0 {
            // ξ₀ < 0 is represented by its positive counterpart; ξ₀ = 0
            // is the zero-measure deeply trapped orbit.
            return Ok(CellOrbit {
                trapped: true,
                xi0,
                theta_b1: 0.0,
                theta_b2: 0.0,
                theta: Vec::new(),
                weights: Vec::new(),
                metric: Vec::new(),
                b_over_bmin: Vec::new(),
                r_over_r0: Vec::new(),
                nabla_r2: Vec::new(),
                vp: 0.0,
            });
        }

        let (theta_b1, theta_b2) = find_bounce_points(
            ir,
            xi0,
            bmin,
            averager.theta_bmin_on(ir, fg),
            averager.theta_bmax_on(ir, fg),
            averager.b_quantity(),
            fg,
        )?;

        let n_nodes = gl.nodes.len();
        let mut orbit = CellOrbit {
            trapped: true,
            xi0,
            theta_b1,
            theta_b2,
            theta: Vec::with_capacity(n_nodes),
            weights: Vec::with_capacity(n_nodes),
            metric: Vec::with_capacity(n_nodes),
            b_over_bmin: Vec::with_capacity(n_nodes),
            r_over_r0: Vec::with_capacity(n_nodes),
            nabla_r2: Vec::with_capacity(n_nodes),
            vp: 0.0,
        };
        if theta_b1 == theta_b2 {
            return Ok(orbit);
        }

        // Up–down-symmetric surfaces use [0, θ_b2] with doubled
        // weights; otherwise the nodes map linearly onto [θ_b1, θ_b2].
        for (&x, &w) in gl.nodes.iter().zip(&gl.weights) {
            let (theta, weight) = if averager.is_symmetric() {
                (theta_b2 * x, 2.0 * theta_b2 * w)
            } else {
                (theta_b1 + (theta_b2 - theta_b1) * x, (theta_b2 - theta_b1) * w)
            };
            let b = averager.b_quantity().evaluate_at_theta(ir, theta, fg);
            let jac = averager.jacobian_quantity().evaluate_at_theta(ir, theta, fg);
            let b_over_bmin = if b == bmin { 1.0 } else { b / bmin };
            let xi_sq = 1.0 - b_over_bmin * (1.0 - xi0 * xi0);
            let m = if xi_sq > 0.0 {
                jac * p_xi_metric_over_p2(xi0, b_over_bmin)
            } else {
                0.0
            };
            orbit.theta.push(theta);
            orbit.weights.push(weight);
            orbit.metric.push(m);
            orbit.b_over_bmin.push(b_over_bmin);
            orbit
                .r_over_r0
                .push(averager.r_over_r0_quantity().evaluate_at_theta(ir, theta, fg));
            orbit
                .nabla_r2
                .push(averager.nabla_r2_quantity().evaluate_at_theta(ir, theta, fg));
        }
        orbit.vp = Self::integral_over(&orbit, &|_, _, _, _| 1.0);
        Ok(orbit)
    }

    fn integral_over<F>(orbit: &CellOrbit, f: &F) -> f64
    where
        F: Fn(f64, f64, f64, f64) -> f64,
    {
        let xi0_sq = orbit.xi0 * orbit.xi0;
        let mut sum = 0.0;
        for (it, &w) in orbit.weights.iter().enumerate() {
            let b = orbit.b_over_bmin[it];
            let xi_sq = 1.0 - b * (1.0 - xi0_sq);
            let xi_over_xi0 = if xi_sq <= 0.0 || xi0_sq == 0.0 {
                0.0
            } else {
                (xi_sq / xi0_sq).sqrt()
            };
            let val = if orbit.trapped {
                f(xi_over_xi0, b, orbit.r_over_r0[it], orbit.nabla_r2[it])
                    + f(-xi_over_xi0, b, orbit.r_over_r0[it], orbit.nabla_r2[it])
            } else {
                f(xi_over_xi0, b, orbit.r_over_r0[it], orbit.nabla_r2[it])
            };
            sum += TAU * w * orbit.metric[it] * val;
        }
        sum
    }

    pub fn flux_grid(&self) -> FluxGrid {
        self.fg
    }

    pub fn cell(&self, ir: usize, i: usize, j: usize) -> &CellOrbit {
        &self.cells[ir][j * self.n1 + i]
    }

    pub fn is_trapped(&self, ir: usize, i: usize, j: usize) -> bool {
        self.cell(ir, i, j).trapped
    }

    /// V'_p of the cell (per p²).
    pub fn vp(&self, ir: usize, i: usize, j: usize) -> f64 {
        self.cell(ir, i, j).vp
    }

    /// Bounce integral of F over the cell's pre-evaluated nodes.
    pub fn bounce_integral<F>(&self, ir: usize, i: usize, j: usize, f: F) -> f64
    where
        F: Fn(f64, f64, f64, f64) -> f64,
    {
        Self::integral_over(self.cell(ir, i, j), &f)
    }

    /// Bounce average {F} = bounce integral / V'_p, with the V'_p = 0
    /// identity fallback.
    pub fn bounce_average<F>(&self, ir: usize, i: usize, j: usize, f: F) -> f64
    where
        F: Fn(f64, f64, f64, f64) -> f64,
    {
        let orbit = self.cell(ir, i, j);
        if orbit.vp == 0.0 {
            return f(1.0, 1.0, 1.0, 1.0);
        }
        Self::integral_over(orbit, &f) / orbit.vp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytic_field::{circular_tokamak, uniform_radii};
    use runaway_types::settings::AveragerSettings;

    fn averager(symmetric: bool) -> FluxSurfaceAverager {
        let (r, r_f) = uniform_radii(3, 0.6);
        let field = circular_tokamak(&r, &r_f, 3.0, 1.0, 129, symmetric);
        FluxSurfaceAverager::new(field, AveragerSettings::default()).unwrap()
    }

    #[test]
    fn test_bounce_points_bracket_field_minimum() {
        let avg = averager(false);
        let ir = 2;
        let bmin = avg.bmin_on(ir, FluxGrid::Distribution);
        let bmax = avg.bmax_on(ir, FluxGrid::Distribution);
        let xi_t = (1.0 - bmin / bmax).sqrt();
        let xi0 = 0.5 * xi_t;
        let (b1, b2) = find_bounce_points(
            ir,
            xi0,
            bmin,
            avg.theta_bmin_on(ir, FluxGrid::Distribution),
            avg.theta_bmax_on(ir, FluxGrid::Distribution),
            avg.b_quantity(),
            FluxGrid::Distribution,
        )
        .unwrap();
        assert!(b1 < 0.0 && b2 > 0.0, "bounce points ({b1}, {b2})");
        // ξ² positive at the minimum, negative outside the orbit.
        let xi_sq = |t: f64| {
            1.0 - (1.0 - xi0 * xi0)
                * avg.b_quantity().evaluate_at_theta(ir, t, FluxGrid::Distribution)
                / bmin
        };
        assert!(xi_sq(0.5 * (b1 + b2)) > 0.0);
        assert!(xi_sq(b2 + 0.1) < 0.0);
    }

    #[test]
    fn test_symmetric_bounce_points_mirror() {
        let avg = averager(true);
        let ir = 2;
        let bmin = avg.bmin_on(ir, FluxGrid::Distribution);
        let bmax = avg.bmax_on(ir, FluxGrid::Distribution);
        let xi0 = 0.5 * (1.0 - bmin / bmax).sqrt();
        let (b1, b2) = find_bounce_points(
            ir,
            xi0,
            bmin,
            avg.theta_bmin_on(ir, FluxGrid::Distribution),
            avg.theta_bmax_on(ir, FluxGrid::Distribution),
            avg.b_quantity(),
            FluxGrid::Distribution,
        )
        .unwrap();
        assert!((b1 + b2).abs() < 1e-4, "mirror symmetry: ({b1}, {b2})");
    }

    #[test]
    fn test_table_trapped_classification() {
        let avg = averager(true);
        let pxi = PXiGrid::uniform(4, 2.0, 10).unwrap();
        let table = BounceTable::build(&avg, &pxi, FluxGrid::Distribution).unwrap();
        let ir = 2;
        let bmin = avg.bmin_on(ir, FluxGrid::Distribution);
        let bmax = avg.bmax_on(ir, FluxGrid::Distribution);
        for j in 0..pxi.np2() {
            let xi0 = pxi.xi0(j);
            let expect = (1.0 - xi0 * xi0) > bmin / bmax;
            assert_eq!(table.is_trapped(ir, 0, j), expect, "xi0 = {xi0}");
        }
    }

    #[test]
    fn test_table_unity_average() {
        let avg = averager(true);
        let pxi = PXiGrid::uniform(3, 2.0, 8).unwrap();
        let table = BounceTable::build(&avg, &pxi, FluxGrid::Distribution).unwrap();
        for ir in 0..3 {
            for j in 0..pxi.np2() {
                let one = table.bounce_average(ir, 0, j, |_, _, _, _| 1.0);
                assert!((one - 1.0).abs() < 1e-12, "{{1}} = {one} at ir={ir}, j={j}");
            }
        }
    }

    #[test]
    fn test_table_vp_matches_adaptive() {
        let avg = averager(true);
        let pxi = PXiGrid::uniform(3, 2.0, 8).unwrap();
        let table = BounceTable::build(&avg, &pxi, FluxGrid::Distribution).unwrap();
        let ir = 1;
        for j in 0..pxi.np2() {
            let xi0 = pxi.xi0(j);
            let direct = avg
                .evaluate_p_xi_bounce_integral_at_p(ir, 1.0, xi0, FluxGrid::Distribution, |_, _, _, _| 1.0)
                .unwrap();
            let tabled = table.vp(ir, 0, j);
            if xi0 < 0.0 && table.is_trapped(ir, 0, j) {
                assert_eq!(tabled, 0.0);
                continue;
            }
            // Trapped orbits carry the 1/√ endpoint singularity of the
            // metric; the fixed Legendre bounce grid resolves it only
            // slowly, so allow a looser comparison there.
            let tol = if table.is_trapped(ir, 0, j) { 0.1 } else { 3e-3 };
            assert!(
                (direct - tabled).abs() <= tol * direct.abs().max(1e-300),
                "vp mismatch at xi0={xi0}: adaptive {direct}, fixed {tabled}"
            );
        }
    }

    #[test]
    fn test_p2_variant_has_face_rows() {
        let avg = averager(true);
        let pxi = PXiGrid::uniform(3, 2.0, 4).unwrap();
        let table = BounceTable::build(&avg, &pxi, FluxGrid::P2).unwrap();
        // ξ₀ face at exactly -1, 0, 1 exist on this variant.
        assert!(table.cell(0, 0, 0).vp.is_finite());
        let mid = table.cell(1, 0, 2); // xi0_f = 0
        assert_eq!(mid.vp, 0.0, "deeply trapped face cell has zero measure");
    }
}
