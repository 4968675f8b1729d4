// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Collision Quantity Cache
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Shared cache plumbing of the collision quantities: the four
//! grid-variant tables and the invalidation bookkeeping.
//!
//! A collision quantity lives on all four grid variants at once. The
//! variants differ only in which array slice and row count they
//! address, so one generic container dispatched on the `FluxGrid` tag
//! replaces four parallel code paths.

use ndarray::Array2;
use runaway_geometry::momentum::PXiGrid;
use runaway_types::error::KineticResult;
use runaway_types::settings::FluxGrid;
use runaway_types::unknowns::{names, UnknownQuantityHandler};

/// ν tables on {cell, radial-face, p1-face, p2-face}.
#[derive(Debug, Clone, Default)]
pub struct VariantTables {
    dist: Array2<f64>,
    radial: Array2<f64>,
    p1: Array2<f64>,
    p2: Array2<f64>,
}

impl VariantTables {
    /// Allocate zeroed tables for the given radial size and momentum
    /// grid.
    pub fn zeros(nr: usize, pxi: &PXiGrid) -> Self {
        let make = |fg: FluxGrid| Array2::zeros((fg.n_radial(nr), pxi.table_len(fg)));
        VariantTables {
            dist: make(FluxGrid::Distribution),
            radial: make(FluxGrid::Radial),
            p1: make(FluxGrid::P1),
            p2: make(FluxGrid::P2),
        }
    }

    pub fn table(&self, fg: FluxGrid) -> &Array2<f64> {
        match fg {
            FluxGrid::Distribution => &self.dist,
            FluxGrid::Radial => &self.radial,
            FluxGrid::P1 => &self.p1,
            FluxGrid::P2 => &self.p2,
        }
    }

    pub fn table_mut(&mut self, fg: FluxGrid) -> &mut Array2<f64> {
        match fg {
            FluxGrid::Distribution => &mut self.dist,
            FluxGrid::Radial => &mut self.radial,
            FluxGrid::P1 => &mut self.p1,
            FluxGrid::P2 => &mut self.p2,
        }
    }

    /// Value at (ir, i, j) on the variant; the caller supplies the
    /// matching momentum grid for the column stride.
    pub fn value(&self, fg: FluxGrid, pxi: &PXiGrid, ir: usize, i: usize, j: usize) -> f64 {
        let (n1, _) = pxi.table_dims(fg);
        self.table(fg)[[ir, j * n1 + i]]
    }

    pub fn is_allocated(&self) -> bool {
        self.dist.len() > 0
    }
}

/// Invalidation bookkeeping shared by every collision quantity: a
/// grid-rebuilt flag plus the plasma-state change test.
#[derive(Debug, Clone)]
pub struct RebuildTracker {
    grid_rebuilt: bool,
}

impl Default for RebuildTracker {
    fn default() -> Self {
        // A fresh quantity has never seen the grid.
        RebuildTracker { grid_rebuilt: true }
    }
}

impl RebuildTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal that the grid was rebuilt and constant terms must be
    /// recomputed.
    pub fn grid_rebuilt(&mut self) {
        self.grid_rebuilt = true;
    }

    pub fn takes_grid_rebuild(&mut self) -> bool {
        std::mem::take(&mut self.grid_rebuilt)
    }

    pub fn pending_grid_rebuild(&self) -> bool {
        self.grid_rebuilt
    }

    /// True when the plasma state feeding the collision quantities has
    /// changed: n_cold, n_i or T_cold.
    pub fn plasma_changed(&self, unknowns: &UnknownQuantityHandler) -> KineticResult<bool> {
        Ok(unknowns.has_changed(unknowns.require(names::N_COLD)?)
            || unknowns.has_changed(unknowns.require(names::ION_SPECIES)?)
            || unknowns.has_changed(unknowns.require(names::T_COLD)?))
    }

    /// The rebuild predicate: grid rebuilt or plasma changed.
    pub fn needs_rebuild(&self, unknowns: &UnknownQuantityHandler) -> KineticResult<bool> {
        Ok(self.grid_rebuilt || self.plasma_changed(unknowns)?)
    }
}
