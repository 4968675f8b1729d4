// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Ion Handler
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Ion-species accounting consumed by the collision frequencies and the
//! runaway-rate models.
//!
//! Densities are stored per (species, charge state, radius) in the same
//! flattened layout as the `n_i` unknown quantity: charge states of
//! species 0 first (Z₀ = 0..Z), then species 1, each block of length nr.

use crate::error::{KineticError, KineticResult};

#[derive(Debug, Clone)]
pub struct IonSpecies {
    pub name: String,
    /// Nuclear charge number.
    pub z: usize,
}

/// Species list plus per-charge-state densities on the radial grid.
#[derive(Debug, Clone)]
pub struct IonHandler {
    species: Vec<IonSpecies>,
    nr: usize,
    /// Total number of charge states, Σ (Z+1).
    nzs: usize,
    /// Flattened [nzs][nr] densities (1/m³).
    densities: Vec<f64>,
    /// Offset of each species' Z₀=0 entry in the charge-state index.
    offsets: Vec<usize>,
}

impl IonHandler {
    pub fn new(species: Vec<IonSpecies>, nr: usize) -> Self {
        let mut offsets = Vec::with_capacity(species.len());
        let mut nzs = 0;
        for s in &species {
            offsets.push(nzs);
            nzs += s.z + 1;
        }
        IonHandler {
            species,
            nr,
            nzs,
            densities: vec![0.0; nzs * nr],
            offsets,
        }
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Total number of charge states across all species.
    pub fn n_charge_states(&self) -> usize {
        self.nzs
    }

    pub fn nr(&self) -> usize {
        self.nr
    }

    pub fn z(&self, iz: usize) -> usize {
        self.species[iz].z
    }

    /// Linear charge-state index of (species, Z₀).
    pub fn index_of(&self, iz: usize, z0: usize) -> usize {
        debug_assert!(z0 <= self.species[iz].z);
        self.offsets[iz] + z0
    }

    /// Replace the densities from the flattened `n_i` unknown array.
    pub fn set_densities(&mut self, n_i: &[f64]) -> KineticResult<()> {
        if n_i.len() != self.nzs * self.nr {
            return Err(KineticError::Usage(format!(
                "ion density array has length {}, expected {}",
                n_i.len(),
                self.nzs * self.nr
            )));
        }
        self.densities.copy_from_slice(n_i);
        Ok(())
    }

    /// Density of charge state (iz, Z₀) at radius ir.
    pub fn density(&self, iz: usize, z0: usize, ir: usize) -> f64 {
        self.densities[self.index_of(iz, z0) * self.nr + ir]
    }

    /// Free electron density from quasi-neutrality, Σ n_i Z₀.
    pub fn free_electron_density(&self, ir: usize) -> f64 {
        self.sum_over_states(ir, |_z, z0| z0 as f64)
    }

    /// Bound electron density, Σ n_i (Z − Z₀).
    pub fn bound_electron_density(&self, ir: usize) -> f64 {
        self.sum_over_states(ir, |z, z0| (z - z0) as f64)
    }

    /// Total electron density (free + bound), Σ n_i Z.
    pub fn total_electron_density(&self, ir: usize) -> f64 {
        self.sum_over_states(ir, |z, _z0| z as f64)
    }

    /// Z_eff = Σ n_i Z₀² / n_free. Unity in a fully stripped hydrogen
    /// plasma; returns 1 when there are no free electrons.
    pub fn zeff(&self, ir: usize) -> f64 {
        let nfree = self.free_electron_density(ir);
        if nfree == 0.0 {
            return 1.0;
        }
        self.sum_over_states(ir, |_z, z0| (z0 * z0) as f64) / nfree
    }

    /// Σ n_i (Z² − Z₀²) / n_tot — screened-charge moment.
    pub fn zeff0(&self, ir: usize) -> f64 {
        let ntot = self.total_electron_density(ir);
        if ntot == 0.0 {
            return 0.0;
        }
        self.sum_over_states(ir, |z, z0| (z * z - z0 * z0) as f64) / ntot
    }

    /// Σ n_i Z Z₀ / n_tot.
    pub fn z0z(&self, ir: usize) -> f64 {
        let ntot = self.total_electron_density(ir);
        if ntot == 0.0 {
            return 0.0;
        }
        self.sum_over_states(ir, |z, z0| (z * z0) as f64) / ntot
    }

    /// Σ n_i Z₀/Z / n_tot.
    pub fn z0_over_z(&self, ir: usize) -> f64 {
        let ntot = self.total_electron_density(ir);
        if ntot == 0.0 {
            return 0.0;
        }
        self.sum_over_states(ir, |z, z0| z0 as f64 / z as f64) / ntot
    }

    fn sum_over_states<W: Fn(usize, usize) -> f64>(&self, ir: usize, weight: W) -> f64 {
        let mut sum = 0.0;
        for (iz, s) in self.species.iter().enumerate() {
            for z0 in 0..=s.z {
                sum += self.density(iz, z0, ir) * weight(s.z, z0);
            }
        }
        sum
    }
}

/// Convenience constructor for a pure, fully ionised hydrogen plasma.
pub fn pure_hydrogen(nr: usize, n: f64) -> IonHandler {
    let mut ions = IonHandler::new(
        vec![IonSpecies {
            name: "H".to_string(),
            z: 1,
        }],
        nr,
    );
    let mut densities = vec![0.0; 2 * nr];
    for ir in 0..nr {
        densities[nr + ir] = n; // Z0 = 1 block
    }
    ions.set_densities(&densities).expect("layout is consistent");
    ions
}
