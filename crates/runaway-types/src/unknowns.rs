// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Unknown Quantities
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Registry of unknown quantities with change tracking.
//!
//! The outer solver owns the evolution of these arrays; the kinetic core
//! only reads them and asks `has_changed` to decide which caches to
//! invalidate. The change flag is the single source of truth for
//! invalidation across the core.

use crate::error::{KineticError, KineticResult};

/// Canonical quantity names used by the core.
pub mod names {
    pub const E_FIELD: &str = "E_field";
    pub const N_COLD: &str = "n_cold";
    pub const N_HOT: &str = "n_hot";
    pub const N_RE: &str = "n_re";
    pub const N_TOT: &str = "n_tot";
    pub const T_COLD: &str = "T_cold";
    pub const ION_SPECIES: &str = "n_i";
    pub const F_HOT: &str = "f_hot";
}

/// Opaque handle to a registered quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnknownId(usize);

#[derive(Debug, Clone)]
struct UnknownQuantity {
    name: String,
    data: Vec<f64>,
    changed: bool,
}

/// Map from quantity names to arrays plus change flags.
#[derive(Debug, Clone, Default)]
pub struct UnknownQuantityHandler {
    quantities: Vec<UnknownQuantity>,
}

impl UnknownQuantityHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a quantity of the given size, initialised to zero.
    /// Registering a name twice is a usage error.
    pub fn register(&mut self, name: &str, len: usize) -> KineticResult<UnknownId> {
        if self.id_of(name).is_some() {
            return Err(KineticError::Usage(format!(
                "unknown quantity '{name}' registered twice"
            )));
        }
        self.quantities.push(UnknownQuantity {
            name: name.to_string(),
            data: vec![0.0; len],
            changed: true,
        });
        Ok(UnknownId(self.quantities.len() - 1))
    }

    pub fn id_of(&self, name: &str) -> Option<UnknownId> {
        self.quantities
            .iter()
            .position(|q| q.name == name)
            .map(UnknownId)
    }

    /// Id lookup that fails loudly; for quantities the core requires.
    pub fn require(&self, name: &str) -> KineticResult<UnknownId> {
        self.id_of(name)
            .ok_or_else(|| KineticError::Usage(format!("unknown quantity '{name}' not registered")))
    }

    /// Overwrite the stored array and raise the change flag.
    pub fn set_data(&mut self, id: UnknownId, data: &[f64]) -> KineticResult<()> {
        let q = &mut self.quantities[id.0];
        if data.len() != q.data.len() {
            return Err(KineticError::Usage(format!(
                "size mismatch for '{}': got {}, expected {}",
                q.name,
                data.len(),
                q.data.len()
            )));
        }
        q.data.copy_from_slice(data);
        q.changed = true;
        Ok(())
    }

    pub fn data(&self, id: UnknownId) -> &[f64] {
        &self.quantities[id.0].data
    }

    pub fn has_changed(&self, id: UnknownId) -> bool {
        self.quantities[id.0].changed
    }

    /// Lower every change flag; called by the outer solver once all
    /// consumers have rebuilt for the step.
    pub fn reset_changed(&mut self) {
        for q in &mut self.quantities {
            q.changed = false;
        }
    }

    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }
}
