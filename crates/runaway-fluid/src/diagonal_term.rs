// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Diagonal Equation Term
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Contract for equation terms whose Jacobian contribution is a
//! diagonal of per-cell weights; the interface the core exposes to the
//! outer nonlinear solver.
//!
//! Weight lifecycle: weights are (re)initialised when the grid has been
//! rebuilt, and re-evaluated on every step only when the term depends
//! on unknown quantities; otherwise they are set once and reused.

use runaway_types::unknowns::UnknownQuantityHandler;

/// Matrix abstraction the outer solver hands in for Jacobian assembly;
/// the core only ever adds to diagonal entries.
pub trait JacobianMatrix {
    fn add_diagonal(&mut self, row: usize, value: f64);
}

impl JacobianMatrix for Vec<f64> {
    fn add_diagonal(&mut self, row: usize, value: f64) {
        self[row] += value;
    }
}

/// A term with diagonal weights. Implementors supply the weight
/// evaluation; the lifecycle logic is provided.
pub trait DiagonalTerm {
    /// Number of weight elements (cells of the operand grid).
    fn number_of_weights(&self) -> usize;

    /// Whether the weights depend on unknown quantities and must be
    /// re-evaluated every step.
    fn depends_on_unknowns(&self) -> bool;

    /// Evaluate the weights into the preallocated buffer.
    fn set_weights(&self, t: f64, dt: f64, unknowns: &UnknownQuantityHandler, weights: &mut [f64]);

    /// Weight derivatives with respect to the unknown `deriv_id`; terms
    /// with state-independent weights leave the buffer zeroed.
    fn set_weights_jacobian(
        &self,
        _deriv_id: usize,
        _unknowns: &UnknownQuantityHandler,
        _dweights: &mut [f64],
    ) {
    }
}

/// Weight storage plus the rebuild lifecycle of a diagonal term.
#[derive(Debug, Clone, Default)]
pub struct DiagonalWeights {
    weights: Vec<f64>,
    initialized: bool,
}

impl DiagonalWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the weights; next rebuild reallocates and re-evaluates.
    pub fn grid_rebuilt(&mut self) {
        self.weights.clear();
        self.initialized = false;
    }

    /// Allocate on first use, then re-evaluate per step only for
    /// unknown-dependent terms.
    pub fn rebuild<T: DiagonalTerm>(
        &mut self,
        term: &T,
        t: f64,
        dt: f64,
        unknowns: &UnknownQuantityHandler,
    ) {
        if !self.initialized {
            self.weights = vec![0.0; term.number_of_weights()];
            term.set_weights(t, dt, unknowns, &mut self.weights);
            self.initialized = true;
        } else if term.depends_on_unknowns() {
            term.set_weights(t, dt, unknowns, &mut self.weights);
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Place this term's block in the Jacobian: the diagonal of
    /// weights when differentiating with respect to the term's own
    /// operand, plus the weight derivatives.
    pub fn set_jacobian_block<T: DiagonalTerm, J: JacobianMatrix>(
        &self,
        term: &T,
        uqty_id: usize,
        deriv_id: usize,
        jac: &mut J,
        unknowns: &UnknownQuantityHandler,
        x: &[f64],
    ) {
        if uqty_id == deriv_id {
            for (row, &w) in self.weights.iter().enumerate() {
                jac.add_diagonal(row, w);
            }
        }
        if term.depends_on_unknowns() {
            let mut dw = vec![0.0; self.weights.len()];
            term.set_weights_jacobian(deriv_id, unknowns, &mut dw);
            for (row, (&d, &xv)) in dw.iter().zip(x.iter()).enumerate() {
                jac.add_diagonal(row, d * xv);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runaway_types::unknowns::names;

    /// Weight = n_cold per cell: the simplest unknown-dependent term.
    struct DensityWeight {
        nr: usize,
    }

    impl DiagonalTerm for DensityWeight {
        fn number_of_weights(&self) -> usize {
            self.nr
        }
        fn depends_on_unknowns(&self) -> bool {
            true
        }
        fn set_weights(
            &self,
            _t: f64,
            _dt: f64,
            unknowns: &UnknownQuantityHandler,
            weights: &mut [f64],
        ) {
            let n = unknowns.data(unknowns.id_of(names::N_COLD).expect("registered"));
            weights.copy_from_slice(n);
        }
    }

    /// Constant weights: evaluated once per grid rebuild only.
    struct ConstantWeight {
        nr: usize,
        value: f64,
    }

    impl DiagonalTerm for ConstantWeight {
        fn number_of_weights(&self) -> usize {
            self.nr
        }
        fn depends_on_unknowns(&self) -> bool {
            false
        }
        fn set_weights(
            &self,
            _t: f64,
            _dt: f64,
            _unknowns: &UnknownQuantityHandler,
            weights: &mut [f64],
        ) {
            weights.fill(self.value);
        }
    }

    fn handler(n: &[f64]) -> UnknownQuantityHandler {
        let mut u = UnknownQuantityHandler::new();
        let id = u.register(names::N_COLD, n.len()).unwrap();
        u.set_data(id, n).unwrap();
        u
    }

    #[test]
    fn test_unknown_dependent_term_tracks_state() {
        let mut u = handler(&[1.0, 2.0]);
        let term = DensityWeight { nr: 2 };
        let mut w = DiagonalWeights::new();
        w.rebuild(&term, 0.0, 0.1, &u);
        assert_eq!(w.weights(), &[1.0, 2.0]);

        let id = u.id_of(names::N_COLD).unwrap();
        u.set_data(id, &[3.0, 4.0]).unwrap();
        w.rebuild(&term, 0.1, 0.1, &u);
        assert_eq!(w.weights(), &[3.0, 4.0]);
    }

    #[test]
    fn test_constant_term_evaluates_once() {
        let u = handler(&[1.0]);
        let term = ConstantWeight { nr: 1, value: 5.0 };
        let mut w = DiagonalWeights::new();
        w.rebuild(&term, 0.0, 0.1, &u);
        assert_eq!(w.weights(), &[5.0]);
        // A second step does not re-evaluate (weights kept as-is even
        // if we mutate them behind the scenes).
        w.weights[0] = 7.0;
        w.rebuild(&term, 0.1, 0.1, &u);
        assert_eq!(w.weights(), &[7.0]);
        // A grid rebuild reinitialises.
        w.grid_rebuilt();
        w.rebuild(&term, 0.2, 0.1, &u);
        assert_eq!(w.weights(), &[5.0]);
    }

    #[test]
    fn test_jacobian_block_diagonal() {
        let u = handler(&[2.0, 3.0]);
        let term = DensityWeight { nr: 2 };
        let mut w = DiagonalWeights::new();
        w.rebuild(&term, 0.0, 0.1, &u);

        let mut jac = vec![0.0; 2];
        w.set_jacobian_block(&term, 7, 7, &mut jac, &u, &[1.0, 1.0]);
        assert_eq!(jac, vec![2.0, 3.0]);

        // Differentiating with respect to a different unknown adds only
        // the (zero) weight derivatives.
        let mut jac = vec![0.0; 2];
        w.set_jacobian_block(&term, 7, 9, &mut jac, &u, &[1.0, 1.0]);
        assert_eq!(jac, vec![0.0, 0.0]);
    }
}
