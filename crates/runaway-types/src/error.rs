// ─────────────────────────────────────────────────────────────────────
// SCPN Runaway Kinetics — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KineticError {
    #[error("usage error: {0}")]
    Usage(String),

    #[error("{what} did not converge within {iterations} iterations")]
    Convergence {
        what: &'static str,
        iterations: usize,
    },

    #[error("geometry error at ir={ir}, xi0={xi0}: {message}")]
    Geometry {
        message: String,
        ir: usize,
        xi0: f64,
    },

    #[error("numeric error: {0}")]
    Numeric(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type KineticResult<T> = Result<T, KineticError>;

impl KineticError {
    /// Non-finite value observed where the singular-limit clamps do not apply.
    pub fn non_finite(context: &str, value: f64) -> Self {
        KineticError::Numeric(format!("{context} produced non-finite value {value}"))
    }
}
