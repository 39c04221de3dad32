//! Mesa error types.
//!
//! Configuration mistakes, fallible casts and aggregated run failures all surface
//! as a single [`MesaError`] enum. Every variant carries a `miette` diagnostic code
//! so the demo binary (and any caller using `miette::Result`) gets readable output.
//!
//! Assertion failures are *not* errors in this sense: they are recorded on the
//! run handle by [`crate::assert::Assertions`] and reported through
//! [`crate::report::Report`].

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type MesaResult<T> = Result<T, MesaError>;

/// Unified error type for harness configuration and reporting failures.
#[derive(Debug, Error, Diagnostic)]
pub enum MesaError {
    /// A required harness callback was never provided.
    #[error("harness is missing required `{field}`")]
    #[diagnostic(
        code(mesa::config::missing_field),
        help("set it with the harness builder")
    )]
    MissingField { field: &'static str },

    #[error("case #{index} has an empty name")]
    #[diagnostic(
        code(mesa::config::unnamed_case),
        help("every case needs a unique, non-empty name to identify its sub-run")
    )]
    UnnamedCase { index: usize },

    /// A dynamically typed value could not be viewed as the requested type.
    #[error("value cannot be viewed as `{expected}`")]
    #[diagnostic(code(mesa::cast::wrong_type))]
    WrongType { expected: &'static str },

    #[error("invalid bench time `{value}`")]
    #[diagnostic(
        code(mesa::config::bench_time),
        help("use a duration such as `250ms`, `2s`, `1m`, or an iteration count such as `100x`")
    )]
    InvalidBenchTime { value: String },

    #[error("{} scenario(s) failed: {}", .failed.len(), .failed.join(", "))]
    #[diagnostic(code(mesa::run::failed))]
    CasesFailed { failed: Vec<String> },

    #[error("failed to serialize report")]
    #[diagnostic(code(mesa::report::json))]
    Json(#[from] serde_json::Error),
}

impl MesaError {
    /// Returns true for errors caused by how a harness or host was configured.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            MesaError::MissingField { .. }
                | MesaError::UnnamedCase { .. }
                | MesaError::InvalidBenchTime { .. }
        )
    }
}
