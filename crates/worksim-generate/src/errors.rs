use thiserror::Error;

/// Errors emitted by the generation engine.
///
/// Recoverable conditions (out-of-range draws, first-attempt temporal
/// violations) are resolved locally by resample-or-clamp and never reach
/// this type; anything below terminates the run with no usable output.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Requested counts or ratios are mutually unsatisfiable. Raised
    /// before any generation begins.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// A temporal or relational rule has no legal value left after
    /// resample-and-clamp. Indicates a sampling-parameter bug.
    #[error("constraint violation for {entity}[{ordinal}]: {rule}")]
    ConstraintViolation {
        entity: &'static str,
        ordinal: usize,
        rule: String,
    },
    /// A factory or binder asked for a parent pool that was empty at bind
    /// time. Always a scheduling/ordering defect, never expected.
    #[error("referential gap: {0}")]
    ReferentialGap(String),
}

impl From<worksim_core::Error> for GenerationError {
    fn from(err: worksim_core::Error) -> Self {
        GenerationError::Configuration(err.to_string())
    }
}
