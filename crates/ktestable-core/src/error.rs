use thiserror::Error;

/// Errors surfaced by the descriptor algebra. None of these are recovered
/// from locally; callers either fix their input or propagate the error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The validity invariant (V1/V2, see [`crate::descriptor::Descriptor`])
    /// did not hold after construction. Lists every violated clause, not
    /// just the first.
    #[error("invalid descriptor: {violations:?}")]
    InvalidDescriptor { violations: Vec<String> },
    /// A combinator or the consistency oracle was invoked on descriptors
    /// built with different window sizes.
    #[error("incompatible k: {left} != {right}")]
    IncompatibleK { left: usize, right: usize },
    /// `k` was not supplied to [`crate::descriptor::Descriptor::new`] and
    /// could not be inferred because the infix set is empty.
    #[error("cannot infer k: infix set is empty and k was not supplied")]
    EmptyInfixesForInference,
    /// A caller-supplied cancellation callback returned `true`, stopping the
    /// agglomerative learner before the distance chain was exhausted.
    #[error("learning cancelled after {merges} merge(s)")]
    Cancelled { merges: usize },
}
