//! The error type returned by the limit-enforcing entry points.

/// Resource exhaustion while converting a document.
///
/// Malformed Markdown is never an error; it degrades to literal text.  Only
/// the limits configured in [`Limits`](crate::Limits) can make a conversion
/// fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input is larger than `parse.limits.max_input_size`.
    #[error("input is {size} bytes, larger than the limit of {limit} bytes")]
    InputTooLarge {
        /// Size of the input in bytes.
        size: usize,
        /// The configured limit.
        limit: usize,
    },

    /// The document tree is deeper than `parse.limits.max_nesting_depth`.
    #[error("document nests {depth} levels deep, deeper than the limit of {limit}")]
    NestingTooDeep {
        /// Depth of the deepest node, the document itself being depth 0.
        depth: usize,
        /// The configured limit.
        limit: usize,
    },
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
