//! # error.rs
//!
//! Error type shared by the tokenizer, the parser, the evaluator and the
//! memory layers.
//!
//! Every failure is raised where it is detected and travels up the
//! recursive parse/evaluate call chain unchanged. Only the façade decides how
//! an error is shown to a caller.

use thiserror::Error;

/// Formats an optional source position for error messages.
fn at(position: &Option<usize>) -> String {
    match position {
        Some(pos) => format!("at {pos}"),
        None => "at end of input".to_string(),
    }
}

/// All errors produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The input could not be tiled into tokens.
    #[error("cannot tokenize expression at {position}")]
    Tokenize {
        /// Byte offset where scanning stopped making progress.
        position: usize,
    },

    /// A token appears where the grammar forbids it.
    #[error("unexpected token \"{token}\" {}", at(.position))]
    UnexpectedToken {
        /// Token text.
        token: String,
        /// Byte offset of the token, `None` for the end marker.
        position: Option<usize>,
    },

    /// A closing pair without opener, a closer of the wrong type, or an
    /// opener never closed.
    #[error("mismatched token \"{token}\" {}", at(.position))]
    MismatchedToken {
        /// Token text.
        token: String,
        /// Byte offset of the token, `None` for the end marker.
        position: Option<usize>,
    },

    /// The left-hand side of `=` is not an identifier or a function
    /// declaration with identifier/number parameters.
    #[error("cannot assign to {node}")]
    AssignmentInvalid {
        /// Rendered left-hand side.
        node: String,
    },

    /// A function declaration lists an identifier after a number.
    #[error("invalid parameters in declaration {node}: identifiers must precede numbers")]
    InvalidBindingParameters {
        /// Rendered declaration.
        node: String,
    },

    /// No native function or stored clause matches a fully numeric call.
    #[error("no function matches {node}")]
    FunctionNotFound {
        /// Rendered call with evaluated arguments.
        node: String,
    },

    /// A number was built from a literal the numeric backend cannot read.
    #[error("numeric value expected, got \"{value}\"")]
    NumericExpected {
        /// Offending literal.
        value: String,
    },

    /// The numeric backend cannot represent the result of an operation.
    #[error("{operation} is not representable")]
    NumericDomain {
        /// Rendered operation.
        operation: String,
    },

    /// A vector index is outside the vector.
    #[error("index {index} out of bounds for vector of length {len}")]
    IndexOutOfBounds {
        /// Requested index, rendered.
        index: String,
        /// Vector length.
        len: usize,
    },

    /// A write against a read-only memory layer.
    #[error("memory is immutable, cannot write {key}")]
    MemoryImmutable {
        /// Storage key of the rejected write.
        key: String,
    },

    /// Pushing a call frame beyond the configured depth.
    #[error("stack overflow: call depth limit of {depth} exceeded")]
    StackOverflow {
        /// Configured maximum depth.
        depth: usize,
    },

    /// Popping a frame from an empty call stack.
    #[error("call stack is empty")]
    StackEmpty,
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
