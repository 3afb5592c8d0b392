//! Error types for the analysis pipeline.
//!
//! Two tiers exist: fatal errors (unreadable input, syntax errors, solver
//! failures) surface through this enum, while unsupported statement and
//! expression shapes are *not* errors — they are recorded in the per-method
//! skip list and analysis continues with reduced precision.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JavaflowError {
    /// File system I/O errors (read, write, permissions, etc.)
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input has syntax errors. Dataflow extraction and solving must
    /// never run on a partially parsed tree.
    #[error("syntax errors in {path}")]
    Syntax { path: PathBuf },

    /// Parser infrastructure failure (grammar mismatch, parse abort).
    #[error("parser failure: {0}")]
    Parser(String),

    /// The constraint solver failed for a reason other than infeasibility.
    /// Kept distinct from an UNSAT verdict.
    #[error("solver failure: {0}")]
    Solver(String),
}
