// src/error.rs
//! Error kinds for the search core.
//!
//! The engines degrade silently on incomplete data (missing distance,
//! language, weights); only genuinely invalid configuration fails fast.
//! `Config` and `Data` are distinct kinds so the caller can map them to
//! different upstream responses.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// Invalid configuration rejected before any scoring/clustering work.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Malformed caller payload. Reserved for the seam contract; the
    /// engines themselves fall back to worst-case/default values instead
    /// of returning this.
    #[error("invalid data: {0}")]
    Data(String),
}
