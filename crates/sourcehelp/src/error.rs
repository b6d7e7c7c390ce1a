//
// error.rs
//
// Copyright (C) 2026 Jonathan Marc Bearak
//
// Error types surfaced by the engine. Ambiguous editor input is never an
// error; only misconfiguration is.
//

use thiserror::Error;

/// Programmer error in how the engine was configured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The comment marker handed to the flattener was empty.
    #[error("comment marker must not be empty")]
    EmptyCommentMarker,
}
