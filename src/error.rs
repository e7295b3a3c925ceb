//! Error types for kfxbuild operations.

use thiserror::Error;

/// Errors that can occur while building or serializing a KFX fragment graph.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "cli")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate root fragment of type ${ftype}")]
    DuplicateRootFragment { ftype: u32 },

    #[error("duplicate fragment {name:?} of type ${ftype}")]
    DuplicateFragment { ftype: u32, name: String },

    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(String),

    #[error("unknown symbol id: ${0}")]
    UnknownSymbolId(u32),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
