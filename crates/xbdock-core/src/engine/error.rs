use crate::core::grid::GridError;
use crate::core::models::atom::AtomTyping;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Scoring function version mismatch: cache built for '{found}', expected '{expected}'")]
    VersionMismatch { expected: String, found: String },

    #[error("Grid dimensions of the stored cache differ from the configured box")]
    DimensionMismatch,

    #[error("Atom typing mismatch: expected '{expected}', found '{found}'")]
    TypingMismatch {
        expected: AtomTyping,
        found: AtomTyping,
    },

    #[error("Invalid grid dimensions: {source}")]
    InvalidDimensions {
        #[from]
        source: GridError,
    },

    #[error("Stored grid for atom type {atom_type} is malformed: {source}")]
    MalformedGrid { atom_type: usize, source: GridError },

    #[error("Atom type {atom_type} is outside the {typing} typing scheme")]
    UnknownAtomType { atom_type: usize, typing: AtomTyping },

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("TOML parsing error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },

    #[error("TOML serialization error: {source}")]
    Serialize {
        #[from]
        source: toml::ser::Error,
    },
}
