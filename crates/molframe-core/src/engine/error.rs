use thiserror::Error;

use super::config::ConfigError;
use crate::core::geometry::{AlignError, OrientationError};
use crate::core::io::ParseError;
use crate::core::io::pae::PaeError;
use crate::core::models::frame::FrameError;
use crate::core::models::ids::ObjectId;
use crate::core::topology::DictionaryLoadError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse structure: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("Failed to read PAE matrix: {source}")]
    Pae {
        #[from]
        source: PaeError,
    },

    #[error("Inconsistent frame: {source}")]
    Frame {
        #[from]
        source: FrameError,
    },

    #[error("Superposition failed: {source}")]
    Alignment {
        #[from]
        source: AlignError,
    },

    #[error("Orientation failed: {source}")]
    Orientation {
        #[from]
        source: OrientationError,
    },

    #[error("Invalid configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Residue dictionary error: {source}")]
    Dictionary {
        #[from]
        source: DictionaryLoadError,
    },

    #[error("Object not found in session: {0:?}")]
    ObjectNotFound(ObjectId),

    #[error("Object '{object}' has no frame {index} ({available} available)")]
    FrameNotFound {
        object: String,
        index: usize,
        available: usize,
    },

    #[error("No positions left to convert in '{name}'")]
    NoPositions { name: String },

    #[error("Selection {chains:?} matches no positions")]
    EmptySelection { chains: Vec<String> },
}
