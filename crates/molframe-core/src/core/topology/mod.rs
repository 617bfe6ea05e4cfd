//! Residue-name knowledge: built-in lookup tables and an optional user dictionary.

pub mod names;
pub mod registry;

pub use registry::{DictionaryLoadError, ResidueDictionary};
