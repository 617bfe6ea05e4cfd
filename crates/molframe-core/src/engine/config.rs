use crate::core::topology::ResidueDictionary;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PEPTIDE_BOND_CUTOFF: f64 = 2.0;
pub const DEFAULT_MIN_DURATION: Duration = Duration::from_millis(200);
pub const DEFAULT_MAX_DURATION: Duration = Duration::from_millis(1000);
pub const DEFAULT_MS_PER_RADIAN: f64 = 600.0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

fn invalid(name: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.into(),
    }
}

/// How intermediate camera rotations are produced during an animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RotationInterpolation {
    /// Quaternion spherical interpolation.
    #[default]
    Slerp,
    /// Component-wise lerp of the matrices followed by Gram-Schmidt.
    LinearGramSchmidt,
}

/// Options controlling how structure text becomes frames.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Only residues on these chains are converted; `None` keeps every chain.
    pub chains: Option<Vec<String>>,
    pub load_ligands: bool,
    /// Assembly to expand from the first model; `None` keeps the asymmetric unit.
    pub assembly: Option<String>,
    /// Superpose every later frame of an object onto its first frame.
    pub align: bool,
    /// Chain whose polymer positions drive alignment; `None` uses all polymer positions.
    pub align_chain: Option<String>,
    pub connectivity_check: bool,
    pub peptide_bond_cutoff: f64,
    pub dictionary: ResidueDictionary,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            chains: None,
            load_ligands: true,
            assembly: None,
            align: true,
            align_chain: None,
            connectivity_check: true,
            peptide_bond_cutoff: DEFAULT_PEPTIDE_BOND_CUTOFF,
            dictionary: ResidueDictionary::builtin(),
        }
    }
}

#[derive(Default)]
pub struct LoadConfigBuilder {
    chains: Option<Vec<String>>,
    load_ligands: Option<bool>,
    assembly: Option<String>,
    align: Option<bool>,
    align_chain: Option<String>,
    connectivity_check: Option<bool>,
    peptide_bond_cutoff: Option<f64>,
    dictionary: Option<ResidueDictionary>,
}

impl LoadConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chains(mut self, chains: Vec<String>) -> Self {
        self.chains = Some(chains);
        self
    }
    pub fn load_ligands(mut self, load: bool) -> Self {
        self.load_ligands = Some(load);
        self
    }
    pub fn assembly(mut self, id: impl Into<String>) -> Self {
        self.assembly = Some(id.into());
        self
    }
    pub fn align(mut self, align: bool) -> Self {
        self.align = Some(align);
        self
    }
    pub fn align_chain(mut self, chain: impl Into<String>) -> Self {
        self.align_chain = Some(chain.into());
        self
    }
    pub fn connectivity_check(mut self, enabled: bool) -> Self {
        self.connectivity_check = Some(enabled);
        self
    }
    pub fn peptide_bond_cutoff(mut self, cutoff: f64) -> Self {
        self.peptide_bond_cutoff = Some(cutoff);
        self
    }
    pub fn dictionary(mut self, dictionary: ResidueDictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn build(self) -> Result<LoadConfig, ConfigError> {
        let defaults = LoadConfig::default();

        let chains = match self.chains {
            Some(chains) if chains.is_empty() => {
                return Err(invalid("chains", "chain list is empty"));
            }
            Some(chains) if chains.iter().any(|c| c.trim().is_empty()) => {
                return Err(invalid("chains", "chain ids must not be blank"));
            }
            other => other,
        };
        if self.assembly.as_deref().is_some_and(|id| id.trim().is_empty()) {
            return Err(ConfigError::MissingParameter("assembly"));
        }
        if self.align_chain.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ConfigError::MissingParameter("align_chain"));
        }
        let cutoff = self
            .peptide_bond_cutoff
            .unwrap_or(defaults.peptide_bond_cutoff);
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(invalid(
                "peptide_bond_cutoff",
                format!("{cutoff} is not a positive distance"),
            ));
        }

        Ok(LoadConfig {
            chains,
            load_ligands: self.load_ligands.unwrap_or(defaults.load_ligands),
            assembly: self.assembly,
            align: self.align.unwrap_or(defaults.align),
            align_chain: self.align_chain,
            connectivity_check: self
                .connectivity_check
                .unwrap_or(defaults.connectivity_check),
            peptide_bond_cutoff: cutoff,
            dictionary: self.dictionary.unwrap_or(defaults.dictionary),
        })
    }
}

/// Timing and interpolation of camera reorientation animations.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationConfig {
    pub min_duration: Duration,
    pub max_duration: Duration,
    /// Duration per radian of rotation before clamping, in milliseconds.
    pub ms_per_radian: f64,
    pub interpolation: RotationInterpolation,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            min_duration: DEFAULT_MIN_DURATION,
            max_duration: DEFAULT_MAX_DURATION,
            ms_per_radian: DEFAULT_MS_PER_RADIAN,
            interpolation: RotationInterpolation::default(),
        }
    }
}

impl AnimationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_duration > self.max_duration {
            return Err(invalid(
                "min_duration",
                format!(
                    "{:?} exceeds max_duration {:?}",
                    self.min_duration, self.max_duration
                ),
            ));
        }
        if !self.ms_per_radian.is_finite() || self.ms_per_radian < 0.0 {
            return Err(invalid(
                "ms_per_radian",
                format!("{} is not a non-negative rate", self.ms_per_radian),
            ));
        }
        Ok(())
    }
}
