use crate::cli::{LoadArgs, OrientArgs};
use crate::error::{CliError, Result};
use molframe::core::topology::ResidueDictionary;
use molframe::engine::config::{
    AnimationConfig, LoadConfig, LoadConfigBuilder, RotationInterpolation,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialLoadSection {
    chains: Option<Vec<String>>,
    load_ligands: Option<bool>,
    assembly: Option<String>,
    align: Option<bool>,
    align_chain: Option<String>,
    connectivity_check: Option<bool>,
    peptide_bond_cutoff: Option<f64>,
    /// Extra residue-name dictionary, relative to the config file.
    dictionary: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct PartialAnimationSection {
    min_duration_ms: Option<u64>,
    max_duration_ms: Option<u64>,
    ms_per_radian: Option<f64>,
    interpolation: Option<RotationInterpolation>,
}

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct CliOverrides<'a> {
    pub chains: Option<&'a [String]>,
    pub no_ligands: bool,
    pub assembly: Option<&'a str>,
    pub no_align: bool,
    pub align_chain: Option<&'a str>,
    pub set_values: &'a [String],
}

impl<'a> From<&'a LoadArgs> for CliOverrides<'a> {
    fn from(args: &'a LoadArgs) -> Self {
        Self {
            chains: args.chains.as_deref(),
            no_ligands: args.no_ligands,
            assembly: args.assembly.as_deref(),
            no_align: args.no_align,
            align_chain: args.align_chain.as_deref(),
            set_values: &args.set_values,
        }
    }
}

/// `orient --chains` selects what to frame, not what to load, so only `-S` applies.
impl<'a> From<&'a OrientArgs> for CliOverrides<'a> {
    fn from(args: &'a OrientArgs) -> Self {
        Self {
            set_values: &args.set_values,
            ..Self::default()
        }
    }
}

/// The configuration file before CLI flags are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialLoadConfig {
    load: Option<PartialLoadSection>,
    animation: Option<PartialAnimationSection>,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

/// Fully merged settings for one `load` or `orient` invocation.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub load: LoadConfig,
    pub animation: AnimationConfig,
}

impl PartialLoadConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `-S` overrides, then CLI flags, on top of the file values.
    pub fn merge_with_cli<'a>(
        mut self,
        cli: impl Into<CliOverrides<'a>>,
    ) -> Result<ResolvedConfig> {
        let args = cli.into();
        self.apply_set_values(args.set_values)?;

        let load = self.load.take().unwrap_or_default();
        let animation = self.animation.take().unwrap_or_default();

        let mut builder = LoadConfigBuilder::new();
        if let Some(chains) = args.chains.map(<[String]>::to_vec).or(load.chains) {
            builder = builder.chains(chains);
        }
        if args.no_ligands {
            builder = builder.load_ligands(false);
        } else if let Some(value) = load.load_ligands {
            builder = builder.load_ligands(value);
        }
        if let Some(id) = args.assembly.map(str::to_string).or(load.assembly) {
            builder = builder.assembly(id);
        }
        if args.no_align {
            builder = builder.align(false);
        } else if let Some(value) = load.align {
            builder = builder.align(value);
        }
        if let Some(chain) = args.align_chain.map(str::to_string).or(load.align_chain) {
            builder = builder.align_chain(chain);
        }
        if let Some(value) = load.connectivity_check {
            builder = builder.connectivity_check(value);
        }
        if let Some(cutoff) = load.peptide_bond_cutoff {
            builder = builder.peptide_bond_cutoff(cutoff);
        }
        if let Some(path) = load.dictionary {
            let path = self.resolve_path(path);
            debug!("Loading residue dictionary from {:?}", path);
            let dictionary =
                ResidueDictionary::load(&path).map_err(|e| CliError::FileParsing {
                    path: path.clone(),
                    source: e.into(),
                })?;
            builder = builder.dictionary(dictionary);
        }
        let load = builder.build().map_err(|e| CliError::Config(e.to_string()))?;

        let defaults = AnimationConfig::default();
        let animation = AnimationConfig {
            min_duration: animation
                .min_duration_ms
                .map_or(defaults.min_duration, Duration::from_millis),
            max_duration: animation
                .max_duration_ms
                .map_or(defaults.max_duration, Duration::from_millis),
            ms_per_radian: animation.ms_per_radian.unwrap_or(defaults.ms_per_radian),
            interpolation: animation.interpolation.unwrap_or(defaults.interpolation),
        };
        animation
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        Ok(ResolvedConfig { load, animation })
    }

    fn resolve_path(&self, path: PathBuf) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        }
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "load.chains" => {
                    self.load.get_or_insert_with(Default::default).chains =
                        Some(value.split(',').map(|c| c.trim().to_string()).collect());
                }
                "load.load-ligands" => {
                    self.load.get_or_insert_with(Default::default).load_ligands =
                        Some(parse(key, value)?);
                }
                "load.assembly" => {
                    self.load.get_or_insert_with(Default::default).assembly =
                        Some(value.to_string());
                }
                "load.align" => {
                    self.load.get_or_insert_with(Default::default).align = Some(parse(key, value)?);
                }
                "load.align-chain" => {
                    self.load.get_or_insert_with(Default::default).align_chain =
                        Some(value.to_string());
                }
                "load.connectivity-check" => {
                    self.load.get_or_insert_with(Default::default).connectivity_check =
                        Some(parse(key, value)?);
                }
                "load.peptide-bond-cutoff" => {
                    self.load.get_or_insert_with(Default::default).peptide_bond_cutoff =
                        Some(parse(key, value)?);
                }
                "load.dictionary" => {
                    self.load.get_or_insert_with(Default::default).dictionary =
                        Some(PathBuf::from(value));
                }
                "animation.min-duration-ms" => {
                    self.animation.get_or_insert_with(Default::default).min_duration_ms =
                        Some(parse(key, value)?);
                }
                "animation.max-duration-ms" => {
                    self.animation.get_or_insert_with(Default::default).max_duration_ms =
                        Some(parse(key, value)?);
                }
                "animation.ms-per-radian" => {
                    self.animation.get_or_insert_with(Default::default).ms_per_radian =
                        Some(parse(key, value)?);
                }
                "animation.interpolation" => {
                    let mode = match value {
                        "slerp" => RotationInterpolation::Slerp,
                        "linear-gram-schmidt" => RotationInterpolation::LinearGramSchmidt,
                        other => {
                            return Err(CliError::Config(format!(
                                "Invalid value for {}: '{}' (expected 'slerp' or 'linear-gram-schmidt')",
                                key, other
                            )));
                        }
                    };
                    self.animation.get_or_insert_with(Default::default).interpolation = Some(mode);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}
