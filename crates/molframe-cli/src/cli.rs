use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "molframe - turn PDB/mmCIF structures into viewer frames, rebuild biological assemblies and solve camera orientations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load one or more structures into a session and summarize the resulting frames.
    Load(LoadArgs),
    /// Print the symmetry operations of a biological assembly.
    Assembly(AssemblyArgs),
    /// Solve for the best view of a structure and sample the camera animation towards it.
    Orient(OrientArgs),
}

/// Arguments for the `load` subcommand.
#[derive(Args, Debug)]
pub struct LoadArgs {
    /// Structure files (PDB or mmCIF). Files sharing an object name become one trajectory.
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// PAE JSON files, matched to models in order.
    #[arg(long = "pae", value_name = "FILE")]
    pub pae: Vec<PathBuf>,

    /// Object name for every input. Defaults to each file's stem.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Only convert residues on these chains (comma separated).
    #[arg(long, value_name = "A,B", value_delimiter = ',')]
    pub chains: Option<Vec<String>>,

    /// Drop ligand positions and their PAE rows and columns.
    #[arg(long)]
    pub no_ligands: bool,

    /// Expand a biological assembly. Without a value, assembly "1" is used.
    #[arg(long, value_name = "ID", num_args(0..=1), default_missing_value = "1")]
    pub assembly: Option<String>,

    /// Keep trajectory frames in their input coordinates.
    #[arg(long)]
    pub no_align: bool,

    /// Superpose trajectory frames on this chain only.
    #[arg(long, value_name = "ID")]
    pub align_chain: Option<String>,

    /// Path to a load configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S load.peptide-bond-cutoff=2.2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    /// Write every loaded object and the final camera as JSON.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `assembly` subcommand.
#[derive(Args, Debug)]
pub struct AssemblyArgs {
    /// Structure file (PDB or mmCIF).
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    /// Assembly identifier.
    #[arg(long, value_name = "ID", default_value = "1")]
    pub id: String,
}

/// Arguments for the `orient` subcommand.
#[derive(Args, Debug)]
pub struct OrientArgs {
    /// Structure file (PDB or mmCIF).
    #[arg(required = true, value_name = "FILE")]
    pub file: PathBuf,

    /// Number of evenly spaced animation samples to print.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub steps: usize,

    /// Only frame positions on these chains (comma separated).
    #[arg(long, value_name = "A,B", value_delimiter = ',')]
    pub chains: Option<Vec<String>>,

    /// Path to a configuration file in TOML format ([load] and [animation] sections).
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Example: -S animation.max-duration-ms=500
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
