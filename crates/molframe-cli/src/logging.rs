use crate::cli::Cli;
use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    fmt,
    prelude::*,
    registry::LookupSpan,
};

/// Every molframe target, library and binary alike, starts with this prefix.
const MOLFRAME_TARGET: &str = "molframe";

/// Log destinations and levels for one CLI run.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub console: LevelFilter,
    /// Log file; it records at least INFO even when the console is quiet.
    pub file: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_cli(cli: &Cli) -> Self {
        let console = if cli.quiet {
            LevelFilter::OFF
        } else {
            match cli.verbose {
                0 => LevelFilter::WARN,
                1 => LevelFilter::INFO,
                2 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            }
        };
        Self {
            console,
            file: cli.log_file.clone(),
        }
    }

    fn file_level(&self) -> LevelFilter {
        self.console.max(LevelFilter::INFO)
    }
}

/// molframe targets log at `level`; dependencies never go below WARN.
fn molframe_targets(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level.min(LevelFilter::WARN))
        .with_target(MOLFRAME_TARGET, level)
}

fn file_layer<S>(file: File, level: LevelFilter) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(molframe_targets(level))
}

pub fn setup_logging(settings: &LogSettings) -> Result<()> {
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(molframe_targets(settings.console));

    let file_layer = match &settings.file {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            Some(file_layer(file, settings.file_level()))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;
    use tracing::{Level, debug, info, trace};

    fn settings(args: &[&str]) -> LogSettings {
        LogSettings::from_cli(&Cli::parse_from(args))
    }

    #[test]
    fn flags_map_to_console_levels() {
        assert_eq!(settings(&["molframe", "orient", "a.pdb"]).console, LevelFilter::WARN);
        assert_eq!(settings(&["molframe", "-v", "orient", "a.pdb"]).console, LevelFilter::INFO);
        assert_eq!(settings(&["molframe", "-vv", "orient", "a.pdb"]).console, LevelFilter::DEBUG);
        assert_eq!(settings(&["molframe", "-vvvv", "orient", "a.pdb"]).console, LevelFilter::TRACE);
        let quiet = settings(&["molframe", "-q", "--log-file", "run.log", "orient", "a.pdb"]);
        assert_eq!(quiet.console, LevelFilter::OFF);
        assert_eq!(quiet.file, Some(PathBuf::from("run.log")));
        assert_eq!(quiet.file_level(), LevelFilter::INFO);
    }

    #[test]
    fn dependencies_stay_at_warn_while_molframe_follows_verbosity() {
        let targets = molframe_targets(LevelFilter::TRACE);
        assert!(targets.would_enable("molframe::workflows::load", &Level::TRACE));
        assert!(targets.would_enable("molframe::commands::orient", &Level::DEBUG));
        assert!(!targets.would_enable("serde_json", &Level::INFO));
        assert!(targets.would_enable("serde_json", &Level::WARN));

        let quiet = molframe_targets(LevelFilter::OFF);
        assert!(!quiet.would_enable("molframe::engine", &Level::ERROR));
        assert!(!quiet.would_enable("serde_json", &Level::ERROR));
    }

    #[test]
    #[serial]
    fn file_layer_keeps_molframe_records_without_ansi() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        let subscriber =
            tracing_subscriber::registry().with(file_layer(File::create(&path).unwrap(), LevelFilter::INFO));

        tracing::subscriber::with_default(subscriber, || {
            info!(target: "molframe::workflows::load", "Added 3 frame(s) to 'traj'");
            debug!(target: "molframe::workflows::load", "Superposed frame with RMSD 0.412");
            info!(target: "indicatif", "redraw");
            trace!("ignored");
        });

        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Added 3 frame(s) to 'traj'"));
        assert!(content.contains("molframe::workflows::load"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("RMSD"));
        assert!(!content.contains("redraw"));
        assert!(!content.contains('\u{1b}'));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_is_an_io_error() {
        let settings = LogSettings {
            console: LevelFilter::WARN,
            file: Some(PathBuf::from("/")),
        };
        if cfg!(unix) {
            assert!(matches!(setup_logging(&settings), Err(CliError::Io(_))));
        }
    }
}
