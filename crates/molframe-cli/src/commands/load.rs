use super::{object_name, read_text};
use crate::cli::LoadArgs;
use crate::config::{PartialLoadConfig, ResolvedConfig};
use crate::error::{CliError, Result};
use crate::utils::progress::WorkflowDisplay;
use molframe::core::io::pae::read_pae_path;
use molframe::core::models::frame::Frame;
use molframe::core::models::pae::PaeMatrix;
use molframe::engine::camera::CameraState;
use molframe::engine::progress::ProgressReporter;
use molframe::engine::session::Session;
use molframe::workflows::load::{self, BatchItem, LoadRequest};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Serialize)]
struct ObjectDump<'a> {
    name: &'a str,
    frames: &'a [Frame],
}

/// JSON written by `--output`: every object in creation order plus the camera.
#[derive(Serialize)]
struct SessionDump<'a> {
    objects: Vec<ObjectDump<'a>>,
    camera: &'a CameraState,
}

pub fn run(args: LoadArgs, quiet: bool) -> Result<()> {
    let partial = match &args.config {
        Some(path) => PartialLoadConfig::from_file(path)?,
        None => PartialLoadConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let ResolvedConfig { load, animation } = partial.merge_with_cli(&args)?;

    let pae = read_pae_files(&args.pae)?;
    let requests = build_requests(&args.files, args.name.as_deref(), pae)?;

    let display = WorkflowDisplay::new(quiet);
    let reporter = ProgressReporter::with_callback(display.callback());

    let mut session = Session::new(animation);
    println!("Loading {} file(s)...", requests.len());
    let results = load::run_batch(&mut session, &requests, &load, &reporter);
    let failed = print_summary(&results);

    if let Some(output) = &args.output {
        write_session(&session, output)?;
        println!("Session written to: {}", output.display());
    }

    if failed > 0 {
        return Err(CliError::PartialFailure {
            failed,
            total: results.len(),
        });
    }
    Ok(())
}

fn read_pae_files(paths: &[PathBuf]) -> Result<Vec<PaeMatrix>> {
    paths
        .iter()
        .map(|path| {
            info!("Reading PAE matrix from {:?}", path);
            read_pae_path(path).map_err(|e| CliError::FileParsing {
                path: path.clone(),
                source: e.into(),
            })
        })
        .collect()
}

/// Pairs inputs with PAE matrices.
///
/// A single input receives every matrix, one per model. With several inputs, the i-th
/// matrix belongs to the i-th file.
fn build_requests(
    files: &[PathBuf],
    name: Option<&str>,
    pae: Vec<PaeMatrix>,
) -> Result<Vec<LoadRequest>> {
    if files.len() > 1 && pae.len() > files.len() {
        return Err(CliError::Argument(format!(
            "{} PAE file(s) given for {} input(s)",
            pae.len(),
            files.len()
        )));
    }

    let single = files.len() == 1;
    let mut pae = pae.into_iter();
    let mut requests = Vec::with_capacity(files.len());
    for path in files {
        let name = name.map_or_else(|| object_name(path), str::to_string);
        let mut request = LoadRequest::new(name, read_text(path)?);
        if single {
            request.pae.extend(pae.by_ref());
        } else if let Some(matrix) = pae.next() {
            request = request.with_pae(matrix);
        }
        requests.push(request);
    }
    Ok(requests)
}

fn print_summary(results: &[BatchItem]) -> usize {
    let mut failed = 0;
    for item in results {
        match &item.result {
            Ok(report) => {
                let mut line = format!(
                    "✓ {} ({}): {} frame(s)",
                    report.name, report.format, report.frames_added
                );
                if report.assembly_applied {
                    line.push_str(&format!(", assembly of {} operation(s)", report.operation_count));
                }
                if report.pae_attached > 0 {
                    line.push_str(&format!(", PAE on {} frame(s)", report.pae_attached));
                }
                if report.pae_dropped > 0 {
                    line.push_str(&format!(", {} PAE matrix(es) dropped", report.pae_dropped));
                }
                if report.skipped_alignments > 0 {
                    line.push_str(&format!(", {} frame(s) left unaligned", report.skipped_alignments));
                }
                println!("{}", line);
            }
            Err(e) => {
                failed += 1;
                warn!("'{}' failed: {}", item.name, e);
                eprintln!("✗ {}: {}", item.name, e);
            }
        }
    }
    failed
}

fn write_session(session: &Session, path: &Path) -> Result<()> {
    let dump = SessionDump {
        objects: session
            .objects()
            .map(|(_, object)| ObjectDump {
                name: &object.name,
                frames: &object.frames,
            })
            .collect(),
        camera: session.camera(),
    };
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &dump).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
