use crate::core::geometry::{align_a_to_b, best_view};
use crate::core::io::parse_structure;
use crate::core::models::frame::Frame;
use crate::core::models::ids::ObjectId;
use crate::core::models::pae::PaeMatrix;
use crate::core::models::structure::{Model, StructureFormat};
use crate::core::symmetry::build_assembly;
use crate::engine::config::LoadConfig;
use crate::engine::convert::{FrameConverter, PaeOutcome};
use crate::engine::error::EngineError;
use crate::engine::progress::{Alignment, ProgressReporter, Stage, WorkflowEvent};
use crate::engine::session::Session;
use nalgebra::Point3;
use tracing::{debug, info, instrument, warn};

/// One structure text to load into a named object.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    /// Object the frames are appended to; created on first success.
    pub name: String,
    pub text: String,
    /// PAE matrices by model index.
    pub pae: Vec<PaeMatrix>,
}

impl LoadRequest {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            pae: Vec::new(),
        }
    }

    pub fn with_pae(mut self, pae: PaeMatrix) -> Self {
        self.pae.push(pae);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub object: ObjectId,
    pub name: String,
    pub format: StructureFormat,
    pub frames_added: usize,
    /// Frames that kept their input coordinates because superposition was not possible.
    pub skipped_alignments: usize,
    pub assembly_applied: bool,
    pub operation_count: usize,
    pub pae_attached: usize,
    pub pae_dropped: usize,
}

#[derive(Debug)]
pub struct BatchItem {
    pub name: String,
    pub result: Result<LoadReport, EngineError>,
}

#[instrument(skip_all, name = "load_workflow", fields(object = %request.name))]
pub fn run(
    session: &mut Session,
    request: &LoadRequest,
    config: &LoadConfig,
    reporter: &ProgressReporter,
) -> Result<LoadReport, EngineError> {
    reporter.stage(Stage::Parse);
    let structure = parse_structure(&request.text)?;
    info!(
        "Parsed {} model(s), {} atom(s) as {}",
        structure.models.len(),
        structure.atom_count(),
        structure.format
    );
    reporter.emit(WorkflowEvent::Parsed {
        models: structure.models.len(),
        atoms: structure.atom_count(),
    });

    let format = structure.format;
    let mut assembly_applied = false;
    let mut operation_count = 0;
    if config.assembly.is_some() {
        reporter.stage(Stage::Assemble);
    }
    let models: Vec<Model> = match config.assembly.as_deref() {
        Some(assembly_id) => match build_assembly(&structure, assembly_id) {
            Some(assembly) => {
                assembly_applied = true;
                operation_count = assembly.operations.len();
                info!(
                    "Built assembly '{}' with {} operation(s)",
                    assembly_id, operation_count
                );
                reporter.emit(WorkflowEvent::AssemblyBuilt {
                    operations: operation_count,
                });
                vec![assembly.model]
            }
            None => {
                info!(
                    "No usable operators for assembly '{}'; keeping the asymmetric unit",
                    assembly_id
                );
                structure.models
            }
        },
        None => structure.models,
    };

    reporter.stage(Stage::Convert);
    reporter.emit(WorkflowEvent::ConversionStarted {
        object: request.name.clone(),
        models: models.len(),
    });

    let converter = FrameConverter::new(config);
    let mut object: Option<ObjectId> = None;
    let mut frames_added = 0;
    let mut skipped_alignments = 0;
    let mut pae_attached = 0;
    let mut pae_dropped = 0;

    for (index, model) in models.iter().enumerate() {
        let conversion = converter.convert(&model.atoms, request.pae.get(index).cloned());

        match conversion.pae {
            PaeOutcome::Attached => pae_attached += 1,
            PaeOutcome::Dropped { .. } => pae_dropped += 1,
            PaeOutcome::Absent => {}
        }
        if conversion.frame.is_empty() {
            warn!("Model {} produced no positions; skipped", model.number);
            reporter.emit(WorkflowEvent::ModelSkipped {
                model: model.number,
            });
            continue;
        }

        let id = *object.get_or_insert_with(|| session.object_named(&request.name));
        let positions = conversion.frame.len();
        let alignment = append_frame(session, id, conversion.frame, config)?;
        if alignment == Alignment::Skipped {
            skipped_alignments += 1;
        }
        frames_added += 1;
        reporter.emit(WorkflowEvent::FrameAdded {
            model: model.number,
            positions,
            alignment,
        });
    }

    let Some(object) = object else {
        return Err(EngineError::NoPositions {
            name: request.name.clone(),
        });
    };
    info!(
        "Added {} frame(s) to '{}' ({} alignment(s) skipped)",
        frames_added, request.name, skipped_alignments
    );
    reporter.emit(WorkflowEvent::ObjectLoaded {
        object: request.name.clone(),
        frames: frames_added,
    });
    Ok(LoadReport {
        object,
        name: request.name.clone(),
        format,
        frames_added,
        skipped_alignments,
        assembly_applied,
        operation_count,
        pae_attached,
        pae_dropped,
    })
}

/// Loads several inputs; a failing input is recorded and the rest still load.
#[instrument(skip_all, name = "load_batch_workflow")]
pub fn run_batch(
    session: &mut Session,
    requests: &[LoadRequest],
    config: &LoadConfig,
    reporter: &ProgressReporter,
) -> Vec<BatchItem> {
    requests
        .iter()
        .map(|request| {
            let result = run(session, request, config, reporter);
            if let Err(e) = &result {
                warn!("Failed to load '{}': {}", request.name, e);
            }
            BatchItem {
                name: request.name.clone(),
                result,
            }
        })
        .collect()
}

/// Appends a frame to an object and reports how it was aligned.
///
/// The first frame of an object fixes the alignment reference and points the camera at
/// its best view.
fn append_frame(
    session: &mut Session,
    id: ObjectId,
    mut frame: Frame,
    config: &LoadConfig,
) -> Result<Alignment, EngineError> {
    let is_first = session
        .object(id)
        .ok_or(EngineError::ObjectNotFound(id))?
        .frames
        .is_empty();
    let chain = config.align_chain.as_deref();

    if is_first {
        let view = best_view(frame.coords(), &session.camera().rotation)?;
        session.set_camera_view(&view);
    }

    let object = session
        .object_mut(id)
        .ok_or(EngineError::ObjectNotFound(id))?;
    let alignment = if is_first {
        let reference = frame.coords_at(&frame.polymer_indices(chain));
        object.alignment_reference = (!reference.is_empty()).then_some(reference);
        Alignment::Reference
    } else if config.align {
        superpose_onto_reference(&mut frame, object.alignment_reference.as_deref(), chain)?
    } else {
        Alignment::Disabled
    };
    object.frames.push(frame);
    Ok(alignment)
}

fn superpose_onto_reference(
    frame: &mut Frame,
    reference: Option<&[Point3<f64>]>,
    chain: Option<&str>,
) -> Result<Alignment, EngineError> {
    let Some(reference) = reference else {
        warn!("Object has no alignment reference; frame kept as loaded");
        return Ok(Alignment::Skipped);
    };
    let mobile = frame.coords_at(&frame.polymer_indices(chain));
    match align_a_to_b(frame.coords(), &mobile, reference) {
        Ok((coords, fit)) => {
            debug!("Superposed frame with RMSD {:.3}", fit.rmsd);
            frame.set_coords(coords)?;
            Ok(Alignment::Superposed { rmsd: fit.rmsd })
        }
        Err(e) => {
            warn!("Skipping alignment: {}", e);
            Ok(Alignment::Skipped)
        }
    }
}
