use crate::core::geometry::orientation::{BestView, best_view};
use crate::core::models::ids::ObjectId;
use crate::engine::animation::AnimationTicket;
use crate::engine::error::EngineError;
use crate::engine::progress::{ProgressReporter, Stage, WorkflowEvent};
use crate::engine::session::Session;
use std::time::Duration;
use tracing::{info, instrument};

#[derive(Debug, Clone, PartialEq)]
pub struct OrientOutcome {
    pub view: BestView,
    /// Ticket to pass to [`Session::tick`] for this animation.
    pub ticket: AnimationTicket,
    pub duration: Duration,
}

/// Animates the camera to the best view of one frame of an object.
///
/// `selection` restricts the view to positions on the listed chains.
#[instrument(skip_all, name = "orient_workflow")]
pub fn run(
    session: &mut Session,
    object: ObjectId,
    frame: usize,
    selection: Option<&[String]>,
    reporter: &ProgressReporter,
) -> Result<OrientOutcome, EngineError> {
    reporter.stage(Stage::Orient);
    let target = session
        .object(object)
        .ok_or(EngineError::ObjectNotFound(object))?;
    let snapshot = target.frame(frame).ok_or_else(|| EngineError::FrameNotFound {
        object: target.name.clone(),
        index: frame,
        available: target.frames.len(),
    })?;

    let coords = match selection {
        Some(chains) => {
            let indices = snapshot.chain_indices(chains);
            if indices.is_empty() {
                return Err(EngineError::EmptySelection {
                    chains: chains.to_vec(),
                });
            }
            snapshot.coords_at(&indices)
        }
        None => snapshot.coords().to_vec(),
    };

    let view = best_view(&coords, &session.camera().rotation)?;
    let camera_target = session.camera().looking_at(&view);
    let (ticket, duration) = session.animate_camera_to(camera_target);
    info!(
        "Reorienting by {:.1}° over {} ms",
        view.angle.to_degrees(),
        duration.as_millis()
    );
    reporter.emit(WorkflowEvent::ViewSolved {
        angle: view.angle,
        duration,
    });

    Ok(OrientOutcome {
        view,
        ticket,
        duration,
    })
}
