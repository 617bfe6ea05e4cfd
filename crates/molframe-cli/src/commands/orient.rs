use super::{format_matrix, object_name, read_text};
use crate::cli::OrientArgs;
use crate::config::{PartialLoadConfig, ResolvedConfig};
use crate::error::Result;
use crate::utils::progress::WorkflowDisplay;
use molframe::core::geometry::rotation::geodesic_angle;
use molframe::engine::animation::{AnimationTicket, TickOutcome};
use molframe::engine::camera::CameraState;
use molframe::engine::progress::ProgressReporter;
use molframe::engine::session::Session;
use molframe::workflows::orient::OrientOutcome;
use molframe::workflows::{load, orient};
use std::time::Duration;
use tracing::{debug, info};

/// One printed animation sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub elapsed: Duration,
    pub camera: CameraState,
}

pub fn run(args: OrientArgs, quiet: bool) -> Result<()> {
    let display = WorkflowDisplay::new(quiet);
    let reporter = ProgressReporter::with_callback(display.callback());
    let (mut session, outcome) = solve(&args, &reporter)?;

    info!(
        "Best view is {:.2} rad from the identity camera",
        outcome.view.angle
    );
    println!("Best-view rotation: {}", format_matrix(&outcome.view.rotation));
    println!(
        "Center: ({:.3}, {:.3}, {:.3})  extent: {:.3}",
        outcome.view.center.x, outcome.view.center.y, outcome.view.center.z, outcome.view.extent
    );
    println!(
        "Rotation angle: {:.2}°  animation: {} ms",
        outcome.view.angle.to_degrees(),
        outcome.duration.as_millis()
    );

    for sample in sample_animation(&mut session, outcome.ticket, outcome.duration, args.steps) {
        let angle = geodesic_angle(&sample.camera.rotation, &outcome.view.rotation);
        println!(
            "  t = {:>5} ms  {:>6.2}° to go  {}",
            sample.elapsed.as_millis(),
            angle.to_degrees(),
            format_matrix(&sample.camera.rotation)
        );
    }
    Ok(())
}

/// Loads the file with the resolved configuration and animates from the identity camera
/// towards the best view of its first frame.
fn solve(args: &OrientArgs, reporter: &ProgressReporter) -> Result<(Session, OrientOutcome)> {
    let partial = match &args.config {
        Some(path) => PartialLoadConfig::from_file(path)?,
        None => PartialLoadConfig::default(),
    };
    let ResolvedConfig { load, animation } = partial.merge_with_cli(args)?;
    debug!("Animation settings: {:?}", animation);

    let text = read_text(&args.file)?;
    let mut session = Session::new(animation);
    let report = load::run(
        &mut session,
        &load::LoadRequest::new(object_name(&args.file), text),
        &load,
        reporter,
    )?;
    // Loading frames the camera on the object; start from the identity camera instead.
    *session.camera_mut() = CameraState::default();

    let outcome = orient::run(&mut session, report.object, 0, args.chains.as_deref(), reporter)?;
    Ok((session, outcome))
}

/// Ticks the running animation at `steps` evenly spaced times, ending at `duration`.
pub fn sample_animation(
    session: &mut Session,
    ticket: AnimationTicket,
    duration: Duration,
    steps: usize,
) -> Vec<Sample> {
    let mut samples = Vec::with_capacity(steps);
    for step in 1..=steps {
        let elapsed = if step == steps {
            duration
        } else {
            duration.mul_f64(step as f64 / steps as f64)
        };
        let outcome = session.tick(ticket, elapsed);
        debug!("Tick at {:?}: {:?}", elapsed, outcome);
        samples.push(Sample {
            elapsed,
            camera: session.camera().clone(),
        });
        if matches!(outcome, TickOutcome::Finished | TickOutcome::Superseded) {
            break;
        }
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use molframe::core::geometry::rotation::{is_proper_rotation, rotation_z};
    use molframe::engine::config::LoadConfig;
    use std::path::PathBuf;

    const SHEET: &str = "\
ATOM      1  CA  ALA A   1      -6.000   0.000   0.000  1.00 90.00           C
ATOM      2  CA  GLY A   2       6.000   0.000   0.000  1.00 90.00           C
ATOM      3  CA  SER A   3       0.000   3.000   0.000  1.00 90.00           C
ATOM      4  CA  THR A   4       0.000  -3.000   0.000  1.00 90.00           C
ATOM      5  CA  VAL B   1       2.000   1.000   0.000  1.00 90.00           C
END
";

    fn input(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("sheet.pdb");
        std::fs::write(&path, SHEET).unwrap();
        path
    }

    fn args(file: PathBuf) -> OrientArgs {
        OrientArgs {
            file,
            steps: 4,
            chains: None,
            config: None,
            set_values: Vec::new(),
        }
    }

    #[test]
    fn orient_prints_and_samples() {
        let dir = tempfile::tempdir().unwrap();
        run(args(input(&dir)), true).unwrap();
    }

    #[test]
    fn set_values_shape_the_animation() {
        let dir = tempfile::tempdir().unwrap();
        let mut cli = args(input(&dir));
        cli.set_values = vec![
            "animation.min-duration-ms=350".to_string(),
            "animation.max-duration-ms=350".to_string(),
        ];
        let (mut session, outcome) = solve(&cli, &ProgressReporter::new()).unwrap();
        assert_eq!(outcome.duration, Duration::from_millis(350));

        let samples = sample_animation(&mut session, outcome.ticket, outcome.duration, 2);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].camera.rotation, outcome.view.rotation);
    }

    #[test]
    fn config_file_reaches_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("view.toml");
        std::fs::write(
            &config,
            "[load]\nchains = [\"A\"]\n\n[animation]\nmin-duration-ms = 600\nmax-duration-ms = 600\n",
        )
        .unwrap();
        let mut cli = args(input(&dir));
        cli.config = Some(config);

        let (session, outcome) = solve(&cli, &ProgressReporter::new()).unwrap();
        assert_eq!(outcome.duration, Duration::from_millis(600));
        let (_, object) = session.objects().next().unwrap();
        assert!(object.frames[0].chains().iter().all(|c| c == "A"));
    }

    #[test]
    fn samples_are_rotations_ending_at_the_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = Session::default();
        let report = load::run(
            &mut session,
            &load::LoadRequest::new("sheet", read_text(&input(&dir)).unwrap()),
            &LoadConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        *session.camera_mut() = CameraState {
            rotation: rotation_z(0.9),
            ..CameraState::default()
        };

        let outcome =
            orient::run(&mut session, report.object, 0, None, &ProgressReporter::new()).unwrap();
        let samples = sample_animation(&mut session, outcome.ticket, outcome.duration, 5);
        assert_eq!(samples.len(), 5);
        assert!(samples.iter().all(|s| is_proper_rotation(&s.camera.rotation, 1e-6)));
        let last = samples.last().unwrap();
        assert_eq!(last.elapsed, outcome.duration);
        assert_eq!(last.camera.rotation, outcome.view.rotation);
    }

    #[test]
    fn zero_steps_produce_no_samples() {
        let mut session = Session::default();
        let (ticket, duration) = session.animate_camera_to(CameraState::default());
        assert!(sample_animation(&mut session, ticket, duration, 0).is_empty());
    }
}
