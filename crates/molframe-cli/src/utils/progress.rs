use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use molframe::engine::progress::{Alignment, EventCallback, Stage, WorkflowEvent};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

struct DisplayState {
    pb: ProgressBar,
    /// Frames of the current object left in their input coordinates.
    unaligned: usize,
}

/// Draws load and orient runs on stderr: a spinner per stage, then a frame bar per object.
#[derive(Clone)]
pub struct WorkflowDisplay {
    state: Arc<Mutex<DisplayState>>,
}

impl WorkflowDisplay {
    pub fn new(quiet: bool) -> Self {
        let target = if quiet {
            ProgressDrawTarget::hidden()
        } else {
            ProgressDrawTarget::stderr()
        };
        let pb = ProgressBar::with_draw_target(None, target).with_style(spinner_style());
        Self {
            state: Arc::new(Mutex::new(DisplayState { pb, unaligned: 0 })),
        }
    }

    pub fn callback(&self) -> EventCallback<'static> {
        let state = self.state.clone();
        Box::new(move |event| {
            let Ok(mut state) = state.lock() else {
                warn!("Progress display mutex was poisoned; event dropped.");
                return;
            };
            state.apply(event);
        })
    }
}

impl DisplayState {
    fn apply(&mut self, event: WorkflowEvent) {
        let pb = &self.pb;
        match event {
            WorkflowEvent::StageStarted(stage) => {
                if stage == Stage::Convert {
                    return;
                }
                pb.reset();
                pb.set_length(0);
                pb.set_style(spinner_style());
                pb.set_prefix("");
                pb.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                pb.set_message(stage.label());
            }
            WorkflowEvent::Parsed { models, atoms } => {
                pb.set_message(format!("Parsed {} model(s), {} atom(s)", models, atoms));
            }
            WorkflowEvent::AssemblyBuilt { operations } => {
                pb.set_message(format!("Assembly of {} operation(s)", operations));
            }
            WorkflowEvent::ConversionStarted { object, models } => {
                pb.disable_steady_tick();
                pb.reset();
                pb.set_style(bar_style());
                pb.set_length(models as u64);
                pb.set_prefix(object);
                pb.set_message("");
                self.unaligned = 0;
            }
            WorkflowEvent::FrameAdded {
                model, alignment, ..
            } => {
                pb.inc(1);
                match alignment {
                    Alignment::Superposed { rmsd } => {
                        pb.set_message(format!("model {}: RMSD {:.2} Å", model, rmsd));
                    }
                    Alignment::Skipped => {
                        self.unaligned += 1;
                        pb.println(format!("  model {} kept unaligned", model));
                    }
                    Alignment::Reference | Alignment::Disabled => {}
                }
            }
            WorkflowEvent::ModelSkipped { model } => {
                pb.inc(1);
                pb.println(format!("  model {} has no positions", model));
            }
            WorkflowEvent::ObjectLoaded { object, frames } => {
                let mut summary = format!("✓ {}: {} frame(s)", object, frames);
                if self.unaligned > 0 {
                    summary.push_str(&format!(", {} unaligned", self.unaligned));
                }
                pb.finish_with_message(summary);
            }
            WorkflowEvent::ViewSolved { angle, duration } => {
                pb.disable_steady_tick();
                pb.finish_with_message(format!(
                    "✓ Best view {:.1}° away, {} ms animation",
                    angle.to_degrees(),
                    duration.as_millis()
                ));
            }
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<16.bold} [{bar:30.cyan/blue}] {pos}/{len} frames {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn frame(model: i64, alignment: Alignment) -> WorkflowEvent {
        WorkflowEvent::FrameAdded {
            model,
            positions: 10,
            alignment,
        }
    }

    #[test]
    fn object_bar_counts_frames_and_unaligned_models() {
        let display = WorkflowDisplay::new(true);
        let callback = display.callback();

        callback(WorkflowEvent::StageStarted(Stage::Parse));
        assert_eq!(display.state.lock().unwrap().pb.message(), "Parsing");

        callback(WorkflowEvent::ConversionStarted {
            object: "traj".to_string(),
            models: 3,
        });
        callback(frame(1, Alignment::Reference));
        callback(frame(2, Alignment::Superposed { rmsd: 0.5 }));
        {
            let state = display.state.lock().unwrap();
            assert_eq!(state.pb.length(), Some(3));
            assert_eq!(state.pb.position(), 2);
            assert_eq!(state.pb.prefix(), "traj");
            assert_eq!(state.pb.message(), "model 2: RMSD 0.50 Å");
        }

        callback(frame(3, Alignment::Skipped));
        callback(WorkflowEvent::ObjectLoaded {
            object: "traj".to_string(),
            frames: 3,
        });
        let state = display.state.lock().unwrap();
        assert!(state.pb.is_finished());
        assert_eq!(state.pb.message(), "✓ traj: 3 frame(s), 1 unaligned");
    }

    #[test]
    fn unaligned_count_restarts_per_object() {
        let display = WorkflowDisplay::new(true);
        let callback = display.callback();
        callback(WorkflowEvent::ConversionStarted {
            object: "a".to_string(),
            models: 2,
        });
        callback(frame(1, Alignment::Reference));
        callback(frame(2, Alignment::Skipped));
        callback(WorkflowEvent::ObjectLoaded {
            object: "a".to_string(),
            frames: 2,
        });

        callback(WorkflowEvent::ConversionStarted {
            object: "b".to_string(),
            models: 1,
        });
        callback(frame(1, Alignment::Reference));
        callback(WorkflowEvent::ObjectLoaded {
            object: "b".to_string(),
            frames: 1,
        });
        assert_eq!(display.state.lock().unwrap().pb.message(), "✓ b: 1 frame(s)");
    }

    #[test]
    fn solved_view_finishes_the_spinner() {
        let display = WorkflowDisplay::new(true);
        let callback = display.callback();
        callback(WorkflowEvent::StageStarted(Stage::Orient));
        callback(WorkflowEvent::ViewSolved {
            angle: std::f64::consts::FRAC_PI_2,
            duration: Duration::from_millis(450),
        });
        let state = display.state.lock().unwrap();
        assert!(state.pb.is_finished());
        assert_eq!(state.pb.message(), "✓ Best view 90.0° away, 450 ms animation");
    }

    #[test]
    fn callback_is_usable_from_another_thread() {
        let display = WorkflowDisplay::new(true);
        let callback = display.callback();

        thread::spawn(move || {
            callback(WorkflowEvent::ConversionStarted {
                object: "x".to_string(),
                models: 2,
            });
            callback(WorkflowEvent::ModelSkipped { model: 1 });
        })
        .join()
        .unwrap();

        assert_eq!(display.state.lock().unwrap().pb.position(), 1);
    }
}
