use std::fmt;
use std::time::Duration;

/// Stages a load or orient run passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Parse,
    Assemble,
    Convert,
    Orient,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Parse => "Parsing",
            Stage::Assemble => "Building assembly",
            Stage::Convert => "Converting frames",
            Stage::Orient => "Solving best view",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a frame ended up relative to its object's alignment reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alignment {
    /// First frame of the object; it defines the reference.
    Reference,
    Superposed { rmsd: f64 },
    /// Superposition was attempted and failed; input coordinates kept.
    Skipped,
    /// Alignment is turned off in the load configuration.
    Disabled,
}

/// What a workflow tells its front end while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowEvent {
    StageStarted(Stage),
    Parsed { models: usize, atoms: usize },
    AssemblyBuilt { operations: usize },
    /// Conversion is about to go through `models` models of `object`.
    ConversionStarted { object: String, models: usize },
    FrameAdded {
        model: i64,
        positions: usize,
        alignment: Alignment,
    },
    /// The model produced no positions and was not turned into a frame.
    ModelSkipped { model: i64 },
    ObjectLoaded { object: String, frames: usize },
    ViewSolved { angle: f64, duration: Duration },
}

pub type EventCallback<'a> = Box<dyn Fn(WorkflowEvent) + Send + Sync + 'a>;

/// Hands [`WorkflowEvent`]s to an optional callback; silent without one.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<EventCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: EventCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn emit(&self, event: WorkflowEvent) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn stage(&self, stage: Stage) {
        self.emit(WorkflowEvent::StageStarted(stage));
    }
}
