mod event;
mod instance;
mod options;
mod stage;
mod step;
pub mod transition;
mod workflow;

pub use event::{DocumentStatus, Event, EventKind, EventOutcome};
pub use instance::{WorkflowInstance, WorkflowStatus};
pub use options::EngineOptions;
pub use stage::Stage;
pub use step::{DocumentKind, FinalTask, StepKind, StepName, StepState, StepStatus};
pub use workflow::OnboardingEngine;
