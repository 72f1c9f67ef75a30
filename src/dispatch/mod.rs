mod dispatcher;
pub mod retry;
mod services;

pub use dispatcher::StepDispatcher;
pub use retry::RetryPolicy;
pub use services::{
    NotificationService, ServiceError, ServiceErrorKind, SigningService,
    SimulatedNotificationService, SimulatedSigningService,
};
