//! # Onboarding Engine
//!
//! An asynchronous workflow orchestrator for employee onboarding. Each new
//! hire gets a persistent state machine that walks a fixed document pipeline
//! (company policy, NDA, developer guidelines), gates every document behind
//! a signature and a quiz, and finishes with a parallel fan-out of
//! provisioning tasks.
//!
//! ## Features
//!
//! - Fixed per-employee pipeline driven by inbound events
//! - Duplicate and out-of-order deliveries acknowledged, never re-applied
//! - Two-phase dispatch records so interrupted dispatches can be resumed
//! - Retries with exponential backoff for flaky downstream services
//! - Optimistic version checks on every persisted mutation
//! - Per-employee event ordering with cross-employee concurrency
//! - In-memory and SQLite persistence backends
//!
//! ## Usage
//!
//! Add the following to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! onboarding_engine = "0.1"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use onboarding_engine::directory::{EmployeeRecord, MemoryDirectory};
//! use onboarding_engine::dispatch::{SimulatedNotificationService, SimulatedSigningService};
//! use onboarding_engine::storage::implementations::MemoryStore;
//! use onboarding_engine::{DocumentKind, DocumentStatus, Event, OnboardingEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let directory = MemoryDirectory::new();
//!     directory.insert(EmployeeRecord {
//!         id: "emp_1001".into(),
//!         email: "dana@example.com".into(),
//!         name: "Dana".into(),
//!     });
//!
//!     let engine = OnboardingEngine::new(
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(directory),
//!         Arc::new(SimulatedSigningService),
//!         Arc::new(SimulatedNotificationService),
//!     );
//!
//!     // Register the hire and send the first document.
//!     let thread_id = engine.start("emp_1001").await.expect("start failed");
//!
//!     // React to the signing service reporting a signature.
//!     engine
//!         .apply_event(&Event::document_status(
//!             "emp_1001",
//!             DocumentKind::CompanyPolicy,
//!             DocumentStatus::Signed,
//!         ))
//!         .await
//!         .expect("event failed");
//!
//!     let status = engine.get_status(&thread_id).await.expect("status failed");
//!     println!("{}: {:.2}% complete", status.thread_id, status.progress_percent);
//! }
//! ```
//!
//! ## License
//!
//! Licensed under the MIT license. See the [LICENSE](LICENSE) file for details.

pub mod directory;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod storage;

pub use dispatch::{NotificationService, RetryPolicy, ServiceError, SigningService};
pub use engine::{
    DocumentKind, DocumentStatus, EngineOptions, Event, EventKind, EventOutcome, FinalTask,
    OnboardingEngine, Stage, StepName, StepState, StepStatus, WorkflowInstance, WorkflowStatus,
};
pub use error::OnboardingError;
pub use ingest::EventIngestor;
pub use storage::{InstanceStore, StoreError};
