use crate::storage::InstanceStore;
use std::sync::Arc;

mod directory;
mod dispatch;
mod engine;
mod error;
mod ingest;
mod storage;

use directory::{EmployeeRecord, MemoryDirectory};
use dispatch::{SimulatedNotificationService, SimulatedSigningService};
use engine::{DocumentKind, DocumentStatus, Event, EventOutcome, FinalTask, OnboardingEngine};
use ingest::EventIngestor;
use storage::implementations::SqliteStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging if needed.
    env_logger::init();
    println!("Starting the onboarding workflow orchestrator...");

    // Step 1: Set up the storage backend and the employee directory.
    let store = Arc::new(
        SqliteStore::new("sqlite:onboarding.db?mode=rwc")
            .await
            .expect("Failed to create SqliteStore"),
    );
    store.init().await?;

    let directory = MemoryDirectory::new();
    directory.insert(EmployeeRecord {
        id: "emp_1001".into(),
        email: "dana.rivers@example.com".into(),
        name: "Dana Rivers".into(),
    });

    // Step 2: Build the engine with simulated downstream services.
    let engine = Arc::new(OnboardingEngine::new(
        store.clone(),
        Arc::new(directory),
        Arc::new(SimulatedSigningService),
        Arc::new(SimulatedNotificationService),
    ));
    let ingestor = EventIngestor::new(engine.clone());

    // Step 3: Start the workflow; this dispatches the first document.
    let thread_id = engine.start("emp_1001").await?;
    println!("Workflow {} started", thread_id);

    // Step 4: Replay the event traffic a real onboarding produces.
    let events = vec![
        Event::document_status("emp_1001", DocumentKind::CompanyPolicy, DocumentStatus::Sent),
        Event::document_status(
            "emp_1001",
            DocumentKind::CompanyPolicy,
            DocumentStatus::Signed,
        ),
        // The first quiz attempt misses the bar; the engine re-invites.
        Event::quiz_result("emp_1001", DocumentKind::CompanyPolicy, 55, false, 1),
        Event::quiz_result("emp_1001", DocumentKind::CompanyPolicy, 90, true, 2),
        Event::document_status("emp_1001", DocumentKind::Nda, DocumentStatus::Sent),
        Event::document_status("emp_1001", DocumentKind::Nda, DocumentStatus::Signed),
        Event::quiz_result("emp_1001", DocumentKind::Nda, 85, true, 1),
        Event::document_status(
            "emp_1001",
            DocumentKind::DevGuidelines,
            DocumentStatus::Sent,
        ),
        Event::document_status(
            "emp_1001",
            DocumentKind::DevGuidelines,
            DocumentStatus::Signed,
        ),
        Event::quiz_result("emp_1001", DocumentKind::DevGuidelines, 95, true, 1),
        Event::task_done("emp_1001", FinalTask::SlackInvite),
        Event::task_done("emp_1001", FinalTask::JiraAccess),
        Event::task_done("emp_1001", FinalTask::OnboardingCall),
    ];

    for event in events {
        let outcome = ingestor.ingest(event).await?;
        if outcome != EventOutcome::Applied {
            println!("  ({:?} delivery ignored)", outcome);
        }
    }

    // Step 5: Query the finished workflow.
    let status = engine.get_status(&thread_id).await?;
    println!(
        "Workflow {} for {}: stage '{}', {:.2}% complete",
        status.thread_id, status.employee_id, status.stage, status.progress_percent
    );
    for (name, step) in &status.steps {
        println!(
            "  {}: {} after {} attempt(s)",
            name, step.status, step.attempt_count
        );
    }

    Ok(())
}
