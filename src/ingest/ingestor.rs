use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

use crate::engine::{Event, EventOutcome, OnboardingEngine};
use crate::error::OnboardingError;

struct IngestJob {
    event: Event,
    reply: oneshot::Sender<Result<EventOutcome, OnboardingError>>,
}

/// Serializes event application per employee. Every employee gets a queue
/// and a worker task; events for different employees run concurrently while
/// events for the same employee apply strictly in arrival order.
pub struct EventIngestor {
    engine: Arc<OnboardingEngine>,
    queues: Arc<Mutex<HashMap<String, mpsc::UnboundedSender<IngestJob>>>>,
}

impl EventIngestor {
    pub fn new(engine: Arc<OnboardingEngine>) -> Self {
        Self {
            engine,
            queues: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Queue the event behind the employee's earlier events and wait for its
    /// outcome.
    pub async fn ingest(&self, event: Event) -> Result<EventOutcome, OnboardingError> {
        loop {
            let (reply, outcome) = oneshot::channel();
            self.enqueue(IngestJob {
                event: event.clone(),
                reply,
            });
            match outcome.await {
                Ok(result) => return result,
                // The worker shut down after accepting the job but before
                // answering it; requeue onto a fresh worker.
                Err(_) => continue,
            }
        }
    }

    fn enqueue(&self, mut job: IngestJob) {
        loop {
            let sender = {
                let mut queues = self.queues.lock().unwrap();
                queues
                    .entry(job.event.employee_id.clone())
                    .or_insert_with(|| self.spawn_worker(job.event.employee_id.clone()))
                    .clone()
            };
            match sender.send(job) {
                Ok(()) => return,
                Err(mpsc::error::SendError(returned)) => {
                    job = returned;
                    // The registered worker already shut down; drop its
                    // entry unless a fresh one has replaced it.
                    let mut queues = self.queues.lock().unwrap();
                    if let Some(current) = queues.get(&job.event.employee_id) {
                        if current.same_channel(&sender) {
                            queues.remove(&job.event.employee_id);
                        }
                    }
                }
            }
        }
    }

    fn spawn_worker(&self, employee_id: String) -> mpsc::UnboundedSender<IngestJob> {
        let (sender, mut jobs) = mpsc::unbounded_channel::<IngestJob>();
        let engine = self.engine.clone();
        let queues = self.queues.clone();
        let registered = sender.clone();

        tokio::spawn(async move {
            debug!("Ingest worker started for employee '{}'", employee_id);
            while let Some(job) = jobs.recv().await {
                let result = engine.apply_event(&job.event).await;
                let finished = match &result {
                    Ok(_) => engine
                        .employee_finished(&employee_id)
                        .await
                        .unwrap_or(false),
                    Err(OnboardingError::UnknownEmployee(_)) => true,
                    Err(_) => false,
                };
                let _ = job.reply.send(result);

                if finished {
                    // Unregister first so later events get a fresh worker,
                    // then answer anything already queued behind this job.
                    {
                        let mut queues = queues.lock().unwrap();
                        if let Some(current) = queues.get(&employee_id) {
                            if current.same_channel(&registered) {
                                queues.remove(&employee_id);
                            }
                        }
                    }
                    while let Ok(job) = jobs.try_recv() {
                        let result = engine.apply_event(&job.event).await;
                        let _ = job.reply.send(result);
                    }
                    debug!("Ingest worker for employee '{}' shut down", employee_id);
                    break;
                }
            }
        });

        sender
    }
}
