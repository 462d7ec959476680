use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{detect, CollisionJob, CollisionReport};
use crate::show::SheetId;

/// Output of the collision worker.
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionMessage {
    Report(CollisionReport),
    Failed {
        sheet: SheetId,
        generation: u64,
        error: String,
    },
    /// A newer job for the same sheet was enqueued before this one ran.
    Skipped { sheet: SheetId, generation: u64 },
}

type Generations = Arc<Mutex<HashMap<SheetId, u64>>>;

/// A single worker task that runs collision passes one at a time, in the
/// order they were enqueued. Generations are tracked per sheet so passes
/// that are already out of date can be skipped.
pub struct CollisionQueue {
    job_sender: mpsc::Sender<CollisionJob>,
    report_receiver: Option<mpsc::Receiver<CollisionMessage>>,
    generations: Generations,
    worker: Option<JoinHandle<()>>,
}

impl CollisionQueue {
    /// Start the worker. Must be called from inside a tokio runtime.
    pub fn new(capacity: usize) -> Self {
        let (job_sender, job_receiver) = mpsc::channel(capacity.max(1));
        let (report_sender, report_receiver) = mpsc::channel(capacity.max(1));
        let generations: Generations = Arc::new(Mutex::new(HashMap::new()));

        let worker = tokio::spawn(run_worker(
            job_receiver,
            report_sender,
            Arc::clone(&generations),
        ));

        Self {
            job_sender,
            report_receiver: Some(report_receiver),
            generations,
            worker: Some(worker),
        }
    }

    /// Claim the next generation number for a sheet. Jobs built with an
    /// older number become stale.
    pub fn next_generation(&self, sheet: &SheetId) -> u64 {
        let mut generations = self.generations.lock();
        let generation = generations.entry(sheet.clone()).or_insert(0);
        *generation += 1;
        *generation
    }

    /// True when `generation` is the newest claimed for the sheet.
    pub fn is_current(&self, sheet: &SheetId, generation: u64) -> bool {
        self.generations.lock().get(sheet).copied() == Some(generation)
    }

    pub async fn enqueue(&self, job: CollisionJob) -> Result<(), String> {
        log::debug!(
            "Queueing collision pass for sheet {} (generation {})",
            job.sheet,
            job.generation
        );
        self.job_sender
            .send(job)
            .await
            .map_err(|e| format!("Collision worker stopped: {}", e))
    }

    /// Queue a job without waiting. Hands the job back if the queue is full
    /// or the worker has stopped.
    pub fn try_enqueue(&self, job: CollisionJob) -> Result<(), CollisionJob> {
        self.job_sender.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(job) | mpsc::error::TrySendError::Closed(job) => job,
        })
    }

    /// Get the report receiver (should only be called once)
    pub fn take_report_receiver(&mut self) -> Option<mpsc::Receiver<CollisionMessage>> {
        self.report_receiver.take()
    }

    /// Receive the next message, if the receiver has not been taken.
    pub async fn recv(&mut self) -> Option<CollisionMessage> {
        self.report_receiver.as_mut()?.recv().await
    }

    /// Non-blocking receive, if the receiver has not been taken.
    pub fn try_recv(&mut self) -> Option<CollisionMessage> {
        self.report_receiver.as_mut()?.try_recv().ok()
    }

    /// Stop accepting jobs and wait for queued ones to finish.
    pub async fn shutdown(self) {
        let Self {
            job_sender, worker, ..
        } = self;
        drop(job_sender);
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                log::error!("Collision worker shutdown error: {}", e);
            }
        }
    }
}

async fn run_worker(
    mut jobs: mpsc::Receiver<CollisionJob>,
    reports: mpsc::Sender<CollisionMessage>,
    generations: Generations,
) {
    while let Some(job) = jobs.recv().await {
        let newest = generations.lock().get(&job.sheet).copied();
        let message = if newest.is_some_and(|newest| newest > job.generation) {
            log::warn!(
                "Skipping stale collision pass for sheet {} (generation {})",
                job.sheet,
                job.generation
            );
            CollisionMessage::Skipped {
                sheet: job.sheet,
                generation: job.generation,
            }
        } else {
            // let the editor run before a long pass
            tokio::task::yield_now().await;
            match detect(&job) {
                Ok(report) => CollisionMessage::Report(report),
                Err(e) => {
                    log::error!("Collision pass for sheet {} failed: {}", job.sheet, e);
                    CollisionMessage::Failed {
                        sheet: job.sheet,
                        generation: job.generation,
                        error: e.to_string(),
                    }
                }
            }
        };

        if reports.send(message).await.is_err() {
            break;
        }
    }
    log::debug!("Collision worker stopped");
}
