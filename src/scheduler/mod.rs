//! Background ingestion scheduling.
//!
//! Document processing is minutes-long (one model call per twenty pages), so
//! it runs on a small pool of background workers fed by a queue. The
//! scheduler enforces single-flight per document id: while a job for a
//! document is queued or running, further submissions for the same id are
//! rejected instead of queued, so two runs can never interleave writes for
//! one document.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::ingest::DocumentProcessor;
use crate::stores::DocumentStore;
use crate::types::{AppError, DocumentStatus, Result};

/// One unit of background work.
#[derive(Debug, Clone)]
pub enum IngestJob {
    /// Process a document for the first time.
    Process {
        /// Id of the document to process.
        document_id: String,
    },
    /// Drop a document's existing points and process it again.
    Reindex {
        /// Id of the document to reindex.
        document_id: String,
    },
}

impl IngestJob {
    fn document_id(&self) -> &str {
        match self {
            IngestJob::Process { document_id } | IngestJob::Reindex { document_id } => document_id,
        }
    }
}

/// Worker pool with a single-flight guard per document id.
pub struct IngestScheduler {
    tx: mpsc::UnboundedSender<IngestJob>,
    in_flight: Arc<Mutex<HashSet<String>>>,
    handles: Vec<JoinHandle<()>>,
}

impl IngestScheduler {
    /// Start `workers` background workers over the given processor and
    /// document store.
    pub fn start(
        workers: usize,
        processor: Arc<DocumentProcessor>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<IngestJob>();
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let in_flight = Arc::new(Mutex::new(HashSet::new()));

        let handles = (0..workers.max(1))
            .map(|worker| {
                let rx = rx.clone();
                let in_flight = in_flight.clone();
                let processor = processor.clone();
                let documents = documents.clone();

                tokio::spawn(async move {
                    loop {
                        let job = { rx.lock().await.recv().await };
                        let Some(job) = job else { break };

                        let document_id = job.document_id().to_string();
                        tracing::info!(worker, document_id, "Starting ingestion job");
                        run_job(&processor, documents.as_ref(), job).await;
                        in_flight.lock().remove(&document_id);
                    }
                })
            })
            .collect();

        Self {
            tx,
            in_flight,
            handles,
        }
    }

    /// Queue a job, or reject it when a job for the same document is already
    /// queued or running.
    pub fn submit(&self, job: IngestJob) -> Result<()> {
        let document_id = job.document_id().to_string();

        {
            let mut in_flight = self.in_flight.lock();
            if !in_flight.insert(document_id.clone()) {
                return Err(AppError::AlreadyProcessing(document_id));
            }
        }

        if self.tx.send(job).is_err() {
            self.in_flight.lock().remove(&document_id);
            return Err(AppError::Internal("Scheduler is shut down".to_string()));
        }

        Ok(())
    }

    /// Stop accepting jobs, drain the queue and wait for the workers.
    pub async fn shutdown(self) {
        let Self { tx, handles, .. } = self;
        drop(tx);
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Ingestion worker panicked");
            }
        }
    }
}

async fn run_job(processor: &DocumentProcessor, documents: &dyn DocumentStore, job: IngestJob) {
    let document_id = job.document_id().to_string();

    if let Err(e) = documents
        .set_status(&document_id, DocumentStatus::Processing, None)
        .await
    {
        tracing::warn!(document_id, error = %e, "Cannot mark document as processing");
        return;
    }

    let outcome = async {
        let text = documents.fetch_text(&document_id).await?;
        match &job {
            IngestJob::Process { .. } => processor.process(&document_id, &text).await,
            IngestJob::Reindex { .. } => processor.reindex(&document_id, &text).await,
        }
    }
    .await;

    match outcome {
        Ok(processed) => {
            if let Err(e) = documents.set_meta(&document_id, &processed.meta).await {
                tracing::warn!(document_id, error = %e, "Metadata writeback failed");
            }
            if let Err(e) = documents
                .set_status(&document_id, DocumentStatus::Processed, None)
                .await
            {
                tracing::warn!(document_id, error = %e, "Status writeback failed");
            }
            tracing::info!(
                document_id,
                sections = processed.sections_indexed,
                "Ingestion job finished"
            );
        }
        Err(e) => {
            tracing::error!(document_id, error = %e, "Ingestion job failed");
            if let Err(e) = documents
                .set_status(&document_id, DocumentStatus::Error, Some(e.to_string()))
                .await
            {
                tracing::warn!(document_id, error = %e, "Status writeback failed");
            }
        }
    }
}
