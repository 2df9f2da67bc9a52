//! # Print Queue
//!
//! One background task drains print jobs strictly in enqueue order, one
//! at a time, so bytes of two documents never interleave on the shared
//! characteristic.
//!
//! ## Chunked Writes
//!
//! Each job is written in chunks of at most [`MAX_CHUNK_SIZE`] bytes with
//! a fixed pause between chunks so the printer's buffer is not overrun.
//!
//! ## Retry
//!
//! A connection, protocol or transmission failure drops the session,
//! reconnects and resends the whole job from its first chunk, once. A
//! printer may therefore print the start of a job twice.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::connection::ConnectionManager;
use crate::error::{Result, TicketeraError};
use crate::printer::{PrinterDevice, SizeClass};
use crate::receipt::PrintOptions;

/// Largest chunk a single characteristic write may carry.
pub const MAX_CHUNK_SIZE: usize = 512;

/// Default chunk size (bytes)
pub const DEFAULT_CHUNK_SIZE: usize = 512;

/// Default delay between chunks (milliseconds)
pub const DEFAULT_CHUNK_DELAY_MS: u64 = 50;

/// Chunking parameters, read from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChunkSettings {
    pub chunk_size: usize,
    pub chunk_delay_ms: u64,
}

impl Default for ChunkSettings {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_delay_ms: DEFAULT_CHUNK_DELAY_MS,
        }
    }
}

impl ChunkSettings {
    /// Chunk size clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn effective_chunk_size(&self) -> usize {
        self.chunk_size.clamp(1, MAX_CHUNK_SIZE)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.chunk_delay_ms)
    }
}

/// A fully rendered document (or merged documents) bound for one printer.
#[derive(Debug, Clone)]
pub struct PrintJob {
    pub id: Uuid,
    pub printer: PrinterDevice,
    pub bytes: Vec<u8>,
    pub size_class: SizeClass,
    pub options: PrintOptions,
}

impl PrintJob {
    pub fn new(printer: PrinterDevice, bytes: Vec<u8>, size_class: SizeClass, options: PrintOptions) -> Self {
        Self {
            id: Uuid::new_v4(),
            printer,
            bytes,
            size_class,
            options,
        }
    }
}

/// What happened to a job that printed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReport {
    pub job_id: Uuid,
    pub bytes_sent: usize,
    pub chunks: usize,
    /// 1, or 2 when the job was retried.
    pub attempts: u32,
}

/// Resolves when its job finishes.
#[derive(Debug)]
pub struct JobHandle {
    job_id: Uuid,
    rx: oneshot::Receiver<Result<JobReport>>,
}

impl JobHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    /// Wait for the job to print or fail.
    pub async fn wait(self) -> Result<JobReport> {
        self.rx.await.unwrap_or_else(|_| {
            Err(TicketeraError::Transmission(
                "Print queue stopped before the job ran".to_string(),
            ))
        })
    }
}

struct Entry {
    job: PrintJob,
    done: oneshot::Sender<Result<JobReport>>,
}

/// FIFO print queue backed by one tokio task.
///
/// Cloning shares the same queue.
#[derive(Clone)]
pub struct PrintQueue {
    tx: mpsc::UnboundedSender<Entry>,
    connections: Arc<ConnectionManager>,
}

impl PrintQueue {
    /// Start the runner task. Must be called inside a tokio runtime.
    pub fn spawn(connections: Arc<ConnectionManager>, settings: ChunkSettings) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let runner = Runner {
            connections: connections.clone(),
            settings,
        };
        tokio::spawn(runner.run(rx));
        Self { tx, connections }
    }

    /// Queue a job. Never blocks.
    pub fn enqueue(&self, job: PrintJob) -> JobHandle {
        let (done, rx) = oneshot::channel();
        let job_id = job.id;
        debug!(job = %job_id, bytes = job.bytes.len(), "Job queued");
        if let Err(mpsc::error::SendError(entry)) = self.tx.send(Entry { job, done }) {
            let _ = entry.done.send(Err(TicketeraError::Transmission(
                "Print queue is not running".to_string(),
            )));
        }
        JobHandle { job_id, rx }
    }

    /// The connection manager jobs are written through.
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }
}

struct Runner {
    connections: Arc<ConnectionManager>,
    settings: ChunkSettings,
}

impl Runner {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Entry>) {
        while let Some(Entry { job, done }) = rx.recv().await {
            let span = info_span!("print_job", job = %job.id, printer = %job.printer.id);
            let result = self.execute(&job).instrument(span).await;
            // The caller may have stopped waiting
            let _ = done.send(result);
        }
        debug!("Print queue closed");
    }

    async fn execute(&self, job: &PrintJob) -> Result<JobReport> {
        let mut attempts = 1;
        let mut result = self.attempt(job).await;

        if let Err(e) = &result {
            if e.is_retryable() {
                warn!(error = %e, "Job failed, reconnecting for one retry");
                self.connections.invalidate(&job.printer.id).await;
                attempts += 1;
                result = self.attempt(job).await;
            }
        }

        match result {
            Ok((bytes_sent, chunks)) => {
                info!(bytes = bytes_sent, chunks, attempts, "Job printed");
                Ok(JobReport {
                    job_id: job.id,
                    bytes_sent,
                    chunks,
                    attempts,
                })
            }
            Err(e) => {
                if e.is_user_cancelled() {
                    debug!("Job declined");
                } else {
                    warn!(error = %e, attempts, "Job failed");
                }
                self.connections.invalidate(&job.printer.id).await;
                Err(e)
            }
        }
    }

    /// Write every chunk of the job; returns (bytes, chunks).
    async fn attempt(&self, job: &PrintJob) -> Result<(usize, usize)> {
        let channel = self.connections.resolve_writable(&job.printer).await?;
        let delay = self.settings.delay();
        let mut sent = 0;
        let mut chunks = 0;

        for (i, chunk) in job.bytes.chunks(self.settings.effective_chunk_size()).enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            channel.write(chunk).await?;
            sent += chunk.len();
            chunks += 1;
        }
        Ok((sent, chunks))
    }
}
