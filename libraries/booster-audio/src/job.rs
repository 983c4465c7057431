//! Background processing job
//!
//! Runs ingestion and the pipeline on a dedicated thread so the caller
//! stays responsive, and hands back exactly one completion event.
//!
//! ```text
//! Caller                          booster-worker thread
//!   │  ProcessingJob::spawn(req)        │
//!   │──────────────────────────────────>│ ingest + pipeline
//!   │                                   │
//!   │  poll() / wait() -> JobEvent      │
//!   │<──────────────────────────────────│
//! ```

use crate::config::PipelineConfig;
use crate::pipeline::{CancelToken, Pipeline, ProcessedAudio};
use booster_core::{BoosterError, Result};
use booster_loudness::TargetRmsLevel;
use crossbeam_channel::{bounded, Receiver, TryRecvError};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Instant;

/// What to process
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Input file
    pub path: PathBuf,
    /// Target RMS level
    pub target: TargetRmsLevel,
    /// Stage configuration
    pub config: PipelineConfig,
}

/// Completion event, delivered once per job
#[derive(Debug)]
pub enum JobEvent {
    /// The run succeeded
    Completed(ProcessedAudio),
    /// The run failed; nothing was produced
    Failed(BoosterError),
}

impl JobEvent {
    /// Convert into a `Result`
    pub fn into_result(self) -> Result<ProcessedAudio> {
        match self {
            Self::Completed(processed) => Ok(processed),
            Self::Failed(err) => Err(err),
        }
    }
}

/// Handle to a running job
pub struct ProcessingJob {
    events: Receiver<JobEvent>,
    token: CancelToken,
    handle: Option<JoinHandle<()>>,
    delivered: bool,
}

impl ProcessingJob {
    /// Start processing on a worker thread
    ///
    /// # Errors
    /// `Io` if the thread cannot be spawned
    pub fn spawn(request: JobRequest) -> Result<Self> {
        let (event_tx, events) = bounded::<JobEvent>(1);
        let token = CancelToken::new();
        let worker_token = token.clone();

        let handle = thread::Builder::new()
            .name("booster-worker".to_string())
            .spawn(move || {
                let event = Self::run(&request, &worker_token);
                if event_tx.send(event).is_err() {
                    tracing::debug!("Job handle dropped before completion");
                }
            })?;

        Ok(Self {
            events,
            token,
            handle: Some(handle),
            delivered: false,
        })
    }

    fn run(request: &JobRequest, token: &CancelToken) -> JobEvent {
        let start = Instant::now();
        tracing::info!(path = %request.path.display(), "Processing started");

        let result = Pipeline::new(request.config.clone())
            .and_then(|pipeline| pipeline.process_file(&request.path, request.target, token));

        match result {
            Ok(processed) => {
                tracing::info!(
                    path = %request.path.display(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Processing completed"
                );
                JobEvent::Completed(processed)
            }
            Err(err) => {
                tracing::error!(path = %request.path.display(), error = %err, "Processing failed");
                JobEvent::Failed(err)
            }
        }
    }

    /// Request cancellation at the next stage boundary
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Non-blocking check for the completion event
    ///
    /// Returns the event once; later calls return `None`.
    pub fn poll(&mut self) -> Option<JobEvent> {
        if self.delivered {
            return None;
        }
        let event = match self.events.try_recv() {
            Ok(event) => event,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Self::worker_lost(),
        };
        self.finish();
        Some(event)
    }

    /// Block until the job finishes
    pub fn wait(mut self) -> JobEvent {
        if self.delivered {
            return Self::worker_lost();
        }
        let event = self.events.recv().unwrap_or_else(|_| Self::worker_lost());
        self.finish();
        event
    }

    fn finish(&mut self) {
        self.delivered = true;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Processing worker panicked");
            }
        }
    }

    fn worker_lost() -> JobEvent {
        JobEvent::Failed(BoosterError::Io(std::io::Error::other(
            "processing worker exited without a result",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booster_core::ErrorKind;

    #[test]
    fn unsupported_file_fails_through_the_event() {
        let job = ProcessingJob::spawn(JobRequest {
            path: PathBuf::from("cover.png"),
            target: TargetRmsLevel::default(),
            config: PipelineConfig::default(),
        })
        .unwrap();

        let err = job.wait().into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn poll_delivers_once() {
        let mut job = ProcessingJob::spawn(JobRequest {
            path: PathBuf::from("/missing/input.wav"),
            target: TargetRmsLevel::default(),
            config: PipelineConfig::default(),
        })
        .unwrap();

        let event = loop {
            if let Some(event) = job.poll() {
                break event;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(matches!(event, JobEvent::Failed(_)));
        assert!(job.poll().is_none());
    }
}
