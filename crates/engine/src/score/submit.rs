use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("ranking service unavailable: {0}")]
    Unavailable(String),
    #[error("ranking service rejected score {encoded}: {reason}")]
    Rejected { encoded: i64, reason: String },
}

/// Remote leaderboard. Called from the submission worker thread only.
pub trait RankingService: Send + 'static {
    fn submit_score(&mut self, encoded: i64) -> Result<(), SubmitError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    pub accepted: u32,
    pub failed: u32,
}

/// Fire-and-forget score submission. `submit` never blocks the caller;
/// failures are logged on the worker and otherwise dropped.
#[derive(Debug)]
pub struct ScoreSubmitter {
    sender: Option<Sender<i64>>,
    worker: Option<JoinHandle<SubmissionReport>>,
}

impl ScoreSubmitter {
    pub fn spawn<S: RankingService>(service: S) -> Self {
        let (sender, receiver) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("score-submit".to_string())
            .spawn(move || run_submission_worker(service, receiver));
        match worker {
            Ok(worker) => Self {
                sender: Some(sender),
                worker: Some(worker),
            },
            Err(error) => {
                warn!(error = %error, "score_submitter_spawn_failed");
                Self {
                    sender: None,
                    worker: None,
                }
            }
        }
    }

    /// Returns `false` when the worker is gone and the score was dropped.
    pub fn submit(&self, encoded: i64) -> bool {
        let Some(sender) = &self.sender else {
            warn!(encoded, "score_submit_dropped_no_worker");
            return false;
        };
        if sender.send(encoded).is_err() {
            warn!(encoded, "score_submit_dropped_worker_exited");
            return false;
        }
        true
    }

    /// Closes the queue and waits for pending submissions to drain.
    pub fn shutdown(mut self) -> SubmissionReport {
        self.sender.take();
        match self.worker.take().map(JoinHandle::join) {
            Some(Ok(report)) => report,
            Some(Err(_)) => {
                warn!("score_submitter_worker_panicked");
                SubmissionReport::default()
            }
            None => SubmissionReport::default(),
        }
    }
}

impl Drop for ScoreSubmitter {
    fn drop(&mut self) {
        // Detach: dropping the sender lets the worker finish on its own.
        self.sender.take();
    }
}

fn run_submission_worker<S: RankingService>(
    mut service: S,
    receiver: Receiver<i64>,
) -> SubmissionReport {
    let mut report = SubmissionReport::default();
    for encoded in receiver {
        match service.submit_score(encoded) {
            Ok(()) => {
                report.accepted = report.accepted.saturating_add(1);
                info!(encoded, "score_submitted");
            }
            Err(error) => {
                report.failed = report.failed.saturating_add(1);
                warn!(encoded, error = %error, "score_submit_failed");
            }
        }
    }
    report
}
