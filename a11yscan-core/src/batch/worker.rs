//! Worker pool for parallel document scans

use super::{JobOutcome, ScanJob};
use crate::scan::Scanner;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

enum WorkerMessage {
    Job(usize, ScanJob),
    Shutdown,
}

/// Fixed set of threads scanning jobs from a shared queue
pub struct WorkerPool {
    workers: Vec<Worker>,
    sender: mpsc::Sender<WorkerMessage>,
    results: mpsc::Receiver<(usize, JobOutcome)>,
}

impl WorkerPool {
    pub fn new(num_workers: usize, scanner: Arc<Scanner>) -> Self {
        let (sender, receiver) = mpsc::channel();
        let receiver = Arc::new(Mutex::new(receiver));
        let (result_sender, results) = mpsc::channel();

        let workers = (0..num_workers.max(1))
            .map(|id| {
                Worker::new(
                    id,
                    Arc::clone(&receiver),
                    result_sender.clone(),
                    Arc::clone(&scanner),
                )
            })
            .collect();

        Self {
            workers,
            sender,
            results,
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Scan all jobs, returning outcomes in submission order.
    ///
    /// A job whose worker died without reporting is recorded as failed.
    pub fn process_jobs(self, jobs: Vec<ScanJob>) -> Vec<JobOutcome> {
        let names: Vec<String> = jobs.iter().map(|job| job.name.clone()).collect();

        for (idx, job) in jobs.into_iter().enumerate() {
            if self.sender.send(WorkerMessage::Job(idx, job)).is_err() {
                break;
            }
        }
        for _ in &self.workers {
            let _ = self.sender.send(WorkerMessage::Shutdown);
        }
        for worker in self.workers {
            worker.join();
        }

        let mut outcomes: Vec<Option<JobOutcome>> = vec![None; names.len()];
        for (idx, outcome) in self.results.try_iter() {
            if let Some(slot) = outcomes.get_mut(idx) {
                *slot = Some(outcome);
            }
        }

        outcomes
            .into_iter()
            .zip(names)
            .map(|(outcome, name)| {
                outcome.unwrap_or_else(|| JobOutcome::Failed {
                    name,
                    elapsed_ms: 0,
                    error: "worker exited before reporting".to_string(),
                })
            })
            .collect()
    }
}

struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    fn new(
        id: usize,
        receiver: Arc<Mutex<mpsc::Receiver<WorkerMessage>>>,
        results: mpsc::Sender<(usize, JobOutcome)>,
        scanner: Arc<Scanner>,
    ) -> Self {
        let thread = thread::spawn(move || loop {
            let message = {
                let Ok(receiver) = receiver.lock() else {
                    break;
                };
                receiver.recv()
            };

            match message {
                Ok(WorkerMessage::Job(idx, job)) => {
                    debug!("worker {} scanning {}", id, job.name);
                    let outcome = run_job(&scanner, job);
                    if results.send((idx, outcome)).is_err() {
                        break;
                    }
                }
                Ok(WorkerMessage::Shutdown) | Err(_) => break,
            }
        });

        Self {
            id,
            thread: Some(thread),
        }
    }

    fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("worker {} panicked", self.id);
            }
        }
    }
}

/// Scan one job; errors and panics become a failed outcome
fn run_job(scanner: &Scanner, job: ScanJob) -> JobOutcome {
    let start = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        scanner.scan_files(&job.validator_report, &job.snapshot)
    }));
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(report)) => JobOutcome::Scanned {
            name: job.name,
            elapsed_ms,
            report: Box::new(report),
        },
        Ok(Err(e)) => {
            warn!("{}: {}", job.name, e);
            JobOutcome::Failed {
                name: job.name,
                elapsed_ms,
                error: e.to_string(),
            }
        }
        Err(_) => {
            warn!("{}: scan panicked", job.name);
            JobOutcome::Failed {
                name: job.name,
                elapsed_ms,
                error: "scan panicked".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_creation() {
        let pool = WorkerPool::new(3, Arc::new(Scanner::default()));
        assert_eq!(pool.len(), 3);
        assert!(pool.process_jobs(vec![]).is_empty());
    }

    #[test]
    fn test_zero_workers_still_runs() {
        let pool = WorkerPool::new(0, Arc::new(Scanner::default()));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_missing_files_fail_individually() {
        let pool = WorkerPool::new(2, Arc::new(Scanner::default()));
        let jobs = vec![
            ScanJob::new("a", "/nonexistent/a.json", "/nonexistent/a-report.json"),
            ScanJob::new("b", "/nonexistent/b.json", "/nonexistent/b-report.json"),
        ];
        let outcomes = pool.process_jobs(jobs);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].name(), "a");
        assert_eq!(outcomes[1].name(), "b");
        assert!(outcomes.iter().all(|o| !o.is_scanned()));
    }
}
