use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use crate::publish::{PublishError, RecordMetadata, RecordSink};

#[derive(Debug, Clone)]
pub struct UploadJob {
    pub key: String,
    pub body: Vec<u8>,
    pub metadata: RecordMetadata,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadReport {
    pub uploaded: usize,
    pub failed: usize,
}

impl UploadReport {
    fn merge(&mut self, other: UploadReport) {
        self.uploaded += other.uploaded;
        self.failed += other.failed;
    }
}

/// Fixed set of upload workers fed through a bounded queue.
///
/// `submit` waits while the queue is full, so a slow sink throttles the
/// producer instead of growing memory. `finish` closes the queue, lets the
/// workers drain whatever is left and joins them.
pub struct UploadPool {
    tx: mpsc::Sender<UploadJob>,
    workers: Vec<JoinHandle<UploadReport>>,
}

impl UploadPool {
    pub fn start(sink: Arc<dyn RecordSink>, workers: usize, queue_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let workers = (0..workers.max(1))
            .map(|id| tokio::spawn(run_worker(id, rx.clone(), sink.clone())))
            .collect();

        Self { tx, workers }
    }

    pub async fn submit(&self, job: UploadJob) -> Result<(), PublishError> {
        self.tx.send(job).await.map_err(|_| PublishError::QueueClosed)
    }

    pub async fn finish(self) -> UploadReport {
        drop(self.tx);

        let mut report = UploadReport::default();
        for (id, handle) in self.workers.into_iter().enumerate() {
            match handle.await {
                Ok(worker_report) => report.merge(worker_report),
                Err(e) => log::error!("Upload worker {} did not finish cleanly: {}", id, e),
            }
        }
        report
    }
}

async fn run_worker(
    id: usize,
    rx: Arc<Mutex<mpsc::Receiver<UploadJob>>>,
    sink: Arc<dyn RecordSink>,
) -> UploadReport {
    let mut report = UploadReport::default();

    loop {
        let job = rx.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        let key = job.key.clone();
        let sink = sink.clone();
        let result =
            tokio::task::spawn_blocking(move || sink.put(&job.key, job.body, &job.metadata)).await;

        match result {
            Ok(Ok(())) => {
                log::debug!("Worker {} uploaded {}", id, key);
                report.uploaded += 1;
            }
            Ok(Err(e)) => {
                log::error!("Upload of {} failed: {}", key, e);
                report.failed += 1;
            }
            Err(e) => {
                log::error!("Upload of {} aborted: {}", key, e);
                report.failed += 1;
            }
        }
    }

    report
}
