use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use uuid::Uuid;

use crate::binning::LocatedFlight;
use crate::flight::TypeTable;
use crate::publish::{
    enrich, object_key, PublishError, RecordMetadata, RecordSink, UploadJob, UploadPool,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PublishSettings {
    pub prefix: String,
    pub workers: usize,
    pub queue_capacity: usize,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            prefix: "launchsites".to_string(),
            workers: 4,
            queue_capacity: 256,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub batch_id: Uuid,
    pub queued: usize,
    pub previously_sited: usize,
    pub unknown_type: usize,
    pub uploaded: usize,
    pub failed: usize,
    /// Production stopped early because `shutdown` resolved.
    pub cancelled: bool,
}

/// Enrich and upload every newly located flight.
///
/// Flights that already carried a launch site and flights with an
/// unrecognized sonde type are skipped and counted. When `shutdown` resolves
/// no further flights are queued; everything already queued is still
/// uploaded before this returns.
pub async fn publish_flights<F>(
    flights: Vec<LocatedFlight>,
    table: &TypeTable,
    sink: Arc<dyn RecordSink>,
    settings: &PublishSettings,
    shutdown: F,
) -> Result<PublishReport, PublishError>
where
    F: Future<Output = ()>,
{
    let mut report = PublishReport {
        batch_id: Uuid::new_v4(),
        ..Default::default()
    };
    let pool = UploadPool::start(sink, settings.workers, settings.queue_capacity);
    tokio::pin!(shutdown);

    let produced = produce(flights, table, settings, &pool, &mut report, shutdown).await;

    // Queued jobs are drained even when production failed
    let uploads = pool.finish().await;
    report.uploaded = uploads.uploaded;
    report.failed = uploads.failed;
    produced.map(|()| report)
}

async fn produce<F>(
    flights: Vec<LocatedFlight>,
    table: &TypeTable,
    settings: &PublishSettings,
    pool: &UploadPool,
    report: &mut PublishReport,
    mut shutdown: Pin<&mut F>,
) -> Result<(), PublishError>
where
    F: Future<Output = ()>,
{
    for flight in flights {
        if flight.previously_sited {
            report.previously_sited += 1;
            continue;
        }

        let summary = match enrich(&flight, table) {
            Ok(summary) => summary,
            Err(e @ PublishError::UnknownType { .. }) => {
                log::warn!("Not publishing {}: {}", flight.summary.serial(), e);
                report.unknown_type += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        let job = UploadJob {
            key: object_key(&settings.prefix, &flight.site_id, summary.serial()),
            metadata: RecordMetadata {
                serial: summary.serial().to_string(),
                launch_site: flight.site_id.clone(),
                sonde_type: summary.last.effective_type().to_string(),
                batch_id: report.batch_id,
                content_type: "application/json",
            },
            body: serde_json::to_vec(&summary)?,
        };

        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::warn!("Shutdown requested, draining upload queue");
                report.cancelled = true;
                break;
            }
            sent = pool.submit(job) => {
                sent?;
                report.queued += 1;
            }
        }
    }

    Ok(())
}
