use memeforge_core::Clock;
use memeforge_storage::Storage;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

/// Counts from one sweep across all stores
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    /// Stores that could not be listed plus files that could not be deleted
    pub failed: usize,
}

/// Deletes files older than the retention age from the upload and output directories
#[derive(Clone)]
pub struct RetentionSweeper {
    stores: Vec<Arc<dyn Storage>>,
    clock: Arc<dyn Clock>,
    max_age: chrono::Duration,
    sweep_interval: Duration,
}

impl RetentionSweeper {
    pub fn new(
        stores: Vec<Arc<dyn Storage>>,
        clock: Arc<dyn Clock>,
        max_age: chrono::Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            stores,
            clock,
            max_age,
            sweep_interval,
        }
    }

    /// Start the background sweep. The first sweep runs immediately.
    /// Returns a JoinHandle for graceful shutdown
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut sweep_interval = interval(self.sweep_interval);

            loop {
                sweep_interval.tick().await;

                let report = self.sweep_once().await;
                if report.failed > 0 {
                    tracing::warn!(
                        scanned = report.scanned,
                        deleted = report.deleted,
                        failed = report.failed,
                        "Retention sweep completed with failures"
                    );
                } else {
                    tracing::info!(
                        scanned = report.scanned,
                        deleted = report.deleted,
                        "Retention sweep completed"
                    );
                }
            }
        })
    }

    /// Run one sweep over every store. Never fails; problems are logged and counted.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "retention_sweep"))]
    pub async fn sweep_once(&self) -> SweepReport {
        let mut report = SweepReport::default();
        let now = self.clock.now();

        for store in &self.stores {
            let files = match store.list().await {
                Ok(files) => files,
                Err(e) => {
                    tracing::error!(storage = %store.label(), error = %e, "Failed to list files for retention sweep");
                    report.failed += 1;
                    continue;
                }
            };

            for file in files {
                report.scanned += 1;

                if now - file.modified <= self.max_age {
                    continue;
                }

                match store.delete(&file.key).await {
                    Ok(()) => {
                        tracing::debug!(
                            storage = %store.label(),
                            key = %file.key,
                            modified = %file.modified,
                            "Deleted expired file"
                        );
                        report.deleted += 1;
                    }
                    Err(e) => {
                        tracing::error!(
                            storage = %store.label(),
                            key = %file.key,
                            error = %e,
                            "Failed to delete expired file, continuing"
                        );
                        report.failed += 1;
                    }
                }
            }
        }

        report
    }
}
