use std::time::Duration;

use crate::store::HashStore;

/// Periodically drops records whose time-to-live has lapsed.
#[derive(Debug)]
pub(crate) struct Sweeper<S> {
    store: S,
    period: Duration,
}

impl<S: HashStore> Sweeper<S> {
    pub(crate) fn new(store: S, period: Duration) -> Self {
        Self { store, period }
    }

    pub(crate) async fn sweep(&self) -> u64 {
        match self.store.purge_expired().await {
            Ok(0) => 0,
            Ok(purged) => {
                tracing::info!(purged, "purged expired records");
                purged
            }
            Err(e) => {
                tracing::error!("Error purging expired records, {:?}", e);
                0
            }
        }
    }

    pub(crate) async fn run(&self) {
        loop {
            tokio::time::sleep(self.period).await;

            self.sweep().await;
        }
    }
}
