use crate::controllers::counter::CounterController;
use crate::core::error::Error;
use crate::store::HashStore;
use crate::types::response::{Counter, ServerInfo};

pub(crate) async fn number_of_counters<S: HashStore>(
    controller: &CounterController<S>,
) -> Result<Counter, Error> {
    let records = controller.store().key_count().await?;

    Ok(Counter::new(
        "dbsize",
        i64::try_from(records).unwrap_or(i64::MAX),
        0,
    ))
}

pub(crate) fn server_info<S: HashStore>(controller: &CounterController<S>) -> ServerInfo {
    ServerInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        ttl_seconds: controller.ttl().as_secs(),
        track_modified: controller.tracks_modified(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::time::Duration;

    #[tokio::test]
    async fn counts_read_write_and_read_only_records() {
        let cc = CounterController::new(MemoryStore::new(), Duration::from_secs(60), true);

        let token = cc.create("UnitTest", None).await.unwrap();
        cc.create("Other", None).await.unwrap();
        cc.mint_read_only(&token).await.unwrap();

        let counter = number_of_counters(&cc).await.unwrap();

        assert_eq!(counter.name.as_deref(), Some("dbsize"));
        assert_eq!(counter.count, 3);
    }

    #[test]
    fn server_info_reports_settings() {
        let cc = CounterController::new(MemoryStore::new(), Duration::from_secs(60), false);

        let info = server_info(&cc);

        assert_eq!(info.name, "tokencount");
        assert_eq!(info.ttl_seconds, 60);
        assert!(!info.track_modified);
    }
}
