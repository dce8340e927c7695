use crate::controllers::counter::CounterController;
use crate::core::config::{Args, StoreKind};
use crate::core::error::ConfigError;
use crate::store::{Backend, MemoryStore, PgStore};

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) counter_controller: CounterController<Backend>,
}

impl AppState {
    pub(crate) async fn new(config: &Args) -> Result<Self, ConfigError> {
        let backend = match config.store {
            StoreKind::Postgres => {
                let store = PgStore::connect(
                    &config.database_url(),
                    config.max_connections,
                    config.acquire_timeout(),
                )
                .await?;

                store.migrate().await?;

                Backend::Postgres(store)
            }
            StoreKind::Memory => Backend::Memory(MemoryStore::new()),
        };

        Ok(Self::with_backend(backend, config))
    }

    pub(crate) fn with_backend(backend: Backend, config: &Args) -> Self {
        AppState {
            counter_controller: CounterController::new(
                backend,
                config.ttl(),
                config.track_modified,
            ),
        }
    }
}
