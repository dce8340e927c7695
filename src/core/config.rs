use config::Config;
use serde::Deserialize;
use std::time::Duration;

use crate::core::error::ConfigError;

/// Backend that holds the records.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub(crate) struct Args {
    pub(crate) port: u16,
    pub(crate) log_level: String,
    pub(crate) store: StoreKind,
    pub(crate) database_host: String,
    pub(crate) database_port: u16,
    pub(crate) database_name: String,
    pub(crate) database_user: String,
    pub(crate) database_password: String,
    pub(crate) max_connections: u32,
    pub(crate) acquire_timeout_secs: u64,
    pub(crate) ttl_secs: u64,
    pub(crate) track_modified: bool,
    pub(crate) sweep_interval_secs: u64,
}

impl Args {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder().add_source(config::Environment::with_prefix("TOKENCOUNT")),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let config = builder
            .set_default("port", 8080)?
            .set_default("log_level", "info")?
            .set_default("store", "postgres")?
            .set_default("database_host", "localhost")?
            .set_default("database_port", 5432)?
            .set_default("database_name", "tokencount")?
            .set_default("database_user", "postgres")?
            .set_default("database_password", "")?
            .set_default("max_connections", 16)?
            .set_default("acquire_timeout_secs", 5)?
            .set_default("ttl_secs", 604_800)?
            .set_default("track_modified", true)?
            .set_default("sweep_interval_secs", 60)?
            .build()?;

        Ok(config.try_deserialize::<Args>()?)
    }

    pub(crate) fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.database_user,
            self.database_password,
            self.database_host,
            self.database_port,
            self.database_name
        )
    }

    pub(crate) fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub(crate) fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub(crate) fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_overrides() {
        let args = Args::from_builder(Config::builder()).unwrap();

        assert_eq!(args.port, 8080);
        assert_eq!(args.store, StoreKind::Postgres);
        assert_eq!(args.ttl(), Duration::from_secs(604_800));
        assert!(args.track_modified);
        assert_eq!(
            args.database_url(),
            "postgresql://postgres:@localhost:5432/tokencount"
        );
    }

    #[test]
    fn overrides_take_precedence() {
        let builder = Config::builder()
            .set_override("store", "memory")
            .unwrap()
            .set_override("ttl_secs", 60)
            .unwrap()
            .set_override("track_modified", false)
            .unwrap();

        let args = Args::from_builder(builder).unwrap();

        assert_eq!(args.store, StoreKind::Memory);
        assert_eq!(args.ttl(), Duration::from_secs(60));
        assert!(!args.track_modified);
    }

    #[test]
    fn unknown_store_backends_are_rejected() {
        let builder = Config::builder().set_override("store", "redis").unwrap();

        assert!(matches!(
            Args::from_builder(builder),
            Err(ConfigError::Config(_))
        ));
    }
}
