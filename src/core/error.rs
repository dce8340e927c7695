use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Database migration error: {0}")]
    DatabaseMigration(#[from] sqlx::migrate::MigrateError),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Token not found")]
    TokenNotFound,
    #[error("Access denied")]
    AccessDenied,
    #[error("Counter not found")]
    NameNotFound,
    #[error("Counter name is reserved")]
    NameReserved,
    #[error("Token does not hold exactly one counter")]
    AmbiguousCounter,
    #[error("Counter value out of range")]
    Overflow,
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),
}

impl Error {
    fn status(&self) -> (StatusCode, &'static str) {
        match self {
            Error::TokenNotFound => (StatusCode::NOT_FOUND, "Token not found"),
            Error::AccessDenied => (StatusCode::FORBIDDEN, "Access denied"),
            Error::NameNotFound => (StatusCode::NOT_FOUND, "Counter not found"),
            Error::NameReserved => (StatusCode::CONFLICT, "Counter name is reserved"),
            Error::AmbiguousCounter => (
                StatusCode::BAD_REQUEST,
                "Token does not hold exactly one counter",
            ),
            Error::Overflow => (StatusCode::BAD_REQUEST, "Counter value out of range"),
            Error::CorruptRecord(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Corrupt record"),
            Error::Sql(_) => (StatusCode::SERVICE_UNAVAILABLE, "Store unavailable"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status();

        if status.is_server_error() {
            tracing::error!("{:?}", self);
        } else {
            tracing::debug!("{}", self);
        }

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_distinguishable() {
        assert_eq!(Error::TokenNotFound.status().0, StatusCode::NOT_FOUND);
        assert_eq!(Error::AccessDenied.status().0, StatusCode::FORBIDDEN);
        assert_eq!(Error::NameReserved.status().0, StatusCode::CONFLICT);
        assert_eq!(Error::AmbiguousCounter.status().0, StatusCode::BAD_REQUEST);
        assert_ne!(Error::TokenNotFound.status().1, Error::NameNotFound.status().1);
    }

    #[test]
    fn store_failures_are_not_client_errors() {
        let (status, _) = Error::Sql(sqlx::Error::PoolTimedOut).status();

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
