use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Token {
    pub(crate) token: String,
}

impl Token {
    pub(crate) fn new(token: String) -> Self {
        Self { token }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct Counter {
    pub(crate) name: Option<String>,
    pub(crate) count: i64,
    /// Last-modified epoch millis, 0 when unknown.
    pub(crate) modified: i64,
}

impl Counter {
    pub(crate) fn new(name: &str, count: i64, modified: i64) -> Self {
        Self {
            name: Some(name.to_owned()),
            count,
            modified,
        }
    }

    /// Returned when a whole record is deleted.
    pub(crate) fn empty() -> Self {
        Self {
            name: None,
            count: 0,
            modified: 0,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ServerInfo {
    pub(crate) name: &'static str,
    pub(crate) version: &'static str,
    pub(crate) ttl_seconds: u64,
    pub(crate) track_modified: bool,
}
