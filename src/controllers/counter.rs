use chrono::Utc;
use std::time::Duration;
use tracing::instrument;

use crate::core::error::Error;
use crate::store::HashStore;
use crate::token::{self, ACCESS_FIELD, Access, DELEGATE_FIELD};
use crate::types::response::Counter;

/// Outcome of looking up a record's stored access level.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AccessCheck {
    Granted,
    NotFound,
    Forbidden,
}

#[derive(Clone, Debug)]
pub(crate) struct CounterController<S> {
    store: S,
    ttl: Duration,
    track_modified: bool,
}

impl<S: HashStore> CounterController<S> {
    pub(crate) fn new(store: S, ttl: Duration, track_modified: bool) -> Self {
        Self {
            store,
            ttl,
            track_modified,
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    pub(crate) fn tracks_modified(&self) -> bool {
        self.track_modified
    }

    #[instrument(skip(self))]
    pub(crate) async fn create(&self, name: &str, initial: Option<i64>) -> Result<String, Error> {
        validate_name(name)?;

        let token = token::mint(Access::ReadWrite);
        let count = initial.unwrap_or(0).to_string();
        let stamp = now_millis().to_string();
        let stamp_field = token::modified_field(name);

        let mut fields = vec![
            (name, count.as_str()),
            (ACCESS_FIELD, Access::ReadWrite.as_str()),
        ];
        if self.track_modified {
            fields.push((stamp_field.as_str(), stamp.as_str()));
        }

        self.store.hset(&token, &fields).await?;
        self.store.expire(&token, self.ttl).await?;

        tracing::info!(token = %token, "created counter");

        Ok(token)
    }

    #[instrument(skip(self))]
    pub(crate) async fn add_counter(
        &self,
        token: &str,
        name: &str,
        initial: Option<i64>,
    ) -> Result<Counter, Error> {
        validate_name(name)?;
        self.require_read_write(token).await?;

        let count = initial.unwrap_or(0);
        let modified = self.write_value(token, name, count).await?;
        self.store.expire(token, self.ttl).await?;

        Ok(Counter::new(name, count, modified))
    }

    /// Removes one counter, or the whole record when `name` is omitted.
    #[instrument(skip(self))]
    pub(crate) async fn delete_counter(
        &self,
        token: &str,
        name: Option<&str>,
    ) -> Result<Counter, Error> {
        self.require_read_write(token).await?;

        let Some(name) = name else {
            self.store.del(token).await?;
            tracing::info!(token, "deleted record");
            return Ok(Counter::empty());
        };

        let counter = self.named_counter(token, name).await?;

        self.store.hdel(token, &[name]).await?;
        self.store.expire(token, self.ttl).await?;

        Ok(counter)
    }

    /// Reads through a read-only token by forwarding exactly once to the
    /// read-write record it names.
    #[instrument(skip(self))]
    pub(crate) async fn read(&self, token: &str, name: Option<&str>) -> Result<Vec<Counter>, Error> {
        let access = self
            .store
            .hget(token, ACCESS_FIELD)
            .await?
            .ok_or(Error::TokenNotFound)?;

        let target = match Access::parse(&access) {
            Some(Access::ReadWrite) => token.to_owned(),
            _ => {
                tracing::debug!(token, "forwarding to read-write token");

                let delegate = self
                    .store
                    .hget(token, DELEGATE_FIELD)
                    .await?
                    .ok_or(Error::TokenNotFound)?;
                self.store.expire(token, self.ttl).await?;

                if self.check_access(&delegate).await? != AccessCheck::Granted {
                    tracing::warn!(
                        token,
                        delegate = %delegate,
                        "read-only token has no read-write delegate"
                    );
                    return Err(Error::TokenNotFound);
                }

                delegate
            }
        };

        let counters = match name {
            Some(name) => vec![self.named_counter(&target, name).await?],
            None => self.all_counters(&target).await?,
        };

        self.store.expire(&target, self.ttl).await?;

        Ok(counters)
    }

    #[instrument(skip(self))]
    pub(crate) async fn mint_read_only(&self, token: &str) -> Result<String, Error> {
        self.require_read_write(token).await?;

        let read_only = token::mint(Access::ReadOnly);

        self.store
            .hset(
                &read_only,
                &[
                    (DELEGATE_FIELD, token),
                    (ACCESS_FIELD, Access::ReadOnly.as_str()),
                ],
            )
            .await?;
        self.store.expire(&read_only, self.ttl).await?;
        self.store.expire(token, self.ttl).await?;

        tracing::info!(token = %read_only, "created read-only token");

        Ok(read_only)
    }

    #[instrument(skip(self))]
    pub(crate) async fn increment(
        &self,
        token: &str,
        name: Option<&str>,
        delta: Option<i64>,
    ) -> Result<Counter, Error> {
        self.apply_delta(token, name, Step::Up(delta.unwrap_or(1)))
            .await
    }

    #[instrument(skip(self))]
    pub(crate) async fn decrement(
        &self,
        token: &str,
        name: Option<&str>,
        delta: Option<i64>,
    ) -> Result<Counter, Error> {
        self.apply_delta(token, name, Step::Down(delta.unwrap_or(1)))
            .await
    }

    #[instrument(skip(self))]
    pub(crate) async fn reset(
        &self,
        token: &str,
        name: Option<&str>,
        value: Option<i64>,
    ) -> Result<Counter, Error> {
        self.require_read_write(token).await?;

        let name = self.target_name(token, name).await?;
        let count = value.unwrap_or(1);
        let modified = self.write_value(token, &name, count).await?;
        self.store.expire(token, self.ttl).await?;

        Ok(Counter::new(&name, count, modified))
    }

    pub(crate) async fn check_access(&self, token: &str) -> Result<AccessCheck, Error> {
        let check = match self.store.hget(token, ACCESS_FIELD).await? {
            None => AccessCheck::NotFound,
            Some(access) if Access::parse(&access) == Some(Access::ReadWrite) => {
                AccessCheck::Granted
            }
            Some(_) => AccessCheck::Forbidden,
        };

        Ok(check)
    }

    /// The record's only counter, if it holds exactly one.
    pub(crate) async fn resolve_single(&self, token: &str) -> Result<Option<Counter>, Error> {
        let mut counters = self.all_counters(token).await?;

        if counters.len() == 1 {
            Ok(counters.pop())
        } else {
            Ok(None)
        }
    }

    async fn require_read_write(&self, token: &str) -> Result<(), Error> {
        match self.check_access(token).await? {
            AccessCheck::Granted => Ok(()),
            AccessCheck::NotFound => {
                tracing::debug!(token, hint = ?token::classify(token), "token unknown");
                Err(Error::TokenNotFound)
            }
            AccessCheck::Forbidden => {
                tracing::debug!(token, "token is not read-write");
                Err(Error::AccessDenied)
            }
        }
    }

    async fn apply_delta(
        &self,
        token: &str,
        name: Option<&str>,
        step: Step,
    ) -> Result<Counter, Error> {
        self.require_read_write(token).await?;

        let delta = step.signed()?;
        let name = self.target_name(token, name).await?;
        let count = self.store.hincr_by(token, &name, delta).await?;
        let modified = self.stamp(token, &name).await?;
        self.store.expire(token, self.ttl).await?;

        Ok(Counter::new(&name, count, modified))
    }

    /// Names the counter an operation acts on: the given one if it exists,
    /// otherwise the record's only counter.
    async fn target_name(&self, token: &str, name: Option<&str>) -> Result<String, Error> {
        match name {
            Some(name) => {
                if token::is_reserved(name) || self.store.hget(token, name).await?.is_none() {
                    return Err(Error::NameNotFound);
                }
                Ok(name.to_owned())
            }
            None => self
                .resolve_single(token)
                .await?
                .and_then(|counter| counter.name)
                .ok_or(Error::AmbiguousCounter),
        }
    }

    async fn named_counter(&self, token: &str, name: &str) -> Result<Counter, Error> {
        if token::is_reserved(name) {
            return Err(Error::NameNotFound);
        }

        let value = self
            .store
            .hget(token, name)
            .await?
            .ok_or(Error::NameNotFound)?;
        let modified = self.store.hget(token, &token::modified_field(name)).await?;

        Ok(Counter::new(
            name,
            parse_value(token, &value)?,
            parse_stamp(token, modified.as_deref())?,
        ))
    }

    async fn all_counters(&self, token: &str) -> Result<Vec<Counter>, Error> {
        let fields = self.store.hget_all(token).await?;

        let mut counters = fields
            .iter()
            .filter(|(field, _)| !token::is_reserved(field))
            .map(|(name, value)| {
                let modified = fields.get(&token::modified_field(name));

                Ok::<_, Error>(Counter::new(
                    name,
                    parse_value(token, value)?,
                    parse_stamp(token, modified.map(String::as_str))?,
                ))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        counters.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(counters)
    }

    /// Sets a counter and stamps it, returning the stamp.
    async fn write_value(&self, token: &str, name: &str, count: i64) -> Result<i64, Error> {
        let count = count.to_string();

        if !self.track_modified {
            self.store.hset(token, &[(name, count.as_str())]).await?;
            return Ok(0);
        }

        let modified = now_millis();
        let stamp = modified.to_string();
        let stamp_field = token::modified_field(name);

        self.store
            .hset(
                token,
                &[(name, count.as_str()), (stamp_field.as_str(), stamp.as_str())],
            )
            .await?;

        Ok(modified)
    }

    async fn stamp(&self, token: &str, name: &str) -> Result<i64, Error> {
        if !self.track_modified {
            return Ok(0);
        }

        let modified = now_millis();
        let stamp = modified.to_string();

        self.store
            .hset(token, &[(token::modified_field(name).as_str(), stamp.as_str())])
            .await?;

        Ok(modified)
    }
}

/// Requested change to a counter. A decrement is negated only once access
/// has been granted.
#[derive(Debug)]
enum Step {
    Up(i64),
    Down(i64),
}

impl Step {
    fn signed(self) -> Result<i64, Error> {
        match self {
            Step::Up(delta) => Ok(delta),
            Step::Down(delta) => delta.checked_neg().ok_or(Error::Overflow),
        }
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    if token::is_reserved(name) {
        return Err(Error::NameReserved);
    }

    Ok(())
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn parse_value(token: &str, value: &str) -> Result<i64, Error> {
    value
        .parse()
        .map_err(|_| Error::CorruptRecord(token.to_owned()))
}

fn parse_stamp(token: &str, stamp: Option<&str>) -> Result<i64, Error> {
    stamp.map_or(Ok(0), |stamp| parse_value(token, stamp))
}
