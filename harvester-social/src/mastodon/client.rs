//! Thin wrapper around the two Mastodon endpoints the harvester needs.
//!
//! [`StatusSource`] is the seam the resolver and fetcher are written against,
//! so tests can swap in an in-memory source instead of a live server.
use crate::mastodon::types::Account;
use async_trait::async_trait;
use harvester_http::{Auth, HttpClient, HttpError, RequestOpts};
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;

const LOOKUP_PATH: &str = "api/v1/accounts/lookup";

#[async_trait]
pub trait StatusSource: Send + Sync {
    /// `GET /api/v1/accounts/lookup?acct=<handle>`
    async fn lookup_account(&self, acct: &str) -> Result<Account, HttpError>;

    /// One page of `GET /api/v1/accounts/:id/statuses?tagged=<tag>&limit=<n>`.
    ///
    /// Elements are returned undecoded so a single malformed status can be
    /// skipped without losing its siblings.
    async fn tagged_statuses(
        &self,
        account_id: &str,
        tag: &str,
        limit: u32,
    ) -> Result<Vec<Value>, HttpError>;
}

/// Client for one server and one access token.
///
/// No `Debug` impl: it holds the access token.
#[derive(Clone)]
pub struct MastodonApi {
    http: HttpClient,
    bearer: String,
}

impl MastodonApi {
    pub fn new(instance: &str, bearer_token: impl Into<String>) -> Result<Self, HttpError> {
        let http = HttpClient::new(instance)?;
        Ok(Self {
            http,
            bearer: bearer_token.into(),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.with_timeout(timeout);
        self
    }

    fn opts<'a>(&'a self, query: Vec<(&'a str, Cow<'a, str>)>) -> RequestOpts<'a> {
        RequestOpts {
            auth: Some(Auth::Bearer(&self.bearer)),
            query: Some(query),
            ..Default::default()
        }
    }
}

#[async_trait]
impl StatusSource for MastodonApi {
    async fn lookup_account(&self, acct: &str) -> Result<Account, HttpError> {
        self.http
            .get_json(LOOKUP_PATH, self.opts(vec![("acct", acct.into())]))
            .await
    }

    async fn tagged_statuses(
        &self,
        account_id: &str,
        tag: &str,
        limit: u32,
    ) -> Result<Vec<Value>, HttpError> {
        let path = format!("api/v1/accounts/{account_id}/statuses");
        let statuses: Vec<Value> = self
            .http
            .get_json(
                &path,
                self.opts(vec![("tagged", tag.into()), ("limit", limit.to_string().into())]),
            )
            .await?;
        tracing::debug!(
            instance = %self.http.base(),
            account_id,
            tag,
            returned = statuses.len(),
            "mastodon.statuses"
        );
        Ok(statuses)
    }
}
