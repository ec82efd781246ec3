//! Per-account fetch: resolve, request one page, assemble every status.
//!
//! Failures never leave this module as errors. They come back as an
//! [`AccountOutcome`] holding either the harvest or the reason it failed, and
//! individual statuses that cannot be assembled are listed as skipped.
use crate::mastodon::client::StatusSource;
use crate::mastodon::extract::{assemble_record, decode_status};
use crate::mastodon::resolve::resolve_if_needed;
use harvester_common::PostRecord;
use harvester_config::AccountConfig;
use serde_json::Value;
use thiserror::Error;

/// What to ask every account for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagQuery {
    pub tag: String,
    pub limit: u32,
}

#[derive(Debug, Error)]
pub enum AccountFailure {
    #[error("could not resolve account id for '{handle}': {cause}")]
    Unresolved { handle: String, cause: String },
    #[error("client setup failed: {0}")]
    Client(String),
    #[error("fetching posts failed: {message}")]
    Fetch {
        message: String,
        /// Server response body, when the API sent one.
        api_response: Option<String>,
    },
}

/// A status that was dropped while assembling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPost {
    /// Position in the returned page.
    pub index: usize,
    pub status_id: Option<String>,
    pub cause: String,
}

#[derive(Debug, Default)]
pub struct AccountHarvest {
    /// Id the statuses were requested for, after resolution.
    pub account_id: String,
    pub records: Vec<PostRecord>,
    pub skipped: Vec<SkippedPost>,
}

#[derive(Debug)]
pub struct AccountOutcome {
    /// Display name from the configuration.
    pub account: String,
    pub result: Result<AccountHarvest, AccountFailure>,
}

impl AccountOutcome {
    pub fn failed(account: impl Into<String>, failure: AccountFailure) -> Self {
        Self {
            account: account.into(),
            result: Err(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    pub fn records(&self) -> &[PostRecord] {
        match &self.result {
            Ok(h) => &h.records,
            Err(_) => &[],
        }
    }

    /// Records contributed to the aggregate; empty for failed accounts.
    pub fn into_records(self) -> Vec<PostRecord> {
        self.result.map(|h| h.records).unwrap_or_default()
    }
}

/// Assemble every element of a statuses page, skipping the ones that fail.
pub fn assemble_all(account: &str, raw: Vec<Value>) -> (Vec<PostRecord>, Vec<SkippedPost>) {
    let mut records = Vec::with_capacity(raw.len());
    let mut skipped = Vec::new();

    for (index, value) in raw.into_iter().enumerate() {
        let status_id = value.get("id").and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        });

        let assembled = decode_status(value).and_then(|s| assemble_record(account, &s));
        match assembled {
            Ok(record) => records.push(record),
            Err(err) => {
                tracing::warn!(
                    account,
                    index,
                    status_id = ?status_id,
                    error = %err,
                    "skipping post"
                );
                skipped.push(SkippedPost {
                    index,
                    status_id,
                    cause: err.to_string(),
                });
            }
        }
    }

    (records, skipped)
}

/// Resolve, fetch and assemble one account.
pub async fn harvest_account<S>(
    source: &S,
    account: &AccountConfig,
    query: &TagQuery,
) -> AccountOutcome
where
    S: StatusSource + ?Sized,
{
    let name = account.name.as_str();
    tracing::info!(account = name, "fetching posts");

    let account_id = match resolve_if_needed(source, &account.account_id).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(account = name, handle = %e.handle, "account id not found");
            return AccountOutcome::failed(
                name,
                AccountFailure::Unresolved {
                    handle: e.handle,
                    cause: e.cause,
                },
            );
        }
    };

    let raw = match source
        .tagged_statuses(&account_id, &query.tag, query.limit)
        .await
    {
        Ok(raw) => raw,
        Err(e) => {
            let api_response = e.body().map(str::to_string);
            tracing::warn!(
                account = name,
                error = %e,
                api_response = api_response.as_deref().unwrap_or("-"),
                "fetching posts failed"
            );
            return AccountOutcome::failed(
                name,
                AccountFailure::Fetch {
                    message: e.to_string(),
                    api_response,
                },
            );
        }
    };

    let (records, skipped) = assemble_all(name, raw);
    tracing::info!(
        account = name,
        count = records.len(),
        skipped = skipped.len(),
        "fetched posts"
    );

    AccountOutcome {
        account: name.to_string(),
        result: Ok(AccountHarvest {
            account_id,
            records,
            skipped,
        }),
    }
}
