//! Mastodon API integration: account lookup, tagged statuses, normalization.
//!
//! Request shapes:
//! - `GET /api/v1/accounts/lookup?acct=<handle>` → `{ "id": ... }`
//! - `GET /api/v1/accounts/:id/statuses?tagged=<tag>&limit=<n>` → `[status, ...]`
//!
//! Only the first page is requested. Accounts with more matching posts than
//! `limit` lose the rest; there is no `max_id` continuation.
pub mod client;
pub mod extract;
pub mod harvest;
pub mod resolve;
pub mod types;

pub use client::{MastodonApi, StatusSource};
pub use extract::{AssembleError, assemble_record, clean_html, date_and_time};
pub use harvest::{
    AccountFailure, AccountHarvest, AccountOutcome, SkippedPost, TagQuery, assemble_all,
    harvest_account,
};
pub use resolve::{ResolveError, is_numeric_id, resolve_account_id, resolve_if_needed};
