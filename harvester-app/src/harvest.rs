//! Pre-flight check, per-account loop, aggregation and ordering.
use harvester_common::{HarvesterError, PostRecord, is_placeholder_token};
use harvester_config::{AccountConfig, HarvestConfig};
use harvester_http::HttpError;
use harvester_social::mastodon::{
    AccountFailure, AccountOutcome, StatusSource, TagQuery, harvest_account,
};

/// Refuse to start while any account still has no real access token.
pub fn preflight(cfg: &HarvestConfig) -> Result<(), HarvesterError> {
    let missing = cfg.unconfigured_accounts(is_placeholder_token);
    if missing.is_empty() {
        return Ok(());
    }
    tracing::error!(accounts = ?missing, "access token not configured");
    Err(HarvesterError::Unconfigured(missing.join(", ")))
}

/// Operator guidance printed when [`preflight`] fails.
pub fn unconfigured_help(config_path: &str) -> String {
    format!(
        "Please set a real access token for every account in {config_path}.\n\
         Create one under Preferences > Development > New application on your\n\
         Mastodon instance (the read:statuses scope is enough), or reference an\n\
         environment variable such as access_token: \"${{MASTODON_TOKEN}}\"."
    )
}

/// Harvest every account in configured order, one at a time.
///
/// `connect` builds the source for an account. A connect failure is recorded
/// as that account's outcome and the loop moves on.
pub async fn harvest_all<S, F>(
    accounts: &[AccountConfig],
    query: &TagQuery,
    mut connect: F,
) -> Vec<AccountOutcome>
where
    S: StatusSource,
    F: FnMut(&AccountConfig) -> Result<S, HttpError>,
{
    let mut outcomes = Vec::with_capacity(accounts.len());
    for account in accounts {
        let outcome = match connect(account) {
            Ok(source) => harvest_account(&source, account, query).await,
            Err(e) => {
                tracing::warn!(
                    account = %account.name,
                    instance = %account.instance,
                    error = %e,
                    "client setup failed"
                );
                AccountOutcome::failed(
                    account.name.as_str(),
                    AccountFailure::Client(e.to_string()),
                )
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}

/// Concatenate the records of all outcomes; failed accounts add nothing.
pub fn collect_records(outcomes: Vec<AccountOutcome>) -> Vec<PostRecord> {
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.account.as_str())
        .collect();
    if !failed.is_empty() {
        tracing::warn!(failed = ?failed, "some accounts contributed no posts");
    }

    outcomes.into_iter().flat_map(AccountOutcome::into_records).collect()
}

/// Newest first by `(date, time)` as plain strings. Ties keep their order.
pub fn sort_records(records: &mut [PostRecord]) {
    records.sort_by(|a, b| (&b.date, &b.time).cmp(&(&a.date, &a.time)));
}
