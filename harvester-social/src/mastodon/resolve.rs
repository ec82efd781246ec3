//! Handle → numeric account id.
use crate::mastodon::client::StatusSource;
use thiserror::Error;

/// The lookup failed for any reason; callers do not distinguish causes.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("account id for '{handle}' not found: {cause}")]
pub struct ResolveError {
    pub handle: String,
    pub cause: String,
}

/// True when `account_id` is non-empty and made only of ASCII digits.
///
/// This is the only check deciding whether a lookup happens, so a handle that
/// is itself all digits is taken as an id.
pub fn is_numeric_id(account_id: &str) -> bool {
    !account_id.is_empty() && account_id.bytes().all(|b| b.is_ascii_digit())
}

/// Look a handle up with exactly one request. No retry.
pub async fn resolve_account_id<S>(source: &S, handle: &str) -> Result<String, ResolveError>
where
    S: StatusSource + ?Sized,
{
    let acct = handle.trim().trim_start_matches('@');
    let not_found = |cause: String| {
        tracing::warn!(handle, %cause, "account lookup failed");
        ResolveError {
            handle: handle.to_string(),
            cause,
        }
    };

    match source.lookup_account(acct).await {
        Ok(account) => match account.id.filter(|id| !id.is_empty()) {
            Some(id) => {
                tracing::debug!(handle, id = %id, "account resolved");
                Ok(id)
            }
            None => Err(not_found("lookup response carried no id".into())),
        },
        Err(e) => Err(not_found(e.to_string())),
    }
}

/// Pass numeric ids through untouched; resolve anything else.
pub async fn resolve_if_needed<S>(source: &S, account_id: &str) -> Result<String, ResolveError>
where
    S: StatusSource + ?Sized,
{
    if is_numeric_id(account_id) {
        return Ok(account_id.to_string());
    }
    resolve_account_id(source, account_id).await
}
