//! Turn raw Mastodon statuses into [`PostRecord`]s.
//!
//! [`clean_html`] is a best-effort tag stripper, not an HTML parser: a `<`
//! inside an attribute value confuses it, and block boundaries (`<p>`, `<br>`)
//! vanish without a separator.
use crate::mastodon::types::Status;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use harvester_common::{NOT_AVAILABLE, PostRecord};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("tag pattern"));
// Unicode `White_Space` (so U+00A0 from `&nbsp;`) plus the ASCII separators U+001C..=U+001F.
static WS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x1c-\x1f]+").expect("whitespace pattern"));

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
];
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const UNKNOWN_VISIBILITY: &str = "unknown";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    #[error("not a status object: {0}")]
    Shape(String),
    #[error("unparseable created_at '{0}'")]
    Timestamp(String),
}

/// HTML fragment to single-line display text.
///
/// Strips tags, decodes entities, collapses whitespace runs to one space and
/// trims. Never fails; unmatched angle brackets are left in place.
///
/// Entities follow the HTML5 rules: legacy names without `;` (`&amp`,
/// `&nbsp`) still decode, the longest known name wins (`&notit;` is `¬it;`),
/// and numeric references go through the replacement table (`&#x80;` is `€`).
///
/// ```
/// use harvester_social::mastodon::clean_html;
///
/// assert_eq!(clean_html("<p>Buy&nbsp;milk</p>"), "Buy milk");
/// assert_eq!(clean_html("a &amp; b"), "a & b");
/// ```
pub fn clean_html(html: &str) -> String {
    let stripped = TAG_RE.replace_all(html, "");
    let decoded = htmlize::unescape(stripped.as_ref());
    let collapsed = WS_RE.replace_all(&decoded, " ");
    collapsed.trim().to_string()
}

/// Parse an ISO-8601 creation timestamp.
///
/// Every `Z` is rewritten to `+00:00` first. The wall-clock value is kept in
/// the timestamp's own offset; nothing is converted to local time.
pub fn parse_created_at(raw: &str) -> Result<NaiveDateTime, AssembleError> {
    let normalized = raw.trim().replace('Z', "+00:00");

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Ok(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt.naive_local());
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(day) = NaiveDate::parse_from_str(&normalized, "%Y-%m-%d") {
        return Ok(day.and_time(NaiveTime::MIN));
    }
    Err(AssembleError::Timestamp(raw.to_string()))
}

/// `(date, time)` columns for a status; `N/A` for both when there is no timestamp.
pub fn date_and_time(created_at: Option<&str>) -> Result<(String, String), AssembleError> {
    match created_at.filter(|s| !s.is_empty()) {
        Some(raw) => {
            let dt = parse_created_at(raw)?;
            Ok((
                dt.format("%Y-%m-%d").to_string(),
                dt.format("%H:%M:%S").to_string(),
            ))
        }
        None => Ok((NOT_AVAILABLE.to_string(), NOT_AVAILABLE.to_string())),
    }
}

/// Decode one element of the statuses array.
pub fn decode_status(value: Value) -> Result<Status, AssembleError> {
    if !value.is_object() {
        return Err(AssembleError::Shape(format!("expected object, found {value}")));
    }
    serde_json::from_value(value).map_err(|e| AssembleError::Shape(e.to_string()))
}

/// Build the record for one status.
pub fn assemble_record(account: &str, status: &Status) -> Result<PostRecord, AssembleError> {
    let (date, time) = date_and_time(status.created_at.as_deref())?;
    Ok(PostRecord {
        account: account.to_string(),
        date,
        time,
        content: clean_html(status.content.as_deref().unwrap_or_default()),
        visibility: status
            .visibility
            .clone()
            .unwrap_or_else(|| UNKNOWN_VISIBILITY.to_string()),
    })
}
