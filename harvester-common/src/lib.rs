//! Common types and utilities shared across the harvester crates.
//!
//! This crate defines the normalized post record, the sentinels used when
//! data is missing or unconfigured, the logging initializer, and the shared
//! error type. It stays dependency-light so every crate can depend on it.
//!
//! # Overview
//!
//! - [`PostRecord`]: one normalized post, ready for export
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`HarvesterError`]: failures that end a run
//!
//! # Examples
//!
//! ```rust
//! use harvester_common::{is_placeholder_token, PostRecord, NOT_AVAILABLE, PLACEHOLDER_TOKEN};
//!
//! assert!(is_placeholder_token(PLACEHOLDER_TOKEN));
//!
//! let record = PostRecord {
//!     account: "alice".into(),
//!     date: NOT_AVAILABLE.into(),
//!     time: NOT_AVAILABLE.into(),
//!     content: "water the plants".into(),
//!     visibility: "public".into(),
//! };
//! assert_eq!(record.time, "N/A");
//! ```

pub mod observability;

/// Placeholder written into freshly generated configs; a token equal to this
/// value means the operator never filled in a real credential.
pub const PLACEHOLDER_TOKEN: &str = "DEIN_ACCESS_TOKEN_HIER";

/// Value used for date and time when a post carries no creation timestamp.
pub const NOT_AVAILABLE: &str = "N/A";

/// A single normalized post.
///
/// Built once per raw status and never mutated afterwards. `date` is
/// `YYYY-MM-DD` and `time` is `HH:MM:SS`, or both are [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRecord {
    /// Display name of the configured account the post was fetched for.
    pub account: String,
    pub date: String,
    pub time: String,
    /// Plain-text body with markup stripped and whitespace collapsed.
    pub content: String,
    /// Visibility label as reported by the server (`public`, `unlisted`, ...).
    pub visibility: String,
}

/// Returns true when `token` is blank or still the shipped placeholder.
pub fn is_placeholder_token(token: &str) -> bool {
    let token = token.trim();
    token.is_empty() || token == PLACEHOLDER_TOKEN
}

/// Error types used across the harvester workspace.
#[derive(thiserror::Error, Debug)]
pub enum HarvesterError {
    /// An account still carries the placeholder (or an empty) access token.
    #[error("Access token not configured for account '{0}'")]
    Unconfigured(String),

    /// Writing an export artifact failed.
    #[error("Export failed for {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
