//! Social network clients and extractors used by the harvester.
//!
//! Only Mastodon-compatible servers are supported. See [`mastodon`] for the
//! request shapes and how raw statuses become [`harvester_common::PostRecord`]s.
pub mod mastodon;
