//! Loader for the harvester configuration: YAML file + environment overlays.
//!
//! The file lists the accounts to harvest and a handful of run knobs:
//!
//! ```yaml
//! tag: todo
//! limit: 40
//! accounts:
//!   - name: alice
//!     instance: https://mastodon.social
//!     account_id: alice
//!     access_token: "${ALICE_TOKEN}"
//! ```
//!
//! Precedence: `HARVESTER__*` environment variables override file values
//! (`HARVESTER__TAG=chores`). Every string value then goes through `${VAR}`
//! expansion, so secrets can stay out of the file.
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;

/// File name looked up in the working directory, then in the user config dir.
pub const DEFAULT_CONFIG_FILE: &str = "harvester.yaml";

/// Largest page the statuses endpoint hands out in one request.
pub const MAX_PAGE_SIZE: u32 = 40;

#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
    /// Hashtag (without `#`) the statuses endpoint filters on.
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Page size requested per account; clamped to `1..=MAX_PAGE_SIZE`.
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
    /// Characters of post body shown per entry in the console listing.
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

/// One account to harvest.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AccountConfig {
    /// Display name used in the listing and the CSV `Account` column.
    pub name: String,
    /// Server origin, e.g. `https://mastodon.social`.
    pub instance: String,
    /// Numeric account id, or a handle that gets resolved through the lookup endpoint.
    #[serde(deserialize_with = "string_or_number")]
    pub account_id: String,
    pub access_token: String,
}

impl HarvestConfig {
    /// `limit` clamped to what the server accepts.
    pub fn page_size(&self) -> u32 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Tag with any leading `#` removed.
    pub fn tag_name(&self) -> &str {
        self.tag.trim().trim_start_matches('#')
    }

    /// Names of accounts whose token is blank or still the placeholder.
    pub fn unconfigured_accounts<F>(&self, is_placeholder: F) -> Vec<&str>
    where
        F: Fn(&str) -> bool,
    {
        self.accounts
            .iter()
            .filter(|a| is_placeholder(&a.access_token))
            .map(|a| a.name.as_str())
            .collect()
    }
}

fn default_tag() -> String {
    "todo".into()
}
fn default_limit() -> u32 {
    MAX_PAGE_SIZE
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_file_prefix() -> String {
    "mastodon_todos_".into()
}
fn default_preview_chars() -> usize {
    150
}

// YAML reads an unquoted `12345` as an integer; ids are strings everywhere else.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, found {other}"
        ))),
    }
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Pick the config file: an explicit path wins, then `./harvester.yaml`,
/// then `<user config dir>/harvester/harvester.yaml`.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return local;
    }
    match dirs::config_dir() {
        Some(dir) => {
            let candidate = dir.join("harvester").join(DEFAULT_CONFIG_FILE);
            if candidate.exists() {
                candidate
            } else {
                local
            }
        }
        None => local,
    }
}

/// Builder hides the `config` crate wiring (YAML + env overrides).
pub struct HarvestConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for HarvestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HarvestConfigLoader {
    /// Start with `HARVESTER__` env overrides; add files or snippets on top.
    ///
    /// ```
    /// use harvester_config::HarvestConfigLoader;
    ///
    /// let config = HarvestConfigLoader::new()
    ///     .with_yaml_str("accounts: []")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.tag, "todo");
    /// assert_eq!(config.page_size(), 40);
    /// assert!(config.accounts.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Attach a YAML/TOML/JSON file; the `config` crate infers format by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Merge an inline YAML snippet (tests, generated configs).
    ///
    /// ```
    /// use harvester_config::HarvestConfigLoader;
    ///
    /// let cfg = HarvestConfigLoader::new()
    ///     .with_yaml_str(
    ///         r##"
    /// tag: "#chores"
    /// accounts:
    ///   - name: "alice"
    ///     instance: "https://mastodon.social"
    ///     account_id: 12345
    ///     access_token: "secret"
    /// "##,
    ///     )
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(cfg.tag_name(), "chores");
    /// assert_eq!(cfg.accounts[0].account_id, "12345");
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// Environment overrides are added last so they win over every file.
    pub fn load(self) -> Result<HarvestConfig, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix("HARVESTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let typed: HarvestConfig =
            serde_json::from_value(v).map_err(|e| ConfigError::Message(e.to_string()))?;

        tracing::debug!(
            accounts = typed.accounts.len(),
            tag = %typed.tag_name(),
            limit = typed.page_size(),
            "config.loaded"
        );
        Ok(typed)
    }
}
