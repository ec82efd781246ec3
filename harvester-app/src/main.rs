use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use harvester_common::observability::{LogConfig, LogFormat, init_logging};
use harvester_config::{HarvestConfigLoader, resolve_config_path};
use harvester_social::mastodon::{MastodonApi, TagQuery};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

mod csv;
mod export;
mod harvest;

/// Collect `#todo` posts from Mastodon accounts into a console listing and a CSV file.
#[derive(Parser, Debug)]
#[command(name = "todo-harvester", version, about)]
struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, env = "HARVESTER_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory the CSV export is written to
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Hashtag to harvest instead of the configured one
    #[arg(short, long)]
    tag: Option<String>,

    /// Emit log events as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_cfg = LogConfig {
        format: if cli.log_json { LogFormat::Json } else { LogFormat::Text },
        ..LogConfig::default()
    };
    if let Some(path) = init_logging(log_cfg)? {
        tracing::debug!(path = %path.display(), "logging to file");
    }

    let config_path = resolve_config_path(cli.config.as_deref());
    let mut cfg = HarvestConfigLoader::new()
        .with_file(&config_path)
        .load()
        .with_context(|| {
            format!("failed to load configuration from {}", config_path.display())
        })?;
    if let Some(dir) = cli.output_dir {
        cfg.output_dir = dir;
    }
    if let Some(tag) = cli.tag {
        cfg.tag = tag;
    }

    if let Err(e) = harvest::preflight(&cfg) {
        eprintln!("{}\n", harvest::unconfigured_help(&config_path.display().to_string()));
        return Err(e.into());
    }

    let query = TagQuery {
        tag: cfg.tag_name().to_string(),
        limit: cfg.page_size(),
    };
    let timeout = Duration::from_secs(cfg.timeout_secs);
    tracing::info!(
        accounts = cfg.accounts.len(),
        tag = %query.tag,
        limit = query.limit,
        "harvest.start"
    );

    let outcomes = harvest::harvest_all(&cfg.accounts, &query, |account| {
        MastodonApi::new(&account.instance, account.access_token.clone())
            .map(|api| api.with_timeout(timeout))
    })
    .await;

    let mut records = harvest::collect_records(outcomes);
    harvest::sort_records(&mut records);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    export::render_listing(&records, cfg.preview_chars, &mut out)?;

    export::write_csv(
        &records,
        &cfg.output_dir,
        &cfg.file_prefix,
        Local::now().naive_local(),
    )?;
    writeln!(out, "\nTotal: {} todo posts harvested", records.len())?;
    out.flush()?;

    Ok(())
}
