//! Device history sync host.
//!
//! Runs the sync engine against the contact backend, replaying call log and
//! SMS history from JSON exports of the native providers.
//!
//! Usage:
//!   devsync --api-url https://api.example.com --token T \
//!       --calls-json calls.json --sms-json sms.json sync
//!   devsync enable
//!   devsync status

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use devsync_cli::{JsonCallLogProvider, JsonSmsProvider, StatusReport, load_config, replay_capabilities};
use devsync_engine::readers::{CallLogProvider, SmsProvider};
use devsync_engine::{
    ChannelReaders, Clock, HttpContactService, ManualClock, Region, SqliteKeyValueStore,
    StaticGatekeeper, SyncDependencies, SyncOrchestrator, SystemClock, TracingNotifier,
};
use devsync_types::{Channel, EpochMillis, Platform};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "devsync")]
#[command(about = "Sync device call and SMS history into contact timelines")]
struct Args {
    /// JSON config file (engine, contacts, db_path)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite file for cursors and settings
    #[arg(long)]
    db: Option<PathBuf>,

    /// Contact backend base URL
    #[arg(long)]
    api_url: Option<String>,

    /// Bearer token for the contact backend
    #[arg(long)]
    token: Option<String>,

    /// Default region for numbers without a country code (e.g. US, GB)
    #[arg(long)]
    region: Option<Region>,

    /// Platform to emulate: android, ios or desktop
    #[arg(long)]
    platform: Option<Platform>,

    /// Call log export (JSON array of native rows)
    #[arg(long)]
    calls_json: Option<PathBuf>,

    /// SMS export (JSON array of native rows)
    #[arg(long)]
    sms_json: Option<PathBuf>,

    /// Pin "now" to this epoch-millisecond instant
    #[arg(long)]
    at: Option<i64>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one sync pass
    Sync,
    /// Turn device sync on
    Enable,
    /// Turn device sync off
    Disable,
    /// Set the look-back window for channels never synced
    Period { days: u32 },
    /// Forget a channel's cursor
    Reset { channel: Channel },
    /// Print settings and cursors
    Status,
    /// Print setup instructions for the platform
    Setup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let orchestrator = build(&args)?;

    match args.command {
        Command::Sync => {
            let summary = orchestrator.sync().await;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Enable => orchestrator.set_sync_enabled(true)?,
        Command::Disable => orchestrator.set_sync_enabled(false)?,
        Command::Period { days } => {
            orchestrator.set_sync_period_days(days)?;
            info!("Sync period set to {} days", days);
        }
        Command::Reset { channel } => {
            orchestrator.cursors().reset(channel)?;
            info!("Reset {} cursor", channel);
        }
        Command::Status => {
            let report = StatusReport::collect(&orchestrator)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Setup => orchestrator.show_setup_instructions(),
    }
    Ok(())
}

fn build(args: &Args) -> Result<SyncOrchestrator> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(db) = &args.db {
        config.db_path = Some(db.clone());
    }
    if let Some(url) = &args.api_url {
        config.contacts.api_base_url = url.clone();
    }
    if let Some(token) = &args.token {
        config.contacts.auth_token = Some(token.clone());
    }
    if let Some(region) = args.region {
        config.engine.default_region = region;
    }
    // Exports stand in for the Android providers unless told otherwise.
    config.engine.platform = args.platform.unwrap_or(Platform::Android);

    let db_path = config.db_path();
    let store = SqliteKeyValueStore::open(&db_path)
        .with_context(|| format!("Failed to open {}", db_path.display()))?;
    let contacts = HttpContactService::new(config.contacts.clone())?;
    let clock: Arc<dyn Clock> = match args.at {
        Some(millis) => Arc::new(ManualClock::new(EpochMillis::new(millis))),
        None => Arc::new(SystemClock),
    };

    let call_log = args
        .calls_json
        .as_ref()
        .map(|path| Arc::new(JsonCallLogProvider::new(path)) as Arc<dyn CallLogProvider>);
    let sms = args
        .sms_json
        .as_ref()
        .map(|path| Arc::new(JsonSmsProvider::new(path)) as Arc<dyn SmsProvider>);
    let capabilities =
        replay_capabilities(config.engine.platform, call_log.is_some(), sms.is_some());
    let readers = ChannelReaders::for_platform(config.engine.platform, call_log, sms, &config.engine);

    info!(
        "devsync on {} (db: {}, backend: {})",
        config.engine.platform,
        db_path.display(),
        config.contacts.api_base_url
    );

    Ok(SyncOrchestrator::new(
        config.engine,
        SyncDependencies {
            contacts: Arc::new(contacts),
            gatekeeper: Arc::new(StaticGatekeeper::new(capabilities)),
            readers,
            store: Arc::new(store),
            notifier: Arc::new(TracingNotifier),
            clock,
        },
    ))
}
