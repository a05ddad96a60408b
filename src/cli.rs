use crate::{
    config::{Config, Credentials},
    driver::chrome::{self, ChromeDriver},
    pipeline::Pipeline,
    policy,
    progress::{ProgressStore, ProgressTag},
    scan,
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "emoji-batch")]
#[command(about = "Resumable bulk custom-emoji uploader (headless Chrome + progress log)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./emoji-batch.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report whether Chrome, credentials and the gallery URL resolve.
    Doctor {},
    /// Print the classifier decision for every file in the directory.
    Scan {
        #[arg(long)]
        dir: PathBuf,
    },
    /// Print per-outcome counts from the progress log.
    Status {
        #[arg(long)]
        dir: PathBuf,
    },
    /// Upload every eligible file in the directory.
    Run {
        #[arg(long)]
        dir: PathBuf,
    },
}

pub async fn dispatch(args: Args) -> Result<()> {
    // Credentials may live in a .env next to the config.
    dotenvy::dotenv().ok();

    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;

    match &args.cmd {
        Command::Doctor {} => {
            let _guard = init_logging(&args, &cfg, resolve_log_path(&cfg, None).as_deref())?;
            doctor(&cfg)
        }
        Command::Scan { dir } => {
            let log_path = resolve_log_path(&cfg, Some(dir));
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            scan_cmd(&cfg, dir)
        }
        Command::Status { dir } => {
            let log_path = resolve_log_path(&cfg, Some(dir));
            let _guard = init_logging(&args, &cfg, log_path.as_deref())?;
            status(&cfg, dir)
        }
        Command::Run { dir } => run(&args, &cfg, dir).await,
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("emoji-batch.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("emoji-batch.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config, file_path: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = file_path {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(path)
            .map_err(|e| anyhow!("create log file {}: {e}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config, dir: Option<&Path>) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }

    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }

    dir.map(|d| d.join("emoji-batch.log"))
}

fn doctor(cfg: &Config) -> Result<()> {
    let diag = chrome::doctor(cfg);
    println!("{}", serde_json::to_string_pretty(&diag)?);
    if diag.ok {
        Ok(())
    } else {
        Err(anyhow!("environment not ready"))
    }
}

fn scan_cmd(cfg: &Config, dir: &Path) -> Result<()> {
    let store = ProgressStore::load(dir, &cfg.global.progress_filename)?;
    let items = scan::scan_directory(dir)?;

    let rows: Vec<serde_json::Value> = items
        .iter()
        .map(|item| {
            serde_json::json!({
                "path": item.key(),
                "decision": policy::decide(&item.path, store.log()),
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn status(cfg: &Config, dir: &Path) -> Result<()> {
    let store = ProgressStore::load(dir, &cfg.global.progress_filename)?;

    let mut uploaded = 0usize;
    let mut duplicates = 0usize;
    let mut failed = 0usize;
    let mut timeouts = 0usize;
    for entry in store.log().iter() {
        match entry.tag {
            ProgressTag::Uploaded => uploaded += 1,
            ProgressTag::Duplicate => duplicates += 1,
            ProgressTag::Failed => failed += 1,
            ProgressTag::Timeout => timeouts += 1,
        }
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "progress_file": store.path(),
            "total": store.log().len(),
            "uploaded": uploaded,
            "duplicates": duplicates,
            "failed": failed,
            "timeouts": timeouts,
        }))?
    );
    Ok(())
}

async fn run(args: &Args, cfg: &Config, dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(anyhow!("not a directory: {}", dir.display()));
    }

    let log_path = resolve_log_path(cfg, Some(dir));
    let _guard = init_logging(args, cfg, log_path.as_deref())?;

    // Fail on config/credential problems before a browser ever launches.
    cfg.duplicates.parse_policy()?;
    let creds = Credentials::resolve(&cfg.auth)?;

    let mut store = ProgressStore::load(dir, &cfg.global.progress_filename)?;
    let items = scan::scan_directory(dir)?;
    info!("uploading {} files from {}", items.len(), dir.display());

    let started = now_rfc3339();
    let mut driver = ChromeDriver::launch(cfg).await?;
    driver
        .sign_in(&creds, Duration::from_secs(cfg.auth.login_timeout_seconds))
        .await?;

    let mut pipeline = Pipeline::new(cfg, driver)?;
    let summary = pipeline.run_batch(&items, &mut store).await?;
    pipeline.into_driver().shutdown().await?;
    info!("DONE");

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "directory": dir,
                "progress_file": store.path(),
                "started": started,
                "finished": now_rfc3339(),
                "summary": summary,
            }))?
        );
    }

    Ok(())
}
