//! Operator entry point for the course registration manager.
//!
//! # Responsibility
//! - Resolve storage and logging settings from flags or environment.
//! - Open the registration database and hand stdin/stdout to the menu.

mod menu;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use registrar_core::db::open_db;
use registrar_core::{
    core_version, default_log_level, init_logging, RegistrationService, SqliteRegistrationStore,
};
use std::io;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "registrar", version, about = "Course registration manager")]
struct Args {
    /// SQLite database file; created and seeded on first run.
    #[arg(long, env = "REGISTRAR_DB", default_value = "courseregistration.db")]
    db: PathBuf,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "REGISTRAR_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error (defaults by build mode).
    #[arg(long, env = "REGISTRAR_LOG_LEVEL")]
    log_level: Option<String>,
}

impl Args {
    fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_dir) = &args.log_dir {
        let log_dir = std::path::absolute(log_dir)
            .with_context(|| format!("invalid log directory `{}`", log_dir.display()))?;
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(args.log_level(), log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    let conn = open_db(&args.db)
        .with_context(|| format!("error connecting to the database `{}`", args.db.display()))?;
    let service = RegistrationService::new(SqliteRegistrationStore::try_new(&conn)?);
    info!(
        "event=menu_start module=cli status=ok core_version={} db={}",
        core_version(),
        args.db.display()
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    menu::Menu::new(&service, stdin.lock(), stdout.lock()).run()?;

    info!("event=menu_exit module=cli status=ok");
    Ok(())
}
