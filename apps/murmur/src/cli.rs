//! # Command-Line Interface
//!
//! Three commands:
//!
//! - `init`: create the redb database and its signing secret
//! - `serve`: run the HTTP API over a redb file or an in-memory store
//! - `status`: print record counts
//!
//! Command bodies are plain functions (`cmd_init`, `cmd_serve`,
//! `cmd_status`) so integration tests can call them directly.

use crate::api::{router, AppState};
use clap::{Parser, Subcommand};
use murmur_core::{CoreError, MemStore, RedbStore, SocialStore, StoreCounts};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Parser)]
#[command(name = "murmur", version, about = "A small social-feed service")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new database file.
    Init {
        /// Database path.
        #[arg(long, default_value = "murmur.redb")]
        db: PathBuf,
        /// Overwrite an existing database.
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP API server.
    Serve {
        /// Database path (ignored with --mem).
        #[arg(long, default_value = "murmur.redb")]
        db: PathBuf,
        /// Listen address.
        #[arg(long, env = "MURMUR_ADDR", default_value = "127.0.0.1:4000")]
        addr: SocketAddr,
        /// Serve from a fresh in-memory store instead of a file.
        #[arg(long)]
        mem: bool,
        /// Override the stored signing secret (any string; hashed to key
        /// material). Tokens stop verifying when this changes.
        #[arg(long, env = "MURMUR_SECRET")]
        secret: Option<String>,
    },
    /// Print record counts for a database.
    Status {
        /// Database path.
        #[arg(long, default_value = "murmur.redb")]
        db: PathBuf,
        /// Machine-readable output.
        #[arg(long)]
        json: bool,
    },
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("database already exists at {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Derive a fresh 32-byte signing secret.
///
/// Mixed from the clock and pid; good enough for a single-node service
/// that persists the secret on first init.
#[must_use]
pub fn generate_secret() -> [u8; 32] {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let mut hasher = blake3::Hasher::new();
    hasher.update(b"murmur.secret.v1");
    hasher.update(&nanos.to_le_bytes());
    hasher.update(&std::process::id().to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// `murmur init`: create the database file and its signing secret.
pub fn cmd_init(db: &Path, force: bool) -> Result<(), CliError> {
    if db.exists() {
        if !force {
            return Err(CliError::AlreadyExists(db.to_path_buf()));
        }
        std::fs::remove_file(db)?;
    }

    RedbStore::create(db, generate_secret())?;
    info!(path = %db.display(), "database initialized");
    println!("Initialized database at {}", db.display());
    Ok(())
}

/// `murmur status`: print record counts.
pub fn cmd_status(db: &Path, json: bool) -> Result<StoreCounts, CliError> {
    let store = RedbStore::open(db)?;
    let counts = store.counts()?;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "users": counts.users,
                "posts": counts.posts,
                "comments": counts.comments,
            })
        );
    } else {
        println!("users:    {}", counts.users);
        println!("posts:    {}", counts.posts);
        println!("comments: {}", counts.comments);
    }
    Ok(counts)
}

/// Open the store and resolve the signing secret for `serve`.
pub fn open_store(
    db: &Path,
    mem: bool,
    secret_override: Option<&str>,
) -> Result<(Arc<dyn SocialStore>, [u8; 32]), CliError> {
    let store: Arc<dyn SocialStore> = if mem {
        Arc::new(MemStore::new(generate_secret()))
    } else {
        Arc::new(RedbStore::open(db)?)
    };

    let secret = match secret_override {
        Some(value) => *blake3::hash(value.as_bytes()).as_bytes(),
        None => store.server_secret()?,
    };
    Ok((store, secret))
}

/// `murmur serve`: run the HTTP API until ctrl-c.
pub async fn cmd_serve(
    db: &Path,
    addr: SocketAddr,
    mem: bool,
    secret_override: Option<&str>,
) -> Result<(), CliError> {
    let (store, secret) = open_store(db, mem, secret_override)?;
    let state = AppState::new(store, secret);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, mem, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
}

/// Dispatch a parsed command.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Init { db, force } => cmd_init(&db, force),
        Command::Serve {
            db,
            addr,
            mem,
            secret,
        } => cmd_serve(&db, addr, mem, secret.as_deref()).await,
        Command::Status { db, json } => cmd_status(&db, json).map(|_| ()),
    }
}
