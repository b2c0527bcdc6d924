//! Fictures entry-point: serves the screens or walks the feed from the CLI.

mod server;

use std::ffi::OsString;
use std::io::Write;

use actix_web::web;
use clap::{Parser, Subcommand};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use fictures::config::AppSettings;
use fictures::domain::{FeedPager, FeedService, LoadOutcome};
use fictures::inbound::http::health::HealthState;
use fictures::inbound::http::session_config::{
    BuildMode, SessionSettings, session_settings_from_env,
};

use server::{Backend, ServerConfig, build_ports, create_server};

/// Anonymous blogging, server-rendered.
///
/// Settings come from `FICTURES_*` environment variables and the config
/// file; session cookie toggles from `SESSION_*` variables.
#[derive(Debug, Parser)]
#[command(name = "fictures", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Print the newest posts, one per line.
    Feed {
        /// Stop after this many pages.
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = AppSettings::load_from_iter([OsString::from("fictures")])
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&settings).await,
        Command::Feed { pages } => print_feed(&settings, pages).await,
    }
}

/// Session cookie settings from the process environment.
fn session_settings(mode: BuildMode) -> std::io::Result<SessionSettings> {
    session_settings_from_env(&DefaultEnv::new(), mode).map_err(std::io::Error::other)
}

async fn serve(settings: &AppSettings) -> std::io::Result<()> {
    let session = session_settings(BuildMode::from_debug_assertions())?;
    let config = ServerConfig::new(settings, session).map_err(std::io::Error::other)?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}

async fn print_feed(settings: &AppSettings, pages: u32) -> std::io::Result<()> {
    let backend = Backend::from_settings(settings).map_err(std::io::Error::other)?;
    let ports = build_ports(backend)?;
    let pager = FeedPager::new(FeedService::new(ports.posts));
    for _ in 0..pages {
        match pager.load_next().await.map_err(std::io::Error::other)? {
            LoadOutcome::Loaded { .. } => {}
            LoadOutcome::Busy | LoadOutcome::Exhausted => break,
        }
    }

    let mut out = std::io::stdout().lock();
    for post in pager.posts() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            post.created_at().to_rfc3339(),
            post.id(),
            post.user_id().author_label(),
            post.title()
        )?;
    }
    out.flush()
}
