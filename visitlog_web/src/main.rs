mod form;
mod handlers;
mod pages;
mod response;
mod router;
mod server;
mod state;

use clap::Parser;
use state::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use visitlog_core::{Config, CsvStore, Error, Result, SystemClock, VisitLog};

#[derive(Parser)]
#[command(name = "visitlog-web")]
#[command(about = "Web front end for the facility visitor log", long_about = None)]
struct Cli {
    /// Override data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Address to listen on (overrides server.bind)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    visitlog_core::logging::init();

    let cli = Cli::parse();

    let mut config = Config::load()?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    let addr = config.server.bind_addr()?;

    let store = CsvStore::new(match &cli.data_dir {
        Some(dir) => config.store_path_in(dir),
        None => config.store_path(),
    });
    store.init()?;

    let log = VisitLog::new(store, Arc::new(SystemClock), config.visits.exit_policy);
    let state = Arc::new(AppState::new(log, &config));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("ctrl_c_received");
            let _ = shutdown_tx.send(true);
        }
    });

    server::serve(addr, state, shutdown_rx)
        .await
        .map_err(Error::Io)
}
