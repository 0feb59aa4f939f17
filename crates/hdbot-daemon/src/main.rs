//! hdbot-daemon: campaign tracker daemon.
//!
//! Single OS process running a Tokio async runtime. A background poller
//! keeps the local snapshot store current; presentation layers query it via
//! JSON-RPC over a Unix socket.

mod commands;
mod config;
mod poller;
mod rpc;

use std::sync::Arc;

use hdbot_remote::HttpSource;
use hdbot_sync::{CampaignReader, SnapshotStore, SyncEngine, UpdateTrigger};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::config::DaemonConfig;
use crate::poller::Poller;
use crate::rpc::RpcServer;

/// Daemon-wide shared state.
pub struct DaemonState {
    /// Configuration.
    pub config: DaemonConfig,
    /// The only writer to the snapshot store.
    pub engine: Arc<SyncEngine<HttpSource>>,
    /// Cache-aside read path.
    pub reader: CampaignReader<HttpSource>,
    /// Authenticated update entry point.
    pub trigger: Arc<UpdateTrigger<HttpSource>>,
    /// Shutdown signal sender.
    pub shutdown_tx: broadcast::Sender<()>,
}

impl DaemonState {
    /// Wire the engine, reader and trigger around an open database.
    pub fn new(config: DaemonConfig, conn: rusqlite::Connection) -> anyhow::Result<Self> {
        let source = HttpSource::new(config.upstream.base_url.clone(), config.request_timeout())?;
        let engine = Arc::new(
            SyncEngine::new(source, SnapshotStore::new(conn))
                .with_sequence_timeout(config.sequence_timeout()),
        );
        let reader = CampaignReader::new(Arc::clone(&engine));
        let trigger = Arc::new(UpdateTrigger::new(
            Arc::clone(&engine),
            config.update.key.clone(),
        ));
        let (shutdown_tx, _shutdown_rx) = broadcast::channel(1);

        Ok(Self {
            config,
            engine,
            reader,
            trigger,
            shutdown_tx,
        })
    }

    pub fn store(&self) -> &SnapshotStore {
        self.engine.store()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load config (validated once logging is up)
    let config = DaemonConfig::load()?;

    // 2. Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("hdbot={}", config.advanced.log_level).parse()?),
        )
        .init();

    info!("hdbot daemon starting");

    if let Err(e) = config.validate() {
        error!("invalid configuration: {e:#}");
        return Err(e);
    }

    // 3. Open database (creates the data dir, runs migrations)
    let data_dir = config.data_dir();
    let conn = hdbot_db::open_in(&data_dir)?;

    // 4. Build daemon state
    let state = Arc::new(DaemonState::new(config, conn)?);

    // 5. Start the background poller
    let poller = if state.config.update.enabled {
        let poller = Poller::new(
            Arc::clone(&state.trigger),
            state.config.update.key.clone(),
            state.config.update_interval(),
        );
        Some(poller.spawn(state.shutdown_tx.subscribe()))
    } else {
        info!("scheduled updates disabled");
        None
    };

    // 6. Start IPC server
    let socket_path = data_dir.join("daemon.sock");
    let rpc_server = RpcServer::new(state.clone(), socket_path.clone());

    // 7. Run the RPC server until shutdown
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    tokio::select! {
        result = rpc_server.run() => {
            if let Err(e) = result {
                error!("RPC server error: {}", e);
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received");
        }
        _ = shutdown_signal() => {
            info!("Termination signal received, shutting down");
        }
    }

    // Graceful shutdown
    info!("Daemon shutting down gracefully");
    let _ = state.shutdown_tx.send(());
    if let Some(handle) = poller {
        if let Err(e) = handle.await {
            error!("poller task failed: {}", e);
        }
    }

    // Clean up socket file
    let _ = std::fs::remove_file(&socket_path);

    info!("Daemon stopped");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                error!("cannot listen for SIGTERM: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
