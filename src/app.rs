use color_eyre::Result;
use eyre::Context as _;
use nifi_exporter_config::{
    Args,
    Config,
};
use nifi_exporter_http::{
    build_registry,
    create_router,
};
use tokio::net::TcpListener;

pub struct App {
    config: Config,
    check_config: bool,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        Ok(Self {
            config: Config::new(&args)?,
            check_config: args.check_config,
        })
    }

    pub async fn run(self) -> Result<()> {
        if self.check_config {
            print!("{}", self.config.redacted().to_yaml()?);
            return Ok(());
        }

        let registry = build_registry(&self.config)?;
        let exporter = self.config.exporter.clone();
        let listen_address = exporter.listen_address;
        let app = create_router(registry, exporter);

        let listener = TcpListener::bind(listen_address)
            .await
            .wrap_err_with(|| format!("Failed to listen on {listen_address}"))?;
        info!(
            address = %listen_address,
            metrics_path = %self.config.exporter.metrics_path,
            nodes = self.config.nodes.len(),
            "listening"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .wrap_err("HTTP server failed")?;

        info!("shut down");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                warn!(%error, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
