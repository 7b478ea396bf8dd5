use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use medisight::agent::BedrockAgentClient;
use medisight::api::{start_server, ApiContext};
use medisight::config::{self, Settings};
use medisight::controller::SessionController;
use medisight::extraction::{PdfTextExtractor, PdfiumPreviewRenderer};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    // Missing credentials or agent identity halt the process before the
    // server binds; nothing else is fatal.
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let agent = Arc::new(BedrockAgentClient::new(&settings).await);
    let controller = SessionController::new(Arc::new(PdfTextExtractor), agent);
    let ctx = ApiContext::new(controller, Arc::new(PdfiumPreviewRenderer));

    let mut server = match start_server(ctx, settings.bind_addr).await {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("failed to start server: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!("open http://{} in a browser", server.addr);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
    }
    server.shutdown();
}
