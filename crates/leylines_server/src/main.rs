use clap::Parser;
use leylines_core::{init_logging, logging_status, Store};
use leylines_server::{build_router, AppState, ServerConfig};
use log::{error, info};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::parse();

    let target = match config.log_target() {
        Ok(target) => target,
        Err(err) => {
            eprintln!("leylines: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = init_logging(config.log_level(), target) {
        eprintln!("leylines: {err}");
        return ExitCode::FAILURE;
    }

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={}", err);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let state = AppState::new(Store::new(config.store_location()));
    let app = build_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let (log_level, log_target) = logging_status()
        .map(|(level, target)| (level, target.to_string()))
        .unwrap_or(("off", "none".to_string()));
    info!(
        "event=server_start module=server status=ok addr={} version={} log_level={} log_target={}",
        addr,
        env!("CARGO_PKG_VERSION"),
        log_level,
        log_target
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            "event=server_signal module=server status=error error={}",
            err
        );
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    info!("event=server_signal module=server status=ok signal=ctrl_c");
}
