use tracing::{error, info};
use uuid::Uuid;

use common::utils::logging::{init_logging, LogFormat};

fn main() -> std::process::ExitCode {
    // .env first so RUST_LOG and DATABASE_URL are visible
    dotenvy::dotenv().ok();

    let cfg = server::startup::load_config();
    let format = cfg
        .as_ref()
        .ok()
        .and_then(|c| c.logging.format.parse::<LogFormat>().ok())
        .unwrap_or_default();
    init_logging(format);
    info!(service = "server", event = "logger_init", ?format, "tracing subscriber initialized");

    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(service = "server", event = "config_invalid", error = %e, "failed to load configuration");
            return std::process::ExitCode::FAILURE;
        }
    };

    let instance_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "server",
            event = "panic",
            %instance_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let worker_threads = cfg.server.worker_threads;
    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %instance_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "server starting"
    );

    rt.block_on(async move {
        let shutdown = async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(service = "server", event = "signal_error", error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            info!(service = "server", event = "shutdown_signal", %instance_id, pid, "received Ctrl+C, draining");
        };

        match server::run(cfg, shutdown).await {
            Ok(()) => {
                info!(service = "server", event = "stop", %instance_id, pid, "server stopped normally");
                std::process::ExitCode::SUCCESS
            }
            Err(e) => {
                error!(service = "server", event = "run_failed", error = %e, "server::run returned error");
                std::process::ExitCode::FAILURE
            }
        }
    })
}
