//! FillPDF Server — HTTP API for filling and stamping PDFs with pdftk.
//!
//! Usage:
//!   FILLPDF_BIND=0.0.0.0:8082 fillpdf-server
//!
//! Or with args:
//!   fillpdf-server --config /etc/fillpdf.json --bind 127.0.0.1:8082 --pdftk /usr/bin/pdftk

use fillpdf_lib::api::{self, AppState};
use fillpdf_lib::ops::Context;
use fillpdf_lib::settings::{self, Config};
use std::path::PathBuf;

fn print_help() {
    println!("fillpdf-server — PDF form filling HTTP API");
    println!();
    println!("Usage: fillpdf-server [--config PATH] [--bind ADDR:PORT] [--pdftk PATH] [--tmpdir DIR] [--timeout SECS]");
    println!();
    println!("Environment variables:");
    println!("  FILLPDF_CONFIG        JSON config file");
    println!("  FILLPDF_BIND          Bind address (default: 0.0.0.0:8082)");
    println!("  FILLPDF_PDFTK         pdftk executable (default: pdftk on PATH)");
    println!("  FILLPDF_TMPDIR        Parent directory for request workspaces");
    println!("  FILLPDF_TIMEOUT_SECS  pdftk timeout, 0 disables (default: 120)");
    println!("  FILLPDF_BODY_LIMIT    Max request body in bytes (default: 32 MiB)");
    println!("  RUST_LOG              Log filter (default: info)");
}

fn load_config() -> Result<Config, String> {
    // Parse simple args (no clap to keep binary small)
    let args: Vec<String> = std::env::args().collect();
    let mut config_arg: Option<PathBuf> = None;
    let mut overrides: Vec<(&str, &str)> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            flag @ ("--config" | "--bind" | "--pdftk" | "--tmpdir" | "--timeout")
                if i + 1 < args.len() =>
            {
                if flag == "--config" {
                    config_arg = Some(PathBuf::from(&args[i + 1]));
                } else {
                    overrides.push((flag, args[i + 1].as_str()));
                }
                i += 2;
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("fillpdf-server {}", settings::version());
                std::process::exit(0);
            }
            other => {
                return Err(format!("Unknown argument '{}' (see --help)", other));
            }
        }
    }

    let mut config = Config::load(config_arg.as_deref())?;
    for (flag, value) in overrides {
        match flag {
            "--bind" => config.bind = value.to_string(),
            "--pdftk" => config.pdftk = PathBuf::from(value),
            "--tmpdir" => config.temp_dir = PathBuf::from(value),
            "--timeout" => {
                config.timeout_secs = value.parse()
                    .map_err(|e| format!("Invalid --timeout '{}': {}", value, e))?;
            }
            _ => {}
        }
    }
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("[Server] Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("[Server] Shutting down");
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::error!("[Server] {}", e);
            std::process::exit(1);
        }
    };

    log::info!("[Server] Version: {}", settings::version());
    log::info!("[Server] Workspaces in: {}", config.temp_dir.display());
    match config.timeout() {
        Some(t) => log::info!("[Server] pdftk timeout: {}s", t.as_secs()),
        None => log::warn!("[Server] pdftk timeout disabled"),
    }

    let ctx = Context::from_config(&config);

    // Probe pdftk; keep serving health checks even if it is missing
    match ctx.pdftk.version().await {
        Ok(v) => log::info!("[Server] Using {} ({})", ctx.pdftk.program().display(), v),
        Err(e) => log::warn!("[Server] pdftk not usable, fill/stamp requests will fail: {}", e),
    }

    let app = api::router(AppState::new(ctx, settings::version(), config.body_limit));

    let listener = match tokio::net::TcpListener::bind(&config.bind).await {
        Ok(l) => l,
        Err(e) => {
            log::error!("[Server] Failed to bind to {}: {}", config.bind, e);
            std::process::exit(1);
        }
    };

    log::info!("[Server] Listening on {}", config.bind);
    if let Err(e) = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await {
        log::error!("[Server] Server error: {}", e);
        std::process::exit(1);
    }
}
