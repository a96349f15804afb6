use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use pts_lib::server::{start_server, AppState};
use pts_lib::{logging, PageTextExtractor};

use crate::cli::{BrowserArgs, OutputFormat};
use crate::formatting::render_error;
use crate::settings::{apply_browser_args, format_effective_config, load_config, validate_config};

/// Run the HTTP service until Ctrl-C.
pub async fn run_serve(
    config_path: Option<PathBuf>,
    verbose: bool,
    host: Option<String>,
    port: Option<u16>,
    browser: BrowserArgs,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err.to_payload(), OutputFormat::Json, None),
    };
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    apply_browser_args(&mut config, &browser);
    if let Err(err) = validate_config(&config, config_path.as_deref()) {
        return render_error(err.to_payload(), OutputFormat::Json, None);
    }

    logging::init(verbose, config.logging.format);
    tracing::info!("{}", format_effective_config(&config, config_path.as_deref()));

    let state = Arc::new(AppState::new(
        PageTextExtractor::chromium(&config.browser),
        config.browser.environment,
    ));
    let server = match start_server(&config.server, state).await {
        Ok(server) => server,
        Err(err) => return render_error(err.to_payload(), OutputFormat::Json, None),
    };

    let stopped = server
        .run_until(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;
    match stopped {
        Ok(()) => {
            tracing::info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(err) => render_error(err.to_payload(), OutputFormat::Json, None),
    }
}
