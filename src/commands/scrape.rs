use std::path::PathBuf;
use std::process::ExitCode;

use pts_lib::{logging, ExtractionRequest, PageTextExtractor};

use crate::cli::{BrowserArgs, OutputFormat};
use crate::formatting::{render_error, write_output};
use crate::settings::{apply_browser_args, format_effective_config, load_config, validate_config};

/// Run the one-shot scrape command.
pub async fn run_scrape(
    config_path: Option<PathBuf>,
    verbose: bool,
    url: Option<String>,
    browser: BrowserArgs,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err.to_payload(), format, output),
    };
    apply_browser_args(&mut config, &browser);
    if let Err(err) = validate_config(&config, config_path.as_deref()) {
        return render_error(err.to_payload(), format, output);
    }

    logging::init(verbose, config.logging.format);
    tracing::debug!("{}", format_effective_config(&config, config_path.as_deref()));

    // Reject bad targets before paying for a browser launch.
    let request = match ExtractionRequest::parse(url.as_deref()) {
        Ok(req) => req,
        Err(err) => return render_error(err.to_payload(), format, output),
    };

    let extractor = PageTextExtractor::chromium(&config.browser);
    match extractor.extract(&request).await {
        Ok(result) => match write_output(&result, format, output) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Failed to write output: {err}");
                ExitCode::from(2)
            }
        },
        Err(err) => render_error(err.to_payload(), format, output),
    }
}
