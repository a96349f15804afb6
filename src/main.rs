mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_scrape, run_serve};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    match args.command {
        Commands::Serve {
            host,
            port,
            browser,
        } => run_serve(args.config, args.verbose, host, port, browser).await,
        Commands::Scrape {
            url,
            browser,
            format,
            output,
        } => run_scrape(args.config, args.verbose, url, browser, format, output).await,
    }
}
