use clap::{Parser, Subcommand, ValueEnum};
use pts_lib::Viewport;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pts")]
#[command(
    version,
    about = "Page text scraper - render a page in headless Chromium and return its visible text",
    long_about = "Page text scraper (pts)\n\nModes:\n- serve: run the HTTP service (GET /scrape?url=..., GET /api, GET /).\n- scrape: extract text from a single URL and print it.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML) with [server], [browser] and [logging] sections; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP scraping service
    Serve {
        #[arg(long, help = "Interface to bind (default 0.0.0.0)")]
        host: Option<String>,

        #[arg(long, short, help = "Port to listen on (default 3001, or $PORT)")]
        port: Option<u16>,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Extract text from one URL and exit
    Scrape {
        #[arg(long, help = "Page to scrape (absolute URL)")]
        url: Option<String>,

        #[command(flatten)]
        browser: BrowserArgs,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

/// Browser overrides shared by both subcommands.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct BrowserArgs {
    #[arg(long, value_name = "SECS", help = "Navigation timeout in seconds (default 20)")]
    pub nav_timeout: Option<u64>,

    #[arg(long, value_name = "PATH", help = "Chromium executable to launch")]
    pub chrome: Option<PathBuf>,

    #[arg(long, help = "Window size (WIDTHxHEIGHT)")]
    pub viewport: Option<Viewport>,

    #[arg(long, help = "Show the browser window")]
    pub headful: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
