mod platform;

use std::path::PathBuf;

use clap::Parser;

use platform::{LogDestination, RunOptions};

#[derive(Parser)]
#[command(name = "pagequiz")]
#[command(about = "Generate a multiple-choice quiz from a web page and take it in the terminal")]
#[command(version)]
struct Cli {
    /// Page to capture on startup
    url: Option<String>,
    /// RON config file (default: ./pagequiz.ron when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where log output goes
    #[arg(long, value_enum, default_value = "file")]
    log_to: LogDestination,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    platform::run_app(RunOptions {
        url: cli.url,
        config: cli.config,
        log_to: cli.log_to,
    })
}
