mod cli;
mod execute;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use crate::cli::CLI;
use anyhow::Result;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()>{
    let cli = CLI::parse();
    init_tracing(cli.verbose);
    execute::execute(cli).await
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_env("LIBSWITCH_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
