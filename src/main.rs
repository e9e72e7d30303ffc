mod anansi;
mod cli;
mod config;
mod job;
mod result_printer;
mod social_lookup;
mod stock_lookup;
mod twitter_client;
mod yahoo_client;

use crate::anansi::Anansi;
use crate::cli::Cli;
use crate::job::JobConfig;
use crate::job::JobRequest;
use crate::result_printer::ResultPrinter;
use clap::Parser;
use log::LevelFilter;
use log::error;

#[tokio::main]
async fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
    if let Err(e) = run(Cli::parse()).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> anyhow::Result<()> {
    let request = JobRequest::from(&args);
    request.log_arguments();
    let config = JobConfig::load(request, &args.config).await?;
    Anansi::new(config, ResultPrinter::new(args.format))
        .run()
        .await
}
