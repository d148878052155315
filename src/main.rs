// src/main.rs — leadloop entry point

use clap::Parser;

use leadloop::cli::confirm::TerminalConfirmer;
use leadloop::cli::enrich::EnrichOptions;
use leadloop::cli::{Cli, Commands};
use leadloop::infra::config::Config;
use leadloop::infra::logger;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    logger::init_logging(logger::level_for_verbosity(cli.verbose));

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Falls back to defaults if no config.toml
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Refine(args) => leadloop::cli::refine::run_refine(args, &config).await,
        Commands::Preview { filters } => {
            leadloop::cli::preview::run_preview(&filters, &config).await
        }
        Commands::Enrich {
            filters,
            limit,
            list_name,
            resource_id,
            yes,
        } => {
            let opts = EnrichOptions {
                limit,
                list_name,
                resource_id,
                yes,
            };
            leadloop::cli::enrich::run_enrich(&filters, opts, &config, &TerminalConfirmer).await
        }
        Commands::Status { resource_id } => {
            leadloop::cli::status::run_status(&resource_id, &config).await
        }
        Commands::Suggest { description } => {
            leadloop::cli::suggest::run_suggest(&description, &config).await
        }
    }
}
