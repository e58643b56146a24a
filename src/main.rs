// file: src/main.rs
// version: 2.0.0
// guid: h8i9j0k1-l2m3-4567-8901-234567hijklm

//! Tenancy - Main entry point

use clap::Parser;
use colored::Colorize;
use tenancy_agent::{
    cli::{commands::*, Cli, Commands},
    config::loader::ConfigLoader,
    logging::{init_logger, with_async_operation_span},
    Result,
};
use tokio::signal;
use tracing::{debug, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = tokio::select! {
        result = run(cli) => match result {
            Ok(()) => {
                println!("{}", "DONE!".green().bold());
                0
            }
            Err(e) => {
                eprintln!("{} {}", "ERROR!".red().bold(), e);
                1
            }
        },
        Ok(()) = signal::ctrl_c() => {
            warn!("Interrupted by user");
            eprintln!("{} interrupted", "ERROR!".red().bold());
            130
        }
    };

    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ConfigLoader::new().load_or_default(cli.config.as_deref())?;
    if let Some(dir) = cli.tenants_dir {
        config.tenants_dir = dir;
    }

    init_logger(cli.verbose || config.panel.debug, cli.quiet)?;
    debug!("Tenants directory: {}", config.tenants_dir.display());

    let config = &config;
    match cli.command {
        Commands::List => with_async_operation_span("list", || list_command(config)).await,
        Commands::Add { name, password } => {
            with_async_operation_span("add", || add_command(config, &name, password.as_deref()))
                .await
        }
        Commands::Remove { names } => {
            with_async_operation_span("remove", || remove_command(config, &names)).await
        }
        Commands::Update { name, password } => {
            with_async_operation_span("update", || update_command(config, &name, &password))
                .await
        }
        Commands::Reset { name } => {
            with_async_operation_span("reset", || reset_command(config, &name)).await
        }
        Commands::Query {
            function,
            params,
            format,
        } => {
            with_async_operation_span("query", || {
                query_command(config, &function, &params, format)
            })
            .await
        }
    }
}
