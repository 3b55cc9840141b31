use clap::Parser;
use shop_ledger::args::{Args, Command};
use shop_ledger::{commands, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().shop_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.shop_name(), init_args.passphrase())
                .await?
                .print()
        }

        Command::Add(add_args) => {
            let config = commands::load_config(home).await?;
            commands::add_stock(config, add_args.clone())
                .await?
                .print()
        }

        Command::Sell(sell_args) => {
            let config = commands::load_config(home).await?;
            commands::sell_stock(config, sell_args.clone())
                .await?
                .print()
        }

        Command::Search(search_args) => {
            let config = commands::load_config(home).await?;
            commands::search(config, search_args.clone()).await?.print()
        }

        Command::Unsold => commands::unsold(commands::load_config(home).await?)
            .await?
            .print(),

        Command::Progress => commands::progress(commands::load_config(home).await?)
            .await?
            .print(),

        Command::Report => commands::report(commands::load_config(home).await?)
            .await?
            .print(),

        Command::Share => commands::share(commands::load_config(home).await?)
            .await?
            .print(),

        Command::Clear(clear_args) => {
            let config = commands::load_config(home).await?;
            commands::clear_report(config, clear_args.clone())
                .await?
                .print()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        // RUST_LOG exists; use it.
        Some(_) => EnvFilter::from_default_env(),
        // Otherwise only this crate logs, at the requested level.
        None => EnvFilter::new(format!(
            "{}={},{}={}",
            env!("CARGO_CRATE_NAME"),
            level,
            "shop_ledger",
            level
        )),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
