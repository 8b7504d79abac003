//! Rebate CLI

use std::{io, process::ExitCode};

use anyhow::Context;
use tracing::info;

use rebate::{
    config::{OrderFile, PromotionsFile},
    promotions::Promotion,
    summary::OrderSummary,
};

use crate::cli::{config::CliConfig, logging};

mod cli;

fn main() -> ExitCode {
    let config = CliConfig::load().unwrap_or_else(|error| error.exit());

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging may not be initialised, must use eprintln for fatal errors"
            )]
            {
                eprintln!("Error: {error:#}");
            }

            ExitCode::FAILURE
        }
    }
}

fn run(config: &CliConfig) -> anyhow::Result<()> {
    logging::init_subscriber(&config.logging).context("failed to initialise logging")?;

    let catalog = PromotionsFile::load(&config.promotions)
        .and_then(PromotionsFile::into_catalog)
        .with_context(|| format!("failed to load {}", config.promotions.display()))?;

    let mut order = OrderFile::load(&config.order)
        .and_then(OrderFile::into_order)
        .with_context(|| format!("failed to load {}", config.order.display()))?;

    let at = config.at();

    info!(promotions = catalog.len(), %at, "repricing order");

    let report = catalog.reprice(&mut order, at);

    OrderSummary::new(&order)
        .write_to(io::stdout().lock())
        .context("failed to write summary")?;

    for (key, error) in &report.failures {
        let name = catalog.get(*key).map_or("unknown", Promotion::name);

        #[expect(
            clippy::print_stderr,
            reason = "failed promotions are part of the command's output"
        )]
        {
            eprintln!("Promotion {name:?} was not applied: {error}");
        }
    }

    Ok(())
}
