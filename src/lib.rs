pub mod cli;
pub mod core;
pub mod providers;

pub use crate::core::config;

use crate::cli::rates::{RateSort, TableOptions};
use crate::cli::watch::WatchPair;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        amount: f64,
        target: String,
    },
    Rates {
        sort: RateSort,
        descending: bool,
        filter: Option<String>,
        favorites: Vec<String>,
    },
    Watch {
        pair: Option<WatchPair>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("ratewatch starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = providers::OpenRatesProvider::new(&config.provider.base_url);

    match command {
        AppCommand::Convert { amount, target } => {
            cli::convert::run(&provider, &config, amount, &target).await
        }
        AppCommand::Rates {
            sort,
            descending,
            filter,
            favorites,
        } => {
            let mut options = TableOptions::from_config(&config);
            options.sort = sort;
            options.descending = descending;
            options.filter = filter;
            options.favorites.extend(favorites);
            cli::rates::run(&provider, &config, options).await
        }
        AppCommand::Watch { pair } => {
            let options = TableOptions::from_config(&config);
            cli::watch::run(Arc::new(provider), &config, pair, options).await
        }
    }
}
