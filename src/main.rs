use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use ratewatch::cli::rates::RateSort;
use ratewatch::cli::watch::WatchPair;
use ratewatch::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortField {
    Code,
    Rate,
}

impl From<SortField> for RateSort {
    fn from(field: SortField) -> RateSort {
        match field {
            SortField::Code => RateSort::Code,
            SortField::Rate => RateSort::Rate,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Convert an amount from the base currency
    Convert {
        /// Amount in the base currency
        amount: f64,
        /// Target currency code, e.g. EUR
        target: String,
    },
    /// Display the current exchange-rate table
    Rates {
        /// Column to sort by
        #[arg(long, value_enum, default_value = "code")]
        sort: SortField,
        /// Sort in descending order
        #[arg(long)]
        desc: bool,
        /// Only show currencies whose code contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Pin a currency to the top (repeatable, adds to the watchlist)
        #[arg(long = "favorite")]
        favorites: Vec<String>,
    },
    /// Watch rates live, refreshing on the configured interval
    Watch {
        /// Amount in the base currency to convert continuously
        #[arg(long, requires = "target")]
        amount: Option<f64>,
        /// Target currency code for the continuous conversion
        #[arg(long, requires = "amount")]
        target: Option<String>,
    },
}

impl From<Commands> for ratewatch::AppCommand {
    fn from(cmd: Commands) -> ratewatch::AppCommand {
        match cmd {
            Commands::Convert { amount, target } => {
                ratewatch::AppCommand::Convert { amount, target }
            }
            Commands::Rates {
                sort,
                desc,
                filter,
                favorites,
            } => ratewatch::AppCommand::Rates {
                sort: sort.into(),
                descending: desc,
                filter,
                favorites,
            },
            Commands::Watch { amount, target } => ratewatch::AppCommand::Watch {
                pair: amount.zip(target).map(|(amount, target)| WatchPair {
                    amount,
                    target,
                }),
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => ratewatch::cli::setup::setup(),
        Some(cmd) => ratewatch::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
