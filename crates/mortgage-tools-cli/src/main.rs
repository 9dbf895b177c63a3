mod commands;
mod config;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use commands::amortization::LoanArgs;
use commands::history::HistoryArgs;
use commands::investment::InvestmentArgs;
use commands::mortgage::{PreApprovalArgs, PurchaseArgs};
use commands::refinance::RefinanceArgs;
use commands::rent_vs_buy::RentVsBuyArgs;
use config::CliConfig;
use mortgage_tools_core::history::CalculationKind;

/// Fixed-rate mortgage calculations
#[derive(Parser)]
#[command(
    name = "mtg",
    version,
    about = "Fixed-rate mortgage calculations",
    long_about = "A CLI for mortgage calculations with decimal precision. Supports \
                  amortization schedules, extra-payment savings, purchase pricing, \
                  pre-approval screening, refinance break-even, rent vs buy and \
                  rental property analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    /// File recent calculations are kept in (overrides MTG_HISTORY_FILE)
    #[arg(long, global = true)]
    history_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Level monthly payment and lifetime totals
    Amortize(LoanArgs),
    /// Full payment-by-payment amortization schedule
    Schedule(LoanArgs),
    /// Interest and time saved by an extra payment policy
    ExtraPayments(LoanArgs),
    /// Price a home purchase: loan, payment and schedule
    Purchase(PurchaseArgs),
    /// Debt-to-income pre-approval screen
    PreApproval(PreApprovalArgs),
    /// Compare the current loan with a refinance
    Refinance(RefinanceArgs),
    /// Compare renting with buying over five and ten years
    RentVsBuy(RentVsBuyArgs),
    /// Cash flow, cap rate and ROI of a rental property
    Investment(InvestmentArgs),
    /// Show or clear recent calculations
    History(HistoryArgs),
    /// Print version information
    Version,
}

impl Commands {
    fn kind(&self) -> Option<CalculationKind> {
        match self {
            Commands::Amortize(_) | Commands::Schedule(_) => Some(CalculationKind::Amortization),
            Commands::ExtraPayments(_) => Some(CalculationKind::ExtraPayments),
            Commands::Purchase(_) => Some(CalculationKind::Purchase),
            Commands::PreApproval(_) => Some(CalculationKind::PreApproval),
            Commands::Refinance(_) => Some(CalculationKind::Refinance),
            Commands::RentVsBuy(_) => Some(CalculationKind::RentVsBuy),
            Commands::Investment(_) => Some(CalculationKind::Investment),
            Commands::History(_) | Commands::Version => None,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let config = CliConfig::from_env().with_history_flag(cli.history_file.clone());
    init_logging(&config.log_directive(cli.verbose));
    debug!(?config, "configuration resolved");

    let kind = cli.command.kind();
    let history_file = config.history_file.as_deref();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::amortization::run_amortize(args),
        Commands::Schedule(args) => commands::amortization::run_schedule(args),
        Commands::ExtraPayments(args) => commands::amortization::run_extra_payments(args),
        Commands::Purchase(args) => commands::mortgage::run_purchase(args),
        Commands::PreApproval(args) => commands::mortgage::run_pre_approval(args),
        Commands::Refinance(args) => commands::refinance::run_refinance(args),
        Commands::RentVsBuy(args) => commands::rent_vs_buy::run_rent_vs_buy(args),
        Commands::Investment(args) => commands::investment::run_investment(args),
        Commands::History(args) => commands::history::run_history(args, history_file),
        Commands::Version => {
            println!("mtg {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            if let (Some(kind), Some(path)) = (kind, history_file) {
                if let Err(e) = commands::history::record(path, kind, &value) {
                    warn!(path = %path.display(), error = %e, "could not record history");
                }
            }
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
