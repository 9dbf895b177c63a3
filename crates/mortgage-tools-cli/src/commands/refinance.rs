use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_tools_core::mortgage::refinance::{self, RefinanceInput};

use crate::input;

/// Arguments for refinance break-even analysis
#[derive(Args)]
pub struct RefinanceArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Outstanding balance on the current loan
    #[arg(long)]
    pub balance: Option<Decimal>,

    /// Current annual rate in percent
    #[arg(long)]
    pub current_rate: Option<Decimal>,

    /// Years left on the current loan
    #[arg(long)]
    pub remaining_years: Option<u32>,

    /// Annual rate of the new loan in percent
    #[arg(long)]
    pub new_rate: Option<Decimal>,

    /// Term of the new loan in years
    #[arg(long, default_value_t = 30)]
    pub new_years: u32,

    /// Closing costs of the new loan
    #[arg(long, default_value = "0")]
    pub closing_costs: Decimal,

    /// Equity withdrawn on top of the payoff
    #[arg(long, default_value = "0")]
    pub cash_out: Decimal,
}

pub fn run_refinance(args: RefinanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let parsed = input::read_input(args.input.as_deref())?;
    let refi_input: RefinanceInput = if let Some(parsed) = parsed {
        parsed
    } else {
        RefinanceInput {
            current_balance: args
                .balance
                .ok_or("--balance is required (or provide --input)")?,
            current_rate_percent: args
                .current_rate
                .ok_or("--current-rate is required (or provide --input)")?,
            remaining_years: args
                .remaining_years
                .ok_or("--remaining-years is required (or provide --input)")?,
            new_rate_percent: args
                .new_rate
                .ok_or("--new-rate is required (or provide --input)")?,
            new_term_years: args.new_years,
            closing_costs: args.closing_costs,
            cash_out: args.cash_out,
        }
    };

    let result = refinance::analyze_refinance(&refi_input)?;
    Ok(serde_json::to_value(result)?)
}
