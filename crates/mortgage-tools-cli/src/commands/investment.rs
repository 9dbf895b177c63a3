use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_tools_core::mortgage::investment::{self, InvestmentInput};

use crate::input;

/// Arguments for rental property analysis
#[derive(Args)]
pub struct InvestmentArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price of the property
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment in percent of price [default: 20]
    #[arg(long)]
    pub down_payment_percent: Option<Decimal>,

    /// Annual interest rate in percent [default: 6.5]
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years [default: 30]
    #[arg(long)]
    pub years: Option<u32>,

    /// Expected monthly rent [default: 1% of price]
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Monthly operating expenses [default: 0.4% of price]
    #[arg(long)]
    pub expenses: Option<Decimal>,
}

pub fn run_investment(args: InvestmentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let parsed = input::read_input(args.input.as_deref())?;
    let inv_input: InvestmentInput = if let Some(parsed) = parsed {
        parsed
    } else {
        InvestmentInput {
            down_payment_percent: args.down_payment_percent,
            annual_rate_percent: args.rate,
            term_years: args.years,
            monthly_rent: args.rent,
            monthly_expenses: args.expenses,
            ..InvestmentInput::new(
                args.price
                    .ok_or("--price is required (or provide --input)")?,
            )
        }
    };

    let result = investment::analyze_investment(&inv_input)?;
    Ok(serde_json::to_value(result)?)
}
