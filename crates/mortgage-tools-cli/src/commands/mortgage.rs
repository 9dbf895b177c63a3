use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_tools_core::mortgage::affordability::{self, PreApprovalInput};
use mortgage_tools_core::mortgage::purchase::{self, PurchaseInput};

use crate::input;

/// Arguments for a home purchase calculation
#[derive(Args)]
pub struct PurchaseArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price of the property
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Cash paid up front
    #[arg(long)]
    pub down_payment: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long, default_value_t = 30)]
    pub years: u32,
}

pub fn run_purchase(args: PurchaseArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let parsed = input::read_input(args.input.as_deref())?;
    let purchase_input: PurchaseInput = if let Some(parsed) = parsed {
        parsed
    } else {
        PurchaseInput {
            property_price: args.price.ok_or("--price is required (or provide --input)")?,
            down_payment: args
                .down_payment
                .ok_or("--down-payment is required (or provide --input)")?,
            annual_rate_percent: args.rate.ok_or("--rate is required (or provide --input)")?,
            term_years: args.years,
        }
    };

    let result = purchase::calculate_purchase(&purchase_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a debt-to-income pre-approval screen
#[derive(Args)]
pub struct PreApprovalArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross annual income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Amount to be borrowed
    #[arg(long)]
    pub loan_amount: Option<Decimal>,

    /// Existing recurring monthly debt payments
    #[arg(long, default_value = "0")]
    pub monthly_debts: Decimal,

    /// Priced monthly payment; estimated from the loan amount when omitted
    #[arg(long)]
    pub monthly_payment: Option<Decimal>,
}

pub fn run_pre_approval(args: PreApprovalArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let parsed = input::read_input(args.input.as_deref())?;
    let pa_input: PreApprovalInput = if let Some(parsed) = parsed {
        parsed
    } else {
        PreApprovalInput {
            annual_income: args.income.ok_or("--income is required (or provide --input)")?,
            loan_amount: args
                .loan_amount
                .ok_or("--loan-amount is required (or provide --input)")?,
            monthly_debts: args.monthly_debts,
            monthly_payment: args.monthly_payment,
        }
    };

    let result = affordability::check_pre_approval(&pa_input)?;
    Ok(serde_json::to_value(result)?)
}
