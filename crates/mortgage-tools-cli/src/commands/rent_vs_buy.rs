use clap::Args;
use serde_json::Value;

use mortgage_tools_core::mortgage::rent_vs_buy::{self, RentVsBuyInput};

use crate::input;

/// Arguments for rent versus buy comparison
#[derive(Args)]
pub struct RentVsBuyArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_rent_vs_buy(args: RentVsBuyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let parsed = input::read_input(args.input.as_deref())?;
    let rvb_input: RentVsBuyInput = if let Some(parsed) = parsed {
        parsed
    } else {
        return Err("--input <file.json> or stdin required for rent vs buy".into());
    };
    let result = rent_vs_buy::analyze_rent_vs_buy(&rvb_input)?;
    Ok(serde_json::to_value(result)?)
}
