use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_tools_core::amortization::extra_payments;
use mortgage_tools_core::amortization::{self, ExtraPayment, LoanInputs};

use crate::input;

/// Loan terms shared by `amortize`, `schedule` and `extra-payments`
#[derive(Args)]
pub struct LoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (6.5 = 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Extra principal paid with every payment
    #[arg(long, conflicts_with_all = ["extra_annual", "extra_one_time"])]
    pub extra_monthly: Option<Decimal>,

    /// Extra principal paid with every 12th payment
    #[arg(long, conflicts_with = "extra_one_time")]
    pub extra_annual: Option<Decimal>,

    /// Single lump sum of extra principal
    #[arg(long, requires = "extra_period")]
    pub extra_one_time: Option<Decimal>,

    /// Payment number (1-based) the lump sum is paid with
    #[arg(long, requires = "extra_one_time")]
    pub extra_period: Option<u32>,
}

impl LoanArgs {
    fn extra_payment(&self) -> ExtraPayment {
        match (
            self.extra_monthly,
            self.extra_annual,
            self.extra_one_time,
            self.extra_period,
        ) {
            (Some(amount), _, _, _) => ExtraPayment::Monthly { amount },
            (_, Some(amount), _, _) => ExtraPayment::Annual { amount },
            (_, _, Some(amount), Some(period)) => ExtraPayment::OneTime { amount, period },
            _ => ExtraPayment::None,
        }
    }

    fn into_loan_inputs(self) -> Result<LoanInputs, Box<dyn std::error::Error>> {
        if let Some(parsed) = input::read_input(self.input.as_deref())? {
            return Ok(parsed);
        }

        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        let years = self.years.ok_or("--years is required (or provide --input)")?;
        let extra = self.extra_payment();

        Ok(LoanInputs::new(principal, rate, years).with_extra_payment(extra))
    }
}

pub fn run_amortize(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = args.into_loan_inputs()?;
    let result = amortization::calculate_amortization(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = args.into_loan_inputs()?;
    let result = amortization::build_amortization_table(&loan)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_extra_payments(args: LoanArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = args.into_loan_inputs()?;
    let result = extra_payments::analyze_extra_payments(&loan)?;
    Ok(serde_json::to_value(result)?)
}
