//! Rent versus buy: net financial position of owning (home equity less cash
//! spent) against renting and investing the would-be down payment.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::LoanInputs;
use crate::error::MortgageError;
use crate::time_value::{compound, level_payment, monthly_rate, remaining_balance};
use crate::types::*;
use crate::MortgageResult;

/// Net-position gap below which neither option is considered ahead.
const NEUTRAL_BAND: Decimal = dec!(1000);

/// Furthest year searched for the buy/rent crossover.
const BREAK_EVEN_HORIZON_YEARS: u32 = 20;

const COMPARISON_YEARS: u32 = 10;

/// Highest yearly appreciation, rent increase or investment return accepted.
const MAX_GROWTH_PERCENT: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuyInput {
    pub home_price: Money,
    pub monthly_rent: Money,
    pub down_payment_percent: Percent,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
    pub closing_costs: Money,
    /// Annual property tax as a percentage of the home price.
    pub property_tax_percent: Percent,
    pub monthly_home_insurance: Money,
    /// Annual maintenance as a percentage of the home price.
    pub maintenance_percent: Percent,
    #[serde(default)]
    pub monthly_hoa: Money,
    pub appreciation_percent: Percent,
    pub rent_increase_percent: Percent,
    /// Return earned on the cash a renter keeps invested.
    pub investment_return_percent: Percent,
    #[serde(default)]
    pub security_deposit: Money,
    #[serde(default)]
    pub monthly_renters_insurance: Money,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuyingAnalysis {
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub total_monthly_cost: Money,
    pub down_payment: Money,
    pub initial_cash_outlay: Money,
    pub equity_5_years: Money,
    pub equity_10_years: Money,
    pub total_cost_5_years: Money,
    pub total_cost_10_years: Money,
    pub net_worth_5_years: Money,
    pub net_worth_10_years: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentingAnalysis {
    pub total_monthly_cost: Money,
    pub initial_deposit: Money,
    pub total_cost_5_years: Money,
    pub total_cost_10_years: Money,
    pub investment_5_years: Money,
    pub investment_10_years: Money,
    pub net_worth_5_years: Money,
    pub net_worth_10_years: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advantage {
    Buy,
    Rent,
    Neutral,
}

impl Advantage {
    fn from_gap(buy_minus_rent: Money) -> Self {
        if buy_minus_rent > NEUTRAL_BAND {
            Advantage::Buy
        } else if buy_minus_rent < -NEUTRAL_BAND {
            Advantage::Rent
        } else {
            Advantage::Neutral
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonAnalysis {
    /// Buying's monthly cost minus renting's.
    pub monthly_difference: Money,
    pub cash_outlay_difference: Money,
    /// Buying's net position minus renting's.
    pub five_year_savings: Money,
    pub ten_year_savings: Money,
    pub five_year_advantage: Advantage,
    pub ten_year_advantage: Advantage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearlyComparison {
    pub year: u32,
    pub buying_cumulative_cost: Money,
    pub renting_cumulative_cost: Money,
    pub buying_net_worth: Money,
    pub renting_net_worth: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuyRecommendation {
    pub decision: Advantage,
    /// Rough confidence, 0-100.
    pub confidence: u8,
    pub considerations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuyOutput {
    pub buying: BuyingAnalysis,
    pub renting: RentingAnalysis,
    pub comparison: ComparisonAnalysis,
    /// First year in which buying's net position overtakes renting's.
    pub break_even_year: Option<u32>,
    pub yearly_comparison: Vec<YearlyComparison>,
    pub recommendation: RentVsBuyRecommendation,
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Cumulative position of both options at the end of one year.
#[derive(Debug, Clone, Copy)]
struct YearPosition {
    equity: Money,
    buying_cost: Money,
    buying_net: Money,
    renting_cost: Money,
    investment: Money,
    renting_net: Money,
}

struct Model {
    down_payment: Money,
    loan_amount: Money,
    monthly_payment: Money,
    buy_monthly_cost: Money,
    initial_outlay: Money,
    /// Years 1 through `BREAK_EVEN_HORIZON_YEARS`.
    years: Vec<YearPosition>,
}

fn out_of_range() -> MortgageError {
    MortgageError::invalid(
        "home_price",
        format!("Amounts leave the representable range within {BREAK_EVEN_HORIZON_YEARS} years"),
    )
}

impl Model {
    fn new(input: &RentVsBuyInput) -> MortgageResult<Self> {
        let down_payment = input.home_price * (input.down_payment_percent / dec!(100));
        let loan_amount = input.home_price - down_payment;
        let rate = monthly_rate(input.annual_rate_percent);
        let periods = input.term_years * 12;
        let monthly_payment = level_payment(loan_amount, rate, periods)?;

        let monthly_tax = input.home_price * (input.property_tax_percent / dec!(1200));
        let monthly_maintenance = input.home_price * (input.maintenance_percent / dec!(1200));
        let buy_monthly_cost = [
            monthly_tax,
            input.monthly_home_insurance,
            monthly_maintenance,
            input.monthly_hoa,
        ]
        .into_iter()
        .try_fold(monthly_payment, Decimal::checked_add)
        .ok_or_else(out_of_range)?;
        let initial_outlay = down_payment
            .checked_add(input.closing_costs)
            .ok_or_else(out_of_range)?;

        let escalator = Decimal::ONE + input.rent_increase_percent / dec!(100);
        let mut rent = input.monthly_rent;
        let mut renting_cost = input.security_deposit;
        let mut years = Vec::with_capacity(BREAK_EVEN_HORIZON_YEARS as usize);

        for year in 1..=BREAK_EVEN_HORIZON_YEARS {
            renting_cost = rent
                .checked_add(input.monthly_renters_insurance)
                .and_then(|monthly| monthly.checked_mul(dec!(12)))
                .and_then(|annual| renting_cost.checked_add(annual))
                .ok_or_else(out_of_range)?;
            rent = rent.checked_mul(escalator).ok_or_else(out_of_range)?;

            let home_value = compound(input.home_price, input.appreciation_percent, year)?;
            let balance = remaining_balance(loan_amount, rate, periods, year * 12);
            let equity = home_value - balance;
            let buying_cost = buy_monthly_cost
                .checked_mul(Decimal::from(year * 12))
                .and_then(|paid| paid.checked_add(initial_outlay))
                .ok_or_else(out_of_range)?;
            let investment = compound(initial_outlay, input.investment_return_percent, year)?;

            years.push(YearPosition {
                equity,
                buying_cost,
                buying_net: equity.checked_sub(buying_cost).ok_or_else(out_of_range)?,
                renting_cost,
                investment,
                renting_net: investment
                    .checked_sub(renting_cost)
                    .ok_or_else(out_of_range)?,
            });
        }

        Ok(Model {
            down_payment,
            loan_amount,
            monthly_payment,
            buy_monthly_cost,
            initial_outlay,
            years,
        })
    }

    fn year(&self, year: u32) -> &YearPosition {
        &self.years[year as usize - 1]
    }

    /// Buying's net position minus renting's.
    fn gap(&self, year: u32) -> MortgageResult<Money> {
        let p = self.year(year);
        p.buying_net
            .checked_sub(p.renting_net)
            .ok_or_else(out_of_range)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_rent_vs_buy(
    input: &RentVsBuyInput,
) -> MortgageResult<ComputationOutput<RentVsBuyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate(input)?;
    let model = Model::new(input)?;

    if input.down_payment_percent >= dec!(100) {
        warnings.push("Home is bought outright; no mortgage payment is modelled".into());
    }

    let (five, ten) = (model.year(5), model.year(10));
    let buying = BuyingAnalysis {
        loan_amount: model.loan_amount,
        monthly_payment: model.monthly_payment,
        total_monthly_cost: model.buy_monthly_cost,
        down_payment: model.down_payment,
        initial_cash_outlay: model.initial_outlay,
        equity_5_years: five.equity,
        equity_10_years: ten.equity,
        total_cost_5_years: five.buying_cost,
        total_cost_10_years: ten.buying_cost,
        net_worth_5_years: five.buying_net,
        net_worth_10_years: ten.buying_net,
    };

    let renting = RentingAnalysis {
        total_monthly_cost: input.monthly_rent + input.monthly_renters_insurance,
        initial_deposit: input.security_deposit,
        total_cost_5_years: five.renting_cost,
        total_cost_10_years: ten.renting_cost,
        investment_5_years: five.investment,
        investment_10_years: ten.investment,
        net_worth_5_years: five.renting_net,
        net_worth_10_years: ten.renting_net,
    };

    let five_year_savings = model.gap(5)?;
    let ten_year_savings = model.gap(10)?;
    let comparison = ComparisonAnalysis {
        monthly_difference: buying.total_monthly_cost - renting.total_monthly_cost,
        cash_outlay_difference: buying.initial_cash_outlay - renting.initial_deposit,
        five_year_savings,
        ten_year_savings,
        five_year_advantage: Advantage::from_gap(five_year_savings),
        ten_year_advantage: Advantage::from_gap(ten_year_savings),
    };

    let break_even_year = (1..=BREAK_EVEN_HORIZON_YEARS).find(|&y| {
        let p = model.year(y);
        p.buying_net > p.renting_net
    });
    if break_even_year.is_none() {
        warnings.push(format!(
            "Buying does not overtake renting within {BREAK_EVEN_HORIZON_YEARS} years"
        ));
    }

    let yearly_comparison = (1..=COMPARISON_YEARS)
        .map(|year| {
            let p = model.year(year);
            YearlyComparison {
                year,
                buying_cumulative_cost: p.buying_cost,
                renting_cumulative_cost: p.renting_cost,
                buying_net_worth: p.buying_net,
                renting_net_worth: p.renting_net,
            }
        })
        .collect();

    let recommendation = recommend(&buying, &comparison);

    let output = RentVsBuyOutput {
        buying,
        renting,
        comparison,
        break_even_year,
        yearly_comparison,
        recommendation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rent vs Buy Net Position",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate(input: &RentVsBuyInput) -> MortgageResult<()> {
    // Financing terms are checked as a loan against the full price.
    LoanInputs::new(input.home_price, input.annual_rate_percent, input.term_years).validate()?;

    if input.monthly_rent <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "monthly_rent",
            "Monthly rent must be positive",
        ));
    }
    if input.down_payment_percent < Decimal::ZERO || input.down_payment_percent > dec!(100) {
        return Err(MortgageError::invalid(
            "down_payment_percent",
            "Down payment must be between 0% and 100%",
        ));
    }
    for (field, value) in [
        ("property_tax_percent", input.property_tax_percent),
        ("maintenance_percent", input.maintenance_percent),
    ] {
        if value < Decimal::ZERO || value > dec!(100) {
            return Err(MortgageError::invalid(
                field,
                "Annual rate must be between 0% and 100% of the price",
            ));
        }
    }
    let non_negative = [
        ("closing_costs", input.closing_costs),
        ("monthly_home_insurance", input.monthly_home_insurance),
        ("monthly_hoa", input.monthly_hoa),
        ("security_deposit", input.security_deposit),
        ("monthly_renters_insurance", input.monthly_renters_insurance),
    ];
    for (field, value) in non_negative {
        if value < Decimal::ZERO {
            return Err(MortgageError::invalid(field, "Value cannot be negative"));
        }
    }
    for (field, value) in [
        ("appreciation_percent", input.appreciation_percent),
        ("rent_increase_percent", input.rent_increase_percent),
        ("investment_return_percent", input.investment_return_percent),
    ] {
        if value <= dec!(-100) || value > MAX_GROWTH_PERCENT {
            return Err(MortgageError::invalid(
                field,
                format!("Growth rate must be above -100% and at most {MAX_GROWTH_PERCENT}% per year"),
            ));
        }
    }
    Ok(())
}

fn recommend(buying: &BuyingAnalysis, c: &ComparisonAnalysis) -> RentVsBuyRecommendation {
    let (decision, confidence) = match (c.five_year_advantage, c.ten_year_advantage) {
        (Advantage::Buy, Advantage::Buy) => (Advantage::Buy, 85),
        (Advantage::Rent, Advantage::Rent) => (Advantage::Rent, 85),
        (_, Advantage::Buy) if c.ten_year_savings.abs() > dec!(50_000) => (Advantage::Buy, 70),
        (Advantage::Rent, _) if c.monthly_difference > dec!(500) => (Advantage::Rent, 75),
        _ => (Advantage::Neutral, 60),
    };

    let mut considerations = Vec::new();
    if c.monthly_difference > dec!(300) {
        considerations.push(format!(
            "Buying costs {} more per month",
            c.monthly_difference.round_dp(2)
        ));
    }
    if buying.initial_cash_outlay > dec!(50_000) {
        considerations.push(format!(
            "Significant upfront cash required: {}",
            buying.initial_cash_outlay.round_dp(2)
        ));
    }
    if c.ten_year_advantage == Advantage::Buy {
        considerations.push("Long-term wealth building through home equity".into());
    }
    if c.five_year_advantage == Advantage::Rent {
        considerations.push("Renting keeps flexibility and avoids maintenance".into());
    }

    RentVsBuyRecommendation {
        decision,
        confidence,
        considerations,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
