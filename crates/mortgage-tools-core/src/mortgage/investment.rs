//! Rental property screen: financing plus first-year cash-flow metrics.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{summarize, LoanInputs, Schedule};
use crate::error::MortgageError;
use crate::mortgage::affordability::loan_to_value;
use crate::types::*;
use crate::MortgageResult;

const DEFAULT_DOWN_PAYMENT_PERCENT: Decimal = dec!(20);
const DEFAULT_RATE_PERCENT: Decimal = dec!(6.5);
const DEFAULT_TERM_YEARS: u32 = 30;
/// Monthly rent as a fraction of price (the "1% rule").
const DEFAULT_RENT_RATIO: Decimal = dec!(0.01);
/// Monthly operating expenses as a fraction of price.
const DEFAULT_EXPENSE_RATIO: Decimal = dec!(0.004);
const DEFAULT_CLOSING_COST_PERCENT: Decimal = dec!(5);
const DEFAULT_APPRECIATION_PERCENT: Decimal = dec!(3);

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Only the price is required; every other figure falls back to a market
/// rule of thumb.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvestmentInput {
    pub property_price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_payment_percent: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_rate_percent: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term_years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_expenses: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_cost_percent: Option<Percent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appreciation_percent: Option<Percent>,
}

impl InvestmentInput {
    pub fn new(property_price: Money) -> Self {
        InvestmentInput {
            property_price,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Financing {
    pub down_payment: Money,
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    /// Down payment plus every scheduled payment.
    pub total_cost: Money,
    pub loan_to_value: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentMetrics {
    pub monthly_rent: Money,
    pub monthly_expenses: Money,
    pub monthly_cash_flow: Money,
    pub annual_cash_flow: Money,
    /// Net operating income over price, in percent.
    pub cap_rate: Percent,
    pub cash_invested: Money,
    /// Cash-on-cash: annual cash flow over cash invested, in percent.
    pub roi: Percent,
    /// Years of cash flow needed to recover the cash invested; `None` when
    /// the property does not cash-flow.
    pub payback_years: Option<Decimal>,
    /// Monthly rent at which cash flow is exactly zero.
    pub break_even_rent: Money,
    pub appreciation_percent: Percent,
    /// Cash flow plus one year's appreciation over cash invested, in percent.
    pub total_return: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentOutput {
    pub financing: Financing,
    pub metrics: InvestmentMetrics,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_investment(
    input: &InvestmentInput,
) -> MortgageResult<ComputationOutput<InvestmentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let price = input.property_price;
    if price <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "property_price",
            "Property price must be positive",
        ));
    }

    let down_percent = input
        .down_payment_percent
        .unwrap_or(DEFAULT_DOWN_PAYMENT_PERCENT);
    if down_percent < Decimal::ZERO || down_percent >= dec!(100) {
        return Err(MortgageError::invalid(
            "down_payment_percent",
            "Down payment must be at least 0% and below 100%",
        ));
    }
    let rate_percent = input.annual_rate_percent.unwrap_or(DEFAULT_RATE_PERCENT);
    let term_years = input.term_years.unwrap_or(DEFAULT_TERM_YEARS);

    let monthly_rent = match input.monthly_rent {
        Some(rent) => rent,
        None => {
            warnings.push("Rent estimated at 1% of price per month".into());
            price * DEFAULT_RENT_RATIO
        }
    };
    let monthly_expenses = match input.monthly_expenses {
        Some(expenses) => expenses,
        None => {
            warnings.push("Operating expenses estimated at 0.4% of price per month".into());
            price * DEFAULT_EXPENSE_RATIO
        }
    };
    let closing_percent = input
        .closing_cost_percent
        .unwrap_or(DEFAULT_CLOSING_COST_PERCENT);
    let appreciation_percent = input
        .appreciation_percent
        .unwrap_or(DEFAULT_APPRECIATION_PERCENT);

    for (field, value) in [
        ("monthly_rent", monthly_rent),
        ("monthly_expenses", monthly_expenses),
        ("closing_cost_percent", closing_percent),
    ] {
        if value < Decimal::ZERO {
            return Err(MortgageError::invalid(field, "Value cannot be negative"));
        }
    }

    // -- Financing --
    let down_payment = price * down_percent / dec!(100);
    let loan_amount = price - down_payment;
    let schedule = Schedule::new(&LoanInputs::new(loan_amount, rate_percent, term_years))?;
    let totals = summarize(&schedule);

    let financing = Financing {
        down_payment,
        loan_amount,
        monthly_payment: totals.monthly_payment,
        total_interest: totals.total_interest,
        total_cost: down_payment + totals.total_cost,
        loan_to_value: loan_to_value(loan_amount, price)?,
    };

    // -- Metrics --
    let monthly_cash_flow = monthly_rent - financing.monthly_payment - monthly_expenses;
    let annual_cash_flow = monthly_cash_flow * dec!(12);
    let annual_noi = (monthly_rent - monthly_expenses) * dec!(12);
    let cash_invested = down_payment + price * closing_percent / dec!(100);

    let (roi, total_return) = if cash_invested > Decimal::ZERO {
        let appreciation = price * appreciation_percent / dec!(100);
        (
            annual_cash_flow / cash_invested * dec!(100),
            (annual_cash_flow + appreciation) / cash_invested * dec!(100),
        )
    } else {
        warnings.push("No cash invested; return ratios are not meaningful".into());
        (Decimal::ZERO, Decimal::ZERO)
    };

    let payback_years = if annual_cash_flow > Decimal::ZERO {
        Some(cash_invested / annual_cash_flow)
    } else {
        warnings.push("Property does not cash-flow at the assumed rent".into());
        None
    };

    let metrics = InvestmentMetrics {
        monthly_rent,
        monthly_expenses,
        monthly_cash_flow,
        annual_cash_flow,
        cap_rate: annual_noi / price * dec!(100),
        cash_invested,
        roi,
        payback_years,
        break_even_rent: monthly_expenses + financing.monthly_payment,
        appreciation_percent,
        total_return,
    };

    let output = InvestmentOutput { financing, metrics };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rental Property Cash Flow Screen",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(actual: Decimal, expected: Decimal, tolerance: Decimal) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {expected} ± {tolerance}, got {actual}"
        );
    }

    #[test]
    fn test_defaults_applied() {
        let out = analyze_investment(&InvestmentInput::new(dec!(300_000))).unwrap();
        let f = &out.result.financing;
        let m = &out.result.metrics;
        assert_eq!(f.down_payment, dec!(60_000));
        assert_eq!(f.loan_amount, dec!(240_000));
        assert_eq!(f.loan_to_value, dec!(80));
        assert_eq!(m.monthly_rent, dec!(3000));
        assert_eq!(m.monthly_expenses, dec!(1200));
        assert_eq!(m.cash_invested, dec!(75_000));
        assert_eq!(m.appreciation_percent, dec!(3));
        // 240k at 6.5% over 30y ≈ 1516.96
        assert_close(f.monthly_payment, dec!(1516.96), dec!(0.01));
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_cap_rate_ignores_financing() {
        let m = analyze_investment(&InvestmentInput::new(dec!(300_000)))
            .unwrap()
            .result
            .metrics;
        // NOI = (3000 - 1200) * 12 = 21,600 → 7.2%
        assert_eq!(m.cap_rate, dec!(7.2));
    }

    #[test]
    fn test_cash_flow_and_break_even_rent() {
        let out = analyze_investment(&InvestmentInput::new(dec!(300_000)))
            .unwrap()
            .result;
        let m = &out.metrics;
        assert_close(m.monthly_cash_flow, dec!(283.04), dec!(0.01));
        assert_eq!(m.annual_cash_flow, m.monthly_cash_flow * dec!(12));
        assert_eq!(
            m.break_even_rent,
            m.monthly_expenses + out.financing.monthly_payment
        );
        let payback = m.payback_years.unwrap();
        assert_close(payback, dec!(75_000) / m.annual_cash_flow, dec!(0.000001));
        assert!(m.total_return > m.roi);
    }

    #[test]
    fn test_negative_cash_flow_has_no_payback() {
        let mut input = InvestmentInput::new(dec!(300_000));
        input.monthly_rent = Some(dec!(2000));
        input.monthly_expenses = Some(dec!(1000));
        let out = analyze_investment(&input).unwrap();
        assert!(out.result.metrics.monthly_cash_flow < Decimal::ZERO);
        assert!(out.result.metrics.roi < Decimal::ZERO);
        assert_eq!(out.result.metrics.payback_years, None);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_overrides_used() {
        let input = InvestmentInput {
            property_price: dec!(500_000),
            down_payment_percent: Some(dec!(25)),
            annual_rate_percent: Some(dec!(7)),
            term_years: Some(15),
            monthly_rent: Some(dec!(4500)),
            monthly_expenses: Some(dec!(1500)),
            closing_cost_percent: Some(dec!(3)),
            appreciation_percent: Some(dec!(4)),
        };
        let out = analyze_investment(&input).unwrap();
        assert!(out.warnings.iter().all(|w| !w.contains("estimated")));
        assert_eq!(out.result.financing.down_payment, dec!(125_000));
        assert_eq!(out.result.metrics.cash_invested, dec!(140_000));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(analyze_investment(&InvestmentInput::new(Decimal::ZERO)).is_err());

        let mut input = InvestmentInput::new(dec!(300_000));
        input.down_payment_percent = Some(dec!(100));
        assert!(analyze_investment(&input).is_err());

        let mut input = InvestmentInput::new(dec!(300_000));
        input.term_years = Some(0);
        assert!(analyze_investment(&input).is_err());
    }
}
