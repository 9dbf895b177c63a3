use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{summarize, LoanInputs, PaymentScheduleEntry, Schedule};
use crate::error::MortgageError;
use crate::mortgage::affordability::loan_to_value;
use crate::types::*;
use crate::MortgageResult;

/// Down payment share below which lenders usually require mortgage insurance.
const PMI_THRESHOLD_PERCENT: Decimal = dec!(20);

/// Home purchase financed by a fixed-rate mortgage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseInput {
    pub property_price: Money,
    pub down_payment: Money,
    pub annual_rate_percent: Percent,
    pub term_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOutput {
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_payment: Money,
    pub down_payment_percent: Percent,
    pub loan_to_value: Percent,
    /// Principal as a share of everything paid, in percent.
    pub principal_share: Percent,
    /// Interest as a share of everything paid, in percent.
    pub interest_share: Percent,
    pub schedule: Vec<PaymentScheduleEntry>,
}

/// Price a home purchase: loan amount, payment, lifetime cost and full schedule.
pub fn calculate_purchase(
    input: &PurchaseInput,
) -> MortgageResult<ComputationOutput<PurchaseOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.property_price <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "property_price",
            "Property price must be positive",
        ));
    }
    if input.down_payment < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment cannot be negative",
        ));
    }
    if input.down_payment >= input.property_price {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment must be less than the property price",
        ));
    }

    let loan_amount = input.property_price - input.down_payment;
    let loan = LoanInputs::new(loan_amount, input.annual_rate_percent, input.term_years);
    let schedule = Schedule::new(&loan)?;
    let summary = summarize(&schedule);

    let down_payment_percent = input.down_payment / input.property_price * dec!(100);
    if down_payment_percent < PMI_THRESHOLD_PERCENT {
        warnings.push(format!(
            "Down payment of {}% is below {}%; private mortgage insurance is likely required",
            down_payment_percent.round_dp(1),
            PMI_THRESHOLD_PERCENT
        ));
    }

    let total_payment = summary.total_cost;
    let (principal_share, interest_share) = if total_payment > Decimal::ZERO {
        (
            loan_amount / total_payment * dec!(100),
            summary.total_interest / total_payment * dec!(100),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    let output = PurchaseOutput {
        loan_amount,
        monthly_payment: summary.monthly_payment,
        total_interest: summary.total_interest,
        total_payment,
        down_payment_percent,
        loan_to_value: loan_to_value(loan_amount, input.property_price)?,
        principal_share,
        interest_share,
        schedule: schedule.iter().collect(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Home Purchase Mortgage",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample() -> PurchaseInput {
        PurchaseInput {
            property_price: dec!(450_000),
            down_payment: dec!(90_000),
            annual_rate_percent: dec!(6.5),
            term_years: 30,
        }
    }

    #[test]
    fn test_purchase_basic() {
        let out = calculate_purchase(&sample()).unwrap();
        let r = &out.result;
        assert_eq!(r.loan_amount, dec!(360_000));
        assert_eq!(r.down_payment_percent, dec!(20));
        assert_eq!(r.loan_to_value, dec!(80));
        // 360k at 6.5% over 30y ≈ 2275.44
        assert!((r.monthly_payment - dec!(2275.44)).abs() < dec!(0.01));
        assert_eq!(r.schedule.len(), 360);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let r = calculate_purchase(&sample()).unwrap().result;
        let total = r.principal_share + r.interest_share;
        assert!((total - dec!(100)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_low_down_payment_warns() {
        let mut input = sample();
        input.down_payment = dec!(22_500);
        let out = calculate_purchase(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_zero_down_payment_allowed() {
        let mut input = sample();
        input.down_payment = Decimal::ZERO;
        let r = calculate_purchase(&input).unwrap().result;
        assert_eq!(r.loan_to_value, dec!(100));
    }

    #[test]
    fn test_down_payment_covers_price_rejected() {
        let mut input = sample();
        input.down_payment = input.property_price;
        assert!(calculate_purchase(&input).is_err());
    }

    #[test]
    fn test_invalid_price_rejected() {
        let mut input = sample();
        input.property_price = dec!(-1);
        assert!(calculate_purchase(&input).is_err());
    }

    #[test]
    fn test_invalid_rate_propagates() {
        let mut input = sample();
        input.annual_rate_percent = dec!(-2);
        assert!(matches!(
            calculate_purchase(&input),
            Err(MortgageError::InvalidLoanInput { .. })
        ));
    }
}
