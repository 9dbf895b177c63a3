use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::types::*;
use crate::MortgageResult;

/// Highest back-end debt-to-income ratio accepted for pre-approval, in percent.
pub const MAX_DTI_PERCENT: Decimal = dec!(43);

/// Rough payment per dollar borrowed (about 6% over 30 years) used when the
/// caller has not priced the loan yet.
const ESTIMATED_PAYMENT_FACTOR: Decimal = dec!(0.005);

/// Loan-to-value: loan amount over property value, in percent.
pub fn loan_to_value(loan_amount: Money, property_value: Money) -> MortgageResult<Percent> {
    if property_value <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "property_value",
            "Property value must be positive",
        ));
    }
    Ok(loan_amount / property_value * dec!(100))
}

/// Debt-to-income: recurring monthly debts plus the housing payment over
/// gross monthly income, in percent.
pub fn debt_to_income(
    monthly_income: Money,
    monthly_debts: Money,
    housing_payment: Money,
) -> MortgageResult<Percent> {
    if monthly_income <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "monthly_income",
            "Monthly income must be positive",
        ));
    }
    Ok((monthly_debts + housing_payment) / monthly_income * dec!(100))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreApprovalInput {
    pub annual_income: Money,
    pub loan_amount: Money,
    pub monthly_debts: Money,
    /// Priced monthly payment; estimated from the loan amount when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_payment: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreApprovalOutput {
    pub monthly_income: Money,
    pub housing_payment: Money,
    pub payment_estimated: bool,
    pub dti_ratio: Percent,
    pub max_dti: Percent,
    pub eligible: bool,
}

/// Pre-approval screen: eligible when the debt-to-income ratio, housing
/// payment included, does not exceed [`MAX_DTI_PERCENT`].
pub fn check_pre_approval(
    input: &PreApprovalInput,
) -> MortgageResult<ComputationOutput<PreApprovalOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.annual_income <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "annual_income",
            "Annual income must be positive",
        ));
    }
    if input.loan_amount <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "loan_amount",
            "Loan amount must be positive",
        ));
    }
    if input.monthly_debts < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "monthly_debts",
            "Monthly debts cannot be negative",
        ));
    }

    let (housing_payment, payment_estimated) = match input.monthly_payment {
        Some(p) if p < Decimal::ZERO => {
            return Err(MortgageError::invalid(
                "monthly_payment",
                "Monthly payment cannot be negative",
            ));
        }
        Some(p) => (p, false),
        None => {
            warnings.push(
                "Monthly payment not supplied; estimated at 0.5% of the loan amount".into(),
            );
            (input.loan_amount * ESTIMATED_PAYMENT_FACTOR, true)
        }
    };

    let monthly_income = input.annual_income / dec!(12);
    let dti_ratio = debt_to_income(monthly_income, input.monthly_debts, housing_payment)?;
    let eligible = dti_ratio <= MAX_DTI_PERCENT;

    let output = PreApprovalOutput {
        monthly_income,
        housing_payment,
        payment_estimated,
        dti_ratio,
        max_dti: MAX_DTI_PERCENT,
        eligible,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt-to-Income Pre-Approval Screen",
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

    #[test]
    fn test_ltv() {
        assert_eq!(loan_to_value(dec!(320_000), dec!(400_000)).unwrap(), dec!(80));
        assert!(loan_to_value(dec!(1), Decimal::ZERO).is_err());
    }

    #[test]
    fn test_dti() {
        let dti = debt_to_income(dec!(10_000), dec!(500), dec!(2000)).unwrap();
        assert_eq!(dti, dec!(25));
        assert!(debt_to_income(Decimal::ZERO, dec!(1), dec!(1)).is_err());
    }

    #[test]
    fn test_eligible_with_priced_payment() {
        let out = check_pre_approval(&PreApprovalInput {
            annual_income: dec!(120_000),
            loan_amount: dec!(360_000),
            monthly_debts: dec!(500),
            monthly_payment: Some(dec!(2275)),
        })
        .unwrap();
        // (500 + 2275) / 10,000 = 27.75%
        assert_eq!(out.result.dti_ratio, dec!(27.75));
        assert!(out.result.eligible);
        assert!(!out.result.payment_estimated);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_estimated_payment() {
        let out = check_pre_approval(&PreApprovalInput {
            annual_income: dec!(60_000),
            loan_amount: dec!(400_000),
            monthly_debts: dec!(800),
            monthly_payment: None,
        })
        .unwrap();
        // Payment 2,000; (800 + 2000) / 5,000 = 56%
        assert_eq!(out.result.housing_payment, dec!(2000));
        assert_eq!(out.result.dti_ratio, dec!(56));
        assert!(!out.result.eligible);
        assert!(out.result.payment_estimated);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_boundary_is_eligible() {
        let out = check_pre_approval(&PreApprovalInput {
            annual_income: dec!(120_000),
            loan_amount: dec!(300_000),
            monthly_debts: dec!(300),
            monthly_payment: Some(dec!(4000)),
        })
        .unwrap();
        assert_eq!(out.result.dti_ratio, dec!(43));
        assert!(out.result.eligible);
    }

    #[test]
    fn test_invalid_income() {
        let input = PreApprovalInput {
            annual_income: Decimal::ZERO,
            loan_amount: dec!(1),
            monthly_debts: Decimal::ZERO,
            monthly_payment: None,
        };
        assert!(check_pre_approval(&input).is_err());
    }
}
