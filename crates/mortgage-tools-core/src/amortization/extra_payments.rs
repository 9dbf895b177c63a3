//! Savings from prepaying principal: compares a loan with its extra-payment
//! policy against the same loan paid on schedule.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::schedule::{
    summarize, AmortizationResult, ExtraPayment, LoanInputs, PaymentScheduleEntry, Schedule,
};
use crate::error::MortgageError;
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::MortgageResult;

/// Monthly extra amounts compared side by side in every analysis.
pub const SCENARIO_EXTRAS: [Decimal; 4] = [dec!(50), dec!(100), dec!(200), dec!(500)];

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSavings {
    pub interest_saved: Money,
    /// Payments no longer needed.
    pub payments_saved: u32,
    /// Interest saved as a percentage of the on-schedule interest.
    pub percentage_saved: Decimal,
    /// Reduction in everything paid over the life of the loan.
    pub total_savings: Money,
}

/// Totals for one loan year (payments 12y-11 ..= 12y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyBreakdown {
    pub year: u32,
    pub total_paid: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub extra_paid: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScenario {
    pub monthly_extra: Money,
    pub payments_saved: u32,
    pub interest_saved: Money,
    pub total_savings: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentOutput {
    pub original_loan: AmortizationResult,
    pub with_extra_payment: AmortizationResult,
    pub savings: PaymentSavings,
    pub first_year: Option<YearlyBreakdown>,
    pub fifth_year: Option<YearlyBreakdown>,
    pub scenarios: Vec<PaymentScenario>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Analyse the effect of `input.extra_payment` on interest and payoff time.
pub fn analyze_extra_payments(
    input: &LoanInputs,
) -> MortgageResult<ComputationOutput<ExtraPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.extra_payment.is_none() {
        return Err(MortgageError::invalid(
            "extra_payment",
            "An extra payment policy is required for savings analysis",
        ));
    }

    let base_inputs = input.clone().with_extra_payment(ExtraPayment::None);
    let original_loan = summarize(&Schedule::new(&base_inputs)?);

    let schedule = Schedule::new(input)?;
    let entries: Vec<PaymentScheduleEntry> = schedule.iter().collect();
    let with_extra_payment = summarize(&schedule);

    let savings = compare(&original_loan, &with_extra_payment);
    if savings.payments_saved == 0 {
        warnings.push("Extra payments do not shorten the loan term".into());
    }

    let mut scenarios = Vec::with_capacity(SCENARIO_EXTRAS.len());
    for extra in SCENARIO_EXTRAS {
        let scenario_inputs = input
            .clone()
            .with_extra_payment(ExtraPayment::Monthly { amount: extra });
        let scenario = summarize(&Schedule::new(&scenario_inputs)?);
        let s = compare(&original_loan, &scenario);
        scenarios.push(PaymentScenario {
            monthly_extra: extra,
            payments_saved: s.payments_saved,
            interest_saved: s.interest_saved,
            total_savings: s.total_savings,
        });
    }

    let output = ExtraPaymentOutput {
        first_year: yearly_breakdown(&entries, 1),
        fifth_year: yearly_breakdown(&entries, 5),
        original_loan,
        with_extra_payment,
        savings,
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra Payment Savings Analysis",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Totals for payments falling in loan `year` (1-based). `None` when the loan
/// was already repaid before that year began.
pub fn yearly_breakdown(entries: &[PaymentScheduleEntry], year: u32) -> Option<YearlyBreakdown> {
    if year == 0 {
        return None;
    }
    let first = (year - 1) * 12 + 1;
    let last = year * 12;

    let in_year: Vec<&PaymentScheduleEntry> = entries
        .iter()
        .filter(|e| e.payment_number >= first && e.payment_number <= last)
        .collect();
    let closing = in_year.last()?;

    let mut breakdown = YearlyBreakdown {
        year,
        total_paid: Decimal::ZERO,
        principal_paid: Decimal::ZERO,
        interest_paid: Decimal::ZERO,
        extra_paid: Decimal::ZERO,
        remaining_balance: closing.remaining_balance,
    };
    for e in &in_year {
        breakdown.total_paid += e.payment_amount + e.extra_payment;
        breakdown.principal_paid += e.principal_portion;
        breakdown.interest_paid += e.interest_portion;
        breakdown.extra_paid += e.extra_payment;
    }
    Some(breakdown)
}

fn compare(original: &AmortizationResult, accelerated: &AmortizationResult) -> PaymentSavings {
    let interest_saved = original.total_interest - accelerated.total_interest;
    let percentage_saved = if original.total_interest > Decimal::ZERO {
        interest_saved / original.total_interest * dec!(100)
    } else {
        Decimal::ZERO
    };

    PaymentSavings {
        interest_saved,
        payments_saved: original
            .total_payments
            .saturating_sub(accelerated.total_payments),
        percentage_saved,
        total_savings: original.total_cost - accelerated.total_cost,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
