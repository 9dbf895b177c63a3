//! Refinance analysis: current loan versus a replacement loan, closing-cost
//! break-even and a go / no-go recommendation.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{summarize, LoanInputs, Schedule};
use crate::error::MortgageError;
use crate::types::*;
use crate::MortgageResult;

/// Longest break-even, in months, at which refinancing is still worthwhile.
pub const WORTHWHILE_BREAK_EVEN_MONTHS: u32 = 60;

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceInput {
    pub current_balance: Money,
    pub current_rate_percent: Percent,
    pub remaining_years: u32,
    pub new_rate_percent: Percent,
    pub new_term_years: u32,
    pub closing_costs: Money,
    /// Equity withdrawn on top of the payoff, added to the new balance.
    #[serde(default)]
    pub cash_out: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub balance: Money,
    pub monthly_payment: Money,
    pub rate_percent: Percent,
    pub term_years: u32,
    pub total_interest: Money,
    pub total_cost: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceSavings {
    /// Positive when the new payment is lower.
    pub monthly_payment_savings: Money,
    pub total_interest_savings: Money,
    /// Interest savings net of closing costs.
    pub lifetime_savings: Money,
    /// Lifetime savings as a percentage of the current loan's total cost.
    pub percentage_savings: Percent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEven {
    pub closing_costs: Money,
    /// Months of payment savings needed to recover closing costs; `None`
    /// when the new payment is not lower.
    pub months: Option<u32>,
    pub worth_refinancing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Refinance,
    Marginal,
    DoNotRefinance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceOutput {
    pub current_loan: LoanSummary,
    pub new_loan: LoanSummary,
    pub savings: RefinanceSavings,
    pub break_even: BreakEven,
    pub recommendation: Recommendation,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze_refinance(
    input: &RefinanceInput,
) -> MortgageResult<ComputationOutput<RefinanceOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.closing_costs < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "closing_costs",
            "Closing costs cannot be negative",
        ));
    }
    if input.cash_out < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "cash_out",
            "Cash out cannot be negative",
        ));
    }

    let current_loan = loan_summary(
        input.current_balance,
        input.current_rate_percent,
        input.remaining_years,
    )?;
    let new_loan = loan_summary(
        input.current_balance + input.cash_out,
        input.new_rate_percent,
        input.new_term_years,
    )?;

    if input.new_term_years > input.remaining_years {
        warnings.push(format!(
            "New term of {} years extends payoff beyond the {} years remaining",
            input.new_term_years, input.remaining_years
        ));
    }
    if input.cash_out > Decimal::ZERO {
        warnings.push("Cash out increases the new balance; savings include its cost".into());
    }

    let savings = compute_savings(&current_loan, &new_loan, input.closing_costs);
    let break_even = compute_break_even(&savings, input.closing_costs);
    let recommendation = recommend(&break_even);

    let output = RefinanceOutput {
        current_loan,
        new_loan,
        savings,
        break_even,
        recommendation,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Refinance Break-Even Analysis",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Payment and lifetime totals for a plain level-pay loan.
pub fn loan_summary(
    balance: Money,
    rate_percent: Percent,
    term_years: u32,
) -> MortgageResult<LoanSummary> {
    let schedule = Schedule::new(&LoanInputs::new(balance, rate_percent, term_years))?;
    let totals = summarize(&schedule);
    Ok(LoanSummary {
        balance,
        monthly_payment: totals.monthly_payment,
        rate_percent,
        term_years,
        total_interest: totals.total_interest,
        total_cost: totals.total_cost,
    })
}

fn compute_savings(
    current: &LoanSummary,
    new: &LoanSummary,
    closing_costs: Money,
) -> RefinanceSavings {
    let total_interest_savings = current.total_interest - new.total_interest;
    let lifetime_savings = total_interest_savings - closing_costs;
    RefinanceSavings {
        monthly_payment_savings: current.monthly_payment - new.monthly_payment,
        total_interest_savings,
        lifetime_savings,
        percentage_savings: lifetime_savings / current.total_cost * dec!(100),
    }
}

fn compute_break_even(savings: &RefinanceSavings, closing_costs: Money) -> BreakEven {
    let months = if savings.monthly_payment_savings > Decimal::ZERO {
        (closing_costs / savings.monthly_payment_savings)
            .ceil()
            .to_u32()
    } else {
        None
    };

    let worth_refinancing = matches!(months, Some(m) if m <= WORTHWHILE_BREAK_EVEN_MONTHS)
        && savings.lifetime_savings > Decimal::ZERO;

    BreakEven {
        closing_costs,
        months,
        worth_refinancing,
    }
}

fn recommend(break_even: &BreakEven) -> Recommendation {
    if break_even.worth_refinancing {
        Recommendation::Refinance
    } else if break_even
        .months
        .map_or(true, |m| m > WORTHWHILE_BREAK_EVEN_MONTHS)
    {
        Recommendation::DoNotRefinance
    } else {
        Recommendation::Marginal
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
