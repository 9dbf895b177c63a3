//! Fixed-rate amortization: level monthly payment, payment-by-payment
//! schedule, and optional extra principal payments that shorten payoff.
//!
//! The schedule is produced lazily by [`Schedule::iter`]; every call starts a
//! fresh walk from payment 1, so a `Schedule` can be iterated any number of
//! times without being rebuilt. All math in `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::MortgageError;
use crate::time_value::{level_payment, monthly_rate};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::MortgageResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest loan term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 50;

/// Residual balance below which the loan is treated as fully repaid.
pub const BALANCE_EPSILON: Decimal = dec!(0.000001);

const PAYMENTS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Extra principal payment policy applied on top of the level payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtraPayment {
    #[default]
    None,
    /// Same extra amount with every payment.
    Monthly { amount: Money },
    /// Lump sum with every 12th payment (12, 24, 36, ...).
    Annual { amount: Money },
    /// Single lump sum with the given 1-based payment.
    OneTime { amount: Money, period: u32 },
}

impl ExtraPayment {
    /// Extra amount requested for a 1-based payment number, before capping.
    pub fn amount_for(&self, payment_number: u32) -> Money {
        match self {
            ExtraPayment::None => Decimal::ZERO,
            ExtraPayment::Monthly { amount } => *amount,
            ExtraPayment::Annual { amount } => {
                if payment_number % PAYMENTS_PER_YEAR == 0 {
                    *amount
                } else {
                    Decimal::ZERO
                }
            }
            ExtraPayment::OneTime { amount, period } => {
                if payment_number == *period {
                    *amount
                } else {
                    Decimal::ZERO
                }
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ExtraPayment::None)
    }

    fn validate(&self) -> MortgageResult<()> {
        let amount = match self {
            ExtraPayment::None => return Ok(()),
            ExtraPayment::Monthly { amount } | ExtraPayment::Annual { amount } => *amount,
            ExtraPayment::OneTime { amount, period } => {
                if *period == 0 {
                    return Err(MortgageError::invalid(
                        "extra_payment.period",
                        "One-time payment period is 1-based and must be >= 1",
                    ));
                }
                *amount
            }
        };
        if amount < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "extra_payment.amount",
                "Extra payment amount cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Terms of a fixed-rate, fully amortizing loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInputs {
    /// Amount borrowed.
    pub principal: Money,
    /// Nominal annual rate as a percentage (6.5 = 6.5%).
    pub annual_rate_percent: Percent,
    /// Term in whole years; payments are monthly.
    pub term_years: u32,
    #[serde(default, skip_serializing_if = "ExtraPayment::is_none")]
    pub extra_payment: ExtraPayment,
}

impl LoanInputs {
    pub fn new(principal: Money, annual_rate_percent: Percent, term_years: u32) -> Self {
        LoanInputs {
            principal,
            annual_rate_percent,
            term_years,
            extra_payment: ExtraPayment::None,
        }
    }

    pub fn with_extra_payment(mut self, extra_payment: ExtraPayment) -> Self {
        self.extra_payment = extra_payment;
        self
    }

    /// Number of scheduled monthly payments.
    pub fn total_periods(&self) -> u32 {
        self.term_years * PAYMENTS_PER_YEAR
    }

    pub fn validate(&self) -> MortgageResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "principal",
                "Loan principal must be positive",
            ));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "annual_rate_percent",
                "Interest rate cannot be negative",
            ));
        }
        if self.annual_rate_percent > dec!(100) {
            return Err(MortgageError::invalid(
                "annual_rate_percent",
                "Interest rate cannot exceed 100%",
            ));
        }
        if self.term_years == 0 {
            return Err(MortgageError::invalid(
                "term_years",
                "Loan term must be at least 1 year",
            ));
        }
        if self.term_years > MAX_TERM_YEARS {
            return Err(MortgageError::invalid(
                "term_years",
                format!("Loan term cannot exceed {MAX_TERM_YEARS} years"),
            ));
        }
        self.extra_payment.validate()
    }
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// One monthly payment in the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    /// 1-based payment number.
    pub payment_number: u32,
    /// Scheduled payment (principal + interest), excluding any extra.
    pub payment_amount: Money,
    /// Principal retired by this payment, extra included.
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub extra_payment: Money,
    pub remaining_balance: Money,
}

/// Totals for a loan, derived from its schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub principal: Money,
    pub monthly_payment: Money,
    /// Number of payments actually made before the balance reached zero.
    pub total_payments: u32,
    pub total_interest: Money,
    pub total_extra_paid: Money,
    /// Everything paid: principal + interest.
    pub total_cost: Money,
    pub payoff_years: Decimal,
}

/// Totals plus every payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationTable {
    pub summary: AmortizationResult,
    pub entries: Vec<PaymentScheduleEntry>,
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// Validated loan terms from which payment entries are generated on demand.
#[derive(Debug, Clone)]
pub struct Schedule {
    principal: Money,
    rate: Rate,
    periods: u32,
    monthly_payment: Money,
    extra_payment: ExtraPayment,
}

impl Schedule {
    pub fn new(inputs: &LoanInputs) -> MortgageResult<Self> {
        inputs.validate()?;

        let rate = monthly_rate(inputs.annual_rate_percent);
        let periods = inputs.total_periods();
        let monthly_payment = level_payment(inputs.principal, rate, periods)?;

        debug!(
            principal = %inputs.principal,
            rate = %rate,
            periods,
            monthly_payment = %monthly_payment,
            "amortization schedule prepared"
        );

        Ok(Schedule {
            principal: inputs.principal,
            rate,
            periods,
            monthly_payment,
            extra_payment: inputs.extra_payment.clone(),
        })
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn monthly_rate(&self) -> Rate {
        self.rate
    }

    pub fn monthly_payment(&self) -> Money {
        self.monthly_payment
    }

    /// Maximum number of payments (term in months).
    pub fn periods(&self) -> u32 {
        self.periods
    }

    /// Walk the schedule from payment 1.
    pub fn iter(&self) -> ScheduleIter<'_> {
        ScheduleIter {
            schedule: self,
            balance: self.principal,
            next_payment: 1,
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = PaymentScheduleEntry;
    type IntoIter = ScheduleIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy walk over a [`Schedule`]. Finite: stops at a zero balance or after
/// the last scheduled payment, whichever comes first.
#[derive(Debug, Clone)]
pub struct ScheduleIter<'a> {
    schedule: &'a Schedule,
    balance: Money,
    next_payment: u32,
}

impl Iterator for ScheduleIter<'_> {
    type Item = PaymentScheduleEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let s = self.schedule;
        if self.balance <= Decimal::ZERO || self.next_payment > s.periods {
            return None;
        }

        let payment_number = self.next_payment;
        let balance = self.balance;
        let interest = balance * s.rate;

        let mut principal = (s.monthly_payment - interest)
            .max(Decimal::ZERO)
            .min(balance);
        if payment_number == s.periods {
            principal = balance;
        }

        let extra = s
            .extra_payment
            .amount_for(payment_number)
            .min(balance - principal);

        // Fold a sub-epsilon residual into this payment so the balance lands on zero.
        if balance - principal - extra <= BALANCE_EPSILON {
            principal = balance - extra;
        }

        self.balance = balance - principal - extra;
        self.next_payment += 1;

        Some(PaymentScheduleEntry {
            payment_number,
            payment_amount: principal + interest,
            principal_portion: principal + extra,
            interest_portion: interest,
            extra_payment: extra,
            remaining_balance: self.balance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.balance <= Decimal::ZERO {
            return (0, Some(0));
        }
        let left = (self.schedule.periods + 1).saturating_sub(self.next_payment) as usize;
        (usize::from(left > 0), Some(left))
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Walk a schedule once and total it up.
pub fn summarize(schedule: &Schedule) -> AmortizationResult {
    let mut total_payments = 0u32;
    let mut total_interest = Decimal::ZERO;
    let mut total_extra_paid = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;

    for entry in schedule {
        total_payments = entry.payment_number;
        total_interest += entry.interest_portion;
        total_extra_paid += entry.extra_payment;
        total_cost += entry.payment_amount + entry.extra_payment;
    }

    AmortizationResult {
        principal: schedule.principal(),
        monthly_payment: schedule.monthly_payment(),
        total_payments,
        total_interest,
        total_extra_paid,
        total_cost,
        payoff_years: (Decimal::from(total_payments) / Decimal::from(PAYMENTS_PER_YEAR))
            .round_dp(2),
    }
}

/// Compute the level payment and lifetime totals for a loan.
pub fn calculate_amortization(
    input: &LoanInputs,
) -> MortgageResult<ComputationOutput<AmortizationResult>> {
    let start = Instant::now();
    let schedule = Schedule::new(input)?;

    let output = summarize(&schedule);
    let warnings = collect_warnings(input, &output);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Amortization",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Compute lifetime totals together with every scheduled payment.
pub fn build_amortization_table(
    input: &LoanInputs,
) -> MortgageResult<ComputationOutput<AmortizationTable>> {
    let start = Instant::now();
    let schedule = Schedule::new(input)?;

    let entries: Vec<PaymentScheduleEntry> = schedule.iter().collect();
    let summary = summarize(&schedule);
    let warnings = collect_warnings(input, &summary);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-Rate Amortization Schedule",
        input,
        warnings,
        elapsed,
        AmortizationTable { summary, entries },
    ))
}

fn collect_warnings(input: &LoanInputs, summary: &AmortizationResult) -> Vec<String> {
    let mut warnings = Vec::new();

    if input.annual_rate_percent.is_zero() {
        warn!("zero interest rate; payment is principal / term");
        warnings.push("Interest rate is 0%; payment is principal divided by term".into());
    }

    match &input.extra_payment {
        ExtraPayment::OneTime { period, .. } if *period > input.total_periods() => {
            warnings.push(format!(
                "One-time extra payment at period {period} falls after the final payment ({}) and is never applied",
                input.total_periods()
            ));
        }
        ExtraPayment::Monthly { amount }
        | ExtraPayment::Annual { amount }
        | ExtraPayment::OneTime { amount, .. }
            if amount.is_zero() =>
        {
            warnings.push("Extra payment amount is zero; schedule is unchanged".into());
        }
        ExtraPayment::OneTime { amount, .. } | ExtraPayment::Annual { amount }
            if *amount >= input.principal =>
        {
            warnings.push("Extra payment exceeds the principal; it is capped at the balance".into());
        }
        _ => {}
    }

    if !input.extra_payment.is_none()
        && summary.total_payments <= PAYMENTS_PER_YEAR
        && input.total_periods() > PAYMENTS_PER_YEAR
    {
        warnings.push(format!(
            "Extra payments retire the loan within the first year ({} of {} payments)",
            summary.total_payments,
            input.total_periods()
        ));
    }

    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn reference_loan() -> LoanInputs {
        LoanInputs::new(dec!(300_000), dec!(6), 30)
    }

    #[test]
    fn test_reference_monthly_payment() {
        let out = calculate_amortization(&reference_loan()).unwrap();
        assert_close(out.result.monthly_payment, dec!(1798.65), TOL, "payment");
        assert_eq!(out.result.total_payments, 360);
    }

    #[test]
    fn test_reference_total_interest() {
        let out = calculate_amortization(&reference_loan()).unwrap();
        assert_close(
            out.result.total_interest,
            dec!(347_514.57),
            dec!(1),
            "total interest",
        );
        assert_close(
            out.result.total_cost,
            out.result.principal + out.result.total_interest,
            dec!(0.0000001),
            "total cost",
        );
    }

    #[test]
    fn test_first_payment_split() {
        let schedule = Schedule::new(&reference_loan()).unwrap();
        let first = schedule.iter().next().unwrap();
        assert_eq!(first.payment_number, 1);
        // 300,000 * 0.005
        assert_eq!(first.interest_portion, dec!(1500));
        assert_close(first.principal_portion, dec!(298.65), TOL, "principal");
    }

    #[test]
    fn test_schedule_ends_at_exact_zero() {
        let schedule = Schedule::new(&reference_loan()).unwrap();
        let last = schedule.iter().last().unwrap();
        assert_eq!(last.payment_number, 360);
        assert_eq!(last.remaining_balance, Decimal::ZERO);
    }

    #[test]
    fn test_principal_sums_to_loan() {
        let schedule = Schedule::new(&reference_loan()).unwrap();
        let total: Decimal = schedule.iter().map(|e| e.principal_portion).sum();
        assert_close(total, dec!(300_000), dec!(0.0000001), "principal sum");
    }

    #[test]
    fn test_iterator_restarts() {
        let schedule = Schedule::new(&reference_loan()).unwrap();
        let first_pass: Vec<_> = schedule.iter().take(3).collect();
        let second_pass: Vec<_> = (&schedule).into_iter().take(3).collect();
        assert_eq!(first_pass, second_pass);
        assert_eq!(second_pass[0].payment_number, 1);
    }

    #[test]
    fn test_zero_rate_payment() {
        let out = calculate_amortization(&LoanInputs::new(dec!(120_000), dec!(0), 10)).unwrap();
        assert_eq!(out.result.monthly_payment, dec!(1000));
        assert_eq!(out.result.total_interest, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_monthly_extra_shortens_payoff() {
        let input = reference_loan().with_extra_payment(ExtraPayment::Monthly { amount: dec!(200) });
        let out = calculate_amortization(&input).unwrap();
        assert!(out.result.total_payments < 360);
        assert!(out.result.total_extra_paid > Decimal::ZERO);
    }

    #[test]
    fn test_annual_extra_lands_on_twelfth_payments() {
        let input = reference_loan().with_extra_payment(ExtraPayment::Annual { amount: dec!(5000) });
        let schedule = Schedule::new(&input).unwrap();
        let entries: Vec<_> = schedule.iter().take(24).collect();
        for e in &entries {
            if e.payment_number % 12 == 0 {
                assert_eq!(e.extra_payment, dec!(5000), "payment {}", e.payment_number);
            } else {
                assert_eq!(e.extra_payment, Decimal::ZERO, "payment {}", e.payment_number);
            }
        }
    }

    #[test]
    fn test_one_time_extra_applies_once() {
        let input = reference_loan().with_extra_payment(ExtraPayment::OneTime {
            amount: dec!(10_000),
            period: 12,
        });
        let schedule = Schedule::new(&input).unwrap();
        let extras: Vec<_> = schedule
            .iter()
            .filter(|e| e.extra_payment > Decimal::ZERO)
            .map(|e| e.payment_number)
            .collect();
        assert_eq!(extras, vec![12]);
    }

    #[test]
    fn test_extra_capped_at_balance() {
        let input = LoanInputs::new(dec!(10_000), dec!(5), 1).with_extra_payment(
            ExtraPayment::OneTime {
                amount: dec!(1_000_000),
                period: 2,
            },
        );
        let out = build_amortization_table(&input).unwrap();
        let table = &out.result;
        assert_eq!(table.summary.total_payments, 2);
        assert_eq!(table.entries[1].remaining_balance, Decimal::ZERO);
        let principal: Decimal = table.entries.iter().map(|e| e.principal_portion).sum();
        assert_close(principal, dec!(10_000), dec!(0.0000001), "principal sum");
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_first_year_payoff_warns() {
        let input = LoanInputs::new(dec!(10_000), dec!(5), 30)
            .with_extra_payment(ExtraPayment::Monthly { amount: dec!(1000) });
        let out = calculate_amortization(&input).unwrap();
        assert!(out.result.total_payments <= 12);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("first year"), "{:?}", out.warnings);

        let table = build_amortization_table(&input).unwrap();
        assert_eq!(table.warnings, out.warnings);

        // Paying off in the second year is ordinary.
        let slower = LoanInputs::new(dec!(10_000), dec!(5), 30)
            .with_extra_payment(ExtraPayment::Monthly { amount: dec!(500) });
        assert!(calculate_amortization(&slower).unwrap().warnings.is_empty());
    }

    #[test]
    fn test_one_time_after_term_warns() {
        let input = LoanInputs::new(dec!(10_000), dec!(5), 1).with_extra_payment(
            ExtraPayment::OneTime {
                amount: dec!(100),
                period: 24,
            },
        );
        let out = calculate_amortization(&input).unwrap();
        assert_eq!(out.result.total_extra_paid, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_validation_non_positive_principal() {
        let input = LoanInputs::new(dec!(0), dec!(6), 30);
        assert!(matches!(
            calculate_amortization(&input),
            Err(MortgageError::InvalidLoanInput { ref field, .. }) if field == "principal"
        ));
    }

    #[test]
    fn test_validation_negative_rate() {
        let input = LoanInputs::new(dec!(1000), dec!(-1), 30);
        assert!(Schedule::new(&input).is_err());
    }

    #[test]
    fn test_validation_rate_above_hundred() {
        let input = LoanInputs::new(dec!(1000), dec!(100.5), 30);
        assert!(Schedule::new(&input).is_err());
    }

    #[test]
    fn test_validation_zero_term() {
        let input = LoanInputs::new(dec!(1000), dec!(6), 0);
        assert!(Schedule::new(&input).is_err());
    }

    #[test]
    fn test_validation_term_too_long() {
        let input = LoanInputs::new(dec!(1000), dec!(6), MAX_TERM_YEARS + 1);
        assert!(Schedule::new(&input).is_err());
    }

    #[test]
    fn test_extreme_principal_at_maximum_rate_and_term() {
        let input = LoanInputs::new(dec!(10_000_000_000), dec!(100), MAX_TERM_YEARS);
        let out = calculate_amortization(&input).unwrap();
        assert_eq!(out.result.total_payments, 600);
        assert_eq!(build_amortization_table(&input).unwrap().result.entries.len(), 600);

        let input = LoanInputs::new(
            dec!(10_000_000_000_000_000_000_000_000),
            dec!(100),
            MAX_TERM_YEARS,
        );
        assert!(matches!(
            calculate_amortization(&input),
            Err(MortgageError::InvalidLoanInput { ref field, .. }) if field == "principal"
        ));
    }

    #[test]
    fn test_validation_negative_extra() {
        let input =
            reference_loan().with_extra_payment(ExtraPayment::Monthly { amount: dec!(-5) });
        assert!(Schedule::new(&input).is_err());
    }

    #[test]
    fn test_validation_zero_one_time_period() {
        let input = reference_loan().with_extra_payment(ExtraPayment::OneTime {
            amount: dec!(5),
            period: 0,
        });
        assert!(Schedule::new(&input).is_err());
    }

    #[test]
    fn test_extra_payment_json_shape() {
        let json = r#"{"principal":"100000","annual_rate_percent":"5","term_years":15,
            "extra_payment":{"type":"one_time","amount":"2500","period":6}}"#;
        let input: LoanInputs = serde_json::from_str(json).unwrap();
        assert_eq!(
            input.extra_payment,
            ExtraPayment::OneTime {
                amount: dec!(2500),
                period: 6
            }
        );
    }

    #[test]
    fn test_missing_extra_payment_defaults_to_none() {
        let json = r#"{"principal":"100000","annual_rate_percent":"5","term_years":15}"#;
        let input: LoanInputs = serde_json::from_str(json).unwrap();
        assert!(input.extra_payment.is_none());
    }

    #[test]
    fn test_payoff_years() {
        let out = calculate_amortization(&LoanInputs::new(dec!(50_000), dec!(4), 15)).unwrap();
        assert_eq!(out.result.payoff_years, dec!(15));
    }
}
