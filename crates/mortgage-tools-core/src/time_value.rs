use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::types::{Money, Percent, Rate};
use crate::MortgageResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Convert an annual percentage (6.5) into a monthly decimal rate (0.0054166…).
pub fn monthly_rate(annual_rate_percent: Percent) -> Rate {
    annual_rate_percent / dec!(100) / MONTHS_PER_YEAR
}

/// Compounding factor (1 + r)^n. `None` when the factor leaves Decimal range.
pub fn growth_factor(rate: Rate, periods: u32) -> Option<Decimal> {
    (Decimal::ONE + rate).checked_powi(i64::from(periods))
}

/// Level payment that retires `principal` over `periods` at `rate` per period.
///
/// `P * r * (1+r)^n / ((1+r)^n - 1)`, or `P / n` when the rate is zero.
/// Fails when the payment or its lifetime total leaves Decimal range.
pub fn level_payment(principal: Money, rate: Rate, periods: u32) -> MortgageResult<Money> {
    if periods == 0 {
        return Err(MortgageError::invalid(
            "periods",
            "Number of payment periods must be > 0",
        ));
    }

    let payment = if rate.is_zero() {
        Some(principal / Decimal::from(periods))
    } else {
        match growth_factor(rate, periods) {
            Some(factor) if factor > Decimal::ONE => factor
                .checked_div(factor - Decimal::ONE)
                .and_then(|ratio| principal.checked_mul(rate)?.checked_mul(ratio)),
            // Factor too large to represent: the payment converges on interest-only.
            _ => principal.checked_mul(rate),
        }
    };

    payment
        .filter(|p| p.checked_mul(Decimal::from(periods)).is_some())
        .ok_or_else(|| {
            MortgageError::invalid(
                "principal",
                "Loan principal is out of range for the rate and term",
            )
        })
}

/// Outstanding balance on a level-pay loan after `paid` of `periods` payments.
pub fn remaining_balance(principal: Money, rate: Rate, periods: u32, paid: u32) -> Money {
    if paid >= periods {
        return Decimal::ZERO;
    }
    if rate.is_zero() {
        return principal * (Decimal::from(periods - paid) / Decimal::from(periods));
    }

    let (Some(total), Some(elapsed)) = (growth_factor(rate, periods), growth_factor(rate, paid))
    else {
        return principal;
    };
    if total <= Decimal::ONE {
        return principal;
    }

    // B_k = P * ((1+r)^n - (1+r)^k) / ((1+r)^n - 1), ratio first so it stays <= P.
    principal * ((total - elapsed) / (total - Decimal::ONE))
}

/// Value after compounding annually at `annual_rate_percent` for `years`.
pub fn compound(value: Money, annual_rate_percent: Percent, years: u32) -> MortgageResult<Money> {
    let rate = annual_rate_percent / dec!(100);
    growth_factor(rate, years)
        .and_then(|factor| value.checked_mul(factor))
        .ok_or_else(|| {
            MortgageError::invalid(
                "annual_rate_percent",
                format!("Compounding {value} for {years} years leaves the representable range"),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate() {
        assert_eq!(monthly_rate(dec!(6)), dec!(0.005));
    }

    #[test]
    fn test_level_payment_reference_loan() {
        let pmt = level_payment(dec!(300_000), dec!(0.005), 360).unwrap();
        assert!((pmt - dec!(1798.65)).abs() < dec!(0.01), "got {pmt}");
    }

    #[test]
    fn test_level_payment_zero_rate() {
        let pmt = level_payment(dec!(120_000), Decimal::ZERO, 120).unwrap();
        assert_eq!(pmt, dec!(1000));
    }

    #[test]
    fn test_level_payment_zero_periods() {
        assert!(level_payment(dec!(1000), dec!(0.01), 0).is_err());
    }

    #[test]
    fn test_remaining_balance_endpoints() {
        let p = dec!(200_000);
        let r = dec!(0.005);
        assert_eq!(remaining_balance(p, r, 360, 0), p);
        assert_eq!(remaining_balance(p, r, 360, 360), Decimal::ZERO);
        let mid = remaining_balance(p, r, 360, 180);
        assert!(mid > Decimal::ZERO && mid < p);
    }

    #[test]
    fn test_remaining_balance_zero_rate_is_linear() {
        let b = remaining_balance(dec!(1200), Decimal::ZERO, 12, 3);
        assert_eq!(b, dec!(900));
    }

    #[test]
    fn test_compound() {
        let v = compound(dec!(1000), dec!(10), 2).unwrap();
        assert_eq!(v, dec!(1210));
    }

    #[test]
    fn test_compound_out_of_range() {
        assert!(compound(dec!(1_000_000_000_000_000_000), dec!(100), 40).is_err());
    }

    #[test]
    fn test_level_payment_huge_principal() {
        // 100% for 50 years: (1 + 1/12)^600 is about 7e20, so P * r * factor overflows
        // unless the ratio is taken first.
        let rate = dec!(100) / dec!(100) / dec!(12);
        let pmt = level_payment(dec!(10_000_000_000), rate, 600).unwrap();
        assert!((pmt - dec!(833_333_333.33)).abs() < dec!(0.01), "got {pmt}");

        // Lifetime total of ~600 payments no longer fits.
        assert!(matches!(
            level_payment(dec!(10_000_000_000_000_000_000_000_000), rate, 600),
            Err(MortgageError::InvalidLoanInput { ref field, .. }) if field == "principal"
        ));
    }
}
