//! Actual/actual interest accrual, annuity payment sizing and currency rounding.

use chrono::{Datelike, NaiveDate};

use crate::calendar::days_in_year;
use crate::error::{MortgageError, MortgageResult};

/// Currency amounts are carried to cents.
pub const CURRENCY_DECIMALS: f64 = 2.;

pub fn round(amt: f64, dec: f64) -> f64 {
    let rounded = (amt * 10_f64.powf(dec)).round() / 10_f64.powf(dec);
    // avoid printing -0.00
    if rounded == 0. {
        0.
    } else {
        rounded
    }
}

pub fn round_currency(amt: f64) -> f64 {
    round(amt, CURRENCY_DECIMALS)
}

/// Fraction of a year covered by the period `(from_date, to_date]`.
///
/// Within one calendar year this is `days / days_in_year`. A period crossing
/// a year end is split: `(from_date, Dec 31]` is measured against the first
/// year's length and `[Jan 1, to_date]` against the last year's length.
pub fn year_fraction(from_date: NaiveDate, to_date: NaiveDate) -> f64 {
    if to_date <= from_date {
        return 0.;
    }

    let from_year = from_date.year();
    let to_year = to_date.year();
    if from_year == to_year {
        let days = to_date.signed_duration_since(from_date).num_days();
        return days as f64 / days_in_year(from_year) as f64;
    }

    let from_year_days = days_in_year(from_year);
    let head = (from_year_days - from_date.ordinal() as i64) as f64 / from_year_days as f64;
    let tail = to_date.ordinal() as f64 / days_in_year(to_year) as f64;
    let whole_years = (to_year - from_year - 1) as f64;

    head + whole_years + tail
}

/// Interest accrued on `balance` over `(from_date, to_date]`, unrounded.
///
/// `annual_rate` is a percentage (8.0 means 8%).
pub fn interest_charge(
    from_date: NaiveDate,
    to_date: NaiveDate,
    balance: f64,
    annual_rate: f64,
) -> f64 {
    balance * (annual_rate / 100.) * year_fraction(from_date, to_date)
}

/// Level monthly payment that amortizes `balance` over `periods_left` months.
pub fn monthly_payment(balance: f64, annual_rate: f64, periods_left: i64) -> MortgageResult<f64> {
    if periods_left <= 0 {
        return Err(MortgageError::NoPeriodsLeft { periods_left });
    }

    let month_rate = annual_rate / 100. / 12.;
    if month_rate == 0. {
        return Ok(balance / periods_left as f64);
    }

    Ok(balance * month_rate / (1. - (1. + month_rate).powf(-(periods_left as f64))))
}

#[cfg(test)]
mod tests {
    use super::{interest_charge, monthly_payment, round, round_currency, year_fraction};
    use crate::error::MortgageError;
    use chrono::NaiveDate;
    use test_log::test;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_round() {
        assert_eq!(round_currency(679.4520547945206), 679.45);
        assert_eq!(round_currency(23199.757735177554), 23199.76);
        assert_eq!(round_currency(0.125), 0.13);
        assert_eq!(round_currency(-0.001), 0.);
        assert!(round_currency(-0.001).is_sign_positive());
        assert_eq!(round(1799.86911, 4.), 1799.8691);
    }

    #[test]
    fn test_year_fraction_within_year() {
        assert_eq!(year_fraction(ymd(2023, 3, 1), ymd(2023, 4, 1)), 31. / 365.);
        assert_eq!(year_fraction(ymd(2024, 2, 1), ymd(2024, 3, 1)), 29. / 366.);
        assert_eq!(year_fraction(ymd(2023, 4, 1), ymd(2023, 4, 1)), 0.);
        assert_eq!(year_fraction(ymd(2023, 4, 1), ymd(2023, 3, 1)), 0.);
    }

    #[test]
    fn test_year_fraction_across_year_end() {
        // Dec 20 -> Dec 31 counts 11 days, Jan 1 -> Jan 10 counts 10 days
        assert_eq!(
            year_fraction(ymd(2023, 12, 20), ymd(2024, 1, 10)),
            11. / 365. + 10. / 366.
        );
        assert_eq!(
            year_fraction(ymd(2024, 12, 20), ymd(2025, 1, 10)),
            11. / 366. + 10. / 365.
        );
        assert_eq!(
            year_fraction(ymd(2024, 12, 31), ymd(2025, 1, 1)),
            1. / 365.
        );
        // spanning more than one year end adds the whole years in between
        let long = year_fraction(ymd(2022, 12, 20), ymd(2024, 1, 10));
        assert!((long - (11. / 365. + 1. + 10. / 366.)).abs() < 1e-12);
    }

    #[test]
    fn test_interest_charge_single_year() {
        let charge = interest_charge(ymd(2023, 3, 1), ymd(2023, 4, 1), 100000., 8.);
        assert!((charge - 100000. * 8. / 100. * 31. / 365.).abs() < 1e-9);
        assert_eq!(round_currency(charge), 679.45);
    }

    #[test]
    fn test_interest_charge_across_year_end() {
        let charge = interest_charge(ymd(2023, 12, 20), ymd(2024, 1, 10), 100000., 12.);
        assert!((charge - 100000. * 0.12 * (11. / 365. + 10. / 366.)).abs() < 1e-9);
        assert_eq!(round_currency(charge), 689.51);

        let charge = interest_charge(ymd(2024, 12, 20), ymd(2025, 1, 10), 100000., 12.);
        assert_eq!(round_currency(charge), 689.42);
    }

    #[test]
    fn test_interest_charge_zero_balance() {
        assert_eq!(interest_charge(ymd(2023, 3, 1), ymd(2023, 4, 1), 0., 8.), 0.);
    }

    #[test]
    fn test_monthly_payment() {
        assert_eq!(round_currency(monthly_payment(200000., 7., 180).unwrap()), 1797.66);
        assert_eq!(round_currency(monthly_payment(1042946., 12., 60).unwrap()), 23199.76);

        // last period pays the balance plus one month of interest
        assert_eq!(round_currency(monthly_payment(1000., 12., 1).unwrap()), 1010.);

        assert_eq!(monthly_payment(1200., 0., 12).unwrap(), 100.);
    }

    #[test]
    fn test_monthly_payment_no_periods() {
        assert_eq!(
            monthly_payment(1000., 12., 0),
            Err(MortgageError::NoPeriodsLeft { periods_left: 0 })
        );
        assert!(monthly_payment(1000., 12., -3).is_err());
    }
}
