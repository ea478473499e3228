//! Calendar arithmetic for the payment schedule: month stepping, year lengths
//! and the business-day calendar used for settlement dates.

use chrono::{Datelike, Months, NaiveDate, Weekday};
use log::trace;
use std::collections::HashSet;

use crate::error::{MortgageError, MortgageResult};

/// Advances `base_date` by `months` calendar months.
///
/// The day of month is kept where possible and otherwise clamped to the last
/// day of the target month, so Jan 31 + 1 month is Feb 28 (or Feb 29).
pub fn add_months(base_date: NaiveDate, months: u32) -> MortgageResult<NaiveDate> {
    base_date
        .checked_add_months(Months::new(months))
        .ok_or_else(|| {
            MortgageError::DateOutOfRange(format!(
                "{} + {} months does not return a date",
                base_date, months
            ))
        })
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_year(year: i32) -> i64 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// Non-business days: Saturdays, Sundays and any configured holiday.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HolidayCalendar {
    holidays: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    /// A calendar where only weekends are non-business days.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: dates.into_iter().collect(),
        }
    }

    pub fn add_holiday(&mut self, date: NaiveDate) {
        self.holidays.insert(date);
    }

    pub fn add_holidays(&mut self, dates: impl IntoIterator<Item = NaiveDate>) {
        self.holidays.extend(dates);
    }

    pub fn holiday_count(&self) -> usize {
        self.holidays.len()
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        matches!(date.weekday(), Weekday::Sat | Weekday::Sun) || self.holidays.contains(&date)
    }

    /// Returns the first business day on or after `date`.
    pub fn skip_holidays(&self, date: NaiveDate) -> MortgageResult<NaiveDate> {
        let mut adjusted = date;
        while self.is_holiday(adjusted) {
            adjusted = adjusted.succ_opt().ok_or_else(|| {
                MortgageError::DateOutOfRange(format!("no business day after {}", date))
            })?;
        }
        if adjusted != date {
            trace!("{} is not a business day, settles on {}", date, adjusted);
        }
        Ok(adjusted)
    }
}

#[cfg(test)]
mod tests {
    use super::{add_months, days_in_year, HolidayCalendar};
    use chrono::NaiveDate;
    use test_log::test;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_months() {
        assert_eq!(add_months(ymd(2016, 3, 26), 0).unwrap(), ymd(2016, 3, 26));
        assert_eq!(add_months(ymd(2016, 3, 26), 1).unwrap(), ymd(2016, 4, 26));
        assert_eq!(add_months(ymd(2016, 3, 26), 10).unwrap(), ymd(2017, 1, 26));
        assert_eq!(add_months(ymd(2016, 3, 26), 60).unwrap(), ymd(2021, 3, 26));

        // clamped to the end of the target month
        assert_eq!(add_months(ymd(2024, 1, 31), 1).unwrap(), ymd(2024, 2, 29));
        assert_eq!(add_months(ymd(2023, 1, 31), 1).unwrap(), ymd(2023, 2, 28));
        assert_eq!(add_months(ymd(2023, 8, 31), 1).unwrap(), ymd(2023, 9, 30));
        assert_eq!(add_months(ymd(2023, 12, 31), 2).unwrap(), ymd(2024, 2, 29));

        // stepping from the start date avoids the drift of repeated clamping
        assert_eq!(add_months(ymd(2023, 1, 31), 2).unwrap(), ymd(2023, 3, 31));

        assert!(add_months(NaiveDate::MAX, 1).is_err());
    }

    #[test]
    fn test_add_months_composes() {
        let base = ymd(2016, 3, 26);
        for a in 0..30 {
            for b in 0..30 {
                assert_eq!(
                    add_months(add_months(base, a).unwrap(), b).unwrap(),
                    add_months(base, a + b).unwrap()
                );
            }
        }
    }

    #[test]
    fn test_days_in_year() {
        assert_eq!(days_in_year(2023), 365);
        assert_eq!(days_in_year(2024), 366);
        assert_eq!(days_in_year(1900), 365);
        assert_eq!(days_in_year(2000), 366);
    }

    #[test]
    fn test_weekends_only() {
        let cal = HolidayCalendar::new();

        // 2024-03-15 is a Friday
        assert!(!cal.is_holiday(ymd(2024, 3, 15)));
        assert!(cal.is_holiday(ymd(2024, 3, 16)));
        assert!(cal.is_holiday(ymd(2024, 3, 17)));

        assert_eq!(cal.skip_holidays(ymd(2024, 3, 15)).unwrap(), ymd(2024, 3, 15));
        assert_eq!(cal.skip_holidays(ymd(2024, 3, 16)).unwrap(), ymd(2024, 3, 18));
        assert_eq!(cal.skip_holidays(ymd(2024, 3, 17)).unwrap(), ymd(2024, 3, 18));
    }

    #[test]
    fn test_configured_holidays() {
        let mut cal = HolidayCalendar::from_dates([ymd(2024, 12, 25), ymd(2024, 12, 26)]);
        assert_eq!(cal.holiday_count(), 2);
        assert!(cal.is_holiday(ymd(2024, 12, 25)));
        assert_eq!(cal.skip_holidays(ymd(2024, 12, 25)).unwrap(), ymd(2024, 12, 27));

        // a holiday before a weekend pushes into the following week
        cal.add_holiday(ymd(2024, 12, 27));
        assert_eq!(cal.skip_holidays(ymd(2024, 12, 25)).unwrap(), ymd(2024, 12, 30));

        cal.add_holidays([ymd(2024, 12, 30), ymd(2024, 12, 31)]);
        assert_eq!(cal.skip_holidays(ymd(2024, 12, 25)).unwrap(), ymd(2025, 1, 1));
    }
}
