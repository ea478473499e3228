use chrono::NaiveDate;
use thiserror::Error;

pub type MortgageResult<T> = Result<T, MortgageError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MortgageError {
    /// Loan parameters that cannot produce a schedule.
    #[error("invalid loan {field}: {reason}")]
    InvalidLoan { field: &'static str, reason: String },

    #[error("invalid extra payment on {date}: {reason}")]
    InvalidExtraPayment { date: NaiveDate, reason: String },

    /// Annuity formula asked to spread a balance over no periods.
    #[error("cannot amortize a balance over {periods_left} periods")]
    NoPeriodsLeft { periods_left: i64 },

    #[error("date out of range: {0}")]
    DateOutOfRange(String),
}
