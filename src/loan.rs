use chrono::NaiveDate;
use std::fmt;

use crate::calendar::add_months;
use crate::error::{MortgageError, MortgageResult};

/// What the borrower wants an extra payment to shorten.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrepaymentKind {
    /// Keep the maturity date and lower the monthly payment.
    #[default]
    ReducePayment,
    /// Keep the monthly payment and close the loan earlier.
    ReduceTerm,
}

impl fmt::Display for PrepaymentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepaymentKind::ReducePayment => write!(f, "reduce payment"),
            PrepaymentKind::ReduceTerm => write!(f, "reduce term"),
        }
    }
}

/// An unscheduled principal repayment.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtraPayment {
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: PrepaymentKind,
}

impl ExtraPayment {
    pub fn new(date: NaiveDate, amount: f64, kind: PrepaymentKind) -> Self {
        Self { date, amount, kind }
    }
}

/// One step of the amortization schedule.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleEvent {
    /// Nominal date used for accrual.
    pub date: NaiveDate,
    /// First business day on or after `date`.
    pub settlement_date: NaiveDate,
    pub payment: f64,
    pub interest_charge: f64,
    /// Principal outstanding after this event.
    pub balance: f64,
    pub is_extra: bool,
}

impl ScheduleEvent {
    pub fn new(
        date: NaiveDate,
        settlement_date: NaiveDate,
        payment: f64,
        interest_charge: f64,
        balance: f64,
        is_extra: bool,
    ) -> Self {
        Self {
            date,
            settlement_date,
            payment,
            interest_charge,
            balance,
            is_extra,
        }
    }

    /// Principal retired by this event.
    pub fn principal_paid(&self) -> f64 {
        self.payment - self.interest_charge
    }
}

impl fmt::Display for ScheduleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "date {} (settles {}), payment ${:.2}, interest charge ${:.2}, ending balance ${:.2}{}",
            self.date,
            self.settlement_date,
            self.payment,
            self.interest_charge,
            self.balance,
            if self.is_extra { " [extra]" } else { "" }
        )
    }
}

/// Fixed-rate installment loan. Parameters are validated on construction and
/// cannot change afterwards.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loan {
    start_date: NaiveDate,
    principal: f64,
    annual_rate: f64,
    term_months: u32,
    maturity_date: NaiveDate,
}

impl Loan {
    /// `annual_rate` is a percentage (12.0 means 12%), `term_months` the
    /// number of monthly installments.
    pub fn new(
        start_date: NaiveDate,
        principal: f64,
        annual_rate: f64,
        term_months: u32,
    ) -> MortgageResult<Self> {
        if !principal.is_finite() || principal <= 0. {
            return Err(MortgageError::InvalidLoan {
                field: "principal",
                reason: format!("{} is not a positive amount", principal),
            });
        }
        if !annual_rate.is_finite() || annual_rate <= 0. {
            return Err(MortgageError::InvalidLoan {
                field: "annual_rate",
                reason: format!("{} is not a positive rate", annual_rate),
            });
        }
        if term_months == 0 {
            return Err(MortgageError::InvalidLoan {
                field: "term_months",
                reason: "term must be at least one month".to_string(),
            });
        }

        Ok(Self {
            start_date,
            principal,
            annual_rate,
            term_months,
            maturity_date: add_months(start_date, term_months)?,
        })
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn principal(&self) -> f64 {
        self.principal
    }

    pub fn annual_rate(&self) -> f64 {
        self.annual_rate
    }

    pub fn term_months(&self) -> u32 {
        self.term_months
    }

    /// Nominal date of the last scheduled installment.
    pub fn maturity_date(&self) -> NaiveDate {
        self.maturity_date
    }
}

impl fmt::Display for Loan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "loan of ${:.2} at {}% over {} months, {} to {}",
            self.principal, self.annual_rate, self.term_months, self.start_date, self.maturity_date
        )
    }
}
