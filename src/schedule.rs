//! The schedule engine: walks the monthly cadence of a [`Loan`], interleaves
//! extra payments and produces one [`ScheduleEvent`] per step.

use chrono::NaiveDate;
use log::{debug, info, trace, warn};
use std::fmt;

use crate::calendar::{add_months, HolidayCalendar};
use crate::error::{MortgageError, MortgageResult};
use crate::interest::{interest_charge, monthly_payment, round_currency};
use crate::loan::{ExtraPayment, Loan, PrepaymentKind, ScheduleEvent};

/// A remaining balance at or below this amount is folded into the current
/// payment instead of being carried to another installment.
pub const PAYOFF_FLOOR: f64 = 300.;

/// Where the engine stands between two steps.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PaymentState {
    /// Level installments. `recalculate` is set until the fixed payment has
    /// been sized for the current plan.
    Regular { recalculate: bool },
    /// The last event was an extra payment.
    ExtraInserted(PrepaymentKind),
    /// The last regular event was the interest-only step after an extra payment.
    CatchUp(PrepaymentKind),
}

impl Default for PaymentState {
    fn default() -> Self {
        PaymentState::Regular { recalculate: true }
    }
}

/// What the next event is.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Step {
    /// Apply this extra payment before the regular due date.
    Extra(ExtraPayment),
    /// Regular due date paying only the accrued interest.
    CatchUp,
    /// Resize the fixed payment, then pay it.
    Recalculate,
    /// Pay the current fixed payment.
    Level,
}

impl PaymentState {
    /// Picks the next step given the extra payment (if any) dated before the
    /// next regular due date, and the state the engine moves to.
    pub fn transition(self, extra_due: Option<ExtraPayment>) -> (Step, PaymentState) {
        if let Some(extra) = extra_due {
            return (Step::Extra(extra), PaymentState::ExtraInserted(extra.kind));
        }
        match self {
            PaymentState::ExtraInserted(kind) => (Step::CatchUp, PaymentState::CatchUp(kind)),
            PaymentState::CatchUp(PrepaymentKind::ReducePayment)
            | PaymentState::Regular { recalculate: true } => (
                Step::Recalculate,
                PaymentState::Regular { recalculate: false },
            ),
            PaymentState::CatchUp(PrepaymentKind::ReduceTerm)
            | PaymentState::Regular { recalculate: false } => {
                (Step::Level, PaymentState::Regular { recalculate: false })
            }
        }
    }
}

/// Amortization schedule generator for a single loan.
///
/// Extra payments are kept sorted by date and consumed through a cursor, so
/// [`ScheduleEngine::reset`] can replay the same schedule.
#[derive(Clone, Debug)]
pub struct ScheduleEngine {
    loan: Loan,
    holidays: HolidayCalendar,
    extra_payments: Vec<ExtraPayment>,
    cursor: usize,
    period: u32,
    date: NaiveDate,
    balance: f64,
    fixed_payment: Option<f64>,
    state: PaymentState,
    started: bool,
    finished: bool,
}

impl ScheduleEngine {
    pub fn new(loan: Loan) -> Self {
        Self {
            loan,
            holidays: HolidayCalendar::new(),
            extra_payments: Vec::new(),
            cursor: 0,
            period: 1,
            date: loan.start_date(),
            balance: loan.principal(),
            fixed_payment: None,
            state: PaymentState::default(),
            started: false,
            finished: false,
        }
    }

    pub fn with_holidays(mut self, holidays: HolidayCalendar) -> Self {
        self.holidays = holidays;
        self
    }

    /// Replaces the holiday set. Weekends are always non-business days.
    pub fn configure_holidays(&mut self, dates: impl IntoIterator<Item = NaiveDate>) {
        self.holidays = HolidayCalendar::from_dates(dates);
    }

    pub fn loan(&self) -> &Loan {
        &self.loan
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    pub fn extra_payments(&self) -> &[ExtraPayment] {
        &self.extra_payments
    }

    /// Extra payments not yet applied by the current traversal.
    pub fn pending_extra_payments(&self) -> &[ExtraPayment] {
        &self.extra_payments[self.cursor..]
    }

    /// Fixed installment currently in force, once one has been sized.
    pub fn fixed_payment(&self) -> Option<f64> {
        self.fixed_payment
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn add_extra_payment(&mut self, date: NaiveDate, amount: f64) -> MortgageResult<()> {
        self.add_prepayment(date, amount, PrepaymentKind::ReducePayment)
    }

    /// Registers an extra payment. It may be added between calls to
    /// [`ScheduleEngine::next_event`] as long as it is not dated before the
    /// last event already produced.
    pub fn add_prepayment(
        &mut self,
        date: NaiveDate,
        amount: f64,
        kind: PrepaymentKind,
    ) -> MortgageResult<()> {
        let invalid = |reason: String| MortgageError::InvalidExtraPayment { date, reason };

        if !amount.is_finite() || amount <= 0. {
            return Err(invalid(format!("{} is not a positive amount", amount)));
        }
        if date < self.loan.start_date() {
            return Err(invalid(format!(
                "loan starts on {}",
                self.loan.start_date()
            )));
        }
        if date >= self.loan.maturity_date() {
            return Err(invalid(format!(
                "loan matures on {}",
                self.loan.maturity_date()
            )));
        }
        if self.started && date < self.date {
            return Err(invalid(format!("schedule has already reached {}", self.date)));
        }

        // equal dates keep registration order
        let idx = self.extra_payments.partition_point(|e| e.date <= date);
        self.extra_payments
            .insert(idx, ExtraPayment::new(date, amount, kind));
        debug!("extra payment of {:.2} on {} ({})", amount, date, kind);
        Ok(())
    }

    /// Rewinds to the loan start. Registered extra payments are kept.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.period = 1;
        self.date = self.loan.start_date();
        self.balance = self.loan.principal();
        self.fixed_payment = None;
        self.state = PaymentState::default();
        self.started = false;
        self.finished = false;
    }

    /// Lazily walks the schedule from the engine's current position.
    pub fn generate_schedule(&mut self) -> Schedule<'_> {
        Schedule { engine: self }
    }

    /// Collects the remaining schedule, stopping at the first error.
    pub fn schedule(&mut self) -> MortgageResult<Vec<ScheduleEvent>> {
        self.generate_schedule().collect()
    }

    /// Produces the next event, or `None` once the loan is repaid or the term
    /// is exhausted. After an error the engine stays finished until reset.
    pub fn next_event(&mut self) -> MortgageResult<Option<ScheduleEvent>> {
        if self.finished {
            return Ok(None);
        }
        let result = self.advance();
        if result.is_err() {
            self.finished = true;
        }
        result
    }

    fn advance(&mut self) -> MortgageResult<Option<ScheduleEvent>> {
        let start_date = self.loan.start_date();

        if !self.started {
            self.started = true;
            return Ok(Some(ScheduleEvent::new(
                start_date,
                self.holidays.skip_holidays(start_date)?,
                0.,
                0.,
                self.balance,
                false,
            )));
        }

        let term = self.loan.term_months();
        if self.period > term {
            self.finish();
            return Ok(None);
        }

        let rate = self.loan.annual_rate();
        let prev_date = self.date;
        let due_date = add_months(start_date, self.period)?;
        let extra_due = self
            .extra_payments
            .get(self.cursor)
            .filter(|extra| extra.date < due_date)
            .copied();

        let (step, next_state) = self.state.transition(extra_due);
        let (date, interest, mut payment) = match step {
            Step::Extra(extra) => {
                self.cursor += 1;
                let interest =
                    round_currency(interest_charge(prev_date, extra.date, self.balance, rate));
                (extra.date, interest, extra.amount)
            }
            Step::CatchUp => {
                let interest =
                    round_currency(interest_charge(prev_date, due_date, self.balance, rate));
                (due_date, interest, interest)
            }
            Step::Recalculate | Step::Level => {
                let interest =
                    round_currency(interest_charge(prev_date, due_date, self.balance, rate));
                let payment = match (step, self.fixed_payment) {
                    (Step::Level, Some(fixed)) => fixed,
                    _ => self.resize_payment()?,
                };
                (due_date, interest, payment)
            }
        };
        let is_extra = matches!(step, Step::Extra(_));
        let settlement_date = self.holidays.skip_holidays(date)?;

        let mut balance = round_currency(self.balance + interest - payment);
        // the last installment always settles whatever is left
        if balance <= PAYOFF_FLOOR || (!is_extra && self.period == term) {
            payment += balance;
            balance = 0.;
        }
        let payment = round_currency(payment);

        trace!(
            "period {}, {} -> {}, interest {:.2}, payment {:.2}, balance {:.2}{}",
            self.period,
            prev_date,
            date,
            interest,
            payment,
            balance,
            if is_extra { ", extra" } else { "" }
        );

        self.date = date;
        self.balance = balance;
        self.state = next_state;
        if !is_extra {
            self.period += 1;
        }
        if balance == 0. {
            info!("loan repaid on {} with a payment of {:.2}", date, payment);
            self.finish();
        }

        Ok(Some(ScheduleEvent::new(
            date,
            settlement_date,
            payment,
            interest,
            balance,
            is_extra,
        )))
    }

    fn resize_payment(&mut self) -> MortgageResult<f64> {
        let periods_left = self.loan.term_months() as i64 - self.period as i64 + 1;
        let payment = round_currency(monthly_payment(
            self.balance,
            self.loan.annual_rate(),
            periods_left,
        )?);
        debug!(
            "fixed payment {:.2} over {} remaining periods from {:.2}",
            payment, periods_left, self.balance
        );
        self.fixed_payment = Some(payment);
        Ok(payment)
    }

    fn finish(&mut self) {
        self.finished = true;
        let pending = self.extra_payments.len() - self.cursor;
        if pending > 0 {
            warn!("{} extra payment(s) left unapplied after {}", pending, self.date);
        }
    }
}

/// Iterator over the remaining events of a [`ScheduleEngine`].
pub struct Schedule<'a> {
    engine: &'a mut ScheduleEngine,
}

impl Iterator for Schedule<'_> {
    type Item = MortgageResult<ScheduleEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.engine.next_event().transpose()
    }
}

impl std::iter::FusedIterator for Schedule<'_> {}

/// Totals over a schedule.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub total_paid: f64,
    pub total_interest: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total paid ${:.2}, total interest ${:.2}",
            self.total_paid, self.total_interest
        )
    }
}

pub fn summary<'a>(schedule: impl IntoIterator<Item = &'a ScheduleEvent>) -> Summary {
    let (paid, interest) = schedule
        .into_iter()
        .fold((0., 0.), |(paid, interest), event| {
            (paid + event.payment, interest + event.interest_charge)
        });
    Summary {
        total_paid: round_currency(paid),
        total_interest: round_currency(interest),
    }
}
