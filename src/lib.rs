pub mod calendar;
pub mod error;
pub mod interest;
pub mod loan;
pub mod schedule;

pub use calendar::{add_months, HolidayCalendar};
pub use error::{MortgageError, MortgageResult};
pub use interest::{interest_charge, monthly_payment, round_currency};
pub use loan::{ExtraPayment, Loan, PrepaymentKind, ScheduleEvent};
pub use schedule::{summary, PaymentState, Schedule, ScheduleEngine, Summary, PAYOFF_FLOOR};
