//! Fixed-rate amortization schedules and remaining-interest summaries.
//!
//! ```
//! use amortization::{compute_amortization, parse_calendar_date, AmortizationOutcome, LoanParameters};
//!
//! let params = LoanParameters::new(
//!     10000.,
//!     6.,
//!     1.,
//!     parse_calendar_date("2024-01-01").unwrap(),
//!     parse_calendar_date("2025-06-01").unwrap(),
//! )
//! .unwrap();
//!
//! assert_eq!(
//!     compute_amortization(&params).unwrap(),
//!     AmortizationOutcome::NoPaymentsRemaining {
//!         last_payment_date: parse_calendar_date("2024-12-31").unwrap()
//!     }
//! );
//! ```

pub mod dates;
pub mod error;
pub mod loan;

pub use dates::{add_months, parse_calendar_date};
pub use error::{LoanError, Result};
pub use loan::{
    compute_amortization, fixed_payment, generate_schedule, round_currency, AmortizationOutcome,
    AmortizationSchedule, LoanParameters, Period,
};
