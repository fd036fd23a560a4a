use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoanError {
    #[error("invalid input: {field} ({reason})")]
    InvalidInput { field: &'static str, reason: String },

    #[error("invalid date '{input}': {reason}")]
    InvalidDate { input: String, reason: String },

    #[error("{date} plus {months} months is outside the supported calendar")]
    DateOutOfRange { date: NaiveDate, months: u32 },

    #[error("numeric overflow in {context}")]
    NumericOverflow { context: String },
}

pub type Result<T> = std::result::Result<T, LoanError>;
