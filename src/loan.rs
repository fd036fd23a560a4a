use chrono::NaiveDate;
use log::{debug, trace};
use std::fmt;

use crate::dates::add_months;
use crate::error::{LoanError, Result};

/// Largest final balance, relative to the principal, still treated as paid off.
const CLOSURE_TOLERANCE: f64 = 1e-6;

/// Bias added before rounding to cents so values printed as .xx5 after
/// binary representation error still round up.
const ROUNDING_BIAS: f64 = 1e-5;

/// Inputs for one amortization request.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LoanParameters {
    pub principal: f64,
    /// Nominal annual rate in percent, so 5.0 means 5%.
    pub annual_rate_percent: f64,
    /// Term in years. Fractions are kept only as far as whole months.
    pub duration_years: f64,
    pub agreement_date: NaiveDate,
    pub calculation_date: NaiveDate,
}

impl LoanParameters {
    pub fn new(
        principal: f64,
        annual_rate_percent: f64,
        duration_years: f64,
        agreement_date: NaiveDate,
        calculation_date: NaiveDate,
    ) -> Result<Self> {
        let params = Self {
            principal,
            annual_rate_percent,
            duration_years,
            agreement_date,
            calculation_date,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_finite() || self.principal <= 0. {
            return Err(LoanError::InvalidInput {
                field: "principal",
                reason: format!("must be a positive amount, got {}", self.principal),
            });
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0. {
            return Err(LoanError::InvalidInput {
                field: "annual_rate_percent",
                reason: format!("must be zero or more, got {}", self.annual_rate_percent),
            });
        }
        if !self.duration_years.is_finite() || self.number_of_periods() < 1 {
            return Err(LoanError::InvalidInput {
                field: "duration_years",
                reason: format!(
                    "must cover at least one month, got {} years",
                    self.duration_years
                ),
            });
        }
        add_months(self.agreement_date, self.number_of_periods())?;
        fixed_payment(self.principal, self.monthly_rate(), self.number_of_periods())?;
        Ok(())
    }

    /// Whole months in the term. The float to int cast saturates, so negative
    /// or NaN durations come out as zero.
    pub fn number_of_periods(&self) -> u32 {
        (self.duration_years * 12.).trunc() as u32
    }

    /// Monthly rate as a fraction.
    pub fn monthly_rate(&self) -> f64 {
        self.annual_rate_percent / 1200.
    }
}

/// One month of the schedule. `period_end` is exclusive; the payment is due
/// on the day before it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Period {
    pub index: u32,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub start_balance: f64,
    pub interest_payment: f64,
    pub principal_payment: f64,
    pub end_balance: f64,
}

impl Period {
    pub fn due_date(&self) -> NaiveDate {
        // period_end is always later than period_start
        self.period_end.pred_opt().unwrap_or(self.period_start)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "period {}, {} to {}, start balance ${:.2}, interest ${:.2}, principal ${:.2}, end balance ${:.2}",
            self.index,
            self.period_start,
            self.due_date(),
            cents_or_zero(self.start_balance),
            cents_or_zero(self.interest_payment),
            cents_or_zero(self.principal_payment),
            cents_or_zero(self.end_balance)
        )
    }
}

/// Residue below half a cent prints as `0.00` instead of `-0.00`.
fn cents_or_zero(amount: f64) -> f64 {
    if amount.abs() < 0.005 {
        0.
    } else {
        amount
    }
}

/// What the caller gets back for a calculation date.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum AmortizationOutcome {
    NoPaymentsRemaining {
        last_payment_date: NaiveDate,
    },
    /// Both amounts are rounded to cents with [`round_currency`].
    RemainingInterestSummary {
        total_remaining_interest: f64,
        monthly_payment: f64,
    },
}

impl fmt::Display for AmortizationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmortizationOutcome::NoPaymentsRemaining { last_payment_date } => write!(
                f,
                "On the selected date, there are no more payments due.\n\
                 The last payment is to be made by end of {}.",
                last_payment_date.format("%a %b %d %Y")
            ),
            AmortizationOutcome::RemainingInterestSummary {
                total_remaining_interest,
                monthly_payment,
            } => write!(
                f,
                "The total amount of all future interest payments is {} USD\n\
                 Reference: the fixed monthly payment is {} USD (interest + principal)",
                total_remaining_interest, monthly_payment
            ),
        }
    }
}

/// The full month-by-month table for one set of loan parameters.
#[derive(Clone, PartialEq, Debug)]
pub struct AmortizationSchedule {
    monthly_rate: f64,
    monthly_payment: f64,
    periods: Vec<Period>,
}

impl AmortizationSchedule {
    pub fn new(params: &LoanParameters) -> Result<Self> {
        params.validate()?;

        let number_of_periods = params.number_of_periods();
        let monthly_rate = params.monthly_rate();
        let monthly_payment = fixed_payment(params.principal, monthly_rate, number_of_periods)?;
        debug!(
            "{} periods at monthly rate {}, payment {}",
            number_of_periods, monthly_rate, monthly_payment
        );

        let periods = generate_schedule(
            params.principal,
            monthly_rate,
            monthly_payment,
            number_of_periods,
            params.agreement_date,
        )?;

        // rounding error grows with (1 + r)^n and can leave the loan unpaid
        let residue = periods[periods.len() - 1].end_balance;
        if residue.is_nan() || residue.abs() > CLOSURE_TOLERANCE * params.principal {
            return Err(LoanError::NumericOverflow {
                context: format!(
                    "schedule of {} periods left a final balance of {}",
                    number_of_periods, residue
                ),
            });
        }

        Ok(Self {
            monthly_rate,
            monthly_payment,
            periods,
        })
    }

    pub fn monthly_rate(&self) -> f64 {
        self.monthly_rate
    }

    /// Unrounded payment.
    pub fn monthly_payment(&self) -> f64 {
        self.monthly_payment
    }

    pub fn number_of_periods(&self) -> usize {
        self.periods.len()
    }

    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    pub fn final_period(&self) -> &Period {
        // validated parameters always yield at least one period
        &self.periods[self.periods.len() - 1]
    }

    /// First period not fully elapsed on `date`, if any.
    pub fn period_containing(&self, date: NaiveDate) -> Option<&Period> {
        self.periods.iter().find(|p| p.period_end > date)
    }

    /// Unrounded interest of `period` and every period after it.
    pub fn remaining_interest_from(&self, period: &Period) -> f64 {
        self.periods
            .iter()
            .filter(|p| p.index >= period.index)
            .map(|p| p.interest_payment)
            .sum()
    }

    pub fn outcome_on(&self, calculation_date: NaiveDate) -> Result<AmortizationOutcome> {
        match self.period_containing(calculation_date) {
            Some(target) => {
                trace!("{} falls in period {}", calculation_date, target.index);
                let total_remaining_interest =
                    round_currency(self.remaining_interest_from(target));
                let monthly_payment = round_currency(self.monthly_payment);
                if !total_remaining_interest.is_finite() || !monthly_payment.is_finite() {
                    return Err(LoanError::NumericOverflow {
                        context: format!(
                            "rounding interest {} and payment {} to cents",
                            total_remaining_interest, monthly_payment
                        ),
                    });
                }
                Ok(AmortizationOutcome::RemainingInterestSummary {
                    total_remaining_interest,
                    monthly_payment,
                })
            }
            None => {
                let last_payment_date = self.final_period().due_date();
                trace!(
                    "{} is past the final period, last payment {}",
                    calculation_date,
                    last_payment_date
                );
                Ok(AmortizationOutcome::NoPaymentsRemaining { last_payment_date })
            }
        }
    }

    pub fn show_amortization(&self) {
        for period in &self.periods {
            println!("{}", period);
        }
    }
}

/// Validates `params`, builds the schedule and summarizes it as of the
/// calculation date. Nothing is retained between calls.
pub fn compute_amortization(params: &LoanParameters) -> Result<AmortizationOutcome> {
    let schedule = AmortizationSchedule::new(params)?;
    schedule.outcome_on(params.calculation_date)
}

/// Rounds to two decimals, half up, after adding a small bias. Intended for
/// non-negative amounts.
pub fn round_currency(amount: f64) -> f64 {
    ((amount + ROUNDING_BIAS) * 100. + 0.5).floor() / 100.
}

/// Constant payment that repays `principal` over `number_of_periods` months.
///
/// Uses `principal * (1 + r)^n / sum((1 + r)^i for i in 0..n)`, which is the
/// usual annuity formula with the geometric series summed term by term.
pub fn fixed_payment(principal: f64, monthly_rate: f64, number_of_periods: u32) -> Result<f64> {
    if number_of_periods == 0 {
        return Err(LoanError::InvalidInput {
            field: "number_of_periods",
            reason: "a schedule needs at least one period".to_string(),
        });
    }
    if monthly_rate == 0. {
        return Ok(principal / number_of_periods as f64);
    }

    let exponent = i32::try_from(number_of_periods).map_err(|_| LoanError::NumericOverflow {
        context: format!("compounding over {} periods", number_of_periods),
    })?;
    let factor = 1. + monthly_rate;
    let growth = factor.powi(exponent);
    if !growth.is_finite() {
        return Err(LoanError::NumericOverflow {
            context: format!(
                "compounding {} per month over {} periods",
                monthly_rate, number_of_periods
            ),
        });
    }
    let denominator: f64 = (0..exponent).map(|i| factor.powi(i)).sum();

    let payment = principal * growth / denominator;
    if !payment.is_finite() {
        return Err(LoanError::NumericOverflow {
            context: format!("payment on a principal of {}", principal),
        });
    }
    Ok(payment)
}

/// Builds every period of the term, each offset from `agreement_date`.
pub fn generate_schedule(
    principal: f64,
    monthly_rate: f64,
    monthly_payment: f64,
    number_of_periods: u32,
    agreement_date: NaiveDate,
) -> Result<Vec<Period>> {
    let mut periods = Vec::with_capacity(number_of_periods as usize);
    let mut start_balance = principal;
    let mut period_start = agreement_date;

    for index in 1..=number_of_periods {
        let period_end = add_months(agreement_date, index)?;
        let interest_payment = start_balance * monthly_rate;
        let principal_payment = monthly_payment - interest_payment;
        let end_balance = start_balance - principal_payment;

        trace!(
            "period {}, end {}, interest {}, end bal {}",
            index,
            period_end,
            interest_payment,
            end_balance
        );

        periods.push(Period {
            index,
            period_start,
            period_end,
            start_balance,
            interest_payment,
            principal_payment,
            end_balance,
        });

        start_balance = end_balance;
        period_start = period_end;
    }
    Ok(periods)
}
