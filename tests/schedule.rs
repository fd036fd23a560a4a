use amortization::{
    add_months, compute_amortization, parse_calendar_date, round_currency, AmortizationOutcome,
    AmortizationSchedule, LoanError, LoanParameters,
};
use chrono::{Days, NaiveDate};
use pretty_assertions::assert_eq;
use test_log::test;

fn date(text: &str) -> NaiveDate {
    parse_calendar_date(text).unwrap()
}

fn params(principal: f64, rate: f64, years: f64, agreement: &str, calc: &str) -> LoanParameters {
    LoanParameters::new(principal, rate, years, date(agreement), date(calc)).unwrap()
}

fn loans() -> Vec<LoanParameters> {
    vec![
        params(10000., 6., 1., "2024-01-01", "2024-01-01"),
        params(200000., 7., 15., "2024-03-01", "2024-03-01"),
        params(350000., 3.25, 30., "2019-08-31", "2030-01-15"),
        params(1234.56, 19.99, 2.5, "2023-01-31", "2023-02-28"),
        params(5000., 0.01, 0.25, "2024-02-29", "2024-02-29"),
        params(12000., 0., 1., "2024-01-15", "2024-01-15"),
    ]
}

#[test]
fn final_balance_is_paid_off() {
    for loan in loans() {
        let schedule = AmortizationSchedule::new(&loan).unwrap();
        let final_balance = schedule.final_period().end_balance;
        assert!(
            final_balance.abs() <= 1e-6 * loan.principal,
            "{:?} leaves {}",
            loan,
            final_balance
        );
    }
}

#[test]
fn periods_are_contiguous_and_monthly() {
    for loan in loans() {
        let schedule = AmortizationSchedule::new(&loan).unwrap();
        let periods = schedule.periods();

        assert_eq!(periods.len() as u32, loan.number_of_periods());
        assert_eq!(periods[0].period_start, loan.agreement_date);
        assert_eq!(periods[0].start_balance, loan.principal);

        for (i, period) in periods.iter().enumerate() {
            let index = i as u32 + 1;
            assert_eq!(period.index, index);
            assert_eq!(period.period_start, add_months(loan.agreement_date, index - 1).unwrap());
            assert_eq!(period.period_end, add_months(loan.agreement_date, index).unwrap());
        }
        for pair in periods.windows(2) {
            assert_eq!(pair[0].period_end, pair[1].period_start);
        }
    }
}

#[test]
fn payment_is_constant() {
    for loan in loans() {
        let schedule = AmortizationSchedule::new(&loan).unwrap();
        let payment = schedule.monthly_payment();
        for period in schedule.periods() {
            let paid = period.interest_payment + period.principal_payment;
            assert!((paid - payment).abs() <= 1e-9 * payment, "{}", period);
        }
    }
}

#[test]
fn zero_rate_has_no_interest() {
    let loan = params(12000., 0., 1., "2024-01-15", "2024-01-15");
    let schedule = AmortizationSchedule::new(&loan).unwrap();

    assert_eq!(schedule.monthly_payment(), 12000. / 12.);
    assert!(schedule.periods().iter().all(|p| p.interest_payment == 0.));
    assert_eq!(
        compute_amortization(&loan).unwrap(),
        AmortizationOutcome::RemainingInterestSummary {
            total_remaining_interest: 0.,
            monthly_payment: 1000.,
        }
    );
}

#[test]
fn remaining_interest_never_increases() {
    let loan = params(200000., 7., 15., "2024-03-01", "2024-03-01");
    let schedule = AmortizationSchedule::new(&loan).unwrap();
    let end = schedule.final_period().period_end;

    let mut previous = f64::INFINITY;
    let mut day = date("2024-02-01");
    while day <= end {
        let remaining = match schedule.outcome_on(day).unwrap() {
            AmortizationOutcome::RemainingInterestSummary {
                total_remaining_interest,
                ..
            } => total_remaining_interest,
            AmortizationOutcome::NoPaymentsRemaining { .. } => 0.,
        };
        assert!(remaining <= previous, "{} went from {} to {}", day, previous, remaining);
        previous = remaining;
        day = day.checked_add_days(Days::new(7)).unwrap();
    }

    assert!(matches!(
        schedule.outcome_on(end).unwrap(),
        AmortizationOutcome::NoPaymentsRemaining { .. }
    ));
}

#[test]
fn terminal_boundary_reports_last_due_date() {
    for loan in loans() {
        let schedule = AmortizationSchedule::new(&loan).unwrap();
        let end = schedule.final_period().period_end;
        let expected = AmortizationOutcome::NoPaymentsRemaining {
            last_payment_date: end.pred_opt().unwrap(),
        };

        assert_eq!(schedule.outcome_on(end).unwrap(), expected);
        assert_eq!(
            schedule
                .outcome_on(end.checked_add_days(Days::new(400)).unwrap())
                .unwrap(),
            expected
        );
        assert!(matches!(
            schedule.outcome_on(end.pred_opt().unwrap()).unwrap(),
            AmortizationOutcome::RemainingInterestSummary { .. }
        ));
    }
}

#[test]
fn one_year_at_six_percent() {
    let loan = params(10000., 6., 1., "2024-01-01", "2024-01-01");
    let schedule = AmortizationSchedule::new(&loan).unwrap();

    assert_eq!(schedule.number_of_periods(), 12);
    assert_eq!(schedule.monthly_rate(), 0.005);

    let total_interest: f64 = schedule.periods().iter().map(|p| p.interest_payment).sum();
    assert_eq!(
        compute_amortization(&loan).unwrap(),
        AmortizationOutcome::RemainingInterestSummary {
            total_remaining_interest: round_currency(total_interest),
            monthly_payment: 860.66,
        }
    );

    let later = params(10000., 6., 1., "2024-01-01", "2025-06-01");
    assert_eq!(
        compute_amortization(&later).unwrap(),
        AmortizationOutcome::NoPaymentsRemaining {
            last_payment_date: date("2024-12-31")
        }
    );
}

#[test]
fn fifteen_year_mortgage_payment() {
    let loan = params(200000., 7., 15., "2024-03-01", "2024-03-01");
    let schedule = AmortizationSchedule::new(&loan).unwrap();

    assert_eq!(schedule.number_of_periods(), 180);
    assert_eq!(round_currency(schedule.monthly_payment()), 1797.66);
    assert_eq!(schedule.final_period().due_date(), date("2039-02-28"));
}

#[test]
fn invalid_inputs_are_rejected() {
    let day = date("2024-01-01");
    assert!(matches!(
        LoanParameters::new(-1., 5., 1., day, day),
        Err(LoanError::InvalidInput {
            field: "principal",
            ..
        })
    ));
    assert!(matches!(
        parse_calendar_date("2024-02-30"),
        Err(LoanError::InvalidDate { .. })
    ));
}

#[test]
fn unrepresentable_loans_fail_instead_of_reporting_nan() {
    let day = date("2024-01-01");
    for (principal, rate, years) in [(1000., 100., 1000.), (1000., 100., 100.), (1e308, 6., 1.)] {
        let loan = LoanParameters {
            principal,
            annual_rate_percent: rate,
            duration_years: years,
            agreement_date: day,
            calculation_date: day,
        };
        match compute_amortization(&loan) {
            Err(LoanError::NumericOverflow { .. }) => {}
            other => panic!("{:?} gave {:?}", loan, other),
        }
    }
}
