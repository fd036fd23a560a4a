use amortization::{parse_calendar_date, AmortizationSchedule, LoanParameters};
use clap::Parser;
use log::{error, info};
use simple_logger::SimpleLogger;
use std::process;

/// Remaining interest on a fixed-rate loan as of a given date
#[derive(Parser, Debug)]
#[command(name = "amortization", version, about)]
struct Cli {
    /// Day the agreement starts (YYYY-MM-DD)
    #[arg(long)]
    agreement_date: String,

    /// Day to report remaining interest for (YYYY-MM-DD)
    #[arg(long)]
    calculation_date: String,

    /// Amount invested or borrowed
    #[arg(long)]
    principal: f64,

    /// Annual interest rate in percent
    #[arg(long)]
    rate: f64,

    /// Duration in years
    #[arg(long)]
    years: f64,

    /// Print the full schedule before the summary
    #[arg(long)]
    schedule: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn run(cli: &Cli) -> amortization::Result<()> {
    let params = LoanParameters::new(
        cli.principal,
        cli.rate,
        cli.years,
        parse_calendar_date(&cli.agreement_date)?,
        parse_calendar_date(&cli.calculation_date)?,
    )?;
    info!("calculating {:?}", params);

    let schedule = AmortizationSchedule::new(&params)?;
    if cli.schedule {
        schedule.show_amortization();
    }
    println!("{}", schedule.outcome_on(params.calculation_date)?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = SimpleLogger::new()
        .with_level(log_level(cli.verbose))
        .env()
        .init()
    {
        eprintln!("logger setup failed: {}", e);
    }

    if let Err(e) = run(&cli) {
        error!("{}", e);
        process::exit(1);
    }
}

// verifies that types can implement the gated traits below
#[allow(dead_code)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<LoanParameters>();
    is_normal::<AmortizationSchedule>();
    is_normal::<amortization::Period>();
    is_normal::<amortization::AmortizationOutcome>();
    is_normal::<amortization::LoanError>();
}

#[test]
fn verbose_flag_raises_level() {
    assert_eq!(log_level(0), log::LevelFilter::Warn);
    assert_eq!(log_level(2), log::LevelFilter::Debug);
    assert_eq!(log_level(9), log::LevelFilter::Trace);
}

#[test]
fn cli_parses_form_fields() {
    let cli = Cli::parse_from([
        "amortization",
        "--agreement-date",
        "2024-01-01",
        "--calculation-date",
        "2024-06-15",
        "--principal",
        "10000",
        "--rate",
        "6",
        "--years",
        "1",
        "-vv",
    ]);
    assert_eq!(cli.agreement_date, "2024-01-01");
    assert_eq!(cli.principal, 10000.);
    assert!(!cli.schedule);
    assert_eq!(cli.verbose, 2);
    assert!(run(&cli).is_ok());
}

#[test]
fn cli_returns_errors_for_main_to_report() {
    let cli = Cli::parse_from([
        "amortization",
        "--agreement-date",
        "2024-01-01",
        "--calculation-date",
        "2024-01-01",
        "--principal",
        "1000",
        "--rate",
        "100",
        "--years",
        "1000",
    ]);
    assert!(matches!(
        run(&cli),
        Err(amortization::LoanError::NumericOverflow { .. })
    ));
}
