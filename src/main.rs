use chrono::NaiveDate;
use log::{error, info};
use mortgage::{summary, Loan, MortgageResult, ScheduleEngine, Summary};
use simple_logger::SimpleLogger;

fn show_amortization(engine: &mut ScheduleEngine) -> MortgageResult<Summary> {
    let events = engine.schedule()?;
    for event in &events {
        println!("{}", event);
    }
    let totals = summary(&events);
    println!("{}", totals);
    Ok(totals)
}

fn run() -> MortgageResult<()> {
    let start = NaiveDate::from_ymd_opt(2016, 3, 26).unwrap_or_default();
    let loan = Loan::new(start, 1042946., 12., 60)?;
    info!("{}", loan);

    let mut engine = ScheduleEngine::new(loan);
    let baseline = show_amortization(&mut engine)?;

    let extra_date = NaiveDate::from_ymd_opt(2016, 7, 1).unwrap_or_default();
    let mut engine = ScheduleEngine::new(loan);
    engine.add_extra_payment(extra_date, 100000.)?;
    info!("with an extra payment of 100000.00 on {}", extra_date);
    let with_extra = show_amortization(&mut engine)?;

    info!(
        "extra payment saves {:.2} of interest",
        baseline.total_interest - with_extra.total_interest
    );
    Ok(())
}

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()
        .unwrap();

    if let Err(e) = run() {
        error!("{}", e);
        std::process::exit(1);
    }
}

// verifies that types can implement the gated traits below
#[cfg(test)]
fn is_normal<T: Sized + Send + Sync + Unpin>() {}

#[test]
fn normal_types() {
    is_normal::<mortgage::ScheduleEvent>();
    is_normal::<ScheduleEngine>();
    is_normal::<Summary>();
}
