/// json config - load timeline settings and print a snapshot as json
use chrono::{TimeZone, Utc};
use loan_timeline_rs::{InvestmentPlan, Loan, LoanTimelineCalculator, Money, SafeTimeProvider, TimeSource, TimelineConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let json = TimelineConfig::microcredit().to_json_pretty()?;
    println!("default config:\n{}\n", json);

    let config = TimelineConfig::from_json(&json)?;
    let calculator = LoanTimelineCalculator::new(config)?;

    // no explicit term: the loan takes default_term_days from the config
    let time = SafeTimeProvider::new(TimeSource::System);
    let loan = Loan::builder()
        .amount(Money::from_major(5_000))
        .created_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        .build_with_config(calculator.config(), &time)?;

    let snapshot = calculator.snapshot(&loan, &Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap())?;
    println!("snapshot:\n{}\n", snapshot.to_json_pretty()?);

    for plan in InvestmentPlan::ALL {
        let terms = plan.terms();
        println!("{}: {} months, {}-{}MT, {}", plan, terms.contract_months, terms.minimum, terms.maximum, terms.profitability);
    }

    Ok(())
}
