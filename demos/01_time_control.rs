/// time control - watch a loan move through its urgency bands with controlled time
use chrono::{Duration, TimeZone, Utc};
use loan_timeline_rs::{Loan, LoanStatus, LoanTimelineCalculator, Money, SafeTimeProvider, TimeSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    ));
    let controller = time.test_control().unwrap();
    let calculator = LoanTimelineCalculator::default();

    let mut loan = Loan::builder()
        .amount(Money::from_major(5_000))
        .customer_name("Ana Macuacua")
        .build_with_time(&time)?;

    if let Some(notification) = loan.update_status(LoanStatus::Active, &time) {
        println!("customer notified: {:?}", notification);
    }

    for step in [0, 8, 7, 7, 7, 2, 4] {
        controller.advance(Duration::days(step));
        let row = loan.timeline(&calculator, &time)?;
        println!(
            "{}  {:>3} days  {:<11?}  fine {} days / {}MT",
            time.now().format("%Y-%m-%d"),
            row.days_remaining,
            row.urgency,
            row.fine.overdue_days,
            row.fine_display_amount(),
        );
    }

    loan.set_balance_due(Money::ZERO, &time)?;
    loan.update_status(LoanStatus::Paid, &time);
    println!("\nfinal status: {}", loan.status());

    Ok(())
}
