/// loan book - the admin and customer tables computed from one calculator
use chrono::{TimeZone, Utc};
use loan_timeline_rs::{Loan, LoanBook, LoanTimelineCalculator, Money, SafeTimeProvider, TimeSource, Viewer};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap()
    ));
    let calculator = LoanTimelineCalculator::default();

    let mut book = LoanBook::new();
    for (customer, name, day, amount) in [
        ("c-1", "Ana Macuacua", 1, 5_000),
        ("c-2", "Bento Sitoe", 12, 12_000),
        ("c-1", "Ana Macuacua", 28, 3_000),
    ] {
        book.insert(
            Loan::builder()
                .amount(Money::from_major(amount))
                .customer_id(customer)
                .customer_name(name)
                .created_at(Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap())
                .build_with_time(&time)?,
        );
    }

    println!("=== admin view ===");
    for row in book.timelines(&Viewer::Admin, &calculator, &time.now())? {
        println!("{}  {:>3} days  {:?}  fine {}MT", row.loan_id, row.days_remaining, row.urgency, row.fine_display_amount());
    }

    println!("\n=== customer c-1 ===");
    let viewer = Viewer::Customer { customer_id: "c-1".to_string() };
    for loan in book.search(&viewer, "ana") {
        println!("{}  created {}  balance {}MT", loan.id(), loan.created_at().format("%d/%m/%y"), loan.balance_due());
    }

    Ok(())
}
