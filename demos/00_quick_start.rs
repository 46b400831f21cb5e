/// quick start - days left and fine for a single loan
use chrono::{TimeZone, Utc};
use loan_timeline_rs::{days_remaining, due_date, fine_amount, overdue_fine_days, Money, DEFAULT_FINE_RATE_PERCENT, FINE_WINDOW_DAYS};

fn main() {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let now = Utc.with_ymd_and_hms(2024, 2, 5, 0, 0, 0).unwrap();
    let balance = Money::from_major(5_000);

    let left = days_remaining(&created, 30, &now).unwrap_or_default();
    let fine_from = due_date(&created, FINE_WINDOW_DAYS).unwrap();
    let overdue = overdue_fine_days(&fine_from, &now);
    let fine = fine_amount(overdue, balance, DEFAULT_FINE_RATE_PERCENT);

    println!("days remaining: {}", left);
    if overdue > 0 {
        println!("fine: {} dia/s / {}MT", overdue, fine.round_dp(2));
    } else {
        println!("no fine");
    }
}
