pub mod book;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod investment;
pub mod loan;
pub mod snapshot;
pub mod timeline;
pub mod types;
pub mod urgency;

// re-export key types
pub use book::LoanBook;
pub use config::TimelineConfig;
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{EventStore, LoanEvent};
pub use investment::{InvestmentPlan, InvestmentTerms};
pub use loan::{Loan, LoanBuilder};
pub use snapshot::{FineView, TimelineSnapshot};
pub use timeline::{
    calendar_days_elapsed, days_remaining, due_date, fine_amount, overdue_fine_days, parse_timestamp,
    pawn_allowed, FineAssessment, FineConfig, FineEngine, LoanTimelineCalculator, DEFAULT_FINE_RATE_PERCENT,
    DEFAULT_TERM_DAYS, FINE_WINDOW_DAYS, MS_PER_DAY, PAWN_WAIT_DAYS,
};
pub use types::{LoanId, LoanStatus, StatusNotification, Viewer};
pub use urgency::{UrgencyBand, UrgencyThresholds};

// re-export external dependencies that users will need
pub use chrono;
pub use chrono_tz;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
