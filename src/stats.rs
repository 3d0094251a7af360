use crate::models::DerivedStatistics;
use chrono::{Duration, NaiveDate};

const DAYS_PER_MONTH: u64 = 30;
const WEEKS_PER_MONTH: u64 = 4;
/// `highest_day` never drops below a tenth of the total.
const PEAK_SHARE_DIVISOR: u64 = 10;

/// Derives the dashboard statistics from the running total and today's
/// bucket. The divisors are fixed and do not look at the real history.
pub fn derive_statistics(total: u64, today_count: u64) -> DerivedStatistics {
    if total == 0 {
        return DerivedStatistics {
            daily_average: 0,
            weekly_average: 0,
            highest_day: today_count,
        };
    }

    DerivedStatistics {
        daily_average: round_div(total, DAYS_PER_MONTH),
        weekly_average: round_div(total, WEEKS_PER_MONTH),
        highest_day: today_count.max(round_div(total, PEAK_SHARE_DIVISOR)),
    }
}

/// Integer division rounding halves up.
fn round_div(value: u64, divisor: u64) -> u64 {
    value / divisor + u64::from(value % divisor * 2 >= divisor)
}

pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// The `days` dates ending at `today`, oldest first.
pub fn trailing_days(today: NaiveDate, days: usize) -> Vec<NaiveDate> {
    (0..days)
        .rev()
        .map(|offset| today - Duration::days(offset as i64))
        .collect()
}
