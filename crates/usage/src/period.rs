//! Billing period: calendar months, 1st-of-month through end-of-month
//! (§4.H).

use chrono::{DateTime, Datelike, TimeZone, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPeriod {
    pub start: DateTime<Utc>,
    /// Exclusive: the first instant of the following month.
    pub end: DateTime<Utc>,
}

impl BillingPeriod {
    #[must_use]
    pub fn for_month(year: i32, month: u32) -> Self {
        let start = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).single().expect("valid calendar month");
        let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
        let end = Utc.with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0).single().expect("valid calendar month");
        Self { start, end }
    }

    #[must_use]
    pub fn containing(instant: DateTime<Utc>) -> Self {
        Self::for_month(instant.year(), instant.month())
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }

    /// Hours between the period start and `min(now, period end)`, clamped
    /// to zero if `now` precedes the period. Usage accrues continuously
    /// across the elapsed portion of the period (§4.H "elapsed hours").
    #[must_use]
    pub fn elapsed_hours(&self, now: DateTime<Utc>) -> f64 {
        let effective_end = now.min(self.end).max(self.start);
        (effective_end - self.start).num_seconds().max(0) as f64 / 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_month_spans_the_full_calendar_month() {
        let period = BillingPeriod::for_month(2026, 2);
        assert_eq!(period.start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(period.end, Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn december_rolls_over_to_next_year() {
        let period = BillingPeriod::for_month(2026, 12);
        assert_eq!(period.end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn elapsed_hours_is_clamped_to_the_period() {
        let period = BillingPeriod::for_month(2026, 7);
        let mid = Utc.with_ymd_and_hms(2026, 7, 11, 12, 0, 0).unwrap();
        assert_eq!(period.elapsed_hours(mid), 10.0 * 24.0 + 12.0);

        let after = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).unwrap();
        let full_month_hours = (period.end - period.start).num_seconds() as f64 / 3600.0;
        assert_eq!(period.elapsed_hours(after), full_month_hours);

        let before = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(period.elapsed_hours(before), 0.0);
    }
}
