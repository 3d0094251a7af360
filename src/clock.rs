use chrono::{Duration, Local, NaiveDate};
use std::sync::{Arc, Mutex};

/// Source of the current local calendar date.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to a settable date. Clones share the same date, so a test
/// can keep a handle and move time while a store owns another.
#[derive(Debug, Clone)]
pub struct FixedClock {
    date: Arc<Mutex<NaiveDate>>,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Arc::new(Mutex::new(date)),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        *self.lock() = date;
    }

    pub fn advance_days(&self, days: i64) {
        let mut date = self.lock();
        *date += Duration::days(days);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDate> {
        // a poisoned date is still a valid date
        self.date.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        *self.lock()
    }
}
