/// Time source for recomputation
///
/// All reads of "today" and "now" go through a `Clock` so recomputation can be
/// pinned to a fixed day in tests.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    /// Local calendar day, time of day truncated
    fn today(&self) -> NaiveDate;

    /// Current instant, used for unlock and mutation timestamps
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given day and instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

impl FixedClock {
    /// Freeze at noon UTC of `today`
    pub fn on(today: NaiveDate) -> Self {
        let now = today.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        Self { today, now }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
