//! Calendar clock used to stamp effective dates.
//!
//! Domain code asks a [`Clock`] for "today" instead of reading the system time
//! directly, so that tests can pin or break the date source.

use chrono::{Local, NaiveDate};

use crate::error::DomainResult;

/// Source of the current calendar date (no time-of-day component).
pub trait Clock: Send + Sync {
    fn today(&self) -> DomainResult<NaiveDate>;
}

impl<C> Clock for std::sync::Arc<C>
where
    C: Clock + ?Sized,
{
    fn today(&self) -> DomainResult<NaiveDate> {
        (**self).today()
    }
}

/// Local wall-clock date of the running process.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> DomainResult<NaiveDate> {
        Ok(Local::now().date_naive())
    }
}

/// Clock pinned to a single date.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> DomainResult<NaiveDate> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fixed_clock_returns_its_date() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(FixedClock(date).today().unwrap(), date);
    }

    #[test]
    fn system_clock_matches_local_date() {
        let before = Local::now().date_naive();
        let today = SystemClock.today().unwrap();
        let after = Local::now().date_naive();
        assert!(before <= today && today <= after);
    }

    #[test]
    fn shared_clock_delegates() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock(date));
        assert_eq!(clock.today().unwrap(), date);
    }
}
