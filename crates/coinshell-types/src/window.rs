//! History window for series requests.

use chrono::{Duration, NaiveDate};

use crate::WindowError;

/// Number of days of history to request, always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    days: u32,
}

impl Window {
    /// Creates a new window, validating that it spans at least one day.
    ///
    /// # Errors
    ///
    /// Returns an error if `days` is zero.
    pub const fn new(days: u32) -> Result<Self, WindowError> {
        if days == 0 {
            return Err(WindowError::Empty);
        }
        Ok(Self { days })
    }

    /// Returns the number of days.
    #[must_use]
    pub const fn days(&self) -> u32 {
        self.days
    }

    /// Returns the first day of the window when it ends on `today`.
    #[must_use]
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(i64::from(self.days))
    }

    /// Snaps the window up to the smallest supported value that covers it.
    ///
    /// Falls back to the largest supported value when the window exceeds all of them.
    #[must_use]
    pub fn snap_to(&self, supported: &[u32]) -> u32 {
        supported
            .iter()
            .copied()
            .filter(|&d| d >= self.days)
            .min()
            .or_else(|| supported.iter().copied().max())
            .unwrap_or(self.days)
    }
}

impl Default for Window {
    fn default() -> Self {
        Self { days: 30 }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}d", self.days)
    }
}
