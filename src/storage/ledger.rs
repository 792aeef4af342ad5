//! Notification ledger
//!
//! Append-only record of notification-relevant cycles, bucketed by calendar
//! date, hour and outcome. Counts reset implicitly when the hour or date
//! rolls over because both are part of every marker key.

use chrono::NaiveDate;
use std::fmt;
use tracing::{debug, error};

use super::MarkerStore;
use crate::error::{Result, WatchError};

/// Minute slots per hour bucket
pub const MINUTE_SLOTS: u32 = 60;

/// Outcome of a classification cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeType {
    /// Charging detected
    Success,
    /// Charging not detected
    Failure,
}

impl OutcomeType {
    pub fn from_charging(charging: bool) -> Self {
        if charging {
            OutcomeType::Success
        } else {
            OutcomeType::Failure
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeType::Success => "success",
            OutcomeType::Failure => "failure",
        }
    }
}

impl fmt::Display for OutcomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one marker: `yyyy-MM-dd-HH-<outcome>-<minute>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    pub date: NaiveDate,
    pub hour: u32,
    pub outcome: OutcomeType,
    pub minute: u32,
}

impl fmt::Display for MarkerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{}-{}",
            self.date.format("%Y-%m-%d"),
            self.hour,
            self.outcome,
            self.minute
        )
    }
}

/// Owner of all marker I/O
pub struct NotificationLedger {
    store: Box<dyn MarkerStore>,
}

impl NotificationLedger {
    pub fn new(store: Box<dyn MarkerStore>) -> Self {
        Self { store }
    }

    /// Count existing markers across all minute slots of one hour bucket
    pub fn count_markers(&self, date: NaiveDate, hour: u32, outcome: OutcomeType) -> Result<u32> {
        let mut count = 0;
        for minute in 0..MINUTE_SLOTS {
            if self.has_marker(date, hour, outcome, minute)? {
                count += 1;
            }
        }
        debug!("{} {:02}h {} markers: {}", date, hour, outcome, count);
        Ok(count)
    }

    /// Whether the marker for one minute slot exists
    pub fn has_marker(
        &self,
        date: NaiveDate,
        hour: u32,
        outcome: OutcomeType,
        minute: u32,
    ) -> Result<bool> {
        check_slot(hour, minute)?;
        let key = MarkerKey {
            date,
            hour,
            outcome,
            minute,
        }
        .to_string();
        self.store.exists(&key).map_err(|e| {
            error!("Failed to check marker {}: {}", key, e);
            WatchError::ledger(&key, e)
        })
    }

    /// Create the marker for one minute slot; existing markers are left alone
    pub fn record_marker(
        &self,
        date: NaiveDate,
        hour: u32,
        outcome: OutcomeType,
        minute: u32,
    ) -> Result<()> {
        check_slot(hour, minute)?;
        let key = MarkerKey {
            date,
            hour,
            outcome,
            minute,
        }
        .to_string();
        self.store.create(&key).map_err(|e| {
            error!("Failed to record marker {}: {}", key, e);
            WatchError::ledger(&key, e)
        })
    }
}

fn check_slot(hour: u32, minute: u32) -> Result<()> {
    if hour >= 24 || minute >= MINUTE_SLOTS {
        return Err(WatchError::Config(format!(
            "invalid marker slot {:02}:{:02}",
            hour, minute
        )));
    }
    Ok(())
}
