//! Notification policy
//!
//! Decides, once per classification cycle, whether to notify. Throttling state
//! lives in the [`NotificationLedger`]: at most one success notification and at
//! most one failure notification per (date, hour), where a failure notification
//! needs a failure already recorded earlier in that hour.

use chrono::{NaiveDateTime, Timelike};
use std::collections::BTreeSet;
use tracing::{debug, info};

use crate::config::WatchConfig;
use crate::error::Result;
use crate::storage::{NotificationLedger, OutcomeType};

/// Hours considered when nothing is configured
pub const DEFAULT_ALLOWED_HOURS: [u32; 5] = [21, 22, 23, 0, 1];

/// Hours of the day during which notification is considered at all
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedHours(BTreeSet<u32>);

impl AllowedHours {
    /// Build from configured hours; out-of-range values are dropped and an
    /// empty result falls back to [`DEFAULT_ALLOWED_HOURS`]
    pub fn from_hours(hours: impl IntoIterator<Item = u32>) -> Self {
        let set: BTreeSet<u32> = hours.into_iter().filter(|&h| h < 24).collect();
        if set.is_empty() {
            Self::default()
        } else {
            Self(set)
        }
    }

    pub fn contains(&self, hour: u32) -> bool {
        self.0.contains(&hour)
    }

    pub fn hours(&self) -> Vec<u32> {
        self.0.iter().copied().collect()
    }
}

impl Default for AllowedHours {
    fn default() -> Self {
        Self(DEFAULT_ALLOWED_HOURS.into_iter().collect())
    }
}

/// Outcome of the policy for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Suppress,
    NotifySuccess,
    NotifyFailure,
}

/// Send/suppress decision over time, charging signal and ledger state
#[derive(Debug, Clone)]
pub struct NotificationPolicy<'a> {
    allowed_hours: &'a AllowedHours,
    charging_minute_gate: u32,
}

impl<'a> NotificationPolicy<'a> {
    pub fn new(allowed_hours: &'a AllowedHours, charging_minute_gate: u32) -> Self {
        Self {
            allowed_hours,
            charging_minute_gate,
        }
    }

    pub fn from_config(config: &'a WatchConfig) -> Self {
        Self::new(&config.allowed_hours, config.charging_minute_gate)
    }

    /// Decide for the cycle running at `now`, recording this cycle's marker
    /// where the throttling rules call for one.
    ///
    /// A ledger error aborts the decision; callers must treat it as
    /// [`Decision::Suppress`] so no notification goes out unrecorded.
    pub fn decide(
        &self,
        now: NaiveDateTime,
        charging: bool,
        ledger: &NotificationLedger,
    ) -> Result<Decision> {
        let hour = now.hour();
        let minute = now.minute();
        let date = now.date();

        if !self.allowed_hours.contains(hour) {
            debug!("Hour {} outside allowed hours, suppressing", hour);
            return Ok(Decision::Suppress);
        }

        if charging && minute < self.charging_minute_gate {
            debug!(
                "Charging at minute {} (< {}), waiting for end of hour",
                minute, self.charging_minute_gate
            );
            return Ok(Decision::Suppress);
        }

        let outcome = OutcomeType::from_charging(charging);
        let prior = ledger.count_markers(date, hour, outcome)?;

        let decision = match (outcome, prior) {
            (OutcomeType::Success, 0) => {
                ledger.record_marker(date, hour, outcome, minute)?;
                Decision::NotifySuccess
            }
            (OutcomeType::Success, _) => Decision::Suppress,
            (OutcomeType::Failure, 0) => {
                // first failure this hour is only logged
                ledger.record_marker(date, hour, outcome, minute)?;
                Decision::Suppress
            }
            (OutcomeType::Failure, 1) => {
                if ledger.has_marker(date, hour, outcome, minute)? {
                    // the earlier failure is this minute's; wait for a later minute
                    Decision::Suppress
                } else {
                    ledger.record_marker(date, hour, outcome, minute)?;
                    Decision::NotifyFailure
                }
            }
            (OutcomeType::Failure, _) => Decision::Suppress,
        };

        info!(
            "{} {:02}:{:02} {} (prior {} markers) -> {:?}",
            date, hour, minute, outcome, prior, decision
        );
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatchError;
    use crate::storage::{MarkerStore, MemoryMarkerStore};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn ledger() -> NotificationLedger {
        NotificationLedger::new(Box::new(MemoryMarkerStore::new()))
    }

    fn count(ledger: &NotificationLedger, hour: u32, outcome: OutcomeType) -> u32 {
        ledger.count_markers(at(hour, 0).date(), hour, outcome).unwrap()
    }

    fn only_21() -> AllowedHours {
        AllowedHours::from_hours([21])
    }

    #[test]
    fn test_allowed_hours_defaults() {
        let hours = AllowedHours::from_hours(Vec::new());
        assert_eq!(hours.hours(), vec![0, 1, 21, 22, 23]);
        assert_eq!(AllowedHours::from_hours([30, 99]), AllowedHours::default());
    }

    #[test]
    fn test_outside_allowed_hours_always_suppresses() {
        let hours = only_21();
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = ledger();
        ledger.record_marker(at(20, 0).date(), 20, OutcomeType::Failure, 1).unwrap();

        for hour in (0..24).filter(|&h| h != 21) {
            for charging in [true, false] {
                let decision = policy.decide(at(hour, 55), charging, &ledger).unwrap();
                assert_eq!(decision, Decision::Suppress);
            }
        }
        assert_eq!(count(&ledger, 20, OutcomeType::Failure), 1);
        assert_eq!(count(&ledger, 22, OutcomeType::Failure), 0);
    }

    #[test]
    fn test_charging_before_minute_gate_suppresses() {
        let hours = only_21();
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = ledger();

        assert_eq!(policy.decide(at(21, 49), true, &ledger).unwrap(), Decision::Suppress);
        assert_eq!(count(&ledger, 21, OutcomeType::Success), 0);
    }

    #[test]
    fn test_first_success_notifies_and_records() {
        let hours = only_21();
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = ledger();

        assert_eq!(policy.decide(at(21, 55), true, &ledger).unwrap(), Decision::NotifySuccess);
        assert_eq!(count(&ledger, 21, OutcomeType::Success), 1);
    }

    #[test]
    fn test_later_success_suppressed_without_marker() {
        let hours = only_21();
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = ledger();

        policy.decide(at(21, 55), true, &ledger).unwrap();
        assert_eq!(policy.decide(at(21, 57), true, &ledger).unwrap(), Decision::Suppress);
        assert_eq!(count(&ledger, 21, OutcomeType::Success), 1);
    }

    #[test]
    fn test_failure_escalation_sequence() {
        let hours = only_21();
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = ledger();

        assert_eq!(policy.decide(at(21, 5), false, &ledger).unwrap(), Decision::Suppress);
        assert_eq!(count(&ledger, 21, OutcomeType::Failure), 1);

        assert_eq!(policy.decide(at(21, 6), false, &ledger).unwrap(), Decision::NotifyFailure);
        assert_eq!(count(&ledger, 21, OutcomeType::Failure), 2);

        assert_eq!(policy.decide(at(21, 7), false, &ledger).unwrap(), Decision::Suppress);
        assert_eq!(count(&ledger, 21, OutcomeType::Failure), 2);
    }

    #[test]
    fn test_failure_is_not_minute_gated() {
        let hours = only_21();
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = ledger();
        ledger.record_marker(at(21, 0).date(), 21, OutcomeType::Failure, 0).unwrap();

        assert_eq!(policy.decide(at(21, 1), false, &ledger).unwrap(), Decision::NotifyFailure);
    }

    #[test]
    fn test_same_minute_failure_does_not_escalate() {
        let hours = only_21();
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = ledger();

        let decisions: Vec<Decision> = [at(21, 5), at(21, 5), at(21, 6), at(21, 7), at(21, 8)]
            .into_iter()
            .map(|now| policy.decide(now, false, &ledger).unwrap())
            .collect();

        assert_eq!(
            decisions,
            vec![
                Decision::Suppress,
                Decision::Suppress,
                Decision::NotifyFailure,
                Decision::Suppress,
                Decision::Suppress,
            ]
        );
        let notified = decisions.iter().filter(|d| **d == Decision::NotifyFailure).count();
        assert_eq!(notified, 1);
        assert_eq!(count(&ledger, 21, OutcomeType::Failure), 2);
    }

    #[test]
    fn test_hour_rollover_resets_counts() {
        let hours = AllowedHours::from_hours([21, 22]);
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = ledger();

        policy.decide(at(21, 55), true, &ledger).unwrap();
        assert_eq!(policy.decide(at(22, 55), true, &ledger).unwrap(), Decision::NotifySuccess);
    }

    struct ReadOnlyStore(MemoryMarkerStore);

    impl MarkerStore for ReadOnlyStore {
        fn exists(&self, key: &str) -> Result<bool> {
            self.0.exists(key)
        }

        fn create(&self, _key: &str) -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "read-only").into())
        }
    }

    #[test]
    fn test_failed_marker_write_aborts_notify() {
        let hours = only_21();
        let policy = NotificationPolicy::new(&hours, 50);
        let ledger = NotificationLedger::new(Box::new(ReadOnlyStore(MemoryMarkerStore::new())));

        let result = policy.decide(at(21, 55), true, &ledger);
        assert!(matches!(result, Err(WatchError::LedgerStorage { .. })));
    }
}
