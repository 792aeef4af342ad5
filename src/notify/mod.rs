//! Notification Dispatch
//!
//! Fans a decided notification out to the configured recipients, preceded by
//! the carrier data-flow control code. Delivery itself belongs to a
//! [`MessageTransport`]; a failed recipient never rolls back the ledger.

pub mod transport;

pub use transport::{LogTransport, MessageTransport};
#[cfg(test)]
pub use transport::RecordingTransport;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::analysis::Decision;
use crate::config::{DispatchSettings, WatchConfig};
use crate::error::WatchError;

/// Ordered phone numbers for one outcome type
pub type RecipientList = Vec<String>;

const SUCCESS_TEMPLATE: &str = "车正常在充电，请放心。";
const FAILURE_TEMPLATE: &str = "充电停了，去看看吧。如果确认已完成充电，请忽略！！";

/// Build the message body for a notifying decision
pub fn compose_message(decision: Decision, now: NaiveDateTime) -> Option<String> {
    let template = match decision {
        Decision::NotifySuccess => SUCCESS_TEMPLATE,
        Decision::NotifyFailure => FAILURE_TEMPLATE,
        Decision::Suppress => return None,
    };
    Some(format!("{}{}", template, now.format("%Y-%m-%d %H:%M")))
}

/// Summary of one fan-out
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Recipients the transport accepted, carrier number included
    pub delivered: Vec<String>,
    /// Per-recipient failures
    pub failures: Vec<WatchError>,
}

/// Sends notifications through a transport
pub struct Dispatcher<'a, T: MessageTransport + ?Sized> {
    transport: &'a T,
    settings: &'a DispatchSettings,
    success_recipients: &'a [String],
    failure_recipients: &'a [String],
}

impl<'a, T: MessageTransport + ?Sized> Dispatcher<'a, T> {
    pub fn new(transport: &'a T, config: &'a WatchConfig) -> Self {
        Self {
            transport,
            settings: &config.dispatch,
            success_recipients: &config.success_recipients,
            failure_recipients: &config.failure_recipients,
        }
    }

    /// Deliver the notification for `decision`. Suppress sends nothing.
    pub fn dispatch(&self, decision: Decision, now: NaiveDateTime) -> DispatchReport {
        let mut report = DispatchReport::default();
        let Some(message) = compose_message(decision, now) else {
            return report;
        };

        let (control_code, recipients) = match decision {
            Decision::NotifySuccess => (&self.settings.resume_code, self.success_recipients),
            _ => (&self.settings.pause_code, self.failure_recipients),
        };

        self.send_one(&self.settings.carrier_number, control_code, &mut report);
        self.send_to_list(recipients, &message, &mut report);

        info!(
            "Dispatched {:?}: {} delivered, {} failed",
            decision,
            report.delivered.len(),
            report.failures.len()
        );
        report
    }

    /// Send `message` to every recipient; empty lists and messages are no-ops
    fn send_to_list(&self, recipients: &[String], message: &str, report: &mut DispatchReport) {
        if message.is_empty() || recipients.is_empty() {
            return;
        }
        for recipient in recipients {
            self.send_one(recipient, message, report);
        }
    }

    fn send_one(&self, recipient: &str, message: &str, report: &mut DispatchReport) {
        match self.transport.send(recipient, message) {
            Ok(()) => report.delivered.push(recipient.to_string()),
            Err(e) => {
                warn!("Failed to send to {}: {}", recipient, e);
                report.failures.push(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2022, 11, 15)
            .unwrap()
            .and_hms_opt(21, 55, 12)
            .unwrap()
    }

    fn config() -> WatchConfig {
        WatchConfig {
            success_recipients: vec!["111".into(), "222".into()],
            failure_recipients: vec!["333".into()],
            ..WatchConfig::default()
        }
    }

    #[test]
    fn test_compose_messages() {
        assert_eq!(
            compose_message(Decision::NotifySuccess, now()).unwrap(),
            "车正常在充电，请放心。2022-11-15 21:55"
        );
        assert!(compose_message(Decision::NotifyFailure, now())
            .unwrap()
            .ends_with("请忽略！！2022-11-15 21:55"));
        assert!(compose_message(Decision::Suppress, now()).is_none());
    }

    #[test]
    fn test_success_fan_out_order() {
        let transport = RecordingTransport::default();
        let config = config();

        let report = Dispatcher::new(&transport, &config).dispatch(Decision::NotifySuccess, now());

        let sent = transport.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0], ("10086".to_string(), "HFSJLL".to_string()));
        assert_eq!(sent[1].0, "111");
        assert_eq!(sent[2].0, "222");
        assert!(sent[1].1.starts_with("车正常在充电"));
        assert_eq!(report.delivered, vec!["10086", "111", "222"]);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_failure_uses_pause_code_and_failure_list() {
        let transport = RecordingTransport::default();
        let config = config();

        Dispatcher::new(&transport, &config).dispatch(Decision::NotifyFailure, now());

        let sent = transport.sent();
        assert_eq!(sent[0], ("10086".to_string(), "ZTSJLL".to_string()));
        assert_eq!(sent[1].0, "333");
        assert_eq!(sent.len(), 2);
    }

    #[test]
    fn test_suppress_sends_nothing() {
        let transport = RecordingTransport::default();
        let config = config();

        let report = Dispatcher::new(&transport, &config).dispatch(Decision::Suppress, now());

        assert!(transport.sent().is_empty());
        assert!(report.delivered.is_empty());
    }

    #[test]
    fn test_empty_recipient_list_only_sends_control_code() {
        let transport = RecordingTransport::default();
        let config = WatchConfig::default();

        Dispatcher::new(&transport, &config).dispatch(Decision::NotifySuccess, now());

        assert_eq!(transport.sent(), vec![("10086".to_string(), "HFSJLL".to_string())]);
    }

    #[test]
    fn test_failed_recipient_does_not_stop_fan_out() {
        let transport = RecordingTransport::failing_for(["111"]);
        let config = config();

        let report = Dispatcher::new(&transport, &config).dispatch(Decision::NotifySuccess, now());

        assert_eq!(report.delivered, vec!["10086", "222"]);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            &report.failures[0],
            WatchError::Dispatch { recipient, .. } if recipient == "111"
        ));
    }
}
