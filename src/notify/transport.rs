//! Outbound message transports

use tracing::info;

use crate::error::{Result, WatchError};
#[cfg(test)]
use parking_lot::Mutex;
#[cfg(test)]
use std::collections::HashSet;

/// Delivers a text message to one address
pub trait MessageTransport {
    fn send(&self, recipient: &str, text: &str) -> Result<()>;
}

/// Split `text` into segments of at most `max_chars` characters
pub fn segment_message(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.is_empty() {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Writes each segment to the log instead of a modem
pub struct LogTransport {
    segment_chars: usize,
}

impl LogTransport {
    pub fn new(segment_chars: usize) -> Self {
        Self { segment_chars }
    }
}

impl MessageTransport for LogTransport {
    fn send(&self, recipient: &str, text: &str) -> Result<()> {
        if recipient.trim().is_empty() {
            return Err(WatchError::Dispatch {
                recipient: recipient.to_string(),
                reason: "empty address".to_string(),
            });
        }
        let segments = segment_message(text, self.segment_chars);
        let total = segments.len();
        for (i, segment) in segments.iter().enumerate() {
            info!("SMS to {} [{}/{}]: {}", recipient, i + 1, total, segment);
        }
        Ok(())
    }
}

/// Keeps every message in memory; optionally rejects chosen recipients
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
    rejected: HashSet<String>,
}

#[cfg(test)]
impl RecordingTransport {
    pub fn failing_for<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sent: Mutex::new(Vec::new()),
            rejected: recipients.into_iter().map(Into::into).collect(),
        }
    }

    /// Snapshot of (recipient, text) pairs in send order
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().clone()
    }
}

#[cfg(test)]
impl MessageTransport for RecordingTransport {
    fn send(&self, recipient: &str, text: &str) -> Result<()> {
        if self.rejected.contains(recipient) {
            return Err(WatchError::Dispatch {
                recipient: recipient.to_string(),
                reason: "rejected by transport".to_string(),
            });
        }
        self.sent.lock().push((recipient.to_string(), text.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_single_segment() {
        assert_eq!(segment_message("HFSJLL", 70), vec!["HFSJLL"]);
    }

    #[test]
    fn test_segments_split_on_chars_not_bytes() {
        let text = "充电停了，去看看吧";
        let segments = segment_message(text, 4);

        assert_eq!(segments, vec!["充电停了", "，去看看", "吧"]);
        assert_eq!(segments.concat(), text);
    }

    #[test]
    fn test_zero_limit_keeps_message_whole() {
        assert_eq!(segment_message("abc", 0), vec!["abc"]);
    }

    #[test]
    fn test_log_transport_accepts() {
        assert!(LogTransport::new(70).send("10086", "ZTSJLL").is_ok());
    }

    #[test]
    fn test_log_transport_rejects_blank_address() {
        let result = LogTransport::new(70).send("  ", "ZTSJLL");
        assert!(matches!(result, Err(WatchError::Dispatch { .. })));
    }
}
