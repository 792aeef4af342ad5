//! Recognition label dictionary
//!
//! Maps the integer label indices produced by the recognizer back to text.

use std::path::Path;
use tracing::{error, info};

use crate::error::{Result, WatchError};

/// Substituted for any label index outside the dictionary
pub const PLACEHOLDER: &str = "×";

/// Reserved entry at index 0 (the recognizer's blank class)
const LEADING_SENTINEL: &str = "black";
/// Reserved trailing entry (the recognizer's space class)
const TRAILING_SENTINEL: &str = " ";

/// Ordered label list with the recognizer's reserved sentinels at both ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelDictionary {
    labels: Vec<String>,
}

impl LabelDictionary {
    /// Build a dictionary from the label file's lines, adding both sentinels
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels = vec![LEADING_SENTINEL.to_string()];
        labels.extend(lines.into_iter().map(Into::into));
        labels.push(TRAILING_SENTINEL.to_string());
        Self { labels }
    }

    /// Load a dictionary file, one label per line. A file without labels is
    /// rejected: every recognized index would decode to [`PLACEHOLDER`].
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            WatchError::Config(format!("failed to read label file {:?}: {}", path, e))
        })?;
        let dictionary = Self::from_lines(content.lines());
        if dictionary.label_count() == 0 {
            return Err(WatchError::Config(format!(
                "label file {:?} contains no labels",
                path
            )));
        }
        info!("Word label size: {}", dictionary.labels.len());
        Ok(dictionary)
    }

    /// Number of labels, sentinels excluded
    pub fn label_count(&self) -> usize {
        self.labels.len() - 2
    }

    /// Resolve one label index. Out-of-range indices log and yield [`PLACEHOLDER`].
    pub fn resolve(&self, index: i32) -> &str {
        match usize::try_from(index).ok().and_then(|i| self.labels.get(i)) {
            Some(label) => label.as_str(),
            None => {
                error!("Word index is not in label list: {}", index);
                PLACEHOLDER
            }
        }
    }

    /// Resolve and concatenate a run of label indices, preserving order
    pub fn decode(&self, indices: &[i32]) -> String {
        indices.iter().map(|&i| self.resolve(i)).collect()
    }
}

#[cfg(test)]
impl Default for LabelDictionary {
    fn default() -> Self {
        Self::from_lines(std::iter::empty::<String>())
    }
}
