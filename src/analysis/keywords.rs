//! Keyword classifier
//!
//! Charging is inferred from case-sensitive substring matches of configured
//! keywords in recognized text.

use tracing::debug;

use crate::vision::Observation;

/// Keywords used when the keyword file is missing or empty
pub const DEFAULT_KEYWORDS: [&str; 6] = ["车辆", "向盘", "功率", "否则", "离开", "满时"];

/// Ordered, de-duplicated keyword list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    /// Build from configured lines; empty input yields [`DEFAULT_KEYWORDS`]
    pub fn from_lines(lines: Vec<String>) -> Self {
        let mut keywords: Vec<String> = Vec::with_capacity(lines.len());
        for line in lines {
            if !line.is_empty() && !keywords.contains(&line) {
                keywords.push(line);
            }
        }
        if keywords.is_empty() {
            return Self::default();
        }
        Self { keywords }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }

    /// Number of keywords appearing in `text`
    pub fn count_matches(&self, text: &str) -> usize {
        self.iter().filter(|keyword| text.contains(keyword)).count()
    }

    /// Whether `text` contains at least one keyword
    #[cfg(test)]
    pub fn matches(&self, text: &str) -> bool {
        self.iter().any(|keyword| text.contains(keyword))
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Result of classifying one cycle's observations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// The charging signal
    pub charging: bool,
    /// Matching (observation, keyword) pairs
    pub match_count: usize,
}

/// Derive the charging signal. An empty observation sequence is "not charging".
pub fn classify(observations: &[Observation], keywords: &KeywordSet) -> Classification {
    let match_count = observations
        .iter()
        .map(|o| keywords.count_matches(&o.text))
        .sum::<usize>();
    debug!(
        "Keyword matches: {} across {} observations",
        match_count,
        observations.len()
    );
    Classification {
        charging: match_count > 0,
        match_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(text: &str) -> Observation {
        Observation {
            text: text.to_string(),
            confidence: 0.9,
            orientation: None,
            geometry: vec![],
        }
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let set = KeywordSet::from_lines(vec![]);
        assert_eq!(set, KeywordSet::default());
        assert_eq!(set.iter().count(), 6);
    }

    #[test]
    fn test_configured_keywords_deduplicated() {
        let set = KeywordSet::from_lines(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_no_observations_is_not_charging() {
        let result = classify(&[], &KeywordSet::default());
        assert!(!result.charging);
        assert_eq!(result.match_count, 0);
    }

    #[test]
    fn test_substring_match_detects_charging() {
        let result = classify(
            &[observation("电池"), observation("请勿离开车辆")],
            &KeywordSet::default(),
        );
        assert!(result.charging);
        assert_eq!(result.match_count, 2);
    }

    #[test]
    fn test_no_keyword_in_any_text() {
        let result = classify(
            &[observation("充电已完成"), observation(""), observation("电量 100%")],
            &KeywordSet::default(),
        );
        assert!(!result.charging);
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let set = KeywordSet::from_lines(vec!["Charging".into()]);
        assert!(!classify(&[observation("CHARGING")], &set).charging);
        assert!(classify(&[observation("Now Charging...")], &set).charging);
    }

    #[test]
    fn test_keyword_split_across_observations_does_not_match() {
        let set = KeywordSet::from_lines(vec!["功率".into()]);
        assert!(!classify(&[observation("功"), observation("率")], &set).charging);
    }
}
