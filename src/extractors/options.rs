// src/extractors/options.rs
use crate::report::DEFAULT_RULE_CITATION;

/// Descriptions shorter than this are treated as spurious matches ("None", "N/A").
pub const DEFAULT_MIN_DESCRIPTION_LEN: usize = 5;

pub const MIN_DESCRIPTION_LEN_ENV: &str = "MIN_DESCRIPTION_LEN";
pub const DEFAULT_RULE_CITATION_ENV: &str = "DEFAULT_RULE_CITATION";

/// Tunables for the report parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Minimum number of characters an issue description needs to be accepted.
    pub min_description_len: usize,
    /// Citation recorded when an issue or disclosure names no rule.
    pub default_rule_citation: String,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            min_description_len: DEFAULT_MIN_DESCRIPTION_LEN,
            default_rule_citation: DEFAULT_RULE_CITATION.to_string(),
        }
    }
}

impl ParseOptions {
    /// Defaults overridden by `MIN_DESCRIPTION_LEN` and `DEFAULT_RULE_CITATION` when set.
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut options = Self::default();

        if let Ok(raw) = std::env::var(MIN_DESCRIPTION_LEN_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(len) => {
                    tracing::debug!("Using {}={} from environment", MIN_DESCRIPTION_LEN_ENV, len);
                    options.min_description_len = len;
                }
                Err(e) => tracing::warn!("Ignoring invalid {} '{}': {}", MIN_DESCRIPTION_LEN_ENV, raw, e),
            }
        }

        if let Ok(raw) = std::env::var(DEFAULT_RULE_CITATION_ENV) {
            let rule = raw.trim();
            if rule.is_empty() {
                tracing::warn!("Ignoring empty {}", DEFAULT_RULE_CITATION_ENV);
            } else {
                options.default_rule_citation = rule.to_string();
            }
        }

        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ParseOptions::default();
        assert_eq!(options.min_description_len, 5);
        assert_eq!(options.default_rule_citation, "Rule 201");
    }
}
