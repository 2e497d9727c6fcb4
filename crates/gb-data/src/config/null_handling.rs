//! Null value handling for record ingestion

use serde::{Serialize, Deserialize};

/// Cell values that mean "absent"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullConfig {
    /// Patterns to treat as null
    pub patterns: Vec<String>,

    /// Whether to trim whitespace before checking
    pub trim_whitespace: bool,

    /// Case sensitive matching
    pub case_sensitive: bool,
}

impl Default for NullConfig {
    fn default() -> Self {
        Self {
            patterns: vec![
                String::new(),      // Empty string
                "-".to_string(),
                "N/A".to_string(),
                "null".to_string(),
                "None".to_string(),
                "nan".to_string(),
            ],
            trim_whitespace: true,
            case_sensitive: false,
        }
    }
}

impl NullConfig {
    /// Check if a value should be treated as null
    pub fn is_null(&self, value: &str) -> bool {
        let test_value = if self.trim_whitespace {
            value.trim()
        } else {
            value
        };

        self.patterns.iter().any(|pattern| {
            if self.case_sensitive {
                test_value == pattern
            } else {
                test_value.to_lowercase() == pattern.to_lowercase()
            }
        })
    }

    /// Normalize a raw cell: `None` if null, trimmed text otherwise
    pub fn clean(&self, value: &str) -> Option<String> {
        if self.is_null(value) {
            None
        } else if self.trim_whitespace {
            Some(value.trim().to_string())
        } else {
            Some(value.to_string())
        }
    }

    /// Add a null pattern
    pub fn add_pattern(&mut self, pattern: String) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let config = NullConfig::default();
        assert!(config.is_null(""));
        assert!(config.is_null("  "));
        assert!(config.is_null("NULL"));
        assert!(config.is_null("n/a"));
        assert!(config.is_null("NaN"));
        assert!(!config.is_null("Москва"));
    }

    #[test]
    fn test_clean_trims() {
        let config = NullConfig::default();
        assert_eq!(config.clean("  Казань "), Some("Казань".to_string()));
        assert_eq!(config.clean(" - "), None);
    }

    #[test]
    fn test_case_sensitive_patterns() {
        let mut config = NullConfig {
            case_sensitive: true,
            ..NullConfig::default()
        };
        config.add_pattern("НЕТ ДАННЫХ".to_string());
        assert!(config.is_null("НЕТ ДАННЫХ"));
        assert!(!config.is_null("нет данных"));
        assert!(!config.is_null("NULL"));
    }
}
