//! Common types used across the workspace

use serde::{Deserialize, Serialize};

/// Server-assigned record identifier
pub type EntityId = i64;

/// Severity of a transient operator notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A transient notification (toast) raised by a workflow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Case-insensitive substring match used by every free-text filter
pub fn matches_filter(haystacks: &[&str], query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    haystacks
        .iter()
        .any(|h| h.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_filter_blank_query_matches_everything() {
        assert!(matches_filter(&["Main Warehouse"], ""));
        assert!(matches_filter(&[], "   "));
    }

    #[test]
    fn test_matches_filter_is_case_insensitive() {
        assert!(matches_filter(&["42", "Main Warehouse", "Downtown"], "downTOWN"));
        assert!(!matches_filter(&["42", "Main Warehouse"], "uptown"));
    }
}
