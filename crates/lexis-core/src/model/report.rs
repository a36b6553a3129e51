use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{ParseEnumError, WordId};

/// Review lifecycle of a user report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Pending,
    Reviewed,
    Resolved,
}

impl ReportStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Resolved => "resolved",
        }
    }

    /// Only pending reports move, and only to reviewed or resolved.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Reviewed | Self::Resolved)
        )
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "reviewed" => Ok(Self::Reviewed),
            "resolved" => Ok(Self::Resolved),
            _ => Err(ParseEnumError {
                expected: "report status",
                got: s.to_string(),
            }),
        }
    }
}

/// Admin decision on a pending report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    /// The report was valid; the word was dealt with.
    Approve,
    /// The report was looked at and dismissed.
    Dismiss,
}

impl ReportAction {
    #[must_use]
    pub const fn target_status(self) -> ReportStatus {
        match self {
            Self::Approve => ReportStatus::Resolved,
            Self::Dismiss => ReportStatus::Reviewed,
        }
    }
}

/// A user report against a word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub word_id: WordId,
    /// Text of the reported word, when it still exists.
    pub word: Option<String>,
    pub reason: String,
    pub reported_by: String,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_reports_transition() {
        assert!(ReportStatus::Pending.can_transition_to(ReportStatus::Resolved));
        assert!(ReportStatus::Pending.can_transition_to(ReportStatus::Reviewed));
        assert!(!ReportStatus::Pending.can_transition_to(ReportStatus::Pending));
        assert!(!ReportStatus::Reviewed.can_transition_to(ReportStatus::Resolved));
        assert!(!ReportStatus::Resolved.can_transition_to(ReportStatus::Reviewed));
    }

    #[test]
    fn actions_map_to_statuses() {
        assert_eq!(ReportAction::Approve.target_status(), ReportStatus::Resolved);
        assert_eq!(ReportAction::Dismiss.target_status(), ReportStatus::Reviewed);
    }

    #[test]
    fn status_round_trips_text() {
        for status in [
            ReportStatus::Pending,
            ReportStatus::Reviewed,
            ReportStatus::Resolved,
        ] {
            assert_eq!(status.as_str().parse::<ReportStatus>().unwrap(), status);
        }
        assert!("closed".parse::<ReportStatus>().is_err());
    }
}
