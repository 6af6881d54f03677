use std::fmt;

use serde::Serialize;

use crate::store::Applied;
use crate::transition::{Action, TargetKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn for_applied(applied: &Applied) -> Self {
        let subject = applied.kind.title();
        let name = &applied.name;
        let (title, description, severity) = match (applied.kind, applied.action) {
            (TargetKind::User, Action::Suspend) => (
                format!("{subject} Blocked"),
                format!("{name} has been blocked."),
                Severity::Info,
            ),
            (TargetKind::User, Action::Activate) => (
                format!("{subject} Unblocked"),
                format!("{name} has been unblocked."),
                Severity::Success,
            ),
            (_, Action::Verify) => (
                format!("{subject} Verified"),
                format!("{name} has been verified successfully."),
                Severity::Success,
            ),
            (_, Action::Reject) => (
                format!("{subject} Rejected"),
                format!("{name} has been rejected."),
                Severity::Destructive,
            ),
            (_, Action::Suspend) => (
                format!("{subject} Suspended"),
                format!("{name} has been suspended."),
                Severity::Info,
            ),
            (_, Action::Activate) => (
                format!("{subject} Reactivated"),
                format!("{name} has been reactivated."),
                Severity::Success,
            ),
            (_, Action::Cancel) => (
                format!("{subject} Cancelled"),
                format!("{name} has been cancelled."),
                Severity::Destructive,
            ),
            (_, Action::Start) => (
                format!("{subject} Started"),
                format!("{name} is now ongoing."),
                Severity::Info,
            ),
            (_, Action::Complete) => (
                format!("{subject} Completed"),
                format!("{name} has been marked completed."),
                Severity::Success,
            ),
        };

        Notification {
            title,
            description,
            severity,
        }
    }

    /// Any failure of an action, whether the transition was refused or the
    /// change could not be stored.
    pub fn for_failure(kind: TargetKind, action: Action, error: &dyn fmt::Display) -> Self {
        Notification {
            title: format!("Could not {action} {kind}"),
            description: error.to_string(),
            severity: Severity::Destructive,
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Destructive => "!!",
        };
        write!(f, "[{marker}] {}: {}", self.title, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdminError;
    use crate::models::VerificationStatus;
    use crate::store::StatusChange;

    fn applied(kind: TargetKind, action: Action) -> Applied {
        Applied {
            kind,
            id: "1".to_string(),
            name: "Harvard University".to_string(),
            action,
            change: StatusChange::Verification {
                from: VerificationStatus::Pending,
                to: VerificationStatus::Verified,
            },
            previous_generation: 0,
            activity: None,
        }
    }

    #[test]
    fn verify_uses_success_wording() {
        let note = Notification::for_applied(&applied(TargetKind::Institution, Action::Verify));
        assert_eq!(note.title, "Institution Verified");
        assert_eq!(note.description, "Harvard University has been verified successfully.");
        assert_eq!(note.severity, Severity::Success);
    }

    #[test]
    fn user_suspension_reads_as_block() {
        let note = Notification::for_applied(&applied(TargetKind::User, Action::Suspend));
        assert_eq!(note.title, "User Blocked");
    }

    #[test]
    fn failures_are_destructive() {
        let error = AdminError::ActionNotSupported {
            kind: TargetKind::Student,
            action: Action::Suspend,
        };
        let note = Notification::for_failure(TargetKind::Student, Action::Suspend, &error);
        assert_eq!(note.severity, Severity::Destructive);
        assert_eq!(note.title, "Could not suspend student");
        assert_eq!(note.to_string(), "[!!] Could not suspend student: student records do not support suspend");
    }

    #[test]
    fn storage_failures_are_destructive_too() {
        let error = anyhow::anyhow!("pool timed out while waiting for an open connection");
        let note = Notification::for_failure(TargetKind::Institution, Action::Verify, &error);
        assert_eq!(note.severity, Severity::Destructive);
        assert_eq!(note.title, "Could not verify institution");
        assert_eq!(
            note.description,
            "pool timed out while waiting for an open connection"
        );
    }
}
