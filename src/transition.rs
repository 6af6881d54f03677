use std::fmt;

use serde::Serialize;

use crate::error::AdminError;
use crate::models::{EventStatus, VerificationStatus};

/// The collections an admin action can be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Institution,
    Student,
    Counselor,
    User,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Verify,
    Reject,
    Suspend,
    Activate,
    Cancel,
    Start,
    Complete,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Institution => "institution",
            TargetKind::Student => "student",
            TargetKind::Counselor => "counselor",
            TargetKind::User => "user",
            TargetKind::Event => "event",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TargetKind::Institution => "Institution",
            TargetKind::Student => "Student",
            TargetKind::Counselor => "Counselor",
            TargetKind::User => "User",
            TargetKind::Event => "Event",
        }
    }

    /// Actions each collection exposes. Users are blocked and unblocked
    /// rather than reviewed; students and counselors are only reviewed.
    pub fn allowed_actions(self) -> &'static [Action] {
        match self {
            TargetKind::Institution => &[
                Action::Verify,
                Action::Reject,
                Action::Suspend,
                Action::Activate,
            ],
            TargetKind::Student | TargetKind::Counselor => &[Action::Verify, Action::Reject],
            TargetKind::User => &[Action::Suspend, Action::Activate],
            TargetKind::Event => &[Action::Cancel, Action::Start, Action::Complete],
        }
    }

    pub fn supports(self, action: Action) -> bool {
        self.allowed_actions().contains(&action)
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Verify => "verify",
            Action::Reject => "reject",
            Action::Suspend => "suspend",
            Action::Activate => "activate",
            Action::Cancel => "cancel",
            Action::Start => "start",
            Action::Complete => "complete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl VerificationStatus {
    pub fn after(self, action: Action) -> Option<VerificationStatus> {
        use VerificationStatus::*;
        match (self, action) {
            (Pending, Action::Verify) => Some(Verified),
            (Pending, Action::Reject) => Some(Rejected),
            (Verified, Action::Suspend) => Some(Suspended),
            (Suspended, Action::Activate) => Some(Verified),
            _ => None,
        }
    }
}

impl EventStatus {
    pub fn after(self, action: Action) -> Option<EventStatus> {
        use EventStatus::*;
        match (self, action) {
            (Upcoming, Action::Cancel) => Some(Cancelled),
            (Upcoming, Action::Start) => Some(Ongoing),
            (Ongoing, Action::Complete) => Some(Completed),
            _ => None,
        }
    }
}

/// The action triggers to offer for a record of `kind` currently in `status`.
pub fn verification_actions(kind: TargetKind, status: VerificationStatus) -> Vec<Action> {
    kind.allowed_actions()
        .iter()
        .copied()
        .filter(|action| status.after(*action).is_some())
        .collect()
}

pub fn event_actions(status: EventStatus) -> Vec<Action> {
    TargetKind::Event
        .allowed_actions()
        .iter()
        .copied()
        .filter(|action| status.after(*action).is_some())
        .collect()
}

fn check_supported(kind: TargetKind, action: Action) -> Result<(), AdminError> {
    if kind.supports(action) {
        Ok(())
    } else {
        Err(AdminError::ActionNotSupported { kind, action })
    }
}

pub fn next_verification(
    kind: TargetKind,
    current: VerificationStatus,
    action: Action,
) -> Result<VerificationStatus, AdminError> {
    check_supported(kind, action)?;
    current.after(action).ok_or(AdminError::InvalidTransition {
        kind,
        action,
        from: current.to_string(),
    })
}

pub fn next_event(current: EventStatus, action: Action) -> Result<EventStatus, AdminError> {
    check_supported(TargetKind::Event, action)?;
    current.after(action).ok_or(AdminError::InvalidTransition {
        kind: TargetKind::Event,
        action,
        from: current.to_string(),
    })
}

pub fn check_generation(
    kind: TargetKind,
    id: &str,
    expected: Option<i64>,
    actual: i64,
) -> Result<(), AdminError> {
    match expected {
        Some(expected) if expected != actual => Err(AdminError::StaleGeneration {
            kind,
            id: id.to_string(),
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_machine_allows_only_listed_edges() {
        use VerificationStatus::*;
        let mut allowed = Vec::new();
        for from in VerificationStatus::ALL {
            for action in [Action::Verify, Action::Reject, Action::Suspend, Action::Activate] {
                if let Some(to) = from.after(action) {
                    allowed.push((*from, to));
                }
            }
        }
        assert_eq!(
            allowed,
            vec![
                (Pending, Verified),
                (Pending, Rejected),
                (Verified, Suspended),
                (Suspended, Verified),
            ]
        );
    }

    #[test]
    fn event_machine_allows_only_listed_edges() {
        assert_eq!(EventStatus::Upcoming.after(Action::Cancel), Some(EventStatus::Cancelled));
        assert_eq!(EventStatus::Upcoming.after(Action::Start), Some(EventStatus::Ongoing));
        assert_eq!(EventStatus::Ongoing.after(Action::Complete), Some(EventStatus::Completed));
        assert_eq!(EventStatus::Ongoing.after(Action::Cancel), None);
        assert_eq!(EventStatus::Completed.after(Action::Start), None);
        assert_eq!(EventStatus::Cancelled.after(Action::Start), None);
    }

    #[test]
    fn students_cannot_be_suspended() {
        let err = next_verification(
            TargetKind::Student,
            VerificationStatus::Verified,
            Action::Suspend,
        )
        .unwrap_err();
        assert_eq!(
            err,
            AdminError::ActionNotSupported {
                kind: TargetKind::Student,
                action: Action::Suspend,
            }
        );
    }

    #[test]
    fn users_are_blocked_and_unblocked() {
        assert_eq!(
            next_verification(TargetKind::User, VerificationStatus::Verified, Action::Suspend),
            Ok(VerificationStatus::Suspended)
        );
        assert_eq!(
            next_verification(TargetKind::User, VerificationStatus::Suspended, Action::Activate),
            Ok(VerificationStatus::Verified)
        );
        assert!(next_verification(TargetKind::User, VerificationStatus::Pending, Action::Verify).is_err());
    }

    #[test]
    fn rejected_institution_cannot_be_verified() {
        let err = next_verification(
            TargetKind::Institution,
            VerificationStatus::Rejected,
            Action::Verify,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid transition"));
    }

    #[test]
    fn offered_actions_depend_on_kind_and_status() {
        assert_eq!(
            verification_actions(TargetKind::Institution, VerificationStatus::Pending),
            vec![Action::Verify, Action::Reject]
        );
        assert_eq!(
            verification_actions(TargetKind::Institution, VerificationStatus::Verified),
            vec![Action::Suspend]
        );
        assert!(verification_actions(TargetKind::Student, VerificationStatus::Verified).is_empty());
        assert_eq!(
            verification_actions(TargetKind::User, VerificationStatus::Suspended),
            vec![Action::Activate]
        );
        assert_eq!(event_actions(EventStatus::Upcoming), vec![Action::Cancel, Action::Start]);
        assert!(event_actions(EventStatus::Cancelled).is_empty());
    }

    #[test]
    fn generation_check_only_applies_when_expected() {
        assert!(check_generation(TargetKind::Event, "1", None, 4).is_ok());
        assert!(check_generation(TargetKind::Event, "1", Some(4), 4).is_ok());
        assert!(matches!(
            check_generation(TargetKind::Event, "1", Some(3), 4),
            Err(AdminError::StaleGeneration { expected: 3, actual: 4, .. })
        ));
    }
}
