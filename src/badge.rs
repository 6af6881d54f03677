use serde::{Serialize, Serializer};

use crate::models::{
    ActivityLog, EntityKind, EventStatus, EventType, UserRole, VerificationStatus,
};

/// Icon names from the dashboard's icon set. Only the name is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Icon {
    Clock,
    CheckCircle2,
    AlertTriangle,
    XCircle,
    Ban,
    PlayCircle,
    Shield,
    Building2,
    GraduationCap,
    Users,
    UserCog,
    Video,
    Wrench,
    Presentation,
    BookOpen,
    Compass,
}

impl Icon {
    pub fn name(self) -> &'static str {
        match self {
            Icon::Clock => "clock",
            Icon::CheckCircle2 => "check-circle-2",
            Icon::AlertTriangle => "alert-triangle",
            Icon::XCircle => "x-circle",
            Icon::Ban => "ban",
            Icon::PlayCircle => "play-circle",
            Icon::Shield => "shield",
            Icon::Building2 => "building-2",
            Icon::GraduationCap => "graduation-cap",
            Icon::Users => "users",
            Icon::UserCog => "user-cog",
            Icon::Video => "video",
            Icon::Wrench => "wrench",
            Icon::Presentation => "presentation",
            Icon::BookOpen => "book-open",
            Icon::Compass => "compass",
        }
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub class: &'static str,
    pub icon: Icon,
}

impl Badge {
    const fn new(label: &'static str, class: &'static str, icon: Icon) -> Self {
        Badge { label, class, icon }
    }

    pub fn describe(&self) -> String {
        format!("{} ({}, icon {})", self.label, self.class, self.icon.name())
    }
}

pub trait Classify {
    fn badge(&self) -> Badge;
}

impl Classify for VerificationStatus {
    fn badge(&self) -> Badge {
        match self {
            VerificationStatus::Pending => Badge::new("Pending", "status-pending", Icon::Clock),
            VerificationStatus::Verified => {
                Badge::new("Verified", "status-verified", Icon::CheckCircle2)
            }
            VerificationStatus::Rejected => Badge::new("Rejected", "status-rejected", Icon::XCircle),
            VerificationStatus::Suspended => Badge::new("Suspended", "status-suspended", Icon::Ban),
        }
    }
}

impl Classify for EventStatus {
    fn badge(&self) -> Badge {
        match self {
            EventStatus::Upcoming => Badge::new("Upcoming", "event-upcoming", Icon::Clock),
            EventStatus::Ongoing => Badge::new("Ongoing", "event-ongoing", Icon::PlayCircle),
            EventStatus::Completed => Badge::new("Completed", "event-completed", Icon::CheckCircle2),
            EventStatus::Cancelled => Badge::new("Cancelled", "event-cancelled", Icon::XCircle),
        }
    }
}

impl Classify for EventType {
    fn badge(&self) -> Badge {
        match self {
            EventType::Webinar => Badge::new("Webinar", "type-webinar", Icon::Video),
            EventType::Workshop => Badge::new("Workshop", "type-workshop", Icon::Wrench),
            EventType::Conference => Badge::new("Conference", "type-conference", Icon::Presentation),
            EventType::Seminar => Badge::new("Seminar", "type-seminar", Icon::BookOpen),
            EventType::Orientation => Badge::new("Orientation", "type-orientation", Icon::Compass),
        }
    }
}

impl Classify for UserRole {
    fn badge(&self) -> Badge {
        match self {
            UserRole::SuperAdmin => Badge::new("Super Admin", "role-super-admin", Icon::Shield),
            UserRole::InstitutionAdmin => {
                Badge::new("Institution Admin", "role-institution-admin", Icon::Building2)
            }
            UserRole::Student => Badge::new("Student", "role-student", Icon::GraduationCap),
            UserRole::Counselor => Badge::new("Counselor", "role-counselor", Icon::Users),
        }
    }
}

impl Classify for EntityKind {
    fn badge(&self) -> Badge {
        match self {
            EntityKind::Institution => Badge::new("Institution", "entity-institution", Icon::Building2),
            EntityKind::Student => Badge::new("Student", "entity-student", Icon::GraduationCap),
            EntityKind::Counselor => Badge::new("Counselor", "entity-counselor", Icon::Users),
            EntityKind::User => Badge::new("User", "entity-user", Icon::UserCog),
        }
    }
}

/// How an activity entry reads in the feed, derived from its action label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityOutcome {
    Success,
    Destructive,
    Info,
}

impl ActivityOutcome {
    pub fn of(action: &str) -> Self {
        let action = action.to_lowercase();
        let any = |words: &[&str]| words.iter().any(|word| action.contains(word));
        // "unblocked" contains "blocked", so success is checked first.
        if any(&["verified", "approved", "unblocked", "reactivated"]) {
            ActivityOutcome::Success
        } else if any(&["rejected", "suspended", "blocked"]) {
            ActivityOutcome::Destructive
        } else {
            ActivityOutcome::Info
        }
    }
}

impl Classify for ActivityOutcome {
    fn badge(&self) -> Badge {
        match self {
            ActivityOutcome::Success => Badge::new("Success", "text-success", Icon::CheckCircle2),
            ActivityOutcome::Destructive => {
                Badge::new("Destructive", "text-destructive", Icon::AlertTriangle)
            }
            ActivityOutcome::Info => Badge::new("Info", "text-info", Icon::Shield),
        }
    }
}

impl Classify for ActivityLog {
    fn badge(&self) -> Badge {
        ActivityOutcome::of(&self.action).badge()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn distinct_labels<T: Classify>(values: &[T]) -> usize {
        values
            .iter()
            .map(|value| value.badge().label)
            .collect::<HashSet<_>>()
            .len()
    }

    #[test]
    fn every_member_has_a_distinct_badge() {
        assert_eq!(distinct_labels(VerificationStatus::ALL), VerificationStatus::ALL.len());
        assert_eq!(distinct_labels(EventStatus::ALL), EventStatus::ALL.len());
        assert_eq!(distinct_labels(EventType::ALL), EventType::ALL.len());
        assert_eq!(distinct_labels(UserRole::ALL), UserRole::ALL.len());
        assert_eq!(distinct_labels(EntityKind::ALL), EntityKind::ALL.len());
    }

    #[test]
    fn lookup_is_deterministic() {
        for status in VerificationStatus::ALL {
            assert_eq!(status.badge(), status.badge());
        }
        assert_eq!(
            VerificationStatus::Verified.badge(),
            Badge::new("Verified", "status-verified", Icon::CheckCircle2)
        );
    }

    #[test]
    fn role_badges_use_role_icons() {
        assert_eq!(UserRole::SuperAdmin.badge().icon, Icon::Shield);
        assert_eq!(UserRole::Counselor.badge().icon.name(), "users");
    }

    #[test]
    fn describe_names_class_and_icon() {
        assert_eq!(
            EventStatus::Ongoing.badge().describe(),
            "Ongoing (event-ongoing, icon play-circle)"
        );
    }

    #[test]
    fn icons_serialize_with_their_names() {
        assert_eq!(serde_json::to_string(&Icon::CheckCircle2).unwrap(), "\"check-circle-2\"");
        assert_eq!(serde_json::to_string(&Icon::Building2).unwrap(), "\"building-2\"");
        let badge = serde_json::to_value(UserRole::InstitutionAdmin.badge()).unwrap();
        assert_eq!(badge["icon"], Icon::Building2.name());
    }

    #[test]
    fn activity_outcome_follows_the_action_label() {
        assert_eq!(ActivityOutcome::of("Institution verified"), ActivityOutcome::Success);
        assert_eq!(ActivityOutcome::of("User unblocked"), ActivityOutcome::Success);
        assert_eq!(ActivityOutcome::of("Counselor rejected"), ActivityOutcome::Destructive);
        assert_eq!(ActivityOutcome::of("Institution suspended"), ActivityOutcome::Destructive);
        assert_eq!(ActivityOutcome::of("User blocked"), ActivityOutcome::Destructive);
        assert_eq!(ActivityOutcome::of("Password reset"), ActivityOutcome::Info);
        assert_eq!(ActivityOutcome::Destructive.badge().icon, Icon::AlertTriangle);
    }

    #[test]
    fn seeded_activity_is_classified() {
        let directory = crate::seed::directory().unwrap();
        let classes: Vec<&str> = directory
            .activity
            .iter()
            .map(|entry| entry.badge().class)
            .collect();
        assert!(classes.contains(&"text-success"));
        assert!(classes.contains(&"text-destructive"));
    }
}
