use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// Generates the text form shared by the CLI, serde and the database for a
/// closed enum.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            #[cfg(test)]
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AdminError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok($name::$variant),)+
                    other => Err(AdminError::UnknownValue {
                        field: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
    Suspended,
}

text_enum!(VerificationStatus {
    Pending => "pending",
    Verified => "verified",
    Rejected => "rejected",
    Suspended => "suspended",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum UserRole {
    SuperAdmin,
    InstitutionAdmin,
    Student,
    Counselor,
}

text_enum!(UserRole {
    SuperAdmin => "super_admin",
    InstitutionAdmin => "institution_admin",
    Student => "student",
    Counselor => "counselor",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

text_enum!(EventStatus {
    Upcoming => "upcoming",
    Ongoing => "ongoing",
    Completed => "completed",
    Cancelled => "cancelled",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum EventType {
    Webinar,
    Workshop,
    Conference,
    Seminar,
    Orientation,
}

text_enum!(EventType {
    Webinar => "webinar",
    Workshop => "workshop",
    Conference => "conference",
    Seminar => "seminar",
    Orientation => "orientation",
});

/// Tag on an activity entry naming the collection the affected record lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Institution,
    Student,
    Counselor,
    User,
}

text_enum!(EntityKind {
    Institution => "institution",
    Student => "student",
    Counselor => "counselor",
    User => "user",
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub admin_name: String,
    pub status: VerificationStatus,
    pub total_students: i32,
    pub total_counselors: i32,
    pub created_at: NaiveDate,
    pub verified_at: Option<NaiveDate>,
    #[serde(default)]
    pub generation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub institution_id: String,
    pub status: VerificationStatus,
    pub enrollment_number: Option<String>,
    pub created_at: NaiveDate,
    pub verified_at: Option<NaiveDate>,
    #[serde(default)]
    pub generation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Counselor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub institution_id: String,
    pub status: VerificationStatus,
    pub credentials: Option<String>,
    pub specialization: Option<String>,
    pub created_at: NaiveDate,
    pub verified_at: Option<NaiveDate>,
    #[serde(default)]
    pub generation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub status: VerificationStatus,
    pub created_at: NaiveDate,
    pub last_login: Option<NaiveDateTime>,
    #[serde(default)]
    pub generation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub status: EventStatus,
    pub date: NaiveDate,
    pub time: String,
    pub location: String,
    pub organizer: String,
    pub attendees: i32,
    pub max_attendees: i32,
    pub institution_id: Option<String>,
    #[serde(default)]
    pub generation: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub id: uuid::Uuid,
    pub action: String,
    pub entity_kind: EntityKind,
    pub entity_id: String,
    pub entity_name: String,
    pub performed_by: String,
    pub timestamp: NaiveDateTime,
    pub details: Option<String>,
}

/// One category on a chart with its named series values, in series order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDatum {
    pub name: String,
    pub series: Vec<(String, i64)>,
}

impl ChartDatum {
    pub fn single(name: impl Into<String>, value: i64) -> Self {
        ChartDatum {
            name: name.into(),
            series: vec![("value".to_string(), value)],
        }
    }

    pub fn value(&self, series: &str) -> Option<i64> {
        self.series
            .iter()
            .find(|(name, _)| name == series)
            .map(|(_, value)| *value)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_institutions: usize,
    pub total_students: usize,
    pub total_counselors: usize,
    pub pending_verifications: usize,
    pub verified_accounts: usize,
    pub rejected_accounts: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub total: usize,
    pub upcoming: usize,
    pub ongoing: usize,
    pub completed: usize,
}

/// Resolves an institution id to its display name.
pub trait InstitutionLookup {
    fn institution_name(&self, id: &str) -> Option<&str>;
}

/// A record admitted through the verification workflow.
pub trait Verifiable {
    const KIND: EntityKind;

    fn record_id(&self) -> &str;
    fn display_name(&self) -> &str;
    fn status(&self) -> VerificationStatus;
    fn generation(&self) -> i64;
    fn set_status(&mut self, status: VerificationStatus);
    fn bump_generation(&mut self);

    /// Stamps the verification date. Records without one ignore it.
    fn mark_verified(&mut self, _on: NaiveDate) {}
}

macro_rules! verifiable {
    (@base $ty:ty, $kind:expr, { $($extra:tt)* }) => {
        impl Verifiable for $ty {
            const KIND: EntityKind = $kind;

            fn record_id(&self) -> &str {
                &self.id
            }

            fn display_name(&self) -> &str {
                &self.name
            }

            fn status(&self) -> VerificationStatus {
                self.status
            }

            fn generation(&self) -> i64 {
                self.generation
            }

            fn set_status(&mut self, status: VerificationStatus) {
                self.status = status;
            }

            fn bump_generation(&mut self) {
                self.generation += 1;
            }

            $($extra)*
        }
    };
    ($ty:ty, $kind:expr, verified_at) => {
        verifiable!(@base $ty, $kind, {
            fn mark_verified(&mut self, on: NaiveDate) {
                self.verified_at = Some(on);
            }
        });
    };
    ($ty:ty, $kind:expr) => {
        verifiable!(@base $ty, $kind, {});
    };
}

verifiable!(Institution, EntityKind::Institution, verified_at);
verifiable!(Student, EntityKind::Student, verified_at);
verifiable!(Counselor, EntityKind::Counselor, verified_at);
verifiable!(User, EntityKind::User);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_forms_round_trip_through_from_str() {
        for status in VerificationStatus::ALL {
            assert_eq!(status.as_str().parse::<VerificationStatus>().unwrap(), *status);
        }
        assert_eq!("super_admin".parse::<UserRole>().unwrap(), UserRole::SuperAdmin);
        assert_eq!(EventType::Orientation.to_string(), "orientation");
    }

    #[test]
    fn unknown_text_is_rejected() {
        let err = "archived".parse::<EventStatus>().unwrap_err();
        assert!(err.to_string().contains("archived"));
    }

    #[test]
    fn chart_datum_reads_named_series() {
        let datum = ChartDatum {
            name: "Jan".to_string(),
            series: vec![("students".to_string(), 40), ("counselors".to_string(), 6)],
        };
        assert_eq!(datum.value("counselors"), Some(6));
        assert_eq!(datum.value("value"), None);
        assert_eq!(ChartDatum::single("Verified", 3).value("value"), Some(3));
    }
}
