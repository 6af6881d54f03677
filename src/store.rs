use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AdminError;
use crate::models::{
    ActivityLog, Counselor, Event, EventStatus, Institution, InstitutionLookup, Student, User,
    Verifiable, VerificationStatus,
};
use crate::table::Identified;
use crate::transition::{self, Action, TargetKind};

/// Records of one type in their stored order, indexed by id.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Identified> Collection<T> {
    pub fn new(kind: TargetKind, items: Vec<T>) -> Result<Self, AdminError> {
        let mut index = HashMap::with_capacity(items.len());
        for (position, item) in items.iter().enumerate() {
            if index.insert(item.id().to_string(), position).is_some() {
                return Err(AdminError::DuplicateId {
                    kind,
                    id: item.id().to_string(),
                });
            }
        }
        Ok(Collection { items, index })
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.index
            .get(id)
            .copied()
            .map(move |position| &mut self.items[position])
    }
}

#[derive(Debug, Clone)]
pub struct Directory {
    pub institutions: Collection<Institution>,
    pub students: Collection<Student>,
    pub counselors: Collection<Counselor>,
    pub users: Collection<User>,
    pub events: Collection<Event>,
    /// Newest entry first.
    pub activity: Vec<ActivityLog>,
}

impl InstitutionLookup for Directory {
    fn institution_name(&self, id: &str) -> Option<&str> {
        self.institutions.get(id).map(|institution| institution.name.as_str())
    }
}

pub struct ActionRequest<'a> {
    pub kind: TargetKind,
    pub id: &'a str,
    pub action: Action,
    pub expected_generation: Option<i64>,
    pub performed_by: &'a str,
    pub at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "machine", rename_all = "snake_case")]
pub enum StatusChange {
    Verification {
        from: VerificationStatus,
        to: VerificationStatus,
    },
    Event {
        from: EventStatus,
        to: EventStatus,
    },
}

impl StatusChange {
    pub fn to_str(&self) -> &'static str {
        match self {
            StatusChange::Verification { to, .. } => to.as_str(),
            StatusChange::Event { to, .. } => to.as_str(),
        }
    }
}

/// The outcome of a transition that was applied to the directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Applied {
    pub kind: TargetKind,
    pub id: String,
    pub name: String,
    pub action: Action,
    pub change: StatusChange,
    /// Generation the record held before the change.
    pub previous_generation: i64,
    pub activity: Option<ActivityLog>,
}

impl Directory {
    pub fn new(
        institutions: Vec<Institution>,
        students: Vec<Student>,
        counselors: Vec<Counselor>,
        users: Vec<User>,
        events: Vec<Event>,
        mut activity: Vec<ActivityLog>,
    ) -> Result<Self, AdminError> {
        activity.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(Directory {
            institutions: Collection::new(TargetKind::Institution, institutions)?,
            students: Collection::new(TargetKind::Student, students)?,
            counselors: Collection::new(TargetKind::Counselor, counselors)?,
            users: Collection::new(TargetKind::User, users)?,
            events: Collection::new(TargetKind::Event, events)?,
            activity,
        })
    }

    pub fn recent_activity(&self, limit: usize) -> &[ActivityLog] {
        &self.activity[..limit.min(self.activity.len())]
    }

    /// Student, counselor and event ids whose institution reference does not
    /// resolve. Events without an institution are not dangling.
    pub fn dangling_references(&self) -> Vec<(TargetKind, &str)> {
        let students = self
            .students
            .as_slice()
            .iter()
            .filter(|student| self.institutions.get(&student.institution_id).is_none())
            .map(|student| (TargetKind::Student, student.id.as_str()));
        let counselors = self
            .counselors
            .as_slice()
            .iter()
            .filter(|counselor| self.institutions.get(&counselor.institution_id).is_none())
            .map(|counselor| (TargetKind::Counselor, counselor.id.as_str()));
        let events = self
            .events
            .as_slice()
            .iter()
            .filter(|event| {
                event
                    .institution_id
                    .as_deref()
                    .is_some_and(|id| self.institutions.get(id).is_none())
            })
            .map(|event| (TargetKind::Event, event.id.as_str()));
        students.chain(counselors).chain(events).collect()
    }

    /// Validates and applies one admin action. A rejected request leaves the
    /// directory untouched.
    pub fn apply(&mut self, request: &ActionRequest<'_>) -> Result<Applied, AdminError> {
        let applied = match request.kind {
            TargetKind::Institution => apply_verifiable(&mut self.institutions, request)?,
            TargetKind::Student => apply_verifiable(&mut self.students, request)?,
            TargetKind::Counselor => apply_verifiable(&mut self.counselors, request)?,
            TargetKind::User => apply_verifiable(&mut self.users, request)?,
            TargetKind::Event => apply_event(&mut self.events, request)?,
        };

        if let Some(entry) = &applied.activity {
            self.activity.insert(0, entry.clone());
        }
        log::info!(
            "{} {} {} -> {} by {}",
            request.action,
            request.kind,
            request.id,
            applied.change.to_str(),
            request.performed_by
        );
        Ok(applied)
    }
}

fn activity_label(kind: TargetKind, action: Action) -> String {
    let verb = match (kind, action) {
        (TargetKind::User, Action::Suspend) => "blocked",
        (TargetKind::User, Action::Activate) => "unblocked",
        (_, Action::Verify) => "verified",
        (_, Action::Reject) => "rejected",
        (_, Action::Suspend) => "suspended",
        (_, Action::Activate) => "reactivated",
        (_, Action::Cancel) => "cancelled",
        (_, Action::Start) => "started",
        (_, Action::Complete) => "completed",
    };
    format!("{} {}", kind.title(), verb)
}

fn apply_verifiable<T>(
    collection: &mut Collection<T>,
    request: &ActionRequest<'_>,
) -> Result<Applied, AdminError>
where
    T: Identified + Verifiable,
{
    let kind = request.kind;
    let record = collection
        .get_mut(request.id)
        .ok_or_else(|| AdminError::NotFound {
            kind,
            id: request.id.to_string(),
        })?;

    let from = record.status();
    let to = transition::next_verification(kind, from, request.action)?;
    transition::check_generation(
        kind,
        request.id,
        request.expected_generation,
        record.generation(),
    )?;

    let previous_generation = record.generation();
    record.set_status(to);
    record.bump_generation();
    if to == VerificationStatus::Verified {
        record.mark_verified(request.at.date());
    }

    let activity = ActivityLog {
        id: Uuid::new_v4(),
        action: activity_label(kind, request.action),
        entity_kind: T::KIND,
        entity_id: record.record_id().to_string(),
        entity_name: record.display_name().to_string(),
        performed_by: request.performed_by.to_string(),
        timestamp: request.at,
        details: Some(format!("{from} -> {to}")),
    };

    Ok(Applied {
        kind,
        id: record.record_id().to_string(),
        name: record.display_name().to_string(),
        action: request.action,
        change: StatusChange::Verification { from, to },
        previous_generation,
        activity: Some(activity),
    })
}

fn apply_event(
    events: &mut Collection<Event>,
    request: &ActionRequest<'_>,
) -> Result<Applied, AdminError> {
    let event = events.get_mut(request.id).ok_or_else(|| AdminError::NotFound {
        kind: TargetKind::Event,
        id: request.id.to_string(),
    })?;

    let from = event.status;
    let to = transition::next_event(from, request.action)?;
    transition::check_generation(
        TargetKind::Event,
        request.id,
        request.expected_generation,
        event.generation,
    )?;

    let previous_generation = event.generation;
    event.status = to;
    event.generation += 1;

    Ok(Applied {
        kind: TargetKind::Event,
        id: event.id.clone(),
        name: event.title.clone(),
        action: request.action,
        change: StatusChange::Event { from, to },
        previous_generation,
        activity: None,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::seed;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 20)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn request(kind: TargetKind, id: &str, action: Action) -> ActionRequest<'_> {
        ActionRequest {
            kind,
            id,
            action,
            expected_generation: None,
            performed_by: "Super Admin",
            at: at(),
        }
    }

    fn pending_institution(directory: &Directory) -> String {
        directory
            .institutions
            .as_slice()
            .iter()
            .find(|institution| institution.status == VerificationStatus::Pending)
            .map(|institution| institution.id.clone())
            .unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let directory = seed::directory().unwrap();
        let mut events = directory.events.as_slice().to_vec();
        events.push(events[0].clone());
        let err = Collection::new(TargetKind::Event, events).unwrap_err();
        assert!(matches!(err, AdminError::DuplicateId { kind: TargetKind::Event, .. }));
    }

    #[test]
    fn verify_updates_record_and_logs_activity() {
        let mut directory = seed::directory().unwrap();
        let id = pending_institution(&directory);
        let before = directory.activity.len();

        let applied = directory
            .apply(&request(TargetKind::Institution, &id, Action::Verify))
            .unwrap();

        let institution = directory.institutions.get(&id).unwrap();
        assert_eq!(institution.status, VerificationStatus::Verified);
        assert_eq!(institution.generation, applied.previous_generation + 1);
        assert_eq!(institution.verified_at, Some(at().date()));
        assert_eq!(directory.activity.len(), before + 1);
        assert_eq!(directory.activity[0].action, "Institution verified");
        assert_eq!(directory.activity[0].entity_id, id);
    }

    #[test]
    fn invalid_transition_leaves_record_untouched() {
        let mut directory = seed::directory().unwrap();
        let id = pending_institution(&directory);
        let before = directory.institutions.get(&id).unwrap().clone();
        let activity = directory.activity.len();

        let err = directory
            .apply(&request(TargetKind::Institution, &id, Action::Activate))
            .unwrap_err();

        assert!(matches!(err, AdminError::InvalidTransition { .. }));
        assert_eq!(directory.institutions.get(&id).unwrap(), &before);
        assert_eq!(directory.activity.len(), activity);
    }

    #[test]
    fn stale_generation_is_rejected() {
        let mut directory = seed::directory().unwrap();
        let id = pending_institution(&directory);
        let mut stale = request(TargetKind::Institution, &id, Action::Verify);
        stale.expected_generation = Some(7);

        let err = directory.apply(&stale).unwrap_err();
        assert!(matches!(err, AdminError::StaleGeneration { expected: 7, actual: 0, .. }));
        assert_eq!(
            directory.institutions.get(&id).unwrap().status,
            VerificationStatus::Pending
        );
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut directory = seed::directory().unwrap();
        let err = directory
            .apply(&request(TargetKind::Student, "missing", Action::Verify))
            .unwrap_err();
        assert_eq!(
            err,
            AdminError::NotFound {
                kind: TargetKind::Student,
                id: "missing".to_string(),
            }
        );
    }

    #[test]
    fn cancelling_an_event_rewrites_its_status() {
        let mut directory = seed::directory().unwrap();
        let applied = directory
            .apply(&request(TargetKind::Event, "1", Action::Cancel))
            .unwrap();
        assert_eq!(
            applied.change,
            StatusChange::Event {
                from: EventStatus::Upcoming,
                to: EventStatus::Cancelled,
            }
        );
        assert_eq!(directory.events.get("1").unwrap().status, EventStatus::Cancelled);
        assert!(applied.activity.is_none());

        let again = directory.apply(&request(TargetKind::Event, "1", Action::Cancel));
        assert!(again.is_err());
    }

    #[test]
    fn user_block_and_unblock_round_trip() {
        let mut directory = seed::directory().unwrap();
        let id = directory
            .users
            .as_slice()
            .iter()
            .find(|user| user.status == VerificationStatus::Verified)
            .map(|user| user.id.clone())
            .unwrap();

        directory.apply(&request(TargetKind::User, &id, Action::Suspend)).unwrap();
        assert_eq!(directory.activity[0].action, "User blocked");
        directory.apply(&request(TargetKind::User, &id, Action::Activate)).unwrap();
        assert_eq!(directory.activity[0].action, "User unblocked");

        let user = directory.users.get(&id).unwrap();
        assert_eq!(user.status, VerificationStatus::Verified);
        assert_eq!(user.generation, 2);
    }

    #[test]
    fn seed_references_resolve() {
        let directory = seed::directory().unwrap();
        assert!(directory.dangling_references().is_empty());
    }

    #[test]
    fn recent_activity_is_newest_first_and_bounded() {
        let directory = seed::directory().unwrap();
        let recent = directory.recent_activity(5);
        assert_eq!(recent.len(), 5);
        assert!(recent.windows(2).all(|pair| pair[0].timestamp >= pair[1].timestamp));
        assert_eq!(directory.recent_activity(500).len(), directory.activity.len());
    }

    #[test]
    fn unresolved_event_institution_is_dangling() {
        let seeded = seed::directory().unwrap();
        let mut events = seeded.events.as_slice().to_vec();
        events[0].institution_id = Some("404".to_string());
        let directory = Directory::new(
            seeded.institutions.as_slice().to_vec(),
            seeded.students.as_slice().to_vec(),
            seeded.counselors.as_slice().to_vec(),
            seeded.users.as_slice().to_vec(),
            events,
            seeded.activity.clone(),
        )
        .unwrap();

        assert_eq!(directory.dangling_references(), vec![(TargetKind::Event, "1")]);
    }
}
