use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::models::{
    ActivityLog, Counselor, EntityKind, Event, EventStatus, EventType, Institution, Student,
    User, UserRole, VerificationStatus,
};
use crate::store::Directory;

fn day(year: i32, month: u32, day: u32) -> anyhow::Result<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).context("invalid seed date")
}

fn moment(date: NaiveDate, hour: u32, minute: u32) -> anyhow::Result<NaiveDateTime> {
    date.and_hms_opt(hour, minute, 0).context("invalid seed time")
}

/// The built-in directory used when no database is configured and by `seed`.
pub fn directory() -> anyhow::Result<Directory> {
    Ok(Directory::new(
        institutions()?,
        students()?,
        counselors()?,
        users()?,
        events()?,
        activity()?,
    )?)
}

pub fn institutions() -> anyhow::Result<Vec<Institution>> {
    use VerificationStatus::*;

    let rows = [
        ("1", "Harvard University", "admissions@harvard.edu", "+1 617 495 1000",
         "Massachusetts Hall, Cambridge, MA", "Dr. Emily Carter", Verified, 1240, 38,
         day(2025, 6, 12)?, Some(day(2025, 6, 20)?)),
        ("2", "MIT", "registrar@mit.edu", "+1 617 253 1000",
         "77 Massachusetts Ave, Cambridge, MA", "Prof. Daniel Kim", Verified, 980, 29,
         day(2025, 7, 3)?, Some(day(2025, 7, 9)?)),
        ("3", "Stanford University", "office@stanford.edu", "+1 650 723 2300",
         "450 Serra Mall, Stanford, CA", "Dr. Maria Lopez", Verified, 1105, 41,
         day(2025, 8, 18)?, Some(day(2025, 8, 25)?)),
        ("4", "Yale University", "admin@yale.edu", "+1 203 432 4771",
         "New Haven, CT", "Dr. Robert Hughes", Pending, 0, 0,
         day(2025, 12, 2)?, None),
        ("5", "Riverside Community College", "contact@rcc.edu", "+1 951 222 8000",
         "4800 Magnolia Ave, Riverside, CA", "Angela Brooks", Pending, 0, 0,
         day(2026, 1, 8)?, None),
        ("6", "Lakeview Technical Institute", "info@lakeviewtech.edu", "+1 312 555 0142",
         "220 Shore Dr, Chicago, IL", "Marcus Bell", Rejected, 0, 0,
         day(2025, 10, 27)?, None),
        ("7", "Northgate Academy", "office@northgate.edu", "+1 206 555 0190",
         "15 Summit Rd, Seattle, WA", "Priya Nair", Suspended, 312, 9,
         day(2025, 9, 14)?, Some(day(2025, 9, 22)?)),
    ];

    Ok(rows
        .into_iter()
        .map(
            |(id, name, email, phone, address, admin, status, students, counselors, created, verified)| {
                Institution {
                    id: id.to_string(),
                    name: name.to_string(),
                    email: email.to_string(),
                    phone: phone.to_string(),
                    address: address.to_string(),
                    admin_name: admin.to_string(),
                    status,
                    total_students: students,
                    total_counselors: counselors,
                    created_at: created,
                    verified_at: verified,
                    generation: 0,
                }
            },
        )
        .collect())
}

pub fn students() -> anyhow::Result<Vec<Student>> {
    use VerificationStatus::*;

    let rows = [
        ("1", "Avery Lee", "avery.lee@harvard.edu", "1", Verified, Some("HU-2025-0142"), day(2025, 9, 2)?),
        ("2", "Jules Moreno", "jules.moreno@mit.edu", "2", Pending, Some("MIT-25-3310"), day(2026, 1, 4)?),
        ("3", "Kiara Patel", "kiara.patel@stanford.edu", "3", Verified, Some("SU-88213"), day(2025, 9, 19)?),
        ("4", "Noah Williams", "noah.w@harvard.edu", "1", Rejected, None, day(2025, 11, 11)?),
        ("5", "Sofia Alvarez", "sofia.alvarez@mit.edu", "2", Pending, None, day(2026, 1, 9)?),
        ("6", "Ethan Brooks", "ethan.brooks@northgate.edu", "7", Suspended, Some("NGA-0031"), day(2025, 10, 1)?),
        ("7", "Mei Tanaka", "mei.tanaka@stanford.edu", "3", Verified, Some("SU-90112"), day(2025, 12, 15)?),
    ];

    Ok(rows
        .into_iter()
        .map(|(id, name, email, institution, status, enrollment, created)| Student {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            institution_id: institution.to_string(),
            status,
            enrollment_number: enrollment.map(str::to_string),
            created_at: created,
            verified_at: (status == Verified).then_some(created),
            generation: 0,
        })
        .collect())
}

pub fn counselors() -> anyhow::Result<Vec<Counselor>> {
    use VerificationStatus::*;

    let rows = [
        ("1", "Dr. Sarah Johnson", "sarah.johnson@harvard.edu", "1", Verified,
         Some("PhD Counseling Psychology"), Some("Career Guidance"), day(2025, 7, 1)?),
        ("2", "Michael Chen", "m.chen@mit.edu", "2", Pending,
         Some("M.Ed. School Counseling"), Some("STEM Advising"), day(2026, 1, 6)?),
        ("3", "Laura Bennett", "laura.bennett@stanford.edu", "3", Verified,
         Some("LPC"), Some("Mental Health"), day(2025, 8, 30)?),
        ("4", "James Okafor", "james.okafor@harvard.edu", "1", Pending,
         None, None, day(2026, 1, 11)?),
        ("5", "Hannah Schultz", "h.schultz@stanford.edu", "3", Rejected,
         Some("BA Psychology"), Some("College Admissions"), day(2025, 11, 20)?),
    ];

    Ok(rows
        .into_iter()
        .map(|(id, name, email, institution, status, credentials, specialization, created)| Counselor {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            institution_id: institution.to_string(),
            status,
            credentials: credentials.map(str::to_string),
            specialization: specialization.map(str::to_string),
            created_at: created,
            verified_at: (status == Verified).then_some(created),
            generation: 0,
        })
        .collect())
}

pub fn users() -> anyhow::Result<Vec<User>> {
    use VerificationStatus::*;

    let last_login = |date: anyhow::Result<NaiveDate>, hour| -> anyhow::Result<Option<NaiveDateTime>> {
        Ok(Some(moment(date?, hour, 15)?))
    };

    let rows = [
        ("1", "Super Admin", "admin@groupscholar.com", UserRole::SuperAdmin, Verified,
         day(2025, 5, 1)?, last_login(day(2026, 1, 19), 8)?),
        ("2", "Dr. Emily Carter", "emily.carter@harvard.edu", UserRole::InstitutionAdmin, Verified,
         day(2025, 6, 12)?, last_login(day(2026, 1, 18), 14)?),
        ("3", "Avery Lee", "avery.lee@harvard.edu", UserRole::Student, Verified,
         day(2025, 9, 2)?, last_login(day(2026, 1, 17), 19)?),
        ("4", "Jules Moreno", "jules.moreno@mit.edu", UserRole::Student, Pending,
         day(2026, 1, 4)?, None),
        ("5", "Laura Bennett", "laura.bennett@stanford.edu", UserRole::Counselor, Verified,
         day(2025, 8, 30)?, last_login(day(2026, 1, 16), 10)?),
        ("6", "Ethan Brooks", "ethan.brooks@northgate.edu", UserRole::Student, Suspended,
         day(2025, 10, 1)?, last_login(day(2025, 12, 3), 21)?),
        ("7", "Priya Nair", "priya.nair@northgate.edu", UserRole::InstitutionAdmin, Suspended,
         day(2025, 9, 14)?, last_login(day(2025, 12, 1), 9)?),
    ];

    Ok(rows
        .into_iter()
        .map(|(id, name, email, role, status, created, login)| User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            status,
            created_at: created,
            last_login: login,
            generation: 0,
        })
        .collect())
}

pub fn events() -> anyhow::Result<Vec<Event>> {
    use EventStatus::*;
    use EventType::*;

    let rows = [
        ("1", "Career Counseling Workshop", "Interactive workshop on career planning and guidance",
         Workshop, Upcoming, day(2026, 1, 15)?, "10:00 AM", "Virtual - Zoom",
         "Dr. Sarah Johnson", 45, 100, Some("1")),
        ("2", "University Orientation Program", "Welcome session for new students",
         Orientation, Ongoing, day(2026, 1, 5)?, "9:00 AM", "Main Auditorium",
         "Admin Office", 250, 300, Some("2")),
        ("3", "EdTech Conference 2026", "Annual conference on educational technology trends",
         Conference, Upcoming, day(2026, 2, 20)?, "8:00 AM", "Convention Center, Boston",
         "Group Scholar", 500, 1000, None),
        ("4", "Student Mental Health Webinar", "Webinar focusing on student wellness and mental health",
         Webinar, Completed, day(2025, 12, 28)?, "2:00 PM", "Virtual - Google Meet",
         "Counseling Dept", 180, 200, Some("3")),
        ("5", "Research Methodology Seminar", "Advanced research techniques for graduate students",
         Seminar, Cancelled, day(2026, 1, 10)?, "3:00 PM", "Room 301, Science Building",
         "Prof. Michael Chen", 0, 50, Some("4")),
    ];

    Ok(rows
        .into_iter()
        .map(
            |(id, title, description, event_type, status, date, time, location, organizer, attendees, max, institution)| {
                Event {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    event_type,
                    status,
                    date,
                    time: time.to_string(),
                    location: location.to_string(),
                    organizer: organizer.to_string(),
                    attendees,
                    max_attendees: max,
                    institution_id: institution.map(str::to_string),
                    generation: 0,
                }
            },
        )
        .collect())
}

pub fn activity() -> anyhow::Result<Vec<ActivityLog>> {
    let rows = [
        ("3d7f5d6f-24f7-4e8e-8b4b-3e7e44b4a7b2", "Institution verified", EntityKind::Institution, "3",
         "Stanford University", moment(day(2025, 8, 25)?, 11, 5)?, None),
        ("0c22f1f1-9184-4fd4-9b21-28c68a6a89dc", "Institution suspended", EntityKind::Institution, "7",
         "Northgate Academy", moment(day(2025, 12, 1)?, 16, 40)?, Some("Expired accreditation documents")),
        ("d5a0a1a2-2a3c-44c2-8f73-60b7897a9dd2", "Student verified", EntityKind::Student, "7",
         "Mei Tanaka", moment(day(2025, 12, 15)?, 9, 12)?, None),
        ("8f1c2b3a-4d5e-4f60-8a7b-9c0d1e2f3a4b", "Counselor rejected", EntityKind::Counselor, "5",
         "Hannah Schultz", moment(day(2025, 11, 22)?, 13, 30)?, Some("Credentials could not be confirmed")),
        ("1a2b3c4d-5e6f-4a7b-8c9d-0e1f2a3b4c5d", "User blocked", EntityKind::User, "6",
         "Ethan Brooks", moment(day(2025, 12, 3)?, 22, 2)?, None),
        ("6e5d4c3b-2a19-4f8e-9d7c-6b5a4f3e2d1c", "Institution rejected", EntityKind::Institution, "6",
         "Lakeview Technical Institute", moment(day(2025, 10, 30)?, 10, 0)?, Some("Incomplete registration")),
        ("9b8a7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c6d", "Student rejected", EntityKind::Student, "4",
         "Noah Williams", moment(day(2025, 11, 12)?, 15, 45)?, None),
    ];

    rows.into_iter()
        .map(|(id, action, kind, entity_id, entity_name, timestamp, details)| -> anyhow::Result<ActivityLog> {
            Ok(ActivityLog {
                id: Uuid::parse_str(id)?,
                action: action.to_string(),
                entity_kind: kind,
                entity_id: entity_id.to_string(),
                entity_name: entity_name.to_string(),
                performed_by: "Super Admin".to_string(),
                timestamp,
                details: details.map(str::to_string),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{self, Query, StatusFilter};

    #[test]
    fn seed_builds_a_consistent_directory() {
        let directory = directory().unwrap();
        assert_eq!(directory.institutions.len(), 7);
        assert_eq!(directory.events.len(), 5);
        assert!(directory.dangling_references().is_empty());
    }

    #[test]
    fn counselor_search_reaches_specialization() {
        let directory = directory().unwrap();
        let filter = StatusFilter {
            query: Query::new("stem"),
            ..StatusFilter::default()
        };
        let kept = filter::apply(directory.counselors.as_slice(), &filter, &directory);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "Michael Chen");
    }
}
