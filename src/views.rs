use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::badge::Classify;
use crate::models::{Counselor, Event, Institution, InstitutionLookup, Student, User};
use crate::table::{Column, PLACEHOLDER};
use crate::transition::{self, Action, TargetKind};

/// Label/value pairs shown when a row is opened.
pub type Detail = Vec<(&'static str, String)>;

fn actions_cell(actions: Vec<Action>) -> Option<String> {
    if actions.is_empty() {
        return None;
    }
    Some(
        actions
            .iter()
            .map(|action| action.as_str())
            .collect::<Vec<_>>()
            .join(", "),
    )
}

fn resolve(lookup: &dyn InstitutionLookup, id: &str) -> String {
    lookup
        .institution_name(id)
        .unwrap_or(PLACEHOLDER)
        .to_string()
}

pub fn institution_columns<'a>() -> Vec<Column<'a, Institution>> {
    vec![
        Column::text("id", "ID", |i: &Institution| i.id.clone()),
        Column::text("name", "Institution", |i: &Institution| {
            format!("{} <{}>", i.name, i.email)
        }),
        Column::text("admin_name", "Admin", |i: &Institution| i.admin_name.clone()),
        Column::text("stats", "Statistics", |i: &Institution| {
            format!("{} students / {} counselors", i.total_students, i.total_counselors)
        }),
        Column::text("status", "Status", |i: &Institution| i.status.badge().label.to_string()),
        Column::text("created_at", "Registered", |i: &Institution| i.created_at.to_string()),
        Column::new("actions", "Actions", |i: &Institution| {
            actions_cell(transition::verification_actions(TargetKind::Institution, i.status))
        }),
    ]
}

pub fn institution_detail(institution: &Institution) -> Detail {
    vec![
        ("Name", institution.name.clone()),
        ("Email", institution.email.clone()),
        ("Phone", institution.phone.clone()),
        ("Address", institution.address.clone()),
        ("Admin", institution.admin_name.clone()),
        ("Status", institution.status.badge().describe()),
        ("Registered", institution.created_at.to_string()),
        (
            "Verified",
            institution
                .verified_at
                .map_or_else(|| PLACEHOLDER.to_string(), |d| d.to_string()),
        ),
        ("Total Students", institution.total_students.to_string()),
        ("Total Counselors", institution.total_counselors.to_string()),
        ("Generation", institution.generation.to_string()),
    ]
}

pub fn student_columns(lookup: &dyn InstitutionLookup) -> Vec<Column<'_, Student>> {
    vec![
        Column::text("id", "ID", |s: &Student| s.id.clone()),
        Column::text("name", "Student", |s: &Student| format!("{} <{}>", s.name, s.email)),
        Column::new("institution", "Institution", move |s: &Student| {
            lookup
                .institution_name(&s.institution_id)
                .map(str::to_string)
        }),
        Column::new("enrollment_number", "Enrollment #", |s: &Student| {
            s.enrollment_number.clone()
        }),
        Column::text("status", "Status", |s: &Student| s.status.badge().label.to_string()),
        Column::text("created_at", "Registered", |s: &Student| s.created_at.to_string()),
        Column::new("actions", "Actions", |s: &Student| {
            actions_cell(transition::verification_actions(TargetKind::Student, s.status))
        }),
    ]
}

pub fn student_detail(student: &Student, lookup: &dyn InstitutionLookup) -> Detail {
    vec![
        ("Name", student.name.clone()),
        ("Email", student.email.clone()),
        ("Institution", resolve(lookup, &student.institution_id)),
        (
            "Enrollment #",
            student
                .enrollment_number
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
        ),
        ("Status", student.status.badge().describe()),
        ("Registered", student.created_at.to_string()),
        ("Generation", student.generation.to_string()),
    ]
}

pub fn counselor_columns(lookup: &dyn InstitutionLookup) -> Vec<Column<'_, Counselor>> {
    vec![
        Column::text("id", "ID", |c: &Counselor| c.id.clone()),
        Column::text("name", "Counselor", |c: &Counselor| format!("{} <{}>", c.name, c.email)),
        Column::new("institution", "Institution", move |c: &Counselor| {
            lookup
                .institution_name(&c.institution_id)
                .map(str::to_string)
        }),
        Column::new("specialization", "Specialization", |c: &Counselor| {
            c.specialization.clone()
        }),
        Column::new("credentials", "Credentials", |c: &Counselor| c.credentials.clone()),
        Column::text("status", "Status", |c: &Counselor| c.status.badge().label.to_string()),
        Column::new("actions", "Actions", |c: &Counselor| {
            actions_cell(transition::verification_actions(TargetKind::Counselor, c.status))
        }),
    ]
}

pub fn counselor_detail(counselor: &Counselor, lookup: &dyn InstitutionLookup) -> Detail {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| PLACEHOLDER.to_string());
    vec![
        ("Name", counselor.name.clone()),
        ("Email", counselor.email.clone()),
        ("Institution", resolve(lookup, &counselor.institution_id)),
        ("Specialization", optional(&counselor.specialization)),
        ("Credentials", optional(&counselor.credentials)),
        ("Status", counselor.status.badge().describe()),
        ("Registered", counselor.created_at.to_string()),
        ("Generation", counselor.generation.to_string()),
    ]
}

pub fn user_columns<'a>() -> Vec<Column<'a, User>> {
    vec![
        Column::text("id", "ID", |u: &User| u.id.clone()),
        Column::text("name", "User", |u: &User| format!("{} <{}>", u.name, u.email)),
        Column::text("role", "Role", |u: &User| u.role.badge().label.to_string()),
        Column::text("status", "Status", |u: &User| u.status.badge().label.to_string()),
        Column::new("last_login", "Last Login", |u: &User| {
            u.last_login.map(|at| at.format("%Y-%m-%d %H:%M").to_string())
        }),
        Column::text("created_at", "Joined", |u: &User| u.created_at.to_string()),
        Column::new("actions", "Actions", |u: &User| {
            actions_cell(transition::verification_actions(TargetKind::User, u.status))
        }),
    ]
}

pub fn user_detail(user: &User) -> Detail {
    vec![
        ("Name", user.name.clone()),
        ("Email", user.email.clone()),
        ("Role", user.role.badge().describe()),
        ("Status", user.status.badge().describe()),
        (
            "Last Login",
            user.last_login
                .map_or_else(|| PLACEHOLDER.to_string(), |at| at.to_string()),
        ),
        ("Joined", user.created_at.to_string()),
        ("Generation", user.generation.to_string()),
    ]
}

pub fn event_columns(lookup: &dyn InstitutionLookup) -> Vec<Column<'_, Event>> {
    vec![
        Column::text("id", "ID", |e: &Event| e.id.clone()),
        Column::text("title", "Event", |e: &Event| e.title.clone()),
        Column::text("type", "Type", |e: &Event| e.event_type.badge().label.to_string()),
        Column::text("date", "Date", |e: &Event| format!("{} {}", e.date, e.time)),
        Column::text("location", "Location", |e: &Event| e.location.clone()),
        Column::text("attendees", "Attendees", |e: &Event| {
            format!("{}/{}", e.attendees, e.max_attendees)
        }),
        Column::text("status", "Status", |e: &Event| e.status.badge().label.to_string()),
        Column::new("institution", "Institution", move |e: &Event| {
            e.institution_id
                .as_deref()
                .and_then(|id| lookup.institution_name(id))
                .map(str::to_string)
        }),
        Column::new("actions", "Actions", |e: &Event| {
            actions_cell(transition::event_actions(e.status))
        }),
    ]
}

pub fn event_detail(event: &Event, lookup: &dyn InstitutionLookup) -> Detail {
    vec![
        ("Title", event.title.clone()),
        ("Description", event.description.clone()),
        ("Type", event.event_type.badge().describe()),
        ("Status", event.status.badge().describe()),
        ("Date", event.date.to_string()),
        ("Time", event.time.clone()),
        ("Location", event.location.clone()),
        ("Organizer", event.organizer.clone()),
        ("Attendees", format!("{} of {}", event.attendees, event.max_attendees)),
        (
            "Institution",
            event
                .institution_id
                .as_deref()
                .map_or_else(|| PLACEHOLDER.to_string(), |id| resolve(lookup, id)),
        ),
        ("Generation", event.generation.to_string()),
    ]
}

pub fn format_detail(detail: &Detail) -> String {
    let width = detail.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    detail
        .iter()
        .map(|(label, value)| format!("{label:>width$}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

struct DetailObject<'d>(&'d Detail);

impl Serialize for DetailObject<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

/// The detail block as a JSON object whose keys keep the block's order.
pub fn detail_json(detail: &Detail) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DetailObject(detail))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{self, Query, StatusFilter};
    use crate::seed;
    use crate::table::Table;

    #[test]
    fn student_table_resolves_institution_names() {
        let directory = seed::directory().unwrap();
        let table = Table::new(student_columns(&directory));
        let rendered = table.project(directory.students.as_slice());
        assert_eq!(rendered.headers[2], "Institution");
        assert_eq!(rendered.rows[0].cells[2], "Harvard University");
        assert_eq!(rendered.rows.len(), directory.students.len());
    }

    #[test]
    fn unresolved_institution_renders_placeholder() {
        let directory = seed::directory().unwrap();
        let mut student = directory.students.as_slice()[0].clone();
        student.institution_id = "404".to_string();
        let rendered = Table::new(student_columns(&directory)).project([&student]);
        assert_eq!(rendered.rows[0].cells[2], PLACEHOLDER);
    }

    #[test]
    fn filtered_rows_feed_the_table() {
        let directory = seed::directory().unwrap();
        let filter = StatusFilter {
            query: Query::new("university"),
            ..StatusFilter::default()
        };
        let kept = filter::apply(directory.institutions.as_slice(), &filter, &directory);
        let rendered = Table::new(institution_columns()).project(kept.iter().copied());
        assert_eq!(rendered.rows.len(), kept.len());
        let keys: Vec<&str> = rendered.rows.iter().map(|row| row.key.as_str()).collect();
        assert_eq!(keys, vec!["1", "3", "4"]);
    }

    #[test]
    fn actions_column_offers_only_valid_transitions() {
        let directory = seed::directory().unwrap();
        let rendered = Table::new(institution_columns()).project(directory.institutions.as_slice());
        let actions: Vec<&str> = rendered
            .rows
            .iter()
            .map(|row| row.cells.last().unwrap().as_str())
            .collect();
        assert_eq!(actions[0], "suspend");
        assert_eq!(actions[3], "verify, reject");
        assert_eq!(actions[5], PLACEHOLDER);
        assert_eq!(actions[6], "activate");
    }

    #[test]
    fn row_click_opens_detail() {
        let directory = seed::directory().unwrap();
        let mut opened = None;
        let mut table =
            Table::new(event_columns(&directory)).on_row_click(|event: &Event| {
                opened = Some(event_detail(event, &directory));
            });
        assert!(table.click(directory.events.as_slice(), "3"));
        drop(table);

        let detail = opened.unwrap();
        assert!(detail.contains(&("Institution", PLACEHOLDER.to_string())));
        assert!(format_detail(&detail).contains("Title: EdTech Conference 2026"));
    }

    #[test]
    fn detail_json_keeps_field_order() {
        let directory = seed::directory().unwrap();
        let detail = institution_detail(directory.institutions.get("1").unwrap());
        let json = detail_json(&detail).unwrap();

        let positions: Vec<usize> = ["\"Name\"", "\"Email\"", "\"Phone\"", "\"Address\"", "\"Admin\""]
            .iter()
            .map(|key| json.find(key).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["Name"], "Harvard University");
    }

    #[test]
    fn column_keys_are_unique_per_table() {
        let directory = seed::directory().unwrap();
        let key_sets = [
            Table::new(institution_columns()).keys(),
            Table::new(student_columns(&directory)).keys(),
            Table::new(counselor_columns(&directory)).keys(),
            Table::new(user_columns()).keys(),
            Table::new(event_columns(&directory)).keys(),
        ];
        for keys in key_sets {
            let mut unique = keys.clone();
            unique.sort();
            unique.dedup();
            assert_eq!(unique.len(), keys.len(), "{keys:?}");
            assert_eq!(keys.first().map(String::as_str), Some("id"));
        }
    }
}
