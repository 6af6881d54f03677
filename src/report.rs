use std::fmt::Write;

use chrono::NaiveDate;

use crate::dashboard;
use crate::filter::{self, EventFilter, Query, Selector, StatusFilter};
use crate::models::{EventStatus, VerificationStatus};
use crate::store::Directory;
use crate::table::Table;
use crate::views;

fn pending() -> StatusFilter {
    StatusFilter {
        query: Query::default(),
        status: Selector::Only(VerificationStatus::Pending),
    }
}

pub fn build_report(directory: &Directory, generated_on: NaiveDate) -> String {
    let overview = dashboard::overview(directory, 5);
    let stats = &overview.stats;

    let mut output = String::new();
    let _ = writeln!(output, "# Platform Verification Report");
    let _ = writeln!(output, "Generated on {generated_on}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Institutions: {}", stats.total_institutions);
    let _ = writeln!(output, "- Students: {}", stats.total_students);
    let _ = writeln!(output, "- Counselors: {}", stats.total_counselors);
    let _ = writeln!(output, "- Pending verifications: {}", stats.pending_verifications);
    let _ = writeln!(output, "- Verified accounts: {}", stats.verified_accounts);
    let _ = writeln!(output, "- Rejected accounts: {}", stats.rejected_accounts);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Verification Status");
    for datum in &overview.verification {
        let _ = writeln!(output, "- {}: {}", datum.name, datum.value("value").unwrap_or(0));
    }

    let institutions = filter::apply(directory.institutions.as_slice(), &pending(), directory);
    let students = filter::apply(directory.students.as_slice(), &pending(), directory);
    let counselors = filter::apply(directory.counselors.as_slice(), &pending(), directory);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Pending Review");
    if institutions.is_empty() && students.is_empty() && counselors.is_empty() {
        let _ = writeln!(output, "Nothing is waiting for review.");
    } else {
        if !institutions.is_empty() {
            let _ = writeln!(output, "### Institutions");
            let table = Table::new(views::institution_columns());
            let _ = write!(output, "{}", table.project(institutions).to_markdown());
        }
        if !students.is_empty() {
            let _ = writeln!(output, "### Students");
            let table = Table::new(views::student_columns(directory));
            let _ = write!(output, "{}", table.project(students).to_markdown());
        }
        if !counselors.is_empty() {
            let _ = writeln!(output, "### Counselors");
            let table = Table::new(views::counselor_columns(directory));
            let _ = write!(output, "{}", table.project(counselors).to_markdown());
        }
    }

    let upcoming = EventFilter {
        status: Selector::Only(EventStatus::Upcoming),
        ..EventFilter::default()
    };
    let events = filter::apply(directory.events.as_slice(), &upcoming, directory);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Upcoming Events");
    if events.is_empty() {
        let _ = writeln!(output, "No upcoming events.");
    } else {
        for event in events {
            let _ = writeln!(
                output,
                "- {} on {} at {} ({} of {} seats taken)",
                event.title, event.date, event.location, event.attendees, event.max_attendees
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    if overview.recent_activity.is_empty() {
        let _ = writeln!(output, "No activity recorded.");
    } else {
        for entry in &overview.recent_activity {
            let _ = writeln!(
                output,
                "- {} {}: {} by {}",
                entry.timestamp.format("%Y-%m-%d %H:%M"),
                entry.action,
                entry.entity_name,
                entry.performed_by
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn report() -> String {
        let directory = seed::directory().unwrap();
        build_report(&directory, NaiveDate::from_ymd_opt(2026, 1, 20).unwrap())
    }

    #[test]
    fn report_has_every_section() {
        let report = report();
        for heading in [
            "# Platform Verification Report",
            "## Overview",
            "## Verification Status",
            "## Pending Review",
            "## Upcoming Events",
            "## Recent Activity",
        ] {
            assert!(report.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn pending_review_lists_only_pending_records() {
        let report = report();
        assert!(report.contains("Yale University"));
        assert!(report.contains("Riverside Community College"));
        assert!(report.contains("Jules Moreno"));
        assert!(!report.contains("Lakeview Technical Institute"));
    }

    #[test]
    fn upcoming_events_exclude_other_statuses() {
        let report = report();
        assert!(report.contains("- Career Counseling Workshop on 2026-01-15"));
        assert!(!report.contains("Research Methodology Seminar on"));
    }
}
