use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::badge::Classify;
use crate::models::{
    ActivityLog, ChartDatum, DashboardStats, EventStats, EventStatus, VerificationStatus,
};
use crate::store::Directory;

/// Everything the overview screen shows, computed from one directory snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub stats: DashboardStats,
    pub verification: Vec<ChartDatum>,
    pub onboarding: Vec<ChartDatum>,
    pub growth: Vec<ChartDatum>,
    pub events: EventStats,
    pub recent_activity: Vec<ActivityLog>,
}

pub fn overview(directory: &Directory, recent: usize) -> Overview {
    Overview {
        stats: stats(directory),
        verification: verification_breakdown(directory),
        onboarding: institution_onboarding(directory),
        growth: user_growth(directory),
        events: event_stats(directory),
        recent_activity: directory.recent_activity(recent).to_vec(),
    }
}

fn account_statuses(directory: &Directory) -> impl Iterator<Item = VerificationStatus> + '_ {
    let institutions = directory.institutions.as_slice().iter().map(|r| r.status);
    let students = directory.students.as_slice().iter().map(|r| r.status);
    let counselors = directory.counselors.as_slice().iter().map(|r| r.status);
    institutions.chain(students).chain(counselors)
}

pub fn stats(directory: &Directory) -> DashboardStats {
    let mut stats = DashboardStats {
        total_institutions: directory.institutions.len(),
        total_students: directory.students.len(),
        total_counselors: directory.counselors.len(),
        ..DashboardStats::default()
    };

    for status in account_statuses(directory) {
        match status {
            VerificationStatus::Pending => stats.pending_verifications += 1,
            VerificationStatus::Verified => stats.verified_accounts += 1,
            VerificationStatus::Rejected => stats.rejected_accounts += 1,
            VerificationStatus::Suspended => {}
        }
    }

    stats
}

/// Pie series over institutions, students and counselors, one slice per status.
pub fn verification_breakdown(directory: &Directory) -> Vec<ChartDatum> {
    let order = [
        VerificationStatus::Verified,
        VerificationStatus::Pending,
        VerificationStatus::Rejected,
        VerificationStatus::Suspended,
    ];
    order
        .iter()
        .map(|status| {
            let count = account_statuses(directory).filter(|s| s == status).count();
            ChartDatum::single(status.badge().label, count as i64)
        })
        .collect()
}

fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

fn month_label((year, month): (i32, u32)) -> String {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first| first.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("{year}-{month:02}"))
}

/// Institutions registered per calendar month, oldest month first.
pub fn institution_onboarding(directory: &Directory) -> Vec<ChartDatum> {
    let mut months: BTreeMap<(i32, u32), i64> = BTreeMap::new();
    for institution in directory.institutions.as_slice() {
        *months.entry(month_key(institution.created_at)).or_insert(0) += 1;
    }
    months
        .into_iter()
        .map(|(month, count)| ChartDatum::single(month_label(month), count))
        .collect()
}

/// Running totals of registered students and counselors at the end of each
/// month that saw a registration.
pub fn user_growth(directory: &Directory) -> Vec<ChartDatum> {
    let mut months: BTreeMap<(i32, u32), (i64, i64)> = BTreeMap::new();
    for student in directory.students.as_slice() {
        months.entry(month_key(student.created_at)).or_default().0 += 1;
    }
    for counselor in directory.counselors.as_slice() {
        months.entry(month_key(counselor.created_at)).or_default().1 += 1;
    }

    let (mut students, mut counselors) = (0, 0);
    months
        .into_iter()
        .map(|(month, (new_students, new_counselors))| {
            students += new_students;
            counselors += new_counselors;
            ChartDatum {
                name: month_label(month),
                series: vec![
                    ("students".to_string(), students),
                    ("counselors".to_string(), counselors),
                ],
            }
        })
        .collect()
}

pub fn event_stats(directory: &Directory) -> EventStats {
    let events = directory.events.as_slice();
    let count = |status: EventStatus| events.iter().filter(|e| e.status == status).count();
    EventStats {
        total: events.len(),
        upcoming: count(EventStatus::Upcoming),
        ongoing: count(EventStatus::Ongoing),
        completed: count(EventStatus::Completed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    #[test]
    fn stats_count_every_verifiable_account() {
        let directory = seed::directory().unwrap();
        let stats = stats(&directory);
        assert_eq!(stats.total_institutions, 7);
        assert_eq!(stats.total_students, 7);
        assert_eq!(stats.total_counselors, 5);
        // 2 institutions + 2 students + 2 counselors
        assert_eq!(stats.pending_verifications, 6);
        assert_eq!(stats.verified_accounts, 3 + 3 + 2);
        assert_eq!(stats.rejected_accounts, 1 + 1 + 1);
    }

    #[test]
    fn breakdown_slices_sum_to_account_total() {
        let directory = seed::directory().unwrap();
        let total: i64 = verification_breakdown(&directory)
            .iter()
            .filter_map(|datum| datum.value("value"))
            .sum();
        assert_eq!(total, 7 + 7 + 5);
        assert_eq!(verification_breakdown(&directory)[0].name, "Verified");
    }

    #[test]
    fn onboarding_is_chronological() {
        let directory = seed::directory().unwrap();
        let onboarding = institution_onboarding(&directory);
        assert_eq!(onboarding.first().unwrap().name, "Jun 2025");
        assert_eq!(onboarding.last().unwrap().name, "Jan 2026");
        let total: i64 = onboarding.iter().filter_map(|d| d.value("value")).sum();
        assert_eq!(total, 7);
    }

    #[test]
    fn growth_totals_are_running_sums() {
        let directory = seed::directory().unwrap();
        let growth = user_growth(&directory);
        let students: Vec<i64> = growth.iter().filter_map(|d| d.value("students")).collect();
        assert!(students.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(*students.last().unwrap(), 7);
        assert_eq!(growth.last().unwrap().value("counselors"), Some(5));
    }

    #[test]
    fn event_stats_follow_statuses() {
        let directory = seed::directory().unwrap();
        assert_eq!(
            event_stats(&directory),
            EventStats {
                total: 5,
                upcoming: 2,
                ongoing: 1,
                completed: 1,
            }
        );
    }
}
