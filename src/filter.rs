use chrono::NaiveDate;

use crate::models::{
    Counselor, Event, EventStatus, EventType, Institution, InstitutionLookup, Student, User,
    UserRole, Verifiable, VerificationStatus,
};

/// A filter bound to one enum-valued field: either inactive or one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<T> {
    All,
    Only(T),
}

impl<T> Default for Selector<T> {
    fn default() -> Self {
        Selector::All
    }
}

impl<T: PartialEq> Selector<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }
}

impl<T> From<Option<T>> for Selector<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Selector::All, Selector::Only)
    }
}

/// Free-text query, normalised to lowercase once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    needle: String,
}

impl Query {
    pub fn new(raw: &str) -> Self {
        Query {
            needle: raw.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    /// True when the query is empty or any present field contains it.
    pub fn matches_any<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        if self.is_empty() {
            return true;
        }
        fields
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }
}

/// The fixed list of string fields the text query examines for a record type.
pub trait Searchable {
    fn search_fields<'a>(&'a self, lookup: &'a dyn InstitutionLookup) -> Vec<Option<&'a str>>;
}

impl Searchable for Institution {
    fn search_fields<'a>(&'a self, _lookup: &'a dyn InstitutionLookup) -> Vec<Option<&'a str>> {
        vec![Some(self.name.as_str()), Some(self.email.as_str())]
    }
}

impl Searchable for Student {
    fn search_fields<'a>(&'a self, lookup: &'a dyn InstitutionLookup) -> Vec<Option<&'a str>> {
        vec![
            Some(self.name.as_str()),
            Some(self.email.as_str()),
            lookup.institution_name(&self.institution_id),
        ]
    }
}

impl Searchable for Counselor {
    fn search_fields<'a>(&'a self, lookup: &'a dyn InstitutionLookup) -> Vec<Option<&'a str>> {
        vec![
            Some(self.name.as_str()),
            Some(self.email.as_str()),
            lookup.institution_name(&self.institution_id),
            self.specialization.as_deref(),
        ]
    }
}

impl Searchable for User {
    fn search_fields<'a>(&'a self, _lookup: &'a dyn InstitutionLookup) -> Vec<Option<&'a str>> {
        vec![Some(self.name.as_str()), Some(self.email.as_str())]
    }
}

impl Searchable for Event {
    fn search_fields<'a>(&'a self, _lookup: &'a dyn InstitutionLookup) -> Vec<Option<&'a str>> {
        vec![
            Some(self.title.as_str()),
            Some(self.organizer.as_str()),
            Some(self.location.as_str()),
        ]
    }
}

pub trait RecordFilter<T> {
    fn matches(&self, record: &T, lookup: &dyn InstitutionLookup) -> bool;
}

/// Query plus status selector, used by the institution, student and
/// counselor lists.
#[derive(Debug, Clone, Default)]
pub struct StatusFilter {
    pub query: Query,
    pub status: Selector<VerificationStatus>,
}

impl<T: Searchable + Verifiable> RecordFilter<T> for StatusFilter {
    fn matches(&self, record: &T, lookup: &dyn InstitutionLookup) -> bool {
        self.query.matches_any(record.search_fields(lookup))
            && self.status.matches(&record.status())
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub query: Query,
    pub status: Selector<VerificationStatus>,
    pub role: Selector<UserRole>,
}

impl RecordFilter<User> for UserFilter {
    fn matches(&self, record: &User, lookup: &dyn InstitutionLookup) -> bool {
        self.query.matches_any(record.search_fields(lookup))
            && self.status.matches(&record.status)
            && self.role.matches(&record.role)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    pub query: Query,
    pub status: Selector<EventStatus>,
    pub event_type: Selector<EventType>,
}

impl RecordFilter<Event> for EventFilter {
    fn matches(&self, record: &Event, lookup: &dyn InstitutionLookup) -> bool {
        self.query.matches_any(record.search_fields(lookup))
            && self.status.matches(&record.status)
            && self.event_type.matches(&record.event_type)
    }
}

/// Keeps the records passing `filter`, in their stored order.
pub fn apply<'r, T, F>(records: &'r [T], filter: &F, lookup: &dyn InstitutionLookup) -> Vec<&'r T>
where
    F: RecordFilter<T>,
{
    records
        .iter()
        .filter(|record| filter.matches(record, lookup))
        .collect()
}

/// Calendar day view: events dated exactly `day`.
pub fn events_on(events: &[Event], day: NaiveDate) -> Vec<&Event> {
    events.iter().filter(|event| event.date == day).collect()
}

/// Rows for the events list. With a day selected the list is the calendar
/// day view and the query, status and type filters do not apply.
pub fn event_listing<'r>(
    events: &'r [Event],
    filter: &EventFilter,
    day: Option<NaiveDate>,
    lookup: &dyn InstitutionLookup,
) -> Vec<&'r Event> {
    match day {
        Some(day) => events_on(events, day),
        None => apply(events, filter, lookup),
    }
}

/// Distinct days that carry at least one event, ascending.
pub fn event_dates(events: &[Event]) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = events.iter().map(|event| event.date).collect();
    dates.sort();
    dates.dedup();
    dates
}
