use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::employee::Employee;

/// Result of a single scan attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    NotFound,
    AlreadyMarked(Employee),
    NewlyMarked(Employee),
}

impl ScanOutcome {
    pub fn employee(&self) -> Option<&Employee> {
        match self {
            ScanOutcome::NotFound => None,
            ScanOutcome::AlreadyMarked(e) | ScanOutcome::NewlyMarked(e) => Some(e),
        }
    }

    pub fn kind(&self) -> OutcomeKind {
        match self {
            ScanOutcome::NotFound => OutcomeKind::NotFound,
            ScanOutcome::AlreadyMarked(_) => OutcomeKind::AlreadyMarked,
            ScanOutcome::NewlyMarked(_) => OutcomeKind::NewlyMarked,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    NotFound,
    AlreadyMarked,
    NewlyMarked,
}

impl OutcomeKind {
    pub fn title(&self) -> &'static str {
        match self {
            OutcomeKind::NotFound => "Employee not found",
            OutcomeKind::AlreadyMarked => "Already Marked!",
            OutcomeKind::NewlyMarked => "Attendance Marked!",
        }
    }
}

/// Wire form of a [`ScanOutcome`].
#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "status": "newly_marked",
    "title": "Attendance Marked!",
    "employee": { "id": "EMP-001", "name": "Alice", "department": "Engineering" }
}))]
pub struct ScanResponse {
    pub status: OutcomeKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee: Option<Employee>,
}

impl From<&ScanOutcome> for ScanResponse {
    fn from(outcome: &ScanOutcome) -> Self {
        let status = outcome.kind();
        Self {
            status,
            title: status.title().to_string(),
            employee: outcome.employee().cloned(),
        }
    }
}

/// Present/absent partition of the directory for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DailyRoster {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub present: Vec<Employee>,
    pub absent: Vec<Employee>,
}

impl DailyRoster {
    /// Splits `directory` by membership of each id in `present_ids`,
    /// keeping directory order within each side.
    pub fn partition<'a, I>(date: NaiveDate, directory: Vec<Employee>, present_ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let marked: std::collections::HashSet<&str> = present_ids.into_iter().collect();
        let (present, absent): (Vec<Employee>, Vec<Employee>) = directory
            .into_iter()
            .partition(|emp| marked.contains(emp.id.as_str()));
        Self {
            date,
            present,
            absent,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RosterResponse {
    #[serde(flatten)]
    pub roster: DailyRoster,
    #[schema(example = 1)]
    pub present_count: usize,
    #[schema(example = 1)]
    pub absent_count: usize,
}

impl From<DailyRoster> for RosterResponse {
    fn from(roster: DailyRoster) -> Self {
        Self {
            present_count: roster.present.len(),
            absent_count: roster.absent.len(),
            roster,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Vec<Employee> {
        vec![
            Employee::new("E1", "Alice", "Eng"),
            Employee::new("E2", "Bob", "Sales"),
            Employee::new("E3", "Carol", "Ops"),
        ]
    }

    #[test]
    fn partition_is_disjoint_and_exhaustive() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let roster = DailyRoster::partition(date, directory(), ["E3", "E1", "E9"]);

        let present: Vec<_> = roster.present.iter().map(|e| e.id.as_str()).collect();
        let absent: Vec<_> = roster.absent.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(present, ["E1", "E3"]);
        assert_eq!(absent, ["E2"]);
        assert_eq!(roster.present.len() + roster.absent.len(), directory().len());
    }

    #[test]
    fn empty_attendance_marks_everyone_absent() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let roster = DailyRoster::partition(date, directory(), std::iter::empty());
        assert!(roster.present.is_empty());
        assert_eq!(roster.absent, directory());
    }

    #[test]
    fn response_titles_follow_outcome() {
        let alice = Employee::new("E1", "Alice", "Eng");
        let resp = ScanResponse::from(&ScanOutcome::AlreadyMarked(alice.clone()));
        assert_eq!(resp.status, OutcomeKind::AlreadyMarked);
        assert_eq!(resp.title, "Already Marked!");
        assert_eq!(resp.employee, Some(alice));

        let json = serde_json::to_value(ScanResponse::from(&ScanOutcome::NotFound)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "status": "not_found", "title": "Employee not found" })
        );
    }
}
