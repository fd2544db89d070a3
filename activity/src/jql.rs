//! JQL for the three activity searches of a report.

use crate::api::Query;
use crate::calendar::DATE_FORMAT;
use chrono::NaiveDate;
use strum_macros::{Display, EnumIter};

pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_STORY_POINTS_FIELD: &str = "customfield_10014";
pub const DEFAULT_FIELDS: [&str; 5] = ["summary", "status", "issuetype", "created", "resolved"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum Activity {
    #[strum(serialize = "created")]
    Created,
    #[strum(serialize = "resolved")]
    Resolved,
    #[strum(serialize = "bugs resolved")]
    BugsResolved,
}

impl Activity {
    fn filter(&self, start: &str, end: &str) -> String {
        match self {
            Activity::Created => {
                format!("reporter = currentUser() AND created >= '{}' AND created <= '{}'", start, end)
            }
            Activity::Resolved => {
                format!("assignee = currentUser() AND resolved >= '{}' AND resolved <= '{}'", start, end)
            }
            Activity::BugsResolved => format!(
                "assignee = currentUser() AND type = Bug AND resolved >= '{}' AND resolved <= '{}'",
                start, end
            ),
        }
    }

    fn fields(&self, story_points_field: &str) -> Vec<String> {
        match self {
            Activity::Resolved => ["summary", "status", "issuetype", "resolved", story_points_field]
                .iter()
                .map(|f| f.to_string())
                .collect(),
            _ => DEFAULT_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Builds the search for `activity` of the current user between `start` and
/// `end`, both inclusive on the service side.
pub fn query(activity: Activity, start: NaiveDate, end: NaiveDate, story_points_field: &str, page_size: u32) -> Query {
    let start = start.format(DATE_FORMAT).to_string();
    let end = end.format(DATE_FORMAT).to_string();
    Query::new(
        activity.filter(&start, &end),
        activity.fields(story_points_field),
        page_size.min(MAX_PAGE_SIZE),
    )
}

#[cfg(test)]
fn period() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
        NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
    )
}

#[test]
fn created_query_test() {
    let (start, end) = period();
    let query = query(Activity::Created, start, end, DEFAULT_STORY_POINTS_FIELD, 100);
    assert_eq!(
        query.jql,
        "reporter = currentUser() AND created >= '2025-02-28' AND created <= '2026-02-02'"
    );
    assert_eq!(query.fields, vec!["summary", "status", "issuetype", "created", "resolved"]);
    assert_eq!(query.page_size, 100);
}

#[test]
fn resolved_query_requests_story_points_test() {
    let (start, end) = period();
    let query = query(Activity::Resolved, start, end, "customfield_42", 50);
    assert_eq!(
        query.jql,
        "assignee = currentUser() AND resolved >= '2025-02-28' AND resolved <= '2026-02-02'"
    );
    assert_eq!(query.fields, vec!["summary", "status", "issuetype", "resolved", "customfield_42"]);
    assert_eq!(query.page_size, 50);
}

#[test]
fn bugs_query_test() {
    let (start, end) = period();
    let query = query(Activity::BugsResolved, start, end, DEFAULT_STORY_POINTS_FIELD, 500);
    assert_eq!(
        query.jql,
        "assignee = currentUser() AND type = Bug AND resolved >= '2025-02-28' AND resolved <= '2026-02-02'"
    );
    assert_eq!(query.page_size, MAX_PAGE_SIZE);
}

#[test]
fn every_activity_scopes_current_user_test() {
    use strum::IntoEnumIterator;
    let (start, end) = period();
    for activity in Activity::iter() {
        let query = query(activity, start, end, DEFAULT_STORY_POINTS_FIELD, 100);
        assert!(query.jql.contains("= currentUser()"), "{} query: {}", activity, query.jql);
        assert!(query.fields.iter().any(|f| f == "issuetype"));
    }
}
