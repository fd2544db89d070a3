use crate::api::Issue;
use derive_more::Constructor;
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct TypeCount {
    pub name: String,
    pub count: usize,
}

/// Issue counts per type, most common first. Types with equal counts keep
/// the order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeBreakdown {
    counts: Vec<TypeCount>,
}

impl TypeBreakdown {
    pub fn get(&self, name: &str) -> Option<usize> {
        self.counts.iter().find(|c| c.name == name).map(|c| c.count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeCount> {
        self.counts.iter()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Share of `count` in the total, in percent. Zero for an empty breakdown.
    pub fn percentage(&self, count: usize) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64 * 100.0,
        }
    }
}

pub fn count_by_type(issues: &[Issue]) -> TypeBreakdown {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<TypeCount> = Vec::new();
    for issue in issues {
        match index.get(issue.issue_type.as_str()) {
            Some(&position) => counts[position].count += 1,
            None => {
                index.insert(issue.issue_type.as_str(), counts.len());
                counts.push(TypeCount::new(issue.issue_type.clone(), 1));
            }
        }
    }
    // stable sort keeps first-seen order among ties
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    TypeBreakdown { counts }
}

/// Sums `field` over `issues`, returning the total and how many issues
/// contributed to it.
///
/// Numbers and numeric strings are summed, booleans as 1 and 0. Missing,
/// `null` and unparseable values are skipped and excluded from the count.
pub fn sum_numeric_field(issues: &[Issue], field: &str) -> (f64, usize) {
    issues
        .iter()
        .filter_map(|issue| issue.field(field).and_then(numeric_value))
        .fold((0.0, 0), |(total, count), value| (total + value, count + 1))
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Throughput normalized to 5-day working weeks.
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyRates {
    pub created: f64,
    pub resolved: f64,
    pub bugs_resolved: f64,
    pub story_points: f64,
}

impl WeeklyRates {
    /// Returns `None` when there is no positive working time to divide by.
    pub fn new(created: usize, resolved: usize, bugs_resolved: usize, story_points: f64, working_weeks: f64) -> Option<Self> {
        if working_weeks <= 0.0 {
            return None;
        }
        Some(WeeklyRates {
            created: created as f64 / working_weeks,
            resolved: resolved as f64 / working_weeks,
            bugs_resolved: bugs_resolved as f64 / working_weeks,
            story_points: story_points / working_weeks,
        })
    }
}

#[cfg(test)]
fn issue(issue_type: &str, story_points: Option<Value>) -> Issue {
    let mut fields = serde_json::Map::new();
    if let Some(value) = story_points {
        fields.insert("customfield_10014".to_string(), value);
    }
    Issue::new(None, issue_type.to_string(), fields)
}

#[test]
fn count_by_type_test() {
    let issues = vec![issue("Bug", None), issue("Bug", None), issue("Story", None)];
    let breakdown = count_by_type(&issues);
    assert_eq!(breakdown.get("Bug"), Some(2));
    assert_eq!(breakdown.get("Story"), Some(1));
    assert_eq!(breakdown.get("Epic"), None);
    let names: Vec<&str> = breakdown.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Bug", "Story"]);
    assert_eq!(breakdown.total(), 3);
}

#[test]
fn count_by_type_ties_keep_first_seen_order_test() {
    let issues = vec![
        issue("Task", None),
        issue("Story", None),
        issue("Bug", None),
        issue("Story", None),
        issue("Bug", None),
        issue("Epic", None),
    ];
    let breakdown = count_by_type(&issues);
    let order: Vec<(&str, usize)> = breakdown.iter().map(|c| (c.name.as_str(), c.count)).collect();
    assert_eq!(order, vec![("Story", 2), ("Bug", 2), ("Task", 1), ("Epic", 1)]);
}

#[test]
fn count_by_type_empty_test() {
    let breakdown = count_by_type(&[]);
    assert!(breakdown.is_empty());
    assert_eq!(breakdown.percentage(0), 0.0);
}

#[test]
fn percentage_test() {
    let issues = vec![issue("Bug", None), issue("Story", None), issue("Story", None), issue("Story", None)];
    let breakdown = count_by_type(&issues);
    assert_eq!(breakdown.percentage(3), 75.0);
    assert_eq!(breakdown.percentage(1), 25.0);
}

#[test]
fn sum_numeric_field_test() {
    let issues = vec![
        issue("Story", Some(serde_json::json!(3))),
        issue("Story", Some(serde_json::json!("5"))),
        issue("Story", Some(Value::Null)),
        issue("Story", Some(serde_json::json!("bad"))),
        issue("Story", Some(serde_json::json!(2.5))),
        issue("Story", None),
    ];
    assert_eq!(sum_numeric_field(&issues, "customfield_10014"), (10.5, 3));
}

#[test]
fn sum_numeric_field_skips_non_numeric_json_test() {
    let issues = vec![
        issue("Story", Some(serde_json::json!([1, 2]))),
        issue("Story", Some(serde_json::json!({"value": 8}))),
    ];
    assert_eq!(sum_numeric_field(&issues, "customfield_10014"), (0.0, 0));
    assert_eq!(sum_numeric_field(&issues, "other"), (0.0, 0));
}

#[test]
fn sum_numeric_field_counts_booleans_test() {
    let issues = vec![
        issue("Story", Some(serde_json::json!(true))),
        issue("Story", Some(serde_json::json!(2))),
        issue("Story", Some(serde_json::json!(false))),
    ];
    assert_eq!(sum_numeric_field(&issues, "customfield_10014"), (3.0, 3));
}

#[test]
fn weekly_rates_test() {
    let rates = WeeklyRates::new(10, 5, 2, 12.5, 2.5).unwrap();
    assert_eq!(rates.created, 4.0);
    assert_eq!(rates.resolved, 2.0);
    assert_eq!(rates.bugs_resolved, 0.8);
    assert_eq!(rates.story_points, 5.0);
    assert_eq!(WeeklyRates::new(10, 5, 2, 12.5, 0.0), None);
    assert_eq!(WeeklyRates::new(10, 5, 2, 12.5, -0.6), None);
}
