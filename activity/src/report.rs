//! Text sections of the activity report.
//!
//! Every function renders one complete section, so a caller can write each
//! one out as soon as its data is ready.

use crate::aggregate::{TypeBreakdown, WeeklyRates};
use crate::calendar::WorkingWeeks;
use chrono::NaiveDate;

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const BOX_TOP: &str = "╔═══════════════════════════════════════════════════════════════╗";
const BOX_BOTTOM: &str = "╚═══════════════════════════════════════════════════════════════╝";

pub fn header(start: NaiveDate, end: NaiveDate) -> String {
    let mut out = String::new();
    line(&mut out, BOX_TOP);
    line(&mut out, "║        Jira Activity Summary");
    line(&mut out, format!("║        Period: {} to {}", start, end));
    line(&mut out, BOX_BOTTOM);
    line(&mut out, "");
    out
}

pub fn connection(site: &str, user: &str) -> String {
    let mut out = String::new();
    line(&mut out, "Connecting to Jira...");
    line(&mut out, format!("Site: {}", site));
    line(&mut out, format!("User: {}", user));
    line(&mut out, "");
    out
}

pub fn period(weeks: &WorkingWeeks, pto_days: u32) -> String {
    let mut out = String::new();
    line(
        &mut out,
        format!("Period: {} days ({:.1} calendar weeks)", weeks.total_days, weeks.calendar_weeks),
    );
    line(&mut out, format!("Weekdays in period: {} days", weeks.weekdays));
    if pto_days > 0 {
        line(
            &mut out,
            format!(
                "Working days (excluding {} PTO days): {} days ({:.1} weeks)",
                pto_days, weeks.working_days, weeks.working_weeks
            ),
        );
    } else {
        line(
            &mut out,
            format!("Working days: {} days ({:.1} weeks)", weeks.working_days, weeks.working_weeks),
        );
    }
    line(&mut out, "");
    out
}

pub fn tickets_created(breakdown: &TypeBreakdown) -> String {
    titled_breakdown("📝 Tickets You Created", "Total Tickets Created", breakdown)
}

pub fn tickets_resolved(breakdown: &TypeBreakdown) -> String {
    titled_breakdown("✅ Tickets You Resolved/Closed", "Total Tickets Resolved", breakdown)
}

pub fn bugs_resolved(count: usize) -> String {
    let mut out = title("🐛 Bugs You Resolved");
    line(&mut out, format!("  Total Bugs Resolved: {}", count));
    line(&mut out, "");
    out
}

/// # Arguments
/// * `total` - Sum of story points
/// * `with_points` - Resolved tickets that carried a story point value
/// * `resolved` - All resolved tickets
pub fn story_points(total: f64, with_points: usize, resolved: usize) -> String {
    let mut out = title("⭐ Story Points Completed");
    line(&mut out, format!("  Total Story Points: {:.2}", total));
    line(&mut out, format!("  Tickets with story points: {}/{}", with_points, resolved));
    if with_points < resolved {
        line(&mut out, "  Note: Not all tickets have story points assigned");
    }
    line(&mut out, "");
    out
}

pub fn overall(rates: Option<&WeeklyRates>) -> String {
    let mut out = title("📊 Overall Statistics");
    match rates {
        Some(rates) => {
            line(&mut out, format!("  Tickets Created per Week: {:.2}", rates.created));
            line(&mut out, format!("  Tickets Resolved per Week: {:.2}", rates.resolved));
            line(&mut out, format!("  Bugs Resolved per Week: {:.2}", rates.bugs_resolved));
            line(&mut out, format!("  Story Points per Week: {:.2}", rates.story_points));
        }
        None => line(&mut out, "  No working weeks in period, rates not available"),
    }
    line(&mut out, "");
    out
}

pub fn footer(binary: &str, start: NaiveDate, end: NaiveDate) -> String {
    let mut out = String::new();
    line(&mut out, BOX_TOP);
    line(&mut out, "║  Summary complete!");
    line(&mut out, BOX_BOTTOM);
    line(&mut out, "");
    line(&mut out, "💡 Tip: Save this output to a file:");
    line(&mut out, format!("   {} {} {} > jira_summary.txt", binary, start, end));
    line(&mut out, "");
    out
}

fn titled_breakdown(heading: &str, total_label: &str, breakdown: &TypeBreakdown) -> String {
    let mut out = title(heading);
    line(&mut out, format!("  {}: {}", total_label, breakdown.total()));
    line(&mut out, "");
    line(&mut out, "  Breakdown by Type:");
    for type_count in breakdown.iter() {
        line(
            &mut out,
            format!(
                "    • {}: {} ({:.1}%)",
                type_count.name,
                type_count.count,
                breakdown.percentage(type_count.count)
            ),
        );
    }
    line(&mut out, "");
    out
}

fn title(heading: &str) -> String {
    let mut out = String::new();
    line(&mut out, heading);
    line(&mut out, RULE);
    out
}

fn line(out: &mut String, text: impl AsRef<str>) {
    out.push_str(text.as_ref());
    out.push('\n');
}

#[cfg(test)]
fn breakdown(types: &[&str]) -> TypeBreakdown {
    let issues: Vec<crate::api::Issue> = types
        .iter()
        .map(|t| crate::api::Issue::new(None, t.to_string(), Default::default()))
        .collect();
    crate::aggregate::count_by_type(&issues)
}

#[cfg(test)]
fn date(value: &str) -> NaiveDate {
    crate::calendar::parse_date(value).unwrap()
}

#[test]
fn header_test() {
    let header = header(date("2025-02-28"), date("2026-02-02"));
    assert!(header.contains("║        Period: 2025-02-28 to 2026-02-02\n"));
    assert!(header.starts_with(BOX_TOP));
}

#[test]
fn breakdown_percentages_one_decimal_test() {
    let section = tickets_created(&breakdown(&["Story", "Bug", "Story"]));
    assert!(section.starts_with("📝 Tickets You Created\n"));
    assert!(section.contains("  Total Tickets Created: 3\n"));
    assert!(section.contains("    • Story: 2 (66.7%)\n    • Bug: 1 (33.3%)\n"));
}

#[test]
fn empty_breakdown_test() {
    let section = tickets_resolved(&TypeBreakdown::default());
    assert!(section.contains("  Total Tickets Resolved: 0\n"));
    assert!(section.ends_with("  Breakdown by Type:\n\n"));
}

#[test]
fn story_points_test() {
    let section = story_points(10.5, 3, 5);
    assert!(section.contains("  Total Story Points: 10.50\n"));
    assert!(section.contains("  Tickets with story points: 3/5\n"));
    assert!(section.contains("Note: Not all tickets have story points assigned"));

    let section = story_points(8.0, 2, 2);
    assert!(!section.contains("Note:"));
}

#[test]
fn period_test() {
    let weeks = crate::calendar::working_weeks(date("2025-03-03"), date("2025-03-17"), 3).unwrap();
    let section = period(&weeks, 3);
    assert!(section.contains("Period: 14 days (2.0 calendar weeks)\n"));
    assert!(section.contains("Weekdays in period: 10 days\n"));
    assert!(section.contains("Working days (excluding 3 PTO days): 7 days (1.4 weeks)\n"));

    let weeks = crate::calendar::working_weeks(date("2025-03-03"), date("2025-03-17"), 0).unwrap();
    assert!(period(&weeks, 0).contains("Working days: 10 days (2.0 weeks)\n"));
}

#[test]
fn overall_test() {
    let rates = WeeklyRates::new(10, 4, 1, 7.0, 2.0).unwrap();
    let section = overall(Some(&rates));
    assert!(section.contains("  Tickets Created per Week: 5.00\n"));
    assert!(section.contains("  Tickets Resolved per Week: 2.00\n"));
    assert!(section.contains("  Bugs Resolved per Week: 0.50\n"));
    assert!(section.contains("  Story Points per Week: 3.50\n"));

    let section = overall(None);
    assert!(!section.contains("per Week"));
}

#[test]
fn footer_test() {
    let footer = footer("jira_activity", date("2025-02-28"), date("2026-02-02"));
    assert!(footer.contains("   jira_activity 2025-02-28 2026-02-02 > jira_summary.txt\n"));
}
