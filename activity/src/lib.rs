//! Personal issue tracker activity
//!
//! # Overview
//!
//! Measures how much a single person got done in an issue tracker over a period of time.
//! Given a start date, an end date and a number of days off, library searches the tracker three times:
//! issues the current user reported, issues assigned to them and resolved, and the subset of those which are bugs.
//! Results are paged by the tracker, so [`search::IssueSearch`] follows continuation tokens until the last page,
//! bounded by a page limit so a misbehaving service cannot keep it looping.
//!
//! Resolved issues are counted per type and their story points are summed.
//! Throughput is normalized to working weeks: the weekdays in the period minus days off, divided by five.
//! The [`report`] module renders each part as plain text.

pub mod aggregate;
pub mod api;
pub mod calendar;
pub mod jql;
pub mod report;
#[cfg(feature = "search")]
pub mod search;
