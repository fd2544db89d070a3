#![allow(dead_code)]

use jira_activity_app::Args;
use secrecy::SecretString;
use serde_json::{json, Value};
use wiremock::{Match, Request};

pub const SEARCH_PATH: &str = "/rest/api/3/search/jql";
pub const USER: &str = "me@example.com";
pub const TOKEN: &str = "secret-token";
/// base64 of `me@example.com:secret-token`
pub const BASIC_AUTH: &str = "Basic bWVAZXhhbXBsZS5jb206c2VjcmV0LXRva2Vu";

pub fn args(site: String, start: &str, end: &str) -> Args {
    Args {
        start_date: start.to_string(),
        end_date: end.to_string(),
        user: Some(USER.to_string()),
        token: Some(SecretString::new(TOKEN.to_string())),
        site,
        ptos: 0,
        story_points_field: "customfield_10014".to_string(),
        page_size: 100,
        max_pages: 100,
        timeout: 5,
    }
}

/// Matches on the `nextPageToken` query parameter, `None` meaning absent.
pub struct PageToken(pub Option<&'static str>);

impl Match for PageToken {
    fn matches(&self, request: &Request) -> bool {
        let token = request
            .url
            .query_pairs()
            .find(|(key, _)| key == "nextPageToken")
            .map(|(_, value)| value.into_owned());
        token.as_deref() == self.0
    }
}

/// Matches one of the three activity searches by a distinctive JQL fragment.
pub struct JqlContains(pub &'static str);

impl Match for JqlContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .url
            .query_pairs()
            .any(|(key, value)| key == "jql" && value.contains(self.0))
    }
}

pub fn issue(key: &str, issue_type: &str) -> Value {
    json!({ "id": key, "key": key, "fields": { "issuetype": { "name": issue_type } } })
}

pub fn issue_with_points(key: &str, issue_type: &str, points: Value) -> Value {
    json!({
        "id": key,
        "key": key,
        "fields": { "issuetype": { "name": issue_type }, "customfield_10014": points }
    })
}

pub fn page(issues: Vec<Value>, next_page_token: Option<&str>, total: Option<u64>) -> Value {
    let mut body = json!({ "issues": issues });
    if let Some(token) = next_page_token {
        body["nextPageToken"] = json!(token);
    }
    if let Some(total) = total {
        body["total"] = json!(total);
    }
    body
}
