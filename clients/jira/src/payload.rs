use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    #[serde(default)]
    pub issues: Vec<Issue>,
    pub next_page_token: Option<String>,
    pub total: Option<u64>,
}

#[derive(Deserialize, Debug)]
pub struct Issue {
    pub key: Option<String>,
    pub fields: Fields,
}

#[derive(Deserialize, Debug)]
pub struct Fields {
    pub issuetype: IssueType,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Deserialize, Debug)]
pub struct IssueType {
    pub name: String,
}

impl From<Issue> for activity::api::Issue {
    fn from(issue: Issue) -> Self {
        activity::api::Issue {
            key: issue.key,
            issue_type: issue.fields.issuetype.name,
            fields: issue.fields.other,
        }
    }
}

impl From<SearchBody> for activity::api::SearchPage {
    fn from(body: SearchBody) -> Self {
        let issues = body.issues.into_iter().map(activity::api::Issue::from).collect();
        activity::api::SearchPage::new(issues, body.next_page_token, body.total)
    }
}

#[test]
fn search_body_test() {
    let body = r#"{
        "issues": [
            {"id": "1", "key": "NAV-1", "fields": {"issuetype": {"name": "Bug"}, "customfield_10014": 3, "summary": "x"}},
            {"id": "2", "key": "NAV-2", "fields": {"issuetype": {"name": "Story"}, "customfield_10014": null}}
        ],
        "nextPageToken": "abc",
        "isLast": false
    }"#;
    let page: activity::api::SearchPage = serde_json::from_str::<SearchBody>(body).unwrap().into();
    assert_eq!(page.issues.len(), 2);
    assert_eq!(page.issues[0].key.as_deref(), Some("NAV-1"));
    assert_eq!(page.issues[0].issue_type, "Bug");
    assert_eq!(page.issues[0].field("customfield_10014"), Some(&serde_json::json!(3)));
    assert_eq!(page.issues[0].field("issuetype"), None);
    assert_eq!(page.issues[1].field("customfield_10014"), Some(&Value::Null));
    assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    assert_eq!(page.total, None);
}

#[test]
fn search_body_without_issues_test() {
    let page: activity::api::SearchPage = serde_json::from_str::<SearchBody>(r#"{"total": 0}"#).unwrap().into();
    assert!(page.issues.is_empty());
    assert_eq!(page.total, Some(0));
    assert_eq!(page.next_page_token, None);
}

#[test]
fn issue_without_type_is_rejected_test() {
    let body = r#"{"issues": [{"key": "NAV-1", "fields": {"summary": "x"}}]}"#;
    assert!(serde_json::from_str::<SearchBody>(body).is_err());
}
