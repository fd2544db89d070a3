use async_trait::async_trait;
use derive_more::Constructor;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Protocol error: {0}")]
    Protocol(String),
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Issue as returned by search. Only `issue_type` and the numeric fields
/// listed in `fields` take part in aggregation.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct Issue {
    pub key: Option<String>,
    pub issue_type: String,
    pub fields: Map<String, Value>,
}

impl Issue {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct Query {
    pub jql: String,
    pub fields: Vec<String>,
    pub page_size: u32,
}

/// One page of search results.
///
/// `next_page_token` present means the service has more results; an empty
/// token is normalized to `None` by [`SearchPage::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub issues: Vec<Issue>,
    pub next_page_token: Option<String>,
    pub total: Option<u64>,
}

impl SearchPage {
    pub fn new(issues: Vec<Issue>, next_page_token: Option<String>, total: Option<u64>) -> Self {
        let next_page_token = next_page_token.filter(|token| !token.is_empty());
        SearchPage {
            issues,
            next_page_token,
            total,
        }
    }
}

#[async_trait]
pub trait Client: Send + Sync {
    /// Fetches a single page. `page_token` is `None` for the first page.
    async fn search_page(&self, query: &Query, page_token: Option<&str>) -> Result<SearchPage>;
}

#[async_trait]
impl<C: Client + ?Sized> Client for &C {
    async fn search_page(&self, query: &Query, page_token: Option<&str>) -> Result<SearchPage> {
        (**self).search_page(query, page_token).await
    }
}

#[test]
fn empty_token_is_last_page_test() {
    let page = SearchPage::new(Vec::new(), Some(String::new()), Some(3));
    assert_eq!(page.next_page_token, None);
    let page = SearchPage::new(Vec::new(), Some("abc".to_string()), None);
    assert_eq!(page.next_page_token.as_deref(), Some("abc"));
}
