use crate::JiraClient;
use activity::api::{Error, Result};
use anyhow::Context;
use reqwest::header;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::ClientBuilder;
use secrecy::SecretString;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SITE: &str = "swift-nav.atlassian.net";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const SEARCH_PATH: &str = "rest/api/3/search/jql";

pub struct JiraClientBuilder {
    client_builder: ClientBuilder,
    site: String,
    headers: HeaderMap,
    credentials: Option<(String, SecretString)>,
    timeout: Duration,
}

impl Default for JiraClientBuilder {
    fn default() -> Self {
        let mut headers = HeaderMap::default();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(concat!("jira-activity/", env!("CARGO_PKG_VERSION"))),
        );
        Self {
            client_builder: ClientBuilder::default(),
            site: DEFAULT_SITE.to_string(),
            headers,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl JiraClientBuilder {
    pub fn with_credentials<STR: Into<String>>(mut self, user: STR, token: SecretString) -> JiraClientBuilder {
        self.credentials = Some((user.into(), token));
        self
    }

    /// Jira host (`example.atlassian.net`) or base URL (`http://localhost:8080/jira`).
    pub fn with_site<STR: AsRef<str>>(mut self, site: STR) -> JiraClientBuilder {
        self.site = site.as_ref().trim().to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> JiraClientBuilder {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<JiraClient> {
        let (user, token) = self
            .credentials
            .ok_or_else(|| Error::Auth("Atlassian user and API token are required".to_string()))?;
        let search_url = search_url(&self.site)?;
        let client = self
            .client_builder
            .default_headers(self.headers)
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(JiraClient {
            client,
            search_url,
            user,
            token,
        })
    }
}

fn search_url(site: &str) -> Result<Url> {
    let base = if site.contains("://") {
        site.to_string()
    } else {
        format!("https://{}", site)
    };
    let mut base = Url::parse(&base).with_context(|| format!("Invalid Atlassian site '{}'", site))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(SEARCH_PATH).context("Invalid search URL")?)
}

#[test]
fn search_url_from_host_test() {
    let url = search_url("swift-nav.atlassian.net").unwrap();
    assert_eq!(url.as_str(), "https://swift-nav.atlassian.net/rest/api/3/search/jql");
}

#[test]
fn search_url_from_base_url_test() {
    let url = search_url("http://127.0.0.1:8080").unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:8080/rest/api/3/search/jql");
    let url = search_url("https://example.com/jira").unwrap();
    assert_eq!(url.as_str(), "https://example.com/jira/rest/api/3/search/jql");
}

#[test]
fn invalid_site_test() {
    assert!(matches!(search_url("not a host"), Err(Error::Other(_))));
}

#[test]
fn build_without_credentials_test() {
    let result = JiraClientBuilder::default().build();
    assert!(matches!(result, Err(Error::Auth(_))));
}
