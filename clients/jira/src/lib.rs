//! Jira Cloud implementation of [`activity::api::Client`] on top of the
//! `/rest/api/3/search/jql` endpoint.

mod builder;
mod payload;

pub use builder::{JiraClientBuilder, DEFAULT_SITE, DEFAULT_TIMEOUT};

use activity::api::{Error, Query, Result, SearchPage};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

pub struct JiraClient {
    client: Client,
    search_url: Url,
    user: String,
    token: SecretString,
}

#[async_trait]
impl activity::api::Client for JiraClient {
    async fn search_page(&self, query: &Query, page_token: Option<&str>) -> Result<SearchPage> {
        let mut params = vec![
            ("jql", query.jql.clone()),
            ("maxResults", query.page_size.to_string()),
            ("fields", query.fields.join(",")),
        ];
        if let Some(token) = page_token {
            params.push(("nextPageToken", token.to_string()));
        }
        debug!("GET {} jql=\"{}\" token={:?}", self.search_url, query.jql, page_token);
        let response = self
            .client
            .get(self.search_url.clone())
            .basic_auth(&self.user, Some(self.token.expose_secret()))
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;
        read_response(response).await
    }
}

async fn read_response(response: Response) -> Result<SearchPage> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Err(Error::Auth(format!("Jira rejected the credentials (status {}): {}", status, body)))
        }
        status if !status.is_success() => Err(Error::Transport(format!(
            "Failed to fetch data from Jira (status {}): {}",
            status, body
        ))),
        _ => serde_json::from_str::<payload::SearchBody>(&body)
            .map(SearchPage::from)
            .map_err(|err| Error::Protocol(format!("Unexpected search response: {}", err))),
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Transport(format!("Request to Jira timed out: {}", err))
    } else {
        Error::Transport(format!("Request to Jira failed: {}", err))
    }
}
