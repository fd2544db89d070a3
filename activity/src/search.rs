use crate::api::{Client, Issue, Query, Result};
use log::{debug, info, warn};
use strum_macros::Display;

/// Page fetches allowed for a single search.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// Why a search stopped paging.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum Stop {
    #[strum(serialize = "no more issues returned")]
    EmptyPage,
    #[strum(serialize = "last page reached")]
    LastPage,
    #[strum(serialize = "page limit reached")]
    PageLimit(u32),
    #[strum(serialize = "page token did not advance")]
    StaleToken(String),
}

/// Receives search progress. Passed into [`IssueSearch`] instead of logging
/// from inside the page loop.
pub trait Reporter {
    fn page_fetched(&self, fetched: usize, total: Option<u64>);

    fn finished(&self, fetched: usize, stop: &Stop);
}

impl<R: Reporter + ?Sized> Reporter for &R {
    fn page_fetched(&self, fetched: usize, total: Option<u64>) {
        (**self).page_fetched(fetched, total)
    }

    fn finished(&self, fetched: usize, stop: &Stop) {
        (**self).finished(fetched, stop)
    }
}

/// Forwards progress to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn page_fetched(&self, fetched: usize, total: Option<u64>) {
        match total {
            Some(total) if total > 0 => info!("  Fetched {}/{} issues...", fetched, total),
            _ => info!("  Fetched {} issues...", fetched),
        }
    }

    fn finished(&self, fetched: usize, stop: &Stop) {
        match stop {
            Stop::PageLimit(max_pages) => warn!(
                "  Hit maximum page limit ({}), stopping. This might indicate an API issue.",
                max_pages
            ),
            Stop::StaleToken(token) => warn!("  Page token '{}' repeated, stopping. This might indicate an API issue.", token),
            stop => debug!("  Stopping pagination: {}", stop),
        }
        info!("  Fetched {} issues... Done!", fetched);
    }
}

pub struct IssueSearch<CLIENT, REPORTER>
where
    CLIENT: Client,
    REPORTER: Reporter,
{
    client: CLIENT,
    reporter: REPORTER,
    max_pages: u32,
}

impl<CLIENT, REPORTER> IssueSearch<CLIENT, REPORTER>
where
    CLIENT: Client,
    REPORTER: Reporter,
{
    pub fn new(client: CLIENT, reporter: REPORTER) -> Self {
        IssueSearch {
            client,
            reporter,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Collects every issue matching `query`, following page tokens.
    ///
    /// Stops on an empty page, on a page without a token, when the service
    /// repeats the token it was just sent, or after `max_pages` fetches. The
    /// last two are reported as warnings and the issues gathered so far are
    /// returned.
    pub async fn search(&self, query: &Query) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;
        let stop = loop {
            if pages >= self.max_pages {
                break Stop::PageLimit(self.max_pages);
            }
            let page = self.client.search_page(query, page_token.as_deref()).await?;
            pages += 1;
            let page_len = page.issues.len();
            issues.extend(page.issues);
            self.reporter.page_fetched(issues.len(), page.total);

            if page_len == 0 {
                break Stop::EmptyPage;
            }
            match page.next_page_token {
                None => break Stop::LastPage,
                Some(next) if page_token.as_deref() == Some(next.as_str()) => break Stop::StaleToken(next),
                next => page_token = next,
            }
        };
        self.reporter.finished(issues.len(), &stop);
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Error, SearchPage};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Serves scripted pages and records the tokens it was asked for.
    struct ScriptedClient {
        pages: Mutex<VecDeque<Result<SearchPage>>>,
        requested_tokens: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedClient {
        fn new(pages: Vec<Result<SearchPage>>) -> Self {
            ScriptedClient {
                pages: Mutex::new(pages.into()),
                requested_tokens: Mutex::new(Vec::new()),
            }
        }

        fn requested_tokens(&self) -> Vec<Option<String>> {
            self.requested_tokens.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Client for ScriptedClient {
        async fn search_page(&self, _query: &Query, page_token: Option<&str>) -> Result<SearchPage> {
            self.requested_tokens.lock().unwrap().push(page_token.map(String::from));
            self.pages
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request for token {:?}", page_token))
        }
    }

    /// Endless pages, each with a fresh token.
    struct EndlessClient;

    #[async_trait]
    impl Client for EndlessClient {
        async fn search_page(&self, _query: &Query, page_token: Option<&str>) -> Result<SearchPage> {
            let next = page_token.map_or(1, |t| t.parse::<u32>().unwrap() + 1);
            Ok(page(&[&format!("T-{}", next)], Some(&next.to_string()), None))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        progress: Mutex<Vec<(usize, Option<u64>)>>,
        stops: Mutex<Vec<(usize, Stop)>>,
    }

    impl Reporter for RecordingReporter {
        fn page_fetched(&self, fetched: usize, total: Option<u64>) {
            self.progress.lock().unwrap().push((fetched, total));
        }

        fn finished(&self, fetched: usize, stop: &Stop) {
            self.stops.lock().unwrap().push((fetched, stop.clone()));
        }
    }

    fn page(keys: &[&str], next: Option<&str>, total: Option<u64>) -> SearchPage {
        let issues = keys
            .iter()
            .map(|key| Issue::new(Some(key.to_string()), "Task".to_string(), Default::default()))
            .collect();
        SearchPage::new(issues, next.map(String::from), total)
    }

    fn keys(issues: &[Issue]) -> Vec<String> {
        issues.iter().filter_map(|i| i.key.clone()).collect()
    }

    fn query() -> Query {
        Query::new("assignee = currentUser()".to_string(), vec!["issuetype".to_string()], 2)
    }

    #[tokio::test]
    async fn concatenates_pages_in_order_test() {
        let client = ScriptedClient::new(vec![
            Ok(page(&["A-1", "A-2"], Some("p2"), Some(5))),
            Ok(page(&["A-3", "A-4"], Some("p3"), Some(5))),
            Ok(page(&["A-5"], None, Some(5))),
        ]);
        let reporter = RecordingReporter::default();
        let issues = IssueSearch::new(&client, &reporter).search(&query()).await.unwrap();

        assert_eq!(keys(&issues), vec!["A-1", "A-2", "A-3", "A-4", "A-5"]);
        assert_eq!(
            client.requested_tokens(),
            vec![None, Some("p2".to_string()), Some("p3".to_string())]
        );
        assert_eq!(
            *reporter.progress.lock().unwrap(),
            vec![(2, Some(5)), (4, Some(5)), (5, Some(5))]
        );
        assert_eq!(*reporter.stops.lock().unwrap(), vec![(5, Stop::LastPage)]);
    }

    #[tokio::test]
    async fn missing_token_ends_search_despite_total_test() {
        let client = ScriptedClient::new(vec![Ok(page(&["A-1", "A-2"], None, Some(50)))]);
        let reporter = RecordingReporter::default();
        let issues = IssueSearch::new(&client, &reporter).search(&query()).await.unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(client.requested_tokens(), vec![None]);
    }

    #[tokio::test]
    async fn empty_page_ends_search_despite_token_test() {
        let client = ScriptedClient::new(vec![
            Ok(page(&["A-1"], Some("p2"), None)),
            Ok(page(&[], Some("p3"), None)),
        ]);
        let reporter = RecordingReporter::default();
        let issues = IssueSearch::new(&client, &reporter).search(&query()).await.unwrap();

        assert_eq!(keys(&issues), vec!["A-1"]);
        assert_eq!(*reporter.stops.lock().unwrap(), vec![(1, Stop::EmptyPage)]);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error_test() {
        let client = ScriptedClient::new(vec![Ok(page(&[], None, Some(0)))]);
        let reporter = RecordingReporter::default();
        let issues = IssueSearch::new(&client, &reporter).search(&query()).await.unwrap();

        assert!(issues.is_empty());
        assert_eq!(*reporter.progress.lock().unwrap(), vec![(0, Some(0))]);
    }

    #[tokio::test]
    async fn page_limit_returns_partial_result_test() {
        let reporter = RecordingReporter::default();
        let issues = IssueSearch::new(EndlessClient, &reporter)
            .with_max_pages(3)
            .search(&query())
            .await
            .unwrap();

        assert_eq!(keys(&issues), vec!["T-1", "T-2", "T-3"]);
        assert_eq!(*reporter.stops.lock().unwrap(), vec![(3, Stop::PageLimit(3))]);
    }

    #[tokio::test]
    async fn default_page_limit_test() {
        let reporter = RecordingReporter::default();
        let issues = IssueSearch::new(EndlessClient, &reporter).search(&query()).await.unwrap();

        assert_eq!(issues.len(), DEFAULT_MAX_PAGES as usize);
        assert_eq!(reporter.progress.lock().unwrap().len(), DEFAULT_MAX_PAGES as usize);
    }

    #[tokio::test]
    async fn repeated_token_stops_search_test() {
        let client = ScriptedClient::new(vec![
            Ok(page(&["A-1"], Some("p2"), None)),
            Ok(page(&["A-1"], Some("p2"), None)),
        ]);
        let reporter = RecordingReporter::default();
        let issues = IssueSearch::new(&client, &reporter).search(&query()).await.unwrap();

        assert_eq!(issues.len(), 2);
        assert_eq!(
            *reporter.stops.lock().unwrap(),
            vec![(2, Stop::StaleToken("p2".to_string()))]
        );
    }

    #[tokio::test]
    async fn client_error_is_propagated_test() {
        let client = ScriptedClient::new(vec![
            Ok(page(&["A-1"], Some("p2"), None)),
            Err(Error::Transport("status 502 Bad Gateway: upstream".to_string())),
        ]);
        let reporter = RecordingReporter::default();
        let result = IssueSearch::new(&client, &reporter).search(&query()).await;

        assert!(matches!(result, Err(Error::Transport(_))));
        assert!(reporter.stops.lock().unwrap().is_empty());
    }
}
