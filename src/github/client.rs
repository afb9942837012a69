//! Blocking client for the issues endpoints of a GitHub-style REST API

use crate::error::{Error, Result};
use crate::github::issues::{CloseOutcome, Issue, IssueState, IssueUpdate, NewIssue};
use crate::github::stale;
use crate::summary;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Issue tracker client. Holds the token as a prebuilt header and never
/// changes after construction, so one instance can serve many threads.
#[derive(Debug, Clone)]
pub struct IssueClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl IssueClient {
    /// Create a client that sends `Authorization: token <token>` to `base_url`.
    pub fn new(token: &str, base_url: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::InvalidArgument(
                "authentication token must not be empty".to_string(),
            ));
        }
        let mut auth = HeaderValue::from_str(&format!("token {token}")).map_err(|_| {
            Error::InvalidArgument(
                "authentication token contains characters not allowed in a header".to_string(),
            )
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("issuekeeper"));

        let http = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();
        debug!(base_url = %base_url, "Created issue client");
        Ok(Self { http, base_url })
    }

    /// Client for the public GitHub API
    pub fn github(token: &str) -> Result<Self> {
        Self::new(token, DEFAULT_API_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// List the issues of `owner/repo` in the order the server returns them.
    pub fn list_issues(&self, owner: &str, repo: &str) -> Result<Vec<Issue>> {
        let url = self.collection_url(owner, repo);
        debug!(url = %url, "GET issues");
        let response = execute(self.http.get(&url), StatusCode::OK)?;
        let issues: Vec<Issue> = decode(response)?;
        debug!(owner, repo, count = issues.len(), "Listed issues");
        Ok(issues)
    }

    /// Create an issue. `title` must not be empty; `body` may be.
    pub fn create_issue(&self, owner: &str, repo: &str, title: &str, body: &str) -> Result<Issue> {
        if title.is_empty() {
            return Err(Error::InvalidArgument(
                "issue title must not be empty".to_string(),
            ));
        }
        let url = self.collection_url(owner, repo);
        debug!(url = %url, "POST issue");
        let request = self.http.post(&url).json(&NewIssue { title, body });
        let issue: Issue = decode(execute(request, StatusCode::CREATED)?)?;
        info!(owner, repo, number = issue.number, "Created issue");
        Ok(issue)
    }

    /// Apply a partial update. Only the fields set on `update` are sent.
    pub fn update_issue(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        update: &IssueUpdate,
    ) -> Result<Issue> {
        let url = self.item_url(owner, repo, number);
        debug!(url = %url, "PATCH issue");
        let request = self.http.patch(&url).json(update);
        let issue: Issue = decode(execute(request, StatusCode::OK)?)?;
        info!(owner, repo, number, state = %issue.state, "Updated issue");
        Ok(issue)
    }

    pub fn delete_issue(&self, owner: &str, repo: &str, number: u64) -> Result<()> {
        let url = self.item_url(owner, repo, number);
        debug!(url = %url, "DELETE issue");
        execute(self.http.delete(&url), StatusCode::NO_CONTENT)?;
        info!(owner, repo, number, "Deleted issue");
        Ok(())
    }

    /// Write `"<number> - <title>"` per issue to `path`, replacing its contents.
    pub fn save_to_file(&self, issues: &[Issue], path: impl AsRef<Path>) -> Result<()> {
        summary::write_summary(issues, path.as_ref())
    }

    /// True iff `issue` was last updated more than `delta_days` days ago.
    pub fn is_stale(&self, issue: &Issue, delta_days: u32) -> Result<bool> {
        stale::is_stale_at(issue, delta_days, Utc::now())
    }

    /// Close `issue` with `comment` as its body if it is stale, otherwise leave it alone.
    pub fn close_if_stale(
        &self,
        owner: &str,
        repo: &str,
        issue: &Issue,
        delta_days: u32,
        comment: &str,
    ) -> Result<CloseOutcome> {
        self.close_if_stale_at(owner, repo, issue, delta_days, comment, Utc::now())
    }

    /// `close_if_stale` against an explicit reference time.
    pub fn close_if_stale_at(
        &self,
        owner: &str,
        repo: &str,
        issue: &Issue,
        delta_days: u32,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<CloseOutcome> {
        if !stale::is_stale_at(issue, delta_days, now)? {
            info!(number = issue.number, state = %issue.state, "Issue is not stale");
            return Ok(CloseOutcome::Unchanged {
                number: issue.number,
                title: issue.title.clone(),
                state: issue.state,
            });
        }

        let update = IssueUpdate::new().state(IssueState::Closed).body(comment);
        let closed = self.update_issue(owner, repo, issue.number, &update)?;
        info!(
            number = closed.number,
            updated_at = %issue.updated_at,
            delta_days,
            "Closed stale issue"
        );
        Ok(CloseOutcome::Closed(closed))
    }

    fn collection_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}/issues", self.base_url, owner, repo)
    }

    fn item_url(&self, owner: &str, repo: &str, number: u64) -> String {
        format!("{}/{}", self.collection_url(owner, repo), number)
    }
}

/// Send `request` and fail with `Error::Api` unless the status is `expected`.
fn execute(request: RequestBuilder, expected: StatusCode) -> Result<Response> {
    let response = request.send()?;
    let status = response.status();
    if status == expected {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = error_message(status, &body);
    warn!(status = status.as_u16(), message = %message, "API request failed");
    Err(Error::Api {
        message,
        status: status.as_u16(),
    })
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text()?;
    Ok(serde_json::from_str(&text)?)
}

/// The server's `message` field if present, else the raw body, else the reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unexpected status")
        .to_string()
}
