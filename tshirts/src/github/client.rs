//! REST implementation of [`IssueTracker`] and [`IssueHost`]
//!
//! A thin wrapper over `reqwest`: one request per call, status codes mapped
//! onto [`GitHubError`], no retries.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use super::error::{GitHubError, GitHubResult};
use super::types::{Issue, Label, NewIssue, RawIssue, RawRepo};
use super::{IssueHost, IssueTracker};
use crate::repo::RepoRef;
use crate::size::{is_size_label, Size};

/// Public GitHub API base URL
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// User-Agent header required by GitHub API
const USER_AGENT: &str = concat!("tshirts/", env!("CARGO_PKG_VERSION"));

const API_VERSION: &str = "2022-11-28";

const PER_PAGE: usize = 100;

/// Authenticated handle on the GitHub REST API
#[derive(Clone)]
pub struct GitHub {
    http: reqwest::Client,
    base: Url,
    token: Option<String>,
}

/// Error body GitHub returns for non-2xx responses
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GitHub {
    /// Create a client for `api_url`
    ///
    /// A missing token is accepted here and reported on the first request,
    /// so a long-running server can start without one.
    pub fn new(api_url: &str, token: Option<String>) -> GitHubResult<Self> {
        let base = Url::parse(api_url).map_err(|e| GitHubError::InvalidUrl(format!("{api_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl(api_url.to_string()));
        }
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Bind this client to one repository
    pub fn repo(&self, repo: &RepoRef) -> RepoIssues {
        RepoIssues {
            github: self.clone(),
            repo: repo.clone(),
        }
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment
    fn endpoint<I, S>(&self, segments: I) -> GitHubResult<Url>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| GitHubError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> GitHubResult<RequestBuilder> {
        let token = self.token.as_deref().ok_or(GitHubError::MissingToken)?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION))
    }

    async fn send(&self, builder: RequestBuilder) -> GitHubResult<Response> {
        let response = builder.send().await?;
        check_status(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> GitHubResult<T> {
        debug!(%url, "GET");
        let response = self.send(self.request(Method::GET, url)?).await?;
        Ok(response.json().await?)
    }

    /// GET every page of a list endpoint
    async fn get_all<T: DeserializeOwned>(&self, url: Url) -> GitHubResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1usize;
        loop {
            let mut page_url = url.clone();
            page_url
                .query_pairs_mut()
                .append_pair("per_page", &PER_PAGE.to_string())
                .append_pair("page", &page.to_string());

            let batch: Vec<T> = self.get_json(page_url).await?;
            let done = batch.len() < PER_PAGE;
            items.extend(batch);
            if done {
                return Ok(items);
            }
            page += 1;
        }
    }

    async fn send_json(&self, method: Method, url: Url, body: serde_json::Value) -> GitHubResult<Response> {
        debug!(%url, %method, "sending");
        self.send(self.request(method, url)?.json(&body)).await
    }
}

/// Map a non-success response onto a [`GitHubError`]
async fn check_status(response: Response) -> GitHubResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        == Some("0");
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or(body);

    Err(match status {
        StatusCode::UNAUTHORIZED => GitHubError::Unauthorized,
        StatusCode::TOO_MANY_REQUESTS => GitHubError::RateLimited(message),
        StatusCode::FORBIDDEN if rate_exhausted => GitHubError::RateLimited(message),
        StatusCode::FORBIDDEN => GitHubError::Forbidden(message),
        StatusCode::NOT_FOUND => GitHubError::NotFound(message),
        other => GitHubError::Api {
            status: other.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl IssueHost for GitHub {
    #[instrument(skip(self))]
    async fn user_repos(&self) -> GitHubResult<Vec<String>> {
        let mut url = self.endpoint(["user", "repos"])?;
        url.query_pairs_mut()
            .append_pair("sort", "updated")
            .append_pair("per_page", &PER_PAGE.to_string());
        let repos: Vec<RawRepo> = self.get_json(url).await?;
        Ok(repos.into_iter().map(|r| r.full_name).collect())
    }

    fn tracker(&self, repo: &RepoRef) -> Arc<dyn IssueTracker> {
        Arc::new(self.repo(repo))
    }
}

/// [`GitHub`] bound to one repository
#[derive(Clone)]
pub struct RepoIssues {
    github: GitHub,
    repo: RepoRef,
}

impl RepoIssues {
    /// `<base>/repos/<owner>/<name>/<rest...>`
    fn repo_url(&self, rest: &[&str]) -> GitHubResult<Url> {
        let segments = ["repos", self.repo.owner(), self.repo.name()]
            .into_iter()
            .chain(rest.iter().copied());
        self.github.endpoint(segments)
    }
}

#[async_trait]
impl IssueTracker for RepoIssues {
    fn repo(&self) -> &RepoRef {
        &self.repo
    }

    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn open_issues(&self) -> GitHubResult<Vec<Issue>> {
        let mut url = self.repo_url(&["issues"])?;
        url.query_pairs_mut().append_pair("state", "open");
        let raw: Vec<RawIssue> = self.github.get_all(url).await?;
        Ok(raw
            .into_iter()
            .filter(|i| !i.is_pull_request())
            .map(Issue::from)
            .collect())
    }

    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn issue(&self, number: u64) -> GitHubResult<Issue> {
        let url = self.repo_url(&["issues", number.to_string().as_str()])?;
        match self.github.get_json::<RawIssue>(url).await {
            Ok(raw) => Ok(raw.into()),
            Err(GitHubError::NotFound(_)) => Err(GitHubError::NotFound(format!(
                "issue #{} in {}",
                number, self.repo
            ))),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn labels(&self) -> GitHubResult<Vec<Label>> {
        let url = self.repo_url(&["labels"])?;
        self.github.get_all(url).await
    }

    #[instrument(skip(self, description), fields(repo = %self.repo))]
    async fn create_label(&self, name: &str, color: &str, description: &str) -> GitHubResult<()> {
        let url = self.repo_url(&["labels"])?;
        let body = json!({ "name": name, "color": color, "description": description });
        match self.github.send_json(Method::POST, url, body).await {
            Ok(_) => Ok(()),
            // 422: a label with this name already exists
            Err(GitHubError::Api { status: 422, .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self), fields(repo = %self.repo, size = %size))]
    async fn set_size_label(&self, number: u64, size: Size) -> GitHubResult<()> {
        let target = size.label();
        let issue = self.issue(number).await?;
        let number_str = number.to_string();

        for label in issue.labels.iter().filter(|l| is_size_label(l) && **l != target) {
            let url = self.repo_url(&["issues", number_str.as_str(), "labels", label.as_str()])?;
            debug!(%label, "removing stale size label");
            match self.github.send(self.github.request(Method::DELETE, url)?).await {
                Ok(_) | Err(GitHubError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }

        if !issue.labels.contains(&target) {
            let url = self.repo_url(&["issues", number_str.as_str(), "labels"])?;
            self.github
                .send_json(Method::POST, url, json!({ "labels": [target] }))
                .await?;
        }
        Ok(())
    }

    #[instrument(skip(self, issue), fields(repo = %self.repo, title = %issue.title))]
    async fn create_issue(&self, issue: NewIssue) -> GitHubResult<Issue> {
        let url = self.repo_url(&["issues"])?;
        let body = json!({ "title": issue.title, "body": issue.body, "labels": issue.labels });
        let response = self.github.send_json(Method::POST, url, body).await?;
        let raw: RawIssue = response.json().await?;
        Ok(raw.into())
    }

    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn add_sub_issue(&self, parent: u64, child_id: u64) -> GitHubResult<()> {
        let url = self.repo_url(&["issues", parent.to_string().as_str(), "sub_issues"])?;
        self.github
            .send_json(Method::POST, url, json!({ "sub_issue_id": child_id }))
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(repo = %self.repo))]
    async fn sub_issues(&self, parent: u64) -> GitHubResult<Vec<Issue>> {
        let url = self.repo_url(&["issues", parent.to_string().as_str(), "sub_issues"])?;
        let raw: Vec<RawIssue> = self.github.get_all(url).await?;
        Ok(raw.into_iter().map(Issue::from).collect())
    }

    #[instrument(skip(self, body), fields(repo = %self.repo))]
    async fn update_body(&self, number: u64, body: &str) -> GitHubResult<()> {
        let url = self.repo_url(&["issues", number.to_string().as_str()])?;
        self.github
            .send_json(Method::PATCH, url, json!({ "body": body }))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, body), fields(repo = %self.repo))]
    async fn add_comment(&self, number: u64, body: &str) -> GitHubResult<()> {
        let url = self.repo_url(&["issues", number.to_string().as_str(), "comments"])?;
        self.github
            .send_json(Method::POST, url, json!({ "body": body }))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, comment), fields(repo = %self.repo))]
    async fn close_issue(&self, number: u64, comment: Option<&str>) -> GitHubResult<()> {
        if let Some(comment) = comment {
            self.add_comment(number, comment).await?;
        }
        let url = self.repo_url(&["issues", number.to_string().as_str()])?;
        self.github
            .send_json(Method::PATCH, url, json!({ "state": "closed" }))
            .await?;
        Ok(())
    }
}
