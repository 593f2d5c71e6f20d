//! MCP Server implementation
//!
//! Tools wrap the same library calls the CLI commands use. Every call is
//! stateless: the repository comes from the parameters, and conversations
//! are a single turn (`context` carries any earlier answers).

use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, Implementation, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParam, RawResource, ReadResourceRequestParam, ReadResourceResult, Resource,
        ResourceContents, ResourceTemplate, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use serde_json::json;
use tracing::{info, warn};

use mcp_common::{internal_error, invalid_params, json_success, resource_not_found, McpResult};
use tshirts::ai::{self, AiBackend, ClaudeCli, Conversation, DraftReply, RefineReply, Subtask};
use tshirts::commands;
use tshirts::config::{Config, Overrides};
use tshirts::github::{
    ensure_size_labels, groomable_issues, partition_by_state, unestimated_issues, GitHub, IssueHost, IssueTracker,
    NewIssue,
};
use tshirts::{RepoRef, Size};

use crate::error::{github_error, tool_error};
use crate::params::*;
use crate::resources::{self, IssueResource};

/// The tshirts MCP Server
#[derive(Clone)]
pub struct TshirtsMcpServer {
    host: Arc<dyn IssueHost>,
    ai: Arc<dyn AiBackend>,
    /// Advertised as concrete resources in `resources/list`
    default_repo: Option<RepoRef>,
    tool_router: ToolRouter<Self>,
}

fn parse_size(raw: &str) -> McpResult<Size> {
    raw.parse().map_err(|e: tshirts::size::InvalidSize| invalid_params(e.to_string()))
}

fn parse_optional_size(raw: Option<&str>) -> McpResult<Option<Size>> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(parse_size).transpose()
}

#[tool_router]
impl TshirtsMcpServer {
    pub fn new(host: Arc<dyn IssueHost>, ai: Arc<dyn AiBackend>, default_repo: Option<RepoRef>) -> Self {
        Self {
            host,
            ai,
            default_repo,
            tool_router: Self::tool_router(),
        }
    }

    /// Server backed by the GitHub REST API and the `claude` CLI
    ///
    /// A missing `GITHUB_TOKEN` does not stop startup; each call then fails
    /// with an error naming the variable.
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Config::load(Overrides::default())?;
        let github = GitHub::new(&config.api_url, config.github_token.clone())?;
        if config.github_token.is_none() {
            warn!("GITHUB_TOKEN is not set; every tool call will fail until it is");
        }

        let default_repo = match config.repo.as_deref().map(str::parse::<RepoRef>).transpose() {
            Ok(repo) => repo,
            Err(e) => {
                warn!(error = %e, "ignoring default repository");
                None
            }
        };
        let ai = ClaudeCli::new(&config.ai);
        info!(model = ai.model(), default_repo = ?default_repo, "configured");

        Ok(Self::new(Arc::new(github), Arc::new(ai), default_repo))
    }

    fn tracker(&self, repo: &str) -> McpResult<Arc<dyn IssueTracker>> {
        let repo: RepoRef = repo.parse().map_err(tool_error)?;
        Ok(self.host.tracker(&repo))
    }

    // ========================================================================
    // Analysis tools
    // ========================================================================

    #[tool(description = "Estimate the t-shirt size (XS, S, M, L, XL) of a GitHub issue from its scope, \
                          complexity, risk and unknowns. Does not modify the issue.")]
    async fn estimate_issue(&self, Parameters(params): Parameters<IssueRefParams>) -> McpResult<CallToolResult> {
        let tracker = self.tracker(&params.repo)?;
        let issue = tracker.issue(params.issue_number).await.map_err(github_error)?;
        let estimate = ai::estimate(self.ai.as_ref(), &issue).await.map_err(tool_error)?;

        json_success(&json!({
            "issue_number": issue.number,
            "title": issue.title,
            "size": estimate.size,
            "label": estimate.size.label(),
            "rationale": estimate.rationale,
        }))
    }

    #[tool(description = "Break a large issue down into smaller actionable subtasks, each with a title, \
                          description and size. Does not create anything; see create_subtasks.")]
    async fn breakdown_issue(&self, Parameters(params): Parameters<IssueRefParams>) -> McpResult<CallToolResult> {
        let tracker = self.tracker(&params.repo)?;
        let issue = tracker.issue(params.issue_number).await.map_err(github_error)?;
        let subtasks = ai::breakdown(self.ai.as_ref(), &issue).await.map_err(tool_error)?;

        let subtasks: Vec<_> = subtasks
            .iter()
            .map(|t| json!({"title": t.title, "description": t.body, "size": t.size}))
            .collect();
        json_success(&json!({
            "issue_number": issue.number,
            "subtasks": subtasks,
        }))
    }

    #[tool(description = "Draft well-structured issue(s) from a natural language description. Returns \
                          drafts with title, description, size and tasks, or needs_clarification with a \
                          question to answer in a follow-up call.")]
    async fn draft_issue(&self, Parameters(params): Parameters<DraftIssueParams>) -> McpResult<CallToolResult> {
        if params.description.trim().is_empty() {
            return Err(invalid_params("description must not be empty"));
        }
        let conversation = Conversation::starting_with(params.description);

        match ai::draft(self.ai.as_ref(), &conversation).await.map_err(tool_error)? {
            DraftReply::Question(question) => json_success(&json!({
                "needs_clarification": true,
                "question": question,
            })),
            DraftReply::Ready(drafts) => json_success(&json!({
                "needs_clarification": false,
                "issues": drafts,
            })),
        }
    }

    #[tool(description = "Review an issue for clarity, completeness and actionability. Returns suggestions \
                          and either a refined description (ready=true) or a clarifying question; pass \
                          the answer back as context.")]
    async fn refine_issue(&self, Parameters(params): Parameters<RefineIssueParams>) -> McpResult<CallToolResult> {
        let tracker = self.tracker(&params.repo)?;
        let issue = tracker.issue(params.issue_number).await.map_err(github_error)?;
        let conversation = match params.context.filter(|c| !c.trim().is_empty()) {
            Some(context) => Conversation::starting_with(context),
            None => Conversation::new(),
        };

        let reply = ai::refine(self.ai.as_ref(), &issue, &conversation)
            .await
            .map_err(tool_error)?;
        let mut result = json!({
            "issue_number": issue.number,
            "title": issue.title,
            "ready": matches!(reply, RefineReply::Refined { .. }),
            "suggestions": reply.suggestions(),
        });
        match reply {
            RefineReply::Refined { description, .. } => result["refined_description"] = json!(description),
            RefineReply::Question { question, .. } => result["question"] = json!(question),
        }
        json_success(&result)
    }

    #[tool(description = "Find open issues that duplicate, contain or overlap a proposed new issue. \
                          Use before create_issue.")]
    async fn find_similar_issues(&self, Parameters(params): Parameters<FindSimilarParams>) -> McpResult<CallToolResult> {
        let tracker = self.tracker(&params.repo)?;
        let existing = tracker.open_issues().await.map_err(github_error)?;
        let similar = ai::find_similar(self.ai.as_ref(), &params.title, &params.description, &existing)
            .await
            .map_err(tool_error)?;
        json_success(&similar)
    }

    #[tool(description = "Generate a closing comment for an issue from its content and completed \
                          sub-issues, and report how many sub-issues are still open.")]
    async fn generate_closing_comment(
        &self,
        Parameters(params): Parameters<ClosingCommentParams>,
    ) -> McpResult<CallToolResult> {
        let tracker = self.tracker(&params.repo)?;
        let issue = tracker.issue(params.issue_number).await.map_err(github_error)?;
        let subs = tracker.sub_issues(issue.number).await.map_err(github_error)?;
        let (open, closed) = partition_by_state(subs);

        let comment = ai::closing_comment(self.ai.as_ref(), &issue, &closed, params.reason.as_deref())
            .await
            .map_err(tool_error)?;
        json_success(&json!({
            "issue_number": issue.number,
            "comment": comment,
            "open_subtasks": open.len(),
            "closed_subtasks": closed.len(),
        }))
    }

    // ========================================================================
    // Action tools
    // ========================================================================

    #[tool(description = "Apply a t-shirt size label (XS, S, M, L, XL) to an issue, replacing any \
                          existing size label.")]
    async fn apply_size_label(&self, Parameters(params): Parameters<ApplySizeLabelParams>) -> McpResult<CallToolResult> {
        let size = parse_size(&params.size)?;
        let tracker = self.tracker(&params.repo)?;
        tracker.issue(params.issue_number).await.map_err(github_error)?;

        ensure_size_labels(tracker.as_ref()).await.map_err(github_error)?;
        tracker
            .set_size_label(params.issue_number, size)
            .await
            .map_err(github_error)?;
        json_success(&json!({
            "issue_number": params.issue_number,
            "label": size.label(),
            "status": "applied",
        }))
    }

    #[tool(description = "Create a new GitHub issue, optionally with a size label and extra labels.")]
    async fn create_issue(&self, Parameters(params): Parameters<CreateIssueParams>) -> McpResult<CallToolResult> {
        let size = parse_optional_size(params.size.as_deref())?;
        let tracker = self.tracker(&params.repo)?;

        let mut new = NewIssue::new(&params.title, &params.body);
        for label in params.labels.unwrap_or_default() {
            new = new.with_label(label);
        }
        if size.is_some() {
            ensure_size_labels(tracker.as_ref()).await.map_err(github_error)?;
        }
        let issue = tracker.create_issue(new.with_size(size)).await.map_err(github_error)?;

        json_success(&json!({
            "issue_number": issue.number,
            "title": issue.title,
            "url": issue.url,
        }))
    }

    #[tool(description = "Create subtask issues in order, link each as a sub-issue of the parent, and post \
                          a summary comment on the parent. Stops at the first failure; issues created \
                          before it are kept and listed in the error.")]
    async fn create_subtasks(&self, Parameters(params): Parameters<CreateSubtasksParams>) -> McpResult<CallToolResult> {
        if params.subtasks.is_empty() {
            return Err(invalid_params("subtasks must not be empty"));
        }
        let tasks = params
            .subtasks
            .iter()
            .map(|t| -> McpResult<Subtask> {
                Ok(Subtask {
                    title: t.title.clone(),
                    body: t.description.clone().unwrap_or_default(),
                    size: parse_optional_size(t.size.as_deref())?,
                })
            })
            .collect::<McpResult<Vec<_>>>()?;

        let tracker = self.tracker(&params.repo)?;
        let parent = tracker.issue(params.parent_issue).await.map_err(github_error)?;
        let outcome = commands::create_subtasks(tracker.as_ref(), &parent, &tasks).await;

        if let Some(e) = outcome.failure {
            let mut err = tool_error(e);
            if !outcome.created.is_empty() {
                let created: Vec<String> = outcome.created.iter().map(|i| format!("#{}", i.number)).collect();
                err.message = format!("{} (already created: {})", err.message, created.join(", ")).into();
            }
            return Err(err);
        }

        let created: Vec<_> = outcome
            .created
            .iter()
            .map(|i| json!({"issue_number": i.number, "title": i.title, "url": i.url}))
            .collect();
        json_success(&json!({
            "parent_issue": parent.number,
            "subtasks_created": created.len(),
            "subtasks": created,
        }))
    }

    #[tool(description = "Replace the body of a GitHub issue.")]
    async fn update_issue_body(&self, Parameters(params): Parameters<UpdateIssueBodyParams>) -> McpResult<CallToolResult> {
        let tracker = self.tracker(&params.repo)?;
        tracker
            .update_body(params.issue_number, &params.body)
            .await
            .map_err(github_error)?;
        json_success(&json!({
            "issue_number": params.issue_number,
            "status": "updated",
        }))
    }

    #[tool(description = "Close a GitHub issue, posting the optional comment first.")]
    async fn close_issue(&self, Parameters(params): Parameters<CloseIssueParams>) -> McpResult<CallToolResult> {
        let tracker = self.tracker(&params.repo)?;
        let comment = params.comment.filter(|c| !c.trim().is_empty());
        tracker
            .close_issue(params.issue_number, comment.as_deref())
            .await
            .map_err(github_error)?;
        json_success(&json!({
            "issue_number": params.issue_number,
            "status": "closed",
            "comment_added": comment.is_some(),
        }))
    }
}

// ============================================================================
// Resources
// ============================================================================

impl TshirtsMcpServer {
    /// Concrete resources: the repository list, plus the default
    /// repository's issue views when one is configured
    pub fn resource_list(&self) -> Vec<Resource> {
        let mut listed = vec![(IssueResource::Repos, "Repositories")];
        if let Some(repo) = &self.default_repo {
            listed.push((IssueResource::OpenIssues(repo.clone()), "Open issues"));
            listed.push((IssueResource::Unestimated(repo.clone()), "Issues without size labels"));
            listed.push((IssueResource::Groomable(repo.clone()), "Issues that may need refinement"));
        }
        listed
            .into_iter()
            .map(|(res, name)| {
                let mut raw = RawResource::new(res.to_string(), name.to_string());
                raw.mime_type = Some("text/plain".to_string());
                raw.no_annotation()
            })
            .collect()
    }

    pub fn resource_templates() -> McpResult<Vec<ResourceTemplate>> {
        [
            ("github://{owner}/{repo}/issues", "open-issues", "Open issues with their labels"),
            ("github://{owner}/{repo}/issues/{issue_number}", "issue", "Title, labels and body of one issue"),
            ("github://{owner}/{repo}/issues/unestimated", "unestimated-issues", "Open issues without a size label"),
            ("github://{owner}/{repo}/issues/groomable", "groomable-issues", "Open issues that may need refinement"),
        ]
        .into_iter()
        .map(|(uri_template, name, description)| {
            serde_json::from_value(json!({
                "uriTemplate": uri_template,
                "name": name,
                "description": description,
                "mimeType": "text/plain",
            }))
            .map_err(|e| internal_error(e.to_string()))
        })
        .collect()
    }

    /// Text of the resource at `uri`
    pub async fn read_text(&self, uri: &str) -> McpResult<String> {
        let resource = IssueResource::parse(uri).ok_or_else(|| resource_not_found(uri))?;
        let tracker = resource.repo().map(|repo| self.host.tracker(repo));

        let text = match (&resource, tracker) {
            (IssueResource::Repos, _) => {
                let repos = self.host.user_repos().await.map_err(github_error)?;
                resources::render_repos(&repos)
            }
            (IssueResource::OpenIssues(repo), Some(t)) => {
                let issues = t.open_issues().await.map_err(github_error)?;
                resources::render_open_issues(repo, &issues)
            }
            (IssueResource::Issue(_, number), Some(t)) => {
                let issue = t.issue(*number).await.map_err(|e| match e {
                    tshirts::github::GitHubError::NotFound(_) => resource_not_found(uri),
                    other => github_error(other),
                })?;
                resources::render_issue(&issue)
            }
            (IssueResource::Unestimated(repo), Some(t)) => {
                let issues = unestimated_issues(t.as_ref()).await.map_err(github_error)?;
                resources::render_unestimated(repo, &issues)
            }
            (IssueResource::Groomable(repo), Some(t)) => {
                let issues = groomable_issues(t.as_ref()).await.map_err(github_error)?;
                resources::render_groomable(repo, &issues)
            }
            (_, None) => return Err(resource_not_found(uri)),
        };
        Ok(text)
    }
}

#[tool_handler]
impl ServerHandler for TshirtsMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "tshirts MCP Server - sizes GitHub issues (XS-XL), breaks them into sub-issues, drafts \
                 and refines issues, and writes closing comments using an LLM. Analysis tools never \
                 modify GitHub; action tools do. Requires GITHUB_TOKEN."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().enable_resources().build(),
            server_info: Implementation {
                name: "tshirts".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(self.resource_list()))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(Self::resource_templates()?))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let text = self.read_text(&request.uri).await?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri)],
        })
    }
}
