//! Resource reads against in-memory GitHub and AI fakes

use std::sync::Arc;

use rmcp::model::ErrorCode;
use tshirts::testing::{MemoryHost, ScriptedBackend};
use tshirts::RepoRef;
use tshirts_mcp::TshirtsMcpServer;

fn acme() -> RepoRef {
    RepoRef::new("acme", "web").unwrap()
}

fn server_with_issues(default_repo: Option<RepoRef>) -> TshirtsMcpServer {
    let host = Arc::new(MemoryHost::new());
    let tracker = host.tracker_for(&acme());
    tracker.seed(1, "Login", "Users sign in with GitHub OAuth and land on the dashboard.", &["size: S"]);
    tracker.seed(2, "Logout", "Sign out from every page, clearing the session cookie.", &[]);
    tracker.seed(3, "Typo", "", &["size: XS"]);
    TshirtsMcpServer::new(host, Arc::new(ScriptedBackend::new()), default_repo)
}

#[tokio::test]
async fn read_open_issues() {
    let server = server_with_issues(None);
    let text = server.read_text("github://acme/web/issues").await.unwrap();
    assert!(text.starts_with("Open issues in acme/web:"));
    assert!(text.contains("#1: Login [size: S]"));
    assert!(text.contains("#2: Logout [no labels]"));
}

#[tokio::test]
async fn read_single_issue() {
    let server = server_with_issues(None);
    let text = server.read_text("github://acme/web/issues/3").await.unwrap();
    assert_eq!(text, "Issue #3: Typo\nLabels: size: XS\n\n(no description)");
}

#[tokio::test]
async fn read_unestimated_and_groomable() {
    let server = server_with_issues(None);

    let unestimated = server.read_text("github://acme/web/issues/unestimated").await.unwrap();
    assert!(unestimated.contains("#2: Logout"));
    assert!(!unestimated.contains("#1"));

    let groomable = server.read_text("github://acme/web/issues/groomable").await.unwrap();
    assert!(groomable.contains("#1 [S]: Login"));
    assert!(!groomable.contains("Typo"));
    assert!(!groomable.contains("Logout"));
}

#[tokio::test]
async fn read_repos() {
    let server = server_with_issues(None);
    let text = server.read_text("github://repos").await.unwrap();
    assert_eq!(text, "Your repositories:\nacme/web");
}

#[tokio::test]
async fn unknown_uri_and_missing_issue_are_not_found() {
    let server = server_with_issues(None);
    for uri in ["github://acme/web/pulls", "github://acme/web/issues/99"] {
        let err = server.read_text(uri).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RESOURCE_NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn default_repo_is_listed() {
    let without = server_with_issues(None).resource_list();
    assert_eq!(without.len(), 1);

    let with = server_with_issues(Some(acme())).resource_list();
    let uris: Vec<&str> = with.iter().map(|r| r.uri.as_str()).collect();
    assert_eq!(
        uris,
        vec![
            "github://repos",
            "github://acme/web/issues",
            "github://acme/web/issues/unestimated",
            "github://acme/web/issues/groomable",
        ]
    );
}

#[test]
fn templates_cover_every_issue_view() {
    let templates = TshirtsMcpServer::resource_templates().unwrap();
    let uris: Vec<&str> = templates.iter().map(|t| t.uri_template.as_str()).collect();
    assert_eq!(uris.len(), 4);
    assert!(uris.contains(&"github://{owner}/{repo}/issues/{issue_number}"));
}
