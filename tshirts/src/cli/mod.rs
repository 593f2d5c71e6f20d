//! CLI module
//!
//! This module provides:
//! - CLI argument definitions (args)
//! - Line-oriented terminal interaction (console)
//! - Repository resolution and command dispatch

pub mod args;
pub mod console;

pub use args::{Cli, Commands};
pub use console::Console;

use std::io::{BufRead, Write};

use tracing::debug;

use crate::ai::AiBackend;
use crate::commands;
use crate::config::{Config, ENV_REPO};
use crate::error::{Error, Result};
use crate::github::{IssueHost, IssueTracker};
use crate::repo::{resolve_repo, RepoRef, RepoSource};

/// Settle which repository the command runs against
///
/// Falls back to an interactive picker over the user's repositories when
/// nothing else names one and `interactive` is set.
pub async fn resolve_repository<R, W, F>(
    config: &Config,
    host: &dyn IssueHost,
    console: &mut Console<R, W>,
    interactive: bool,
    git_remote: F,
) -> Result<RepoRef>
where
    R: BufRead,
    W: Write,
    F: FnOnce() -> Option<RepoRef>,
{
    let (flag, env) = match (&config.repo, config.repo_from_flag) {
        (Some(repo), true) => (Some(repo.as_str()), None),
        (Some(repo), false) => (None, Some(repo.as_str())),
        (None, _) => (None, None),
    };

    let (repo, source) = match resolve_repo(flag, env, git_remote)? {
        Some(found) => found,
        None if interactive => {
            let repos = host.user_repos().await?;
            (console.pick_repo(&repos)?, RepoSource::Interactive)
        }
        None => {
            return Err(Error::Config(format!(
                "no repository given: pass --repo owner/name, set {ENV_REPO}, or run inside a GitHub checkout"
            )))
        }
    };

    debug!(%repo, ?source, "resolved repository");
    Ok(repo)
}

/// Run one subcommand against `tracker`
pub async fn run<R: BufRead, W: Write>(
    command: &Commands,
    tracker: &dyn IssueTracker,
    ai: &dyn AiBackend,
    console: &mut Console<R, W>,
) -> Result<()> {
    match command {
        Commands::Estimate { interactive } => {
            commands::estimate::run(tracker, ai, console, *interactive).await?;
        }
        Commands::Breakdown { issue, create } => {
            commands::breakdown::run(tracker, ai, console, *issue, *create).await?;
        }
        Commands::New => {
            commands::new::run(tracker, ai, console).await?;
        }
        Commands::Groom { issue: None } => {
            commands::groom::list(tracker, console).await?;
        }
        Commands::Groom { issue: Some(issue) } => {
            commands::groom::refine(tracker, ai, console, *issue).await?;
        }
        Commands::Close { issue } => {
            commands::close::run(tracker, ai, console, *issue).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryHost, ScriptedBackend};

    fn config(repo: Option<&str>, from_flag: bool) -> Config {
        Config {
            repo: repo.map(String::from),
            repo_from_flag: from_flag,
            ..Config::default()
        }
    }

    fn console(input: &'static str) -> Console<&'static [u8], Vec<u8>> {
        Console::new(input.as_bytes(), Vec::new())
    }

    #[tokio::test]
    async fn test_flag_beats_git_remote() {
        let host = MemoryHost::new();
        let mut console = console("");
        let repo = resolve_repository(&config(Some("a/b"), true), &host, &mut console, true, || {
            Some(RepoRef::new("git", "remote").unwrap())
        })
        .await
        .unwrap();
        assert_eq!(repo.to_string(), "a/b");
    }

    #[tokio::test]
    async fn test_git_remote_when_nothing_configured() {
        let host = MemoryHost::new();
        let mut console = console("");
        let repo = resolve_repository(&config(None, false), &host, &mut console, false, || {
            Some(RepoRef::new("git", "remote").unwrap())
        })
        .await
        .unwrap();
        assert_eq!(repo.to_string(), "git/remote");
    }

    #[tokio::test]
    async fn test_malformed_env_is_config_error() {
        let host = MemoryHost::new();
        let mut console = console("");
        let err = resolve_repository(&config(Some("not-a-repo"), false), &host, &mut console, true, || None)
            .await
            .unwrap_err();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn test_picker_when_interactive() {
        let host = MemoryHost::new();
        host.tracker_for(&RepoRef::new("me", "one").unwrap());
        host.tracker_for(&RepoRef::new("me", "two").unwrap());
        let mut console = console("2\n");
        let repo = resolve_repository(&config(None, false), &host, &mut console, true, || None)
            .await
            .unwrap();
        assert_eq!(repo.to_string(), "me/two");
    }

    #[tokio::test]
    async fn test_no_source_without_terminal() {
        let host = MemoryHost::new();
        let mut console = console("");
        let err = resolve_repository(&config(None, false), &host, &mut console, false, || None)
            .await
            .unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("--repo"));
    }

    #[tokio::test]
    async fn test_dispatch_groom_list() {
        let host = MemoryHost::new();
        let tracker = host.tracker_for(&RepoRef::new("o", "r").unwrap());
        tracker.seed(1, "Vague", "", &[]);
        let ai = ScriptedBackend::new();
        let mut console = console("");

        run(&Commands::Groom { issue: None }, tracker.as_ref(), &ai, &mut console)
            .await
            .unwrap();

        assert_eq!(ai.calls(), 0);
        assert!(String::from_utf8_lossy(console.output()).contains("#1 [?]: Vague"));
    }
}
