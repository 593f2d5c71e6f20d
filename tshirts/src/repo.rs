//! Target repository resolution
//!
//! Precedence: `--repo` flag, then `TSHIRTS_REPO`, then the `origin` remote
//! of the current checkout. Interactive selection is the CLI's last resort
//! and lives in [`crate::cli::console`].

use std::fmt;
use std::path::Path;
use std::process::Command;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// An `owner/name` repository reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let name = name.into();
        if !valid_part(&owner) || !valid_part(&name) {
            return Err(Error::Config(format!(
                "invalid repository '{owner}/{name}': expected owner/name"
            )));
        }
        Ok(Self { owner, name })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Web URL of an issue in this repository
    pub fn issue_url(&self, number: u64) -> String {
        format!("https://github.com/{}/{}/issues/{}", self.owner, self.name, number)
    }
}

fn valid_part(part: &str) -> bool {
    !part.is_empty() && !part.contains(char::is_whitespace) && part != "." && part != ".."
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] => RepoRef::new(*owner, *name),
            _ => Err(Error::Config(format!(
                "invalid repository '{s}': expected owner/name"
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl TryFrom<String> for RepoRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RepoRef> for String {
    fn from(repo: RepoRef) -> Self {
        repo.to_string()
    }
}

/// Where a resolved repository came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoSource {
    Flag,
    Env,
    GitRemote,
    Interactive,
}

/// Extract `owner/name` from a github.com remote URL
///
/// Accepts `https://`, `http://`, `ssh://git@` and scp-style `git@` forms,
/// with or without a trailing `.git`. Other hosts yield `None`.
pub fn parse_github_remote(url: &str) -> Option<RepoRef> {
    let normalized = url.trim().trim_end_matches('/').trim_end_matches(".git");
    let path = ["https://github.com/", "http://github.com/", "ssh://git@github.com/", "git@github.com:"]
        .iter()
        .find_map(|prefix| normalized.strip_prefix(prefix))?;

    let mut parts = path.split('/');
    let owner = parts.next()?;
    let name = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    RepoRef::new(owner, name).ok()
}

/// `owner/name` of the `origin` remote of the checkout containing `dir`
pub fn detect_repo_from_git(dir: &Path) -> Option<RepoRef> {
    let output = Command::new("git")
        .args(["remote", "get-url", "origin"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        debug!("no origin remote in {}", dir.display());
        return None;
    }
    parse_github_remote(&String::from_utf8_lossy(&output.stdout))
}

/// Resolve the repository from the non-interactive sources
///
/// A flag or env value that is present but malformed is an error rather
/// than a reason to fall through to the next source. `git_remote` is only
/// consulted when neither is set.
pub fn resolve_repo<F>(
    flag: Option<&str>,
    env: Option<&str>,
    git_remote: F,
) -> Result<Option<(RepoRef, RepoSource)>>
where
    F: FnOnce() -> Option<RepoRef>,
{
    fn non_empty(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|v| !v.is_empty())
    }

    if let Some(flag) = non_empty(flag) {
        return Ok(Some((flag.parse()?, RepoSource::Flag)));
    }
    if let Some(env) = non_empty(env) {
        return Ok(Some((env.parse()?, RepoSource::Env)));
    }
    Ok(git_remote().map(|repo| (repo, RepoSource::GitRemote)))
}
