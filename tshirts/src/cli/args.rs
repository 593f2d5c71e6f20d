//! CLI argument definitions

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tshirts")]
#[command(version, about = "Size, break down and draft GitHub issues with an LLM")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// GitHub repository as owner/name (default: $TSHIRTS_REPO, then the origin remote)
    #[arg(short, long, global = true)]
    pub repo: Option<String>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Assign size labels (XS, S, M, L, XL) to open issues without one
    Estimate {
        /// Review each estimate before it is applied
        #[arg(short, long)]
        interactive: bool,
    },
    /// Break an issue down into smaller sub-tasks
    Breakdown {
        /// Issue number
        issue: u64,
        /// Create the sub-tasks as linked sub-issues
        #[arg(long)]
        create: bool,
    },
    /// Draft new issues through a conversation
    New,
    /// List issues that need refinement, or refine one
    #[command(visible_alias = "refine")]
    Groom {
        /// Issue to refine; lists candidates when omitted
        issue: Option<u64>,
    },
    /// Close an issue with a generated closing comment
    Close {
        /// Issue number
        issue: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_flags() {
        let cli = Cli::parse_from(["tshirts", "estimate", "--interactive"]);
        assert_eq!(cli.command, Commands::Estimate { interactive: true });
        assert_eq!(cli.verbose, 0);
        assert!(cli.repo.is_none());
    }

    #[test]
    fn test_global_repo_after_subcommand() {
        let cli = Cli::parse_from(["tshirts", "breakdown", "42", "--create", "--repo", "o/r", "-vv"]);
        assert_eq!(cli.command, Commands::Breakdown { issue: 42, create: true });
        assert_eq!(cli.repo.as_deref(), Some("o/r"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_refine_is_groom() {
        let cli = Cli::parse_from(["tshirts", "refine", "7"]);
        assert_eq!(cli.command, Commands::Groom { issue: Some(7) });
        let cli = Cli::parse_from(["tshirts", "groom"]);
        assert_eq!(cli.command, Commands::Groom { issue: None });
    }

    #[test]
    fn test_rejects_non_numeric_issue() {
        assert!(Cli::try_parse_from(["tshirts", "close", "abc"]).is_err());
        assert!(Cli::try_parse_from(["tshirts", "breakdown"]).is_err());
    }
}
