use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tshirts::ai::{AiBackend, ClaudeCli};
use tshirts::cli::{self, Cli, Console};
use tshirts::config::{Config, Overrides};
use tshirts::github::{GitHub, IssueHost};
use tshirts::repo::detect_repo_from_git;

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,tshirts={level}")));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(Overrides { repo: cli.repo.clone() })?;
    let token = config.require_token()?.to_string();
    let github = GitHub::new(&config.api_url, Some(token))?;

    let mut console = Console::stdio();
    let interactive = atty::is(atty::Stream::Stdin);
    let cwd = std::env::current_dir()?;
    let repo = cli::resolve_repository(&config, &github, &mut console, interactive, || {
        detect_repo_from_git(&cwd)
    })
    .await?;

    let tracker = github.tracker(&repo);
    let ai = ClaudeCli::new(&config.ai);
    tracing::debug!(%repo, model = ai.model(), "starting");

    cli::run(&cli.command, tracker.as_ref(), &ai, &mut console).await?;
    Ok(())
}
