use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use triage_core::{Repository, Session, TerminalPrompter, TriageConfig};

const USAGE: &str = "usage: git-cherry-triage <upstream> <head>";

#[derive(Parser, Debug)]
#[command(name = "git-cherry-triage")]
#[command(
    version,
    about = "Review upstream commits missing from a branch and cherry-pick them",
    long_about = None
)]
struct Cli {
    /// Branch the candidate commits come from
    upstream: String,

    /// Branch the commits are cherry-picked onto
    head: String,

    /// Substring of the author email that marks your commits
    /// (defaults to `cherry-triage.author`, then `user.email` from git config)
    #[arg(short, long, env = "CHERRY_TRIAGE_AUTHOR")]
    author: Option<String>,

    /// Directory for the ignore list and review marker (defaults to the temp dir)
    #[arg(long, env = "CHERRY_TRIAGE_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Echo every git command that changes or scans history
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
            _ => {
                eprintln!("{USAGE}");
                std::process::exit(2);
            }
        },
    };

    init_logging(cli.verbose);

    let cwd = std::env::current_dir().context("Reading the current directory")?;
    let repo = Repository::discover(&cwd)?;
    let config =
        TriageConfig::resolve(&repo, cli.upstream, cli.head, cli.author, cli.state_dir)?;
    debug!(?config, "starting triage");

    // The session blocks on git and on the terminal; the runtime only waits
    // for it to finish or for Ctrl-C, whichever comes first.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Starting the runtime")?;
    let finished = runtime.block_on(async move {
        let session = tokio::task::spawn_blocking(move || {
            Session::new(&repo, &config, TerminalPrompter, io::stdout())
                .run()
                .map(|_| ())
        });
        tokio::select! {
            joined = session => Some(joined),
            _ = tokio::signal::ctrl_c() => None,
        }
    });

    match finished {
        Some(joined) => match joined.context("Triage session panicked")? {
            Err(err) if err.is_interrupted() => report_interrupted(&mut io::stdout())?,
            result => result?,
        },
        None => {
            report_interrupted(&mut io::stdout())?;
            // Don't wait for the blocked session thread.
            runtime.shutdown_background();
        }
    }
    Ok(())
}

fn report_interrupted(out: &mut impl Write) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "interrupted")
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
