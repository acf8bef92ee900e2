//! gitlet - a minimal version-control system
//!
//! This is the main entry point for the gitlet command-line interface.
//! It maps argv onto [`Repository`] methods and prints their results.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

use gitlet::engine::{GitletError, GitletResult, Repository, RepositoryConfig};

#[derive(Parser)]
#[command(name = "gitlet", version, about = "A minimal version-control system")]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Enable debug logging on stderr (only before the command name)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new repository in the current directory
    Init,
    /// Stage a file for the next commit
    Add { file: String },
    /// Record the staged changes
    #[command(disable_help_flag = true)]
    Commit {
        #[arg(allow_hyphen_values = true)]
        message: String,
    },
    /// Unstage a file or stage it for removal
    Rm { file: String },
    /// Show the current branch's history
    Log,
    /// Show every commit ever made
    #[command(name = "global-log")]
    GlobalLog,
    /// Print the ids of commits with the given message
    #[command(disable_help_flag = true)]
    Find {
        #[arg(allow_hyphen_values = true)]
        message: String,
    },
    /// Show branches, stages and working-directory changes
    Status,
    /// `checkout <branch>`, `checkout -- <file>` or `checkout <id> -- <file>`
    Checkout {
        target: Option<String>,
        #[arg(last = true)]
        file: Vec<String>,
    },
    /// Create a branch at the current commit
    Branch { name: String },
    /// Delete a branch
    #[command(name = "rm-branch")]
    RmBranch { name: String },
    /// Move the current branch to a commit
    Reset { commit: String },
    /// Merge a branch into the current one
    Merge { branch: String },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return dispatch_error(e),
    };

    let work_dir = std::env::var_os("GITLET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    let config =
        RepositoryConfig::new(work_dir).verbose(cli.verbose || env_flag("GITLET_VERBOSE"));
    init_logging(config.verbose);

    let Some(command) = cli.command else {
        println!("Please enter a command.");
        return ExitCode::FAILURE;
    };

    match run(command, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_corruption() {
                error!(error = %e, "repository data is damaged");
            } else if !e.is_user_error() {
                error!(error = %e, "command failed");
            }
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, config: RepositoryConfig) -> GitletResult<()> {
    let repo = match command {
        Command::Init => {
            Repository::init(config)?;
            return Ok(());
        }
        _ => Repository::open(config)?,
    };

    match command {
        Command::Init => {}
        Command::Add { file } => repo.add(&file)?,
        Command::Commit { message } => {
            repo.commit(&message)?;
        }
        Command::Rm { file } => repo.rm(&file)?,
        Command::Log => print!("{}", repo.log()?),
        Command::GlobalLog => print!("{}", repo.global_log()?),
        Command::Find { message } => {
            for id in repo.find(&message)? {
                println!("{}", id);
            }
        }
        Command::Status => print!("{}", repo.status()?),
        Command::Checkout { target, file } => match (target, file.as_slice()) {
            (Some(branch), []) => repo.checkout_branch(&branch)?,
            (None, [file]) => repo.checkout_file(file)?,
            (Some(commit), [file]) => repo.checkout_file_at(&commit, file)?,
            _ => return Err(GitletError::IncorrectOperands),
        },
        Command::Branch { name } => repo.branch(&name)?,
        Command::RmBranch { name } => repo.rm_branch(&name)?,
        Command::Reset { commit } => repo.reset(&commit)?,
        Command::Merge { branch } => print!("{}", repo.merge(&branch)?),
    }
    Ok(())
}

/// Report argv problems with the dispatcher's messages.
fn dispatch_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        ErrorKind::InvalidSubcommand => println!("No command with that name exists."),
        ErrorKind::MissingSubcommand | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            println!("Please enter a command.")
        }
        _ => println!("{}", GitletError::IncorrectOperands),
    }
    ExitCode::FAILURE
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Logs go to stderr so that command output on stdout stays clean.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
