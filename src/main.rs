//! CLI entry point for grove

use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use grove::{Mark, PathFilter, SearchConfig, WalkOutcome, WalkerConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(about = "Find and tidy the git repositories under a directory tree")]
#[command(version)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Maximum number of directories processed at once
    /// (0 = unlimited, 1 = one at a time)
    #[arg(
        short = 'j',
        long = "jobs",
        default_value = "0",
        allow_negative_numbers = true,
        global = true
    )]
    jobs: isize,

    /// Descend into symbolic links to directories
    #[arg(long = "follow-links", global = true)]
    follow_links: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct RootArgs {
    /// Directory to search
    #[arg(env = "GROVE_ROOT", default_value = ".")]
    root: PathBuf,

    /// Search this directory as well (can be used multiple times)
    #[arg(long = "also", value_name = "DIR")]
    also: Vec<PathBuf>,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List repositories
    List {
        #[command(flatten)]
        roots: RootArgs,

        /// Only list repositories whose path below the root matches
        /// (can be used multiple times)
        #[arg(short = 'p', long = "pattern", value_name = "GLOB")]
        patterns: Vec<String>,
    },

    /// List directories that contain nothing but empty directories,
    /// innermost first
    Sweep {
        #[command(flatten)]
        roots: RootArgs,

        /// Delete the listed directories
        #[arg(long = "remove")]
        remove: bool,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn search_config(cli: &Cli, roots: &RootArgs) -> SearchConfig {
    SearchConfig {
        root: roots.root.clone(),
        extra_roots: roots.also.clone(),
        follow_links: cli.follow_links,
        walker: WalkerConfig {
            max_parallel: cli.jobs,
            ..Default::default()
        },
    }
}

fn print_marks(marks: &[Mark], json: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, marks)?;
        writeln!(out)?;
    } else {
        for mark in marks {
            writeln!(out, "{}", mark.path.display())?;
        }
    }
    out.flush()
}

/// Print what was found, then report the walk error if there was one.
fn report(outcome: &WalkOutcome, json: bool) -> bool {
    if let Err(e) = print_marks(&outcome.marks, json) {
        eprintln!("grove: error writing output: {}", e);
        process::exit(1);
    }
    match &outcome.error {
        Some(e) => {
            eprintln!("grove: {}", e);
            false
        }
        None => true,
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let ok = match &cli.command {
        Command::List { roots, patterns } => {
            let filter = PathFilter::new(patterns).unwrap_or_else(|e| {
                eprintln!("grove: invalid --pattern: {}", e);
                process::exit(1);
            });
            let outcome = grove::find_repositories(&search_config(&cli, roots), filter);
            report(&outcome, roots.json)
        }
        Command::Sweep { roots, remove } => {
            let outcome = grove::find_empty_dirs(&search_config(&cli, roots));
            let ok = report(&outcome, roots.json);
            if *remove && ok {
                if let Err(e) = grove::remove_dirs(outcome.paths()) {
                    eprintln!("grove: cannot remove directory: {}", e);
                    process::exit(1);
                }
            }
            ok
        }
    };

    if !ok {
        process::exit(1);
    }
}
