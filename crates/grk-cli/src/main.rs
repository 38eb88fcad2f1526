// ai
//! 🚀 grk-cli — the front door, the bouncer, the maitre d' of gitrank.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary crate is the thin CLI wrapper that parses flags, loads
//! config, wires the stop button, and then lets the real code do the heavy
//! lifting. Like a manager. 🦆
//!
//! Exit codes: 0 = the table printed, 1 = anything else. There is no exit
//! code for "the table printed but we have concerns".

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Table, presets::NOTHING};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use grk::{
    CsvStream, Ranking, StreamBackend, Tally, TopReposByCommits, TopReposByWatchEvents,
    TopUsers, load_config, stop_pair,
};

/// 🏆 github event stream statistics
#[derive(Debug, Parser)]
#[command(name = "grk", about = "github event stream statistics")]
struct Cli {
    /// 📋 Optional TOML config (top_n, column schema). Env GRK_* also works.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// ⏲️ Abort the run after this many seconds (no partial table)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// 🖨️ How to print the ranked result
    #[arg(long, global = true, value_enum, default_value_t = Format::Table)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// 🍽️ A human-friendly table on stdout
    Table,
    /// 🤖 A JSON array of {id, name, count} on stdout
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Sort {
    /// 👀 by watch events received
    Watchevents,
    /// 📤 by commits pushed
    Commits,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 🏆 List top repos, by selected criteria
    TopRepos {
        /// 🔀 Ranking criterion
        #[arg(long, value_enum, default_value_t = Sort::Watchevents)]
        sort: Sort,
        /// 🎟️ Event stream file (required)
        #[arg(long)]
        events: PathBuf,
        /// 🏷️ Repos stream file (required)
        #[arg(long)]
        repos: PathBuf,
        /// 📝 Commit stream file (required if --sort=commits)
        #[arg(long)]
        commits: Option<PathBuf>,
    },
    /// 🧑 List top users, by PRs created and commits pushed
    TopUsers {
        /// 🎟️ Event stream file (required)
        #[arg(long)]
        events: PathBuf,
        /// 📝 Commit stream file (required)
        #[arg(long)]
        commits: PathBuf,
        /// 🧑 Actors stream file (required)
        #[arg(long)]
        actors: PathBuf,
    },
}

/// 📂 One opened CSV stream, wrapped for the pipelines.
async fn open(path: &Path) -> Result<StreamBackend> {
    Ok(StreamBackend::Csv(CsvStream::new(path).await?))
}

/// 🏗️ Turn the parsed subcommand into a runnable ranking.
///
/// This is where "--commits is required iff --sort=commits" gets enforced —
/// clap can't see across two flags, so we check by hand, like the ancients.
async fn build_ranking(command: Command, config_file: Option<&Path>) -> Result<Box<dyn Ranking>> {
    let config = load_config(config_file).context("💀 couldn't load the rank config")?;

    match command {
        Command::TopRepos {
            sort,
            events,
            repos,
            commits,
        } => {
            let events = open(&events).await?;
            let repos = open(&repos).await?;
            match sort {
                Sort::Watchevents => {
                    Ok(Box::new(TopReposByWatchEvents::new(events, repos, config)))
                }
                Sort::Commits => {
                    // 🔒 the conditional flag, validated by hand
                    let Some(commits) = commits else {
                        bail!("need a valid '--commits' path when --sort=commits");
                    };
                    let commits = open(&commits).await?;
                    Ok(Box::new(TopReposByCommits::new(
                        events, commits, repos, config,
                    )))
                }
            }
        }
        Command::TopUsers {
            events,
            commits,
            actors,
        } => {
            let events = open(&events).await?;
            let commits = open(&commits).await?;
            let actors = open(&actors).await?;
            Ok(Box::new(TopUsers::new(events, commits, actors, config)))
        }
    }
}

/// 🍽️ The human-facing table. Header count column tracks the sort mode.
fn render_table(results: &[Tally], count_label: &str) -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["repo_id", "repo_name", count_label]);
    for tally in results {
        table.add_row(vec![
            tally.id.clone(),
            tally.name.clone(),
            tally.count.to_string(),
        ]);
    }
    table
}

/// 🚀 main() — where it all begins. The genesis. The big bang.
/// The "I pressed enter and held my breath" moment.
///
/// 🔧 Steps:
/// 1. Init tracing (so we can see what goes wrong, and when)
/// 2. Parse args (clap is picky so we don't have to be)
/// 3. Load config, open streams, arm the stop button
/// 4. Run the ranking (send it and pray 🙏)
/// 5. Print the table, or handle errors (cry)
#[tokio::main]
async fn main() -> Result<()> {
    // 📡 Set up tracing — because println! debugging is a lifestyle choice
    // we're trying to move past, like flip phones and cargo shorts
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr) // 🖨️ stdout belongs to the table
        .init();

    let cli = Cli::parse();

    // ⏹️ arm the stop button: ctrl-c and (optionally) a deadline both press it
    let (handle, stop) = stop_pair();
    let timeout = cli.timeout_secs.map(Duration::from_secs);
    tokio::spawn(async move {
        let deadline = async {
            match timeout {
                Some(after) => tokio::time::sleep(after).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => debug!("⏹️ ctrl-c received"),
            _ = deadline => debug!("⏲️ deadline reached"),
        }
        handle.stop();
    });

    // 🚀 SEND IT. No take-backs. Streams are single-pass and so are we.
    let result = async {
        let ranking = build_ranking(cli.command, cli.config.as_deref()).await?;
        let count_label = ranking.count_label();
        let results = ranking.run(stop).await?;
        Ok::<_, anyhow::Error>((results, count_label))
    }
    .await;

    // 💀 Error handling: the part where we find out what went wrong
    // and print it in a way that's helpful at 3am
    match result {
        Ok((results, count_label)) => {
            match cli.format {
                Format::Table => println!("{}", render_table(&results, count_label)),
                Format::Json => println!(
                    "{}",
                    serde_json::to_string_pretty(&results)
                        .context("💀 the ranked list refused to become JSON")?
                ),
            }
            // ✅ If we got here, everything worked. Pop the champagne. 🍾
            Ok(())
        }
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion of sadness, one tear-jerking layer at a time
            let mut the_vibes_are_giving_missing_files = false;
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
                // -- 🕵️ sniff the cause like a truffle pig hunting for path problems
                let cause_str = cause.to_string();
                if cause_str.contains("No such file")
                    || cause_str.contains("Permission denied")
                    || cause_str.contains("failed to open CSV stream")
                {
                    the_vibes_are_giving_missing_files = true;
                }
            }

            // -- 📂 if it smells like a path problem, it's probably a path problem
            // -- like when your keys are exactly where you left them, which is lost
            if the_vibes_are_giving_missing_files {
                error!(
                    "🔧 hint: one of the input files isn't where the flags say it is. \
                    Double-check the --events/--repos/--commits/--actors paths, \
                    and remember relative paths resolve against your CURRENT directory, \
                    not where the export landed. When in doubt, go absolute. 📍"
                );
            }

            // 🗑️ Exit with prejudice. Process exitus maximus.
            // No partial table was printed, and none ever will be.
            std::process::exit(1);
        }
    }
}
