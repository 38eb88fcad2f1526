// ai
//! 📤 Top repos by commits — the three-stream, two-stage join
//!
//! 🎬 *[a commit record arrives at the join holding an event id. "i belong*
//! *to event e1," it says. the index checks its ledger. e1 was a push to*
//! *r1. tick. the next commit claims e9. the ledger has no e9. the commit*
//! *is shown the door, politely. it is not an error to be nobody's commit.*
//! *it is merely sad.]*
//!
//! Commits don't carry a repo id — they carry the id of the push event that
//! delivered them, and only push events know their repo. So the count takes
//! two stages through an intermediate event-id key:
//!
//! 1. events pass → every PushEvent registers a [`PushTicket`] under its
//!    EVENT id (first write wins on duplicates, same rule as counting)
//! 2. commits pass → each commit looks up its event id; registered tickets
//!    get +1, unregistered commits are skipped silently
//! 3. fold → ticket counts collapse onto repo ids (many events, one repo),
//!    and a push with zero commits still plants its repo at count 0
//! 4. from here it's the same podium-and-names walk as the watch pipeline
//!
//! Streams drain strictly in that order — events fully exhausted before the
//! commit stream is touched, metadata only after ranking.

use std::collections::HashMap;
use std::ops::ControlFlow;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::app_config::RankConfig;
use crate::cancel::StopToken;
use crate::enrich::enrich;
use crate::rank::rank_top;
use crate::rankings::Ranking;
use crate::records::Tally;
use crate::schema::EventKind;
use crate::streams::{RecordStream, StreamBackend};
use crate::tally::drain;

/// 🎟️ One registered push event: which repo it was for, and how many
/// commits have claimed it so far.
#[derive(Debug)]
struct PushTicket {
    repo_id: String,
    commits: u64,
}

/// 📤 Ranks repositories by how many commits were pushed to them.
#[derive(Debug)]
pub struct TopReposByCommits {
    events: StreamBackend,
    commits: StreamBackend,
    repos: StreamBackend,
    config: RankConfig,
}

impl TopReposByCommits {
    /// 🏗️ Hold all three streams until `run` consumes them, in order.
    pub fn new(
        events: StreamBackend,
        commits: StreamBackend,
        repos: StreamBackend,
        config: RankConfig,
    ) -> Self {
        Self {
            events,
            commits,
            repos,
            config,
        }
    }
}

#[async_trait]
impl Ranking for TopReposByCommits {
    fn count_label(&self) -> &'static str {
        "commits"
    }

    async fn run(self: Box<Self>, stop: StopToken) -> Result<Vec<Tally>> {
        let schema = &self.config.schema;

        // 🎟️ stage 1: register every push event under its EVENT id
        info!("📤 indexing push events");
        let mut tickets: HashMap<String, PushTicket> = HashMap::new();
        drain(&self.events.tap(), &stop, |record| {
            let view = schema.events.over(&record)?;
            if view.kind() == EventKind::Push {
                // 🌱 first write wins; a duplicate event id changes nothing
                tickets
                    .entry(view.id().to_string())
                    .or_insert_with(|| PushTicket {
                        repo_id: view.repo_id().to_string(),
                        commits: 0,
                    });
            }
            Ok(ControlFlow::Continue(()))
        })
        .await?;
        debug!("🎟️ {} push events registered", tickets.len());

        // 🧮 stage 2: commits claim their tickets; orphans are waved through
        info!("📤 counting commits against registered pushes");
        drain(&self.commits.tap(), &stop, |record| {
            let event_id = schema.commits.over(&record)?.event_id().to_string();
            if let Some(ticket) = tickets.get_mut(&event_id) {
                ticket.commits += 1;
            }
            Ok(ControlFlow::Continue(()))
        })
        .await?;

        // 🪣 stage 3: fold event-keyed counts onto repo ids. many tickets,
        // one repo; zero-commit tickets still plant their repo at 0.
        let mut counts: HashMap<String, Tally> = HashMap::new();
        for ticket in tickets.into_values() {
            counts
                .entry(ticket.repo_id)
                .or_insert_with_key(|id| Tally::seed(id.clone()))
                .count += ticket.commits;
        }

        // 🏆 stage 4: same finish as every other ranking
        let mut ranked = rank_top(counts, self.config.top_n);
        enrich(&self.repos, &stop, &schema.repos, &mut ranked).await?;
        Ok(ranked)
    }
}

// ============================================================
// 🧪 Tests
// ============================================================
