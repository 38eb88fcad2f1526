// ai
//! 👀 Top repos by watch events — the popularity contest
//!
//! The simple pipeline, and the template for reading the other one: count
//! watch events per repo id, rank, fetch names for the winners. One pass
//! over events, at most a partial pass over repo metadata, zero passes over
//! anything else.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::app_config::RankConfig;
use crate::cancel::StopToken;
use crate::enrich::enrich;
use crate::rank::rank_top;
use crate::rankings::Ranking;
use crate::records::Tally;
use crate::schema::EventKind;
use crate::streams::StreamBackend;
use crate::tally::count_matching;

/// 👀 Ranks repositories by how many watch events they collected.
#[derive(Debug)]
pub struct TopReposByWatchEvents {
    events: StreamBackend,
    repos: StreamBackend,
    config: RankConfig,
}

impl TopReposByWatchEvents {
    /// 🏗️ Hold the streams until `run` consumes them.
    pub fn new(events: StreamBackend, repos: StreamBackend, config: RankConfig) -> Self {
        Self {
            events,
            repos,
            config,
        }
    }
}

#[async_trait]
impl Ranking for TopReposByWatchEvents {
    fn count_label(&self) -> &'static str {
        "watch_evts"
    }

    async fn run(self: Box<Self>, stop: StopToken) -> Result<Vec<Tally>> {
        let schema = &self.config.schema;

        // 🧮 phase 1: count watch events per repo id
        info!("👀 counting watch events per repo");
        let counts = count_matching(
            &self.events,
            &stop,
            |record| Ok(schema.events.over(record)?.kind() == EventKind::Watch),
            |record| Ok(schema.events.over(record)?.repo_id().to_string()),
        )
        .await?;

        // 🏆 phase 2: podium
        let mut ranked = rank_top(counts, self.config.top_n);

        // 🏷️ phase 3: names for the winners, and only the winners
        enrich(&self.repos, &stop, &schema.repos, &mut ranked).await?;

        Ok(ranked)
    }
}

// ============================================================
// 🧪 Tests
// ============================================================
