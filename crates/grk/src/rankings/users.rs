// ai
//! 🧑 Top users — the ranking that isn't, yet
//!
//! The surface exists: three streams accepted, actor schema wired, CLI
//! subcommand live. The ranking logic does not — running it says so in
//! plain words instead of returning an empty table somebody might mistake
//! for "no active users this month".
//!
//! TODO: rank users by PR-creation and commit activity once the PR-event
//! layout lands in the schema config.

use anyhow::{Result, bail};
use async_trait::async_trait;

use crate::app_config::RankConfig;
use crate::cancel::StopToken;
use crate::rankings::Ranking;
use crate::records::Tally;
use crate::streams::StreamBackend;

/// 🧑 Would rank users by PRs created and commits pushed. Does not, yet.
#[derive(Debug)]
pub struct TopUsers {
    // -- held so the wiring (CLI flags → streams → pipeline) stays honest
    // -- and ready for the day the ranking grows a body
    _events: StreamBackend,
    _commits: StreamBackend,
    _actors: StreamBackend,
    _config: RankConfig,
}

impl TopUsers {
    /// 🏗️ Accepts everything the real pipeline will need.
    pub fn new(
        events: StreamBackend,
        commits: StreamBackend,
        actors: StreamBackend,
        config: RankConfig,
    ) -> Self {
        Self {
            _events: events,
            _commits: commits,
            _actors: actors,
            _config: config,
        }
    }
}

#[async_trait]
impl Ranking for TopUsers {
    fn count_label(&self) -> &'static str {
        "prs_and_commits"
    }

    async fn run(self: Box<Self>, _stop: StopToken) -> Result<Vec<Tally>> {
        // 💀 honesty over an empty table
        bail!("top-users ranking is not implemented yet")
    }
}

// ============================================================
// 🧪 Tests
// ============================================================
