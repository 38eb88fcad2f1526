// ai
//! 🎬 The rankings — where streams, counts, podiums, and names assemble
//!
//! Each ranking is one report the CLI can ask for, end to end: it holds its
//! input streams from construction, consumes them in a fixed order when run,
//! and hands back a ranked, named, bounded result list — or the first error
//! it met, with nothing salvaged.
//!
//! 🧠 Knowledge graph:
//! - The [`Ranking`] trait is the seam the CLI sees: `run` consumes the
//!   ranking (streams are single-pass, a ranking is single-shot — the type
//!   system says so via `self: Box<Self>`), `count_label` names the count
//!   column for the table header.
//! - Streams are drained STRICTLY one at a time: events first, then (for
//!   commits) the commit stream, then the metadata stream after ranking.
//!   No interleaving, no select across streams, no cleverness.
//! - Three rankings live here: watch events (one-stage count), commits
//!   (the two-stage event-id join), and the top-users stub that knows
//!   exactly what it is and says so.

pub mod commits;
pub mod users;
pub mod watch;

pub use commits::TopReposByCommits;
pub use users::TopUsers;
pub use watch::TopReposByWatchEvents;

use anyhow::Result;
use async_trait::async_trait;

use crate::cancel::StopToken;
use crate::records::Tally;

/// 🎬 One runnable report: streams in, ranked tallies out, exactly once.
#[async_trait]
pub trait Ranking: Send {
    /// 🏷️ The table header for the count column ("watch_evts", "commits"...).
    fn count_label(&self) -> &'static str;

    /// 🚀 Consume the streams, produce the ranked result list.
    ///
    /// Consumes the ranking — the streams inside are single-pass, so there
    /// is no second run to offer. Any stream failure, malformed record, or
    /// stop request aborts with an error and NO partial list.
    async fn run(self: Box<Self>, stop: StopToken) -> Result<Vec<Tally>>;
}
