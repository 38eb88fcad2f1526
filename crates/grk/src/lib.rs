// ai
//! 🏆 grk — streaming aggregation and ranked joins for GitHub-style event logs.
//!
//! Streams in (events, commits, repo/actor metadata, as CSV), a small ranked
//! table out (top repos by watch events or by commits pushed), without ever
//! holding a whole stream in memory. The CLI crate is the front door; this
//! crate is everything behind it.

pub mod app_config;
pub mod cancel;
pub mod enrich;
pub mod progress;
pub mod rank;
pub mod rankings;
pub mod records;
pub mod schema;
pub mod streams;
pub mod tally;

pub use app_config::{RankConfig, load_config};
pub use cancel::{StopHandle, StopToken, stop_pair};
pub use rankings::{Ranking, TopReposByCommits, TopReposByWatchEvents, TopUsers};
pub use records::Tally;
pub use streams::{CsvStream, InMemoryStream, RecordStream, StreamBackend};
