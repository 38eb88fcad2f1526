// ai
//! 🚰 Record streams — where the data comes from
//!
//! 🎬 *[a CSV file sits on disk, minding its own business. suddenly: a*
//! *channel. "pour yourself through this," says the pipeline. the file*
//! *sighs. it has seen pipelines come and go. it pours.]*
//!
//! A stream is a faucet of [`Record`]s: open it, get a receive-only channel,
//! read until the channel closes. That's the whole deal. The faucet does not
//! know what a watch event is. The faucet does not rank repositories. The
//! faucet pours. 🚿
//!
//! 🧠 Knowledge graph:
//! - Pattern: trait → concrete impls (`CsvStream`, `InMemoryStream`) →
//!   `StreamBackend` enum → consumers hold the enum and never know which
//!   disk, RAM, or act of god the records came from.
//! - Channel items are `anyhow::Result<Record>` (= [`StreamItem`]): a read
//!   failure travels IN-BAND as an `Err` item. The stream does NOT stop
//!   itself on failure — whether to abort is the consumer's call, and every
//!   consumer in this crate aborts on the first one.
//! - Completion = channel CLOSES. No sentinel record, no final empty row,
//!   no "EOF" string somebody has to remember to check for. Closed means
//!   done. This is load-bearing: the aggregators' loops end when `recv`
//!   errs.
//! - Channel depth is 1 (`async_channel::bounded(1)`) — a strict hand-off.
//!   The producer stays at most one record ahead, so an abort at record
//!   7 of 40,000,000 wastes one record of work, not a buffer of them.
//! - Producers run on their own unit of concurrency, spawned at stream
//!   construction: creation returns immediately, production overlaps with
//!   consumption. When the consumer hangs up (drops the receiver) the next
//!   send fails and the producer packs up quietly. No drama. 🦆
//!
//! Ancient proverb: "He who buffers forty million records, discovers what
//! the OOM killer is for." 💀

pub mod csv_stream;
pub mod in_mem;

pub use csv_stream::CsvStream;
pub use in_mem::InMemoryStream;

use async_channel::Receiver;

use crate::records::Record;

/// 📦 One item on a stream channel: a record, or the failure that took its
/// place. Mutually exclusive by construction — thanks, `Result`.
pub type StreamItem = anyhow::Result<Record>;

/// 🚰 Anything that can pour records down a channel.
///
/// # Contract 📜
/// - `tap()` hands back the receive side of the stream's channel. Records
///   arrive in source order, each exactly once (across ALL taps — clones of
///   the receiver compete for items, they don't duplicate them).
/// - The channel closing means the source is exhausted. Nothing follows.
/// - An `Err` item is a mid-read failure, delivered in-band. The stream
///   keeps pouring afterwards; stopping is the consumer's decision.
pub trait RecordStream: std::fmt::Debug {
    /// 🚿 The receive side of this stream's channel.
    fn tap(&self) -> Receiver<StreamItem>;
}

/// 🎭 The many faces of a record stream — a casting call for data origins.
///
/// Each variant wraps a concrete stream. The enum dispatches via
/// `impl RecordStream for StreamBackend`, so the rankings never need to know
/// whether their records came from a 4 GB export on disk or twelve rows a
/// test made up. Universal remote energy. No warranty.
#[derive(Debug)]
pub enum StreamBackend {
    /// 📂 A (possibly gzipped) CSV file on disk
    Csv(CsvStream),
    /// 🧠 A scripted in-memory sequence, for tests and benches
    InMemory(InMemoryStream),
}

impl RecordStream for StreamBackend {
    fn tap(&self) -> Receiver<StreamItem> {
        match self {
            StreamBackend::Csv(c) => c.tap(),
            StreamBackend::InMemory(m) => m.tap(),
        }
    }
}
