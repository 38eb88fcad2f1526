// ai
//! 🧮 The counting aggregator — where forty million rows become one HashMap
//!
//! 🎬 *[a stream of records marches past a clipboard-wielding aggregator.*
//! *"WatchEvent?" it asks each one. most say no. the ones that say yes get*
//! *a tick next to their repo id. this continues for some time. this is*
//! *the whole job. the aggregator finds it fulfilling. nobody asks how.]*
//!
//! 🧠 Knowledge graph:
//! - [`drain`] is THE consumption loop. One place, one failure contract:
//!   first `Err` item aborts everything, a stop request aborts everything,
//!   a closed channel is a clean finish, and the visitor may break early.
//!   Counting, the two-stage commit join, and name enrichment all run their
//!   streams through this exact loop — the fail-fast rule is written once
//!   and inherited everywhere, instead of being copy-pasted into three
//!   places and diverging in the one nobody retested.
//! - [`count_matching`] = predicate + key extractor + HashMap of [`Tally`]s.
//!   Entry creation is FIRST-INSERT-WINS (`entry().or_insert_with_key`),
//!   and that rule is load-bearing: do not "improve" it to last-write-wins
//!   without rechecking what it does to the rankings.
//! - An abort returns NO partial result. A half-counted HashMap looks
//!   exactly like a fully-counted one, and that is precisely the problem. 💀
//!
//! Ancient proverb: "He who salvages partial counts, presents wrong numbers
//! confidently." 📜

use std::collections::HashMap;
use std::ops::ControlFlow;

use anyhow::{Context, Result, bail};
use async_channel::Receiver;
use tracing::{debug, trace};

use crate::cancel::StopToken;
use crate::records::{Record, Tally};
use crate::streams::{RecordStream, StreamBackend, StreamItem};

/// 🚿 Drain a stream channel through a visitor, fail-fast.
///
/// The one loop every consumer in this crate runs on. Per received item:
/// - `Ok(record)` → hand it to `visit`. `Break` stops reading (early exit,
///   not an error); `Continue` keeps going; an `Err` from the visitor (a
///   malformed record, usually) aborts the run.
/// - `Err(failure)` → abort immediately, surfacing that failure. The first
///   bad record kills the whole run; whatever was aggregated so far is the
///   caller's to discard (and every caller discards it).
/// - closed channel → clean exhaustion, return `Ok`.
///
/// The stop token is checked before the first receive and raced against
/// every subsequent one, so a stop lands between two records — never after
/// the remaining thirty-nine million.
pub async fn drain<F>(rx: &Receiver<StreamItem>, stop: &StopToken, mut visit: F) -> Result<()>
where
    F: FnMut(Record) -> Result<ControlFlow<()>>,
{
    let mut records: u64 = 0;
    loop {
        // ⏹️ a pre-stopped token never reads a single record
        if stop.is_stopped() {
            bail!("⏹️ run stopped after {} records, no result produced", records);
        }
        let item = tokio::select! {
            _ = stop.stopped() => {
                bail!("⏹️ run stopped after {} records, no result produced", records)
            }
            item = rx.recv() => item,
        };
        match item {
            // 🏁 channel closed: the source is exhausted. the good ending.
            Err(_closed) => {
                trace!("🏁 stream exhausted after {} records", records);
                return Ok(());
            }
            // 💀 in-band failure: first one is fatal, no salvage, no retry
            Ok(Err(failure)) => {
                return Err(failure)
                    .with_context(|| format!("💀 stream failed at record {}", records + 1));
            }
            Ok(Ok(record)) => {
                records += 1;
                if visit(record)?.is_break() {
                    trace!("🏁 visitor broke early after {} records", records);
                    return Ok(());
                }
            }
        }
    }
}

/// 🧮 Count stream records that pass `predicate`, keyed by `key_of`.
///
/// Builds a `HashMap<key, Tally>` where each tally's count is the number of
/// matching records that produced its key. Entries are seeded zero-count on
/// first sight of a key, then incremented in place — names stay empty here,
/// enrichment is a later pass's problem.
///
/// Both closures may fail (a record too short for its schema view, say);
/// their failure aborts the count exactly like a stream failure would.
/// On ANY abort the map is dropped, not returned. See module docs for why.
pub async fn count_matching<P, K>(
    stream: &StreamBackend,
    stop: &StopToken,
    mut predicate: P,
    mut key_of: K,
) -> Result<HashMap<String, Tally>>
where
    P: FnMut(&Record) -> Result<bool>,
    K: FnMut(&Record) -> Result<String>,
{
    let mut counts: HashMap<String, Tally> = HashMap::new();
    drain(&stream.tap(), stop, |record| {
        if predicate(&record)? {
            let key = key_of(&record)?;
            // 🌱 first insert wins; every later sighting only bumps the count
            counts
                .entry(key)
                .or_insert_with_key(|id| Tally::seed(id.clone()))
                .count += 1;
        }
        Ok(ControlFlow::Continue(()))
    })
    .await?;

    debug!("🧮 counted {} distinct keys", counts.len());
    Ok(counts)
}

// ============================================================
// 🧪 Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EventKind, EventSchema};
    use crate::streams::InMemoryStream;
    use anyhow::anyhow;

    fn watch_counter(
        stream: StreamBackend,
    ) -> impl std::future::Future<Output = Result<HashMap<String, Tally>>> {
        async move {
            let schema = EventSchema::default();
            count_matching(
                &stream,
                &StopToken::never(),
                |r| Ok(schema.over(r)?.kind() == EventKind::Watch),
                |r| Ok(schema.over(r)?.repo_id().to_string()),
            )
            .await
        }
    }

    #[tokio::test]
    async fn the_one_where_watch_events_get_counted_per_repo() -> Result<()> {
        let stream = StreamBackend::InMemory(InMemoryStream::from_rows(&[
            &["e1", "WatchEvent", "u1", "r1"],
            &["e2", "WatchEvent", "u2", "r1"],
            &["e3", "WatchEvent", "u3", "r2"],
            &["e4", "PushEvent", "u1", "r1"], // 🙈 wrong type, not counted
            &["e5", "ForkEvent", "u9", "r3"], // 🙈 also not counted
        ]));

        let counts = watch_counter(stream).await?;
        assert_eq!(counts.len(), 2);
        assert_eq!(counts["r1"].count, 2);
        assert_eq!(counts["r2"].count, 1);
        // 🏷️ names are not this phase's business
        assert!(counts.values().all(|t| t.name.is_empty()));
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_first_failure_kills_the_whole_count() {
        // 💀 failure at record 3 of 5 — the two good records before it are
        // discarded along with everything else
        let stream = StreamBackend::InMemory(InMemoryStream::new(vec![
            Ok(Record::from_row(&["e1", "WatchEvent", "u1", "r1"])),
            Ok(Record::from_row(&["e2", "WatchEvent", "u2", "r1"])),
            Err(anyhow!("💀 disk hiccup")),
            Ok(Record::from_row(&["e4", "WatchEvent", "u4", "r2"])),
            Ok(Record::from_row(&["e5", "WatchEvent", "u5", "r2"])),
        ]));

        let err = watch_counter(stream).await.unwrap_err();
        assert!(err.to_string().contains("stream failed at record 3"));
        assert!(format!("{:#}", err).contains("disk hiccup"));
    }

    #[tokio::test]
    async fn the_one_where_a_malformed_record_is_just_as_fatal() {
        // 💀 two fields, the event schema wants at least four
        let stream = StreamBackend::InMemory(InMemoryStream::from_rows(&[
            &["e1", "WatchEvent", "u1", "r1"],
            &["e2", "WatchEvent"],
        ]));

        let err = watch_counter(stream).await.unwrap_err();
        assert!(err.to_string().contains("malformed event record"));
    }

    #[tokio::test]
    async fn the_one_where_a_prestopped_token_reads_nothing() {
        let (handle, token) = crate::cancel::stop_pair();
        handle.stop();

        let stream = StreamBackend::InMemory(InMemoryStream::from_rows(&[&[
            "e1",
            "WatchEvent",
            "u1",
            "r1",
        ]]));
        let schema = EventSchema::default();
        let err = count_matching(
            &stream,
            &token,
            |r| Ok(schema.over(r)?.kind() == EventKind::Watch),
            |r| Ok(schema.over(r)?.repo_id().to_string()),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("stopped after 0 records"));
    }

    #[tokio::test]
    async fn the_one_where_counting_twice_counts_the_same() -> Result<()> {
        let rows: &[&[&str]] = &[
            &["e1", "WatchEvent", "u1", "r1"],
            &["e2", "WatchEvent", "u2", "r2"],
            &["e3", "WatchEvent", "u3", "r1"],
        ];
        let first = watch_counter(StreamBackend::InMemory(InMemoryStream::from_rows(rows))).await?;
        let second =
            watch_counter(StreamBackend::InMemory(InMemoryStream::from_rows(rows))).await?;
        // 🔁 no hidden state across runs — same input, same counts
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_an_empty_stream_yields_an_empty_map() -> Result<()> {
        let stream = StreamBackend::InMemory(InMemoryStream::from_rows(&[]));
        let counts = watch_counter(stream).await?;
        assert!(counts.is_empty());
        Ok(())
    }
}
