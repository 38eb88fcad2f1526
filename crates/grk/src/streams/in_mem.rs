// ai
//! 🧠 The in-memory stream — twelve rows and a dream
//!
//! 🎬 *[a test fixture clears its throat. "i contain three watch events,"*
//! *it announces. the aggregator, who has processed forty million rows*
//! *from disk, nods politely. data is data.]*
//!
//! `InMemoryStream` plays the same channel game as the CSV adapter, just
//! without the disk, the gzip, or the stakes. You script the exact sequence
//! of items — including `Err` items, placed wherever the test needs a
//! mid-stream disaster — and it pours them through a depth-1 channel like
//! the real thing. Designed entirely for tests and benches. Not for
//! feelings. Feelings are unranked. 🦆

use async_channel::Receiver;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::records::Record;
use crate::streams::{RecordStream, StreamItem};

/// 🧠 A scripted sequence of stream items, delivered through the standard
/// channel contract.
///
/// The producer is a real spawned task and the channel is a real depth-1
/// hand-off, so everything a consumer can observe — ordering, backpressure,
/// close-on-exhaustion, an `Err` smuggled in at position 3 — behaves exactly
/// like the disk-backed stream. The only thing missing is the disk.
///
/// ⚠️ Construction spawns a tokio task, so it needs a runtime. In a
/// `#[tokio::test]` you already have one. Outside of one, you have a panic
/// and a learning opportunity.
#[derive(Debug)]
pub struct InMemoryStream {
    rx: Receiver<StreamItem>,
    // -- 🧵 kept so the producer task isn't detached into the void; nobody
    // -- joins it, but Debug output showing a live handle has saved a test
    // -- author before and will again.
    producer: JoinHandle<()>,
}

impl InMemoryStream {
    /// 🏗️ Script a stream from an exact sequence of items.
    ///
    /// `Err` items are delivered in-band, in order, just like a real read
    /// failure. The channel closes after the last item, not before, not
    /// after-after. One item in flight at a time — if the consumer stops
    /// reading at item K, item K+2 is never even sent.
    pub fn new(items: Vec<StreamItem>) -> Self {
        let (tx, rx) = async_channel::bounded(1);
        let producer = tokio::spawn(async move {
            for item in items {
                if tx.send(item).await.is_err() {
                    // -- 🏁 consumer hung up. pack it in, nobody's listening.
                    trace!("🧠 in-memory consumer hung up early, stopping");
                    break;
                }
            }
            // -- ✅ tx drops here; channel closes; that IS the EOF signal
        });
        Self { rx, producer }
    }

    /// 🧪 Script a stream of well-formed rows only. The common case in tests
    /// that aren't about failure.
    pub fn from_rows(rows: &[&[&str]]) -> Self {
        Self::new(rows.iter().map(|r| Ok(Record::from_row(r))).collect())
    }
}

impl RecordStream for InMemoryStream {
    fn tap(&self) -> Receiver<StreamItem> {
        self.rx.clone()
    }
}

// ============================================================
// 🧪 Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[tokio::test]
    async fn the_one_where_rows_arrive_in_order_and_the_channel_closes() {
        let stream = InMemoryStream::from_rows(&[&["a", "1"], &["b", "2"], &["c", "3"]]);
        let rx = stream.tap();

        let mut seen = Vec::new();
        while let Ok(item) = rx.recv().await {
            seen.push(item.expect("scripted rows carry no failures"));
        }

        // 🏁 loop exited because the channel closed — no sentinel record
        assert_eq!(
            seen,
            vec![
                Record::from_row(&["a", "1"]),
                Record::from_row(&["b", "2"]),
                Record::from_row(&["c", "3"]),
            ]
        );
    }

    #[tokio::test]
    async fn the_one_where_a_scripted_failure_arrives_in_band() {
        let stream = InMemoryStream::new(vec![
            Ok(Record::from_row(&["fine"])),
            Err(anyhow!("💀 scripted disaster at row 2")),
            Ok(Record::from_row(&["also fine"])),
        ]);
        let rx = stream.tap();

        assert!(rx.recv().await.unwrap().is_ok());
        let boom = rx.recv().await.unwrap();
        assert!(boom.is_err());
        // 🚰 the stream does NOT stop itself after a failure — stopping is
        // the consumer's call, and this consumer chooses to keep reading.
        assert!(rx.recv().await.unwrap().is_ok());
        assert!(rx.recv().await.is_err()); // closed
    }

    #[tokio::test]
    async fn the_one_where_a_hung_up_consumer_stops_the_producer() {
        let stream = InMemoryStream::from_rows(&[&["1"], &["2"], &["3"], &["4"]]);
        let rx = stream.tap();

        // 📦 take one, then walk away mid-stream — drop every receiver,
        // including the one the stream itself holds
        let _ = rx.recv().await.unwrap();
        let InMemoryStream { rx: own, producer } = stream;
        drop(own);
        drop(rx);

        // 🏁 producer notices the closed channel on its next send and exits
        let deadline = tokio::time::Duration::from_secs(5);
        tokio::time::timeout(deadline, producer)
            .await
            .expect("producer should pack up once the consumer hangs up")
            .expect("producer task must not panic");
    }
}
