// ai
//! 📂 The CSV stream — a file on disk becomes records on a channel
//!
//! 🎬 *[INT. FILESYSTEM — NIGHT. a 4 GB export named `events.csv` hears*
//! *footsteps. "are you here to load me into memory?" it asks, hopeful.*
//! *"no," says the stream. "one row at a time." the export weeps with*
//! *relief. the OOM killer, lurking nearby, slinks off disappointed.]*
//!
//! This is the one place the engine touches disk. Construction opens the
//! file (and fails loudly if it can't); production happens on a dedicated
//! blocking task wrapping the `csv` crate's reader, pouring rows through a
//! depth-1 channel. RFC-4180 quoting is handled by the crate — a comma
//! inside quotes is not a delimiter, Kevin, it never was.
//!
//! 🧠 Knowledge graph:
//! - `spawn_blocking`, not `spawn`: the csv reader is a blocking, synchronous
//!   beast, and feeding it to the async scheduler directly would be like
//!   bringing a tractor onto a racetrack. Legal nowhere. Slow everywhere.
//! - A row that fails to parse (broken quoting, invalid UTF-8) becomes an
//!   in-band `Err` item; the producer keeps pouring afterwards because
//!   stopping is the CONSUMER's decision (every consumer here stops).
//! - EOF = the reader says "no more rows" = the producer drops the sender =
//!   the channel closes. No final empty record, no "EOF" sentinel, nothing
//!   for a consumer to forget to check. 🏁
//! - Paths ending in `.gz` are decompressed on the fly (flate2). The gauge
//!   downgrades to a spinner because gzip does not reveal the decompressed
//!   size up front. Secretive format. Respect it anyway.
//! - The file handle lives and dies with the producer task. Consumer hangs
//!   up → next send fails → producer returns → handle drops. Tidy.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use async_channel::{Receiver, Sender};
use flate2::read::GzDecoder;
use tracing::{debug, trace};

use crate::progress::StreamGauge;
use crate::records::Record;
use crate::streams::{RecordStream, StreamItem};

/// 📂 A (possibly gzipped) CSV file, poured row-by-row through a channel.
///
/// Construction is async and is the ONLY fallible moment: an unopenable path
/// fails right here, before any consumer commits to anything. After that,
/// trouble travels in-band as `Err` items on the channel.
pub struct CsvStream {
    path: String,
    rx: Receiver<StreamItem>,
}

impl std::fmt::Debug for CsvStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvStream").field("path", &self.path).finish()
    }
}

impl CsvStream {
    /// 🚀 Open `path` and start pouring.
    ///
    /// Returns immediately once the file is open; reading overlaps with
    /// whatever the consumer does next. If the file won't open — missing,
    /// unreadable, or the filesystem is having a day — this fails with
    /// theatrical context and nothing is spawned.
    pub async fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().display().to_string();

        // -- 💀 the one true open-failure. the door is locked, or the door
        // -- does not exist. either way, we remain outside.
        let file = tokio::fs::File::open(&path).await.with_context(|| {
            format!(
                "💀 failed to open CSV stream on path '{}'. We knocked. We checked \
                 it exists (it might not) and that we may read it (we might not). \
                 The rows remain unpoured.",
                path
            )
        })?;

        // 📏 size for the progress gauge — metadata failure is not fatal,
        // it just costs us the percent sign (0 = unknown)
        let total_bytes = file.metadata().await.map(|m| m.len()).unwrap_or(0);
        let gzipped = path.ends_with(".gz");
        let file = file.into_std().await;

        let (tx, rx) = async_channel::bounded(1);
        let label = path.clone();
        tokio::task::spawn_blocking(move || {
            let gauge = if gzipped {
                // -- 🌀 gzip keeps its decompressed size a secret. spinner it is.
                StreamGauge::spinner(&label)
            } else {
                StreamGauge::bytes(&label, total_bytes)
            };
            let raw: Box<dyn Read> = if gzipped {
                Box::new(GzDecoder::new(file))
            } else {
                Box::new(file)
            };
            // 📜 no header row is assumed — a header reaching the aggregators
            // is the file producer's mistake, not ours to silently eat.
            // flexible(true): rows may differ in width; the schema views are
            // the ones with length opinions, and theirs come with context.
            let reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_reader(raw);
            pour(reader, &label, tx, gauge);
        });

        debug!("📂 csv stream open: {} ({} bytes)", path, total_bytes);
        Ok(Self { path, rx })
    }
}

impl RecordStream for CsvStream {
    fn tap(&self) -> Receiver<StreamItem> {
        self.rx.clone()
    }
}

/// 🚿 The producer loop: read rows, send items, stop at EOF or hang-up.
///
/// Runs on the blocking pool, so sends use `send_blocking` — which parks on
/// the depth-1 channel until the consumer takes the previous item. That park
/// IS the backpressure: the reader never gets more than one row ahead.
fn pour<R: Read>(
    mut reader: csv::Reader<R>,
    label: &str,
    tx: Sender<StreamItem>,
    mut gauge: StreamGauge,
) {
    let mut row = csv::StringRecord::new();
    loop {
        let item = match reader.read_record(&mut row) {
            // 🏁 EOF — no spurious final record, the closing channel says it all
            Ok(false) => break,
            Ok(true) => Ok(Record::new(row.iter().map(str::to_string).collect())),
            // 💀 a row refused to parse. deliver the failure in-band and
            // keep reading — aborting is the consumer's call, not ours.
            Err(err) => Err(anyhow::Error::new(err)
                .context(format!("💀 malformed row while reading '{}'", label))),
        };
        if tx.send_blocking(item).is_err() {
            // -- 🏁 consumer hung up mid-stream (abort, early exit, ctrl-c).
            // -- nobody is listening. stop reading, release the file, go home.
            trace!("📂 consumer hung up, closing {}", label);
            break;
        }
        gauge.advance_to(reader.position().byte());
    }
    gauge.finish();
}

// ============================================================
// 🧪 Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// 🧪 Drain a stream to completion, panicking on any in-band failure.
    async fn drain_ok(stream: &CsvStream) -> Vec<Record> {
        let rx = stream.tap();
        let mut rows = Vec::new();
        while let Ok(item) = rx.recv().await {
            rows.push(item.expect("fixture rows should parse"));
        }
        rows
    }

    fn write_fixture(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("💀 tempfile refused to exist");
        file.write_all(contents).expect("💀 tempfile refused the bytes");
        file
    }

    #[tokio::test]
    async fn the_one_where_a_csv_file_pours_in_order() -> Result<()> {
        let file = write_fixture(b"e1,WatchEvent,u1,r1\ne2,PushEvent,u2,r2\n");
        let stream = CsvStream::new(file.path()).await?;

        let rows = drain_ok(&stream).await;
        assert_eq!(
            rows,
            vec![
                Record::from_row(&["e1", "WatchEvent", "u1", "r1"]),
                Record::from_row(&["e2", "PushEvent", "u2", "r2"]),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_the_door_would_not_budge() {
        let err = CsvStream::new("/definitely/not/a/real/path.csv")
            .await
            .expect_err("a missing file must fail at construction");
        assert!(err.to_string().contains("failed to open CSV stream"));
    }

    #[tokio::test]
    async fn the_one_where_a_quoted_comma_is_not_a_delimiter() -> Result<()> {
        // 🧾 RFC-4180: the comma inside quotes stays inside
        let file = write_fixture(b"r1,\"acme/one, the sequel\"\n");
        let stream = CsvStream::new(file.path()).await?;

        let rows = drain_ok(&stream).await;
        assert_eq!(rows, vec![Record::from_row(&["r1", "acme/one, the sequel"])]);
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_gzipped_export_decompresses_in_flight() -> Result<()> {
        use flate2::{Compression, write::GzEncoder};

        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(b"r1,alpha\nr2,beta\n")
            .expect("💀 in-memory gzip write failed");
        let bytes = gz.finish().expect("💀 gzip finish failed");

        // 📂 suffix matters: the adapter sniffs `.gz` off the path
        let dir = tempfile::tempdir().expect("💀 tempdir refused to exist");
        let path = dir.path().join("repos.csv.gz");
        std::fs::write(&path, bytes)?;

        let stream = CsvStream::new(&path).await?;
        let rows = drain_ok(&stream).await;
        assert_eq!(
            rows,
            vec![
                Record::from_row(&["r1", "alpha"]),
                Record::from_row(&["r2", "beta"]),
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn the_one_where_a_broken_row_travels_in_band() -> Result<()> {
        // 💀 invalid UTF-8 in row 2 — records are strings, and these bytes
        // are nobody's string
        let file = write_fixture(b"e1,WatchEvent,u1,r1\n\xff\xfe,bad\ne3,PushEvent,u3,r3\n");
        let stream = CsvStream::new(file.path()).await?;
        let rx = stream.tap();

        // ✅ row 1 is fine
        assert!(rx.recv().await.unwrap().is_ok());
        // 💀 then the failure arrives as an item, not as a closed channel
        let mut saw_failure = false;
        while let Ok(item) = rx.recv().await {
            if let Err(err) = item {
                assert!(err.to_string().contains("malformed row"));
                saw_failure = true;
                break;
            }
        }
        assert!(saw_failure, "the broken row must surface as an Err item");
        Ok(())
    }
}
