// ai
//! 🏷️ Name enrichment — the ranked ids go to the DMV and get their names
//!
//! 🎬 *[ten repo ids stand on a podium, anonymous. a metadata stream four*
//! *million rows long begins reading out names. "254178?" — "here!" — the*
//! *id receives its name and waves. after the tenth name, the stream is*
//! *still clearing its throat for row eleven. we leave. socially*
//! *acceptable. the stream understands. the stream is used to it.]*
//!
//! 🧠 Knowledge graph:
//! - Enrichment runs AFTER ranking, on the tiny (≤ top-N) result list, so
//!   the per-record "scan every entry" is a scan of ten things, not ten
//!   million. O(N) per row where N wears a single digit most days.
//! - EARLY EXIT is the whole trick: the moment every entry has a name, stop
//!   receiving. The metadata stream may go on for gigabytes; none of it is
//!   read past the last name we needed. The depth-1 channel makes this
//!   observable — a poison row sitting beyond the last needed name is
//!   never delivered, and there's a test that proves it.
//! - Unmatched is FINE in both directions: a metadata row for an id not on
//!   the podium is skipped; a podium id the stream never mentions keeps an
//!   empty name. Empty name = shrug, not error.
//! - Enrichment touches NOTHING but the name field. Counts are frozen, ids
//!   are identity, and no new entry is ever appended, no matter what the
//!   stream claims to know. 💀

use anyhow::Result;
use std::ops::ControlFlow;
use tracing::{debug, trace};

use crate::cancel::StopToken;
use crate::records::Tally;
use crate::schema::NameSchema;
use crate::streams::{RecordStream, StreamBackend};
use crate::tally::drain;

/// 🏷️ Fill in display names for already-ranked entries, in place.
///
/// Reads (id, name) pairs off the metadata stream and stops at the first
/// moment every entry is named — or when the stream runs dry, whichever
/// comes first. Stream failures abort exactly like they do in counting
/// (same [`drain`], same contract, same zero salvage).
pub async fn enrich(
    stream: &StreamBackend,
    stop: &StopToken,
    schema: &NameSchema,
    results: &mut [Tally],
) -> Result<()> {
    // ✅ already satisfied (or nothing to satisfy) → consume NOTHING
    if results.iter().all(Tally::is_named) {
        trace!("🏷️ all {} entries already named, skipping the stream", results.len());
        return Ok(());
    }

    let mut scanned: u64 = 0;
    drain(&stream.tap(), stop, |record| {
        scanned += 1;
        let view = schema.over(&record)?;
        // 🔍 linear scan — the podium is small, the fancy index stays home
        if let Some(entry) = results.iter_mut().find(|t| t.id == view.id()) {
            entry.name = view.name().to_string();
        }
        if results.iter().all(Tally::is_named) {
            // 🏁 everyone has a name. the rest of the stream is somebody
            // else's data. leave without reading it.
            Ok(ControlFlow::Break(()))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    })
    .await?;

    debug!(
        "🏷️ enriched {} entries from {} metadata rows ({} still unnamed)",
        results.len(),
        scanned,
        results.iter().filter(|t| !t.is_named()).count()
    );
    Ok(())
}

// ============================================================
// 🧪 Tests
// ============================================================
