// ai
//! 📦 Records and tallies — the building blocks of gitrank
//!
//! ---
//!
//! 🎬 COLD OPEN — INT. DATA WAREHOUSE — 3:47 AM
//!
//! 🌩️ Somewhere, an export job finished. Forty million comma-separated lines
//! of watch events, push events, and repository trivia, sitting on disk,
//! waiting. Nobody reads forty million lines. Nobody *should* read forty
//! million lines. Somebody will be asked to summarize them by Friday.
//!
//! ✅ And then — a `Record` arrives. Quietly. Carrying its string fields like
//! a responsible adult carrying groceries in one trip (ALL of them, no second
//! trips, this is a point of honor). It doesn't know if it's a watch event or
//! a push event. It doesn't know what a repository is. It carries fields.
//! That's the whole job, and it does it with dignity. 🦆
//!
//! This module defines the humble yet load-bearing structs that ferry data
//! from the streams into the aggregators and out to a ranked table. They ask
//! no questions. They carry the data. They are the postal workers of this
//! codebase. Please tip your postal workers.
//!
//! ---
//!
//! 🧠 Knowledge graph:
//! - `Record` = one positional tuple of string fields from one source row.
//!   It carries NO failure — a failed read travels as the `Err` arm of
//!   `anyhow::Result<Record>` on the stream channel, so "fields or failure,
//!   never both" is enforced by the type system instead of a comment.
//! - `Tally` = the per-entity accumulator (id, display name, count). Born
//!   during counting with an empty name, count frozen at ranking time, name
//!   filled during enrichment, never touched again.
//! - Field *meaning* lives in `crate::schema` — a Record is deliberately
//!   ignorant of what its columns mean. Ignorance is a feature here.

use serde::Serialize;

/// 📦 One row of input: an ordered sequence of string fields.
///
/// A `Record` is a positional tuple and nothing more. Column 0 might be an
/// event id, a repo id, or a grocery list — the Record neither knows nor
/// cares. The schema views in [`crate::schema`] are the ones with opinions.
///
/// Access is bounds-checked (`get` returns `Option`) because "index 3 of a
/// 2-field row" should be a polite `None` at this layer and a proper
/// malformed-record error one layer up, never an out-of-bounds panic at
/// 3am in the middle of a forty-million-row job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    /// 🏗️ Wrap a row of owned fields into a `Record`.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// 🧪 Convenience for tests and benches: build a Record from `&str`s.
    ///
    /// Saves every test from performing the `.to_string()` incantation four
    /// times per row. The allocations still happen. We just stopped looking.
    pub fn from_row(fields: &[&str]) -> Self {
        Self::new(fields.iter().map(|f| f.to_string()).collect())
    }

    /// 🔍 The field at `index`, or `None` when the row is too short.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(String::as_str)
    }

    /// 🔢 How many fields this row carries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// 🕳️ True for a row with no fields at all.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// 🏷️ The aggregate entry: one entity, one running count, one (eventual) name.
///
/// A `Tally` lives three lives:
/// 1. **Counting** — born via [`Tally::seed`] on first sight of an entity id,
///    count bumped in place for every matching record. Name stays empty.
///    Like a tab at a bar: the bartender knows your id, not your name.
/// 2. **Ranked** — extracted by value into the top-N list. Count is frozen.
///    Nobody increments a ranked Tally. It has peaked. Let it rest.
/// 3. **Enriched** — the name field gets filled from a metadata stream, if a
///    matching row shows up. If not, the name stays empty and the table
///    prints a gap. Not every entity gets to be famous.
///
/// Serializes cleanly because the CLI offers a JSON output mode and robots
/// deserve nice things too.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    /// 🪪 The entity id (repo id, actor id...). Identity. Immutable once born.
    pub id: String,
    /// 🏷️ Display name — empty until enrichment finds it, possibly forever.
    /// An empty name is a shrug, not an error.
    pub name: String,
    /// 🔢 The running count. Monotonically non-decreasing while counting,
    /// frozen once ranking begins. It only knows how to go up. Relatable.
    pub count: u64,
}

impl Tally {
    /// 🌱 A fresh zero-count, no-name tally for a just-discovered entity.
    ///
    /// This is the "first write wins" moment: the counting loop calls this
    /// exactly once per distinct id, via `entry(..).or_insert_with(..)`.
    pub fn seed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            count: 0,
        }
    }

    /// 🏷️ Has enrichment already found this entry's display name?
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

// ============================================================
// 🧪 Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_field_access_is_polite_about_short_rows() {
        let record = Record::from_row(&["e1", "WatchEvent"]);
        assert_eq!(record.get(0), Some("e1"));
        assert_eq!(record.get(1), Some("WatchEvent"));
        // 🕳️ index 3 of a 2-field row: a None, not a panic
        assert_eq!(record.get(3), None);
        assert_eq!(record.len(), 2);
        assert!(!record.is_empty());
        assert!(Record::new(vec![]).is_empty());
    }

    #[test]
    fn the_one_where_a_seeded_tally_starts_from_nothing() {
        let tally = Tally::seed("r42");
        assert_eq!(tally.id, "r42");
        assert_eq!(tally.count, 0);
        assert!(!tally.is_named());
    }

    #[test]
    fn the_one_where_a_tally_becomes_json_for_the_robots() {
        let tally = Tally {
            id: "254178".to_string(),
            name: "openworm/org.geppetto".to_string(),
            count: 2,
        };
        // 🤖 the --format json contract: id, name, count, nothing else
        let json = serde_json::to_value(&tally).expect("a Tally always serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "254178",
                "name": "openworm/org.geppetto",
                "count": 2
            })
        );
    }
}
