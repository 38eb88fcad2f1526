// ai
//! 🗺️ Tuple schemas — named fields over positional records
//!
//! 🎬 *[a Record walks in carrying four strings. "Which one of you is the*
//! *repo id?" asks the aggregator. silence. the strings look at each other.*
//! *they do not know. they have never known. they are strings.]*
//!
//! This module is the translation layer between "field number 3" and
//! "the repo id". Raw index arithmetic scattered across aggregators is how
//! you end up counting watch events by commit SHA and presenting the result
//! in a meeting. So: every record kind gets a schema (offsets, configurable)
//! and a view (named accessors, validated once at construction).
//!
//! 🧠 Knowledge graph:
//! - `Schema` = the bundle of per-kind offsets, serde-deserializable so a
//!   config file can re-map columns when some future export shuffles them.
//!   Defaults match the classic export layout. Nobody overrides these until
//!   the day somebody REALLY needs to, and on that day this struct is a hero.
//! - `EventSchema` / `CommitSchema` / `NameSchema` = offsets for one kind.
//! - `EventView` / `CommitView` / `NameView` = borrowed, validated windows
//!   onto one `Record`. Construction (`over`) checks the record is long
//!   enough for every offset and fails with a malformed-record error;
//!   accessors after that are infallible. Validate once, trust forever. 🦆
//! - `EventKind` = the event-type enum. Watch and Push are celebrities;
//!   everything else is `Other` and politely ignored by the predicates.
//!
//! "He who indexes tuples by literal integer, ships the off-by-one to prod."
//!   — Ancient proverb, column 3 💀

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::records::Record;

// ============================================================
// 🎭 EventKind — the type column, enumerated
// ============================================================

/// 🎭 What kind of event a row describes.
///
/// The export has dozens of event types; this pipeline cares about exactly
/// two. Everything else parses to `Other` — not an error, just not invited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// 👀 Somebody starred/watched a repo. The currency of fame.
    Watch,
    /// 📤 Somebody pushed commits. The currency of actual work.
    Push,
    /// 🤷 Forks, issues, comments, gollum events (real name, look it up) —
    /// all the types this pipeline acknowledges exist and then ignores.
    Other,
}

impl EventKind {
    /// 🎭 Parse the raw type column. Unknown strings are `Other`, never an
    /// error — new event types appearing upstream must not break old reports.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "WatchEvent" => Self::Watch,
            "PushEvent" => Self::Push,
            _ => Self::Other,
        }
    }
}

// ============================================================
// 🗺️ Schema — the full offset map, one sub-schema per record kind
// ============================================================

/// 🗺️ Positional offsets for every record kind the pipeline reads.
///
/// Embedded in `RankConfig` (see `crate::app_config`) so the column layout
/// rides the same figment pipeline as everything else: TOML file, env vars,
/// defaults, in that order of somebody-bothered-to-set-it.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Schema {
    /// 🎟️ Offsets for event records
    #[serde(default)]
    pub events: EventSchema,
    /// 📝 Offsets for commit records
    #[serde(default)]
    pub commits: CommitSchema,
    /// 🏷️ Offsets for repository metadata records
    #[serde(default)]
    pub repos: NameSchema,
    /// 🧑 Offsets for actor metadata records
    #[serde(default)]
    pub actors: NameSchema,
}

// ============================================================
// 🎟️ EventSchema + EventView
// ============================================================

/// 🎟️ Where the interesting columns live in an event record.
///
/// Default layout: `id, type, actor_id, repo_id, ...` — id at 0, type at 1,
/// repo id at 3. Column 2 exists, carries the actor id, and is reserved for
/// the day the top-users pipeline grows a body.
#[derive(Debug, Deserialize, Clone)]
pub struct EventSchema {
    /// 🪪 Event id column
    #[serde(default = "default_event_id")]
    pub id: usize,
    /// 🎭 Event type column ("WatchEvent", "PushEvent", ...)
    #[serde(default = "default_event_kind")]
    pub kind: usize,
    /// 🏠 Repo id column
    #[serde(default = "default_event_repo_id")]
    pub repo_id: usize,
}

fn default_event_id() -> usize {
    0
}

fn default_event_kind() -> usize {
    1
}

fn default_event_repo_id() -> usize {
    3
} // -- yes, 3. column 2 is the actor. we checked. twice.

impl Default for EventSchema {
    fn default() -> Self {
        Self {
            id: default_event_id(),
            kind: default_event_kind(),
            repo_id: default_event_repo_id(),
        }
    }
}

impl EventSchema {
    /// 🔢 The minimum field count a row must carry to satisfy every offset.
    pub fn min_fields(&self) -> usize {
        self.id.max(self.kind).max(self.repo_id) + 1
    }

    /// 🪟 Validate `record` against this schema and open a view onto it.
    ///
    /// Fails with a malformed-record error when the row is too short for any
    /// offset. After this returns `Ok`, every accessor on the view is
    /// infallible — the bounds check happened exactly once, right here.
    pub fn over<'r>(&self, record: &'r Record) -> Result<EventView<'r>> {
        match (
            record.get(self.id),
            record.get(self.kind),
            record.get(self.repo_id),
        ) {
            (Some(id), Some(kind), Some(repo_id)) => Ok(EventView { id, kind, repo_id }),
            _ => bail!(
                "💀 malformed event record: wanted at least {} fields, got {}",
                self.min_fields(),
                record.len()
            ),
        }
    }
}

/// 🪟 A validated, borrowed window onto one event record.
#[derive(Debug, Clone, Copy)]
pub struct EventView<'r> {
    id: &'r str,
    kind: &'r str,
    repo_id: &'r str,
}

impl<'r> EventView<'r> {
    /// 🪪 The event id.
    pub fn id(&self) -> &'r str {
        self.id
    }

    /// 🎭 The event kind, parsed. Unknown types come back as `Other`.
    pub fn kind(&self) -> EventKind {
        EventKind::parse(self.kind)
    }

    /// 🏠 The repo id this event happened to.
    pub fn repo_id(&self) -> &'r str {
        self.repo_id
    }
}

// ============================================================
// 📝 CommitSchema + CommitView
// ============================================================

/// 📝 Where the interesting column lives in a commit record.
///
/// Default layout: `sha, message, event_id, ...` — the only field this
/// pipeline reads is the originating event id at offset 2, which is the
/// thread that ties a commit back to the push event that delivered it.
#[derive(Debug, Deserialize, Clone)]
pub struct CommitSchema {
    /// 🎟️ Originating event id column
    #[serde(default = "default_commit_event_id")]
    pub event_id: usize,
}

fn default_commit_event_id() -> usize {
    2
}

impl Default for CommitSchema {
    fn default() -> Self {
        Self {
            event_id: default_commit_event_id(),
        }
    }
}

impl CommitSchema {
    /// 🔢 The minimum field count a row must carry to satisfy every offset.
    pub fn min_fields(&self) -> usize {
        self.event_id + 1
    }

    /// 🪟 Validate `record` against this schema and open a view onto it.
    pub fn over<'r>(&self, record: &'r Record) -> Result<CommitView<'r>> {
        match record.get(self.event_id) {
            Some(event_id) => Ok(CommitView { event_id }),
            None => bail!(
                "💀 malformed commit record: wanted at least {} fields, got {}",
                self.min_fields(),
                record.len()
            ),
        }
    }
}

/// 🪟 A validated, borrowed window onto one commit record.
#[derive(Debug, Clone, Copy)]
pub struct CommitView<'r> {
    event_id: &'r str,
}

impl<'r> CommitView<'r> {
    /// 🎟️ The id of the push event this commit arrived in.
    pub fn event_id(&self) -> &'r str {
        self.event_id
    }
}

// ============================================================
// 🏷️ NameSchema + NameView — repos and actors share a shape
// ============================================================

/// 🏷️ Where id and display name live in a metadata record.
///
/// Repos and actors use the same two-column head (`id, name, ...`), so they
/// share one schema type. Two structs with identical fields would just be
/// the same struct wearing a fake mustache.
#[derive(Debug, Deserialize, Clone)]
pub struct NameSchema {
    /// 🪪 Entity id column
    #[serde(default = "default_name_id")]
    pub id: usize,
    /// 🏷️ Display name column
    #[serde(default = "default_name_name")]
    pub name: usize,
}

fn default_name_id() -> usize {
    0
}

fn default_name_name() -> usize {
    1
}

impl Default for NameSchema {
    fn default() -> Self {
        Self {
            id: default_name_id(),
            name: default_name_name(),
        }
    }
}

impl NameSchema {
    /// 🔢 The minimum field count a row must carry to satisfy every offset.
    pub fn min_fields(&self) -> usize {
        self.id.max(self.name) + 1
    }

    /// 🪟 Validate `record` against this schema and open a view onto it.
    pub fn over<'r>(&self, record: &'r Record) -> Result<NameView<'r>> {
        match (record.get(self.id), record.get(self.name)) {
            (Some(id), Some(name)) => Ok(NameView { id, name }),
            _ => bail!(
                "💀 malformed metadata record: wanted at least {} fields, got {}",
                self.min_fields(),
                record.len()
            ),
        }
    }
}

/// 🪟 A validated, borrowed window onto one metadata (repo/actor) record.
#[derive(Debug, Clone, Copy)]
pub struct NameView<'r> {
    id: &'r str,
    name: &'r str,
}

impl<'r> NameView<'r> {
    /// 🪪 The entity id.
    pub fn id(&self) -> &'r str {
        self.id
    }

    /// 🏷️ The display name.
    pub fn name(&self) -> &'r str {
        self.name
    }
}

// ============================================================
// 🧪 Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_event_kinds_parse() {
        assert_eq!(EventKind::parse("WatchEvent"), EventKind::Watch);
        assert_eq!(EventKind::parse("PushEvent"), EventKind::Push);
        assert_eq!(EventKind::parse("GollumEvent"), EventKind::Other);
        assert_eq!(EventKind::parse(""), EventKind::Other);
        // 🎭 case matters. "watchevent" is some other, lowercase event.
        assert_eq!(EventKind::parse("watchevent"), EventKind::Other);
    }

    #[test]
    fn the_one_where_an_event_view_opens_on_a_good_row() -> Result<()> {
        let schema = EventSchema::default();
        let row = Record::from_row(&["2489651045", "WatchEvent", "9152315", "254178", "{}"]);
        let view = schema.over(&row)?;
        assert_eq!(view.id(), "2489651045");
        assert_eq!(view.kind(), EventKind::Watch);
        assert_eq!(view.repo_id(), "254178");
        Ok(())
    }

    #[test]
    fn the_one_where_a_short_event_row_is_malformed() {
        let schema = EventSchema::default();
        // 💀 three fields, repo_id wants offset 3. computer says no.
        let row = Record::from_row(&["2489651045", "WatchEvent", "9152315"]);
        let err = schema.over(&row).unwrap_err();
        assert!(err.to_string().contains("malformed event record"));
        assert!(err.to_string().contains("got 3"));
    }

    #[test]
    fn the_one_where_a_commit_view_finds_its_event_id() -> Result<()> {
        let schema = CommitSchema::default();
        let row = Record::from_row(&["c0ffee", "fix: the thing", "2489651045"]);
        assert_eq!(schema.over(&row)?.event_id(), "2489651045");
        Ok(())
    }

    #[test]
    fn the_one_where_a_name_view_reads_repo_metadata() -> Result<()> {
        let schema = NameSchema::default();
        let row = Record::from_row(&["254178", "openworm/org.geppetto"]);
        let view = schema.over(&row)?;
        assert_eq!(view.id(), "254178");
        assert_eq!(view.name(), "openworm/org.geppetto");
        Ok(())
    }

    #[test]
    fn the_one_where_an_empty_row_fails_every_schema() {
        let row = Record::new(vec![]);
        assert!(EventSchema::default().over(&row).is_err());
        assert!(CommitSchema::default().over(&row).is_err());
        assert!(NameSchema::default().over(&row).is_err());
    }

    #[test]
    fn the_one_where_toml_overrides_one_offset_and_defaults_the_rest() -> Result<()> {
        // 🗺️ future export shuffles the repo id to column 5. config saves us.
        let schema: Schema = toml::from_str(
            r#"
            [events]
            repo_id = 5
            "#,
        )?;
        assert_eq!(schema.events.repo_id, 5);
        assert_eq!(schema.events.id, 0);
        assert_eq!(schema.events.kind, 1);
        assert_eq!(schema.commits.event_id, 2);
        assert_eq!(schema.repos.name, 1);
        Ok(())
    }

    #[test]
    fn the_one_where_min_fields_tracks_the_largest_offset() {
        let schema = EventSchema {
            id: 0,
            kind: 1,
            repo_id: 7,
        };
        assert_eq!(schema.min_fields(), 8);
        assert_eq!(NameSchema::default().min_fields(), 2);
    }
}
