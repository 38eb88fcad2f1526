// ai
//! 🔧 Rank Configuration — the sacred TOML-to-struct pipeline.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the
//! fridge. In the junk drawer. Nothing." — every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! 📐 DESIGN NOTE: there are exactly two knobs, and both used to be
//! compile-time constants in an earlier life: `top_n` (how tall the podium
//! is) and `schema` (which column means what). Pulling them into explicit
//! config is the difference between "bounded result size" being a behavior
//! and being a magic number 10 hiding in a sort call.

use anyhow::Context;
use serde::Deserialize;
// 🔧 To load the configuration, so I don't have to manually parse
// environment variables or files. Bleh. Like doing taxes but for bytes.
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use std::path::Path;
use tracing::info;

use crate::schema::Schema;

/// 📦 Everything a ranking pipeline needs to know about itself, which is
/// more self-awareness than most pipelines achieve in their lifetime.
#[derive(Debug, Deserialize, Clone)]
pub struct RankConfig {
    /// 🏆 How many entries the ranked result may hold. The behavior being
    /// configured is "bounded result size" — 10 is merely its default
    /// opinion, not its identity.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// 🗺️ Which column means what, per record kind. Defaults match the
    /// classic export layout; see `crate::schema`.
    #[serde(default)]
    pub schema: Schema,
}

fn default_top_n() -> usize {
    10
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            schema: Schema::default(),
        }
    }
}

/// 🚀 Load the config — from a file, from env vars, or from the sheer power
/// of defaults.
///
/// 🔧 Merges environment variables (GRK_*) with an optional TOML file.
/// No `.only(...)` restriction — ALL GRK_ vars are fair game. We don't
/// gatekeep env vars here. This is a safe space. 🦆
///
/// 📐 DESIGN NOTE (no cap, this is tribal knowledge):
///   - If `config_file_name` is None  → env vars only. No file. No
///     assumptions. No pizza defaults.
///   - If `config_file_name` is Some  → env vars + TOML file, merged.
///     TOML wins on conflicts.
///
/// 💀 Returns an error if config is unparseable. Check the error message —
/// it's contextual, informative, and written with love. Or despair. Hard to
/// tell at 3am.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<RankConfig> {
    // 🚀 Log what we're loading — because silent failures are the villain
    // origin story of every 3am incident.
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    // 🏗️ Start with env vars as the base layer — like a good sourdough starter.
    let config = Figment::new().merge(Env::prefixed("GRK_"));

    // 🎯 Conditionally layer in TOML only if a file was actually provided.
    // Ancient proverb: "He who defaults to config.toml uninvited, deploys
    // to production alone."
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    // 💬 Build a context message that will actually TELL you what went
    // wrong. None of that "error: error" energy.
    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (GRK_*). \
             The file exists in our hearts, but apparently not on disk.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (GRK_*). \
                 No file was provided — this one's all on the environment. Classic."
            .to_string(),
    };

    // ✅ or 💀, there is no try — actually there is, it's called `?`
    config.extract().context(context_msg)
}
