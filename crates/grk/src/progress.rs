// ai
//! 📊 progress.rs — "Are we there yet?" — every stream, every run, forever.
//!
//! 🚀 Reading a multi-gigabyte export with no feedback is how operators end
//! up running `ls -la` on the output file in a second terminal like it's a
//! pot that might boil. This module gives every open stream its own gauge:
//! a byte-position bar when the file size is knowable, a spinner when it
//! isn't (gzip keeps its decompressed size a secret until the end, like a
//! magician, or a liar).
//!
//! ⚠️ Warning: watching the gauge will not make it go faster. Neither will
//! refreshing it. We've tried. Science says no.
//!
//! 🧠 Knowledge graph:
//! - One process-wide `MultiProgress` (lazy, `OnceLock`) — a ranking can
//!   hold two or three open streams at once, and two bars fighting over one
//!   terminal line is a war nobody wins.
//! - `StreamGauge::bytes` = known-size mode. Position is ABSOLUTE (the csv
//!   reader hands over its byte offset), so `advance_to`, not `inc`.
//! - `StreamGauge::spinner` = unknown-size mode for `.gz` sources.
//! - Gauges clear themselves on finish — the final ranked table deserves a
//!   clean terminal, not a graveyard of completed bars.
//! - Message refreshes are batched every few thousand records; indicatif
//!   throttles redraws, but building the message string 40 million times
//!   would still be 40 million strings.
//!
//! 🦆 The duck has nothing to do with this module. It's just vibing.

use std::sync::OnceLock;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

// -- 📏 one mebibyte — not a megabyte, pedants. the hill remains occupied.
const MIB: u64 = 1024 * 1024;

// -- 🔄 records between message refreshes — frequent enough to feel alive,
// -- rare enough that the allocator doesn't file a complaint
const RECORDS_PER_REFRESH: u64 = 8192;

// 🎪 the one terminal, shared by every gauge in the process
static GAUGES: OnceLock<MultiProgress> = OnceLock::new();

fn gauges() -> &'static MultiProgress {
    GAUGES.get_or_init(MultiProgress::new)
}

/// 📦 Raw bytes into a human string, scaled to the total being read.
/// Because "1073741824 bytes" is a war crime in a UI.
fn format_bytes(bytes: u64, total: u64) -> String {
    if total >= 512 * MIB {
        // -- 🚀 MiB territory. congratulations on your large export.
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if total >= MIB {
        // -- 📦 KiB zone — still respectable
        format!("{:.2} KiB", bytes as f64 / 1024.0)
    } else {
        // -- 🐛 raw bytes mode. small files need love too.
        format!("{} bytes", bytes)
    }
}

/// 🔢 Commas for the 3 people in the audience who like readability.
/// "1000000 records" → "1,000,000 records" — you're welcome, eyes.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// 📊 One stream's progress display. Owned and fed by the stream's producer.
///
/// Two modes, one struct:
/// - **bytes**: we know the file size, so there's a real bar with a real
///   percent. The good timeline.
/// - **spinner**: size unknown (gzip). The bar is replaced by a spinner and
///   the byte count just goes up. Emotionally honest.
pub struct StreamGauge {
    bar: ProgressBar,
    label: String,
    total_bytes: u64,
    records: u64,
}

impl std::fmt::Debug for StreamGauge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 ProgressBar is a diva and doesn't derive Debug
        f.debug_struct("StreamGauge")
            .field("label", &self.label)
            .field("total_bytes", &self.total_bytes)
            .field("records", &self.records)
            .finish()
    }
}

impl StreamGauge {
    /// 🚀 A known-size gauge: full bar, percent, the works.
    pub fn bytes(label: &str, total_bytes: u64) -> Self {
        let bar = gauges().add(ProgressBar::new(total_bytes));
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{msg}\n| [{bar:40.cyan/blue}]")
                .unwrap() // -- 🐛 safe unwrap: template string is hardcoded and valid, I checked, twice
                .progress_chars("=>-"),
        );
        let mut gauge = Self {
            bar,
            label: label.to_string(),
            total_bytes,
            records: 0,
        };
        gauge.render();
        gauge
    }

    /// 🌀 An unknown-size gauge: spinner plus a climbing byte count.
    pub fn spinner(label: &str) -> Self {
        let bar = gauges().add(ProgressBar::new_spinner());
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} {msg}")
                .unwrap(), // -- 🐛 safe unwrap: hardcoded template, same deal as above
        );
        let mut gauge = Self {
            bar,
            label: label.to_string(),
            total_bytes: 0,
            records: 0,
        };
        gauge.render();
        gauge
    }

    /// 📍 Move the gauge to an absolute byte offset in the source.
    ///
    /// Absolute, not relative — the csv reader hands us its position, and
    /// adding positions together would march the bar past 100% into a
    /// percentage only management believes in.
    pub fn advance_to(&mut self, byte_pos: u64) {
        self.bar.set_position(byte_pos);
        self.records += 1;
        if self.records % RECORDS_PER_REFRESH == 0 {
            self.render();
        }
    }

    /// ✅ Done (EOF or abort, same gesture). Clears the gauge from the
    /// terminal so the actual output doesn't share the stage.
    pub fn finish(self) {
        self.bar.finish_and_clear();
    }

    // 🎨 rebuild the one-line status message
    fn render(&mut self) {
        let read = format_bytes(self.bar.position(), self.total_bytes.max(1));
        let msg = if self.total_bytes > 0 {
            let total = format_bytes(self.total_bytes, self.total_bytes);
            format!(
                "{}: {} records | {} / {}",
                self.label,
                format_number(self.records),
                read,
                total
            )
        } else {
            // -- 🌀 no denominator, no percent, no lies
            format!(
                "{}: {} records | {} read",
                self.label,
                format_number(self.records),
                read
            )
        };
        self.bar.set_message(msg);
    }
}

// ============================================================
// 🧪 Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_one_where_numbers_get_their_commas() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn the_one_where_bytes_scale_to_the_total() {
        // 🐛 small total → raw bytes
        assert_eq!(format_bytes(512, 1000), "512 bytes");
        // 📦 MiB-ish total → KiB
        assert_eq!(format_bytes(2048, 2 * MIB), "2.00 KiB");
        // 🚀 huge total → MiB
        assert_eq!(format_bytes(3 * MIB, 600 * MIB), "3.00 MiB");
    }
}
