// ai
//! 🏆 The top-N ranker — a HashMap walks in, a podium walks out
//!
//! The shortest module in the crate, and proud of it. Counting already did
//! the hard work; this is just "sort by count, descending, keep the head."
//!
//! ⚠️ Ties are UNORDERED. No secondary key, `sort_unstable_by`, no apology.
//! Two repos with the same count may swap places between runs — that
//! looseness is part of the contract, and tests that assert tie order are
//! asserting a coin flip. Don't. 🦆

use std::collections::HashMap;

use tracing::debug;

use crate::records::Tally;

/// 🏆 Reduce a key→tally mapping to its `n` highest counts, descending.
///
/// The mapping is consumed — after ranking, the survivors own themselves and
/// the losers are dropped. Fewer than `n` entries means you get all of them;
/// a zero-count entry that made the cut is a legitimate podium finisher
/// (small leagues still hold ceremonies).
pub fn rank_top(counts: HashMap<String, Tally>, n: usize) -> Vec<Tally> {
    let total = counts.len();
    let mut ranked: Vec<Tally> = counts.into_values().collect();
    // 🏆 descending by count; equal counts land wherever the sort dropped them
    ranked.sort_unstable_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    debug!("🏆 ranked top {} of {} entries", ranked.len(), total);
    ranked
}

// ============================================================
// 🧪 Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn counts_of(pairs: &[(&str, u64)]) -> HashMap<String, Tally> {
        pairs
            .iter()
            .map(|(id, count)| {
                let mut tally = Tally::seed(*id);
                tally.count = *count;
                (id.to_string(), tally)
            })
            .collect()
    }

    #[test]
    fn the_one_where_the_podium_is_sorted_and_bounded() {
        let counts = counts_of(&[("r1", 5), ("r2", 9), ("r3", 1), ("r4", 7)]);
        let ranked = rank_top(counts, 3);

        assert_eq!(ranked.len(), 3);
        let ids: Vec<&str> = ranked.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["r2", "r4", "r1"]); // 🏆 r3 watches from home
        // 📉 monotone non-increasing, always
        assert!(ranked.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn the_one_where_a_small_league_still_holds_a_ceremony() {
        let counts = counts_of(&[("r1", 2), ("r2", 0)]);
        let ranked = rank_top(counts, 10);

        // ✅ fewer entries than n → all of them, zero-count included
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].id, "r1");
        assert_eq!(ranked[1].count, 0);
    }

    #[test]
    fn the_one_where_nothing_in_means_nothing_out() {
        assert!(rank_top(HashMap::new(), 10).is_empty());
        // 🕳️ n = 0 is a strange request, but a legal one
        assert!(rank_top(counts_of(&[("r1", 3)]), 0).is_empty());
    }

    #[test]
    fn the_one_where_ties_keep_their_counts_if_not_their_seats() {
        let counts = counts_of(&[("a", 4), ("b", 4), ("c", 4), ("d", 1)]);
        let ranked = rank_top(counts, 3);

        // ⚠️ tie ORDER is a coin flip by contract — assert membership only
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|t| t.count == 4));
        assert!(!ranked.iter().any(|t| t.id == "d"));
    }
}
