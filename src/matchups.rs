use std::collections::HashMap;

use log::warn;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::extract::parse_percentage;
use crate::model::{DeckName, ResultCounts};

const ROW_TAIL: &str = r"\s+(\d+)\s+(\d+)\s*-\s*(\d+)\s*-\s*(\d+)\s+(\d+[.,]?\d*)%";

/// How an opponent name is located in the page text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// First case-insensitive literal occurrence of the name, anywhere.
    Substring,
    /// Name must start at a word boundary, and when several pool names end on
    /// the same row the longest one claims it.
    #[default]
    Anchored,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchupRecord {
    pub record: ResultCounts,
    pub win_pct: f64,
}

#[derive(Clone, Debug)]
struct Hit {
    name_start: usize,
    row_start: usize,
    record: MatchupRecord,
}

fn opponent_pattern(opp: &DeckName) -> Option<Regex> {
    let pattern = format!("{}{}", regex::escape(opp.as_str()), ROW_TAIL);
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("matchups: cannot build pattern for '{}': {}", opp, e);
            None
        }
    }
}

fn hits(re: &Regex, text: &str, anchored: bool) -> Vec<Hit> {
    let mut out = Vec::new();
    for c in re.captures_iter(text) {
        let (Some(whole), Some(n)) = (c.get(0), c.get(1)) else {
            continue;
        };
        if anchored && !starts_at_boundary(text, whole.start()) {
            continue;
        }
        let parsed = (
            c[2].parse::<u64>(),
            c[3].parse::<u64>(),
            c[4].parse::<u64>(),
            parse_percentage(&c[5]),
        );
        let (Ok(w), Ok(l), Ok(t), Some(pct)) = parsed else {
            continue;
        };
        out.push(Hit {
            name_start: whole.start(),
            row_start: n.start(),
            record: MatchupRecord {
                record: ResultCounts::new(w, l, t),
                win_pct: pct,
            },
        });
    }
    out
}

fn starts_at_boundary(text: &str, at: usize) -> bool {
    match text[..at].chars().next_back() {
        None => true,
        Some(ch) => !ch.is_alphanumeric(),
    }
}

/// Extract `this_deck`'s results against every other member of `pool` that
/// appears on the page.
pub fn extract_matchups(
    text: &str,
    this_deck: &DeckName,
    pool: &[DeckName],
    mode: MatchMode,
) -> HashMap<DeckName, MatchupRecord> {
    let mut result = HashMap::new();

    match mode {
        MatchMode::Substring => {
            for opp in pool.iter().filter(|o| *o != this_deck) {
                let Some(re) = opponent_pattern(opp) else { continue };
                if let Some(hit) = hits(&re, text, false).into_iter().next() {
                    result.insert(opp.clone(), hit.record);
                }
            }
        }
        MatchMode::Anchored => {
            // this_deck takes part in row ownership (its mirror row) but is never reported
            let per_opp: Vec<(&DeckName, Vec<Hit>)> = pool
                .iter()
                .filter_map(|opp| opponent_pattern(opp).map(|re| (opp, hits(&re, text, true))))
                .collect();

            // row start -> earliest name start among all pool names matching that row
            let mut owner: HashMap<usize, usize> = HashMap::new();
            for (_, hs) in &per_opp {
                for h in hs {
                    let e = owner.entry(h.row_start).or_insert(h.name_start);
                    *e = (*e).min(h.name_start);
                }
            }

            for (opp, hs) in per_opp {
                if opp == this_deck {
                    continue;
                }
                let claimed = hs
                    .into_iter()
                    .find(|h| owner.get(&h.row_start) == Some(&h.name_start));
                if let Some(h) = claimed {
                    result.insert(opp.clone(), h.record);
                }
            }
        }
    }
    result
}
