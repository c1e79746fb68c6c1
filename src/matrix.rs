use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, warn};

use crate::aggregator::MetaAggregate;
use crate::error::FetchError;
use crate::matchups::{extract_matchups, MatchMode};
use crate::meta::MetaPool;
use crate::model::{DeckName, ResultCounts};

pub type MatchupCell = ResultCounts;

/// Sparse deck×deck results. Every contribution to (A, B) also lands, mirrored,
/// in (B, A); cells only exist for pairs that received data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MatchupMatrix {
    cells: BTreeMap<DeckName, BTreeMap<DeckName, MatchupCell>>,
}

impl MatchupMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, deck: &DeckName, opp: &DeckName, result: ResultCounts) {
        self.cell_mut(deck, opp).add(result);
        self.cell_mut(opp, deck).add(result.mirrored());
    }

    fn cell_mut(&mut self, a: &DeckName, b: &DeckName) -> &mut MatchupCell {
        self.cells
            .entry(a.clone())
            .or_default()
            .entry(b.clone())
            .or_default()
    }

    pub fn get(&self, deck: &DeckName, opp: &DeckName) -> Option<&MatchupCell> {
        self.cells.get(deck)?.get(opp)
    }

    /// `deck`'s recorded opponents, ordered by name.
    pub fn row<'a>(&'a self, deck: &DeckName) -> impl Iterator<Item = (&'a DeckName, &'a MatchupCell)> {
        self.cells.get(deck).into_iter().flat_map(|r| r.iter())
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&DeckName, &DeckName, &MatchupCell)> {
        self.cells
            .iter()
            .flat_map(|(a, r)| r.iter().map(move |(b, c)| (a, b, c)))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Grid for the given decks, row deck against column deck.
    pub fn view(&self, decks: &[DeckName]) -> Vec<Vec<MatrixCell>> {
        decks
            .iter()
            .map(|a| {
                decks
                    .iter()
                    .map(|b| {
                        if a == b {
                            return MatrixCell::Diagonal;
                        }
                        match self.get(a, b) {
                            Some(c) => match c.win_pct() {
                                Some(pct) => MatrixCell::Data {
                                    result: *c,
                                    win_pct: pct,
                                    class: CellClass::of(pct),
                                },
                                None => MatrixCell::Empty,
                            },
                            None => MatrixCell::Empty,
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellClass {
    Good,
    Neutral,
    Bad,
}

impl CellClass {
    pub fn of(win_pct: f64) -> CellClass {
        if win_pct >= 55.0 {
            CellClass::Good
        } else if win_pct <= 45.0 {
            CellClass::Bad
        } else {
            CellClass::Neutral
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatrixCell {
    Diagonal,
    Empty,
    Data {
        result: ResultCounts,
        win_pct: f64,
        class: CellClass,
    },
}

impl MatrixCell {
    /// `6-4-0 (60.0%)`, `-` on the diagonal, blank when empty.
    pub fn label(&self) -> String {
        match self {
            MatrixCell::Diagonal => "-".to_string(),
            MatrixCell::Empty => String::new(),
            MatrixCell::Data { result, win_pct, .. } => format!(
                "{}-{}-{} ({:.1}%)",
                result.wins, result.losses, result.ties, win_pct
            ),
        }
    }
}

/// Build the matrix from every recorded deck page of every pool member.
///
/// `fetch_text` turns a deck URL into the flattened text of its matchup page.
/// A failed fetch is logged and skipped; it never drops data already recorded.
pub fn collect_matchups(
    pool: &MetaPool,
    agg: &MetaAggregate,
    mode: MatchMode,
    mut fetch_text: impl FnMut(&str) -> Result<String, FetchError>,
) -> MatchupMatrix {
    let mut matrix = MatchupMatrix::new();
    let t0 = Instant::now();
    let mut pages = 0usize;

    for deck in pool.members() {
        for url in agg.urls_for(deck) {
            let text = match fetch_text(url) {
                Ok(t) => t,
                Err(e) => {
                    warn!("matchups: failed to fetch {} at {}: {}", deck, url, e);
                    continue;
                }
            };
            pages += 1;
            let found = extract_matchups(&text, deck, pool.members(), mode);
            let mut opps: Vec<&DeckName> = found.keys().collect();
            opps.sort();
            debug!("matchups: {} at {}: {:?}", deck, url, opps);
            for (opp, m) in &found {
                matrix.record(deck, opp, m.record);
            }
        }
    }

    debug!(
        "matchups: {} pages for {} pool decks in {:.3}s",
        pages,
        pool.len(),
        t0.elapsed().as_secs_f64()
    );
    matrix
}
