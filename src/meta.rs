use std::collections::HashMap;

use crate::model::DeckName;
use crate::score::ScoredDeckRow;

/// The top-K decks by overall entrants, with each member's share of the
/// pool's entrants. Matchup fetching only happens for pool members.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetaPool {
    members: Vec<DeckName>,
    weights: HashMap<DeckName, f64>,
}

/// Most-played first. Stable, so decks with equal counts keep their order.
pub fn sort_by_prevalence(rows: &mut [ScoredDeckRow]) {
    rows.sort_by(|a, b| b.players_overall.cmp(&a.players_overall));
}

impl MetaPool {
    /// Pick the `size` most-played decks among `rows`. Ties on player count
    /// go to the deck that comes first in `rows`.
    pub fn select(rows: &[ScoredDeckRow], size: usize) -> MetaPool {
        let mut order: Vec<&ScoredDeckRow> = rows.iter().collect();
        order.sort_by(|a, b| b.players_overall.cmp(&a.players_overall));
        order.truncate(size);

        let total: u64 = order.iter().map(|r| r.players_overall).sum();
        let mut weights = HashMap::new();
        if total > 0 {
            for r in &order {
                weights.insert(r.deck.clone(), r.players_overall as f64 / total as f64);
            }
        }
        MetaPool {
            members: order.into_iter().map(|r| r.deck.clone()).collect(),
            weights,
        }
    }

    pub fn members(&self) -> &[DeckName] {
        &self.members
    }

    pub fn contains(&self, deck: &DeckName) -> bool {
        self.members.contains(deck)
    }

    /// Zero for decks outside the pool.
    pub fn weight(&self, deck: &DeckName) -> f64 {
        self.weights.get(deck).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(deck: &str, players: u64) -> ScoredDeckRow {
        ScoredDeckRow {
            deck: DeckName::new(deck),
            players_overall: players,
            overall_win_pct: 50.0,
            players_day2: 0,
            day2_win_pct: None,
            conv_pct: None,
            base_score: 50.0,
            matchup_score: 0.0,
            final_score: 50.0,
        }
    }

    #[test]
    fn tie_at_the_cut_goes_to_the_earlier_deck() {
        let rows = vec![row("D", 100), row("B", 300), row("C", 300), row("A", 500)];
        let pool = MetaPool::select(&rows, 2);
        let names: Vec<&str> = pool.members().iter().map(|d| d.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!((pool.weight(&DeckName::new("A")) - 0.625).abs() < 1e-12);
        assert!((pool.weight(&DeckName::new("B")) - 0.375).abs() < 1e-12);
        assert_eq!(pool.weight(&DeckName::new("C")), 0.0);
        assert!(!pool.contains(&DeckName::new("D")));
    }

    #[test]
    fn weights_sum_to_one() {
        let rows = vec![row("A", 7), row("B", 11), row("C", 13)];
        let pool = MetaPool::select(&rows, 20);
        assert_eq!(pool.len(), 3);
        let sum: f64 = pool.members().iter().map(|d| pool.weight(d)).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_rows_give_empty_pool() {
        let pool = MetaPool::select(&[], 20);
        assert!(pool.is_empty());
        assert_eq!(pool.weight(&DeckName::new("A")), 0.0);
    }

    #[test]
    fn prevalence_sort_is_stable() {
        let mut rows = vec![row("x", 1), row("y", 5), row("z", 5)];
        sort_by_prevalence(&mut rows);
        let names: Vec<&str> = rows.iter().map(|r| r.deck.as_str()).collect();
        assert_eq!(names, vec!["y", "z", "x"]);
    }
}
