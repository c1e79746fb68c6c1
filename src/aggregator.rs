use std::collections::HashMap;

use crate::model::{ConversionRecord, DeckName, DeckTable, SummaryRecord};

/// Everything extracted from one tournament's three standings pages.
#[derive(Clone, Debug, Default)]
pub struct TournamentData {
    pub id: String,
    pub overall: Vec<SummaryRecord>,
    pub day2: Vec<SummaryRecord>,
    pub conversion: Vec<ConversionRecord>,
    pub deck_urls: Vec<(DeckName, String)>,
}

impl TournamentData {
    fn url_for(&self, deck: &DeckName) -> Option<&str> {
        self.deck_urls
            .iter()
            .find(|(n, _)| n == deck)
            .map(|(_, u)| u.as_str())
    }
}

/// Cumulative stats over every tournament folded so far.
#[derive(Clone, Debug, Default)]
pub struct MetaAggregate {
    pub decks: DeckTable,
    urls: HashMap<DeckName, Vec<String>>,
    pub tournaments: usize,
}

impl MetaAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one tournament. Counts are summed, never averaged.
    pub fn fold(&mut self, t: &TournamentData) {
        for r in &t.overall {
            self.decks.get_or_create(&r.deck).overall.add_summary(r);
            if let Some(url) = t.url_for(&r.deck) {
                self.add_url(&r.deck, url);
            }
        }
        for r in &t.day2 {
            self.decks.get_or_create(&r.deck).day2.add_summary(r);
        }
        for c in &t.conversion {
            let conv = &mut self.decks.get_or_create(&c.deck).conversion;
            conv.day1 += c.day1_players;
            conv.day2 += c.day2_players;
        }
        self.tournaments += 1;
    }

    /// Combine two partial aggregates. Associative; `self`'s deck order is kept
    /// and `other`'s new decks are appended.
    pub fn merge(mut self, other: MetaAggregate) -> MetaAggregate {
        for (name, stats) in other.decks.iter() {
            self.decks.get_or_create(name).absorb(stats);
        }
        for (name, _) in other.decks.iter() {
            if let Some(urls) = other.urls.get(name) {
                for u in urls {
                    self.add_url(name, u);
                }
            }
        }
        self.tournaments += other.tournaments;
        self
    }

    fn add_url(&mut self, deck: &DeckName, url: &str) {
        let urls = self.urls.entry(deck.clone()).or_default();
        if !urls.iter().any(|u| u == url) {
            urls.push(url.to_string());
        }
    }

    /// Every distinct deck-page URL seen for `deck`, in discovery order.
    pub fn urls_for(&self, deck: &DeckName) -> &[String] {
        self.urls.get(deck).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub fn aggregate<'a>(tournaments: impl IntoIterator<Item = &'a TournamentData>) -> MetaAggregate {
    let mut agg = MetaAggregate::new();
    for t in tournaments {
        agg.fold(t);
    }
    agg
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(deck: &str, players: u64, w: u64, l: u64, t: u64) -> SummaryRecord {
        SummaryRecord {
            deck: DeckName::new(deck),
            players,
            share: 0.0,
            wins: w,
            losses: l,
            ties: t,
            win_pct: 0.0,
        }
    }

    fn tournament(id: &str, alpha_players: u64) -> TournamentData {
        TournamentData {
            id: id.to_string(),
            overall: vec![summary("Alpha", alpha_players, 10, 5, 1), summary("Beta", 7, 3, 3, 0)],
            day2: vec![summary("Alpha", 2, 4, 2, 0)],
            conversion: vec![ConversionRecord {
                deck: DeckName::new("Alpha"),
                day1_players: alpha_players,
                day2_players: 2,
                conv_pct: 99.0,
            }],
            deck_urls: vec![(DeckName::new("Alpha"), format!("https://x/{id}/decks/alpha"))],
        }
    }

    #[test]
    fn sums_across_tournaments() {
        let a = tournament("0001", 30);
        let b = tournament("0002", 20);
        let agg = aggregate([&a, &b]);
        let alpha = agg.decks.get(&DeckName::new("Alpha")).unwrap();
        assert_eq!(alpha.overall.players, 50);
        assert_eq!(alpha.overall.record.wins, 20);
        assert_eq!(alpha.day2.record.games(), 12);
        assert_eq!(alpha.conversion.day1, 50);
        assert_eq!(alpha.conversion.day2, 4);
        assert_eq!(agg.tournaments, 2);
        assert_eq!(agg.urls_for(&DeckName::new("Alpha")).len(), 2);
        assert!(agg.urls_for(&DeckName::new("Beta")).is_empty());
    }

    #[test]
    fn url_only_kept_for_decks_in_overall_feed() {
        let mut t = tournament("0003", 5);
        t.deck_urls.push((DeckName::new("Ghost"), "https://x/ghost".into()));
        let agg = aggregate([&t]);
        assert!(agg.urls_for(&DeckName::new("Ghost")).is_empty());
        assert!(agg.decks.get(&DeckName::new("Ghost")).is_none());
    }

    #[test]
    fn same_url_twice_is_kept_once() {
        let a = tournament("0001", 30);
        let agg = aggregate([&a, &a]);
        assert_eq!(agg.urls_for(&DeckName::new("Alpha")).len(), 1);
    }

    #[test]
    fn merge_matches_single_pass() {
        let (a, b, c) = (tournament("1", 3), tournament("2", 4), tournament("3", 5));
        let one_pass = aggregate([&a, &b, &c]);
        let split = aggregate([&a, &b]).merge(aggregate([&c]));
        let shuffled = aggregate([&c, &a, &b]);
        for name in ["Alpha", "Beta"] {
            let n = DeckName::new(name);
            assert_eq!(one_pass.decks.get(&n), split.decks.get(&n));
            assert_eq!(one_pass.decks.get(&n), shuffled.decks.get(&n));
        }
        assert_eq!(split.tournaments, 3);
        assert_eq!(split.urls_for(&DeckName::new("Alpha")).len(), 3);
    }
}
