use std::collections::HashMap;
use std::fmt;

/// Deck identity. Two names are the same deck iff they are byte-identical after trimming.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeckName(String);

impl DeckName {
    pub fn new(raw: &str) -> Self {
        DeckName(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeckName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeckName {
    fn from(s: &str) -> Self {
        DeckName::new(s)
    }
}

/// One row of an overall or day-2 standings page.
#[derive(Clone, Debug, PartialEq)]
pub struct SummaryRecord {
    pub deck: DeckName,
    pub players: u64,
    pub share: f64,
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
    pub win_pct: f64,
}

/// One row of the conversion page. `conv_pct` is informational only.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversionRecord {
    pub deck: DeckName,
    pub day1_players: u64,
    pub day2_players: u64,
    pub conv_pct: f64,
}

/// W-L-T counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResultCounts {
    pub wins: u64,
    pub losses: u64,
    pub ties: u64,
}

impl ResultCounts {
    pub fn new(wins: u64, losses: u64, ties: u64) -> Self {
        Self { wins, losses, ties }
    }

    pub fn games(&self) -> u64 {
        self.wins + self.losses + self.ties
    }

    /// Ties count as half a win. `None` when no games were played.
    pub fn win_pct(&self) -> Option<f64> {
        let games = self.games();
        if games == 0 {
            return None;
        }
        Some((self.wins as f64 + 0.5 * self.ties as f64) / games as f64 * 100.0)
    }

    pub fn add(&mut self, other: ResultCounts) {
        self.wins += other.wins;
        self.losses += other.losses;
        self.ties += other.ties;
    }

    /// Same games seen from the opponent's side.
    pub fn mirrored(&self) -> ResultCounts {
        ResultCounts {
            wins: self.losses,
            losses: self.wins,
            ties: self.ties,
        }
    }
}

/// Games plus entrant count for one feed (overall or day 2).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeedTotals {
    pub record: ResultCounts,
    pub players: u64,
}

impl FeedTotals {
    pub fn add_summary(&mut self, r: &SummaryRecord) {
        self.record.add(ResultCounts::new(r.wins, r.losses, r.ties));
        self.players += r.players;
    }

    pub fn add(&mut self, other: &FeedTotals) {
        self.record.add(other.record);
        self.players += other.players;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionTotals {
    pub day1: u64,
    pub day2: u64,
}

impl ConversionTotals {
    /// Recomputed from summed counts, never from per-tournament percentages.
    pub fn conv_pct(&self) -> Option<f64> {
        if self.day1 == 0 {
            return None;
        }
        Some(self.day2 as f64 / self.day1 as f64 * 100.0)
    }
}

/// Cumulative per-deck statistics across all processed tournaments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregatedDeckStats {
    pub overall: FeedTotals,
    pub day2: FeedTotals,
    pub conversion: ConversionTotals,
}

impl AggregatedDeckStats {
    pub fn absorb(&mut self, other: &AggregatedDeckStats) {
        self.overall.add(&other.overall);
        self.day2.add(&other.day2);
        self.conversion.day1 += other.conversion.day1;
        self.conversion.day2 += other.conversion.day2;
    }
}

/// Per-deck map in first-sighting order. Entries only come into existence
/// through `get_or_create`; plain lookups never materialise a zero entry.
#[derive(Clone, Debug, Default)]
pub struct DeckTable {
    names: Vec<DeckName>,
    stats: Vec<AggregatedDeckStats>,
    index: HashMap<DeckName, usize>,
}

impl DeckTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, name: &DeckName) -> &mut AggregatedDeckStats {
        let idx = match self.index.get(name) {
            Some(&i) => i,
            None => {
                let i = self.names.len();
                self.names.push(name.clone());
                self.stats.push(AggregatedDeckStats::default());
                self.index.insert(name.clone(), i);
                i
            }
        };
        &mut self.stats[idx]
    }

    pub fn get(&self, name: &DeckName) -> Option<&AggregatedDeckStats> {
        self.index.get(name).map(|&i| &self.stats[i])
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DeckName, &AggregatedDeckStats)> {
        self.names.iter().zip(self.stats.iter())
    }
}
