use crate::aggregator::MetaAggregate;
use crate::matrix::MatchupMatrix;
use crate::meta::MetaPool;
use crate::model::DeckName;

pub const W_OVERALL: f64 = 0.4;
pub const W_DAY2: f64 = 0.4;
pub const W_CONV: f64 = 0.2;
/// Conversion prior when a deck has no day-1 entrants on record.
pub const NEUTRAL_CONV: f64 = 50.0;

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredDeckRow {
    pub deck: DeckName,
    pub players_overall: u64,
    pub overall_win_pct: f64,
    pub players_day2: u64,
    pub day2_win_pct: Option<f64>,
    pub conv_pct: Option<f64>,
    pub base_score: f64,
    pub matchup_score: f64,
    pub final_score: f64,
}

pub fn base_score(overall_win_pct: f64, day2_win_pct: Option<f64>, conv_pct: Option<f64>) -> f64 {
    W_OVERALL * overall_win_pct
        + W_DAY2 * day2_win_pct.unwrap_or(overall_win_pct)
        + W_CONV * conv_pct.unwrap_or(NEUTRAL_CONV)
}

/// Rows for every deck with at least `min_players` overall entrants and at
/// least one overall game, in first-sighting order. Matchup fields are zero.
pub fn base_rows(agg: &MetaAggregate, min_players: u64) -> Vec<ScoredDeckRow> {
    agg.decks
        .iter()
        .filter(|(_, s)| s.overall.players >= min_players)
        .filter_map(|(deck, s)| {
            let overall_win_pct = s.overall.record.win_pct()?;
            let day2_win_pct = s.day2.record.win_pct();
            let conv_pct = s.conversion.conv_pct();
            let base = base_score(overall_win_pct, day2_win_pct, conv_pct);
            Some(ScoredDeckRow {
                deck: deck.clone(),
                players_overall: s.overall.players,
                overall_win_pct,
                players_day2: s.day2.players,
                day2_win_pct,
                conv_pct,
                base_score: base,
                matchup_score: 0.0,
                final_score: base,
            })
        })
        .collect()
}

/// Σ over recorded opponents of `weight(opp) · (win% vs opp − 50)`.
pub fn matchup_score(deck: &DeckName, matrix: &MatchupMatrix, pool: &MetaPool) -> f64 {
    matrix
        .row(deck)
        .filter_map(|(opp, cell)| {
            let pct = cell.win_pct()?;
            Some(pool.weight(opp) * (pct - 50.0))
        })
        .sum()
}

/// Fill matchup and final scores, then order by final score, highest first.
/// The sort is stable, so ties keep the incoming order.
pub fn rank(
    mut rows: Vec<ScoredDeckRow>,
    matrix: &MatchupMatrix,
    pool: &MetaPool,
    matchup_weight: f64,
) -> Vec<ScoredDeckRow> {
    for row in rows.iter_mut() {
        row.matchup_score = matchup_score(&row.deck, matrix, pool);
        row.final_score = row.base_score + matchup_weight * row.matchup_score;
    }
    rows.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::{aggregate, TournamentData};
    use crate::model::{ResultCounts, SummaryRecord};

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

    #[test]
    fn neutral_prior_uses_weighted_formula() {
        let t = TournamentData {
            overall: vec![summary("Solo", 40, 1295, 1054, 456)],
            ..Default::default()
        };
        let rows = base_rows(&aggregate([&t]), 20);
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert_eq!(r.day2_win_pct, None);
        assert_eq!(r.conv_pct, None);
        let expected = 0.4 * r.overall_win_pct + 0.4 * r.overall_win_pct + 0.2 * 50.0;
        assert_eq!(r.base_score, expected);
        assert!((r.overall_win_pct - 54.2959).abs() < 1e-3);
    }

    #[test]
    fn all_components_known() {
        let b = base_score(60.0, Some(50.0), Some(25.0));
        assert!((b - (24.0 + 20.0 + 5.0)).abs() < 1e-12);
    }

    #[test]
    fn min_players_and_zero_games_filter() {
        let t = TournamentData {
            overall: vec![
                summary("Small But Perfect", 19, 100, 0, 0),
                summary("No Games", 50, 0, 0, 0),
                summary("Kept", 20, 1, 1, 0),
            ],
            ..Default::default()
        };
        let rows = base_rows(&aggregate([&t]), 20);
        let names: Vec<&str> = rows.iter().map(|r| r.deck.as_str()).collect();
        assert_eq!(names, vec!["Kept"]);
    }

    #[test]
    fn matchup_score_is_weighted_delta() {
        let t = TournamentData {
            overall: vec![summary("A", 300, 10, 10, 0), summary("B", 100, 10, 10, 0)],
            ..Default::default()
        };
        let rows = base_rows(&aggregate([&t]), 1);
        let pool = MetaPool::select(&rows, 20);
        let mut m = MatchupMatrix::new();
        m.record(&DeckName::new("A"), &DeckName::new("B"), ResultCounts::new(6, 4, 0));

        // A: 60% vs B (weight 0.25) -> +2.5 ; B: 40% vs A (weight 0.75) -> -7.5
        let ranked = rank(rows, &m, &pool, 0.5);
        assert_eq!(ranked[0].deck.as_str(), "A");
        assert!((ranked[0].matchup_score - 2.5).abs() < 1e-9);
        assert!((ranked[1].matchup_score + 7.5).abs() < 1e-9);
        assert!((ranked[0].final_score - (ranked[0].base_score + 1.25)).abs() < 1e-9);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let t = TournamentData {
            overall: vec![
                summary("First", 30, 5, 5, 0),
                summary("Second", 30, 5, 5, 0),
                summary("Third", 30, 5, 5, 0),
            ],
            ..Default::default()
        };
        let rows = base_rows(&aggregate([&t]), 1);
        let ranked = rank(rows, &MatchupMatrix::new(), &MetaPool::default(), 0.5);
        let names: Vec<&str> = ranked.iter().map(|r| r.deck.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }
}
