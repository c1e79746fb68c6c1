use std::fmt::Write as _;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};

use crate::matrix::MatchupMatrix;
use crate::model::DeckName;
use crate::score::ScoredDeckRow;

fn opt2(v: Option<f64>) -> String {
    v.map(|x| format!("{:.2}", x)).unwrap_or_else(|| "-".to_string())
}

const RANKING_HEADER: [&str; 10] = [
    "rank",
    "deck",
    "players_overall",
    "overall_win_pct",
    "players_day2",
    "day2_win_pct",
    "conv_pct",
    "base_score",
    "matchup_score",
    "final_score",
];

/// Full ranking as CSV, unknown percentages left blank.
pub fn write_ranking_csv<W: io::Write>(rows: &[ScoredDeckRow], out: W) -> Result<()> {
    let mut w = csv::Writer::from_writer(out);
    w.write_record(RANKING_HEADER)?;
    for (i, r) in rows.iter().enumerate() {
        let blank = |v: Option<f64>| v.map(|x| format!("{:.3}", x)).unwrap_or_default();
        w.write_record([
            (i + 1).to_string(),
            r.deck.to_string(),
            r.players_overall.to_string(),
            format!("{:.3}", r.overall_win_pct),
            r.players_day2.to_string(),
            blank(r.day2_win_pct),
            blank(r.conv_pct),
            format!("{:.3}", r.base_score),
            format!("{:.3}", r.matchup_score),
            format!("{:.3}", r.final_score),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Matchup grid between `decks` (row vs column) as CSV.
pub fn write_matrix_csv<W: io::Write>(matrix: &MatchupMatrix, decks: &[DeckName], out: W) -> Result<()> {
    let mut w = csv::Writer::from_writer(out);
    let mut header = vec!["deck vs deck".to_string()];
    header.extend(decks.iter().map(|d| d.to_string()));
    w.write_record(&header)?;
    for (deck, cells) in decks.iter().zip(matrix.view(decks)) {
        let mut rec = vec![deck.to_string()];
        rec.extend(cells.iter().map(|c| c.label()));
        w.write_record(&rec)?;
    }
    w.flush()?;
    Ok(())
}

pub fn save_ranking(rows: &[ScoredDeckRow], path: &Path) -> Result<()> {
    let f = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_ranking_csv(rows, f)
}

pub fn save_matrix(matrix: &MatchupMatrix, decks: &[DeckName], path: &Path) -> Result<()> {
    let f = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_matrix_csv(matrix, decks, f)
}

/// Plain-text ranking table for the terminal.
pub fn ranking_table(rows: &[ScoredDeckRow]) -> String {
    let width = rows.iter().map(|r| r.deck.as_str().chars().count()).max().unwrap_or(4).max(4);
    let mut s = String::new();
    let _ = writeln!(
        s,
        "{:>3}  {:<width$}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}  {:>7}",
        "#", "Deck", "Players", "Win %", "D2 %", "Conv %", "Base", "Matchup", "Final",
    );
    for (i, r) in rows.iter().enumerate() {
        let _ = writeln!(
            s,
            "{:>3}  {:<width$}  {:>7}  {:>7.2}  {:>7}  {:>7}  {:>7.2}  {:>7.2}  {:>7.2}",
            i + 1,
            r.deck.as_str(),
            r.players_overall,
            r.overall_win_pct,
            opt2(r.day2_win_pct),
            opt2(r.conv_pct),
            r.base_score,
            r.matchup_score,
            r.final_score,
        );
    }
    s
}

/// Plain-text matchup grid for the terminal.
pub fn matrix_table(matrix: &MatchupMatrix, decks: &[DeckName]) -> String {
    let grid = matrix.view(decks);
    let labels: Vec<Vec<String>> = grid.iter().map(|r| r.iter().map(|c| c.label()).collect()).collect();
    let name_w = decks.iter().map(|d| d.as_str().chars().count()).max().unwrap_or(0);
    let cell_w = labels
        .iter()
        .flatten()
        .map(|l| l.chars().count())
        .chain(decks.iter().map(|d| d.as_str().chars().count().min(18)))
        .max()
        .unwrap_or(1);

    let mut s = String::new();
    let _ = write!(s, "{:<name_w$}", "");
    for d in decks {
        let short: String = d.as_str().chars().take(18).collect();
        let _ = write!(s, "  {:>cell_w$}", short);
    }
    s.push('\n');
    for (deck, row) in decks.iter().zip(labels) {
        let _ = write!(s, "{:<name_w$}", deck.as_str());
        for l in row {
            let _ = write!(s, "  {:>cell_w$}", l);
        }
        s.push('\n');
    }
    s
}
