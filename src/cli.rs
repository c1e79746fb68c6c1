use std::path::PathBuf;

use clap::Parser;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

static TID_IN_URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"/(\d{4})").unwrap());

/// Cross-tournament meta ranking from Limitless Labs standings.
#[derive(Parser, Debug)]
#[command(name = "meta-aggregator", version)]
pub struct Cli {
    /// Tournament ids or URLs (e.g. 0046, 46, https://labs.limitlesstcg.com/0046/decks)
    pub tournaments: Vec<String>,

    /// Read more ids/URLs from a file, one per line
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Minimum accumulated overall players per deck
    #[arg(long)]
    pub min_players: Option<String>,

    /// Number of most-played decks that get matchup data
    #[arg(long)]
    pub meta_pool_size: Option<String>,

    /// Weight of the matchup score in the final score (β)
    #[arg(long)]
    pub matchup_weight: Option<String>,

    /// Rows and matrix size shown
    #[arg(long)]
    pub top: Option<usize>,

    /// Write the full ranking as CSV
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Write the top-N matchup matrix as CSV
    #[arg(long)]
    pub matrix_out: Option<PathBuf>,

    /// Config file (default: ./config.toml)
    #[arg(long, env = "META_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the Limitless Labs base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Fetch tournaments one at a time
    #[arg(long)]
    pub sequential: bool,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Four-digit tournament id from a line: `/dddd` anywhere in it, or a bare
/// number zero-padded to four digits. Blank or unrecognised lines give `None`.
pub fn normalize_tournament_id(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(c) = TID_IN_URL.captures(line) {
        return Some(c[1].to_string());
    }
    if line.chars().all(|c| c.is_ascii_digit()) {
        return Some(format!("{:0>4}", line));
    }
    None
}

/// Normalise every line, warning about the ones that are not ids.
pub fn tournament_ids<'a>(lines: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out = Vec::new();
    for line in lines {
        match normalize_tournament_id(line) {
            Some(id) => out.push(id),
            None if line.trim().is_empty() => {}
            None => warn!("ignoring '{}': not a tournament id", line.trim()),
        }
    }
    out
}
