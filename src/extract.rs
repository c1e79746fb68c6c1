use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::ParseSkip;
use crate::markup::anchors;
use crate::model::{ConversionRecord, DeckName, SummaryRecord};

/// `307 Gholdengo Lunatone 14.52% 1295 - 1054 - 456 51.59%`
static SUMMARY_ROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d+)\s+([A-Z0-9][^%]+?)\s+(\d+[.,]?\d*)%\s+(\d+)\s*-\s*(\d+)\s*-\s*(\d+)\s+(\d+[.,]?\d*)%",
    )
    .unwrap()
});

/// `Gholdengo Lunatone 307 77 25.08%`
static CONVERSION_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z0-9][^%]+?)\s+(\d+)\s+(\d+)\s+(\d+[.,]?\d*)%").unwrap());

/// Navigation and table-header words; never part of a deck name.
const NAV_KEYWORDS: [&str; 3] = ["Decks", "Players", "Conversion"];

/// Parse `14,52%`, `14.52%` or `14.52` into 14.52.
pub fn parse_percentage(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_suffix('%').unwrap_or(s).trim();
    s.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

fn count(c: &Captures<'_>, i: usize, field: &'static str) -> Result<u64, ParseSkip> {
    let raw = &c[i];
    raw.parse::<u64>().map_err(|_| ParseSkip::Count {
        field,
        raw: raw.to_string(),
    })
}

fn percent(c: &Captures<'_>, i: usize, field: &'static str) -> Result<f64, ParseSkip> {
    let raw = &c[i];
    parse_percentage(raw).ok_or_else(|| ParseSkip::Percent {
        field,
        raw: raw.to_string(),
    })
}

fn named(raw: &str) -> Result<DeckName, ParseSkip> {
    let name = DeckName::new(raw);
    if name.as_str().is_empty() {
        return Err(ParseSkip::EmptyName);
    }
    Ok(name)
}

fn deck(c: &Captures<'_>, i: usize) -> Result<DeckName, ParseSkip> {
    named(&c[i])
}

/// Drop everything up to and including the last whole-word nav/header token,
/// e.g. `Deck Day 1 Day 2 Conversion Alpha Box` -> ` Alpha Box`.
fn after_header(name: &str) -> &str {
    let mut cut = 0;
    let mut word_start = None;
    let ends = name.char_indices().chain(std::iter::once((name.len(), ' ')));
    for (i, ch) in ends {
        if ch.is_whitespace() {
            if let Some(s) = word_start.take() {
                if NAV_KEYWORDS.contains(&&name[s..i]) {
                    cut = i;
                }
            }
        } else if word_start.is_none() {
            word_start = Some(i);
        }
    }
    &name[cut..]
}

fn summary_from(c: &Captures<'_>) -> Result<SummaryRecord, ParseSkip> {
    Ok(SummaryRecord {
        players: count(c, 1, "players")?,
        deck: deck(c, 2)?,
        share: percent(c, 3, "share")?,
        wins: count(c, 4, "wins")?,
        losses: count(c, 5, "losses")?,
        ties: count(c, 6, "ties")?,
        win_pct: percent(c, 7, "win_pct")?,
    })
}

fn conversion_from(c: &Captures<'_>) -> Result<ConversionRecord, ParseSkip> {
    Ok(ConversionRecord {
        deck: named(after_header(&c[1]))?,
        day1_players: count(c, 2, "day1")?,
        day2_players: count(c, 3, "day2")?,
        conv_pct: percent(c, 4, "conv_pct")?,
    })
}

fn collect<T>(
    re: &Regex,
    text: &str,
    kind: &str,
    build: impl Fn(&Captures<'_>) -> Result<T, ParseSkip>,
) -> Vec<T> {
    let mut out = Vec::new();
    for caps in re.captures_iter(text) {
        match build(&caps) {
            Ok(rec) => out.push(rec),
            Err(skip) => debug!("extract: skipped {} row '{}': {}", kind, &caps[0], skip),
        }
    }
    out
}

/// Overall or day-2 standings rows, in page order.
pub fn summary_records(text: &str) -> Vec<SummaryRecord> {
    collect(&SUMMARY_ROW, text, "summary", summary_from)
}

/// Day-1 to day-2 conversion rows, in page order.
pub fn conversion_records(text: &str) -> Vec<ConversionRecord> {
    collect(&CONVERSION_ROW, text, "conversion", conversion_from)
}

/// Deck name to deck-page link, taken from anchors whose href contains
/// `path_segment` (e.g. `/0046/decks/`). First link per name wins.
/// Relative hrefs are resolved against `base_url`.
pub fn deck_urls(markup: &str, path_segment: &str, base_url: &str) -> Vec<(DeckName, String)> {
    let mut out: Vec<(DeckName, String)> = Vec::new();
    for a in anchors(markup) {
        if !a.href.contains(path_segment) {
            continue;
        }
        let name = DeckName::new(&a.text);
        if name.as_str().is_empty() {
            continue;
        }
        if NAV_KEYWORDS.iter().any(|k| name.as_str().contains(k)) {
            continue;
        }
        if out.iter().any(|(n, _)| *n == name) {
            continue;
        }
        let url = if a.href.starts_with("http") {
            a.href
        } else {
            format!("{}{}", base_url.trim_end_matches('/'), a.href)
        };
        out.push((name, url));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_separators_are_equivalent() {
        assert_eq!(parse_percentage("14,52%"), Some(14.52));
        assert_eq!(parse_percentage("14.52%"), Some(14.52));
        assert_eq!(parse_percentage("14.52"), Some(14.52));
        assert_eq!(parse_percentage(" 7% "), Some(7.0));
        assert_eq!(parse_percentage("n/a"), None);
    }

    #[test]
    fn single_summary_row() {
        let recs = summary_records("307 Gholdengo Lunatone 14.52% 1295 - 1054 - 456 51.59%");
        assert_eq!(
            recs,
            vec![SummaryRecord {
                deck: DeckName::new("Gholdengo Lunatone"),
                players: 307,
                share: 14.52,
                wins: 1295,
                losses: 1054,
                ties: 456,
                win_pct: 51.59,
            }]
        );
    }

    #[test]
    fn summary_rows_back_to_back_with_comma_decimals() {
        let text = "Deck Players Share Record Win % \
                    307 Gholdengo Lunatone 14,52% 1295-1054-456 51,59% \
                    250 Dragapult Dusknoir 11.8% 1000 - 900 - 300 52.27% \
                    Footer 2025";
        let recs = summary_records(text);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].share, 14.52);
        assert_eq!(recs[0].win_pct, 51.59);
        assert_eq!(recs[1].deck.as_str(), "Dragapult Dusknoir");
        assert_eq!(recs[1].ties, 300);
    }

    #[test]
    fn malformed_summary_rows_are_skipped() {
        let text = "12 Broken Row 3% 10 - x - 2 50% 40 Charizard ex 5.0% 100 - 80 - 20 55.00%";
        let recs = summary_records(text);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].players, 40);
        assert_eq!(recs[0].deck.as_str(), "Charizard ex");
        assert!(summary_records("").is_empty());
        assert!(summary_records("no tables here at all").is_empty());
    }

    #[test]
    fn overflowing_count_discards_the_row() {
        let text = "Alpha 99999999999999999999999 77 25.08% Beta 10 4 40%";
        let recs = conversion_records(text);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].deck.as_str(), "Beta");
        assert_eq!(recs[0].day1_players, 10);
        assert_eq!(recs[0].day2_players, 4);
    }

    #[test]
    fn conversion_rows() {
        let recs = conversion_records("Gholdengo Lunatone 307 77 25.08% Dragapult Dusknoir 250 60 24,00%");
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].deck.as_str(), "Gholdengo Lunatone");
        assert_eq!((recs[0].day1_players, recs[0].day2_players), (307, 77));
        assert_eq!(recs[1].conv_pct, 24.0);
    }

    #[test]
    fn conversion_header_is_not_part_of_the_first_deck() {
        let text = "Deck Day 1 Day 2 Conversion Alpha Box 300 40 13.33% Beta Control 200 20 10.00%";
        let recs = conversion_records(text);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].deck.as_str(), "Alpha Box");
        assert_eq!((recs[0].day1_players, recs[0].day2_players), (300, 40));
        assert_eq!(recs[1].deck.as_str(), "Beta Control");
    }

    #[test]
    fn header_tokens_must_be_whole_words() {
        assert_eq!(after_header("Decks Players Lost Box"), " Lost Box");
        assert_eq!(after_header("Conversionist Box"), "Conversionist Box");
        assert_eq!(after_header("Conversion"), "");
        // a row made only of header words is skipped, not kept as an empty deck
        assert!(conversion_records("Decks Players Conversion 10 4 40%").is_empty());
    }

    #[test]
    fn deck_urls_first_wins_and_nav_is_excluded() {
        let html = r#"
            <a href="/0046/decks">Decks</a>
            <a href="/0046/decks?day=2">Day 2 Players</a>
            <a href="/0046/decks/gholdengo">Gholdengo Lunatone</a>
            <a href="https://labs.limitlesstcg.com/0046/decks/gholdengo-2">Gholdengo Lunatone</a>
            <a href="/0046/decks/dragapult"> Dragapult Dusknoir </a>
            <a href="/0046/players/1">Someone</a>
            <a href="/0046/decks/empty"></a>
        "#;
        let urls = deck_urls(html, "/0046/decks/", "https://labs.limitlesstcg.com/");
        assert_eq!(
            urls,
            vec![
                (
                    DeckName::new("Gholdengo Lunatone"),
                    "https://labs.limitlesstcg.com/0046/decks/gholdengo".to_string()
                ),
                (
                    DeckName::new("Dragapult Dusknoir"),
                    "https://labs.limitlesstcg.com/0046/decks/dragapult".to_string()
                ),
            ]
        );
    }
}
