use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::matchups::MatchMode;

pub const DEFAULT_MIN_PLAYERS: u64 = 20;
pub const DEFAULT_META_POOL_SIZE: usize = 20;
pub const DEFAULT_MATCHUP_WEIGHT: f64 = 0.5;

/// The three knobs of the scoring model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    pub min_players: u64,     // accumulated overall entrants a deck needs
    pub meta_pool_size: usize, // top-K decks that get matchup data
    pub matchup_weight: f64,  // β in final = base + β·matchup
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            meta_pool_size: DEFAULT_META_POOL_SIZE,
            matchup_weight: DEFAULT_MATCHUP_WEIGHT,
        }
    }
}

impl ScoringParams {
    /// Apply raw user overrides. Anything that does not parse, or parses to an
    /// out-of-range value, reverts to the documented default.
    pub fn with_overrides(
        mut self,
        min_players: Option<&str>,
        meta_pool_size: Option<&str>,
        matchup_weight: Option<&str>,
    ) -> Self {
        if let Some(raw) = min_players {
            self.min_players = raw
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(min_players_or_none)
                .unwrap_or_else(|| fallback("min_players", raw, DEFAULT_MIN_PLAYERS));
        }
        if let Some(raw) = meta_pool_size {
            self.meta_pool_size = raw
                .trim()
                .parse::<i64>()
                .ok()
                .and_then(pool_size_or_none)
                .unwrap_or_else(|| fallback("meta_pool_size", raw, DEFAULT_META_POOL_SIZE));
        }
        if let Some(raw) = matchup_weight {
            self.matchup_weight = raw
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(weight_or_none)
                .unwrap_or_else(|| fallback("matchup_weight", raw, DEFAULT_MATCHUP_WEIGHT));
        }
        self
    }
}

fn fallback<T: std::fmt::Display>(field: &str, raw: impl std::fmt::Display, default: T) -> T {
    warn!("config: invalid {} '{}', using default {}", field, raw, default);
    default
}

fn min_players_or_none(v: i64) -> Option<u64> {
    u64::try_from(v).ok()
}

fn pool_size_or_none(v: i64) -> Option<usize> {
    usize::try_from(v).ok().filter(|&n| n > 0)
}

fn weight_or_none(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// File shape. Numbers are read wide so that out-of-range values can fall back
/// one field at a time instead of failing the whole file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    min_players: Option<i64>,
    meta_pool_size: Option<i64>,
    matchup_weight: Option<f64>,
    base_url: Option<String>,
    request_timeout_secs: Option<i64>,
    rayon_threads: Option<usize>,
    top_n: Option<i64>,
    matchup_match: Option<MatchMode>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub scoring: ScoringParams,
    pub base_url: String,            // Limitless Labs root
    pub request_timeout_secs: u64,   // per page fetch
    pub rayon_threads: Option<usize>,
    pub top_n: usize,                // rows / matrix size shown
    pub matchup_match: MatchMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scoring: ScoringParams::default(),
            base_url: "https://labs.limitlesstcg.com".to_string(),
            request_timeout_secs: 20,
            rayon_threads: None,
            top_n: 10,
            matchup_match: MatchMode::default(),
        }
    }
}

impl Config {
    /// `config.toml` in the working directory, defaults if absent or unreadable.
    pub fn load() -> Self {
        Self::load_from(Path::new("config.toml"))
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s).unwrap_or_else(|e| {
                warn!("config: {} unreadable ({}), using defaults", path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let raw: RawConfig = toml::from_str(s)?;
        Ok(Self::from_raw(raw))
    }

    fn from_raw(raw: RawConfig) -> Self {
        let d = Self::default();
        let scoring = ScoringParams {
            min_players: raw
                .min_players
                .map(|v| min_players_or_none(v).unwrap_or_else(|| fallback("min_players", v, d.scoring.min_players)))
                .unwrap_or(d.scoring.min_players),
            meta_pool_size: raw
                .meta_pool_size
                .map(|v| pool_size_or_none(v).unwrap_or_else(|| fallback("meta_pool_size", v, d.scoring.meta_pool_size)))
                .unwrap_or(d.scoring.meta_pool_size),
            matchup_weight: raw
                .matchup_weight
                .map(|v| weight_or_none(v).unwrap_or_else(|| fallback("matchup_weight", v, d.scoring.matchup_weight)))
                .unwrap_or(d.scoring.matchup_weight),
        };
        Self {
            scoring,
            base_url: raw
                .base_url
                .filter(|u| !u.trim().is_empty())
                .unwrap_or(d.base_url),
            request_timeout_secs: raw
                .request_timeout_secs
                .map(|v| {
                    u64::try_from(v)
                        .ok()
                        .filter(|&s| s > 0)
                        .unwrap_or_else(|| fallback("request_timeout_secs", v, d.request_timeout_secs))
                })
                .unwrap_or(d.request_timeout_secs),
            rayon_threads: raw.rayon_threads.filter(|&n| n > 0),
            top_n: raw
                .top_n
                .map(|v| pool_size_or_none(v).unwrap_or_else(|| fallback("top_n", v, d.top_n)))
                .unwrap_or(d.top_n),
            matchup_match: raw.matchup_match.unwrap_or(d.matchup_match),
        }
    }
}
