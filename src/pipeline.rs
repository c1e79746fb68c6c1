//! Staged meta analysis run.
//!
//! tournaments → [`MetaAggregate`] → base rows → [`MetaPool`] → [`MatchupMatrix`]
//! → ranking. The matchup stage takes the pool by reference, so it cannot run
//! before the pool has been chosen from the full aggregate.

use std::time::Instant;

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::aggregator::{MetaAggregate, TournamentData};
use crate::config::ScoringParams;
use crate::error::FetchError;
use crate::extract::{conversion_records, deck_urls, summary_records};
use crate::markup::MarkupText;
use crate::matchups::MatchMode;
use crate::matrix::{collect_matchups, MatchupMatrix};
use crate::meta::{sort_by_prevalence, MetaPool};
use crate::remote::{LabsSite, PageSource};
use crate::score::{base_rows, rank, ScoredDeckRow};

/// Collaborators and knobs for one run.
pub struct Pipeline<'a> {
    pub source: &'a dyn PageSource,
    pub markup: &'a dyn MarkupText,
    pub site: LabsSite,
    pub scoring: ScoringParams,
    pub match_mode: MatchMode,
    /// Fetch primary tournament pages on the rayon pool.
    pub parallel: bool,
}

/// Result of a run. An empty `rows` means no deck passed the filters, which
/// is a valid outcome, not a failure.
#[derive(Debug, Clone)]
pub struct MetaReport {
    pub rows: Vec<ScoredDeckRow>,
    pub matrix: MatchupMatrix,
    pub pool: MetaPool,
    /// Tournaments whose primary pages could not be fetched.
    pub skipped: Vec<String>,
    pub tournaments: usize,
}

impl MetaReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn top(&self, n: usize) -> &[ScoredDeckRow] {
        &self.rows[..n.min(self.rows.len())]
    }
}

impl Pipeline<'_> {
    /// Fetch and extract the overall, day-2 and conversion pages of one
    /// tournament. Any page failing fails the whole tournament.
    pub fn fetch_tournament(&self, tid: &str) -> Result<TournamentData, FetchError> {
        let main_html = self.source.fetch(&self.site.overall_url(tid))?;
        let overall = summary_records(&self.markup.text(&main_html));
        let urls = deck_urls(&main_html, &self.site.deck_path_segment(tid), self.site.base_url());

        let day2_html = self.source.fetch(&self.site.day2_url(tid))?;
        let day2 = summary_records(&self.markup.text(&day2_html));

        let conv_html = self.source.fetch(&self.site.conversion_url(tid))?;
        let conversion = conversion_records(&self.markup.text(&conv_html));

        info!(
            "[{}] overall={} decks, day2={} decks, conv={} decks, links={}",
            tid,
            overall.len(),
            day2.len(),
            conversion.len(),
            urls.len()
        );
        Ok(TournamentData {
            id: tid.to_string(),
            overall,
            day2,
            conversion,
            deck_urls: urls,
        })
    }

    /// Stage 1: fold every tournament that could be fetched, in input order.
    pub fn aggregate(&self, tids: &[String]) -> (MetaAggregate, Vec<String>) {
        let t0 = Instant::now();
        let fetched: Vec<Result<TournamentData, FetchError>> = if self.parallel && tids.len() > 1 {
            tids.par_iter().map(|t| self.fetch_tournament(t)).collect()
        } else {
            tids.iter().map(|t| self.fetch_tournament(t)).collect()
        };

        let mut agg = MetaAggregate::new();
        let mut skipped = Vec::new();
        for (tid, res) in tids.iter().zip(fetched) {
            match res {
                Ok(data) => agg.fold(&data),
                Err(e) => {
                    warn!("[{}] skipped: {}", tid, e);
                    skipped.push(tid.clone());
                }
            }
        }
        debug!(
            "pipeline: aggregated {} tournaments ({} decks) in {:.3}s",
            agg.tournaments,
            agg.decks.len(),
            t0.elapsed().as_secs_f64()
        );
        (agg, skipped)
    }

    /// Stages 2-5 on an existing aggregate.
    pub fn score(&self, agg: &MetaAggregate) -> (Vec<ScoredDeckRow>, MatchupMatrix, MetaPool) {
        let mut rows = base_rows(agg, self.scoring.min_players);
        sort_by_prevalence(&mut rows);
        let pool = MetaPool::select(&rows, self.scoring.meta_pool_size);
        debug!("pipeline: {} qualifying decks, meta pool of {}", rows.len(), pool.len());

        let matrix = collect_matchups(&pool, agg, self.match_mode, |deck_url| {
            let html = self.source.fetch(&LabsSite::matchups_url(deck_url))?;
            Ok(self.markup.text(&html))
        });

        let ranked = rank(rows, &matrix, &pool, self.scoring.matchup_weight);
        (ranked, matrix, pool)
    }

    pub fn run(&self, tids: &[String]) -> MetaReport {
        let (agg, skipped) = self.aggregate(tids);
        let (rows, matrix, pool) = self.score(&agg);
        MetaReport {
            rows,
            matrix,
            pool,
            skipped,
            tournaments: agg.tournaments,
        }
    }
}
