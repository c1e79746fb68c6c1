use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use log::{info, warn};

use meta_aggregator::cli::{self, Cli};
use meta_aggregator::config::Config;
use meta_aggregator::export;
use meta_aggregator::markup::StripTags;
use meta_aggregator::pipeline::Pipeline;
use meta_aggregator::remote::{HttpSource, LabsSite};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Cli::parse();
    meta_aggregator::verbose::init(args.verbose);

    let cfg = match args.config.as_deref() {
        Some(p) => Config::load_from(p),
        None => Config::load(),
    };

    if let Some(n) = cfg.rayon_threads {
        let _ = rayon::ThreadPoolBuilder::new().num_threads(n).build_global();
    }

    let mut lines: Vec<String> = args.tournaments.clone();
    if let Some(path) = args.file.as_deref() {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("reading tournament list {}", path.display()))?;
        lines.extend(body.lines().map(str::to_string));
    }
    let tids = cli::tournament_ids(lines.iter().map(String::as_str));
    if tids.is_empty() {
        anyhow::bail!("no valid tournament id given");
    }

    let scoring = cfg.scoring.with_overrides(
        args.min_players.as_deref(),
        args.meta_pool_size.as_deref(),
        args.matchup_weight.as_deref(),
    );
    // CLI override > config
    let base_url = args.base_url.clone().unwrap_or_else(|| cfg.base_url.clone());
    let top_n = args.top.filter(|&n| n > 0).unwrap_or(cfg.top_n);

    let source = HttpSource::new(Duration::from_secs(cfg.request_timeout_secs))?;
    let pipeline = Pipeline {
        source: &source,
        markup: &StripTags,
        site: LabsSite::new(&base_url),
        scoring,
        match_mode: cfg.matchup_match,
        parallel: !args.sequential,
    };

    info!(
        "run {}: {} tournaments, min_players={}, meta_pool_size={}, matchup_weight={}",
        Utc::now().to_rfc3339(),
        tids.len(),
        scoring.min_players,
        scoring.meta_pool_size,
        scoring.matchup_weight
    );
    let report = pipeline.run(&tids);

    if report.tournaments == 0 {
        anyhow::bail!("none of the {} tournaments could be fetched", tids.len());
    }
    if !report.skipped.is_empty() {
        warn!("skipped tournaments: {}", report.skipped.join(", "));
    }
    if report.is_empty() {
        println!("No deck passed the filters (is min_players too high?).");
        return Ok(());
    }

    let top = report.top(top_n);
    println!("Top {} decks (final score with matchups)\n", top.len());
    print!("{}", export::ranking_table(top));

    let top_decks: Vec<_> = top.iter().map(|r| r.deck.clone()).collect();
    println!("\nMatchups among the top {} (row vs column, W-L-T (win %))\n", top_decks.len());
    print!("{}", export::matrix_table(&report.matrix, &top_decks));

    if let Some(out) = args.out.as_deref() {
        export::save_ranking(&report.rows, out)?;
        info!("ranking written to {}", out.display());
    }
    if let Some(out) = args.matrix_out.as_deref() {
        export::save_matrix(&report.matrix, &top_decks, out)?;
        info!("matrix written to {}", out.display());
    }
    Ok(())
}
