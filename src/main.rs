use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use league_analytics::analysis::AnalysisEngine;
use league_analytics::cache::ReportCache;
use league_analytics::config::EngineConfig;
use league_analytics::display::{
    display_error, display_info, display_mastery, display_report, display_success,
};
use league_analytics::error::AppError;
use league_analytics::source::{normalize_history, MatchExport};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "league-analytics")]
#[command(about = "Analyze an exported match history: metrics, rating trajectory, patterns and recommendations", long_about = None)]
struct Args {
    /// Path to the exported match history (JSON)
    export: PathBuf,

    /// Deep-dive a single champion by id instead of the full report
    #[arg(short, long)]
    champion: Option<i32>,

    /// Print the report as JSON instead of tables
    #[arg(long)]
    json: bool,

    /// Recompute even when a cached report exists
    #[arg(long)]
    no_cache: bool,

    /// Remove all cached reports and exit
    #[arg(long)]
    clear_cache: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = EngineConfig::from_env()?;
    let cache = ReportCache::open();

    if args.clear_cache {
        let removed = cache.clear()?;
        display_success(&format!("Removed {} cached report(s)", removed));
        return Ok(());
    }

    let export = MatchExport::load(&args.export)?;
    let player_name = export.display_name();
    display_info(&format!(
        "Loaded {} exported matches for {}",
        export.matches.len(),
        player_name
    ));

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message("Normalizing match history...");
    let history = normalize_history(&export.matches, &export.player.puuid);
    pb.finish_and_clear();

    if history.skipped > 0 {
        display_info(&format!(
            "Skipped {} malformed match record(s)",
            history.skipped
        ));
    }
    if history.matches.is_empty() {
        return Err(AppError::NoMatches);
    }
    display_success(&format!("{} matches ready", history.matches.len()));

    let engine = AnalysisEngine::new(config);

    if let Some(champion_id) = args.champion {
        let analysis = engine.champion_mastery(&history.matches, champion_id)?;
        if args.json {
            print_json(&analysis)?;
        } else {
            display_mastery(&analysis);
        }
        return Ok(());
    }

    let key = ReportCache::key(&export.player.puuid, &history.matches);
    if !args.no_cache {
        if let Some(cached) = cache.load(&key)? {
            display_info("Using cached report (same history, same engine)");
            if args.json {
                print_json(&cached.report)?;
            } else {
                display_report(&cached.report, &player_name);
            }
            return Ok(());
        }
    }

    let report = engine.full_report(&history.matches)?;
    if !args.no_cache {
        cache.store(&key, &player_name, &report)?;
    }

    if args.json {
        print_json(&report)?;
    } else {
        display_report(&report, &player_name);
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::JsonError(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}
