use chrono::{TimeZone, Utc};
use league_analytics::analysis::patterns::{self, PatternKind};
use league_analytics::analysis::AnalysisEngine;
use league_analytics::model::{NormalizedMatch, QueueType, Role};
use league_analytics::reference::RankTable;

fn stub_match(idx: usize, win: bool) -> NormalizedMatch {
    NormalizedMatch {
        match_id: format!("M{:03}", idx),
        played_at: Utc
            .timestamp_opt(1_700_000_000 + idx as i64 * 3600, 0)
            .unwrap(),
        duration_secs: 1800,
        queue: QueueType::RankedSolo,
        role: Role::Mid,
        champion_id: 103,
        champion_name: "Ahri".to_string(),
        win,
        kills: 5,
        deaths: 3,
        assists: 7,
        cs: 200,
        gold: 11_000,
        damage_to_champions: 20_000,
        vision_score: 40,
        enemy_champions: vec![238, 202, 64, 111, 22],
    }
}

#[test]
fn streaks_surface_in_the_report() {
    // Five wins, three losses, one win: both runs qualify, neither is
    // still running.
    let results = [
        true, true, true, true, true, false, false, false, true,
    ];
    let matches: Vec<_> = results
        .iter()
        .enumerate()
        .map(|(i, win)| stub_match(i, *win))
        .collect();

    let detected = patterns::detect_streaks(&matches, 3);
    let win_streak = detected
        .iter()
        .find(|p| p.kind == PatternKind::WinStreak)
        .expect("win streak detected");
    let loss_streak = detected
        .iter()
        .find(|p| p.kind == PatternKind::LossStreak)
        .expect("loss streak detected");

    assert_eq!(win_streak.frequency, 5);
    assert!(!win_streak.is_ongoing());
    assert_eq!(loss_streak.frequency, 3);
    assert!(!loss_streak.is_ongoing());

    let report = AnalysisEngine::default().full_report(&matches).unwrap();
    assert!(report
        .patterns
        .iter()
        .any(|p| p.kind == PatternKind::WinStreak && p.frequency == 5));
}

#[test]
fn a_flawless_run_scores_near_the_ceiling() {
    let matches: Vec<_> = (0..10)
        .map(|i| {
            let mut m = stub_match(i, true);
            m.kills = 5;
            m.deaths = 0;
            m.assists = 5;
            m.cs = 300;
            m.damage_to_champions = 30_000;
            m.vision_score = 75;
            m
        })
        .collect();

    let report = AnalysisEngine::default().full_report(&matches).unwrap();
    assert_eq!(report.season.win_rate, 100.0);
    assert!(report.season.performance_score >= 90.0);
    // Identical games game to game, so the half-split trend is flat.
    assert_eq!(
        report.season.trend,
        league_analytics::analysis::metrics::Trend::Stable
    );
    // Every win pushes the rating up, so the trajectory slope is positive.
    assert_eq!(
        report.trajectory.trend,
        league_analytics::analysis::metrics::Trend::Improving
    );
}

#[test]
fn per_match_deltas_respect_the_clamp() {
    // Absurd stat lines in both directions must not move the trajectory by
    // more than the configured per-match cap.
    let matches: Vec<_> = (0..20)
        .map(|i| {
            let mut m = stub_match(i, i % 2 == 0);
            if m.win {
                m.kills = 30;
                m.deaths = 0;
                m.assists = 25;
                m.cs = 450;
                m.damage_to_champions = 80_000;
                m.vision_score = 120;
            } else {
                m.kills = 0;
                m.deaths = 18;
                m.assists = 0;
                m.cs = 20;
                m.damage_to_champions = 1_000;
                m.vision_score = 2;
            }
            m
        })
        .collect();

    let engine = AnalysisEngine::default();
    let report = engine.full_report(&matches).unwrap();
    let clamp = engine.config().rating.delta_clamp;
    assert!(report
        .trajectory
        .points
        .iter()
        .all(|p| p.delta.abs() <= clamp));
}

#[test]
fn prediction_targets_the_next_rank_up() {
    let matches: Vec<_> = (0..30).map(|i| stub_match(i, i % 2 == 0)).collect();

    let report = AnalysisEngine::default().full_report(&matches).unwrap();
    let expected = RankTable::builtin()
        .next_rank(report.trajectory.current_rank)
        .unwrap();
    assert_eq!(report.prediction.target_rank, expected);
    assert!(report.prediction.games_needed >= 0);
}

#[test]
fn recommendations_are_ranked_and_expire_from_the_anchor() {
    let matches: Vec<_> = (0..25)
        .map(|i| {
            let mut m = stub_match(i, i % 3 == 0);
            m.deaths = 7;
            m.cs = 110;
            m.vision_score = 10;
            m
        })
        .collect();

    let engine = AnalysisEngine::default();
    let report = engine.full_report(&matches).unwrap();

    assert!(!report.recommendations.is_empty());
    assert!(report
        .recommendations
        .windows(2)
        .all(|w| w[0].priority <= w[1].priority));
    let min = engine.config().recommend.min_confidence;
    assert!(report.recommendations.iter().all(|r| r.confidence >= min));
    // Expiry hangs off the newest match, never the wall clock.
    assert!(report
        .recommendations
        .iter()
        .all(|r| r.expires_at.is_some_and(|at| at > report.anchor)));
}
