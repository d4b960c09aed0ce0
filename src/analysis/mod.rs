pub mod mastery;
pub mod metrics;
pub mod patterns;
pub mod rating;
pub mod recommender;
pub mod trajectory;

use crate::config::EngineConfig;
use crate::error::{AppError, Result};
use crate::model::NormalizedMatch;
use crate::reference::{ChampionCatalog, MetaIndex, RankTable};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use mastery::ChampionMasteryAnalysis;
use metrics::{compute_metrics, period_stats, Period, PerformanceMetrics, PeriodStats};
use patterns::Pattern;
use recommender::{PlayerContext, Recommendation, Recommender};
use trajectory::{
    peak_window, skill_ceiling, volatility_analysis, PeakWindow, RankPrediction, RatingTrajectory,
    SkillCeiling, TrajectoryBuilder, VolatilityAnalysis,
};

/// Week-over-month velocity plus the long-run consistency readouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceTrends {
    pub improvement_velocity: f64,
    pub consistency: f64,
    pub peak: Option<PeakWindow>,
}

/// Everything the engine derives from one match history, bundled for
/// display, JSON output, or caching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullReport {
    /// Newest match timestamp. All trailing windows hang off this, so the
    /// same history always produces the same report.
    pub anchor: DateTime<Utc>,
    pub season: PerformanceMetrics,
    pub week: PeriodStats,
    pub month: PeriodStats,
    pub trajectory: RatingTrajectory,
    pub volatility: VolatilityAnalysis,
    pub prediction: RankPrediction,
    pub ceiling: SkillCeiling,
    pub patterns: Vec<Pattern>,
    pub trends: PerformanceTrends,
    pub recommendations: Vec<Recommendation>,
}

/// Facade over the analysis modules. Owns the tunables and the reference
/// tables; every entry point is a pure function of the match history.
pub struct AnalysisEngine {
    config: EngineConfig,
    ranks: RankTable,
    meta: MetaIndex,
    catalog: ChampionCatalog,
}

impl AnalysisEngine {
    /// Engine over the builtin reference tables.
    pub fn new(config: EngineConfig) -> Self {
        AnalysisEngine::with_tables(
            config,
            RankTable::builtin(),
            MetaIndex::builtin(),
            ChampionCatalog::builtin(),
        )
    }

    /// Engine over caller-supplied tables, e.g. deserialized per-patch data.
    pub fn with_tables(
        config: EngineConfig,
        ranks: RankTable,
        meta: MetaIndex,
        catalog: ChampionCatalog,
    ) -> Self {
        AnalysisEngine {
            config,
            ranks,
            meta,
            catalog,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Runs the whole pipeline over a chronologically ascending history.
    pub fn full_report(&self, matches: &[NormalizedMatch]) -> Result<FullReport> {
        let Some(newest) = matches.last() else {
            return Err(AppError::NoMatches);
        };
        let anchor = newest.played_at;

        let week = trailing_window(matches, anchor, Period::Week);
        let month = trailing_window(matches, anchor, Period::Month);

        // The four sibling analyses only read the history, so they can run
        // in parallel.
        let ((season, (week_stats, month_stats)), (trajectory, detected)) = rayon::join(
            || {
                (
                    compute_metrics(matches, &self.config.score),
                    rayon::join(
                        || period_stats(week, Period::Week, &self.config.score),
                        || period_stats(month, Period::Month, &self.config.score),
                    ),
                )
            },
            || {
                rayon::join(
                    || TrajectoryBuilder::new(&self.config.rating, &self.ranks).build(matches),
                    || patterns::detect_all(matches, &self.config.sample),
                )
            },
        );
        let trajectory = trajectory?;

        let volatility = volatility_analysis(&trajectory);
        let prediction = TrajectoryBuilder::new(&self.config.rating, &self.ranks)
            .predict_rank(&trajectory, week, None);
        let ceiling = skill_ceiling(matches)?;

        let trends = PerformanceTrends {
            improvement_velocity: metrics::improvement_velocity(week, month),
            consistency: metrics::consistency_score(matches),
            peak: peak_window(matches, self.config.sample.peak_window),
        };

        let ctx = PlayerContext {
            week,
            month,
            metrics: &season,
            trajectory: Some(&trajectory),
            patterns: &detected,
            anchor,
        };
        let recommendations =
            Recommender::new(&self.config.recommend, &self.meta, &self.catalog).generate(&ctx);

        Ok(FullReport {
            anchor,
            season,
            week: week_stats,
            month: month_stats,
            trajectory,
            volatility,
            prediction,
            ceiling,
            patterns: detected,
            trends,
            recommendations,
        })
    }

    /// Deep dive on a single champion across the whole history.
    pub fn champion_mastery(
        &self,
        matches: &[NormalizedMatch],
        champion_id: i32,
    ) -> Result<ChampionMasteryAnalysis> {
        mastery::analyze_champion(
            matches,
            champion_id,
            &self.config.score,
            self.config.sample.mastery_min_games,
        )
    }

    pub fn champion_name(&self, champion_id: i32) -> String {
        self.catalog.name(champion_id)
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        AnalysisEngine::new(EngineConfig::default())
    }
}

/// Trailing slice ending at the anchor. Input must be chronologically
/// ascending; a `None` period length means the whole history.
fn trailing_window(
    matches: &[NormalizedMatch],
    anchor: DateTime<Utc>,
    period: Period,
) -> &[NormalizedMatch] {
    let Some(days) = period.days() else {
        return matches;
    };
    let cutoff = anchor - Duration::days(days);
    let start = matches.partition_point(|m| m.played_at < cutoff);
    &matches[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QueueType, Role};
    use chrono::TimeZone;

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
    fn empty_history_is_an_error() {
        let engine = AnalysisEngine::default();
        assert!(matches!(
            engine.full_report(&[]),
            Err(AppError::NoMatches)
        ));
    }

    #[test]
    fn report_anchors_at_the_newest_match() {
        let engine = AnalysisEngine::default();
        let matches: Vec<_> = (0..20).map(|i| stub_match(i, i % 2 == 0)).collect();

        let report = engine.full_report(&matches).unwrap();
        assert_eq!(report.anchor, matches.last().unwrap().played_at);
        assert_eq!(report.season.games, 20);
        // An hour apart, so every game lands inside both trailing windows.
        assert_eq!(report.week.metrics.games, 20);
        assert_eq!(report.month.metrics.games, 20);
        assert_eq!(report.trajectory.points.len(), 20);

        // Re-running the same history reproduces the same report.
        let again = engine.full_report(&matches).unwrap();
        assert_eq!(serde_json::to_value(&report).unwrap(), serde_json::to_value(&again).unwrap());
    }

    #[test]
    fn recommendations_come_ranked_and_filtered() {
        let engine = AnalysisEngine::default();
        let matches: Vec<_> = (0..15)
            .map(|i| {
                let mut m = stub_match(i, i % 3 == 0);
                m.deaths = 7;
                m.cs = 110;
                m
            })
            .collect();

        let report = engine.full_report(&matches).unwrap();
        assert!(!report.recommendations.is_empty());
        let min = engine.config().recommend.min_confidence;
        assert!(report.recommendations.iter().all(|r| r.confidence >= min));
        assert!(report
            .recommendations
            .windows(2)
            .all(|w| w[0].priority <= w[1].priority));
    }

    #[test]
    fn trailing_windows_split_on_the_cutoff() {
        let anchor = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let matches: Vec<_> = (0..10)
            .map(|i| {
                let mut m = stub_match(i, true);
                // One match per day, oldest first.
                m.played_at = anchor - Duration::days(9 - i as i64);
                m
            })
            .collect();

        let week = trailing_window(&matches, anchor, Period::Week);
        assert_eq!(week.len(), 8);
        let all = trailing_window(&matches, anchor, Period::Season);
        assert_eq!(all.len(), 10);
    }

    #[test]
    fn swapped_rank_table_drives_the_report() {
        use crate::reference::{Division, Rank, Tier};

        // Two-row ladder loaded from JSON, as a per-patch swap would be.
        let ranks: RankTable = serde_json::from_value(serde_json::json!({
            "thresholds": [
                { "rank": { "tier": "iron", "division": "IV" }, "min_rating": 0 },
                { "rank": { "tier": "challenger", "division": "I" }, "min_rating": 500 }
            ]
        }))
        .unwrap();
        let engine = AnalysisEngine::with_tables(
            EngineConfig::default(),
            ranks,
            MetaIndex::builtin(),
            ChampionCatalog::builtin(),
        );

        let matches: Vec<_> = (0..10).map(|i| stub_match(i, true)).collect();
        let report = engine.full_report(&matches).unwrap();
        assert_eq!(
            report.trajectory.current_rank,
            Rank::new(Tier::Challenger, Division::I)
        );

        let builtin = AnalysisEngine::new(EngineConfig::default())
            .full_report(&matches)
            .unwrap();
        assert_ne!(report.trajectory.current_rank, builtin.trajectory.current_rank);
    }

    #[test]
    fn mastery_entry_point_checks_the_champion() {
        let engine = AnalysisEngine::default();
        let matches: Vec<_> = (0..8).map(|i| stub_match(i, true)).collect();

        let analysis = engine.champion_mastery(&matches, 103).unwrap();
        assert_eq!(analysis.champion_name, "Ahri");
        assert_eq!(analysis.games, 8);

        assert!(matches!(
            engine.champion_mastery(&matches, 64),
            Err(AppError::ChampionNotFound(_))
        ));
    }
}
