use crate::error::AppError;
use std::env;

/// Composite-score weights and the piecewise-linear normalization ceilings.
/// Product constants, not statistics; tune per patch if the meta shifts.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub win_rate_weight: f64,
    pub kda_weight: f64,
    pub cs_weight: f64,
    pub damage_weight: f64,
    pub vision_weight: f64,
    /// KDA at or above this maps to a 100 sub-score.
    pub kda_ceiling: f64,
    pub cs_per_min_ceiling: f64,
    pub damage_per_min_ceiling: f64,
    pub vision_per_min_ceiling: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        ScoreWeights {
            win_rate_weight: 0.40,
            kda_weight: 0.25,
            cs_weight: 0.15,
            damage_weight: 0.10,
            vision_weight: 0.10,
            kda_ceiling: 4.0,
            cs_per_min_ceiling: 10.0,
            damage_per_min_ceiling: 1000.0,
            vision_per_min_ceiling: 2.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RatingConfig {
    pub base_solo: i32,
    pub base_flex: i32,
    pub base_other: i32,
    /// Win/loss contribution to the per-match delta.
    pub win_delta: i32,
    /// Overall cap on the performance modifier.
    pub modifier_clamp: f64,
    /// Per-match delta cap applied when folding into a trajectory.
    pub delta_clamp: i32,
    pub starting_rating: i32,
    /// |OLS slope| at or below this reads as a stable trend.
    pub trend_dead_band: f64,
    pub volume_bonus_divisor: f64,
    pub volume_bonus_cap: f64,
}

impl Default for RatingConfig {
    fn default() -> Self {
        RatingConfig {
            base_solo: 1200,
            base_flex: 1100,
            base_other: 1000,
            win_delta: 25,
            modifier_clamp: 30.0,
            delta_clamp: 50,
            starting_rating: 1200,
            trend_dead_band: 2.0,
            volume_bonus_divisor: 20.0,
            volume_bonus_cap: 0.3,
        }
    }
}

/// Minimum sample sizes and window lengths shared by the detectors and the
/// derived trajectory analyses.
#[derive(Debug, Clone)]
pub struct SampleThresholds {
    pub min_streak_len: usize,
    pub preference_window_days: i64,
    pub min_champion_games: usize,
    pub champion_main_games: usize,
    pub champion_frequent_games: usize,
    pub min_role_games: usize,
    pub min_playtime_games: usize,
    pub peak_window: usize,
    pub mastery_min_games: usize,
}

impl Default for SampleThresholds {
    fn default() -> Self {
        SampleThresholds {
            min_streak_len: 3,
            preference_window_days: 30,
            min_champion_games: 3,
            champion_main_games: 5,
            champion_frequent_games: 10,
            min_role_games: 3,
            min_playtime_games: 10,
            peak_window: 10,
            mastery_min_games: 5,
        }
    }
}

/// "100th percentile" training benchmarks.
#[derive(Debug, Clone)]
pub struct Benchmarks {
    pub cs_per_min: f64,
    pub vision_per_min: f64,
    pub kda: f64,
    pub damage_per_min: f64,
}

impl Default for Benchmarks {
    fn default() -> Self {
        Benchmarks {
            cs_per_min: 8.0,
            vision_per_min: 2.5,
            kda: 3.0,
            damage_per_min: 800.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecommendConfig {
    pub min_confidence: f64,
    pub max_recommendations: usize,
    pub min_role_games: usize,
    pub min_champion_games: usize,
    pub low_win_rate: f64,
    pub low_kda: f64,
    pub low_cs_per_min: f64,
    pub min_tip_games: usize,
    /// Deaths above this in a game count toward the early-game check.
    pub high_death_count: u32,
    pub high_death_share: f64,
    pub teamfight_kda: f64,
    pub teamfight_share: f64,
    pub low_vision_per_min: f64,
    pub ban_min_faced: usize,
    pub ban_problem_win_rate: f64,
    pub meta_threat_floor: f64,
    pub off_meta_ceiling: f64,
    pub off_meta_min_games: usize,
    pub weak_area_floor: f64,
    pub benchmarks: Benchmarks,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        RecommendConfig {
            min_confidence: 0.4,
            max_recommendations: 15,
            min_role_games: 3,
            min_champion_games: 5,
            low_win_rate: 45.0,
            low_kda: 1.5,
            low_cs_per_min: 6.0,
            min_tip_games: 5,
            high_death_count: 3,
            high_death_share: 0.3,
            teamfight_kda: 1.5,
            teamfight_share: 0.4,
            low_vision_per_min: 1.5,
            ban_min_faced: 3,
            ban_problem_win_rate: 0.35,
            meta_threat_floor: 0.92,
            off_meta_ceiling: 0.7,
            off_meta_min_games: 5,
            weak_area_floor: 40.0,
            benchmarks: Benchmarks::default(),
        }
    }
}

/// Every tunable the engine reads, consolidated so thresholds never hide
/// inside algorithm code.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    pub score: ScoreWeights,
    pub rating: RatingConfig,
    pub sample: SampleThresholds,
    pub recommend: RecommendConfig,
}

impl EngineConfig {
    /// Defaults with `.env` overrides for the CLI-facing knobs.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let mut config = EngineConfig::default();

        if let Ok(raw) = env::var("MAX_RECOMMENDATIONS") {
            config.recommend.max_recommendations = raw.parse().map_err(|_| {
                AppError::ConfigError(format!("MAX_RECOMMENDATIONS is not a number: {}", raw))
            })?;
        }

        if let Ok(raw) = env::var("MIN_CONFIDENCE") {
            config.recommend.min_confidence = raw.parse().map_err(|_| {
                AppError::ConfigError(format!("MIN_CONFIDENCE is not a number: {}", raw))
            })?;
        }

        Ok(config)
    }
}
