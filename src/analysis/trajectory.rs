use crate::analysis::metrics::{game_score, population_std_dev, round2, win_rate, Trend};
use crate::analysis::rating::RatingEstimator;
use crate::config::RatingConfig;
use crate::error::AppError;
use crate::model::NormalizedMatch;
use crate::reference::{Rank, RankTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Rank-prediction economics: rough rating swing per win/loss at even MMR,
// and the sentinel emitted when current form never reaches the target.
const PREDICT_WIN_GAIN: f64 = 20.0;
const PREDICT_LOSS_COST: f64 = 18.0;
const PREDICT_DEFAULT_GAIN: f64 = 15.0;
const PREDICT_DEFAULT_GAMES_PER_DAY: f64 = 3.0;
const PREDICT_UNREACHABLE: i32 = 999;
const PREDICT_MAX_DAYS: i32 = 365;

// Skill-ceiling projection.
const CEILING_MIN_GAMES: usize = 5;
const CEILING_RECENT_GAMES: usize = 20;
const CEILING_RATE_SCALE: f64 = 10.0;
const CEILING_MONTH_DAYS: f64 = 30.0;
const CEILING_PEAK_SHARE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingPoint {
    pub match_id: String,
    pub played_at: DateTime<Utc>,
    pub rating: i32,
    /// Clamped delta actually applied to the running rating.
    pub delta: i32,
    pub confidence: f64,
    pub rank: Rank,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRange {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingTrajectory {
    pub points: Vec<RatingPoint>,
    pub current_rating: i32,
    pub current_rank: Rank,
    pub range: RatingRange,
    /// Population standard deviation of the point ratings.
    pub volatility: f64,
    pub trend: Trend,
    pub confidence_grade: f64,
}

pub struct TrajectoryBuilder<'a> {
    cfg: &'a RatingConfig,
    ranks: &'a RankTable,
}

impl<'a> TrajectoryBuilder<'a> {
    pub fn new(cfg: &'a RatingConfig, ranks: &'a RankTable) -> Self {
        TrajectoryBuilder { cfg, ranks }
    }

    /// Folds per-match estimates into a rating time series. Input must be
    /// chronologically ascending; an empty history is an error because "no
    /// data" must stay distinguishable from a flat trajectory.
    pub fn build(&self, matches: &[NormalizedMatch]) -> Result<RatingTrajectory, AppError> {
        if matches.is_empty() {
            return Err(AppError::NoMatches);
        }

        let estimator = RatingEstimator::new(self.cfg);
        let clamp = self.cfg.delta_clamp;
        let mut rating = self.cfg.starting_rating;
        let mut points = Vec::with_capacity(matches.len());

        for m in matches {
            let estimate = estimator.estimate(m);
            let delta = estimate.delta.clamp(-clamp, clamp);
            rating += delta;
            points.push(RatingPoint {
                match_id: m.match_id.clone(),
                played_at: m.played_at,
                rating,
                delta,
                confidence: estimate.confidence,
                rank: self.ranks.rating_to_rank(rating),
            });
        }

        let ratings: Vec<f64> = points.iter().map(|p| p.rating as f64).collect();
        let volatility = round2(population_std_dev(&ratings));
        let trend = ols_trend(&ratings, self.cfg.trend_dead_band);
        let confidence_grade = self.confidence_grade(&points);

        let min = points.iter().map(|p| p.rating).min().unwrap_or(rating);
        let max = points.iter().map(|p| p.rating).max().unwrap_or(rating);

        Ok(RatingTrajectory {
            current_rating: rating,
            current_rank: self.ranks.rating_to_rank(rating),
            range: RatingRange { min, max },
            volatility,
            trend,
            confidence_grade,
            points,
        })
    }

    fn confidence_grade(&self, points: &[RatingPoint]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let avg = points.iter().map(|p| p.confidence).sum::<f64>() / points.len() as f64;
        let volume_bonus =
            (points.len() as f64 / self.cfg.volume_bonus_divisor).min(self.cfg.volume_bonus_cap);
        round2((avg + volume_bonus).min(1.0))
    }

    /// Games, win rate and time needed to reach `target` (next rank up when
    /// unspecified), based on the recent week's pace.
    pub fn predict_rank(
        &self,
        trajectory: &RatingTrajectory,
        recent: &[NormalizedMatch],
        target: Option<Rank>,
    ) -> RankPrediction {
        let current_rank = trajectory.current_rank;
        let target_rank = target
            .or_else(|| self.ranks.next_rank(current_rank))
            .unwrap_or(current_rank);

        let target_rating = self
            .ranks
            .rank_to_rating(target_rank)
            .unwrap_or(trajectory.current_rating);
        let rating_needed = target_rating - trajectory.current_rating;

        let mut recent_win_rate = 0.5;
        let mut avg_gain = PREDICT_DEFAULT_GAIN;
        if !recent.is_empty() {
            recent_win_rate = win_rate(recent) / 100.0;
            let wins = recent.iter().filter(|m| m.win).count() as f64;
            let losses = recent.len() as f64 - wins;
            avg_gain = (wins * PREDICT_WIN_GAIN - losses * PREDICT_LOSS_COST)
                / recent.len() as f64;
        }

        let games_needed = if avg_gain > 0.0 {
            (rating_needed as f64 / avg_gain).max(0.0).ceil() as i32
        } else {
            PREDICT_UNREACHABLE
        };

        let win_rate_required = if rating_needed > 0 && games_needed > 0 {
            (rating_needed as f64 / (games_needed as f64 * 30.0) + 0.5).clamp(0.5, 1.0)
        } else {
            recent_win_rate
        };

        let games_per_day = if recent.is_empty() {
            PREDICT_DEFAULT_GAMES_PER_DAY
        } else {
            recent.len() as f64 / 7.0
        };

        let timeline_days = if games_needed < PREDICT_UNREACHABLE && games_per_day > 0.0 {
            ((games_needed as f64 / games_per_day).min(PREDICT_MAX_DAYS as f64)) as i32
        } else {
            PREDICT_MAX_DAYS
        };

        RankPrediction {
            current_rank,
            target_rank,
            rating_needed,
            lp_needed: (rating_needed as f64 * 0.8) as i32,
            games_needed,
            win_rate_required: round2(win_rate_required),
            confidence: trajectory.confidence_grade,
            timeline_days,
        }
    }
}

/// OLS slope of rating against sequence index, read through a dead band.
fn ols_trend(values: &[f64], dead_band: f64) -> Trend {
    if values.len() < 3 {
        return Trend::Stable;
    }

    let n = values.len() as f64;
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_x2 += x * x;
    }

    let denom = n * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return Trend::Stable;
    }
    let slope = (n * sum_xy - sum_x * sum_y) / denom;

    if slope > dead_band {
        Trend::Improving
    } else if slope < -dead_band {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    VeryStable,
    Stable,
    Moderate,
    Volatile,
    VeryVolatile,
}

impl Stability {
    pub fn from_volatility(volatility: f64) -> Self {
        if volatility < 50.0 {
            Stability::VeryStable
        } else if volatility < 100.0 {
            Stability::Stable
        } else if volatility < 150.0 {
            Stability::Moderate
        } else if volatility < 200.0 {
            Stability::Volatile
        } else {
            Stability::VeryVolatile
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Stability::VeryStable => "Very stable",
            Stability::Stable => "Stable",
            Stability::Moderate => "Moderate",
            Stability::Volatile => "Volatile",
            Stability::VeryVolatile => "Very volatile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::VeryHigh => "Very high",
        }
    }
}

/// Runs of same-sign rating deltas. `current_run` is signed: positive while
/// gaining, negative while losing, zero after a flat game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub max_gain_run: i32,
    pub max_loss_run: i32,
    pub current_run: i32,
    pub avg_run_length: f64,
}

pub fn delta_streaks(points: &[RatingPoint]) -> StreakSummary {
    if points.is_empty() {
        return StreakSummary {
            max_gain_run: 0,
            max_loss_run: 0,
            current_run: 0,
            avg_run_length: 0.0,
        };
    }

    let mut runs = Vec::with_capacity(points.len());
    let mut length = 0i32;
    let mut direction = 0i32;

    for p in points {
        if p.delta > 0 {
            length = if direction >= 0 { length + 1 } else { 1 };
            direction = 1;
        } else if p.delta < 0 {
            length = if direction <= 0 { length + 1 } else { 1 };
            direction = -1;
        } else {
            length = 0;
            direction = 0;
        }
        runs.push(length * direction);
    }

    let max_gain_run = runs.iter().copied().max().unwrap_or(0).max(0);
    let max_loss_run = runs.iter().copied().min().unwrap_or(0).min(0).abs();
    let total: i32 = runs.iter().map(|r| r.abs()).sum();

    StreakSummary {
        max_gain_run,
        max_loss_run,
        current_run: *runs.last().unwrap_or(&0),
        avg_run_length: round2(total as f64 / runs.len() as f64),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityAnalysis {
    pub volatility: f64,
    /// 0–100, from rating spread (not the game-score consistency).
    pub consistency: f64,
    pub stability: Stability,
    pub streaks: StreakSummary,
    pub risk: RiskLevel,
    pub advice: Vec<String>,
}

pub fn volatility_analysis(trajectory: &RatingTrajectory) -> VolatilityAnalysis {
    let volatility = trajectory.volatility;
    let consistency = rating_consistency(trajectory);
    let streaks = delta_streaks(&trajectory.points);

    let risk_score = volatility / 10.0 + (100.0 - consistency) / 10.0;
    let risk = if risk_score < 10.0 {
        RiskLevel::Low
    } else if risk_score < 20.0 {
        RiskLevel::Moderate
    } else if risk_score < 30.0 {
        RiskLevel::High
    } else {
        RiskLevel::VeryHigh
    };

    let mut advice = Vec::new();
    if volatility > 150.0 {
        advice.push("Focus on consistency over highlight plays".to_string());
        advice.push("Work on your macro game to reduce variance".to_string());
    }
    if streaks.max_loss_run > 3 {
        advice.push("Take a break after two straight losses".to_string());
    }
    if volatility < 50.0 {
        advice.push("Very stable! Increase your game volume".to_string());
    }

    VolatilityAnalysis {
        volatility,
        consistency,
        stability: Stability::from_volatility(volatility),
        streaks,
        risk,
        advice,
    }
}

fn rating_consistency(trajectory: &RatingTrajectory) -> f64 {
    if trajectory.points.len() < 3 {
        return 50.0;
    }
    round2((100.0 - trajectory.volatility / 10.0).clamp(0.0, 100.0))
}

/// Best fixed-size window over the match sequence by internal win rate.
/// Game indexes are 1-based for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakWindow {
    pub start_game: usize,
    pub end_game: usize,
    pub games: usize,
    pub win_rate: f64,
}

pub fn peak_window(matches: &[NormalizedMatch], window: usize) -> Option<PeakWindow> {
    if matches.is_empty() || window == 0 {
        return None;
    }
    let window = window.min(matches.len());

    let mut best_start = 0;
    let mut best_rate = -1.0;
    for start in 0..=(matches.len() - window) {
        let rate = win_rate(&matches[start..start + window]);
        if rate > best_rate {
            best_rate = rate;
            best_start = start;
        }
    }

    Some(PeakWindow {
        start_game: best_start + 1,
        end_game: best_start + window,
        games: window,
        win_rate: round2(best_rate),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakGame {
    pub match_id: String,
    pub score: f64,
    pub kda: f64,
    pub cs_per_min: f64,
    pub win: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillCeiling {
    /// Mean game score over the most recent matches.
    pub current_level: f64,
    pub estimated_ceiling: f64,
    /// Mean game score of the latest quarter minus the earliest quarter.
    pub improvement_rate: f64,
    pub time_to_ceiling_days: i32,
    pub confidence: f64,
    /// Top decile of games by score, best first.
    pub peak_games: Vec<PeakGame>,
}

/// Projects how far current form can climb. Input must be chronologically
/// ascending.
pub fn skill_ceiling(matches: &[NormalizedMatch]) -> Result<SkillCeiling, AppError> {
    if matches.is_empty() {
        return Err(AppError::NoMatches);
    }

    let peak_games = peak_games(matches);
    let improvement_rate = progression_rate(matches);

    let recent_count = matches.len().min(CEILING_RECENT_GAMES);
    let recent = &matches[matches.len() - recent_count..];
    let current_level =
        round2(recent.iter().map(game_score).sum::<f64>() / recent.len() as f64);

    let best = peak_games
        .first()
        .map(|p| p.score)
        .unwrap_or(current_level + 10.0);
    let estimated_ceiling = round2((best + improvement_rate * CEILING_RATE_SCALE).min(100.0));

    let time_to_ceiling_days = if improvement_rate <= 0.0 {
        PREDICT_MAX_DAYS
    } else {
        let gap = (estimated_ceiling - current_level).max(0.0);
        ((gap / improvement_rate.max(0.1) * CEILING_MONTH_DAYS).min(PREDICT_MAX_DAYS as f64))
            as i32
    };

    let confidence = if matches.len() < 10 {
        0.3
    } else if matches.len() < 50 {
        0.6
    } else {
        0.9
    };

    Ok(SkillCeiling {
        current_level,
        estimated_ceiling,
        improvement_rate: round2(improvement_rate),
        time_to_ceiling_days,
        confidence,
        peak_games,
    })
}

fn peak_games(matches: &[NormalizedMatch]) -> Vec<PeakGame> {
    let mut scored: Vec<PeakGame> = matches
        .iter()
        .map(|m| PeakGame {
            match_id: m.match_id.clone(),
            score: game_score(m),
            kda: round2(m.kda()),
            cs_per_min: round2(m.cs_per_min()),
            win: m.win,
        })
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.match_id.cmp(&b.match_id))
    });

    let keep = ((matches.len() as f64 * CEILING_PEAK_SHARE) as usize).max(1);
    scored.truncate(keep);
    scored
}

/// Latest-quarter mean game score minus earliest-quarter mean. Zero until
/// the sample supports quartering.
fn progression_rate(matches: &[NormalizedMatch]) -> f64 {
    if matches.len() < CEILING_MIN_GAMES {
        return 0.0;
    }
    let chunk = matches.len() / 4;
    if chunk < 2 {
        return 0.0;
    }

    let first = &matches[..chunk];
    let last = &matches[matches.len() - chunk..];
    let mean = |set: &[NormalizedMatch]| -> f64 {
        set.iter().map(game_score).sum::<f64>() / set.len() as f64
    };
    mean(last) - mean(first)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankPrediction {
    pub current_rank: Rank,
    pub target_rank: Rank,
    pub rating_needed: i32,
    pub lp_needed: i32,
    /// 999 when current form never reaches the target.
    pub games_needed: i32,
    pub win_rate_required: f64,
    pub confidence: f64,
    pub timeline_days: i32,
}
