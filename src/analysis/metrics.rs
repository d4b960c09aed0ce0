use crate::config::ScoreWeights;
use crate::model::{NormalizedMatch, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// Single-game score parts. These sum to 100 for a won, high-KDA, well-farmed
// game and feed the mastery and ceiling analyses.
const GAME_WIN_BONUS: f64 = 30.0;
const GAME_KDA_FACTOR: f64 = 15.0;
const GAME_KDA_CAP: f64 = 40.0;
const GAME_CS_FACTOR: f64 = 2.0;
const GAME_CS_CAP: f64 = 30.0;

// Half-split trend detection.
const TREND_MIN_GAMES: usize = 6;
const TREND_BAND: f64 = 10.0;

// Consistency defaults to the midpoint until the sample is meaningful.
const CONSISTENCY_MIN_GAMES: usize = 5;
const CONSISTENCY_DEFAULT: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Improving => "Improving",
            Trend::Stable => "Stable",
            Trend::Declining => "Declining",
        }
    }
}

/// Aggregate over a set of matches. Rate metrics divide by total duration,
/// not game count, so overtime-heavy games weigh in proportionally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetrics {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_assists: f64,
    /// Aggregate form: (avg kills + avg assists) / max(avg deaths, 1).
    pub avg_kda: f64,
    pub cs_per_min: f64,
    pub gold_per_min: f64,
    pub damage_per_min: f64,
    pub vision_per_min: f64,
    pub performance_score: f64,
    pub trend: Trend,
}

impl PerformanceMetrics {
    fn zero() -> Self {
        PerformanceMetrics {
            games: 0,
            wins: 0,
            losses: 0,
            win_rate: 0.0,
            avg_kills: 0.0,
            avg_deaths: 0.0,
            avg_assists: 0.0,
            avg_kda: 0.0,
            cs_per_min: 0.0,
            gold_per_min: 0.0,
            damage_per_min: 0.0,
            vision_per_min: 0.0,
            performance_score: 0.0,
            trend: Trend::Stable,
        }
    }
}

/// Total over any input: the empty set maps to the zero aggregate.
pub fn compute_metrics(matches: &[NormalizedMatch], weights: &ScoreWeights) -> PerformanceMetrics {
    if matches.is_empty() {
        return PerformanceMetrics::zero();
    }

    let games = matches.len();
    let wins = matches.iter().filter(|m| m.win).count();
    let n = games as f64;

    let total_kills: u32 = matches.iter().map(|m| m.kills).sum();
    let total_deaths: u32 = matches.iter().map(|m| m.deaths).sum();
    let total_assists: u32 = matches.iter().map(|m| m.assists).sum();
    let total_cs: u32 = matches.iter().map(|m| m.cs).sum();
    let total_gold: u32 = matches.iter().map(|m| m.gold).sum();
    let total_damage: u32 = matches.iter().map(|m| m.damage_to_champions).sum();
    let total_vision: u32 = matches.iter().map(|m| m.vision_score).sum();
    let total_minutes: f64 = matches.iter().map(|m| m.minutes()).sum();

    let win_rate = wins as f64 / n * 100.0;
    let avg_kills = total_kills as f64 / n;
    let avg_deaths = total_deaths as f64 / n;
    let avg_assists = total_assists as f64 / n;
    let avg_kda = (avg_kills + avg_assists) / avg_deaths.max(1.0);

    let per_min = |total: u32| -> f64 {
        if total_minutes > 0.0 {
            total as f64 / total_minutes
        } else {
            0.0
        }
    };
    let cs_per_min = per_min(total_cs);
    let gold_per_min = per_min(total_gold);
    let damage_per_min = per_min(total_damage);
    let vision_per_min = per_min(total_vision);

    let performance_score =
        composite_score(win_rate, avg_kda, cs_per_min, damage_per_min, vision_per_min, weights);

    PerformanceMetrics {
        games,
        wins,
        losses: games - wins,
        win_rate: round2(win_rate),
        avg_kills: round2(avg_kills),
        avg_deaths: round2(avg_deaths),
        avg_assists: round2(avg_assists),
        avg_kda: round2(avg_kda),
        cs_per_min: round2(cs_per_min),
        gold_per_min: round2(gold_per_min),
        damage_per_min: round2(damage_per_min),
        vision_per_min: round2(vision_per_min),
        performance_score,
        trend: trend_from_history(matches),
    }
}

/// Weighted sum of five sub-scores, each normalized to [0,100] against its
/// piecewise-linear ceiling.
pub fn composite_score(
    win_rate: f64,
    avg_kda: f64,
    cs_per_min: f64,
    damage_per_min: f64,
    vision_per_min: f64,
    weights: &ScoreWeights,
) -> f64 {
    let norm = |value: f64, ceiling: f64| -> f64 {
        if ceiling <= 0.0 {
            return 0.0;
        }
        (value / ceiling * 100.0).clamp(0.0, 100.0)
    };

    let win_rate_norm = win_rate.clamp(0.0, 100.0);
    let kda_norm = norm(avg_kda, weights.kda_ceiling);
    let cs_norm = norm(cs_per_min, weights.cs_per_min_ceiling);
    let damage_norm = norm(damage_per_min, weights.damage_per_min_ceiling);
    let vision_norm = norm(vision_per_min, weights.vision_per_min_ceiling);

    let score = weights.win_rate_weight * win_rate_norm
        + weights.kda_weight * kda_norm
        + weights.cs_weight * cs_norm
        + weights.damage_weight * damage_norm
        + weights.vision_weight * vision_norm;

    round2(score.clamp(0.0, 100.0))
}

/// 0–100 score for a single game, built from the per-match KDA form.
pub fn game_score(m: &NormalizedMatch) -> f64 {
    let mut score = 0.0;
    if m.win {
        score += GAME_WIN_BONUS;
    }
    score += (m.kda() * GAME_KDA_FACTOR).min(GAME_KDA_CAP);
    score += (m.cs_per_min() * GAME_CS_FACTOR).min(GAME_CS_CAP);
    round2(score)
}

pub fn win_rate(matches: &[NormalizedMatch]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }
    let wins = matches.iter().filter(|m| m.win).count();
    wins as f64 / matches.len() as f64 * 100.0
}

/// Win rate of the newer half against the older half. Input must be
/// chronologically ascending.
pub fn trend_from_history(matches: &[NormalizedMatch]) -> Trend {
    if matches.len() < TREND_MIN_GAMES {
        return Trend::Stable;
    }
    let half = matches.len() / 2;
    let older = win_rate(&matches[..half]);
    let newer = win_rate(&matches[half..]);
    let diff = newer - older;
    if diff > TREND_BAND {
        Trend::Improving
    } else if diff < -TREND_BAND {
        Trend::Declining
    } else {
        Trend::Stable
    }
}

/// 0–100; high when game scores cluster tightly.
pub fn consistency_score(matches: &[NormalizedMatch]) -> f64 {
    if matches.len() < CONSISTENCY_MIN_GAMES {
        return CONSISTENCY_DEFAULT;
    }
    let scores: Vec<f64> = matches.iter().map(game_score).collect();
    let stdev = population_std_dev(&scores);
    round2((100.0 - stdev / 2.0).clamp(0.0, 100.0))
}

/// Recent-window win rate minus baseline-window win rate, in points.
pub fn improvement_velocity(recent: &[NormalizedMatch], baseline: &[NormalizedMatch]) -> f64 {
    if recent.is_empty() || baseline.is_empty() {
        return 0.0;
    }
    round2(win_rate(recent) - win_rate(baseline))
}

pub(crate) fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionPerformance {
    pub champion_id: i32,
    pub champion_name: String,
    pub games: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub avg_kda: f64,
    pub performance_score: f64,
}

/// Most-played champions, ties broken by win rate then id so the order is
/// reproducible.
pub fn top_champions(
    matches: &[NormalizedMatch],
    weights: &ScoreWeights,
    limit: usize,
) -> Vec<ChampionPerformance> {
    let mut grouped: HashMap<i32, Vec<NormalizedMatch>> = HashMap::new();
    for m in matches {
        grouped.entry(m.champion_id).or_default().push(m.clone());
    }

    let mut out: Vec<ChampionPerformance> = grouped
        .into_iter()
        .map(|(champion_id, group)| {
            let metrics = compute_metrics(&group, weights);
            ChampionPerformance {
                champion_id,
                champion_name: group[0].champion_name.clone(),
                games: metrics.games,
                wins: metrics.wins,
                win_rate: metrics.win_rate,
                avg_kda: metrics.avg_kda,
                performance_score: metrics.performance_score,
            }
        })
        .collect();

    out.sort_by(|a, b| {
        b.games
            .cmp(&a.games)
            .then_with(|| {
                b.win_rate
                    .partial_cmp(&a.win_rate)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.champion_id.cmp(&b.champion_id))
    });
    out.truncate(limit);
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleStats {
    pub role: Role,
    pub metrics: PerformanceMetrics,
}

/// Per-role aggregates, most-played first.
pub fn role_breakdown(matches: &[NormalizedMatch], weights: &ScoreWeights) -> Vec<RoleStats> {
    let mut grouped: HashMap<Role, Vec<NormalizedMatch>> = HashMap::new();
    for m in matches {
        grouped.entry(m.role).or_default().push(m.clone());
    }

    let mut out: Vec<RoleStats> = grouped
        .into_iter()
        .map(|(role, group)| RoleStats {
            role,
            metrics: compute_metrics(&group, weights),
        })
        .collect();

    out.sort_by(|a, b| {
        b.metrics
            .games
            .cmp(&a.metrics.games)
            .then_with(|| a.role.label().cmp(b.role.label()))
    });
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Today,
    Week,
    Month,
    Season,
}

impl Period {
    /// Trailing window length; `None` means the whole history.
    pub fn days(&self) -> Option<i64> {
        match self {
            Period::Today => Some(1),
            Period::Week => Some(7),
            Period::Month => Some(30),
            Period::Season => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::Today => "today",
            Period::Week => "week",
            Period::Month => "month",
            Period::Season => "season",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub period: Period,
    pub metrics: PerformanceMetrics,
    pub roles: Vec<RoleStats>,
    pub top_champions: Vec<ChampionPerformance>,
    pub suggestions: Vec<String>,
}

pub fn period_stats(
    matches: &[NormalizedMatch],
    period: Period,
    weights: &ScoreWeights,
) -> PeriodStats {
    let metrics = compute_metrics(matches, weights);
    let roles = role_breakdown(matches, weights);
    let top = top_champions(matches, weights, 5);
    let suggestions = period_suggestions(matches, period, &roles);
    PeriodStats {
        period,
        metrics,
        roles,
        top_champions: top,
        suggestions,
    }
}

fn period_suggestions(
    matches: &[NormalizedMatch],
    period: Period,
    roles: &[RoleStats],
) -> Vec<String> {
    let mut suggestions = Vec::new();
    if matches.is_empty() {
        return suggestions;
    }

    match period {
        Period::Today => {
            let recent = matches.len().min(5);
            let wins = matches[matches.len() - recent..]
                .iter()
                .filter(|m| m.win)
                .count();
            if wins >= 3 {
                suggestions.push("You're on form! Keep the momentum going.".to_string());
            } else if wins <= 1 {
                suggestions.push("Rough session. Take a break and come back later.".to_string());
            }
        }
        Period::Week => {
            let best = roles
                .iter()
                .filter(|r| r.metrics.games > 0)
                .max_by(|a, b| {
                    a.metrics
                        .win_rate
                        .partial_cmp(&b.metrics.win_rate)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
            if let Some(best) = best {
                suggestions.push(format!(
                    "Focus on {}, your best role this week ({:.1}% WR)",
                    best.role.label(),
                    best.metrics.win_rate
                ));
            }
        }
        Period::Month => {
            if matches.len() > 50 {
                let avg =
                    matches.iter().map(game_score).sum::<f64>() / matches.len() as f64;
                if avg > 70.0 {
                    suggestions.push("Excellent consistency! Ready to climb.".to_string());
                } else {
                    suggestions
                        .push("Focus on improvement, not on game volume.".to_string());
                }
            }
        }
        Period::Season => {}
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScoreWeights;
    use crate::model::QueueType;
    use chrono::{TimeZone, Utc};

    fn stub_match(idx: usize, win: bool) -> NormalizedMatch {
        NormalizedMatch {
            match_id: format!("M{}", idx),
            played_at: Utc.timestamp_opt(1_700_000_000 + idx as i64 * 3600, 0).unwrap(),
            duration_secs: 1800,
            queue: QueueType::RankedSolo,
            role: Role::Mid,
            champion_id: 103,
            champion_name: "Ahri".to_string(),
            win,
            kills: 5,
            deaths: 3,
            assists: 7,
            cs: 180,
            gold: 10_500,
            damage_to_champions: 19_500,
            vision_score: 24,
            enemy_champions: vec![238, 202, 64, 111, 22],
        }
    }

    #[test]
    fn empty_input_yields_zero_aggregate() {
        let metrics = compute_metrics(&[], &ScoreWeights::default());
        assert_eq!(metrics.games, 0);
        assert_eq!(metrics.win_rate, 0.0);
        assert_eq!(metrics.avg_kda, 0.0);
        assert_eq!(metrics.performance_score, 0.0);
        assert_eq!(metrics.trend, Trend::Stable);
    }

    #[test]
    fn win_rate_bounds_hold() {
        let matches: Vec<_> = (0..8).map(|i| stub_match(i, i % 2 == 0)).collect();
        let metrics = compute_metrics(&matches, &ScoreWeights::default());
        assert_eq!(metrics.win_rate, 50.0);
        assert_eq!(metrics.wins, 4);
        assert_eq!(metrics.losses, 4);

        let losses: Vec<_> = (0..4).map(|i| stub_match(i, false)).collect();
        assert_eq!(compute_metrics(&losses, &ScoreWeights::default()).win_rate, 0.0);
    }

    #[test]
    fn flawless_set_scores_near_ceiling() {
        let matches: Vec<_> = (0..10)
            .map(|i| {
                let mut m = stub_match(i, true);
                m.kills = 5;
                m.deaths = 0;
                m.assists = 5;
                m.cs = 240;
                m.damage_to_champions = 24_000;
                m.vision_score = 60;
                m
            })
            .collect();

        let metrics = compute_metrics(&matches, &ScoreWeights::default());
        assert_eq!(metrics.win_rate, 100.0);
        assert_eq!(metrics.avg_kda, 10.0);
        assert!(metrics.performance_score >= 90.0);
        assert!(metrics.performance_score <= 100.0);
        assert_eq!(metrics.trend, Trend::Stable);
    }

    #[test]
    fn composite_score_is_clamped() {
        let w = ScoreWeights::default();
        let absurd = composite_score(100.0, 40.0, 15.0, 3000.0, 10.0, &w);
        assert_eq!(absurd, 100.0);
        assert_eq!(composite_score(0.0, 0.0, 0.0, 0.0, 0.0, &w), 0.0);
    }

    #[test]
    fn game_score_caps_each_part() {
        let mut m = stub_match(0, true);
        m.kills = 30;
        m.deaths = 0;
        m.assists = 30;
        m.cs = 600;
        assert_eq!(game_score(&m), 100.0);

        m.win = false;
        assert_eq!(game_score(&m), 70.0);
    }

    #[test]
    fn trend_compares_halves() {
        let improving: Vec<_> = (0..12).map(|i| stub_match(i, i >= 6)).collect();
        assert_eq!(trend_from_history(&improving), Trend::Improving);

        let declining: Vec<_> = (0..12).map(|i| stub_match(i, i < 6)).collect();
        assert_eq!(trend_from_history(&declining), Trend::Declining);

        let short: Vec<_> = (0..5).map(|i| stub_match(i, true)).collect();
        assert_eq!(trend_from_history(&short), Trend::Stable);
    }

    #[test]
    fn consistency_defaults_on_small_samples() {
        let few: Vec<_> = (0..3).map(|i| stub_match(i, true)).collect();
        assert_eq!(consistency_score(&few), 50.0);

        let identical: Vec<_> = (0..10).map(|i| stub_match(i, true)).collect();
        assert_eq!(consistency_score(&identical), 100.0);
    }

    #[test]
    fn top_champions_order_is_stable() {
        let mut matches = Vec::new();
        for i in 0..6 {
            let mut m = stub_match(i, true);
            m.champion_id = 103;
            matches.push(m);
        }
        for i in 6..10 {
            let mut m = stub_match(i, i % 2 == 0);
            m.champion_id = 238;
            m.champion_name = "Zed".to_string();
            matches.push(m);
        }

        let top = top_champions(&matches, &ScoreWeights::default(), 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].champion_id, 103);
        assert_eq!(top[0].games, 6);
        assert_eq!(top[1].champion_id, 238);
    }

    #[test]
    fn role_breakdown_groups_and_sorts() {
        let mut matches: Vec<_> = (0..5).map(|i| stub_match(i, true)).collect();
        let mut jungle = stub_match(5, false);
        jungle.role = Role::Jungle;
        matches.push(jungle);

        let roles = role_breakdown(&matches, &ScoreWeights::default());
        assert_eq!(roles.len(), 2);
        assert_eq!(roles[0].role, Role::Mid);
        assert_eq!(roles[0].metrics.games, 5);
        assert_eq!(roles[1].role, Role::Jungle);
    }
}
