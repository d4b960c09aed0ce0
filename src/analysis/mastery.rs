use crate::analysis::metrics::{
    compute_metrics, game_score, population_std_dev, round2, PerformanceMetrics, Trend,
};
use crate::config::ScoreWeights;
use crate::error::AppError;
use crate::model::NormalizedMatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// Mastery score parts: experience up to 40, consistency up to 30, recent
// trend up to 30.
const EXPERIENCE_PER_GAME: f64 = 2.0;
const EXPERIENCE_CAP: f64 = 40.0;
const CONSISTENCY_CAP: f64 = 30.0;
const TREND_CAP: f64 = 30.0;
const TREND_MIDPOINT: f64 = 15.0;
const RECENT_GAMES: usize = 5;

const PROGRESSION_MIN_CHUNK: usize = 2;
const PROGRESSION_BAND: f64 = 5.0;

/// One game condensed for display alongside a mastery analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub match_id: String,
    pub played_at: DateTime<Utc>,
    pub champion: String,
    pub kda_line: String,
    pub cs: u32,
    pub gold: u32,
    pub damage: u32,
    pub vision_score: u32,
    pub duration_secs: u32,
    pub win: bool,
    pub score: f64,
}

impl GameSummary {
    fn from_match(m: &NormalizedMatch) -> Self {
        GameSummary {
            match_id: m.match_id.clone(),
            played_at: m.played_at,
            champion: m.champion_name.clone(),
            kda_line: format!("{}/{}/{}", m.kills, m.deaths, m.assists),
            cs: m.cs,
            gold: m.gold,
            damage: m.damage_to_champions,
            vision_score: m.vision_score,
            duration_secs: m.duration_secs,
            win: m.win,
            score: game_score(m),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionPeriod {
    pub period: usize,
    pub games: usize,
    pub win_rate: f64,
    pub avg_kda: f64,
    pub performance_score: f64,
}

/// Performance by quarter of the champion's history, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillProgression {
    pub periods: Vec<ProgressionPeriod>,
    /// Last-period score minus first-period score.
    pub overall_improvement: f64,
    pub trend: Trend,
    pub insufficient_data: bool,
}

impl SkillProgression {
    fn insufficient() -> Self {
        SkillProgression {
            periods: Vec::new(),
            overall_improvement: 0.0,
            trend: Trend::Stable,
            insufficient_data: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampionMasteryAnalysis {
    pub champion_id: i32,
    pub champion_name: String,
    pub games: usize,
    pub metrics: PerformanceMetrics,
    /// 0–100: experience plus consistency plus recent trend.
    pub mastery_score: f64,
    pub best_game: GameSummary,
    pub worst_game: GameSummary,
    pub suggestions: Vec<String>,
    pub progression: SkillProgression,
}

/// Deep dive on one champion. Zero matches on the requested champion is a
/// genuine not-found, not an empty result. Input must be chronologically
/// ascending.
pub fn analyze_champion(
    matches: &[NormalizedMatch],
    champion_id: i32,
    weights: &ScoreWeights,
    progression_min_games: usize,
) -> Result<ChampionMasteryAnalysis, AppError> {
    let champion_matches: Vec<NormalizedMatch> = matches
        .iter()
        .filter(|m| m.champion_id == champion_id)
        .cloned()
        .collect();

    let Some(first) = champion_matches.first() else {
        return Err(AppError::ChampionNotFound(format!(
            "champion {}",
            champion_id
        )));
    };
    let champion_name = first.champion_name.clone();

    let metrics = compute_metrics(&champion_matches, weights);
    let mastery_score = mastery_score(&champion_matches);

    // Ties on score keep the earliest game, matching a plain max scan.
    let best = champion_matches
        .iter()
        .max_by(|a, b| {
            game_score(a)
                .partial_cmp(&game_score(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(first);
    let worst = champion_matches
        .iter()
        .min_by(|a, b| {
            game_score(a)
                .partial_cmp(&game_score(b))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .unwrap_or(first);

    let suggestions = champion_suggestions(&metrics);
    let progression = skill_progression(&champion_matches, weights, progression_min_games);

    Ok(ChampionMasteryAnalysis {
        champion_id,
        champion_name,
        games: champion_matches.len(),
        metrics,
        mastery_score,
        best_game: GameSummary::from_match(best),
        worst_game: GameSummary::from_match(worst),
        suggestions,
        progression,
    })
}

fn mastery_score(matches: &[NormalizedMatch]) -> f64 {
    if matches.is_empty() {
        return 0.0;
    }

    let experience = (matches.len() as f64 * EXPERIENCE_PER_GAME).min(EXPERIENCE_CAP);

    let scores: Vec<f64> = matches.iter().map(game_score).collect();
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    let stdev = population_std_dev(&scores);
    let consistency = ((100.0 - stdev) / 2.0).clamp(0.0, CONSISTENCY_CAP);

    let recent_count = matches.len().min(RECENT_GAMES);
    let recent_mean =
        scores[scores.len() - recent_count..].iter().sum::<f64>() / recent_count as f64;
    let trend = ((recent_mean - mean) / 2.0 + TREND_MIDPOINT).clamp(0.0, TREND_CAP);

    round2((experience + consistency + trend).min(100.0))
}

fn champion_suggestions(metrics: &PerformanceMetrics) -> Vec<String> {
    let mut suggestions = Vec::new();

    if metrics.avg_kda < 1.5 {
        suggestions.push("Prioritize surviving and assisting over chasing kills".to_string());
    } else if metrics.avg_kda > 3.0 {
        suggestions.push("Excellent KDA! You have this champion down".to_string());
    }

    if metrics.cs_per_min < 6.0 {
        suggestions.push("Improve your farming for more economic impact".to_string());
    }

    if metrics.win_rate < 45.0 {
        suggestions.push("Consider studying guides or VODs for this champion".to_string());
    } else if metrics.win_rate > 65.0 {
        suggestions.push("Strong pick! Keep playing it to climb".to_string());
    }

    suggestions
}

/// Quarter-by-quarter progression. Needs `min_games` games and 2 per chunk.
fn skill_progression(
    matches: &[NormalizedMatch],
    weights: &ScoreWeights,
    min_games: usize,
) -> SkillProgression {
    if matches.len() < min_games {
        return SkillProgression::insufficient();
    }

    let chunk = (matches.len() / 4).max(PROGRESSION_MIN_CHUNK);
    let mut periods = Vec::new();
    let mut start = 0;
    while start < matches.len() {
        let end = (start + chunk).min(matches.len());
        let slice = &matches[start..end];
        if slice.len() >= PROGRESSION_MIN_CHUNK {
            let metrics = compute_metrics(slice, weights);
            periods.push(ProgressionPeriod {
                period: periods.len() + 1,
                games: slice.len(),
                win_rate: metrics.win_rate,
                avg_kda: metrics.avg_kda,
                performance_score: metrics.performance_score,
            });
        }
        start = end;
    }

    let mut improvement = 0.0;
    let mut trend = Trend::Stable;
    if periods.len() >= 2 {
        improvement = round2(
            periods[periods.len() - 1].performance_score - periods[0].performance_score,
        );
        if improvement > PROGRESSION_BAND {
            trend = Trend::Improving;
        } else if improvement < -PROGRESSION_BAND {
            trend = Trend::Declining;
        }
    }

    SkillProgression {
        periods,
        overall_improvement: improvement,
        trend,
        insufficient_data: false,
    }
}
