use crate::config::SampleThresholds;
use crate::model::{NormalizedMatch, Role};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

// Per-family confidence levels. Streaks are near-certain observations;
// playtime habits are the loosest inference.
const STREAK_CONFIDENCE: f64 = 0.9;
const MAIN_CONFIDENCE: f64 = 0.9;
const COMFORT_CONFIDENCE: f64 = 0.8;
const FREQUENT_CONFIDENCE: f64 = 0.7;
const PLAYTIME_CONFIDENCE: f64 = 0.7;

// Role-share thresholds.
const ONE_TRICK_SHARE: f64 = 60.0;
const ROLE_MAIN_SHARE: f64 = 40.0;
const ROLE_SECONDARY_SHARE: f64 = 25.0;

const COMFORT_WIN_RATE: f64 = 70.0;
const CHAMPION_MAIN_RANK: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    WinStreak,
    LossStreak,
    ChampionMain,
    ChampionComfortPick,
    ChampionFrequentPick,
    RoleOneTrick,
    RoleMain,
    RoleSecondary,
    PlaytimePreference,
}

/// A detected regularity over the match sequence. Recomputed wholesale each
/// run; `metadata` carries type-specific facts as key/value pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub kind: PatternKind,
    pub description: String,
    pub frequency: usize,
    pub confidence: f64,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub metadata: Map<String, Value>,
}

impl Pattern {
    /// True for a trailing streak that was still running at the end of the
    /// sequence.
    pub fn is_ongoing(&self) -> bool {
        self.metadata
            .get("ongoing")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Win/loss streaks in a chronologically ascending sequence. A streak ends
/// when the outcome flips; the trailing streak is emitted too, flagged
/// ongoing, when it meets the minimum length.
pub fn detect_streaks(matches: &[NormalizedMatch], min_len: usize) -> Vec<Pattern> {
    let mut patterns = Vec::new();
    if matches.is_empty() || min_len == 0 {
        return patterns;
    }

    let mut start = 0;
    for i in 1..=matches.len() {
        let broke = i == matches.len() || matches[i].win != matches[start].win;
        if !broke {
            continue;
        }
        let len = i - start;
        if len >= min_len {
            let ongoing = i == matches.len();
            patterns.push(streak_pattern(&matches[start..i], ongoing));
        }
        start = i;
    }

    patterns
}

fn streak_pattern(run: &[NormalizedMatch], ongoing: bool) -> Pattern {
    let win = run[0].win;
    let kind = if win {
        PatternKind::WinStreak
    } else {
        PatternKind::LossStreak
    };
    let noun = if win { "Win" } else { "Loss" };
    let suffix = if ongoing { " (ongoing)" } else { "" };

    let mut metadata = Map::new();
    metadata.insert("streak_length".to_string(), json!(run.len()));
    metadata.insert("result".to_string(), json!(if win { "win" } else { "loss" }));
    if ongoing {
        metadata.insert("ongoing".to_string(), json!(true));
    }

    Pattern {
        kind,
        description: format!("{} streak of {} games{}", noun, run.len(), suffix),
        frequency: run.len(),
        confidence: STREAK_CONFIDENCE,
        window_start: run[0].played_at,
        window_end: run[run.len() - 1].played_at,
        metadata,
    }
}

struct GroupStats {
    games: usize,
    wins: usize,
    label: String,
}

impl GroupStats {
    fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64 * 100.0
        }
    }
}

/// Champion preferences in the trailing window (default 30 days, anchored at
/// the newest match). Top-played champions become mains, high-win-rate picks
/// become comfort picks, volume picks become frequent picks.
pub fn detect_champion_preferences(
    matches: &[NormalizedMatch],
    thresholds: &SampleThresholds,
) -> Vec<Pattern> {
    let window = trailing_window(matches, thresholds.preference_window_days);
    let Some((start, end)) = window_bounds(window) else {
        return Vec::new();
    };

    let mut groups: HashMap<i32, GroupStats> = HashMap::new();
    for m in window {
        let entry = groups.entry(m.champion_id).or_insert_with(|| GroupStats {
            games: 0,
            wins: 0,
            label: m.champion_name.clone(),
        });
        entry.games += 1;
        if m.win {
            entry.wins += 1;
        }
    }

    let mut ranked: Vec<(i32, GroupStats)> = groups
        .into_iter()
        .filter(|(_, g)| g.games >= thresholds.min_champion_games)
        .collect();
    ranked.sort_by(|a, b| {
        b.1.games
            .cmp(&a.1.games)
            .then_with(|| {
                b.1.win_rate()
                    .partial_cmp(&a.1.win_rate())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut patterns = Vec::new();
    for (rank, (champion_id, stats)) in ranked.iter().enumerate() {
        let win_rate = stats.win_rate();

        let (kind, confidence) = if rank < CHAMPION_MAIN_RANK
            && stats.games >= thresholds.champion_main_games
        {
            (PatternKind::ChampionMain, MAIN_CONFIDENCE)
        } else if win_rate >= COMFORT_WIN_RATE && stats.games >= thresholds.min_champion_games {
            (PatternKind::ChampionComfortPick, COMFORT_CONFIDENCE)
        } else if stats.games >= thresholds.champion_frequent_games {
            (PatternKind::ChampionFrequentPick, FREQUENT_CONFIDENCE)
        } else {
            continue;
        };

        let mut metadata = Map::new();
        metadata.insert("champion_id".to_string(), json!(champion_id));
        metadata.insert("champion".to_string(), json!(stats.label));
        metadata.insert("play_count".to_string(), json!(stats.games));
        metadata.insert("win_rate".to_string(), json!(round1(win_rate)));
        metadata.insert("rank".to_string(), json!(rank + 1));

        patterns.push(Pattern {
            kind,
            description: format!(
                "Plays {} frequently ({} games, {:.1}% win rate)",
                stats.label, stats.games, win_rate
            ),
            frequency: stats.games,
            confidence,
            window_start: start,
            window_end: end,
            metadata,
        });
    }

    patterns
}

/// Role preferences by share of games in the trailing window.
pub fn detect_role_preferences(
    matches: &[NormalizedMatch],
    thresholds: &SampleThresholds,
) -> Vec<Pattern> {
    let window = trailing_window(matches, thresholds.preference_window_days);
    let Some((start, end)) = window_bounds(window) else {
        return Vec::new();
    };

    let mut groups: HashMap<Role, GroupStats> = HashMap::new();
    let mut total = 0usize;
    for m in window {
        if m.role == Role::Unknown {
            continue;
        }
        let entry = groups.entry(m.role).or_insert_with(|| GroupStats {
            games: 0,
            wins: 0,
            label: m.role.label().to_string(),
        });
        entry.games += 1;
        if m.win {
            entry.wins += 1;
        }
        total += 1;
    }
    if total == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(Role, GroupStats)> = groups.into_iter().collect();
    ranked.sort_by(|a, b| {
        b.1.games
            .cmp(&a.1.games)
            .then_with(|| a.1.label.cmp(&b.1.label))
    });

    let mut patterns = Vec::new();
    for (role, stats) in ranked {
        if stats.games < thresholds.min_role_games {
            continue;
        }
        let share = stats.games as f64 / total as f64 * 100.0;

        let (kind, confidence) = if share >= ONE_TRICK_SHARE {
            (PatternKind::RoleOneTrick, MAIN_CONFIDENCE)
        } else if share >= ROLE_MAIN_SHARE {
            (PatternKind::RoleMain, COMFORT_CONFIDENCE)
        } else if share >= ROLE_SECONDARY_SHARE {
            (PatternKind::RoleSecondary, FREQUENT_CONFIDENCE)
        } else {
            continue;
        };

        let mut metadata = Map::new();
        metadata.insert("role".to_string(), json!(role));
        metadata.insert("share".to_string(), json!(round1(share)));
        metadata.insert("win_rate".to_string(), json!(round1(stats.win_rate())));

        patterns.push(Pattern {
            kind,
            description: format!(
                "Prefers {} ({:.1}% of games, {:.1}% win rate)",
                stats.label,
                share,
                stats.win_rate()
            ),
            frequency: stats.games,
            confidence,
            window_start: start,
            window_end: end,
            metadata,
        });
    }

    patterns
}

/// Hour-of-day habits in the trailing window. Only hours with enough games
/// are reported, labeled into day bands.
pub fn detect_playtime_patterns(
    matches: &[NormalizedMatch],
    thresholds: &SampleThresholds,
) -> Vec<Pattern> {
    let window = trailing_window(matches, thresholds.preference_window_days);
    let Some((start, end)) = window_bounds(window) else {
        return Vec::new();
    };

    let mut hours: HashMap<u32, (usize, usize)> = HashMap::new();
    for m in window {
        let entry = hours.entry(m.played_at.hour()).or_insert((0, 0));
        entry.0 += 1;
        if m.win {
            entry.1 += 1;
        }
    }

    let mut ranked: Vec<(u32, (usize, usize))> = hours.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then_with(|| a.0.cmp(&b.0)));

    let mut patterns = Vec::new();
    for (hour, (games, wins)) in ranked {
        if games < thresholds.min_playtime_games {
            continue;
        }
        let win_rate = wins as f64 / games as f64 * 100.0;
        let band = day_band(hour);

        let mut metadata = Map::new();
        metadata.insert("hour".to_string(), json!(hour));
        metadata.insert("time_of_day".to_string(), json!(band));
        metadata.insert("game_count".to_string(), json!(games));
        metadata.insert("win_rate".to_string(), json!(round1(win_rate)));

        patterns.push(Pattern {
            kind: PatternKind::PlaytimePreference,
            description: format!(
                "Active in the {} ({:02}:00, {} games, {:.1}% win rate)",
                band, hour, games, win_rate
            ),
            frequency: games,
            confidence: PLAYTIME_CONFIDENCE,
            window_start: start,
            window_end: end,
            metadata,
        });
    }

    patterns
}

/// All pattern families over the same slice. Detector order only affects
/// output order, never content.
pub fn detect_all(matches: &[NormalizedMatch], thresholds: &SampleThresholds) -> Vec<Pattern> {
    let mut patterns = detect_streaks(matches, thresholds.min_streak_len);
    patterns.extend(detect_champion_preferences(matches, thresholds));
    patterns.extend(detect_role_preferences(matches, thresholds));
    patterns.extend(detect_playtime_patterns(matches, thresholds));
    patterns
}

/// Trailing sub-slice anchored at the newest match timestamp, never the wall
/// clock. Input must be chronologically ascending.
fn trailing_window(matches: &[NormalizedMatch], days: i64) -> &[NormalizedMatch] {
    let Some(last) = matches.last() else {
        return matches;
    };
    let cutoff = last.played_at - Duration::days(days);
    let start = matches.partition_point(|m| m.played_at < cutoff);
    &matches[start..]
}

fn window_bounds(window: &[NormalizedMatch]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = window.first()?;
    let last = window.last()?;
    Some((first.played_at, last.played_at))
}

fn day_band(hour: u32) -> &'static str {
    match hour {
        6..=11 => "morning",
        12..=17 => "afternoon",
        18..=23 => "evening",
        _ => "night",
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QueueType;
    use chrono::TimeZone;

    fn stub_match(idx: usize, win: bool) -> NormalizedMatch {
        NormalizedMatch {
            match_id: format!("M{:03}", idx),
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
            damage_to_champions: 17_000,
            vision_score: 24,
            enemy_champions: vec![238],
        }
    }

    #[test]
    fn streaks_report_runs_not_singles() {
        // 5 wins, 3 losses, 1 win: two streaks, no trailing-single pattern.
        let mut matches = Vec::new();
        for i in 0..5 {
            matches.push(stub_match(i, true));
        }
        for i in 5..8 {
            matches.push(stub_match(i, false));
        }
        matches.push(stub_match(8, true));

        let patterns = detect_streaks(&matches, 3);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].kind, PatternKind::WinStreak);
        assert_eq!(patterns[0].frequency, 5);
        assert!(!patterns[0].is_ongoing());
        assert_eq!(patterns[1].kind, PatternKind::LossStreak);
        assert_eq!(patterns[1].frequency, 3);
    }

    #[test]
    fn trailing_streak_is_flagged_ongoing() {
        let matches: Vec<_> = (0..4).map(|i| stub_match(i, true)).collect();
        let patterns = detect_streaks(&matches, 3);
        assert_eq!(patterns.len(), 1);
        assert!(patterns[0].is_ongoing());
        assert!(patterns[0].description.contains("ongoing"));
    }

    #[test]
    fn short_runs_are_ignored() {
        let matches: Vec<_> = (0..6).map(|i| stub_match(i, i % 2 == 0)).collect();
        assert!(detect_streaks(&matches, 3).is_empty());
    }

    #[test]
    fn champion_main_and_comfort_picks() {
        let thresholds = SampleThresholds::default();
        let mut matches = Vec::new();
        // Six Ahri games, all wins: main (top rank, >=5 games).
        for i in 0..6 {
            matches.push(stub_match(i, true));
        }
        // Three Zed games, all wins: comfort pick (>=70% WR, >=3 games).
        for i in 6..9 {
            let mut m = stub_match(i, true);
            m.champion_id = 238;
            m.champion_name = "Zed".to_string();
            matches.push(m);
        }
        // Two Lux games: below minimum, no pattern.
        for i in 9..11 {
            let mut m = stub_match(i, false);
            m.champion_id = 99;
            m.champion_name = "Lux".to_string();
            matches.push(m);
        }

        let patterns = detect_champion_preferences(&matches, &thresholds);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].kind, PatternKind::ChampionMain);
        assert_eq!(patterns[0].frequency, 6);
        assert_eq!(patterns[1].kind, PatternKind::ChampionComfortPick);
        assert_eq!(patterns[1].metadata["champion"], json!("Zed"));
    }

    #[test]
    fn role_share_classification() {
        let thresholds = SampleThresholds::default();
        let mut matches = Vec::new();
        // 7 mid, 3 jungle: 70% one-trick, 30% secondary.
        for i in 0..7 {
            matches.push(stub_match(i, true));
        }
        for i in 7..10 {
            let mut m = stub_match(i, false);
            m.role = Role::Jungle;
            matches.push(m);
        }

        let patterns = detect_role_preferences(&matches, &thresholds);
        assert_eq!(patterns.len(), 2);
        assert_eq!(patterns[0].kind, PatternKind::RoleOneTrick);
        assert_eq!(patterns[1].kind, PatternKind::RoleSecondary);
    }

    #[test]
    fn playtime_needs_volume() {
        let thresholds = SampleThresholds::default();
        // Twelve games at the same hour-of-day (24 h apart each).
        let matches: Vec<_> = (0..12)
            .map(|i| {
                let mut m = stub_match(i, i % 2 == 0);
                m.played_at = Utc.timestamp_opt(1_700_000_000 + i as i64 * 86_400, 0).unwrap();
                m
            })
            .collect();

        let patterns = detect_playtime_patterns(&matches, &thresholds);
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].kind, PatternKind::PlaytimePreference);
        assert_eq!(patterns[0].frequency, 12);

        let few: Vec<_> = (0..5).map(|i| stub_match(i, true)).collect();
        assert!(detect_playtime_patterns(&few, &thresholds).is_empty());
    }

    #[test]
    fn preference_window_is_anchored_at_newest_match() {
        let thresholds = SampleThresholds::default();
        let mut matches = Vec::new();
        // Five old games 60 days before the recent block: outside the window.
        for i in 0..5 {
            let mut m = stub_match(i, true);
            m.champion_id = 99;
            m.champion_name = "Lux".to_string();
            m.played_at = Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap();
            matches.push(m);
        }
        for i in 5..11 {
            let mut m = stub_match(i, true);
            m.played_at = Utc
                .timestamp_opt(1_700_000_000 + 60 * 86_400 + i as i64 * 3600, 0)
                .unwrap();
            matches.push(m);
        }

        let patterns = detect_champion_preferences(&matches, &thresholds);
        assert!(patterns
            .iter()
            .all(|p| p.metadata["champion"] != json!("Lux")));
    }

    #[test]
    fn detect_all_merges_families() {
        let thresholds = SampleThresholds::default();
        let matches: Vec<_> = (0..8).map(|i| stub_match(i, true)).collect();
        let patterns = detect_all(&matches, &thresholds);

        assert!(patterns.iter().any(|p| p.kind == PatternKind::WinStreak));
        assert!(patterns.iter().any(|p| p.kind == PatternKind::ChampionMain));
        assert!(patterns.iter().any(|p| p.kind == PatternKind::RoleOneTrick));
    }
}
