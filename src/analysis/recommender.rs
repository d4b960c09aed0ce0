use crate::analysis::metrics::{compute_metrics, Period, PerformanceMetrics, Trend};
use crate::analysis::patterns::{Pattern, PatternKind};
use crate::analysis::trajectory::RatingTrajectory;
use crate::config::RecommendConfig;
use crate::model::{NormalizedMatch, Role};
use crate::reference::{ChampionCatalog, MetaIndex};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const SUGGESTIONS_PER_ROLE: usize = 3;
const GAP_MAX_RESULTS: usize = 5;
const BAN_MAX_RESULTS: usize = 3;
const TRAINING_MAX_AREAS: usize = 3;
const EXPECTED_WR_CAP: f64 = 85.0;
const META_WR_FACTOR: f64 = 15.0;
const HIGH_META_PRIORITY_FLOOR: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ChampionSuggestion,
    TrainingFocus,
    GameplayTip,
    BanSuggestion,
    MetaAdaptation,
}

impl RecommendationKind {
    pub fn label(&self) -> &'static str {
        match self {
            RecommendationKind::ChampionSuggestion => "Champion",
            RecommendationKind::TrainingFocus => "Training",
            RecommendationKind::GameplayTip => "Gameplay",
            RecommendationKind::BanSuggestion => "Ban",
            RecommendationKind::MetaAdaptation => "Meta",
        }
    }
}

/// One actionable suggestion. The engine assigns no identifiers; persisting
/// the list is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
    /// 1 is the highest priority.
    pub priority: u8,
    pub confidence: f64,
    pub expected_improvement: String,
    pub action_items: Vec<String>,
    pub champion_id: Option<i32>,
    pub role: Option<Role>,
    pub period: Period,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Everything the generators read, precomputed by the caller. `week` and
/// `month` are trailing windows anchored at `anchor` (the newest match
/// timestamp), which keeps generation independent of the wall clock.
pub struct PlayerContext<'a> {
    pub week: &'a [NormalizedMatch],
    pub month: &'a [NormalizedMatch],
    pub metrics: &'a PerformanceMetrics,
    pub trajectory: Option<&'a RatingTrajectory>,
    pub patterns: &'a [Pattern],
    pub anchor: DateTime<Utc>,
}

pub struct Recommender<'a> {
    cfg: &'a RecommendConfig,
    meta: &'a MetaIndex,
    catalog: &'a ChampionCatalog,
}

impl<'a> Recommender<'a> {
    pub fn new(cfg: &'a RecommendConfig, meta: &'a MetaIndex, catalog: &'a ChampionCatalog) -> Self {
        Recommender { cfg, meta, catalog }
    }

    /// Runs all six generators and merges their output. Any generator may
    /// come back empty on a thin sample without affecting the others.
    pub fn generate(&self, ctx: &PlayerContext) -> Vec<Recommendation> {
        let mut recs = Vec::new();
        recs.extend(self.suggest_champions(ctx));
        recs.extend(self.performance_gaps(ctx));
        recs.extend(self.gameplay_tips(ctx));
        recs.extend(self.ban_priorities(ctx));
        recs.extend(self.meta_adaptations(ctx));
        recs.extend(self.training_focus(ctx));

        for rec in &mut recs {
            rec.expires_at = Some(expiry(ctx.anchor, rec.period));
        }

        sort_recommendations(&mut recs);
        recs.truncate(self.cfg.max_recommendations);
        recs.retain(|r| r.confidence >= self.cfg.min_confidence);
        recs
    }

    /// Generator 1: strong meta champions the player has not picked up yet,
    /// per role with enough recent games.
    fn suggest_champions(&self, ctx: &PlayerContext) -> Vec<Recommendation> {
        let mut recs = Vec::new();

        let mut by_role: HashMap<Role, Vec<&NormalizedMatch>> = HashMap::new();
        for m in ctx.month {
            if m.role != Role::Unknown {
                by_role.entry(m.role).or_default().push(m);
            }
        }

        let mut roles: Vec<(Role, Vec<&NormalizedMatch>)> = by_role.into_iter().collect();
        roles.sort_by_key(|(role, _)| role.label());

        for (role, role_matches) in roles {
            if role_matches.len() < self.cfg.min_role_games {
                continue;
            }

            let wins = role_matches.iter().filter(|m| m.win).count();
            let role_wr = wins as f64 / role_matches.len() as f64 * 100.0;
            let played: Vec<i32> = role_matches.iter().map(|m| m.champion_id).collect();

            let mut candidates: Vec<(i32, f64)> = self
                .meta
                .role_pool(role)
                .iter()
                .copied()
                .filter(|id| !played.contains(id))
                .map(|id| (id, self.meta.strength(id)))
                .collect();
            candidates.sort_by(|a, b| {
                b.1.partial_cmp(&a.1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.0.cmp(&b.0))
            });

            for (champion_id, strength) in candidates.into_iter().take(SUGGESTIONS_PER_ROLE) {
                let name = self.catalog.name(champion_id);
                let expected_wr = (role_wr + strength * META_WR_FACTOR).min(EXPECTED_WR_CAP);
                let priority = if strength >= HIGH_META_PRIORITY_FLOOR { 1 } else { 2 };

                recs.push(Recommendation {
                    kind: RecommendationKind::ChampionSuggestion,
                    title: format!("Try {} in {}", name, role.label()),
                    description: format!(
                        "{} is very strong in the current meta ({:.0}% strength) and could lift your {} results.",
                        name,
                        strength * 100.0,
                        role.label()
                    ),
                    priority,
                    confidence: strength * 0.8,
                    expected_improvement: format!("+{:.1}% win rate", expected_wr - role_wr),
                    action_items: vec![
                        format!("Watch guides for {}", name),
                        format!("Practice {} in normals first", name),
                        format!("Learn the optimal build for {}", name),
                    ],
                    champion_id: Some(champion_id),
                    role: Some(role),
                    period: Period::Week,
                    expires_at: None,
                });
            }
        }

        recs
    }

    /// Generator 2: champions the player invests games in without results.
    fn performance_gaps(&self, ctx: &PlayerContext) -> Vec<Recommendation> {
        let mut groups: HashMap<i32, Vec<NormalizedMatch>> = HashMap::new();
        for m in ctx.month {
            groups.entry(m.champion_id).or_default().push(m.clone());
        }

        let mut recs = Vec::new();
        let mut champions: Vec<(i32, Vec<NormalizedMatch>)> = groups.into_iter().collect();
        champions.sort_by_key(|(id, _)| *id);

        for (champion_id, games) in champions {
            if games.len() < self.cfg.min_champion_games {
                continue;
            }

            let metrics = compute_metrics(&games, &Default::default());
            let role = dominant_role(&games);

            let mut issues = Vec::new();
            let mut actions = Vec::new();
            if metrics.win_rate < self.cfg.low_win_rate {
                issues.push("low win rate");
                actions.push("Review your replays to spot recurring mistakes".to_string());
            }
            if metrics.avg_kda < self.cfg.low_kda {
                issues.push("low KDA");
                actions.push("Prioritize survival and positioning".to_string());
            }
            if metrics.cs_per_min < self.cfg.low_cs_per_min && role.is_lane() {
                issues.push("weak farming");
                actions.push("Drill last-hitting and wave management".to_string());
            }
            if issues.is_empty() {
                continue;
            }

            let priority = if issues.len() >= 2 { 1 } else { 2 };
            let confidence = (games.len() as f64 / 20.0).min(0.8);
            let name = games[0].champion_name.clone();

            recs.push(Recommendation {
                kind: RecommendationKind::TrainingFocus,
                title: format!("Tighten up your {} games", name),
                description: format!(
                    "{} games on {} but {}. Plenty of room to improve.",
                    games.len(),
                    name,
                    issues.join(", ")
                ),
                priority,
                confidence,
                expected_improvement: format!("+{}% performance", 10 + 5 * issues.len()),
                action_items: actions,
                champion_id: Some(champion_id),
                role: Some(role),
                period: Period::Month,
                expires_at: None,
            });
        }

        recs.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        recs.truncate(GAP_MAX_RESULTS);
        recs
    }

    /// Generator 3: concrete gameplay tips from the recent week, plus a
    /// tilt-control tip when an ongoing loss streak was detected.
    fn gameplay_tips(&self, ctx: &PlayerContext) -> Vec<Recommendation> {
        let mut recs = Vec::new();

        if let Some(streak) = ctx
            .patterns
            .iter()
            .find(|p| p.kind == PatternKind::LossStreak && p.is_ongoing())
        {
            let trend_note = match ctx.trajectory.map(|t| t.trend) {
                Some(Trend::Declining) => " Your rating trend is pointing down too.",
                _ => "",
            };
            recs.push(Recommendation {
                kind: RecommendationKind::GameplayTip,
                title: "Reset before you queue again".to_string(),
                description: format!(
                    "You are on a {}-game loss streak.{} Stepping away beats queueing tilted.",
                    streak.frequency, trend_note
                ),
                priority: 1,
                confidence: 0.8,
                expected_improvement: "+5% win rate".to_string(),
                action_items: vec![
                    "Take a break after two straight losses".to_string(),
                    "Review the last loss before the next queue".to_string(),
                    "Play a normal game to reset".to_string(),
                ],
                champion_id: None,
                role: None,
                period: Period::Week,
                expires_at: None,
            });
        }

        if ctx.week.len() < self.cfg.min_tip_games {
            return recs;
        }

        if let Some(tip) = self.early_game_tip(ctx.week) {
            recs.push(tip);
        }
        if let Some(tip) = self.teamfight_tip(ctx.week) {
            recs.push(tip);
        }
        if let Some(tip) = self.vision_tip(ctx.week) {
            recs.push(tip);
        }

        recs
    }

    fn early_game_tip(&self, week: &[NormalizedMatch]) -> Option<Recommendation> {
        let avg_cs: f64 = week.iter().map(|m| m.cs_per_min()).sum::<f64>() / week.len() as f64;
        let high_death_games = week
            .iter()
            .filter(|m| m.deaths > self.cfg.high_death_count)
            .count();
        let high_death_share = high_death_games as f64 / week.len() as f64;

        let mut issues = Vec::new();
        let mut actions = Vec::new();
        if avg_cs < self.cfg.low_cs_per_min {
            issues.push("low CS");
            actions.push("Focus on clean last-hitting".to_string());
            actions.push("Avoid trades that cost you CS".to_string());
        }
        if high_death_share > self.cfg.high_death_share {
            issues.push("too many early deaths");
            actions.push("Play safer in the early game".to_string());
            actions.push("Ward more to avoid ganks".to_string());
        }
        if issues.is_empty() {
            return None;
        }
        actions.truncate(3);

        Some(Recommendation {
            kind: RecommendationKind::GameplayTip,
            title: "Improve your early game".to_string(),
            description: format!(
                "Issues detected: {}. The early game decides who plays with a lead.",
                issues.join(", ")
            ),
            priority: 1,
            confidence: 0.7,
            expected_improvement: "+8% win rate".to_string(),
            action_items: actions,
            champion_id: None,
            role: None,
            period: Period::Week,
            expires_at: None,
        })
    }

    fn teamfight_tip(&self, week: &[NormalizedMatch]) -> Option<Recommendation> {
        let low_impact = week
            .iter()
            .filter(|m| m.kda() < self.cfg.teamfight_kda)
            .count();
        let share = low_impact as f64 / week.len() as f64;
        if share <= self.cfg.teamfight_share {
            return None;
        }

        Some(Recommendation {
            kind: RecommendationKind::GameplayTip,
            title: "Sharpen your teamfighting".to_string(),
            description: format!(
                "You had low impact in {:.0}% of your recent games, which points at teamfight problems.",
                share * 100.0
            ),
            priority: 2,
            confidence: 0.6,
            expected_improvement: "+6% win rate".to_string(),
            action_items: vec![
                "Improve your teamfight positioning".to_string(),
                "Focus the right targets".to_string(),
                "Don't frontline unless you're the tank".to_string(),
            ],
            champion_id: None,
            role: None,
            period: Period::Week,
            expires_at: None,
        })
    }

    fn vision_tip(&self, week: &[NormalizedMatch]) -> Option<Recommendation> {
        let avg_vision: f64 =
            week.iter().map(|m| m.vision_per_min()).sum::<f64>() / week.len() as f64;
        if avg_vision >= self.cfg.low_vision_per_min {
            return None;
        }

        Some(Recommendation {
            kind: RecommendationKind::GameplayTip,
            title: "Improve your vision control".to_string(),
            description: format!(
                "Your vision score ({:.1}/min) is low. Vision is a huge strategic edge.",
                avg_vision
            ),
            priority: 2,
            confidence: 0.6,
            expected_improvement: "+5% win rate".to_string(),
            action_items: vec![
                "Buy more control wards".to_string(),
                "Ward objectives before they spawn".to_string(),
                "Clear enemy wards when you can".to_string(),
            ],
            champion_id: None,
            role: None,
            period: Period::Week,
            expires_at: None,
        })
    }

    /// Generator 4: personal problem champions merged with meta threats,
    /// personal threats first.
    fn ban_priorities(&self, ctx: &PlayerContext) -> Vec<Recommendation> {
        struct Threat {
            champion_id: i32,
            priority: u8,
            confidence: f64,
            reason: String,
        }

        let mut faced: HashMap<i32, (usize, usize)> = HashMap::new();
        for m in ctx.week {
            for enemy in &m.enemy_champions {
                let entry = faced.entry(*enemy).or_insert((0, 0));
                entry.0 += 1;
                if m.win {
                    entry.1 += 1;
                }
            }
        }

        let mut threats = Vec::new();
        let mut personal: Vec<(i32, (usize, usize))> = faced.into_iter().collect();
        personal.sort_by_key(|(id, _)| *id);
        for (champion_id, (games, wins)) in personal {
            if games < self.cfg.ban_min_faced {
                continue;
            }
            let wr = wins as f64 / games as f64;
            if wr >= self.cfg.ban_problem_win_rate {
                continue;
            }
            threats.push(Threat {
                champion_id,
                priority: 1,
                confidence: (games as f64 / 10.0).min(0.9),
                reason: format!(
                    "You lose {:.0}% of games against this champion",
                    (1.0 - wr) * 100.0
                ),
            });
        }

        for (champion_id, strength) in self.meta.threats(self.cfg.meta_threat_floor) {
            if threats.iter().any(|t| t.champion_id == champion_id) {
                continue;
            }
            threats.push(Threat {
                champion_id,
                priority: 2,
                confidence: 0.7,
                reason: format!(
                    "Very high pick/ban presence in the meta ({:.0}%)",
                    strength * 100.0
                ),
            });
        }

        threats.sort_by(|a, b| {
            a.priority.cmp(&b.priority).then_with(|| {
                b.confidence
                    .partial_cmp(&a.confidence)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
        });

        threats
            .into_iter()
            .take(BAN_MAX_RESULTS)
            .map(|threat| {
                let name = self.catalog.name(threat.champion_id);
                Recommendation {
                    kind: RecommendationKind::BanSuggestion,
                    title: format!("Ban {}", name),
                    description: threat.reason,
                    priority: threat.priority,
                    confidence: threat.confidence,
                    expected_improvement: "+3% win rate per avoided matchup".to_string(),
                    action_items: vec![
                        format!("Prioritize banning {}", name),
                        format!("Learn the counters to {} for when it slips through", name),
                    ],
                    champion_id: Some(threat.champion_id),
                    role: None,
                    period: Period::Week,
                    expires_at: None,
                }
            })
            .collect()
    }

    /// Generator 5: the single most-played off-meta champion.
    fn meta_adaptations(&self, ctx: &PlayerContext) -> Vec<Recommendation> {
        let mut groups: HashMap<i32, (usize, String)> = HashMap::new();
        for m in ctx.month {
            let entry = groups
                .entry(m.champion_id)
                .or_insert((0, m.champion_name.clone()));
            entry.0 += 1;
        }

        let worst = groups
            .into_iter()
            .filter(|(id, (games, _))| {
                *games >= self.cfg.off_meta_min_games
                    && self.meta.strength(*id) < self.cfg.off_meta_ceiling
            })
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.0.cmp(&a.0)));

        let Some((champion_id, (_, name))) = worst else {
            return Vec::new();
        };
        let strength = self.meta.strength(champion_id);

        vec![Recommendation {
            kind: RecommendationKind::MetaAdaptation,
            title: format!("Cut back on {}", name),
            description: format!(
                "{} is weak in the current meta ({:.0}% strength). Consider stronger picks.",
                name,
                strength * 100.0
            ),
            priority: 2,
            confidence: 0.8,
            expected_improvement: "+4% win rate from meta adaptation".to_string(),
            action_items: vec![
                format!("Keep {} for favorable matchups only", name),
                "Pick up champions that are strong right now".to_string(),
                "Follow the patch notes for buffs and nerfs".to_string(),
            ],
            champion_id: Some(champion_id),
            role: None,
            period: Period::Month,
            expires_at: None,
        }]
    }

    /// Generator 6: weakest fundamentals measured against fixed benchmarks.
    fn training_focus(&self, ctx: &PlayerContext) -> Vec<Recommendation> {
        if ctx.month.is_empty() {
            return Vec::new();
        }
        let n = ctx.month.len() as f64;
        let bench = &self.cfg.benchmarks;

        let avg =
            |f: fn(&NormalizedMatch) -> f64| -> f64 { ctx.month.iter().map(f).sum::<f64>() / n };
        let score = |value: f64, benchmark: f64| (value / benchmark * 100.0).min(100.0);

        let mut areas = [
            (
                FocusArea::Farming,
                score(avg(NormalizedMatch::cs_per_min), bench.cs_per_min),
            ),
            (
                FocusArea::Vision,
                score(avg(NormalizedMatch::vision_per_min), bench.vision_per_min),
            ),
            (FocusArea::Positioning, score(avg(NormalizedMatch::kda), bench.kda)),
            (
                FocusArea::Damage,
                score(avg(NormalizedMatch::damage_per_min), bench.damage_per_min),
            ),
        ];
        areas.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        areas
            .iter()
            .filter(|(_, s)| *s < self.cfg.weak_area_floor)
            .take(TRAINING_MAX_AREAS)
            .enumerate()
            .map(|(i, (area, _))| {
                let content = area.content();
                Recommendation {
                    kind: RecommendationKind::TrainingFocus,
                    title: content.title.to_string(),
                    description: content.description.to_string(),
                    priority: if i == 0 { 1 } else { 2 },
                    confidence: 0.9,
                    expected_improvement: format!("+{}% in this area", 15 - 3 * i),
                    action_items: content.tips.iter().map(|t| t.to_string()).collect(),
                    champion_id: None,
                    role: None,
                    period: Period::Month,
                    expires_at: None,
                }
            })
            .collect()
    }
}

/// The global ordering invariant: priority ascending, confidence descending.
pub fn sort_recommendations(recs: &mut [Recommendation]) {
    recs.sort_by(|a, b| {
        a.priority.cmp(&b.priority).then_with(|| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });
}

fn expiry(anchor: DateTime<Utc>, period: Period) -> DateTime<Utc> {
    anchor + Duration::days(period.days().unwrap_or(30))
}

fn dominant_role(games: &[NormalizedMatch]) -> Role {
    let mut counts: HashMap<Role, usize> = HashMap::new();
    for m in games {
        *counts.entry(m.role).or_default() += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.label().cmp(a.0.label())))
        .map(|(role, _)| role)
        .unwrap_or(Role::Unknown)
}

#[derive(Debug, Clone, Copy)]
enum FocusArea {
    Farming,
    Vision,
    Positioning,
    Damage,
}

struct FocusContent {
    title: &'static str,
    description: &'static str,
    tips: [&'static str; 3],
}

impl FocusArea {
    fn content(&self) -> FocusContent {
        match self {
            FocusArea::Farming => FocusContent {
                title: "Improve your farming",
                description: "Your CS/min is below par. Farming drives your economic lead.",
                tips: [
                    "Practice last-hitting in a custom game",
                    "Learn minion wave management",
                    "Time your recalls to minimize lost CS",
                ],
            },
            FocusArea::Vision => FocusContent {
                title: "Improve your vision control",
                description: "Your vision score is low. Vision buys crucial information.",
                tips: [
                    "Place more wards in key zones",
                    "Buy more control wards",
                    "Clear enemy wards more often",
                ],
            },
            FocusArea::Positioning => FocusContent {
                title: "Improve your positioning",
                description: "Your KDA points at positioning or decision-making problems.",
                tips: [
                    "Value staying alive over chasing kills",
                    "Improve your teamfight positioning",
                    "Take fewer unnecessary risks",
                ],
            },
            FocusArea::Damage => FocusContent {
                title: "Raise your damage output",
                description: "Your damage per minute is low. You can afford to be more aggressive.",
                tips: [
                    "Look for more trading windows",
                    "Improve your spacing in lane",
                    "Use your power spikes better",
                ],
            },
        }
    }
}
