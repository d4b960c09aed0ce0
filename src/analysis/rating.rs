use crate::config::RatingConfig;
use crate::model::NormalizedMatch;
use serde::{Deserialize, Serialize};

// Per-stat caps on the performance modifier. A dominant game can move the
// modifier by at most 20+10+10+5 before the overall clamp.
const KDA_POINTS_PER_UNIT: f64 = 10.0;
const KDA_CAP: f64 = 20.0;
const CS_BASELINE: f64 = 5.0;
const CS_CAP: f64 = 10.0;
const DAMAGE_DIVISOR: f64 = 100.0;
const DAMAGE_CAP: f64 = 10.0;
const VISION_FACTOR: f64 = 2.5;
const VISION_CAP: f64 = 5.0;

// Confidence model.
const CONFIDENCE_BASE: f64 = 0.5;
const CONFIDENCE_TEAM_DATA: f64 = 0.2;
const CONFIDENCE_FULL_GAME: f64 = 0.2;
const CONFIDENCE_RANKED: f64 = 0.1;
const FULL_GAME_SECS: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingEstimate {
    /// Performance modifier plus win/loss swing; not yet clamped to the
    /// trajectory's ±50 (that happens when folding, not here).
    pub delta: i32,
    pub absolute: i32,
    pub confidence: f64,
}

pub struct RatingEstimator<'a> {
    cfg: &'a RatingConfig,
}

impl<'a> RatingEstimator<'a> {
    pub fn new(cfg: &'a RatingConfig) -> Self {
        RatingEstimator { cfg }
    }

    pub fn estimate(&self, m: &NormalizedMatch) -> RatingEstimate {
        let base = self.base_rating(m);
        let modifier = self.performance_modifier(m);
        let win_delta = if m.win {
            self.cfg.win_delta
        } else {
            -self.cfg.win_delta
        };

        let delta = win_delta + modifier.round() as i32;

        RatingEstimate {
            delta,
            absolute: base + delta,
            confidence: self.confidence(m),
        }
    }

    fn base_rating(&self, m: &NormalizedMatch) -> i32 {
        use crate::model::QueueType::*;
        match m.queue {
            RankedSolo => self.cfg.base_solo,
            RankedFlex => self.cfg.base_flex,
            Normal | Other => self.cfg.base_other,
        }
    }

    /// How far above or below par the game itself was, independent of the
    /// result. Individual parts are capped, then the sum is clamped.
    fn performance_modifier(&self, m: &NormalizedMatch) -> f64 {
        let kda_part = ((m.kda() - 1.0) * KDA_POINTS_PER_UNIT).min(KDA_CAP);
        let cs_part = (m.cs_per_min() - CS_BASELINE).min(CS_CAP);
        let damage_part = (m.damage_per_min() / DAMAGE_DIVISOR).min(DAMAGE_CAP);
        let vision_part = (m.vision_per_min() * VISION_FACTOR).min(VISION_CAP);

        (kda_part + cs_part + damage_part + vision_part)
            .clamp(-self.cfg.modifier_clamp, self.cfg.modifier_clamp)
    }

    fn confidence(&self, m: &NormalizedMatch) -> f64 {
        let mut confidence = CONFIDENCE_BASE;
        if !m.enemy_champions.is_empty() {
            confidence += CONFIDENCE_TEAM_DATA;
        }
        if m.duration_secs > FULL_GAME_SECS {
            confidence += CONFIDENCE_FULL_GAME;
        }
        if m.queue.is_ranked() {
            confidence += CONFIDENCE_RANKED;
        }
        confidence.min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{QueueType, Role};
    use chrono::{TimeZone, Utc};

    fn stub_match(win: bool) -> NormalizedMatch {
        NormalizedMatch {
            match_id: "M1".to_string(),
            played_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            duration_secs: 1800,
            queue: QueueType::RankedSolo,
            role: Role::Mid,
            champion_id: 103,
            champion_name: "Ahri".to_string(),
            win,
            kills: 6,
            deaths: 3,
            assists: 6,
            cs: 180,
            gold: 11_000,
            damage_to_champions: 18_000,
            vision_score: 24,
            enemy_champions: vec![238, 202, 64, 111, 22],
        }
    }

    #[test]
    fn win_and_loss_swing_the_delta() {
        let cfg = RatingConfig::default();
        let estimator = RatingEstimator::new(&cfg);

        let win = estimator.estimate(&stub_match(true));
        let loss = estimator.estimate(&stub_match(false));

        assert!(win.delta > 0);
        assert!(loss.delta < win.delta);
        // Same game, same performance: only the win/loss part differs.
        assert_eq!(win.delta - loss.delta, 2 * cfg.win_delta);
    }

    #[test]
    fn modifier_is_clamped_both_ways() {
        let cfg = RatingConfig::default();
        let estimator = RatingEstimator::new(&cfg);

        let mut smurf = stub_match(true);
        smurf.kills = 25;
        smurf.deaths = 0;
        smurf.assists = 20;
        smurf.cs = 450;
        smurf.damage_to_champions = 60_000;
        smurf.vision_score = 90;
        let high = estimator.estimate(&smurf);
        assert_eq!(high.delta, cfg.win_delta + cfg.modifier_clamp as i32);

        let mut inting = stub_match(false);
        inting.kills = 0;
        inting.deaths = 15;
        inting.assists = 0;
        inting.cs = 30;
        inting.damage_to_champions = 2_000;
        inting.vision_score = 3;
        let low = estimator.estimate(&inting);
        assert!(low.delta >= -cfg.win_delta - cfg.modifier_clamp as i32);
        assert!(low.delta < 0);
    }

    #[test]
    fn base_rating_follows_queue() {
        let cfg = RatingConfig::default();
        let estimator = RatingEstimator::new(&cfg);

        let solo = stub_match(true);
        let mut flex = stub_match(true);
        flex.queue = QueueType::RankedFlex;
        let mut normal = stub_match(true);
        normal.queue = QueueType::Normal;

        let solo_abs = estimator.estimate(&solo).absolute;
        let flex_abs = estimator.estimate(&flex).absolute;
        let normal_abs = estimator.estimate(&normal).absolute;

        assert_eq!(solo_abs - flex_abs, cfg.base_solo - cfg.base_flex);
        assert_eq!(flex_abs - normal_abs, cfg.base_flex - cfg.base_other);
    }

    #[test]
    fn confidence_accumulates_and_caps() {
        let cfg = RatingConfig::default();
        let estimator = RatingEstimator::new(&cfg);

        // Ranked, long game, with team data: every bonus applies.
        let full = estimator.estimate(&stub_match(true));
        assert!((full.confidence - 1.0).abs() < 1e-9);

        let mut bare = stub_match(true);
        bare.queue = QueueType::Normal;
        bare.duration_secs = 900;
        bare.enemy_champions.clear();
        let minimal = estimator.estimate(&bare);
        assert_eq!(minimal.confidence, 0.5);
    }
}
