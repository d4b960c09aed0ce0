use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Queue buckets the engine distinguishes. Anything that is neither ranked
/// nor a normal draft/blind queue lands in `Other` (ARAM, arena, bots...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueType {
    RankedSolo,
    RankedFlex,
    Normal,
    Other,
}

impl QueueType {
    pub fn from_queue_id(queue_id: i32) -> Self {
        match queue_id {
            420 => QueueType::RankedSolo,
            440 => QueueType::RankedFlex,
            400 | 430 | 490 => QueueType::Normal,
            _ => QueueType::Other,
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, QueueType::RankedSolo | QueueType::RankedFlex)
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueueType::RankedSolo => "Ranked Solo/Duo",
            QueueType::RankedFlex => "Ranked Flex",
            QueueType::Normal => "Normal",
            QueueType::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Bottom,
    Support,
    Unknown,
}

impl Role {
    /// Maps Riot's `teamPosition` / `individualPosition` strings.
    pub fn from_position(position: &str) -> Self {
        match position {
            "TOP" => Role::Top,
            "JUNGLE" => Role::Jungle,
            "MIDDLE" | "MID" => Role::Mid,
            "BOTTOM" | "ADC" => Role::Bottom,
            "UTILITY" | "SUPPORT" => Role::Support,
            _ => Role::Unknown,
        }
    }

    /// Farming lanes, where CS benchmarks apply.
    pub fn is_lane(&self) -> bool {
        matches!(self, Role::Top | Role::Mid | Role::Bottom)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Role::Top => "Top",
            Role::Jungle => "Jungle",
            Role::Mid => "Mid",
            Role::Bottom => "Bottom",
            Role::Support => "Support",
            Role::Unknown => "Unknown",
        }
    }
}

/// One player's participation in one game, produced by the normalizer.
/// Immutable once built; everything downstream reads this shape only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMatch {
    pub match_id: String,
    pub played_at: DateTime<Utc>,
    /// Always > 0; the normalizer rejects zero-length records.
    pub duration_secs: u32,
    pub queue: QueueType,
    pub role: Role,
    pub champion_id: i32,
    pub champion_name: String,
    pub win: bool,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    /// Creep score: lane minions plus jungle monsters.
    pub cs: u32,
    pub gold: u32,
    pub damage_to_champions: u32,
    pub vision_score: u32,
    /// Opposing-team champion ids; empty when the export lacks team data.
    pub enemy_champions: Vec<i32>,
}

impl NormalizedMatch {
    pub fn minutes(&self) -> f64 {
        self.duration_secs as f64 / 60.0
    }

    /// Per-match KDA with the deaths divisor floored at 1.
    pub fn kda(&self) -> f64 {
        (self.kills + self.assists) as f64 / self.deaths.max(1) as f64
    }

    pub fn cs_per_min(&self) -> f64 {
        self.per_minute(self.cs)
    }

    pub fn gold_per_min(&self) -> f64 {
        self.per_minute(self.gold)
    }

    pub fn damage_per_min(&self) -> f64 {
        self.per_minute(self.damage_to_champions)
    }

    pub fn vision_per_min(&self) -> f64 {
        self.per_minute(self.vision_score)
    }

    fn per_minute(&self, total: u32) -> f64 {
        let mins = self.minutes();
        if mins <= 0.0 {
            0.0
        } else {
            total as f64 / mins
        }
    }
}
