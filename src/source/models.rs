use serde::Deserialize;

// Match V5 payload as stored by the exporter.

#[derive(Debug, Deserialize, Clone)]
pub struct RawMatch {
    pub metadata: RawMetadata,
    pub info: RawInfo,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    pub match_id: String,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub data_version: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawInfo {
    /// Milliseconds since epoch.
    #[serde(default)]
    pub game_creation: i64,
    /// More reliable than `game_creation` when present (also ms).
    #[serde(default)]
    pub game_start_timestamp: Option<i64>,
    #[serde(default)]
    pub game_end_timestamp: Option<i64>,
    /// Seconds.
    #[serde(default)]
    pub game_duration: i64,
    #[serde(default)]
    pub queue_id: i32,
    pub participants: Vec<RawParticipant>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RawParticipant {
    pub puuid: String,
    #[serde(default)]
    pub champion_id: i32,
    #[serde(default)]
    pub champion_name: String,
    pub team_id: i32,
    #[serde(default)]
    pub team_position: String,
    #[serde(default)]
    pub individual_position: String,
    pub win: bool,
    #[serde(default)]
    pub kills: i32,
    #[serde(default)]
    pub deaths: i32,
    #[serde(default)]
    pub assists: i32,
    #[serde(default)]
    pub total_minions_killed: i32,
    #[serde(default)]
    pub neutral_minions_killed: i32,
    #[serde(default)]
    pub gold_earned: i32,
    #[serde(default)]
    pub total_damage_dealt_to_champions: i32,
    #[serde(default)]
    pub vision_score: i32,
}
