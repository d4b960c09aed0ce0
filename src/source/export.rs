use crate::error::AppError;
use crate::source::models::RawMatch;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One exported match history: the tracked player plus their raw matches,
/// as written by the companion exporter tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchExport {
    pub player: ExportPlayer,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    pub matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExportPlayer {
    pub puuid: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(default)]
    pub tag_line: String,
}

impl MatchExport {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::ExportError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let export: MatchExport = serde_json::from_str(&content)
            .map_err(|e| AppError::JsonError(format!("Failed to parse export: {}", e)))?;

        if export.player.puuid.is_empty() {
            return Err(AppError::PlayerNotFound(
                "export has no player puuid".to_string(),
            ));
        }

        Ok(export)
    }

    pub fn display_name(&self) -> String {
        if self.player.game_name.is_empty() {
            let prefix = self.player.puuid.chars().take(8).collect::<String>();
            format!("{}...", prefix)
        } else if self.player.tag_line.is_empty() {
            self.player.game_name.clone()
        } else {
            format!("{}#{}", self.player.game_name, self.player.tag_line)
        }
    }
}
