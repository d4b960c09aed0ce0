use crate::error::AppError;
use crate::model::{NormalizedMatch, QueueType, Role};
use crate::source::models::RawMatch;
use chrono::{DateTime, TimeZone, Utc};

/// Result of normalizing a whole export: chronologically ascending matches
/// plus the count of records that failed validation.
#[derive(Debug)]
pub struct NormalizedHistory {
    pub matches: Vec<NormalizedMatch>,
    pub skipped: usize,
}

/// Validates one raw record and extracts the tracked player's facts.
/// All impossible-value checks live here; downstream code trusts the output.
pub fn normalize_match(raw: &RawMatch, puuid: &str) -> Result<NormalizedMatch, AppError> {
    let match_id = &raw.metadata.match_id;
    if match_id.is_empty() {
        return Err(AppError::MalformedMatch("missing match id".to_string()));
    }

    let me = raw
        .info
        .participants
        .iter()
        .find(|p| p.puuid == puuid)
        .ok_or_else(|| {
            AppError::MalformedMatch(format!("{}: player not among participants", match_id))
        })?;

    let played_at = match_timestamp(raw).ok_or_else(|| {
        AppError::MalformedMatch(format!("{}: missing or invalid timestamp", match_id))
    })?;

    let duration_secs = match_duration_secs(raw);
    if duration_secs <= 0 || duration_secs > i64::from(u32::MAX) {
        return Err(AppError::MalformedMatch(format!(
            "{}: implausible duration {}s",
            match_id, duration_secs
        )));
    }

    let counts = [
        me.kills,
        me.deaths,
        me.assists,
        me.total_minions_killed,
        me.neutral_minions_killed,
        me.gold_earned,
        me.total_damage_dealt_to_champions,
        me.vision_score,
    ];
    if counts.iter().any(|c| *c < 0) {
        return Err(AppError::MalformedMatch(format!(
            "{}: negative stat value",
            match_id
        )));
    }

    let position = if me.team_position.is_empty() {
        &me.individual_position
    } else {
        &me.team_position
    };

    let champion_name = if me.champion_name.is_empty() {
        format!("Champion {}", me.champion_id)
    } else {
        me.champion_name.clone()
    };

    let enemy_champions = raw
        .info
        .participants
        .iter()
        .filter(|p| p.team_id != me.team_id)
        .map(|p| p.champion_id)
        .collect();

    Ok(NormalizedMatch {
        match_id: match_id.clone(),
        played_at,
        duration_secs: duration_secs as u32,
        queue: QueueType::from_queue_id(raw.info.queue_id),
        role: Role::from_position(position),
        champion_id: me.champion_id,
        champion_name,
        win: me.win,
        kills: me.kills as u32,
        deaths: me.deaths as u32,
        assists: me.assists as u32,
        cs: (me.total_minions_killed + me.neutral_minions_killed) as u32,
        gold: me.gold_earned as u32,
        damage_to_champions: me.total_damage_dealt_to_champions as u32,
        vision_score: me.vision_score as u32,
        enemy_champions,
    })
}

/// Normalizes a full export. Malformed records are skipped and counted, not
/// fatal; duplicates collapse to their first occurrence. Output order is
/// ascending by time (ties broken by match id) so the trajectory and
/// pattern preconditions hold without re-sorting downstream.
pub fn normalize_history(raws: &[RawMatch], puuid: &str) -> NormalizedHistory {
    let mut matches: Vec<NormalizedMatch> = Vec::with_capacity(raws.len());
    let mut seen = std::collections::HashSet::new();
    let mut skipped = 0;

    for raw in raws {
        match normalize_match(raw, puuid) {
            Ok(m) => {
                if seen.insert(m.match_id.clone()) {
                    matches.push(m);
                }
            }
            Err(_) => skipped += 1,
        }
    }

    matches.sort_by(|a, b| {
        a.played_at
            .cmp(&b.played_at)
            .then_with(|| a.match_id.cmp(&b.match_id))
    });

    NormalizedHistory { matches, skipped }
}

fn match_timestamp(raw: &RawMatch) -> Option<DateTime<Utc>> {
    let ms = match raw.info.game_start_timestamp {
        Some(start) if start > 0 => start,
        _ if raw.info.game_creation > 0 => raw.info.game_creation,
        _ => return None,
    };
    Utc.timestamp_millis_opt(ms).single()
}

fn match_duration_secs(raw: &RawMatch) -> i64 {
    if let (Some(start), Some(end)) = (raw.info.game_start_timestamp, raw.info.game_end_timestamp)
    {
        if start > 0 && end > start {
            return (end - start) / 1000;
        }
    }
    raw.info.game_duration
}
