use league_analytics::analysis::AnalysisEngine;
use league_analytics::cache::ReportCache;
use league_analytics::source::{normalize_history, MatchExport};
use serde_json::{json, Value};
use std::fs;

const ME: &str = "puuid-me-0001";

fn raw_match(idx: usize, win: bool, champion_id: i32, champion_name: &str) -> Value {
    let start_ms = 1_700_000_000_000_i64 + idx as i64 * 3_600_000;
    let me = json!({
        "puuid": ME,
        "championId": champion_id,
        "championName": champion_name,
        "teamId": 100,
        "teamPosition": "MIDDLE",
        "individualPosition": "",
        "win": win,
        "kills": 6,
        "deaths": 4,
        "assists": 7,
        "totalMinionsKilled": 180,
        "neutralMinionsKilled": 12,
        "goldEarned": 11_000,
        "totalDamageDealtToChampions": 19_000,
        "visionScore": 28
    });
    let ally = json!({
        "puuid": "puuid-ally",
        "championId": 64,
        "championName": "Lee Sin",
        "teamId": 100,
        "win": win,
        "kills": 3, "deaths": 5, "assists": 9,
        "totalMinionsKilled": 140, "neutralMinionsKilled": 60,
        "goldEarned": 9_500, "totalDamageDealtToChampions": 14_000,
        "visionScore": 22
    });
    let enemies: Vec<Value> = [238, 202, 111, 22, 76]
        .iter()
        .map(|id| {
            json!({
                "puuid": format!("puuid-enemy-{}", id),
                "championId": id,
                "championName": "",
                "teamId": 200,
                "win": !win,
                "kills": 4, "deaths": 4, "assists": 6,
                "totalMinionsKilled": 150, "neutralMinionsKilled": 20,
                "goldEarned": 10_000, "totalDamageDealtToChampions": 15_000,
                "visionScore": 20
            })
        })
        .collect();

    let mut participants = vec![me, ally];
    participants.extend(enemies);

    json!({
        "metadata": {
            "matchId": format!("EUW1_{:04}", idx),
            "participants": [],
            "dataVersion": "2"
        },
        "info": {
            "gameCreation": start_ms,
            "gameStartTimestamp": start_ms,
            "gameEndTimestamp": start_ms + 1_800_000,
            "gameDuration": 1800,
            "queueId": 420,
            "participants": participants
        }
    })
}

fn write_export(matches: Vec<Value>) -> tempfile::NamedTempFile {
    let export = json!({
        "player": {
            "puuid": ME,
            "gameName": "TestPlayer",
            "tagLine": "EUW"
        },
        "exportedAt": "2024-01-15T12:00:00Z",
        "matches": matches
    });

    let file = tempfile::NamedTempFile::new().unwrap();
    fs::write(file.path(), serde_json::to_string_pretty(&export).unwrap()).unwrap();
    file
}

#[test]
fn export_to_report_end_to_end() {
    let mut raws: Vec<Value> = (0..20).map(|i| raw_match(i, i % 2 == 0, 103, "Ahri")).collect();
    // One malformed record (no match id) and one duplicate.
    let mut broken = raw_match(50, true, 103, "Ahri");
    broken["metadata"]["matchId"] = json!("");
    raws.push(broken);
    raws.push(raw_match(3, false, 103, "Ahri"));

    let file = write_export(raws);
    let export = MatchExport::load(file.path()).unwrap();
    assert_eq!(export.display_name(), "TestPlayer#EUW");

    let history = normalize_history(&export.matches, &export.player.puuid);
    assert_eq!(history.skipped, 1);
    assert_eq!(history.matches.len(), 20);
    assert!(history
        .matches
        .windows(2)
        .all(|w| w[0].played_at <= w[1].played_at));

    let m = &history.matches[0];
    assert_eq!(m.cs, 192);
    assert_eq!(m.queue.label(), "Ranked Solo/Duo");
    assert_eq!(m.enemy_champions.len(), 5);

    let report = AnalysisEngine::default().full_report(&history.matches).unwrap();
    assert_eq!(report.season.games, 20);
    assert_eq!(report.season.win_rate, 50.0);
    assert_eq!(report.anchor, history.matches.last().unwrap().played_at);
    assert_eq!(report.trajectory.points.len(), 20);
    assert!(!report.recommendations.is_empty());
}

#[test]
fn missing_player_is_not_fatal_per_match() {
    // A record whose participants don't include the tracked player is
    // skipped, the rest of the export still analyzes.
    let mut raws: Vec<Value> = (0..10).map(|i| raw_match(i, true, 103, "Ahri")).collect();
    let mut foreign = raw_match(30, true, 103, "Ahri");
    foreign["info"]["participants"][0]["puuid"] = json!("someone-else");
    raws.push(foreign);

    let file = write_export(raws);
    let export = MatchExport::load(file.path()).unwrap();
    let history = normalize_history(&export.matches, &export.player.puuid);
    assert_eq!(history.skipped, 1);
    assert_eq!(history.matches.len(), 10);
}

#[test]
fn empty_puuid_fails_to_load() {
    let export = json!({
        "player": { "puuid": "", "gameName": "X", "tagLine": "Y" },
        "matches": []
    });
    let file = tempfile::NamedTempFile::new().unwrap();
    fs::write(file.path(), export.to_string()).unwrap();

    assert!(MatchExport::load(file.path()).is_err());
}

#[test]
fn cached_report_matches_a_fresh_run() {
    let raws: Vec<Value> = (0..15).map(|i| raw_match(i, i % 3 != 0, 103, "Ahri")).collect();
    let file = write_export(raws);
    let export = MatchExport::load(file.path()).unwrap();
    let history = normalize_history(&export.matches, &export.player.puuid);

    let engine = AnalysisEngine::default();
    let report = engine.full_report(&history.matches).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let cache = ReportCache::at(dir.path());
    let key = ReportCache::key(&export.player.puuid, &history.matches);
    cache.store(&key, &export.display_name(), &report).unwrap();

    let cached = cache.load(&key).unwrap().unwrap();
    let fresh = engine.full_report(&history.matches).unwrap();
    assert_eq!(
        serde_json::to_value(&cached.report).unwrap(),
        serde_json::to_value(&fresh).unwrap()
    );
}

#[test]
fn mastery_runs_off_the_same_pipeline() {
    let mut raws: Vec<Value> = (0..12).map(|i| raw_match(i, i % 2 == 0, 103, "Ahri")).collect();
    raws.extend((12..18).map(|i| raw_match(i, true, 157, "Yasuo")));

    let file = write_export(raws);
    let export = MatchExport::load(file.path()).unwrap();
    let history = normalize_history(&export.matches, &export.player.puuid);

    let engine = AnalysisEngine::default();
    let ahri = engine.champion_mastery(&history.matches, 103).unwrap();
    assert_eq!(ahri.games, 12);
    assert_eq!(ahri.champion_name, "Ahri");

    let yasuo = engine.champion_mastery(&history.matches, 157).unwrap();
    assert_eq!(yasuo.metrics.win_rate, 100.0);

    assert!(engine.champion_mastery(&history.matches, 555).is_err());
}
