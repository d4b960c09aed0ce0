use crate::analysis::mastery::ChampionMasteryAnalysis;
use crate::analysis::metrics::{PeriodStats, Trend};
use crate::analysis::recommender::Recommendation;
use crate::analysis::FullReport;
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PeriodRow {
    period: String,
    games: String,
    #[tabled(rename = "W/L")]
    record: String,
    #[tabled(rename = "WR")]
    win_rate: String,
    #[tabled(rename = "KDA")]
    kda: String,
    #[tabled(rename = "CS/min")]
    cs: String,
    score: String,
    trend: String,
}

#[derive(Tabled)]
struct ChampionRow {
    rank: String,
    champion: String,
    games: String,
    #[tabled(rename = "WR")]
    win_rate: String,
    #[tabled(rename = "KDA")]
    kda: String,
    score: String,
}

#[derive(Tabled)]
struct RecommendationRow {
    #[tabled(rename = "#")]
    number: String,
    kind: String,
    title: String,
    #[tabled(rename = "Prio")]
    priority: String,
    #[tabled(rename = "Conf")]
    confidence: String,
    #[tabled(rename = "Expected")]
    expected: String,
}

#[derive(Tabled)]
struct ProgressionRow {
    period: String,
    games: String,
    #[tabled(rename = "WR")]
    win_rate: String,
    #[tabled(rename = "KDA")]
    kda: String,
    score: String,
}

pub fn display_report(report: &FullReport, player_name: &str) {
    println!(
        "\n{}",
        format!("🎮 Performance Report for {}", player_name)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(70).cyan());

    display_rating_section(report);
    display_period_section(report);
    display_trends_section(report);
    display_patterns_section(report);
    display_recommendations(&report.recommendations);
}

fn display_rating_section(report: &FullReport) {
    let t = &report.trajectory;

    println!("{}", "📈 RATING TRAJECTORY".bold().cyan());
    println!(
        "  Current: {} ({})  over {} games",
        t.current_rating.to_string().bold(),
        t.current_rank.to_string().yellow(),
        t.points.len()
    );
    println!(
        "  Range: {}–{}  Volatility: {:.1} ({})  Trend: {}",
        t.range.min,
        t.range.max,
        t.volatility,
        report.volatility.stability.label(),
        colored_trend(t.trend)
    );
    println!(
        "  Confidence: {:.0}%  Risk: {}",
        t.confidence_grade * 100.0,
        report.volatility.risk.label()
    );

    let p = &report.prediction;
    if p.rating_needed > 0 {
        println!(
            "  Next rank: {} — {} games at {:.0}% WR (~{} days)",
            p.target_rank.to_string().yellow(),
            p.games_needed,
            p.win_rate_required * 100.0,
            p.timeline_days
        );
    }

    let c = &report.ceiling;
    println!(
        "  Skill ceiling: {:.0} (now {:.0}, {:+.1}/quarter)",
        c.estimated_ceiling, c.current_level, c.improvement_rate
    );

    for advice in &report.volatility.advice {
        println!("  {} {}", "💡".yellow(), advice);
    }
    println!();
}

fn display_period_section(report: &FullReport) {
    println!("{}", "📊 PERFORMANCE BY PERIOD".bold().cyan());

    let season_row = PeriodRow {
        period: "season".to_string(),
        games: report.season.games.to_string(),
        record: format!("{}W/{}L", report.season.wins, report.season.losses),
        win_rate: format!("{:.1}%", report.season.win_rate),
        kda: format!("{:.2}", report.season.avg_kda),
        cs: format!("{:.1}", report.season.cs_per_min),
        score: format!("{:.0}", report.season.performance_score),
        trend: report.season.trend.label().to_string(),
    };
    let rows = vec![
        period_row(&report.week),
        period_row(&report.month),
        season_row,
    ];

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    let champions = &report.month.top_champions;
    if !champions.is_empty() {
        println!("\n{}", "🏆 Top champions (last 30 days)".bold());
        let rows: Vec<ChampionRow> = champions
            .iter()
            .enumerate()
            .map(|(idx, c)| ChampionRow {
                rank: format!("#{}", idx + 1),
                champion: c.champion_name.clone(),
                games: c.games.to_string(),
                win_rate: format!("{:.1}%", c.win_rate),
                kda: format!("{:.2}", c.avg_kda),
                score: format!("{:.0}", c.performance_score),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
    }

    for suggestion in report.week.suggestions.iter().chain(&report.month.suggestions) {
        println!("  {} {}", "💡".yellow(), suggestion);
    }
    println!();
}

fn display_trends_section(report: &FullReport) {
    println!("{}", "📉 TRENDS".bold().cyan());
    println!(
        "  Improvement velocity (week vs month): {:+.1}",
        report.trends.improvement_velocity
    );
    println!("  Consistency: {:.0}/100", report.trends.consistency);
    if let Some(peak) = &report.trends.peak {
        println!(
            "  Peak window: games {}–{} at {:.1}% WR",
            peak.start_game, peak.end_game, peak.win_rate
        );
    }
    println!();
}

fn display_patterns_section(report: &FullReport) {
    if report.patterns.is_empty() {
        return;
    }

    println!("{}", "🔍 DETECTED PATTERNS".bold().cyan());
    for pattern in &report.patterns {
        let marker = if pattern.is_ongoing() {
            "●".red().to_string()
        } else {
            "○".normal().to_string()
        };
        println!(
            "  {} {} ({:.0}% confidence)",
            marker,
            pattern.description,
            pattern.confidence * 100.0
        );
    }
    println!();
}

pub fn display_recommendations(recommendations: &[Recommendation]) {
    println!("{}", "🎯 RECOMMENDATIONS".bold().cyan());

    if recommendations.is_empty() {
        println!(
            "{}",
            "No recommendations available (not enough data)\n".yellow()
        );
        return;
    }

    let rows: Vec<RecommendationRow> = recommendations
        .iter()
        .enumerate()
        .map(|(idx, rec)| RecommendationRow {
            number: format!("{}", idx + 1),
            kind: rec.kind.label().to_string(),
            title: rec.title.clone(),
            priority: rec.priority.to_string(),
            confidence: format!("{:.0}%", rec.confidence * 100.0),
            expected: rec.expected_improvement.clone(),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);

    if let Some(top) = recommendations.first() {
        println!("\n{}", "Top Priority".bold().red());
        println!("  {}", top.description);
        for item in &top.action_items {
            println!("  • {}", item);
        }
    }
    println!();
}

pub fn display_mastery(analysis: &ChampionMasteryAnalysis) {
    println!(
        "\n{}",
        format!("⚔️  Champion Mastery: {}", analysis.champion_name)
            .bold()
            .cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    let m = &analysis.metrics;
    println!(
        "  {} games, {:.1}% WR, {:.2} KDA, score {:.0}",
        analysis.games, m.win_rate, m.avg_kda, m.performance_score
    );
    println!(
        "  Mastery score: {}",
        format!("{:.0}/100", analysis.mastery_score).bold()
    );
    println!(
        "  Best game: {} ({}, score {:.0})",
        analysis.best_game.match_id, analysis.best_game.kda_line, analysis.best_game.score
    );
    println!(
        "  Worst game: {} ({}, score {:.0})",
        analysis.worst_game.match_id, analysis.worst_game.kda_line, analysis.worst_game.score
    );

    let progression = &analysis.progression;
    if !progression.periods.is_empty() {
        println!("\n{}", "Progression".bold().yellow());
        let rows: Vec<ProgressionRow> = progression
            .periods
            .iter()
            .map(|p| ProgressionRow {
                period: format!("Q{}", p.period),
                games: p.games.to_string(),
                win_rate: format!("{:.1}%", p.win_rate),
                kda: format!("{:.2}", p.avg_kda),
                score: format!("{:.0}", p.performance_score),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{}", table);
        println!("  Overall: {}", colored_trend(progression.trend));
    }

    if !analysis.suggestions.is_empty() {
        println!("\n{}", "Suggestions".bold().yellow());
        for suggestion in &analysis.suggestions {
            println!("  • {}", suggestion);
        }
    }
    println!();
}

fn period_row(stats: &PeriodStats) -> PeriodRow {
    PeriodRow {
        period: stats.period.label().to_string(),
        games: stats.metrics.games.to_string(),
        record: format!("{}W/{}L", stats.metrics.wins, stats.metrics.losses),
        win_rate: format!("{:.1}%", stats.metrics.win_rate),
        kda: format!("{:.2}", stats.metrics.avg_kda),
        cs: format!("{:.1}", stats.metrics.cs_per_min),
        score: format!("{:.0}", stats.metrics.performance_score),
        trend: stats.metrics.trend.label().to_string(),
    }
}

fn colored_trend(trend: Trend) -> String {
    match trend {
        Trend::Improving => trend.label().green().to_string(),
        Trend::Declining => trend.label().red().to_string(),
        Trend::Stable => trend.label().normal().to_string(),
    }
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}
