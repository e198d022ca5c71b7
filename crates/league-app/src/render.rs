// Text and JSON rendering for command output.

use std::collections::HashMap;

use anyhow::Context;
use serde::Serialize;

use league_core::models::week_label;
use league_core::{
    Fixture, FixtureId, MatchResult, Prediction, PredictionOutcome, SeasonProgress, Standing,
    Team, TeamId,
};

/// Team id to display name lookup.
pub struct Names(HashMap<TeamId, String>);

impl Names {
    pub fn new(teams: &[Team]) -> Self {
        Self(teams.iter().map(|t| (t.id, t.name.clone())).collect())
    }

    pub fn get(&self, id: TeamId) -> &str {
        self.0.get(&id).map_or("?", String::as_str)
    }
}

#[derive(Debug, Serialize)]
pub struct TableRow<'a> {
    pub position: usize,
    pub team: &'a str,
    #[serde(flatten)]
    pub standing: &'a Standing,
}

pub fn table_rows<'a>(table: &'a [Standing], names: &'a Names) -> Vec<TableRow<'a>> {
    table
        .iter()
        .enumerate()
        .map(|(i, standing)| TableRow {
            position: i + 1,
            team: names.get(standing.team_id),
            standing,
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct FixtureRow<'a> {
    pub id: FixtureId,
    pub week: u32,
    pub home_team: &'a str,
    pub away_team: &'a str,
    pub played: bool,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    /// `home_win`, `draw` or `away_win` once played.
    pub outcome: Option<&'static str>,
}

pub fn fixture_rows<'a>(fixtures: &'a [Fixture], names: &'a Names) -> Vec<FixtureRow<'a>> {
    fixtures
        .iter()
        .map(|f| FixtureRow {
            id: f.id,
            week: f.week,
            home_team: names.get(f.home_team_id),
            away_team: names.get(f.away_team_id),
            played: f.is_played(),
            home_score: f.home_score(),
            away_score: f.away_score(),
            outcome: f.score.map(|score| score.outcome().label()),
        })
        .collect()
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{text}");
    Ok(())
}

pub fn print_teams(teams: &[Team]) {
    println!("{:>4}  {:<20} {:>5}", "ID", "Team", "Power");
    for t in teams {
        println!("{:>4}  {:<20} {:>5}", t.id, t.name, t.power);
    }
}

pub fn print_table(rows: &[TableRow<'_>]) {
    println!(
        "{:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>4} {:>4}",
        "#", "Team", "P", "W", "D", "L", "GF", "GA", "GD", "Pts"
    );
    for row in rows {
        let s = row.standing;
        println!(
            "{:>3}  {:<20} {:>3} {:>3} {:>3} {:>3} {:>4} {:>4} {:>+4} {:>4}",
            row.position,
            row.team,
            s.played,
            s.won,
            s.drawn,
            s.lost,
            s.goals_for,
            s.goals_against,
            s.goal_difference,
            s.points
        );
    }
}

pub fn print_fixtures(rows: &[FixtureRow<'_>]) {
    let mut current_week = None;
    for row in rows {
        if current_week != Some(row.week) {
            if current_week.is_some() {
                println!();
            }
            println!("{}", week_label(row.week));
            current_week = Some(row.week);
        }
        let score = match (row.home_score, row.away_score) {
            (Some(h), Some(a)) => format!("{h} - {a}"),
            _ => "vs".to_string(),
        };
        println!(
            "  [{:>3}] {:>20} {:^7} {}",
            row.id, row.home_team, score, row.away_team
        );
    }
}

pub fn print_results(label: &str, results: &[MatchResult]) {
    println!("{label}");
    if results.is_empty() {
        println!("  (no matches played)");
    }
    for r in results {
        println!("  [{:>3}] {r}", r.match_id);
    }
}

pub fn print_predictions(predictions: &[Prediction]) {
    println!("{:<20} {:>7} {:>9} {:>8}", "Team", "Points", "Projected", "Chance");
    for p in predictions {
        println!(
            "{:<20} {:>7} {:>9.1} {:>7.2}%",
            p.team_name, p.current_points, p.projected_points, p.probability
        );
    }
}

pub fn print_outcome(outcome: &PredictionOutcome) {
    match outcome {
        PredictionOutcome::Available { predictions } => print_predictions(predictions),
        PredictionOutcome::NotYetAvailable {
            current_week: 0,
            available_from,
        } => println!(
            "No games played yet. Predictions are available from week {available_from}"
        ),
        PredictionOutcome::NotYetAvailable {
            current_week,
            available_from,
        } => println!(
            "Predictions are available from week {available_from}. Current week: {current_week}"
        ),
    }
}

pub fn print_progress(progress: &SeasonProgress) {
    let show = |week: Option<u32>| week.map_or_else(|| "-".to_string(), |w| w.to_string());
    println!("Last played week: {}", show(progress.last_played_week));
    println!("Next week:        {}", show(progress.next_week));
    println!("Total weeks:      {}", progress.total_weeks);
    if progress.is_complete() {
        println!("Season complete.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_core::Score;

    fn team(id: TeamId, name: &str) -> Team {
        Team {
            id,
            name: name.into(),
            power: 80,
            logo: None,
        }
    }

    #[test]
    fn fixture_rows_label_played_outcomes() {
        let names = Names::new(&[team(1, "Chelsea"), team(2, "Arsenal")]);
        let fixtures = vec![
            Fixture {
                id: 1,
                home_team_id: 1,
                away_team_id: 2,
                week: 1,
                score: Some(Score::new(0, 2)),
            },
            Fixture {
                id: 2,
                home_team_id: 2,
                away_team_id: 1,
                week: 4,
                score: None,
            },
        ];

        let rows = fixture_rows(&fixtures, &names);
        assert_eq!(rows[0].outcome, Some("away_win"));
        assert_eq!(rows[0].home_team, "Chelsea");
        assert_eq!(rows[1].outcome, None);
        assert!(!rows[1].played);

        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(json["outcome"], "away_win");
        assert_eq!(json["away_team"], "Arsenal");
    }

    #[test]
    fn unknown_team_renders_placeholder() {
        let names = Names::new(&[]);
        assert_eq!(names.get(9), "?");
    }
}
