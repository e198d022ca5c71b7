// Championship probability estimates.
//
// A simple heuristic, not a calibrated model: each team's remaining fixtures
// are turned into expected points, the projected totals are placed within the
// current points spread, squared, and normalized to sum to 100.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LeagueError, Result};
use crate::models::{Fixture, Team, TeamId};
use crate::simulation::MatchModel;
use crate::standings::Standing;

/// First week for which predictions are produced.
pub const DEFAULT_PREDICTIONS_FROM_WEEK: u32 = 4;

/// Partial credit for the non-win complement of a fixture.
const NON_WIN_CREDIT: f64 = 0.5;

/// One team's championship estimate for a given week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub team_id: TeamId,
    pub team_name: String,
    pub week: u32,
    pub current_points: u32,
    pub projected_points: f64,
    /// Percentage in 0..=100.
    pub probability: f64,
}

/// Result of a prediction request. Asking too early is a normal state, not
/// an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Available { predictions: Vec<Prediction> },
    NotYetAvailable { current_week: u32, available_from: u32 },
}

impl PredictionOutcome {
    pub fn predictions(&self) -> Option<&[Prediction]> {
        match self {
            PredictionOutcome::Available { predictions } => Some(predictions),
            PredictionOutcome::NotYetAvailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, PredictionOutcome::Available { .. })
    }
}

/// Everything the estimator reads: the full team list, current standings,
/// and every fixture of the season (played and unplayed).
#[derive(Debug, Clone, Copy)]
pub struct PredictionInput<'a> {
    pub current_week: u32,
    pub teams: &'a [Team],
    pub standings: &'a [Standing],
    pub fixtures: &'a [Fixture],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionEngine {
    model: MatchModel,
    available_from: u32,
}

impl Default for PredictionEngine {
    fn default() -> Self {
        Self::new(MatchModel::default(), DEFAULT_PREDICTIONS_FROM_WEEK)
    }
}

impl PredictionEngine {
    pub fn new(model: MatchModel, available_from: u32) -> Self {
        Self {
            model,
            available_from,
        }
    }

    pub fn available_from(&self) -> u32 {
        self.available_from
    }

    /// Estimate every team's probability of finishing first, sorted by
    /// probability descending.
    pub fn predict(&self, input: PredictionInput<'_>) -> Result<PredictionOutcome> {
        if input.current_week < self.available_from {
            return Ok(PredictionOutcome::NotYetAvailable {
                current_week: input.current_week,
                available_from: self.available_from,
            });
        }

        // Current standings ordered by points only; the first row is the leader.
        let mut by_points: Vec<&Standing> = input.standings.iter().collect();
        by_points.sort_by(|a, b| b.points.cmp(&a.points));

        let points_of = |team_id: TeamId| {
            input
                .standings
                .iter()
                .find(|s| s.team_id == team_id)
                .map_or(0, |s| s.points)
        };

        let played = input.fixtures.iter().filter(|f| f.is_played()).count();
        let season_complete = !input.fixtures.is_empty() && played == input.fixtures.len();

        let mut predictions = if season_complete {
            let leader = by_points.first().map(|s| s.team_id);
            input
                .teams
                .iter()
                .map(|team| {
                    let current_points = points_of(team.id);
                    Prediction {
                        team_id: team.id,
                        team_name: team.name.clone(),
                        week: input.current_week,
                        current_points,
                        projected_points: f64::from(current_points),
                        probability: if Some(team.id) == leader { 100.0 } else { 0.0 },
                    }
                })
                .collect()
        } else {
            let top = by_points.first().map_or(0, |s| s.points);
            let bottom = by_points.last().map_or(0, |s| s.points);
            let powers: HashMap<TeamId, u32> =
                input.teams.iter().map(|t| (t.id, t.power)).collect();

            let mut predictions = Vec::with_capacity(input.teams.len());
            for team in input.teams {
                let current_points = points_of(team.id);
                let expected = self.expected_points(team, input.fixtures, &powers)?;
                let projected = f64::from(current_points) + expected;
                let raw = championship_score(projected, bottom, top);

                predictions.push(Prediction {
                    team_id: team.id,
                    team_name: team.name.clone(),
                    week: input.current_week,
                    current_points,
                    projected_points: round_to(projected, 1),
                    probability: round_to(raw, 2),
                });
            }
            normalize(&mut predictions);
            predictions
        };

        predictions.sort_by(|a, b| {
            b.probability
                .partial_cmp(&a.probability)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(
            "Computed {} predictions for week {} (season complete: {})",
            predictions.len(),
            input.current_week,
            season_complete
        );

        Ok(PredictionOutcome::Available { predictions })
    }

    /// Sum of expected points over the team's unplayed fixtures.
    fn expected_points(
        &self,
        team: &Team,
        fixtures: &[Fixture],
        powers: &HashMap<TeamId, u32>,
    ) -> Result<f64> {
        let mut expected = 0.0;
        for fixture in fixtures.iter().filter(|f| !f.is_played()) {
            let Some((opponent_id, is_home)) = fixture.opponent_of(team.id) else {
                continue;
            };
            let opponent_power = *powers
                .get(&opponent_id)
                .ok_or(LeagueError::TeamNotFound { id: opponent_id })?;
            let win = self.model.win_probability(team.power, opponent_power, is_home);
            expected += win * 3.0 + (1.0 - win) * NON_WIN_CREDIT;
        }
        Ok(expected)
    }
}

/// Raw championship score in 0..=100-ish: the team's projected points placed
/// within the current (not projected) points spread, squared.
///
/// Teams projected above the current leader can exceed 100 before
/// normalization.
pub fn championship_score(projected_points: f64, bottom_points: u32, top_points: u32) -> f64 {
    let range = top_points.saturating_sub(bottom_points).max(1);
    let relative = (projected_points - f64::from(bottom_points)) / f64::from(range);
    relative.powi(2) * 100.0
}

/// Rescale probabilities to sum to 100, or split evenly when they sum to 0.
fn normalize(predictions: &mut [Prediction]) {
    if predictions.is_empty() {
        return;
    }
    let total: f64 = predictions.iter().map(|p| p.probability).sum();
    if total > 0.0 {
        for p in predictions.iter_mut() {
            p.probability = round_to(p.probability / total * 100.0, 2);
        }
    } else {
        let share = round_to(100.0 / predictions.len() as f64, 2);
        for p in predictions.iter_mut() {
            p.probability = share;
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Score;

    fn team(id: TeamId, name: &str, power: u32) -> Team {
        Team {
            id,
            name: name.into(),
            power,
            logo: None,
        }
    }

    fn teams() -> Vec<Team> {
        vec![
            team(1, "Chelsea", 90),
            team(2, "Arsenal", 85),
            team(3, "Manchester City", 88),
            team(4, "Liverpool", 82),
        ]
    }

    fn standing(team_id: TeamId, points: u32) -> Standing {
        Standing {
            team_id,
            points,
            ..Default::default()
        }
    }

    fn fixture(id: i64, home: TeamId, away: TeamId, week: u32, score: Option<(u32, u32)>) -> Fixture {
        Fixture {
            id,
            home_team_id: home,
            away_team_id: away,
            week,
            score: score.map(|(h, a)| Score::new(h, a)),
        }
    }

    fn sum(predictions: &[Prediction]) -> f64 {
        predictions.iter().map(|p| p.probability).sum()
    }

    #[test]
    fn not_available_before_threshold() {
        let engine = PredictionEngine::default();
        let teams = teams();
        for week in 0..DEFAULT_PREDICTIONS_FROM_WEEK {
            let outcome = engine
                .predict(PredictionInput {
                    current_week: week,
                    teams: &teams,
                    standings: &[],
                    fixtures: &[],
                })
                .unwrap();
            assert_eq!(
                outcome,
                PredictionOutcome::NotYetAvailable {
                    current_week: week,
                    available_from: DEFAULT_PREDICTIONS_FROM_WEEK
                }
            );
            assert!(outcome.predictions().is_none());
        }
    }

    #[test]
    fn incomplete_season_sums_to_hundred() {
        let engine = PredictionEngine::default();
        let teams = teams();
        let standings = vec![standing(1, 9), standing(2, 6), standing(3, 4), standing(4, 1)];
        let fixtures = vec![
            fixture(1, 1, 2, 5, None),
            fixture(2, 3, 4, 5, None),
            fixture(3, 2, 3, 6, None),
            fixture(4, 4, 1, 6, None),
            fixture(5, 1, 3, 1, Some((1, 0))),
        ];

        let outcome = engine
            .predict(PredictionInput {
                current_week: 4,
                teams: &teams,
                standings: &standings,
                fixtures: &fixtures,
            })
            .unwrap();
        let predictions = outcome.predictions().unwrap();

        assert_eq!(predictions.len(), 4);
        assert!((sum(predictions) - 100.0).abs() <= 0.5);
        assert!(predictions.windows(2).all(|w| w[0].probability >= w[1].probability));
        assert_eq!(predictions[0].team_id, 1);
        assert!(predictions.iter().all(|p| p.week == 4));
    }

    #[test]
    fn expected_points_use_home_bonus() {
        let engine = PredictionEngine::default();
        let teams = teams();
        let standings = vec![standing(1, 3), standing(2, 0), standing(3, 0), standing(4, 0)];
        let fixtures = vec![fixture(1, 1, 2, 5, None), fixture(2, 3, 4, 5, Some((0, 0)))];

        let outcome = engine
            .predict(PredictionInput {
                current_week: 5,
                teams: &teams,
                standings: &standings,
                fixtures: &fixtures,
            })
            .unwrap();
        let predictions = outcome.predictions().unwrap();
        let chelsea = predictions.iter().find(|p| p.team_id == 1).unwrap();

        // Home: 95 / (95 + 85); expected = w * 3 + (1 - w) * 0.5.
        let w = 95.0 / 180.0;
        let expected = 3.0 + w * 3.0 + (1.0 - w) * 0.5;
        assert_eq!(chelsea.projected_points, round_to(expected, 1));
        assert_eq!(chelsea.current_points, 3);

        // Teams with no remaining fixture keep their current points.
        let city = predictions.iter().find(|p| p.team_id == 3).unwrap();
        assert_eq!(city.projected_points, 0.0);
    }

    #[test]
    fn raw_score_is_anchored_to_current_spread() {
        // Bottom 2, top 10: projected 6 sits halfway, squared to a quarter.
        assert!((championship_score(6.0, 2, 10) - 25.0).abs() < 1e-9);
        assert!((championship_score(10.0, 2, 10) - 100.0).abs() < 1e-9);
        assert_eq!(championship_score(2.0, 2, 10), 0.0);
        // Projections beyond the current leader exceed 100 before normalization.
        assert!(championship_score(14.0, 2, 10) > 100.0);
        // A flat table uses a range of 1.
        assert!((championship_score(3.0, 2, 2) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn complete_season_gives_leader_everything() {
        let engine = PredictionEngine::default();
        let teams = teams();
        let standings = vec![standing(1, 7), standing(2, 12), standing(3, 9), standing(4, 4)];
        let fixtures = vec![
            fixture(1, 1, 2, 1, Some((0, 1))),
            fixture(2, 3, 4, 1, Some((2, 2))),
        ];

        let outcome = engine
            .predict(PredictionInput {
                current_week: 6,
                teams: &teams,
                standings: &standings,
                fixtures: &fixtures,
            })
            .unwrap();
        let predictions = outcome.predictions().unwrap();

        assert_eq!(predictions[0].team_id, 2);
        assert_eq!(predictions[0].probability, 100.0);
        assert_eq!(predictions[0].projected_points, 12.0);
        assert!(predictions[1..].iter().all(|p| p.probability == 0.0));
    }

    #[test]
    fn zero_sum_falls_back_to_equal_shares() {
        let mut predictions: Vec<Prediction> = teams()
            .into_iter()
            .map(|t| Prediction {
                team_id: t.id,
                team_name: t.name,
                week: 4,
                current_points: 0,
                projected_points: 0.0,
                probability: 0.0,
            })
            .collect();
        normalize(&mut predictions);
        assert!(predictions.iter().all(|p| p.probability == 25.0));
    }

    #[test]
    fn level_table_with_nothing_left_splits_evenly() {
        let engine = PredictionEngine::default();
        let teams = teams();
        let standings = vec![standing(1, 4), standing(2, 4), standing(3, 4), standing(4, 4)];
        // These teams are done, but a postponed match elsewhere keeps the
        // season open.
        let fixtures = vec![
            fixture(1, 1, 2, 1, Some((1, 1))),
            fixture(2, 3, 4, 1, Some((0, 0))),
            fixture(3, 5, 6, 4, None),
        ];

        let outcome = engine
            .predict(PredictionInput {
                current_week: 4,
                teams: &teams,
                standings: &standings,
                fixtures: &fixtures,
            })
            .unwrap();
        let predictions = outcome.predictions().unwrap();

        assert_eq!(predictions.len(), 4);
        assert!(predictions.iter().all(|p| p.projected_points == 4.0));
        assert!(predictions.iter().all(|p| p.probability == 25.0));
    }

    #[test]
    fn unknown_opponent_is_reported() {
        let engine = PredictionEngine::default();
        let teams = teams();
        let standings = vec![standing(1, 0)];
        let fixtures = vec![fixture(1, 1, 99, 5, None)];

        let err = engine
            .predict(PredictionInput {
                current_week: 5,
                teams: &teams,
                standings: &standings,
                fixtures: &fixtures,
            })
            .unwrap_err();
        assert!(matches!(err, LeagueError::TeamNotFound { id: 99 }));
    }

    #[test]
    fn custom_threshold() {
        let engine = PredictionEngine::new(MatchModel::default(), 2);
        let teams = teams();
        let standings: Vec<Standing> = teams.iter().map(|t| standing(t.id, 0)).collect();
        let fixtures = vec![fixture(1, 1, 2, 3, None)];
        let outcome = engine
            .predict(PredictionInput {
                current_week: 2,
                teams: &teams,
                standings: &standings,
                fixtures: &fixtures,
            })
            .unwrap();
        assert!(outcome.is_available());
    }
}
