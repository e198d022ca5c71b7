// League table: per-team records derived from played matches.
//
// Standings are derived state. `recompute` rebuilds them from the match
// history; `apply_result` is the incremental form of the same computation.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Fixture, Score, TeamId};

pub const POINTS_FOR_WIN: u32 = 3;
pub const POINTS_FOR_DRAW: u32 = 1;

/// A single team's cumulative season record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub team_id: TeamId,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_difference: i32,
    pub points: u32,
}

impl Standing {
    /// A zeroed record for `team_id`.
    pub fn new(team_id: TeamId) -> Self {
        Self {
            team_id,
            ..Default::default()
        }
    }

    /// Whether the derived fields agree with the counters.
    pub fn is_consistent(&self) -> bool {
        self.played == self.won + self.drawn + self.lost
            && i64::from(self.goal_difference)
                == i64::from(self.goals_for) - i64::from(self.goals_against)
            && self.points == POINTS_FOR_WIN * self.won + POINTS_FOR_DRAW * self.drawn
    }

    fn record(&mut self, scored: u32, conceded: u32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;

        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            std::cmp::Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            std::cmp::Ordering::Less => self.lost += 1,
        }

        self.refresh_goal_difference();
    }

    fn unrecord(&mut self, scored: u32, conceded: u32) {
        self.played = self.played.saturating_sub(1);
        self.goals_for = self.goals_for.saturating_sub(scored);
        self.goals_against = self.goals_against.saturating_sub(conceded);

        match scored.cmp(&conceded) {
            std::cmp::Ordering::Greater => {
                self.won = self.won.saturating_sub(1);
                self.points = self.points.saturating_sub(POINTS_FOR_WIN);
            }
            std::cmp::Ordering::Equal => {
                self.drawn = self.drawn.saturating_sub(1);
                self.points = self.points.saturating_sub(POINTS_FOR_DRAW);
            }
            std::cmp::Ordering::Less => self.lost = self.lost.saturating_sub(1),
        }

        self.refresh_goal_difference();
    }

    fn refresh_goal_difference(&mut self) {
        self.goal_difference = self.goals_for as i32 - self.goals_against as i32;
    }
}

/// Order standings by points, then goal difference, then goals scored, all
/// descending. The sort is stable, so remaining ties keep insertion order.
pub fn rank(rows: &mut [Standing]) {
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| b.goal_difference.cmp(&a.goal_difference))
            .then_with(|| b.goals_for.cmp(&a.goals_for))
    });
}

/// All teams' standings, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandingsTable {
    rows: Vec<Standing>,
}

impl StandingsTable {
    /// One zeroed standing per team, discarding anything previous.
    pub fn initialize<I>(team_ids: I) -> Self
    where
        I: IntoIterator<Item = TeamId>,
    {
        Self {
            rows: team_ids.into_iter().map(Standing::new).collect(),
        }
    }

    /// Wrap standings loaded from storage.
    pub fn from_rows(rows: Vec<Standing>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Standing] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Standing> {
        self.rows
    }

    pub fn get(&self, team_id: TeamId) -> Option<&Standing> {
        self.rows.iter().find(|s| s.team_id == team_id)
    }

    /// Fetch a team's standing, creating a zeroed one if the team has none.
    fn entry(&mut self, team_id: TeamId) -> &mut Standing {
        let idx = match self.rows.iter().position(|s| s.team_id == team_id) {
            Some(idx) => idx,
            None => {
                warn!("No standing for team {}; creating a zeroed record", team_id);
                self.rows.push(Standing::new(team_id));
                self.rows.len() - 1
            }
        };
        &mut self.rows[idx]
    }

    /// Add one played result to both teams' records.
    pub fn apply_result(&mut self, home_team_id: TeamId, away_team_id: TeamId, score: Score) {
        self.entry(home_team_id).record(score.home, score.away);
        self.entry(away_team_id).record(score.away, score.home);
    }

    /// Remove one previously applied result. Every counter is floored at
    /// zero, so reverting a result that was never applied cannot go negative.
    pub fn revert_result(&mut self, home_team_id: TeamId, away_team_id: TeamId, score: Score) {
        self.entry(home_team_id).unrecord(score.home, score.away);
        self.entry(away_team_id).unrecord(score.away, score.home);
    }

    /// Apply a fixture if it has been played. Returns whether it was applied.
    pub fn apply_fixture(&mut self, fixture: &Fixture) -> bool {
        match fixture.score {
            Some(score) => {
                self.apply_result(fixture.home_team_id, fixture.away_team_id, score);
                true
            }
            None => false,
        }
    }

    /// Zero every existing record and replay all played fixtures. The
    /// result does not depend on fixture order.
    pub fn recompute<'a, I>(&mut self, fixtures: I)
    where
        I: IntoIterator<Item = &'a Fixture>,
    {
        for row in &mut self.rows {
            *row = Standing::new(row.team_id);
        }
        for fixture in fixtures {
            self.apply_fixture(fixture);
        }
    }

    /// The ranked league table.
    pub fn table(&self) -> Vec<Standing> {
        let mut rows = self.rows.clone();
        rank(&mut rows);
        rows
    }
}
