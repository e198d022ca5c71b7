// Plain league records: teams, fixtures, scores and outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type TeamId = i64;
pub type FixtureId = i64;

/// A club taking part in the league.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    /// Strength rating, conventionally 1-100.
    pub power: u32,
    /// Optional logo reference (URL or asset path).
    #[serde(default)]
    pub logo: Option<String>,
}

/// Result class of a match, seen from the home side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    HomeWin,
    Draw,
    AwayWin,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::HomeWin => "home_win",
            Outcome::Draw => "draw",
            Outcome::AwayWin => "away_win",
        }
    }
}

/// Final score of a played match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    /// Build a score from separately stored halves. A score exists only when
    /// both sides are present; anything else means the match is unplayed.
    pub fn from_parts(home: Option<u32>, away: Option<u32>) -> Option<Self> {
        match (home, away) {
            (Some(home), Some(away)) => Some(Self { home, away }),
            _ => None,
        }
    }

    pub fn outcome(&self) -> Outcome {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Outcome::HomeWin,
            std::cmp::Ordering::Equal => Outcome::Draw,
            std::cmp::Ordering::Less => Outcome::AwayWin,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.home, self.away)
    }
}

/// A fixture produced by the scheduler, before the store assigns it an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScheduledFixture {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub week: u32,
}

/// A scheduled match. Teams and week never change once stored; only the
/// score is updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub week: u32,
    pub score: Option<Score>,
}

impl Fixture {
    pub fn is_played(&self) -> bool {
        self.score.is_some()
    }

    pub fn home_score(&self) -> Option<u32> {
        self.score.map(|s| s.home)
    }

    pub fn away_score(&self) -> Option<u32> {
        self.score.map(|s| s.away)
    }

    pub fn involves(&self, team_id: TeamId) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// The other side of this fixture for `team_id`, together with whether
    /// `team_id` plays at home. `None` when the team is not involved.
    pub fn opponent_of(&self, team_id: TeamId) -> Option<(TeamId, bool)> {
        if self.home_team_id == team_id {
            Some((self.away_team_id, true))
        } else if self.away_team_id == team_id {
            Some((self.home_team_id, false))
        } else {
            None
        }
    }
}

/// Display label for a week, e.g. `"Week 3"`.
pub fn week_label(week: u32) -> String {
    format!("Week {week}")
}
