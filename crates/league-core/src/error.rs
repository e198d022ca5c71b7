// Error type shared by the league domain operations.

use thiserror::Error;

use crate::models::{FixtureId, TeamId};

#[derive(Debug, Error)]
pub enum LeagueError {
    #[error("at least two teams are required to generate fixtures, found {count}")]
    InsufficientTeams { count: usize },

    /// The circle-method calendar has no bye round, so the team count must be even.
    #[error("fixture generation requires an even number of teams, found {count}")]
    OddTeamCount { count: usize },

    #[error("match {id} not found")]
    MatchNotFound { id: FixtureId },

    #[error("team {id} not found")]
    TeamNotFound { id: TeamId },

    #[error("invalid week number {week}; weeks start at 1")]
    InvalidWeek { week: u32 },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LeagueError>;
