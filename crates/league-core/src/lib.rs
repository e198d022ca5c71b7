// Library root: re-exports all modules so integration tests and the CLI can
// access the crate's public API.

pub mod config;
pub mod db;
pub mod error;
pub mod league;
pub mod models;
pub mod prediction;
pub mod schedule;
pub mod simulation;
pub mod standings;
pub mod store;
pub mod teams;

pub use db::Database;
pub use error::{LeagueError, Result};
pub use league::{League, MatchResult, SeasonProgress, SeasonResults, WeekReport};
pub use models::{Fixture, FixtureId, Outcome, Score, Team, TeamId};
pub use prediction::{Prediction, PredictionEngine, PredictionOutcome};
pub use simulation::MatchModel;
pub use standings::{Standing, StandingsTable};
pub use store::LeagueStore;
pub use teams::TeamSeed;
