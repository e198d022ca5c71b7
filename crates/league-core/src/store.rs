// Storage collaborator used by the league orchestrator.

use anyhow::Result;

use crate::models::{Fixture, FixtureId, ScheduledFixture, Score, Team, TeamId};
use crate::prediction::Prediction;
use crate::standings::Standing;
use crate::teams::TeamSeed;

/// Fixture query. Every `None` field matches all fixtures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixtureFilter {
    pub week: Option<u32>,
    pub played: Option<bool>,
    pub team_id: Option<TeamId>,
}

impl FixtureFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn in_week(mut self, week: u32) -> Self {
        self.week = Some(week);
        self
    }

    pub fn played(mut self, played: bool) -> Self {
        self.played = Some(played);
        self
    }

    pub fn involving(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    pub fn matches(&self, fixture: &Fixture) -> bool {
        self.week.map_or(true, |w| fixture.week == w)
            && self.played.map_or(true, |p| fixture.is_played() == p)
            && self.team_id.map_or(true, |t| fixture.involves(t))
    }
}

/// New score for a stored fixture. `None` marks it unplayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixtureUpdate {
    pub id: FixtureId,
    pub score: Option<Score>,
}

/// A batch of match updates plus the full standings that result from them.
/// Stores apply a changeset all-or-nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    pub fixtures: Vec<FixtureUpdate>,
    /// Complete replacement for the stored standings.
    pub standings: Vec<Standing>,
}

/// Team lookup, fixture store, standings store and prediction store.
///
/// Implementations must make `add_teams`, `replace_season`, `commit` and
/// `upsert_predictions` atomic: readers see either the whole batch or none
/// of it.
pub trait LeagueStore {
    /// All teams in insertion order.
    fn teams(&self) -> Result<Vec<Team>>;

    fn team(&self, id: TeamId) -> Result<Option<Team>>;

    fn add_team(&self, name: &str, power: u32, logo: Option<&str>) -> Result<Team>;

    /// Insert every seed, or none of them.
    fn add_teams(&self, seeds: &[TeamSeed]) -> Result<Vec<Team>>;

    /// Fixtures matching `filter`, ordered by week then id.
    fn fixtures(&self, filter: FixtureFilter) -> Result<Vec<Fixture>>;

    fn fixture(&self, id: FixtureId) -> Result<Option<Fixture>>;

    /// Highest scheduled week, if any fixtures exist.
    fn max_week(&self) -> Result<Option<u32>>;

    /// Lowest week that still has an unplayed fixture.
    fn next_unplayed_week(&self) -> Result<Option<u32>>;

    /// Highest week that has a played fixture.
    fn last_played_week(&self) -> Result<Option<u32>>;

    /// Stored standings in insertion order.
    fn standings(&self) -> Result<Vec<Standing>>;

    /// Discard every fixture, standing and prediction, then store the new
    /// calendar and standings. Returns the stored fixtures with their ids.
    fn replace_season(
        &self,
        fixtures: &[ScheduledFixture],
        standings: &[Standing],
    ) -> Result<Vec<Fixture>>;

    /// Apply fixture score updates and replace standings in one unit.
    fn commit(&self, changes: &Changeset) -> Result<()>;

    /// Insert or overwrite one prediction per (team, week).
    fn upsert_predictions(&self, predictions: &[Prediction]) -> Result<()>;

    /// Stored predictions for `week`, highest probability first.
    fn predictions(&self, week: u32) -> Result<Vec<Prediction>>;
}
