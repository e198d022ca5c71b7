// Week orchestrator: drives the season over a `LeagueStore`.
//
// Every state transition is computed in memory first and handed to the store
// as one batch, so readers never observe a half-simulated week.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{LeagueError, Result};
use crate::models::{week_label, Fixture, FixtureId, Score, Team, TeamId};
use crate::prediction::{Prediction, PredictionEngine, PredictionInput, PredictionOutcome};
use crate::schedule;
use crate::simulation::MatchModel;
use crate::standings::{Standing, StandingsTable};
use crate::store::{Changeset, FixtureFilter, FixtureUpdate, LeagueStore};
use crate::teams::TeamSeed;

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// One simulated match, with team names resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub match_id: FixtureId,
    pub week: u32,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
}

impl MatchResult {
    pub fn score(&self) -> Score {
        Score::new(self.home_score, self.away_score)
    }
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.home_team,
            self.score(),
            self.away_team
        )
    }
}

/// Results of a multi-week simulation, keyed by week number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeasonResults {
    weeks: BTreeMap<u32, Vec<MatchResult>>,
}

impl SeasonResults {
    pub fn week(&self, week: u32) -> Option<&[MatchResult]> {
        self.weeks.get(&week).map(Vec::as_slice)
    }

    /// `("Week N", results)` pairs in week order.
    pub fn labelled(&self) -> impl Iterator<Item = (String, &[MatchResult])> {
        self.weeks
            .iter()
            .map(|(week, results)| (week_label(*week), results.as_slice()))
    }

    pub fn weeks(&self) -> impl Iterator<Item = u32> + '_ {
        self.weeks.keys().copied()
    }

    pub fn match_count(&self) -> usize {
        self.weeks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }
}

/// Everything produced by advancing the season one week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekReport {
    pub week: u32,
    pub results: Vec<MatchResult>,
    pub table: Vec<Standing>,
    /// Present once the week reaches the prediction threshold.
    pub predictions: Option<Vec<Prediction>>,
}

/// Where the season currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeasonProgress {
    pub last_played_week: Option<u32>,
    pub next_week: Option<u32>,
    pub total_weeks: u32,
}

impl SeasonProgress {
    pub fn is_complete(&self) -> bool {
        self.total_weeks > 0 && self.next_week.is_none()
    }
}

// ---------------------------------------------------------------------------
// Pending state
// ---------------------------------------------------------------------------

/// Teams, standings and fixture updates accumulated before a single commit.
struct PendingSeason {
    teams: HashMap<TeamId, Team>,
    table: StandingsTable,
    updates: Vec<FixtureUpdate>,
}

impl PendingSeason {
    fn load<S: LeagueStore>(store: &S) -> Result<Self> {
        let teams = store.teams()?.into_iter().map(|t| (t.id, t)).collect();
        let table = StandingsTable::from_rows(store.standings()?);
        Ok(Self {
            teams,
            table,
            updates: Vec::new(),
        })
    }

    fn team(&self, id: TeamId) -> Result<&Team> {
        self.teams.get(&id).ok_or(LeagueError::TeamNotFound { id })
    }

    fn into_changeset(self) -> Changeset {
        Changeset {
            fixtures: self.updates,
            standings: self.table.into_rows(),
        }
    }
}

// ---------------------------------------------------------------------------
// League
// ---------------------------------------------------------------------------

/// Coordinates scheduling, simulation, standings and predictions for one
/// league held in `store`, drawing randomness from `rng`.
pub struct League<S, R> {
    store: S,
    model: MatchModel,
    predictor: PredictionEngine,
    rng: R,
}

impl<S: LeagueStore, R: Rng> League<S, R> {
    pub fn new(store: S, rng: R) -> Self {
        Self {
            store,
            model: MatchModel::default(),
            predictor: PredictionEngine::default(),
            rng,
        }
    }

    /// Use `model` for both simulation and predictions.
    pub fn with_model(mut self, model: MatchModel) -> Self {
        self.model = model;
        self.predictor = PredictionEngine::new(model, self.predictor.available_from());
        self
    }

    pub fn with_predictions_from_week(mut self, week: u32) -> Self {
        self.predictor = PredictionEngine::new(self.model, week);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn model(&self) -> MatchModel {
        self.model
    }

    pub fn teams(&self) -> Result<Vec<Team>> {
        Ok(self.store.teams()?)
    }

    // --- Setup -------------------------------------------------------------

    /// Populate an empty league with `seeds` and schedule its season. A league
    /// that already has teams is left untouched. A roster that cannot be
    /// scheduled is rejected before anything is stored.
    pub fn seed(&mut self, seeds: &[TeamSeed]) -> Result<Vec<Team>> {
        let existing = self.store.teams()?;
        if !existing.is_empty() {
            info!("League already has {} teams; skipping seed", existing.len());
            return Ok(existing);
        }

        schedule::check_team_count(seeds.len())?;
        let teams = self.store.add_teams(seeds)?;
        info!("Seeded {} teams", teams.len());

        self.generate_fixtures()?;
        Ok(teams)
    }

    /// Discard the current season and schedule a fresh double round-robin for
    /// every stored team. Standings are reset to zero in the same batch.
    pub fn generate_fixtures(&mut self) -> Result<Vec<Fixture>> {
        let teams = self.store.teams()?;
        let calendar = schedule::generate_fixtures(&teams)?;
        let standings = StandingsTable::initialize(teams.iter().map(|t| t.id));

        let fixtures = self
            .store
            .replace_season(&calendar, standings.rows())?;
        info!(
            "Generated {} fixtures over {} weeks for {} teams",
            fixtures.len(),
            schedule::total_weeks(teams.len()),
            teams.len()
        );
        Ok(fixtures)
    }

    /// Reset every team's standing to zero without touching fixtures.
    pub fn initialize_standings(&mut self) -> Result<()> {
        let teams = self.store.teams()?;
        let standings = StandingsTable::initialize(teams.iter().map(|t| t.id));
        self.store.commit(&Changeset {
            fixtures: Vec::new(),
            standings: standings.into_rows(),
        })?;
        debug!("Initialized standings for {} teams", teams.len());
        Ok(())
    }

    // --- Simulation --------------------------------------------------------

    /// Draw a score for a single game without recording it.
    pub fn simulate_game(&mut self, home: &Team, away: &Team) -> Score {
        self.model.simulate_game(home.power, away.power, &mut self.rng)
    }

    /// Simulate every unplayed fixture of `week`. A week with nothing left to
    /// play yields an empty result.
    pub fn simulate_week(&mut self, week: u32) -> Result<Vec<MatchResult>> {
        if week == 0 {
            return Err(LeagueError::InvalidWeek { week });
        }

        let mut pending = PendingSeason::load(&self.store)?;
        let results = self.play_week(&mut pending, week)?;
        if results.is_empty() {
            debug!("Week {} has no unplayed fixtures", week);
            return Ok(results);
        }

        self.store.commit(&pending.into_changeset())?;
        info!("Simulated week {} ({} matches)", week, results.len());
        Ok(results)
    }

    /// Simulate the lowest week that still has unplayed fixtures. Returns
    /// `None` once the season is complete.
    pub fn simulate_next_week(&mut self) -> Result<Option<WeekReport>> {
        let Some(week) = self.store.next_unplayed_week()? else {
            info!("All fixtures played; nothing to simulate");
            return Ok(None);
        };

        let results = self.simulate_week(week)?;
        let table = self.table()?;
        let predictions = if week >= self.predictor.available_from() {
            self.calculate_predictions(week)?
                .predictions()
                .map(<[Prediction]>::to_vec)
        } else {
            None
        };

        Ok(Some(WeekReport {
            week,
            results,
            table,
            predictions,
        }))
    }

    /// Simulate from the next unplayed week (or week 1) through the last
    /// scheduled week, committing the whole run as one batch.
    pub fn simulate_all(&mut self) -> Result<SeasonResults> {
        let Some(max_week) = self.store.max_week()? else {
            info!("No fixtures scheduled; nothing to simulate");
            return Ok(SeasonResults::default());
        };
        let start = self.store.next_unplayed_week()?.unwrap_or(1);

        let mut pending = PendingSeason::load(&self.store)?;
        let mut season = SeasonResults::default();
        for week in start..=max_week {
            let results = self.play_week(&mut pending, week)?;
            season.weeks.insert(week, results);
        }

        if !pending.updates.is_empty() {
            self.store.commit(&pending.into_changeset())?;
        }
        info!(
            "Simulated weeks {}..={} ({} matches)",
            start,
            max_week,
            season.match_count()
        );
        Ok(season)
    }

    fn play_week(&mut self, pending: &mut PendingSeason, week: u32) -> Result<Vec<MatchResult>> {
        let fixtures = self
            .store
            .fixtures(FixtureFilter::all().in_week(week).played(false))?;

        let mut results = Vec::with_capacity(fixtures.len());
        for fixture in fixtures {
            let home = pending.team(fixture.home_team_id)?;
            let away = pending.team(fixture.away_team_id)?;
            let score = self
                .model
                .simulate_game(home.power, away.power, &mut self.rng);

            results.push(MatchResult {
                match_id: fixture.id,
                week,
                home_team: home.name.clone(),
                away_team: away.name.clone(),
                home_score: score.home,
                away_score: score.away,
            });
            pending
                .table
                .apply_result(fixture.home_team_id, fixture.away_team_id, score);
            pending.updates.push(FixtureUpdate {
                id: fixture.id,
                score: Some(score),
            });
        }
        Ok(results)
    }

    // --- Edits -------------------------------------------------------------

    /// Set or clear a match's score and rebuild the standings from the full
    /// match history. Both scores are required for the match to count as
    /// played; anything less clears it.
    pub fn update_match(
        &mut self,
        id: FixtureId,
        home_score: Option<u32>,
        away_score: Option<u32>,
    ) -> Result<Fixture> {
        let mut fixture = self
            .store
            .fixture(id)?
            .ok_or(LeagueError::MatchNotFound { id })?;
        fixture.score = Score::from_parts(home_score, away_score);

        let mut history = self.store.fixtures(FixtureFilter::all().played(true))?;
        history.retain(|f| f.id != id);
        if fixture.is_played() {
            history.push(fixture.clone());
        }

        let teams = self.store.teams()?;
        let mut table = StandingsTable::initialize(teams.iter().map(|t| t.id));
        table.recompute(&history);

        self.store.commit(&Changeset {
            fixtures: vec![FixtureUpdate {
                id,
                score: fixture.score,
            }],
            standings: table.into_rows(),
        })?;

        match fixture.score {
            Some(score) => info!("Match {} set to {}", id, score),
            None => info!("Match {} cleared", id),
        }
        Ok(fixture)
    }

    /// Clear every result and zero the standings, keeping the calendar.
    pub fn reset_league(&mut self) -> Result<()> {
        let played = self.store.fixtures(FixtureFilter::all().played(true))?;
        let teams = self.store.teams()?;
        let standings = StandingsTable::initialize(teams.iter().map(|t| t.id));

        self.store.commit(&Changeset {
            fixtures: played
                .iter()
                .map(|f| FixtureUpdate { id: f.id, score: None })
                .collect(),
            standings: standings.into_rows(),
        })?;
        info!("League reset ({} results cleared)", played.len());
        Ok(())
    }

    // --- Queries -----------------------------------------------------------

    /// The ranked league table.
    pub fn table(&self) -> Result<Vec<Standing>> {
        Ok(StandingsTable::from_rows(self.store.standings()?).table())
    }

    pub fn progress(&self) -> Result<SeasonProgress> {
        Ok(SeasonProgress {
            last_played_week: self.store.last_played_week()?,
            next_week: self.store.next_unplayed_week()?,
            total_weeks: self.store.max_week()?.unwrap_or(0),
        })
    }

    /// All fixtures grouped by week, each week in id order.
    pub fn fixtures_by_week(&self) -> Result<BTreeMap<u32, Vec<Fixture>>> {
        let mut weeks: BTreeMap<u32, Vec<Fixture>> = BTreeMap::new();
        for fixture in self.store.fixtures(FixtureFilter::all())? {
            weeks.entry(fixture.week).or_default().push(fixture);
        }
        Ok(weeks)
    }

    /// Fixtures of one week. A week past the end of the calendar is empty.
    pub fn fixtures_for_week(&self, week: u32) -> Result<Vec<Fixture>> {
        if week == 0 {
            return Err(LeagueError::InvalidWeek { week });
        }
        Ok(self.store.fixtures(FixtureFilter::all().in_week(week))?)
    }

    // --- Predictions -------------------------------------------------------

    /// Estimate championship probabilities as of `current_week` and store
    /// them, overwriting any earlier estimate for that week.
    pub fn calculate_predictions(&self, current_week: u32) -> Result<PredictionOutcome> {
        let teams = self.store.teams()?;
        let standings = self.store.standings()?;
        let fixtures = self.store.fixtures(FixtureFilter::all())?;

        let outcome = self.predictor.predict(PredictionInput {
            current_week,
            teams: &teams,
            standings: &standings,
            fixtures: &fixtures,
        })?;

        match outcome.predictions() {
            Some(predictions) => {
                self.store.upsert_predictions(predictions)?;
                if let Some(top) = predictions.first() {
                    info!(
                        "Week {} predictions: {} leads at {:.2}%",
                        current_week, top.team_name, top.probability
                    );
                }
            }
            None => debug!(
                "Predictions not available at week {} (from week {})",
                current_week,
                self.predictor.available_from()
            ),
        }
        Ok(outcome)
    }

    /// Predictions as of the last played week.
    pub fn current_predictions(&self) -> Result<PredictionOutcome> {
        let week = self.store.last_played_week()?.unwrap_or(0);
        self.calculate_predictions(week)
    }

    /// Predictions previously stored for `week`, highest probability first.
    pub fn stored_predictions(&self, week: u32) -> Result<Vec<Prediction>> {
        Ok(self.store.predictions(week)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::teams::default_teams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn seeded_league(seed: u64) -> League<Database, ChaCha8Rng> {
        let db = Database::open(":memory:").unwrap();
        let mut league = League::new(db, ChaCha8Rng::seed_from_u64(seed));
        league.seed(&default_teams()).unwrap();
        league
    }

    fn assert_consistent(league: &League<Database, ChaCha8Rng>) {
        for s in league.table().unwrap() {
            assert!(s.is_consistent(), "inconsistent standing {s:?}");
        }
    }

    #[test]
    fn seed_schedules_a_full_season() {
        let league = seeded_league(1);
        let weeks = league.fixtures_by_week().unwrap();
        assert_eq!(weeks.len(), 6);
        assert!(weeks.values().all(|w| w.len() == 2));

        let table = league.table().unwrap();
        assert_eq!(table.len(), 4);
        assert!(table.iter().all(|s| *s == Standing::new(s.team_id)));
    }

    #[test]
    fn seed_is_a_no_op_when_teams_exist() {
        let mut league = seeded_league(1);
        league.simulate_week(1).unwrap();
        let teams = league.seed(&default_teams()).unwrap();
        assert_eq!(teams.len(), 4);
        assert_eq!(league.progress().unwrap().last_played_week, Some(1));
    }

    #[test]
    fn generate_rejects_bad_team_counts() {
        let db = Database::open(":memory:").unwrap();
        let mut league = League::new(db, ChaCha8Rng::seed_from_u64(0));
        let err = league.generate_fixtures().unwrap_err();
        assert!(matches!(err, LeagueError::InsufficientTeams { count: 0 }));

        league.store().add_team("First", 60, None).unwrap();
        league.store().add_team("Second", 60, None).unwrap();
        league.store().add_team("Third", 60, None).unwrap();
        let err = league.generate_fixtures().unwrap_err();
        assert!(matches!(err, LeagueError::OddTeamCount { count: 3 }));
    }

    #[test]
    fn unschedulable_seed_stores_nothing() {
        let db = Database::open(":memory:").unwrap();
        let mut league = League::new(db, ChaCha8Rng::seed_from_u64(0));

        let mut five = default_teams();
        five.push(TeamSeed::new("Tottenham", 78));
        let err = league.seed(&five).unwrap_err();
        assert!(matches!(err, LeagueError::OddTeamCount { count: 5 }));
        assert!(league.teams().unwrap().is_empty());

        let err = league.seed(&default_teams()[..1]).unwrap_err();
        assert!(matches!(err, LeagueError::InsufficientTeams { count: 1 }));
        assert!(league.teams().unwrap().is_empty());

        // A valid roster still seeds a full season afterwards.
        let teams = league.seed(&default_teams()).unwrap();
        assert_eq!(teams.len(), 4);
        assert_eq!(league.fixtures_by_week().unwrap().len(), 6);
    }

    #[test]
    fn simulate_week_plays_only_that_week() {
        let mut league = seeded_league(3);
        let results = league.simulate_week(2).unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.week == 2));
        assert!(results.iter().all(|r| r.home_score <= 3 && r.away_score <= 3));

        let weeks = league.fixtures_by_week().unwrap();
        assert!(weeks[&2].iter().all(Fixture::is_played));
        assert!(weeks[&1].iter().all(|f| !f.is_played()));
        assert_eq!(league.table().unwrap().iter().map(|s| s.played).sum::<u32>(), 4);
        assert_consistent(&league);

        // Nothing left to play in week 2.
        assert!(league.simulate_week(2).unwrap().is_empty());
        // Past the calendar is also empty rather than an error.
        assert!(league.simulate_week(40).unwrap().is_empty());
    }

    #[test]
    fn week_zero_is_invalid() {
        let mut league = seeded_league(3);
        assert!(matches!(
            league.simulate_week(0).unwrap_err(),
            LeagueError::InvalidWeek { week: 0 }
        ));
        assert!(matches!(
            league.fixtures_for_week(0).unwrap_err(),
            LeagueError::InvalidWeek { week: 0 }
        ));
        assert!(league.fixtures_for_week(99).unwrap().is_empty());
    }

    #[test]
    fn simulate_next_week_walks_the_season() {
        let mut league = seeded_league(11);
        for expected_week in 1..=6 {
            let report = league.simulate_next_week().unwrap().unwrap();
            assert_eq!(report.week, expected_week);
            assert_eq!(report.results.len(), 2);
            assert_eq!(report.table.len(), 4);
            assert_eq!(report.predictions.is_some(), expected_week >= 4);
        }
        assert!(league.simulate_next_week().unwrap().is_none());
        assert!(league.progress().unwrap().is_complete());
    }

    #[test]
    fn simulate_all_completes_from_next_unplayed_week() {
        let mut league = seeded_league(5);
        league.simulate_week(1).unwrap();
        league.simulate_week(2).unwrap();

        let season = league.simulate_all().unwrap();
        assert_eq!(season.weeks().collect::<Vec<_>>(), vec![3, 4, 5, 6]);
        assert_eq!(season.match_count(), 8);
        let labels: Vec<String> = season.labelled().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["Week 3", "Week 4", "Week 5", "Week 6"]);

        let table = league.table().unwrap();
        assert!(table.iter().all(|s| s.played == 6));
        assert_consistent(&league);

        // A finished season restarts the scan at week 1 and finds nothing.
        let again = league.simulate_all().unwrap();
        assert_eq!(again.match_count(), 0);
        assert_eq!(again.week(1), Some(&[][..]));
    }

    #[test]
    fn simulate_all_on_empty_league_is_empty() {
        let db = Database::open(":memory:").unwrap();
        let mut league = League::new(db, ChaCha8Rng::seed_from_u64(0));
        assert!(league.simulate_all().unwrap().is_empty());
    }

    #[test]
    fn clearing_a_match_restores_prior_standings() {
        let mut league = seeded_league(8);
        league.simulate_week(1).unwrap();
        let after_week_one = league.store().standings().unwrap();

        let week_two = league.simulate_week(2).unwrap();
        for result in &week_two {
            let cleared = league.update_match(result.match_id, None, None).unwrap();
            assert!(!cleared.is_played());
        }
        assert_eq!(league.store().standings().unwrap(), after_week_one);
    }

    #[test]
    fn update_match_recomputes_standings() {
        let mut league = seeded_league(8);
        let fixture = league.fixtures_for_week(1).unwrap()[0].clone();

        let updated = league.update_match(fixture.id, Some(4), Some(0)).unwrap();
        assert_eq!(updated.score, Some(Score::new(4, 0)));

        let table = league.table().unwrap();
        assert_eq!(table[0].team_id, fixture.home_team_id);
        assert_eq!(table[0].points, 3);
        assert_eq!(table[0].goal_difference, 4);

        // Editing the same match again must not double count.
        league.update_match(fixture.id, Some(1), Some(1)).unwrap();
        let table = league.table().unwrap();
        assert_eq!(table.iter().map(|s| s.points).sum::<u32>(), 2);
        assert_consistent(&league);

        // A single score is not a result.
        let half = league.update_match(fixture.id, Some(2), None).unwrap();
        assert!(!half.is_played());
        assert!(league.table().unwrap().iter().all(|s| s.played == 0));
    }

    #[test]
    fn update_unknown_match_is_not_found() {
        let mut league = seeded_league(8);
        let before = league.store().standings().unwrap();
        let err = league.update_match(999, Some(1), Some(0)).unwrap_err();
        assert!(matches!(err, LeagueError::MatchNotFound { id: 999 }));
        assert_eq!(league.store().standings().unwrap(), before);
    }

    #[test]
    fn reset_keeps_calendar_and_zeroes_table() {
        let mut league = seeded_league(21);
        let calendar = league.fixtures_by_week().unwrap();
        league.simulate_all().unwrap();

        league.reset_league().unwrap();
        let after = league.fixtures_by_week().unwrap();
        assert_eq!(after.len(), calendar.len());
        for (week, fixtures) in &after {
            let ids: Vec<_> = fixtures.iter().map(|f| f.id).collect();
            let before: Vec<_> = calendar[week].iter().map(|f| f.id).collect();
            assert_eq!(ids, before);
            assert!(fixtures.iter().all(|f| !f.is_played()));
        }
        assert!(league.table().unwrap().iter().all(|s| *s == Standing::new(s.team_id)));
        assert_eq!(league.progress().unwrap().next_week, Some(1));
    }

    #[test]
    fn regenerating_discards_results() {
        let mut league = seeded_league(4);
        league.simulate_week(1).unwrap();
        let fixtures = league.generate_fixtures().unwrap();
        assert_eq!(fixtures.len(), 12);
        assert!(fixtures.iter().all(|f| !f.is_played()));
        assert!(league.table().unwrap().iter().all(|s| s.played == 0));
    }

    #[test]
    fn predictions_follow_the_season() {
        let mut league = seeded_league(13);
        league.simulate_week(1).unwrap();
        let early = league.current_predictions().unwrap();
        assert_eq!(
            early,
            PredictionOutcome::NotYetAvailable {
                current_week: 1,
                available_from: 4
            }
        );

        for week in 2..=4 {
            league.simulate_week(week).unwrap();
        }
        let outcome = league.calculate_predictions(4).unwrap();
        let predictions = outcome.predictions().unwrap();
        let total: f64 = predictions.iter().map(|p| p.probability).sum();
        assert!((total - 100.0).abs() <= 0.5, "sum was {total}");

        let stored = league.stored_predictions(4).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0].team_id, predictions[0].team_id);

        league.simulate_all().unwrap();
        let final_outcome = league.current_predictions().unwrap();
        let final_predictions = final_outcome.predictions().unwrap();
        assert_eq!(final_predictions[0].probability, 100.0);
        assert!(final_predictions[1..].iter().all(|p| p.probability == 0.0));
        let leader_points = league.table().unwrap()[0].points;
        assert_eq!(final_predictions[0].current_points, leader_points);
    }

    #[test]
    fn custom_prediction_threshold() {
        let mut league = seeded_league(13).with_predictions_from_week(2);
        let report = league.simulate_next_week().unwrap().unwrap();
        assert!(report.predictions.is_none());
        let report = league.simulate_next_week().unwrap().unwrap();
        assert_eq!(report.predictions.map(|p| p.len()), Some(4));
    }

    #[test]
    fn same_seed_same_season() {
        let mut a = seeded_league(99);
        let mut b = seeded_league(99);
        assert_eq!(a.simulate_all().unwrap(), b.simulate_all().unwrap());
        assert_eq!(a.table().unwrap(), b.table().unwrap());
    }

    #[test]
    fn match_result_display() {
        let result = MatchResult {
            match_id: 1,
            week: 1,
            home_team: "Chelsea".into(),
            away_team: "Liverpool".into(),
            home_score: 2,
            away_score: 1,
        };
        assert_eq!(result.to_string(), "Chelsea 2 - 1 Liverpool");
    }

    #[test]
    fn progress_reports_week_bounds() {
        let mut league = seeded_league(2);
        assert_eq!(
            league.progress().unwrap(),
            SeasonProgress {
                last_played_week: None,
                next_week: Some(1),
                total_weeks: 6
            }
        );
        league.simulate_next_week().unwrap();
        let progress = league.progress().unwrap();
        assert_eq!(progress.last_played_week, Some(1));
        assert_eq!(progress.next_week, Some(2));
        assert!(!progress.is_complete());
    }
}
