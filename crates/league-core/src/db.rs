// SQLite persistence layer for teams, fixtures, standings and predictions.

use std::sync::{Mutex, MutexGuard};

use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Fixture, FixtureId, ScheduledFixture, Score, Team, TeamId};
use crate::prediction::Prediction;
use crate::standings::Standing;
use crate::store::{Changeset, FixtureFilter, LeagueStore};
use crate::teams::TeamSeed;

/// SQLite-backed [`LeagueStore`].
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS teams (
                id    INTEGER PRIMARY KEY AUTOINCREMENT,
                name  TEXT NOT NULL,
                power INTEGER NOT NULL DEFAULT 50 CHECK (power BETWEEN 1 AND 100),
                logo  TEXT
            );

            CREATE TABLE IF NOT EXISTS fixtures (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                home_team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                away_team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                week         INTEGER NOT NULL,
                played       INTEGER NOT NULL DEFAULT 0,
                home_score   INTEGER,
                away_score   INTEGER,
                CHECK (home_team_id <> away_team_id),
                CHECK ((played = 1 AND home_score IS NOT NULL AND away_score IS NOT NULL)
                    OR (played = 0 AND home_score IS NULL AND away_score IS NULL))
            );

            CREATE TABLE IF NOT EXISTS standings (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                team_id         INTEGER NOT NULL UNIQUE REFERENCES teams(id) ON DELETE CASCADE,
                played          INTEGER NOT NULL DEFAULT 0,
                won             INTEGER NOT NULL DEFAULT 0,
                drawn           INTEGER NOT NULL DEFAULT 0,
                lost            INTEGER NOT NULL DEFAULT 0,
                goals_for       INTEGER NOT NULL DEFAULT 0,
                goals_against   INTEGER NOT NULL DEFAULT 0,
                goal_difference INTEGER NOT NULL DEFAULT 0,
                points          INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS predictions (
                team_id          INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
                week             INTEGER NOT NULL,
                current_points   INTEGER NOT NULL,
                projected_points REAL NOT NULL,
                probability      REAL NOT NULL,
                computed_at      TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (team_id, week)
            );
            ",
        )
        .context("failed to create database schema")?;

        // Weekly simulation filters on (week, played) on every call.
        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_fixtures_week_played ON fixtures(week, played);",
        )
        .context("failed to create fixtures index")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    fn week_query(&self, sql: &str) -> Result<Option<u32>> {
        let conn = self.conn();
        let week: Option<u32> = conn
            .query_row(sql, [], |row| row.get(0))
            .context("failed to query week bounds")?;
        Ok(week)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const FIXTURE_COLUMNS: &str = "id, home_team_id, away_team_id, week, home_score, away_score";

fn fixture_from_row(row: &Row<'_>) -> rusqlite::Result<Fixture> {
    Ok(Fixture {
        id: row.get(0)?,
        home_team_id: row.get(1)?,
        away_team_id: row.get(2)?,
        week: row.get(3)?,
        score: Score::from_parts(row.get(4)?, row.get(5)?),
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        power: row.get(2)?,
        logo: row.get(3)?,
    })
}

fn standing_from_row(row: &Row<'_>) -> rusqlite::Result<Standing> {
    Ok(Standing {
        team_id: row.get(0)?,
        played: row.get(1)?,
        won: row.get(2)?,
        drawn: row.get(3)?,
        lost: row.get(4)?,
        goals_for: row.get(5)?,
        goals_against: row.get(6)?,
        goal_difference: row.get(7)?,
        points: row.get(8)?,
    })
}

fn insert_standings(tx: &rusqlite::Transaction<'_>, standings: &[Standing]) -> Result<()> {
    tx.execute("DELETE FROM standings", [])
        .context("failed to clear standings")?;
    let mut stmt = tx
        .prepare(
            "INSERT INTO standings
                (team_id, played, won, drawn, lost, goals_for, goals_against, goal_difference, points)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .context("failed to prepare standings insert")?;
    for s in standings {
        stmt.execute(params![
            s.team_id,
            s.played,
            s.won,
            s.drawn,
            s.lost,
            s.goals_for,
            s.goals_against,
            s.goal_difference,
            s.points,
        ])
        .with_context(|| format!("failed to insert standing for team {}", s.team_id))?;
    }
    Ok(())
}

impl LeagueStore for Database {
    fn teams(&self) -> Result<Vec<Team>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT id, name, power, logo FROM teams ORDER BY id")
            .context("failed to prepare teams query")?;
        let teams = stmt
            .query_map([], team_from_row)
            .context("failed to query teams")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map team rows")?;
        Ok(teams)
    }

    fn team(&self, id: TeamId) -> Result<Option<Team>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, power, logo FROM teams WHERE id = ?1",
            params![id],
            team_from_row,
        )
        .optional()
        .context("failed to query team")
    }

    fn add_team(&self, name: &str, power: u32, logo: Option<&str>) -> Result<Team> {
        let conn = self.conn();
        let id: TeamId = conn
            .query_row(
                "INSERT INTO teams (name, power, logo) VALUES (?1, ?2, ?3) RETURNING id",
                params![name, power, logo],
                |row| row.get(0),
            )
            .context("failed to insert team")?;
        Ok(Team {
            id,
            name: name.to_string(),
            power,
            logo: logo.map(str::to_string),
        })
    }

    fn add_teams(&self, seeds: &[TeamSeed]) -> Result<Vec<Team>> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        let mut teams = Vec::with_capacity(seeds.len());
        {
            let mut stmt = tx
                .prepare("INSERT INTO teams (name, power, logo) VALUES (?1, ?2, ?3) RETURNING id")
                .context("failed to prepare team insert")?;
            for seed in seeds {
                let id: TeamId = stmt
                    .query_row(params![seed.name, seed.power, seed.logo], |row| row.get(0))
                    .with_context(|| format!("failed to insert team {}", seed.name))?;
                teams.push(Team {
                    id,
                    name: seed.name.clone(),
                    power: seed.power,
                    logo: seed.logo.clone(),
                });
            }
        }

        tx.commit().context("failed to commit add_teams")?;
        Ok(teams)
    }

    fn fixtures(&self, filter: FixtureFilter) -> Result<Vec<Fixture>> {
        let conn = self.conn();
        let sql = format!(
            "SELECT {FIXTURE_COLUMNS} FROM fixtures
             WHERE (?1 IS NULL OR week = ?1)
               AND (?2 IS NULL OR played = ?2)
               AND (?3 IS NULL OR home_team_id = ?3 OR away_team_id = ?3)
             ORDER BY week, id"
        );
        let mut stmt = conn
            .prepare(&sql)
            .context("failed to prepare fixtures query")?;
        let fixtures = stmt
            .query_map(
                params![filter.week, filter.played, filter.team_id],
                fixture_from_row,
            )
            .context("failed to query fixtures")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map fixture rows")?;
        Ok(fixtures)
    }

    fn fixture(&self, id: FixtureId) -> Result<Option<Fixture>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {FIXTURE_COLUMNS} FROM fixtures WHERE id = ?1"),
            params![id],
            fixture_from_row,
        )
        .optional()
        .context("failed to query fixture")
    }

    fn max_week(&self) -> Result<Option<u32>> {
        self.week_query("SELECT MAX(week) FROM fixtures")
    }

    fn next_unplayed_week(&self) -> Result<Option<u32>> {
        self.week_query("SELECT MIN(week) FROM fixtures WHERE played = 0")
    }

    fn last_played_week(&self) -> Result<Option<u32>> {
        self.week_query("SELECT MAX(week) FROM fixtures WHERE played = 1")
    }

    fn standings(&self) -> Result<Vec<Standing>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT team_id, played, won, drawn, lost, goals_for, goals_against, goal_difference, points
                 FROM standings ORDER BY id",
            )
            .context("failed to prepare standings query")?;
        let standings = stmt
            .query_map([], standing_from_row)
            .context("failed to query standings")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map standing rows")?;
        Ok(standings)
    }

    /// Regenerate the season in a single transaction. Fixture ids restart
    /// at 1 for each new calendar.
    fn replace_season(
        &self,
        fixtures: &[ScheduledFixture],
        standings: &[Standing],
    ) -> Result<Vec<Fixture>> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        tx.execute("DELETE FROM predictions", [])
            .context("failed to delete predictions")?;
        tx.execute("DELETE FROM fixtures", [])
            .context("failed to delete fixtures")?;
        tx.execute("DELETE FROM sqlite_sequence WHERE name = 'fixtures'", [])
            .context("failed to reset fixture ids")?;

        let mut stored = Vec::with_capacity(fixtures.len());
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO fixtures (home_team_id, away_team_id, week, played)
                     VALUES (?1, ?2, ?3, 0) RETURNING id",
                )
                .context("failed to prepare fixture insert")?;
            for f in fixtures {
                let id: FixtureId = stmt
                    .query_row(params![f.home_team_id, f.away_team_id, f.week], |row| {
                        row.get(0)
                    })
                    .context("failed to insert fixture")?;
                stored.push(Fixture {
                    id,
                    home_team_id: f.home_team_id,
                    away_team_id: f.away_team_id,
                    week: f.week,
                    score: None,
                });
            }
        }

        insert_standings(&tx, standings)?;
        tx.commit().context("failed to commit replace_season")?;
        Ok(stored)
    }

    fn commit(&self, changes: &Changeset) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;

        {
            let mut stmt = tx
                .prepare(
                    "UPDATE fixtures SET played = ?2, home_score = ?3, away_score = ?4
                     WHERE id = ?1",
                )
                .context("failed to prepare fixture update")?;
            for update in &changes.fixtures {
                let score = update.score;
                let updated = stmt
                    .execute(params![
                        update.id,
                        score.is_some(),
                        score.map(|s| s.home),
                        score.map(|s| s.away),
                    ])
                    .with_context(|| format!("failed to update fixture {}", update.id))?;
                if updated != 1 {
                    // Dropping the transaction rolls back earlier updates.
                    bail!("fixture {} does not exist", update.id);
                }
            }
        }

        insert_standings(&tx, &changes.standings)?;
        tx.commit().context("failed to commit changeset")?;
        Ok(())
    }

    fn upsert_predictions(&self, predictions: &[Prediction]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO predictions (team_id, week, current_points, projected_points, probability)
                     VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(team_id, week) DO UPDATE SET
                        current_points   = excluded.current_points,
                        projected_points = excluded.projected_points,
                        probability      = excluded.probability,
                        computed_at      = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                )
                .context("failed to prepare prediction upsert")?;
            for p in predictions {
                stmt.execute(params![
                    p.team_id,
                    p.week,
                    p.current_points,
                    p.projected_points,
                    p.probability,
                ])
                .with_context(|| {
                    format!("failed to store prediction for team {} week {}", p.team_id, p.week)
                })?;
            }
        }
        tx.commit().context("failed to commit predictions")?;
        Ok(())
    }

    fn predictions(&self, week: u32) -> Result<Vec<Prediction>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT p.team_id, t.name, p.week, p.current_points, p.projected_points, p.probability
                 FROM predictions p JOIN teams t ON t.id = p.team_id
                 WHERE p.week = ?1
                 ORDER BY p.probability DESC, p.team_id",
            )
            .context("failed to prepare predictions query")?;
        let predictions = stmt
            .query_map(params![week], |row| {
                Ok(Prediction {
                    team_id: row.get(0)?,
                    team_name: row.get(1)?,
                    week: row.get(2)?,
                    current_points: row.get(3)?,
                    projected_points: row.get(4)?,
                    probability: row.get(5)?,
                })
            })
            .context("failed to query predictions")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map prediction rows")?;
        Ok(predictions)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
