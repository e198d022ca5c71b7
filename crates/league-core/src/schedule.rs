// Double round-robin fixture calendar (circle method, then mirrored).
//
// The first half pairs every team with every other team once, one round per
// week. The second half replays the first with home and away swapped, so each
// ordered (home, away) pair appears exactly once over the season.

use tracing::debug;

use crate::error::{LeagueError, Result};
use crate::models::{ScheduledFixture, Team};

/// Number of weeks in a double round-robin for `team_count` teams.
pub fn total_weeks(team_count: usize) -> u32 {
    (2 * team_count.saturating_sub(1)) as u32
}

/// A calendar needs at least two teams and an even count.
pub fn check_team_count(team_count: usize) -> Result<()> {
    if team_count < 2 {
        return Err(LeagueError::InsufficientTeams { count: team_count });
    }
    if team_count % 2 != 0 {
        return Err(LeagueError::OddTeamCount { count: team_count });
    }
    Ok(())
}

/// Generate the full calendar for `teams`, in generation order.
///
/// Teams are indexed by their position in the slice. For round `r` and match
/// index `m`, the home side is `(r + m) mod (N - 1)` and the away side is
/// `(N - 1 - m + r) mod (N - 1)`, except that match 0 always hosts team
/// `N - 1`, which sits outside the rotation.
pub fn generate_fixtures(teams: &[Team]) -> Result<Vec<ScheduledFixture>> {
    let team_count = teams.len();
    check_team_count(team_count)?;

    let rotation = team_count - 1;
    let per_week = team_count / 2;

    let mut first_half = Vec::with_capacity(rotation * per_week);
    for round in 0..rotation {
        let week = round as u32 + 1;
        for m in 0..per_week {
            let home = (round + m) % rotation;
            let away = if m == 0 {
                team_count - 1
            } else {
                (rotation - m + round) % rotation
            };
            first_half.push(ScheduledFixture {
                home_team_id: teams[home].id,
                away_team_id: teams[away].id,
                week,
            });
        }
    }

    // Second half continues the week counter, advancing every `per_week`
    // mirrored fixtures.
    let mut week = rotation as u32 + 1;
    let mut fixtures = first_half.clone();
    for (index, fixture) in first_half.iter().enumerate() {
        if index > 0 && index % per_week == 0 {
            week += 1;
        }
        fixtures.push(ScheduledFixture {
            home_team_id: fixture.away_team_id,
            away_team_id: fixture.home_team_id,
            week,
        });
    }

    debug!(
        "Generated {} fixtures over {} weeks for {} teams",
        fixtures.len(),
        total_weeks(team_count),
        team_count
    );

    Ok(fixtures)
}
