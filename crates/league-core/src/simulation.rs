// Stochastic match outcome model driven by team power ratings.
//
// The random source is always passed in by the caller, so production code can
// use an entropy-seeded generator while tests inject a seeded one.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{Outcome, Score};

/// Strength bonus added to the home side.
pub const HOME_ADVANTAGE: u32 = 5;

/// Percentage points reserved for a draw, carved equally out of both sides.
pub const BASE_DRAW_CHANCE: u32 = 20;

/// Parameters of the outcome model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchModel {
    pub home_advantage: u32,
    pub draw_chance: u32,
}

impl Default for MatchModel {
    fn default() -> Self {
        Self {
            home_advantage: HOME_ADVANTAGE,
            draw_chance: BASE_DRAW_CHANCE,
        }
    }
}

impl MatchModel {
    pub fn new(home_advantage: u32, draw_chance: u32) -> Self {
        Self {
            home_advantage,
            draw_chance,
        }
    }

    /// Win chances for (home, away) on a 0-100 scale, each reduced by half
    /// the draw chance. Values may go negative for very lopsided matches;
    /// that shifts the outcome boundaries and is left unclamped.
    pub fn win_chances(&self, home_power: u32, away_power: u32) -> (f64, f64) {
        let home_strength = f64::from(home_power + self.home_advantage);
        let away_strength = f64::from(away_power);
        let total = home_strength + away_strength;

        let (home_share, away_share) = if total > 0.0 {
            (home_strength / total * 100.0, away_strength / total * 100.0)
        } else {
            (50.0, 50.0)
        };

        let half_draw = f64::from(self.draw_chance) / 2.0;
        (home_share - half_draw, away_share - half_draw)
    }

    /// Map a roll in 1..=100 to an outcome: at or below the home win chance is
    /// a home win, the next `draw_chance` points are a draw, the rest an away win.
    pub fn outcome_for_roll(&self, home_power: u32, away_power: u32, roll: u32) -> Outcome {
        let (home_win_chance, _) = self.win_chances(home_power, away_power);
        let roll = f64::from(roll);

        if roll <= home_win_chance {
            Outcome::HomeWin
        } else if roll <= home_win_chance + f64::from(self.draw_chance) {
            Outcome::Draw
        } else {
            Outcome::AwayWin
        }
    }

    /// Draw an outcome and a matching score for one game.
    pub fn simulate_game<R: Rng + ?Sized>(
        &self,
        home_power: u32,
        away_power: u32,
        rng: &mut R,
    ) -> Score {
        let roll = rng.gen_range(1..=100);
        let outcome = self.outcome_for_roll(home_power, away_power, roll);
        generate_score(outcome, rng)
    }

    /// Probability that a team beats its opponent, using the same home bonus
    /// as the outcome model. The bonus goes to whichever side is at home.
    pub fn win_probability(&self, team_power: u32, opponent_power: u32, is_home: bool) -> f64 {
        let (team_strength, opponent_strength) = if is_home {
            (team_power + self.home_advantage, opponent_power)
        } else {
            (team_power, opponent_power + self.home_advantage)
        };
        let total = f64::from(team_strength) + f64::from(opponent_strength);
        if total > 0.0 {
            f64::from(team_strength) / total
        } else {
            0.5
        }
    }
}

/// Generate a score consistent with `outcome`.
///
/// The winner scores 1-3 and the loser 1-2 fewer (floored at 0); a draw uses
/// one value in 0-2 for both sides. No side ever exceeds 3.
pub fn generate_score<R: Rng + ?Sized>(outcome: Outcome, rng: &mut R) -> Score {
    match outcome {
        Outcome::HomeWin => {
            let home: u32 = rng.gen_range(1..=3);
            let away = home.saturating_sub(rng.gen_range(1..=2));
            Score::new(home, away)
        }
        Outcome::Draw => {
            let goals: u32 = rng.gen_range(0..=2);
            Score::new(goals, goals)
        }
        Outcome::AwayWin => {
            let away: u32 = rng.gen_range(1..=3);
            let home = away.saturating_sub(rng.gen_range(1..=2));
            Score::new(home, away)
        }
    }
}
