// League simulator entry point.
//
// Startup sequence:
// 1. Parse the command line
// 2. Initialize tracing (log to file, stdout is for command output)
// 3. Load config (copying defaults on first run)
// 4. Open the database and build the league
// 5. Run the requested command

mod render;

use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::info;

use league_core::config::{self, Config};
use league_core::{teams, Database, League, PredictionOutcome, SeasonResults};

use render::{Names, TableRow};

type AppLeague = League<Database, ChaCha8Rng>;

#[derive(Parser)]
#[command(name = "league")]
#[command(about = "Simulate a double round-robin football league", long_about = None)]
struct Cli {
    /// Print JSON instead of text tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the configured teams into an empty league and schedule the season
    Seed,

    /// Discard the current season and schedule a new one
    Generate,

    /// List teams
    Teams,

    /// List fixtures, grouped by week
    Fixtures {
        /// Only show this week
        #[arg(long)]
        week: Option<u32>,
    },

    /// Show last played, next and total weeks
    Progress,

    /// Show the league table
    Table,

    /// Simulate one week (the next unplayed week by default)
    SimulateWeek {
        #[arg(long)]
        week: Option<u32>,
    },

    /// Simulate every remaining week
    SimulateAll,

    /// Set or clear a match result. Omit either score to clear it.
    UpdateMatch {
        /// Match id
        id: i64,

        #[arg(long)]
        home: Option<u32>,

        #[arg(long)]
        away: Option<u32>,
    },

    /// Clear all results, keeping the calendar
    Reset,

    /// Championship predictions for the current week, or stored ones for --week
    Predictions {
        #[arg(long)]
        week: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing()?;
    info!("League simulator starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, predictions from week {}",
        config.league.name, config.league.predictions_from_week
    );

    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    let rng = match config.simulation.seed {
        Some(seed) => {
            info!("Using fixed simulation seed {}", seed);
            ChaCha8Rng::seed_from_u64(seed)
        }
        None => ChaCha8Rng::from_entropy(),
    };

    let mut league = League::new(db, rng)
        .with_model(config.match_model())
        .with_predictions_from_week(config.league.predictions_from_week);

    run(cli.command, &mut league, &config, cli.json)
}

fn run(command: Commands, league: &mut AppLeague, config: &Config, json: bool) -> anyhow::Result<()> {
    match command {
        Commands::Seed => {
            let seeds = teams::load_teams(Path::new(&config.data_paths.teams))
                .context("failed to load teams")?;
            let teams = league.seed(&seeds).context("failed to seed league")?;
            if json {
                render::print_json(&teams)?;
            } else {
                render::print_teams(&teams);
            }
        }

        Commands::Generate => {
            let fixtures = league
                .generate_fixtures()
                .context("failed to generate fixtures")?;
            let names = Names::new(&league.teams()?);
            let rows = render::fixture_rows(&fixtures, &names);
            if json {
                render::print_json(&rows)?;
            } else {
                println!("Generated {} fixtures", fixtures.len());
                render::print_fixtures(&rows);
            }
        }

        Commands::Teams => {
            let teams = league.teams()?;
            if json {
                render::print_json(&teams)?;
            } else {
                render::print_teams(&teams);
            }
        }

        Commands::Fixtures { week } => {
            let fixtures = match week {
                Some(week) => league.fixtures_for_week(week)?,
                None => league.fixtures_by_week()?.into_values().flatten().collect(),
            };
            let names = Names::new(&league.teams()?);
            let rows = render::fixture_rows(&fixtures, &names);
            if json {
                render::print_json(&rows)?;
            } else {
                render::print_fixtures(&rows);
            }
        }

        Commands::Progress => {
            let progress = league.progress()?;
            if json {
                render::print_json(&progress)?;
            } else {
                render::print_progress(&progress);
            }
        }

        Commands::Table => {
            let table = league.table()?;
            let names = Names::new(&league.teams()?);
            let rows = render::table_rows(&table, &names);
            if json {
                render::print_json(&rows)?;
            } else {
                render::print_table(&rows);
            }
        }

        Commands::SimulateWeek { week: Some(week) } => {
            let results = league
                .simulate_week(week)
                .with_context(|| format!("failed to simulate week {week}"))?;
            if json {
                render::print_json(&results)?;
            } else {
                render::print_results(&league_core::models::week_label(week), &results);
            }
        }

        Commands::SimulateWeek { week: None } => {
            let Some(report) = league
                .simulate_next_week()
                .context("failed to simulate week")?
            else {
                if json {
                    render::print_json(&serde_json::Value::Null)?;
                } else {
                    println!("All games completed");
                }
                return Ok(());
            };
            if json {
                render::print_json(&report)?;
            } else {
                let names = Names::new(&league.teams()?);
                render::print_results(&league_core::models::week_label(report.week), &report.results);
                println!();
                render::print_table(&render::table_rows(&report.table, &names));
                if let Some(predictions) = &report.predictions {
                    println!();
                    render::print_predictions(predictions);
                }
            }
        }

        Commands::SimulateAll => {
            let results = league
                .simulate_all()
                .context("failed to simulate remaining weeks")?;
            let table = league.table()?;
            let predictions = league.current_predictions()?;
            let names = Names::new(&league.teams()?);
            let rows = render::table_rows(&table, &names);
            if json {
                render::print_json(&SeasonSummary {
                    results: &results,
                    table: rows,
                    predictions: &predictions,
                })?;
            } else {
                for (label, week_results) in results.labelled() {
                    render::print_results(&label, week_results);
                }
                println!();
                render::print_table(&rows);
                println!();
                render::print_outcome(&predictions);
            }
        }

        Commands::UpdateMatch { id, home, away } => {
            let fixture = league
                .update_match(id, home, away)
                .with_context(|| format!("failed to update match {id}"))?;
            let names = Names::new(&league.teams()?);
            let rows = render::fixture_rows(std::slice::from_ref(&fixture), &names);
            if json {
                render::print_json(&rows[0])?;
            } else {
                render::print_fixtures(&rows);
            }
        }

        Commands::Reset => {
            league.reset_league().context("failed to reset league")?;
            if json {
                render::print_json(&serde_json::json!({ "reset": true }))?;
            } else {
                println!("League reset successfully");
            }
        }

        Commands::Predictions { week: Some(week) } => {
            let predictions = league.stored_predictions(week)?;
            if json {
                render::print_json(&predictions)?;
            } else if predictions.is_empty() {
                println!("No predictions stored for week {week}");
            } else {
                render::print_predictions(&predictions);
            }
        }

        Commands::Predictions { week: None } => {
            let outcome = league
                .current_predictions()
                .context("failed to calculate predictions")?;
            if json {
                render::print_json(&outcome)?;
            } else {
                render::print_outcome(&outcome);
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct SeasonSummary<'a> {
    results: &'a SeasonResults,
    table: Vec<TableRow<'a>>,
    predictions: &'a PredictionOutcome,
}

/// Initialize tracing to log to a file (stdout carries command output).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("league.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("league_core=info,league_app=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
