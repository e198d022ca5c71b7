// Team roster loading from CSV (name,power,logo).

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::warn;

/// A team definition read from the roster file, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSeed {
    pub name: String,
    pub power: u32,
    pub logo: Option<String>,
}

impl TeamSeed {
    pub fn new(name: impl Into<String>, power: u32) -> Self {
        Self {
            name: name.into(),
            power,
            logo: None,
        }
    }
}

/// The four-club league used when no roster file is configured.
pub fn default_teams() -> Vec<TeamSeed> {
    vec![
        TeamSeed::new("Chelsea", 90),
        TeamSeed::new("Arsenal", 85),
        TeamSeed::new("Manchester City", 88),
        TeamSeed::new("Liverpool", 82),
    ]
}

#[derive(Debug, thiserror::Error)]
pub enum TeamsError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Deserialize)]
struct RawTeam {
    name: String,
    power: i64,
    #[serde(default)]
    logo: Option<String>,
}

/// Parse a roster from any reader. Rows with an empty name, a power outside
/// 1..=100, or that fail to deserialize are skipped with a warning.
pub fn load_teams_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamSeed>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    reader.headers()?;

    let mut teams = Vec::new();
    for result in reader.deserialize::<RawTeam>() {
        match result {
            Ok(raw) => {
                let name = raw.name.trim();
                if name.is_empty() {
                    warn!("skipping team row with empty name");
                    continue;
                }
                let power = match u32::try_from(raw.power) {
                    Ok(p) if (1..=100).contains(&p) => p,
                    _ => {
                        warn!("skipping team '{}': power {} outside 1..=100", name, raw.power);
                        continue;
                    }
                };
                teams.push(TeamSeed {
                    name: name.to_string(),
                    power,
                    logo: raw.logo.filter(|l| !l.trim().is_empty()),
                });
            }
            Err(e) => {
                warn!("skipping malformed team row: {}", e);
            }
        }
    }
    Ok(teams)
}

/// Load the roster file at `path`. A file that yields no valid team is an error.
pub fn load_teams(path: &Path) -> Result<Vec<TeamSeed>, TeamsError> {
    let file = std::fs::File::open(path).map_err(|e| TeamsError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let teams = load_teams_from_reader(file).map_err(|e| TeamsError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if teams.is_empty() {
        return Err(TeamsError::Validation(format!(
            "{} produced zero valid teams",
            path.display()
        )));
    }
    Ok(teams)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_rows() {
        let csv = "name,power,logo\nChelsea,90,chelsea.png\nArsenal,85,\n";
        let teams = load_teams_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(
            teams,
            vec![
                TeamSeed {
                    name: "Chelsea".into(),
                    power: 90,
                    logo: Some("chelsea.png".into()),
                },
                TeamSeed::new("Arsenal", 85),
            ]
        );
    }

    #[test]
    fn skips_invalid_rows() {
        let csv = "name,power,logo\n\
                   ,50,\n\
                   Zero,0,\n\
                   Huge,101,\n\
                   Negative,-3,\n\
                   Words,strong,\n\
                   Liverpool,82,\n";
        let teams = load_teams_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(teams, vec![TeamSeed::new("Liverpool", 82)]);
    }

    #[test]
    fn trims_whitespace() {
        let csv = "name, power ,logo\n  Manchester City , 88 ,\n";
        let teams = load_teams_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(teams, vec![TeamSeed::new("Manchester City", 88)]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_teams(Path::new("/nonexistent/teams.csv")).unwrap_err();
        assert!(matches!(err, TeamsError::Io { .. }));
    }

    #[test]
    fn empty_roster_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("teams.csv");
        std::fs::write(&path, "name,power,logo\n,10,\n").unwrap();
        let err = load_teams(&path).unwrap_err();
        assert!(matches!(err, TeamsError::Validation(_)));
    }

    #[test]
    fn shipped_roster_matches_default_teams() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../defaults/teams.csv");
        assert_eq!(load_teams(&path).unwrap(), default_teams());
    }
}
