//! Loading the known-player list.
//!
//! Accepts a bare list or a `players:` mapping, in YAML or JSON:
//!
//! ```yaml
//! players:
//!   - Luke Bangs
//!   - Oli Goddard
//! ```

use crate::config::ConfigError;
use serde::Deserialize;
use statchat_in::PlayerDirectory;
use tracing::info;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PlayersFile {
    List(Vec<String>),
    Wrapped { players: Vec<String> },
}

impl PlayersFile {
    fn into_names(self) -> Vec<String> {
        match self {
            PlayersFile::List(names) | PlayersFile::Wrapped { players: names } => names,
        }
    }
}

pub fn load_directory(path: &str) -> Result<PlayerDirectory, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    let directory = parse_directory(&content).map_err(|reason| ConfigError::Players {
        path: path.to_string(),
        reason,
    })?;
    info!(path, players = directory.len(), "loaded player directory");
    Ok(directory)
}

/// Parse a player list. JSON is read as YAML.
pub fn parse_directory(content: &str) -> Result<PlayerDirectory, String> {
    let file: PlayersFile = serde_yaml::from_str(content).map_err(|e| e.to_string())?;
    PlayerDirectory::new(file.into_names()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_and_json_forms() {
        let yaml = parse_directory("players:\n  - Luke Bangs\n  - Oli Goddard\n").unwrap();
        assert_eq!(yaml.len(), 2);
        let json = parse_directory(r#"["Luke Bangs", "Sam Tuck", "luke bangs"]"#).unwrap();
        assert_eq!(json.len(), 2);
        assert_eq!(json.canonicalise("SAM TUCK"), Some("Sam Tuck"));
    }

    #[test]
    fn test_bad_shape() {
        assert!(parse_directory("players: 3").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_directory("/nonexistent/players.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
