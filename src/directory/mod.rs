//! Match directory: hands out match codes and remembers their roster size

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use tracing::info;

use crate::game::state::{MAX_PLAYERS, MIN_PLAYERS};

/// Length of a generated match code
pub const CODE_LEN: usize = 6;

/// Attempts before giving up on finding an unused code
const MAX_CODE_ATTEMPTS: usize = 16;

/// A registered match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchConfig {
    pub code: String,
    pub max_players: usize,
    pub created_at: DateTime<Utc>,
}

/// Directory errors
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Player count must be between {MIN_PLAYERS} and {MAX_PLAYERS}, got {0}")]
    InvalidPlayerCount(usize),

    #[error("No unused match code found")]
    CodeSpaceExhausted,
}

/// Source of match configuration consulted when a room is created
pub trait MatchDirectory: Send + Sync {
    /// Register a new match and return its code
    fn create(&self, max_players: usize) -> Result<MatchConfig, DirectoryError>;

    fn lookup(&self, code: &str) -> Option<MatchConfig>;
}

/// Process-local directory. Entries are never evicted.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    entries: DashMap<String, MatchConfig>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MatchDirectory for InMemoryDirectory {
    fn create(&self, max_players: usize) -> Result<MatchConfig, DirectoryError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(DirectoryError::InvalidPlayerCount(max_players));
        }

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code();
            if let Entry::Vacant(slot) = self.entries.entry(code.clone()) {
                let config = MatchConfig {
                    code,
                    max_players,
                    created_at: Utc::now(),
                };
                slot.insert(config.clone());
                info!(code = %config.code, max_players, "Match registered");
                return Ok(config);
            }
        }

        Err(DirectoryError::CodeSpaceExhausted)
    }

    fn lookup(&self, code: &str) -> Option<MatchConfig> {
        self.entries.get(code).map(|entry| entry.value().clone())
    }
}

/// Random upper-case alphanumeric code
pub fn generate_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_are_upper_alphanumeric() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_create_then_lookup() {
        let directory = InMemoryDirectory::new();
        let config = directory.create(4).unwrap();

        assert_eq!(config.max_players, 4);
        assert_eq!(directory.lookup(&config.code), Some(config.clone()));
        assert_eq!(directory.lookup("NOPE00"), None);
        assert_eq!(directory.len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_player_counts() {
        let directory = InMemoryDirectory::new();
        assert!(matches!(
            directory.create(1),
            Err(DirectoryError::InvalidPlayerCount(1))
        ));
        assert!(matches!(
            directory.create(7),
            Err(DirectoryError::InvalidPlayerCount(7))
        ));
        assert!(directory.is_empty());
    }

    #[test]
    fn test_codes_do_not_collide() {
        let directory = InMemoryDirectory::new();
        for _ in 0..100 {
            directory.create(2).unwrap();
        }
        assert_eq!(directory.len(), 100);
    }
}
