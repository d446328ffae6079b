//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::directory::{InMemoryDirectory, MatchDirectory};
use crate::session::{RoomSettings, SessionRegistry};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<dyn MatchDirectory>,
    pub sessions: Arc<SessionRegistry>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        // The registry reads roster sizes from the same directory the HTTP routes write to
        let directory: Arc<dyn MatchDirectory> = Arc::new(InMemoryDirectory::new());

        let sessions = Arc::new(SessionRegistry::new(
            directory.clone(),
            RoomSettings {
                radius: config.board_radius,
                default_max_players: config.default_max_players,
            },
        ));

        Self {
            config,
            directory,
            sessions,
        }
    }
}
