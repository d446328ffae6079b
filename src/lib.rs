//! HEX match server.
//!
//! Authoritative server for HEX, a turn-based territory game on a hexagonal
//! board. Clients talk to it over WebSocket with JSON intents; the server
//! validates every join, ready, roll, move, placement and pass against the
//! rules, then broadcasts the resulting state to everyone in the match.

pub mod app;
pub mod config;
pub mod directory;
pub mod game;
pub mod http;
pub mod session;
pub mod util;
pub mod ws;
