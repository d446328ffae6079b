//! Match rooms and fan-out to connected clients

pub mod registry;

pub use registry::{Delivery, MatchRoom, RoomSettings, SessionRegistry};
