//! Live match rooms keyed by code.
//!
//! The map is only touched to create, find and drop rooms. Gameplay goes
//! through the room's own mutex, so two codes never contend. Broadcasts use
//! a `tokio::sync::broadcast` channel whose `send` does not await, which keeps
//! socket I/O outside every lock.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::directory::MatchDirectory;
use crate::game::{ConnectionId, GameMatch, MatchSnapshot};
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// Buffered broadcasts per room before a slow subscriber starts lagging
pub const ROOM_CHANNEL_CAPACITY: usize = 64;

/// What the transport should do for the originating connection
#[derive(Debug, Default)]
pub struct Delivery {
    /// Direct reply, delivered before anything from the subscription
    pub reply: Option<ServerMsg>,
    /// Present when this intent seated the connection in the room
    pub subscription: Option<broadcast::Receiver<ServerMsg>>,
}

/// Defaults for rooms created on first contact
#[derive(Debug, Clone, Copy)]
pub struct RoomSettings {
    pub radius: i32,
    pub default_max_players: usize,
}

struct RoomInner {
    game: GameMatch,
    participants: HashSet<ConnectionId>,
    closed: bool,
}

/// One match plus the connections attached to it
pub struct MatchRoom {
    inner: Mutex<RoomInner>,
    events: broadcast::Sender<ServerMsg>,
}

impl MatchRoom {
    fn new(game: GameMatch) -> Self {
        let (events, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
        Self {
            inner: Mutex::new(RoomInner {
                game,
                participants: HashSet::new(),
                closed: false,
            }),
            events,
        }
    }

    /// Run one intent under the room lock.
    ///
    /// Hands the intent back when the room was closed in the meantime. The
    /// boolean is true when the room is now empty and has been closed.
    fn try_dispatch(
        &self,
        conn: ConnectionId,
        msg: ClientMsg,
    ) -> Result<(Delivery, bool), ClientMsg> {
        let mut inner = self.inner.lock();
        if inner.closed {
            return Err(msg);
        }

        let dispatch = inner.game.handle(conn, msg);

        let mut subscription = None;
        if inner.game.seat_of(conn).is_some() && inner.participants.insert(conn) {
            // Subscribe before sending so the joiner sees its own lobby update
            subscription = Some(self.events.subscribe());
        }

        if let Some(event) = dispatch.broadcast {
            // No receivers is not an error here
            let _ = self.events.send(event);
        }

        let emptied = inner.participants.is_empty();
        if emptied {
            inner.closed = true;
        }

        Ok((
            Delivery {
                reply: dispatch.reply,
                subscription,
            },
            emptied,
        ))
    }

    /// Detach a connection. Returns true when the room is now closed.
    fn depart(&self, conn: ConnectionId) -> bool {
        let mut inner = self.inner.lock();
        if inner.closed || !inner.participants.remove(&conn) {
            return false;
        }

        let event = inner.game.handle_leave(conn);
        let _ = self.events.send(event);

        if inner.participants.is_empty() {
            inner.closed = true;
            return true;
        }
        false
    }

    pub fn participant_count(&self) -> usize {
        self.inner.lock().participants.len()
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        self.inner.lock().game.snapshot()
    }
}

/// Registry of live match rooms
pub struct SessionRegistry {
    rooms: DashMap<String, Arc<MatchRoom>>,
    directory: Arc<dyn MatchDirectory>,
    settings: RoomSettings,
}

impl SessionRegistry {
    pub fn new(directory: Arc<dyn MatchDirectory>, settings: RoomSettings) -> Self {
        Self {
            rooms: DashMap::new(),
            directory,
            settings,
        }
    }

    /// Route an intent to the room for `code`, creating the room if needed
    pub fn dispatch(&self, conn: ConnectionId, code: &str, msg: ClientMsg) -> Delivery {
        let mut msg = msg;
        loop {
            let room = self.room_for(code, &msg);
            match room.try_dispatch(conn, msg) {
                Ok((delivery, emptied)) => {
                    if emptied {
                        self.drop_room(code, &room);
                    }
                    return delivery;
                }
                Err(returned) => {
                    debug!(code = %code, "Room closed under us, retrying");
                    self.drop_room(code, &room);
                    msg = returned;
                }
            }
        }
    }

    /// Detach a connection from a room it had joined
    pub fn leave(&self, conn: ConnectionId, code: &str) {
        let Some(room) = self.get(code) else {
            return;
        };
        if room.depart(conn) {
            self.drop_room(code, &room);
        }
    }

    pub fn get(&self, code: &str) -> Option<Arc<MatchRoom>> {
        self.rooms.get(code).map(|r| Arc::clone(r.value()))
    }

    pub fn snapshot(&self, code: &str) -> Option<MatchSnapshot> {
        self.get(code).map(|room| room.snapshot())
    }

    pub fn active_matches(&self) -> usize {
        self.rooms.len()
    }

    pub fn total_connections(&self) -> usize {
        self.rooms
            .iter()
            .map(|r| r.value().participant_count())
            .sum()
    }

    fn room_for(&self, code: &str, msg: &ClientMsg) -> Arc<MatchRoom> {
        let entry = self.rooms.entry(code.to_string()).or_insert_with(|| {
            let max_players = self.max_players_for(code, msg);
            let seed = rand::random::<u64>();
            info!(code = %code, max_players, radius = self.settings.radius, "Match room created");
            Arc::new(MatchRoom::new(GameMatch::new(
                code,
                max_players,
                self.settings.radius,
                seed,
            )))
        });
        Arc::clone(entry.value())
    }

    fn max_players_for(&self, code: &str, msg: &ClientMsg) -> usize {
        if let Some(config) = self.directory.lookup(code) {
            return config.max_players;
        }
        match msg {
            ClientMsg::Join {
                max_players: Some(n),
                ..
            } => *n,
            _ => self.settings.default_max_players,
        }
    }

    /// Remove the room only if the map still holds this exact instance
    fn drop_room(&self, code: &str, room: &Arc<MatchRoom>) {
        if self
            .rooms
            .remove_if(code, |_, current| Arc::ptr_eq(current, room))
            .is_some()
        {
            info!(code = %code, "Match room closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;
    use crate::game::MatchStatus;
    use tokio::sync::broadcast::error::TryRecvError;
    use uuid::Uuid;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(
            Arc::new(InMemoryDirectory::new()),
            RoomSettings {
                radius: 4,
                default_max_players: 2,
            },
        )
    }

    fn join(name: &str) -> ClientMsg {
        ClientMsg::Join {
            nickname: name.into(),
            max_players: None,
        }
    }

    #[tokio::test]
    async fn test_first_join_creates_room() {
        let sessions = registry();
        let conn = Uuid::new_v4();

        let delivery = sessions.dispatch(conn, "ROOM01", join("Ana"));
        assert!(matches!(
            delivery.reply,
            Some(ServerMsg::Welcome { player_id: 0, .. })
        ));
        let mut rx = delivery.subscription.expect("seated");
        assert!(matches!(rx.try_recv(), Ok(ServerMsg::LobbyUpdate { .. })));
        assert_eq!(sessions.active_matches(), 1);
        assert_eq!(sessions.total_connections(), 1);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_participant() {
        let sessions = registry();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut rx_a = sessions.dispatch(a, "ROOM01", join("a")).subscription.unwrap();
        let mut rx_b = sessions.dispatch(b, "ROOM01", join("b")).subscription.unwrap();

        // a sees its own join and b's
        assert!(matches!(rx_a.try_recv(), Ok(ServerMsg::LobbyUpdate { .. })));
        assert!(matches!(rx_a.try_recv(), Ok(ServerMsg::LobbyUpdate { .. })));
        assert!(matches!(rx_b.try_recv(), Ok(ServerMsg::LobbyUpdate { .. })));

        sessions.dispatch(a, "ROOM01", ClientMsg::Ready);
        let delivery = sessions.dispatch(b, "ROOM01", ClientMsg::Ready);
        assert!(delivery.reply.is_none());
        assert!(delivery.subscription.is_none());

        for rx in [&mut rx_a, &mut rx_b] {
            assert!(matches!(rx.try_recv(), Ok(ServerMsg::LobbyUpdate { .. })));
            assert!(matches!(rx.try_recv(), Ok(ServerMsg::MatchStart { .. })));
        }
    }

    #[tokio::test]
    async fn test_rejection_goes_only_to_originator() {
        let sessions = registry();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = sessions.dispatch(a, "ROOM01", join("a")).subscription.unwrap();
        sessions.dispatch(b, "ROOM01", join("b"));
        sessions.dispatch(a, "ROOM01", ClientMsg::Ready);
        sessions.dispatch(b, "ROOM01", ClientMsg::Ready);
        while rx_a.try_recv().is_ok() {}

        let delivery = sessions.dispatch(b, "ROOM01", ClientMsg::Roll);
        assert!(matches!(delivery.reply, Some(ServerMsg::Rejected { .. })));
        assert!(matches!(rx_a.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_last_departure_tears_room_down() {
        let sessions = registry();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        sessions.dispatch(a, "ROOM01", join("a"));
        let mut rx_b = sessions.dispatch(b, "ROOM01", join("b")).subscription.unwrap();
        while rx_b.try_recv().is_ok() {}

        sessions.leave(a, "ROOM01");
        assert!(matches!(
            rx_b.try_recv(),
            Ok(ServerMsg::PlayerLeft { player_id: Some(0) })
        ));
        assert_eq!(sessions.active_matches(), 1);

        sessions.leave(b, "ROOM01");
        assert_eq!(sessions.active_matches(), 0);
        assert!(sessions.snapshot("ROOM01").is_none());

        let delivery = sessions.dispatch(Uuid::new_v4(), "ROOM01", join("c"));
        assert!(matches!(
            delivery.reply,
            Some(ServerMsg::Welcome { player_id: 0, .. })
        ));
        let snapshot = sessions.snapshot("ROOM01").unwrap();
        assert_eq!(snapshot.status, MatchStatus::Waiting);
        assert_eq!(snapshot.players.len(), 1);
    }

    #[tokio::test]
    async fn test_stray_intent_leaves_no_room_behind() {
        let sessions = registry();
        let delivery = sessions.dispatch(Uuid::new_v4(), "GHOST1", ClientMsg::Ready);
        assert!(matches!(delivery.reply, Some(ServerMsg::Rejected { .. })));
        assert!(delivery.subscription.is_none());
        assert_eq!(sessions.active_matches(), 0);
    }

    #[tokio::test]
    async fn test_codes_are_independent() {
        let sessions = registry();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rx_a = sessions.dispatch(a, "AAAAAA", join("a")).subscription.unwrap();
        while rx_a.try_recv().is_ok() {}

        let delivery = sessions.dispatch(b, "BBBBBB", join("b"));
        assert!(matches!(
            delivery.reply,
            Some(ServerMsg::Welcome { player_id: 0, .. })
        ));
        assert!(matches!(rx_a.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(sessions.active_matches(), 2);
    }

    #[tokio::test]
    async fn test_roster_size_comes_from_directory_then_intent() {
        let directory = Arc::new(InMemoryDirectory::new());
        let config = directory.create(4).unwrap();
        let sessions = SessionRegistry::new(
            directory,
            RoomSettings {
                radius: 3,
                default_max_players: 2,
            },
        );

        let conn = Uuid::new_v4();
        sessions.dispatch(
            conn,
            &config.code,
            ClientMsg::Join {
                nickname: "a".into(),
                max_players: Some(3),
            },
        );
        assert_eq!(sessions.snapshot(&config.code).unwrap().max_players, 4);

        sessions.dispatch(
            conn,
            "FREE01",
            ClientMsg::Join {
                nickname: "a".into(),
                max_players: Some(3),
            },
        );
        assert_eq!(sessions.snapshot("FREE01").unwrap().max_players, 3);

        sessions.dispatch(conn, "FREE02", join("a"));
        assert_eq!(sessions.snapshot("FREE02").unwrap().max_players, 2);
    }
}
