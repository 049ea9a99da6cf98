//! Domain entities: connections, rooms, and the room table that owns them.

use std::collections::{HashMap, HashSet};

use super::{
    error::MembershipError,
    value_object::{ConnectionId, RoomId, Timestamp},
};

/// Transport state of a connection.
///
/// `Open -> Closing -> Closed`. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closing,
    Closed,
}

/// A live bidirectional channel to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub connected_at: Timestamp,
    pub state: ConnectionState,
    /// Rooms this connection is currently a member of
    pub rooms: HashSet<RoomId>,
}

impl Connection {
    pub fn new(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            connected_at,
            state: ConnectionState::Open,
            rooms: HashSet::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }
}

/// A named broadcast group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    /// Members in join order
    pub members: Vec<ConnectionId>,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            created_at,
            members: Vec::new(),
        }
    }

    /// Add a member. Returns `false` if it was already present.
    pub fn add_member(&mut self, id: &ConnectionId) -> bool {
        if self.is_member(id) {
            return false;
        }
        self.members.push(id.clone());
        true
    }

    /// Remove a member. Returns `false` if it was not present.
    pub fn remove_member(&mut self, id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|member| member != id);
        self.members.len() != before
    }

    pub fn is_member(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// What happens to a room once its last member leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomRetention {
    /// Delete the room as soon as it becomes empty
    #[default]
    Collect,
    /// Keep empty rooms forever
    Retain,
}

/// The relay's state: connection registry plus room table.
///
/// Every mutation of membership goes through this type so that the
/// connection's room set and the rooms' member lists never disagree.
#[derive(Debug, Default)]
pub struct RoomTable {
    connections: HashMap<ConnectionId, Connection>,
    rooms: HashMap<RoomId, Room>,
    retention: RoomRetention,
}

impl RoomTable {
    pub fn new(retention: RoomRetention) -> Self {
        Self {
            connections: HashMap::new(),
            rooms: HashMap::new(),
            retention,
        }
    }

    /// Register a freshly accepted connection.
    pub fn register(&mut self, connection: Connection) -> Result<(), MembershipError> {
        if self.connections.contains_key(&connection.id) {
            return Err(MembershipError::DuplicateConnection(
                connection.id.into_string(),
            ));
        }
        self.connections.insert(connection.id.clone(), connection);
        Ok(())
    }

    /// Ensure `room_id` exists and `id` is a member of it, then return the
    /// membership snapshot for a broadcast: every open member, in join order.
    pub fn join(
        &mut self,
        id: &ConnectionId,
        room_id: RoomId,
        now: Timestamp,
    ) -> Result<Vec<ConnectionId>, MembershipError> {
        let connection = self
            .connections
            .get_mut(id)
            .ok_or_else(|| MembershipError::ConnectionNotFound(id.as_str().to_string()))?;
        if !connection.is_open() {
            return Err(MembershipError::ConnectionNotOpen(id.as_str().to_string()));
        }

        let room = self
            .rooms
            .entry(room_id.clone())
            .or_insert_with(|| Room::new(room_id.clone(), now));
        room.add_member(id);
        connection.rooms.insert(room_id);

        let connections = &self.connections;
        Ok(room
            .members
            .iter()
            .filter(|member| connections.get(*member).is_some_and(Connection::is_open))
            .cloned()
            .collect())
    }

    /// Move a connection to `Closing`: it stays a member but is excluded from
    /// new snapshots.
    pub fn mark_closing(&mut self, id: &ConnectionId) -> Result<(), MembershipError> {
        let connection = self
            .connections
            .get_mut(id)
            .ok_or_else(|| MembershipError::ConnectionNotFound(id.as_str().to_string()))?;
        if connection.state == ConnectionState::Open {
            connection.state = ConnectionState::Closing;
        }
        Ok(())
    }

    /// Remove a connection from the registry and from every room it joined.
    ///
    /// Returns the closed connection, or `None` if it was already gone.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Connection> {
        let mut connection = self.connections.remove(id)?;
        connection.state = ConnectionState::Closed;

        for room_id in &connection.rooms {
            let Some(room) = self.rooms.get_mut(room_id) else {
                continue;
            };
            room.remove_member(id);
            if room.is_empty() && self.retention == RoomRetention::Collect {
                self.rooms.remove(room_id);
            }
        }

        Some(connection)
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    pub fn room(&self, id: &RoomId) -> Option<&Room> {
        self.rooms.get(id)
    }

    /// A room together with its members' connections, in join order.
    pub fn room_with_members(&self, id: &RoomId) -> Option<(&Room, Vec<&Connection>)> {
        let room = self.room(id)?;
        let members = room
            .members
            .iter()
            .filter_map(|member| self.connection(member))
            .collect();
        Some((room, members))
    }

    /// All rooms, sorted by id.
    pub fn rooms(&self) -> Vec<&Room> {
        let mut rooms: Vec<&Room> = self.rooms.values().collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn table_with(ids: &[&str], retention: RoomRetention) -> RoomTable {
        let mut table = RoomTable::new(retention);
        for value in ids {
            table
                .register(Connection::new(id(value), Timestamp::new(1000)))
                .unwrap();
        }
        table
    }

    #[test]
    fn test_register_rejects_duplicate() {
        // テスト項目: 同じ ID の接続を二重登録できない
        // given (前提条件):
        let mut table = table_with(&["a"], RoomRetention::Collect);

        // when (操作):
        let result = table.register(Connection::new(id("a"), Timestamp::new(2000)));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MembershipError::DuplicateConnection("a".to_string()))
        );
        assert_eq!(table.connection_count(), 1);
    }

    #[test]
    fn test_join_creates_room_with_single_member() {
        // テスト項目: 未知の room を参照すると送信者のみを含む room が作成される
        // given (前提条件):
        let mut table = table_with(&["a", "b"], RoomRetention::Collect);
        table.join(&id("b"), RoomId::from("other"), Timestamp::new(1500)).unwrap();

        // when (操作):
        let snapshot = table
            .join(&id("a"), RoomId::from("r1"), Timestamp::new(2000))
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot, vec![id("a")]);
        let room = table.room(&RoomId::from("r1")).unwrap();
        assert_eq!(room.members, vec![id("a")]);
        assert_eq!(room.created_at, Timestamp::new(2000));
        // 他の room には影響しない
        assert_eq!(
            table.room(&RoomId::from("other")).unwrap().members,
            vec![id("b")]
        );
    }

    #[test]
    fn test_join_is_idempotent() {
        // テスト項目: 同じ接続が同じ room に複数回参加してもメンバーは重複しない
        // given (前提条件):
        let mut table = table_with(&["a", "b"], RoomRetention::Collect);
        table.join(&id("a"), RoomId::from("r1"), Timestamp::new(1)).unwrap();
        table.join(&id("b"), RoomId::from("r1"), Timestamp::new(2)).unwrap();

        // when (操作):
        let snapshot = table
            .join(&id("a"), RoomId::from("r1"), Timestamp::new(3))
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot, vec![id("a"), id("b")]);
        assert_eq!(table.room(&RoomId::from("r1")).unwrap().members.len(), 2);
        assert_eq!(table.connection(&id("a")).unwrap().rooms.len(), 1);
    }

    #[test]
    fn test_join_unknown_connection() {
        // テスト項目: 登録されていない接続は room に参加できない
        // given (前提条件):
        let mut table = table_with(&[], RoomRetention::Collect);

        // when (操作):
        let result = table.join(&id("ghost"), RoomId::from("r1"), Timestamp::new(1));

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MembershipError::ConnectionNotFound("ghost".to_string()))
        );
        assert_eq!(table.rooms().len(), 0);
    }

    #[test]
    fn test_closing_member_is_excluded_from_snapshot() {
        // テスト項目: Closing 状態のメンバーはスナップショットに含まれない
        // given (前提条件):
        let mut table = table_with(&["a", "b"], RoomRetention::Collect);
        table.join(&id("a"), RoomId::from("r1"), Timestamp::new(1)).unwrap();
        table.join(&id("b"), RoomId::from("r1"), Timestamp::new(2)).unwrap();

        // when (操作):
        table.mark_closing(&id("a")).unwrap();
        let snapshot = table
            .join(&id("b"), RoomId::from("r1"), Timestamp::new(3))
            .unwrap();

        // then (期待する結果):
        assert_eq!(snapshot, vec![id("b")]);
        assert_eq!(
            table.join(&id("a"), RoomId::from("r1"), Timestamp::new(4)),
            Err(MembershipError::ConnectionNotOpen("a".to_string()))
        );
    }

    #[test]
    fn test_remove_clears_every_room() {
        // テスト項目: 切断された接続は全ての room から削除される
        // given (前提条件):
        let mut table = table_with(&["a", "b"], RoomRetention::Collect);
        for room in ["r1", "r2", "r3"] {
            table.join(&id("a"), RoomId::from(room), Timestamp::new(1)).unwrap();
        }
        table.join(&id("b"), RoomId::from("r1"), Timestamp::new(2)).unwrap();

        // when (操作):
        let removed = table.remove(&id("a")).unwrap();

        // then (期待する結果):
        assert_eq!(removed.state, ConnectionState::Closed);
        assert_eq!(removed.rooms.len(), 3);
        assert!(table.connection(&id("a")).is_none());
        for room in table.rooms() {
            assert!(!room.is_member(&id("a")));
        }
        // 空になった room は回収される
        assert_eq!(table.rooms().len(), 1);
        assert_eq!(table.room(&RoomId::from("r1")).unwrap().members, vec![id("b")]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        // テスト項目: 二回目の削除は何も起こさない
        // given (前提条件):
        let mut table = table_with(&["a"], RoomRetention::Collect);
        table.join(&id("a"), RoomId::from("r1"), Timestamp::new(1)).unwrap();
        table.remove(&id("a"));

        // when (操作):
        let second = table.remove(&id("a"));

        // then (期待する結果):
        assert!(second.is_none());
        assert_eq!(table.connection_count(), 0);
    }

    #[test]
    fn test_retain_keeps_empty_rooms() {
        // テスト項目: Retain ポリシーでは空の room が残る
        // given (前提条件):
        let mut table = table_with(&["a"], RoomRetention::Retain);
        table.join(&id("a"), RoomId::from("r1"), Timestamp::new(1)).unwrap();

        // when (操作):
        table.remove(&id("a"));

        // then (期待する結果):
        let room = table.room(&RoomId::from("r1")).unwrap();
        assert!(room.is_empty());
    }

    #[test]
    fn test_rooms_are_sorted_by_id() {
        // テスト項目: room 一覧は ID 順に並ぶ
        // given (前提条件):
        let mut table = table_with(&["a"], RoomRetention::Collect);
        for room in ["zeta", "alpha", "mid"] {
            table.join(&id("a"), RoomId::from(room), Timestamp::new(1)).unwrap();
        }

        // when (操作):
        let names: Vec<&str> = table.rooms().iter().map(|r| r.id.as_str()).collect();

        // then (期待する結果):
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }
}
