//! Value objects of the relay domain.

use std::fmt;

use super::error::ValueObjectError;

/// Unique identifier of a live connection.
///
/// Assigned by the relay at accept time, never by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Create a new ConnectionId. Empty identifiers are rejected.
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::ConnectionIdEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room identifier as supplied by clients.
///
/// Opaque: any string is a valid room name, including the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for RoomId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for RoomId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_rejects_empty() {
        // テスト項目: 空文字列の ConnectionId は作成できない
        // given (前提条件):
        let value = String::new();

        // when (操作):
        let result = ConnectionId::new(value);

        // then (期待する結果):
        assert_eq!(result, Err(ValueObjectError::ConnectionIdEmpty));
    }

    #[test]
    fn test_room_id_accepts_any_string() {
        // テスト項目: RoomId は任意の文字列（空文字列を含む）を受け付ける
        // given (前提条件):
        let names = ["", "r1", "linka 4 → Bory", "{\"nested\":true}"];

        // when (操作):
        let ids: Vec<RoomId> = names.iter().map(|n| RoomId::from(*n)).collect();

        // then (期待する結果):
        for (id, name) in ids.iter().zip(names) {
            assert_eq!(id.as_str(), name);
        }
    }
}
