//! Identifier factories.

use uuid::Uuid;

use super::{error::ValueObjectError, value_object::ConnectionId};

/// Generates connection identifiers at accept time.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a fresh, random connection identifier (UUID v4).
    pub fn generate() -> Result<ConnectionId, ValueObjectError> {
        ConnectionId::new(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_returns_unique_ids() {
        // テスト項目: 生成される ConnectionId が一意である
        // given (前提条件):
        let count = 100;

        // when (操作):
        let ids: std::collections::HashSet<ConnectionId> = (0..count)
            .map(|_| ConnectionIdFactory::generate().unwrap())
            .collect();

        // then (期待する結果):
        assert_eq!(ids.len(), count);
    }
}
