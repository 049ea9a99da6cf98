//! Conversion logic from domain entities to DTOs.

use roomcast_shared::time::timestamp_to_rfc3339;

use crate::{
    domain::{Connection, Room, Timestamp},
    infrastructure::dto::http::{MemberDetailDto, RoomDetailDto, RoomSummaryDto},
    usecase::RoomDetail,
};

fn format_timestamp(timestamp: Timestamp) -> String {
    timestamp_to_rfc3339(timestamp.value()).unwrap_or_default()
}

impl From<Room> for RoomSummaryDto {
    fn from(room: Room) -> Self {
        Self {
            id: room.id.into_string(),
            members: room
                .members
                .into_iter()
                .map(|member| member.into_string())
                .collect(),
            created_at: format_timestamp(room.created_at),
        }
    }
}

impl From<Connection> for MemberDetailDto {
    fn from(connection: Connection) -> Self {
        Self {
            connection_id: connection.id.into_string(),
            connected_at: format_timestamp(connection.connected_at),
        }
    }
}

impl From<RoomDetail> for RoomDetailDto {
    fn from(detail: RoomDetail) -> Self {
        Self {
            id: detail.room.id.into_string(),
            members: detail.members.into_iter().map(Into::into).collect(),
            created_at: format_timestamp(detail.room.created_at),
        }
    }
}
