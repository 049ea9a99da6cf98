//! Domain layer: entities, value objects, and the interfaces the other layers
//! implement.

pub mod entity;
pub mod envelope;
pub mod error;
pub mod factory;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Connection, ConnectionState, Room, RoomRetention, RoomTable};
pub use envelope::{Envelope, Frame};
pub use error::{
    EnvelopeError, MembershipError, MessagePushError, RepositoryError, ValueObjectError,
};
pub use factory::ConnectionIdFactory;
pub use message_pusher::{BroadcastReport, MessagePusher, PusherChannel};
pub use repository::RelayRepository;
pub use value_object::{ConnectionId, RoomId, Timestamp};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
