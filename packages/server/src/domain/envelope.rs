//! Message envelope: the unit clients send to the relay.
//!
//! The relay reads only the `room` field. Everything else in the document is
//! payload and is never inspected; the original frame is what gets fanned out.

use std::{fmt, sync::Arc};

use axum::{body::Bytes, extract::ws::Utf8Bytes};
use serde::{
    Deserialize, Deserializer,
    de::{self, IgnoredAny, MapAccess, Visitor},
};

use super::{error::EnvelopeError, value_object::RoomId};

/// A raw frame exactly as it arrived on the transport.
///
/// Both variants are reference-counted buffers, so handing the frame to
/// another socket never copies the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(Utf8Bytes),
    Binary(Bytes),
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Frame::Text(text) => text.as_bytes(),
            Frame::Binary(bytes) => bytes.as_ref(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The only part of an envelope the relay reads.
///
/// A repeated `room` key resolves to its last string value. Other keys are
/// skipped without being materialized.
struct EnvelopeHeader {
    room: String,
}

impl<'de> Deserialize<'de> for EnvelopeHeader {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HeaderVisitor;

        impl<'de> Visitor<'de> for HeaderVisitor {
            type Value = EnvelopeHeader;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object with a string `room` field")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut room = None;
                while let Some(key) = map.next_key::<std::borrow::Cow<'de, str>>()? {
                    if key == "room" {
                        if let serde_json::Value::String(value) = map.next_value()? {
                            room = Some(value);
                        }
                    } else {
                        map.next_value::<IgnoredAny>()?;
                    }
                }
                room.map(|room| EnvelopeHeader { room })
                    .ok_or_else(|| de::Error::missing_field("room"))
            }
        }

        deserializer.deserialize_map(HeaderVisitor)
    }
}

/// A parsed envelope: the target room plus the untouched original frame.
#[derive(Debug, Clone)]
pub struct Envelope {
    room: RoomId,
    frame: Arc<Frame>,
}

impl Envelope {
    /// Parse a frame as an envelope.
    ///
    /// The body must be a JSON object with a string `room` field.
    pub fn parse(frame: Frame) -> Result<Self, EnvelopeError> {
        let bytes = frame.as_bytes();
        let first = bytes.iter().find(|b| !b.is_ascii_whitespace());
        if first != Some(&b'{') {
            return Err(EnvelopeError::NotAnObject);
        }

        let header: EnvelopeHeader = serde_json::from_slice(bytes)?;
        Ok(Self {
            room: RoomId::from(header.room),
            frame: Arc::new(frame),
        })
    }

    pub fn room(&self) -> &RoomId {
        &self.room
    }

    /// The original frame, shared between all recipients of a broadcast.
    pub fn frame(&self) -> Arc<Frame> {
        Arc::clone(&self.frame)
    }
}
