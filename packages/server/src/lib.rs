//! Room-based WebSocket broadcast relay.
//!
//! Clients send JSON envelopes carrying a `room` field. The relay joins the
//! sender to that room (creating it on first use) and forwards the original
//! bytes to every open member of the room, the sender included.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
