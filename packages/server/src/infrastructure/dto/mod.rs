//! Data Transfer Objects (DTOs).
//!
//! WebSocket traffic is relayed untouched, so only the HTTP API has DTOs.

pub mod conversion;
pub mod http;
